//! Edit payloads and the keep/clear/set tri-state
//!
//! Partial-update wire policy: an absent field means "do not touch", an
//! explicit JSON `null` clears the field server-side, a value replaces it.
//! `Patch<T>` encodes that policy in the type system instead of leaving it
//! to ad-hoc inspection of dynamic payloads.

use super::record::{
    Address, Allowance, Certification, DocumentRef, Education, EmployeeRecord, Phone,
    WorkExperience,
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tri-state field update.
///
/// Use with `#[serde(default, skip_serializing_if = "Patch::is_keep")]` so
/// that `Keep` disappears from the wire entirely and `Clear` serializes as
/// an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Patch<T> {
    /// Field absent from the payload; leave the stored value alone
    #[default]
    Keep,
    /// Explicit null; clear the stored value
    Clear,
    /// Replace the stored value
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }

    pub fn is_clear(&self) -> bool {
        matches!(self, Patch::Clear)
    }

    /// The new value, if this patch sets one
    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Set(v) => Some(v),
            _ => None,
        }
    }

    /// Shallow-merge this patch into an optional slot
    pub fn apply_to(&self, slot: &mut Option<T>)
    where
        T: Clone,
    {
        match self {
            Patch::Keep => {}
            Patch::Clear => *slot = None,
            Patch::Set(v) => *slot = Some(v.clone()),
        }
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Keep is handled by skip_serializing_if; if it reaches here
            // anyway, null is the least-wrong encoding
            Patch::Keep | Patch::Clear => serializer.serialize_none(),
            Patch::Set(v) => serializer.serialize_some(v),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // A present key deserializes here: null -> Clear, value -> Set.
        // An absent key never reaches this point; #[serde(default)] yields Keep.
        Ok(match Option::<T>::deserialize(deserializer)? {
            None => Patch::Clear,
            Some(v) => Patch::Set(v),
        })
    }
}

/// A file-valued field in an edit payload: either a reference to an already
/// committed storage path, or raw bytes awaiting upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum FileValue {
    /// Already persisted; passes through persistence untouched
    Stored { path: String },
    /// Newly attached; must be uploaded before section dispatch
    Pending { file_name: String, bytes: Vec<u8> },
}

impl FileValue {
    pub fn is_pending(&self) -> bool {
        matches!(self, FileValue::Pending { .. })
    }

    /// Committed storage path, if this value has one
    pub fn path(&self) -> Option<&str> {
        match self {
            FileValue::Stored { path } => Some(path),
            FileValue::Pending { .. } => None,
        }
    }
}

/// One entry of the resubmitted document collection.
///
/// Entries absent from a resubmitted collection are removed server-side
/// (removal by omission); there is no explicit delete call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEdit {
    pub title: String,
    pub file: FileValue,
}

/// One edited profile, before it is split into per-section requests.
///
/// Scalars use the tri-state; collections use `Option<Vec<_>>` where a
/// present vector fully replaces the server-side collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeEdit {
    // Personal
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub first_name: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub last_name: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub national_id: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub birth_date: Patch<NaiveDate>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub gender: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub marital_status: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub email: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub photo: Patch<FileValue>,

    // Employment
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub job_title: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub job_level: Patch<String>,
    /// Chosen by display name; the server denormalizes to a department id
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub department: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub start_date: Patch<NaiveDate>,

    // Financial (gross_salary is shared with employment; precedence is
    // decided at section-extraction time)
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub iban: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub tax_number: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub gross_salary: Patch<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowances: Option<Vec<Allowance>>,

    // Collections (present vector = full replacement)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<Address>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phones: Option<Vec<Phone>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub educations: Option<Vec<Education>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_experiences: Option<Vec<WorkExperience>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certifications: Option<Vec<Certification>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<DocumentEdit>>,
}

/// The locally-derivable slice of a successful submit, shallow-merged into
/// the detail cache without waiting for a full refetch.
///
/// Fields the server denormalizes (currently `department`, resolved from a
/// display name to a department id) are deliberately absent; they stay
/// stale in the cache until the next full fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub first_name: Patch<String>,
    pub last_name: Patch<String>,
    pub national_id: Patch<String>,
    pub birth_date: Patch<NaiveDate>,
    pub gender: Patch<String>,
    pub marital_status: Patch<String>,
    pub email: Patch<String>,
    pub photo_path: Patch<String>,
    pub job_title: Patch<String>,
    pub job_level: Patch<String>,
    pub start_date: Patch<NaiveDate>,
    pub iban: Patch<String>,
    pub tax_number: Patch<String>,
    pub gross_salary: Patch<f64>,
    pub allowances: Option<Vec<Allowance>>,
    pub addresses: Option<Vec<Address>>,
    pub phones: Option<Vec<Phone>>,
    pub educations: Option<Vec<Education>>,
    pub work_experiences: Option<Vec<WorkExperience>>,
    pub certifications: Option<Vec<Certification>>,
    pub documents: Option<Vec<DocumentRef>>,
}

impl EmployeeRecord {
    /// Shallow-merge a patch into this snapshot (last-write-wins).
    pub fn apply_patch(&mut self, patch: &RecordPatch) {
        let mut first_name = Some(self.first_name.clone());
        patch.first_name.apply_to(&mut first_name);
        if let Some(v) = first_name {
            self.first_name = v;
        }
        let mut last_name = Some(self.last_name.clone());
        patch.last_name.apply_to(&mut last_name);
        if let Some(v) = last_name {
            self.last_name = v;
        }

        patch.national_id.apply_to(&mut self.national_id);
        patch.birth_date.apply_to(&mut self.birth_date);
        patch.gender.apply_to(&mut self.gender);
        patch.marital_status.apply_to(&mut self.marital_status);
        patch.email.apply_to(&mut self.email);
        patch.photo_path.apply_to(&mut self.photo_path);
        patch.job_title.apply_to(&mut self.job_title);
        patch.job_level.apply_to(&mut self.job_level);
        patch.start_date.apply_to(&mut self.start_date);
        patch.iban.apply_to(&mut self.iban);
        patch.tax_number.apply_to(&mut self.tax_number);
        patch.gross_salary.apply_to(&mut self.gross_salary);

        if let Some(v) = &patch.allowances {
            self.allowances = v.clone();
        }
        if let Some(v) = &patch.addresses {
            self.addresses = v.clone();
        }
        if let Some(v) = &patch.phones {
            self.phones = v.clone();
        }
        if let Some(v) = &patch.educations {
            self.educations = v.clone();
        }
        if let Some(v) = &patch.work_experiences {
            self.work_experiences = v.clone();
        }
        if let Some(v) = &patch.certifications {
            self.certifications = v.clone();
        }
        if let Some(v) = &patch.documents {
            self.documents = v.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Probe {
        #[serde(default, skip_serializing_if = "Patch::is_keep")]
        name: Patch<String>,
    }

    #[test]
    fn absent_field_deserializes_as_keep() {
        let probe: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(probe.name, Patch::Keep);
    }

    #[test]
    fn null_field_deserializes_as_clear() {
        let probe: Probe = serde_json::from_str(r#"{"name": null}"#).unwrap();
        assert_eq!(probe.name, Patch::Clear);
    }

    #[test]
    fn value_field_deserializes_as_set() {
        let probe: Probe = serde_json::from_str(r#"{"name": "Ada"}"#).unwrap();
        assert_eq!(probe.name, Patch::Set("Ada".to_string()));
    }

    #[test]
    fn keep_is_skipped_and_clear_is_null_on_the_wire() {
        let keep = serde_json::to_string(&Probe { name: Patch::Keep }).unwrap();
        assert_eq!(keep, "{}");

        let clear = serde_json::to_string(&Probe { name: Patch::Clear }).unwrap();
        assert_eq!(clear, r#"{"name":null}"#);

        let set = serde_json::to_string(&Probe {
            name: Patch::Set("Ada".to_string()),
        })
        .unwrap();
        assert_eq!(set, r#"{"name":"Ada"}"#);
    }

    #[test]
    fn apply_to_respects_tri_state() {
        let mut slot = Some("old".to_string());
        Patch::Keep.apply_to(&mut slot);
        assert_eq!(slot.as_deref(), Some("old"));

        Patch::Set("new".to_string()).apply_to(&mut slot);
        assert_eq!(slot.as_deref(), Some("new"));

        Patch::<String>::Clear.apply_to(&mut slot);
        assert_eq!(slot, None);
    }
}
