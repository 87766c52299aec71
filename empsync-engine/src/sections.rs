//! Section update coordinator
//!
//! Splits one edited profile into named sections, each bound to its own
//! persistence endpoint, and dispatches the non-empty ones concurrently.
//! Fan-in waits for every request to settle; if any failed, the aggregate
//! error names exactly the failing sections. There is no compensating
//! rollback: sections that committed stay committed, and the caller
//! restores a canonical view by refetching.
//!
//! Document collections replace wholesale: an entry absent from a
//! resubmitted collection is removed server-side by omission. A caller
//! that drops an entry by accident deletes it.

use crate::client::SectionStore;
use crate::error::{SectionFailure, SubmitError};
use empsync_common::model::{DocumentRef, EmployeeEdit, Patch, RecordPatch};
use futures::future::join_all;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Named, non-overlapping partition of the record's editable fields.
///
/// `grossSalary` is the one intentional duplicate: it appears in both
/// employment and financial bodies, and employment wins when both sections
/// are dispatched in a single submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Personal,
    Financial,
    Employment,
    Contact,
    Education,
    WorkExperience,
    Certifications,
    Documents,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::Personal,
        Section::Financial,
        Section::Employment,
        Section::Contact,
        Section::Education,
        Section::WorkExperience,
        Section::Certifications,
        Section::Documents,
    ];

    /// Wire name used in the persistence endpoint path
    pub fn name(&self) -> &'static str {
        match self {
            Section::Personal => "personal",
            Section::Financial => "financial",
            Section::Employment => "employment",
            Section::Contact => "contact",
            Section::Education => "education",
            Section::WorkExperience => "work_experience",
            Section::Certifications => "certifications",
            Section::Documents => "documents",
        }
    }

    /// Wire field names this section persists (the field→section map)
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Section::Personal => &[
                "firstName",
                "lastName",
                "nationalId",
                "birthDate",
                "gender",
                "maritalStatus",
                "email",
                "photoPath",
            ],
            Section::Financial => &["ibanNo", "taxNo", "grossSalary", "allowances"],
            Section::Employment => &[
                "jobTitle",
                "jobLevel",
                "departmentName",
                "startDate",
                "grossSalary",
            ],
            Section::Contact => &["addresses", "phones"],
            Section::Education => &["educations"],
            Section::WorkExperience => &["experiences"],
            Section::Certifications => &["certifications"],
            Section::Documents => &["documents"],
        }
    }
}

fn put_patch<T: Serialize>(body: &mut Map<String, Value>, key: &str, patch: &Patch<T>) {
    match patch {
        Patch::Keep => {}
        Patch::Clear => {
            body.insert(key.to_string(), Value::Null);
        }
        Patch::Set(v) => {
            body.insert(
                key.to_string(),
                serde_json::to_value(v).unwrap_or(Value::Null),
            );
        }
    }
}

fn put_collection<T: Serialize>(body: &mut Map<String, Value>, key: &str, items: &Option<Vec<T>>) {
    if let Some(items) = items {
        body.insert(
            key.to_string(),
            serde_json::to_value(items).unwrap_or(Value::Null),
        );
    }
}

/// Build one section's wire body from the (upload-resolved) edit.
///
/// Returns `None` when the section has nothing to persist; an empty body is
/// skipped, never sent as an empty request. `employment_dispatched` drives
/// the salary precedence rule.
fn section_body(
    section: Section,
    edit: &EmployeeEdit,
    employment_dispatched: bool,
) -> Option<Value> {
    let mut body = Map::new();

    match section {
        Section::Personal => {
            put_patch(&mut body, "firstName", &edit.first_name);
            put_patch(&mut body, "lastName", &edit.last_name);
            put_patch(&mut body, "nationalId", &edit.national_id);
            put_patch(&mut body, "birthDate", &edit.birth_date);
            put_patch(&mut body, "gender", &edit.gender);
            put_patch(&mut body, "maritalStatus", &edit.marital_status);
            put_patch(&mut body, "email", &edit.email);
            match &edit.photo {
                Patch::Keep => {}
                Patch::Clear => {
                    body.insert("photoPath".to_string(), Value::Null);
                }
                Patch::Set(file) => {
                    // Resolved to a committed path by the upload orchestrator
                    if let Some(path) = file.path() {
                        body.insert("photoPath".to_string(), Value::String(path.to_string()));
                    }
                }
            }
        }
        Section::Financial => {
            put_patch(&mut body, "ibanNo", &edit.iban);
            put_patch(&mut body, "taxNo", &edit.tax_number);
            if !employment_dispatched {
                put_patch(&mut body, "grossSalary", &edit.gross_salary);
            }
            put_collection(&mut body, "allowances", &edit.allowances);
        }
        Section::Employment => {
            put_patch(&mut body, "jobTitle", &edit.job_title);
            put_patch(&mut body, "jobLevel", &edit.job_level);
            put_patch(&mut body, "departmentName", &edit.department);
            put_patch(&mut body, "startDate", &edit.start_date);
            put_patch(&mut body, "grossSalary", &edit.gross_salary);
        }
        Section::Contact => {
            put_collection(&mut body, "addresses", &edit.addresses);
            put_collection(&mut body, "phones", &edit.phones);
        }
        Section::Education => {
            put_collection(&mut body, "educations", &edit.educations);
        }
        Section::WorkExperience => {
            put_collection(&mut body, "experiences", &edit.work_experiences);
        }
        Section::Certifications => {
            put_collection(&mut body, "certifications", &edit.certifications);
        }
        Section::Documents => {
            if let Some(documents) = &edit.documents {
                let refs: Vec<DocumentRef> = documents
                    .iter()
                    .filter_map(|d| {
                        d.file.path().map(|path| DocumentRef {
                            title: d.title.clone(),
                            path: path.to_string(),
                        })
                    })
                    .collect();
                body.insert(
                    "documents".to_string(),
                    serde_json::to_value(refs).unwrap_or(Value::Null),
                );
            }
        }
    }

    if body.is_empty() {
        None
    } else {
        Some(Value::Object(body))
    }
}

/// The locally-derivable cache contribution of one dispatched section.
///
/// `departmentName` is resolved server-side to a department id, so the
/// employment contribution leaves `department` untouched; it stays stale
/// until the next full fetch.
fn section_patch(section: Section, edit: &EmployeeEdit, patch: &mut RecordPatch) {
    match section {
        Section::Personal => {
            patch.first_name = edit.first_name.clone();
            patch.last_name = edit.last_name.clone();
            patch.national_id = edit.national_id.clone();
            patch.birth_date = edit.birth_date.clone();
            patch.gender = edit.gender.clone();
            patch.marital_status = edit.marital_status.clone();
            patch.email = edit.email.clone();
            patch.photo_path = match &edit.photo {
                Patch::Keep => Patch::Keep,
                Patch::Clear => Patch::Clear,
                Patch::Set(file) => match file.path() {
                    Some(path) => Patch::Set(path.to_string()),
                    None => Patch::Keep,
                },
            };
        }
        Section::Financial => {
            patch.iban = edit.iban.clone();
            patch.tax_number = edit.tax_number.clone();
            patch.gross_salary = edit.gross_salary.clone();
            patch.allowances = edit.allowances.clone();
        }
        Section::Employment => {
            patch.job_title = edit.job_title.clone();
            patch.job_level = edit.job_level.clone();
            patch.start_date = edit.start_date.clone();
            patch.gross_salary = edit.gross_salary.clone();
        }
        Section::Contact => {
            patch.addresses = edit.addresses.clone();
            patch.phones = edit.phones.clone();
        }
        Section::Education => {
            patch.educations = edit.educations.clone();
        }
        Section::WorkExperience => {
            patch.work_experiences = edit.work_experiences.clone();
        }
        Section::Certifications => {
            patch.certifications = edit.certifications.clone();
        }
        Section::Documents => {
            if let Some(documents) = &edit.documents {
                patch.documents = Some(
                    documents
                        .iter()
                        .filter_map(|d| {
                            d.file.path().map(|path| DocumentRef {
                                title: d.title.clone(),
                                path: path.to_string(),
                            })
                        })
                        .collect(),
                );
            }
        }
    }
}

/// Partition the edit into section requests and dispatch them concurrently.
///
/// With a `hint`, only that section's field subset is considered. Returns
/// the optimistic cache patch covering exactly the dispatched sections.
pub async fn dispatch_sections<S>(
    store: &S,
    record_id: Uuid,
    hint: Option<Section>,
    edit: &EmployeeEdit,
) -> Result<RecordPatch, SubmitError>
where
    S: SectionStore + ?Sized,
{
    let targets: &[Section] = match &hint {
        Some(section) => std::slice::from_ref(section),
        None => &Section::ALL,
    };

    // Salary precedence needs to know up front whether employment is being
    // dispatched in this same submit
    let employment_dispatched = targets.contains(&Section::Employment)
        && section_body(Section::Employment, edit, false).is_some();

    let mut requests: Vec<(Section, Value)> = Vec::new();
    for &section in targets {
        if let Some(body) = section_body(section, edit, employment_dispatched) {
            requests.push((section, body));
        }
    }

    if requests.is_empty() {
        tracing::debug!(record_id = %record_id, "No non-empty sections; nothing dispatched");
        return Ok(RecordPatch::default());
    }

    let dispatched: Vec<Section> = requests.iter().map(|(s, _)| *s).collect();
    tracing::info!(
        record_id = %record_id,
        sections = ?dispatched.iter().map(|s| s.name()).collect::<Vec<_>>(),
        "Dispatching section updates"
    );

    // Fan-out, then wait for every request to settle so the aggregate can
    // name each failing section
    let outcomes = join_all(requests.into_iter().map(|(section, body)| async move {
        let outcome = store.persist_section(record_id, section.name(), body).await;
        (section, outcome)
    }))
    .await;

    let failures: Vec<SectionFailure> = outcomes
        .iter()
        .filter_map(|(section, outcome)| {
            outcome.as_ref().err().map(|e| SectionFailure {
                section: section.name(),
                reason: e.to_string(),
            })
        })
        .collect();

    if !failures.is_empty() {
        tracing::warn!(
            record_id = %record_id,
            failed = ?failures.iter().map(|f| f.section).collect::<Vec<_>>(),
            "Section persistence partially failed; committed sections remain"
        );
        return Err(SubmitError::Sections { failures });
    }

    let mut patch = RecordPatch::default();
    for section in dispatched {
        section_patch(section, edit, &mut patch);
    }
    Ok(patch)
}
