//! Career lifecycle events
//!
//! Events are immutable once recorded; there is no edit or delete path in
//! this engine. A synthesized joined event (produced by the timeline
//! synthesizer when a record predates event capture) carries an explicit
//! origin tag and is never persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of career lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CareerEventKind {
    /// Initial hire. Some upstream systems record this as HIRED.
    #[serde(alias = "HIRED")]
    Joined,
    Promotion,
    Demotion,
    Transfer,
    SalaryAdjustment,
    RoleChange,
}

/// Whether an event was recorded server-side or synthesized locally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOrigin {
    /// Recorded in the directory service under this id
    Persisted { id: Uuid },
    /// Derived from the record baseline; never written back
    Synthesized,
}

impl EventOrigin {
    pub fn is_synthesized(&self) -> bool {
        matches!(self, EventOrigin::Synthesized)
    }
}

/// Job title with optional level/grade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobTitle {
    pub title: String,
    pub level: Option<String>,
}

/// One career lifecycle event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CareerEventWire", into = "CareerEventWire")]
pub struct CareerEvent {
    pub origin: EventOrigin,
    pub kind: CareerEventKind,
    /// Date the change takes effect (drives timeline ordering)
    pub effective_date: NaiveDate,
    /// Date the event was recorded, when known
    pub event_date: Option<NaiveDate>,
    pub previous_title: Option<JobTitle>,
    pub new_title: Option<JobTitle>,
    pub previous_department: Option<String>,
    pub new_department: Option<String>,
    pub previous_salary: Option<f64>,
    pub new_salary: Option<f64>,
    pub justification: Option<String>,
    pub notes: Option<String>,
}

/// Wire shape: persisted events carry a flat `id`; a missing id marks a
/// synthesized event (which should never appear on the wire inbound).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CareerEventWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<Uuid>,
    #[serde(rename = "type")]
    kind: CareerEventKind,
    effective_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    event_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    previous_title: Option<JobTitle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    new_title: Option<JobTitle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    previous_department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    new_department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    previous_salary: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    new_salary: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    justification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

impl From<CareerEventWire> for CareerEvent {
    fn from(wire: CareerEventWire) -> Self {
        CareerEvent {
            origin: match wire.id {
                Some(id) => EventOrigin::Persisted { id },
                None => EventOrigin::Synthesized,
            },
            kind: wire.kind,
            effective_date: wire.effective_date,
            event_date: wire.event_date,
            previous_title: wire.previous_title,
            new_title: wire.new_title,
            previous_department: wire.previous_department,
            new_department: wire.new_department,
            previous_salary: wire.previous_salary,
            new_salary: wire.new_salary,
            justification: wire.justification,
            notes: wire.notes,
        }
    }
}

impl From<CareerEvent> for CareerEventWire {
    fn from(event: CareerEvent) -> Self {
        CareerEventWire {
            id: match event.origin {
                EventOrigin::Persisted { id } => Some(id),
                EventOrigin::Synthesized => None,
            },
            kind: event.kind,
            effective_date: event.effective_date,
            event_date: event.event_date,
            previous_title: event.previous_title,
            new_title: event.new_title,
            previous_department: event.previous_department,
            new_department: event.new_department,
            previous_salary: event.previous_salary,
            new_salary: event.new_salary,
            justification: event.justification,
            notes: event.notes,
        }
    }
}

/// Current-state snapshot fields the timeline synthesizer falls back to
/// when a record has no recorded joined event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CareerBaseline {
    pub job_title: Option<String>,
    pub job_level: Option<String>,
    pub department: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub gross_salary: Option<f64>,
}

impl super::record::EmployeeRecord {
    /// Baseline for timeline synthesis, taken from the current snapshot
    pub fn career_baseline(&self) -> CareerBaseline {
        CareerBaseline {
            job_title: self.job_title.clone(),
            job_level: self.job_level.clone(),
            department: self.department.clone(),
            start_date: self.start_date,
            gross_salary: self.gross_salary,
        }
    }
}
