//! Data model for the reconciliation engine
//!
//! - `record` — the canonical employee snapshot and its nested collections
//! - `patch` — edit payloads, the keep/clear/set tri-state, file values
//! - `career` — career lifecycle events and the timeline baseline
//! - `upload` — the ticket contract for direct file transfers

pub mod career;
pub mod patch;
pub mod record;
pub mod upload;

pub use career::{CareerBaseline, CareerEvent, CareerEventKind, EventOrigin, JobTitle};
pub use patch::{DocumentEdit, EmployeeEdit, FileValue, Patch, RecordPatch};
pub use upload::UploadTicket;
pub use record::{
    Address, Allowance, Certification, DocumentRef, Education, EmployeeRecord, Phone,
    WorkExperience,
};
