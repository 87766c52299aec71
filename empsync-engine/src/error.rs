//! Submit failure taxonomy
//!
//! Upload failures abort a submit before any section request is dispatched
//! and name the failing field. Section failures aggregate every rejected
//! section; sections that already committed server-side stay committed
//! (there is no compensating rollback), so callers restore a consistent
//! view by refetching the record.

use thiserror::Error;

/// One rejected section within an otherwise-dispatched submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionFailure {
    /// Section name as used on the wire (e.g. "financial")
    pub section: &'static str,
    pub reason: String,
}

impl std::fmt::Display for SectionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.section, self.reason)
    }
}

/// Why a profile submit failed
#[derive(Debug, Error)]
pub enum SubmitError {
    /// A file field failed ticket acquisition or transfer; no section
    /// request was dispatched
    #[error("upload failed for field '{field}': {reason}")]
    Upload { field: String, reason: String },

    /// One or more section requests were rejected; the rest committed
    #[error("section persistence failed: {}", format_failures(.failures))]
    Sections { failures: Vec<SectionFailure> },

    /// Full-record fetch failed
    #[error("record fetch failed: {0}")]
    Fetch(#[from] empsync_common::Error),
}

fn format_failures(failures: &[SectionFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_names_every_failing_section() {
        let err = SubmitError::Sections {
            failures: vec![
                SectionFailure {
                    section: "financial",
                    reason: "HTTP 422".to_string(),
                },
                SectionFailure {
                    section: "documents",
                    reason: "HTTP 500".to_string(),
                },
            ],
        };
        let text = err.to_string();
        assert!(text.contains("financial"));
        assert!(text.contains("documents"));
    }

    #[test]
    fn upload_error_names_the_field() {
        let err = SubmitError::Upload {
            field: "documents[2]".to_string(),
            reason: "ticket expired".to_string(),
        };
        assert!(err.to_string().contains("documents[2]"));
    }
}
