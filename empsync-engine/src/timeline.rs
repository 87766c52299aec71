//! Career timeline synthesizer
//!
//! Pure transform from (event list, record baseline) to a display-ready,
//! newest-first timeline. Records that predate event capture have no
//! joined event; exactly one is synthesized from the baseline, tagged with
//! `EventOrigin::Synthesized`, and never persisted. Missing previous-state
//! fields degrade to placeholders, never to errors.

use empsync_common::model::{CareerBaseline, CareerEvent, CareerEventKind, EventOrigin, JobTitle};

/// Placeholder for missing previous title/department on the earliest event
const INITIAL_PLACEHOLDER: &str = "Initial";
/// Placeholder for missing salary values
const EMPTY_PLACEHOLDER: &str = "-";

/// One annotated, display-ready timeline element
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub event: CareerEvent,
    /// True only for the newest event after sorting
    pub is_latest: bool,
    /// Render the department comparison only when this is true
    pub department_changed: bool,
    pub previous_title_label: String,
    pub new_title_label: String,
    pub previous_department_label: String,
    pub new_department_label: String,
    pub previous_salary_label: String,
    pub new_salary_label: String,
}

fn title_label(title: &Option<JobTitle>, placeholder: &str) -> String {
    match title {
        Some(job) => match &job.level {
            Some(level) => format!("{} ({})", job.title, level),
            None => job.title.clone(),
        },
        None => placeholder.to_string(),
    }
}

fn department_label(department: &Option<String>, placeholder: &str) -> String {
    department
        .clone()
        .unwrap_or_else(|| placeholder.to_string())
}

fn salary_label(salary: Option<f64>) -> String {
    match salary {
        Some(amount) => format!("{:.2}", amount),
        None => EMPTY_PLACEHOLDER.to_string(),
    }
}

/// Build the synthesized joined event from the record baseline
fn joined_from_baseline(baseline: &CareerBaseline) -> Option<CareerEvent> {
    let start_date = baseline.start_date?;
    Some(CareerEvent {
        origin: EventOrigin::Synthesized,
        kind: CareerEventKind::Joined,
        effective_date: start_date,
        event_date: None,
        previous_title: None,
        new_title: baseline.job_title.as_ref().map(|title| JobTitle {
            title: title.clone(),
            level: baseline.job_level.clone(),
        }),
        previous_department: None,
        new_department: baseline.department.clone(),
        previous_salary: None,
        new_salary: baseline.gross_salary,
        justification: None,
        notes: None,
    })
}

/// Derive the ordered career timeline, newest first.
///
/// Synthesis is idempotent: an existing joined event (however it was
/// recorded upstream) suppresses the baseline-derived one. Ties on
/// `effective_date` keep input order; the synthesized event is appended
/// last and therefore always sorts as the oldest.
pub fn synthesize_timeline(
    events: &[CareerEvent],
    baseline: &CareerBaseline,
) -> Vec<TimelineEntry> {
    let mut all: Vec<CareerEvent> = events.to_vec();

    let has_joined = all.iter().any(|e| e.kind == CareerEventKind::Joined);
    if !has_joined {
        if let Some(joined) = joined_from_baseline(baseline) {
            tracing::debug!(
                effective_date = %joined.effective_date,
                "Synthesized joined event from record baseline"
            );
            all.push(joined);
        }
    }

    // Stable: equal dates keep their relative input order
    all.sort_by(|a, b| b.effective_date.cmp(&a.effective_date));

    all.into_iter()
        .enumerate()
        .map(|(index, event)| {
            let department_changed = event.previous_department != event.new_department;
            TimelineEntry {
                is_latest: index == 0,
                department_changed,
                previous_title_label: title_label(&event.previous_title, INITIAL_PLACEHOLDER),
                new_title_label: title_label(&event.new_title, EMPTY_PLACEHOLDER),
                previous_department_label: department_label(
                    &event.previous_department,
                    INITIAL_PLACEHOLDER,
                ),
                new_department_label: department_label(&event.new_department, EMPTY_PLACEHOLDER),
                previous_salary_label: salary_label(event.previous_salary),
                new_salary_label: salary_label(event.new_salary),
                event,
            }
        })
        .collect()
}
