//! Composition root
//!
//! Owns the detail cache and the directory client, and sequences the
//! submit pipeline: resolve file uploads, dispatch section updates, merge
//! the optimistic patch. Reads follow stale-while-revalidate: a cached
//! snapshot is served immediately while a background full fetch replaces
//! it. In-flight operations are never cancelled; a late response races the
//! cache under last-write-wins.

use crate::cache::DetailCache;
use crate::client::DirectoryClient;
use crate::error::SubmitError;
use crate::sections::Section;
use crate::timeline::{self, TimelineEntry};
use crate::{sections, upload};
use empsync_common::model::{EmployeeEdit, EmployeeRecord};
use std::sync::Arc;
use uuid::Uuid;

pub struct ProfileEngine<C> {
    cache: Arc<DetailCache>,
    client: Arc<C>,
}

impl<C> ProfileEngine<C>
where
    C: DirectoryClient + Send + Sync + 'static,
{
    pub fn new(client: Arc<C>) -> Self {
        Self {
            cache: Arc::new(DetailCache::new()),
            client,
        }
    }

    pub fn cache(&self) -> &DetailCache {
        &self.cache
    }

    /// Persist one edited profile.
    ///
    /// Uploads complete before any section request is dispatched; a single
    /// upload failure aborts the submit naming the field. Section dispatch
    /// is fail-if-any-fails with no rollback; after a partial failure the
    /// caller recovers by resubmitting (idempotent per section) or calling
    /// [`refresh`](Self::refresh) for canonical state.
    pub async fn submit_edit(
        &self,
        record_id: Uuid,
        hint: Option<Section>,
        mut edit: EmployeeEdit,
    ) -> Result<(), SubmitError> {
        upload::resolve_assets(&mut edit, self.client.as_ref()).await?;

        let patch =
            sections::dispatch_sections(self.client.as_ref(), record_id, hint, &edit).await?;

        // Only locally-derivable fields; denormalized ones wait for the
        // next full fetch
        self.cache.merge(record_id, &patch).await;
        Ok(())
    }

    /// Record snapshot, stale-while-revalidate.
    ///
    /// A cache hit returns immediately and spawns a background refetch
    /// whose result wins via `put`. A miss fetches in the foreground.
    pub async fn load(&self, record_id: Uuid) -> Result<EmployeeRecord, SubmitError> {
        if let Some(entry) = self.cache.get(record_id).await {
            tracing::debug!(record_id = %record_id, fetched_at = %entry.fetched_at, "Serving cached snapshot");

            let cache = Arc::clone(&self.cache);
            let client = Arc::clone(&self.client);
            tokio::spawn(async move {
                match client.fetch_record(record_id).await {
                    Ok(record) => cache.put(record_id, record).await,
                    Err(e) => {
                        tracing::warn!(record_id = %record_id, error = %e, "Background refresh failed")
                    }
                }
            });

            return Ok(entry.data);
        }

        self.refresh(record_id).await
    }

    /// Forced full fetch, bypassing the cache; the result replaces any
    /// cached entry atomically.
    pub async fn refresh(&self, record_id: Uuid) -> Result<EmployeeRecord, SubmitError> {
        let record = self.client.fetch_record(record_id).await?;
        self.cache.put(record_id, record.clone()).await;
        Ok(record)
    }

    /// Display-ready career timeline for one record, newest first
    pub async fn timeline(&self, record_id: Uuid) -> Result<Vec<TimelineEntry>, SubmitError> {
        let record = self.load(record_id).await?;
        Ok(timeline::synthesize_timeline(
            &record.career_events,
            &record.career_baseline(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockClient;
    use chrono::NaiveDate;
    use empsync_common::model::{DocumentEdit, FileValue, Patch};
    use std::time::Duration;

    fn sample_record(id: Uuid) -> EmployeeRecord {
        EmployeeRecord {
            id,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            national_id: None,
            birth_date: None,
            gender: None,
            marital_status: None,
            email: Some("ada@example.com".to_string()),
            photo_path: None,
            job_title: Some("Engineer".to_string()),
            job_level: Some("II".to_string()),
            department: Some("Platform".to_string()),
            start_date: NaiveDate::from_ymd_opt(2022, 1, 10),
            iban: None,
            tax_number: None,
            gross_salary: Some(30000.0),
            allowances: Vec::new(),
            addresses: Vec::new(),
            phones: Vec::new(),
            educations: Vec::new(),
            work_experiences: Vec::new(),
            certifications: Vec::new(),
            documents: Vec::new(),
            career_events: Vec::new(),
        }
    }

    /// Opt-in test logging: RUST_LOG=debug cargo test -- --nocapture
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }

    fn pending(file_name: &str) -> FileValue {
        FileValue::Pending {
            file_name: file_name.to_string(),
            bytes: vec![0xde, 0xad],
        }
    }

    #[tokio::test]
    async fn upload_failure_prevents_all_section_dispatch() {
        // Two files; the second one's ticket request fails
        let mut client = MockClient::new();
        client.failing_ticket_fields = vec!["documents[1]".to_string()];
        let client = Arc::new(client);
        let engine = ProfileEngine::new(Arc::clone(&client));

        let edit = EmployeeEdit {
            email: Patch::Set("new@example.com".to_string()),
            documents: Some(vec![
                DocumentEdit {
                    title: "CV".to_string(),
                    file: pending("cv.pdf"),
                },
                DocumentEdit {
                    title: "Diploma".to_string(),
                    file: pending("diploma.pdf"),
                },
            ]),
            ..EmployeeEdit::default()
        };

        let err = engine
            .submit_edit(Uuid::new_v4(), None, edit)
            .await
            .unwrap_err();

        match err {
            SubmitError::Upload { field, .. } => assert_eq!(field, "documents[1]"),
            other => panic!("expected upload error, got {:?}", other),
        }
        // No section persistence call was ever dispatched
        assert!(client.persisted_sections().is_empty());
    }

    #[tokio::test]
    async fn successful_submit_merges_into_cached_snapshot() {
        let id = Uuid::new_v4();
        let client = Arc::new(MockClient::with_record(sample_record(id)));
        let engine = ProfileEngine::new(Arc::clone(&client));

        // Prime the cache with a foreground fetch
        engine.load(id).await.unwrap();

        let edit = EmployeeEdit {
            email: Patch::Set("ada@new.example".to_string()),
            job_title: Patch::Set("Senior Engineer".to_string()),
            department: Patch::Set("Research".to_string()),
            ..EmployeeEdit::default()
        };
        engine.submit_edit(id, None, edit).await.unwrap();

        let entry = engine.cache().get(id).await.unwrap();
        assert_eq!(entry.data.email.as_deref(), Some("ada@new.example"));
        assert_eq!(entry.data.job_title.as_deref(), Some("Senior Engineer"));
        // Denormalized server-side; stays stale until the next full fetch
        assert_eq!(entry.data.department.as_deref(), Some("Platform"));
    }

    #[tokio::test]
    async fn submit_without_cached_entry_is_still_fine() {
        let id = Uuid::new_v4();
        let client = Arc::new(MockClient::new());
        let engine = ProfileEngine::new(Arc::clone(&client));

        let edit = EmployeeEdit {
            email: Patch::Set("ada@new.example".to_string()),
            ..EmployeeEdit::default()
        };
        engine.submit_edit(id, None, edit).await.unwrap();

        // Merge against a cold cache is a no-op, not an error
        assert!(engine.cache().get(id).await.is_none());
    }

    #[tokio::test]
    async fn load_serves_stale_and_revalidates_in_background() {
        init_tracing();
        let id = Uuid::new_v4();
        let client = Arc::new(MockClient::with_record(sample_record(id)));
        let engine = ProfileEngine::new(Arc::clone(&client));

        // First load: foreground fetch
        let first = engine.load(id).await.unwrap();
        assert_eq!(first.email.as_deref(), Some("ada@example.com"));
        assert_eq!(*client.fetch_count.lock().unwrap(), 1);

        // The server moves on
        let mut newer = sample_record(id);
        newer.email = Some("ada@changed.example".to_string());
        *client.record.lock().unwrap() = Some(newer);

        // Second load: stale snapshot served immediately
        let second = engine.load(id).await.unwrap();
        assert_eq!(second.email.as_deref(), Some("ada@example.com"));

        // The background refetch wins via put
        tokio::time::sleep(Duration::from_millis(50)).await;
        let entry = engine.cache().get(id).await.unwrap();
        assert_eq!(entry.data.email.as_deref(), Some("ada@changed.example"));
        assert_eq!(*client.fetch_count.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn timeline_synthesizes_from_fetched_record() {
        let id = Uuid::new_v4();
        let client = Arc::new(MockClient::with_record(sample_record(id)));
        let engine = ProfileEngine::new(Arc::clone(&client));

        let timeline = engine.timeline(id).await.unwrap();

        assert_eq!(timeline.len(), 1);
        assert_eq!(
            timeline[0].event.kind,
            empsync_common::model::CareerEventKind::Joined
        );
        assert!(timeline[0].event.origin.is_synthesized());
        assert!(timeline[0].is_latest);
    }

    #[tokio::test]
    async fn fetch_error_for_unknown_record() {
        let client = Arc::new(MockClient::new());
        let engine = ProfileEngine::new(client);

        let err = engine.load(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, SubmitError::Fetch(_)));
    }
}
