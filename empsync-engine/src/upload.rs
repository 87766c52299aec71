//! Asset upload orchestrator
//!
//! Resolves every file-valued field in an edit payload into a committed
//! storage path before any section request is dispatched: the persistence
//! endpoints accept path references, never raw bytes. All uploads for one
//! submit run in parallel and fail fast; a single failure aborts the whole
//! submit and names the failing field.

use crate::client::AssetStore;
use crate::error::SubmitError;
use chrono::Utc;
use empsync_common::model::{EmployeeEdit, FileValue, Patch};
use futures::future::try_join_all;

/// Which file-valued leaf of the edit a resolved path belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Photo,
    Document(usize),
}

struct PendingAsset {
    slot: Slot,
    field: String,
    file_name: String,
    bytes: Vec<u8>,
}

/// Collect every `Pending` file value with its wire field name
fn collect_pending(edit: &EmployeeEdit) -> Vec<PendingAsset> {
    let mut pending = Vec::new();

    if let Some(FileValue::Pending { file_name, bytes }) = edit.photo.value() {
        pending.push(PendingAsset {
            slot: Slot::Photo,
            field: "photo".to_string(),
            file_name: file_name.clone(),
            bytes: bytes.clone(),
        });
    }

    if let Some(documents) = &edit.documents {
        for (index, document) in documents.iter().enumerate() {
            if let FileValue::Pending { file_name, bytes } = &document.file {
                pending.push(PendingAsset {
                    slot: Slot::Document(index),
                    field: format!("documents[{}]", index),
                    file_name: file_name.clone(),
                    bytes: bytes.clone(),
                });
            }
        }
    }

    pending
}

/// Upload every newly-attached file and rewrite its value in place to the
/// ticket's committed path. Already-stored values pass through untouched.
///
/// Returns before any section dispatch can happen; on error, no file slot
/// has been rewritten.
pub async fn resolve_assets<A>(edit: &mut EmployeeEdit, store: &A) -> Result<(), SubmitError>
where
    A: AssetStore + ?Sized,
{
    let pending = collect_pending(edit);
    if pending.is_empty() {
        return Ok(());
    }

    tracing::debug!(count = pending.len(), "Resolving pending file uploads");

    let uploads = pending.into_iter().map(|asset| async move {
        let ticket = store
            .request_ticket(&asset.field, &asset.file_name)
            .await
            .map_err(|e| SubmitError::Upload {
                field: asset.field.clone(),
                reason: e.to_string(),
            })?;

        // Single-use tickets; an expired one cannot be transferred against
        if ticket.is_expired(Utc::now()) {
            return Err(SubmitError::Upload {
                field: asset.field.clone(),
                reason: format!("ticket expired at {}", ticket.expires_at),
            });
        }

        store
            .transfer(&ticket, asset.bytes)
            .await
            .map_err(|e| SubmitError::Upload {
                field: asset.field.clone(),
                reason: e.to_string(),
            })?;

        tracing::info!(field = %asset.field, path = %ticket.committed_path, "Upload resolved");
        Ok((asset.slot, ticket.committed_path))
    });

    // Fail-fast fan-out: the first upload error aborts the submit
    let resolved = try_join_all(uploads).await?;

    for (slot, path) in resolved {
        match slot {
            Slot::Photo => {
                edit.photo = Patch::Set(FileValue::Stored { path });
            }
            Slot::Document(index) => {
                if let Some(documents) = &mut edit.documents {
                    if let Some(document) = documents.get_mut(index) {
                        document.file = FileValue::Stored { path };
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockClient;
    use empsync_common::model::DocumentEdit;

    fn pending(file_name: &str) -> FileValue {
        FileValue::Pending {
            file_name: file_name.to_string(),
            bytes: vec![1, 2, 3],
        }
    }

    #[tokio::test]
    async fn resolves_photo_and_new_documents_in_place() {
        let client = MockClient::new();
        let mut edit = EmployeeEdit {
            photo: Patch::Set(pending("me.jpg")),
            documents: Some(vec![
                DocumentEdit {
                    title: "Contract".to_string(),
                    file: FileValue::Stored {
                        path: "/files/contract.pdf".to_string(),
                    },
                },
                DocumentEdit {
                    title: "Diploma".to_string(),
                    file: pending("diploma.pdf"),
                },
            ]),
            ..EmployeeEdit::default()
        };

        resolve_assets(&mut edit, &client).await.unwrap();

        assert_eq!(
            edit.photo.value().and_then(FileValue::path),
            Some("/files/me.jpg")
        );
        let documents = edit.documents.as_ref().unwrap();
        // Existing entry passes through unchanged
        assert_eq!(documents[0].file.path(), Some("/files/contract.pdf"));
        // New entry rewritten to the committed path
        assert_eq!(documents[1].file.path(), Some("/files/diploma.pdf"));

        // Only the new file was transferred
        let transfers = client.transfers.lock().unwrap();
        assert_eq!(transfers.len(), 2);
        assert!(transfers.contains(&"/files/me.jpg".to_string()));
        assert!(transfers.contains(&"/files/diploma.pdf".to_string()));
    }

    #[tokio::test]
    async fn no_pending_files_is_a_fast_no_op() {
        let client = MockClient::new();
        let mut edit = EmployeeEdit {
            first_name: Patch::Set("Ada".to_string()),
            ..EmployeeEdit::default()
        };

        resolve_assets(&mut edit, &client).await.unwrap();

        assert!(client.transfers.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_ticket_names_the_field() {
        let mut client = MockClient::new();
        client.failing_ticket_fields = vec!["documents[1]".to_string()];

        let mut edit = EmployeeEdit {
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

        let err = resolve_assets(&mut edit, &client).await.unwrap_err();
        match err {
            SubmitError::Upload { field, .. } => assert_eq!(field, "documents[1]"),
            other => panic!("expected upload error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn expired_ticket_fails_the_submit() {
        let mut client = MockClient::new();
        client.expired_ticket_fields = vec!["photo".to_string()];

        let mut edit = EmployeeEdit {
            photo: Patch::Set(pending("me.jpg")),
            ..EmployeeEdit::default()
        };

        let err = resolve_assets(&mut edit, &client).await.unwrap_err();
        match err {
            SubmitError::Upload { field, reason } => {
                assert_eq!(field, "photo");
                assert!(reason.contains("expired"));
            }
            other => panic!("expected upload error, got {:?}", other),
        }
        // Nothing was transferred against the expired ticket
        assert!(client.transfers.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_transfer_names_the_field() {
        let mut client = MockClient::new();
        client.failing_transfer_fields = vec!["photo".to_string()];

        let mut edit = EmployeeEdit {
            photo: Patch::Set(pending("me.jpg")),
            ..EmployeeEdit::default()
        };

        let err = resolve_assets(&mut edit, &client).await.unwrap_err();
        match err {
            SubmitError::Upload { field, .. } => assert_eq!(field, "photo"),
            other => panic!("expected upload error, got {:?}", other),
        }
    }
}
