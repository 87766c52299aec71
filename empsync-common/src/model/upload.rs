//! Upload ticket contract
//!
//! One ticket per file, single-use. The committed path becomes valid once
//! the byte transfer to the target succeeds; there is no separate commit
//! call. An expired ticket fails the whole submit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Short-lived authorization for one direct file transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicket {
    /// Where the file bytes are sent
    pub transfer_target: String,
    /// Storage path the file will be addressable under after transfer
    pub committed_path: String,
    pub expires_at: DateTime<Utc>,
}

impl UploadTicket {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn expiry_is_inclusive_of_the_deadline() {
        let now = Utc::now();
        let ticket = UploadTicket {
            transfer_target: "https://store.example.com/t/abc".to_string(),
            committed_path: "/files/abc.pdf".to_string(),
            expires_at: now,
        };
        assert!(ticket.is_expired(now));
        assert!(!ticket.is_expired(now - Duration::seconds(1)));
    }
}
