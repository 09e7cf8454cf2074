use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a support ticket. Stored in Postgres as `support_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "support_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum SupportStatus {
    Pending,
    Rejected,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SupportRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub message: String,
    pub status: SupportStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&SupportStatus::Pending).unwrap(),
            "\"PENDING\""
        );
        let parsed: SupportStatus = serde_json::from_str("\"RESOLVED\"").unwrap();
        assert_eq!(parsed, SupportStatus::Resolved);
    }
}
