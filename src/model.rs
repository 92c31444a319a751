use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Store-assigned metadata shared by every persisted record, composed by value
/// into the entity structs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RecordMeta {
    pub id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[cfg(test)]
impl RecordMeta {
    /// Metadata stand-in for tests that never touch the store.
    pub fn test_stub(id: i64) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id,
            created_at: now,
            updated_at: now,
        }
    }
}
