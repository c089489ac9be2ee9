//! Database row types that never leave the DB layer as-is.
//! Everything else maps straight into herspace-types models.

use uuid::Uuid;

pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Who a community reaction belongs to. Exactly one of the two columns is
/// set on every reaction row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactorKey {
    User(Uuid),
    Session(String),
}
