/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC and server-assigned.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Ordering position of a scene within its tour (`scenes.sort_order`).
pub type SceneOrder = i32;
