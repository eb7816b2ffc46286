/// All record ids are 64-bit integers. Location ids are assigned at seed
/// time and stable across deployments; visitor ids are allocated at runtime.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
