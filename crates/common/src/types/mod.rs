use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Snapshot of store bookkeeping reported by `/stats`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StoreStats {
    pub posts: usize,
    pub store_created_at: DateTime<Utc>,
    pub uptime_secs: i64,
}
