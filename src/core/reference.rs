//! Day-scoped reference records and the key they are stored under

use crate::core::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Day boundaries are taken in India Standard Time wherever the job runs.
pub const REFERENCE_TZ: Tz = chrono_tz::Asia::Kolkata;

/// How long a reference record lives after it is created.
pub const RETENTION_HOURS: i64 = 14;

const DAY_FORMAT: &str = "%a %b %-d";

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    #[serde(rename = "hash")]
    pub key: String,
    #[serde(rename = "currency_value")]
    pub rate: f32,
    /// Unix seconds after which the record no longer counts.
    pub expires_at: i64,
}

impl ReferenceRecord {
    pub fn new(key: String, rate: f32, now: DateTime<Utc>) -> Self {
        Self {
            key,
            rate,
            expires_at: expiry_from(now),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now.timestamp()
    }
}

/// Persistence for reference records.
///
/// `get` returns `Ok(None)` when no record exists for the key.
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<ReferenceRecord>>;
    async fn put(&self, record: ReferenceRecord) -> Result<()>;
}

pub fn expiry_from(now: DateTime<Utc>) -> i64 {
    (now + Duration::hours(RETENTION_HOURS)).timestamp()
}

/// Key of the reference record for the calendar day containing `now`.
pub fn daily_key<T: TimeZone>(now: &DateTime<T>) -> String {
    let local_day = now
        .with_timezone(&REFERENCE_TZ)
        .format(DAY_FORMAT)
        .to_string();
    fnv1a_32(local_day.as_bytes()).to_string()
}

fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}
