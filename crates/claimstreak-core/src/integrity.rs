//! Corruption detection for stored records and the backup transport codec.
//!
//! The tag is a 32-bit rolling checksum. It catches truncated writes and
//! hand-edited storage, nothing more; it is not a signature.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::streak::{BadgeState, ClaimRecord};
use crate::user::UserKey;

/// Version written into every backup.
pub const BACKUP_FORMAT_VERSION: &str = "1.0";

/// Fields covered by the tag, in serialization order.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TaggedFields<'a> {
    current_streak: u32,
    longest_streak: u32,
    last_claim_date: Option<NaiveDate>,
    total_claims: u32,
    badges: &'a [BadgeState],
}

impl<'a> From<&'a ClaimRecord> for TaggedFields<'a> {
    fn from(record: &'a ClaimRecord) -> Self {
        Self {
            current_streak: record.current_streak,
            longest_streak: record.longest_streak,
            last_claim_date: record.last_claim_date,
            total_claims: record.total_claims,
            badges: &record.badges,
        }
    }
}

/// Checksum over every field except `integrity_tag`.
pub fn compute_tag(record: &ClaimRecord) -> String {
    // Serializing plain integers, dates and strings cannot fail.
    let canonical = serde_json::to_string(&TaggedFields::from(record)).unwrap_or_default();
    rolling_hash(&canonical).to_string()
}

/// Recompute the tag for `record` and compare it with `stored_tag`.
pub fn verify(record: &ClaimRecord, stored_tag: &str) -> bool {
    compute_tag(record) == stored_tag
}

fn rolling_hash(text: &str) -> i32 {
    text.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}

/// Transportable snapshot of one user's record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupPayload {
    pub user_key: UserKey,
    pub record: ClaimRecord,
    pub created_at: DateTime<Utc>,
    pub format_version: String,
}

impl BackupPayload {
    pub fn new(user_key: UserKey, record: ClaimRecord, created_at: DateTime<Utc>) -> Self {
        Self {
            user_key,
            record,
            created_at,
            format_version: BACKUP_FORMAT_VERSION.to_string(),
        }
    }
}

/// Encode a payload as a single line of base64 text.
pub fn encode_backup(payload: &BackupPayload) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(payload)?;
    Ok(STANDARD.encode(json))
}

/// Decode and validate a backup code.
///
/// Rejects anything that is not a complete, self-consistent record whose
/// integrity tag still matches, so a garbled code can never be applied.
pub fn decode_backup(code: &str) -> Result<BackupPayload, DecodeError> {
    let bytes = STANDARD.decode(code.trim())?;
    let text = String::from_utf8(bytes)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;

    let obj = value
        .as_object()
        .ok_or(DecodeError::MissingField("userKey"))?;
    match obj.get("userKey") {
        None | Some(serde_json::Value::Null) => return Err(DecodeError::MissingField("userKey")),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => {
            return Err(DecodeError::EmptyUserKey)
        }
        Some(_) => {}
    }
    if matches!(obj.get("record"), None | Some(serde_json::Value::Null)) {
        return Err(DecodeError::MissingField("record"));
    }

    let mut payload: BackupPayload = serde_json::from_value(value)?;

    let major = payload.format_version.split('.').next().unwrap_or_default();
    let supported = BACKUP_FORMAT_VERSION.split('.').next().unwrap_or_default();
    if major != supported {
        return Err(DecodeError::UnsupportedVersion(payload.format_version));
    }

    if !payload.record.is_intact() {
        return Err(DecodeError::IntegrityMismatch);
    }
    payload.record.reconcile_badges();
    payload
        .record
        .check_invariants()
        .map_err(DecodeError::InvalidRecord)?;
    payload.record.retag();
    Ok(payload)
}
