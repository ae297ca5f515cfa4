//! Storage, backup and cooldown behaviour against real on-disk backends.

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use claimstreak_core::cooldown::ChainClaimStatus;
use claimstreak_core::{
    decode_backup, ClaimRecord, ClaimTracker, CooldownGate, DecodeError, DurableStore,
    FlatFileStore, KeyValueStore, SaveOutcome, SqliteStore, StoreTier, StreakEngine, UserKey,
};
use proptest::prelude::*;
use std::sync::Arc;
use tempfile::TempDir;

const PREFIX: &str = "streak_data_";

struct Disk {
    _dir: TempDir,
    primary: Arc<SqliteStore>,
    fallback: Arc<FlatFileStore>,
    store: DurableStore,
}

fn disk() -> Disk {
    let dir = tempfile::tempdir().unwrap();
    let primary = Arc::new(SqliteStore::open_at(dir.path().join("claims.db")).unwrap());
    let fallback = Arc::new(FlatFileStore::at(dir.path().join("fallback.json")));
    let store = DurableStore::new(Box::new(primary.clone()), Box::new(fallback.clone()));
    Disk {
        _dir: dir,
        primary,
        fallback,
        store,
    }
}

fn at(day: u32, hour: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(2 * 3600)
        .unwrap()
        .with_ymd_and_hms(2025, 3, day, hour, 0, 0)
        .unwrap()
}

fn claimed(days: u32) -> ClaimRecord {
    let engine = StreakEngine::new();
    (1..=days).fold(ClaimRecord::fresh(), |record, day| {
        engine.apply_claim(&record, at(day, 12)).into_record()
    })
}

#[test]
fn sqlite_and_flat_file_hold_identical_copies() {
    let disk = disk();
    let user = UserKey::parse("0xFeed").unwrap();
    assert_eq!(disk.store.save(&user, &claimed(3)), SaveOutcome::Both);

    let key = user.storage_key(PREFIX);
    let primary = disk.primary.get(&key).unwrap().unwrap();
    let fallback = disk.fallback.get(&key).unwrap().unwrap();
    assert_eq!(primary, fallback);
    assert!(std::fs::read_to_string(disk.fallback.path())
        .unwrap()
        .contains("streak_data_0xfeed"));
}

#[test]
fn tampered_sqlite_row_is_served_from_flat_file() {
    let disk = disk();
    let user = UserKey::parse("0xFeed").unwrap();
    disk.store.save(&user, &claimed(5));

    let key = user.storage_key(PREFIX);
    let raw = disk.primary.get(&key).unwrap().unwrap();
    let mut json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    json["currentStreak"] = serde_json::json!(99);
    json["longestStreak"] = serde_json::json!(99);
    json["totalClaims"] = serde_json::json!(99);
    disk.primary.set(&key, &json.to_string()).unwrap();

    let (record, tier) = disk.store.load_with_tier(&user).unwrap();
    assert_eq!(tier, StoreTier::Fallback);
    assert_eq!(record.current_streak, 5);
}

#[test]
fn clear_all_leaves_fallback_copy_reachable() {
    let disk = disk();
    let user = UserKey::parse("0xFeed").unwrap();
    disk.store.save(&user, &claimed(2));

    disk.store.clear_all();
    assert!(disk.primary.is_empty().unwrap());
    let (record, tier) = disk.store.load_with_tier(&user).unwrap();
    assert_eq!(tier, StoreTier::Fallback);
    assert_eq!(record.current_streak, 2);
}

#[test]
fn unreadable_flat_file_does_not_block_primary() {
    let disk = disk();
    let user = UserKey::parse("0xFeed").unwrap();
    disk.store.save(&user, &claimed(2));
    std::fs::write(disk.fallback.path(), "not json").unwrap();

    assert_eq!(disk.store.save(&user, &claimed(3)), SaveOutcome::PrimaryOnly);
    assert_eq!(disk.store.load(&user).unwrap().current_streak, 3);
}

#[test]
fn backup_moves_a_record_between_installations() {
    let source = disk();
    let target = disk();
    let user = UserKey::parse("0xFeed").unwrap();
    source.store.save(&user, &claimed(7));

    let tracker_code = claimstreak_core::BackupWorkflow::new(&source.store)
        .export_backup(&user, Utc::now())
        .unwrap();
    let payload = decode_backup(&tracker_code).unwrap();
    assert_eq!(payload.format_version, "1.0");
    assert_eq!(payload.user_key, user);

    let outcome = claimstreak_core::BackupWorkflow::new(&target.store).import_backup(&tracker_code);
    assert!(outcome.success);
    let restored = target.store.load(&user).unwrap();
    assert_eq!(restored.current_streak, 7);
    assert!(restored.badge("weekly_warrior").unwrap().earned);
}

#[test]
fn tampered_backup_is_rejected() {
    let store = disk();
    let user = UserKey::parse("0xFeed").unwrap();
    store.store.save(&user, &claimed(2));
    let code = claimstreak_core::BackupWorkflow::new(&store.store)
        .export_backup(&user, Utc::now())
        .unwrap();

    use base64::Engine as _;
    let bytes = base64::engine::general_purpose::STANDARD.decode(&code).unwrap();
    let mut json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    json["record"]["totalClaims"] = serde_json::json!(500);
    let forged = base64::engine::general_purpose::STANDARD.encode(json.to_string());

    assert!(matches!(
        decode_backup(&forged),
        Err(DecodeError::IntegrityMismatch)
    ));
}

#[test]
fn cooldown_is_independent_of_streak_days() {
    let tracker = ClaimTracker::in_memory();
    let user = UserKey::parse("0xFeed").unwrap();

    // 23:00 claim; next local day starts an hour later but the cooldown
    // still has 23 hours to run.
    tracker.record_claim(&user, at(1, 23));
    let next_morning = at(2, 0).with_timezone(&Utc);
    let eligibility = tracker.check_eligibility(&user, next_morning);
    assert!(!eligibility.eligible);
    assert_eq!(eligibility.remaining_secs, Duration::hours(23).num_seconds());
    assert!(!tracker.status(&user, at(2, 0)).claimed_today);

    tracker.reset_cooldown(&user).unwrap();
    assert!(tracker.check_eligibility(&user, next_morning).eligible);
    assert_eq!(tracker.load_or_fresh(&user).current_streak, 1);
}

#[test]
fn chain_status_overrides_local_timer() {
    let dir = tempfile::tempdir().unwrap();
    let gate = CooldownGate::new(FlatFileStore::at(dir.path().join("timers.json")));
    let user = UserKey::parse("0xFeed").unwrap();
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();

    let status = ChainClaimStatus {
        can_claim: false,
        next_eligible_at: None,
        time_left_secs: Some(3600),
    };
    let adopted = gate.sync_chain_status(&user, &status, now).unwrap();
    assert_eq!(adopted, Some(now + Duration::hours(1)));

    // Survives reopening the file.
    let reopened = CooldownGate::new(FlatFileStore::at(dir.path().join("timers.json")));
    assert_eq!(reopened.remaining(&user, now), Duration::hours(1));
    assert!(reopened.is_eligible(&user, now + Duration::hours(1)));
}

proptest! {
    #[test]
    fn arbitrary_text_never_imports(code in ".{0,200}") {
        let tracker = ClaimTracker::in_memory();
        let outcome = tracker.import_backup(&code);
        prop_assert!(!outcome.success);
        prop_assert_eq!(outcome.message, "invalid backup code");
    }

    #[test]
    fn arbitrary_base64_never_imports(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        use base64::Engine as _;
        let code = base64::engine::general_purpose::STANDARD.encode(bytes);
        prop_assert!(decode_backup(&code).is_err());
    }
}
