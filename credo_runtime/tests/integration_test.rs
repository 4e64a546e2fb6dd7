//! Integration tests for credo_runtime.
//!
//! Filesystem tests use per-test temporary directories.

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use chrono::{Duration, TimeZone, Utc};

use credo_kernel::domain::{Achievement, NewAchievement, Priority, Stats, Status, Submission};
use credo_kernel::events::{ChangeEvent, EventKind};
use credo_kernel::state::sample_achievements;

use credo_runtime::clock::{Clock, FixedClock};
use credo_runtime::error::{SnapshotError, StoreError};
use credo_runtime::event_bus::EventBus;
use credo_runtime::snapshot::{self, Snapshot};
use credo_runtime::store::{FileStore, KeyValueStore, MemoryStore, StorageKey, StoreAdapter};
use credo_runtime::DataManager;

/// Create a temp directory for a test.
fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("credo_runtime_tests").join(name);
    if dir.exists() {
        fs::remove_dir_all(&dir).ok();
    }
    fs::create_dir_all(&dir).expect("Failed to create temp dir");
    dir
}

fn clock() -> FixedClock {
    FixedClock::new(Utc.with_ymd_and_hms(2024, 9, 2, 8, 30, 0).unwrap())
}

fn manager_with(store: StoreAdapter, clock: &FixedClock) -> DataManager {
    DataManager::new(store, Rc::new(EventBus::new()), Box::new(clock.clone()))
}

fn manager(clock: &FixedClock) -> DataManager {
    manager_with(StoreAdapter::in_memory(), clock)
}

/// Record every published event.
fn record(dm: &DataManager) -> Rc<RefCell<Vec<ChangeEvent>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    dm.bus().subscribe(move |e| sink.borrow_mut().push(e.clone()));
    log
}

fn names(log: &Rc<RefCell<Vec<ChangeEvent>>>) -> Vec<&'static str> {
    log.borrow().iter().map(|e| e.name()).collect()
}

fn submission(title: &str, category: &str, skills: &[&str]) -> Submission {
    Submission {
        title: title.to_string(),
        description: format!("{} description", title),
        category: category.to_string(),
        skills: skills.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

fn approved(title: &str, category: &str) -> NewAchievement {
    NewAchievement {
        title: title.to_string(),
        category: category.to_string(),
        status: Status::Approved,
        ..Default::default()
    }
}

// ─────────────────────────────────────────────────────────────
// Approval workflow
// ─────────────────────────────────────────────────────────────

#[test]
fn approve_certificate_scenario() {
    let clock = clock();
    let dm = manager(&clock);

    let approval = dm.add_pending_approval(submission(
        "Python Workshop Certificate",
        "certificate",
        &["Python"],
    ));
    assert!(dm.get_achievements().is_empty(), "submission must not create an achievement");
    assert_eq!(dm.get_stats().pending, 1);

    clock.advance(Duration::minutes(5));
    let decided = dm
        .update_approval_status(&approval.id, Status::Approved, None)
        .expect("approval exists");

    assert_eq!(decided.status, Status::Approved);
    assert_eq!(decided.review_date, Some(clock.now()));
    assert_eq!(dm.calculate_activity_points(), 5);

    let credentials = dm.get_blockchain_credentials();
    assert_eq!(credentials.len(), 1);
    assert_eq!(credentials[0].block_number, 1);
    assert_eq!(credentials[0].verified_by, "System Admin");
    assert!(credentials[0].immutable);
    assert_eq!(credentials[0].achievement.id, approval.id);

    let stats = dm.get_stats();
    assert_eq!(stats.approved, 1);
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.total, 2);
}

#[test]
fn reject_hackathon_participation_scenario() {
    let clock = clock();
    let dm = manager(&clock);

    let achievement = dm.add_achievement(NewAchievement {
        title: "Hackathon Participation".to_string(),
        category: "competition-participate".to_string(),
        ..Default::default()
    });
    let approval = dm.add_pending_approval(Submission {
        achievement_id: Some(achievement.id.clone()),
        ..submission("Hackathon Participation", "competition-participate", &[])
    });
    assert_eq!(approval.achievement_id, achievement.id);
    assert_eq!(dm.get_stats().pending, 2);

    dm.update_approval_status(&approval.id, Status::Rejected, Some("no certificate attached"))
        .expect("approval exists");

    let stats = dm.get_stats();
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.rejected, 1);
    assert_eq!(stats.approved, 0);
    assert!(dm.get_blockchain_credentials().is_empty());
    assert_eq!(dm.get_achievements().len(), 1);
    assert_eq!(
        dm.get_achievements()[0].reason.as_deref(),
        Some("no certificate attached")
    );
}

#[test]
fn rejection_never_creates_achievement_or_credential() {
    let clock = clock();
    let dm = manager(&clock);
    let approval = dm.add_pending_approval(submission("Hackathon Participation", "competition", &["Git"]));

    let decided = dm
        .update_approval_status(&approval.id, Status::Rejected, Some("duplicate"))
        .unwrap();

    assert_eq!(decided.status, Status::Rejected);
    assert_eq!(decided.reason.as_deref(), Some("duplicate"));
    assert!(dm.get_achievements().is_empty());
    assert!(dm.get_blockchain_credentials().is_empty());
    assert_eq!(dm.get_stats().pending, 0);
    assert_eq!(dm.get_approval_stats().rejected, 1);
}

#[test]
fn approval_is_idempotent() {
    let clock = clock();
    let dm = manager(&clock);
    let approval = dm.add_pending_approval(submission("Summer Internship", "internship", &["Rust"]));

    dm.update_approval_status(&approval.id, Status::Approved, None);
    clock.advance(Duration::seconds(30));
    dm.update_approval_status(&approval.id, Status::Approved, Some("confirmed"));

    assert_eq!(dm.get_achievements().len(), 1);
    assert_eq!(dm.get_blockchain_credentials().len(), 1);
    assert_eq!(dm.calculate_activity_points(), 30);
    assert_eq!(dm.get_achievements()[0].reason.as_deref(), Some("confirmed"));
}

#[test]
fn terminal_approval_refuses_status_change() {
    let clock = clock();
    let dm = manager(&clock);
    let approval = dm.add_pending_approval(submission("Go Certificate", "certificate", &[]));
    dm.update_approval_status(&approval.id, Status::Rejected, Some("blurry"));

    let log = record(&dm);
    let returned = dm
        .update_approval_status(&approval.id, Status::Approved, None)
        .unwrap();

    assert_eq!(returned.status, Status::Rejected);
    assert!(log.borrow().is_empty(), "refused transition must not publish");
    assert!(dm.get_achievements().is_empty());
    assert!(dm.get_blockchain_credentials().is_empty());
}

#[test]
fn unknown_approval_returns_none() {
    let clock = clock();
    let dm = manager(&clock);
    let log = record(&dm);
    assert!(dm.update_approval_status("404", Status::Approved, None).is_none());
    assert!(log.borrow().is_empty());
}

#[test]
fn approval_priority_from_category() {
    let clock = clock();
    let dm = manager(&clock);
    let high = dm.add_pending_approval(submission("Winner", "competition-win", &[]));
    let low = dm.add_pending_approval(submission("Talk", "workshop", &[]));
    assert_eq!(high.priority, Priority::High);
    assert_eq!(low.priority, Priority::Low);
    assert_eq!(high.student_name, "Priyesh Kumar Kashyap");
    assert_ne!(high.id, low.id);
}

// ─────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────

#[test]
fn approve_publishes_in_order() {
    let clock = clock();
    let dm = manager(&clock);
    let approval = dm.add_pending_approval(submission("Rust Certificate", "certificate", &[]));

    let log = record(&dm);
    dm.update_approval_status(&approval.id, Status::Approved, Some("ok"));

    assert_eq!(
        names(&log),
        vec![
            "approvalsUpdated",
            "statsUpdated",
            "blockchainUpdated",
            "achievementStatusUpdated"
        ]
    );

    let events = log.borrow();
    match &events[1] {
        ChangeEvent::StatsUpdated(stats) => {
            assert_eq!(
                *stats,
                Stats {
                    total: 2,
                    approved: 1,
                    pending: 0,
                    rejected: 0,
                    activity_points: 5,
                }
            );
        }
        other => panic!("unexpected event {:?}", other),
    }
    match &events[3] {
        ChangeEvent::AchievementStatusUpdated(update) => {
            assert_eq!(update.approval_id, approval.id);
            assert_eq!(update.achievement_id, approval.id);
            assert_eq!(update.status, Status::Approved);
            assert_eq!(update.reason, "ok");
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn reject_publishes_two_notifications() {
    let clock = clock();
    let dm = manager(&clock);
    let approval = dm.add_pending_approval(submission("Quiz", "competition", &[]));

    let log = record(&dm);
    dm.update_approval_status(&approval.id, Status::Rejected, None);
    assert_eq!(names(&log), vec!["approvalsUpdated", "achievementStatusUpdated"]);
}

#[test]
fn panicking_subscriber_does_not_break_mutation() {
    let clock = clock();
    let dm = manager(&clock);
    dm.bus().subscribe(|_| panic!("view crashed"));
    let seen = Rc::new(RefCell::new(0));
    let s = Rc::clone(&seen);
    dm.bus()
        .subscribe_to(EventKind::BlockchainUpdated, move |_| *s.borrow_mut() += 1);

    let approval = dm.add_pending_approval(submission("Rust Certificate", "certificate", &[]));
    let decided = dm.update_approval_status(&approval.id, Status::Approved, None);

    assert!(decided.is_some());
    assert_eq!(*seen.borrow(), 1);
    assert_eq!(dm.get_blockchain_credentials().len(), 1);
}

#[test]
fn late_subscriber_gets_no_backlog() {
    let clock = clock();
    let dm = manager(&clock);
    dm.add_achievement(approved("Rust Certificate", "certificate"));
    let log = record(&dm);
    assert!(log.borrow().is_empty());
}

#[test]
fn clear_pending_approvals_publishes_empty_list() {
    let clock = clock();
    let dm = manager(&clock);
    dm.add_pending_approval(submission("A", "certificate", &[]));
    let log = record(&dm);

    dm.clear_pending_approvals();

    assert!(dm.get_pending_approvals().is_empty());
    assert_eq!(*log.borrow(), vec![ChangeEvent::ApprovalsUpdated(Vec::new())]);
}

// ─────────────────────────────────────────────────────────────
// Derived values
// ─────────────────────────────────────────────────────────────

#[test]
fn internship_adds_exactly_thirty_points() {
    let clock = clock();
    for seeded in [false, true] {
        let dm = manager(&clock);
        dm.initialize(seeded);
        dm.add_pending_approval(submission("Pending thing", "internship", &[]));
        dm.add_achievement(NewAchievement {
            status: Status::Rejected,
            ..approved("Rejected internship", "internship")
        });

        let before = dm.calculate_activity_points();
        dm.add_achievement(approved("Backend Internship at Acme", "internship"));
        assert_eq!(dm.calculate_activity_points(), before + 30);
    }
}

#[test]
fn breakdown_total_matches_points() {
    let clock = clock();
    let dm = manager(&clock);
    let mut all = sample_achievements(clock.now());
    dm.save_achievements(&all);

    for (title, category) in [
        ("Hackathon Participation", "competition"),
        ("State Chess Contest - Gold", "contest"),
        ("Logo design", "freelance"),
        ("Cloud Seminar", "seminar"),
        ("Mystery", "other"),
        ("Participating", "participating"),
    ] {
        dm.add_achievement(approved(title, category));
        all = dm.get_achievements();
        let breakdown = dm.get_activity_points_breakdown();
        assert_eq!(breakdown.total, dm.calculate_activity_points(), "after {}", title);
    }
    assert_eq!(all.len(), 10);
}

#[test]
fn stats_identity_holds() {
    let clock = clock();
    let dm = manager(&clock);
    dm.initialize(true);
    let a = dm.add_pending_approval(submission("One", "certificate", &[]));
    dm.add_pending_approval(submission("Two", "workshop", &[]));
    dm.add_achievement(NewAchievement::default());
    dm.update_approval_status(&a.id, Status::Approved, None);

    let stats = dm.get_stats();
    assert_eq!(
        stats.total,
        dm.get_achievements().len() + dm.get_pending_approvals().len()
    );
    // One pending approval plus one pending achievement.
    assert_eq!(stats.pending, 2);
    assert_eq!(stats.approved, 5);
}

#[test]
fn delete_achievement_persists() {
    let clock = clock();
    let dm = manager(&clock);
    let a = dm.add_achievement(approved("Rust Certificate", "certificate"));
    let log = record(&dm);

    assert!(dm.delete_achievement(&a.id));
    assert!(dm.get_achievements().is_empty());
    assert_eq!(names(&log), vec!["statsUpdated"]);
}

#[test]
fn credential_lookup_by_hash() {
    let clock = clock();
    let dm = manager(&clock);
    dm.initialize(true);

    let credentials = dm.get_blockchain_credentials();
    let hackathon = credentials
        .iter()
        .find(|c| c.achievement.id == "sample_2")
        .unwrap();

    let found = dm
        .find_credential(&hackathon.block_hash.to_uppercase())
        .expect("lookup is case-insensitive");
    assert_eq!(found.id, hackathon.id);
    assert_eq!(dm.credential_points(&found), 30);
    assert!(dm.find_credential("deadbeef").is_none());

    let numbers: Vec<u64> = credentials.iter().map(|c| c.block_number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
}

#[test]
fn add_to_blockchain_ignores_unapproved() {
    let clock = clock();
    let dm = manager(&clock);
    let a = dm.add_achievement(NewAchievement::default());
    assert!(dm.add_to_blockchain(&a, "Admin").is_none());
    assert!(dm.get_blockchain_credentials().is_empty());
}

// ─────────────────────────────────────────────────────────────
// Storage
// ─────────────────────────────────────────────────────────────

#[test]
fn file_store_survives_restart() {
    let dir = temp_dir("file_store_survives_restart");
    let clock = clock();

    let approval_id = {
        let dm = manager_with(StoreAdapter::new(Box::new(FileStore::new(&dir))), &clock);
        dm.initialize(false);
        dm.add_pending_approval(submission("Rust Certificate", "certificate", &["Rust"]))
            .id
    };

    clock.advance(Duration::hours(1));
    let dm = manager_with(StoreAdapter::new(Box::new(FileStore::new(&dir))), &clock);
    dm.update_approval_status(&approval_id, Status::Approved, None)
        .expect("approval persisted");

    assert!(dir.join("studentCredoAchievements.json").exists());
    assert!(dir.join("studentCredoBlockchainCredentials.json").exists());
    assert_eq!(dm.get_stats().approved, 1);
}

#[test]
fn corrupt_records_read_as_empty() {
    let dir = temp_dir("corrupt_records_read_as_empty");
    fs::write(dir.join("studentCredoAchievements.json"), "[{\"id\":").unwrap();
    fs::write(dir.join("studentCredoProfile.json"), "42").unwrap();

    let clock = clock();
    let dm = manager_with(StoreAdapter::new(Box::new(FileStore::new(&dir))), &clock);

    assert!(dm.get_achievements().is_empty());
    assert_eq!(dm.get_user_profile().roll_number, "BT24CS063");
    assert_eq!(dm.get_stats(), Stats::default());

    let a = dm.add_achievement(approved("Rust Certificate", "certificate"));
    assert_eq!(dm.get_achievements(), vec![a]);
}

#[test]
fn unknown_fields_are_written_back() {
    let store = MemoryStore::new();
    store
        .set(
            StorageKey::Achievements.as_str(),
            r#"[{"id":"legacy","title":"Old","category":"certificate","status":"approved",
                "dateCreated":"2023-01-01T00:00:00Z","verificationUrl":"https://x.test/v"}]"#,
        )
        .unwrap();
    let clock = clock();
    let dm = manager_with(StoreAdapter::new(Box::new(store)), &clock);

    dm.add_achievement(approved("New", "workshop"));

    let raw = dm
        .store()
        .backend()
        .get(StorageKey::Achievements.as_str())
        .unwrap()
        .unwrap();
    let docs: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
    assert_eq!(docs[0]["verificationUrl"], "https://x.test/v");
    assert_eq!(dm.calculate_activity_points(), 10);
}

/// Reads work, writes always fail.
struct ReadOnlyStore(MemoryStore);

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.0.get(key)
    }

    fn set(&self, key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Io {
            key: key.to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "quota exceeded"),
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.0.remove(key)
    }
}

#[test]
fn write_failure_still_returns_result() {
    let clock = clock();
    let dm = manager_with(
        StoreAdapter::new(Box::new(ReadOnlyStore(MemoryStore::new()))),
        &clock,
    );
    let log = record(&dm);

    let a = dm.add_achievement(approved("Rust Certificate", "certificate"));
    assert_eq!(a.title, "Rust Certificate");
    assert!(dm.get_achievements().is_empty());
    assert_eq!(names(&log), vec!["statsUpdated"]);
}

// ─────────────────────────────────────────────────────────────
// Snapshots
// ─────────────────────────────────────────────────────────────

#[test]
fn snapshot_restore_round_trip() {
    let dir = temp_dir("snapshot_restore_round_trip");
    let clock = clock();
    let dm = manager(&clock);
    dm.initialize(true);
    dm.add_pending_approval(submission("Rust Certificate", "certificate", &["Rust"]));
    let before = dm.state();

    let path = snapshot::save_snapshot(&dir, &dm).unwrap();
    assert!(path.file_name().unwrap().to_string_lossy().starts_with("snapshot_"));

    dm.clear_pending_approvals();
    dm.delete_achievement("sample_1");
    assert_ne!(dm.state(), before);

    let snap = snapshot::load_latest_snapshot(&dir).unwrap().expect("snapshot on disk");
    assert!(snapshot::verify_snapshot_hash(&snap));

    let log = record(&dm);
    let restored = snapshot::restore_snapshot(&dm, &snap).unwrap();
    assert_eq!(restored, before);
    assert_eq!(dm.state(), before);
    assert_eq!(
        names(&log),
        vec!["statsUpdated", "approvalsUpdated", "blockchainUpdated"]
    );
}

#[test]
fn latest_snapshot_wins() {
    let dir = temp_dir("latest_snapshot_wins");
    let clock = clock();
    let dm = manager(&clock);

    snapshot::save_snapshot(&dir, &dm).unwrap();
    dm.add_achievement(approved("Rust Certificate", "certificate"));
    clock.advance(Duration::seconds(1));
    snapshot::save_snapshot(&dir, &dm).unwrap();

    let latest = snapshot::load_latest_snapshot(&dir).unwrap().unwrap();
    assert_eq!(latest.state().unwrap().achievements.len(), 1);
    assert!(snapshot::load_latest_snapshot(&dir.join("missing")).unwrap().is_none());
}

#[test]
fn tampered_snapshot_is_refused() {
    let clock = clock();
    let dm = manager(&clock);
    dm.initialize(true);

    let mut snap = Snapshot::capture(&dm.state(), clock.now()).unwrap();
    snap.canonical_json = snap.canonical_json.replace("Tech Academy", "Fake Academy");

    let target = manager(&clock);
    let err = snapshot::restore_snapshot(&target, &snap).unwrap_err();
    assert!(matches!(err, SnapshotError::HashMismatch { .. }));
    assert!(target.get_achievements().is_empty());
}

#[test]
fn snapshot_violating_invariants_is_refused() {
    let clock = clock();
    let dm = manager(&clock);
    dm.initialize(true);
    let mut state = dm.state();
    let dup: Achievement = state.achievements[0].clone();
    state.achievements.push(dup);

    let snap = Snapshot::capture(&state, clock.now()).unwrap();
    let target = manager(&clock);
    let err = snapshot::restore_snapshot(&target, &snap).unwrap_err();
    assert!(matches!(err, SnapshotError::Invariant(ref m) if m.contains("unique_achievement_ids")));
    assert!(target.get_achievements().is_empty());
}
