//! Data manager: the explicit context object every view talks to.
//!
//! Owns the four persisted records and the derived computations.
//! Every mutating call reads the whole collection, applies a kernel
//! transition in memory, writes the whole collection back, then
//! publishes change events:
//!
//!   1. store.load(key)         absent or corrupt reads as empty
//!   2. kernel transition       pure, may refuse
//!   3. store.save(key)         failures logged, never surfaced
//!   4. bus.publish(event)      after the write, in a fixed order
//!
//! Concurrent writers on the same store are not coordinated: the last
//! write of a collection wins.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use credo_kernel::activity::{activity_points, activity_points_breakdown, calculate_activity_points};
use credo_kernel::domain::{
    Achievement, AchievementPatch, ActivityPointsBreakdown, ApprovalStats, BlockchainCredential,
    NewAchievement, PendingApproval, Stats, Status, StatusUpdate, Submission, UserProfile,
};
use credo_kernel::events::ChangeEvent;
use credo_kernel::hashing::generate_block_hash;
use credo_kernel::invariants::try_validate_invariants;
use credo_kernel::passport::passport_items;
use credo_kernel::skills::{extract_skills, SkillScore, SkillScorer, SkillsReport};
use credo_kernel::state::{sample_achievements, CredoState, SYSTEM_VERIFIER};
use credo_kernel::transitions::{self, DecisionEffect, MintOutcome};

use crate::clock::{Clock, SystemClock};
use crate::event_bus::EventBus;
use crate::store::{StorageKey, StoreAdapter};

pub struct DataManager {
    store: StoreAdapter,
    bus: Rc<EventBus>,
    clock: Box<dyn Clock>,
    last_id: Cell<i64>,
}

impl DataManager {
    pub fn new(store: StoreAdapter, bus: Rc<EventBus>, clock: Box<dyn Clock>) -> Self {
        Self {
            store,
            bus,
            clock,
            last_id: Cell::new(0),
        }
    }

    /// Volatile manager on the system clock.
    pub fn in_memory() -> Self {
        Self::new(
            StoreAdapter::in_memory(),
            Rc::new(EventBus::new()),
            Box::new(SystemClock),
        )
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    pub fn store(&self) -> &StoreAdapter {
        &self.store
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// First-run setup. Stores the default profile and an empty approvals
    /// list when absent. With `seed_samples`, an empty achievements list
    /// is replaced by the four sample achievements, each credentialed.
    pub fn initialize(&self, seed_samples: bool) {
        if self.store.load::<UserProfile>(StorageKey::Profile).is_none() {
            info!("storing default profile");
            self.save_user_profile(&UserProfile::default());
        }
        if self
            .store
            .load::<Vec<PendingApproval>>(StorageKey::PendingApprovals)
            .is_none()
        {
            self.persist(StorageKey::PendingApprovals, &Vec::<PendingApproval>::new());
        }
        if seed_samples && self.get_achievements().is_empty() {
            let samples = sample_achievements(self.now());
            self.save_achievements(&samples);
            for sample in &samples {
                self.add_to_blockchain(sample, SYSTEM_VERIFIER);
            }
            info!(count = samples.len(), "seeded sample achievements");
        }
    }

    // ── Achievements ───────────────────────────────────────────────

    pub fn get_achievements(&self) -> Vec<Achievement> {
        self.store.load(StorageKey::Achievements).unwrap_or_default()
    }

    /// Persist the list and publish fresh stats.
    pub fn save_achievements(&self, achievements: &[Achievement]) {
        self.persist(StorageKey::Achievements, achievements);
        self.bus.publish(&ChangeEvent::StatsUpdated(self.get_stats()));
    }

    pub fn add_achievement(&self, data: NewAchievement) -> Achievement {
        let mut achievements = self.get_achievements();
        let id = self.next_id(|id| achievements.iter().any(|a| a.id == id));
        let achievement = transitions::build_achievement(data, id, self.now());

        achievements.push(achievement.clone());
        self.save_achievements(&achievements);
        debug!(id = %achievement.id, title = %achievement.title, "achievement added");
        self.check_invariants("add_achievement");
        achievement
    }

    /// Merge `patch` into the achievement `id`. `None` when not found.
    pub fn update_achievement(&self, id: &str, patch: AchievementPatch) -> Option<Achievement> {
        let mut achievements = self.get_achievements();
        let achievement = achievements.iter_mut().find(|a| a.id == id)?;
        transitions::apply_patch(achievement, patch);
        let updated = achievement.clone();

        self.save_achievements(&achievements);
        self.check_invariants("update_achievement");
        Some(updated)
    }

    /// Remove the achievement `id`. Returns whether one was removed; the
    /// list is written back either way.
    pub fn delete_achievement(&self, id: &str) -> bool {
        let achievements = self.get_achievements();
        let before = achievements.len();
        let kept: Vec<Achievement> = achievements.into_iter().filter(|a| a.id != id).collect();
        let removed = kept.len() != before;

        self.save_achievements(&kept);
        if removed {
            info!(id, "achievement deleted");
        }
        removed
    }

    // ── Profile ────────────────────────────────────────────────────

    pub fn get_user_profile(&self) -> UserProfile {
        self.store.load(StorageKey::Profile).unwrap_or_default()
    }

    pub fn save_user_profile(&self, profile: &UserProfile) {
        self.persist(StorageKey::Profile, profile);
    }

    // ── Derived views ──────────────────────────────────────────────

    /// Computed fresh on every call.
    pub fn get_stats(&self) -> Stats {
        let achievements = self.get_achievements();
        let approvals = self.get_pending_approvals();
        let count = |status: Status| achievements.iter().filter(|a| a.status == status).count();

        Stats {
            total: achievements.len() + approvals.len(),
            approved: count(Status::Approved),
            pending: count(Status::Pending)
                + approvals.iter().filter(|a| a.status == Status::Pending).count(),
            rejected: count(Status::Rejected),
            activity_points: calculate_activity_points(&achievements),
        }
    }

    pub fn calculate_activity_points(&self) -> u32 {
        calculate_activity_points(&self.get_achievements())
    }

    pub fn get_activity_points_breakdown(&self) -> ActivityPointsBreakdown {
        activity_points_breakdown(&self.get_achievements())
    }

    pub fn skills_report(&self) -> SkillsReport {
        extract_skills(&self.get_achievements())
    }

    pub fn score_skill(&self, skill: &str) -> SkillScore {
        SkillScorer::new().score_skill(&self.get_achievements(), skill)
    }

    /// Approved achievements, as listed in the digital passport.
    pub fn passport(&self) -> Vec<Achievement> {
        passport_items(&self.get_achievements())
    }

    // ── Pending approvals ──────────────────────────────────────────

    pub fn get_pending_approvals(&self) -> Vec<PendingApproval> {
        self.store
            .load(StorageKey::PendingApprovals)
            .unwrap_or_default()
    }

    pub fn save_pending_approvals(&self, approvals: &[PendingApproval]) {
        self.persist(StorageKey::PendingApprovals, approvals);
        self.bus
            .publish(&ChangeEvent::ApprovalsUpdated(approvals.to_vec()));
    }

    /// Stage a submission for review. No achievement is created.
    pub fn add_pending_approval(&self, submission: Submission) -> PendingApproval {
        let mut approvals = self.get_pending_approvals();
        let achievements = self.get_achievements();
        let id = self.next_id(|id| {
            approvals.iter().any(|a| a.id == id) || achievements.iter().any(|a| a.id == id)
        });

        let approval =
            transitions::build_pending_approval(submission, &self.get_user_profile(), id, self.now());
        approvals.push(approval.clone());
        self.save_pending_approvals(&approvals);

        info!(
            id = %approval.id,
            category = %approval.category,
            priority = ?approval.priority,
            "submission staged for review"
        );
        self.check_invariants("add_pending_approval");
        approval
    }

    pub fn clear_pending_approvals(&self) {
        self.save_pending_approvals(&[]);
        info!("pending approvals cleared");
    }

    /// Apply an admin decision. `None` when `approval_id` is unknown.
    ///
    /// Effects, in order: approvals saved (approvalsUpdated), linked
    /// achievement saved when touched (statsUpdated), credential minted
    /// on approval (blockchainUpdated), then achievementStatusUpdated.
    /// A terminal approval asked to change status is returned unchanged
    /// with no writes and no events.
    pub fn update_approval_status(
        &self,
        approval_id: &str,
        status: Status,
        reason: Option<&str>,
    ) -> Option<PendingApproval> {
        let reason = reason.unwrap_or("");
        let mut approvals = self.get_pending_approvals();
        let mut achievements = self.get_achievements();

        let outcome = transitions::apply_decision(
            &mut approvals,
            &mut achievements,
            approval_id,
            status,
            reason,
            self.now(),
        );
        let Some(outcome) = outcome else {
            debug!(approval_id, "approval not found");
            return None;
        };

        if outcome.is_refused() {
            warn!(
                approval_id,
                current = %outcome.approval.status,
                requested = %status,
                "refusing to change a terminal approval"
            );
            return Some(outcome.approval);
        }

        self.save_pending_approvals(&approvals);

        match &outcome.effect {
            DecisionEffect::Created(a) => {
                self.save_achievements(&achievements);
                info!(approval_id, achievement_id = %a.id, "achievement created from approval");
            }
            DecisionEffect::Updated(a) => {
                self.save_achievements(&achievements);
                info!(approval_id, achievement_id = %a.id, status = %a.status, "achievement updated");
            }
            DecisionEffect::Recorded => {
                info!(approval_id, status = %status, "decision recorded");
            }
            DecisionEffect::Refused => {}
        }

        if let Some(achievement) = outcome.approved_achievement() {
            self.add_to_blockchain(achievement, SYSTEM_VERIFIER);
        }

        self.bus
            .publish(&ChangeEvent::AchievementStatusUpdated(StatusUpdate {
                approval_id: approval_id.to_string(),
                achievement_id: outcome.achievement_id.clone(),
                status,
                reason: reason.to_string(),
            }));

        self.check_invariants("update_approval_status");
        Some(outcome.approval)
    }

    pub fn get_approval_stats(&self) -> ApprovalStats {
        let approvals = self.get_pending_approvals();
        let count = |status: Status| approvals.iter().filter(|a| a.status == status).count();
        ApprovalStats {
            pending: count(Status::Pending),
            approved: count(Status::Approved),
            rejected: count(Status::Rejected),
            total: approvals.len(),
        }
    }

    // ── Credentials ────────────────────────────────────────────────

    pub fn get_blockchain_credentials(&self) -> Vec<BlockchainCredential> {
        self.store
            .load(StorageKey::BlockchainCredentials)
            .unwrap_or_default()
    }

    pub fn save_blockchain_credentials(&self, credentials: &[BlockchainCredential]) {
        self.persist(StorageKey::BlockchainCredentials, credentials);
        self.bus.publish(&ChangeEvent::BlockchainUpdated {
            credentials: credentials.to_vec(),
            count: credentials.len(),
        });
    }

    /// Mint a credential for an approved achievement. Returns the
    /// existing credential when one already references this achievement,
    /// `None` when the achievement is not approved.
    pub fn add_to_blockchain(
        &self,
        achievement: &Achievement,
        verified_by: &str,
    ) -> Option<BlockchainCredential> {
        let mut credentials = self.get_blockchain_credentials();
        let next_id = |existing: &[BlockchainCredential]| {
            format!(
                "blockchain_{}",
                self.next_id(|id| {
                    existing
                        .iter()
                        .any(|c| c.id.strip_prefix("blockchain_") == Some(id))
                })
            )
        };

        match transitions::mint_credential(&mut credentials, achievement, verified_by, next_id, self.now()) {
            MintOutcome::Ineligible => {
                debug!(achievement_id = %achievement.id, status = %achievement.status, "not eligible for a credential");
                None
            }
            MintOutcome::Existing(existing) => {
                debug!(achievement_id = %achievement.id, block = existing.block_number, "credential already minted");
                Some(existing)
            }
            MintOutcome::Minted(minted) => {
                self.save_blockchain_credentials(&credentials);
                info!(
                    achievement_id = %achievement.id,
                    block = minted.block_number,
                    hash = %minted.block_hash,
                    "credential minted"
                );
                self.check_invariants("add_to_blockchain");
                Some(minted)
            }
        }
    }

    pub fn generate_block_hash(&self, achievement: &Achievement) -> String {
        generate_block_hash(achievement, self.now())
    }

    /// Verification lookup by block hash.
    pub fn find_credential(&self, block_hash: &str) -> Option<BlockchainCredential> {
        let needle = block_hash.trim();
        self.get_blockchain_credentials()
            .into_iter()
            .find(|c| c.block_hash.eq_ignore_ascii_case(needle))
    }

    /// Activity points of the achievement as it was when minted.
    pub fn credential_points(&self, credential: &BlockchainCredential) -> u32 {
        activity_points(&credential.achievement)
    }

    // ── Whole-state access ─────────────────────────────────────────

    pub fn state(&self) -> CredoState {
        CredoState {
            achievements: self.get_achievements(),
            pending_approvals: self.get_pending_approvals(),
            blockchain_credentials: self.get_blockchain_credentials(),
            user_profile: self.get_user_profile(),
        }
    }

    /// Overwrite all four records and publish their change events.
    pub fn replace_state(&self, state: &CredoState) {
        self.save_user_profile(&state.user_profile);
        self.save_achievements(&state.achievements);
        self.save_pending_approvals(&state.pending_approvals);
        self.save_blockchain_credentials(&state.blockchain_credentials);
        info!(
            achievements = state.achievements.len(),
            approvals = state.pending_approvals.len(),
            credentials = state.blockchain_credentials.len(),
            "state replaced"
        );
    }

    // ── Internals ──────────────────────────────────────────────────

    fn persist<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) {
        if let Err(e) = self.store.save(key, value) {
            error!(key = key.as_str(), error = %e, "store write failed");
        }
    }

    /// Millisecond timestamp id, strictly increasing per manager and
    /// skipping values `taken` reports as used.
    fn next_id(&self, taken: impl Fn(&str) -> bool) -> String {
        let mut candidate = self.now().timestamp_millis().max(self.last_id.get() + 1);
        while taken(&candidate.to_string()) {
            candidate += 1;
        }
        self.last_id.set(candidate);
        candidate.to_string()
    }

    fn check_invariants(&self, op: &str) {
        if let Err(violation) = try_validate_invariants(&self.state()) {
            warn!(op, %violation, "stored state drifted from invariants");
        }
    }
}
