/// StudentCredo — Centralized Transition Logic
///
/// ALL record-mutation rules live here, as pure functions over
/// in-memory collections. Persistence and notification are the
/// runtime's job; these functions never touch storage.
///
/// Approval lifecycle:
///
///   pending ──approve──▶ approved (terminal)
///      └─────reject────▶ rejected (terminal)
///
/// Re-applying the same terminal status refreshes reviewDate/reason and
/// re-runs the side effects, which are idempotent by id. Moving a
/// terminal approval to a different status is refused.

use chrono::{DateTime, Utc};
use serde_json::Map;

use crate::domain::{
    Achievement, AchievementPatch, BlockchainCredential, NewAchievement, PendingApproval,
    Priority, Status, Submission, UserProfile,
};
use crate::hashing::generate_block_hash;

// ---------------------------------------------------------------------------
// Record construction
// ---------------------------------------------------------------------------

/// Review priority from the submission category (exact match).
pub fn priority_for_category(category: &str) -> Priority {
    match category {
        "competition-win" | "internship" => Priority::High,
        "certificate" | "freelancing" => Priority::Medium,
        _ => Priority::Low,
    }
}

/// Materialize caller-supplied fields into a stored achievement.
pub fn build_achievement(data: NewAchievement, id: String, now: DateTime<Utc>) -> Achievement {
    Achievement {
        id,
        title: data.title,
        description: data.description,
        category: data.category,
        kind: data.kind,
        skills: data.skills,
        files: data.files,
        status: data.status,
        date_created: now,
        date_approved: data.date_approved,
        submitted_date: None,
        review_date: None,
        issuer: data.issuer,
        reason: data.reason,
        extra: Map::new(),
    }
}

/// Merge `patch` into `achievement`. Id and creation time never change.
pub fn apply_patch(achievement: &mut Achievement, patch: AchievementPatch) {
    if let Some(v) = patch.title {
        achievement.title = v;
    }
    if let Some(v) = patch.description {
        achievement.description = v;
    }
    if let Some(v) = patch.category {
        achievement.category = v;
    }
    if let Some(v) = patch.kind {
        achievement.kind = Some(v);
    }
    if let Some(v) = patch.skills {
        achievement.skills = v;
    }
    if let Some(v) = patch.files {
        achievement.files = v;
    }
    if let Some(v) = patch.status {
        achievement.status = v;
    }
    if let Some(v) = patch.issuer {
        achievement.issuer = v;
    }
    if let Some(v) = patch.date_approved {
        achievement.date_approved = Some(v);
    }
    if let Some(v) = patch.review_date {
        achievement.review_date = Some(v);
    }
    if let Some(v) = patch.reason {
        achievement.reason = Some(v);
    }
}

/// Stage a submission for review. Does not create an achievement.
pub fn build_pending_approval(
    submission: Submission,
    profile: &UserProfile,
    id: String,
    now: DateTime<Utc>,
) -> PendingApproval {
    let achievement_id = submission
        .achievement_id
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| id.clone());

    PendingApproval {
        priority: priority_for_category(&submission.category),
        id,
        achievement_id,
        student_name: profile.name.clone(),
        student_id: profile.roll_number.clone(),
        title: submission.title,
        description: submission.description,
        category: submission.category,
        skills: submission.skills,
        files: submission.files,
        submitted_date: now,
        status: Status::Pending,
        blockchain_verification: submission.blockchain,
        review_date: None,
        reason: None,
        extra: Map::new(),
    }
}

// ---------------------------------------------------------------------------
// Approval decisions
// ---------------------------------------------------------------------------

/// What a decision did to the achievements collection.
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionEffect {
    /// The approval was terminal with a different status; nothing changed.
    Refused,
    /// Approval recorded; no achievement touched.
    Recorded,
    /// A new approved achievement was synthesized from the approval.
    Created(Achievement),
    /// The linked achievement was patched in place.
    Updated(Achievement),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionOutcome {
    /// The approval after the decision.
    pub approval: PendingApproval,
    pub achievement_id: String,
    pub effect: DecisionEffect,
}

impl DecisionOutcome {
    /// The achievement that should now carry a credential, if any.
    pub fn approved_achievement(&self) -> Option<&Achievement> {
        match &self.effect {
            DecisionEffect::Created(a) | DecisionEffect::Updated(a)
                if a.status == Status::Approved =>
            {
                Some(a)
            }
            _ => None,
        }
    }

    pub fn is_refused(&self) -> bool {
        self.effect == DecisionEffect::Refused
    }
}

/// Apply an admin decision to the approval `approval_id`.
///
/// Returns `None` when no approval has that id. An empty `reason`
/// leaves any stored reason in place.
pub fn apply_decision(
    approvals: &mut [PendingApproval],
    achievements: &mut Vec<Achievement>,
    approval_id: &str,
    status: Status,
    reason: &str,
    now: DateTime<Utc>,
) -> Option<DecisionOutcome> {
    let approval = approvals.iter_mut().find(|a| a.id == approval_id)?;
    let achievement_id = approval.linked_achievement_id().to_string();

    if approval.status.is_terminal() && approval.status != status {
        return Some(DecisionOutcome {
            approval: approval.clone(),
            achievement_id,
            effect: DecisionEffect::Refused,
        });
    }

    approval.status = status;
    approval.review_date = Some(now);
    if !reason.is_empty() {
        approval.reason = Some(reason.to_string());
    }
    let approval = approval.clone();

    let existing = achievements.iter_mut().find(|a| a.id == achievement_id);

    let effect = match (status, existing) {
        (Status::Approved, None) => {
            let created = synthesize_achievement(&approval, &achievement_id, reason, now);
            achievements.push(created.clone());
            DecisionEffect::Created(created)
        }
        (Status::Approved | Status::Rejected, Some(achievement)) => {
            achievement.status = status;
            achievement.review_date = Some(now);
            if status == Status::Approved && achievement.date_approved.is_none() {
                achievement.date_approved = Some(now);
            }
            if !reason.is_empty() {
                achievement.reason = Some(reason.to_string());
            }
            DecisionEffect::Updated(achievement.clone())
        }
        _ => DecisionEffect::Recorded,
    };

    Some(DecisionOutcome {
        approval,
        achievement_id,
        effect,
    })
}

fn synthesize_achievement(
    approval: &PendingApproval,
    achievement_id: &str,
    reason: &str,
    now: DateTime<Utc>,
) -> Achievement {
    Achievement {
        id: achievement_id.to_string(),
        title: approval.title.clone(),
        description: approval.description.clone(),
        category: approval.category.clone(),
        kind: None,
        skills: approval.skills.clone(),
        files: approval.files.clone(),
        status: Status::Approved,
        date_created: approval.submitted_date,
        date_approved: Some(now),
        submitted_date: Some(approval.submitted_date),
        review_date: Some(now),
        issuer: String::new(),
        reason: (!reason.is_empty()).then(|| reason.to_string()),
        extra: Map::new(),
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum MintOutcome {
    /// The achievement is not approved; nothing minted.
    Ineligible,
    /// A credential for this achievement id already exists.
    Existing(BlockchainCredential),
    Minted(BlockchainCredential),
}

impl MintOutcome {
    pub fn credential(&self) -> Option<&BlockchainCredential> {
        match self {
            MintOutcome::Ineligible => None,
            MintOutcome::Existing(c) | MintOutcome::Minted(c) => Some(c),
        }
    }

    pub fn into_credential(self) -> Option<BlockchainCredential> {
        match self {
            MintOutcome::Ineligible => None,
            MintOutcome::Existing(c) | MintOutcome::Minted(c) => Some(c),
        }
    }
}

/// Append a credential for `achievement` unless it is unapproved or
/// already credentialed. Block numbers are `len + 1`. `next_id` is only
/// called when a credential is actually minted.
pub fn mint_credential(
    credentials: &mut Vec<BlockchainCredential>,
    achievement: &Achievement,
    verified_by: &str,
    next_id: impl FnOnce(&[BlockchainCredential]) -> String,
    now: DateTime<Utc>,
) -> MintOutcome {
    if achievement.status != Status::Approved {
        return MintOutcome::Ineligible;
    }
    if let Some(existing) = credentials
        .iter()
        .find(|c| c.achievement.id == achievement.id)
    {
        return MintOutcome::Existing(existing.clone());
    }

    let credential = BlockchainCredential {
        id: next_id(credentials),
        block_hash: generate_block_hash(achievement, now),
        achievement: achievement.clone(),
        timestamp: now,
        verified_by: verified_by.to_string(),
        immutable: true,
        block_number: credentials.len() as u64 + 1,
    };
    credentials.push(credential.clone());
    MintOutcome::Minted(credential)
}
