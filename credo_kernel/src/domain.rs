/// StudentCredo — Core Domain Types
///
/// Pure data. The persisted JSON layout uses camelCase field names so
/// documents written by the dashboard load unchanged. Fields the kernel
/// does not interpret (`verificationUrl`, `prize`, `company`, ...) are
/// carried in `extra` and written back untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Lifecycle ──────────────────────────────────────────────────────

/// Review status shared by achievements and pending approvals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl Status {
    /// `approved` and `rejected` are terminal.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Approved | Status::Rejected)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Approved => "approved",
            Status::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Status::Pending),
            "approved" => Ok(Status::Approved),
            "rejected" => Ok(Status::Rejected),
            other => Err(format!("unknown status {:?}", other)),
        }
    }
}

/// Review priority of a pending approval, derived from its category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    #[default]
    Low,
}

// ── Records ────────────────────────────────────────────────────────

/// Metadata of an uploaded evidence file. The file itself is never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachedFile {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
}

/// A student accomplishment with a review lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// Optional free-form type tag, consulted by skill classification.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub files: Vec<AttachedFile>,
    #[serde(default)]
    pub status: Status,
    pub date_created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_approved: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub issuer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Caller-supplied fields for a new achievement. Id and creation time
/// are assigned by the data manager.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewAchievement {
    pub title: String,
    pub description: String,
    pub category: String,
    pub kind: Option<String>,
    pub skills: Vec<String>,
    pub files: Vec<AttachedFile>,
    pub status: Status,
    pub issuer: String,
    pub date_approved: Option<DateTime<Utc>>,
    pub reason: Option<String>,
}

/// Partial update merged into an existing achievement. `None` leaves a
/// field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AchievementPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub kind: Option<String>,
    pub skills: Option<Vec<String>>,
    pub files: Option<Vec<AttachedFile>>,
    pub status: Option<Status>,
    pub issuer: Option<String>,
    pub date_approved: Option<DateTime<Utc>>,
    pub review_date: Option<DateTime<Utc>>,
    pub reason: Option<String>,
}

/// A student submission as validated by the upload form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Submission {
    pub title: String,
    pub description: String,
    pub category: String,
    pub skills: Vec<String>,
    pub files: Vec<AttachedFile>,
    /// Student opted in to credential minting.
    pub blockchain: bool,
    /// Existing achievement this submission reviews. Defaults to the
    /// approval's own id.
    pub achievement_id: Option<String>,
}

/// Staging record for a submission awaiting an admin decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingApproval {
    pub id: String,
    #[serde(default)]
    pub achievement_id: String,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub files: Vec<AttachedFile>,
    pub submitted_date: DateTime<Utc>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub blockchain_verification: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PendingApproval {
    /// Id of the achievement this approval materializes into.
    pub fn linked_achievement_id(&self) -> &str {
        if self.achievement_id.is_empty() {
            &self.id
        } else {
            &self.achievement_id
        }
    }
}

/// Simulated ledger entry minted once per approved achievement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockchainCredential {
    pub id: String,
    pub block_hash: String,
    /// Snapshot of the achievement at minting time.
    pub achievement: Achievement,
    pub timestamp: DateTime<Utc>,
    pub verified_by: String,
    pub immutable: bool,
    pub block_number: u64,
}

/// Singleton student profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub roll_number: String,
    pub year: String,
    pub section: String,
    pub email: String,
    pub department: String,
    pub profile_picture: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "Priyesh Kumar Kashyap".to_string(),
            roll_number: "BT24CS063".to_string(),
            year: "2nd year".to_string(),
            section: "CSE A2".to_string(),
            email: String::new(),
            department: "Computer Science".to_string(),
            profile_picture: "profile-pic.jpg".to_string(),
        }
    }
}

// ── Derived views ──────────────────────────────────────────────────

/// Dashboard counters across achievements and pending approvals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    pub approved: usize,
    /// Pending approvals plus pending achievements. An approval linked
    /// to a pending achievement is counted twice.
    pub pending: usize,
    pub rejected: usize,
    pub activity_points: u32,
}

/// Counters over the pending-approvals collection only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalStats {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTally {
    pub count: u32,
    pub points: u32,
}

/// Activity points per display bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityPointsBreakdown {
    pub certificates: CategoryTally,
    pub competitions: CategoryTally,
    pub workshops: CategoryTally,
    pub internships: CategoryTally,
    pub freelancing: CategoryTally,
    pub participation: CategoryTally,
    pub total: u32,
}

/// Payload of the achievement-status-updated notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub approval_id: String,
    pub achievement_id: String,
    pub status: Status,
    pub reason: String,
}
