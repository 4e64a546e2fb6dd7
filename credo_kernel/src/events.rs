/// StudentCredo — Change Notifications
///
/// Events are pure data: they tell open views that persisted state
/// changed and carry the fresh value. They contain ZERO mutation logic.
///
/// Event names and payload shapes are the contract with the dashboard
/// pages and must not change.

use serde_json::Value;

use crate::domain::{BlockchainCredential, PendingApproval, Stats, StatusUpdate};

/// Discriminant of a [`ChangeEvent`], used for filtered subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    StatsUpdated,
    ApprovalsUpdated,
    AchievementStatusUpdated,
    BlockchainUpdated,
}

impl EventKind {
    /// Wire name of the event.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::StatsUpdated => "statsUpdated",
            EventKind::ApprovalsUpdated => "approvalsUpdated",
            EventKind::AchievementStatusUpdated => "achievementStatusUpdated",
            EventKind::BlockchainUpdated => "blockchainUpdated",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    /// Achievements were saved; carries a fresh stats snapshot.
    StatsUpdated(Stats),
    /// The full pending-approvals list after a save.
    ApprovalsUpdated(Vec<PendingApproval>),
    /// An approval decision was applied.
    AchievementStatusUpdated(StatusUpdate),
    /// The full credential list after a save.
    BlockchainUpdated {
        credentials: Vec<BlockchainCredential>,
        count: usize,
    },
}

impl ChangeEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ChangeEvent::StatsUpdated(_) => EventKind::StatsUpdated,
            ChangeEvent::ApprovalsUpdated(_) => EventKind::ApprovalsUpdated,
            ChangeEvent::AchievementStatusUpdated(_) => EventKind::AchievementStatusUpdated,
            ChangeEvent::BlockchainUpdated { .. } => EventKind::BlockchainUpdated,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// The event `detail` as the dashboard receives it.
    pub fn detail(&self) -> Value {
        match self {
            ChangeEvent::StatsUpdated(stats) => serde_json::json!(stats),
            ChangeEvent::ApprovalsUpdated(approvals) => serde_json::json!(approvals),
            ChangeEvent::AchievementStatusUpdated(update) => serde_json::json!(update),
            ChangeEvent::BlockchainUpdated { credentials, count } => serde_json::json!({
                "credentials": credentials,
                "count": count,
            }),
        }
    }

    /// `{ "type": <name>, "detail": <payload> }` envelope.
    pub fn to_dict(&self) -> Value {
        serde_json::json!({
            "type": self.name(),
            "detail": self.detail(),
        })
    }
}
