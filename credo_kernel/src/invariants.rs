/// StudentCredo — Invariant Checks
///
/// Structural validation of a `CredoState`. Returns `Err(message)` on
/// the first failure, `Ok(())` if all pass. The runtime runs this after
/// every workflow transition and before accepting a restored snapshot.
///
/// Message format: `[INVARIANT:<name>] <detail>`.

use std::collections::BTreeSet;

use crate::domain::Status;
use crate::state::CredoState;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn try_validate_invariants(state: &CredoState) -> Result<(), String> {
    check_record_ids(state)?;
    check_unique_achievement_ids(state)?;
    check_unique_approval_ids(state)?;
    check_one_credential_per_achievement(state)?;
    check_credentials_sealed(state)?;
    check_block_sequence(state)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Individual checks
// ---------------------------------------------------------------------------

fn check_record_ids(state: &CredoState) -> Result<(), String> {
    if state.achievements.iter().any(|a| a.id.is_empty()) {
        return Err("[INVARIANT:record_ids] Achievement with empty id".to_string());
    }
    if state.pending_approvals.iter().any(|a| a.id.is_empty()) {
        return Err("[INVARIANT:record_ids] Pending approval with empty id".to_string());
    }
    Ok(())
}

fn check_unique_achievement_ids(state: &CredoState) -> Result<(), String> {
    let mut seen = BTreeSet::new();
    for a in &state.achievements {
        if !seen.insert(a.id.as_str()) {
            return Err(format!(
                "[INVARIANT:unique_achievement_ids] Achievement id {:?} appears more than once",
                a.id
            ));
        }
    }
    Ok(())
}

fn check_unique_approval_ids(state: &CredoState) -> Result<(), String> {
    let mut seen = BTreeSet::new();
    for a in &state.pending_approvals {
        if !seen.insert(a.id.as_str()) {
            return Err(format!(
                "[INVARIANT:unique_approval_ids] Approval id {:?} appears more than once",
                a.id
            ));
        }
    }
    Ok(())
}

fn check_one_credential_per_achievement(state: &CredoState) -> Result<(), String> {
    let mut seen = BTreeSet::new();
    for c in &state.blockchain_credentials {
        if !seen.insert(c.achievement.id.as_str()) {
            return Err(format!(
                "[INVARIANT:one_credential_per_achievement] Achievement {:?} has more than one credential",
                c.achievement.id
            ));
        }
    }
    Ok(())
}

fn check_credentials_sealed(state: &CredoState) -> Result<(), String> {
    for c in &state.blockchain_credentials {
        if !c.immutable {
            return Err(format!(
                "[INVARIANT:credential_immutable] Credential {:?} is not marked immutable",
                c.id
            ));
        }
        if c.achievement.status != Status::Approved {
            return Err(format!(
                "[INVARIANT:credential_approved] Credential {:?} embeds achievement {:?} with status {}",
                c.id, c.achievement.id, c.achievement.status
            ));
        }
    }
    Ok(())
}

/// Block numbers are 1..=n in append order.
fn check_block_sequence(state: &CredoState) -> Result<(), String> {
    for (i, c) in state.blockchain_credentials.iter().enumerate() {
        let expected = i as u64 + 1;
        if c.block_number != expected {
            return Err(format!(
                "[INVARIANT:block_sequence] Credential {:?} has block number {}, expected {}",
                c.id, c.block_number, expected
            ));
        }
    }
    Ok(())
}
