#![forbid(unsafe_code)]

//! StudentCredo — Kernel
//!
//! Pure, storage-free rules: domain records, activity-point and skill
//! scoring, the approval state machine, credential minting and
//! invariant checks. No I/O lives here.

/// Scoring rules v1. Changing a point value or rule order changes every
/// stored total and must bump this.
pub const KERNEL_VERSION: u32 = 1;

pub mod keywords;
pub mod domain;
pub mod events;
pub mod state;
pub mod activity;
pub mod skills;
pub mod transitions;
pub mod invariants;
pub mod hashing;
pub mod passport;
