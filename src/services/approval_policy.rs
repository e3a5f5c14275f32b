//! Tier-based authorization rules for purchase order approvals.
//!
//! An organization assigns each tier an explicit approver through its
//! workflow configuration. When a tier has no explicit assignment, a role
//! fallback applies: tier 1 is approvable by managers, tier 2 by directors,
//! tier 3 by owners. An explicit assignment suppresses the fallback for that
//! tier entirely, so a manager cannot approve a tier-1 order that is assigned
//! to someone else.

use uuid::Uuid;

use super::workflow_config::WorkflowConfig;

/// Approval tiers, ordered by spend authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ApprovalTier {
    First,
    Second,
    Third,
}

impl ApprovalTier {
    pub const ALL: [ApprovalTier; 3] = [
        ApprovalTier::First,
        ApprovalTier::Second,
        ApprovalTier::Third,
    ];

    /// Numeric level as stored on purchase orders.
    pub fn level(self) -> i16 {
        match self {
            ApprovalTier::First => 1,
            ApprovalTier::Second => 2,
            ApprovalTier::Third => 3,
        }
    }

    pub fn from_level(level: i16) -> Option<Self> {
        match level {
            1 => Some(ApprovalTier::First),
            2 => Some(ApprovalTier::Second),
            3 => Some(ApprovalTier::Third),
            _ => None,
        }
    }

    /// Configuration field naming the tier's explicit approver.
    pub fn approver_field(self) -> String {
        format!("tier_{}_approver_user_id", self.level())
    }

    /// Role that may act on this tier when no explicit approver is assigned.
    pub fn fallback_role(self) -> ApproverRole {
        match self {
            ApprovalTier::First => ApproverRole::Manager,
            ApprovalTier::Second => ApproverRole::Director,
            ApprovalTier::Third => ApproverRole::Owner,
        }
    }

    /// Display label shown in pending-approval listings.
    pub fn display_label(self) -> &'static str {
        match self {
            ApprovalTier::First => "Manager",
            ApprovalTier::Second => "Director",
            ApprovalTier::Third => "Owner",
        }
    }
}

/// Roles recognized by the tier fallback. Unknown role strings simply never
/// match, they are not an error.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ApproverRole {
    Manager,
    Director,
    Owner,
}

/// Decides whether `user_id` (optionally carrying `role`) may decide purchase
/// orders of `tier` under the given workflow configuration.
///
/// The explicit assignment is checked first; the role fallback is consulted
/// only when the tier has no explicit approver configured at all. No side
/// effects.
pub fn authorizes(
    config: &WorkflowConfig,
    user_id: Uuid,
    role: Option<ApproverRole>,
    tier: ApprovalTier,
) -> bool {
    match config.explicit_approver(tier) {
        Some(approver_id) => approver_id == user_id,
        None => role == Some(tier.fallback_role()),
    }
}

/// Enumerates every tier the user may act on; used by the pending-approvals
/// listing so the check runs once per request instead of once per order.
pub fn authorized_tiers(
    config: &WorkflowConfig,
    user_id: Uuid,
    role: Option<ApproverRole>,
) -> Vec<ApprovalTier> {
    ApprovalTier::ALL
        .into_iter()
        .filter(|tier| authorizes(config, user_id, role, *tier))
        .collect()
}
