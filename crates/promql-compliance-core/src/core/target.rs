// crates/promql-compliance-core/src/core/target.rs
// ============================================================================
// Module: Target Roles
// Description: Identifies which side of a comparison a value belongs to.
// Purpose: Tag tweaks, replies, and failures with reference/test roles.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`TargetRole`] names the reference or test side of a comparison. Tweak
//! scopes, query replies, and failure messages carry it so reports can say
//! which engine produced what.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Role a query target plays in a comparison.
///
/// # Invariants
/// - Variants are stable for configuration and report labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetRole {
    /// Trusted engine used as ground truth.
    Reference,
    /// Engine under evaluation.
    Test,
}

impl TargetRole {
    /// Both roles in comparison order.
    pub const ALL: [Self; 2] = [Self::Reference, Self::Test];

    /// Returns a stable label for the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for TargetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
