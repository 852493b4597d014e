// Category resolution: maps a requested (gender, type) pair onto the
// canonical key used to select teams and standings rows.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The sentinel type label meaning "no tier subdivision".
pub const ALL: &str = "All";

/// The gender group whose teams are split into competition tiers.
pub const DEFAULT_TIERED_GENDER: &str = "Male";

/// The type half of a [`CategoryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolvedType {
    /// The default bucket shared by every group without tiers.
    All,
    /// A specific tier label such as "Elite" or "Social".
    Tier(String),
}

impl ResolvedType {
    /// Label as stored in the `type` column (`"All"` for the sentinel).
    pub fn as_str(&self) -> &str {
        match self {
            ResolvedType::All => ALL,
            ResolvedType::Tier(t) => t,
        }
    }

    pub fn tier(&self) -> Option<&str> {
        match self {
            ResolvedType::All => None,
            ResolvedType::Tier(t) => Some(t),
        }
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical category filter.
///
/// `resolved_type` is a specific tier only when `gender` is the tiered
/// gender; construct through [`CategoryResolver::resolve`] to keep that true.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryKey {
    pub gender: String,
    pub resolved_type: ResolvedType,
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.gender, self.resolved_type)
    }
}

/// Resolves requested categories against the configured tiered gender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryResolver {
    tiered_gender: String,
}

impl Default for CategoryResolver {
    fn default() -> Self {
        Self::new(DEFAULT_TIERED_GENDER)
    }
}

impl CategoryResolver {
    pub fn new(tiered_gender: impl Into<String>) -> Self {
        Self {
            tiered_gender: tiered_gender.into(),
        }
    }

    pub fn tiered_gender(&self) -> &str {
        &self.tiered_gender
    }

    /// True when tier qualifiers are meaningful for `gender`.
    pub fn is_tiered(&self, gender: &str) -> bool {
        gender == self.tiered_gender
    }

    /// Resolve a requested category.
    ///
    /// Matching is exact and case-sensitive. Unknown genders pass through
    /// untouched; checking them against the known set is the caller's job.
    pub fn resolve(&self, gender: &str, requested_type: &str) -> CategoryKey {
        let resolved_type = if self.is_tiered(gender) && requested_type != ALL {
            ResolvedType::Tier(requested_type.to_string())
        } else {
            ResolvedType::All
        };

        CategoryKey {
            gender: gender.to_string(),
            resolved_type,
        }
    }
}

/// Resolve with the default tiered gender.
pub fn resolve(gender: &str, requested_type: &str) -> CategoryKey {
    CategoryResolver::default().resolve(gender, requested_type)
}
