//! Category taxonomy for the 50/30/20 rule
//!
//! Categories are free text on entries. A `CategoryMap` decides which of
//! them count as Needs and which as Wants; anything else is unclassified.
//! The map is configuration data, passed to the analysis engine rather than
//! baked into it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Default Needs categories
pub const DEFAULT_NEEDS: &[&str] = &[
    "Housing",
    "Food",
    "Utilities",
    "Transportation",
    "Healthcare",
    "Insurance",
];

/// Default Wants categories
pub const DEFAULT_WANTS: &[&str] = &["Lifestyle", "Entertainment", "Shopping", "Dining", "Travel"];

/// Category used by older records that stored savings as an expense
pub const LEGACY_SAVINGS_CATEGORY: &str = "Savings";

/// A 50/30/20 bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Needs,
    Wants,
    Savings,
}

impl Bucket {
    /// Share of income the bucket targets, in percent
    pub const fn target_percent(&self) -> u32 {
        match self {
            Self::Needs => 50,
            Self::Wants => 30,
            Self::Savings => 20,
        }
    }

    /// All buckets in display order
    pub fn all() -> &'static [Self] {
        &[Self::Needs, Self::Wants, Self::Savings]
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Needs => write!(f, "Needs"),
            Self::Wants => write!(f, "Wants"),
            Self::Savings => write!(f, "Savings"),
        }
    }
}

/// Which expense categories belong to the Needs and Wants buckets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMap {
    /// Categories counted as Needs
    #[serde(default)]
    pub needs: BTreeSet<String>,

    /// Categories counted as Wants
    #[serde(default)]
    pub wants: BTreeSet<String>,

    /// When set, expenses in this category also count toward savings spent
    ///
    /// Compatibility with records that stored savings as an expense. Such
    /// entries stay in total expenses either way.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_savings_category: Option<String>,
}

impl Default for CategoryMap {
    fn default() -> Self {
        Self::new(DEFAULT_NEEDS.iter().copied(), DEFAULT_WANTS.iter().copied())
    }
}

impl CategoryMap {
    /// Build a map from explicit Needs and Wants lists
    pub fn new<N, W, S>(needs: N, wants: W) -> Self
    where
        N: IntoIterator<Item = S>,
        W: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            needs: needs.into_iter().map(Into::into).collect(),
            wants: wants.into_iter().map(Into::into).collect(),
            legacy_savings_category: None,
        }
    }

    /// An empty taxonomy: every expense is unclassified
    pub fn empty() -> Self {
        Self {
            needs: BTreeSet::new(),
            wants: BTreeSet::new(),
            legacy_savings_category: None,
        }
    }

    /// Also count expenses in `category` as savings spent
    pub fn with_legacy_savings(mut self, category: impl Into<String>) -> Self {
        self.legacy_savings_category = Some(category.into());
        self
    }

    /// Classify an expense category
    ///
    /// Matching ignores ASCII case and surrounding whitespace. A category
    /// listed in both sets is a Need.
    pub fn classify(&self, category: &str) -> Option<Bucket> {
        let category = category.trim();
        if category.is_empty() {
            return None;
        }

        if contains_ignore_case(&self.needs, category) {
            Some(Bucket::Needs)
        } else if contains_ignore_case(&self.wants, category) {
            Some(Bucket::Wants)
        } else {
            None
        }
    }

    /// Whether an expense in `category` is a legacy savings record
    pub fn is_legacy_savings(&self, category: &str) -> bool {
        self.legacy_savings_category
            .as_deref()
            .is_some_and(|legacy| legacy.trim().eq_ignore_ascii_case(category.trim()))
    }
}

fn contains_ignore_case(set: &BTreeSet<String>, category: &str) -> bool {
    set.iter()
        .any(|candidate| candidate.trim().eq_ignore_ascii_case(category))
}
