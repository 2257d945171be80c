//! Strongly-typed ID wrappers for budget entries and their owners
//!
//! Entry ids and user ids are both UUIDs on the wire; the newtypes keep them
//! from being swapped at compile time. For display an id is shortened to a
//! kind prefix plus the first eight hex digits, e.g. `ent-550e8400`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Prefix used in the short display form
            pub const PREFIX: &'static str = $prefix;

            /// Random v4 id
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let hex = self.0.simple().to_string();
                write!(f, "{}{}", Self::PREFIX, &hex[..8])
            }
        }

        /// Accepts a bare UUID or one carrying this id's prefix
        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                Uuid::parse_str(s.strip_prefix(Self::PREFIX).unwrap_or(s)).map(Self)
            }
        }
    };
}

define_id!(
    /// Identifier of a budget entry, assigned once at creation
    EntryId,
    "ent-"
);
define_id!(
    /// Identifier of the signed-in user owning a ledger
    UserId,
    "usr-"
);
