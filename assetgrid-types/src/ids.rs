//! Identifier types used throughout the AssetGrid core.
//!
//! Uses UUID v7 for time-ordered, globally unique identifiers. Placeholder
//! rows (created locally, not yet persisted) use UUID v4 instead: their ids
//! are discarded once the authoritative row arrives, so no ordering claim is
//! made for them.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new identifier with the current timestamp.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an identifier from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }

            /// Parses an identifier from a string.
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for a row ("asset") in a table.
    RowId
}

uuid_id! {
    /// Unique identifier for a table.
    TableId
}

uuid_id! {
    /// Unique identifier for a collaborating user.
    UserId
}

uuid_id! {
    /// Unique identifier for a schema property (column).
    PropertyId
}

uuid_id! {
    /// Unique identifier for a schema section (column group).
    SectionId
}

impl RowId {
    /// Creates a temporary identifier for a placeholder row.
    ///
    /// Placeholder ids are random (v4); they never reach the persistence
    /// layer and are replaced by the authoritative id on creation success.
    #[must_use]
    pub fn placeholder() -> Self {
        Self(Uuid::new_v4())
    }
}

/// User-defined key addressing a property value on a row.
///
/// Column keys come from the schema subsystem and are plain strings, not
/// generated identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyKey(String);

impl PropertyKey {
    /// Creates a property key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for PropertyKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_id_display_and_parse() {
        let id = RowId::new();
        let parsed: RowId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn placeholder_ids_are_unique() {
        assert_ne!(RowId::placeholder(), RowId::placeholder());
    }

    #[test]
    fn property_key_borrows_as_str() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(PropertyKey::from("color"), 1);
        assert_eq!(map.get("color"), Some(&1));
    }
}
