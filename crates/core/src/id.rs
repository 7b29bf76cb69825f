//! Unique identifiers for WorkTrack entities.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// The nil (all-zero) identifier
            pub fn nil() -> Self {
                Self(Uuid::nil())
            }

            /// Access the underlying UUID
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }
    };
}

define_id! {
    /// Unique identifier for a Comment
    CommentId
}

define_id! {
    /// Unique identifier for a work item
    WorkItemId
}

define_id! {
    /// Opaque identifier of an acting principal, supplied by the
    /// authentication collaborator and never interpreted here.
    IdentityId
}

define_id! {
    /// Unique identifier for a Revision
    RevisionId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_round_trip() {
        let id = CommentId::new();
        let parsed: CommentId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn nil_id_is_all_zero() {
        assert_eq!(
            WorkItemId::nil().to_string(),
            "00000000-0000-0000-0000-000000000000"
        );
    }
}
