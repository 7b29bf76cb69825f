//! The closed registry of field kinds.

use serde::{Deserialize, Serialize};

/// Identifies how a field's value must be interpreted.
///
/// The set is closed: adding a variant forces every conversion site in the
/// field engine to be updated, since dispatch is an exhaustive `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// Plain string
    String,
    /// Reference to a user
    User,
    /// Reference to an iteration
    Iteration,
    /// Reference to an area
    Area,
    /// Reference to a label
    Label,
    /// Reference to a board column
    BoardColumn,
    /// Reference to an item in a remote tracker, stored as a UUID
    RemoteTracker,
    /// URL string
    Url,
    /// 64-bit float
    Float,
    /// Integer (also accepts whole-number floats)
    Integer,
    /// Point in time, stored as nanoseconds since epoch
    Instant,
    /// Boolean
    Boolean,
    /// Rich text with a markup dialect
    Markup,
    /// Codebase metadata (repository, branch, file, line)
    Codebase,
    /// Sequence of values; requires a wrapping list type
    List,
    /// Closed set of values; requires a wrapping enum type
    Enum,
}

impl Kind {
    /// Whether this kind can back a [`crate::SimpleType`] on its own.
    ///
    /// `List` and `Enum` are composite: they need a wrapping type and are
    /// therefore not simple.
    pub fn is_simple_type(&self) -> bool {
        !matches!(self, Kind::List | Kind::Enum)
    }

    /// The snake_case wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::User => "user",
            Kind::Iteration => "iteration",
            Kind::Area => "area",
            Kind::Label => "label",
            Kind::BoardColumn => "board_column",
            Kind::RemoteTracker => "remote_tracker",
            Kind::Url => "url",
            Kind::Float => "float",
            Kind::Integer => "integer",
            Kind::Instant => "instant",
            Kind::Boolean => "boolean",
            Kind::Markup => "markup",
            Kind::Codebase => "codebase",
            Kind::List => "list",
            Kind::Enum => "enum",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_kinds() {
        assert!(Kind::String.is_simple_type());
        assert!(Kind::Instant.is_simple_type());
        assert!(Kind::Codebase.is_simple_type());
        assert!(!Kind::List.is_simple_type());
        assert!(!Kind::Enum.is_simple_type());
    }

    #[test]
    fn wire_names() {
        assert_eq!(Kind::BoardColumn.to_string(), "board_column");
        assert_eq!(
            serde_json::to_string(&Kind::RemoteTracker).unwrap(),
            "\"remote_tracker\""
        );
    }
}
