//! WorkTrack core data models.
//!
//! This crate defines the typed field system (kinds, tagged values and the
//! simple field type conversion engine) and the comment/revision models that
//! back the audit trail.

#![warn(missing_docs)]

// Core identities
mod id;

// Typed field system
mod codebase;
mod field;
mod kind;
mod markup;
mod value;

// Comments and their audit trail
mod comment;
mod revision;

// Re-exports
pub use id::*;

pub use kind::Kind;
pub use value::Value;

pub use field::{value_to_uuid, ConversionError, FieldType, SimpleType};

pub use codebase::{CodebaseContent, CodebaseError};
pub use markup::{Markup, MarkupContent, MarkupError};

pub use comment::Comment;
pub use revision::{Revision, RevisionType};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
