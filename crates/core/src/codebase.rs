//! Codebase metadata attached to work-item fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Value;

const REPOSITORY_KEY: &str = "repository";
const BRANCH_KEY: &str = "branch";
const FILE_NAME_KEY: &str = "file_name";
const LINE_NUMBER_KEY: &str = "line_number";

/// Errors raised by codebase metadata validation and decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodebaseError {
    /// The repository field is empty
    #[error("codebase content is missing a repository")]
    MissingRepository,

    /// The repository field is not a valid URL
    #[error("codebase repository {0:?} is not a valid URL")]
    BadRepositoryUrl(String),

    /// A map key holds a value of the wrong type
    #[error("codebase map key {key:?} holds a {actual} value")]
    BadMapValue {
        /// The offending key
        key: String,
        /// Type name of the value found under the key
        actual: &'static str,
    },
}

/// A pointer into a codebase: repository, branch, file and line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodebaseContent {
    /// Repository URL
    pub repository: String,

    /// Branch name
    pub branch: String,

    /// File within the repository
    pub file_name: String,

    /// Line within the file
    pub line_number: i64,
}

impl CodebaseContent {
    /// Check that this content points at an addressable repository.
    pub fn validate(&self) -> Result<(), CodebaseError> {
        if self.repository.is_empty() {
            return Err(CodebaseError::MissingRepository);
        }
        if url::Url::parse(&self.repository).is_err() {
            return Err(CodebaseError::BadRepositoryUrl(self.repository.clone()));
        }
        Ok(())
    }

    /// Canonical map representation, as stored in field values.
    pub fn to_map(&self) -> BTreeMap<String, Value> {
        let mut map = BTreeMap::new();
        map.insert(
            REPOSITORY_KEY.to_string(),
            Value::String(self.repository.clone()),
        );
        map.insert(BRANCH_KEY.to_string(), Value::String(self.branch.clone()));
        map.insert(
            FILE_NAME_KEY.to_string(),
            Value::String(self.file_name.clone()),
        );
        map.insert(LINE_NUMBER_KEY.to_string(), Value::Int(self.line_number));
        map
    }

    /// Rebuild content from its canonical map representation.
    pub fn from_map(map: &BTreeMap<String, Value>) -> Result<Self, CodebaseError> {
        let mut content = CodebaseContent::default();
        for (key, field) in [
            (REPOSITORY_KEY, &mut content.repository),
            (BRANCH_KEY, &mut content.branch),
            (FILE_NAME_KEY, &mut content.file_name),
        ] {
            match map.get(key) {
                Some(Value::String(s)) => *field = s.clone(),
                None | Some(Value::Null) => {}
                Some(other) => {
                    return Err(CodebaseError::BadMapValue {
                        key: key.to_string(),
                        actual: other.type_name(),
                    })
                }
            }
        }
        match map.get(LINE_NUMBER_KEY) {
            Some(Value::Int(n)) => content.line_number = *n,
            None | Some(Value::Null) => {}
            Some(other) => {
                return Err(CodebaseError::BadMapValue {
                    key: LINE_NUMBER_KEY.to_string(),
                    actual: other.type_name(),
                })
            }
        }
        Ok(content)
    }

    /// Flat single-line rendering used for indexing.
    pub fn to_index_string(&self) -> String {
        format!(
            "{}#{}#{}:{}",
            self.repository, self.branch, self.file_name, self.line_number
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CodebaseContent {
        CodebaseContent {
            repository: "https://github.com/acme/widget.git".to_string(),
            branch: "main".to_string(),
            file_name: "src/lib.rs".to_string(),
            line_number: 42,
        }
    }

    #[test]
    fn valid_content_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn empty_repository_fails() {
        let cb = CodebaseContent::default();
        assert_eq!(cb.validate(), Err(CodebaseError::MissingRepository));
    }

    #[test]
    fn non_url_repository_fails() {
        let mut cb = sample();
        cb.repository = "not a url".to_string();
        assert!(matches!(
            cb.validate(),
            Err(CodebaseError::BadRepositoryUrl(_))
        ));
    }

    #[test]
    fn map_round_trip() {
        let cb = sample();
        assert_eq!(CodebaseContent::from_map(&cb.to_map()).unwrap(), cb);
    }

    #[test]
    fn mistyped_map_keys_are_rejected() {
        let mut map = sample().to_map();
        map.insert(LINE_NUMBER_KEY.to_string(), Value::String("42".to_string()));
        assert_eq!(
            CodebaseContent::from_map(&map),
            Err(CodebaseError::BadMapValue {
                key: LINE_NUMBER_KEY.to_string(),
                actual: "string",
            })
        );

        let mut map = sample().to_map();
        map.insert(BRANCH_KEY.to_string(), Value::Bool(true));
        assert_eq!(
            CodebaseContent::from_map(&map),
            Err(CodebaseError::BadMapValue {
                key: BRANCH_KEY.to_string(),
                actual: "bool",
            })
        );
    }

    #[test]
    fn index_string_shape() {
        assert_eq!(
            sample().to_index_string(),
            "https://github.com/acme/widget.git#main#src/lib.rs:42"
        );
    }
}
