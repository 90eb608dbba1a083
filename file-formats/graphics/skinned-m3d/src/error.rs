use std::io;
use thiserror::Error;

use skinned_data::SkinnedError;

/// Error types for M3D model reading and writing
#[derive(Error, Debug)]
pub enum M3dError {
    /// I/O Error during reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input ended while more tokens were required
    #[error("Unexpected end of file: expected {expected}")]
    UnexpectedEof { expected: String },

    /// A label or section banner did not match
    #[error("Line {line}: expected '{expected}', found '{found}'")]
    UnexpectedToken {
        line: usize,
        expected: String,
        found: String,
    },

    /// A token could not be parsed as a number
    #[error("Line {line}: invalid number '{token}'")]
    InvalidNumber { line: usize, token: String },

    /// The skeleton exceeds what a skinning shader can address
    #[error("Too many bones: {count} (maximum {max})")]
    TooManyBones { count: usize, max: usize },

    /// Cross-references between sections are inconsistent
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The skeleton or its clips were rejected
    #[error("Skeleton error: {0}")]
    Skinned(#[from] SkinnedError),
}

/// Result type using M3dError
pub type Result<T> = std::result::Result<T, M3dError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = M3dError::UnexpectedToken {
            line: 12,
            expected: "Normal:".to_string(),
            found: "Nromal:".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Line 12: expected 'Normal:', found 'Nromal:'"
        );

        let error = M3dError::from(SkinnedError::ClipNotFound("Run".to_string()));
        assert_eq!(error.to_string(), "Skeleton error: Clip not found: 'Run'");
    }
}
