//! Error types for cross-section parsing, validation and refinement
//!
//! All errors include error codes for categorization and enough context
//! to act on without re-running the failing operation.
//!
//! # Error Codes
//!
//! Error codes follow the pattern: `E<category><number>`
//!
//! Categories:
//! - **E1xxx**: I/O errors
//! - **E2xxx**: DSL syntax and structure errors
//! - **E3xxx**: geometry computation errors
//! - **E4xxx**: generation-service and refinement errors

use std::io;
use thiserror::Error;

use crate::diagnostic::Diagnostic;

/// Result type for cross-section operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when parsing, validating or refining a cross-section
#[derive(Error, Debug)]
pub enum Error {
    /// IO error occurred while reading a definition file
    ///
    /// **Error Code**: E1001
    #[error("[E1001] I/O error: {0}")]
    Io(#[from] io::Error),

    /// A line of the definition could not be parsed
    ///
    /// **Error Code**: E2001
    ///
    /// **Common Causes**:
    /// - A line that is neither a vertex record nor a polygon record
    /// - A malformed numeric literal in a vertex record
    /// - Vertex ids in a polygon record that are not integers
    #[error("[E2001] Syntax error: {0}")]
    Syntax(String),

    /// The definition parsed but violates a structural rule
    ///
    /// **Error Code**: E2002
    ///
    /// **Common Causes**:
    /// - Duplicate vertex ids or coordinates
    /// - Polygon names that repeat or fail the name grammar
    /// - References to vertices that were never declared
    /// - Vertex records appearing after the first polygon record
    #[error("[E2002] Invalid section: {0}")]
    InvalidSection(String),

    /// XML writing error
    ///
    /// **Error Code**: E2003
    #[error("[E2003] XML writing error: {0}")]
    XmlWrite(String),

    /// A polygon boolean operation failed
    ///
    /// **Error Code**: E3001
    ///
    /// Raised when the clipping backend rejects the input rings, which
    /// normally indicates severely malformed geometry.
    #[error("[E3001] Geometry computation failed: {0}")]
    Geometry(String),

    /// The external generation service could not produce a draft
    ///
    /// **Error Code**: E4001
    ///
    /// Transport failures and timeouts abort the refinement loop
    /// immediately; they do not count against the attempt budget
    /// because no draft was produced to validate.
    #[error("[E4001] Generation service unavailable: {0}")]
    GenerationUnavailable(String),

    /// The refinement loop exhausted its attempt budget
    ///
    /// **Error Code**: E4002
    ///
    /// Carries the diagnostics of the last rejected draft so the caller
    /// can surface what was still wrong.
    #[error("[E4002] Refinement exhausted after {attempts} attempt(s)")]
    RefinementExhausted {
        /// Number of drafts that were generated and rejected
        attempts: usize,
        /// Diagnostics of the final rejected draft
        diagnostics: Vec<Diagnostic>,
    },
}

impl Error {
    /// Create a Syntax error tied to a 1-based source line
    pub fn syntax_at(line: usize, message: impl Into<String>) -> Self {
        Error::Syntax(format!("Line {}: {}", line, message.into()))
    }

    /// Create an XmlWrite error
    pub fn xml_write(message: impl Into<String>) -> Self {
        Error::XmlWrite(message.into())
    }
}
