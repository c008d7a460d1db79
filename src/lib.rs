//! # geosection
//!
//! Parsing, topology validation and bounded refinement for 2-D
//! geological cross-section definitions.
//!
//! A cross-section is a vertical rectangular domain (horizontal extent
//! × depth, in kilometres) partitioned into named polygons representing
//! geological bodies. Definitions arrive as a small line-oriented text
//! format: numbered vertices first, then polygons referencing them by
//! id. The text typically comes from a generative model and cannot be
//! trusted; this crate decides whether it describes a watertight
//! section — the polygons must tile the bounding rectangle exactly,
//! with no gaps, no overlapping interiors and a single connected
//! region — and drives a bounded correction loop that feeds validation
//! findings back to the generator until a draft passes or the attempt
//! budget runs out.
//!
//! ## Features
//!
//! - Strict two-phase parser with collected diagnostics
//! - Geometric validation via robust polygon boolean operations
//! - Stable, serializable diagnostic records for correction feedback
//! - Bounded generate → validate → revise loop over a service trait
//! - Canonical DSL and XML serialization of validated documents
//!
//! ## Example
//!
//! ```
//! use geosection::{ValidatorConfig, validate_text};
//!
//! let definition = "# a single 20 km x 5 km layer
//! 0 0 0
//! 1 20 0
//! 2 20 -5
//! 3 0 -5
//! layer 0 1 2 3
//! ";
//!
//! let validation = validate_text(definition, &ValidatorConfig::default());
//! assert!(validation.is_valid());
//! let document = validation.into_document().unwrap();
//! assert_eq!(document.bounding_rect().unwrap().area(), 100.0);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod diagnostic;
pub mod error;
pub mod geometry;
pub mod lexer;
pub mod model;
pub mod parser;
pub mod refine;
pub mod validator;
pub mod writer;

pub use diagnostic::{Diagnostic, DiagnosticKind, Severity, render_report};
pub use error::{Error, Result};
pub use model::{
    BoundingRect, Document, Polygon, PolygonName, ValidatorConfig, Vertex, VertexTable,
};
pub use refine::{
    Accepted, Attempt, GenerationRequest, GenerationService, RefineConfig, Refiner,
    strip_code_fences,
};
pub use validator::{Validation, validate_document, validate_text};
pub use writer::{to_dsl, to_xml};

use std::path::Path;
use std::str::FromStr;

impl FromStr for Document {
    type Err = Error;

    /// Parse a definition strictly with default tolerances
    ///
    /// Fails on the first syntax or reference finding and runs no
    /// geometry checks; use [`validate_text`] for full validation with
    /// collected diagnostics.
    fn from_str(s: &str) -> Result<Self> {
        parser::parse_document(s, &ValidatorConfig::default())
    }
}

impl Document {
    /// Parse a definition file strictly with default tolerances
    ///
    /// # Example
    ///
    /// ```no_run
    /// use geosection::Document;
    ///
    /// # fn main() -> geosection::Result<()> {
    /// let document = Document::from_file("section.txt")?;
    /// println!("{} polygons", document.polygons().len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        text.parse()
    }
}
