//! The bounded validate-and-repair loop
//!
//! Text generation itself is an external collaborator reached through
//! the [`GenerationService`] trait; this module owns the control flow
//! around it. Each attempt asks the service for a draft, strips any
//! Markdown code fences from the reply, parses and validates it, and
//! either accepts the document or feeds the collected diagnostics back
//! into the next request. The loop is bounded: after
//! [`RefineConfig::max_attempts`] rejected drafts it fails with
//! [`Error::RefinementExhausted`], never partially accepting a draft.
//!
//! Transport failures abort immediately as
//! [`Error::GenerationUnavailable`]; no draft was produced, so nothing
//! counts against the attempt budget.

use log::{debug, warn};

use crate::diagnostic::{Diagnostic, render_report};
use crate::error::{Error, Result};
use crate::model::{Document, ValidatorConfig};
use crate::validator::{Validation, validate_text};

/// One request to the external generation service
///
/// On the first attempt `previous_draft` is `None` and `diagnostics`
/// is empty. On revision requests both carry the rejected draft and
/// its findings as correction context.
#[derive(Debug)]
pub struct GenerationRequest<'a> {
    /// The format/task instruction prompt
    pub instructions: &'a str,
    /// The natural-language description of the section to build
    pub description: &'a str,
    /// The previous rejected draft, when revising
    pub previous_draft: Option<&'a str>,
    /// Ordered findings of the previous attempt
    pub diagnostics: &'a [Diagnostic],
    /// 1-based attempt number
    pub attempt: usize,
}

impl GenerationRequest<'_> {
    /// Whether this request revises a rejected draft
    pub fn is_revision(&self) -> bool {
        self.previous_draft.is_some()
    }

    /// Render the diagnostics as correction feedback text
    ///
    /// Service implementations append this to the conversation when
    /// requesting a revision. `None` on first attempts.
    pub fn correction_feedback(&self) -> Option<String> {
        if self.diagnostics.is_empty() {
            return None;
        }
        Some(format!(
            "The generated cross section is invalid.\n{}\
             Please revise the output to conform to the required format and ensure correct \
             topology.",
            render_report(self.diagnostics)
        ))
    }
}

/// The external text-generation collaborator
///
/// Implementations wrap whatever backend produces DSL text from a
/// description. The call blocks; the implementation owns its transport
/// timeout. An `Err` is surfaced as [`Error::GenerationUnavailable`]
/// and aborts the refinement loop without consuming an attempt.
pub trait GenerationService {
    /// Produce a DSL draft for the request
    fn generate_section(
        &mut self,
        request: GenerationRequest<'_>,
    ) -> std::result::Result<String, String>;
}

/// Attempt budget for the refinement loop
#[derive(Debug, Clone, Copy)]
pub struct RefineConfig {
    /// Maximum number of drafts to generate and validate (default 3)
    pub max_attempts: usize,
}

impl RefineConfig {
    /// Default configuration: three attempts
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the attempt budget
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

/// One generated draft and the findings that rejected it
///
/// An accepted draft has an empty findings list.
#[derive(Debug, Clone)]
pub struct Attempt {
    /// The draft text after fence stripping
    pub text: String,
    /// The findings; empty when the draft was accepted
    pub diagnostics: Vec<Diagnostic>,
}

/// A successfully refined section
#[derive(Debug)]
pub struct Accepted {
    /// The validated document
    pub document: Document,
    /// The accepted DSL text
    pub text: String,
    /// How many attempts it took
    pub attempts: usize,
}

/// Drives generate → validate → revise until acceptance or exhaustion
///
/// A `Refiner` is scoped to one request at a time; [`Refiner::refine`]
/// resets the attempt history. It is the only stateful object in the
/// crate and holds no document state between calls.
///
/// # Example
///
/// ```no_run
/// use geosection::{GenerationRequest, GenerationService, Refiner};
///
/// struct MyBackend;
/// impl GenerationService for MyBackend {
///     fn generate_section(
///         &mut self,
///         request: GenerationRequest<'_>,
///     ) -> Result<String, String> {
///         // call out to a model, using request.correction_feedback()
///         // on revisions
///         todo!()
///     }
/// }
///
/// # fn main() -> geosection::Result<()> {
/// let mut refiner = Refiner::new(MyBackend);
/// let accepted = refiner.refine(
///     "Emit vertices then polygons…",
///     "A normal fault with two layers",
/// )?;
/// println!("accepted after {} attempt(s)", accepted.attempts);
/// # Ok(())
/// # }
/// ```
pub struct Refiner<S: GenerationService> {
    service: S,
    config: RefineConfig,
    validator: ValidatorConfig,
    history: Vec<Attempt>,
}

impl<S: GenerationService> Refiner<S> {
    /// Create a refiner with default configuration
    pub fn new(service: S) -> Self {
        Self {
            service,
            config: RefineConfig::default(),
            validator: ValidatorConfig::default(),
            history: Vec::new(),
        }
    }

    /// Replace the attempt budget
    pub fn with_config(mut self, config: RefineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the validator tolerances
    pub fn with_validator_config(mut self, validator: ValidatorConfig) -> Self {
        self.validator = validator;
        self
    }

    /// The attempts of the most recent [`Refiner::refine`] call
    pub fn history(&self) -> &[Attempt] {
        &self.history
    }

    /// Recover the wrapped service
    pub fn into_service(self) -> S {
        self.service
    }

    /// Generate and validate drafts until one is accepted
    ///
    /// Returns [`Error::RefinementExhausted`] with the last findings
    /// when the attempt budget runs out, or
    /// [`Error::GenerationUnavailable`] when the service fails.
    pub fn refine(&mut self, instructions: &str, description: &str) -> Result<Accepted> {
        self.history.clear();
        let max_attempts = self.config.max_attempts.max(1);
        let mut previous: Option<String> = None;
        let mut diagnostics: Vec<Diagnostic> = Vec::new();

        for attempt in 1..=max_attempts {
            let reply = self
                .service
                .generate_section(GenerationRequest {
                    instructions,
                    description,
                    previous_draft: previous.as_deref(),
                    diagnostics: &diagnostics,
                    attempt,
                })
                .map_err(Error::GenerationUnavailable)?;

            let draft = strip_code_fences(&reply);
            match validate_text(&draft, &self.validator) {
                Validation::Valid(document) => {
                    debug!("attempt {} accepted", attempt);
                    self.history.push(Attempt {
                        text: draft.clone(),
                        diagnostics: Vec::new(),
                    });
                    return Ok(Accepted {
                        document,
                        text: draft,
                        attempts: attempt,
                    });
                }
                Validation::Invalid {
                    diagnostics: findings,
                } => {
                    warn!(
                        "attempt {}/{} rejected with {} finding(s)",
                        attempt,
                        max_attempts,
                        findings.len()
                    );
                    self.history.push(Attempt {
                        text: draft.clone(),
                        diagnostics: findings.clone(),
                    });
                    previous = Some(draft);
                    diagnostics = findings;
                }
            }
        }

        Err(Error::RefinementExhausted {
            attempts: max_attempts,
            diagnostics,
        })
    }
}

/// Remove Markdown code fences from generated text
///
/// Generation backends routinely wrap their replies in fenced code
/// blocks despite instructions. A full wrap (with optional language
/// tag) is unwrapped, and any stray fence lines inside the text are
/// dropped.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let mut lines: Vec<&str> = trimmed.lines().collect();

    if let Some(first) = lines.first()
        && first.trim_start().starts_with("```")
    {
        lines.remove(0);
        if let Some(last) = lines.last()
            && last.trim() == "```"
        {
            lines.pop();
        }
    }
    lines.retain(|line| !line.trim_start().starts_with("```"));

    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticKind;

    #[test]
    fn test_strip_full_code_block() {
        let wrapped = "```\n0 0 0\nlayer 0 1 2\n```";
        assert_eq!(strip_code_fences(wrapped), "0 0 0\nlayer 0 1 2\n");

        let tagged = "```text\n0 0 0\n```\n";
        assert_eq!(strip_code_fences(tagged), "0 0 0\n");
    }

    #[test]
    fn test_strip_leaves_bare_text_alone() {
        assert_eq!(strip_code_fences("0 0 0\nlayer 0 1 2\n"), "0 0 0\nlayer 0 1 2\n");
        assert_eq!(strip_code_fences(""), "");
    }

    #[test]
    fn test_strip_drops_stray_fences() {
        let messy = "0 0 0\n```\nlayer 0 1 2\n";
        assert_eq!(strip_code_fences(messy), "0 0 0\nlayer 0 1 2\n");
    }

    #[test]
    fn test_correction_feedback_rendering() {
        let diagnostics =
            vec![Diagnostic::new(DiagnosticKind::GapDetected, "gaps remain").with_area(2.5)];
        let request = GenerationRequest {
            instructions: "",
            description: "",
            previous_draft: Some("draft"),
            diagnostics: &diagnostics,
            attempt: 2,
        };
        assert!(request.is_revision());
        let feedback = request.correction_feedback().unwrap();
        assert!(feedback.contains("invalid"));
        assert!(feedback.contains("- gaps remain"));
        assert!(feedback.contains("revise"));
    }

    #[test]
    fn test_first_attempt_has_no_feedback() {
        let request = GenerationRequest {
            instructions: "",
            description: "",
            previous_draft: None,
            diagnostics: &[],
            attempt: 1,
        };
        assert!(!request.is_revision());
        assert!(request.correction_feedback().is_none());
    }
}
