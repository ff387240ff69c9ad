//! Error taxonomy for the engine (spec §7).
//!
//! `ErrorKind` is the exhaustive set of conditions the state machine can
//! raise; `ParinferError` pairs a kind with the position it occurred at
//! (plus, for unmatched-close-paren/unclosed-paren, the position of the
//! opener it should have matched). `EngineSignal` additionally carries the
//! two internal control signals used by Smart Mode to fall back to Paren
//! Mode — callers of the public API never see those, only `ParinferError`.

use std::fmt;

/// One of the eight named error conditions from spec §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    #[error("Quotes must balanced inside comment blocks.")]
    QuoteDanger,
    #[error("Line cannot end in a hanging backslash.")]
    EolBackslash,
    #[error("String is missing a closing quote.")]
    UnclosedQuote,
    #[error("Unclosed open-paren.")]
    UnclosedParen,
    #[error("Unmatched close-paren.")]
    UnmatchedCloseParen,
    #[error("Unmatched open-paren.")]
    UnmatchedOpenParen,
    #[error("Line cannot lead with a close-paren.")]
    LeadingCloseParen,
    #[error("Unhandled error.")]
    Unhandled,
}

impl ErrorKind {
    /// Stable name matching the reference implementation's `result.error.name`.
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::QuoteDanger => "quote-danger",
            ErrorKind::EolBackslash => "eol-backslash",
            ErrorKind::UnclosedQuote => "unclosed-quote",
            ErrorKind::UnclosedParen => "unclosed-paren",
            ErrorKind::UnmatchedCloseParen => "unmatched-close-paren",
            ErrorKind::UnmatchedOpenParen => "unmatched-open-paren",
            ErrorKind::LeadingCloseParen => "leading-close-paren",
            ErrorKind::Unhandled => "unhandled",
        }
    }
}

impl fmt::Display for ParinferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at line {}, x {}",
            self.kind, self.line_no, self.x
        )
    }
}

/// Extra context attached to `unmatched-close-paren` (the opener it should
/// have matched) or surfaced when the stack never closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorExtra {
    pub kind: ErrorKind,
    pub line_no: usize,
    pub x: usize,
}

/// A user-facing error, positioned in whichever coordinate space the
/// returned text uses (output coordinates when `partial_result` is set,
/// input coordinates otherwise — see `Processor::raise`).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParinferError {
    pub kind: ErrorKind,
    pub line_no: usize,
    pub x: usize,
    pub extra: Option<ErrorExtra>,
}

impl std::error::Error for ParinferError {}

/// Position of a potential error, cached in both coordinate spaces so the
/// eventual report can be expressed relative to whichever text the caller
/// sees (spec §7, "errorPosCache stores both output and input coordinates").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorPos {
    pub line_no: usize,
    pub x: usize,
    pub input_line_no: usize,
    pub input_x: usize,
}

/// Internal control-flow signal. Only `Fatal` ever reaches the public API;
/// `LeadingCloseParen` and `ReleaseCursorHold` are caught by `process_text`
/// and trigger a full restart in Paren Mode (spec §9, "exception-as-signal").
#[derive(Debug, Clone)]
pub(crate) enum EngineSignal {
    Fatal(ParinferError),
    LeadingCloseParen,
    ReleaseCursorHold,
}

impl From<ParinferError> for EngineSignal {
    fn from(e: ParinferError) -> Self {
        EngineSignal::Fatal(e)
    }
}

pub(crate) type EngineResult<T> = Result<T, EngineSignal>;
