//! A single-pass, character-by-character state machine that infers and
//! maintains balance between indentation and paren structure in Lisp-family
//! source, through three modes: Indent, Paren, and Smart.

mod api;
mod error;
mod indent;
mod lexical;
mod line_editor;
mod options;
mod paren;
mod processor;
mod trail;

pub use api::{indent_mode, paren_mode, smart_mode};
pub use error::{ErrorExtra, ErrorKind, ParinferError};
pub use options::{Change, Options, Output, ParenTrailRecord, TabStop};
pub use paren::{Closer, ParenNode, ParenTree};
