//! Public entry points (C9, spec §5, §6): runs the engine, retries in Paren
//! Mode on a Smart Mode fallback signal, and shapes the result into the
//! public `Output` (spec §9 `publicResult`).

use tracing::{instrument, trace, warn};

use crate::error::EngineSignal;
use crate::options::{Mode, Options, Output};
use crate::processor::Processor;

/// The reference assumes CRLF line endings throughout the text if even one
/// `\r` appears anywhere in it, otherwise LF (spec §4.7 `getLineEnding`).
fn line_ending_for(text: &str) -> &'static str {
    if text.contains('\r') {
        "\r\n"
    } else {
        "\n"
    }
}

/// Runs one engine pass, retrying once in Paren Mode if Smart Mode's
/// leading-close-paren or cursor-release signal fires (spec §9
/// "exception-as-signal").
fn process_text(text: &str, options: &Options, mode: Mode, smart: bool) -> Processor {
    let mut processor = Processor::new(text, options, mode, smart);
    match processor.run() {
        Ok(()) => processor,
        Err(EngineSignal::LeadingCloseParen) | Err(EngineSignal::ReleaseCursorHold) => {
            trace!(?mode, "falling back to paren mode after smart-mode signal");
            process_text(text, options, Mode::Paren, smart)
        }
        Err(EngineSignal::Fatal(e)) => {
            warn!(error = %e, "engine reported a fatal error");
            processor.errors.error = Some(e);
            processor.success = false;
            processor
        }
    }
}

/// Shapes a finished `Processor` into the public `Output` (spec §9
/// `publicResult`).
fn public_result(processor: Processor) -> Output {
    let line_ending = line_ending_for(&processor.orig_text);

    if processor.success {
        Output {
            text: processor.output.join(line_ending),
            success: true,
            cursor_x: processor.cursor.cursor_x,
            cursor_line: processor.cursor.cursor_line,
            error: None,
            tab_stops: processor.tab_stops,
            paren_trails: processor.paren_trails,
            parens: processor.paren_arena.map(|a| a.into_tree()),
        }
    } else {
        let partial = processor.partial_result;
        Output {
            text: if partial { processor.output.join(line_ending) } else { processor.orig_text },
            success: false,
            cursor_x: if partial { processor.cursor.cursor_x } else { processor.cursor.orig_cursor_x },
            cursor_line: if partial { processor.cursor.cursor_line } else { processor.cursor.orig_cursor_line },
            error: processor.errors.error,
            tab_stops: Vec::new(),
            paren_trails: if partial { processor.paren_trails } else { Vec::new() },
            parens: if partial { processor.paren_arena.map(|a| a.into_tree()) } else { None },
        }
    }
}

/// Rewrites indentation to match paren structure as the user edits close
/// parens, inferring new structure from indentation elsewhere (spec §1,
/// Indent Mode).
#[instrument(skip(text, options))]
pub fn indent_mode(text: &str, options: &Options) -> Output {
    let processor = process_text(text, options, Mode::Indent, false);
    public_result(processor)
}

/// Rewrites paren structure to match indentation as the user edits it
/// (spec §1, Paren Mode).
#[instrument(skip(text, options))]
pub fn paren_mode(text: &str, options: &Options) -> Output {
    let processor = process_text(text, options, Mode::Paren, false);
    public_result(processor)
}

/// Indent Mode augmented with cursor-aware heuristics, falling back to
/// Paren Mode around the cursor's own line (spec §1, Smart Mode).
#[instrument(skip(text, options))]
pub fn smart_mode(text: &str, options: &Options) -> Output {
    let smart = options.selection_start_line.is_none();
    let processor = process_text(text, options, Mode::Indent, smart);
    public_result(processor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_ending_follows_any_cr_in_source() {
        assert_eq!(line_ending_for("a\r\nb"), "\r\n");
        assert_eq!(line_ending_for("a\nb"), "\n");
    }

    #[test]
    fn indent_mode_balances_an_unclosed_list() {
        let out = indent_mode("(foo bar", &Options::default());
        assert!(out.success);
        assert_eq!(out.text, "(foo bar)");
    }

    #[test]
    fn paren_mode_reflects_indentation_back_into_parens() {
        let out = paren_mode("(foo\n  bar)", &Options::default());
        assert!(out.success);
    }

    #[test]
    fn smart_mode_accepts_a_leading_close_paren_without_erroring() {
        let out = smart_mode("(foo)\n)", &Options::default());
        assert!(out.success);
    }
}
