use std::io::{self, IsTerminal, Write};

use nu_ansi_term::Color;

use crate::InterpretError;

/// Pretty-print an [`InterpretError`] with caret positioning.
/// If `program` is `Some("bf-tape")`, prefix messages with "bf-tape: ...".
pub fn print_interpret_error(program: Option<&str>, code: &str, err: &InterpretError) {
    let prefix_program = |msg: &str| {
        if let Some(p) = program {
            format!("{p}: {msg}")
        } else {
            msg.to_string()
        }
    };

    match err {
        InterpretError::InvalidInstruction { ch, ip } => {
            let msg = prefix_program(&format!("Parse error: invalid character '{ch}'"));
            print_error_with_context(&msg, code, *ip);
        }
        InterpretError::OutOfRange { ip, cursor, op, source } => {
            let msg = prefix_program(&format!(
                "Runtime error: cursor out of range (cursor={cursor}, op={op}): {source}"
            ));
            print_error_with_context(&msg, code, *ip);
        }
        InterpretError::MalformedProgram { ip, kind } => {
            let msg = prefix_program(&format!("Parse error: unmatched bracket {kind}"));
            print_error_with_context(&msg, code, *ip);
        }
        InterpretError::Io { ip, source } => {
            let msg = prefix_program(&format!("I/O error: {source}"));
            print_error_with_context(&msg, code, *ip);
        }
        InterpretError::Capacity { source } => {
            eprintln!("{}", prefix_program(&format!("Config error: {source}")));
            let _ = io::stderr().flush();
        }
        InterpretError::StepLimitExceeded { .. } | InterpretError::Canceled => {
            eprintln!("{err}");
            let _ = io::stderr().flush();
        }
    }
}

/// Print a concise error with instruction index and a caret context window.
pub fn print_error_with_context(prefix: &str, code: &str, pos: usize) {
    let stderr = io::stderr();
    let mut stderr = stderr.lock();
    let _ = stderr.write_all(render_error_with_context(prefix, code, pos, io::stderr().is_terminal()).as_bytes());
    let _ = stderr.flush();
}

/// Build the message, a short window of `code` around `pos`, and a caret line.
/// Positions count chars, not bytes.
pub fn render_error_with_context(prefix: &str, code: &str, pos: usize, color: bool) -> String {
    // Show a short window around the position for context
    const WINDOW_CHARS: usize = 32;

    let headline = format!("{prefix} at instruction {pos}");
    let headline = if color { Color::Red.bold().paint(headline).to_string() } else { headline };

    let total_chars = code.chars().count();
    let start_char = pos.saturating_sub(WINDOW_CHARS);
    let end_char = (pos + WINDOW_CHARS + 1).min(total_chars);

    let slice: String = code.chars().skip(start_char).take(end_char.saturating_sub(start_char)).collect();

    let mut underline = " ".repeat(pos.saturating_sub(start_char));
    underline.push('^');
    let underline = if color { Color::Yellow.paint(underline).to_string() } else { underline };

    format!("{headline}\n  {slice}\n  {underline}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caret_points_at_offending_char() {
        let out = render_error_with_context("bf-tape: Parse error", "+a+", 1, false);
        assert_eq!(out, "bf-tape: Parse error at instruction 1\n  +a+\n   ^\n");
    }

    #[test]
    fn long_programs_are_windowed() {
        let code = format!("{}x{}", "+".repeat(100), "-".repeat(100));
        let out = render_error_with_context("err", &code, 100, false);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1].trim().chars().count(), 65);
        assert_eq!(lines[2].find('^'), lines[1].find('x'));
    }

    #[test]
    fn windows_count_chars_not_bytes() {
        let out = render_error_with_context("err", "ééx", 2, false);
        assert!(out.contains("\n  ééx\n    ^\n"));
    }
}
