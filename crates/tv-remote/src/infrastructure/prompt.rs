//! Numbered-list picker on a terminal.
//!
//! ```text
//! Select a TV:
//!   1) Living Room TV (192.168.1.20)
//!   2) Bedroom (192.168.1.31)
//! Enter a number (q to quit):
//! ```

use std::io::{self, BufRead, StdinLock, Stdout, Write};

use crate::application::select::{SelectError, Selection, Selector};

/// [`Selector`] that prints to `W` and reads one line from `R` per pick.
pub struct PromptSelector<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptSelector<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl PromptSelector<StdinLock<'static>, Stdout> {
    /// Picker on the process's stdin/stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Selector for PromptSelector<R, W> {
    fn select(&mut self, title: &str, items: &[String]) -> Result<Selection, SelectError> {
        if items.is_empty() {
            return Err(SelectError::Empty);
        }

        writeln!(self.output, "{title}")?;
        for (i, item) in items.iter().enumerate() {
            writeln!(self.output, "  {:>2}) {item}", i + 1)?;
        }
        write!(self.output, "Enter a number (q to quit): ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            // EOF: treat like quitting.
            writeln!(self.output)?;
            return Ok(Selection::Cancelled);
        }
        parse_choice(&line, items.len())
    }
}

/// Interprets one line of input against a list of `count` items.
fn parse_choice(input: &str, count: usize) -> Result<Selection, SelectError> {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("q") || trimmed.eq_ignore_ascii_case("quit") {
        return Ok(Selection::Cancelled);
    }
    match trimmed.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Ok(Selection::Chosen(n - 1)),
        _ => Err(SelectError::InvalidSelection(trimmed.to_string())),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn items() -> Vec<String> {
        vec!["Mute".to_string(), "VolumeUp".to_string()]
    }

    fn pick(input: &str) -> (Result<Selection, SelectError>, String) {
        let mut out = Vec::new();
        let result = PromptSelector::new(Cursor::new(input.as_bytes()), &mut out)
            .select("Select a command:", &items());
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_select_prints_numbered_list() {
        // Act
        let (_, output) = pick("1\n");

        // Assert
        assert!(output.starts_with("Select a command:\n"));
        assert!(output.contains("   1) Mute\n"));
        assert!(output.contains("   2) VolumeUp\n"));
        assert!(output.ends_with("Enter a number (q to quit): "));
    }

    #[test]
    fn test_select_number_is_one_based() {
        let (result, _) = pick("2\n");

        assert_eq!(result.unwrap(), Selection::Chosen(1));
    }

    #[test]
    fn test_select_tolerates_surrounding_whitespace() {
        let (result, _) = pick("  1 \r\n");

        assert_eq!(result.unwrap(), Selection::Chosen(0));
    }

    #[test]
    fn test_select_q_and_eof_cancel() {
        assert_eq!(pick("q\n").0.unwrap(), Selection::Cancelled);
        assert_eq!(pick("QUIT\n").0.unwrap(), Selection::Cancelled);
        assert_eq!(pick("").0.unwrap(), Selection::Cancelled);
    }

    #[test]
    fn test_select_out_of_range_is_invalid() {
        for input in ["0\n", "3\n", "-1\n", "abc\n", "\n"] {
            let (result, _) = pick(input);
            assert!(
                matches!(result, Err(SelectError::InvalidSelection(_))),
                "input {input:?} must be rejected"
            );
        }
    }

    #[test]
    fn test_select_empty_list_is_error() {
        let mut out = Vec::new();

        let result = PromptSelector::new(Cursor::new(b"1\n".as_slice()), &mut out)
            .select("Select a TV:", &[]);

        assert!(matches!(result, Err(SelectError::Empty)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_selector_reads_successive_lines() {
        let mut out = Vec::new();
        let mut selector = PromptSelector::new(Cursor::new(b"2\nq\n".as_slice()), &mut out);

        assert_eq!(selector.select("t", &items()).unwrap(), Selection::Chosen(1));
        assert_eq!(selector.select("t", &items()).unwrap(), Selection::Cancelled);
    }
}
