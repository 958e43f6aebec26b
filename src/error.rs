use std::fmt;
use std::fmt::Formatter;

use crate::source::Position;

/// How much of the input the parse accounted for.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ParseCompletion {
    /// Every element was consumed.
    Complete,
    /// Parsing stopped at the given offset with input left over.
    Incomplete(usize),
}

/// A recoverable error recorded while resynchronizing to a resume point.
///
/// Records of this kind do not make the parse fail; a grammar with resume
/// points can succeed and still report what it had to skip.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorRecord<P> {
    position: P,
    expected: String,
}

impl<P: Position> ErrorRecord<P> {
    pub(crate) fn new(position: P, expected: String) -> Self {
        ErrorRecord { position, expected }
    }

    /// Where the failing expression was tried.
    pub fn position(&self) -> P {
        self.position
    }

    /// A description of what was expected there.
    pub fn expected(&self) -> &str {
        &self.expected
    }

    /// Renders the error against the text it was produced from, with a
    /// caret under the offending position.
    pub fn report(&self, input: &str) -> String {
        use colored::Colorize;

        let at = self.position.offset().min(input.len());
        let before: String = {
            let tail: Vec<char> = input[..at].chars().rev().take(10).collect();
            tail.into_iter().rev().collect()
        };
        let after: String = input[at..].chars().take(10).collect();
        let cut_left = before.len() < at;
        let cut_right = at + after.len() < input.len();

        let mut excerpt = String::new();
        if cut_left {
            excerpt.push_str("...");
        }
        excerpt.push_str(&before);
        excerpt.push_str(&after);
        if cut_right {
            excerpt.push_str("...");
        }

        let mut caret_col = before.chars().count();
        if cut_left {
            caret_col += 3;
        }

        format!(
            "{}\n{}{}\nParse Error: expected {}",
            excerpt,
            " ".repeat(caret_col),
            "^".red(),
            self.expected.bright_blue(),
        )
    }
}

impl<P: Position> fmt::Display for ErrorRecord<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected {} at offset {}",
            self.expected,
            self.position.offset()
        )
    }
}

impl<P: Position> std::error::Error for ErrorRecord<P> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}
