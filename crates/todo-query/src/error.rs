//! Error types for the query engine.

use thiserror::Error;

/// A specialized Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors that can occur while lexing or parsing a query string.
///
/// Evaluation never fails: every "missing field" case is defined to be a
/// non-match, so the evaluator has no error type of its own.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// A quoted string was never closed.
    #[error("unterminated {quote}-quoted string starting at position {position}")]
    UnterminatedQuote {
        /// The quote character that opened the string.
        quote: char,
        /// Byte offset of the opening quote.
        position: usize,
    },

    /// A token appeared where the grammar does not allow it.
    #[error("unexpected token {found:?} at position {position} (expected {expected})")]
    UnexpectedToken {
        /// Display form of the offending token.
        found: String,
        /// What the parser was looking for.
        expected: &'static str,
        /// Byte offset of the offending token.
        position: usize,
    },

    /// The query ended while the grammar still required input.
    #[error("unexpected end of query (expected {expected})")]
    UnexpectedEnd {
        /// What the parser was looking for.
        expected: &'static str,
    },

    /// A `(` was never matched by a `)`.
    #[error("unclosed parenthesis opened at position {position}")]
    UnclosedParenthesis {
        /// Byte offset of the opening parenthesis.
        position: usize,
    },

    /// `!` was used before an atom kind that cannot be negated.
    #[error("'!' at position {position} cannot negate this atom")]
    InvalidNegation {
        /// Byte offset of the `!`.
        position: usize,
    },

    /// A priority letter range ran backwards (e.g. `C-A`).
    #[error("invalid letter range {start}-{end} at position {position} (end before start)")]
    InvalidLetterRange {
        /// The range's first letter.
        start: char,
        /// The range's last letter.
        end: char,
        /// Byte offset of the range.
        position: usize,
    },

    /// A priority list entry was not a letter or letter range.
    #[error("invalid priority {value:?} at position {position} (expected a letter or letter range)")]
    InvalidPriority {
        /// The offending list entry.
        value: String,
        /// Byte offset of the entry.
        position: usize,
    },

    /// A date token was neither a valid calendar date nor a relative offset.
    #[error("invalid date {input:?} at position {position}")]
    InvalidDate {
        /// The offending date text.
        input: String,
        /// Byte offset of the date token.
        position: usize,
    },

    /// A metatag comparison value contained characters outside letters,
    /// digits, `-`, and `.`.
    #[error("invalid metatag value {value:?} at position {position}")]
    InvalidMetatagValue {
        /// The offending value.
        value: String,
        /// Byte offset of the value.
        position: usize,
    },
}
