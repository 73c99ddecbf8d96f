//! Abstract Syntax Tree (AST) for todo query expressions.

use crate::dates::DateRange;

/// An inclusive range of priority letters.
///
/// A single letter (`A`) or a dashed range (`A-C`). Both bounds are stored
/// uppercased; a missing end bound denotes the single letter named by `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LetterRange {
    /// First letter of the range (A-Z).
    pub start: char,
    /// Last letter of the range, when the source spelled `start-end`.
    pub end: Option<char>,
}

impl LetterRange {
    /// Creates a range covering a single priority letter.
    pub fn single(letter: char) -> Self {
        Self {
            start: letter,
            end: None,
        }
    }

    /// Creates an inclusive `start-end` range.
    pub fn span(start: char, end: char) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// Returns true if `priority` falls inside the range (inclusive).
    pub fn contains(&self, priority: char) -> bool {
        let p = priority.to_ascii_uppercase();
        let end = self.end.unwrap_or(self.start);
        self.start <= p && p <= end
    }
}

/// Which tag set a `@`/`+`/`#` prefix tag tests against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// `@word` - the todo's context set.
    Context,
    /// `+word` - the todo's project set.
    Project,
    /// `#word` - the generic hash-tag set.
    Other,
}

/// Comparison operator in a metatag check (e.g. `est>=3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `>`
    Gt,
}

/// The smallest unit of the query grammar: a single predicate over a todo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Atom {
    /// `^RANGE` - the todo's creation date falls inside the range.
    CreateDate(DateRange),

    /// `$RANGE` - the todo's completion date falls inside the range.
    DoneDate(DateRange),

    /// `'text'` / `"text"` - substring match against the description.
    Desc {
        /// Set by a leading `!`; inverts the result after the match test.
        negate: bool,
        /// Set by a `c` immediately before the opening quote.
        case_sensitive: bool,
        /// The quoted pattern.
        text: String,
    },

    /// `x`/`X` (done) or `o`/`O` (open).
    Done(bool),

    /// `key`, `!key`, or `key OP value` - a metadata presence or comparison check.
    Metatag {
        /// Set by a leading `!`; inverts the result after the check.
        negate: bool,
        /// The metadata key.
        key: String,
        /// `None` tests only that `key` is present.
        comparison: Option<(CompareOp, String)>,
    },

    /// `@word`, `+word`, or `#word` - membership in one of the tag sets.
    PrefixTag {
        /// Set by a leading `!`; inverts the membership test.
        negate: bool,
        /// Which tag set to test.
        kind: TagKind,
        /// The tag word (without its prefix).
        word: String,
    },

    /// `(A,C-E)` - the todo's priority falls inside at least one range.
    Priority(Vec<LetterRange>),

    /// `( ... )` - a parenthesised sub-query, used to override precedence.
    Subquery(OrQuery),
}

/// A conjunction of atoms; every atom must match.
///
/// The grammar requires at least one atom, so an `AndQuery` is never empty
/// once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndQuery {
    /// The atoms, in source order.
    pub atoms: Vec<Atom>,
}

impl AndQuery {
    /// Creates a conjunction from a non-empty atom list.
    pub fn new(atoms: Vec<Atom>) -> Self {
        debug_assert!(!atoms.is_empty(), "and-query must hold at least one atom");
        Self { atoms }
    }
}

/// A disjunction of and-queries; any branch may match.
///
/// The empty disjunction is the distinguished match-everything query
/// produced by parsing a blank input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrQuery {
    /// The alternatives, in source order.
    pub branches: Vec<AndQuery>,
}

impl OrQuery {
    /// The query that matches every todo.
    pub fn match_all() -> Self {
        Self::default()
    }

    /// Returns true for the empty, match-everything query.
    pub fn is_match_all(&self) -> bool {
        self.branches.is_empty()
    }
}
