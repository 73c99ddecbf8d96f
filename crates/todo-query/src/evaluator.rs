//! Query evaluation against todo records.
//!
//! Evaluation is a pure tree walk: no I/O, no clocks, no mutation. The same
//! parsed query may be evaluated from any number of threads at once, each
//! against its own todos, because every input is read-only and the reference
//! date is passed in by the caller.

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::ast::{AndQuery, Atom, CompareOp, OrQuery, TagKind};
use crate::dates::DateRange;
use crate::todo::TodoView;

/// Evaluates a parsed query against todo records.
///
/// Holds a reference to the query and the reference date used to resolve
/// relative date expressions. Evaluation cannot fail: every missing-field
/// case is defined to be a non-match.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use todo_query_rs::{QueryEvaluator, QueryParser, Todo};
///
/// let query = QueryParser::parse("@work x").unwrap();
/// let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
/// let evaluator = QueryEvaluator::new(&query, today);
///
/// let todo = Todo {
///     desc: "File the report".to_string(),
///     done: true,
///     contexts: ["work".to_string()].into(),
///     ..Todo::default()
/// };
/// assert!(evaluator.matches(&todo));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct QueryEvaluator<'a> {
    query: &'a OrQuery,
    today: NaiveDate,
}

impl<'a> QueryEvaluator<'a> {
    /// Creates an evaluator for `query`.
    ///
    /// `today` is the reference date for relative date expressions; it is
    /// supplied by the caller rather than read from a wall clock so that
    /// evaluation is deterministic.
    pub fn new(query: &'a OrQuery, today: NaiveDate) -> Self {
        Self { query, today }
    }

    /// Returns true if the todo matches the query.
    ///
    /// The empty query matches every todo.
    pub fn matches<T: TodoView>(&self, todo: &T) -> bool {
        self.eval_or(self.query, todo)
    }

    /// Filters a slice of todos, returning the matches in input order.
    pub fn select<'b, T: TodoView>(&self, todos: &'b [T]) -> Vec<&'b T> {
        todos.iter().filter(|todo| self.matches(*todo)).collect()
    }

    /// OR over the branches, short-circuiting on the first match. The empty
    /// disjunction is the match-everything query.
    fn eval_or<T: TodoView>(&self, query: &OrQuery, todo: &T) -> bool {
        if query.branches.is_empty() {
            return true;
        }
        query.branches.iter().any(|branch| self.eval_and(branch, todo))
    }

    /// AND over the atoms, short-circuiting on the first non-match.
    fn eval_and<T: TodoView>(&self, branch: &AndQuery, todo: &T) -> bool {
        branch.atoms.iter().all(|atom| self.eval_atom(atom, todo))
    }

    fn eval_atom<T: TodoView>(&self, atom: &Atom, todo: &T) -> bool {
        match atom {
            Atom::CreateDate(range) => self.date_in_range(todo.create_date(), range),
            Atom::DoneDate(range) => self.date_in_range(todo.done_date(), range),

            Atom::Desc {
                negate,
                case_sensitive,
                text,
            } => {
                let hit = if *case_sensitive {
                    todo.desc().contains(text.as_str())
                } else {
                    todo.desc().to_lowercase().contains(&text.to_lowercase())
                };
                hit != *negate
            }

            Atom::Done(is_done) => todo.done() == *is_done,

            Atom::Metatag {
                negate,
                key,
                comparison,
            } => {
                let hit = match comparison {
                    None => todo.metadata_value(key).is_some(),
                    // A missing key never satisfies a comparison, whatever
                    // the operator; negation still applies afterward.
                    Some((op, value)) => todo
                        .metadata_value(key)
                        .is_some_and(|actual| compare_values(actual, *op, value)),
                };
                hit != *negate
            }

            Atom::PrefixTag { negate, kind, word } => {
                let hit = match kind {
                    TagKind::Context => todo.has_context(word),
                    TagKind::Project => todo.has_project(word),
                    TagKind::Other => todo.has_tag(word),
                };
                hit != *negate
            }

            Atom::Priority(ranges) => todo
                .priority()
                .is_some_and(|p| ranges.iter().any(|range| range.contains(p))),

            Atom::Subquery(query) => self.eval_or(query, todo),
        }
    }

    /// Closed-interval containment; an absent field never matches, and an
    /// inverted range matches nothing.
    fn date_in_range(&self, field: Option<NaiveDate>, range: &DateRange) -> bool {
        let Some(date) = field else {
            return false;
        };
        let (start, end) = range.resolve(self.today);
        start <= date && date <= end
    }
}

/// Compares a stored metadata value against the queried one: numerically
/// when both sides parse fully as integers, lexicographically otherwise.
fn compare_values(actual: &str, op: CompareOp, expected: &str) -> bool {
    let ordering = match (actual.parse::<i64>(), expected.parse::<i64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => actual.cmp(expected),
    };
    match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Ne => ordering != Ordering::Equal,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
    }
}
