//! Query language engine for plain-text todo lists.
//!
//! This crate parses a compact query syntax into an AST and evaluates it as
//! a boolean predicate over todo records, letting callers filter todo lists
//! without the engine knowing anything about where the todos come from.
//!
//! # Supported Syntax
//!
//! ## Status
//! - `x` / `X` - done todos
//! - `o` / `O` - open todos
//!
//! ## Tags
//! - `@word` - todos with the context `word`
//! - `+word` - todos in the project `word`
//! - `#word` - todos carrying the hash tag `word`
//!
//! ## Descriptions
//! - `"text"` / `'text'` - description contains `text` (case-insensitive)
//! - `c"text"` - case-sensitive containment
//!
//! ## Dates
//! - `^DATE[:DATE]` - creation date inside the (inclusive) range
//! - `$DATE[:DATE]` - completion date inside the range
//! - `DATE` is `YYYY-MM-DD` or a relative offset such as `-5d`, `2w`, `1m`,
//!   `10y`, resolved against a caller-supplied reference date
//!
//! ## Priority
//! - `(A)`, `(A-C)`, `(A,C-E)` - priority inside any listed letter range
//!
//! ## Metadata
//! - `key` - the metadata key is present
//! - `key=value`, `key!=value`, `key<=value`, `key>=value`, `key<value`,
//!   `key>value` - compare the stored value (numerically when both sides
//!   are integers)
//!
//! ## Combinators
//! - adjacency - AND
//! - `|` - OR (binds looser than adjacency)
//! - `!` - negate a description, tag, or metadata atom
//! - `( ... )` - grouping
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use todo_query_rs::{QueryEvaluator, QueryParser, Todo};
//!
//! // Parse once...
//! let query = QueryParser::parse("o @work (A-C) | x $-1w:0d").unwrap();
//!
//! // ...and evaluate against any number of todos.
//! let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
//! let evaluator = QueryEvaluator::new(&query, today);
//!
//! let todo = Todo {
//!     desc: "File the quarterly report".to_string(),
//!     priority: Some('A'),
//!     contexts: ["work".to_string()].into(),
//!     ..Todo::default()
//! };
//! assert!(evaluator.matches(&todo));
//! ```

mod ast;
mod dates;
mod error;
mod evaluator;
mod lexer;
mod parser;
mod todo;

pub use ast::{AndQuery, Atom, CompareOp, LetterRange, OrQuery, TagKind};
pub use dates::{DateRange, DateSpec, DateUnit};
pub use error::{QueryError, QueryResult};
pub use evaluator::QueryEvaluator;
pub use lexer::{Lexer, PositionedToken, Token};
pub use parser::QueryParser;
pub use todo::{Todo, TodoView};
