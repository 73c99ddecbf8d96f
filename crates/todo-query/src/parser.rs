//! Recursive descent parser for todo queries.

use crate::ast::{AndQuery, Atom, CompareOp, LetterRange, OrQuery, TagKind};
use crate::dates::DateRange;
use crate::error::{QueryError, QueryResult};
use crate::lexer::{Lexer, PositionedToken, Token};

/// Parser for todo query strings.
///
/// This is a recursive descent parser over the lexer's token stream.
///
/// # Grammar
///
/// ```text
/// query      ::= [or_query]
/// or_query   ::= and_query ("|" and_query)*
/// and_query  ::= atom+
/// atom       ::= create_date | desc | done | done_date | metatag
///              | prefix_tag | priority | subquery
/// create_date::= "^" DATE [":" DATE]
/// done_date  ::= "$" DATE [":" DATE]
/// desc       ::= ["!"] ["c"] quoted_string
/// done       ::= "x" | "X" | "o" | "O"
/// metatag    ::= ["!"] word | ["!"] word op value
/// prefix_tag ::= ["!"] ("@" | "#" | "+") word
/// priority   ::= "(" letter_range ("," letter_range)* ")"
/// subquery   ::= "(" or_query ")"
/// ```
///
/// Precedence is fixed by the grammar: `|` binds loosest, adjacency (AND)
/// binds tighter, and parentheses override both. Each atom kind owns a
/// distinct leading token except priority and subquery, which both start
/// with `(`; those are disambiguated by attempting a priority parse and
/// rewinding to a subquery parse when it fails.
///
/// # Example
///
/// ```
/// use todo_query_rs::{Atom, QueryParser, TagKind};
///
/// let query = QueryParser::parse("@work !+chores").unwrap();
/// assert_eq!(query.branches.len(), 1);
/// assert_eq!(
///     query.branches[0].atoms[0],
///     Atom::PrefixTag {
///         negate: false,
///         kind: TagKind::Context,
///         word: "work".to_string(),
///     }
/// );
/// ```
pub struct QueryParser {
    tokens: Vec<PositionedToken>,
    position: usize,
}

/// Returns true for the bare done-status words.
fn is_done_word(word: &str) -> bool {
    matches!(word, "x" | "X" | "o" | "O")
}

impl QueryParser {
    /// Parses a query string into an [`OrQuery`] AST.
    ///
    /// A blank query parses to the empty, match-everything [`OrQuery`];
    /// every other input must satisfy the grammar in full.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] describing the first lexical or syntactic
    /// failure; the parser makes no attempt at recovery or multi-error
    /// reporting.
    pub fn parse(input: &str) -> QueryResult<OrQuery> {
        let tokens = Lexer::new(input).tokenize()?;
        if tokens.is_empty() {
            return Ok(OrQuery::match_all());
        }

        let mut parser = Self {
            tokens,
            position: 0,
        };
        let query = parser.parse_or_query()?;

        if let Some(pt) = parser.peek() {
            return Err(QueryError::UnexpectedToken {
                found: pt.token.to_string(),
                expected: "end of query",
                position: pt.position,
            });
        }

        Ok(query)
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&PositionedToken> {
        self.tokens.get(self.position)
    }

    /// Consumes and returns the current token.
    fn next(&mut self) -> Option<PositionedToken> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Consumes the current token, which must be a word.
    fn expect_word(&mut self, expected: &'static str) -> QueryResult<(String, usize)> {
        match self.next() {
            Some(PositionedToken {
                token: Token::Word(word),
                position,
            }) => Ok((word, position)),
            Some(pt) => Err(QueryError::UnexpectedToken {
                found: pt.token.to_string(),
                expected,
                position: pt.position,
            }),
            None => Err(QueryError::UnexpectedEnd { expected }),
        }
    }

    /// True if the token after the current one is a comparison operator.
    fn compare_op_follows(&self) -> bool {
        matches!(
            self.tokens.get(self.position + 1).map(|pt| &pt.token),
            Some(Token::Eq | Token::Ne | Token::Le | Token::Ge | Token::Lt | Token::Gt)
        )
    }

    /// True if the cursor sits on a `c` word that touches a quoted string,
    /// i.e. the case-sensitivity modifier of a desc atom. A detached `c`
    /// is an ordinary metatag word.
    fn case_modifier_at_cursor(&self) -> bool {
        let Some(current) = self.tokens.get(self.position) else {
            return false;
        };
        let Token::Word(word) = &current.token else {
            return false;
        };
        if word != "c" {
            return false;
        }
        let Some(next) = self.tokens.get(self.position + 1) else {
            return false;
        };
        matches!(next.token, Token::Quoted { .. }) && next.position == current.position + 1
    }

    /// Parses `and_query ("|" and_query)*`.
    fn parse_or_query(&mut self) -> QueryResult<OrQuery> {
        let mut branches = vec![self.parse_and_query()?];
        while matches!(self.peek().map(|pt| &pt.token), Some(Token::Pipe)) {
            self.next(); // consume '|'
            branches.push(self.parse_and_query()?);
        }
        Ok(OrQuery { branches })
    }

    /// Parses `atom+`, stopping at `|`, `)`, or end of input.
    fn parse_and_query(&mut self) -> QueryResult<AndQuery> {
        let mut atoms = vec![self.parse_atom()?];
        loop {
            match self.peek().map(|pt| &pt.token) {
                None | Some(Token::Pipe | Token::CloseParen) => break,
                Some(_) => atoms.push(self.parse_atom()?),
            }
        }
        Ok(AndQuery::new(atoms))
    }

    /// Parses one atom, dispatching on its leading token.
    fn parse_atom(&mut self) -> QueryResult<Atom> {
        let Some(pt) = self.peek().cloned() else {
            return Err(QueryError::UnexpectedEnd {
                expected: "an atom",
            });
        };

        match &pt.token {
            Token::Caret => {
                self.next();
                Ok(Atom::CreateDate(self.parse_date_range()?))
            }
            Token::Dollar => {
                self.next();
                Ok(Atom::DoneDate(self.parse_date_range()?))
            }
            Token::Quoted { .. } => self.parse_desc(false),
            Token::Word(_) if self.case_modifier_at_cursor() => self.parse_desc(false),
            Token::Word(word) if is_done_word(word) && !self.compare_op_follows() => {
                self.next();
                Ok(Atom::Done(word.eq_ignore_ascii_case("x")))
            }
            Token::OpenParen => self.parse_paren(),
            Token::At | Token::Hash | Token::Plus => self.parse_prefix_tag(false),
            Token::Bang => {
                self.next();
                self.parse_negated(pt.position)
            }
            Token::Word(_) => self.parse_metatag(false),
            _ => Err(QueryError::UnexpectedToken {
                found: pt.token.to_string(),
                expected: "an atom",
                position: pt.position,
            }),
        }
    }

    /// Parses the atom following a `!`. Only desc, metatag, and prefix-tag
    /// atoms accept negation.
    fn parse_negated(&mut self, bang_position: usize) -> QueryResult<Atom> {
        let Some(pt) = self.peek().cloned() else {
            return Err(QueryError::UnexpectedEnd {
                expected: "an atom after '!'",
            });
        };

        match &pt.token {
            Token::Quoted { .. } => self.parse_desc(true),
            Token::Word(_) if self.case_modifier_at_cursor() => self.parse_desc(true),
            Token::At | Token::Hash | Token::Plus => self.parse_prefix_tag(true),
            Token::Word(word) if is_done_word(word) && !self.compare_op_follows() => {
                Err(QueryError::InvalidNegation {
                    position: bang_position,
                })
            }
            Token::Word(_) => self.parse_metatag(true),
            _ => Err(QueryError::InvalidNegation {
                position: bang_position,
            }),
        }
    }

    /// Parses the `DATE[:DATE]` word after a `^` or `$`.
    fn parse_date_range(&mut self) -> QueryResult<DateRange> {
        let (word, position) = self.expect_word("a date or date range")?;
        DateRange::parse(&word, position)
    }

    /// Parses a quoted description test, with its optional `c` modifier.
    fn parse_desc(&mut self, negate: bool) -> QueryResult<Atom> {
        let case_sensitive = self.case_modifier_at_cursor();
        if case_sensitive {
            self.next(); // consume the 'c'
        }

        match self.next() {
            Some(PositionedToken {
                token: Token::Quoted { text, .. },
                ..
            }) => Ok(Atom::Desc {
                negate,
                case_sensitive,
                text,
            }),
            Some(pt) => Err(QueryError::UnexpectedToken {
                found: pt.token.to_string(),
                expected: "a quoted string",
                position: pt.position,
            }),
            None => Err(QueryError::UnexpectedEnd {
                expected: "a quoted string",
            }),
        }
    }

    /// Parses a `@`/`#`/`+` tag test.
    fn parse_prefix_tag(&mut self, negate: bool) -> QueryResult<Atom> {
        let prefix = self
            .next()
            .unwrap_or_else(|| unreachable!("caller checked the prefix token"));
        let kind = match prefix.token {
            Token::At => TagKind::Context,
            Token::Plus => TagKind::Project,
            Token::Hash => TagKind::Other,
            _ => unreachable!("caller checked the prefix token"),
        };
        let (word, _) = self.expect_word("a tag word")?;
        Ok(Atom::PrefixTag { negate, kind, word })
    }

    /// Parses a metadata presence or comparison test.
    fn parse_metatag(&mut self, negate: bool) -> QueryResult<Atom> {
        let (key, key_position) = self.expect_word("a metadata key")?;

        let op = match self.peek().map(|pt| &pt.token) {
            Some(Token::Eq) => Some(CompareOp::Eq),
            Some(Token::Ne) => Some(CompareOp::Ne),
            Some(Token::Le) => Some(CompareOp::Le),
            Some(Token::Ge) => Some(CompareOp::Ge),
            Some(Token::Lt) => Some(CompareOp::Lt),
            Some(Token::Gt) => Some(CompareOp::Gt),
            _ => None,
        };

        let Some(op) = op else {
            // Presence-only form; the key must be a plain alphabetic word.
            if key.is_empty() || !key.chars().all(char::is_alphabetic) {
                return Err(QueryError::UnexpectedToken {
                    found: key,
                    expected: "an atom",
                    position: key_position,
                });
            }
            return Ok(Atom::Metatag {
                negate,
                key,
                comparison: None,
            });
        };

        if key.is_empty() || !key.chars().all(char::is_alphanumeric) {
            return Err(QueryError::UnexpectedToken {
                found: key,
                expected: "a metadata key",
                position: key_position,
            });
        }

        self.next(); // consume the operator
        let (value, value_position) = self.expect_word("a metatag value")?;
        if value.is_empty()
            || !value
                .chars()
                .all(|c| c.is_alphanumeric() || c == '-' || c == '.')
        {
            return Err(QueryError::InvalidMetatagValue {
                value,
                position: value_position,
            });
        }

        Ok(Atom::Metatag {
            negate,
            key,
            comparison: Some((op, value)),
        })
    }

    /// Parses a parenthesised atom: a priority list when possible, a
    /// subquery otherwise.
    fn parse_paren(&mut self) -> QueryResult<Atom> {
        let start = self.position;
        let priority_shaped = self.priority_shaped_body();

        match self.parse_priority() {
            Ok(atom) => Ok(atom),
            Err(priority_err) => {
                self.position = start;
                self.parse_subquery().map_err(|subquery_err| {
                    // When the body looked like a letter range, the priority
                    // diagnosis is the useful one.
                    if priority_shaped {
                        priority_err
                    } else {
                        subquery_err
                    }
                })
            }
        }
    }

    /// True if the token after the `(` at the cursor is letter-range shaped
    /// (`A` or `A-C`).
    fn priority_shaped_body(&self) -> bool {
        match self.tokens.get(self.position + 1).map(|pt| &pt.token) {
            Some(Token::Word(word)) => {
                let chars: Vec<char> = word.chars().collect();
                match chars[..] {
                    [l] => l.is_ascii_alphabetic(),
                    [a, '-', b] => a.is_ascii_alphabetic() && b.is_ascii_alphabetic(),
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Parses `"(" letter_range ("," letter_range)* ")"`.
    fn parse_priority(&mut self) -> QueryResult<Atom> {
        self.next(); // consume '('
        let mut ranges = Vec::new();
        loop {
            let (word, position) = self.expect_word("a priority letter or range")?;
            ranges.push(Self::parse_letter_range(&word, position)?);

            match self.next() {
                Some(PositionedToken {
                    token: Token::Comma,
                    ..
                }) => continue,
                Some(PositionedToken {
                    token: Token::CloseParen,
                    ..
                }) => break,
                Some(pt) => {
                    return Err(QueryError::UnexpectedToken {
                        found: pt.token.to_string(),
                        expected: "',' or ')'",
                        position: pt.position,
                    })
                }
                None => {
                    return Err(QueryError::UnexpectedEnd {
                        expected: "',' or ')'",
                    })
                }
            }
        }
        Ok(Atom::Priority(ranges))
    }

    /// Parses one `letter` or `letter-letter` entry of a priority list.
    fn parse_letter_range(word: &str, position: usize) -> QueryResult<LetterRange> {
        let chars: Vec<char> = word.chars().collect();
        match chars[..] {
            [letter] if letter.is_ascii_alphabetic() => {
                Ok(LetterRange::single(letter.to_ascii_uppercase()))
            }
            [a, '-', b] if a.is_ascii_alphabetic() && b.is_ascii_alphabetic() => {
                let start = a.to_ascii_uppercase();
                let end = b.to_ascii_uppercase();
                if end < start {
                    Err(QueryError::InvalidLetterRange {
                        start,
                        end,
                        position,
                    })
                } else {
                    Ok(LetterRange::span(start, end))
                }
            }
            _ => Err(QueryError::InvalidPriority {
                value: word.to_string(),
                position,
            }),
        }
    }

    /// Parses `"(" or_query ")"`.
    fn parse_subquery(&mut self) -> QueryResult<Atom> {
        let open = self
            .next()
            .unwrap_or_else(|| unreachable!("caller checked the open parenthesis"));
        let query = self.parse_or_query()?;
        match self.next() {
            Some(PositionedToken {
                token: Token::CloseParen,
                ..
            }) => Ok(Atom::Subquery(query)),
            _ => Err(QueryError::UnclosedParenthesis {
                position: open.position,
            }),
        }
    }
}
