//! Lexer (tokenizer) for query strings.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use crate::error::{QueryError, QueryResult};

/// A token in a query string.
///
/// The lexer has no knowledge of atom kinds: it only splits the input into
/// words, quoted strings, and the grammar's punctuation and comparison
/// operators. Whitespace separates tokens and is never emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A run of non-space, non-symbol characters. `-`, `.`, and `:` are
    /// ordinary word characters, as are Unicode letters.
    Word(String),

    /// A quoted string; no escape mechanism exists inside either quote kind.
    Quoted {
        /// The text between the quotes.
        text: String,
        /// The quote character that delimited it (`'` or `"`).
        quote: char,
    },

    /// `^` - introduces a creation-date range.
    Caret,
    /// `$` - introduces a completion-date range.
    Dollar,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `,`
    Comma,
    /// `|`
    Pipe,
    /// `!` (not followed by `=`).
    Bang,
    /// `@`
    At,
    /// `#`
    Hash,
    /// `+`
    Plus,
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

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(w) => write!(f, "{w}"),
            Token::Quoted { text, quote } => write!(f, "{quote}{text}{quote}"),
            Token::Caret => write!(f, "^"),
            Token::Dollar => write!(f, "$"),
            Token::OpenParen => write!(f, "("),
            Token::CloseParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Pipe => write!(f, "|"),
            Token::Bang => write!(f, "!"),
            Token::At => write!(f, "@"),
            Token::Hash => write!(f, "#"),
            Token::Plus => write!(f, "+"),
            Token::Eq => write!(f, "="),
            Token::Ne => write!(f, "!="),
            Token::Le => write!(f, "<="),
            Token::Ge => write!(f, ">="),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
        }
    }
}

/// A token with its byte position in the input.
///
/// Positions drive error reporting and let the parser detect adjacency
/// (a `c` case modifier counts only when it touches the quote).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedToken {
    /// The token.
    pub token: Token,
    /// The byte offset where the token starts (0-indexed).
    pub position: usize,
}

/// Returns true for characters the lexer treats as self-delimiting symbols.
fn is_symbol(c: char) -> bool {
    matches!(
        c,
        '^' | '$' | '(' | ')' | ',' | '|' | '!' | '@' | '#' | '+' | '=' | '<' | '>' | '"' | '\''
    )
}

/// Lexer for tokenizing query strings.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    /// Current byte position in the input string.
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    /// Consumes and returns the next character, updating position.
    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.next();
        if let Some(ch) = c {
            self.position += ch.len_utf8();
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.peek() {
            if c.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
    }

    /// Reads a run of word characters (anything that is neither whitespace
    /// nor a symbol).
    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(&c) = self.peek() {
            if c.is_whitespace() || is_symbol(c) {
                break;
            }
            word.push(c);
            self.next_char();
        }
        word
    }

    /// Reads a quoted string. The opening quote has already been observed
    /// but not consumed; consumes up to and including the closing quote.
    fn read_quoted(&mut self, quote: char) -> QueryResult<String> {
        let open_position = self.position;
        self.next_char(); // consume the opening quote

        let mut text = String::new();
        loop {
            match self.next_char() {
                Some(c) if c == quote => return Ok(text),
                Some(c) => text.push(c),
                None => {
                    return Err(QueryError::UnterminatedQuote {
                        quote,
                        position: open_position,
                    })
                }
            }
        }
    }

    /// Consumes `next` and emits `two` if the following character is `=`,
    /// otherwise emits `one`. Implements maximal munch for `!= <= >=`.
    fn one_or_two(&mut self, one: Token, two: Token) -> Token {
        self.next_char();
        if self.peek() == Some(&'=') {
            self.next_char();
            two
        } else {
            one
        }
    }

    /// Returns the next token with its position, or `None` at end of input.
    pub fn next_token(&mut self) -> QueryResult<Option<PositionedToken>> {
        self.skip_whitespace();

        let Some(&c) = self.peek() else {
            return Ok(None);
        };
        let token_start = self.position;

        let token = match c {
            '^' => {
                self.next_char();
                Token::Caret
            }
            '$' => {
                self.next_char();
                Token::Dollar
            }
            '(' => {
                self.next_char();
                Token::OpenParen
            }
            ')' => {
                self.next_char();
                Token::CloseParen
            }
            ',' => {
                self.next_char();
                Token::Comma
            }
            '|' => {
                self.next_char();
                Token::Pipe
            }
            '@' => {
                self.next_char();
                Token::At
            }
            '#' => {
                self.next_char();
                Token::Hash
            }
            '+' => {
                self.next_char();
                Token::Plus
            }
            '=' => {
                self.next_char();
                Token::Eq
            }
            '!' => self.one_or_two(Token::Bang, Token::Ne),
            '<' => self.one_or_two(Token::Lt, Token::Le),
            '>' => self.one_or_two(Token::Gt, Token::Ge),
            '"' | '\'' => {
                let text = self.read_quoted(c)?;
                Token::Quoted { text, quote: c }
            }
            _ => Token::Word(self.read_word()),
        };

        Ok(Some(PositionedToken {
            token,
            position: token_start,
        }))
    }

    /// Collects all tokens, failing on the first lexical error.
    pub fn tokenize(mut self) -> QueryResult<Vec<PositionedToken>> {
        let mut tokens = Vec::new();
        while let Some(positioned) = self.next_token()? {
            tokens.push(positioned);
        }
        Ok(tokens)
    }
}
