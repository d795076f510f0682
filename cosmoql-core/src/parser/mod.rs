//! Parser for the Cosmos-style SQL dialect.
//!
//! Turns tokenized query text into a [`SelectStatement`]. Grammar:
//!
//! ```text
//! SELECT [DISTINCT] [TOP n] [VALUE] <items> | *
//! [FROM <table> [[AS] alias] | <alias> IN <path> | (SELECT ...) [AS] alias]
//! [JOIN <alias> IN <path> | JOIN (SELECT ...) [AS] alias]*
//! [WHERE <expr>]
//! [GROUP BY <items>]
//! [ORDER BY <item> [ASC|DESC], ...]
//! [OFFSET n LIMIT n]
//! ```

mod clauses;
mod expressions;

use crate::ast::SelectStatement;
use crate::error::{QueryError, QueryResult};
use crate::lexer::{Lexer, Token};

/// Parse a query string into a statement with no parameters bound.
pub fn parse(query: &str) -> QueryResult<SelectStatement> {
    Parser::new(query)?.parse()
}

/// Parser for SELECT statements
pub struct Parser {
    input: Vec<char>,
    pub(crate) tokens: Vec<Token>,
    offsets: Vec<usize>,
    pub(crate) position: usize,
}

impl Parser {
    /// Create a new parser from an input string
    pub fn new(input: &str) -> QueryResult<Self> {
        let mut lexer = Lexer::new(input);
        let (tokens, offsets): (Vec<Token>, Vec<usize>) = lexer.tokenize()?.into_iter().unzip();

        Ok(Self {
            input: input.chars().collect(),
            tokens,
            offsets,
            position: 0,
        })
    }

    /// Parse a complete statement; trailing tokens are an error.
    pub fn parse(&mut self) -> QueryResult<SelectStatement> {
        self.parse_query(true)
    }

    pub(crate) fn current_token(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&Token::Eof)
    }

    pub(crate) fn peek_token(&self, offset: usize) -> &Token {
        self.tokens
            .get(self.position + offset)
            .unwrap_or(&Token::Eof)
    }

    pub(crate) fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    /// Consume `token` if it is the current one.
    pub(crate) fn eat(&mut self, token: &Token) -> bool {
        if self.current_token() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, expected: Token) -> QueryResult<()> {
        if self.current_token() == &expected {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!(
                "Expected {:?}, found {:?}",
                expected,
                self.current_token()
            )))
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> QueryResult<String> {
        match self.current_token().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(self.error(format!("Expected identifier, found {:?}", other))),
        }
    }

    pub(crate) fn expect_unsigned(&mut self) -> QueryResult<usize> {
        match self.current_token().clone() {
            Token::Integer(n) if n >= 0 => {
                self.advance();
                Ok(n as usize)
            }
            other => Err(self.error(format!(
                "Expected non-negative integer, found {:?}",
                other
            ))),
        }
    }

    /// Build a parse error that quotes the text at the current token.
    pub(crate) fn error(&self, message: String) -> QueryError {
        let offset = self
            .offsets
            .get(self.position)
            .copied()
            .unwrap_or(self.input.len());
        let fragment: String = self.input.iter().skip(offset).take(24).collect();

        if fragment.is_empty() {
            QueryError::ParseError(format!("{} at end of input", message))
        } else {
            QueryError::ParseError(format!(
                "{} near '{}' (position {})",
                message, fragment, offset
            ))
        }
    }
}
