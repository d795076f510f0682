use crate::error::{QueryError, QueryResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Select,
    Distinct,
    Top,
    Value,
    From,
    Where,
    As,
    In,
    Join,
    Group,
    Order,
    By,
    Asc,
    Desc,
    Offset,
    Limit,
    Exists,

    // Logical
    And,
    Or,
    Not,

    // Literals and identifiers
    True,
    False,
    Null,
    Identifier(String),
    Integer(i64),
    Float(f64),
    String(String),
    Parameter(String), // @name, '@' included

    // Operators
    Equal,         // =
    NotEqual,      // != or <>
    LessThan,      // <
    LessThanEq,    // <=
    GreaterThan,   // >
    GreaterThanEq, // >=
    Plus,          // +
    Minus,         // -
    Star,          // *
    Slash,         // /

    // Delimiters
    Comma,        // ,
    Dot,          // .
    Colon,        // :
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    LeftBrace,    // {
    RightBrace,   // }

    Eof,
}

impl Token {
    /// Source spelling of a keyword, used where a keyword is allowed as a
    /// plain name (object literal keys, aliases).
    pub fn keyword_text(&self) -> Option<&'static str> {
        let text = match self {
            Token::Select => "select",
            Token::Distinct => "distinct",
            Token::Top => "top",
            Token::Value => "value",
            Token::From => "from",
            Token::Where => "where",
            Token::As => "as",
            Token::In => "in",
            Token::Join => "join",
            Token::Group => "group",
            Token::Order => "order",
            Token::By => "by",
            Token::Asc => "asc",
            Token::Desc => "desc",
            Token::Offset => "offset",
            Token::Limit => "limit",
            Token::Exists => "exists",
            Token::And => "and",
            Token::Or => "or",
            Token::Not => "not",
            Token::True => "true",
            Token::False => "false",
            Token::Null => "null",
            _ => return None,
        };
        Some(text)
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
    // A word directly after '.' is always a property name, so `c.value` works.
    after_dot: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();

        Self {
            input: chars,
            position: 0,
            current_char,
            after_dot: false,
        }
    }

    /// Tokenize the whole input. Each token is paired with the character
    /// offset it starts at; the list always ends with `Token::Eof`.
    pub fn tokenize(&mut self) -> QueryResult<Vec<(Token, usize)>> {
        let mut tokens = Vec::new();
        loop {
            let (token, start) = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push((token, start));
            if done {
                return Ok(tokens);
            }
        }
    }

    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.current_char {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) {
        self.advance(); // skip /
        self.advance(); // skip *
        while let Some(ch) = self.current_char {
            if ch == '*' && self.peek() == Some('/') {
                self.advance();
                self.advance();
                break;
            }
            self.advance();
        }
    }

    fn read_number(&mut self) -> QueryResult<Token> {
        let mut num_str = String::new();
        let mut has_dot = false;
        let mut has_exponent = false;

        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() {
                num_str.push(ch);
                self.advance();
            } else if ch == '.' && !has_dot && !has_exponent {
                // Only a decimal point when a digit follows
                match self.peek() {
                    Some(next) if next.is_ascii_digit() => {
                        has_dot = true;
                        num_str.push(ch);
                        self.advance();
                    }
                    _ => break,
                }
            } else if (ch == 'e' || ch == 'E') && !has_exponent {
                let next = self.peek();
                let signed = matches!(next, Some('+') | Some('-'));
                let digit_after = if signed {
                    self.input.get(self.position + 2).copied()
                } else {
                    next
                };
                if !matches!(digit_after, Some(d) if d.is_ascii_digit()) {
                    break;
                }
                has_exponent = true;
                num_str.push(ch);
                self.advance();
                if signed {
                    if let Some(sign) = self.current_char {
                        num_str.push(sign);
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }

        if has_dot || has_exponent {
            num_str
                .parse::<f64>()
                .map(Token::Float)
                .map_err(|_| QueryError::ParseError(format!("Invalid float number: {}", num_str)))
        } else {
            num_str.parse::<i64>().map(Token::Integer).map_err(|_| {
                QueryError::ParseError(format!("Invalid integer number: {}", num_str))
            })
        }
    }

    fn read_string(&mut self, quote: char) -> QueryResult<Token> {
        self.advance(); // opening quote

        let mut string = String::new();

        while let Some(ch) = self.current_char {
            if ch == quote {
                self.advance();
                return Ok(Token::String(string));
            } else if ch == '\\' {
                self.advance();
                if let Some(escaped) = self.current_char {
                    string.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        'b' => '\u{8}',
                        'f' => '\u{c}',
                        _ => escaped,
                    });
                    self.advance();
                }
            } else {
                string.push(ch);
                self.advance();
            }
        }

        Err(QueryError::ParseError("Unterminated string".to_string()))
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                word.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        word
    }

    fn read_identifier(&mut self) -> Token {
        let ident = self.read_word();

        if self.after_dot {
            return Token::Identifier(ident);
        }

        // Keywords are case-insensitive
        match ident.to_uppercase().as_str() {
            "SELECT" => Token::Select,
            "DISTINCT" => Token::Distinct,
            "TOP" => Token::Top,
            "VALUE" => Token::Value,
            "FROM" => Token::From,
            "WHERE" => Token::Where,
            "AS" => Token::As,
            "IN" => Token::In,
            "JOIN" => Token::Join,
            "GROUP" => Token::Group,
            "ORDER" => Token::Order,
            "BY" => Token::By,
            "ASC" => Token::Asc,
            "DESC" => Token::Desc,
            "OFFSET" => Token::Offset,
            "LIMIT" => Token::Limit,
            "EXISTS" => Token::Exists,
            "AND" => Token::And,
            "OR" => Token::Or,
            "NOT" => Token::Not,
            "TRUE" => Token::True,
            "FALSE" => Token::False,
            "NULL" => Token::Null,
            _ => Token::Identifier(ident),
        }
    }

    fn read_parameter(&mut self) -> QueryResult<Token> {
        self.advance(); // skip @
        let name = self.read_word();

        if name.is_empty() {
            return Err(QueryError::ParseError(
                "Expected parameter name after '@'".to_string(),
            ));
        }

        Ok(Token::Parameter(format!("@{}", name)))
    }

    pub fn next_token(&mut self) -> QueryResult<(Token, usize)> {
        loop {
            self.skip_whitespace();

            match self.current_char {
                Some('-') if self.peek() == Some('-') => self.skip_line_comment(),
                Some('/') if self.peek() == Some('*') => self.skip_block_comment(),
                _ => break,
            }
        }

        let start = self.position;
        let token = self.scan_token()?;
        self.after_dot = token == Token::Dot;
        Ok((token, start))
    }

    fn scan_token(&mut self) -> QueryResult<Token> {
        let token = match self.current_char {
            None => Token::Eof,

            Some(ch) if ch.is_ascii_digit() => return self.read_number(),

            Some(quote @ ('\'' | '"')) => return self.read_string(quote),

            Some(ch) if ch.is_alphabetic() || ch == '_' || ch == '$' => {
                return Ok(self.read_identifier())
            }

            Some('@') => return self.read_parameter(),

            Some('=') => {
                self.advance();
                Token::Equal
            }

            Some('!') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::NotEqual
                } else {
                    return Err(QueryError::ParseError(format!(
                        "Unexpected character '!' at position {}",
                        self.position - 1
                    )));
                }
            }

            Some('<') => {
                self.advance();
                match self.current_char {
                    Some('=') => {
                        self.advance();
                        Token::LessThanEq
                    }
                    Some('>') => {
                        self.advance();
                        Token::NotEqual
                    }
                    _ => Token::LessThan,
                }
            }

            Some('>') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::GreaterThanEq
                } else {
                    Token::GreaterThan
                }
            }

            Some(ch) => {
                let token = match ch {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => Token::Slash,
                    ',' => Token::Comma,
                    '.' => Token::Dot,
                    ':' => Token::Colon,
                    '(' => Token::LeftParen,
                    ')' => Token::RightParen,
                    '[' => Token::LeftBracket,
                    ']' => Token::RightBracket,
                    '{' => Token::LeftBrace,
                    '}' => Token::RightBrace,
                    _ => {
                        return Err(QueryError::ParseError(format!(
                            "Unexpected character '{}' at position {}",
                            ch, self.position
                        )))
                    }
                };
                self.advance();
                token
            }
        };

        Ok(token)
    }
}
