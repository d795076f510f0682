//! Expression parsing.
//!
//! Precedence (lowest to highest):
//! 1. `OR`
//! 2. `AND`
//! 3. `NOT`
//! 4. Comparison: `=`, `!=`, `<>`, `<`, `<=`, `>`, `>=`, `[NOT] IN (...)`
//! 5. Additive: `+`, `-`
//! 6. Multiplicative: `*`, `/`
//! 7. Primary: literals, parameters, paths, function calls, object/array
//!    literals, subqueries, `EXISTS(...)`, parenthesized expressions

use crate::ast::*;
use crate::error::QueryResult;
use crate::lexer::Token;

use super::Parser;

/// Use a parsed expression as a value. Predicates become `Expression` items.
pub(crate) fn into_select_item(expression: Expression) -> SelectItem {
    match expression {
        Expression::SelectItem(item) => item,
        Expression::Constant(constant) => SelectItem::constant(constant),
        other => SelectItem {
            kind: SelectItemKind::Expression(Box::new(other)),
            ..Default::default()
        },
    }
}

/// Use a parsed expression as a WHERE filter. Bare literals become constant filters.
pub(crate) fn into_filter(expression: Expression) -> Expression {
    match expression {
        Expression::SelectItem(SelectItem {
            kind: SelectItemKind::Constant(constant),
            invert: false,
            alias: None,
            ..
        }) => Expression::Constant(constant),
        other => other,
    }
}

fn negate(expression: Expression) -> Expression {
    match expression {
        Expression::SelectItem(mut item) => {
            item.invert = !item.invert;
            Expression::SelectItem(item)
        }
        other => Expression::SelectItem(SelectItem {
            kind: SelectItemKind::Expression(Box::new(other)),
            invert: true,
            ..Default::default()
        }),
    }
}

impl Parser {
    pub(crate) fn parse_or_expression(&mut self) -> QueryResult<Expression> {
        let first = self.parse_and_expression()?;
        if self.current_token() != &Token::Or {
            return Ok(first);
        }

        let mut expressions = vec![first];
        while self.eat(&Token::Or) {
            expressions.push(self.parse_and_expression()?);
        }

        Ok(Expression::Logical(LogicalExpression {
            expressions,
            operation: LogicalOperator::Or,
        }))
    }

    fn parse_and_expression(&mut self) -> QueryResult<Expression> {
        let first = self.parse_not_expression()?;
        if self.current_token() != &Token::And {
            return Ok(first);
        }

        let mut expressions = vec![first];
        while self.eat(&Token::And) {
            expressions.push(self.parse_not_expression()?);
        }

        Ok(Expression::Logical(LogicalExpression {
            expressions,
            operation: LogicalOperator::And,
        }))
    }

    fn parse_not_expression(&mut self) -> QueryResult<Expression> {
        if self.eat(&Token::Not) {
            let inner = self.parse_not_expression()?;
            return Ok(negate(inner));
        }

        self.parse_comparison_expression()
    }

    fn parse_comparison_expression(&mut self) -> QueryResult<Expression> {
        let left = into_select_item(self.parse_additive_expression()?);

        let operation = match self.current_token() {
            Token::Equal => ComparisonOperator::Equal,
            Token::NotEqual => ComparisonOperator::NotEqual,
            Token::LessThan => ComparisonOperator::LessThan,
            Token::LessThanEq => ComparisonOperator::LessThanOrEqual,
            Token::GreaterThan => ComparisonOperator::GreaterThan,
            Token::GreaterThanEq => ComparisonOperator::GreaterThanOrEqual,
            Token::In => {
                self.advance();
                return self.parse_in_list(left, false);
            }
            Token::Not if self.peek_token(1) == &Token::In => {
                self.advance();
                self.advance();
                return self.parse_in_list(left, true);
            }
            _ => return Ok(Expression::SelectItem(left)),
        };
        self.advance();

        let right = into_select_item(self.parse_additive_expression()?);
        Ok(Expression::Comparison(ComparisonExpression {
            left,
            right,
            operation,
        }))
    }

    /// `x IN (a, b, ...)` becomes the `IN` function call with `x` first.
    fn parse_in_list(&mut self, needle: SelectItem, invert: bool) -> QueryResult<Expression> {
        self.expect(Token::LeftParen)?;
        let mut arguments = vec![Some(needle)];
        if self.current_token() != &Token::RightParen {
            loop {
                arguments.push(Some(into_select_item(self.parse_or_expression()?)));
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RightParen)?;

        let mut item = SelectItem::function_call(FunctionCallType::In, arguments);
        item.invert = invert;
        Ok(Expression::SelectItem(item))
    }

    pub(crate) fn parse_additive_expression(&mut self) -> QueryResult<Expression> {
        let mut left = self.parse_multiplicative_expression()?;

        loop {
            let operation = match self.current_token() {
                Token::Plus => ArithmeticOperator::Add,
                Token::Minus => ArithmeticOperator::Subtract,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_multiplicative_expression()?;
            left = binary(left, operation, right);
        }
    }

    fn parse_multiplicative_expression(&mut self) -> QueryResult<Expression> {
        let mut left = Expression::SelectItem(self.parse_primary_expression()?);

        loop {
            let operation = match self.current_token() {
                Token::Star => ArithmeticOperator::Multiply,
                Token::Slash => ArithmeticOperator::Divide,
                _ => return Ok(left),
            };
            self.advance();
            let right = Expression::SelectItem(self.parse_primary_expression()?);
            left = binary(left, operation, right);
        }
    }

    fn parse_primary_expression(&mut self) -> QueryResult<SelectItem> {
        let item = match self.current_token().clone() {
            Token::Integer(n) => {
                self.advance();
                SelectItem::constant(Constant::Integer(n))
            }
            Token::Float(f) => {
                self.advance();
                SelectItem::constant(Constant::Float(f))
            }
            Token::Minus => {
                self.advance();
                match self.current_token().clone() {
                    Token::Integer(n) => {
                        self.advance();
                        SelectItem::constant(Constant::Integer(-n))
                    }
                    Token::Float(f) => {
                        self.advance();
                        SelectItem::constant(Constant::Float(-f))
                    }
                    _ => {
                        // `-x` over anything else is `0 - x`
                        let operand = self.parse_primary_expression()?;
                        into_select_item(binary(
                            Expression::SelectItem(SelectItem::constant(Constant::Integer(0))),
                            ArithmeticOperator::Subtract,
                            Expression::SelectItem(operand),
                        ))
                    }
                }
            }
            Token::String(s) => {
                self.advance();
                SelectItem::constant(Constant::String(s))
            }
            Token::True => {
                self.advance();
                SelectItem::constant(Constant::Boolean(true))
            }
            Token::False => {
                self.advance();
                SelectItem::constant(Constant::Boolean(false))
            }
            Token::Null => {
                self.advance();
                SelectItem::constant(Constant::Null)
            }
            Token::Parameter(name) => {
                self.advance();
                SelectItem::constant(Constant::Parameter(name))
            }
            Token::LeftParen => {
                self.advance();
                if self.current_token() == &Token::Select {
                    let sub_query = self.parse_query(false)?;
                    self.expect(Token::RightParen)?;
                    SelectItem::sub_query(sub_query)
                } else {
                    let inner = self.parse_or_expression()?;
                    self.expect(Token::RightParen)?;
                    into_select_item(inner)
                }
            }
            Token::Exists => {
                self.advance();
                self.expect(Token::LeftParen)?;
                let mut sub_query = self.parse_query(false)?;
                self.expect(Token::RightParen)?;
                sub_query.exists = true;
                SelectItem::sub_query(sub_query)
            }
            Token::LeftBrace => self.parse_object_literal()?,
            Token::LeftBracket => self.parse_array_literal()?,
            Token::Identifier(name) => {
                self.advance();
                if self.current_token() == &Token::LeftParen {
                    self.parse_function_call(&name)?
                } else {
                    self.parse_path(name)?
                }
            }
            other => {
                return Err(self.error(format!("Unexpected token {:?} in expression", other)));
            }
        };

        Ok(item)
    }

    /// Continue a field path after its first segment: `.name`, `["name"]`,
    /// `[0]` or `[@param]`.
    pub(crate) fn parse_path(&mut self, first: String) -> QueryResult<SelectItem> {
        let mut path = vec![first];

        loop {
            match self.current_token() {
                Token::Dot => {
                    self.advance();
                    path.push(self.expect_identifier()?);
                }
                Token::LeftBracket => {
                    self.advance();
                    let segment = match self.current_token().clone() {
                        Token::String(s) | Token::Parameter(s) => s,
                        Token::Integer(n) if n >= 0 => n.to_string(),
                        other => {
                            return Err(self.error(format!(
                                "Expected property name or index, found {:?}",
                                other
                            )))
                        }
                    };
                    self.advance();
                    self.expect(Token::RightBracket)?;
                    path.push(segment);
                }
                _ => break,
            }
        }

        Ok(SelectItem {
            path,
            ..Default::default()
        })
    }

    fn parse_function_call(&mut self, name: &str) -> QueryResult<SelectItem> {
        let function = FunctionCallType::from_name(name)
            .ok_or_else(|| self.error(format!("Unknown function '{}'", name)))?;

        self.expect(Token::LeftParen)?;
        let mut arguments = Vec::new();
        if self.current_token() != &Token::RightParen {
            loop {
                arguments.push(Some(into_select_item(self.parse_or_expression()?)));
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RightParen)?;

        if let Some(arity) = function.padded_arity() {
            while arguments.len() < arity {
                arguments.push(None);
            }
        }

        Ok(SelectItem::function_call(function, arguments))
    }

    fn parse_object_literal(&mut self) -> QueryResult<SelectItem> {
        self.expect(Token::LeftBrace)?;
        let mut select_items = Vec::new();

        if self.current_token() != &Token::RightBrace {
            loop {
                let key = match self.current_token().clone() {
                    Token::Identifier(name) | Token::String(name) => name,
                    other => match other.keyword_text() {
                        Some(keyword) => keyword.to_string(),
                        None => {
                            return Err(
                                self.error(format!("Expected object key, found {:?}", other))
                            )
                        }
                    },
                };
                self.advance();
                self.expect(Token::Colon)?;

                let mut value = into_select_item(self.parse_or_expression()?);
                value.alias = Some(key);
                select_items.push(value);

                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RightBrace)?;

        Ok(SelectItem {
            select_items,
            kind: SelectItemKind::Object,
            ..Default::default()
        })
    }

    fn parse_array_literal(&mut self) -> QueryResult<SelectItem> {
        self.expect(Token::LeftBracket)?;
        let mut select_items = Vec::new();

        if self.current_token() != &Token::RightBracket {
            loop {
                select_items.push(into_select_item(self.parse_or_expression()?));
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RightBracket)?;

        Ok(SelectItem {
            select_items,
            kind: SelectItemKind::Array,
            ..Default::default()
        })
    }
}

fn binary(left: Expression, operation: ArithmeticOperator, right: Expression) -> Expression {
    Expression::SelectItem(SelectItem {
        kind: SelectItemKind::BinaryExpression(Box::new(BinaryExpression {
            left: into_select_item(left),
            right: into_select_item(right),
            operation,
        })),
        ..Default::default()
    })
}
