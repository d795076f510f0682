//! Statement-level clauses: SELECT list, FROM, JOIN, WHERE, GROUP BY,
//! ORDER BY and TOP/OFFSET/LIMIT.

use crate::ast::*;
use crate::error::QueryResult;
use crate::lexer::Token;

use super::expressions::{into_filter, into_select_item};
use super::Parser;

impl Parser {
    /// Parse a SELECT statement, optionally checking for trailing tokens
    /// (false for subqueries, which stop at the closing parenthesis).
    pub(crate) fn parse_query(&mut self, check_trailing: bool) -> QueryResult<SelectStatement> {
        self.expect(Token::Select)?;

        let mut statement = SelectStatement::default();
        let mut value_mode = false;

        loop {
            match self.current_token() {
                Token::Distinct => {
                    self.advance();
                    statement.distinct = true;
                }
                Token::Top => {
                    self.advance();
                    statement.count = Some(self.expect_unsigned()?);
                }
                Token::Value => {
                    self.advance();
                    value_mode = true;
                    break;
                }
                _ => break,
            }
        }

        let select_star = !value_mode && self.eat(&Token::Star);
        if !select_star {
            statement.select_items = self.parse_select_list()?;
        }

        if value_mode {
            if statement.select_items.len() != 1 {
                return Err(self.error("SELECT VALUE takes exactly one expression".to_string()));
            }
            statement.select_items[0].is_top_level = true;
        }

        if self.eat(&Token::From) {
            statement.table = self.parse_from()?;
        }

        if select_star {
            let name = table_binding_name(&statement.table)
                .ok_or_else(|| self.error("SELECT * requires a FROM clause".to_string()))?;
            statement.select_items = vec![SelectItem::path(&[name.as_str()]).top_level()];
        }

        while self.eat(&Token::Join) {
            statement.join_items.push(self.parse_join()?);
        }

        if self.eat(&Token::Where) {
            statement.filters = Some(into_filter(self.parse_or_expression()?));
        }

        if self.eat(&Token::Group) {
            self.expect(Token::By)?;
            statement.group_by = self.parse_item_list()?;
        }

        if self.eat(&Token::Order) {
            self.expect(Token::By)?;
            statement.order_expressions = self.parse_order_by_list()?;
        }

        if self.eat(&Token::Offset) {
            statement.offset = self.expect_unsigned()?;
            self.expect(Token::Limit)?;
            statement.count = Some(self.expect_unsigned()?);
        } else if self.eat(&Token::Limit) {
            statement.count = Some(self.expect_unsigned()?);
        }

        if check_trailing && self.current_token() != &Token::Eof {
            return Err(self.error(format!(
                "Unexpected token {:?} after end of query",
                self.current_token()
            )));
        }

        Ok(statement)
    }

    fn parse_select_list(&mut self) -> QueryResult<Vec<SelectItem>> {
        let mut items = vec![self.parse_select_item()?];
        while self.eat(&Token::Comma) {
            items.push(self.parse_select_item()?);
        }
        Ok(items)
    }

    fn parse_select_item(&mut self) -> QueryResult<SelectItem> {
        let mut item = into_select_item(self.parse_or_expression()?);
        if let Some(alias) = self.parse_optional_alias()? {
            item.alias = Some(alias);
        }
        Ok(item)
    }

    /// `AS name` or a bare identifier following an expression.
    fn parse_optional_alias(&mut self) -> QueryResult<Option<String>> {
        if self.eat(&Token::As) {
            if let Some(keyword) = self.current_token().keyword_text() {
                self.advance();
                return Ok(Some(keyword.to_string()));
            }
            return self.expect_identifier().map(Some);
        }

        if let Token::Identifier(name) = self.current_token().clone() {
            self.advance();
            return Ok(Some(name));
        }

        Ok(None)
    }

    fn parse_item_list(&mut self) -> QueryResult<Vec<SelectItem>> {
        let mut items = vec![into_select_item(self.parse_or_expression()?)];
        while self.eat(&Token::Comma) {
            items.push(into_select_item(self.parse_or_expression()?));
        }
        Ok(items)
    }

    fn parse_order_by_list(&mut self) -> QueryResult<Vec<OrderExpression>> {
        let mut expressions = Vec::new();
        loop {
            let select_item = into_select_item(self.parse_additive_expression()?);
            let direction = if self.eat(&Token::Desc) {
                OrderDirection::Desc
            } else {
                self.eat(&Token::Asc);
                OrderDirection::Asc
            };
            expressions.push(OrderExpression {
                select_item,
                direction,
            });

            if !self.eat(&Token::Comma) {
                return Ok(expressions);
            }
        }
    }

    fn parse_from(&mut self) -> QueryResult<Table> {
        if self.current_token() == &Token::LeftParen && self.peek_token(1) == &Token::Select {
            self.advance();
            let sub_query = self.parse_query(false)?;
            self.expect(Token::RightParen)?;

            let alias = self.require_alias()?;
            return Ok(Table {
                value: Some(alias.clone()),
                select_item: SelectItem::sub_query(sub_query).with_alias(&alias),
                is_in_select: false,
            });
        }

        let name = self.expect_identifier()?;

        if self.eat(&Token::In) {
            let first = self.expect_identifier()?;
            let source = self.parse_path(first)?;
            return Ok(Table {
                value: Some(name),
                select_item: source,
                is_in_select: true,
            });
        }

        let source = self.parse_path(name)?;
        match self.parse_optional_alias()? {
            Some(alias) => Ok(Table {
                value: Some(alias.clone()),
                select_item: source.with_alias(&alias),
                is_in_select: false,
            }),
            None => Ok(Table {
                value: None,
                select_item: source,
                is_in_select: false,
            }),
        }
    }

    fn parse_join(&mut self) -> QueryResult<JoinItem> {
        if self.current_token() == &Token::LeftParen && self.peek_token(1) == &Token::Select {
            self.advance();
            let sub_query = self.parse_query(false)?;
            self.expect(Token::RightParen)?;

            let alias = self.require_alias()?;
            return Ok(JoinItem {
                table: Table {
                    value: Some(alias.clone()),
                    ..Default::default()
                },
                select_item: SelectItem::sub_query(sub_query).with_alias(&alias),
            });
        }

        let name = self.expect_identifier()?;
        self.expect(Token::In)?;
        let first = self.expect_identifier()?;
        let source = self.parse_path(first)?;

        Ok(JoinItem {
            table: Table {
                value: Some(name),
                ..Default::default()
            },
            select_item: source,
        })
    }

    fn require_alias(&mut self) -> QueryResult<String> {
        match self.parse_optional_alias()? {
            Some(alias) => Ok(alias),
            None => Err(self.error("Subquery source requires an alias".to_string())),
        }
    }
}

/// Name a FROM source is bound under: the alias, else the path's last segment.
pub(crate) fn table_binding_name(table: &Table) -> Option<String> {
    table
        .value
        .clone()
        .or_else(|| table.select_item.alias.clone())
        .or_else(|| table.select_item.path.last().cloned())
}
