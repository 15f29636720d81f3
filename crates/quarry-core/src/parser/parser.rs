//! Recursive descent parser with Pratt expression parsing.

use super::error::ParseError;
use super::pratt::{
    infix_binding_power, is_predicate_keyword, token_to_binary_op, token_to_like_op,
    token_to_unary_op, COLLATE, COMPARISON_RHS, PREDICATE,
};
use crate::ast::{
    Assignment, Compound, CompoundOp, ConflictResolution, ConflictTarget, Cte, Delete, Expr,
    ExprKind, FrameBound, FrameExclude, FrameSpec, FrameUnits, FunctionArgs, FunctionCall, Ident,
    InList, IndexedBy, Insert, InsertSource, Join, JoinConstraint, JoinOperator, Limit, Literal,
    NamedWindow, ObjectName, OrderBy, OrderingTerm, Over, Query, ResultColumn, Returning,
    RowAlias, Select, SelectCore, Statement, TableFactor, TableWithJoins, Update, Upsert,
    UpsertAction, ValuesList, ValuesRow, WhenClause, WindowSpec, With,
};
use crate::lexer::{Comment, Keyword, Lexer, Span, Token, TokenKind};

type PResult<T> = Result<T, ParseError>;

/// Parses SQL text into [`Statement`]s.
pub struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    comments: Vec<Comment>,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize();
        Self {
            input,
            tokens,
            pos: 0,
            comments: lexer.into_comments(),
        }
    }

    /// Comments found anywhere in the input.
    #[must_use]
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Parses every `;`-separated statement in the input.
    ///
    /// # Errors
    ///
    /// Returns the first syntax error encountered.
    pub fn parse_statements(&mut self) -> PResult<Vec<Statement>> {
        let mut statements = Vec::new();
        loop {
            while self.eat(&TokenKind::Semicolon) {}
            if self.current().is_eof() {
                return Ok(statements);
            }
            statements.push(self.parse_statement_inner()?);
            if !self.eat(&TokenKind::Semicolon) && !self.current().is_eof() {
                return Err(self.unexpected("; or end of input"));
            }
        }
    }

    /// Parses exactly one statement, optionally followed by `;`.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the input is not a single valid statement.
    pub fn parse_statement(&mut self) -> PResult<Statement> {
        let statement = self.parse_statement_inner()?;
        self.eat(&TokenKind::Semicolon);
        if !self.current().is_eof() {
            return Err(self.unexpected("end of input"));
        }
        Ok(statement)
    }

    fn parse_statement_inner(&mut self) -> PResult<Statement> {
        let start = self.current().span.start;
        let with = if self.check_keyword(Keyword::With) {
            Some(self.parse_with()?)
        } else {
            None
        };

        match &self.current().kind {
            TokenKind::Keyword(Keyword::Select | Keyword::Values) => {
                Ok(Statement::Select(self.parse_query_with(with, start)?))
            }
            TokenKind::Keyword(Keyword::Insert | Keyword::Replace) => {
                Ok(Statement::Insert(self.parse_insert(with, start)?))
            }
            TokenKind::Keyword(Keyword::Update) => {
                Ok(Statement::Update(self.parse_update(with, start)?))
            }
            TokenKind::Keyword(Keyword::Delete) => {
                Ok(Statement::Delete(self.parse_delete(with, start)?))
            }
            _ => Err(self.unexpected("SELECT, VALUES, INSERT, REPLACE, UPDATE or DELETE")),
        }
    }

    // ---- token helpers -------------------------------------------------

    fn current(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn peek_kind(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map_or(&TokenKind::Eof, |t| &t.kind)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !token.is_eof() {
            self.pos += 1;
        }
        token
    }

    fn prev_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(0, |t| t.span.end)
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.prev_end().max(start))
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current().as_keyword() == Some(keyword)
    }

    /// Matches a bare identifier by text, for words that are not keywords.
    fn check_word(&self, word: &str) -> bool {
        matches!(&self.current().kind, TokenKind::Identifier(s) if s.eq_ignore_ascii_case(word))
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            return true;
        }
        false
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            return true;
        }
        false
    }

    fn expect(&mut self, kind: &TokenKind) -> PResult<Span> {
        if self.check(kind) {
            return Ok(self.advance().span);
        }
        Err(self.unexpected(&format!("{kind:?}")))
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> PResult<Span> {
        if self.check_keyword(keyword) {
            return Ok(self.advance().span);
        }
        Err(self.unexpected(keyword.as_str()))
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.current();
        if let TokenKind::Error(message) = &token.kind {
            return ParseError::new(message.clone(), token.span);
        }
        ParseError::unexpected(expected, token.kind.clone(), token.span)
    }

    fn ident_at(&self, token: &Token) -> Option<Ident> {
        match &token.kind {
            TokenKind::Identifier(value) => Some(Ident::new(value.clone(), token.span)),
            TokenKind::QuotedIdentifier(value) => Some(Ident {
                value: value.clone(),
                quoted: true,
                span: token.span,
            }),
            TokenKind::Keyword(kw) if !kw.is_reserved() => {
                Some(Ident::new(token.span.text(self.input), token.span))
            }
            _ => None,
        }
    }

    fn is_identifier(&self) -> bool {
        self.ident_at(self.current()).is_some()
    }

    fn expect_identifier(&mut self) -> PResult<Ident> {
        match self.ident_at(self.current()) {
            Some(ident) => {
                self.advance();
                Ok(ident)
            }
            None => Err(self.unexpected("identifier")),
        }
    }

    fn parse_identifier_list(&mut self) -> PResult<Vec<Ident>> {
        let mut idents = vec![self.expect_identifier()?];
        while self.eat(&TokenKind::Comma) {
            idents.push(self.expect_identifier()?);
        }
        Ok(idents)
    }

    fn parse_paren_identifier_list(&mut self) -> PResult<Vec<Ident>> {
        self.expect(&TokenKind::LeftParen)?;
        let idents = self.parse_identifier_list()?;
        self.expect(&TokenKind::RightParen)?;
        Ok(idents)
    }

    fn parse_object_name(&mut self) -> PResult<ObjectName> {
        let start = self.current().span.start;
        let first = self.expect_identifier()?;
        if self.check(&TokenKind::Dot) && !matches!(self.peek_kind(1), TokenKind::Star) {
            self.advance();
            let name = self.expect_identifier()?;
            return Ok(ObjectName {
                schema: Some(first),
                name,
                span: self.span_from(start),
            });
        }
        Ok(ObjectName {
            schema: None,
            name: first,
            span: self.span_from(start),
        })
    }

    fn is_query_start(&self) -> bool {
        matches!(
            self.current().kind,
            TokenKind::Keyword(Keyword::Select | Keyword::Values | Keyword::With)
        )
    }

    fn parse_optional_alias(&mut self) -> PResult<Option<Ident>> {
        if self.eat_keyword(Keyword::As) {
            return self.expect_identifier().map(Some);
        }
        let bare = match &self.current().kind {
            TokenKind::Identifier(_) | TokenKind::QuotedIdentifier(_) => true,
            TokenKind::Keyword(kw) => {
                !kw.is_reserved()
                    && !matches!(
                        kw,
                        Keyword::Over
                            | Keyword::Filter
                            | Keyword::Partition
                            | Keyword::Do
                            | Keyword::Nulls
                    )
            }
            _ => false,
        };
        if bare {
            return self.expect_identifier().map(Some);
        }
        Ok(None)
    }

    // ---- WITH / SELECT -------------------------------------------------

    fn parse_with(&mut self) -> PResult<With> {
        let start = self.expect_keyword(Keyword::With)?.start;
        let recursive = self.eat_keyword(Keyword::Recursive);
        let mut ctes = vec![self.parse_cte()?];
        while self.eat(&TokenKind::Comma) {
            ctes.push(self.parse_cte()?);
        }
        Ok(With {
            recursive,
            ctes,
            span: self.span_from(start),
        })
    }

    fn parse_cte(&mut self) -> PResult<Cte> {
        let start = self.current().span.start;
        let name = self.expect_identifier()?;
        let columns = if self.check(&TokenKind::LeftParen) {
            self.parse_paren_identifier_list()?
        } else {
            Vec::new()
        };
        self.expect_keyword(Keyword::As)?;
        let materialized = if self.eat_keyword(Keyword::Materialized) {
            Some(true)
        } else if self.check_keyword(Keyword::Not)
            && matches!(self.peek_kind(1), TokenKind::Keyword(Keyword::Materialized))
        {
            self.advance();
            self.advance();
            Some(false)
        } else {
            None
        };
        self.expect(&TokenKind::LeftParen)?;
        let query = self.parse_query()?;
        self.expect(&TokenKind::RightParen)?;
        Ok(Cte {
            name,
            columns,
            materialized,
            query: Box::new(query),
            span: self.span_from(start),
        })
    }

    fn parse_query(&mut self) -> PResult<Query> {
        let start = self.current().span.start;
        let with = if self.check_keyword(Keyword::With) {
            Some(self.parse_with()?)
        } else {
            None
        };
        self.parse_query_with(with, start)
    }

    fn parse_query_with(&mut self, with: Option<With>, start: usize) -> PResult<Query> {
        let body = self.parse_select_core()?;

        let mut compounds = Vec::new();
        loop {
            let op = match self.current().kind {
                TokenKind::Keyword(Keyword::Union) => CompoundOp::Union,
                TokenKind::Keyword(Keyword::Intersect) => CompoundOp::Intersect,
                TokenKind::Keyword(Keyword::Except) => CompoundOp::Except,
                _ => break,
            };
            self.advance();
            let all = self.eat_keyword(Keyword::All);
            if !all {
                self.eat_keyword(Keyword::Distinct);
            }
            let core = self.parse_select_core()?;
            compounds.push(Compound { op, all, core });
        }

        let order_by = self.parse_optional_order_by()?;
        let limit = self.parse_optional_limit()?;

        Ok(Query {
            with,
            body,
            compounds,
            order_by,
            limit,
            span: self.span_from(start),
        })
    }

    fn parse_select_core(&mut self) -> PResult<SelectCore> {
        if self.check_keyword(Keyword::Values) {
            return Ok(SelectCore::Values(self.parse_values_list()?));
        }
        Ok(SelectCore::Select(Box::new(self.parse_select()?)))
    }

    fn parse_select(&mut self) -> PResult<Select> {
        let start = self.expect_keyword(Keyword::Select)?.start;

        let distinct = if self.eat_keyword(Keyword::Distinct) {
            true
        } else {
            self.eat_keyword(Keyword::All);
            false
        };

        let mut columns = vec![self.parse_result_column()?];
        while self.eat(&TokenKind::Comma) {
            columns.push(self.parse_result_column()?);
        }

        let from = if self.eat_keyword(Keyword::From) {
            Some(self.parse_table_with_joins()?)
        } else {
            None
        };

        let where_clause = if self.eat_keyword(Keyword::Where) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        let group_by = if self.eat_keyword(Keyword::Group) {
            self.expect_keyword(Keyword::By)?;
            self.parse_expression_list()?
        } else {
            Vec::new()
        };

        let having = if self.eat_keyword(Keyword::Having) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        let mut windows = Vec::new();
        if self.eat_keyword(Keyword::Window) {
            loop {
                let window_start = self.current().span.start;
                let name = self.expect_identifier()?;
                self.expect_keyword(Keyword::As)?;
                let spec = self.parse_window_spec()?;
                windows.push(NamedWindow {
                    name,
                    spec,
                    span: self.span_from(window_start),
                });
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }

        Ok(Select {
            distinct,
            columns,
            from,
            where_clause,
            group_by,
            having,
            windows,
            span: self.span_from(start),
        })
    }

    fn parse_result_column(&mut self) -> PResult<ResultColumn> {
        let start = self.current().span.start;
        if self.eat(&TokenKind::Star) {
            return Ok(ResultColumn::Star {
                table: None,
                span: self.span_from(start),
            });
        }

        let expr = self.parse_expr()?;
        if let ExprKind::Wildcard { table } = expr.kind {
            return Ok(ResultColumn::Star {
                table,
                span: expr.span,
            });
        }
        let alias = self.parse_optional_alias()?;
        Ok(ResultColumn::Expr {
            expr,
            alias,
            span: self.span_from(start),
        })
    }

    fn parse_values_list(&mut self) -> PResult<ValuesList> {
        let start = self.expect_keyword(Keyword::Values)?.start;
        let mut rows = vec![self.parse_values_row()?];
        while self.eat(&TokenKind::Comma) {
            rows.push(self.parse_values_row()?);
        }
        Ok(ValuesList {
            rows,
            span: self.span_from(start),
        })
    }

    fn parse_values_row(&mut self) -> PResult<ValuesRow> {
        let start = self.current().span.start;
        let row_keyword = self.eat_keyword(Keyword::Row);
        self.expect(&TokenKind::LeftParen)?;
        let items = self.parse_expression_list()?;
        self.expect(&TokenKind::RightParen)?;
        Ok(ValuesRow {
            items,
            row_keyword,
            span: self.span_from(start),
        })
    }

    fn parse_optional_order_by(&mut self) -> PResult<Option<OrderBy>> {
        if !self.eat_keyword(Keyword::Order) {
            return Ok(None);
        }
        self.expect_keyword(Keyword::By)?;
        let start = self.current().span.start;
        let terms = self.parse_ordering_terms()?;
        Ok(Some(OrderBy {
            terms,
            span: self.span_from(start),
        }))
    }

    fn parse_ordering_terms(&mut self) -> PResult<Vec<OrderingTerm>> {
        let mut terms = Vec::new();
        loop {
            let start = self.current().span.start;
            let expr = self.parse_expr()?;
            let desc = if self.eat_keyword(Keyword::Desc) {
                Some(true)
            } else if self.eat_keyword(Keyword::Asc) {
                Some(false)
            } else {
                None
            };
            let nulls_first = if self.eat_keyword(Keyword::Nulls) {
                if self.eat_keyword(Keyword::First) {
                    Some(true)
                } else {
                    self.expect_keyword(Keyword::Last)?;
                    Some(false)
                }
            } else {
                None
            };
            terms.push(OrderingTerm {
                expr,
                desc,
                nulls_first,
                span: self.span_from(start),
            });
            if !self.eat(&TokenKind::Comma) {
                return Ok(terms);
            }
        }
    }

    fn parse_optional_limit(&mut self) -> PResult<Option<Limit>> {
        if !self.eat_keyword(Keyword::Limit) {
            return Ok(None);
        }
        let start = self.current().span.start;
        let first = self.parse_expr()?;
        let (count, offset, comma) = if self.eat_keyword(Keyword::Offset) {
            (first, Some(self.parse_expr()?), false)
        } else if self.eat(&TokenKind::Comma) {
            (self.parse_expr()?, Some(first), true)
        } else {
            (first, None, false)
        };
        Ok(Some(Limit {
            count,
            offset,
            comma,
            span: self.span_from(start),
        }))
    }

    // ---- FROM ----------------------------------------------------------

    fn parse_table_with_joins(&mut self) -> PResult<TableWithJoins> {
        let start = self.current().span.start;
        let factor = self.parse_table_factor()?;
        let mut joins = Vec::new();
        loop {
            let join_start = self.current().span.start;
            let (operator, natural) = if self.eat(&TokenKind::Comma) {
                (JoinOperator::Comma, false)
            } else if self.is_join_keyword() {
                self.parse_join_operator()?
            } else {
                break;
            };
            let factor = self.parse_table_factor()?;
            let constraint = if self.eat_keyword(Keyword::On) {
                Some(JoinConstraint::On(self.parse_expr()?))
            } else if self.eat_keyword(Keyword::Using) {
                Some(JoinConstraint::Using(self.parse_paren_identifier_list()?))
            } else {
                None
            };
            joins.push(Join {
                operator,
                natural,
                factor,
                constraint,
                span: self.span_from(join_start),
            });
        }
        Ok(TableWithJoins {
            factor,
            joins,
            span: self.span_from(start),
        })
    }

    fn is_join_keyword(&self) -> bool {
        matches!(
            self.current().kind,
            TokenKind::Keyword(
                Keyword::Join
                    | Keyword::Inner
                    | Keyword::Left
                    | Keyword::Right
                    | Keyword::Full
                    | Keyword::Cross
                    | Keyword::Natural
                    | Keyword::StraightJoin
            )
        )
    }

    fn parse_join_operator(&mut self) -> PResult<(JoinOperator, bool)> {
        let natural = self.eat_keyword(Keyword::Natural);
        let operator = match self.current().kind {
            TokenKind::Keyword(Keyword::Join) => JoinOperator::Inner,
            TokenKind::Keyword(Keyword::StraightJoin) => {
                self.advance();
                return Ok((JoinOperator::Straight, natural));
            }
            TokenKind::Keyword(Keyword::Inner) => {
                self.advance();
                JoinOperator::Inner
            }
            TokenKind::Keyword(Keyword::Cross) => {
                self.advance();
                JoinOperator::Cross
            }
            TokenKind::Keyword(kw @ (Keyword::Left | Keyword::Right | Keyword::Full)) => {
                self.advance();
                self.eat_keyword(Keyword::Outer);
                match kw {
                    Keyword::Left => JoinOperator::Left,
                    Keyword::Right => JoinOperator::Right,
                    _ => JoinOperator::Full,
                }
            }
            _ => return Err(self.unexpected("JOIN")),
        };
        self.expect_keyword(Keyword::Join)?;
        Ok((operator, natural))
    }

    fn parse_table_factor(&mut self) -> PResult<TableFactor> {
        let start = self.current().span.start;

        if self.eat(&TokenKind::LeftParen) {
            if self.is_query_start() {
                let query = self.parse_query()?;
                self.expect(&TokenKind::RightParen)?;
                let alias = self.parse_optional_alias()?;
                return Ok(TableFactor::Derived {
                    query: Box::new(query),
                    alias,
                    span: self.span_from(start),
                });
            }
            let inner = self.parse_table_with_joins()?;
            self.expect(&TokenKind::RightParen)?;
            let alias = self.parse_optional_alias()?;
            return Ok(TableFactor::Nested {
                inner: Box::new(inner),
                alias,
                span: self.span_from(start),
            });
        }

        let name = self.parse_object_name()?;
        let alias = self.parse_optional_alias()?;
        let indexed = if self.eat_keyword(Keyword::Indexed) {
            self.expect_keyword(Keyword::By)?;
            Some(IndexedBy::Index(self.expect_identifier()?))
        } else if self.check_keyword(Keyword::Not)
            && matches!(self.peek_kind(1), TokenKind::Keyword(Keyword::Indexed))
        {
            self.advance();
            self.advance();
            Some(IndexedBy::NotIndexed)
        } else {
            None
        };

        Ok(TableFactor::Table {
            name,
            alias,
            indexed,
            span: self.span_from(start),
        })
    }

    // ---- INSERT / UPDATE / DELETE --------------------------------------

    fn parse_conflict_resolution(&mut self) -> PResult<Option<ConflictResolution>> {
        if !self.eat_keyword(Keyword::Or) {
            return Ok(None);
        }
        let action = match self.current().kind {
            TokenKind::Keyword(Keyword::Abort) => ConflictResolution::Abort,
            TokenKind::Keyword(Keyword::Fail) => ConflictResolution::Fail,
            TokenKind::Keyword(Keyword::Ignore) => ConflictResolution::Ignore,
            TokenKind::Keyword(Keyword::Replace) => ConflictResolution::Replace,
            TokenKind::Keyword(Keyword::Rollback) => ConflictResolution::Rollback,
            _ => return Err(self.unexpected("ABORT, FAIL, IGNORE, REPLACE or ROLLBACK")),
        };
        self.advance();
        Ok(Some(action))
    }

    /// MySQL statement modifiers, upper-cased in source order.
    fn parse_modifiers(&mut self, allowed: &[&str]) -> Vec<String> {
        let mut modifiers = Vec::new();
        loop {
            if self.check_keyword(Keyword::Ignore) && allowed.contains(&"IGNORE") {
                self.advance();
                modifiers.push("IGNORE".to_string());
                continue;
            }
            match allowed.iter().find(|word| self.check_word(word)) {
                Some(word) => {
                    self.advance();
                    modifiers.push((*word).to_string());
                }
                None => return modifiers,
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    fn parse_insert(&mut self, with: Option<With>, start: usize) -> PResult<Insert> {
        let replace = if self.eat_keyword(Keyword::Replace) {
            true
        } else {
            self.expect_keyword(Keyword::Insert)?;
            false
        };
        let or_action = self.parse_conflict_resolution()?;
        let modifiers =
            self.parse_modifiers(&["LOW_PRIORITY", "DELAYED", "HIGH_PRIORITY", "IGNORE"]);
        self.eat_keyword(Keyword::Into);

        let table = self.parse_object_name()?;
        let alias = if self.eat_keyword(Keyword::As) {
            Some(self.expect_identifier()?)
        } else {
            None
        };

        let columns = if self.check(&TokenKind::LeftParen) && !self.peek_is_query_start() {
            self.parse_paren_identifier_list()?
        } else {
            Vec::new()
        };

        let source = if self.check_keyword(Keyword::Values) {
            InsertSource::Values(self.parse_values_list()?)
        } else if self.check_keyword(Keyword::Default) {
            let default_start = self.advance().span.start;
            self.expect_keyword(Keyword::Values)?;
            InsertSource::DefaultValues(self.span_from(default_start))
        } else if self.eat_keyword(Keyword::Set) {
            InsertSource::Set(self.parse_assignments()?)
        } else if self.is_query_start() {
            InsertSource::Query(Box::new(self.parse_query()?))
        } else if self.eat(&TokenKind::LeftParen) {
            let query = self.parse_query()?;
            self.expect(&TokenKind::RightParen)?;
            InsertSource::Query(Box::new(query))
        } else {
            return Err(self.unexpected("VALUES, SELECT, SET or DEFAULT VALUES"));
        };

        let row_alias = if self.check_keyword(Keyword::As) {
            let alias_start = self.advance().span.start;
            let name = self.expect_identifier()?;
            let columns = if self.check(&TokenKind::LeftParen) {
                self.parse_paren_identifier_list()?
            } else {
                Vec::new()
            };
            Some(RowAlias {
                name,
                columns,
                span: self.span_from(alias_start),
            })
        } else {
            None
        };

        let mut upserts = Vec::new();
        let mut duplicate_key_update = None;
        while self.check_keyword(Keyword::On) {
            match self.peek_kind(1) {
                TokenKind::Keyword(Keyword::Conflict) => upserts.push(self.parse_upsert()?),
                TokenKind::Keyword(Keyword::Duplicate) => {
                    self.advance();
                    self.advance();
                    self.expect_keyword(Keyword::Key)?;
                    self.expect_keyword(Keyword::Update)?;
                    duplicate_key_update = Some(self.parse_assignments()?);
                }
                _ => {
                    self.advance();
                    return Err(self.unexpected("CONFLICT or DUPLICATE KEY UPDATE"));
                }
            }
        }

        let returning = self.parse_optional_returning()?;

        Ok(Insert {
            with,
            replace,
            or_action,
            modifiers,
            table,
            alias,
            columns,
            source,
            row_alias,
            upserts,
            duplicate_key_update,
            returning,
            span: self.span_from(start),
        })
    }

    fn peek_is_query_start(&self) -> bool {
        matches!(
            self.peek_kind(1),
            TokenKind::Keyword(Keyword::Select | Keyword::Values | Keyword::With)
        )
    }

    fn parse_upsert(&mut self) -> PResult<Upsert> {
        let start = self.expect_keyword(Keyword::On)?.start;
        self.expect_keyword(Keyword::Conflict)?;

        let target = if self.check(&TokenKind::LeftParen) {
            let target_start = self.advance().span.start;
            let columns = self.parse_expression_list()?;
            self.expect(&TokenKind::RightParen)?;
            let where_clause = if self.eat_keyword(Keyword::Where) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            Some(ConflictTarget {
                columns,
                where_clause,
                span: self.span_from(target_start),
            })
        } else {
            None
        };

        self.expect_keyword(Keyword::Do)?;
        let action = if self.eat_keyword(Keyword::Nothing) {
            UpsertAction::Nothing
        } else {
            self.expect_keyword(Keyword::Update)?;
            self.expect_keyword(Keyword::Set)?;
            let assignments = self.parse_assignments()?;
            let where_clause = if self.eat_keyword(Keyword::Where) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            UpsertAction::Update {
                assignments,
                where_clause,
            }
        };

        Ok(Upsert {
            target,
            action,
            span: self.span_from(start),
        })
    }

    fn parse_assignments(&mut self) -> PResult<Vec<Assignment>> {
        let mut assignments = Vec::new();
        loop {
            let start = self.current().span.start;
            let columns = if self.check(&TokenKind::LeftParen) {
                self.parse_paren_identifier_list()?
            } else {
                let mut column = self.expect_identifier()?;
                while self.eat(&TokenKind::Dot) {
                    column = self.expect_identifier()?;
                }
                vec![column]
            };
            self.expect(&TokenKind::Eq)?;
            let value = self.parse_expr()?;
            assignments.push(Assignment {
                columns,
                value,
                span: self.span_from(start),
            });
            if !self.eat(&TokenKind::Comma) {
                return Ok(assignments);
            }
        }
    }

    fn parse_optional_returning(&mut self) -> PResult<Option<Returning>> {
        if !self.eat_keyword(Keyword::Returning) {
            return Ok(None);
        }
        let start = self.current().span.start;
        let mut columns = vec![self.parse_result_column()?];
        while self.eat(&TokenKind::Comma) {
            columns.push(self.parse_result_column()?);
        }
        Ok(Some(Returning {
            columns,
            span: self.span_from(start),
        }))
    }

    fn parse_update(&mut self, with: Option<With>, start: usize) -> PResult<Update> {
        self.expect_keyword(Keyword::Update)?;
        let or_action = self.parse_conflict_resolution()?;
        let modifiers = self.parse_modifiers(&["LOW_PRIORITY", "IGNORE"]);
        let table = self.parse_table_with_joins()?;
        self.expect_keyword(Keyword::Set)?;
        let assignments = self.parse_assignments()?;

        let from = if self.eat_keyword(Keyword::From) {
            Some(self.parse_table_with_joins()?)
        } else {
            None
        };
        let where_clause = if self.eat_keyword(Keyword::Where) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        let returning = self.parse_optional_returning()?;
        let order_by = self.parse_optional_order_by()?;
        let limit = self.parse_optional_limit()?;

        Ok(Update {
            with,
            or_action,
            modifiers,
            table,
            assignments,
            from,
            where_clause,
            returning,
            order_by,
            limit,
            span: self.span_from(start),
        })
    }

    fn parse_delete(&mut self, with: Option<With>, start: usize) -> PResult<Delete> {
        self.expect_keyword(Keyword::Delete)?;
        let modifiers = self.parse_modifiers(&["LOW_PRIORITY", "QUICK", "IGNORE"]);

        let mut targets = Vec::new();
        if !self.check_keyword(Keyword::From) {
            loop {
                targets.push(self.parse_object_name()?);
                if self.eat(&TokenKind::Dot) {
                    self.expect(&TokenKind::Star)?;
                }
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect_keyword(Keyword::From)?;
        let from = self.parse_table_with_joins()?;

        let using = if self.eat_keyword(Keyword::Using) {
            Some(self.parse_table_with_joins()?)
        } else {
            None
        };
        let where_clause = if self.eat_keyword(Keyword::Where) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        let returning = self.parse_optional_returning()?;
        let order_by = self.parse_optional_order_by()?;
        let limit = self.parse_optional_limit()?;

        Ok(Delete {
            with,
            modifiers,
            targets,
            from,
            using,
            where_clause,
            returning,
            order_by,
            limit,
            span: self.span_from(start),
        })
    }

    // ---- expressions ---------------------------------------------------

    /// Parses a full expression.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if no valid expression starts at the current token.
    pub fn parse_expr(&mut self) -> PResult<Expr> {
        self.parse_expression(0)
    }

    fn parse_expression_list(&mut self) -> PResult<Vec<Expr>> {
        let mut exprs = vec![self.parse_expr()?];
        while self.eat(&TokenKind::Comma) {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    fn parse_expression(&mut self, min_bp: u8) -> PResult<Expr> {
        let start = self.current().span.start;
        let mut lhs = self.parse_prefix()?;

        loop {
            let kind = self.current().kind.clone();

            let negated_predicate = kind == TokenKind::Keyword(Keyword::Not)
                && (is_predicate_keyword(self.peek_kind(1))
                    || matches!(self.peek_kind(1), TokenKind::Keyword(Keyword::Null)));
            if negated_predicate || is_predicate_keyword(&kind) {
                if PREDICATE.0 < min_bp {
                    break;
                }
                if negated_predicate {
                    self.advance();
                }
                lhs = self.parse_predicate(lhs, start, negated_predicate)?;
                continue;
            }

            if kind == TokenKind::Keyword(Keyword::Collate) {
                if COLLATE < min_bp {
                    break;
                }
                self.advance();
                let collation = self.expect_identifier()?;
                lhs = Expr::new(
                    ExprKind::Collate {
                        expr: Box::new(lhs),
                        collation,
                    },
                    self.span_from(start),
                );
                continue;
            }

            let Some((l_bp, r_bp)) = infix_binding_power(&kind) else {
                break;
            };
            if l_bp < min_bp {
                break;
            }
            let Some(op) = token_to_binary_op(&kind) else {
                break;
            };
            self.advance();
            let rhs = self.parse_expression(r_bp)?;
            lhs = Expr::new(
                ExprKind::Binary {
                    left: Box::new(lhs),
                    op,
                    right: Box::new(rhs),
                },
                self.span_from(start),
            );
        }

        Ok(lhs)
    }

    fn parse_predicate(&mut self, lhs: Expr, start: usize, negated: bool) -> PResult<Expr> {
        let token = self.advance();
        let expr = Box::new(lhs);
        let kind = match token.kind {
            TokenKind::Keyword(Keyword::Null) => ExprKind::IsNull {
                expr,
                negated: true,
            },
            TokenKind::Keyword(Keyword::Isnull) => ExprKind::IsNull {
                expr,
                negated,
            },
            TokenKind::Keyword(Keyword::Notnull) => ExprKind::IsNull {
                expr,
                negated: !negated,
            },
            TokenKind::Keyword(Keyword::Is) => {
                let mut is_not = self.eat_keyword(Keyword::Not);
                if self.eat_keyword(Keyword::Distinct) {
                    self.expect_keyword(Keyword::From)?;
                    is_not = !is_not;
                }
                if self.eat_keyword(Keyword::Null) {
                    ExprKind::IsNull {
                        expr,
                        negated: is_not,
                    }
                } else {
                    ExprKind::Is {
                        left: expr,
                        right: Box::new(self.parse_expression(COMPARISON_RHS)?),
                        negated: is_not,
                    }
                }
            }
            TokenKind::Keyword(Keyword::In) => ExprKind::In {
                expr,
                list: self.parse_in_list()?,
                negated,
            },
            TokenKind::Keyword(Keyword::Between) => {
                let low = self.parse_expression(COMPARISON_RHS)?;
                self.expect_keyword(Keyword::And)?;
                let high = self.parse_expression(COMPARISON_RHS)?;
                ExprKind::Between {
                    expr,
                    low: Box::new(low),
                    high: Box::new(high),
                    negated,
                }
            }
            ref other => {
                let Some(op) = token_to_like_op(other) else {
                    return Err(ParseError::unexpected(
                        "predicate",
                        token.kind.clone(),
                        token.span,
                    ));
                };
                let pattern = self.parse_expression(COMPARISON_RHS)?;
                let escape = if self.eat_keyword(Keyword::Escape) {
                    Some(Box::new(self.parse_expression(COMPARISON_RHS)?))
                } else {
                    None
                };
                ExprKind::Like {
                    expr,
                    op,
                    pattern: Box::new(pattern),
                    escape,
                    negated,
                }
            }
        };
        Ok(Expr::new(kind, self.span_from(start)))
    }

    fn parse_in_list(&mut self) -> PResult<InList> {
        let start = self.current().span.start;
        if !self.eat(&TokenKind::LeftParen) {
            return Ok(InList::Table(self.parse_object_name()?));
        }
        if self.is_query_start() {
            let query = self.parse_query()?;
            self.expect(&TokenKind::RightParen)?;
            return Ok(InList::Subquery {
                query: Box::new(query),
                span: self.span_from(start),
            });
        }
        let items = if self.check(&TokenKind::RightParen) {
            Vec::new()
        } else {
            self.parse_expression_list()?
        };
        self.expect(&TokenKind::RightParen)?;
        Ok(InList::Exprs {
            items,
            span: self.span_from(start),
        })
    }

    fn parse_prefix(&mut self) -> PResult<Expr> {
        if let Some((op, bp)) = token_to_unary_op(&self.current().kind) {
            let start = self.advance().span.start;
            let operand = self.parse_expression(bp)?;
            return Ok(Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                self.span_from(start),
            ));
        }
        self.parse_primary()
    }

    #[allow(clippy::too_many_lines)]
    fn parse_primary(&mut self) -> PResult<Expr> {
        let token = self.current().clone();
        let start = token.span.start;

        let literal = match &token.kind {
            TokenKind::Integer(n) => Some(Literal::Integer(*n)),
            TokenKind::Float(f) => Some(Literal::Float(*f)),
            TokenKind::String(s) => Some(Literal::String(s.clone())),
            TokenKind::Blob(b) => Some(Literal::Blob(b.clone())),
            TokenKind::Keyword(Keyword::True) => Some(Literal::Boolean(true)),
            TokenKind::Keyword(Keyword::False) => Some(Literal::Boolean(false)),
            TokenKind::Keyword(Keyword::Null) => Some(Literal::Null),
            TokenKind::Keyword(Keyword::CurrentDate) => Some(Literal::CurrentDate),
            TokenKind::Keyword(Keyword::CurrentTime) => Some(Literal::CurrentTime),
            TokenKind::Keyword(Keyword::CurrentTimestamp) => Some(Literal::CurrentTimestamp),
            _ => None,
        };
        if let Some(literal) = literal {
            self.advance();
            return Ok(Expr::new(ExprKind::Literal(literal), token.span));
        }

        match &token.kind {
            TokenKind::Parameter(p) => {
                self.advance();
                Ok(Expr::new(ExprKind::Bind(p.clone()), token.span))
            }
            TokenKind::LeftParen => {
                self.advance();
                if self.is_query_start() {
                    let query = self.parse_query()?;
                    self.expect(&TokenKind::RightParen)?;
                    return Ok(Expr::new(
                        ExprKind::Subquery(Box::new(query)),
                        self.span_from(start),
                    ));
                }
                let mut items = self.parse_expression_list()?;
                self.expect(&TokenKind::RightParen)?;
                let kind = if items.len() == 1 {
                    ExprKind::Nested(Box::new(items.remove(0)))
                } else {
                    ExprKind::List(items)
                };
                Ok(Expr::new(kind, self.span_from(start)))
            }
            TokenKind::Keyword(Keyword::Case) => self.parse_case_expression(),
            TokenKind::Keyword(Keyword::Cast) => self.parse_cast_expression(),
            TokenKind::Keyword(Keyword::Exists) => {
                self.advance();
                self.expect(&TokenKind::LeftParen)?;
                let query = self.parse_query()?;
                self.expect(&TokenKind::RightParen)?;
                Ok(Expr::new(
                    ExprKind::Exists(Box::new(query)),
                    self.span_from(start),
                ))
            }
            TokenKind::Keyword(Keyword::Row)
                if matches!(self.peek_kind(1), TokenKind::LeftParen) =>
            {
                self.advance();
                self.advance();
                let items = self.parse_expression_list()?;
                self.expect(&TokenKind::RightParen)?;
                Ok(Expr::new(ExprKind::Row(items), self.span_from(start)))
            }
            TokenKind::Keyword(kw @ (Keyword::Left | Keyword::Right | Keyword::Like | Keyword::Glob))
                if matches!(self.peek_kind(1), TokenKind::LeftParen) =>
            {
                let name = Ident::new(kw.as_str().to_ascii_lowercase(), token.span);
                self.advance();
                self.parse_function_call(name, start)
            }
            _ => {
                if self.is_identifier() {
                    return self.parse_name_expression();
                }
                Err(self.unexpected("expression"))
            }
        }
    }

    /// A column reference, `t.*`, or a function call.
    fn parse_name_expression(&mut self) -> PResult<Expr> {
        let start = self.current().span.start;
        let first = self.expect_identifier()?;

        if !first.quoted && self.check(&TokenKind::LeftParen) {
            return self.parse_function_call(first, start);
        }

        let mut parts = vec![first];
        while self.check(&TokenKind::Dot) {
            self.advance();
            if self.eat(&TokenKind::Star) {
                return Ok(Expr::new(
                    ExprKind::Wildcard { table: parts.pop() },
                    self.span_from(start),
                ));
            }
            parts.push(self.expect_identifier()?);
            if parts.len() > 3 {
                return Err(ParseError::new(
                    "too many name qualifiers",
                    self.span_from(start),
                ));
            }
        }

        let name = parts.pop().ok_or_else(|| self.unexpected("identifier"))?;
        let table = parts.pop();
        let schema = parts.pop();
        Ok(Expr::new(
            ExprKind::Column {
                schema,
                table,
                name,
            },
            self.span_from(start),
        ))
    }

    fn parse_function_call(&mut self, name: Ident, start: usize) -> PResult<Expr> {
        self.expect(&TokenKind::LeftParen)?;
        let distinct = self.eat_keyword(Keyword::Distinct);

        let args = if self.check(&TokenKind::Star) {
            FunctionArgs::Star(self.advance().span)
        } else if self.check(&TokenKind::RightParen) {
            FunctionArgs::List(Vec::new())
        } else {
            FunctionArgs::List(self.parse_expression_list()?)
        };
        self.expect(&TokenKind::RightParen)?;

        let filter = if self.eat_keyword(Keyword::Filter) {
            self.expect(&TokenKind::LeftParen)?;
            self.expect_keyword(Keyword::Where)?;
            let condition = self.parse_expr()?;
            self.expect(&TokenKind::RightParen)?;
            Some(Box::new(condition))
        } else {
            None
        };

        let over = if self.eat_keyword(Keyword::Over) {
            if self.check(&TokenKind::LeftParen) {
                Some(Over::Spec(self.parse_window_spec()?))
            } else {
                Some(Over::Named(self.expect_identifier()?))
            }
        } else {
            None
        };

        Ok(Expr::new(
            ExprKind::Function(FunctionCall {
                name,
                args,
                distinct,
                filter,
                over,
            }),
            self.span_from(start),
        ))
    }

    fn parse_window_spec(&mut self) -> PResult<WindowSpec> {
        let start = self.expect(&TokenKind::LeftParen)?.start;

        let base = match self.current().kind {
            TokenKind::Identifier(_) | TokenKind::QuotedIdentifier(_) => {
                Some(self.expect_identifier()?)
            }
            _ => None,
        };

        let partition_by = if self.eat_keyword(Keyword::Partition) {
            self.expect_keyword(Keyword::By)?;
            self.parse_expression_list()?
        } else {
            Vec::new()
        };

        let order_by = if self.eat_keyword(Keyword::Order) {
            self.expect_keyword(Keyword::By)?;
            self.parse_ordering_terms()?
        } else {
            Vec::new()
        };

        let frame = self.parse_optional_frame()?;
        self.expect(&TokenKind::RightParen)?;

        Ok(WindowSpec {
            base,
            partition_by,
            order_by,
            frame,
            span: self.span_from(start),
        })
    }

    fn parse_optional_frame(&mut self) -> PResult<Option<FrameSpec>> {
        let units = match self.current().kind {
            TokenKind::Keyword(Keyword::Rows) => FrameUnits::Rows,
            TokenKind::Keyword(Keyword::Range) => FrameUnits::Range,
            TokenKind::Keyword(Keyword::Groups) => FrameUnits::Groups,
            _ => return Ok(None),
        };
        let start = self.advance().span.start;

        let (frame_start, end) = if self.eat_keyword(Keyword::Between) {
            let low = self.parse_frame_bound()?;
            self.expect_keyword(Keyword::And)?;
            (low, Some(self.parse_frame_bound()?))
        } else {
            (self.parse_frame_bound()?, None)
        };

        let exclude = if self.eat_keyword(Keyword::Exclude) {
            Some(match self.current().kind {
                TokenKind::Keyword(Keyword::No) => {
                    self.advance();
                    self.expect_keyword(Keyword::Others)?;
                    FrameExclude::NoOthers
                }
                TokenKind::Keyword(Keyword::Current) => {
                    self.advance();
                    self.expect_keyword(Keyword::Row)?;
                    FrameExclude::CurrentRow
                }
                TokenKind::Keyword(Keyword::Group) => {
                    self.advance();
                    FrameExclude::Group
                }
                TokenKind::Keyword(Keyword::Ties) => {
                    self.advance();
                    FrameExclude::Ties
                }
                _ => return Err(self.unexpected("NO OTHERS, CURRENT ROW, GROUP or TIES")),
            })
        } else {
            None
        };

        Ok(Some(FrameSpec {
            units,
            start: frame_start,
            end,
            exclude,
            span: self.span_from(start),
        }))
    }

    fn parse_frame_bound(&mut self) -> PResult<FrameBound> {
        if self.eat_keyword(Keyword::Unbounded) {
            if self.eat_keyword(Keyword::Preceding) {
                return Ok(FrameBound::UnboundedPreceding);
            }
            self.expect_keyword(Keyword::Following)?;
            return Ok(FrameBound::UnboundedFollowing);
        }
        if self.eat_keyword(Keyword::Current) {
            self.expect_keyword(Keyword::Row)?;
            return Ok(FrameBound::CurrentRow);
        }
        let offset = Box::new(self.parse_expression(COMPARISON_RHS)?);
        if self.eat_keyword(Keyword::Preceding) {
            return Ok(FrameBound::Preceding(offset));
        }
        self.expect_keyword(Keyword::Following)?;
        Ok(FrameBound::Following(offset))
    }

    fn parse_case_expression(&mut self) -> PResult<Expr> {
        let start = self.expect_keyword(Keyword::Case)?.start;

        let operand = if self.check_keyword(Keyword::When) {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };

        let mut when_clauses = Vec::new();
        while self.eat_keyword(Keyword::When) {
            let condition = self.parse_expr()?;
            self.expect_keyword(Keyword::Then)?;
            let result = self.parse_expr()?;
            when_clauses.push(WhenClause { condition, result });
        }
        if when_clauses.is_empty() {
            return Err(self.unexpected("WHEN"));
        }

        let else_clause = if self.eat_keyword(Keyword::Else) {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        self.expect_keyword(Keyword::End)?;

        Ok(Expr::new(
            ExprKind::Case {
                operand,
                when_clauses,
                else_clause,
            },
            self.span_from(start),
        ))
    }

    fn parse_cast_expression(&mut self) -> PResult<Expr> {
        let start = self.expect_keyword(Keyword::Cast)?.start;
        self.expect(&TokenKind::LeftParen)?;
        let expr = self.parse_expr()?;
        self.expect_keyword(Keyword::As)?;

        let type_start = self.current().span.start;
        let mut words = Vec::new();
        while let TokenKind::Identifier(_) | TokenKind::Keyword(_) = self.current().kind {
            words.push(self.advance().span.text(self.input).to_ascii_uppercase());
        }
        if words.is_empty() {
            return Err(self.unexpected("type name"));
        }
        let mut type_name = words.join(" ");
        if self.check(&TokenKind::LeftParen) {
            let args_start = self.advance().span.start;
            while !self.check(&TokenKind::RightParen) {
                if self.current().is_eof() {
                    return Err(self.unexpected(")"));
                }
                self.advance();
            }
            self.advance();
            let args: String = self
                .span_from(args_start)
                .text(self.input)
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            type_name.push_str(&args);
        }
        let type_span = self.span_from(type_start);
        self.expect(&TokenKind::RightParen)?;

        Ok(Expr::new(
            ExprKind::Cast {
                expr: Box::new(expr),
                type_name,
                type_span,
            },
            self.span_from(start),
        ))
    }
}
