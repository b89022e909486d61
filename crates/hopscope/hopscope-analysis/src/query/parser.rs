//! Recursive-descent parser.
//!
//! ```text
//! query      := WHERE predicate [ORDER BY field [ASC|DESC]] [LIMIT integer]
//! predicate  := comparison (AND comparison)*
//! comparison := field op literal
//! op         := "=" | "<" | ">" | CONTAINS
//! literal    := number | 'string' | "string" | true | false
//! ```

use hopscope_core::errors::HopscopeResult;

use super::ast::{CompareOp, Expr, Field, Literal, Query, QueryScope, SortClause, SortOrder};
use super::lexer::{syntax, tokenize, Token, TokenKind};

const RESERVED: [&str; 10] = [
    "where", "and", "order", "by", "asc", "desc", "limit", "contains", "true", "false",
];

/// Parse a query string into a [`Query`].
pub fn parse(input: &str) -> HopscopeResult<Query> {
    let tokens = tokenize(input)?;
    Parser {
        tokens,
        pos: 0,
        fields: Vec::new(),
    }
    .parse_query()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Every field reference with its token, for scope checking.
    fields: Vec<(Field, Token)>,
}

impl Parser {
    fn peek(&self) -> &Token {
        // tokenize always ends with Eof and we never advance past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn expect_keyword(&mut self, word: &str) -> HopscopeResult<()> {
        let token = self.peek();
        if token.is_keyword(word) {
            self.advance();
            Ok(())
        } else {
            Err(syntax(
                &token.describe(),
                token.position,
                &format!("expected {}", word.to_uppercase()),
            ))
        }
    }

    fn parse_query(mut self) -> HopscopeResult<Query> {
        self.expect_keyword("where")?;
        let predicate = self.parse_predicate()?;

        let mut order_by = None;
        if self.peek().is_keyword("order") {
            self.advance();
            self.expect_keyword("by")?;
            let field = self.parse_field()?;
            let order = if self.peek().is_keyword("desc") {
                self.advance();
                SortOrder::Desc
            } else {
                if self.peek().is_keyword("asc") {
                    self.advance();
                }
                SortOrder::Asc
            };
            order_by = Some(SortClause { field, order });
        }

        let mut limit = None;
        if self.peek().is_keyword("limit") {
            self.advance();
            limit = Some(self.parse_limit()?);
        }

        let trailing = self.peek();
        if trailing.kind != TokenKind::Eof {
            return Err(syntax(
                &trailing.describe(),
                trailing.position,
                "unexpected token; expected AND, ORDER BY, LIMIT or end of query",
            ));
        }

        let scope = self.resolve_scope()?;
        Ok(Query {
            predicate,
            order_by,
            limit,
            scope,
        })
    }

    fn parse_predicate(&mut self) -> HopscopeResult<Expr> {
        let mut expr = self.parse_comparison()?;
        while self.peek().is_keyword("and") {
            self.advance();
            let right = self.parse_comparison()?;
            expr = Expr::And(Box::new(expr), Box::new(right));
        }
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> HopscopeResult<Expr> {
        let field = self.parse_field()?;

        let token = self.advance();
        let op = match &token.kind {
            TokenKind::Eq => CompareOp::Eq,
            TokenKind::Lt => CompareOp::Lt,
            TokenKind::Gt => CompareOp::Gt,
            _ if token.is_keyword("contains") => CompareOp::Contains,
            _ => {
                return Err(syntax(
                    &token.describe(),
                    token.position,
                    "expected =, <, > or CONTAINS",
                ))
            }
        };

        let value = self.parse_literal()?;
        Ok(Expr::Comparison { field, op, value })
    }

    fn parse_field(&mut self) -> HopscopeResult<Field> {
        let token = self.advance();
        match &token.kind {
            TokenKind::Ident(name)
                if !RESERVED.iter().any(|r| name.eq_ignore_ascii_case(r))
                    && !name.ends_with('.') =>
            {
                let field = Field::from_name(name);
                self.fields.push((field.clone(), token.clone()));
                Ok(field)
            }
            _ => Err(syntax(&token.describe(), token.position, "expected field name")),
        }
    }

    fn parse_literal(&mut self) -> HopscopeResult<Literal> {
        let token = self.advance();
        match &token.kind {
            TokenKind::Number(n) => Ok(Literal::Number(*n)),
            TokenKind::Str(s) => Ok(Literal::String(s.clone())),
            _ if token.is_keyword("true") => Ok(Literal::Bool(true)),
            _ if token.is_keyword("false") => Ok(Literal::Bool(false)),
            _ => Err(syntax(
                &token.describe(),
                token.position,
                "expected number, quoted string, true or false",
            )),
        }
    }

    fn parse_limit(&mut self) -> HopscopeResult<usize> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number(n) if n >= 0.0 && n.fract() == 0.0 && n <= usize::MAX as f64 => {
                Ok(n as usize)
            }
            _ => Err(syntax(
                &token.describe(),
                token.position,
                "LIMIT expects a non-negative integer",
            )),
        }
    }

    /// Node-only and edge-only fields may not be mixed. `id` alone is
    /// node-scoped.
    fn resolve_scope(&self) -> HopscopeResult<QueryScope> {
        let mut scope: Option<QueryScope> = None;
        for (field, token) in &self.fields {
            match (scope, field.scope()) {
                (_, None) => {}
                (None, Some(s)) => scope = Some(s),
                (Some(current), Some(s)) if current != s => {
                    return Err(syntax(
                        &token.text,
                        token.position,
                        "cannot mix node fields and edge fields in one query",
                    ));
                }
                _ => {}
            }
        }
        Ok(scope.unwrap_or(QueryScope::Node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hopscope_core::errors::NeighborhoodError;

    fn syntax_error(input: &str) -> (String, usize) {
        match parse(input).unwrap_err() {
            NeighborhoodError::QuerySyntax {
                token, position, ..
            } => (token, position),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parses_full_query() {
        let q = parse("WHERE confidence > 0.8 ORDER BY confidence DESC LIMIT 2").unwrap();
        assert_eq!(q.scope, QueryScope::Edge);
        assert_eq!(q.limit, Some(2));
        assert_eq!(
            q.order_by,
            Some(SortClause {
                field: Field::Confidence,
                order: SortOrder::Desc
            })
        );
        assert_eq!(
            q.predicate,
            Expr::Comparison {
                field: Field::Confidence,
                op: CompareOp::Gt,
                value: Literal::Number(0.8)
            }
        );
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let q =
            parse("where depth < 2 and module contains 'auth' order by id asc limit 5").unwrap();
        assert_eq!(q.scope, QueryScope::Node);
        assert!(matches!(q.predicate, Expr::And(_, _)));
        assert_eq!(q.predicate.fields().len(), 2);
    }

    #[test]
    fn conjunction_is_left_associative() {
        let q = parse("WHERE depth > 0 AND depth < 3 AND exported = true").unwrap();
        match q.predicate {
            Expr::And(left, right) => {
                assert!(matches!(*left, Expr::And(_, _)));
                assert_eq!(
                    *right,
                    Expr::Comparison {
                        field: Field::Attribute("exported".into()),
                        op: CompareOp::Eq,
                        value: Literal::Bool(true)
                    }
                );
            }
            other => panic!("unexpected predicate: {other:?}"),
        }
    }

    #[test]
    fn attr_prefix_names_attributes() {
        let q = parse("WHERE attr.kind = 'fn'").unwrap();
        assert_eq!(q.scope, QueryScope::Node);
        assert_eq!(q.predicate.fields(), vec![&Field::Attribute("kind".into())]);
    }

    #[test]
    fn id_only_is_node_scoped() {
        assert_eq!(parse("WHERE id = 'a'").unwrap().scope, QueryScope::Node);
        assert_eq!(
            parse("WHERE id contains 'a' AND kind = 'calls'").unwrap().scope,
            QueryScope::Edge
        );
    }

    #[test]
    fn errors_name_token_and_position() {
        assert_eq!(syntax_error(""), ("<end of query>".to_string(), 0));
        assert_eq!(syntax_error("SELECT id"), ("SELECT".to_string(), 0));
        assert_eq!(syntax_error("WHERE depth ~ 2").0, "~");
        assert_eq!(syntax_error("WHERE depth = "), ("<end of query>".to_string(), 14));
        assert_eq!(
            syntax_error("WHERE depth = 1 ORDER confidence"),
            ("confidence".to_string(), 22)
        );
        assert_eq!(syntax_error("WHERE depth = 1 LIMIT -1"), ("-1".to_string(), 22));
        assert_eq!(syntax_error("WHERE depth = 1 LIMIT 1.5").0, "1.5");
        assert_eq!(syntax_error("WHERE depth = 1 garbage"), ("garbage".to_string(), 16));
        assert_eq!(syntax_error("WHERE limit = 1"), ("limit".to_string(), 6));
        assert_eq!(syntax_error("WHERE depth = kind").0, "kind");
    }

    #[test]
    fn mixed_scopes_are_rejected() {
        assert_eq!(
            syntax_error("WHERE depth < 2 AND confidence > 0.5"),
            ("confidence".to_string(), 20)
        );
        assert_eq!(
            syntax_error("WHERE confidence > 0.5 ORDER BY depth"),
            ("depth".to_string(), 32)
        );
    }
}
