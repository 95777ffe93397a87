//! Accumulates SQL text and bound parameters while a statement is built.

use crate::query::dialect::Dialect;

/// A rendered statement ready to be handed to a driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<i64>,
}

/// A context that holds the state during the rendering process.
///
/// It accumulates the SQL string and the parameters, and provides
/// access to the dialect for syntax-specific details.
pub struct Renderer<'a> {
    pub sql: String,
    pub params: Vec<i64>,
    placeholders: usize,
    pub dialect: &'a dyn Dialect,
}

impl<'a> Renderer<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            placeholders: 0,
            dialect,
        }
    }

    /// Consumes the renderer and returns the final statement.
    pub fn finish(self) -> Statement {
        Statement {
            sql: self.sql,
            params: self.params,
        }
    }

    pub fn push(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Quotes each dot-separated part on its own (`"dbo"."payments"`).
    pub fn push_ident(&mut self, ident: &str) {
        let quoted = ident
            .split('.')
            .map(|part| self.dialect.quote_identifier(part))
            .collect::<Vec<_>>()
            .join(".");
        self.sql.push_str(&quoted);
    }

    /// Emits a placeholder whose value is bound later by the caller.
    pub fn push_placeholder(&mut self) {
        let placeholder = self.dialect.get_placeholder(self.placeholders);
        self.placeholders += 1;
        self.sql.push_str(&placeholder);
    }

    pub fn push_pagination(&mut self, offset: u64, limit: usize) {
        let (clause, params) = self
            .dialect
            .render_pagination(offset, limit, self.placeholders);
        self.placeholders += params.len();
        self.params.extend(params);
        self.sql.push_str(&clause);
    }
}
