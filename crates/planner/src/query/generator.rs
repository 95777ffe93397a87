//! Builds the three statements a tokenization run needs.

use crate::{
    error::QueryError,
    query::{
        dialect::Dialect,
        ident::{validate_identifier, validate_table_name},
        renderer::{Renderer, Statement},
    },
};
use model::execution::target::MigrationTarget;
use std::sync::Arc;

#[derive(Clone)]
pub struct QueryGenerator {
    dialect: Arc<dyn Dialect>,
}

impl QueryGenerator {
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// `SELECT COUNT(*) FROM <table>`
    pub fn count(&self, table: &str) -> Result<Statement, QueryError> {
        validate_table_name(table)?;

        let mut r = Renderer::new(self.dialect.as_ref());
        r.push("SELECT COUNT(*) FROM ");
        r.push_ident(table);
        Ok(r.finish())
    }

    /// One window of `(id, target)` rows ordered by id, skipping `offset` rows.
    pub fn select_page(
        &self,
        target: &MigrationTarget,
        offset: u64,
        limit: usize,
    ) -> Result<Statement, QueryError> {
        self.validate_target(target)?;

        let mut r = Renderer::new(self.dialect.as_ref());
        r.push("SELECT ");
        r.push_ident(target.id_column());
        r.push(", ");
        r.push_ident(target.target_column());
        r.push(" FROM ");
        r.push_ident(target.table());
        r.push(" ORDER BY ");
        r.push_ident(target.id_column());
        r.push(" ASC ");
        r.push_pagination(offset, limit);
        Ok(r.finish())
    }

    /// `UPDATE <table> SET <target> = ? WHERE <id> = ?`, the token bound first
    /// and the id second.
    pub fn update_target(&self, target: &MigrationTarget) -> Result<Statement, QueryError> {
        self.validate_target(target)?;

        let mut r = Renderer::new(self.dialect.as_ref());
        r.push("UPDATE ");
        r.push_ident(target.table());
        r.push(" SET ");
        r.push_ident(target.target_column());
        r.push(" = ");
        r.push_placeholder();
        r.push(" WHERE ");
        r.push_ident(target.id_column());
        r.push(" = ");
        r.push_placeholder();
        Ok(r.finish())
    }

    fn validate_target(&self, target: &MigrationTarget) -> Result<(), QueryError> {
        validate_table_name(target.table())?;
        validate_identifier(target.id_column())?;
        validate_identifier(target.target_column())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::dialect::{MySql, Postgres, SqlServer};

    fn target(table: &str) -> MigrationTarget {
        MigrationTarget::new(table, "id", "cc_number", 50).unwrap()
    }

    #[test]
    fn test_postgres_statements() {
        let qg = QueryGenerator::new(Arc::new(Postgres));
        let t = target("payments");

        assert_eq!(
            qg.count("payments").unwrap().sql,
            r#"SELECT COUNT(*) FROM "payments""#
        );

        let page = qg.select_page(&t, 100, 50).unwrap();
        assert_eq!(
            page.sql,
            r#"SELECT "id", "cc_number" FROM "payments" ORDER BY "id" ASC LIMIT $1 OFFSET $2"#
        );
        assert_eq!(page.params, vec![50, 100]);

        let update = qg.update_target(&t).unwrap();
        assert_eq!(
            update.sql,
            r#"UPDATE "payments" SET "cc_number" = $1 WHERE "id" = $2"#
        );
        assert!(update.params.is_empty());
    }

    #[test]
    fn test_postgres_mixed_case_names_are_folded() {
        let qg = QueryGenerator::new(Arc::new(Postgres));
        let t = MigrationTarget::new("Billing.Card_Accounts", "Id", "CC_Number", 50).unwrap();

        assert_eq!(
            qg.count(t.table()).unwrap().sql,
            r#"SELECT COUNT(*) FROM "billing"."card_accounts""#
        );
        assert_eq!(
            qg.select_page(&t, 0, 50).unwrap().sql,
            r#"SELECT "id", "cc_number" FROM "billing"."card_accounts" ORDER BY "id" ASC LIMIT $1 OFFSET $2"#
        );
        assert_eq!(
            qg.update_target(&t).unwrap().sql,
            r#"UPDATE "billing"."card_accounts" SET "cc_number" = $1 WHERE "id" = $2"#
        );
    }

    #[test]
    fn test_mysql_statements() {
        let qg = QueryGenerator::new(Arc::new(MySql));
        let t = target("payments");

        let page = qg.select_page(&t, 0, 10).unwrap();
        assert_eq!(
            page.sql,
            "SELECT `id`, `cc_number` FROM `payments` ORDER BY `id` ASC LIMIT ? OFFSET ?"
        );
        assert_eq!(page.params, vec![10, 0]);
        assert_eq!(
            qg.update_target(&t).unwrap().sql,
            "UPDATE `payments` SET `cc_number` = ? WHERE `id` = ?"
        );
    }

    #[test]
    fn test_sqlserver_statements_with_schema() {
        let qg = QueryGenerator::new(Arc::new(SqlServer));
        let t = target("dbo.payments");

        let page = qg.select_page(&t, 50, 50).unwrap();
        assert_eq!(
            page.sql,
            "SELECT [id], [cc_number] FROM [dbo].[payments] ORDER BY [id] ASC OFFSET 50 ROWS FETCH NEXT 50 ROWS ONLY"
        );
        assert!(page.params.is_empty());
        assert_eq!(
            qg.update_target(&t).unwrap().sql,
            "UPDATE [dbo].[payments] SET [cc_number] = @p1 WHERE [id] = @p2"
        );
    }

    #[test]
    fn test_rejects_unsafe_table_name() {
        let qg = QueryGenerator::new(Arc::new(Postgres));
        assert!(qg.count("payments; DELETE FROM users").is_err());
    }
}
