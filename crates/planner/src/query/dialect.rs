//! Defines the `Dialect` trait for database-specific SQL syntax.

pub trait Dialect: Send + Sync {
    /// Wraps an identifier (like a table or column name) in the correct
    /// quotation marks for the dialect.
    ///
    /// - PostgreSQL uses double quotes around the lowercased name, matching
    ///   how it folds unquoted names: `"my_column"`
    /// - MySQL uses backticks: `` `my_column` ``
    /// - SQL Server uses brackets: `[my_column]`
    fn quote_identifier(&self, ident: &str) -> String;

    /// Returns the placeholder for a parameterized query.
    ///
    /// - PostgreSQL uses `$1`, `$2`, etc.
    /// - MySQL uses `?`
    /// - SQL Server uses `@p1`, `@p2`, etc.
    fn get_placeholder(&self, index: usize) -> String;

    /// Renders the clause that skips `offset` rows and takes at most `limit`.
    ///
    /// Returns the clause and the values it expects to be bound, in order.
    /// `first_param` is the zero-based index of the first placeholder the
    /// clause may use.
    fn render_pagination(
        &self,
        offset: u64,
        limit: usize,
        first_param: usize,
    ) -> (String, Vec<i64>);

    /// Returns the name of the dialect (e.g., "PostgreSQL", "MySQL").
    fn name(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct Postgres;

impl Dialect for Postgres {
    fn quote_identifier(&self, ident: &str) -> String {
        format!(r#""{}""#, ident.to_lowercase())
    }

    fn get_placeholder(&self, index: usize) -> String {
        format!("${}", index + 1)
    }

    fn render_pagination(
        &self,
        offset: u64,
        limit: usize,
        first_param: usize,
    ) -> (String, Vec<i64>) {
        let clause = format!(
            "LIMIT {} OFFSET {}",
            self.get_placeholder(first_param),
            self.get_placeholder(first_param + 1)
        );
        (clause, vec![limit as i64, offset as i64])
    }

    fn name(&self) -> String {
        "PostgreSQL".into()
    }
}

#[derive(Debug, Clone)]
pub struct MySql;

impl Dialect for MySql {
    fn quote_identifier(&self, ident: &str) -> String {
        format!(r#"`{ident}`"#)
    }

    fn get_placeholder(&self, _index: usize) -> String {
        "?".into()
    }

    fn render_pagination(
        &self,
        offset: u64,
        limit: usize,
        _first_param: usize,
    ) -> (String, Vec<i64>) {
        ("LIMIT ? OFFSET ?".into(), vec![limit as i64, offset as i64])
    }

    fn name(&self) -> String {
        "MySQL".into()
    }
}

#[derive(Debug, Clone)]
pub struct SqlServer;

impl Dialect for SqlServer {
    fn quote_identifier(&self, ident: &str) -> String {
        format!("[{ident}]")
    }

    fn get_placeholder(&self, index: usize) -> String {
        format!("@p{}", index + 1)
    }

    // OFFSET/FETCH values are inlined; both are integers we produced ourselves.
    fn render_pagination(
        &self,
        offset: u64,
        limit: usize,
        _first_param: usize,
    ) -> (String, Vec<i64>) {
        (
            format!("OFFSET {offset} ROWS FETCH NEXT {limit} ROWS ONLY"),
            Vec::new(),
        )
    }

    fn name(&self) -> String {
        "SQL Server".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        assert_eq!(Postgres.get_placeholder(0), "$1");
        assert_eq!(Postgres.get_placeholder(1), "$2");
        assert_eq!(MySql.get_placeholder(5), "?");
        assert_eq!(SqlServer.get_placeholder(0), "@p1");
        assert_eq!(SqlServer.get_placeholder(1), "@p2");
    }

    #[test]
    fn test_quoting() {
        assert_eq!(Postgres.quote_identifier("id"), r#""id""#);
        assert_eq!(MySql.quote_identifier("id"), "`id`");
        assert_eq!(SqlServer.quote_identifier("id"), "[id]");
    }

    #[test]
    fn test_postgres_folds_case_like_unquoted_names() {
        assert_eq!(
            Postgres.quote_identifier("Billing_Accounts"),
            r#""billing_accounts""#
        );
        assert_eq!(
            MySql.quote_identifier("Billing_Accounts"),
            "`Billing_Accounts`"
        );
        assert_eq!(
            SqlServer.quote_identifier("Billing_Accounts"),
            "[Billing_Accounts]"
        );
    }

    #[test]
    fn test_limit_offset_pagination_is_bound() {
        let (clause, params) = Postgres.render_pagination(100, 50, 0);
        assert_eq!(clause, "LIMIT $1 OFFSET $2");
        assert_eq!(params, vec![50, 100]);

        let (clause, params) = MySql.render_pagination(100, 50, 0);
        assert_eq!(clause, "LIMIT ? OFFSET ?");
        assert_eq!(params, vec![50, 100]);
    }

    #[test]
    fn test_offset_fetch_pagination_is_inlined() {
        let (clause, params) = SqlServer.render_pagination(100, 50, 0);
        assert_eq!(clause, "OFFSET 100 ROWS FETCH NEXT 50 ROWS ONLY");
        assert!(params.is_empty());
    }
}
