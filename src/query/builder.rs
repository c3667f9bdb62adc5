use super::error::QueryError;
use super::order::{self, OrderInfo};
use super::types::PageRequest;

/// SQL Server `SELECT` assembled from explicit columns.
///
/// There is no way to select `*`; the gateway would reject it anyway.
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    table: String,
    alias: Option<String>,
    columns: Vec<String>,
    joins: Vec<String>,
    conditions: Vec<String>,
    order: Vec<OrderInfo>,
    page: Option<PageRequest>,
}

impl SelectBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            alias: None,
            columns: vec![],
            joins: vec![],
            conditions: vec![],
            order: vec![],
            page: None,
        }
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// `FROM TABLE ALIAS`; columns and joins must then use the alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn join(mut self, clause: impl Into<String>) -> Self {
        self.joins.push(clause.into());
        self
    }

    /// Add a raw condition; callers build it from escaped or typed values.
    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    pub fn where_eq_text(self, column: &str, value: &str) -> Self {
        self.condition(format!("{} = {}", column, quote_literal(value)))
    }

    pub fn where_eq_int(self, column: &str, value: i64) -> Self {
        self.condition(format!("{} = {}", column, value))
    }

    pub fn where_contains(self, column: &str, value: &str) -> Self {
        self.condition(format!("{} LIKE {}", column, quote_literal(&format!("%{}%", escape_like(value)))))
    }

    pub fn order_by(mut self, order: Vec<OrderInfo>) -> Self {
        self.order = order;
        self
    }

    pub fn paginate(mut self, page: PageRequest) -> Self {
        self.page = Some(page);
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn to_sql(&self) -> Result<String, QueryError> {
        if self.columns.is_empty() {
            return Err(QueryError::NoColumns(self.table.clone()));
        }

        let mut sql = format!("SELECT {} FROM {}", self.columns.join(", "), self.from_clause());
        self.push_joins_and_where(&mut sql);

        let order_clause = order::generate(&self.order);
        if !order_clause.is_empty() {
            sql.push(' ');
            sql.push_str(&order_clause);
        }

        if let Some(page) = self.page {
            // OFFSET/FETCH needs an ORDER BY
            if order_clause.is_empty() {
                sql.push_str(" ORDER BY 1");
            }
            sql.push_str(&format!(
                " OFFSET {} ROWS FETCH NEXT {} ROWS ONLY",
                page.offset(),
                page.per_page
            ));
        }

        Ok(sql)
    }

    /// `SELECT COUNT(*) AS TOTAL` over the same joins and conditions.
    pub fn to_count_sql(&self) -> String {
        let mut sql = format!("SELECT COUNT(*) AS TOTAL FROM {}", self.from_clause());
        self.push_joins_and_where(&mut sql);
        sql
    }

    fn from_clause(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} {}", self.table, alias),
            None => self.table.clone(),
        }
    }

    fn push_joins_and_where(&self, sql: &mut String) {
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }
    }
}

/// Quote a string literal, doubling embedded single quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Escape LIKE wildcards so user input matches literally.
pub fn escape_like(value: &str) -> String {
    value.replace('[', "[[]").replace('%', "[%]").replace('_', "[_]")
}
