use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Invalid sort column: {0}")]
    InvalidColumn(String),

    #[error("Invalid sort direction: {0}. Use ASC or DESC")]
    InvalidSortDirection(String),

    #[error("Invalid page: {0}. Must be a positive integer")]
    InvalidPage(String),

    #[error("Invalid perPage: {0}. Must be a positive integer")]
    InvalidPerPage(String),

    #[error("Invalid value for {param}: '{value}' (expected {expected})")]
    InvalidFilter {
        param: String,
        value: String,
        expected: &'static str,
    },

    #[error("Query for {0} has no columns")]
    NoColumns(String),
}
