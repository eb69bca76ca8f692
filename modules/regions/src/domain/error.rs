use thiserror::Error;

/// Errors surfaced by the regions domain.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),

    #[error("table query error: {0}")]
    Query(#[from] grid_query::GridError),
}
