use thiserror::Error;

/// Failure kinds surfaced by the query layer. Callers assembling display
/// records treat `NoRows` as "no data" and degrade the affected field;
/// `QueryFailed` and `PoolExhausted` are logged the same way.
#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error("no rows matched the query")]
    NoRows,

    #[error("query execution failed: {0}")]
    QueryFailed(#[from] bb8_postgres::tokio_postgres::Error),

    #[error("failed to retrieve a valid connection from postgres pool")]
    PoolExhausted,
}
