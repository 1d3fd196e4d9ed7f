pub mod dish_repository;
pub mod order_repository;

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    #[error("db error: {0}")]
    DbError(String),

    /// A write was refused because it would break a reference between records.
    #[error("conflict: {0}")]
    Conflict(String),
}
