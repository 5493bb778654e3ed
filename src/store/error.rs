use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures surfaced by a school store
#[derive(Debug, Error)]
pub enum StoreError {
    /// No row matches the id, or the id is not positive
    #[error("record not found")]
    NotFound,

    /// The (id, version) pair no longer matches a row: either another writer
    /// bumped the version first or the row was deleted.
    #[error("edit conflict")]
    EditConflict,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
