use crate::model::{NewSchool, School, SchoolId};
use crate::store::StoreResult;

/// Storage gateway for schools.
///
/// Every call may block on a database round-trip. Implementations own the
/// optimistic-locking contract: `update_school` only writes when the stored
/// version still equals `school.version`, and bumps it by one atomically.
#[async_trait::async_trait]
pub trait SchoolStore: Send + Sync {
    /// Persist a new school; storage assigns id, created_at and version 1
    async fn insert_school(&self, school: NewSchool) -> StoreResult<School>;
    async fn get_school(&self, id: SchoolId) -> StoreResult<School>;
    /// Replace the business fields of `school` if its version is current.
    /// Returns the school carrying the new version.
    async fn update_school(&self, school: &School) -> StoreResult<School>;
    async fn delete_school(&self, id: SchoolId) -> StoreResult<()>;
}

