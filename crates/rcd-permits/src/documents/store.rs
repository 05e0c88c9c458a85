use super::domain::StoredObject;
use super::service::DocumentError;

/// Object storage seam (S3 in production deployments).
pub trait ObjectStore: Send + Sync {
    fn put(&self, object: StoredObject) -> Result<(), DocumentError>;
    fn get(&self, key: &str) -> Result<Option<StoredObject>, DocumentError>;
}
