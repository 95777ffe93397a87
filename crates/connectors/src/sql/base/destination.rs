use crate::sql::base::error::DbError;
use async_trait::async_trait;
use model::records::pair::TokenizedPair;

#[async_trait]
pub trait DbDataDestination: Send + Sync {
    /// Writes every token in one transaction and returns the number of
    /// statements executed. Nothing is committed unless every update succeeds,
    /// and the rollback has finished by the time an error is returned.
    async fn write_batch(&self, pairs: &[TokenizedPair]) -> Result<u64, DbError>;
}
