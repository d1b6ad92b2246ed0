use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub temperature: f32,
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Returns the text of the first choice, or `None` when the provider sent none.
    async fn complete(
        &self,
        api_key: &SecretString,
        request: &CompletionRequest,
    ) -> AppResult<Option<String>>;
}
