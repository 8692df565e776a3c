use crate::model::{FetchError, FetchRequest, Page};

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, req: &FetchRequest) -> Result<Page, FetchError>;
}
