use crate::models::{Attachment, RawSearchHit};
use crate::SearchError;

/// The remote operations a search worker depends on.
///
/// Every call is blocking; implementations must be shareable across the
/// worker threads.
pub trait ContentApi: Send + Sync {
    /// Base URL that relative `webui` links are joined onto.
    fn base_url(&self) -> &str;

    fn count_results(&self, query: &str) -> Result<u64, SearchError>;

    fn search_page(
        &self,
        query: &str,
        start: usize,
        limit: usize,
    ) -> Result<Vec<RawSearchHit>, SearchError>;

    fn fetch_body(&self, page_id: &str) -> Result<String, SearchError>;

    fn list_attachments(&self, page_id: &str) -> Result<Vec<Attachment>, SearchError>;

    fn download(&self, attachment: &Attachment) -> Result<Vec<u8>, SearchError>;
}
