use crate::budget::ImageBudget;
use crate::extractor::{AttachmentKind, ExtractorRegistry};
use crate::markup::strip_tags;
use crate::models::{
    Attachment, ExtractionResult, PageInfo, PageRef, RawSearchHit, SearchOptions,
    CONTENT_NOT_FETCHED, SEARCH_PAGE_SIZE, TERM_NOT_FOUND_IN_ATTACHMENT,
    TERM_NOT_FOUND_IN_CONTENT,
};
use crate::query::{decode_term, text_match_query};
use crate::queue::WorkQueue;
use crate::sink::ResultSink;
use crate::snippet::extract_snippet;
use crate::traits::ContentApi;
use crate::SearchError;
use tracing::{debug, error, info, warn};

/// One member of the worker pool. Holds only shared handles, so any
/// number of workers can be built over the same api, sink and budget.
pub struct SearchWorker<'a, A: ContentApi + ?Sized> {
    api: &'a A,
    extractors: &'a ExtractorRegistry,
    sink: &'a ResultSink,
    budget: &'a ImageBudget,
    options: &'a SearchOptions,
}

impl<'a, A: ContentApi + ?Sized> SearchWorker<'a, A> {
    pub fn new(
        api: &'a A,
        extractors: &'a ExtractorRegistry,
        sink: &'a ResultSink,
        budget: &'a ImageBudget,
        options: &'a SearchOptions,
    ) -> Self {
        Self {
            api,
            extractors,
            sink,
            budget,
            options,
        }
    }

    /// Processes terms until the queue is empty. Returns how many terms
    /// this worker handled.
    pub fn run(&self, queue: &WorkQueue) -> usize {
        let mut terms = 0;
        while let Some(claim) = queue.pop() {
            self.process_term(claim.term());
            terms += 1;
        }
        terms
    }

    /// Runs the full search for one raw term and returns the number of
    /// search hits that were processed.
    pub fn process_term(&self, raw_term: &str) -> usize {
        let term = decode_term(raw_term);
        if term.trim().is_empty() {
            warn!(raw_term, "skipping empty search term");
            return 0;
        }

        let query = text_match_query(&term);
        // A failed count is indistinguishable from zero matches.
        let total = self.api.count_results(&query).unwrap_or_else(|error| {
            error!(term = %term, %error, "counting search results failed");
            0
        });

        if total == 0 {
            info!(term = %term, "no documents found");
            return 0;
        }
        info!(term = %term, total, "results for search term");

        let total = usize::try_from(total).unwrap_or(usize::MAX);
        let effective_limit = self.options.limit.map_or(total, |limit| total.min(limit));

        let mut start = 0;
        let mut processed = 0;
        while start < effective_limit {
            info!(term = %term, start, effective_limit, "processing results");

            let hits = match self.api.search_page(&query, start, SEARCH_PAGE_SIZE) {
                Ok(hits) => hits,
                Err(error) => {
                    error!(term = %term, start, %error, "fetching search results failed");
                    break;
                }
            };

            if hits.is_empty() {
                warn!(term = %term, start, "search returned an empty page before the limit");
                break;
            }

            let returned = hits.len();
            for hit in hits.iter().take(effective_limit - start) {
                match self.page_ref(hit) {
                    Ok(page) => {
                        self.process_page(&term, &page);
                        processed += 1;
                    }
                    Err(error) => warn!(term = %term, %error, "skipping search result"),
                }
            }

            start += returned;
        }

        processed
    }

    fn page_ref(&self, hit: &RawSearchHit) -> Result<PageRef, SearchError> {
        let id = hit.id.clone().ok_or(SearchError::MissingField("id"))?;
        let webui = hit
            .links
            .as_ref()
            .and_then(|links| links.webui.as_deref())
            .ok_or(SearchError::MissingField("_links.webui"))?;
        let title = hit.title.clone().ok_or(SearchError::MissingField("title"))?;

        Ok(PageRef {
            id,
            title,
            url: format!("{}{webui}", self.api.base_url()),
        })
    }

    fn process_page(&self, term: &str, page: &PageRef) {
        let info = PageInfo::from(page);

        if self.options.search_content {
            let snippet = match self.api.fetch_body(&page.id) {
                Ok(body) if body.trim().is_empty() => {
                    warn!(page = %page.title, "page body is empty");
                    CONTENT_NOT_FETCHED.to_string()
                }
                Ok(body) => extract_snippet(
                    &strip_tags(&body),
                    term,
                    self.options.snippet_chars,
                    TERM_NOT_FOUND_IN_CONTENT,
                ),
                Err(error) => {
                    warn!(page = %page.title, %error, "could not fetch page content");
                    CONTENT_NOT_FETCHED.to_string()
                }
            };
            self.sink.append(ExtractionResult::PageSnippet {
                page: info.clone(),
                search_term: term.to_string(),
                snippet,
            });
        } else {
            self.sink.append(ExtractionResult::Page { page: info.clone() });
        }

        if self.options.searches_attachments() {
            match self.api.list_attachments(&page.id) {
                Ok(attachments) => {
                    for attachment in &attachments {
                        self.process_attachment(term, &info, attachment);
                    }
                }
                Err(error) => warn!(page = %page.title, %error, "listing attachments failed"),
            }
        }
    }

    fn process_attachment(&self, term: &str, page: &PageInfo, attachment: &Attachment) {
        let Some(kind) = AttachmentKind::classify(&attachment.file_extension) else {
            debug!(attachment = %attachment.title, "unsupported attachment type");
            return;
        };

        let wanted = match kind {
            AttachmentKind::Document => self.options.search_binaries,
            AttachmentKind::Image => self.options.search_images,
        };
        if !wanted {
            return;
        }

        if self.options.search_content && !self.extractors.supports(&attachment.file_extension) {
            debug!(attachment = %attachment.title, "no extractor registered, skipping download");
            return;
        }

        if kind == AttachmentKind::Image && !self.budget.try_acquire() {
            debug!(attachment = %attachment.title, "image budget exhausted");
            return;
        }

        let content = match self.api.download(attachment) {
            Ok(bytes) if !bytes.is_empty() => bytes,
            Ok(_) => {
                warn!(attachment = %attachment.title, "attachment content is empty");
                return;
            }
            Err(error) => {
                warn!(attachment = %attachment.title, %error, "downloading attachment failed");
                return;
            }
        };

        if !self.options.search_content {
            self.sink.append(ExtractionResult::PageAttachment {
                page: page.clone(),
                attachment_title: attachment.title.clone(),
            });
            return;
        }

        let text = self
            .extractors
            .extract(&attachment.file_extension, &content);
        if text.is_empty() {
            warn!(attachment = %attachment.title, "could not extract text from attachment");
            return;
        }

        self.sink.append(ExtractionResult::AttachmentSnippet {
            page: page.clone(),
            search_term: term.to_string(),
            snippet: extract_snippet(
                &text,
                term,
                self.options.snippet_chars,
                TERM_NOT_FOUND_IN_ATTACHMENT,
            ),
            attachment_title: attachment.title.clone(),
        });
    }
}
