use serde::Deserialize;

pub const SEARCH_PAGE_SIZE: usize = 50;
pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_SNIPPET_CHARS: usize = 10;

pub const NO_EXTRACTED_INFO: &str = "No extracted info";
pub const TERM_NOT_FOUND_IN_CONTENT: &str = "Search term not found in content";
pub const TERM_NOT_FOUND_IN_ATTACHMENT: &str = "Search term not found in attachment";
pub const CONTENT_NOT_FETCHED: &str = "Content not fetched";

/// A page matched by the remote search, rebuilt from every search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef {
    pub id: String,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub title: String,
    pub file_extension: String,
    pub download_path: String,
}

impl Attachment {
    pub fn new(title: impl Into<String>, download_path: impl Into<String>) -> Self {
        let title = title.into();
        let file_extension = file_extension(&title);
        Self {
            title,
            file_extension,
            download_path: download_path.into(),
        }
    }
}

/// Lowercased extension without the dot, or empty when the name has none.
/// Leading dots are part of the stem, so `.bashrc` has no extension.
pub fn file_extension(name: &str) -> String {
    let stem_start = name.len() - name.trim_start_matches('.').len();
    match name[stem_start..].rfind('.') {
        Some(index) => name[stem_start + index + 1..].to_lowercase(),
        None => String::new(),
    }
}

/// Raw search record as returned by the remote API. Any field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchHit {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "_links", default)]
    pub links: Option<RawLinks>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLinks {
    #[serde(default)]
    pub webui: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub url: String,
    pub title: String,
}

impl From<&PageRef> for PageInfo {
    fn from(page: &PageRef) -> Self {
        Self {
            url: page.url.clone(),
            title: page.title.clone(),
        }
    }
}

/// One record per processed unit of work. The variant encodes which
/// features were active when it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResult {
    Page {
        page: PageInfo,
    },
    PageSnippet {
        page: PageInfo,
        search_term: String,
        snippet: String,
    },
    PageAttachment {
        page: PageInfo,
        attachment_title: String,
    },
    AttachmentSnippet {
        page: PageInfo,
        search_term: String,
        snippet: String,
        attachment_title: String,
    },
}

impl ExtractionResult {
    pub fn page(&self) -> &PageInfo {
        match self {
            Self::Page { page }
            | Self::PageSnippet { page, .. }
            | Self::PageAttachment { page, .. }
            | Self::AttachmentSnippet { page, .. } => page,
        }
    }

    pub fn attachment_title(&self) -> Option<&str> {
        match self {
            Self::PageAttachment {
                attachment_title, ..
            }
            | Self::AttachmentSnippet {
                attachment_title, ..
            } => Some(attachment_title.as_str()),
            _ => None,
        }
    }

    /// Search term and snippet, for the shapes that carry them.
    pub fn snippet(&self) -> Option<(&str, &str)> {
        match self {
            Self::PageSnippet {
                search_term,
                snippet,
                ..
            }
            | Self::AttachmentSnippet {
                search_term,
                snippet,
                ..
            } => Some((search_term.as_str(), snippet.as_str())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub access_token: Option<String>,
    pub verify_tls: bool,
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub workers: usize,
    pub limit: Option<usize>,
    pub search_content: bool,
    pub search_binaries: bool,
    pub search_images: bool,
    pub snippet_chars: usize,
    pub max_images: Option<usize>,
}

impl SearchOptions {
    pub fn searches_attachments(&self) -> bool {
        self.search_binaries || self.search_images
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            limit: None,
            search_content: false,
            search_binaries: false,
            search_images: false,
            snippet_chars: DEFAULT_SNIPPET_CHARS,
            max_images: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased_and_dotless() {
        assert_eq!(file_extension("Report.PDF"), "pdf");
        assert_eq!(file_extension("archive.tar.GZ"), "gz");
        assert_eq!(file_extension("README"), "");
        assert_eq!(file_extension(".hidden"), "");
        assert_eq!(file_extension("scan.jpeg"), "jpeg");
    }

    #[test]
    fn accessors_follow_record_shape() {
        let page = PageInfo {
            url: "https://wiki/x".to_string(),
            title: "X".to_string(),
        };
        let plain = ExtractionResult::Page { page: page.clone() };
        assert_eq!(plain.attachment_title(), None);
        assert_eq!(plain.snippet(), None);

        let full = ExtractionResult::AttachmentSnippet {
            page,
            search_term: "alpha".to_string(),
            snippet: "beta".to_string(),
            attachment_title: "a.pdf".to_string(),
        };
        assert_eq!(full.page().title, "X");
        assert_eq!(full.attachment_title(), Some("a.pdf"));
        assert_eq!(full.snippet(), Some(("alpha", "beta")));
    }
}
