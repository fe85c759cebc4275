use crate::models::{Attachment, ClientConfig, RawSearchHit};
use crate::traits::ContentApi;
use crate::SearchError;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

const SEARCH_PATH: &str = "/rest/api/content/search";
const CLIENT_AGENT: &str = concat!("confluence-scraper/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "totalSize", default)]
    total_size: u64,
    #[serde(default)]
    results: Vec<RawSearchHit>,
}

/// Blocking Confluence REST client shared by all workers.
pub struct ConfluenceClient {
    client: Client,
    base_url: String,
    access_token: Option<String>,
}

impl ConfluenceClient {
    pub fn new(config: &ClientConfig) -> Result<Self, SearchError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SearchError::InvalidArgument(format!(
                "unsupported url scheme: {}",
                parsed.scheme()
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_AGENT));

        let client = Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        let access_token = config
            .access_token
            .as_ref()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        Ok(Self {
            client,
            base_url,
            access_token,
        })
    }

    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Response, SearchError> {
        let mut request = self.client.get(url).query(query);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        let status = response.status();
        debug!(url, status = status.as_u16(), "confluence response");
        if !status.is_success() {
            return Err(SearchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, SearchError> {
        let body = self.get(url, query)?.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl ContentApi for ConfluenceClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn count_results(&self, query: &str) -> Result<u64, SearchError> {
        let url = format!("{}{SEARCH_PATH}", self.base_url);
        let response: SearchResponse = self.get_json(&url, &[("cql", query.to_string())])?;
        Ok(response.total_size)
    }

    fn search_page(
        &self,
        query: &str,
        start: usize,
        limit: usize,
    ) -> Result<Vec<RawSearchHit>, SearchError> {
        let url = format!("{}{SEARCH_PATH}", self.base_url);
        let response: SearchResponse = self.get_json(
            &url,
            &[
                ("cql", query.to_string()),
                ("start", start.to_string()),
                ("limit", limit.to_string()),
            ],
        )?;
        Ok(response.results)
    }

    fn fetch_body(&self, page_id: &str) -> Result<String, SearchError> {
        let url = format!("{}/rest/api/content/{page_id}", self.base_url);
        let response: Value = self.get_json(&url, &[("expand", "body.storage".to_string())])?;
        storage_body(&response)
    }

    fn list_attachments(&self, page_id: &str) -> Result<Vec<Attachment>, SearchError> {
        let url = format!("{}/rest/api/content/{page_id}/child/attachment", self.base_url);
        let response: Value = self.get_json(&url, &[])?;
        Ok(parse_attachments(&response))
    }

    fn download(&self, attachment: &Attachment) -> Result<Vec<u8>, SearchError> {
        let url = format!("{}{}", self.base_url, attachment.download_path);
        let bytes = self.get(&url, &[])?.bytes()?;
        Ok(bytes.to_vec())
    }
}

fn storage_body(response: &Value) -> Result<String, SearchError> {
    response
        .pointer("/body/storage/value")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(SearchError::MissingField("body.storage.value"))
}

fn parse_attachments(response: &Value) -> Vec<Attachment> {
    let Some(results) = response.pointer("/results").and_then(Value::as_array) else {
        return Vec::new();
    };

    results
        .iter()
        .filter_map(|raw| {
            let title = raw
                .pointer("/title")
                .and_then(Value::as_str)
                .unwrap_or_default();
            match raw.pointer("/_links/download").and_then(Value::as_str) {
                Some(download) => Some(Attachment::new(title, download)),
                None => {
                    warn!(attachment = title, "attachment has no download link");
                    None
                }
            }
        })
        .collect()
}
