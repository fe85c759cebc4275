use chrono::Utc;
use clap::builder::TypedValueParser;
use clap::{ArgGroup, Parser};
use confluence_scraper_core::{
    output_file_name, write_report, ClientConfig, ConfluenceClient, ExtractorRegistry,
    OcrConfig, OcrEndpointConfig, SearchCoordinator, SearchOptions, TermSource,
    DEFAULT_OUTPUT_DIR, DEFAULT_SNIPPET_CHARS, DEFAULT_WORKERS,
};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Searches Confluence pages and attachments for keywords and saves
/// the text that follows each match.
#[derive(Parser)]
#[command(name = "confluence-scraper", version)]
#[command(group(ArgGroup::new("terms").required(true).args(["wordlist", "keyword"])))]
struct Cli {
    /// Target Confluence base URL, e.g. https://confluence.company.com
    #[arg(short = 'c', long = "url", env = "CONFLUENCE_URL")]
    url: String,

    /// API access token; anonymous access when omitted
    #[arg(short = 'p', long = "accesstoken", env = "CONFLUENCE_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// File with one search term per line
    #[arg(short = 'w', long)]
    wordlist: Option<PathBuf>,

    /// A single keyword to search for
    #[arg(short = 'k', long)]
    keyword: Option<String>,

    /// Extract the text following each match from pages and attachments
    #[arg(short = 's', long, default_value_t = false)]
    search_content: bool,

    /// Include PDF, DOCX, XLSX and TXT attachments
    #[arg(short = 'b', long, default_value_t = false)]
    search_binaries: bool,

    /// Include image attachments and run OCR on them
    #[arg(short = 'i', long, default_value_t = false)]
    search_images: bool,

    /// Number of worker threads
    #[arg(short = 't', long, default_value_t = DEFAULT_WORKERS, value_parser = clap::value_parser!(u16).range(1..).map(usize::from))]
    threads: usize,

    /// Maximum number of search results per keyword (default: no limit)
    #[arg(short = 'l', long)]
    limit: Option<usize>,

    /// Number of characters to extract after the search term
    #[arg(short = 'n', long, default_value_t = DEFAULT_SNIPPET_CHARS)]
    num_chars: usize,

    /// Maximum number of images to process (default: no limit)
    #[arg(short = 'm', long)]
    max_images: Option<usize>,

    /// Directory the results file is written to
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Validate TLS certificates (disabled by default)
    #[arg(long, default_value_t = false)]
    verify_tls: bool,

    /// Multimodal OCR endpoint used instead of the local tesseract binary
    #[arg(long, env = "OCR_ENDPOINT")]
    ocr_endpoint: Option<String>,

    /// API key for the OCR endpoint
    #[arg(long, env = "OCR_API_KEY", hide_env_values = true)]
    ocr_api_key: Option<String>,

    /// Path to the tesseract binary
    #[arg(long, default_value = "tesseract")]
    tesseract_bin: String,
}

impl Cli {
    fn term_source(&self) -> TermSource {
        match (&self.wordlist, &self.keyword) {
            (Some(path), _) => TermSource::Wordlist(path.clone()),
            (None, Some(keyword)) => TermSource::Keyword(keyword.clone()),
            (None, None) => TermSource::Keyword(String::new()),
        }
    }

    fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.url.clone(),
            access_token: self.access_token.clone(),
            verify_tls: self.verify_tls,
        }
    }

    fn search_options(&self) -> SearchOptions {
        SearchOptions {
            workers: self.threads,
            limit: self.limit,
            search_content: self.search_content,
            search_binaries: self.search_binaries,
            search_images: self.search_images,
            snippet_chars: self.num_chars,
            max_images: self.max_images,
        }
    }

    fn ocr_config(&self) -> OcrConfig {
        OcrConfig {
            tesseract_bin: self.tesseract_bin.clone(),
            endpoint: self
                .ocr_endpoint
                .as_deref()
                .map(str::trim)
                .filter(|endpoint| !endpoint.is_empty())
                .map(|endpoint| OcrEndpointConfig {
                    endpoint: endpoint.to_string(),
                    api_key: self
                        .ocr_api_key
                        .as_deref()
                        .map(str::trim)
                        .filter(|key| !key.is_empty())
                        .map(str::to_string),
                }),
        }
    }
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "Enabled"
    } else {
        "Disabled"
    }
}

fn log_configuration(cli: &Cli, source: &TermSource) {
    info!(url = %cli.url.trim_end_matches('/'), "target");
    if cli.access_token.is_some() {
        info!("Using provided access token for authentication.");
    } else {
        info!("No access token provided; attempting anonymous access.");
    }
    match source {
        TermSource::Wordlist(path) => info!(wordlist = %path.display(), "term source"),
        TermSource::Keyword(keyword) => info!(keyword = %keyword, "term source"),
    }
    info!(
        threads = cli.threads,
        limit = ?cli.limit,
        search_content = enabled(cli.search_content),
        search_binaries = enabled(cli.search_binaries),
        search_images = enabled(cli.search_images),
        num_chars = cli.num_chars,
        verify_tls = cli.verify_tls,
        "search configuration"
    );
    if cli.search_images {
        let ocr = match &cli.ocr_endpoint {
            Some(_) => "endpoint",
            None => "tesseract",
        };
        info!(max_images = ?cli.max_images, ocr, "image processing");
    }
}

fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "confluence-scraper boot"
    );

    let source = cli.term_source();
    log_configuration(&cli, &source);

    let terms = source
        .load()
        .map_err(|error| anyhow::anyhow!("cannot load search terms: {error}"))?;
    let client = ConfluenceClient::new(&cli.client_config())
        .map_err(|error| anyhow::anyhow!("invalid confluence configuration: {error}"))?;

    let options = cli.search_options();
    let extractors = ExtractorRegistry::with_defaults(&cli.ocr_config());
    let coordinator = SearchCoordinator::new(client, extractors, options);

    let records = coordinator.run(terms);

    let file_name = output_file_name(coordinator.options());
    match write_report(&cli.output_dir, file_name, &records) {
        Ok(path) => info!(path = %path.display(), finished_at = %Utc::now().to_rfc3339(), "done"),
        Err(error) => error!(dir = %cli.output_dir.display(), %error, "saving results failed"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_the_documented_behaviour() -> Result<(), clap::Error> {
        let cli = Cli::try_parse_from(["confluence-scraper", "-c", "https://wiki/", "-k", "alpha"])?;
        let options = cli.search_options();

        assert_eq!(options.workers, 10);
        assert_eq!(options.snippet_chars, 10);
        assert_eq!(options.limit, None);
        assert_eq!(options.max_images, None);
        assert!(!options.search_content);
        assert!(!cli.client_config().verify_tls);
        assert!(cli.ocr_config().endpoint.is_none());
        Ok(())
    }

    #[test]
    fn wordlist_and_keyword_are_mutually_exclusive() {
        let both = Cli::try_parse_from([
            "confluence-scraper",
            "-c",
            "https://wiki",
            "-k",
            "alpha",
            "-w",
            "words.txt",
        ]);
        assert!(both.is_err());

        let neither = Cli::try_parse_from(["confluence-scraper", "-c", "https://wiki"]);
        assert!(neither.is_err());
    }

    #[test]
    fn zero_threads_are_rejected() {
        let parsed = Cli::try_parse_from([
            "confluence-scraper",
            "-c",
            "https://wiki",
            "-k",
            "alpha",
            "-t",
            "0",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn thread_count_reaches_the_worker_pool() -> Result<(), clap::Error> {
        let cli = Cli::try_parse_from([
            "confluence-scraper",
            "-c",
            "https://wiki",
            "-k",
            "alpha",
            "-t",
            "3",
        ])?;
        assert_eq!(cli.search_options().workers, 3);

        let long = Cli::try_parse_from([
            "confluence-scraper",
            "-c",
            "https://wiki",
            "-k",
            "alpha",
            "--threads",
            "25",
        ])?;
        assert_eq!(long.search_options().workers, 25);
        Ok(())
    }
}
