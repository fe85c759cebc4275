pub mod budget;
pub mod client;
pub mod error;
pub mod extractor;
pub mod ingest;
pub mod markup;
pub mod models;
pub mod ocr;
pub mod office;
pub mod orchestrator;
pub mod query;
pub mod queue;
pub mod report;
pub mod sink;
pub mod snippet;
pub mod traits;
pub mod worker;

pub use budget::ImageBudget;
pub use client::ConfluenceClient;
pub use error::{ExtractError, SearchError};
pub use extractor::{AttachmentKind, ExtractorRegistry, PdfExtractor, PlainTextExtractor, TextExtractor};
pub use ingest::{terms_from_lines, TermSource};
pub use markup::strip_tags;
pub use models::{
    Attachment, ClientConfig, ExtractionResult, PageInfo, PageRef, SearchOptions,
    DEFAULT_SNIPPET_CHARS, DEFAULT_WORKERS,
};
pub use ocr::{EndpointOcr, OcrConfig, OcrEndpointConfig, TesseractOcr};
pub use office::{DocxExtractor, XlsxExtractor};
pub use orchestrator::SearchCoordinator;
pub use query::{decode_term, escape_cql_term, text_match_query};
pub use queue::WorkQueue;
pub use report::{output_file_name, render_records, write_report, DEFAULT_OUTPUT_DIR};
pub use sink::ResultSink;
pub use snippet::extract_snippet;
pub use traits::ContentApi;
pub use worker::SearchWorker;
