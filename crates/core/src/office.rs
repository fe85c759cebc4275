use crate::error::ExtractError;
use crate::extractor::TextExtractor;
use calamine::{Data, Reader as _, Xlsx};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use zip::ZipArchive;

const DOCX_BODY: &str = "word/document.xml";

/// Paragraph text of a Word document, one paragraph per line.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn extract_text(&self, content: &[u8]) -> Result<String, ExtractError> {
        let mut archive = ZipArchive::new(Cursor::new(content))?;
        let mut xml = String::new();
        archive.by_name(DOCX_BODY)?.read_to_string(&mut xml)?;
        docx_paragraphs(&xml)
    }

    fn name(&self) -> &str {
        "docx"
    }
}

fn docx_paragraphs(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"t" => in_text = true,
                b"p" => current.clear(),
                _ => {}
            },
            Event::End(ref e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Empty(ref e) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(String::new()),
                b"tab" => current.push('\t'),
                b"br" | b"cr" => current.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text => current.push_str(&e.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs.join("\n"))
}

/// Every cell of every sheet, space-joined per row, one row per line.
#[derive(Debug, Default, Clone, Copy)]
pub struct XlsxExtractor;

impl TextExtractor for XlsxExtractor {
    fn extract_text(&self, content: &[u8]) -> Result<String, ExtractError> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(content))
            .map_err(|error| ExtractError::Spreadsheet(error.to_string()))?;

        let mut text = String::new();
        for (_sheet, range) in workbook.worksheets() {
            for row in range.rows() {
                let line = row.iter().map(cell_text).collect::<Vec<_>>().join(" ");
                text.push_str(&line);
                text.push('\n');
            }
        }

        Ok(text)
    }

    fn name(&self) -> &str {
        "xlsx"
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.clone(),
        Data::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
            format!("{}", *value as i64)
        }
        other => other.to_string(),
    }
}
