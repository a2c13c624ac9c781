//! Per-extension text extraction registry

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use calamine::{Data, Reader, Xls, Xlsx, open_workbook_from_rs};

use worksim_core::{Error, Result, TextExtractor};

/// Dispatches uploads to a per-extension extractor.
///
/// Ships with txt (raw UTF-8), pdf (embedded text only; OCR belongs to an
/// external extractor implementation), and xlsx/xls (cell rows joined with
/// ` | `). Additional formats register through [`TextExtractor`].
pub struct ExtractorRegistry {
    by_extension: HashMap<String, Arc<dyn TextExtractor>>,
}

impl ExtractorRegistry {
    /// Registry with no extractors; register them explicitly
    pub fn empty() -> Self {
        Self {
            by_extension: HashMap::new(),
        }
    }

    /// Registry with the built-in txt/pdf/xlsx extractors
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(TxtExtractor));
        registry.register(Arc::new(PdfExtractor));
        registry.register(Arc::new(SpreadsheetExtractor));
        registry
    }

    /// Register an extractor under each extension it claims, replacing any
    /// previous handler for that extension
    pub fn register(&mut self, extractor: Arc<dyn TextExtractor>) {
        for ext in extractor.extensions() {
            self.by_extension.insert(ext.to_string(), extractor.clone());
        }
    }

    /// Extract text from an uploaded file, dispatching on its extension.
    ///
    /// Fails with `UnsupportedFileType` for unknown extensions and
    /// `ExtractionFailed` when the extracted text trims to nothing.
    pub fn extract(&self, file_name: &str, bytes: &[u8]) -> Result<String> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| Error::UnsupportedFileType(file_name.to_string()))?;

        let extractor = self
            .by_extension
            .get(&extension)
            .ok_or_else(|| Error::UnsupportedFileType(format!(".{}", extension)))?;

        let text = extractor.extract(file_name, bytes)?;
        if text.trim().is_empty() {
            return Err(Error::ExtractionFailed(format!(
                "no text extracted from {}",
                file_name
            )));
        }

        Ok(text)
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw UTF-8 text files
pub struct TxtExtractor;

impl TextExtractor for TxtExtractor {
    fn extensions(&self) -> &'static [&'static str] {
        &["txt"]
    }

    fn extract(&self, _file_name: &str, bytes: &[u8]) -> Result<String> {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// PDF embedded-text extraction
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extensions(&self) -> &'static [&'static str] {
        &["pdf"]
    }

    fn extract(&self, file_name: &str, bytes: &[u8]) -> Result<String> {
        pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| Error::ExtractionFailed(format!("pdf {}: {}", file_name, e)))
    }
}

/// Excel workbooks, rendered as ` | `-joined cell rows per sheet
pub struct SpreadsheetExtractor;

impl SpreadsheetExtractor {
    fn cell_text(cell: &Data) -> String {
        match cell {
            Data::Empty => String::new(),
            other => other.to_string(),
        }
    }

    fn rows_to_text<R: Reader<Cursor<Vec<u8>>>>(workbook: &mut R) -> String {
        let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
        let mut lines = Vec::new();

        for sheet_name in sheet_names {
            if let Ok(range) = workbook.worksheet_range(&sheet_name) {
                for row in range.rows() {
                    let line = row
                        .iter()
                        .map(Self::cell_text)
                        .collect::<Vec<_>>()
                        .join(" | ");
                    if !line.trim().is_empty() && line.trim() != "|" {
                        lines.push(line);
                    }
                }
            }
        }

        lines.join("\n")
    }
}

impl TextExtractor for SpreadsheetExtractor {
    fn extensions(&self) -> &'static [&'static str] {
        &["xlsx", "xls"]
    }

    fn extract(&self, file_name: &str, bytes: &[u8]) -> Result<String> {
        let is_xlsx = file_name.to_lowercase().ends_with(".xlsx");
        let cursor = Cursor::new(bytes.to_vec());

        let text = if is_xlsx {
            let mut workbook: Xlsx<_> = open_workbook_from_rs(cursor)
                .map_err(|e| Error::ExtractionFailed(format!("xlsx {}: {}", file_name, e)))?;
            Self::rows_to_text(&mut workbook)
        } else {
            let mut workbook: Xls<_> = open_workbook_from_rs(cursor)
                .map_err(|e| Error::ExtractionFailed(format!("xls {}: {}", file_name, e)))?;
            Self::rows_to_text(&mut workbook)
        };

        Ok(text)
    }
}
