use std::panic::{catch_unwind, AssertUnwindSafe};

use super::ExtractionError;

/// Extracts text page by page. Returns the assembled text and the page count.
pub fn extract(file_name: &str, bytes: &[u8]) -> Result<(String, u32), ExtractionError> {
    let pdf_error = |reason: String| ExtractionError::Pdf {
        file_name: file_name.to_string(),
        reason,
    };

    // The parser can panic on malformed cross-reference tables.
    let pages = catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }))
    .map_err(|_| pdf_error("parser panicked on malformed input".to_string()))?
    .map_err(|e| pdf_error(e.to_string()))?;

    let page_count = u32::try_from(pages.len()).unwrap_or(u32::MAX);
    Ok((assemble_pages(&pages), page_count))
}

/// Joins the text items of a page with single spaces, appends `\n` after
/// every page, and trims the result.
pub fn assemble_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let mut out = String::new();
    for page in pages {
        let items: Vec<&str> = page
            .as_ref()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        out.push_str(&items.join(" "));
        out.push('\n');
    }
    out.trim().to_string()
}
