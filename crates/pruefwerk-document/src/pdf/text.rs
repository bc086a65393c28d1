// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text extraction adapters for PDF revision snapshots.

use lopdf::Document;
use pruefwerk_core::error::{ForensicsError, Result};
use tracing::{debug, instrument};

/// PDF bytes → plain text.
///
/// Errors are reported, not swallowed; the version differ decides how to
/// degrade.
pub trait TextExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String>;
}

impl<F> TextExtractor for F
where
    F: Fn(&[u8]) -> Result<String>,
{
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String> {
        self(pdf_bytes)
    }
}

/// Extracts the text of every page, in page order, with lopdf.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfTextExtractor;

impl TextExtractor for LopdfTextExtractor {
    #[instrument(skip_all, fields(bytes_len = pdf_bytes.len()))]
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String> {
        let document = Document::load_mem(pdf_bytes).map_err(|err| {
            ForensicsError::TextExtraction(format!("failed to load PDF from memory: {}", err))
        })?;

        let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
        if page_numbers.is_empty() {
            return Ok(String::new());
        }

        let text = document.extract_text(&page_numbers).map_err(|err| {
            ForensicsError::TextExtraction(format!("failed to extract page text: {}", err))
        })?;
        debug!(pages = page_numbers.len(), chars = text.chars().count(), "Text extracted");
        Ok(text)
    }
}
