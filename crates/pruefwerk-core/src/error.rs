// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Pruefwerk.

use thiserror::Error;

/// Top-level error type for all Pruefwerk operations.
///
/// "No incremental updates" and "no suspicious regions" are successful
/// outcomes and never surface through this type.
#[derive(Debug, Error)]
pub enum ForensicsError {
    // -- Image analysis --
    #[error("invalid image: {width}x{height} has no pixels")]
    InvalidImage { width: u32, height: u32 },

    #[error("dimension mismatch: page is {page_width}x{page_height}, mask is {mask_width}x{mask_height}")]
    DimensionMismatch {
        page_width: u32,
        page_height: u32,
        mask_width: u32,
        mask_height: u32,
    },

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Adapters --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("rasterization failed: {0}")]
    Rasterization(String),

    #[error("text extraction failed: {0}")]
    TextExtraction(String),

    #[error("adapter unavailable: {0}")]
    AdapterUnavailable(String),

    // -- Request control --
    #[error("analysis cancelled")]
    Cancelled,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Configuration / reports --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ForensicsError {
    /// Whether this error aborts the whole request rather than a single page
    /// or snapshot.
    pub fn is_request_fatal(&self) -> bool {
        matches!(
            self,
            Self::Rasterization(_)
                | Self::AdapterUnavailable(_)
                | Self::Cancelled
                | Self::InvalidConfig(_)
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ForensicsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_errors_are_not_request_fatal() {
        assert!(!ForensicsError::InvalidImage { width: 0, height: 10 }.is_request_fatal());
        assert!(!ForensicsError::TextExtraction("bad xref".into()).is_request_fatal());
    }

    #[test]
    fn adapter_outages_are_request_fatal() {
        assert!(ForensicsError::Rasterization("broken".into()).is_request_fatal());
        assert!(ForensicsError::AdapterUnavailable("no pdfium".into()).is_request_fatal());
        assert!(ForensicsError::Cancelled.is_request_fatal());
    }

    #[test]
    fn invalid_image_message_names_dimensions() {
        let err = ForensicsError::InvalidImage { width: 0, height: 42 };
        assert_eq!(err.to_string(), "invalid image: 0x42 has no pixels");
    }
}
