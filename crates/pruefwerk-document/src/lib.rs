// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pruefwerk-document — Forensic analysis of PDF documents.
//
// Provides error level analysis of rasterised pages (recompression error,
// deviation masks, morphological cleanup, region outlining), colour-band
// highlight detection, and revision-history analysis of incrementally
// updated PDFs (byte-level snapshot extraction and unified text diffs).

pub mod ela;
pub mod image;
pub mod pdf;
pub mod render;

// Re-export the entry points so callers can use `pruefwerk_document::ForensicAnalyzer` etc.
pub use ela::{ForensicAnalyzer, ManipulationReport, PageAnalysis, PageOutcome};
pub use pdf::{LopdfTextExtractor, TextExtractor, VersionHistory};
pub use render::{EmbeddedImageRasterizer, PageRasterizer, RenderedPage};

#[cfg(feature = "pdfium")]
pub use render::PdfiumRasterizer;
