// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — incremental-revision extraction, text adapters and revision
// diffing.

pub mod diff;
pub mod history;
pub mod text;
pub mod versions;

pub use diff::unified_diff;
pub use history::{VersionHistory, diff_versions};
pub use text::{LopdfTextExtractor, TextExtractor};
pub use versions::{PdfSnapshot, extract_versions};
