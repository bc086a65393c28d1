// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for people reviewing forensic results.
//
// "Analysis could not run" must never read like "nothing suspicious found",
// so every message states plainly that no verdict was reached.

use crate::error::ForensicsError;

/// Severity of an error from the reviewer's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Timeout or cancellation. Running the analysis again may succeed.
    Transient,
    /// The reviewer must supply something different (another file, settings).
    ActionRequired,
    /// The document cannot be analysed as submitted.
    Permanent,
}

/// A human-readable error with a plain English message and suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the reviewer should try (shown as body text).
    pub suggestion: String,
    /// Whether re-running the same request may help.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `ForensicsError` into a `HumanError` a document reviewer can act on.
pub fn humanize_error(err: &ForensicsError) -> HumanError {
    match err {
        ForensicsError::InvalidImage { .. } => HumanError {
            message: "This page could not be checked for edits.".into(),
            suggestion: "The page rendered as an empty image, so no verdict was reached for it. The other pages were still checked.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ForensicsError::DimensionMismatch { .. } => HumanError {
            message: "This page could not be checked for edits.".into(),
            suggestion: "An internal step produced an image of the wrong size for this page, so no verdict was reached for it. The other pages were still checked.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ForensicsError::ImageError(detail) => HumanError {
            message: "The page image could not be processed.".into(),
            suggestion: format!("No verdict was reached for this page. (Detail: {detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        ForensicsError::Rasterization(_) | ForensicsError::PdfError(_) => HumanError {
            message: "We couldn't open this PDF.".into(),
            suggestion: "No verdict was reached. The file may be damaged or password protected; try exporting it again from the original application.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ForensicsError::TextExtraction(_) => HumanError {
            message: "The text of one revision could not be read.".into(),
            suggestion: "No verdict was reached for that revision. The remaining revisions were still compared.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ForensicsError::AdapterUnavailable(detail) => HumanError {
            message: "Page analysis is not available on this system.".into(),
            suggestion: format!("No verdict was reached. The PDF renderer could not be loaded; ask an administrator to install it. (Detail: {detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ForensicsError::Cancelled => HumanError {
            message: "The analysis was stopped before it finished.".into(),
            suggestion: "No verdict was reached. Large or unusual PDFs can take a while; try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ForensicsError::InvalidConfig(detail) => HumanError {
            message: "The analysis settings are not valid.".into(),
            suggestion: format!("No verdict was reached. Fix the settings and run the analysis again. (Detail: {detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ForensicsError::Io(io_err) => HumanError {
            message: "A file could not be read.".into(),
            suggestion: format!("No verdict was reached. Check that the file exists and can be opened. (Detail: {io_err})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ForensicsError::Serialization(_) => HumanError {
            message: "The settings file is not valid JSON.".into(),
            suggestion: "No verdict was reached. Check the file for typos such as a missing comma or quote.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}
