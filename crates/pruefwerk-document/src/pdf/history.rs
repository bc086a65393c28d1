// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Revision history: extract the text of every incremental revision and diff
// consecutive pairs.

use pruefwerk_core::cancel::CancellationToken;
use pruefwerk_core::error::Result;
use pruefwerk_core::{DiffOutcome, VersionDiff, VersionReport};
use tracing::{debug, info, instrument, warn};

use super::diff::unified_diff;
use super::text::TextExtractor;
use super::versions::{PdfSnapshot, extract_versions};

/// Text of each snapshot, in order. Extraction failures degrade to `""`.
fn snapshot_texts(
    snapshots: &[PdfSnapshot<'_>],
    extractor: &dyn TextExtractor,
    cancel: &CancellationToken,
) -> Result<Vec<String>> {
    let mut texts = Vec::with_capacity(snapshots.len());
    for snapshot in snapshots {
        cancel.check()?;
        let text = match extractor.extract_text(snapshot.bytes) {
            Ok(text) => text,
            Err(err) => {
                warn!(
                    version = snapshot.version,
                    error = %err,
                    "Text extraction failed; treating revision as empty"
                );
                String::new()
            }
        };
        debug!(
            version = snapshot.version,
            chars = text.chars().count(),
            "Revision text extracted"
        );
        texts.push(text);
    }
    Ok(texts)
}

/// Compare consecutive texts. `texts[i]` belongs to `snapshots[i]`.
fn diff_texts(snapshots: &[PdfSnapshot<'_>], texts: &[String]) -> Vec<VersionDiff> {
    snapshots
        .windows(2)
        .zip(texts.windows(2))
        .map(|(pair, text)| {
            let (from, to) = (pair[0].version, pair[1].version);
            let (old, new) = (&text[0], &text[1]);

            let outcome = if old.trim().is_empty() || new.trim().is_empty() {
                debug!(from, to, "Empty text on one side; skipping pair");
                DiffOutcome::Skipped
            } else if old == new {
                DiffOutcome::Unchanged
            } else {
                let (old_label, new_label) = (format!("Version {}", from), format!("Version {}", to));
                match unified_diff(old, new, &old_label, &new_label) {
                    Some(diff) => {
                        debug!(
                            from,
                            to,
                            additions = diff.additions,
                            removals = diff.removals,
                            "Text changed"
                        );
                        DiffOutcome::Changed(diff)
                    }
                    // Differs only in line terminators.
                    None => DiffOutcome::Unchanged,
                }
            };

            VersionDiff {
                from_version: from,
                to_version: to,
                outcome,
            }
        })
        .collect()
}

/// Diff the text of each consecutive pair of snapshots.
///
/// Produces one record per pair, so `N` snapshots give `N - 1` records.
/// Cancellation is checked before every extraction.
#[instrument(skip_all, fields(snapshots = snapshots.len()))]
pub fn diff_versions(
    snapshots: &[PdfSnapshot<'_>],
    extractor: &dyn TextExtractor,
    cancel: &CancellationToken,
) -> Result<Vec<VersionDiff>> {
    let texts = snapshot_texts(snapshots, extractor, cancel)?;
    Ok(diff_texts(snapshots, &texts))
}

/// Entry point for the revision-history analysis of one document.
pub struct VersionHistory;

impl VersionHistory {
    /// Split `pdf_bytes` into revisions, extract their text and diff them.
    ///
    /// A document without incremental updates yields an empty report, not an
    /// error. The only error is cancellation.
    #[instrument(skip_all, fields(bytes_len = pdf_bytes.len()))]
    pub fn analyze(
        pdf_bytes: &[u8],
        extractor: &dyn TextExtractor,
        cancel: &CancellationToken,
    ) -> Result<VersionReport> {
        cancel.check()?;
        let snapshots = extract_versions(pdf_bytes);
        if snapshots.is_empty() {
            info!("Document has a single revision");
            return Ok(VersionReport::default());
        }

        let texts = snapshot_texts(&snapshots, extractor, cancel)?;
        let diffs = diff_texts(&snapshots, &texts);
        let summaries = snapshots
            .iter()
            .zip(&texts)
            .map(|(snapshot, text)| snapshot.summary(text.chars().count()))
            .collect();

        let report = VersionReport {
            snapshots: summaries,
            diffs,
        };
        info!(
            revisions = report.snapshots.len(),
            changed = report.changed_pairs(),
            "Revision history analysed"
        );
        Ok(report)
    }
}
