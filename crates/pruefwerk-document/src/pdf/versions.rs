// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Incremental-update boundaries. A PDF amended in place keeps its earlier
// bytes and appends new objects, a new xref section and a new
// `startxref … %%EOF` trailer. Every such trailer closes one revision, and
// the byte prefix ending there is that revision as a standalone document.

use pruefwerk_core::SnapshotSummary;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

const STARTXREF: &[u8] = b"startxref";
const EOF_MARKER: &[u8] = b"%%EOF";

/// One cumulative revision: `bytes` is a prefix of the full document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdfSnapshot<'a> {
    /// 1-indexed revision number.
    pub version: usize,
    pub bytes: &'a [u8],
}

impl PdfSnapshot<'_> {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Hex-encoded SHA-256 of the snapshot bytes.
    pub fn sha256(&self) -> String {
        hex::encode(Sha256::digest(self.bytes))
    }

    /// Serialisable description, given how much text the revision yielded.
    pub fn summary(&self, text_chars: usize) -> SnapshotSummary {
        SnapshotSummary {
            version: self.version,
            byte_len: self.bytes.len(),
            sha256: self.sha256(),
            text_chars,
        }
    }
}

/// Offsets of every occurrence of `needle` in `haystack`, in order.
fn find_all(haystack: &[u8], needle: &[u8]) -> Vec<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return Vec::new();
    }
    haystack
        .windows(needle.len())
        .enumerate()
        .filter_map(|(offset, window)| (window == needle).then_some(offset))
        .collect()
}

/// First occurrence of `needle` at or after `from`.
fn find_from(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| from + pos)
}

/// Split a PDF into its cumulative revisions.
///
/// Returns an empty list when the buffer holds fewer than two `startxref`
/// markers: a document without incremental updates has no history to report.
/// A `startxref` with no later `%%EOF` is dropped, and markers resolving to
/// the same `%%EOF` produce a single snapshot.
#[instrument(skip_all, fields(bytes_len = pdf_bytes.len()))]
pub fn extract_versions(pdf_bytes: &[u8]) -> Vec<PdfSnapshot<'_>> {
    let markers = find_all(pdf_bytes, STARTXREF);
    if markers.len() < 2 {
        debug!(markers = markers.len(), "No incremental updates detected");
        return Vec::new();
    }
    debug!(markers = markers.len(), "Potential revisions found");

    let mut boundaries: Vec<usize> = Vec::with_capacity(markers.len());
    for offset in markers {
        match find_from(pdf_bytes, EOF_MARKER, offset) {
            Some(eof) => boundaries.push(eof + EOF_MARKER.len()),
            None => warn!(offset, "startxref without a following %%EOF; dropping"),
        }
    }
    boundaries.sort_unstable();
    boundaries.dedup();

    let snapshots: Vec<PdfSnapshot<'_>> = boundaries
        .into_iter()
        .enumerate()
        .map(|(i, end)| PdfSnapshot {
            version: i + 1,
            bytes: &pdf_bytes[..end],
        })
        .collect();

    info!(revisions = snapshots.len(), "Revisions extracted");
    snapshots
}

#[cfg(test)]
mod tests {
    use super::*;

    const REV1: &[u8] = b"%PDF-1.7\n1 0 obj\n<< /Type /Catalog >>\nendobj\nxref\n0 2\ntrailer\n<< /Root 1 0 R >>\nstartxref\n42\n%%EOF\n";
    const REV2: &[u8] = b"2 0 obj\n(amended)\nendobj\nxref\n2 1\ntrailer\n<< /Root 1 0 R /Prev 42 >>\nstartxref\n120\n%%EOF\n";

    fn two_revisions() -> Vec<u8> {
        [REV1, REV2].concat()
    }

    #[test]
    fn single_revision_has_no_history() {
        assert!(extract_versions(REV1).is_empty());
    }

    #[test]
    fn no_markers_has_no_history() {
        assert!(extract_versions(b"").is_empty());
        assert!(extract_versions(b"%PDF-1.4 nothing here").is_empty());
    }

    #[test]
    fn two_updates_give_two_growing_prefixes() {
        let pdf = two_revisions();
        let versions = extract_versions(&pdf);
        assert_eq!(versions.len(), 2);

        let first = versions[0];
        let second = versions[1];
        assert_eq!(first.version, 1);
        assert_eq!(second.version, 2);
        assert!(first.len() < second.len());
        assert!(pdf.starts_with(first.bytes));
        assert!(pdf.starts_with(second.bytes));
        assert!(first.bytes.ends_with(b"%%EOF"));
        assert!(second.bytes.ends_with(b"%%EOF"));
        assert_eq!(first.len(), REV1.len() - 1);
        // Trailing newline after the final %%EOF is not part of a revision.
        assert_eq!(second.len(), pdf.len() - 1);
    }

    #[test]
    fn trailing_startxref_without_eof_is_dropped() {
        let mut pdf = two_revisions();
        pdf.extend_from_slice(b"3 0 obj\n(cut off)\nendobj\nstartxref\n999\n");
        let versions = extract_versions(&pdf);
        assert_eq!(versions.len(), 2);
    }

    #[test]
    fn markers_sharing_an_eof_collapse() {
        let pdf = b"%PDF-1.4\nstartxref\n1\nstartxref\n2\n%%EOF".to_vec();
        let versions = extract_versions(&pdf);
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].len(), pdf.len());
    }

    #[test]
    fn summary_carries_digest() {
        let pdf = two_revisions();
        let versions = extract_versions(&pdf);
        let summary = versions[0].summary(17);
        assert_eq!(summary.version, 1);
        assert_eq!(summary.byte_len, versions[0].len());
        assert_eq!(summary.sha256.len(), 64);
        assert_eq!(summary.text_chars, 17);
        assert_ne!(summary.sha256, versions[1].sha256());
    }
}
