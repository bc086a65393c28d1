// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Pruefwerk forensic reports.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Manipulation detection
// ---------------------------------------------------------------------------

/// A connected area of a page whose error level stands out from the rest.
///
/// Coordinates are page pixels; `area` is the number of foreground pixels in
/// the component, not the bounding-box area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SuspiciousRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub area: u32,
}

impl SuspiciousRegion {
    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Whether the region lies entirely inside a `width` x `height` page.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width && self.bottom() <= height
    }
}

/// Serialisable per-page result of the manipulation detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageVerdict {
    Analyzed {
        /// 0-indexed page number.
        page: usize,
        regions: Vec<SuspiciousRegion>,
        /// Regions found by the colour-band detector on the ELA map.
        highlight_regions: Vec<SuspiciousRegion>,
        /// Largest raw recompression difference on the page.
        max_error_level: u8,
    },
    /// The page could not be analysed; no verdict either way.
    Failed { page: usize, reason: String },
}

/// Serialisable manipulation-detection result for a whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManipulationSummary {
    pub pages: Vec<PageVerdict>,
}

impl ManipulationSummary {
    pub fn suspicious_region_count(&self) -> usize {
        self.pages
            .iter()
            .map(|page| match page {
                PageVerdict::Analyzed { regions, .. } => regions.len(),
                PageVerdict::Failed { .. } => 0,
            })
            .sum()
    }
}

// ---------------------------------------------------------------------------
// Revision history
// ---------------------------------------------------------------------------

/// Serialisable description of one cumulative PDF revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSummary {
    /// 1-indexed revision number ("Version 1..N").
    pub version: usize,
    /// Length of the byte prefix that makes up this revision.
    pub byte_len: usize,
    /// Hex-encoded SHA-256 of the prefix.
    pub sha256: String,
    /// Characters of text the extraction adapter returned (0 on failure).
    pub text_chars: usize,
}

/// Role of a single line in a unified diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffLineKind {
    /// `--- Version N`
    OldFileHeader,
    /// `+++ Version N+1`
    NewFileHeader,
    /// `@@ -a,b +c,d @@`
    HunkHeader,
    Context,
    Added,
    Removed,
}

/// One line of a unified diff, kept typed so prefix collisions
/// (`---` content vs `---` header) cannot skew the counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub kind: DiffLineKind,
    /// Line content without its leading tag character.
    pub text: String,
}

impl DiffLine {
    pub fn new(kind: DiffLineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Render the line the way `diff -u` prints it.
    pub fn render(&self) -> String {
        match self.kind {
            DiffLineKind::OldFileHeader => format!("--- {}", self.text),
            DiffLineKind::NewFileHeader => format!("+++ {}", self.text),
            DiffLineKind::HunkHeader => self.text.clone(),
            DiffLineKind::Context => format!(" {}", self.text),
            DiffLineKind::Added => format!("+{}", self.text),
            DiffLineKind::Removed => format!("-{}", self.text),
        }
    }
}

/// A complete unified diff between two revisions' text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedDiff {
    pub lines: Vec<DiffLine>,
    /// Content lines added (file headers excluded).
    pub additions: usize,
    /// Content lines removed (file headers excluded).
    pub removals: usize,
}

impl UnifiedDiff {
    /// Build a diff from its lines, deriving the counts from the line kinds.
    pub fn from_lines(lines: Vec<DiffLine>) -> Self {
        let additions = lines
            .iter()
            .filter(|line| line.kind == DiffLineKind::Added)
            .count();
        let removals = lines
            .iter()
            .filter(|line| line.kind == DiffLineKind::Removed)
            .count();
        Self {
            lines,
            additions,
            removals,
        }
    }

    /// Rendered diff lines, in order.
    pub fn rendered_lines(&self) -> Vec<String> {
        self.lines.iter().map(DiffLine::render).collect()
    }

    /// The whole diff as newline-joined text.
    pub fn to_text(&self) -> String {
        self.rendered_lines().join("\n")
    }
}

/// Outcome of comparing two consecutive revisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DiffOutcome {
    /// Text was empty (or extraction failed) on at least one side.
    Skipped,
    /// Both sides extracted to identical text.
    Unchanged,
    /// The text differs.
    Changed(UnifiedDiff),
}

/// Comparison record for the pair (`from_version`, `to_version`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDiff {
    pub from_version: usize,
    pub to_version: usize,
    pub outcome: DiffOutcome,
}

impl VersionDiff {
    /// Diff lines for a changed pair; empty for skipped and unchanged pairs.
    pub fn lines(&self) -> &[DiffLine] {
        match &self.outcome {
            DiffOutcome::Changed(diff) => &diff.lines,
            DiffOutcome::Skipped | DiffOutcome::Unchanged => &[],
        }
    }
}

/// Full revision-history result for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionReport {
    pub snapshots: Vec<SnapshotSummary>,
    pub diffs: Vec<VersionDiff>,
}

impl VersionReport {
    /// `false` for single-revision documents, which is a valid result.
    pub fn has_history(&self) -> bool {
        !self.snapshots.is_empty()
    }

    /// Number of pairs whose text actually changed.
    pub fn changed_pairs(&self) -> usize {
        self.diffs
            .iter()
            .filter(|diff| matches!(diff.outcome, DiffOutcome::Changed(_)))
            .count()
    }
}
