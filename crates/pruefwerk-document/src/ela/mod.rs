// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ELA module — error level analysis, deviation masks, region extraction,
// colour-band highlights and the page/document analyser built from them.

pub mod analyzer;
pub mod engine;
pub mod highlight;
pub mod mask;
pub mod regions;

pub use analyzer::{ForensicAnalyzer, ManipulationReport, PageAnalysis, PageOutcome};
pub use engine::{ElaMap, compute_ela};
pub use highlight::detect_highlighted_areas;
pub use mask::{DeviationMask, clean, threshold};
pub use regions::extract_regions;
