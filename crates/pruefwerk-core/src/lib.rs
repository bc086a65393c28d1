// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pruefwerk — Core types, configuration, and error definitions shared across
// all crates.

pub mod cancel;
pub mod config;
pub mod error;
pub mod human_errors;
pub mod telemetry;
pub mod types;

pub use cancel::CancellationToken;
pub use config::{AnalysisConfig, HsvBounds, RasterFormat, RenderOptions};
pub use error::{ForensicsError, Result};
pub use types::*;
