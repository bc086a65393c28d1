// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — in-memory codecs and side-by-side comparison composition.

pub mod compose;
pub mod processor;

pub use compose::side_by_side;
