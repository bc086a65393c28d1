// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cooperative cancellation for long-running adapter calls.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::error::{ForensicsError, Result};

/// Shared cancel flag with an optional deadline.
///
/// Clones share the flag, so the request layer can keep one handle and pass
/// another into the pipeline. Pipelines poll [`CancellationToken::check`]
/// between pages and between snapshots.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    /// A token that only trips when [`cancel`](Self::cancel) is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that also trips once `budget` has elapsed from now.
    pub fn with_timeout(budget: Duration) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(Instant::now() + budget),
        }
    }

    /// Build from an optional budget (e.g. `AnalysisConfig::timeout()`).
    pub fn from_timeout(budget: Option<Duration>) -> Self {
        budget.map_or_else(Self::new, Self::with_timeout)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// `Err(Cancelled)` once the token has tripped.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(ForensicsError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Time left before the deadline, if there is one.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}
