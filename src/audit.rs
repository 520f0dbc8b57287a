// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Periodic ledger balance auditor.
//!
//! The auditor is a background tokio task that calls
//! [`Engine::verify_ledger_balance`] once per period for as long as its
//! [`Auditor`] handle is alive. Failures are logged, never returned to request
//! handlers; the ledger keeps serving while unbalanced.

use crate::engine::Engine;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

/// Audit period of the reference deployment.
pub const DEFAULT_AUDIT_PERIOD: Duration = Duration::from_secs(60 * 60);

/// Counters reported when an auditor stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditSummary {
    /// Number of balance checks performed.
    pub runs: u64,
    /// Number of checks that found an unbalanced currency.
    pub failures: u64,
}

/// Handle to a running audit loop.
///
/// Call [`Auditor::shutdown`] to stop the loop and collect its summary.
/// Dropping the handle also stops the loop at its next wake-up.
#[derive(Debug)]
pub struct Auditor {
    shutdown: mpsc::Sender<()>,
    join: JoinHandle<AuditSummary>,
}

impl Auditor {
    /// Spawns the audit loop on the current tokio runtime.
    ///
    /// The first check runs one full `period` after spawning.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero or if called outside a tokio runtime.
    pub fn spawn(engine: Arc<Engine>, period: Duration) -> Self {
        let (shutdown, mut shutdown_rx) = mpsc::channel::<()>(1);

        let join = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut summary = AuditSummary::default();

            info!(period_secs = period.as_secs_f64(), "ledger auditor started");

            loop {
                tokio::select! {
                    // Explicit shutdown or a dropped handle.
                    _ = shutdown_rx.recv() => break,
                    _ = ticker.tick() => {
                        summary.runs += 1;
                        match engine.verify_ledger_balance() {
                            Ok(()) => debug!(run = summary.runs, "ledger balance check passed"),
                            Err(err) => {
                                summary.failures += 1;
                                error!(error = %err, "CRITICAL: ledger balance check failed");
                            }
                        }
                    }
                }
            }

            info!(
                runs = summary.runs,
                failures = summary.failures,
                "ledger auditor stopped"
            );
            summary
        });

        Self { shutdown, join }
    }

    /// Signals the loop to stop and waits for it to finish.
    ///
    /// # Errors
    ///
    /// Returns the [`JoinError`] if the audit task panicked or was aborted.
    pub async fn shutdown(self) -> Result<AuditSummary, JoinError> {
        // A send error means the loop already exited; joining still reports it.
        let _ = self.shutdown.send(()).await;
        self.join.await
    }
}

impl Engine {
    /// Starts a periodic [`Auditor`] over this engine.
    pub fn spawn_auditor(self: &Arc<Self>, period: Duration) -> Auditor {
        Auditor::spawn(Arc::clone(self), period)
    }
}
