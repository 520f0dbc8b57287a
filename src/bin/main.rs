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

use anyhow::Context;
use clap::Parser;
use double_entry_ledger::config::{Args, Config};
use double_entry_ledger::{CurrencyTable, Engine, api, logging};
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Args::parse()
        .into_config()
        .context("invalid configuration")?;
    logging::init(config.profile);

    info!(profile = ?config.profile, "starting ledger server");

    let engine = Arc::new(Engine::new(load_currencies(&config)));
    let auditor = engine.spawn_auditor(config.audit_period);

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(
        addr = %listener.local_addr()?,
        request_timeout_secs = config.request_timeout.as_secs(),
        "ledger api listening"
    );

    serve(listener, api::router(engine, &config), &config).await?;

    match auditor.shutdown().await {
        Ok(summary) => info!(
            runs = summary.runs,
            failures = summary.failures,
            "auditor stopped"
        ),
        Err(err) => error!(error = %err, "auditor task failed"),
    }

    info!("ledger server stopped");
    Ok(())
}

/// Loads the configured ISO 4217 table, falling back to the built-in one.
fn load_currencies(config: &Config) -> CurrencyTable {
    match CurrencyTable::from_path(&config.currency_file) {
        Ok(table) => table,
        Err(err) => {
            warn!(error = %err, "using built-in currency table");
            CurrencyTable::common()
        }
    }
}

/// Serves until Ctrl-C, then gives in-flight requests the configured grace
/// period to finish.
async fn serve(listener: TcpListener, app: axum::Router, config: &Config) -> anyhow::Result<()> {
    let stop = Arc::new(Notify::new());
    let stopped = Arc::clone(&stop);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move { stopped.notified().await })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return result.context("server error"),
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl-C")?;
            info!("shutdown signal received");
        }
    }

    stop.notify_one();
    match tokio::time::timeout(config.shutdown_grace, server).await {
        Ok(result) => result.context("server error"),
        Err(_) => {
            warn!(
                grace_secs = config.shutdown_grace.as_secs(),
                "graceful shutdown timed out"
            );
            Ok(())
        }
    }
}
