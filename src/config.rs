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

//! Server configuration.
//!
//! Defaults come from the deployment profile selected by `APP_ENV`; individual
//! settings can be overridden with command-line flags or `LEDGER_*`
//! environment variables.

use crate::audit::DEFAULT_AUDIT_PERIOD;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Deployment profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Development,
    Test,
    Production,
}

impl Profile {
    /// Maps an `APP_ENV` value to a profile. Unknown or missing values select
    /// [`Profile::Development`].
    pub fn from_app_env(value: Option<&str>) -> Self {
        match value.map(str::to_lowercase).as_deref() {
            Some("test") => Self::Test,
            Some("prod" | "production") => Self::Production,
            _ => Self::Development,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("audit interval must be greater than zero")]
    ZeroAuditPeriod,

    #[error("request body limit must be greater than zero")]
    ZeroBodyLimit,

    #[error("request timeout must be greater than zero")]
    ZeroRequestTimeout,
}

/// Resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub profile: Profile,
    pub listen_addr: SocketAddr,
    /// ISO 4217 currency table (JSON).
    pub currency_file: PathBuf,
    pub audit_period: Duration,
    pub max_body_bytes: usize,
    /// Upper bound on reading a request and producing its response.
    pub request_timeout: Duration,
    /// How long in-flight requests may run after a shutdown signal.
    pub shutdown_grace: Duration,
}

impl Config {
    const MAX_BODY_BYTES: usize = 1 << 20;

    pub fn for_profile(profile: Profile) -> Self {
        let (port, currency_file, request_timeout, shutdown_grace) = match profile {
            Profile::Development => (8080, "data/iso4217_currency_dev.json", 15, 30),
            Profile::Test => (8081, "data/iso4217_currency_test.json", 5, 5),
            Profile::Production => (80, "data/iso4217_currency.json", 30, 30),
        };

        Self {
            profile,
            listen_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            currency_file: PathBuf::from(currency_file),
            audit_period: DEFAULT_AUDIT_PERIOD,
            max_body_bytes: Self::MAX_BODY_BYTES,
            request_timeout: Duration::from_secs(request_timeout),
            shutdown_grace: Duration::from_secs(shutdown_grace),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.audit_period.is_zero() {
            return Err(ConfigError::ZeroAuditPeriod);
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::ZeroBodyLimit);
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroRequestTimeout);
        }
        Ok(())
    }
}

/// Ledger Server - in-memory double-entry bookkeeping over HTTP
#[derive(Parser, Debug, Default)]
#[command(name = "ledger-server")]
#[command(about = "Serves an in-memory double-entry ledger over HTTP", long_about = None)]
pub struct Args {
    /// Deployment profile: development, test, or production
    #[arg(long = "env", env = "APP_ENV", value_name = "PROFILE")]
    pub app_env: Option<String>,

    /// Address to listen on, e.g. 127.0.0.1:8080
    #[arg(long, env = "LEDGER_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Path to the ISO 4217 currency JSON file
    #[arg(long, env = "LEDGER_CURRENCY_FILE", value_name = "FILE")]
    pub currency_file: Option<PathBuf>,

    /// Seconds between ledger balance audits
    #[arg(long, env = "LEDGER_AUDIT_INTERVAL_SECS", value_name = "SECS")]
    pub audit_interval_secs: Option<u64>,

    /// Maximum accepted request body size in bytes
    #[arg(long, env = "LEDGER_MAX_BODY_BYTES", value_name = "BYTES")]
    pub max_body_bytes: Option<usize>,

    /// Seconds a request may take before it is answered with 408
    #[arg(long, env = "LEDGER_REQUEST_TIMEOUT_SECS", value_name = "SECS")]
    pub request_timeout_secs: Option<u64>,
}

impl Args {
    /// Applies the overrides on top of the selected profile's defaults.
    pub fn into_config(self) -> Result<Config, ConfigError> {
        let mut config = Config::for_profile(Profile::from_app_env(self.app_env.as_deref()));

        if let Some(listen) = self.listen {
            config.listen_addr = listen;
        }
        if let Some(file) = self.currency_file {
            config.currency_file = file;
        }
        if let Some(secs) = self.audit_interval_secs {
            config.audit_period = Duration::from_secs(secs);
        }
        if let Some(bytes) = self.max_body_bytes {
            config.max_body_bytes = bytes;
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }
}
