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

//! Currency code validation.
//!
//! The engine asks a [`CurrencyValidator`] whether a currency code is
//! acceptable and never caches the answer. [`CurrencyTable`] is the standard
//! implementation, backed by an ISO 4217 code list loaded from JSON:
//!
//! ```json
//! {"currencies": [{"code": "USD", "name": "US Dollar", "number": "840"}]}
//! ```

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Decides whether a currency code may be used by an account.
pub trait CurrencyValidator: Send + Sync {
    fn is_valid(&self, code: &str) -> bool;
}

impl<F> CurrencyValidator for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_valid(&self, code: &str) -> bool {
        self(code)
    }
}

/// Errors raised while loading a currency table.
#[derive(Error, Debug)]
pub enum CurrencyTableError {
    #[error("error reading currency file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing currency data: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct CurrencyFile {
    currencies: Vec<CurrencyRecord>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct CurrencyRecord {
    code: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    number: String,
}

/// A fixed set of valid currency codes. Lookups are case-sensitive.
#[derive(Debug, Clone, Default)]
pub struct CurrencyTable {
    codes: HashSet<String>,
}

impl CurrencyTable {
    const COMMON: [&'static str; 10] = [
        "USD", "EUR", "GBP", "JPY", "CHF", "CAD", "AUD", "CNY", "SEK", "NZD",
    ];

    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }

    /// A small built-in table of major currencies.
    pub fn common() -> Self {
        Self::from_codes(Self::COMMON)
    }

    /// Loads an ISO 4217 table from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CurrencyTableError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| CurrencyTableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table: Self = contents.parse()?;
        tracing::info!(
            file = %path.display(),
            currency_count = table.len(),
            "currency data loaded"
        );
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl FromStr for CurrencyTable {
    type Err = CurrencyTableError;

    fn from_str(json: &str) -> Result<Self, Self::Err> {
        let file: CurrencyFile = serde_json::from_str(json)?;
        Ok(Self::from_codes(file.currencies.into_iter().map(|c| c.code)))
    }
}

impl CurrencyValidator for CurrencyTable {
    fn is_valid(&self, code: &str) -> bool {
        self.codes.contains(code)
    }
}
