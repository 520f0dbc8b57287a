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

//! REST API over the ledger engine.
//!
//! ## Endpoints
//!
//! - `POST /accounts` - Create an account
//! - `POST /transactions` - Record a transfer between two accounts
//! - `GET /accounts/{id}/balance` - Current balance of an account
//! - `GET /accounts/{id}/history` - Transactions the account took part in
//!
//! ## Example Usage
//!
//! ```bash
//! curl -X POST http://localhost:8080/accounts \
//!   -H "Content-Type: application/json" \
//!   -d '{"id": "1001", "name": "Cash", "type": "asset", "currency": "USD"}'
//!
//! curl -X POST http://localhost:8080/transactions \
//!   -H "Content-Type: application/json" \
//!   -d '{"id": "t1", "description": "loan", "debit_account": "1001",
//!        "credit_account": "2001", "amount": {"amount": "500.00", "currency": "USD"}}'
//!
//! curl http://localhost:8080/accounts/1001/balance
//! curl http://localhost:8080/accounts/1001/history
//! ```

use crate::account::NewAccount;
use crate::base::AccountId;
use crate::config::Config;
use crate::engine::Engine;
use crate::error::LedgerError;
use crate::money::Money;
use crate::transaction::{NewTransaction, Transaction};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

/// Response body for balance lookups.
#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub balance: Money,
}

/// Response body for errors.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Shared application state containing the ledger engine.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

/// Wrapper for converting [`LedgerError`] into HTTP responses.
#[derive(Debug)]
pub struct AppError(LedgerError);

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        AppError(err)
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            LedgerError::DuplicateAccount(_) => StatusCode::CONFLICT,
            LedgerError::InvalidCurrency(_) | LedgerError::CurrencyMismatch { .. } => {
                StatusCode::BAD_REQUEST
            }
            LedgerError::AccountNotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::InsufficientFunds(_) => StatusCode::UNPROCESSABLE_ENTITY,
            LedgerError::UnbalancedTransaction { .. }
            | LedgerError::LedgerUnbalanced { .. }
            | LedgerError::LedgerTotalOverflow { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                error: self.0.to_string(),
                code: self.0.code().to_string(),
            }),
        )
            .into_response()
    }
}

/// POST /accounts - Create a new account.
async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<NewAccount>,
) -> Result<StatusCode, AppError> {
    let account_id = request.id.clone();
    state.engine.create_account(request)?;
    info!(account_id = %account_id, "account created via api");
    Ok(StatusCode::CREATED)
}

/// POST /transactions - Record a transfer.
async fn record_transaction(
    State(state): State<AppState>,
    Json(request): Json<NewTransaction>,
) -> Result<StatusCode, AppError> {
    let tx_id = request.id.clone();
    state.engine.record_transaction(request)?;
    info!(tx_id = %tx_id, "transaction recorded via api");
    Ok(StatusCode::CREATED)
}

/// GET /accounts/{id}/balance - Current balance.
async fn get_balance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BalanceResponse>, AppError> {
    let balance = state.engine.account_balance(&AccountId(id))?;
    Ok(Json(BalanceResponse { balance }))
}

/// GET /accounts/{id}/history - Transaction history.
async fn get_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Vec<Transaction>> {
    Json(state.engine.transaction_history(&AccountId(id)))
}

/// Builds the API router.
///
/// Bodies above `config.max_body_bytes` are answered with 413, and requests
/// still running after `config.request_timeout` with 408.
pub fn router(engine: Arc<Engine>, config: &Config) -> Router {
    Router::new()
        .route("/accounts", post(create_account))
        .route("/transactions", post(record_transaction))
        .route("/accounts/{id}/balance", get(get_balance))
        .route("/accounts/{id}/history", get(get_history))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .with_state(AppState { engine })
}
