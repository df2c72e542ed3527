//! HTTP API over the tax engine and the yearly store

mod error;

pub use error::{ApiError, ErrorBody};

use crate::core::period::{Balances, InputError, PeriodInput};
use crate::core::profile::UserInfo;
use crate::core::rates::RateTable;
use crate::core::transaction::{Transaction, TransactionError, TransactionInput};
use crate::core::warnings::Warning;
use crate::store::{Store, YearlyData};
use crate::tax::totals::{CalculationContext, Calculator, Totals};
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Per-server state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub rates: Arc<RateTable>,
    pub context: CalculationContext,
    pub store: Arc<dyn Store>,
    /// Transactions posted to `/transactions`, kept for the server's lifetime
    pub transactions: Arc<RwLock<Vec<Transaction>>>,
}

impl AppState {
    pub fn new(rates: RateTable, context: CalculationContext, store: Arc<dyn Store>) -> Self {
        AppState {
            rates: Arc::new(rates),
            context,
            store,
            transactions: Arc::default(),
        }
    }

    fn calculator(&self) -> Calculator<'_> {
        Calculator::new(&self.rates, self.context)
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/summary", post(summary))
        .route("/data/:year", get(load_year).post(save_year))
        .route(
            "/transactions",
            get(list_transactions)
                .post(add_transaction)
                .delete(remove_transaction),
        )
        .route("/health", get(health))
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(state: AppState, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryRequest {
    transactions: Vec<TransactionInput>,
    user_info: UserInfo,
    /// Echoed back for display; totals always use the server's reference year
    #[serde(default)]
    year: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    pub totals: Totals,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

async fn health() -> &'static str {
    "ok"
}

async fn summary(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SummaryResponse>, ApiError> {
    let value: Value = serde_json::from_slice(&body).map_err(|_| ApiError::InvalidInput)?;
    for field in ["transactions", "userInfo"] {
        if value.get(field).is_none_or(Value::is_null) {
            return Err(ApiError::InvalidInput);
        }
    }
    let request: SummaryRequest = serde_json::from_value(value)?;

    let period = PeriodInput {
        transactions: request.transactions,
        user_info: request.user_info,
        balances: Balances::default(),
    }
    .parse(&state.rates, state.context.reference_year)?;

    let totals = state
        .calculator()
        .compute_totals(&period.transactions, &period.user_info);
    log::info!(
        "summary of {} transactions: set aside {:.2}",
        period.transactions.len(),
        totals.to_set_aside
    );

    Ok(Json(SummaryResponse {
        year: request.year,
        totals: totals.rounded(),
        warnings: period.warnings,
    }))
}

async fn load_year(
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> Result<Json<YearlyData>, ApiError> {
    let store = state.store.clone();
    let data = tokio::task::spawn_blocking(move || store.load(year))
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))??;
    log::info!("loaded {} periods for {}", data.len(), year);
    Ok(Json(data))
}

async fn save_year(
    State(state): State<AppState>,
    Path(year): Path<i32>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut data: YearlyData = serde_json::from_slice(&body)?;
    data.validate(state.context.reference_year)?;
    data.fill_totals(&state.calculator());

    let store = state.store.clone();
    tokio::task::spawn_blocking(move || store.save(year, &data))
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))??;
    log::info!("saved data for {}", year);

    Ok(Json(MessageResponse {
        message: "Data saved".to_string(),
    }))
}

async fn list_transactions(State(state): State<AppState>) -> Json<Vec<Transaction>> {
    Json(state.transactions.read().clone())
}

async fn add_transaction(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    let input: TransactionInput =
        serde_json::from_slice(&body).map_err(|_| ApiError::InvalidInput)?;
    let (transaction, warnings) = input.parse().map_err(InputError::from)?;
    for warning in &warnings {
        log::warn!("{}", warning);
    }

    let mut transactions = state.transactions.write();
    if transactions.iter().any(|t| t.id() == transaction.id()) {
        let err = TransactionError::DuplicateTransactionId(transaction.id().to_string());
        return Err(InputError::from(err).into());
    }
    transactions.push(transaction.clone());
    log::info!("added transaction {}", transaction.id());

    Ok((StatusCode::CREATED, Json(transaction)))
}

#[derive(Debug, Deserialize)]
struct RemoveParams {
    id: Option<String>,
}

/// Removing an unknown id is not an error.
async fn remove_transaction(
    State(state): State<AppState>,
    Query(params): Query<RemoveParams>,
) -> Result<StatusCode, ApiError> {
    let id = params.id.ok_or(ApiError::InvalidInput)?;
    let mut transactions = state.transactions.write();
    let before = transactions.len();
    transactions.retain(|t| t.id() != id);
    log::info!("removed {} transaction(s) with id {}", before - transactions.len(), id);
    Ok(StatusCode::NO_CONTENT)
}
