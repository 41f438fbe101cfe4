//! Customer account handlers
//!
//! Thin glue: parse and validate the request, hand the typed command to the
//! service, map the result. Mutation endpoints return the created movement
//! with its updated `balance_after`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use app_ledger::{
    AccountFilters, AccountListing, AccountStatement, AccountStats, PaginatedAccounts, SyncReport,
};
use core_kernel::UserId;
use domain_ledger::{AccountMovement, CustomerAccount, OverdueAlert};

use crate::auth::Claims;
use crate::dto::accounts::{
    ApplySurchargeRequest, CreateAdjustmentRequest, CreateChargeRequest, CreatePaymentRequest,
    UpdateAccountRequest,
};
use crate::error::ApiError;
use crate::AppState;

fn actor_from(claims: &Claims) -> Option<UserId> {
    claims.sub.parse().ok()
}

/// Lists accounts with optional filters and pagination
pub async fn list_accounts(
    State(state): State<AppState>,
    Query(filters): Query<AccountFilters>,
) -> Result<Json<PaginatedAccounts>, ApiError> {
    Ok(Json(state.queries.find_all(filters).await?))
}

/// Aggregate account statistics
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<AccountStats>, ApiError> {
    Ok(Json(state.queries.stats().await?))
}

/// All accounts with outstanding debt, largest first
pub async fn get_debtors(
    State(state): State<AppState>,
) -> Result<Json<Vec<AccountListing>>, ApiError> {
    Ok(Json(state.queries.debtors().await?))
}

/// Accounts that are both indebted and overdue
pub async fn get_overdue_alerts(
    State(state): State<AppState>,
) -> Result<Json<Vec<OverdueAlert>>, ApiError> {
    Ok(Json(state.queries.overdue_alerts().await?))
}

/// One customer's statement: account, history, and summary
pub async fn get_statement(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<AccountStatement>, ApiError> {
    Ok(Json(state.queries.account_statement(customer_id.into()).await?))
}

/// Charges a sale or manual debit to the account
pub async fn create_charge(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateChargeRequest>,
) -> Result<(StatusCode, Json<AccountMovement>), ApiError> {
    request.validate()?;

    let movement = state
        .ledger
        .create_charge(customer_id.into(), request.into_command(), actor_from(&claims))
        .await?;

    Ok((StatusCode::CREATED, Json(movement)))
}

/// Records a customer payment
pub async fn create_payment(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<AccountMovement>), ApiError> {
    request.validate()?;

    let movement = state
        .ledger
        .create_payment(customer_id.into(), request.into_command(), actor_from(&claims))
        .await?;

    Ok((StatusCode::CREATED, Json(movement)))
}

/// Applies a late-payment surcharge
pub async fn apply_surcharge(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<ApplySurchargeRequest>,
) -> Result<(StatusCode, Json<AccountMovement>), ApiError> {
    request.validate()?;

    let movement = state
        .ledger
        .apply_surcharge(customer_id.into(), request.into_command(), actor_from(&claims))
        .await?;

    Ok((StatusCode::CREATED, Json(movement)))
}

/// Records an administrative adjustment
pub async fn create_adjustment(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateAdjustmentRequest>,
) -> Result<(StatusCode, Json<AccountMovement>), ApiError> {
    request.validate()?;

    let movement = state
        .ledger
        .create_adjustment(customer_id.into(), request.into_command(), actor_from(&claims))
        .await?;

    Ok((StatusCode::CREATED, Json(movement)))
}

/// Updates credit limit and/or status
pub async fn update_account(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
    Json(request): Json<UpdateAccountRequest>,
) -> Result<Json<CustomerAccount>, ApiError> {
    request.validate()?;

    let account = state
        .queries
        .update_account(customer_id.into(), request.into_update())
        .await?;

    Ok(Json(account))
}

/// Suspends the account
pub async fn suspend_account(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<CustomerAccount>, ApiError> {
    Ok(Json(state.queries.suspend_account(customer_id.into()).await?))
}

/// Reactivates the account
pub async fn activate_account(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<CustomerAccount>, ApiError> {
    Ok(Json(state.queries.activate_account(customer_id.into()).await?))
}

/// Creates charges for pending on-account sales that never got one
pub async fn sync_missing_charges(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<SyncReport>, ApiError> {
    let report = state
        .ledger
        .sync_missing_charges(customer_id.into(), actor_from(&claims))
        .await?;

    Ok(Json(report))
}
