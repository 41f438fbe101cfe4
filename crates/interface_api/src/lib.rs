//! HTTP API layer
//!
//! This crate provides the REST API for the POS backend using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: request handlers for the account ledger
//! - **Middleware**: bearer authentication and audit logging
//! - **DTOs**: validated request bodies converted into domain commands
//! - **Error handling**: consistent JSON error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(pool, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use app_ledger::{AccountQueries, LedgerService};
use core_kernel::SystemClock;
use infra_db::adapters::{PgCustomerDirectory, PgPendingSales};

use crate::config::ApiConfig;
use crate::handlers::{accounts, health};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: ApiConfig,
    pub ledger: LedgerService,
    pub queries: AccountQueries,
}

impl AppState {
    /// Wires the services with the default Postgres adapters
    ///
    /// The cash register is an external collaborator; the default adapter
    /// logs each notice. Deployments with a real register swap in their own.
    pub fn new(pool: PgPool, config: ApiConfig) -> Self {
        let directory = Arc::new(PgCustomerDirectory::new(pool.clone()));
        let pending_sales = Arc::new(PgPendingSales::new(pool.clone()));

        let ledger = LedgerService::new(
            pool.clone(),
            directory.clone(),
            Arc::new(noop_cash_register::NoopCashRegister),
            pending_sales,
            Arc::new(SystemClock),
        );
        let queries = AccountQueries::new(pool.clone(), directory);

        Self {
            pool,
            config,
            ledger,
            queries,
        }
    }
}

mod noop_cash_register {
    //! Logging cash-register adapter for deployments without a register

    use async_trait::async_trait;
    use core_kernel::{DomainPort, PortError};
    use domain_ledger::{AccountPaymentNotice, CashRegister};
    use tracing::info;

    pub struct NoopCashRegister;

    impl DomainPort for NoopCashRegister {}

    #[async_trait]
    impl CashRegister for NoopCashRegister {
        async fn register_account_payment(
            &self,
            notice: AccountPaymentNotice,
        ) -> Result<(), PortError> {
            info!(
                customer_id = %notice.customer_id,
                amount = %notice.amount,
                "account payment received (no cash register wired)"
            );
            Ok(())
        }
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `pool` - Database connection pool
/// * `config` - API configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(pool: PgPool, config: ApiConfig) -> Router {
    let state = AppState::new(pool, config);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Account ledger routes
    let account_routes = Router::new()
        .route("/", get(accounts::list_accounts))
        .route("/stats", get(accounts::get_stats))
        .route("/debtors", get(accounts::get_debtors))
        .route("/overdue-alerts", get(accounts::get_overdue_alerts))
        .route("/:customer_id/statement", get(accounts::get_statement))
        .route("/:customer_id/charges", post(accounts::create_charge))
        .route("/:customer_id/payments", post(accounts::create_payment))
        .route("/:customer_id/surcharges", post(accounts::apply_surcharge))
        .route("/:customer_id/adjustments", post(accounts::create_adjustment))
        .route("/:customer_id", patch(accounts::update_account))
        .route("/:customer_id/suspend", post(accounts::suspend_account))
        .route("/:customer_id/activate", post(accounts::activate_account))
        .route("/:customer_id/sync-charges", post(accounts::sync_missing_charges));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/accounts", account_routes)
        .layer(axum_middleware::from_fn_with_state(state.clone(), audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
