pub mod alerts;
pub mod customers;
pub mod dashboard;
pub mod deliveries;
pub mod health;
pub mod orders;
pub mod payments;
pub mod products;

use crate::config::Config;
use crate::db::Repository;
use crate::orchestration::LedgerService;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Config,
    pub service: Arc<LedgerService>,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, config: Config, service: Arc<LedgerService>) -> Self {
        Self {
            repo,
            config,
            service,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route(
            "/v1/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route(
            "/v1/customers/:id",
            get(customers::get_customer)
                .put(customers::update_customer)
                .delete(customers::delete_customer),
        )
        .route("/v1/customers/:id/deposits", post(customers::deposit))
        .route(
            "/v1/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/v1/products/:id",
            put(products::update_product).delete(products::delete_product),
        )
        .route(
            "/v1/orders",
            get(orders::list_orders).post(orders::create_orders),
        )
        .route(
            "/v1/orders/:id",
            get(orders::get_order)
                .put(orders::update_order)
                .delete(orders::delete_order),
        )
        .route("/v1/orders/:id/reopen", post(orders::reopen_order))
        .route("/v1/orders/:id/deliveries", post(deliveries::add_delivery))
        .route("/v1/orders/cleanup", post(orders::cleanup_orders))
        .route("/v1/deliveries/:id", delete(deliveries::delete_delivery))
        .route("/v1/payments", post(payments::create_payment))
        .route("/v1/payments/:id", delete(payments::delete_payment))
        .route("/v1/dashboard", get(dashboard::get_dashboard))
        .route("/v1/alerts", get(alerts::get_alerts))
        .layer(cors)
        .with_state(state)
}
