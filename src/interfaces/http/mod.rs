//! HTTP interface: one router per resource under `/api`, JSON envelopes
//! on both the success and error paths.

pub mod error;
mod notifications;
mod offers;
mod orders;
mod payments;

pub use error::set_dev_mode;

use crate::application::checkout::CheckoutService;
use crate::application::notifications::NotificationService;
use crate::application::offers::OfferService;
use crate::application::payments::PaymentService;
use axum::Router;
use axum::routing::{get, post, put};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub checkout: Arc<CheckoutService>,
    pub payments: Arc<PaymentService>,
    pub offers: Arc<OfferService>,
    pub notifications: Arc<NotificationService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/order", post(orders::create).get(orders::list))
        .route(
            "/api/order/{id}",
            get(orders::show).put(orders::update).delete(orders::cancel),
        )
        .route("/api/order/stats/overview", get(orders::stats))
        .route(
            "/api/payment/calculate-breakdown/{course_id}",
            post(payments::breakdown),
        )
        .route("/api/payment/process-payment", post(payments::process))
        .route("/api/payment", get(payments::all))
        .route("/api/payment/history/{user_id}", get(payments::history))
        .route("/api/payment/purchased/{user_id}", get(payments::purchased))
        .route("/api/payment/report", get(payments::report))
        .route("/api/payment/{id}/status", put(payments::update_status))
        .route("/api/payment/{id}", put(payments::update_details))
        .route("/api/offer", post(offers::create).get(offers::list))
        .route(
            "/api/offer/{id}",
            get(offers::show)
                .put(offers::update)
                .delete(offers::deactivate),
        )
        .route(
            "/api/notification/live-class",
            post(notifications::live_class),
        )
        .route("/api/notification/{user_id}", get(notifications::for_user))
        .route(
            "/api/notification/{id}/read",
            put(notifications::mark_read),
        )
        .with_state(state)
}
