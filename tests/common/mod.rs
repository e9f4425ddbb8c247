#![allow(dead_code)]

use chrono::{Duration, Utc};
use ragamart::application::checkout::CheckoutService;
use ragamart::application::notifications::NotificationService;
use ragamart::application::offers::OfferService;
use ragamart::application::payments::PaymentService;
use ragamart::domain::catalog::{Course, Instrument};
use ragamart::domain::money::Money;
use ragamart::domain::offer::{DiscountRule, Offer};
use ragamart::domain::payment::PaymentDetails;
use ragamart::domain::ports::PushGatewayRef;
use ragamart::infrastructure::in_memory::{
    InMemoryCourseStore, InMemoryCustomerDirectory, InMemoryInstrumentStore,
    InMemoryNotificationStore, InMemoryOfferStore, InMemoryOrderStore, InMemoryPaymentStore,
};
use ragamart::infrastructure::push::LogPushGateway;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// Every store plus the services wired over them, all in-memory.
pub struct World {
    pub offers: Arc<InMemoryOfferStore>,
    pub instruments: Arc<InMemoryInstrumentStore>,
    pub courses: Arc<InMemoryCourseStore>,
    pub orders: Arc<InMemoryOrderStore>,
    pub payments: Arc<InMemoryPaymentStore>,
    pub notifications: Arc<InMemoryNotificationStore>,
    pub customers: Arc<InMemoryCustomerDirectory>,
    pub checkout: CheckoutService,
    pub payment_service: PaymentService,
    pub offer_service: OfferService,
    pub notification_service: NotificationService,
}

pub fn world() -> World {
    world_with_gateway(Arc::new(LogPushGateway))
}

pub fn world_with_gateway(gateway: PushGatewayRef) -> World {
    let offers = Arc::new(InMemoryOfferStore::new());
    let instruments = Arc::new(InMemoryInstrumentStore::new());
    let courses = Arc::new(InMemoryCourseStore::new());
    let orders = Arc::new(InMemoryOrderStore::new());
    let payments = Arc::new(InMemoryPaymentStore::new());
    let notifications = Arc::new(InMemoryNotificationStore::new());
    let customers = Arc::new(InMemoryCustomerDirectory::new());

    World {
        checkout: CheckoutService::new(
            orders.clone(),
            instruments.clone(),
            customers.clone(),
        ),
        payment_service: PaymentService::new(payments.clone(), courses.clone(), offers.clone()),
        offer_service: OfferService::new(offers.clone()),
        notification_service: NotificationService::new(
            notifications.clone(),
            customers.clone(),
            gateway,
        ),
        offers,
        instruments,
        courses,
        orders,
        payments,
        notifications,
        customers,
    }
}

pub fn money(value: i64) -> Money {
    Money::new(Decimal::from(value))
}

/// Instrument with flat per-line delivery fee and no other line charges.
pub fn instrument(name: &str, price: i64, delivery_fee: i64) -> Instrument {
    Instrument {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: format!("{name} description"),
        image: None,
        category: "Strings".to_string(),
        subcategory: None,
        price: money(price),
        gst: Money::ZERO,
        tax: Money::ZERO,
        delivery_fee: money(delivery_fee),
        discount: Money::ZERO,
        in_stock: true,
        is_active: true,
    }
}

pub fn course(name: &str, price: i64) -> Course {
    Course {
        id: Uuid::new_v4(),
        name: name.to_string(),
        price: money(price),
        instructor: Some("Asha Rao".to_string()),
        image: None,
    }
}

/// Active percentage offer valid for a day either side of now.
pub fn percent_offer(code: &str, pct: i64, usage_limit: Option<u32>) -> Offer {
    let now = Utc::now();
    Offer::new(
        code,
        DiscountRule::Percentage(Decimal::from(pct)),
        now - Duration::days(1),
        now + Duration::days(1),
        usage_limit,
    )
}

pub fn card_details() -> PaymentDetails {
    PaymentDetails {
        card_number: Some("4111 1111 1111 1234".to_string()),
        card_holder_name: Some("R. Iyer".to_string()),
        expiry_month: Some("04".to_string()),
        expiry_year: Some("2029".to_string()),
        cvv: Some("123".to_string()),
        ..PaymentDetails::default()
    }
}

pub fn upi_details() -> PaymentDetails {
    PaymentDetails {
        upi_id: Some("riyer@okbank".to_string()),
        ..PaymentDetails::default()
    }
}
