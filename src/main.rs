use clap::Parser;
use miette::{IntoDiagnostic, Result};
use ragamart::application::checkout::CheckoutService;
use ragamart::application::notifications::NotificationService;
use ragamart::application::offers::OfferService;
use ragamart::application::payments::PaymentService;
use ragamart::domain::ports::{
    CourseStoreRef, CustomerDirectoryRef, InstrumentStoreRef, NotificationStoreRef, OfferStoreRef,
    OrderStoreRef, PaymentStoreRef,
};
use ragamart::infrastructure::in_memory::{
    InMemoryCourseStore, InMemoryCustomerDirectory, InMemoryInstrumentStore,
    InMemoryNotificationStore, InMemoryOfferStore, InMemoryOrderStore, InMemoryPaymentStore,
};
use ragamart::infrastructure::push::LogPushGateway;
use ragamart::interfaces::http::{self, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Port to listen on
    #[arg(long, env = "RAGAMART_PORT", default_value_t = 3000)]
    port: u16,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "RAGAMART_DB")]
    db_path: Option<PathBuf>,

    /// Include error details in 500 responses
    #[arg(long, env = "RAGAMART_DEV")]
    dev: bool,
}

struct Stores {
    offers: OfferStoreRef,
    instruments: InstrumentStoreRef,
    courses: CourseStoreRef,
    orders: OrderStoreRef,
    payments: PaymentStoreRef,
    notifications: NotificationStoreRef,
}

fn in_memory_stores() -> Stores {
    Stores {
        offers: Arc::new(InMemoryOfferStore::new()),
        instruments: Arc::new(InMemoryInstrumentStore::new()),
        courses: Arc::new(InMemoryCourseStore::new()),
        orders: Arc::new(InMemoryOrderStore::new()),
        payments: Arc::new(InMemoryPaymentStore::new()),
        notifications: Arc::new(InMemoryNotificationStore::new()),
    }
}

#[cfg(feature = "storage-rocksdb")]
fn rocksdb_stores(db_path: PathBuf) -> Result<Stores> {
    let store = ragamart::infrastructure::rocksdb::RocksDbStore::open(db_path).into_diagnostic()?;
    Ok(Stores {
        offers: Arc::new(store.clone()),
        instruments: Arc::new(store.clone()),
        courses: Arc::new(store.clone()),
        orders: Arc::new(store.clone()),
        payments: Arc::new(store.clone()),
        notifications: Arc::new(store),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    http::set_dev_mode(cli.dev);

    let stores = match cli.db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(db_path) => rocksdb_stores(db_path)?,
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => miette::bail!("built without the storage-rocksdb feature; --db-path is unavailable"),
        None => in_memory_stores(),
    };

    // The customer directory mirrors an externally-managed user base; it is
    // kept in memory regardless of the storage backend.
    let customers: CustomerDirectoryRef = Arc::new(InMemoryCustomerDirectory::new());
    let gateway = Arc::new(LogPushGateway);

    let state = AppState {
        checkout: Arc::new(CheckoutService::new(
            stores.orders,
            stores.instruments,
            customers.clone(),
        )),
        payments: Arc::new(PaymentService::new(
            stores.payments,
            stores.courses,
            stores.offers.clone(),
        )),
        offers: Arc::new(OfferService::new(stores.offers)),
        notifications: Arc::new(NotificationService::new(
            stores.notifications,
            customers,
            gateway,
        )),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    let listener = tokio::net::TcpListener::bind(addr).await.into_diagnostic()?;
    info!(%addr, "listening");
    axum::serve(listener, http::router(state))
        .await
        .into_diagnostic()?;

    Ok(())
}
