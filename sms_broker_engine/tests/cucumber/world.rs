use std::collections::HashMap;

use cucumber::World;
use log::*;
use sms_broker_engine::{
    db_types::{Money, OperationCode, OrderCode},
    events::EventProducers,
    order_objects::ClaimedOrder,
    AccountApi,
    DepositFlowApi,
    OrderFlowApi,
    SqliteDatabase,
};
use sqlx::{migrate::MigrateDatabase, Sqlite};

#[derive(Default, Debug, World)]
pub struct BrokerWorld {
    pub system: Option<BrokerSystem>,
    /// Scenario labels ("order A") for the codes the broker generated
    pub orders: HashMap<String, OrderCode>,
    pub deposits: HashMap<String, OperationCode>,
    pub last_claim: Option<ClaimedOrder>,
    pub last_error: Option<String>,
}

#[derive(Debug)]
pub struct BrokerSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub orders: OrderFlowApi<SqliteDatabase>,
    pub deposits: DepositFlowApi<SqliteDatabase>,
    pub accounts: AccountApi<SqliteDatabase>,
    pub base_price: Money,
}

impl BrokerWorld {
    pub fn system(&self) -> &BrokerSystem {
        self.system.as_ref().expect("Broker not initialised")
    }

    pub fn order_code(&self, label: &str) -> OrderCode {
        self.orders.get(label).cloned().unwrap_or_else(|| panic!("No order labelled {label}"))
    }

    pub fn operation_code(&self, label: &str) -> OperationCode {
        self.deposits.get(label).cloned().unwrap_or_else(|| panic!("No deposit labelled {label}"))
    }

    /// Remembers the outcome of a request so that later steps can check whether it was refused.
    pub fn record<T, E: std::fmt::Display>(&mut self, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(v) => {
                self.last_error = None;
                Some(v)
            },
            Err(e) => {
                debug!("🚀️ Request refused: {e}");
                self.last_error = Some(e.to_string());
                None
            },
        }
    }
}

impl BrokerSystem {
    pub async fn new() -> Self {
        let url = format!(
            "sqlite://{}",
            std::env::temp_dir().join(format!("smsb_cucumber_{}.db", rand::random::<u64>())).display()
        );
        Sqlite::create_database(&url).await.expect("Error creating database");
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
        db.run_migrations().await.expect("Error running migrations");
        debug!("🚀️ Created database: {url}");
        let producers = EventProducers::default();
        Self {
            db_path: url,
            orders: OrderFlowApi::new(db.clone(), producers.clone()),
            deposits: DepositFlowApi::new(db.clone(), producers),
            accounts: AccountApi::new(db.clone()),
            db,
            base_price: Money::from_units(10),
        }
    }
}
