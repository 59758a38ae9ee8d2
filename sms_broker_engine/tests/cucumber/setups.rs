use cucumber::given;
use sms_broker_engine::db_types::Money;

use crate::cucumber::{BrokerSystem, BrokerWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut BrokerWorld) {
    let system = BrokerSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "the base price is {word}")]
async fn base_price(world: &mut BrokerWorld, price: String) {
    let price = price.parse::<Money>().expect("Not a valid price");
    world.system.as_mut().expect("Broker not initialised").base_price = price;
}
