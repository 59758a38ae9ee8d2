use std::env;

use chrono::Duration;
use log::*;
use sms_broker_engine::{
    db_types::{Money, UserId},
    session::DEFAULT_IDLE_TIMEOUT_MINUTES,
};
use smsb_common::{parse_boolean_flag, parse_id_list, Secret};

const DEFAULT_SMSB_HOST: &str = "127.0.0.1";
const DEFAULT_SMSB_PORT: u16 = 8370;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/sms_broker.db";
const DEFAULT_PRICE_PER_SMS: Money = Money::from_units(10);
const DEFAULT_OPERATOR_PAYOUT: Money = Money::from_units(8);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Bearer token required on every `/api` route. An empty token locks the API.
    pub api_token: Secret<String>,
    /// Users allowed to cancel assigned orders and to resolve deposits.
    pub admin_ids: Vec<UserId>,
    /// Chat where new orders are announced to operators
    pub orders_channel_id: Option<i64>,
    /// Chat where staff review deposit receipts
    pub deposits_channel_id: Option<i64>,
    /// Base price of one SMS code, before bulk discounts
    pub price_per_sms: Money,
    /// What an operator earns per delivered code. Informational only; shown with each new order.
    pub operator_payout: Money,
    /// How long a dialog may sit idle before it is forgotten.
    pub session_idle_timeout: Duration,
    pub run_migrations: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SMSB_HOST.to_string(),
            port: DEFAULT_SMSB_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            api_token: Secret::default(),
            admin_ids: Vec::new(),
            orders_channel_id: None,
            deposits_channel_id: None,
            price_per_sms: DEFAULT_PRICE_PER_SMS,
            operator_payout: DEFAULT_OPERATOR_PAYOUT,
            session_idle_timeout: Duration::minutes(DEFAULT_IDLE_TIMEOUT_MINUTES),
            run_migrations: true,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SMSB_HOST").ok().unwrap_or_else(|| DEFAULT_SMSB_HOST.into());
        let port = env::var("SMSB_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SMSB_PORT. {e} Using the default, {DEFAULT_SMSB_PORT}, instead."
                    );
                    DEFAULT_SMSB_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SMSB_PORT);
        let database_url = env::var("SMSB_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ SMSB_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let api_token = Secret::new(env::var("SMSB_API_TOKEN").unwrap_or_default());
        if api_token.is_empty() {
            warn!("🚨️ SMSB_API_TOKEN is not set. Every request to the admin API will be refused.");
        }
        let admin_ids = configure_admin_ids();
        let orders_channel_id = channel_id("SMSB_ORDERS_CHANNEL_ID");
        let deposits_channel_id = channel_id("SMSB_DEPOSITS_CHANNEL_ID");
        let price_per_sms = money_or_default("SMSB_PRICE_PER_SMS", DEFAULT_PRICE_PER_SMS);
        let operator_payout = money_or_default("SMSB_OPERATOR_PAYOUT_PER_CODE", DEFAULT_OPERATOR_PAYOUT);
        let session_idle_timeout = configure_idle_timeout();
        let run_migrations = parse_boolean_flag(env::var("SMSB_RUN_MIGRATIONS").ok(), true);
        Self {
            host,
            port,
            database_url,
            api_token,
            admin_ids,
            orders_channel_id,
            deposits_channel_id,
            price_per_sms,
            operator_payout,
            session_idle_timeout,
            run_migrations,
        }
    }
}

fn configure_admin_ids() -> Vec<UserId> {
    let Ok(value) = env::var("SMSB_ADMIN_IDS") else {
        warn!("🪛️ SMSB_ADMIN_IDS is not set. Nobody will be able to resolve deposits or cancel assigned orders.");
        return Vec::new();
    };
    let ids = parse_id_list(&value).unwrap_or_else(|invalid| {
        warn!("🪛️ Ignoring invalid entries in SMSB_ADMIN_IDS: {}", invalid.join(", "));
        value.split(',').filter_map(|s| s.trim().parse::<i64>().ok()).collect()
    });
    info!("🪛️ {} admin(s) configured", ids.len());
    ids.into_iter().map(UserId::from).collect()
}

fn channel_id(var: &str) -> Option<i64> {
    match env::var(var) {
        Ok(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| warn!("🪛️ Invalid configuration value for {var}. {e}"))
            .ok(),
        Err(_) => {
            info!("🪛️ {var} is not set. Notices for that channel will be dropped.");
            None
        },
    }
}

fn money_or_default(var: &str, default: Money) -> Money {
    env::var(var)
        .map_err(|_| info!("🪛️ {var} is not set. Using the default value of {default}."))
        .and_then(|s| {
            s.parse::<Money>()
                .map_err(|e| warn!("🪛️ Invalid configuration value for {var}. {e}. Using {default} instead."))
        })
        .and_then(|m| {
            if m.is_negative() {
                warn!("🪛️ {var} cannot be negative. Using {default} instead.");
                Err(())
            } else {
                Ok(m)
            }
        })
        .unwrap_or(default)
}

fn configure_idle_timeout() -> Duration {
    let default = Duration::minutes(DEFAULT_IDLE_TIMEOUT_MINUTES);
    env::var("SMSB_SESSION_IDLE_TIMEOUT")
        .map_err(|_| {
            info!(
                "🪛️ SMSB_SESSION_IDLE_TIMEOUT is not set. Using the default value of {DEFAULT_IDLE_TIMEOUT_MINUTES} \
                 minutes."
            )
        })
        .and_then(|s| {
            s.parse::<i64>()
                .ok()
                .filter(|m| *m > 0)
                .map(Duration::minutes)
                .ok_or_else(|| warn!("🪛️ Invalid configuration value for SMSB_SESSION_IDLE_TIMEOUT: {s}"))
        })
        .unwrap_or(default)
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// The part of the configuration that request handlers need. Secrets stay out of it.
#[derive(Clone, Debug)]
pub struct ServerOptions {
    pub admin_ids: Vec<UserId>,
    pub price_per_sms: Money,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { admin_ids: config.admin_ids.clone(), price_per_sms: config.price_per_sms }
    }

    pub fn is_admin(&self, user: UserId) -> bool {
        self.admin_ids.contains(&user)
    }
}
