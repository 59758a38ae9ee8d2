use std::{sync::Arc, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use sms_broker_engine::{
    dialog::DialogFlow,
    events::{EventHandlers, EventProducers},
    notifier::notifier_hooks,
    pricing::PriceSchedule,
    session::SessionStore,
    AccountApi,
    DepositFlowApi,
    OrderFlowApi,
    SqliteDatabase,
};

use crate::{
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    middleware::BearerAuthFactory,
    notifier::LogNotifier,
    routes::{
        health,
        AcceptDepositRoute,
        CancelOrderRoute,
        ClientHistoryRoute,
        ClientRoute,
        DepositByCodeRoute,
        DepositsSearchRoute,
        DialogRoute,
        OperatorRoute,
        OrderByCodeRoute,
        OrdersSearchRoute,
        RegisterOperatorRoute,
        RejectDepositRoute,
    },
    session_worker::start_session_sweeper,
};

const EVENT_BUFFER_SIZE: usize = 128;
const SESSION_SWEEP_PERIOD: Duration = Duration::from_secs(60);

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.run_migrations {
        info!("🗃️ Running database migrations");
        db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    }
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, notifier_hooks(Arc::new(LogNotifier::from_config(&config))));
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let sessions = SessionStore::new(config.session_idle_timeout);
    let _sweeper = start_session_sweeper(sessions.clone(), SESSION_SWEEP_PERIOD);
    let srv = create_server_instance(config, db, producers, sessions)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
    sessions: SessionStore,
) -> Result<Server, ServerError> {
    let options = ServerOptions::from_config(&config);
    // One dialog driver for all workers, so every worker sees the same sessions
    let dialog = web::Data::new(DialogFlow::new(
        db.clone(),
        producers.clone(),
        sessions,
        PriceSchedule::new(config.price_per_sms),
        options.admin_ids.iter().copied(),
    ));
    let api_token = config.api_token.clone();
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), producers.clone());
        let deposits_api = DepositFlowApi::new(db.clone(), producers.clone());
        let accounts_api = AccountApi::new(db.clone());
        let api_scope = web::scope("/api")
            .wrap(BearerAuthFactory::new(api_token.clone()))
            .service(OrdersSearchRoute::<SqliteDatabase>::new())
            .service(OrderByCodeRoute::<SqliteDatabase>::new())
            .service(CancelOrderRoute::<SqliteDatabase>::new())
            .service(DepositsSearchRoute::<SqliteDatabase>::new())
            .service(DepositByCodeRoute::<SqliteDatabase>::new())
            .service(AcceptDepositRoute::<SqliteDatabase>::new())
            .service(RejectDepositRoute::<SqliteDatabase>::new())
            .service(ClientRoute::<SqliteDatabase>::new())
            .service(ClientHistoryRoute::<SqliteDatabase>::new())
            .service(OperatorRoute::<SqliteDatabase>::new())
            .service(RegisterOperatorRoute::<SqliteDatabase>::new())
            .service(DialogRoute::<SqliteDatabase>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("smsb::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(deposits_api))
            .app_data(web::Data::new(accounts_api))
            .app_data(web::Data::new(options.clone()))
            .app_data(dialog.clone())
            .service(health)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
