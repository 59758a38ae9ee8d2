//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Every handler is async and every backend call is awaited, so a slow database query never blocks a worker thread.
//!
//! All routes except `/health` are mounted under `/api` and sit behind the bearer token middleware. Routes that change
//! state on someone else's behalf also take an [`AdminActor`].
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use sms_broker_engine::{
    db_types::{Actor, OperationCode, UserId, UserProfile},
    dialog::{DialogFlow, Intent},
    order_objects::{DepositQueryFilter, OrderQueryFilter},
    traits::{AccountManagement, BrokerDatabase, DepositManagement, OrderManagement},
    AccountApi,
    DepositFlowApi,
    OrderFlowApi,
};

use crate::{
    auth::AdminActor,
    data_objects::{AcceptedDeposit, DialogRequest, DialogResponse, RegisterOperatorRequest},
    errors::ServerError,
    helpers::normalize_order_code,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(order_by_code => Get "/orders/{code}" impl OrderManagement);
/// Fetches a single order. The leading `#` of the order code may be left out of the path.
pub async fn order_by_code<B: OrderManagement>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let code = normalize_order_code(path.into_inner());
    trace!("💻️ GET order {code}");
    let order = api.fetch_order(&code).await?.ok_or_else(|| ServerError::NoRecordFound(format!("Order {code}")))?;
    Ok(HttpResponse::Ok().json(order))
}

route!(orders_search => Get "/orders" impl AccountManagement);
/// Searches orders by client, operator, status, app and creation time. All filters are optional and combine with AND.
pub async fn orders_search<B: AccountManagement>(
    query: web::Query<OrderQueryFilter>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let query = query.into_inner();
    debug!("💻️ Order search: {query:?}");
    let orders = api.search_orders(query).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(cancel_order => Post "/orders/{code}/cancel" impl OrderManagement);
/// Cancels a `Pending` or `Assigned` order on behalf of an admin. Cancelling a cancelled order is a no-op.
pub async fn cancel_order<B: OrderManagement>(
    path: web::Path<String>,
    admin: AdminActor,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let code = normalize_order_code(path.into_inner());
    info!("💻️ Admin {} is cancelling order {code}", admin.0);
    let order = api.cancel_order(&code, Actor::Admin(admin.0)).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Deposits  ----------------------------------------------------
route!(deposit_by_code => Get "/deposits/{code}" impl DepositManagement);
pub async fn deposit_by_code<B: DepositManagement>(
    path: web::Path<String>,
    api: web::Data<DepositFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let code = OperationCode::from(path.into_inner());
    trace!("💻️ GET deposit {code}");
    let deposit =
        api.fetch_deposit(&code).await?.ok_or_else(|| ServerError::NoRecordFound(format!("Deposit {code}")))?;
    Ok(HttpResponse::Ok().json(deposit))
}

route!(deposits_search => Get "/deposits" impl AccountManagement);
pub async fn deposits_search<B: AccountManagement>(
    query: web::Query<DepositQueryFilter>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let query = query.into_inner();
    debug!("💻️ Deposit search: {query:?}");
    let deposits = api.search_deposits(query).await?;
    Ok(HttpResponse::Ok().json(deposits))
}

route!(accept_deposit => Post "/deposits/{code}/accept" impl DepositManagement);
/// Accepts a pending deposit and credits the client. A deposit is only ever credited once; a second attempt is a 409.
pub async fn accept_deposit<B: DepositManagement>(
    path: web::Path<String>,
    admin: AdminActor,
    api: web::Data<DepositFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let code = OperationCode::from(path.into_inner());
    info!("💻️ Admin {} is accepting deposit {code}", admin.0);
    let (deposit, client) = api.resolve_accept(&code).await?;
    Ok(HttpResponse::Ok().json(AcceptedDeposit { deposit, client }))
}

route!(reject_deposit => Post "/deposits/{code}/reject" impl DepositManagement);
pub async fn reject_deposit<B: DepositManagement>(
    path: web::Path<String>,
    admin: AdminActor,
    api: web::Data<DepositFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let code = OperationCode::from(path.into_inner());
    info!("💻️ Admin {} is rejecting deposit {code}", admin.0);
    let deposit = api.resolve_reject(&code).await?;
    Ok(HttpResponse::Ok().json(deposit))
}

//----------------------------------------------   Accounts  ----------------------------------------------------
route!(client => Get "/clients/{user_id}" impl AccountManagement);
pub async fn client<B: AccountManagement>(
    path: web::Path<UserId>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user = path.into_inner();
    let client = api.client(user).await?.ok_or_else(|| ServerError::NoRecordFound(format!("Client {user}")))?;
    Ok(HttpResponse::Ok().json(client))
}

route!(client_history => Get "/clients/{user_id}/history" impl AccountManagement);
/// The client's profile with their most recent orders and deposits, newest first.
pub async fn client_history<B: AccountManagement>(
    path: web::Path<UserId>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user = path.into_inner();
    let history = api.history(user).await?.ok_or_else(|| ServerError::NoRecordFound(format!("Client {user}")))?;
    Ok(HttpResponse::Ok().json(history))
}

route!(operator => Get "/operators/{user_id}" impl AccountManagement);
pub async fn operator<B: AccountManagement>(
    path: web::Path<UserId>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user = path.into_inner();
    let operator = api.operator(user).await?.ok_or_else(|| ServerError::NoRecordFound(format!("Operator {user}")))?;
    Ok(HttpResponse::Ok().json(operator))
}

route!(register_operator => Post "/operators" impl AccountManagement);
/// Registers an operator ahead of their first claim. Registering an existing operator returns the existing record.
pub async fn register_operator<B: AccountManagement>(
    body: web::Json<RegisterOperatorRequest>,
    admin: AdminActor,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let RegisterOperatorRequest { user_id, name } = body.into_inner();
    info!("💻️ Admin {} is registering operator {user_id}", admin.0);
    let operator = api.register_operator(&UserProfile::new(user_id, name)).await?;
    Ok(HttpResponse::Ok().json(operator))
}

//----------------------------------------------   Dialog  ----------------------------------------------------
route!(dialog => Post "/dialog" impl BrokerDatabase);
/// Inbound chat events from the transport adapter. Each request advances the user's dialog by one step and returns
/// what the user should be told.
pub async fn dialog<B: BrokerDatabase>(
    body: web::Json<DialogRequest>,
    flow: web::Data<DialogFlow<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    let user = request.profile();
    let intent = match request.intent {
        Intent::Text(text) => Intent::from_text(text),
        other => other,
    };
    trace!("💻️ Dialog event from {}: {intent:?}", user.id);
    let reply = flow.handle(&user, intent).await?;
    Ok(HttpResponse::Ok().json(DialogResponse { user_id: user.id, reply }))
}
