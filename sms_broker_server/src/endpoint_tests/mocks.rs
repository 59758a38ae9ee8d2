use mockall::mock;
use sms_broker_engine::{
    db_types::{Client, Deposit, Operator, Order, UserId, UserProfile},
    order_objects::{DepositQueryFilter, OrderQueryFilter},
    traits::{AccountApiError, AccountManagement},
};

mock! {
    pub AccountManager {}
    impl AccountManagement for AccountManager {
        async fn fetch_or_create_client(&self, user: &UserProfile) -> Result<Client, AccountApiError>;
        async fn fetch_client(&self, user: UserId) -> Result<Option<Client>, AccountApiError>;
        async fn fetch_operator(&self, user: UserId) -> Result<Option<Operator>, AccountApiError>;
        async fn register_operator(&self, user: &UserProfile) -> Result<Operator, AccountApiError>;
        async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, AccountApiError>;
        async fn search_deposits(&self, query: DepositQueryFilter) -> Result<Vec<Deposit>, AccountApiError>;
    }
}
