use async_trait::async_trait;

use super::RepoError;
use crate::domain::order::{NewOrder, Order, OrderStatus};

#[async_trait]
pub trait OrderRepository: Send + Sync + 'static {
    /// Stores the order together with its dish links, or nothing at all.
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepoError>;
    async fn get_order(&self, id: i64) -> Result<Option<Order>, RepoError>;
    async fn list_orders(&self) -> Result<Vec<Order>, RepoError>;
    /// Sets the status only while the stored one is still `from`.
    /// `None` means the order is gone or was moved by someone else.
    async fn update_status(
        &self,
        id: i64,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, RepoError>;
    /// Removes the order only while its stored status equals `expected`.
    async fn delete_order(&self, id: i64, expected: OrderStatus) -> Result<bool, RepoError>;
}
