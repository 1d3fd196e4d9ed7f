use crate::errors::AppError;
use diner_types::domain::order::{LifecycleError, NewOrder, Order, OrderStatus};
use diner_types::ports::dish_repository::DishRepository;
use diner_types::ports::order_repository::OrderRepository;
use diner_types::ports::RepoError;
use std::collections::BTreeSet;

/// Owns the order lifecycle: creation against the dish catalog, cancellation
/// while still `IN_PROCESSING`, and one-step-forward status changes.
///
/// Writes are compare-and-set on the stored status, so two requests racing on
/// the same order cannot both succeed from the same starting status.
pub struct OrderService<O: OrderRepository, D: DishRepository> {
    orders: O,
    dishes: D,
}

impl<O: OrderRepository, D: DishRepository> OrderService<O, D> {
    pub fn new(orders: O, dishes: D) -> Self {
        Self { orders, dishes }
    }

    /// Creates an order in `IN_PROCESSING` for the given dishes.
    ///
    /// `dish_ids` is treated as a set: repeated ids collapse to one link, so
    /// `[1, 1]` orders dish 1 once. Fails with `InvalidReference` if any id
    /// is unknown, without saying which.
    pub async fn create_order(
        &self,
        customer_name: String,
        dish_ids: Vec<i64>,
    ) -> Result<Order, AppError> {
        let requested: BTreeSet<i64> = dish_ids.into_iter().collect();
        let dishes = self.dishes.find_dishes(&requested).await?;
        if dishes.len() != requested.len() {
            tracing::warn!(
                requested = requested.len(),
                found = dishes.len(),
                "order references unknown dishes"
            );
            return Err(AppError::InvalidReference(
                "some dishes were not found".into(),
            ));
        }

        let order =
            NewOrder::new(customer_name, dishes).map_err(|e| AppError::BadRequest(e.to_string()))?;
        let order = self.orders.create_order(order).await.map_err(|e| match e {
            RepoError::Conflict(m) => AppError::InvalidReference(m),
            other => other.into(),
        })?;
        tracing::info!(order_id = order.id, dishes = order.dishes.len(), "order created");
        Ok(order)
    }

    pub async fn get_order(&self, id: i64) -> Result<Order, AppError> {
        match self.orders.get_order(id).await? {
            Some(o) => Ok(o),
            None => Err(AppError::NotFound(format!("order {}", id))),
        }
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>, AppError> {
        Ok(self.orders.list_orders().await?)
    }

    /// Removes an order that has not started processing and returns it as it
    /// was just before removal.
    pub async fn cancel_order(&self, id: i64) -> Result<Order, AppError> {
        let order = self.get_order(id).await?;
        if let Err(e) = order.ensure_cancellable() {
            tracing::warn!(order_id = id, status = %order.status, "cancel rejected");
            return Err(e.into());
        }

        if self.orders.delete_order(id, OrderStatus::InProcessing).await? {
            tracing::info!(order_id = id, "order cancelled");
            return Ok(order);
        }

        // Moved on or removed since it was read.
        let current = self.get_order(id).await?;
        tracing::warn!(order_id = id, status = %current.status, "cancel lost a race");
        Err(LifecycleError::NotCancellable(current.status).into())
    }

    pub async fn update_status(&self, id: i64, requested: &str) -> Result<Order, AppError> {
        let order = self.get_order(id).await?;
        let requested: OrderStatus = requested.parse()?;
        let next = order.status.advance(requested).map_err(|e| {
            tracing::warn!(order_id = id, from = %order.status, to = %requested, "transition rejected");
            e
        })?;

        if let Some(updated) = self.orders.update_status(id, order.status, next).await? {
            tracing::info!(order_id = id, from = %order.status, to = %next, "order status advanced");
            return Ok(updated);
        }

        let current = self.get_order(id).await?;
        tracing::warn!(order_id = id, status = %current.status, "status update lost a race");
        // A lost compare-and-set means the status already moved past `order.status`.
        Err(LifecycleError::InvalidTransition {
            from: current.status,
            to: requested,
        }
        .into())
    }
}
