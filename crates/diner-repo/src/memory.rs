use async_trait::async_trait;
use dashmap::DashMap;
use diner_types::domain::dish::{Dish, NewDish};
use diner_types::domain::order::{NewOrder, Order, OrderStatus};
use diner_types::ports::dish_repository::DishRepository;
use diner_types::ports::order_repository::OrderRepository;
use diner_types::ports::RepoError;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Dishes and orders kept in process memory. Clones share the same maps.
#[derive(Clone)]
pub struct InMemoryRepo {
    dishes: Arc<DashMap<i64, Dish>>,
    orders: Arc<DashMap<i64, Order>>,
    next_dish_id: Arc<AtomicI64>,
    next_order_id: Arc<AtomicI64>,
    /// Held while an order's dish links are checked and written, and while a
    /// dish is checked for links and removed.
    links: Arc<Mutex<()>>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self {
            dishes: Arc::new(DashMap::new()),
            orders: Arc::new(DashMap::new()),
            next_dish_id: Arc::new(AtomicI64::new(1)),
            next_order_id: Arc::new(AtomicI64::new(1)),
            links: Arc::new(Mutex::new(())),
        }
    }
}

impl Default for InMemoryRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DishRepository for InMemoryRepo {
    async fn create_dish(&self, dish: NewDish) -> Result<Dish, RepoError> {
        let id = self.next_dish_id.fetch_add(1, Ordering::SeqCst);
        let dish = dish.into_dish(id);
        self.dishes.insert(id, dish.clone());
        Ok(dish)
    }

    async fn list_dishes(&self) -> Result<Vec<Dish>, RepoError> {
        let mut all: Vec<Dish> = self.dishes.iter().map(|kv| kv.value().clone()).collect();
        all.sort_by_key(|d| d.id);
        Ok(all)
    }

    async fn find_dishes(&self, ids: &BTreeSet<i64>) -> Result<Vec<Dish>, RepoError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.dishes.get(id).map(|r| r.clone()))
            .collect())
    }

    async fn delete_dish(&self, id: i64) -> Result<Option<Dish>, RepoError> {
        let _links = self.links.lock().await;
        if self.orders.iter().any(|kv| kv.value().references_dish(id)) {
            return Err(RepoError::Conflict(format!(
                "dish {id} is referenced by an existing order"
            )));
        }
        Ok(self.dishes.remove(&id).map(|(_, dish)| dish))
    }
}

#[async_trait]
impl OrderRepository for InMemoryRepo {
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepoError> {
        let _links = self.links.lock().await;
        if let Some(missing) = order
            .dishes
            .iter()
            .find(|d| !self.dishes.contains_key(&d.id))
        {
            return Err(RepoError::Conflict(format!("dish {} does not exist", missing.id)));
        }
        let id = self.next_order_id.fetch_add(1, Ordering::SeqCst);
        let order = order.into_order(id);
        self.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>, RepoError> {
        Ok(self.orders.get(&id).map(|r| r.clone()))
    }

    async fn list_orders(&self) -> Result<Vec<Order>, RepoError> {
        let mut all: Vec<Order> = self.orders.iter().map(|kv| kv.value().clone()).collect();
        all.sort_by_key(|o| o.id);
        Ok(all)
    }

    async fn update_status(
        &self,
        id: i64,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, RepoError> {
        // The entry guard holds the shard lock, so compare and set happen together.
        if let Some(mut v) = self.orders.get_mut(&id) {
            if v.status == from {
                v.status = to;
                return Ok(Some(v.clone()));
            }
        }
        Ok(None)
    }

    async fn delete_order(&self, id: i64, expected: OrderStatus) -> Result<bool, RepoError> {
        Ok(self
            .orders
            .remove_if(&id, |_, order| order.status == expected)
            .is_some())
    }
}
