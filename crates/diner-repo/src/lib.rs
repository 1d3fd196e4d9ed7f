#[cfg(not(any(feature = "memory", feature = "sqlite")))]
compile_error!("Enable a repo feature: `memory` or `sqlite`.");

use diner_types::domain::dish::{Dish, NewDish};
use diner_types::domain::order::{NewOrder, Order, OrderStatus};
use diner_types::ports::dish_repository::DishRepository;
use diner_types::ports::order_repository::OrderRepository;
use diner_types::ports::RepoError;
use std::collections::BTreeSet;

#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://diner.db";

// sqlite wins when both features are on.
#[cfg(feature = "sqlite")]
type Backend = sqlite::SqliteRepo;
#[cfg(all(feature = "memory", not(feature = "sqlite")))]
type Backend = memory::InMemoryRepo;

/// The storage backend picked by cargo features.
#[derive(Clone)]
pub struct Repo {
    backend: Backend,
}

pub async fn build_repo(url: Option<&str>) -> anyhow::Result<Repo> {
    Repo::build_repo(url).await
}

impl Repo {
    #[cfg(all(feature = "memory", not(feature = "sqlite")))]
    pub async fn build_repo(_: Option<&str>) -> anyhow::Result<Self> {
        tracing::info!("using in-memory repo");
        Ok(Self {
            backend: memory::InMemoryRepo::new(),
        })
    }

    #[cfg(feature = "sqlite")]
    pub async fn build_repo(database_url: Option<&str>) -> anyhow::Result<Self> {
        let url = database_url.unwrap_or(DEFAULT_DATABASE_URL);
        tracing::info!(url, "using sqlite repo");
        Ok(Self {
            backend: sqlite::SqliteRepo::new(url).await?,
        })
    }
}

#[async_trait::async_trait]
impl DishRepository for Repo {
    async fn create_dish(&self, dish: NewDish) -> Result<Dish, RepoError> {
        self.backend.create_dish(dish).await
    }

    async fn list_dishes(&self) -> Result<Vec<Dish>, RepoError> {
        self.backend.list_dishes().await
    }

    async fn find_dishes(&self, ids: &BTreeSet<i64>) -> Result<Vec<Dish>, RepoError> {
        self.backend.find_dishes(ids).await
    }

    async fn delete_dish(&self, id: i64) -> Result<Option<Dish>, RepoError> {
        self.backend.delete_dish(id).await
    }
}

#[async_trait::async_trait]
impl OrderRepository for Repo {
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepoError> {
        self.backend.create_order(order).await
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>, RepoError> {
        self.backend.get_order(id).await
    }

    async fn list_orders(&self) -> Result<Vec<Order>, RepoError> {
        self.backend.list_orders().await
    }

    async fn update_status(
        &self,
        id: i64,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, RepoError> {
        self.backend.update_status(id, from, to).await
    }

    async fn delete_order(&self, id: i64, expected: OrderStatus) -> Result<bool, RepoError> {
        self.backend.delete_order(id, expected).await
    }
}
