use std::collections::BTreeSet;

use async_trait::async_trait;

use super::RepoError;
use crate::domain::dish::{Dish, NewDish};

#[async_trait]
pub trait DishRepository: Send + Sync + 'static {
    async fn create_dish(&self, dish: NewDish) -> Result<Dish, RepoError>;
    async fn list_dishes(&self) -> Result<Vec<Dish>, RepoError>;
    /// Returns the subset of `ids` that exist, ordered by id.
    async fn find_dishes(&self, ids: &BTreeSet<i64>) -> Result<Vec<Dish>, RepoError>;
    /// Fails with [`RepoError::Conflict`] while any order references the dish.
    async fn delete_dish(&self, id: i64) -> Result<Option<Dish>, RepoError>;
}
