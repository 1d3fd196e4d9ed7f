use crate::errors::AppError;
use diner_types::domain::dish::{Dish, NewDish};
use diner_types::ports::dish_repository::DishRepository;

/// The dish catalog: plain create, list and delete.
pub struct DishService<R: DishRepository> {
    repo: R,
}

impl<R: DishRepository> DishService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub async fn list_dishes(&self) -> Result<Vec<Dish>, AppError> {
        Ok(self.repo.list_dishes().await?)
    }

    pub async fn create_dish(&self, dish: NewDish) -> Result<Dish, AppError> {
        dish.validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        let dish = self.repo.create_dish(dish).await?;
        tracing::info!(dish_id = dish.id, name = %dish.name, "dish created");
        Ok(dish)
    }

    pub async fn delete_dish(&self, id: i64) -> Result<Dish, AppError> {
        match self.repo.delete_dish(id).await? {
            Some(dish) => {
                tracing::info!(dish_id = id, "dish deleted");
                Ok(dish)
            }
            None => Err(AppError::NotFound(format!("dish {}", id))),
        }
    }
}
