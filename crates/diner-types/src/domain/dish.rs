use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dish {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
}

/// A dish that has not been stored yet and so has no id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewDish {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
}

impl NewDish {
    pub fn new(
        name: String,
        description: Option<String>,
        price: f64,
        category: String,
    ) -> anyhow::Result<Self> {
        let dish = Self {
            name,
            description,
            price,
            category,
        };
        dish.validate()?;
        Ok(dish)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("name empty");
        }
        if self.category.trim().is_empty() {
            anyhow::bail!("category empty");
        }
        if !self.price.is_finite() || self.price < 0.0 {
            anyhow::bail!("price must be a non-negative number");
        }
        Ok(())
    }

    pub fn into_dish(self, id: i64) -> Dish {
        Dish {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            category: self.category,
        }
    }
}
