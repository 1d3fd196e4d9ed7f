use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::dish::Dish;

/// Variants are declared in lifecycle order; the discriminant is the position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(usize)]
pub enum OrderStatus {
    InProcessing,
    Preparing,
    Delivering,
    Completed,
}

impl OrderStatus {
    /// Every status in the order an order moves through them.
    pub const LIFECYCLE: [OrderStatus; 4] = [
        OrderStatus::InProcessing,
        OrderStatus::Preparing,
        OrderStatus::Delivering,
        OrderStatus::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::InProcessing => "IN_PROCESSING",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Delivering => "DELIVERING",
            OrderStatus::Completed => "COMPLETED",
        }
    }

    /// Index of this status in [`OrderStatus::LIFECYCLE`].
    pub fn position(self) -> usize {
        self as usize
    }

    pub fn successor(self) -> Option<OrderStatus> {
        Self::LIFECYCLE.get(self.position() + 1).copied()
    }

    pub fn is_terminal(self) -> bool {
        self.successor().is_none()
    }

    /// Checks a move to `requested`. Only the immediate successor is accepted,
    /// so staying put, going back and skipping ahead are all rejected.
    pub fn advance(self, requested: OrderStatus) -> Result<OrderStatus, LifecycleError> {
        if requested.position() == self.position() + 1 {
            Ok(requested)
        } else {
            Err(LifecycleError::InvalidTransition {
                from: self,
                to: requested,
            })
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown order status: {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::LIFECYCLE
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("order can only be cancelled while IN_PROCESSING (currently {0})")]
    NotCancellable(OrderStatus),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer_name: String,
    pub order_time: DateTime<Utc>,
    pub status: OrderStatus,
    pub dishes: Vec<Dish>,
}

impl Order {
    pub fn dish_ids(&self) -> BTreeSet<i64> {
        self.dishes.iter().map(|d| d.id).collect()
    }

    pub fn references_dish(&self, dish_id: i64) -> bool {
        self.dishes.iter().any(|d| d.id == dish_id)
    }

    pub fn ensure_cancellable(&self) -> Result<(), LifecycleError> {
        match self.status {
            OrderStatus::InProcessing => Ok(()),
            other => Err(LifecycleError::NotCancellable(other)),
        }
    }
}

/// An order whose dishes have been resolved against the catalog but which
/// has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_name: String,
    pub order_time: DateTime<Utc>,
    pub dishes: Vec<Dish>,
}

impl NewOrder {
    pub fn new(customer_name: String, mut dishes: Vec<Dish>) -> anyhow::Result<Self> {
        if customer_name.trim().is_empty() {
            anyhow::bail!("customer_name empty");
        }
        dishes.sort_by_key(|d| d.id);
        dishes.dedup_by_key(|d| d.id);
        Ok(Self {
            customer_name,
            order_time: Utc::now(),
            dishes,
        })
    }

    pub fn into_order(self, id: i64) -> Order {
        Order {
            id,
            customer_name: self.customer_name,
            order_time: self.order_time,
            status: OrderStatus::InProcessing,
            dishes: self.dishes,
        }
    }
}
