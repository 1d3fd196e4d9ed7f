use std::time::Duration;

use anyhow::Context;
use diner_types::domain::dish::{Dish, NewDish};
use diner_types::domain::order::{Order, OrderStatus};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct MenuClientBuilder {
    base: Url,
    headers: HeaderMap,
    timeout: Option<Duration>,
    client: Option<reqwest::Client>,
}

/// Typed client for the dish and order HTTP API.
#[derive(Clone)]
pub struct MenuClient {
    base: Url,
    client: reqwest::Client,
}

impl MenuClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Self::builder(base_url)?.build()
    }

    pub fn builder(base_url: &str) -> anyhow::Result<MenuClientBuilder> {
        let base = Url::parse(base_url).context("invalid base url")?;
        Ok(MenuClientBuilder {
            base,
            headers: HeaderMap::new(),
            timeout: None,
            client: None,
        })
    }

    fn url(&self, path: &str) -> anyhow::Result<Url> {
        self.base.join(path).context("failed to join url")
    }

    pub async fn list_dishes(&self) -> anyhow::Result<Vec<Dish>> {
        let res = self
            .client
            .get(self.url("dishes")?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn create_dish(&self, dish: &NewDish) -> anyhow::Result<Dish> {
        let res = self
            .client
            .post(self.url("dishes")?)
            .json(dish)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn delete_dish(&self, id: i64) -> anyhow::Result<Dish> {
        let res = self
            .client
            .delete(self.url(&format!("dishes/{id}"))?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn create_order(&self, req: CreateOrderRequest) -> anyhow::Result<Order> {
        let res = self
            .client
            .post(self.url("orders")?)
            .json(&req)
            .send()
            .await?
            .error_for_status()?;
        let order: Order = res.json().await?;
        tracing::debug!(order_id = order.id, "order created");
        Ok(order)
    }

    pub async fn get_order(&self, id: i64) -> anyhow::Result<Order> {
        let res = self
            .client
            .get(self.url(&format!("orders/{id}"))?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn list_orders(&self) -> anyhow::Result<Vec<Order>> {
        let res = self
            .client
            .get(self.url("orders")?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    /// Sends the status as text; the server decides whether it is known.
    pub async fn update_status(&self, id: i64, status: &str) -> anyhow::Result<Order> {
        let res = self
            .client
            .patch(self.url(&format!("orders/{id}/status"))?)
            .json(&UpdateStatusRequest {
                status: status.to_string(),
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn advance(&self, id: i64, status: OrderStatus) -> anyhow::Result<Order> {
        self.update_status(id, status.as_str()).await
    }

    /// Returns the order as it was right before it was removed.
    pub async fn cancel_order(&self, id: i64) -> anyhow::Result<Order> {
        let res = self
            .client
            .delete(self.url(&format!("orders/{id}"))?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }
}

impl MenuClientBuilder {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(
        mut self,
        key: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> anyhow::Result<Self> {
        let header_name =
            HeaderName::from_bytes(key.as_ref().as_bytes()).context("invalid header name")?;
        let header_value = HeaderValue::from_str(value.as_ref()).context("invalid header value")?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn with_reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> anyhow::Result<MenuClient> {
        if let Some(client) = self.client {
            return Ok(MenuClient {
                base: self.base,
                client,
            });
        }

        let mut builder = reqwest::Client::builder();
        if !self.headers.is_empty() {
            builder = builder.default_headers(self.headers);
        }
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build()?;
        Ok(MenuClient {
            base: self.base,
            client,
        })
    }
}

/// Body of `POST /orders`. Repeated `dish_ids` are collapsed by the server.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub dish_ids: Vec<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct UpdateStatusRequest {
    status: String,
}
