use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch},
    serve, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::application::dish_service::DishService;
use crate::application::order_service::OrderService;
use crate::errors::AppError;
use diner_types::domain::dish::{Dish, NewDish};
use diner_types::domain::order::Order;
use diner_types::ports::dish_repository::DishRepository;
use diner_types::ports::order_repository::OrderRepository;

#[derive(Clone)]
pub struct HttpServerConfig {
    pub port: String,
}

pub struct AppState<R>
where
    R: OrderRepository + DishRepository,
{
    dishes: Arc<DishService<R>>,
    orders: Arc<OrderService<R, R>>,
}

impl<R> Clone for AppState<R>
where
    R: OrderRepository + DishRepository,
{
    fn clone(&self) -> Self {
        Self {
            dishes: self.dishes.clone(),
            orders: self.orders.clone(),
        }
    }
}

#[derive(Clone)]
pub struct HttpServer<R>
where
    R: OrderRepository + DishRepository,
{
    pub state: AppState<R>,
    pub config: HttpServerConfig,
}

/// `dish_ids` is a set; duplicates are accepted and collapsed.
#[derive(Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub dish_ids: Vec<i64>,
}

/// Raw text so unknown names reach the lifecycle check instead of failing
/// JSON extraction.
#[derive(Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Serialize)]
pub struct OrderResponse {
    #[serde(flatten)]
    pub order: Order,
    pub dish_ids: Vec<i64>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        let dish_ids = order.dish_ids().into_iter().collect();
        Self { order, dish_ids }
    }
}

impl<R> HttpServer<R>
where
    R: OrderRepository + DishRepository,
{
    pub async fn new(
        dishes: DishService<R>,
        orders: OrderService<R, R>,
        config: HttpServerConfig,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            state: AppState {
                dishes: Arc::new(dishes),
                orders: Arc::new(orders),
            },
            config,
        })
    }

    pub fn router(&self) -> Router {
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                let request_id = Uuid::new_v4();
                tracing::info_span!(
                    "http_request",
                    %request_id,
                    method = %request.method(),
                    uri
                )
            })
            .on_request(
                |request: &axum::extract::Request<_>, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        method = %request.method(),
                        uri = %request.uri(),
                        "request"
                    );
                },
            )
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        status = %response.status(),
                        latency_ms = %latency.as_millis(),
                        "response"
                    );
                },
            );

        Router::new()
            .route("/health", get(health))
            .route("/dishes", get(list_dishes::<R>).post(create_dish::<R>))
            .route("/dishes/{id}", delete(delete_dish::<R>))
            .route("/orders", get(list_orders::<R>).post(create_order::<R>))
            .route(
                "/orders/{id}",
                get(get_order::<R>).delete(cancel_order::<R>),
            )
            .route("/orders/{id}/status", patch(update_status::<R>))
            .layer(trace_layer)
            .with_state(self.state.clone())
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let app = self.router();
        let addr: SocketAddr = format!("0.0.0.0:{}", self.config.port).parse()?;
        tracing::info!("starting server on {}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        serve(listener, app.into_make_service()).await?;
        Ok(())
    }
}

fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|e| AppError::BadRequest(format!("invalid id {raw:?}: {e}")))
}

async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

async fn list_dishes<R>(State(state): State<AppState<R>>) -> Result<Json<Vec<Dish>>, AppError>
where
    R: OrderRepository + DishRepository,
{
    Ok(Json(state.dishes.list_dishes().await?))
}

async fn create_dish<R>(
    State(state): State<AppState<R>>,
    Json(payload): Json<NewDish>,
) -> Result<(StatusCode, Json<Dish>), AppError>
where
    R: OrderRepository + DishRepository,
{
    let dish = state.dishes.create_dish(payload).await?;
    Ok((StatusCode::CREATED, Json(dish)))
}

async fn delete_dish<R>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Result<Json<Dish>, AppError>
where
    R: OrderRepository + DishRepository,
{
    let dish = state.dishes.delete_dish(parse_id(&id)?).await?;
    Ok(Json(dish))
}

async fn list_orders<R>(
    State(state): State<AppState<R>>,
) -> Result<Json<Vec<OrderResponse>>, AppError>
where
    R: OrderRepository + DishRepository,
{
    let list = state.orders.list_orders().await?;
    Ok(Json(list.into_iter().map(OrderResponse::from).collect()))
}

async fn create_order<R>(
    State(state): State<AppState<R>>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError>
where
    R: OrderRepository + DishRepository,
{
    let order = state
        .orders
        .create_order(payload.customer_name, payload.dish_ids)
        .await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

async fn get_order<R>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, AppError>
where
    R: OrderRepository + DishRepository,
{
    let order = state.orders.get_order(parse_id(&id)?).await?;
    Ok(Json(order.into()))
}

async fn cancel_order<R>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, AppError>
where
    R: OrderRepository + DishRepository,
{
    let order = state.orders.cancel_order(parse_id(&id)?).await?;
    Ok(Json(order.into()))
}

async fn update_status<R>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, AppError>
where
    R: OrderRepository + DishRepository,
{
    let updated = state
        .orders
        .update_status(parse_id(&id)?, &payload.status)
        .await?;
    Ok(Json(updated.into()))
}
