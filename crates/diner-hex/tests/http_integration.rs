use diner_hex::application::dish_service::DishService;
use diner_hex::application::order_service::OrderService;
use diner_hex::inbound::http::{
    CreateOrderRequest, HttpServer, HttpServerConfig, UpdateStatusRequest,
};
use diner_repo::memory::InMemoryRepo;
use diner_types::domain::dish::{Dish, NewDish};
use diner_types::domain::order::{Order, OrderStatus};
use serde::Deserialize;

fn find_free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

async fn spawn_server() -> (String, tokio::task::JoinHandle<()>) {
    let port = find_free_port();
    let config = HttpServerConfig {
        port: port.to_string(),
    };
    let repo = InMemoryRepo::new();
    let server = HttpServer::new(
        DishService::new(repo.clone()),
        OrderService::new(repo.clone(), repo),
        config,
    )
    .await
    .unwrap();

    let handle = tokio::spawn(async move {
        server.run().await.expect("server run");
    });
    // Give the server a moment to start.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    (format!("http://127.0.0.1:{}", port), handle)
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct OrderWithIds {
    id: i64,
    status: OrderStatus,
    dish_ids: Vec<i64>,
}

async fn post_dish(client: &reqwest::Client, addr: &str, name: &str) -> Dish {
    let res = client
        .post(format!("{}/dishes", addr))
        .json(&NewDish {
            name: name.into(),
            description: Some("house special".into()),
            price: 9.5,
            category: "Mains".into(),
        })
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn dish_and_order_lifecycle_over_http() {
    let (addr, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    let a = post_dish(&client, &addr, "Pasta").await;
    let b = post_dish(&client, &addr, "Pizza").await;
    let dishes: Vec<Dish> = client
        .get(format!("{}/dishes", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(dishes.len(), 2);

    let res = client
        .post(format!("{}/orders", addr))
        .json(&CreateOrderRequest {
            customer_name: "HttpUser".into(),
            dish_ids: vec![b.id, a.id],
        })
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    let created: OrderWithIds = res.json().await.unwrap();
    assert_eq!(created.status, OrderStatus::InProcessing);
    assert_eq!(created.dish_ids, vec![a.id, b.id]);
    let id = created.id;

    let list: Vec<Order> = client
        .get(format!("{}/orders", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, id);
    assert_eq!(list[0].dishes, vec![a.clone(), b.clone()]);

    let res = client
        .patch(format!("{}/orders/{}/status", addr, id))
        .json(&UpdateStatusRequest {
            status: "PREPARING".into(),
        })
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let updated: Order = res.json().await.unwrap();
    assert_eq!(updated.status, OrderStatus::Preparing);

    let res = client
        .delete(format!("{}/orders/{}", addr, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CONFLICT);

    let res = client
        .delete(format!("{}/dishes/{}", addr, a.id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CONFLICT);

    let fetched: Order = client
        .get(format!("{}/orders/{}", addr, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched.status, OrderStatus::Preparing);

    handle.abort();
}

#[tokio::test]
async fn cancel_returns_the_removed_order() {
    let (addr, handle) = spawn_server().await;
    let client = reqwest::Client::new();
    let dish = post_dish(&client, &addr, "Soup").await;

    let created: Order = client
        .post(format!("{}/orders", addr))
        .json(&CreateOrderRequest {
            customer_name: "Quitter".into(),
            dish_ids: vec![dish.id],
        })
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let res = client
        .delete(format!("{}/orders/{}", addr, created.id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let cancelled: Order = res.json().await.unwrap();
    assert_eq!(cancelled.id, created.id);
    assert_eq!(cancelled.status, OrderStatus::InProcessing);

    let res = client
        .get(format!("{}/orders/{}", addr, created.id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);

    let res = client
        .delete(format!("{}/dishes/{}", addr, dish.id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);

    handle.abort();
}

#[tokio::test]
async fn bad_request_and_not_found_paths() {
    let (addr, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/orders", addr))
        .json(&CreateOrderRequest {
            customer_name: "Nobody".into(),
            dish_ids: vec![41, 42],
        })
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: ErrorBody = res.json().await.unwrap();
    assert!(!body.error.is_empty());

    let res = client
        .post(format!("{}/dishes", addr))
        .json(&NewDish {
            name: "".into(),
            description: None,
            price: 1.0,
            category: "Mains".into(),
        })
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);

    let res = client
        .get(format!("{}/orders/not-a-number", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);

    let res = client
        .get(format!("{}/orders/12345", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);

    let res = client
        .delete(format!("{}/dishes/12345", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);

    let dish = post_dish(&client, &addr, "Tea").await;
    let created: Order = client
        .post(format!("{}/orders", addr))
        .json(&CreateOrderRequest {
            customer_name: "Picky".into(),
            dish_ids: vec![dish.id],
        })
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let res = client
        .patch(format!("{}/orders/{}/status", addr, created.id))
        .json(&UpdateStatusRequest {
            status: "unknown".into(),
        })
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);

    let res = client
        .patch(format!("{}/orders/{}/status", addr, created.id))
        .json(&UpdateStatusRequest {
            status: "COMPLETED".into(),
        })
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CONFLICT);

    let health = client
        .get(format!("{}/health", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(health.status(), reqwest::StatusCode::OK);

    handle.abort();
}
