///  To run :
///  cargo r --example client_example
use diner_client::{CreateOrderRequest, MenuClient};
use diner_hex::application::dish_service::DishService;
use diner_hex::application::order_service::OrderService;
use diner_hex::inbound::http::{HttpServer, HttpServerConfig};
use diner_repo::build_repo;
use diner_types::domain::dish::NewDish;
use diner_types::domain::order::OrderStatus;
use reqwest::StatusCode;
use tempfile::tempdir;

fn find_free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

fn http_status(err: &anyhow::Error) -> Option<StatusCode> {
    err.downcast_ref::<reqwest::Error>().and_then(|e| e.status())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let port = find_free_port();
    let addr = format!("http://127.0.0.1:{port}/");

    // Use a temp file-backed SQLite DB so multiple connections see the same data.
    let tmp = tempdir()?;
    let db_path = tmp.path().join("diner.db");
    let db_url = format!("sqlite://{}", db_path.display());

    let repo = build_repo(Some(&db_url)).await?;
    let server = HttpServer::new(
        DishService::new(repo.clone()),
        OrderService::new(repo.clone(), repo),
        HttpServerConfig {
            port: port.to_string(),
        },
    )
    .await?;

    let handle = tokio::spawn(async move {
        server.run().await.expect("server run");
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let client = MenuClient::new(&addr)?;
    let mut ids = Vec::new();
    for (name, price) in [("Borscht", 6.5), ("Pelmeni", 9.0)] {
        let dish = client
            .create_dish(&NewDish {
                name: name.into(),
                description: None,
                price,
                category: "Mains".into(),
            })
            .await?;
        println!("Created dish id={} name={}", dish.id, dish.name);
        ids.push(dish.id);
    }

    let order = client
        .create_order(CreateOrderRequest {
            customer_name: "Example".into(),
            dish_ids: ids.clone(),
        })
        .await?;
    println!("Created order id={} status={}", order.id, order.status);
    assert_eq!(order.status, OrderStatus::InProcessing);

    for next in [OrderStatus::Preparing, OrderStatus::Delivering] {
        let updated = client.advance(order.id, next).await?;
        println!("Advanced order {} to {}", updated.id, updated.status);
    }

    let err = client
        .cancel_order(order.id)
        .await
        .expect_err("delivering orders cannot be cancelled");
    println!("Cancel refused with {:?}", http_status(&err));
    assert_eq!(http_status(&err), Some(StatusCode::CONFLICT));

    let done = client.advance(order.id, OrderStatus::Completed).await?;
    println!("Order {} is {}", done.id, done.status);

    let err = client
        .advance(order.id, OrderStatus::Preparing)
        .await
        .expect_err("completed orders do not move back");
    println!("Backward move refused with {:?}", http_status(&err));

    let second = client
        .create_order(CreateOrderRequest {
            customer_name: "Example2".into(),
            dish_ids: vec![ids[0]],
        })
        .await?;
    let cancelled = client.cancel_order(second.id).await?;
    println!("Cancelled order id={} (was {})", cancelled.id, cancelled.status);

    handle.abort();
    Ok(())
}
