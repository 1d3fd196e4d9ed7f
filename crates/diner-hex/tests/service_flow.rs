use diner_hex::application::dish_service::DishService;
use diner_hex::application::order_service::OrderService;
use diner_hex::errors::AppError;
use diner_repo::memory::InMemoryRepo;
use diner_types::domain::dish::NewDish;
use diner_types::domain::order::OrderStatus;
use std::collections::BTreeSet;

fn new_dish(name: &str, price: f64) -> NewDish {
    NewDish {
        name: name.into(),
        description: None,
        price,
        category: "Mains".into(),
    }
}

// End-to-end lifecycle against the in-memory adapter.
#[tokio::test]
async fn create_advance_cancel_complete_flow() {
    let repo = InMemoryRepo::new();
    let dishes = DishService::new(repo.clone());
    let orders = OrderService::new(repo.clone(), repo.clone());

    let a = dishes.create_dish(new_dish("A", 3.0)).await.unwrap();
    let b = dishes.create_dish(new_dish("B", 4.0)).await.unwrap();
    assert_eq!((a.id, b.id), (1, 2));

    let order = orders.create_order("X".into(), vec![1, 2]).await.unwrap();
    assert_eq!(order.status, OrderStatus::InProcessing);

    let list = orders.list_orders().await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].dish_ids(), BTreeSet::from([1, 2]));
    assert_eq!(list[0].status, OrderStatus::InProcessing);

    let o = orders.update_status(order.id, "PREPARING").await.unwrap();
    assert_eq!(o.status, OrderStatus::Preparing);
    let o = orders.update_status(order.id, "DELIVERING").await.unwrap();
    assert_eq!(o.status, OrderStatus::Delivering);

    let cancel = orders.cancel_order(order.id).await;
    assert!(matches!(cancel, Err(AppError::InvalidState(_))));

    let o = orders.update_status(order.id, "COMPLETED").await.unwrap();
    assert_eq!(o.status, OrderStatus::Completed);

    let back = orders.update_status(order.id, "PREPARING").await;
    assert!(matches!(back, Err(AppError::InvalidTransition(_))));

    // Still referenced, so the catalog refuses to drop it.
    let res = dishes.delete_dish(a.id).await;
    assert!(matches!(res, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn missing_dish_rejects_the_whole_order() {
    let repo = InMemoryRepo::new();
    let dishes = DishService::new(repo.clone());
    let orders = OrderService::new(repo.clone(), repo.clone());

    let a = dishes.create_dish(new_dish("A", 3.0)).await.unwrap();
    let res = orders.create_order("Y".into(), vec![a.id, a.id + 100]).await;
    assert!(matches!(res, Err(AppError::InvalidReference(_))));
    assert!(orders.list_orders().await.unwrap().is_empty());

    // Once nothing references it the dish can go.
    let removed = dishes.delete_dish(a.id).await.unwrap();
    assert_eq!(removed.id, a.id);
}
