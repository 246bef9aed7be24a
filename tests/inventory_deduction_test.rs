use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use workshop_api::{
    db::{establish_connection_with_config, run_migrations, DbConfig},
    events::{Event, EventSender},
    pricing::{LaborInput, PartInput},
    services::{
        clients::{ClientRequest, ClientService},
        inventory::{InventoryItemRequest, InventoryService},
        orders::{OrderRequest, OrderService},
    },
};

struct Fixture {
    orders: OrderService,
    inventory: InventoryService,
    client_id: Uuid,
    events: mpsc::Receiver<Event>,
}

async fn setup() -> Fixture {
    // One connection per test so each test gets its own in-memory database.
    let db = establish_connection_with_config(&DbConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        ..Default::default()
    })
    .await
    .expect("in-memory database");
    run_migrations(&db).await.expect("migrations");
    let db = Arc::new(db);

    let (tx, events) = mpsc::channel(64);
    let orders = OrderService::new(db.clone(), EventSender::new(tx), false);
    let inventory = InventoryService::new(db.clone());
    let clients = ClientService::new(db.clone());

    let client_id = clients
        .create(ClientRequest {
            name: "Workshop Regular".to_string(),
            phone: None,
            email: None,
            document: None,
            vehicles: None,
            notes: None,
        })
        .await
        .expect("client created")
        .id;

    Fixture {
        orders,
        inventory,
        client_id,
        events,
    }
}

async fn seed_item(
    inventory: &InventoryService,
    sku: &str,
    quantity: i32,
    min_quantity: i32,
) -> Uuid {
    inventory
        .create(InventoryItemRequest {
            sku: sku.to_string(),
            description: format!("Part {}", sku),
            quantity,
            min_quantity,
            unit_price: Some(10.0),
            location: None,
            supplier: None,
        })
        .await
        .expect("item created")
        .id
}

fn order_with_part(client_id: Uuid, item_id: Option<Uuid>, quantity: i32) -> OrderRequest {
    OrderRequest {
        client_id,
        vehicle: "2011 Ford Ranger".to_string(),
        description: "Suspension work".to_string(),
        status: None,
        notes: None,
        discount: None,
        additional_fees: None,
        total: None,
        labor: vec![LaborInput {
            description: "Install".to_string(),
            hours: Some(1.0),
            rate: Some(80.0),
        }],
        parts: vec![PartInput {
            inventory_item_id: item_id,
            description: "Shock absorber".to_string(),
            quantity,
            unit_price: Some(45.0),
        }],
    }
}

#[tokio::test]
async fn creating_an_order_deducts_referenced_stock() {
    let fx = setup().await;
    let item_id = seed_item(&fx.inventory, "SA-100", 10, 2).await;

    fx.orders
        .create_order(order_with_part(fx.client_id, Some(item_id), 3))
        .await
        .expect("order created");

    let item = fx.inventory.get(item_id).await.unwrap();
    assert_eq!(item.quantity, 7);
}

#[tokio::test]
async fn deduction_clamps_at_zero() {
    let fx = setup().await;
    let item_id = seed_item(&fx.inventory, "SA-101", 5, 0).await;

    fx.orders
        .create_order(order_with_part(fx.client_id, Some(item_id), 8))
        .await
        .expect("order created");

    let item = fx.inventory.get(item_id).await.unwrap();
    assert_eq!(item.quantity, 0);
}

#[tokio::test]
async fn unmatched_reference_is_skipped_silently() {
    let fx = setup().await;
    let item_id = seed_item(&fx.inventory, "SA-102", 4, 0).await;

    // References a UUID with no inventory row behind it.
    let order = fx
        .orders
        .create_order(order_with_part(fx.client_id, Some(Uuid::new_v4()), 3))
        .await
        .expect("order still created");
    assert_eq!(order.parts[0].line_total, dec!(135.00));

    let item = fx.inventory.get(item_id).await.unwrap();
    assert_eq!(item.quantity, 4);
}

#[tokio::test]
async fn untracked_part_lines_do_not_touch_stock() {
    let fx = setup().await;
    let item_id = seed_item(&fx.inventory, "SA-103", 4, 0).await;

    fx.orders
        .create_order(order_with_part(fx.client_id, None, 3))
        .await
        .expect("order created");

    let item = fx.inventory.get(item_id).await.unwrap();
    assert_eq!(item.quantity, 4);
}

#[tokio::test]
async fn updating_an_order_deducts_for_the_new_lines() {
    let fx = setup().await;
    let item_id = seed_item(&fx.inventory, "SA-104", 10, 2).await;

    let created = fx
        .orders
        .create_order(order_with_part(fx.client_id, Some(item_id), 2))
        .await
        .unwrap();
    assert_eq!(fx.inventory.get(item_id).await.unwrap().quantity, 8);

    fx.orders
        .update_order(created.id, order_with_part(fx.client_id, Some(item_id), 1))
        .await
        .unwrap();
    assert_eq!(fx.inventory.get(item_id).await.unwrap().quantity, 7);
}

#[tokio::test]
async fn deduction_emits_stock_events_and_flags_low_stock() {
    let mut fx = setup().await;
    let item_id = seed_item(&fx.inventory, "SA-105", 6, 4).await;

    fx.orders
        .create_order(order_with_part(fx.client_id, Some(item_id), 3))
        .await
        .unwrap();

    // Order event first, then the stock events gathered in the transaction.
    assert!(matches!(
        fx.events.recv().await,
        Some(Event::OrderCreated(_))
    ));
    assert!(matches!(
        fx.events.recv().await,
        Some(Event::InventoryDeducted { old_quantity: 6, new_quantity: 3, .. })
    ));
    assert!(matches!(
        fx.events.recv().await,
        Some(Event::LowStock { quantity: 3, min_quantity: 4, .. })
    ));

    let low = fx.inventory.low_stock().await.unwrap();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].id, item_id);
}
