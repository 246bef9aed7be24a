use assert_matches::assert_matches;
use chrono::{Datelike, Utc};
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use workshop_api::{
    db::{establish_connection_with_config, run_migrations, DbConfig, DbPool},
    entities::{order_labor, order_part},
    errors::ServiceError,
    events::{Event, EventSender},
    pricing::{LaborInput, PartInput},
    services::{
        clients::{ClientRequest, ClientService},
        orders::{OrderListFilter, OrderRequest, OrderService},
    },
};

async fn setup() -> (Arc<DbPool>, OrderService, ClientService, mpsc::Receiver<Event>) {
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

    let (tx, rx) = mpsc::channel(64);
    let orders = OrderService::new(db.clone(), EventSender::new(tx), false);
    let clients = ClientService::new(db.clone());
    (db, orders, clients, rx)
}

async fn seed_client(clients: &ClientService, name: &str) -> Uuid {
    clients
        .create(ClientRequest {
            name: name.to_string(),
            phone: Some("555-0100".to_string()),
            email: None,
            document: None,
            vehicles: None,
            notes: None,
        })
        .await
        .expect("client created")
        .id
}

fn basic_request(client_id: Uuid) -> OrderRequest {
    OrderRequest {
        client_id,
        vehicle: "2014 Honda Civic".to_string(),
        description: "Brake service".to_string(),
        status: None,
        notes: None,
        discount: Some(5.0),
        additional_fees: None,
        total: None,
        labor: vec![LaborInput {
            description: "Replace brake pads".to_string(),
            hours: Some(2.0),
            rate: Some(100.0),
        }],
        parts: vec![PartInput {
            inventory_item_id: None,
            description: "Brake pad set".to_string(),
            quantity: 2,
            unit_price: Some(15.0),
        }],
    }
}

#[tokio::test]
async fn create_order_prices_lines_and_assigns_code() {
    let (_db, orders, clients, _rx) = setup().await;
    let client_id = seed_client(&clients, "Dana Reyes").await;

    let order = orders
        .create_order(basic_request(client_id))
        .await
        .expect("order created");

    assert_eq!(order.code, format!("OS-{}-0001", Utc::now().year()));
    assert_eq!(order.status, "open");
    assert_eq!(order.client_name.as_deref(), Some("Dana Reyes"));

    assert_eq!(order.labor.len(), 1);
    assert_eq!(order.labor[0].line_total, dec!(200.00));
    assert_eq!(order.parts.len(), 1);
    assert_eq!(order.parts[0].line_total, dec!(30.00));

    assert_eq!(order.summary.labor, dec!(200.00));
    assert_eq!(order.summary.parts, dec!(30.00));
    assert_eq!(order.summary.discount, dec!(5.00));
    assert_eq!(order.summary.additional_fees, dec!(0.00));
    assert_eq!(order.summary.total, dec!(225.00));
}

#[tokio::test]
async fn order_codes_are_sequential() {
    let (_db, orders, clients, _rx) = setup().await;
    let client_id = seed_client(&clients, "Sequential Sam").await;

    let first = orders.create_order(basic_request(client_id)).await.unwrap();
    let second = orders.create_order(basic_request(client_id)).await.unwrap();

    let year = Utc::now().year();
    assert_eq!(first.code, format!("OS-{}-0001", year));
    assert_eq!(second.code, format!("OS-{}-0002", year));
}

#[tokio::test]
async fn codes_are_not_reused_after_a_deletion() {
    let (_db, orders, clients, _rx) = setup().await;
    let client_id = seed_client(&clients, "Gap Tolerant").await;

    let first = orders.create_order(basic_request(client_id)).await.unwrap();
    let second = orders.create_order(basic_request(client_id)).await.unwrap();
    orders.delete_order(first.id).await.unwrap();

    let third = orders.create_order(basic_request(client_id)).await.unwrap();

    // The sequential continues past the highest issued code; a deletion
    // must never hand an existing live code to a new order.
    assert_eq!(third.code, format!("OS-{}-0003", Utc::now().year()));
    assert_ne!(third.code, second.code);
}

#[tokio::test]
async fn create_rejects_unknown_client() {
    let (_db, orders, _clients, _rx) = setup().await;

    let result = orders.create_order(basic_request(Uuid::new_v4())).await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn update_replaces_line_items_wholesale() {
    let (db, orders, clients, _rx) = setup().await;
    let client_id = seed_client(&clients, "Robin Okafor").await;

    let created = orders.create_order(basic_request(client_id)).await.unwrap();
    assert!(created.updated_at.is_none());

    // Resubmit with no labor at all and a single new part.
    let mut request = basic_request(client_id);
    request.labor = vec![];
    request.parts = vec![PartInput {
        inventory_item_id: None,
        description: "Oil filter".to_string(),
        quantity: 1,
        unit_price: Some(12.5),
    }];
    request.discount = None;

    let updated = orders.update_order(created.id, request).await.unwrap();

    assert!(updated.labor.is_empty());
    assert_eq!(updated.parts.len(), 1);
    assert_eq!(updated.parts[0].description, "Oil filter");
    assert_eq!(updated.summary.labor, dec!(0.00));
    assert_eq!(updated.summary.total, dec!(12.50));
    assert!(updated.updated_at.is_some());

    // No orphaned rows from the first submission.
    let labor_rows = order_labor::Entity::find().all(db.as_ref()).await.unwrap();
    let part_rows = order_part::Entity::find().all(db.as_ref()).await.unwrap();
    assert!(labor_rows.is_empty());
    assert_eq!(part_rows.len(), 1);
}

#[tokio::test]
async fn status_patch_leaves_summary_untouched() {
    let (_db, orders, clients, _rx) = setup().await;
    let client_id = seed_client(&clients, "Alex Chen").await;

    let created = orders.create_order(basic_request(client_id)).await.unwrap();
    let patched = orders
        .update_status(created.id, "completed".to_string())
        .await
        .unwrap();

    assert_eq!(patched.status, "completed");
    assert_eq!(patched.summary.total, created.summary.total);
    assert_eq!(patched.labor.len(), created.labor.len());
    assert!(patched.updated_at.is_some());

    // Any label may follow any other, including moving backwards.
    let reopened = orders
        .update_status(created.id, "open".to_string())
        .await
        .unwrap();
    assert_eq!(reopened.status, "open");
}

#[tokio::test]
async fn status_change_emits_event() {
    let (_db, orders, clients, mut rx) = setup().await;
    let client_id = seed_client(&clients, "Event Watcher").await;

    let created = orders.create_order(basic_request(client_id)).await.unwrap();
    assert_matches!(rx.recv().await, Some(Event::OrderCreated(id)) if id == created.id);

    orders
        .update_status(created.id, "in_progress".to_string())
        .await
        .unwrap();
    assert_matches!(
        rx.recv().await,
        Some(Event::OrderStatusChanged { old_status, new_status, .. })
            if old_status == "open" && new_status == "in_progress"
    );
}

#[tokio::test]
async fn delete_removes_order_and_lines() {
    let (db, orders, clients, _rx) = setup().await;
    let client_id = seed_client(&clients, "Morgan Diaz").await;

    let created = orders.create_order(basic_request(client_id)).await.unwrap();
    orders.delete_order(created.id).await.unwrap();

    assert_matches!(
        orders.get_order(created.id).await,
        Err(ServiceError::NotFound(_))
    );
    let labor_rows = order_labor::Entity::find().all(db.as_ref()).await.unwrap();
    let part_rows = order_part::Entity::find().all(db.as_ref()).await.unwrap();
    assert!(labor_rows.is_empty());
    assert!(part_rows.is_empty());

    assert_matches!(
        orders.delete_order(created.id).await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn list_filters_by_status_and_search() {
    let (_db, orders, clients, _rx) = setup().await;
    let reyes = seed_client(&clients, "Dana Reyes").await;
    let chen = seed_client(&clients, "Alex Chen").await;

    let open_order = orders.create_order(basic_request(reyes)).await.unwrap();
    let mut second = basic_request(chen);
    second.vehicle = "1998 Toyota Hilux".to_string();
    let done_order = orders.create_order(second).await.unwrap();
    orders
        .update_status(done_order.id, "completed".to_string())
        .await
        .unwrap();

    let completed = orders
        .list_orders(OrderListFilter {
            search: None,
            status: Some("completed".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, done_order.id);

    let by_client = orders
        .list_orders(OrderListFilter {
            search: Some("Reyes".to_string()),
            status: None,
        })
        .await
        .unwrap();
    assert_eq!(by_client.len(), 1);
    assert_eq!(by_client[0].id, open_order.id);

    let by_vehicle = orders
        .list_orders(OrderListFilter {
            search: Some("Hilux".to_string()),
            status: None,
        })
        .await
        .unwrap();
    assert_eq!(by_vehicle.len(), 1);
    assert_eq!(by_vehicle[0].id, done_order.id);

    let all = orders
        .list_orders(OrderListFilter {
            search: None,
            status: Some("all".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn client_total_is_ignored_unless_trusted() {
    let (db, _orders, clients, _rx) = setup().await;
    let client_id = seed_client(&clients, "Ira Walsh").await;

    let (tx, _rx2) = mpsc::channel(64);
    let strict = OrderService::new(db.clone(), EventSender::new(tx.clone()), false);
    let trusting = OrderService::new(db.clone(), EventSender::new(tx), true);

    let mut request = basic_request(client_id);
    request.total = Some(999.99);
    let order = strict.create_order(request).await.unwrap();
    assert_eq!(order.summary.total, dec!(225.00));

    let mut request = basic_request(client_id);
    request.total = Some(999.99);
    let order = trusting.create_order(request).await.unwrap();
    assert_eq!(order.summary.total, dec!(999.99));
    // Subtotals still reflect the computed lines.
    assert_eq!(order.summary.labor, dec!(200.00));
}
