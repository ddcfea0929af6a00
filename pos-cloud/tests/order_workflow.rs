//! Order lifecycle against a real PostgreSQL database.
//!
//! Needs `DATABASE_URL`; run with `cargo test -- --ignored`.

use chrono::NaiveDate;
use pos_cloud::db;
use pos_cloud::error::ServiceError;
use pos_cloud::orders::edit::parse_edit;
use pos_cloud::orders::kitchen;
use pos_cloud::orders::workflow::{self, Payment};
use pos_cloud::orders::{PlacementOutcome, validate_order};
use rust_decimal::Decimal;
use serde_json::json;
use shared::error::ErrorCode;
use shared::models::{OrderStatus, PlaceOrderRequest, RestaurantCreate, TABLE_AVAILABLE};
use sqlx::PgPool;

async fn seed_restaurant(pool: &PgPool, id: i64) {
    let mut conn = pool.acquire().await.unwrap();
    db::restaurants::insert(
        &mut *conn,
        &RestaurantCreate {
            id,
            name: format!("Restaurant {id}"),
            admin_email: format!("owner{id}@pos.example"),
            admin_password: "unused-here".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            expiry_date: NaiveDate::from_ymd_opt(2035, 1, 1).unwrap(),
            status: None,
            plan: None,
        },
    )
    .await
    .unwrap();
}

/// Restaurant with table "5" in a fresh category; returns the category id.
async fn seed_floor(pool: &PgPool, restaurant_id: i64) -> i64 {
    seed_restaurant(pool, restaurant_id).await;
    let category = db::floor::create_category(pool, restaurant_id, "Garden")
        .await
        .unwrap();
    db::floor::create_table(pool, restaurant_id, "5", Some(category.id), TABLE_AVAILABLE)
        .await
        .unwrap();
    category.id
}

fn submission(restaurant_id: i64, category_id: i64, quantity: i32) -> PlaceOrderRequest {
    serde_json::from_value(json!({
        "restaurantId": restaurant_id,
        "tableNumber": "5",
        "tableCategoryId": category_id,
        "items": [{ "menuItemId": 10, "itemName": "Paneer Tikka", "quantity": quantity, "price": 100 }]
    }))
    .unwrap()
}

async fn table_status(pool: &PgPool, restaurant_id: i64, category_id: i64) -> String {
    sqlx::query_scalar(
        "SELECT status FROM restauranttables WHERE restaurant_id = $1 AND table_number = '5' AND category_id = $2",
    )
    .bind(restaurant_id)
    .bind(category_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

fn cash() -> Payment {
    Payment {
        payment_type: "cash".into(),
        contact: Default::default(),
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn second_submission_merges_into_the_open_order(pool: PgPool) {
    let category = seed_floor(&pool, 1).await;

    let first = validate_order(submission(1, category, 2)).unwrap();
    let created = workflow::place_order(&pool, &first).await.unwrap();
    assert!(matches!(created, PlacementOutcome::Created { .. }));
    assert_eq!(table_status(&pool, 1, category).await, "occupied");

    let order = db::orders::find_by_bill_no(&pool, 1, created.bill_no())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.total_amount, Decimal::from(200));

    let second = validate_order(submission(1, category, 1)).unwrap();
    let merged = workflow::place_order(&pool, &second).await.unwrap();
    assert!(matches!(merged, PlacementOutcome::Merged { .. }));
    assert_eq!(merged.order_id(), created.order_id());
    assert_eq!(merged.bill_no(), created.bill_no());

    let order = db::orders::find_by_bill_no(&pool, 1, created.bill_no())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.total_amount, Decimal::from(300));

    let lines = db::orders::lines(&pool, order.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 3);
    assert_eq!(lines[0].price, Decimal::from(100));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn serve_then_finalize_releases_the_table(pool: PgPool) {
    let category = seed_floor(&pool, 1).await;
    for quantity in [2, 1] {
        let order = validate_order(submission(1, category, quantity)).unwrap();
        workflow::place_order(&pool, &order).await.unwrap();
    }
    let open = db::orders::find_open_for_table(&pool, 1, "5", category)
        .await
        .unwrap()
        .unwrap();

    let accepted = workflow::change_status(&pool, 1, open.id, OrderStatus::Accepted)
        .await
        .unwrap();
    assert_eq!(accepted.status, "accepted");
    assert!(accepted.accepted_at.is_some());

    let served = workflow::change_status(&pool, 1, open.id, OrderStatus::Served)
        .await
        .unwrap();
    assert_eq!(served.status, "served");
    assert!(served.served_at.is_some());
    let lines = db::orders::lines(&pool, open.id).await.unwrap();
    assert!(lines.iter().all(|l| l.quantity_served == l.quantity));
    assert_eq!(lines[0].quantity_served, 3);

    let finalized = workflow::finalize(&pool, 1, open.id, &cash()).await.unwrap();
    assert!(finalized.released_table);
    assert!(finalized.order.is_paid);
    assert_eq!(finalized.order.status, "paid");
    assert_eq!(finalized.order.payment_type.as_deref(), Some("cash"));
    assert_eq!(table_status(&pool, 1, category).await, TABLE_AVAILABLE);

    // Paying twice is rejected and leaves the order untouched
    match workflow::finalize(&pool, 1, open.id, &cash()).await {
        Err(ServiceError::App(e)) => assert_eq!(e.code, ErrorCode::OrderAlreadyPaid),
        other => panic!("expected OrderAlreadyPaid, got {other:?}"),
    }

    // A paid order no longer blocks the table
    let next = validate_order(submission(1, category, 1)).unwrap();
    let outcome = workflow::place_order(&pool, &next).await.unwrap();
    assert!(matches!(outcome, PlacementOutcome::Created { .. }));
    assert_ne!(outcome.order_id(), open.id);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn kitchen_view_shows_only_unserved_work(pool: PgPool) {
    let category = seed_floor(&pool, 1).await;
    let order = validate_order(submission(1, category, 2)).unwrap();
    let outcome = workflow::place_order(&pool, &order).await.unwrap();

    let tickets = kitchen::project(db::orders::kitchen_rows(&pool, 1).await.unwrap());
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].bill_no, outcome.bill_no());
    assert_eq!(tickets[0].category_name.as_deref(), Some("Garden"));
    assert_eq!(tickets[0].items[0].quantity, 2);

    workflow::change_status(&pool, 1, outcome.order_id(), OrderStatus::Served)
        .await
        .unwrap();
    let tickets = kitchen::project(db::orders::kitchen_rows(&pool, 1).await.unwrap());
    assert!(tickets.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn tenants_do_not_see_each_other(pool: PgPool) {
    let first_category = seed_floor(&pool, 1).await;
    let second_category = seed_floor(&pool, 2).await;

    let a = workflow::place_order(&pool, &validate_order(submission(1, first_category, 1)).unwrap())
        .await
        .unwrap();
    let b = workflow::place_order(&pool, &validate_order(submission(2, second_category, 1)).unwrap())
        .await
        .unwrap();

    // Same table number at another tenant is a different table
    assert!(matches!(b, PlacementOutcome::Created { .. }));
    assert_ne!(a.order_id(), b.order_id());
    // Bill numbers are per tenant
    assert_eq!(a.bill_no(), b.bill_no());

    match workflow::change_status(&pool, 2, a.order_id(), OrderStatus::Accepted).await {
        Err(ServiceError::App(e)) => assert_eq!(e.code, ErrorCode::OrderNotFound),
        other => panic!("expected OrderNotFound, got {other:?}"),
    }
    match workflow::finalize(&pool, 2, a.order_id(), &cash()).await {
        Err(ServiceError::App(e)) => assert_eq!(e.code, ErrorCode::OrderNotFound),
        other => panic!("expected OrderNotFound, got {other:?}"),
    }

    let kitchen_two = kitchen::project(db::orders::kitchen_rows(&pool, 2).await.unwrap());
    assert_eq!(kitchen_two.len(), 1);
    assert_eq!(kitchen_two[0].id, b.order_id());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn unknown_restaurant_is_reported(pool: PgPool) {
    let order = validate_order(submission(99, 1, 1)).unwrap();
    match workflow::place_order(&pool, &order).await {
        Err(ServiceError::App(e)) => assert_eq!(e.code, ErrorCode::RestaurantNotFound),
        other => panic!("expected RestaurantNotFound, got {other:?}"),
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn paying_through_an_edit_releases_the_table(pool: PgPool) {
    let category = seed_floor(&pool, 1).await;
    let placed = workflow::place_order(&pool, &validate_order(submission(1, category, 2)).unwrap())
        .await
        .unwrap();
    assert_eq!(table_status(&pool, 1, category).await, "occupied");

    let edit = parse_edit("isPaid", &json!(true)).unwrap();
    let order = workflow::edit_order(&pool, 1, placed.order_id(), &edit)
        .await
        .unwrap();
    assert!(order.is_paid);
    assert_eq!(table_status(&pool, 1, category).await, TABLE_AVAILABLE);

    // Reopening takes the table back
    let edit = parse_edit("isPaid", &json!(false)).unwrap();
    workflow::edit_order(&pool, 1, placed.order_id(), &edit)
        .await
        .unwrap();
    assert_eq!(table_status(&pool, 1, category).await, "occupied");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn reopening_onto_a_taken_table_is_a_conflict(pool: PgPool) {
    let category = seed_floor(&pool, 1).await;
    let first = workflow::place_order(&pool, &validate_order(submission(1, category, 1)).unwrap())
        .await
        .unwrap();
    workflow::finalize(&pool, 1, first.order_id(), &cash())
        .await
        .unwrap();
    let second = workflow::place_order(&pool, &validate_order(submission(1, category, 1)).unwrap())
        .await
        .unwrap();
    assert_ne!(first.order_id(), second.order_id());

    let reopen = parse_edit("isPaid", &json!(false)).unwrap();
    match workflow::edit_order(&pool, 1, first.order_id(), &reopen).await {
        Err(ServiceError::App(e)) => assert_eq!(e.code, ErrorCode::TableOccupied),
        other => panic!("expected TableOccupied, got {other:?}"),
    }
    let first_row = db::orders::find_by_bill_no(&pool, 1, first.bill_no())
        .await
        .unwrap()
        .unwrap();
    assert!(first_row.is_paid);
    assert_eq!(table_status(&pool, 1, category).await, "occupied");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn moving_an_open_order_moves_the_occupancy(pool: PgPool) {
    let category = seed_floor(&pool, 1).await;
    db::floor::create_table(&pool, 1, "6", Some(category), TABLE_AVAILABLE)
        .await
        .unwrap();
    let placed = workflow::place_order(&pool, &validate_order(submission(1, category, 1)).unwrap())
        .await
        .unwrap();

    let edit = parse_edit("tableNumber", &json!("6")).unwrap();
    let order = workflow::edit_order(&pool, 1, placed.order_id(), &edit)
        .await
        .unwrap();
    assert_eq!(order.table_number.as_deref(), Some("6"));
    assert_eq!(table_status(&pool, 1, category).await, TABLE_AVAILABLE);

    let moved: String = sqlx::query_scalar(
        "SELECT status FROM restauranttables WHERE restaurant_id = 1 AND table_number = '6'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(moved, "occupied");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn editing_another_tenants_order_is_not_found(pool: PgPool) {
    let category = seed_floor(&pool, 1).await;
    seed_restaurant(&pool, 2).await;
    let placed = workflow::place_order(&pool, &validate_order(submission(1, category, 1)).unwrap())
        .await
        .unwrap();

    let edit = parse_edit("customerName", &json!("Asha")).unwrap();
    match workflow::edit_order(&pool, 2, placed.order_id(), &edit).await {
        Err(ServiceError::App(e)) => assert_eq!(e.code, ErrorCode::OrderNotFound),
        other => panic!("expected OrderNotFound, got {other:?}"),
    }
}
