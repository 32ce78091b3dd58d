//! Integration tests for contract CRUD against a real database.

use chrono::NaiveDate;
use sqlx::PgPool;

use clientele_core::contract::{BillingFrequency, NewContract, ServiceType};
use clientele_db::repositories::ContractRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_contract(last_name: &str) -> NewContract {
    NewContract {
        last_name: last_name.to_string(),
        first_name: "Test".to_string(),
        company: Some("Acme".to_string()),
        service_types: vec![ServiceType::Seo, ServiceType::WebDevelopment],
        amount: 300.0,
        billing_frequency: BillingFrequency::Monthly,
        start_date: date(2024, 1, 1),
        end_date: None,
        comment: None,
    }
}

// ---------------------------------------------------------------------------
// Test: create returns a persisted row convertible to the domain type
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_create_returns_row(pool: PgPool) {
    let row = ContractRepo::create(&pool, &new_contract("Martin"))
        .await
        .unwrap();

    assert!(row.id > 0);
    assert!(row.archived_at.is_none());
    assert!(row.archive_comment.is_none());

    let contract = row.into_active().unwrap();
    assert_eq!(contract.last_name, "Martin");
    assert_eq!(
        contract.service_types,
        vec![ServiceType::Seo, ServiceType::WebDevelopment]
    );
    assert_eq!(contract.billing_frequency, BillingFrequency::Monthly);
    assert_eq!(contract.amount, 300.0);
}

// ---------------------------------------------------------------------------
// Test: find_by_id returns active rows only
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_find_by_id(pool: PgPool) {
    let created = ContractRepo::create(&pool, &new_contract("Martin"))
        .await
        .unwrap();

    let found = ContractRepo::find_by_id(&pool, created.id).await.unwrap();
    assert!(found.is_some());

    let missing = ContractRepo::find_by_id(&pool, created.id + 1000).await.unwrap();
    assert!(missing.is_none());
}

// ---------------------------------------------------------------------------
// Test: list preserves insertion order
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_list_preserves_insertion_order(pool: PgPool) {
    for name in ["First", "Second", "Third"] {
        ContractRepo::create(&pool, &new_contract(name)).await.unwrap();
    }

    let rows = ContractRepo::list(&pool).await.unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.last_name.as_str()).collect();
    assert_eq!(names, ["First", "Second", "Third"]);
}

// ---------------------------------------------------------------------------
// Test: update replaces fields and reports missing ids
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_update_replaces_fields(pool: PgPool) {
    let created = ContractRepo::create(&pool, &new_contract("Martin"))
        .await
        .unwrap();
    let mut contract = created.into_active().unwrap();

    contract.amount = 450.0;
    contract.end_date = Some(date(2025, 12, 31));
    contract.comment = Some("renegotiated".to_string());

    let updated = ContractRepo::update(&pool, &contract)
        .await
        .unwrap()
        .expect("row should exist")
        .into_active()
        .unwrap();

    assert_eq!(updated.amount, 450.0);
    assert_eq!(updated.end_date, Some(date(2025, 12, 31)));
    assert_eq!(updated.comment.as_deref(), Some("renegotiated"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_unknown_id_returns_none(pool: PgPool) {
    let created = ContractRepo::create(&pool, &new_contract("Martin"))
        .await
        .unwrap();
    let mut contract = created.into_active().unwrap();
    contract.id += 1000;

    let updated = ContractRepo::update(&pool, &contract).await.unwrap();
    assert!(updated.is_none());
}

// ---------------------------------------------------------------------------
// Test: hard delete removes the row entirely
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_hard_delete(pool: PgPool) {
    let created = ContractRepo::create(&pool, &new_contract("Martin"))
        .await
        .unwrap();

    let deleted = ContractRepo::hard_delete(&pool, created.id).await.unwrap();
    assert!(deleted, "hard_delete should return true on first call");

    let again = ContractRepo::hard_delete(&pool, created.id).await.unwrap();
    assert!(!again, "hard_delete should return false once removed");

    // No archive entry was created.
    let archived = ContractRepo::list_archived(&pool).await.unwrap();
    assert!(archived.is_empty());
}
