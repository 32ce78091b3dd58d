//! Repository for the `contracts` table.

use chrono::NaiveDate;
use sqlx::PgPool;

use clientele_core::contract::{Contract, NewContract};
use clientele_core::types::{DbId, Timestamp};

use crate::models::contract::{service_type_identifiers, ContractRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, last_name, first_name, company, service_types, amount, \
    billing_frequency, start_date, end_date, comment, \
    archived_at, archive_comment, created_at, updated_at";

/// Provides CRUD and archival operations for contracts.
pub struct ContractRepo;

impl ContractRepo {
    // ── Active set ────────────────────────────────────────────────────

    /// Insert a new contract, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewContract) -> Result<ContractRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO contracts
                (last_name, first_name, company, service_types, amount,
                 billing_frequency, start_date, end_date, comment)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContractRow>(&query)
            .bind(&input.last_name)
            .bind(&input.first_name)
            .bind(&input.company)
            .bind(service_type_identifiers(&input.service_types))
            .bind(input.amount)
            .bind(input.billing_frequency.as_str())
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(&input.comment)
            .fetch_one(pool)
            .await
    }

    /// Find an active contract by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ContractRow>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM contracts WHERE id = $1 AND archived_at IS NULL");
        sqlx::query_as::<_, ContractRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List active contracts in insertion order.
    pub async fn list(pool: &PgPool) -> Result<Vec<ContractRow>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM contracts WHERE archived_at IS NULL ORDER BY id");
        sqlx::query_as::<_, ContractRow>(&query).fetch_all(pool).await
    }

    /// Replace every mutable field of an active contract.
    ///
    /// Returns `None` if no active row with the given id exists.
    pub async fn update(
        pool: &PgPool,
        contract: &Contract,
    ) -> Result<Option<ContractRow>, sqlx::Error> {
        let query = format!(
            "UPDATE contracts SET
                last_name = $2,
                first_name = $3,
                company = $4,
                service_types = $5,
                amount = $6,
                billing_frequency = $7,
                start_date = $8,
                end_date = $9,
                comment = $10,
                updated_at = NOW()
             WHERE id = $1 AND archived_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContractRow>(&query)
            .bind(contract.id)
            .bind(&contract.last_name)
            .bind(&contract.first_name)
            .bind(&contract.company)
            .bind(service_type_identifiers(&contract.service_types))
            .bind(contract.amount)
            .bind(contract.billing_frequency.as_str())
            .bind(contract.start_date)
            .bind(contract.end_date)
            .bind(&contract.comment)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete an active contract. Returns `true` if a row was
    /// removed. Archived rows are not touched; deletion is a distinct
    /// operation from archival and leaves no archive entry.
    pub async fn hard_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contracts WHERE id = $1 AND archived_at IS NULL")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── Archival ──────────────────────────────────────────────────────

    /// Move an active contract to the archive.
    ///
    /// Returns `None` if no active row with the given id exists (already
    /// archived rows keep their original `archived_at`).
    pub async fn archive(
        pool: &PgPool,
        id: DbId,
        comment: &str,
        archived_at: Timestamp,
    ) -> Result<Option<ContractRow>, sqlx::Error> {
        let query = format!(
            "UPDATE contracts SET
                archived_at = $2,
                archive_comment = $3,
                updated_at = NOW()
             WHERE id = $1 AND archived_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContractRow>(&query)
            .bind(id)
            .bind(archived_at)
            .bind(comment)
            .fetch_optional(pool)
            .await
    }

    /// Archive every active contract whose end date is strictly before
    /// `today`, in one statement. Returns the archived rows.
    pub async fn archive_expired(
        pool: &PgPool,
        today: NaiveDate,
        comment: &str,
        archived_at: Timestamp,
    ) -> Result<Vec<ContractRow>, sqlx::Error> {
        let query = format!(
            "UPDATE contracts SET
                archived_at = $1,
                archive_comment = $2,
                updated_at = NOW()
             WHERE archived_at IS NULL
               AND end_date IS NOT NULL
               AND end_date < $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContractRow>(&query)
            .bind(archived_at)
            .bind(comment)
            .bind(today)
            .fetch_all(pool)
            .await
    }

    /// List archive entries, most recently archived first.
    pub async fn list_archived(pool: &PgPool) -> Result<Vec<ContractRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contracts
             WHERE archived_at IS NOT NULL
             ORDER BY archived_at DESC, id DESC"
        );
        sqlx::query_as::<_, ContractRow>(&query).fetch_all(pool).await
    }

    /// Find an archive entry by its id.
    pub async fn find_archived_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ContractRow>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM contracts WHERE id = $1 AND archived_at IS NOT NULL");
        sqlx::query_as::<_, ContractRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update only the comment of an existing archive entry.
    ///
    /// Returns `None` if the id does not belong to an archived contract.
    pub async fn update_archive_comment(
        pool: &PgPool,
        id: DbId,
        comment: &str,
    ) -> Result<Option<ContractRow>, sqlx::Error> {
        let query = format!(
            "UPDATE contracts SET
                archive_comment = $2,
                updated_at = NOW()
             WHERE id = $1 AND archived_at IS NOT NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContractRow>(&query)
            .bind(id)
            .bind(comment)
            .fetch_optional(pool)
            .await
    }
}
