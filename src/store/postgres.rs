//! Durable stores on Postgres via sqlx.
//!
//! Every mutation runs in its own transaction and every read is a single
//! statement, so the summary always reflects one snapshot of the ledger.
//!
//! Writes bound only the work before `COMMIT`. A timeout drops the open
//! transaction, which rolls it back, so a 503 never hides a persisted row.

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{ItemStore, MemberStore};
use crate::database::Database;
use crate::errors::StoreError;
use crate::models::{ExpenseItem, Member, Money, PaymentType, Summary};

/// Runs the pre-commit part of a write under `limit`.
async fn before_commit<T, F>(limit: Duration, work: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(limit, work).await.map_err(|_| {
        StoreError::Unavailable(format!("write not ready to commit within {limit:?}"))
    })?
}

pub struct PgMemberStore {
    db: Database,
    timeout: Duration,
}

impl PgMemberStore {
    pub fn new(db: Database, timeout: Duration) -> Self {
        PgMemberStore { db, timeout }
    }
}

#[async_trait]
impl MemberStore for PgMemberStore {
    async fn list(&self) -> Result<Vec<Member>, StoreError> {
        let members = sqlx::query_as::<_, Member>(
            "SELECT id, name, created_at FROM family_members ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(members)
    }

    async fn insert(&self, member: Member) -> Result<Member, StoreError> {
        let (tx, created) = before_commit(self.timeout, async {
            let mut tx = self.db.begin().await?;
            let created = sqlx::query_as::<_, Member>(
                "INSERT INTO family_members (id, name, created_at) VALUES ($1, $2, $3) \
                 RETURNING id, name, created_at",
            )
            .bind(member.id)
            .bind(&member.name)
            .bind(member.created_at)
            .fetch_one(&mut *tx)
            .await?;
            Ok::<_, StoreError>((tx, created))
        })
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let (tx, result) = before_commit(self.timeout, async {
            let mut tx = self.db.begin().await?;
            let result = sqlx::query("DELETE FROM family_members WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            Ok::<_, StoreError>((tx, result))
        })
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, FromRow)]
struct ItemRow {
    id: Uuid,
    item_name: String,
    price_minor: i64,
    quantity: i32,
    recipient: String,
    payment_type: String,
    paid_by: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for ExpenseItem {
    type Error = StoreError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let payment_type = row.payment_type.parse::<PaymentType>().map_err(|reason| {
            StoreError::Corrupt(format!("budget_items row {}: {reason}", row.id))
        })?;
        if row.price_minor <= 0 || row.quantity <= 0 {
            return Err(StoreError::Corrupt(format!(
                "budget_items row {} has a non-positive price or quantity",
                row.id
            )));
        }

        Ok(ExpenseItem {
            id: row.id,
            item_name: row.item_name,
            price: Money::from_minor(row.price_minor),
            quantity: row.quantity,
            recipient: row.recipient,
            payment_type,
            paid_by: row.paid_by,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct SummaryRow {
    total_items: i64,
    cash_minor: i64,
    online_minor: i64,
}

const ITEM_COLUMNS: &str =
    "id, item_name, price_minor, quantity, recipient, payment_type, paid_by, created_at";

pub struct PgItemStore {
    db: Database,
    timeout: Duration,
}

impl PgItemStore {
    pub fn new(db: Database, timeout: Duration) -> Self {
        PgItemStore { db, timeout }
    }
}

#[async_trait]
impl ItemStore for PgItemStore {
    async fn list(&self) -> Result<Vec<ExpenseItem>, StoreError> {
        let sql =
            format!("SELECT {ITEM_COLUMNS} FROM budget_items ORDER BY created_at DESC, id DESC");
        let rows = sqlx::query_as::<_, ItemRow>(&sql)
            .fetch_all(&self.db)
            .await?;

        rows.into_iter().map(ExpenseItem::try_from).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<ExpenseItem>, StoreError> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM budget_items WHERE id = $1");
        let row = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        row.map(ExpenseItem::try_from).transpose()
    }

    async fn insert(&self, item: ExpenseItem) -> Result<ExpenseItem, StoreError> {
        let sql = format!(
            "INSERT INTO budget_items ({ITEM_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {ITEM_COLUMNS}"
        );
        let (tx, stored) = before_commit(self.timeout, async {
            let mut tx = self.db.begin().await?;
            let row = sqlx::query_as::<_, ItemRow>(&sql)
                .bind(item.id)
                .bind(&item.item_name)
                .bind(item.price.minor())
                .bind(item.quantity)
                .bind(&item.recipient)
                .bind(item.payment_type.as_str())
                .bind(&item.paid_by)
                .bind(item.created_at)
                .fetch_one(&mut *tx)
                .await?;
            // A row that cannot be read back is rolled back instead of committed
            let stored = ExpenseItem::try_from(row)?;
            Ok::<_, StoreError>((tx, stored))
        })
        .await?;

        tx.commit().await?;
        Ok(stored)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let (tx, result) = before_commit(self.timeout, async {
            let mut tx = self.db.begin().await?;
            let result = sqlx::query("DELETE FROM budget_items WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            Ok::<_, StoreError>((tx, result))
        })
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn summary(&self) -> Result<Summary, StoreError> {
        let row = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT
                COUNT(*) AS total_items,
                COALESCE(SUM(price_minor * quantity) FILTER (WHERE payment_type = 'cash'), 0)
                    ::BIGINT AS cash_minor,
                COALESCE(SUM(price_minor * quantity) FILTER (WHERE payment_type = 'online'), 0)
                    ::BIGINT AS online_minor
            FROM budget_items
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        let total_items = u64::try_from(row.total_items).map_err(|_| {
            StoreError::Corrupt(format!("negative item count {}", row.total_items))
        })?;

        Summary::from_parts(
            total_items,
            Money::from_minor(row.cash_minor),
            Money::from_minor(row.online_minor),
        )
        .map_err(|err| StoreError::Corrupt(err.to_string()))
    }
}
