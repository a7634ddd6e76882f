//! # Usage Repository
//!
//! Records redemptions after checkout. The calculator never writes; this is
//! the "track usage" half of the store.
//!
//! ## Redemption Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_redemption(result, user_ref, order_ref)                         │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │   for each applied discount:                                            │
//! │     UPDATE discount_codes SET usage_count = usage_count + 1             │
//! │       WHERE id = ? AND (no limit OR usage_count < usage_limit)          │
//! │        │                                                                │
//! │        ├── 0 rows ──► ROLLBACK, Err(UsageLimitReached)                  │
//! │        │                                                                │
//! │        └── 1 row  ──► INSERT INTO discount_code_usage (...)             │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Either every applied code is counted and logged, or none is.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use tracing::{info, warn};
use uuid::Uuid;

use discount_core::{DiscountCalculationResult, Money};

use super::INCREMENT_USAGE_SQL;
use crate::error::{DbError, DbResult};

/// One redemption of one code on one order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageRecord {
    pub id: String,
    pub discount_code_id: i64,
    pub user_ref: String,
    pub order_ref: String,
    /// What this code took off.
    pub discount_amount: Money,
    /// Cart total before any discount.
    pub original_amount: Money,
    /// Cart total after all discounts on the order.
    pub final_amount: Money,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct UsageRow {
    id: String,
    discount_code_id: i64,
    user_ref: String,
    order_ref: String,
    discount_amount: i64,
    original_amount: i64,
    final_amount: i64,
    created_at: DateTime<Utc>,
}

impl From<UsageRow> for UsageRecord {
    fn from(row: UsageRow) -> Self {
        UsageRecord {
            id: row.id,
            discount_code_id: row.discount_code_id,
            user_ref: row.user_ref,
            order_ref: row.order_ref,
            discount_amount: Money::from_cents(row.discount_amount),
            original_amount: Money::from_cents(row.original_amount),
            final_amount: Money::from_cents(row.final_amount),
            created_at: row.created_at,
        }
    }
}

/// Repository for `discount_code_usage`.
#[derive(Debug, Clone)]
pub struct UsageRepository {
    pool: SqlitePool,
}

impl UsageRepository {
    /// Creates a new UsageRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UsageRepository { pool }
    }

    /// Counts every applied discount of a valid result against its code and
    /// writes one usage row per applied discount, atomically.
    ///
    /// ## Errors
    /// - `DbError::InvalidCalculation` if `result.is_valid` is false
    /// - `DbError::UsageLimitReached` if any code is already at its limit;
    ///   nothing is written
    pub async fn record_redemption(
        &self,
        result: &DiscountCalculationResult,
        user_ref: &str,
        order_ref: &str,
    ) -> DbResult<Vec<UsageRecord>> {
        if !result.is_valid {
            return Err(DbError::InvalidCalculation(
                result.error_message.clone().unwrap_or_default(),
            ));
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut records = Vec::with_capacity(result.applied_discounts.len());

        for applied in &result.applied_discounts {
            let code = &applied.discount_code;

            let updated = sqlx::query(INCREMENT_USAGE_SQL)
                .bind(now)
                .bind(code.id)
                .execute(&mut *tx)
                .await?;

            if updated.rows_affected() == 0 {
                warn!(
                    code = %code.code,
                    order_ref,
                    "Usage limit reached during redemption, rolling back"
                );
                tx.rollback().await?;
                return Err(DbError::UsageLimitReached {
                    code: code.code.clone(),
                });
            }

            let record = UsageRecord {
                id: Uuid::new_v4().to_string(),
                discount_code_id: code.id,
                user_ref: user_ref.to_string(),
                order_ref: order_ref.to_string(),
                discount_amount: applied.amount,
                original_amount: result.original_cart.total,
                final_amount: result.final_total,
                created_at: now,
            };

            sqlx::query(
                r#"
                INSERT INTO discount_code_usage (
                    id, discount_code_id, user_ref, order_ref,
                    discount_amount, original_amount, final_amount, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&record.id)
            .bind(record.discount_code_id)
            .bind(&record.user_ref)
            .bind(&record.order_ref)
            .bind(record.discount_amount.cents())
            .bind(record.original_amount.cents())
            .bind(record.final_amount.cents())
            .bind(record.created_at)
            .execute(&mut *tx)
            .await?;

            records.push(record);
        }

        tx.commit().await?;

        info!(
            order_ref,
            codes = records.len(),
            total_discount = result.total_discount.cents(),
            "Redemption recorded"
        );
        Ok(records)
    }

    /// Lists redemptions of one code, oldest first.
    pub async fn list_for_code(&self, code_id: i64) -> DbResult<Vec<UsageRecord>> {
        let rows = sqlx::query_as::<_, UsageRow>(
            r#"
            SELECT id, discount_code_id, user_ref, order_ref,
                   discount_amount, original_amount, final_amount, created_at
            FROM discount_code_usage
            WHERE discount_code_id = ?1
            ORDER BY created_at, id
            "#,
        )
        .bind(code_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UsageRecord::from).collect())
    }

    /// Counts redemptions recorded for an order.
    pub async fn count_for_order(&self, order_ref: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM discount_code_usage WHERE order_ref = ?1")
                .bind(order_ref)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use discount_core::{
        CalculationRequest, Cart, Customer, DiscountCalculator, DiscountType, DiscountValue,
        PromotionCode,
    };
    use std::sync::Arc;

    async fn setup(codes: Vec<PromotionCode>) -> (Database, DiscountCalculator) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for code in &codes {
            db.codes().insert(code).await.unwrap();
        }
        let calculator = DiscountCalculator::new(Arc::new(db.codes()));
        (db, calculator)
    }

    fn request(codes: &[&str]) -> CalculationRequest {
        CalculationRequest::new(
            Cart::with_total(Money::from_cents(10000)),
            Customer::new("123"),
            codes.iter().copied(),
        )
    }

    #[tokio::test]
    async fn test_redemption_counts_and_logs() {
        let (db, calculator) = setup(vec![
            PromotionCode::new(0, "TEN", DiscountType::Percentage, DiscountValue::from_whole(10)),
            PromotionCode::new(0, "FIVE", DiscountType::FixedAmount, DiscountValue::from_whole(5)),
        ])
        .await;

        let result = calculator.calculate(&request(&["TEN", "FIVE"])).await.unwrap();
        let records = db
            .usage()
            .record_redemption(&result, "user-123", "order-1")
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].discount_amount, Money::from_cents(1000));
        assert_eq!(records[1].discount_amount, Money::from_cents(500));
        assert_eq!(records[1].final_amount, Money::from_cents(8500));
        assert_eq!(db.usage().count_for_order("order-1").await.unwrap(), 2);

        let ten = db.codes().get_by_code("TEN").await.unwrap().unwrap();
        assert_eq!(ten.usage_count, 1);
        let history = db.usage().list_for_code(ten.id).await.unwrap();
        assert_eq!(history, vec![records[0].clone()]);
    }

    #[tokio::test]
    async fn test_limit_reached_rolls_back_everything() {
        let mut once = PromotionCode::new(0, "ONCE", DiscountType::FixedAmount, DiscountValue::from_whole(5));
        once.usage_limit = Some(1);
        let (db, calculator) = setup(vec![
            PromotionCode::new(0, "TEN", DiscountType::Percentage, DiscountValue::from_whole(10)),
            once,
        ])
        .await;

        // Both quotes are taken before either checkout.
        let first = calculator.calculate(&request(&["TEN", "ONCE"])).await.unwrap();
        let second = calculator.calculate(&request(&["TEN", "ONCE"])).await.unwrap();

        db.usage().record_redemption(&first, "u1", "order-1").await.unwrap();
        let err = db
            .usage()
            .record_redemption(&second, "u2", "order-2")
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UsageLimitReached { ref code } if code == "ONCE"));
        assert_eq!(db.usage().count_for_order("order-2").await.unwrap(), 0);
        // TEN's increment from the failed attempt was rolled back.
        let ten = db.codes().get_by_code("TEN").await.unwrap().unwrap();
        assert_eq!(ten.usage_count, 1);
    }

    #[tokio::test]
    async fn test_invalid_result_not_redeemable() {
        let (db, calculator) = setup(Vec::new()).await;

        let result = calculator.calculate(&request(&["MISSING"])).await.unwrap();
        assert!(!result.is_valid);

        let err = db
            .usage()
            .record_redemption(&result, "u1", "order-1")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidCalculation(_)));
    }
}
