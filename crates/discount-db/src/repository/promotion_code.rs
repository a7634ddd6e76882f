//! # Promotion Code Repository
//!
//! `discount_codes` access and the SQLite implementation of
//! [`CodeRepository`].
//!
//! ## Column Encoding
//! ```text
//! PromotionCode field        column                   encoding
//! ─────────────────────────  ───────────────────────  ─────────────────────
//! discount_type              type                     snake_case tag
//! value                      value                    integer hundredths
//! minimum_basket_value       minimum_basket_value     integer cents
//! starts_at / expires_at     starts_at / expires_at   RFC 3339 text
//! conditions / metadata      conditions / metadata    JSON text
//! ```
//!
//! Queries are built at runtime (`query_as` + `FromRow`) so the crate builds
//! without a live `DATABASE_URL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use discount_core::{CodeRepository, CoreResult, DiscountType, DiscountValue, Money, PromotionCode};

use super::INCREMENT_USAGE_SQL;
use crate::error::{DbError, DbResult};

const SELECT_COLUMNS: &str = "id, code, name, description, type, value, \
     minimum_basket_value, usage_limit, usage_count, starts_at, expires_at, \
     is_active, is_exclusive, can_be_combined, conditions, metadata";

/// Raw `discount_codes` row.
#[derive(Debug, FromRow)]
struct PromotionCodeRow {
    id: i64,
    code: String,
    name: String,
    description: Option<String>,
    #[sqlx(rename = "type")]
    discount_type: String,
    value: i64,
    minimum_basket_value: Option<i64>,
    usage_limit: Option<i64>,
    usage_count: i64,
    starts_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    is_active: bool,
    is_exclusive: bool,
    can_be_combined: bool,
    conditions: String,
    metadata: String,
}

impl TryFrom<PromotionCodeRow> for PromotionCode {
    type Error = DbError;

    fn try_from(row: PromotionCodeRow) -> DbResult<Self> {
        let discount_type = row
            .discount_type
            .parse::<DiscountType>()
            .map_err(|reason| DbError::CorruptRow {
                code: row.code.clone(),
                column: "type",
                reason,
            })?;
        let conditions = parse_json_column(&row.code, "conditions", &row.conditions)?;
        let metadata = parse_json_column(&row.code, "metadata", &row.metadata)?;

        Ok(PromotionCode {
            id: row.id,
            code: row.code,
            name: row.name,
            description: row.description,
            discount_type,
            value: DiscountValue::from_hundredths(row.value),
            minimum_basket_value: row.minimum_basket_value.map(Money::from_cents),
            usage_limit: row.usage_limit,
            usage_count: row.usage_count,
            starts_at: row.starts_at,
            expires_at: row.expires_at,
            is_active: row.is_active,
            is_exclusive: row.is_exclusive,
            can_be_combined: row.can_be_combined,
            conditions,
            metadata,
        })
    }
}

/// Empty and `null` columns decode to the default value.
fn parse_json_column<T>(code: &str, column: &'static str, raw: &str) -> DbResult<T>
where
    T: DeserializeOwned + Default,
{
    let raw = raw.trim();
    if raw.is_empty() || raw == "null" {
        return Ok(T::default());
    }
    serde_json::from_str(raw).map_err(|e| DbError::CorruptRow {
        code: code.to_string(),
        column,
        reason: e.to_string(),
    })
}

fn to_json_column<T: serde::Serialize>(code: &str, column: &'static str, value: &T) -> DbResult<String> {
    serde_json::to_string(value).map_err(|e| DbError::CorruptRow {
        code: code.to_string(),
        column,
        reason: e.to_string(),
    })
}

fn into_codes(rows: Vec<PromotionCodeRow>) -> DbResult<Vec<PromotionCode>> {
    rows.into_iter().map(PromotionCode::try_from).collect()
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for `discount_codes`.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.codes();
///
/// let found = repo.find_by_codes(&["PERCENT20".to_string()]).await?;
/// let eligible = repo.find_eligible(Utc::now()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SqliteCodeRepository {
    pool: SqlitePool,
}

impl SqliteCodeRepository {
    /// Creates a new SqliteCodeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteCodeRepository { pool }
    }

    /// Returns the live records whose `code` is in `codes`.
    ///
    /// Unknown and soft-deleted codes are absent. Result order is by id,
    /// not by `codes`; the calculator reorders.
    pub async fn find_by_codes(&self, codes: &[String]) -> DbResult<Vec<PromotionCode>> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM discount_codes WHERE deleted_at IS NULL AND code IN (",
            SELECT_COLUMNS
        ));
        let mut separated = query.separated(", ");
        for code in codes {
            separated.push_bind(code.as_str());
        }
        separated.push_unseparated(") ORDER BY id");

        let rows = query
            .build_query_as::<PromotionCodeRow>()
            .fetch_all(&self.pool)
            .await?;

        debug!(requested = codes.len(), found = rows.len(), "Looked up discount codes");
        into_codes(rows)
    }

    /// Returns every live code that is active, not expired at `now` and under
    /// its usage limit, ordered by id.
    ///
    /// `starts_at` is not filtered here: a scheduled code is returned and then
    /// rejected by the pipeline.
    pub async fn find_eligible(&self, now: DateTime<Utc>) -> DbResult<Vec<PromotionCode>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM discount_codes
            WHERE deleted_at IS NULL
              AND is_active = 1
              AND (expires_at IS NULL OR julianday(expires_at) > julianday(?1))
              AND (usage_limit IS NULL OR usage_limit <= 0 OR usage_count < usage_limit)
            ORDER BY id
            "#,
            SELECT_COLUMNS
        );

        let rows = sqlx::query_as::<_, PromotionCodeRow>(&sql)
            .bind(now)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Loaded eligible discount codes");
        into_codes(rows)
    }

    /// Gets a live code by its business key.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<PromotionCode>> {
        let sql = format!(
            "SELECT {} FROM discount_codes WHERE code = ?1 AND deleted_at IS NULL",
            SELECT_COLUMNS
        );

        sqlx::query_as::<_, PromotionCodeRow>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?
            .map(PromotionCode::try_from)
            .transpose()
    }

    /// Inserts a new code and returns its id. `code.id` is ignored.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation` when the code string is already taken.
    pub async fn insert(&self, code: &PromotionCode) -> DbResult<i64> {
        let now = Utc::now();
        let conditions = to_json_column(&code.code, "conditions", &code.conditions)?;
        let metadata = to_json_column(&code.code, "metadata", &code.metadata)?;

        let result = sqlx::query(
            r#"
            INSERT INTO discount_codes (
                code, name, description, type, value,
                minimum_basket_value, usage_limit, usage_count,
                starts_at, expires_at, is_active, is_exclusive, can_be_combined,
                conditions, metadata, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16)
            "#,
        )
        .bind(&code.code)
        .bind(&code.name)
        .bind(&code.description)
        .bind(code.discount_type.as_str())
        .bind(code.value.hundredths())
        .bind(code.minimum_basket_value.map(|m| m.cents()))
        .bind(code.usage_limit)
        .bind(code.usage_count)
        .bind(code.starts_at)
        .bind(code.expires_at)
        .bind(code.is_active)
        .bind(code.is_exclusive)
        .bind(code.can_be_combined)
        .bind(conditions)
        .bind(metadata)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &code.code),
            other => other,
        })?;

        let id = result.last_insert_rowid();
        debug!(id, code = %code.code, "Inserted discount code");
        Ok(id)
    }

    /// Increments `usage_count` by one unless the limit is already reached.
    ///
    /// Returns `false` when nothing was incremented. The check and the
    /// increment are one statement, so concurrent checkouts cannot both take
    /// the last use.
    pub async fn track_usage(&self, code_id: i64) -> DbResult<bool> {
        let result = sqlx::query(INCREMENT_USAGE_SQL)
            .bind(Utc::now())
            .bind(code_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Soft-deletes a code. Returns `false` when no live code matched.
    pub async fn soft_delete(&self, code: &str) -> DbResult<bool> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE discount_codes SET deleted_at = ?1, updated_at = ?1 WHERE code = ?2 AND deleted_at IS NULL",
        )
        .bind(now)
        .bind(code)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Counts live codes.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM discount_codes WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

#[async_trait]
impl CodeRepository for SqliteCodeRepository {
    async fn find_codes_by_name(&self, names: &[String]) -> CoreResult<Vec<PromotionCode>> {
        Ok(self.find_by_codes(names).await?)
    }

    async fn find_eligible_codes(&self, now: DateTime<Utc>) -> CoreResult<Vec<PromotionCode>> {
        Ok(self.find_eligible(now).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
