//! # Code Repository
//!
//! The narrow seam between the calculator and whatever stores promotion codes.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DiscountCalculator                                                     │
//! │       │                                                                 │
//! │       │  find_codes_by_name(["PERCENT20", "FIXED10"])                   │
//! │       │  find_eligible_codes(now)                                       │
//! │       ▼                                                                 │
//! │  dyn CodeRepository                                                     │
//! │  ├── InMemoryCodeRepository   (this module: tests, embedding)          │
//! │  └── SqliteCodeRepository     (discount-db)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The calculator only reads. Incrementing `usage_count` after checkout is
//! the store's job, and must be a conditional update so concurrent checkouts
//! cannot push a code past its limit.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::types::PromotionCode;

/// Read access to stored promotion codes.
#[async_trait]
pub trait CodeRepository: Send + Sync {
    /// Returns the records whose `code` is in `names`.
    ///
    /// Names with no record are simply absent from the result. Order of the
    /// returned records is unspecified.
    async fn find_codes_by_name(&self, names: &[String]) -> CoreResult<Vec<PromotionCode>>;

    /// Returns every code that is active, not expired at `now`, and under its
    /// usage limit (or has none).
    async fn find_eligible_codes(&self, now: DateTime<Utc>) -> CoreResult<Vec<PromotionCode>>;
}

// =============================================================================
// In-Memory Repository
// =============================================================================

/// A `CodeRepository` over a vector, for tests and for callers that load
/// their codes from configuration.
#[derive(Debug, Default)]
pub struct InMemoryCodeRepository {
    codes: RwLock<Vec<PromotionCode>>,
}

impl InMemoryCodeRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        InMemoryCodeRepository::default()
    }

    /// Creates a repository holding `codes`.
    pub fn with_codes(codes: impl IntoIterator<Item = PromotionCode>) -> Self {
        InMemoryCodeRepository {
            codes: RwLock::new(codes.into_iter().collect()),
        }
    }

    /// Adds or replaces (by `code`) a record.
    pub fn upsert(&self, code: PromotionCode) -> CoreResult<()> {
        let mut codes = self.codes.write().map_err(poisoned)?;
        match codes.iter_mut().find(|c| c.code == code.code) {
            Some(existing) => *existing = code,
            None => codes.push(code),
        }
        Ok(())
    }

    /// Increments `usage_count` only while the code is under its limit.
    ///
    /// Returns `Ok(false)` when the code is unknown or already depleted.
    pub fn track_usage(&self, code: &str) -> CoreResult<bool> {
        let mut codes = self.codes.write().map_err(poisoned)?;
        match codes.iter_mut().find(|c| c.code == code) {
            Some(record) if !record.is_depleted() => {
                record.usage_count += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Returns a copy of the record for `code`.
    pub fn get(&self, code: &str) -> CoreResult<Option<PromotionCode>> {
        let codes = self.codes.read().map_err(poisoned)?;
        Ok(codes.iter().find(|c| c.code == code).cloned())
    }
}

#[async_trait]
impl CodeRepository for InMemoryCodeRepository {
    async fn find_codes_by_name(&self, names: &[String]) -> CoreResult<Vec<PromotionCode>> {
        let codes = self.codes.read().map_err(poisoned)?;
        Ok(codes
            .iter()
            .filter(|c| names.iter().any(|n| *n == c.code))
            .cloned()
            .collect())
    }

    async fn find_eligible_codes(&self, now: DateTime<Utc>) -> CoreResult<Vec<PromotionCode>> {
        let codes = self.codes.read().map_err(poisoned)?;
        Ok(codes
            .iter()
            .filter(|c| c.is_eligible_at(now))
            .cloned()
            .collect())
    }
}

fn poisoned<T>(_: T) -> CoreError {
    CoreError::repository("in-memory code store lock poisoned")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::DiscountValue;
    use crate::types::DiscountType;
    use chrono::Duration;

    fn code(id: i64, name: &str) -> PromotionCode {
        PromotionCode::new(id, name, DiscountType::Percentage, DiscountValue::from_whole(10))
    }

    #[tokio::test]
    async fn test_find_by_name_drops_unknown() {
        let repo = InMemoryCodeRepository::with_codes([code(1, "A"), code(2, "B")]);

        let found = repo
            .find_codes_by_name(&["B".to_string(), "MISSING".to_string()])
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].code, "B");
    }

    #[tokio::test]
    async fn test_find_eligible_filters() {
        let now = Utc::now();
        let mut inactive = code(2, "OFF");
        inactive.is_active = false;
        let mut expired = code(3, "OLD");
        expired.expires_at = Some(now - Duration::days(1));
        let mut depleted = code(4, "USED");
        depleted.usage_limit = Some(1);
        depleted.usage_count = 1;

        let repo = InMemoryCodeRepository::with_codes([code(1, "OK"), inactive, expired, depleted]);
        let eligible = repo.find_eligible_codes(now).await.unwrap();

        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].code, "OK");
    }

    #[test]
    fn test_track_usage_stops_at_limit() {
        let mut limited = code(1, "ONCE");
        limited.usage_limit = Some(1);
        let repo = InMemoryCodeRepository::with_codes([limited]);

        assert!(repo.track_usage("ONCE").unwrap());
        assert!(!repo.track_usage("ONCE").unwrap());
        assert!(!repo.track_usage("MISSING").unwrap());
        assert_eq!(repo.get("ONCE").unwrap().unwrap().usage_count, 1);
    }

    #[test]
    fn test_upsert_replaces_by_code() {
        let repo = InMemoryCodeRepository::new();
        repo.upsert(code(1, "A")).unwrap();

        let mut updated = code(1, "A");
        updated.usage_count = 3;
        repo.upsert(updated).unwrap();

        assert_eq!(repo.get("A").unwrap().unwrap().usage_count, 3);
    }
}
