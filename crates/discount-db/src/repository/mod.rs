//! # Repository Module
//!
//! SQLite repositories for the discount store.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  DiscountCalculator            checkout / seed / quote                 │
//! │       │                               │                                 │
//! │       │ dyn CodeRepository            │                                 │
//! │       ▼                               ▼                                 │
//! │  SqliteCodeRepository          UsageRepository                         │
//! │  ├── find_by_codes             └── record_redemption (transaction)     │
//! │  ├── find_eligible                  ├── conditional usage_count + 1    │
//! │  ├── insert / get_by_code           └── discount_code_usage row        │
//! │  ├── track_usage                                                        │
//! │  └── soft_delete                                                        │
//! │       │                               │                                 │
//! │       ▼                               ▼                                 │
//! │  discount_codes  ◄──── FK ────  discount_code_usage                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`promotion_code::SqliteCodeRepository`] - code lookup and maintenance
//! - [`usage::UsageRepository`] - redemption history

pub mod promotion_code;
pub mod usage;

/// Increments `usage_count` only while the code is live and under its limit.
///
/// Binds: `?1` updated_at, `?2` code id. Zero rows affected means the limit
/// was already reached (or the code is gone).
pub(crate) const INCREMENT_USAGE_SQL: &str = r#"
    UPDATE discount_codes
    SET usage_count = usage_count + 1,
        updated_at = ?1
    WHERE id = ?2
      AND deleted_at IS NULL
      AND (usage_limit IS NULL OR usage_limit <= 0 OR usage_count < usage_limit)
"#;
