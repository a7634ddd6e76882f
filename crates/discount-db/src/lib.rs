//! # discount-db: Promotion Code Store
//!
//! SQLite-backed storage for promotion codes and their redemption history,
//! plus the process configuration used by the binaries.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Discount Manager Data Flow                          │
//! │                                                                         │
//! │  DiscountCalculator (discount-core)                                    │
//! │       │  dyn CodeRepository                                             │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   discount-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────────┐  ┌─────────────┐  │   │
//! │  │   │   Database    │    │   Repositories    │  │ Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                   │  │ (embedded)  │  │   │
//! │  │   │               │◄───│ SqliteCodeRepo    │  │ 001_codes   │  │   │
//! │  │   │ SqlitePool    │    │ UsageRepository   │  │ 002_usage   │  │   │
//! │  │   └───────────────┘    └───────────────────┘  └─────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (DISCOUNT_DB_PATH)                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Code and usage repositories
//! - [`config`] - Environment-driven process configuration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use discount_core::DiscountCalculator;
//! use discount_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./discounts.db")).await?;
//! let calculator = DiscountCalculator::new(Arc::new(db.codes()));
//!
//! let result = calculator.calculate(&request).await?;
//! if result.is_valid {
//!     db.usage().record_redemption(&result, "user-1", "order-42").await?;
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{AppConfig, ConfigError};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::promotion_code::SqliteCodeRepository;
pub use repository::usage::{UsageRecord, UsageRepository};
