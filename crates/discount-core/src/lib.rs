//! # discount-core: Discount Calculation for Shopping Carts
//!
//! Given a cart, a customer and a list of promotion codes, decides whether the
//! codes apply and how much they take off the total.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Discount Manager Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Callers (checkout service, `quote` binary)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CalculationRequest                     │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ discount-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐  ┌────────────┐  ┌────────────┐  ┌──────────┐ │   │
//! │  │   │ calculator │─►│  pipeline  │─►│   money    │  │validation│ │   │
//! │  │   │ resolve    │  │  8 stages  │  │ cents/bps  │  │ request  │ │   │
//! │  │   └─────┬──────┘  └────────────┘  └────────────┘  └──────────┘ │   │
//! │  │         │ dyn CodeRepository                                    │   │
//! │  └─────────┼───────────────────────────────────────────────────────┘   │
//! │            │                                                            │
//! │  ┌─────────▼───────────────────────────────────────────────────────┐   │
//! │  │                discount-db (SQLite store)                       │   │
//! │  │          codes, usage tracking, migrations, seeding             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`calculator`] - `DiscountCalculator`, the public entry point
//! - [`pipeline`] - the ordered validation and application stages
//! - [`repository`] - the `CodeRepository` seam plus an in-memory store
//! - [`types`] - Cart, Customer, PromotionCode, request and result DTOs
//! - [`money`] - integer cents and fixed-point discount values
//! - [`validation`] - structural request checks
//! - [`config`] - calculator behaviour switches
//! - [`error`] - error types
//!
//! ## Design Principles
//!
//! 1. **Integer Money**: every amount is cents in an `i64`; rates are basis points
//! 2. **Rejections Are Data**: an unusable code yields `is_valid = false`, not an `Err`
//! 3. **No Storage Here**: codes arrive through a trait; this crate does no I/O
//! 4. **Sequential Stacking**: each code sees the remainder left by the previous one

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calculator;
pub mod config;
pub mod error;
pub mod money;
pub mod pipeline;
pub mod repository;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use calculator::{codes_can_combine, DiscountCalculator};
pub use config::CalculatorConfig;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{DiscountValue, Money};
pub use repository::{CodeRepository, InMemoryCodeRepository};
pub use types::*;
