//! # Domain Types
//!
//! Records exchanged with the calculator and stored by the code repository.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Cart       │   │    Customer     │   │  PromotionCode  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  items          │   │  id (opaque)    │   │  code (unique)  │       │
//! │  │  subtotal/tax   │   │  groups         │   │  type, value    │       │
//! │  │  total (auth.)  │   │  first-time?    │   │  window, limits │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │           │                     │                     │                 │
//! │           └──────────┬──────────┘                     │                 │
//! │                      ▼                                ▼                 │
//! │            CalculationRequest ──► pipeline ──► AppliedDiscount          │
//! │                                       │                                 │
//! │                                       ▼                                 │
//! │                          DiscountCalculationResult                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! All money fields are integers in minor units (see [`crate::money`]).
//! Field names are snake_case and are the stable contract for callers.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::money::{DiscountValue, Money};

/// Free-form metadata attached to carts, customers, codes and results.
///
/// A `BTreeMap` so that serialization order is stable and two identical
/// calculations serialize to identical bytes.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Currency assumed when a cart does not name one.
pub const DEFAULT_CURRENCY: &str = "USD";

fn default_currency() -> Option<String> {
    Some(DEFAULT_CURRENCY.to_string())
}

// =============================================================================
// External Identifier
// =============================================================================

/// An opaque identifier supplied by the caller (customer id, cart item id).
///
/// Callers send either JSON strings or JSON numbers; both are normalized to
/// a string so that `123` and `"123"` identify the same customer when
/// matched against a code's `allowed_users`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, TS)]
#[ts(export)]
pub struct ExternalId(String);

impl ExternalId {
    /// Creates an identifier from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        ExternalId(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExternalId {
    fn from(id: &str) -> Self {
        ExternalId(id.to_string())
    }
}

impl From<String> for ExternalId {
    fn from(id: String) -> Self {
        ExternalId(id)
    }
}

impl From<i64> for ExternalId {
    fn from(id: i64) -> Self {
        ExternalId(id.to_string())
    }
}

impl<'de> Deserialize<'de> for ExternalId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => ExternalId(s),
            Raw::Signed(n) => ExternalId(n.to_string()),
            Raw::Unsigned(n) => ExternalId(n.to_string()),
        })
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A line item in the cart being priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartItem {
    pub id: ExternalId,
    pub name: String,
    /// Price of one unit, in cents.
    #[serde(alias = "price")]
    pub unit_price: Money,
    pub quantity: i64,
}

impl CartItem {
    /// Unit price × quantity. Informational only; the cart total is authoritative.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// The cart submitted for pricing.
///
/// ## Invariant
/// `total` is supplied by the caller and is authoritative. The calculator
/// never recomputes it from `items`, `subtotal`, `tax` or `shipping`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
    pub subtotal: Money,
    pub tax: Money,
    pub shipping: Money,
    pub total: Money,
    #[serde(default = "default_currency")]
    pub currency: Option<String>,
    #[serde(default)]
    #[ts(type = "Record<string, unknown>")]
    pub metadata: Metadata,
}

impl Cart {
    /// Creates a cart whose subtotal equals its total, with no tax or shipping.
    pub fn with_total(total: Money) -> Self {
        Cart {
            items: Vec::new(),
            subtotal: total,
            tax: Money::zero(),
            shipping: Money::zero(),
            total,
            currency: default_currency(),
            metadata: Metadata::new(),
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

/// The customer the cart belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    pub id: ExternalId,
    #[serde(rename = "type")]
    pub customer_type: String,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub segments: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub is_first_time_buyer: bool,
    #[serde(default)]
    #[ts(type = "Record<string, unknown>")]
    pub metadata: Metadata,
}

impl Customer {
    /// Creates a returning customer of type `user` with no memberships.
    pub fn new(id: impl Into<ExternalId>) -> Self {
        Customer {
            id: id.into(),
            customer_type: "user".to_string(),
            groups: Vec::new(),
            segments: Vec::new(),
            location: None,
            payment_method: None,
            is_first_time_buyer: false,
            metadata: Metadata::new(),
        }
    }

    /// Sets the group memberships.
    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Marks the customer as a first-time buyer.
    pub fn first_time_buyer(mut self) -> Self {
        self.is_first_time_buyer = true;
        self
    }
}

// =============================================================================
// Discount Type
// =============================================================================

/// The closed set of promotion types a code can declare.
///
/// Only `Percentage`, `FixedAmount` and `PercentageWithCap` carry an amount
/// rule. `SpecificUser`, `SpecificGroup` and `FirstTimeBuyer` are restriction
/// types checked by their own stages. Every other variant is accepted by the
/// schema but contributes a zero amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    FixedAmount,
    PercentageWithCap,
    SpecificUser,
    SpecificGroup,
    SpecificProduct,
    Bogo,
    BuyXGetY,
    WithExpiry,
    FirstNUsers,
    MinimumBasket,
    Bundle,
    CategoryBased,
    Shipping,
    LoyaltyPoints,
    Referral,
    BulkPurchase,
    PaymentMethod,
    FirstTimeBuyer,
    Seasonal,
    LimitedQuantity,
    LocationBased,
    CustomerSegment,
    Membership,
    GiftCard,
    Tiered,
    Flash,
    UserAnniversary,
    AppExclusive,
    FreeGift,
    Upgrade,
    Subscription,
    Milestone,
    ReferAFriend,
    ProductLaunch,
    DonationBased,
    BuyMoreSaveMore,
    Combo,
    Exchange,
}

impl DiscountType {
    /// Every declared variant, in declaration order.
    pub const ALL: [DiscountType; 39] = [
        DiscountType::Percentage,
        DiscountType::FixedAmount,
        DiscountType::PercentageWithCap,
        DiscountType::SpecificUser,
        DiscountType::SpecificGroup,
        DiscountType::SpecificProduct,
        DiscountType::Bogo,
        DiscountType::BuyXGetY,
        DiscountType::WithExpiry,
        DiscountType::FirstNUsers,
        DiscountType::MinimumBasket,
        DiscountType::Bundle,
        DiscountType::CategoryBased,
        DiscountType::Shipping,
        DiscountType::LoyaltyPoints,
        DiscountType::Referral,
        DiscountType::BulkPurchase,
        DiscountType::PaymentMethod,
        DiscountType::FirstTimeBuyer,
        DiscountType::Seasonal,
        DiscountType::LimitedQuantity,
        DiscountType::LocationBased,
        DiscountType::CustomerSegment,
        DiscountType::Membership,
        DiscountType::GiftCard,
        DiscountType::Tiered,
        DiscountType::Flash,
        DiscountType::UserAnniversary,
        DiscountType::AppExclusive,
        DiscountType::FreeGift,
        DiscountType::Upgrade,
        DiscountType::Subscription,
        DiscountType::Milestone,
        DiscountType::ReferAFriend,
        DiscountType::ProductLaunch,
        DiscountType::DonationBased,
        DiscountType::BuyMoreSaveMore,
        DiscountType::Combo,
        DiscountType::Exchange,
    ];

    /// The snake_case tag used in storage and on the wire.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::FixedAmount => "fixed_amount",
            DiscountType::PercentageWithCap => "percentage_with_cap",
            DiscountType::SpecificUser => "specific_user",
            DiscountType::SpecificGroup => "specific_group",
            DiscountType::SpecificProduct => "specific_product",
            DiscountType::Bogo => "bogo",
            DiscountType::BuyXGetY => "buy_x_get_y",
            DiscountType::WithExpiry => "with_expiry",
            DiscountType::FirstNUsers => "first_n_users",
            DiscountType::MinimumBasket => "minimum_basket",
            DiscountType::Bundle => "bundle",
            DiscountType::CategoryBased => "category_based",
            DiscountType::Shipping => "shipping",
            DiscountType::LoyaltyPoints => "loyalty_points",
            DiscountType::Referral => "referral",
            DiscountType::BulkPurchase => "bulk_purchase",
            DiscountType::PaymentMethod => "payment_method",
            DiscountType::FirstTimeBuyer => "first_time_buyer",
            DiscountType::Seasonal => "seasonal",
            DiscountType::LimitedQuantity => "limited_quantity",
            DiscountType::LocationBased => "location_based",
            DiscountType::CustomerSegment => "customer_segment",
            DiscountType::Membership => "membership",
            DiscountType::GiftCard => "gift_card",
            DiscountType::Tiered => "tiered",
            DiscountType::Flash => "flash",
            DiscountType::UserAnniversary => "user_anniversary",
            DiscountType::AppExclusive => "app_exclusive",
            DiscountType::FreeGift => "free_gift",
            DiscountType::Upgrade => "upgrade",
            DiscountType::Subscription => "subscription",
            DiscountType::Milestone => "milestone",
            DiscountType::ReferAFriend => "refer_a_friend",
            DiscountType::ProductLaunch => "product_launch",
            DiscountType::DonationBased => "donation_based",
            DiscountType::BuyMoreSaveMore => "buy_more_save_more",
            DiscountType::Combo => "combo",
            DiscountType::Exchange => "exchange",
        }
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiscountType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown discount type '{}'", s))
    }
}

// =============================================================================
// Discount Status
// =============================================================================

/// Lifecycle status of a promotion code, derived at read time and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountStatus {
    Active,
    Inactive,
    Expired,
    Depleted,
    Scheduled,
    /// Declared for storage compatibility; never derived.
    Paused,
    /// Declared for storage compatibility; never derived.
    Archived,
}

impl DiscountStatus {
    /// Short human-readable reason used in validity messages.
    pub const fn describe(&self) -> &'static str {
        match self {
            DiscountStatus::Active => "is active",
            DiscountStatus::Inactive => "is inactive",
            DiscountStatus::Expired => "has expired",
            DiscountStatus::Depleted => "has reached its usage limit",
            DiscountStatus::Scheduled => "has not started yet",
            DiscountStatus::Paused => "is paused",
            DiscountStatus::Archived => "is archived",
        }
    }
}

// =============================================================================
// Conditions
// =============================================================================

/// Typed view of a code's `conditions` map.
///
/// Keys the pipeline does not read are kept in `extra` so a code survives a
/// load/store round trip unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_users: Vec<ExternalId>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_groups: Vec<String>,

    /// Dedicated cap for `percentage_with_cap`, in cents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_discount: Option<Money>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Conditions {
    /// Returns true when `id` is listed in `allowed_users`.
    pub fn allows_user(&self, id: &ExternalId) -> bool {
        self.allowed_users.iter().any(|allowed| allowed == id)
    }

    /// Returns true when any of `groups` is listed in `allowed_groups`.
    pub fn allows_any_group(&self, groups: &[String]) -> bool {
        groups
            .iter()
            .any(|group| self.allowed_groups.iter().any(|allowed| allowed == group))
    }
}

// =============================================================================
// Promotion Code
// =============================================================================

/// A stored promotion code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PromotionCode {
    pub id: i64,
    /// Unique, case-sensitive business key.
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub discount_type: DiscountType,
    /// Rate, amount or cap depending on `discount_type`; hundredths.
    pub value: DiscountValue,
    #[serde(default)]
    pub minimum_basket_value: Option<Money>,
    #[serde(default)]
    pub usage_limit: Option<i64>,
    #[serde(default)]
    pub usage_count: i64,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    #[serde(default)]
    pub is_exclusive: bool,
    #[serde(default)]
    pub can_be_combined: bool,
    #[serde(default)]
    #[ts(type = "Record<string, unknown>")]
    pub conditions: Conditions,
    #[serde(default)]
    #[ts(type = "Record<string, unknown>")]
    pub metadata: Metadata,
}

impl PromotionCode {
    /// Creates an active, unlimited, combinable code with no window.
    pub fn new(
        id: i64,
        code: impl Into<String>,
        discount_type: DiscountType,
        value: DiscountValue,
    ) -> Self {
        let code = code.into();
        PromotionCode {
            id,
            name: code.clone(),
            code,
            description: None,
            discount_type,
            value,
            minimum_basket_value: None,
            usage_limit: None,
            usage_count: 0,
            starts_at: None,
            expires_at: None,
            is_active: true,
            is_exclusive: false,
            can_be_combined: true,
            conditions: Conditions::default(),
            metadata: Metadata::new(),
        }
    }

    /// Returns the usage limit when one is in force.
    ///
    /// A limit of zero is treated as "no limit", matching how the store's
    /// nullable column has always been read.
    pub fn effective_usage_limit(&self) -> Option<i64> {
        self.usage_limit.filter(|limit| *limit > 0)
    }

    /// Returns the minimum basket value when one is in force (zero means none).
    pub fn effective_minimum_basket(&self) -> Option<Money> {
        self.minimum_basket_value.filter(|min| min.is_positive())
    }

    /// True once `expires_at` is at or before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| expires <= now)
    }

    /// True while `starts_at` is still after `now`.
    pub fn is_scheduled_at(&self, now: DateTime<Utc>) -> bool {
        self.starts_at.is_some_and(|starts| starts > now)
    }

    /// True when a usage limit is set and has been reached.
    pub fn is_depleted(&self) -> bool {
        self.effective_usage_limit()
            .is_some_and(|limit| self.usage_count >= limit)
    }

    /// Derives the status at `now`.
    ///
    /// ## Precedence
    /// ```text
    /// is_active == false  ──► Inactive
    /// expired             ──► Expired
    /// limit reached       ──► Depleted
    /// not yet started     ──► Scheduled
    /// otherwise           ──► Active
    /// ```
    pub fn status_at(&self, now: DateTime<Utc>) -> DiscountStatus {
        if !self.is_active {
            return DiscountStatus::Inactive;
        }
        if self.is_expired_at(now) {
            return DiscountStatus::Expired;
        }
        if self.is_depleted() {
            return DiscountStatus::Depleted;
        }
        if self.is_scheduled_at(now) {
            return DiscountStatus::Scheduled;
        }
        DiscountStatus::Active
    }

    /// True when the derived status is `Active`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.status_at(now) == DiscountStatus::Active
    }

    /// True when the code could be chosen by a maximum-discount query at `now`:
    /// active flag set, not expired, under its usage limit.
    ///
    /// Unlike [`PromotionCode::is_valid_at`] this ignores `starts_at`, so a
    /// scheduled code is still returned (and then rejected by the pipeline).
    pub fn is_eligible_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired_at(now) && !self.is_depleted()
    }
}

// =============================================================================
// Applied Discount
// =============================================================================

/// One code's contribution to a calculation. Created only by the
/// application stage and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AppliedDiscount {
    pub discount_code: PromotionCode,
    pub amount: Money,
    #[ts(as = "String")]
    pub applied_at: DateTime<Utc>,
}

// =============================================================================
// Requests and Results
// =============================================================================

/// Input to `calculate` and `get_maximum_discount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CalculationRequest {
    pub cart: Cart,
    pub customer: Customer,
    /// Code strings in the order they should be applied.
    #[serde(default)]
    pub discount_codes: Vec<String>,
    #[serde(default)]
    #[ts(type = "Record<string, unknown>")]
    pub metadata: Metadata,
}

impl CalculationRequest {
    /// Creates a request for the given codes.
    pub fn new<I, S>(cart: Cart, customer: Customer, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CalculationRequest {
            cart,
            customer,
            discount_codes: codes.into_iter().map(Into::into).collect(),
            metadata: Metadata::new(),
        }
    }
}

/// Outcome of a calculation.
///
/// A rejected code is reported here with `is_valid == false` and a message;
/// it is never an `Err`.
///
/// ## Invariants
/// - `final_total == original_cart.total - total_discount`
/// - `is_valid == false` implies `total_discount == 0` and no applied discounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountCalculationResult {
    pub original_cart: Cart,
    pub applied_discounts: Vec<AppliedDiscount>,
    pub total_discount: Money,
    pub final_total: Money,
    pub is_valid: bool,
    pub error_message: Option<String>,
    #[ts(type = "Record<string, unknown>")]
    pub metadata: Metadata,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn percent20() -> PromotionCode {
        PromotionCode::new(1, "PERCENT20", DiscountType::Percentage, DiscountValue::from_whole(20))
    }

    #[test]
    fn test_status_precedence() {
        let now = Utc::now();

        let mut code = percent20();
        assert_eq!(code.status_at(now), DiscountStatus::Active);

        code.starts_at = Some(now + Duration::days(1));
        assert_eq!(code.status_at(now), DiscountStatus::Scheduled);

        code.usage_limit = Some(5);
        code.usage_count = 5;
        assert_eq!(code.status_at(now), DiscountStatus::Depleted);

        code.expires_at = Some(now - Duration::days(1));
        assert_eq!(code.status_at(now), DiscountStatus::Expired);

        code.is_active = false;
        assert_eq!(code.status_at(now), DiscountStatus::Inactive);
    }

    #[test]
    fn test_zero_limit_means_unlimited() {
        let mut code = percent20();
        code.usage_limit = Some(0);
        code.usage_count = 12;
        assert!(!code.is_depleted());
        assert_eq!(code.effective_usage_limit(), None);
    }

    #[test]
    fn test_eligibility_ignores_start_date() {
        let now = Utc::now();
        let mut code = percent20();
        code.starts_at = Some(now + Duration::hours(2));

        assert!(code.is_eligible_at(now));
        assert!(!code.is_valid_at(now));
    }

    #[test]
    fn test_discount_type_tags() {
        assert_eq!(DiscountType::ALL.len(), 39);
        for t in DiscountType::ALL {
            assert_eq!(t.as_str().parse::<DiscountType>(), Ok(t));
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
        }
        assert!("half_off".parse::<DiscountType>().is_err());
    }

    #[test]
    fn test_external_id_accepts_numbers_and_strings() {
        let from_number: ExternalId = serde_json::from_str("123").unwrap();
        let from_string: ExternalId = serde_json::from_str("\"123\"").unwrap();
        assert_eq!(from_number, from_string);
        assert_eq!(serde_json::to_string(&from_number).unwrap(), "\"123\"");
    }

    #[test]
    fn test_conditions_preserve_unknown_keys() {
        let json = r#"{"allowed_users":[123],"product_categories":["summer"]}"#;
        let conditions: Conditions = serde_json::from_str(json).unwrap();

        assert!(conditions.allows_user(&ExternalId::from(123i64)));
        assert!(!conditions.allows_user(&ExternalId::from(456i64)));
        assert!(conditions.extra.contains_key("product_categories"));

        let back = serde_json::to_value(&conditions).unwrap();
        assert_eq!(back["product_categories"][0], "summer");
    }

    #[test]
    fn test_cart_deserializes_with_defaults() {
        let json = r#"{
            "items": [{"id": 1, "name": "Product 1", "price": 5000, "quantity": 2}],
            "subtotal": 13000, "tax": 1300, "shipping": 1000, "total": 15300
        }"#;
        let cart: Cart = serde_json::from_str(json).unwrap();

        assert_eq!(cart.total, Money::from_cents(15300));
        assert_eq!(cart.currency.as_deref(), Some(DEFAULT_CURRENCY));
        assert_eq!(cart.items[0].line_total(), Money::from_cents(10000));
    }

    #[test]
    fn test_customer_type_field_name() {
        let json = r#"{"id": 7, "type": "retail", "groups": ["vip"]}"#;
        let customer: Customer = serde_json::from_str(json).unwrap();
        assert_eq!(customer.customer_type, "retail");
        assert!(!customer.is_first_time_buyer);
    }
}
