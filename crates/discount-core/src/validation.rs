//! # Request Validation
//!
//! Structural checks run before a request reaches the pipeline.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  ├── Field presence and JSON types                                     │
//! │  └── Unknown discount type tags                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Non-negative money, quantity ≥ 1                                  │
//! │  ├── Required ids / names / customer type                              │
//! │  └── Code list shape (empty, too long, duplicated, too many)           │
//! │           │  Err(ValidationError) = request-level rejection             │
//! │           ▼                                                             │
//! │  Layer 3: Pipeline stages                                              │
//! │  └── Business rules → is_valid = false + message (never an Err)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use crate::config::{CalculatorConfig, MAX_CODE_LENGTH};
use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{CalculationRequest, Cart, Customer};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Request Validators
// =============================================================================

/// Validates a full calculation request, including its code list.
///
/// ## Example
/// ```rust
/// use discount_core::config::CalculatorConfig;
/// use discount_core::money::Money;
/// use discount_core::types::{CalculationRequest, Cart, Customer};
/// use discount_core::validation::validate_request;
///
/// let request = CalculationRequest::new(
///     Cart::with_total(Money::from_cents(15300)),
///     Customer::new("1"),
///     ["PERCENT20"],
/// );
/// assert!(validate_request(&request, &CalculatorConfig::default()).is_ok());
/// ```
pub fn validate_request(
    request: &CalculationRequest,
    config: &CalculatorConfig,
) -> ValidationResult<()> {
    validate_cart(&request.cart)?;
    validate_customer(&request.customer)?;
    validate_codes(&request.discount_codes, config.max_codes_per_request)?;
    Ok(())
}

/// Validates the cart and customer only (used when codes are chosen by the
/// calculator rather than submitted).
pub fn validate_cart_and_customer(request: &CalculationRequest) -> ValidationResult<()> {
    validate_cart(&request.cart)?;
    validate_customer(&request.customer)
}

/// Validates cart amounts and line items.
pub fn validate_cart(cart: &Cart) -> ValidationResult<()> {
    for (i, item) in cart.items.iter().enumerate() {
        if item.id.as_str().trim().is_empty() {
            return Err(ValidationError::Required {
                field: format!("cart.items[{}].id", i),
            });
        }
        if item.name.trim().is_empty() {
            return Err(ValidationError::Required {
                field: format!("cart.items[{}].name", i),
            });
        }
        validate_non_negative(&format!("cart.items[{}].unit_price", i), item.unit_price)?;
        if item.quantity < 1 {
            return Err(ValidationError::MustBePositive {
                field: format!("cart.items[{}].quantity", i),
            });
        }
    }

    validate_non_negative("cart.subtotal", cart.subtotal)?;
    validate_non_negative("cart.tax", cart.tax)?;
    validate_non_negative("cart.shipping", cart.shipping)?;
    validate_non_negative("cart.total", cart.total)?;

    Ok(())
}

/// Validates the customer's identity fields.
pub fn validate_customer(customer: &Customer) -> ValidationResult<()> {
    if customer.id.as_str().trim().is_empty() {
        return Err(ValidationError::Required {
            field: "customer.id".to_string(),
        });
    }
    if customer.customer_type.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "customer.type".to_string(),
        });
    }
    Ok(())
}

/// Validates the submitted code strings.
///
/// ## Rules
/// - at most `max_codes` entries
/// - every entry non-empty after trimming and at most 64 characters
/// - no entry submitted twice (codes are case-sensitive)
pub fn validate_codes(codes: &[String], max_codes: usize) -> ValidationResult<()> {
    if codes.len() > max_codes {
        return Err(ValidationError::OutOfRange {
            field: "discount_codes".to_string(),
            min: 0,
            max: max_codes as i64,
        });
    }

    let mut seen = HashSet::with_capacity(codes.len());
    for code in codes {
        validate_code(code)?;
        if !seen.insert(code.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "discount_codes".to_string(),
                value: code.clone(),
            });
        }
    }

    Ok(())
}

/// Validates a single code string.
pub fn validate_code(code: &str) -> ValidationResult<()> {
    if code.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "discount_codes[]".to_string(),
        });
    }
    if code.len() > MAX_CODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "discount_codes[]".to_string(),
            max: MAX_CODE_LENGTH,
        });
    }
    Ok(())
}

fn validate_non_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CartItem, ExternalId};

    fn request(codes: &[&str]) -> CalculationRequest {
        CalculationRequest::new(
            Cart::with_total(Money::from_cents(15300)),
            Customer::new("1"),
            codes.iter().copied(),
        )
    }

    #[test]
    fn test_valid_request() {
        let config = CalculatorConfig::default();
        assert!(validate_request(&request(&["PERCENT20", "FIXED10"]), &config).is_ok());
        assert!(validate_request(&request(&[]), &config).is_ok());
    }

    #[test]
    fn test_negative_total_rejected() {
        let mut req = request(&[]);
        req.cart.total = Money::from_cents(-1);
        assert_eq!(
            validate_request(&req, &CalculatorConfig::default()),
            Err(ValidationError::Negative {
                field: "cart.total".to_string()
            })
        );
    }

    #[test]
    fn test_item_rules() {
        let mut req = request(&[]);
        req.cart.items.push(CartItem {
            id: ExternalId::from(1i64),
            name: "Product 1".to_string(),
            unit_price: Money::from_cents(5000),
            quantity: 0,
        });
        assert!(matches!(
            validate_cart(&req.cart),
            Err(ValidationError::MustBePositive { .. })
        ));

        req.cart.items[0].quantity = 2;
        req.cart.items[0].name = "  ".to_string();
        assert!(matches!(
            validate_cart(&req.cart),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_customer_rules() {
        let mut customer = Customer::new("");
        assert!(validate_customer(&customer).is_err());

        customer.id = ExternalId::from(5i64);
        customer.customer_type = String::new();
        assert!(validate_customer(&customer).is_err());
    }

    #[test]
    fn test_code_list_rules() {
        assert!(matches!(
            validate_codes(&["A".to_string(), "A".to_string()], 10),
            Err(ValidationError::Duplicate { .. })
        ));
        assert!(matches!(
            validate_codes(&[" ".to_string()], 10),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_codes(&["X".repeat(65)], 10),
            Err(ValidationError::TooLong { .. })
        ));
        assert!(matches!(
            validate_codes(&["A".to_string(), "B".to_string()], 1),
            Err(ValidationError::OutOfRange { .. })
        ));
        // Codes are case-sensitive: these are distinct.
        assert!(validate_codes(&["save".to_string(), "SAVE".to_string()], 10).is_ok());
    }

    #[test]
    fn test_cart_and_customer_ignores_codes() {
        let req = request(&["DUP", "DUP"]);
        assert!(validate_cart_and_customer(&req).is_ok());
    }
}
