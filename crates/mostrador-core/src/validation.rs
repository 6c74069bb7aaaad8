//! # Validation Module
//!
//! Input checks run before any unit of work is opened.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  JSON body ──► serde (shape) ──► THIS MODULE (rules) ──► unit of work  │
//! │                                                             │           │
//! │                                  SQLite CHECK / UNIQUE ◄────┘           │
//! │                                                                         │
//! │  A request rejected here never touches the database, so it cannot      │
//! │  leave a movement or a sale behind.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use mostrador_core::validation::{validate_sku, validate_line_quantity};
//!
//! validate_sku("CAFE-250").unwrap();
//! validate_line_quantity(5).unwrap();
//! assert!(validate_line_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{CreateSaleRequest, NewCategory, NewProduct, ProductUpdate, SettingsUpdate};
use crate::{MAX_LINE_QUANTITY, MAX_PRICE_CENTS, MAX_SALE_LINES, MAX_STOCK_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_SKU_LEN: usize = 50;
const MAX_NAME_LEN: usize = 200;
const MAX_SEARCH_LEN: usize = 100;
const MAX_NOTES_LEN: usize = 500;
const MAX_DESCRIPTION_LEN: usize = 1000;
const MAX_CUSTOMER_NAME_LEN: usize = 100;
const MAX_CATEGORY_NAME_LEN: usize = 100;
/// 100% in basis points.
const MAX_TAX_RATE_BPS: u32 = 10_000;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU.
///
/// ## Rules
/// - 1 to 50 characters after trimming
/// - ASCII letters, digits, `-` and `_` only
///
/// ## Example
/// ```rust
/// use mostrador_core::validation::validate_sku;
///
/// assert!(validate_sku("CAFE-250").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("café").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > MAX_SKU_LEN {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: MAX_SKU_LEN,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name (1 to 200 characters after trimming).
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a category name (1 to 100 characters after trimming).
pub fn validate_category_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_CATEGORY_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_CATEGORY_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a catalog search query and returns it trimmed.
/// An empty query matches everything.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_LEN {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: MAX_SEARCH_LEN,
        });
    }

    Ok(query.to_string())
}

fn validate_optional_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(text) if text.chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

/// Free-text notes on sales and movements.
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<()> {
    validate_optional_text("notes", notes, MAX_NOTES_LEN)
}

pub fn validate_customer_name(name: Option<&str>) -> ValidationResult<()> {
    validate_optional_text("customer_name", name, MAX_CUSTOMER_NAME_LEN)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the quantity of one sale line.
///
/// ## Rules
/// - Must be positive
/// - Must not exceed [`MAX_LINE_QUANTITY`]
pub fn validate_line_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

fn check_at_most(field: &str, value: i64, min: i64, max: i64) -> ValidationResult<()> {
    if value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min,
            max,
        });
    }
    Ok(())
}

/// Validates a restock or debit amount (1 to [`MAX_STOCK_QUANTITY`]).
pub fn validate_stock_amount(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    check_at_most("quantity", qty, 1, MAX_STOCK_QUANTITY)
}

/// Validates a manual movement delta: any sign, not zero, magnitude at most
/// [`MAX_STOCK_QUANTITY`].
pub fn validate_movement_delta(delta: i64) -> ValidationResult<()> {
    if delta == 0 {
        return Err(ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: "must not be zero".to_string(),
        });
    }
    if delta.unsigned_abs() > MAX_STOCK_QUANTITY.unsigned_abs() {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: -MAX_STOCK_QUANTITY,
            max: MAX_STOCK_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a selling price in cents. Free items are not sold through the
/// catalog, so zero is rejected.
pub fn validate_sale_price_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "sale_price_cents".to_string(),
        });
    }
    check_at_most("sale_price_cents", cents, 1, MAX_PRICE_CENTS)
}

pub fn validate_cost_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "cost_price_cents".to_string(),
        });
    }
    check_at_most("cost_price_cents", cents, 0, MAX_PRICE_CENTS)
}

pub fn validate_min_stock(min_stock: i64) -> ValidationResult<()> {
    if min_stock < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "min_stock".to_string(),
        });
    }
    check_at_most("min_stock", min_stock, 0, MAX_STOCK_QUANTITY)
}

/// Initial stock given at product creation (zero allowed).
pub fn validate_initial_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "initial_stock".to_string(),
        });
    }
    check_at_most("initial_stock", stock, 0, MAX_STOCK_QUANTITY)
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > MAX_TAX_RATE_BPS {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate_bps".to_string(),
            min: 0,
            max: MAX_TAX_RATE_BPS as i64,
        });
    }
    Ok(())
}

pub fn validate_discount_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "discount_cents".to_string(),
        });
    }
    Ok(())
}

/// Validates the number of lines in a sale request.
pub fn validate_line_count(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if count > MAX_SALE_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_SALE_LINES as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates everything about a sale request that can be checked without
/// reading the catalog.
pub fn validate_sale_request(request: &CreateSaleRequest) -> ValidationResult<()> {
    validate_line_count(request.items.len())?;

    for line in &request.items {
        if line.product_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "product_id".to_string(),
            });
        }
        validate_line_quantity(line.quantity)?;
    }

    if let Some(bps) = request.tax_rate_bps {
        validate_tax_rate_bps(bps)?;
    }
    validate_discount_cents(request.discount_cents)?;
    validate_customer_name(request.customer_name.as_deref())?;
    validate_notes(request.notes.as_deref())?;

    Ok(())
}

pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    if let Some(sku) = &product.sku {
        validate_sku(sku)?;
    }
    if product
        .category_id
        .as_deref()
        .is_some_and(|id| id.trim().is_empty())
    {
        return Err(ValidationError::Required {
            field: "category_id".to_string(),
        });
    }
    validate_product_name(&product.name)?;
    validate_optional_text(
        "description",
        product.description.as_deref(),
        MAX_DESCRIPTION_LEN,
    )?;
    validate_sale_price_cents(product.sale_price_cents)?;
    validate_cost_price_cents(product.cost_price_cents)?;
    if let Some(min_stock) = product.min_stock {
        validate_min_stock(min_stock)?;
    }
    validate_initial_stock(product.initial_stock)?;
    Ok(())
}

/// Validates only the fields present in a partial update.
///
/// An empty `sku` is allowed: it clears the SKU.
pub fn validate_product_update(update: &ProductUpdate) -> ValidationResult<()> {
    if let Some(sku) = update.sku.as_deref().filter(|sku| !sku.trim().is_empty()) {
        validate_sku(sku)?;
    }
    if let Some(name) = &update.name {
        validate_product_name(name)?;
    }
    validate_optional_text(
        "description",
        update.description.as_deref(),
        MAX_DESCRIPTION_LEN,
    )?;
    if let Some(cents) = update.sale_price_cents {
        validate_sale_price_cents(cents)?;
    }
    if let Some(cents) = update.cost_price_cents {
        validate_cost_price_cents(cents)?;
    }
    if let Some(min_stock) = update.min_stock {
        validate_min_stock(min_stock)?;
    }
    Ok(())
}

pub fn validate_new_category(category: &NewCategory) -> ValidationResult<()> {
    validate_category_name(&category.name)?;
    validate_optional_text(
        "description",
        category.description.as_deref(),
        MAX_DESCRIPTION_LEN,
    )
}

pub fn validate_settings_update(update: &SettingsUpdate) -> ValidationResult<()> {
    if let Some(bps) = update.tax_rate_bps {
        validate_tax_rate_bps(bps)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SaleLine;

    fn line(product_id: &str, quantity: i64) -> SaleLine {
        SaleLine {
            product_id: product_id.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("CAFE-250").is_ok());
        assert!(validate_sku("pan_dulce_01").is_ok());
        assert!(validate_sku("  ").is_err());
        assert!(validate_sku(&"A".repeat(51)).is_err());
        assert!(validate_sku("CAFE 250").is_err());
        assert!(validate_sku("CAFÉ").is_err());
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Café de olla 250g").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"x".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_line_quantity() {
        assert!(validate_line_quantity(1).is_ok());
        assert!(validate_line_quantity(MAX_LINE_QUANTITY).is_ok());
        assert!(matches!(
            validate_line_quantity(0),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(validate_line_quantity(-3).is_err());
        assert!(matches!(
            validate_line_quantity(MAX_LINE_QUANTITY + 1),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_movement_delta() {
        assert!(validate_movement_delta(-4).is_ok());
        assert!(validate_movement_delta(12).is_ok());
        assert!(validate_movement_delta(0).is_err());
    }

    #[test]
    fn test_validate_prices() {
        assert!(validate_sale_price_cents(1).is_ok());
        assert!(validate_sale_price_cents(0).is_err());
        assert!(validate_cost_price_cents(0).is_ok());
        assert!(validate_cost_price_cents(-1).is_err());
    }

    #[test]
    fn test_validate_tax_rate_bps() {
        assert!(validate_tax_rate_bps(0).is_ok());
        assert!(validate_tax_rate_bps(1600).is_ok());
        assert!(validate_tax_rate_bps(10_000).is_ok());
        assert!(validate_tax_rate_bps(10_001).is_err());
    }

    #[test]
    fn test_numeric_upper_bounds() {
        assert!(validate_sale_price_cents(MAX_PRICE_CENTS).is_ok());
        assert!(matches!(
            validate_sale_price_cents(i64::MAX / 2),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(validate_cost_price_cents(MAX_PRICE_CENTS + 1).is_err());
        assert!(validate_stock_amount(MAX_STOCK_QUANTITY).is_ok());
        assert!(matches!(
            validate_stock_amount(i64::MAX),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(validate_movement_delta(-MAX_STOCK_QUANTITY).is_ok());
        assert!(matches!(
            validate_movement_delta(i64::MIN),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(validate_movement_delta(i64::MAX).is_err());
        assert!(validate_initial_stock(MAX_STOCK_QUANTITY + 1).is_err());
        assert!(validate_min_stock(i64::MAX).is_err());
    }

    #[test]
    fn test_validate_sale_request() {
        let mut request = CreateSaleRequest {
            items: vec![line("p-1", 2), line("p-2", 1)],
            ..Default::default()
        };
        assert!(validate_sale_request(&request).is_ok());

        request.items.clear();
        assert!(matches!(
            validate_sale_request(&request),
            Err(ValidationError::Required { .. })
        ));

        request.items = vec![line("p-1", 0)];
        assert!(validate_sale_request(&request).is_err());

        request.items = vec![line("", 1)];
        assert!(validate_sale_request(&request).is_err());

        request.items = (0..=MAX_SALE_LINES).map(|_| line("p-1", 1)).collect();
        assert!(validate_sale_request(&request).is_err());

        request.items = vec![line("p-1", 1)];
        request.discount_cents = -10;
        assert!(validate_sale_request(&request).is_err());
    }

    #[test]
    fn test_validate_new_product() {
        let product = NewProduct {
            sku: Some("CAFE-250".to_string()),
            name: "Café 250g".to_string(),
            sale_price_cents: 8500,
            cost_price_cents: 5000,
            ..Default::default()
        };
        assert!(validate_new_product(&product).is_ok());

        let no_price = NewProduct {
            sale_price_cents: 0,
            ..product.clone()
        };
        assert!(validate_new_product(&no_price).is_err());

        let blank_category = NewProduct {
            category_id: Some(" ".to_string()),
            ..product.clone()
        };
        assert!(validate_new_product(&blank_category).is_err());

        let negative_stock = NewProduct {
            initial_stock: -1,
            ..product
        };
        assert!(validate_new_product(&negative_stock).is_err());
    }

    #[test]
    fn test_validate_product_update_only_checks_present_fields() {
        assert!(validate_product_update(&ProductUpdate::default()).is_ok());
        let update = ProductUpdate {
            min_stock: Some(-1),
            ..Default::default()
        };
        assert!(validate_product_update(&update).is_err());

        let clear_sku = ProductUpdate {
            sku: Some(String::new()),
            ..Default::default()
        };
        assert!(validate_product_update(&clear_sku).is_ok());

        let bad_sku = ProductUpdate {
            sku: Some("CAFE 250".to_string()),
            ..Default::default()
        };
        assert!(validate_product_update(&bad_sku).is_err());
    }

    #[test]
    fn test_validate_category_and_settings() {
        let category = NewCategory {
            name: "Bebidas".to_string(),
            description: None,
        };
        assert!(validate_new_category(&category).is_ok());
        assert!(validate_new_category(&NewCategory::default()).is_err());
        assert!(validate_category_name(&"x".repeat(101)).is_err());

        assert!(validate_settings_update(&SettingsUpdate::default()).is_ok());
        let too_high = SettingsUpdate {
            tax_rate_bps: Some(10_001),
            ..Default::default()
        };
        assert!(validate_settings_update(&too_high).is_err());
    }
}
