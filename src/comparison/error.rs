use thiserror::Error;

/// Malformed input rejected at the aggregation boundary.
///
/// Missing prices or coordinates are not errors; they surface as
/// incomplete vendors and unknown distances.
#[derive(Debug, Error, PartialEq)]
pub enum ComparisonError {
    #[error("quantity {quantity} for product {product_id} must be at least 1")]
    InvalidQuantity { product_id: String, quantity: i64 },

    #[error("price {price} for product {product_id} at vendor {vendor_id} is not a non-negative number")]
    InvalidPrice {
        vendor_id: String,
        product_id: String,
        price: f64,
    },

    #[error("total quantity of the list does not fit in a 64-bit counter")]
    QuantityOverflow,

    #[error("total at vendor {vendor_id} is not a finite amount")]
    NonFiniteTotal { vendor_id: String },

    #[error("coordinates ({latitude}, {longitude}) are out of range")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("vendor {0} appears more than once in the catalog")]
    DuplicateVendor(String),
}
