//! # Checkout Error Types
//!
//! Typed error handling for the purchase workflow.
//! `CheckoutService::finalize_purchase` returns `Result<T, CheckoutError>`.

use tally_core::{PolicyError, PricingError};
use thiserror::Error;

/// A failure reported by an external collaborator (stock, payment, lookup).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The collaborator could not be reached or timed out.
    #[error("{service} unavailable: {reason}")]
    Unavailable { service: String, reason: String },

    /// The collaborator answered with something we cannot use.
    #[error("{service} rejected the request: {reason}")]
    Rejected { service: String, reason: String },
}

/// Errors from the purchase workflow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No customer with this ID.
    #[error("Customer not found: {customer_id}")]
    CustomerNotFound { customer_id: String },

    /// No cart with this ID for this customer.
    #[error("Cart {cart_id} not found for customer {customer_id}")]
    CartNotFound {
        cart_id: String,
        customer_id: String,
    },

    /// At least one line cannot be fulfilled.
    #[error("Items out of stock")]
    OutOfStock,

    /// The cart could not be priced.
    #[error("Pricing failed: {0}")]
    Pricing(#[from] PricingError),

    /// The payment provider refused the charge.
    #[error("Payment not authorized")]
    PaymentDeclined,

    /// Stock could not be deducted after the payment was authorized.
    ///
    /// `compensated` tells whether the authorization was cancelled.
    #[error("Stock deduction failed (payment {transaction_id} cancelled: {compensated})")]
    StockDeductionFailed {
        transaction_id: String,
        compensated: bool,
    },

    /// An external collaborator failed.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// The pricing policy is malformed.
    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),
}

impl CheckoutError {
    /// Returns true if retrying the same purchase may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CheckoutError::Gateway(GatewayError::Unavailable { .. })
                | CheckoutError::StockDeductionFailed {
                    compensated: true,
                    ..
                }
        )
    }

    /// Returns true if the request itself was at fault (bad IDs, bad cart).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CheckoutError::CustomerNotFound { .. }
                | CheckoutError::CartNotFound { .. }
                | CheckoutError::Pricing(_)
        )
    }
}

/// Result type alias for checkout operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;
