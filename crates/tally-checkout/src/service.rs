//! # Checkout Service
//!
//! Runs a purchase from cart to receipt.
//!
//! ## Purchase Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  finalize_purchase(cart_id, customer_id)                                │
//! │                                                                         │
//! │  find_customer ──► find_cart ──► validate lines                        │
//! │                                       │                                 │
//! │                                       ▼                                 │
//! │                              check_availability ── no ──► OutOfStock    │
//! │                                       │                                 │
//! │                                       ▼                                 │
//! │                                 engine.quote                            │
//! │                                       │                                 │
//! │                                       ▼                                 │
//! │                               authorize(total) ── no ──► PaymentDeclined│
//! │                                       │                                 │
//! │                                       ▼                                 │
//! │                                 deduct stock ── fail ──► cancel payment │
//! │                                       │                  StockDeduction-│
//! │                                       ▼                  Failed         │
//! │                                PurchaseReceipt                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lines are validated before any collaborator sees them, so a malformed
//! cart never reaches the stock or payment systems.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_core::validation::validate_cart;
use tally_core::{Cart, Money, PricingEngine};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{CheckoutError, CheckoutResult, GatewayError};
use crate::gateway::{CartStore, CustomerDirectory, PaymentGateway, StockGateway, StockRequest};

/// Proof of a completed purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    pub order_id: Uuid,
    pub cart_id: String,
    pub customer_id: String,
    pub transaction_id: String,
    /// Amount charged, rounded to cents.
    pub total: Money,
    pub completed_at: DateTime<Utc>,
    pub message: String,
}

/// Orchestrates lookups, stock, pricing and payment for one purchase.
pub struct CheckoutService {
    engine: PricingEngine,
    customers: Arc<dyn CustomerDirectory>,
    carts: Arc<dyn CartStore>,
    stock: Arc<dyn StockGateway>,
    payments: Arc<dyn PaymentGateway>,
}

impl CheckoutService {
    pub fn new(
        engine: PricingEngine,
        customers: Arc<dyn CustomerDirectory>,
        carts: Arc<dyn CartStore>,
        stock: Arc<dyn StockGateway>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        CheckoutService {
            engine,
            customers,
            carts,
            stock,
            payments,
        }
    }

    /// The engine used to price carts.
    pub fn engine(&self) -> &PricingEngine {
        &self.engine
    }

    /// Completes a purchase.
    ///
    /// ## Errors
    /// See [`CheckoutError`]. When stock deduction fails after the payment
    /// was authorized, the authorization is cancelled before returning.
    pub fn finalize_purchase(
        &self,
        cart_id: &str,
        customer_id: &str,
    ) -> CheckoutResult<PurchaseReceipt> {
        let customer = self.customers.find_customer(customer_id)?.ok_or_else(|| {
            CheckoutError::CustomerNotFound {
                customer_id: customer_id.to_string(),
            }
        })?;

        let cart = self
            .carts
            .find_cart(cart_id, &customer)?
            .ok_or_else(|| CheckoutError::CartNotFound {
                cart_id: cart_id.to_string(),
                customer_id: customer_id.to_string(),
            })?;

        validate_cart(Some(&cart))?;
        let requests = stock_requests(&cart);

        if !self.stock.check_availability(&requests)?.available {
            warn!(cart_id, customer_id, "purchase rejected: items out of stock");
            return Err(CheckoutError::OutOfStock);
        }

        let quote = self.engine.quote(Some(&cart), customer.region, customer.tier)?;
        info!(
            cart_id,
            customer_id,
            total = %quote.total,
            freight = %quote.freight,
            "cart priced"
        );

        let authorization = self.payments.authorize(&customer.id, quote.total)?;
        if !authorization.authorized {
            warn!(
                cart_id,
                customer_id,
                provider = self.payments.provider_name(),
                "payment not authorized"
            );
            return Err(CheckoutError::PaymentDeclined);
        }
        let transaction_id =
            authorization
                .transaction_id
                .ok_or_else(|| GatewayError::Rejected {
                    service: self.payments.provider_name().to_string(),
                    reason: "authorization carried no transaction id".to_string(),
                })?;

        let deducted = match self.stock.deduct(&requests) {
            Ok(deduction) => deduction.success,
            Err(err) => {
                warn!(%err, cart_id, "stock deduction call failed");
                false
            }
        };
        if !deducted {
            let compensated = self.cancel_payment(&customer.id, &transaction_id);
            return Err(CheckoutError::StockDeductionFailed {
                transaction_id,
                compensated,
            });
        }

        info!(cart_id, customer_id, %transaction_id, "purchase completed");

        Ok(PurchaseReceipt {
            order_id: Uuid::new_v4(),
            cart_id: cart_id.to_string(),
            customer_id: customer.id,
            transaction_id,
            total: quote.total,
            completed_at: Utc::now(),
            message: "Purchase completed successfully.".to_string(),
        })
    }

    /// Voids an authorization; returns whether the provider confirmed it.
    fn cancel_payment(&self, customer_id: &str, transaction_id: &str) -> bool {
        match self.payments.cancel(customer_id, transaction_id) {
            Ok(()) => {
                warn!(customer_id, transaction_id, "payment cancelled after stock failure");
                true
            }
            Err(err) => {
                warn!(%err, customer_id, transaction_id, "payment cancellation failed");
                false
            }
        }
    }
}

/// One stock request per cart line, in cart order.
pub fn stock_requests(cart: &Cart) -> Vec<StockRequest> {
    cart.present_lines()
        .filter_map(|line| {
            line.product.as_ref().map(|product| StockRequest {
                product_id: product.id.clone(),
                quantity: line.quantity,
            })
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{Authorization, Availability, Customer, StockDeduction};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tally_core::{CartLine, CustomerTier, LineDefect, PricingError, Product, ProductType, Region};

    // -------------------------------------------------------------------------
    // Fakes
    // -------------------------------------------------------------------------

    struct Directory(HashMap<String, Customer>);

    impl CustomerDirectory for Directory {
        fn find_customer(&self, customer_id: &str) -> Result<Option<Customer>, GatewayError> {
            Ok(self.0.get(customer_id).cloned())
        }
    }

    struct Carts(HashMap<String, Cart>);

    impl CartStore for Carts {
        fn find_cart(&self, cart_id: &str, _customer: &Customer) -> Result<Option<Cart>, GatewayError> {
            Ok(self.0.get(cart_id).cloned())
        }
    }

    struct Stock {
        available: bool,
        deduct: Result<bool, GatewayError>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl StockGateway for Stock {
        fn check_availability(&self, _requests: &[StockRequest]) -> Result<Availability, GatewayError> {
            self.calls.lock().unwrap().push("check");
            Ok(Availability {
                available: self.available,
            })
        }

        fn deduct(&self, _requests: &[StockRequest]) -> Result<StockDeduction, GatewayError> {
            self.calls.lock().unwrap().push("deduct");
            self.deduct
                .clone()
                .map(|success| StockDeduction { success })
        }
    }

    struct Payments {
        authorized: bool,
        charged: Mutex<Vec<Money>>,
        cancelled: Mutex<Vec<String>>,
    }

    impl PaymentGateway for Payments {
        fn authorize(&self, _customer_id: &str, amount: Money) -> Result<Authorization, GatewayError> {
            self.charged.lock().unwrap().push(amount);
            Ok(Authorization {
                authorized: self.authorized,
                transaction_id: self.authorized.then(|| "tx-42".to_string()),
            })
        }

        fn cancel(&self, _customer_id: &str, transaction_id: &str) -> Result<(), GatewayError> {
            self.cancelled.lock().unwrap().push(transaction_id.to_string());
            Ok(())
        }
    }

    struct Harness {
        service: CheckoutService,
        stock: Arc<Stock>,
        payments: Arc<Payments>,
    }

    fn lamp() -> Product {
        Product::new("lamp", Money::new(dec!(100.00)), dec!(6.00), ProductType::Furniture)
            .with_dimensions(dec!(10), dec!(10), dec!(10))
            .fragile(true)
    }

    fn harness(cart: Cart, available: bool, authorized: bool, deduct: Result<bool, GatewayError>) -> Harness {
        let customer = Customer {
            id: "cust-1".to_string(),
            name: "Ana".to_string(),
            region: Some(Region::South),
            tier: CustomerTier::Silver,
        };
        let stock = Arc::new(Stock {
            available,
            deduct,
            calls: Mutex::new(Vec::new()),
        });
        let payments = Arc::new(Payments {
            authorized,
            charged: Mutex::new(Vec::new()),
            cancelled: Mutex::new(Vec::new()),
        });
        let service = CheckoutService::new(
            PricingEngine::default(),
            Arc::new(Directory(HashMap::from([(customer.id.clone(), customer)]))),
            Arc::new(Carts(HashMap::from([(cart.id.clone(), cart)]))),
            stock.clone(),
            payments.clone(),
        );
        Harness {
            service,
            stock,
            payments,
        }
    }

    fn lamp_cart() -> Cart {
        Cart::with_lines("cart-1", [CartLine::new(lamp(), 1)])
    }

    // -------------------------------------------------------------------------
    // Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_successful_purchase() {
        let h = harness(lamp_cart(), true, true, Ok(true));

        let receipt = h.service.finalize_purchase("cart-1", "cust-1").unwrap();

        assert_eq!(receipt.total.to_string(), "108.93");
        assert_eq!(receipt.transaction_id, "tx-42");
        assert_eq!(receipt.customer_id, "cust-1");
        assert_eq!(*h.payments.charged.lock().unwrap(), vec![Money::new(dec!(108.93))]);
        assert_eq!(*h.stock.calls.lock().unwrap(), vec!["check", "deduct"]);
        assert!(h.payments.cancelled.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_customer() {
        let h = harness(lamp_cart(), true, true, Ok(true));
        let err = h.service.finalize_purchase("cart-1", "nobody").unwrap_err();
        assert!(matches!(err, CheckoutError::CustomerNotFound { .. }));
        assert!(h.stock.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_cart() {
        let h = harness(lamp_cart(), true, true, Ok(true));
        let err = h.service.finalize_purchase("cart-404", "cust-1").unwrap_err();
        assert!(matches!(err, CheckoutError::CartNotFound { .. }));
    }

    #[test]
    fn test_out_of_stock_never_charges() {
        let h = harness(lamp_cart(), false, true, Ok(true));
        let err = h.service.finalize_purchase("cart-1", "cust-1").unwrap_err();
        assert!(matches!(err, CheckoutError::OutOfStock));
        assert!(h.payments.charged.lock().unwrap().is_empty());
    }

    #[test]
    fn test_declined_payment_keeps_stock() {
        let h = harness(lamp_cart(), true, false, Ok(true));
        let err = h.service.finalize_purchase("cart-1", "cust-1").unwrap_err();
        assert!(matches!(err, CheckoutError::PaymentDeclined));
        assert_eq!(*h.stock.calls.lock().unwrap(), vec!["check"]);
    }

    #[test]
    fn test_failed_deduction_cancels_payment() {
        let h = harness(lamp_cart(), true, true, Ok(false));
        let err = h.service.finalize_purchase("cart-1", "cust-1").unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::StockDeductionFailed { ref transaction_id, compensated: true }
                if transaction_id == "tx-42"
        ));
        assert_eq!(*h.payments.cancelled.lock().unwrap(), vec!["tx-42".to_string()]);
    }

    #[test]
    fn test_deduction_outage_also_cancels_payment() {
        let outage = Err(GatewayError::Unavailable {
            service: "stock".to_string(),
            reason: "connection reset".to_string(),
        });
        let h = harness(lamp_cart(), true, true, outage);
        let err = h.service.finalize_purchase("cart-1", "cust-1").unwrap_err();
        assert!(matches!(err, CheckoutError::StockDeductionFailed { .. }));
        assert_eq!(h.payments.cancelled.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_cart_stops_before_stock_check() {
        let cart = Cart::with_lines("cart-1", [CartLine::new(lamp(), 0)]);
        let h = harness(cart, true, true, Ok(true));
        let err = h.service.finalize_purchase("cart-1", "cust-1").unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Pricing(PricingError::InvalidCartLine {
                line: 0,
                defect: LineDefect::NonPositiveQuantity
            })
        ));
        assert!(h.stock.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_stock_requests_follow_cart_lines() {
        let book = Product::new("book", Money::new(dec!(10)), dec!(1), ProductType::Book);
        let cart = Cart::with_lines("c", [CartLine::new(book, 3), CartLine::new(lamp(), 1)]);
        assert_eq!(
            stock_requests(&cart),
            vec![
                StockRequest {
                    product_id: "book".to_string(),
                    quantity: 3
                },
                StockRequest {
                    product_id: "lamp".to_string(),
                    quantity: 1
                },
            ]
        );
    }
}
