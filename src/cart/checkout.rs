//! Checkout

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::cart::{CartKind, item::CartItem};

/// What the payment collaborator is asked to charge.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    /// Kind of cart being checked out.
    pub kind: CartKind,

    /// Amount to charge the payer.
    pub grand_total: Money<'static, Currency>,

    /// Whether the payer opted in to tax relief.
    pub relief_enabled: bool,

    /// Lines being paid for, in cart order.
    pub items: Vec<CartItem>,
}

/// The payment collaborator refused or failed the charge.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("payment failed: {reason}")]
pub struct PaymentFailed {
    /// Reason reported by the payment provider.
    pub reason: String,
}

impl PaymentFailed {
    /// Create a failure with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Payment/checkout collaborator.
///
/// Implementations wrap the payment SDK; the cart only needs to know whether
/// the charge succeeded.
#[cfg_attr(test, mockall::automock)]
pub trait CheckoutHandler {
    /// Charge the payer for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentFailed`] if the charge did not go through.
    fn submit(&self, request: &CheckoutRequest) -> Result<(), PaymentFailed>;
}
