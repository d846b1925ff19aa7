//! Stripe payment gateway integration.
//!
//! The amount charged always comes from a server-stored quote; nothing in
//! this module accepts a client-supplied total.

use std::collections::HashMap;
use std::str::FromStr;

use stripe::{
    CreatePaymentIntent, CreatePaymentIntentAutomaticPaymentMethods, Currency, PaymentIntent,
    PaymentIntentId, PaymentIntentStatus,
};

#[derive(Debug)]
pub enum PaymentError {
    /// The gateway rejected or could not process the request.
    Gateway(String),
    /// The intent exists but was never successfully authorized.
    NotAuthorized(PaymentIntentStatus),
    /// The intent's amount does not match the quoted amount.
    AmountMismatch { expected: i64, actual: i64 },
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentError::Gateway(msg) => write!(f, "Payment gateway error: {}", msg),
            PaymentError::NotAuthorized(status) => {
                write!(f, "Payment not authorized (status: {:?})", status)
            }
            PaymentError::AmountMismatch { expected, actual } => write!(
                f,
                "Payment amount mismatch: expected {} cents, got {}",
                expected, actual
            ),
        }
    }
}

/// Euros to integer cents, half-up.
pub fn amount_in_cents(amount: f64) -> i64 {
    ((amount * 100.0) + 0.5).floor() as i64
}

/// Creates a payment intent for a quoted amount. The quote id travels in
/// the metadata so charges can be reconciled against bookings later.
pub async fn create_intent(
    stripe: &stripe::Client,
    amount_due: f64,
    quote_id: &str,
) -> Result<PaymentIntent, PaymentError> {
    let mut create_intent = CreatePaymentIntent::new(amount_in_cents(amount_due), Currency::EUR);
    create_intent.automatic_payment_methods = Some(CreatePaymentIntentAutomaticPaymentMethods {
        enabled: true,
        allow_redirects: None,
    });

    let mut metadata = HashMap::new();
    metadata.insert("quote_id".to_string(), quote_id.to_string());
    create_intent.metadata = Some(metadata);

    PaymentIntent::create(stripe, create_intent)
        .await
        .map_err(|e| PaymentError::Gateway(e.to_string()))
}

/// The accept/reject decision for a retrieved intent: it must be
/// authorized and match the quoted amount in cents exactly.
fn check_intent(
    status: PaymentIntentStatus,
    amount: i64,
    expected: i64,
) -> Result<(), PaymentError> {
    match status {
        PaymentIntentStatus::Succeeded | PaymentIntentStatus::RequiresCapture => {}
        status => return Err(PaymentError::NotAuthorized(status)),
    }

    if amount != expected {
        return Err(PaymentError::AmountMismatch {
            expected,
            actual: amount,
        });
    }

    Ok(())
}

/// Verifies a card payment before a booking is persisted: the intent must
/// exist, be authorized, and match the quoted amount exactly.
pub async fn verify_payment(
    stripe: &stripe::Client,
    payment_intent_id: &str,
    expected_amount: f64,
) -> Result<PaymentIntent, PaymentError> {
    let intent_id = PaymentIntentId::from_str(payment_intent_id)
        .map_err(|e| PaymentError::Gateway(format!("Invalid payment intent id: {}", e)))?;

    let intent = PaymentIntent::retrieve(stripe, &intent_id, &[])
        .await
        .map_err(|e| PaymentError::Gateway(e.to_string()))?;

    check_intent(intent.status, intent.amount, amount_in_cents(expected_amount))?;

    Ok(intent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euros_convert_to_cents_half_up() {
        assert_eq!(amount_in_cents(7.50), 750);
        assert_eq!(amount_in_cents(5.00), 500);
        assert_eq!(amount_in_cents(19.99), 1999);
        assert_eq!(amount_in_cents(0.0), 0);
    }

    #[test]
    fn authorized_intents_with_the_exact_amount_pass() {
        assert!(check_intent(PaymentIntentStatus::Succeeded, 750, 750).is_ok());
        assert!(check_intent(PaymentIntentStatus::RequiresCapture, 750, 750).is_ok());
    }

    #[test]
    fn unauthorized_intent_is_rejected() {
        let err = check_intent(PaymentIntentStatus::RequiresPaymentMethod, 750, 750).unwrap_err();
        assert!(matches!(
            err,
            PaymentError::NotAuthorized(PaymentIntentStatus::RequiresPaymentMethod)
        ));

        let err = check_intent(PaymentIntentStatus::Canceled, 750, 750).unwrap_err();
        assert!(matches!(err, PaymentError::NotAuthorized(_)));
    }

    #[test]
    fn amount_mismatch_is_rejected_even_when_authorized() {
        // An intent authorized for the wrong amount must never produce a
        // paid booking, whichever direction the difference goes.
        let err = check_intent(PaymentIntentStatus::Succeeded, 500, 750).unwrap_err();
        assert!(matches!(
            err,
            PaymentError::AmountMismatch {
                expected: 750,
                actual: 500
            }
        ));

        let err = check_intent(PaymentIntentStatus::Succeeded, 1500, 750).unwrap_err();
        assert!(matches!(
            err,
            PaymentError::AmountMismatch {
                expected: 750,
                actual: 1500
            }
        ));
    }
}
