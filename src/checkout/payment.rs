//! Payment processor interface
//!
//! The processor receives integer minor units and an opaque metadata map and
//! hands back a reference used to capture or cancel the payment.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentFailure {
    #[error("payment declined: {0}")]
    Declined(String),

    #[error("unknown payment reference: {0}")]
    UnknownReference(String),

    #[error("payment processor error: {0}")]
    Processor(String),
}

/// Request to open a payment for a frozen amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub amount_minor_units: i64,
    pub currency: String,
    /// Repeating a key returns the payment created the first time
    pub idempotency_key: String,
    pub metadata: BTreeMap<String, String>,
}

/// An open payment awaiting capture
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub reference: String,
    pub amount_minor_units: i64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub reference: String,
    pub amount_minor_units: i64,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment(&self, request: &PaymentRequest) -> Result<PaymentIntent, PaymentFailure>;

    /// Captures a payment; capturing twice returns the same receipt
    async fn capture(&self, reference: &str) -> Result<PaymentReceipt, PaymentFailure>;

    async fn cancel(&self, reference: &str) -> Result<(), PaymentFailure>;
}

// =============================================================================
// Sandbox Gateway
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SandboxState {
    Open,
    Captured,
    Cancelled,
}

#[derive(Debug, Clone)]
struct SandboxPayment {
    intent: PaymentIntent,
    state: SandboxState,
}

/// In-memory processor used for local runs and tests
#[derive(Default)]
pub struct SandboxGateway {
    payments: DashMap<String, SandboxPayment>,
    by_key: DashMap<String, String>,
}

impl SandboxGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_captured(&self, reference: &str) -> bool {
        self.payments
            .get(reference)
            .is_some_and(|p| p.state == SandboxState::Captured)
    }

    pub fn is_cancelled(&self, reference: &str) -> bool {
        self.payments
            .get(reference)
            .is_some_and(|p| p.state == SandboxState::Cancelled)
    }
}

#[async_trait]
impl PaymentGateway for SandboxGateway {
    async fn create_payment(&self, request: &PaymentRequest) -> Result<PaymentIntent, PaymentFailure> {
        if request.amount_minor_units <= 0 {
            return Err(PaymentFailure::Declined("amount must be positive".into()));
        }

        let reference = self
            .by_key
            .entry(request.idempotency_key.clone())
            .or_insert_with(|| format!("pi_{}", Uuid::new_v4().simple()))
            .clone();

        let payment = self
            .payments
            .entry(reference.clone())
            .or_insert_with(|| SandboxPayment {
                intent: PaymentIntent {
                    reference: reference.clone(),
                    amount_minor_units: request.amount_minor_units,
                    currency: request.currency.clone(),
                },
                state: SandboxState::Open,
            });
        Ok(payment.intent.clone())
    }

    async fn capture(&self, reference: &str) -> Result<PaymentReceipt, PaymentFailure> {
        let mut payment = self
            .payments
            .get_mut(reference)
            .ok_or_else(|| PaymentFailure::UnknownReference(reference.to_string()))?;

        match payment.state {
            SandboxState::Cancelled => Err(PaymentFailure::Processor(
                "payment was cancelled".into(),
            )),
            SandboxState::Open | SandboxState::Captured => {
                payment.state = SandboxState::Captured;
                Ok(PaymentReceipt {
                    reference: reference.to_string(),
                    amount_minor_units: payment.intent.amount_minor_units,
                })
            }
        }
    }

    async fn cancel(&self, reference: &str) -> Result<(), PaymentFailure> {
        let mut payment = self
            .payments
            .get_mut(reference)
            .ok_or_else(|| PaymentFailure::UnknownReference(reference.to_string()))?;

        if payment.state == SandboxState::Captured {
            return Err(PaymentFailure::Processor(
                "payment was already captured".into(),
            ));
        }
        payment.state = SandboxState::Cancelled;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(key: &str, amount: i64) -> PaymentRequest {
        PaymentRequest {
            amount_minor_units: amount,
            currency: "CAD".into(),
            idempotency_key: key.into(),
            metadata: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn same_key_returns_same_payment() {
        let gateway = SandboxGateway::new();
        let first = gateway.create_payment(&request("order-1", 1200)).await.unwrap();
        let again = gateway.create_payment(&request("order-1", 1200)).await.unwrap();
        assert_eq!(first, again);

        let other = gateway.create_payment(&request("order-2", 1200)).await.unwrap();
        assert_ne!(first.reference, other.reference);
    }

    #[tokio::test]
    async fn capture_is_repeatable_but_cancel_blocks_it() {
        let gateway = SandboxGateway::new();
        let intent = gateway.create_payment(&request("k", 4025)).await.unwrap();

        let receipt = gateway.capture(&intent.reference).await.unwrap();
        assert_eq!(receipt.amount_minor_units, 4025);
        assert_eq!(gateway.capture(&intent.reference).await.unwrap(), receipt);
        assert!(gateway.cancel(&intent.reference).await.is_err());

        let second = gateway.create_payment(&request("k2", 100)).await.unwrap();
        gateway.cancel(&second.reference).await.unwrap();
        assert!(gateway.is_cancelled(&second.reference));
        assert!(gateway.capture(&second.reference).await.is_err());
    }

    #[tokio::test]
    async fn zero_amounts_and_unknown_references_fail() {
        let gateway = SandboxGateway::new();
        assert!(matches!(
            gateway.create_payment(&request("z", 0)).await,
            Err(PaymentFailure::Declined(_))
        ));
        assert_eq!(
            gateway.capture("pi_missing").await,
            Err(PaymentFailure::UnknownReference("pi_missing".into()))
        );
    }
}
