//! Checkout orchestration
//!
//! Drives a [`CheckoutSession`] against the payment processor, the order store
//! and the coupon store. Callers hold the session's lock for the whole call,
//! which serialises coupon application, payment initiation and confirmation
//! of one order.

use super::{
    models::{CheckoutError, ConfirmedOrder, OrderStatus},
    orders::OrderStore,
    payment::{PaymentFailure, PaymentGateway, PaymentIntent},
    session::{CheckoutSession, PricingContext},
};
use crate::{
    collaborator::Collaborator,
    coupon::{self, CouponError, CouponStore, UsageOutcome},
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};

const PAYMENTS: &str = "payment gateway";
const COUPONS: &str = "coupon store";

#[derive(Clone)]
pub struct CheckoutService {
    payments: Collaborator<dyn PaymentGateway>,
    orders: Arc<dyn OrderStore>,
    coupons: Collaborator<dyn CouponStore>,
}

impl CheckoutService {
    pub fn new(
        payments: Collaborator<dyn PaymentGateway>,
        orders: Arc<dyn OrderStore>,
        coupons: Collaborator<dyn CouponStore>,
    ) -> Self {
        Self {
            payments,
            orders,
            coupons,
        }
    }

    pub fn orders(&self) -> &Arc<dyn OrderStore> {
        &self.orders
    }

    pub fn payments_configured(&self) -> bool {
        self.payments.is_configured()
    }

    pub fn coupons_configured(&self) -> bool {
        self.coupons.is_configured()
    }

    /// Validates `code` against the session's current subtotal and applies it
    pub async fn apply_coupon(
        &self,
        session: &mut CheckoutSession,
        code: &str,
        ctx: PricingContext<'_>,
        now: DateTime<Utc>,
    ) -> Result<(), CheckoutError> {
        session.ensure_editable()?;
        let store = self.coupons.get(COUPONS).map_err(|_| CouponError::Unavailable)?;
        let application =
            coupon::validate(code, session.coupon_subtotal(), now, store.as_ref()).await?;

        info!(
            session_id = %session.id(),
            code = %application.coupon.code,
            discount = %application.discount_amount,
            "applied coupon"
        );
        session.apply_coupon(application, ctx, now)
    }

    /// Opens a payment for the session's frozen amount.
    ///
    /// The applied coupon is looked up again first, since other orders may
    /// have used it up since it was applied. Calling again while the request
    /// is outstanding returns the same request. If the order cannot be
    /// recorded the request is cancelled and the session reopened.
    pub async fn initiate_payment(
        &self,
        session: &mut CheckoutSession,
        ctx: PricingContext<'_>,
        now: DateTime<Utc>,
    ) -> Result<PaymentIntent, CheckoutError> {
        if session.status() == OrderStatus::PaymentInitiated {
            if let Some(intent) = session.payment() {
                return Ok(intent.clone());
            }
        }

        self.refresh_coupon(session, ctx, now).await?;
        let gateway = self.payments.get(PAYMENTS)?;
        let request = session.payment_request(ctx.catalog)?;
        let intent = gateway.create_payment(&request).await.map_err(|err| {
            error!(session_id = %session.id(), %err, "payment initiation failed");
            CheckoutError::PaymentInitiationFailed(err.to_string())
        })?;
        session.mark_payment_initiated(intent.clone())?;

        match self.orders.save_order(&session.order_record()).await {
            Ok(number) => session.set_order_number(number),
            Err(err) => {
                error!(session_id = %session.id(), %err, "failed to record order; cancelling payment");
                if let Some(discarded) = session.reopen()? {
                    self.cancel_intent(&discarded).await;
                }
                return Err(CheckoutError::OrderPersistenceFailed(err.to_string()));
            }
        }

        info!(
            order_id = %session.id(),
            payment_reference = %intent.reference,
            amount_minor_units = intent.amount_minor_units,
            "payment initiated"
        );
        Ok(intent)
    }

    async fn refresh_coupon(
        &self,
        session: &mut CheckoutSession,
        ctx: PricingContext<'_>,
        now: DateTime<Utc>,
    ) -> Result<(), CheckoutError> {
        let Some(code) = session.coupon().map(|c| c.coupon.code.clone()) else {
            return Ok(());
        };
        let store = self.coupons.get(COUPONS).map_err(|_| CouponError::Unavailable)?;
        let latest = store.find_by_code(&code).await.map_err(|err| {
            error!(session_id = %session.id(), %code, %err, "coupon lookup failed");
            CouponError::Unavailable
        })?;
        session.refresh_coupon(latest, ctx, now)
    }

    /// Discards the outstanding payment request so the order can change again
    pub async fn reopen(&self, session: &mut CheckoutSession) -> Result<(), CheckoutError> {
        if let Some(discarded) = session.reopen()? {
            self.cancel_intent(&discarded).await;
        }
        self.save_best_effort(session).await;
        info!(order_id = %session.id(), "checkout reopened");
        Ok(())
    }

    pub async fn cancel(&self, session: &mut CheckoutSession) -> Result<(), CheckoutError> {
        if let Some(discarded) = session.mark_cancelled()? {
            self.cancel_intent(&discarded).await;
        }
        self.save_best_effort(session).await;
        info!(order_id = %session.id(), "checkout cancelled");
        Ok(())
    }

    /// Captures the payment, records the paid order, then counts the coupon.
    ///
    /// Confirming a paid order again never captures twice; it only retries
    /// whatever was not recorded the first time.
    pub async fn confirm_payment(
        &self,
        session: &mut CheckoutSession,
        reference: &str,
    ) -> Result<ConfirmedOrder, CheckoutError> {
        match session.status() {
            OrderStatus::Paid => {
                session.expect_payment(reference)?;
            }
            OrderStatus::PaymentInitiated => {
                session.expect_payment(reference)?;
                self.capture(session, reference).await?;
            }
            from => {
                return Err(CheckoutError::InvalidTransition {
                    from,
                    to: OrderStatus::Paid,
                })
            }
        }

        let order_number = match self.orders.save_order(&session.order_record()).await {
            Ok(number) => number,
            Err(err) => {
                error!(
                    order_id = %session.id(),
                    payment_reference = %reference,
                    %err,
                    "payment captured but order could not be recorded"
                );
                return Err(CheckoutError::PaidButUnrecorded {
                    payment_reference: reference.to_string(),
                });
            }
        };
        session.set_order_number(order_number.clone());

        self.record_coupon_usage(session).await;

        info!(
            order_id = %session.id(),
            order_number = %order_number,
            amount_minor_units = session.amount().amount_minor_units,
            "order paid"
        );
        Ok(ConfirmedOrder {
            order_id: session.id(),
            order_number,
            payment_reference: reference.to_string(),
            amount: session.amount().clone(),
        })
    }

    async fn capture(
        &self,
        session: &mut CheckoutSession,
        reference: &str,
    ) -> Result<(), CheckoutError> {
        let gateway = self.payments.get(PAYMENTS)?;
        match gateway.capture(reference).await {
            // The order is not recorded as paid until the difference is reviewed
            Ok(receipt) if receipt.amount_minor_units != session.amount().amount_minor_units => {
                error!(
                    order_id = %session.id(),
                    payment_reference = %reference,
                    captured = receipt.amount_minor_units,
                    expected = session.amount().amount_minor_units,
                    "captured amount differs from order amount"
                );
                Err(CheckoutError::CapturedAmountMismatch {
                    payment_reference: reference.to_string(),
                    captured: receipt.amount_minor_units,
                    expected: session.amount().amount_minor_units,
                })
            }
            Ok(_) => session.mark_paid(),
            Err(failure @ PaymentFailure::Declined(_)) => {
                warn!(order_id = %session.id(), %failure, "payment declined");
                session.mark_payment_failed()?;
                self.save_best_effort(session).await;
                Err(CheckoutError::PaymentCaptureFailed(failure.to_string()))
            }
            // Processor errors leave the request outstanding so the shopper can retry
            Err(failure) => {
                error!(order_id = %session.id(), %failure, "payment capture failed");
                Err(CheckoutError::PaymentCaptureFailed(failure.to_string()))
            }
        }
    }

    async fn record_coupon_usage(&self, session: &mut CheckoutSession) {
        if session.coupon_usage_recorded() {
            return;
        }
        let Some(coupon_id) = session.coupon().map(|c| c.coupon.id) else {
            return;
        };

        let store = match self.coupons.get(COUPONS) {
            Ok(store) => store,
            Err(err) => {
                warn!(order_id = %session.id(), %err, "coupon usage not recorded");
                return;
            }
        };
        match store.record_usage(coupon_id, session.id()).await {
            Ok(UsageOutcome::LimitReached) => {
                error!(order_id = %session.id(), %coupon_id, "coupon limit reached by a concurrent order; usage not counted");
                session.mark_coupon_usage_recorded();
            }
            Ok(outcome) => {
                info!(order_id = %session.id(), %coupon_id, ?outcome, "coupon usage recorded");
                session.mark_coupon_usage_recorded();
            }
            Err(err) => {
                warn!(order_id = %session.id(), %coupon_id, %err, "coupon usage not recorded; will retry on next confirm");
            }
        }
    }

    async fn cancel_intent(&self, intent: &PaymentIntent) {
        let Ok(gateway) = self.payments.get(PAYMENTS) else {
            return;
        };
        if let Err(err) = gateway.cancel(&intent.reference).await {
            warn!(payment_reference = %intent.reference, %err, "failed to cancel payment request");
        }
    }

    async fn save_best_effort(&self, session: &mut CheckoutSession) {
        if session.order_number().is_none() {
            return;
        }
        if let Err(err) = self.orders.save_order(&session.order_record()).await {
            warn!(order_id = %session.id(), status = %session.status(), %err, "failed to update order record");
        }
    }
}
