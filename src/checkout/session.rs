//! Checkout session
//!
//! One order in progress: a snapshot of the cart plus the shopper's choices,
//! the frozen amount and the order status. All transitions here are
//! synchronous; talking to the payment processor and the stores is left to
//! [`super::service::CheckoutService`].

use super::{
    aggregator::finalize,
    models::{
        CheckoutError, CustomerDetails, FinalCheckoutAmount, OrderRecord, OrderStatus,
    },
    payment::{PaymentIntent, PaymentRequest},
};
use crate::{
    cart::{helpers::format_item_summary, models::Cart},
    catalog::Catalog,
    coupon::{check_coupon, Coupon, CouponApplication},
    pricing::{compute_tip, price, PricingConfig, PricingResult, TipPercentage},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};
use uuid::Uuid;

/// Catalog and rules an order is priced with
#[derive(Clone, Copy)]
pub struct PricingContext<'a> {
    pub catalog: &'a Catalog,
    pub config: &'a PricingConfig,
}

#[derive(Debug, Clone)]
pub struct CheckoutSession {
    id: Uuid,
    cart_id: String,
    cart: Cart,
    express: bool,
    tip: TipPercentage,
    coupon: Option<CouponApplication>,
    customer: Option<CustomerDetails>,
    pricing: PricingResult,
    amount: FinalCheckoutAmount,
    status: OrderStatus,
    payment: Option<PaymentIntent>,
    attempt: u32,
    order_number: Option<String>,
    coupon_usage_recorded: bool,
    notices: Vec<String>,
    /// When the order was paid or ended; no further changes after this
    closed_at: Option<DateTime<Utc>>,
}

impl CheckoutSession {
    /// Opens a priced session for a non-empty cart
    pub fn open(
        cart_id: impl Into<String>,
        cart: Cart,
        express: bool,
        ctx: PricingContext<'_>,
        now: DateTime<Utc>,
    ) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let pricing = price(&cart, express, ctx.catalog, ctx.config)?;
        let amount = finalize(&pricing, Decimal::ZERO, Decimal::ZERO)?;

        let mut session = Self {
            id: Uuid::new_v4(),
            cart_id: cart_id.into(),
            cart,
            express,
            tip: TipPercentage::None,
            coupon: None,
            customer: None,
            pricing,
            amount,
            status: OrderStatus::Draft,
            payment: None,
            attempt: 0,
            order_number: None,
            coupon_usage_recorded: false,
            notices: Vec::new(),
            closed_at: None,
        };
        session.reprice(ctx, now)?;
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn cart_id(&self) -> &str {
        &self.cart_id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn amount(&self) -> &FinalCheckoutAmount {
        &self.amount
    }

    pub fn pricing(&self) -> &PricingResult {
        &self.pricing
    }

    pub fn coupon(&self) -> Option<&CouponApplication> {
        self.coupon.as_ref()
    }

    pub fn payment(&self) -> Option<&PaymentIntent> {
        self.payment.as_ref()
    }

    pub fn order_number(&self) -> Option<&str> {
        self.order_number.as_deref()
    }

    pub fn coupon_usage_recorded(&self) -> bool {
        self.coupon_usage_recorded
    }

    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
    }

    /// Base total plus delivery; coupons are validated against this
    pub fn coupon_subtotal(&self) -> Decimal {
        self.pricing.subtotal_with_delivery()
    }

    /// Fails unless the cart, express flag, tip and coupon may still change
    pub fn ensure_editable(&self) -> Result<(), CheckoutError> {
        match self.status {
            status if status.accepts_changes() => Ok(()),
            OrderStatus::PaymentInitiated => Err(CheckoutError::AmountFrozen),
            status => Err(CheckoutError::InvalidTransition {
                from: status,
                to: OrderStatus::Priced,
            }),
        }
    }

    /// Recomputes pricing, tip, coupon discount and the final amount.
    ///
    /// The applied coupon is re-checked against the new subtotal and dropped
    /// with a notice if it no longer applies.
    pub fn reprice(&mut self, ctx: PricingContext<'_>, now: DateTime<Utc>) -> Result<(), CheckoutError> {
        self.ensure_editable()?;
        let next = self.status.transition(OrderStatus::Priced)?;

        let pricing = price(&self.cart, self.express, ctx.catalog, ctx.config)?;
        let subtotal = pricing.subtotal_with_delivery();

        if let Some(applied) = self.coupon.take() {
            match check_coupon(Some(&applied.coupon), subtotal, now) {
                Ok(rechecked) => self.coupon = Some(rechecked),
                Err(err) => {
                    warn!(session_id = %self.id, code = %applied.coupon.code, %err, "dropped coupon on reprice");
                    self.notices
                        .push(format!("Coupon {} removed: {}", applied.coupon.code, err));
                }
            }
        }

        let tip = compute_tip(pricing.base_total, pricing.delivery_fee, self.tip);
        let discount = self
            .coupon
            .as_ref()
            .map_or(Decimal::ZERO, |c| c.discount_amount);
        self.amount = finalize(&pricing, tip, discount)?;
        self.pricing = pricing;
        self.status = next;

        debug!(
            session_id = %self.id,
            final_total = %self.amount.final_total,
            amount_minor_units = self.amount.amount_minor_units,
            "repriced checkout"
        );
        Ok(())
    }

    pub fn update_cart(
        &mut self,
        cart: Cart,
        ctx: PricingContext<'_>,
        now: DateTime<Utc>,
    ) -> Result<(), CheckoutError> {
        self.ensure_editable()?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        self.cart = cart;
        self.reprice(ctx, now)
    }

    pub fn set_express(
        &mut self,
        express: bool,
        ctx: PricingContext<'_>,
        now: DateTime<Utc>,
    ) -> Result<(), CheckoutError> {
        self.ensure_editable()?;
        self.express = express;
        self.reprice(ctx, now)
    }

    pub fn set_tip(
        &mut self,
        tip: TipPercentage,
        ctx: PricingContext<'_>,
        now: DateTime<Utc>,
    ) -> Result<(), CheckoutError> {
        self.ensure_editable()?;
        self.tip = tip;
        self.reprice(ctx, now)
    }

    /// Attaches a coupon already validated against [`Self::coupon_subtotal`]
    pub fn apply_coupon(
        &mut self,
        application: CouponApplication,
        ctx: PricingContext<'_>,
        now: DateTime<Utc>,
    ) -> Result<(), CheckoutError> {
        self.ensure_editable()?;
        self.coupon = Some(application);
        self.reprice(ctx, now)
    }

    /// Re-checks the applied coupon against its current stored state.
    ///
    /// A coupon that no longer applies, for instance because other orders
    /// used it up, is dropped and the order repriced. The reason is returned
    /// so the shopper sees the new amount before paying.
    pub fn refresh_coupon(
        &mut self,
        latest: Option<Coupon>,
        ctx: PricingContext<'_>,
        now: DateTime<Utc>,
    ) -> Result<(), CheckoutError> {
        self.ensure_editable()?;
        let Some(applied) = self.coupon.take() else {
            return Ok(());
        };

        match check_coupon(latest.as_ref(), self.coupon_subtotal(), now) {
            Ok(rechecked) => {
                self.coupon = Some(rechecked);
                self.reprice(ctx, now)
            }
            Err(err) => {
                warn!(session_id = %self.id, code = %applied.coupon.code, %err, "dropped stale coupon");
                self.notices
                    .push(format!("Coupon {} removed: {}", applied.coupon.code, err));
                self.reprice(ctx, now)?;
                Err(err.into())
            }
        }
    }

    pub fn remove_coupon(
        &mut self,
        ctx: PricingContext<'_>,
        now: DateTime<Utc>,
    ) -> Result<(), CheckoutError> {
        self.ensure_editable()?;
        self.coupon = None;
        self.reprice(ctx, now)
    }

    /// Customer details do not change the amount and are not repriced
    pub fn set_customer(&mut self, details: CustomerDetails) -> Result<(), CheckoutError> {
        self.ensure_editable()?;
        details.validate()?;
        self.customer = Some(details);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Payment
    // -------------------------------------------------------------------------

    /// Builds the request for the frozen amount.
    ///
    /// The idempotency key changes on every reopen so a reopened order never
    /// reuses a cancelled payment.
    pub fn payment_request(&self, catalog: &Catalog) -> Result<PaymentRequest, CheckoutError> {
        if self.status != OrderStatus::Priced {
            return Err(CheckoutError::InvalidTransition {
                from: self.status,
                to: OrderStatus::PaymentInitiated,
            });
        }
        let customer = self.customer.as_ref().ok_or(CheckoutError::MissingCustomer)?;
        if self.amount.amount_minor_units <= 0 {
            return Err(CheckoutError::NothingToCharge);
        }

        let mut metadata = BTreeMap::new();
        metadata.insert("order_id".to_string(), self.id.to_string());
        metadata.insert("items".to_string(), format_item_summary(&self.cart, catalog));
        metadata.insert("express".to_string(), self.express.to_string());
        metadata.insert("tip_percentage".to_string(), self.tip.percent().to_string());
        metadata.insert("tip_amount".to_string(), self.amount.tip_amount.to_string());
        metadata.insert("discount_amount".to_string(), self.amount.discount_amount.to_string());
        metadata.insert("base_total".to_string(), self.amount.base_total.to_string());
        metadata.insert("delivery_fee".to_string(), self.amount.delivery_fee.to_string());
        metadata.insert("customer_email".to_string(), customer.email.clone());
        metadata.insert("customer_name".to_string(), customer.full_name.clone());
        if let Some(applied) = &self.coupon {
            metadata.insert("coupon_code".to_string(), applied.coupon.code.clone());
        }

        Ok(PaymentRequest {
            amount_minor_units: self.amount.amount_minor_units,
            currency: self.amount.currency.clone(),
            idempotency_key: format!("{}-{}", self.id, self.attempt),
            metadata,
        })
    }

    /// Freezes the amount behind an outstanding payment request
    pub fn mark_payment_initiated(&mut self, intent: PaymentIntent) -> Result<(), CheckoutError> {
        if intent.amount_minor_units != self.amount.amount_minor_units {
            return Err(CheckoutError::PaymentMismatch);
        }
        self.status = self.status.transition(OrderStatus::PaymentInitiated)?;
        self.payment = Some(intent);
        Ok(())
    }

    /// Unfreezes the order. Returns the discarded payment request, which the
    /// caller must cancel with the processor.
    pub fn reopen(&mut self) -> Result<Option<PaymentIntent>, CheckoutError> {
        self.status = self.status.transition(OrderStatus::Priced)?;
        self.attempt += 1;
        Ok(self.payment.take())
    }

    pub fn mark_cancelled(&mut self) -> Result<Option<PaymentIntent>, CheckoutError> {
        self.status = self.status.transition(OrderStatus::Cancelled)?;
        self.closed_at = Some(Utc::now());
        Ok(self.payment.take())
    }

    pub fn mark_payment_failed(&mut self) -> Result<(), CheckoutError> {
        self.status = self.status.transition(OrderStatus::PaymentFailed)?;
        self.closed_at = Some(Utc::now());
        Ok(())
    }

    /// Checks that `reference` is the outstanding payment request
    pub fn expect_payment(&self, reference: &str) -> Result<&PaymentIntent, CheckoutError> {
        match &self.payment {
            Some(intent) if intent.reference == reference => Ok(intent),
            _ => Err(CheckoutError::PaymentMismatch),
        }
    }

    pub fn mark_paid(&mut self) -> Result<(), CheckoutError> {
        self.status = self.status.transition(OrderStatus::Paid)?;
        self.closed_at = Some(Utc::now());
        Ok(())
    }

    pub fn set_order_number(&mut self, number: String) {
        self.order_number = Some(number);
    }

    pub fn mark_coupon_usage_recorded(&mut self) {
        self.coupon_usage_recorded = true;
    }

    // -------------------------------------------------------------------------
    // Views
    // -------------------------------------------------------------------------

    /// The record written to order storage, built from the frozen amount
    pub fn order_record(&self) -> OrderRecord {
        OrderRecord {
            id: self.id,
            order_number: self.order_number.clone(),
            status: self.status,
            is_express_service: self.express,
            subtotal: self.amount.base_total,
            delivery_fee: self.amount.delivery_fee,
            tip_amount: self.amount.tip_amount,
            discount_amount: self.amount.discount_amount,
            total_amount: self.amount.final_total,
            amount_minor_units: self.amount.amount_minor_units,
            currency: self.amount.currency.clone(),
            coupon_code: self.coupon.as_ref().map(|c| c.coupon.code.clone()),
            items: self.pricing.lines.clone(),
            customer: self.customer.clone(),
            service_area: self.customer.as_ref().map(CustomerDetails::service_area),
            payment_reference: self.payment.as_ref().map(|p| p.reference.clone()),
        }
    }

    pub fn view(&self) -> CheckoutView {
        CheckoutView {
            id: self.id,
            cart_id: self.cart_id.clone(),
            status: self.status,
            express: self.express,
            tip: self.tip,
            coupon_code: self.coupon.as_ref().map(|c| c.coupon.code.clone()),
            pricing: self.pricing.clone(),
            amount: self.amount.clone(),
            customer: self.customer.clone(),
            payment_reference: self.payment.as_ref().map(|p| p.reference.clone()),
            order_number: self.order_number.clone(),
            notices: self.notices.clone(),
        }
    }
}

/// Response body for the checkout endpoints
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    pub id: Uuid,
    pub cart_id: String,
    pub status: OrderStatus,
    pub express: bool,
    pub tip: TipPercentage,
    pub coupon_code: Option<String>,
    pub pricing: PricingResult,
    pub amount: FinalCheckoutAmount,
    pub customer: Option<CustomerDetails>,
    pub payment_reference: Option<String>,
    pub order_number: Option<String>,
    pub notices: Vec<String>,
}
