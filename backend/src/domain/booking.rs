//! Booking payment flow.
//!
//! A booking moves `Idle -> Pending -> Success | Failed`. A failed payment
//! may be retried; a successful one is final. While a payment is pending
//! further attempts are ignored.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::GigId;
use crate::domain::ports::MarketplaceApi;

/// Outcome reported by the payment processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    /// Whether the charge went through.
    pub success: bool,
}

/// Status of a booking's payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// No attempt made yet.
    #[default]
    Idle,
    /// An attempt is in flight.
    Pending,
    /// The charge succeeded.
    Success,
    /// The last attempt was declined or could not be made.
    Failed,
}

impl PaymentStatus {
    /// Whether a new attempt may start from this status.
    pub fn accepts_payment(self) -> bool {
        matches!(self, Self::Idle | Self::Failed)
    }
}

/// Payment state for booking one gig.
pub struct BookingFlow<A> {
    api: Arc<A>,
    gig_id: GigId,
    status: Mutex<PaymentStatus>,
}

impl<A> BookingFlow<A> {
    /// Start an idle booking for `gig_id`.
    pub fn new(api: Arc<A>, gig_id: GigId) -> Self {
        Self {
            api,
            gig_id,
            status: Mutex::new(PaymentStatus::Idle),
        }
    }

    /// Gig being booked.
    pub fn gig_id(&self) -> &GigId {
        &self.gig_id
    }

    /// Current payment status.
    pub fn status(&self) -> PaymentStatus {
        *self.lock()
    }

    fn lock(&self) -> MutexGuard<'_, PaymentStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A: MarketplaceApi> BookingFlow<A> {
    /// Attempt payment and return the resulting status.
    ///
    /// Calls made while a payment is pending, or after one succeeded, return
    /// the current status without contacting the processor. Transport
    /// failures count as a declined payment.
    pub async fn pay(&self) -> PaymentStatus {
        {
            let mut status = self.lock();
            if !status.accepts_payment() {
                return *status;
            }
            *status = PaymentStatus::Pending;
        }

        let mut pending = PendingPayment::new(&self.status, &self.gig_id);
        let outcome = match self.api.process_payment(&self.gig_id).await {
            Ok(PaymentReceipt { success: true }) => {
                info!(gig_id = %self.gig_id, "payment succeeded");
                PaymentStatus::Success
            }
            Ok(PaymentReceipt { success: false }) => {
                info!(gig_id = %self.gig_id, "payment declined");
                PaymentStatus::Failed
            }
            Err(error) => {
                warn!(gig_id = %self.gig_id, %error, "payment could not be processed");
                PaymentStatus::Failed
            }
        };
        pending.settle(outcome);
        outcome
    }
}

/// Marks an abandoned attempt as failed so the booking can be retried.
struct PendingPayment<'a> {
    status: &'a Mutex<PaymentStatus>,
    gig_id: &'a GigId,
    settled: bool,
}

impl<'a> PendingPayment<'a> {
    fn new(status: &'a Mutex<PaymentStatus>, gig_id: &'a GigId) -> Self {
        Self {
            status,
            gig_id,
            settled: false,
        }
    }

    fn settle(&mut self, outcome: PaymentStatus) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = outcome;
        self.settled = true;
    }
}

impl Drop for PendingPayment<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        warn!(gig_id = %self.gig_id, "payment attempt abandoned");
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = PaymentStatus::Failed;
    }
}
