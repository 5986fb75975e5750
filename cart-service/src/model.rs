use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Created,
    Pending,
    Succeeded,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Created => "created",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<PaymentStatus> {
        match s {
            "created" => Some(PaymentStatus::Created),
            "pending" => Some(PaymentStatus::Pending),
            "succeeded" => Some(PaymentStatus::Succeeded),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundStatus {
    Requested,
    Processing,
    Succeeded,
    Failed,
}

impl RefundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundStatus::Requested => "requested",
            RefundStatus::Processing => "processing",
            RefundStatus::Succeeded => "succeeded",
            RefundStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<RefundStatus> {
        match s {
            "requested" => Some(RefundStatus::Requested),
            "processing" => Some(RefundStatus::Processing),
            "succeeded" => Some(RefundStatus::Succeeded),
            "failed" => Some(RefundStatus::Failed),
            _ => None,
        }
    }
}

/// One attempt to move money for a cart. Status transitions are owned by the
/// payment service; this value only carries state across the boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub amount: BigDecimal,
    pub currency: String,
    pub status: PaymentStatus,
    pub provider: Option<String>,
    pub provider_ref: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A reversal of a payment. References exactly one payment.
#[derive(Debug, Clone, PartialEq)]
pub struct Refund {
    pub id: Uuid,
    pub payment_id: Uuid,
    pub amount: BigDecimal,
    pub status: RefundStatus,
    pub partner_refund_id: Option<String>,
    pub event_type: Option<String>,
    pub event_id: Option<String>,
    pub metadata: HashMap<String, String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Catalog entry for a supported payment mechanism, keyed by a stable code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentMethod {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,
}

/// Inbound partner notification handed to the payment service as an
/// audit/trigger record. Timestamps are stamped at the request boundary,
/// never taken from the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Webhook {
    pub id: Uuid,
    pub method: String,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub payload: String,
    pub partner_webhook_id: String,
    pub partner_event_type: String,
    pub partner_payment_id: String,
    pub received_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
