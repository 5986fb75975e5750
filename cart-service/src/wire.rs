//! Wire <-> domain translation. The single place wire format drift is
//! absorbed: handlers never touch raw wire fields beyond handing them here.
//!
//! Inbound conversion validates; outbound conversion is total. Only modeled
//! fields are read, so unknown wire fields pass through untouched by serde.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use common_http_errors::ApiError;
use common_money::{normalize_scale, parse_amount, validate_currency, MoneyError};

use crate::model::{Payment, PaymentMethod, PaymentStatus, Refund, RefundStatus, Webhook};

#[derive(Debug, Error)]
pub enum MapError {
    #[error("{field} is not a well-formed id")]
    InvalidId { field: &'static str },
    #[error(transparent)]
    Money(#[from] MoneyError),
    #[error("unknown {field} value {value:?}")]
    UnknownStatus { field: &'static str, value: String },
}

impl MapError {
    fn code(&self) -> &'static str {
        match self {
            MapError::InvalidId { .. } => "invalid_id",
            MapError::Money(MoneyError::InvalidAmount(_)) => "invalid_amount",
            MapError::Money(MoneyError::NegativeAmount(_)) => "invalid_amount",
            MapError::Money(MoneyError::InvalidCurrency(_)) => "invalid_currency",
            MapError::UnknownStatus { .. } => "unknown_status",
        }
    }
}

impl From<MapError> for ApiError {
    fn from(err: MapError) -> Self {
        ApiError::BadRequest { code: err.code(), trace_id: None, message: Some(err.to_string()) }
    }
}

pub fn parse_id(raw: &str, field: &'static str) -> Result<Uuid, MapError> {
    Uuid::parse_str(raw).map_err(|_| MapError::InvalidId { field })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePayment {
    pub id: String,
    pub cart_id: String,
    pub amount: String,
    pub currency: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRefund {
    pub id: String,
    pub payment_id: String,
    pub amount: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_refund_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePaymentMethod {
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub enabled: bool,
}

/// Partner webhook as relayed by the caller. Timestamp-like wire fields are
/// deliberately not modeled here; the handler stamps all timestamps itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireWebhook {
    pub id: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub payload: String,
    #[serde(default)]
    pub partner_webhook_id: String,
    #[serde(default)]
    pub partner_event_type: String,
    #[serde(default)]
    pub partner_payment_id: String,
}

pub fn to_domain_payment(wire: &WirePayment) -> Result<Payment, MapError> {
    let id = parse_id(&wire.id, "paymentId")?;
    let cart_id = parse_id(&wire.cart_id, "cartId")?;
    let amount = parse_amount(&wire.amount)?;
    validate_currency(&wire.currency)?;
    let status = PaymentStatus::from_str(&wire.status).ok_or_else(|| MapError::UnknownStatus {
        field: "paymentStatus",
        value: wire.status.clone(),
    })?;
    Ok(Payment {
        id,
        cart_id,
        amount,
        currency: wire.currency.clone(),
        status,
        provider: wire.provider.clone(),
        provider_ref: wire.provider_ref.clone(),
        created_at: wire.created_at,
        updated_at: wire.updated_at,
    })
}

pub fn to_domain_refund(wire: &WireRefund) -> Result<Refund, MapError> {
    let id = parse_id(&wire.id, "refundId")?;
    let payment_id = parse_id(&wire.payment_id, "paymentId")?;
    let amount = parse_amount(&wire.amount)?;
    let status = RefundStatus::from_str(&wire.status).ok_or_else(|| MapError::UnknownStatus {
        field: "refundStatus",
        value: wire.status.clone(),
    })?;
    Ok(Refund {
        id,
        payment_id,
        amount,
        status,
        partner_refund_id: wire.partner_refund_id.clone(),
        event_type: wire.event_type.clone(),
        event_id: wire.event_id.clone(),
        metadata: wire.metadata.clone(),
        created_at: wire.created_at,
        updated_at: wire.updated_at,
    })
}

/// Build the audit/trigger record for a payment update. `now` is the boundary
/// timestamp; all three webhook timestamps take it regardless of wire input.
pub fn to_domain_webhook(wire: &WireWebhook, now: DateTime<Utc>) -> Result<Webhook, MapError> {
    let id = parse_id(&wire.id, "webhookId")?;
    Ok(Webhook {
        id,
        method: wire.method.clone(),
        url: wire.url.clone(),
        headers: wire.headers.clone(),
        payload: wire.payload.clone(),
        partner_webhook_id: wire.partner_webhook_id.clone(),
        partner_event_type: wire.partner_event_type.clone(),
        partner_payment_id: wire.partner_payment_id.clone(),
        received_at: now,
        created_at: now,
        updated_at: now,
    })
}

pub fn to_wire_payment(payment: &Payment) -> WirePayment {
    WirePayment {
        id: payment.id.to_string(),
        cart_id: payment.cart_id.to_string(),
        amount: normalize_scale(&payment.amount).to_string(),
        currency: payment.currency.clone(),
        status: payment.status.as_str().to_string(),
        provider: payment.provider.clone(),
        provider_ref: payment.provider_ref.clone(),
        created_at: payment.created_at,
        updated_at: payment.updated_at,
    }
}

pub fn to_wire_refund(refund: &Refund) -> WireRefund {
    WireRefund {
        id: refund.id.to_string(),
        payment_id: refund.payment_id.to_string(),
        amount: normalize_scale(&refund.amount).to_string(),
        status: refund.status.as_str().to_string(),
        partner_refund_id: refund.partner_refund_id.clone(),
        event_type: refund.event_type.clone(),
        event_id: refund.event_id.clone(),
        metadata: refund.metadata.clone(),
        created_at: refund.created_at,
        updated_at: refund.updated_at,
    }
}

pub fn to_wire_payment_method(method: &PaymentMethod) -> WirePaymentMethod {
    WirePaymentMethod {
        code: method.code.clone(),
        name: method.name.clone(),
        description: method.description.clone(),
        enabled: method.enabled,
    }
}
