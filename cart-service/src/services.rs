//! Capability contracts for the lifecycle services the façade delegates to,
//! plus stub implementations that let the binary run end to end without a
//! real processor behind it.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use common_http_errors::ApiError;

use crate::model::{Payment, PaymentMethod, PaymentStatus, Refund, RefundStatus, Webhook};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    Unavailable(String),
}

// Collaborator errors pass through with their message intact; only the HTTP
// status classification is added here.
impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let message = Some(err.to_string());
        match err {
            ServiceError::NotFound(_) => ApiError::NotFound { code: "not_found", trace_id: None, message },
            ServiceError::Conflict(_) => ApiError::Conflict { code: "conflict", trace_id: None, message },
            ServiceError::Rejected(_) => ApiError::BadGateway { code: "processor_rejected", trace_id: None, message },
            ServiceError::Unavailable(_) => ApiError::BadGateway { code: "upstream_unavailable", trace_id: None, message },
        }
    }
}

#[async_trait]
pub trait PaymentMethodService: Send + Sync {
    async fn get_by_code(&self, code: &str) -> Result<PaymentMethod, ServiceError>;
    async fn list(&self) -> Result<Vec<PaymentMethod>, ServiceError>;
}

#[async_trait]
pub trait PaymentService: Send + Sync {
    async fn create_payment(&self, payment: Payment) -> Result<Payment, ServiceError>;
    async fn update_payment(&self, payment: Payment, webhook: Webhook) -> Result<Payment, ServiceError>;
}

#[async_trait]
pub trait RefundService: Send + Sync {
    async fn create_refund(&self, payment: Payment, refund: Refund) -> Result<Refund, ServiceError>;
    async fn update_refund(
        &self,
        refund_id: Uuid,
        partner_refund_id: String,
        status: RefundStatus,
        event_type: String,
        event_id: String,
        metadata: HashMap<String, String>,
    ) -> Result<Refund, ServiceError>;
}

/// Catalog held in memory, seeded out of band. `list` preserves insertion
/// order.
pub struct InMemoryPaymentMethodService {
    methods: Vec<PaymentMethod>,
}

impl InMemoryPaymentMethodService {
    pub fn new(methods: Vec<PaymentMethod>) -> Self {
        Self { methods }
    }

    pub fn seeded() -> Self {
        Self::new(vec![
            PaymentMethod {
                code: "card_visa".into(),
                name: "Visa".into(),
                description: Some("Visa credit or debit card".into()),
                enabled: true,
            },
            PaymentMethod {
                code: "card_mastercard".into(),
                name: "Mastercard".into(),
                description: Some("Mastercard credit or debit card".into()),
                enabled: true,
            },
            PaymentMethod {
                code: "wallet_apple".into(),
                name: "Apple Pay".into(),
                description: None,
                enabled: false,
            },
        ])
    }
}

#[async_trait]
impl PaymentMethodService for InMemoryPaymentMethodService {
    async fn get_by_code(&self, code: &str) -> Result<PaymentMethod, ServiceError> {
        self.methods
            .iter()
            .find(|m| m.code == code)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("payment method {code} not found")))
    }

    async fn list(&self) -> Result<Vec<PaymentMethod>, ServiceError> {
        Ok(self.methods.clone())
    }
}

/// Echo-style payment lifecycle: accepts whatever the façade mapped and
/// applies the status the partner event implies.
pub struct StubPaymentService;

impl StubPaymentService {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StubPaymentService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentService for StubPaymentService {
    async fn create_payment(&self, mut payment: Payment) -> Result<Payment, ServiceError> {
        let now = Utc::now();
        payment.status = PaymentStatus::Pending;
        payment.created_at.get_or_insert(now);
        payment.updated_at = Some(now);
        Ok(payment)
    }

    async fn update_payment(&self, mut payment: Payment, webhook: Webhook) -> Result<Payment, ServiceError> {
        payment.status = match webhook.partner_event_type.as_str() {
            t if t.ends_with("succeeded") => PaymentStatus::Succeeded,
            t if t.ends_with("failed") => PaymentStatus::Failed,
            _ => PaymentStatus::Pending,
        };
        if payment.provider_ref.is_none() && !webhook.partner_payment_id.is_empty() {
            payment.provider_ref = Some(webhook.partner_payment_id);
        }
        payment.updated_at = Some(Utc::now());
        Ok(payment)
    }
}

/// Refund lifecycle over an in-memory store. Enforces the two rules the
/// façade delegates: the refund must reference the supplied payment, and its
/// amount must not exceed the payment amount.
pub struct StubRefundService {
    refunds: Mutex<HashMap<Uuid, Refund>>,
}

impl StubRefundService {
    pub fn new() -> Self {
        Self { refunds: Mutex::new(HashMap::new()) }
    }
}

impl Default for StubRefundService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RefundService for StubRefundService {
    async fn create_refund(&self, payment: Payment, mut refund: Refund) -> Result<Refund, ServiceError> {
        if refund.payment_id != payment.id {
            return Err(ServiceError::Conflict(format!(
                "refund references payment {} but payment {} was supplied",
                refund.payment_id, payment.id
            )));
        }
        if refund.amount > payment.amount {
            return Err(ServiceError::Rejected(format!(
                "refund amount {} exceeds payment amount {}",
                refund.amount, payment.amount
            )));
        }
        let now = Utc::now();
        refund.status = RefundStatus::Processing;
        refund.created_at.get_or_insert(now);
        refund.updated_at = Some(now);
        let mut refunds = self.refunds.lock().unwrap_or_else(|e| e.into_inner());
        refunds.insert(refund.id, refund.clone());
        Ok(refund)
    }

    async fn update_refund(
        &self,
        refund_id: Uuid,
        partner_refund_id: String,
        status: RefundStatus,
        event_type: String,
        event_id: String,
        metadata: HashMap<String, String>,
    ) -> Result<Refund, ServiceError> {
        let mut refunds = self.refunds.lock().unwrap_or_else(|e| e.into_inner());
        let refund = refunds
            .get_mut(&refund_id)
            .ok_or_else(|| ServiceError::NotFound(format!("refund {refund_id} not found")))?;
        if !partner_refund_id.is_empty() {
            refund.partner_refund_id = Some(partner_refund_id);
        }
        refund.status = status;
        if !event_type.is_empty() {
            refund.event_type = Some(event_type);
        }
        if !event_id.is_empty() {
            refund.event_id = Some(event_id);
        }
        refund.metadata.extend(metadata);
        refund.updated_at = Some(Utc::now());
        Ok(refund.clone())
    }
}
