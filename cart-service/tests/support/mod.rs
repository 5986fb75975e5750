#![allow(dead_code)] // each test binary uses a subset of these helpers

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use bigdecimal::BigDecimal;
use tower::ServiceExt;
use uuid::Uuid;

use cart_service::model::{Payment, PaymentMethod, Refund, RefundStatus, Webhook};
use cart_service::services::{
    InMemoryPaymentMethodService, PaymentService, RefundService, ServiceError,
};
use cart_service::{build_router, AppState};

#[derive(Default)]
pub struct SpyPaymentService {
    pub created: Mutex<Vec<Payment>>,
    pub updated: Mutex<Vec<(Payment, Webhook)>>,
}

#[async_trait]
impl PaymentService for SpyPaymentService {
    async fn create_payment(&self, payment: Payment) -> Result<Payment, ServiceError> {
        self.created.lock().unwrap().push(payment.clone());
        Ok(payment)
    }

    async fn update_payment(&self, payment: Payment, webhook: Webhook) -> Result<Payment, ServiceError> {
        self.updated.lock().unwrap().push((payment.clone(), webhook));
        Ok(payment)
    }
}

pub struct UpdateRefundCall {
    pub refund_id: Uuid,
    pub partner_refund_id: String,
    pub status: RefundStatus,
    pub event_type: String,
    pub event_id: String,
    pub metadata: HashMap<String, String>,
}

#[derive(Default)]
pub struct SpyRefundService {
    pub created: Mutex<Vec<(Payment, Refund)>>,
    pub updated: Mutex<Vec<UpdateRefundCall>>,
    pub fail_next: Mutex<Option<ServiceError>>,
}

#[async_trait]
impl RefundService for SpyRefundService {
    async fn create_refund(&self, payment: Payment, refund: Refund) -> Result<Refund, ServiceError> {
        if let Some(err) = self.fail_next.lock().unwrap().take() {
            return Err(err);
        }
        self.created.lock().unwrap().push((payment, refund.clone()));
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
        if let Some(err) = self.fail_next.lock().unwrap().take() {
            return Err(err);
        }
        let refund = Refund {
            id: refund_id,
            payment_id: Uuid::new_v4(),
            amount: BigDecimal::from(0),
            status,
            partner_refund_id: Some(partner_refund_id.clone()),
            event_type: Some(event_type.clone()),
            event_id: Some(event_id.clone()),
            metadata: metadata.clone(),
            created_at: None,
            updated_at: None,
        };
        self.updated.lock().unwrap().push(UpdateRefundCall {
            refund_id,
            partner_refund_id,
            status,
            event_type,
            event_id,
            metadata,
        });
        Ok(refund)
    }
}

pub struct TestApp {
    pub app: Router,
    pub payments: Arc<SpyPaymentService>,
    pub refunds: Arc<SpyRefundService>,
}

pub fn spy_app_with_catalog(methods: Vec<PaymentMethod>) -> TestApp {
    let payments = Arc::new(SpyPaymentService::default());
    let refunds = Arc::new(SpyRefundService::default());
    let state = AppState {
        payment_methods: Arc::new(InMemoryPaymentMethodService::new(methods)),
        payments: payments.clone(),
        refunds: refunds.clone(),
    };
    TestApp { app: build_router(state), payments, refunds }
}

pub fn spy_app() -> TestApp {
    spy_app_with_catalog(vec![PaymentMethod {
        code: "card_visa".into(),
        name: "Visa".into(),
        description: None,
        enabled: true,
    }])
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(req).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.clone().oneshot(req).await.unwrap()
}

pub async fn body_json(resp: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 64).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn wire_payment_json() -> serde_json::Value {
    serde_json::json!({
        "id": "7b3f9c6e-6a4e-4f6e-9d11-2f6d1b6a0c01",
        "cartId": "9d5c1a2b-3e4f-4a5b-8c6d-7e8f9a0b1c02",
        "amount": "24.99",
        "currency": "USD",
        "status": "pending"
    })
}

pub fn wire_refund_json() -> serde_json::Value {
    serde_json::json!({
        "id": "0a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c04",
        "paymentId": "7b3f9c6e-6a4e-4f6e-9d11-2f6d1b6a0c01",
        "amount": "10.00",
        "status": "requested"
    })
}
