//! One handler per remote operation. Each handler maps inbound wire input,
//! invokes exactly one lifecycle-service operation, and maps the result back.
//! Collaborator errors pass through untouched; mapping errors fail the
//! request before any collaborator is called.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use common_http_errors::{ApiError, ApiResult};

use crate::app::{track, AppState};
use crate::model::RefundStatus;
use crate::wire::{self, MapError, WirePayment, WirePaymentMethod, WireRefund, WireWebhook};

#[derive(Deserialize)]
pub struct CreatePaymentRequest {
    pub payment: WirePayment,
}

#[derive(Serialize)]
pub struct CreatePaymentResponse {
    pub payment: WirePayment,
}

#[derive(Deserialize)]
pub struct UpdatePaymentRequest {
    pub payment: WirePayment,
    #[serde(default)]
    pub webhook: Option<WireWebhook>,
}

#[derive(Serialize)]
pub struct UpdatePaymentResponse {
    pub payment: WirePayment,
}

#[derive(Deserialize)]
pub struct CreateRefundRequest {
    pub payment: WirePayment,
    pub refund: WireRefund,
}

#[derive(Serialize)]
pub struct CreateRefundResponse {
    pub refund: WireRefund,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRefundRequest {
    pub refund_id: String,
    #[serde(default)]
    pub partner_refund_id: String,
    pub status: String,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Serialize)]
pub struct UpdateRefundResponse {
    pub refund: WireRefund,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPaymentMethodResponse {
    pub payment_method: WirePaymentMethod,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPaymentMethodsResponse {
    pub payment_methods: Vec<WirePaymentMethod>,
}

pub async fn create_payment(
    State(state): State<AppState>,
    Json(req): Json<CreatePaymentRequest>,
) -> ApiResult<Json<CreatePaymentResponse>> {
    track("create_payment");
    let payment = wire::to_domain_payment(&req.payment)?;
    let created = state.payments.create_payment(payment).await?;
    info!(payment_id = %created.id, status = created.status.as_str(), "payment created");
    Ok(Json(CreatePaymentResponse { payment: wire::to_wire_payment(&created) }))
}

pub async fn update_payment(
    State(state): State<AppState>,
    Json(req): Json<UpdatePaymentRequest>,
) -> ApiResult<Json<UpdatePaymentResponse>> {
    track("update_payment");
    let payment = wire::to_domain_payment(&req.payment)?;
    let Some(wire_webhook) = req.webhook.as_ref() else {
        // An update is always driven by a partner event; an absent webhook is
        // malformed input, not an empty correlation.
        return Err(ApiError::BadRequest {
            code: "webhook_missing",
            trace_id: None,
            message: Some("updatePayment requires the triggering webhook".into()),
        });
    };
    let webhook = wire::to_domain_webhook(wire_webhook, Utc::now())?;
    let updated = state.payments.update_payment(payment, webhook).await?;
    info!(payment_id = %updated.id, status = updated.status.as_str(), "payment updated");
    Ok(Json(UpdatePaymentResponse { payment: wire::to_wire_payment(&updated) }))
}

pub async fn create_refund(
    State(state): State<AppState>,
    Json(req): Json<CreateRefundRequest>,
) -> ApiResult<Json<CreateRefundResponse>> {
    track("create_refund");
    // Both mappings must succeed before the refund service sees anything.
    let payment = wire::to_domain_payment(&req.payment)?;
    let refund = wire::to_domain_refund(&req.refund)?;
    let created = state.refunds.create_refund(payment, refund).await?;
    info!(refund_id = %created.id, payment_id = %created.payment_id, "refund created");
    Ok(Json(CreateRefundResponse { refund: wire::to_wire_refund(&created) }))
}

pub async fn update_refund(
    State(state): State<AppState>,
    Json(req): Json<UpdateRefundRequest>,
) -> ApiResult<Json<UpdateRefundResponse>> {
    track("update_refund");
    let refund_id = wire::parse_id(&req.refund_id, "refundId")?;
    let status = RefundStatus::from_str(&req.status).ok_or_else(|| MapError::UnknownStatus {
        field: "refundStatus",
        value: req.status.clone(),
    })?;
    let updated = state
        .refunds
        .update_refund(
            refund_id,
            req.partner_refund_id,
            status,
            req.event_type,
            req.event_id,
            req.metadata,
        )
        .await?;
    info!(refund_id = %updated.id, status = updated.status.as_str(), "refund updated");
    Ok(Json(UpdateRefundResponse { refund: wire::to_wire_refund(&updated) }))
}

pub async fn get_payment_method(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<GetPaymentMethodResponse>> {
    track("get_payment_method");
    let method = state.payment_methods.get_by_code(&code).await?;
    Ok(Json(GetPaymentMethodResponse { payment_method: wire::to_wire_payment_method(&method) }))
}

pub async fn list_payment_methods(
    State(state): State<AppState>,
) -> ApiResult<Json<ListPaymentMethodsResponse>> {
    track("list_payment_methods");
    let methods = state.payment_methods.list().await?;
    Ok(Json(ListPaymentMethodsResponse {
        payment_methods: methods.iter().map(wire::to_wire_payment_method).collect(),
    }))
}

// Catalog mutation is owned by an administrative service; nothing backs it
// behind this façade yet, so these answer 501 rather than an empty success.

pub async fn enable_payment_method() -> ApiResult<Json<GetPaymentMethodResponse>> {
    track("enable_payment_method");
    Err(ApiError::unimplemented("enablePaymentMethod"))
}

pub async fn disable_payment_method() -> ApiResult<Json<GetPaymentMethodResponse>> {
    track("disable_payment_method");
    Err(ApiError::unimplemented("disablePaymentMethod"))
}

pub async fn delete_payment_method() -> ApiResult<Json<GetPaymentMethodResponse>> {
    track("delete_payment_method");
    Err(ApiError::unimplemented("deletePaymentMethod"))
}
