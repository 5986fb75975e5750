use cart_service::wire::{to_domain_payment, to_wire_payment, WirePayment};
use serde_json::json;

// Wire payments use camelCase keys and decimal-string amounts; a full
// inbound+outbound mapping pass must reproduce the canonical input.
#[test]
fn wire_payment_json_roundtrip() {
    let input = json!({
        "id": "7b3f9c6e-6a4e-4f6e-9d11-2f6d1b6a0c01",
        "cartId": "9d5c1a2b-3e4f-4a5b-8c6d-7e8f9a0b1c02",
        "amount": "24.99",
        "currency": "USD",
        "status": "succeeded",
        "provider": "stripe",
        "providerRef": "pi_123",
        "createdAt": "2026-03-01T12:00:00Z",
        "updatedAt": "2026-03-01T12:05:00Z"
    });
    let wire: WirePayment = serde_json::from_value(input.clone()).unwrap();
    let domain = to_domain_payment(&wire).unwrap();
    let back = serde_json::to_value(to_wire_payment(&domain)).unwrap();
    assert_eq!(back, input);
}

// Unmodeled wire fields are ignored on the way in and never invented on the
// way out.
#[test]
fn unknown_wire_fields_are_ignored() {
    let input = json!({
        "id": "7b3f9c6e-6a4e-4f6e-9d11-2f6d1b6a0c01",
        "cartId": "9d5c1a2b-3e4f-4a5b-8c6d-7e8f9a0b1c02",
        "amount": "5.00",
        "currency": "EUR",
        "status": "created",
        "somethingNew": { "nested": true }
    });
    let wire: WirePayment = serde_json::from_value(input).unwrap();
    let domain = to_domain_payment(&wire).unwrap();
    let back = serde_json::to_value(to_wire_payment(&domain)).unwrap();
    assert!(back.get("somethingNew").is_none());
    assert_eq!(back["amount"], "5.00");
}
