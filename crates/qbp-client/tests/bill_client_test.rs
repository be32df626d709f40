//! Contract tests for the bill operations.
//!
//! ## Endpoints Tested
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | PUT | `/partner/bill/v1/bills/{billId}` | `create_bill_*` |
//! | GET | `/partner/bill/v1/bills/{billId}` | `get_bill_info_*` |
//! | POST | `/partner/bill/v1/bills/{billId}/reject` | `cancel_bill_*` |

use chrono::{DateTime, Utc};
use qbp_client::{BillPaymentsClient, ClientConfig, ClientError, CreateBillParams, CLIENT_VERSION};
use qbp_core::{BillId, BillStatusValue, Currency};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(mock_server: &MockServer) -> BillPaymentsClient {
    let config = ClientConfig::local_mock(&mock_server.uri(), "test-key").unwrap();
    BillPaymentsClient::new(config).unwrap()
}

fn bill_body(bill_id: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "siteId": "270304",
        "billId": bill_id,
        "amount": {"value": "200.35", "currency": "RUB"},
        "status": {"value": status, "changedDateTime": "2030-01-01T10:00:00+03:00"},
        "customer": {"email": "payer@example.com"},
        "customFields": {"apiClient": "rust_sdk", "apiClientVersion": CLIENT_VERSION},
        "comment": "order 42",
        "creationDateTime": "2030-01-01T10:00:00+03:00",
        "expirationDateTime": "2030-01-31T10:00:00+03:00",
        "payUrl": "https://oplata.qiwi.com/form/?invoice_uid=abc"
    })
}

fn expiration() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2030-01-31T07:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

// ── PUT /{billId} ────────────────────────────────────────────────────

#[tokio::test]
async fn create_bill_sends_normalized_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/partner/bill/v1/bills/bill-001"))
        .and(header("authorization", "Bearer test-key"))
        .and(header("accept", "application/json"))
        .and(header("content-type", "application/json;charset=UTF-8"))
        .and(body_partial_json(serde_json::json!({
            "amount": {"value": "200.35", "currency": "RUB"},
            "comment": "order 42",
            "customer": {"email": "payer@example.com"},
            "customFields": {
                "themeCode": "Yvan-YKaSh",
                "apiClient": "rust_sdk",
                "apiClientVersion": CLIENT_VERSION
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(bill_body("bill-001", "WAITING")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let mut params = CreateBillParams::new(200.345, expiration());
    params.comment = Some("order 42".into());
    params.customer.email = Some("payer@example.com".into());
    params
        .custom_fields
        .insert("themeCode".into(), "Yvan-YKaSh".into());

    let bill = client
        .create_bill(&BillId::new("bill-001"), &params)
        .await
        .unwrap();
    assert_eq!(bill.bill_id.as_str(), "bill-001");
    assert_eq!(bill.amount.currency, Currency::Rub);
    assert_eq!(bill.status.value, BillStatusValue::Waiting);
    assert_eq!(bill.pay_url.as_deref(), Some("https://oplata.qiwi.com/form/?invoice_uid=abc"));
}

#[tokio::test]
async fn create_bill_sends_expiration_as_offset_timestamp() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/partner/bill/v1/bills/bill-002"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bill_body("bill-002", "WAITING")))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    client
        .create_bill(&BillId::new("bill-002"), &CreateBillParams::new(10_i32, expiration()))
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let wire = sent["expirationDateTime"].as_str().unwrap();
    assert_eq!(DateTime::parse_from_rfc3339(wire).unwrap(), expiration());
    assert_eq!(sent["amount"]["value"], "10.00");
}

#[tokio::test]
async fn create_bill_keeps_custom_field_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/partner/bill/v1/bills/bill-006"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bill_body("bill-006", "WAITING")))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let mut params = CreateBillParams::new(1_i32, expiration());
    params.custom_fields.insert("zeta".into(), "1".into());
    params.custom_fields.insert("alpha".into(), "2".into());
    client
        .create_bill(&BillId::new("bill-006"), &params)
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    let expected = format!(
        r#""customFields":{{"zeta":"1","alpha":"2","apiClient":"rust_sdk","apiClientVersion":"{CLIENT_VERSION}"}}"#
    );
    assert!(body.contains(&expected), "unexpected body: {body}");
}

#[tokio::test]
async fn create_bill_appends_success_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/partner/bill/v1/bills/bill-003"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bill_body("bill-003", "WAITING")))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let mut params = CreateBillParams::new(1_i32, expiration());
    params.success_url = Some("https://shop.example/thanks".into());

    let bill = client
        .create_bill(&BillId::new("bill-003"), &params)
        .await
        .unwrap();
    assert_eq!(
        bill.pay_url.as_deref(),
        Some(
            "https://oplata.qiwi.com/form/?invoice_uid=abc\
             &successUrl=https%3A%2F%2Fshop.example%2Fthanks"
        )
    );
}

#[tokio::test]
async fn create_bill_rejects_non_numeric_amount_without_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let result = client
        .create_bill(&BillId::new("bill-004"), &CreateBillParams::new("abc", expiration()))
        .await;
    assert!(matches!(
        result,
        Err(ClientError::Core(qbp_core::QbpError::InvalidInput(_)))
    ));
}

#[tokio::test]
async fn create_bill_surfaces_gateway_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/partner/bill/v1/bills/bill-005"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "serviceName": "invoicing-api",
            "errorCode": "auth.unauthorized",
            "description": "Unauthorized",
            "userMessage": "Unauthorized",
            "datetime": "2030-01-01T10:00:00.000+03:00",
            "traceId": "trace-123"
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client
        .create_bill(&BillId::new("bill-005"), &CreateBillParams::new(1_i32, expiration()))
        .await
        .unwrap_err();

    let api = err.api_error().expect("expected gateway error");
    assert_eq!(api.error_code, "auth.unauthorized");
    assert_eq!(api.service_name, "invoicing-api");
    assert_eq!(api.description, "Unauthorized");
    assert_eq!(api.user_message, "Unauthorized");
    assert_eq!(api.trace_id, "trace-123");
    assert!(api.datetime.is_some());
}

// ── GET /{billId} ────────────────────────────────────────────────────

#[tokio::test]
async fn get_bill_info_is_idempotent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/partner/bill/v1/bills/bill-010"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bill_body("bill-010", "PAID")))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let id = BillId::new("bill-010");
    let first = client.get_bill_info(&id).await.unwrap();
    let second = client.get_bill_info(&id).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.status.value, BillStatusValue::Paid);
    assert_eq!(first.custom_fields["apiClient"], "rust_sdk");
}

#[tokio::test]
async fn get_bill_info_sends_no_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/partner/bill/v1/bills/bill-011"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bill_body("bill-011", "WAITING")))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    client.get_bill_info(&BillId::new("bill-011")).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].body.is_empty());
}

#[tokio::test]
async fn get_bill_info_encodes_bill_id_as_one_segment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/partner/bill/v1/bills/order%2F7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bill_body("order/7", "WAITING")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let bill = client.get_bill_info(&BillId::new("order/7")).await.unwrap();
    assert_eq!(bill.bill_id.as_str(), "order/7");
}

#[tokio::test]
async fn get_bill_info_non_2xx_without_error_code() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/partner/bill/v1/bills/bill-012"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client
        .get_bill_info(&BillId::new("bill-012"))
        .await
        .unwrap_err();
    match err {
        ClientError::UnexpectedStatus { status, body, .. } => {
            assert_eq!(status, 502);
            assert_eq!(body, "Bad Gateway");
        }
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn get_bill_info_invalid_json_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/partner/bill/v1/bills/bill-013"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client
        .get_bill_info(&BillId::new("bill-013"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Core(qbp_core::QbpError::Parse(_))
    ));
}

#[tokio::test]
async fn get_bill_info_wrong_shape_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/partner/bill/v1/bills/bill-014"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"unexpected": true})))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client
        .get_bill_info(&BillId::new("bill-014"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Core(qbp_core::QbpError::Parse(_))
    ));
}

#[tokio::test]
async fn rotated_key_is_used_on_next_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/partner/bill/v1/bills/bill-015"))
        .and(header("authorization", "Bearer rotated-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bill_body("bill-015", "WAITING")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = test_client(&mock_server);
    client.set_key("rotated-key");
    client.get_bill_info(&BillId::new("bill-015")).await.unwrap();
}

#[tokio::test]
async fn unreachable_gateway_is_transport_error() {
    // Nothing listens on port 1.
    let config = ClientConfig::local_mock("http://127.0.0.1:1", "test-key").unwrap();
    let client = BillPaymentsClient::new(config).unwrap();
    let err = client
        .get_bill_info(&BillId::new("bill-016"))
        .await
        .unwrap_err();
    match err {
        ClientError::Transport { endpoint, .. } => {
            assert_eq!(endpoint, "GET /partner/bill/v1/bills/bill-016");
        }
        other => panic!("expected Transport, got {other:?}"),
    }
}

// ── POST /{billId}/reject ────────────────────────────────────────────

#[tokio::test]
async fn cancel_bill_posts_to_reject() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/partner/bill/v1/bills/bill-020/reject"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bill_body("bill-020", "REJECTED")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let bill = client.cancel_bill(&BillId::new("bill-020")).await.unwrap();
    assert_eq!(bill.status.value, BillStatusValue::Rejected);
    assert!(bill.status.value.is_final());
}

#[tokio::test]
async fn cancel_paid_bill_surfaces_gateway_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/partner/bill/v1/bills/bill-021/reject"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "serviceName": "invoicing-api",
            "errorCode": "api.invoice.already.paid",
            "description": "Bill is already paid"
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client.cancel_bill(&BillId::new("bill-021")).await.unwrap_err();
    assert_eq!(
        err.api_error().map(|e| e.error_code.as_str()),
        Some("api.invoice.already.paid")
    );
}
