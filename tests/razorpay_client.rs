use storefront_api::{
    config::RazorpayConfig,
    payment::{GatewayOrderRequest, PaymentError, PaymentGateway, RazorpayClient},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{basic_auth, body_json, method, path},
};

fn client_for(api_base: &str) -> RazorpayClient {
    RazorpayClient::new(&RazorpayConfig {
        key_id: "rzp_test_key".into(),
        key_secret: "rzp_test_secret".into(),
        api_base: api_base.into(),
        currency: "INR".into(),
    })
}

fn request() -> GatewayOrderRequest {
    GatewayOrderRequest {
        amount: 84_830,
        currency: "INR".into(),
        receipt: "receipt_1700000000123".into(),
    }
}

#[tokio::test]
async fn creates_order_with_basic_auth_and_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .and(basic_auth("rzp_test_key", "rzp_test_secret"))
        .and(body_json(serde_json::json!({
            "amount": 84_830,
            "currency": "INR",
            "receipt": "receipt_1700000000123"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "order_Nx1",
            "entity": "order",
            "amount": 84_830,
            "currency": "INR",
            "receipt": "receipt_1700000000123",
            "status": "created"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let order = client_for(&server.uri()).create_order(request()).await.unwrap();
    assert_eq!(order.id, "order_Nx1");
    assert_eq!(order.amount, 84_830);
    assert_eq!(order.status.as_deref(), Some("created"));
}

#[tokio::test]
async fn trailing_slash_in_base_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "order_Nx2",
            "amount": 100,
            "currency": "INR"
        })))
        .mount(&server)
        .await;

    let order = client_for(&format!("{}/", server.uri()))
        .create_order(request())
        .await
        .unwrap();
    assert_eq!(order.id, "order_Nx2");
    assert_eq!(order.receipt, None);
}

#[tokio::test]
async fn non_success_status_becomes_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .respond_with(ResponseTemplate::new(400).set_body_string(
            r#"{"error":{"code":"BAD_REQUEST_ERROR","description":"amount exceeds maximum"}}"#,
        ))
        .mount(&server)
        .await;

    match client_for(&server.uri()).create_order(request()).await {
        Err(PaymentError::Api { status, body }) => {
            assert_eq!(status, 400);
            assert!(body.contains("amount exceeds maximum"));
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_gateway_is_a_transport_error() {
    let result = client_for("http://127.0.0.1:1").create_order(request()).await;
    assert!(matches!(result, Err(PaymentError::Transport(_))));
}

#[test]
fn exposes_public_key_and_secret() {
    let client = client_for("https://api.razorpay.com");
    assert_eq!(client.key_id(), "rzp_test_key");
    assert_eq!(client.key_secret(), "rzp_test_secret");
}
