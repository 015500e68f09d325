//! Integration tests for the gateway client using wiremock
//!
//! These tests drive `GatewayClient` over the real `HttpTransport` against
//! mocked endpoints, covering request rendering, status handling, empty
//! bodies and pagination.

use apigw_bridge::gateway::{
    format_gateway_error, ApiKeySigner, CallContext, GatewayClient, HttpTransport, NoAuth, Signer,
    API_KEY_HEADER,
};
use apigw_bridge::{AdapterError, Request, TransportError};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, signer: Arc<dyn Signer>) -> GatewayClient {
    let transport = HttpTransport::new("apigw-test", signer).expect("client should build");
    GatewayClient::new(&format!("{}/api/v1", server.uri()), Arc::new(transport))
        .expect("base URL should parse")
}

/// Test module for request rendering
mod request_tests {
    use super::*;

    /// Test create-api sends only the set body fields under wire keys
    #[tokio::test]
    async fn test_create_api_body_and_path() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/products/p1/apis"))
            .and(body_json(json!({"apiName": "demo"})))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "api": {"apiId": "a1", "apiName": "demo", "productId": "p1", "isDeleted": false}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(NoAuth));
        let request = Request::new().set("product_id", "p1").set("api_name", "demo");

        let response = client
            .execute_key(&CallContext::new(), "create-api", &request)
            .await
            .expect("call should succeed");

        let api = response.record("api").expect("api should be present");
        assert_eq!(api.str("api_id"), Some("a1"));
        assert_eq!(api.bool("is_deleted"), Some(false));
        assert!(api.get("api_description").unwrap().is_null());
    }

    /// Test path values are percent-encoded
    #[tokio::test]
    async fn test_path_values_are_encoded() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/products/a%20b"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"product": {"productId": "a b"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(NoAuth));
        let response = client
            .execute_key(
                &CallContext::new(),
                "get-product",
                &Request::new().set("product_id", "a b"),
            )
            .await
            .expect("call should succeed");

        assert_eq!(response.record("product").unwrap().str("product_id"), Some("a b"));
    }

    /// Test required query parameters use their wire key
    #[tokio::test]
    async fn test_required_query_param() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/api/v1/api-keys/k1/regenerate"))
            .and(query_param("keyType", "PRIMARY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "apiKey": {"apiKeyId": "k1", "primaryKey": "new"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(NoAuth));
        let request = Request::new()
            .set("api_key_id", "k1")
            .set("key_type", "PRIMARY");

        let response = client
            .execute_key(&CallContext::new(), "regenerate-api-key", &request)
            .await
            .expect("call should succeed");
        assert_eq!(
            response.record("api_key").unwrap().str("primary_key"),
            Some("new")
        );
    }

    /// Test request id and API key headers are attached
    #[tokio::test]
    async fn test_request_headers() {
        let server = MockServer::start().await;
        let ctx = CallContext::new();

        Mock::given(method("DELETE"))
            .and(path("/api/v1/products/p1"))
            .and(header(API_KEY_HEADER, "secret"))
            .and(header("x-request-id", ctx.request_id.to_string().as_str()))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(ApiKeySigner::new("secret")));
        client
            .execute_key(&ctx, "delete-product", &Request::new().set("product_id", "p1"))
            .await
            .expect("call should succeed");
    }
}

/// Test module for response and error handling
mod response_tests {
    use super::*;

    /// Test 404 response surfaces the status and a friendly message
    #[tokio::test]
    async fn test_404_is_transport_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/products/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"errorCode": "404", "message": "Not Found"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(NoAuth));
        let err = client
            .execute_key(
                &CallContext::new(),
                "get-product",
                &Request::new().set("product_id", "missing"),
            )
            .await
            .unwrap_err();

        assert_eq!(err.endpoint(), Some("get-product"));
        assert_eq!(err.status(), Some(404));
        assert_eq!(format_gateway_error(&err), "Resource not found.");
    }

    /// Test delete accepts an empty body
    #[tokio::test]
    async fn test_204_delete_returns_empty_record() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/v1/usage-plans/u1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(NoAuth));
        let response = client
            .execute_key(
                &CallContext::new(),
                "delete-usage-plan",
                &Request::new().set("usage_plan_id", "u1"),
            )
            .await
            .expect("call should succeed");
        assert!(response.is_empty());
    }

    /// Test an empty success body is an error when a body is expected
    #[tokio::test]
    async fn test_empty_body_is_nil_response() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/usage-plans/u1"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(NoAuth));
        let err = client
            .execute_key(
                &CallContext::new(),
                "get-usage-plan",
                &Request::new().set("usage_plan_id", "u1"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::NilResponse { .. }));
    }

    /// Test a non-object success body is rejected by the transport
    #[tokio::test]
    async fn test_array_body_is_unexpected() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/usage-plans/u1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2])))
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(NoAuth));
        let err = client
            .execute_key(
                &CallContext::new(),
                "get-usage-plan",
                &Request::new().set("usage_plan_id", "u1"),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AdapterError::Transport {
                source: TransportError::UnexpectedBody("array"),
                ..
            }
        ));
    }

    /// Test the call deadline is enforced by the transport
    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/products/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"product": {}}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(NoAuth));
        let ctx = CallContext::new().with_timeout(Duration::from_millis(100));
        let err = client
            .execute_key(&ctx, "get-product", &Request::new().set("product_id", "slow"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AdapterError::Transport {
                source: TransportError::Request(_),
                ..
            }
        ));
    }

    /// Test empty lists come back as typed nulls
    #[tokio::test]
    async fn test_empty_list_is_null() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/products/p1/apis/a1/stages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"stages": []})))
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(NoAuth));
        let request = Request::new().set("product_id", "p1").set("api_id", "a1");
        let response = client
            .execute_key(&CallContext::new(), "list-stages", &request)
            .await
            .expect("call should succeed");

        assert!(response.get("stages").unwrap().is_null());
        assert_eq!(response.to_json(), json!({"stages": null}));
    }
}

/// Test module for pagination
mod pagination_tests {
    use super::*;

    /// Test pages are walked by offset and merged
    #[tokio::test]
    async fn test_all_pages_merged() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/products/p1/apis"))
            .and(query_param("offset", "0"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 3,
                "content": [{"apiId": "a1"}, {"apiId": "a2"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v1/products/p1/apis"))
            .and(query_param("offset", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 3,
                "content": [{"apiId": "a3"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(NoAuth));
        let endpoint = client.endpoint("list-apis").unwrap();
        let request = Request::new().set("product_id", "p1").set("limit", 2);

        let response = client
            .execute_all_pages(&CallContext::new(), &endpoint, &request)
            .await
            .expect("pagination should succeed");

        let ids: Vec<&str> = response
            .items("content")
            .unwrap()
            .iter()
            .filter_map(|api| api.str("api_id"))
            .collect();
        assert_eq!(ids, vec!["a1", "a2", "a3"]);
        assert_eq!(response.i64("total"), Some(3));
    }

    /// Test a nested items path with no results yields a typed null list
    #[tokio::test]
    async fn test_nested_empty_page() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/api-keys"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "apiKeyPage": {"content": [], "total": 0}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(NoAuth));
        let endpoint = client.endpoint("list-api-keys").unwrap();
        let response = client
            .execute_all_pages(&CallContext::new(), &endpoint, &Request::new())
            .await
            .expect("pagination should succeed");

        let page = response.record("api_key_page").unwrap();
        assert!(page.get("content").unwrap().is_null());
        assert_eq!(page.i64("total"), Some(0));
    }
}
