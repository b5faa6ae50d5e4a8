//! Integration tests for the ERP client and data-access facade using wiremock
//!
//! These tests run every client operation against a mocked ERP server and
//! verify authentication headers, URL construction, error propagation and
//! the facade's loading/error/data snapshots.

use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use terp::data::{DataAccess, Entity};
use terp::erp::{
    AuthMethod, ConnectionConfig, CredentialStore, ErpClient, ErpError, ListQuery,
    MemoryCredentialStore,
};
use wiremock::matchers::{bearer_token, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_with(
    server: &MockServer,
    config: ConnectionConfig,
    store: Arc<MemoryCredentialStore>,
) -> ErpClient {
    let config = ConnectionConfig {
        base_endpoint: server.uri(),
        ..config
    };
    ErpClient::new(config, store).expect("client should build")
}

fn anonymous_client(server: &MockServer) -> ErpClient {
    client_with(
        server,
        ConnectionConfig::default(),
        Arc::new(MemoryCredentialStore::new()),
    )
}

/// Authentication header selection
mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_session_token_wins_over_api_key() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/resource/Customer"))
            .and(bearer_token("session-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with(
            &server,
            ConnectionConfig::default().with_api_key("key", "secret"),
            Arc::new(MemoryCredentialStore::with_token("session-123")),
        );

        assert_eq!(client.auth_method(), AuthMethod::Session);
        client
            .get_list(&ListQuery::new("Customer"))
            .await
            .expect("request should match the bearer mock");
    }

    #[tokio::test]
    async fn test_api_key_used_without_session() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/resource/Customer"))
            .and(header("Authorization", "token key:secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with(
            &server,
            ConnectionConfig::default().with_api_key("key", "secret"),
            Arc::new(MemoryCredentialStore::new()),
        );

        assert_eq!(client.auth_method(), AuthMethod::ApiKey);
        client.get_list(&ListQuery::new("Customer")).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_session_token_falls_back_to_api_key() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(header("Authorization", "token key:secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with(
            &server,
            ConnectionConfig::default().with_api_key("key", "secret"),
            Arc::new(MemoryCredentialStore::with_token("")),
        );

        client.get_list(&ListQuery::new("Customer")).await.unwrap();
    }

    #[tokio::test]
    async fn test_no_credentials_sends_no_header() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;

        // Key without secret is not enough
        let client = client_with(
            &server,
            ConnectionConfig {
                api_key: Some("key".to_string()),
                ..Default::default()
            },
            Arc::new(MemoryCredentialStore::new()),
        );

        assert_eq!(client.auth_method(), AuthMethod::Anonymous);
        client.get_list(&ListQuery::new("Customer")).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_auth_is_recomputed_after_login() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/method/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"message": "Logged In", "token": "fresh"})),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/resource/Item"))
            .and(bearer_token("fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with(
            &server,
            ConnectionConfig::default().with_api_key("key", "secret"),
            Arc::new(MemoryCredentialStore::new()),
        );

        client.login("admin", "admin").await.unwrap();
        client.get_list(&ListQuery::new("Item")).await.unwrap();
    }
}

/// Login and logout
mod session_tests {
    use super::*;

    #[tokio::test]
    async fn test_login_success_stores_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/method/login"))
            .and(body_json(json!({"usr": "admin", "pwd": "admin"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"message": "Logged In", "token": "abc"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryCredentialStore::new());
        let client = client_with(&server, ConnectionConfig::default(), store.clone());

        let response = client.login("admin", "admin").await.unwrap();
        assert_eq!(response["message"], "Logged In");
        assert_eq!(store.get().as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_login_without_token_stores_empty() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/method/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Logged In"})))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryCredentialStore::new());
        let client = client_with(&server, ConnectionConfig::default(), store.clone());

        client.login("admin", "admin").await.unwrap();
        assert_eq!(store.get().as_deref(), Some(""));
        // An empty token does not count as a session
        assert_eq!(client.auth_method(), AuthMethod::Anonymous);
    }

    #[tokio::test]
    async fn test_login_rejected_leaves_store_untouched() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/method/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Invalid"})))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryCredentialStore::with_token("previous"));
        let client = client_with(&server, ConnectionConfig::default(), store.clone());

        let err = client.login("bad", "bad").await.unwrap_err();
        assert!(matches!(err, ErpError::Authentication(ref m) if m == "Invalid"));
        assert_eq!(store.get().as_deref(), Some("previous"));
    }

    #[tokio::test]
    async fn test_login_http_error_propagates() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/method/login"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Incorrect password"))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryCredentialStore::new());
        let client = client_with(&server, ConnectionConfig::default(), store.clone());

        let err = client.login("admin", "wrong").await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(store.get(), None);
    }

    #[tokio::test]
    async fn test_logout_clears_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/method/logout"))
            .and(bearer_token("abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryCredentialStore::with_token("abc"));
        let client = client_with(&server, ConnectionConfig::default(), store.clone());

        client.logout().await.unwrap();
        assert_eq!(store.get(), None);
    }

    #[tokio::test]
    async fn test_logout_clears_token_even_when_server_fails() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/method/logout"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryCredentialStore::with_token("abc"));
        let client = client_with(&server, ConnectionConfig::default(), store.clone());

        let err = client.logout().await.unwrap_err();
        assert!(matches!(err, ErpError::Transport { status: 500, .. }));
        assert_eq!(store.get(), None);
    }

    #[tokio::test]
    async fn test_logged_user() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/method/frappe.auth.get_logged_user"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"message": "admin@example.com"})),
            )
            .mount(&server)
            .await;

        let client = anonymous_client(&server);
        assert_eq!(client.logged_user().await.unwrap(), "admin@example.com");
    }
}

/// Document CRUD and remote methods
mod document_tests {
    use super::*;

    #[tokio::test]
    async fn test_get_list_sends_json_encoded_params() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/resource/Sales%20Order"))
            .and(query_param("fields", r#"["name","status"]"#))
            .and(query_param("filters", r#"{"status":"Draft"}"#))
            .and(query_param("limit", "5"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": [{"name": "SO-1", "status": "Draft"}]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = anonymous_client(&server);
        let query = ListQuery::new("Sales Order")
            .fields(["name", "status"])
            .filters(json!({"status": "Draft"}))
            .limit(5);

        let response = client.get_list(&query).await.unwrap();
        assert_eq!(response["data"][0]["name"], "SO-1");

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].url.path().ends_with("/Sales%20Order"));
    }

    #[tokio::test]
    async fn test_get_list_without_params() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/resource/Customer"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;

        let client = anonymous_client(&server);
        client.get_list(&ListQuery::new("Customer").limit(0)).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.query(), None);
    }

    #[tokio::test]
    async fn test_get_doc_unwraps_data() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/resource/Customer/CUST-001"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"name": "CUST-001", "customer_name": "Acme"}})),
            )
            .mount(&server)
            .await;

        let client = anonymous_client(&server);
        let doc = client.get_doc("Customer", "CUST-001").await.unwrap();
        assert_eq!(doc, json!({"name": "CUST-001", "customer_name": "Acme"}));
    }

    #[tokio::test]
    async fn test_get_doc_as_typed() {
        #[derive(Debug, Deserialize)]
        struct Customer {
            name: String,
            customer_name: String,
        }

        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/resource/Customer/CUST-001"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"name": "CUST-001", "customer_name": "Acme"}})),
            )
            .mount(&server)
            .await;

        let client = anonymous_client(&server);
        let customer: Customer = client.get_doc_as("Customer", "CUST-001").await.unwrap();
        assert_eq!(customer.name, "CUST-001");
        assert_eq!(customer.customer_name, "Acme");

        // Schema mismatch surfaces as a decode error
        let err = client
            .get_doc_as::<Vec<String>>("Customer", "CUST-001")
            .await
            .unwrap_err();
        assert!(matches!(err, ErpError::Decode(_)));
    }

    #[tokio::test]
    async fn test_get_doc_not_found_propagates() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/resource/Customer/missing"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({"exc_type": "DoesNotExistError"})),
            )
            .mount(&server)
            .await;

        let client = anonymous_client(&server);
        let err = client.get_doc("Customer", "missing").await.unwrap_err();

        assert!(err.is_not_found());
        match err {
            ErpError::Transport { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("DoesNotExistError"));
            },
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_doc_name_is_percent_encoded() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
            .mount(&server)
            .await;

        let client = anonymous_client(&server);
        client.get_doc("Customer", "Acme/West 1").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.path(), "/api/resource/Customer/Acme%2FWest%201");
    }

    #[tokio::test]
    async fn test_create_then_get_returns_superset() {
        let server = MockServer::start().await;

        let input = json!({
            "customer_name": "Acme",
            "customer_type": "Company",
            "customer_group": "Commercial",
            "territory": "All Territories"
        });
        let mut stored = input.clone();
        stored["name"] = json!("CUST-00042");
        stored["owner"] = json!("admin@example.com");

        Mock::given(method("POST"))
            .and(path("/api/resource/Customer"))
            .and(body_json(&input))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": stored})))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/resource/Customer/CUST-00042"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": stored})))
            .mount(&server)
            .await;

        let client = anonymous_client(&server);
        let created = client.create_doc("Customer", &input).await.unwrap();
        let name = created["name"].as_str().unwrap();

        let fetched = client.get_doc("Customer", name).await.unwrap();
        for (key, value) in input.as_object().unwrap() {
            assert_eq!(&fetched[key], value, "field {} should survive the round trip", key);
        }
        assert!(fetched.get("owner").is_some());
    }

    #[tokio::test]
    async fn test_create_customer_form_document() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/resource/Customer"))
            .and(body_json(json!({
                "customer_name": "Jane",
                "customer_type": "Individual",
                "customer_group": "Commercial",
                "territory": "All Territories"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": {"name": "CUST-1"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut form = terp::form::CustomerForm::new();
        for c in "Jane".chars() {
            form.push_char(c);
        }
        form.toggle_type();

        let client = anonymous_client(&server);
        let created = client.create_doc("Customer", &form.to_document()).await.unwrap();
        assert_eq!(created["name"], "CUST-1");
    }

    #[tokio::test]
    async fn test_create_conflict_propagates() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/resource/Customer"))
            .respond_with(ResponseTemplate::new(409).set_body_string("DuplicateEntryError"))
            .mount(&server)
            .await;

        let client = anonymous_client(&server);
        let err = client
            .create_doc("Customer", &json!({"customer_name": "Acme"}))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(409));
    }

    #[tokio::test]
    async fn test_create_doc_as_typed() {
        #[derive(Debug, Deserialize)]
        struct Created {
            name: String,
            customer_type: String,
        }

        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/resource/Customer"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"name": "CUST-007", "customer_name": "Acme", "customer_type": "Company"}
            })))
            .mount(&server)
            .await;

        let client = anonymous_client(&server);
        let created: Created = client
            .create_doc_as("Customer", &json!({"customer_name": "Acme"}))
            .await
            .unwrap();
        assert_eq!(created.name, "CUST-007");
        assert_eq!(created.customer_type, "Company");
    }

    #[tokio::test]
    async fn test_update_doc_returns_data() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/api/resource/Item/ITEM-1"))
            .and(body_json(json!({"item_name": "Renamed"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"name": "ITEM-1", "item_name": "Renamed"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = anonymous_client(&server);
        let updated = client
            .update_doc("Item", "ITEM-1", &json!({"item_name": "Renamed"}))
            .await
            .unwrap();
        assert_eq!(updated["item_name"], "Renamed");
    }

    #[tokio::test]
    async fn test_delete_doc_returns_raw_body() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/resource/Item/ITEM-1"))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({"message": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = anonymous_client(&server);
        let response = client.delete_doc("Item", "ITEM-1").await.unwrap();
        assert_eq!(response, json!({"message": "ok"}));
    }

    #[tokio::test]
    async fn test_call_method_posts_args() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/method/frappe.client.get_count"))
            .and(body_json(json!({"doctype": "Customer"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": 42})))
            .expect(1)
            .mount(&server)
            .await;

        let client = anonymous_client(&server);
        let response = client
            .call_method("frappe.client.get_count", Some(&json!({"doctype": "Customer"})))
            .await
            .unwrap();
        assert_eq!(response["message"], 42);
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let client = anonymous_client(&server);
        let err = client.get_list(&ListQuery::new("Customer")).await.unwrap_err();
        assert!(matches!(err, ErpError::Decode(_)));
    }

    #[tokio::test]
    async fn test_missing_endpoint_is_network_error() {
        let client = ErpClient::new(
            ConnectionConfig::default(),
            Arc::new(MemoryCredentialStore::new()),
        )
        .unwrap();

        let err = client.get_list(&ListQuery::new("Customer")).await.unwrap_err();
        assert!(matches!(err, ErpError::Network(_)));
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/resource/Customer"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": []}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = client_with(
            &server,
            ConnectionConfig::default().with_timeout(Duration::from_millis(100)),
            Arc::new(MemoryCredentialStore::new()),
        );

        let err = client.get_list(&ListQuery::new("Customer")).await.unwrap_err();
        match err {
            ErpError::Network(e) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {:?}", other),
        }
    }
}

/// Data-access facade snapshots
mod facade_tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_customer_list() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/resource/Customer"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;

        let mut data = DataAccess::new(anonymous_client(&server));
        let query = Entity::Customers.query(None);

        let before = data.doc_list(&query);
        assert!(before.is_loading);

        let list = data.load_list(&query).await;
        assert!(list.records.is_empty());
        assert!(!list.is_loading);
        assert!(list.is_error.is_none());
    }

    #[tokio::test]
    async fn test_list_error_is_captured() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Not permitted"))
            .mount(&server)
            .await;

        let mut data = DataAccess::new(anonymous_client(&server));
        let list = data.load_list(&Entity::Customers.query(None)).await;

        assert!(!list.is_loading);
        assert!(list.records.is_empty());
        assert_eq!(list.is_error.as_ref().and_then(|e| e.status()), Some(403));
    }

    #[tokio::test]
    async fn test_load_is_deduplicated_and_refresh_refetches() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/resource/Customer"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": [{"name": "CUST-1"}]})),
            )
            .expect(2)
            .mount(&server)
            .await;

        let mut data = DataAccess::new(anonymous_client(&server));
        let query = Entity::Customers.query(None);

        let first = data.load_list(&query).await;
        let second = data.load_list(&query).await;
        assert_eq!(first.records, second.records);

        let refreshed = data.refresh_list(&query).await;
        assert_eq!(refreshed.records.len(), 1);
    }

    #[tokio::test]
    async fn test_filters_ignored_for_customers_but_keyed_for_orders() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;

        let mut data = DataAccess::new(anonymous_client(&server));

        let customers = data
            .load_list(&Entity::Customers.query(Some(json!({"territory": "India"}))))
            .await;
        assert_eq!(customers.key, "Customer");

        let orders = data
            .load_list(&Entity::SalesOrders.query(Some(json!({"status": "Draft"}))))
            .await;
        assert_eq!(orders.key, r#"Sales Order-{"status":"Draft"}"#);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        assert!(!requests[0].url.query().unwrap_or("").contains("filters"));
        assert!(requests[1].url.query().unwrap_or("").contains("filters"));
    }

    #[tokio::test]
    async fn test_doc_with_empty_name_makes_no_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
            .expect(0)
            .mount(&server)
            .await;

        let mut data = DataAccess::new(anonymous_client(&server));

        for name in [None, Some("")] {
            let state = data.load_doc("Customer", name).await;
            assert!(!state.is_loading);
            assert!(state.record.is_none());
            assert!(state.is_error.is_none());

            let state = data.refresh_doc("Customer", name).await;
            assert!(!state.is_loading);
        }
    }

    #[tokio::test]
    async fn test_doc_load_and_refresh() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/resource/Customer/CUST-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"name": "CUST-1", "customer_name": "Acme"}})),
            )
            .expect(2)
            .mount(&server)
            .await;

        let mut data = DataAccess::new(anonymous_client(&server));

        let state = data.load_doc("Customer", Some("CUST-1")).await;
        assert_eq!(state.key.as_deref(), Some("Customer-CUST-1"));
        assert_eq!(state.record.as_ref().unwrap()["customer_name"], "Acme");

        let cached = data.doc("Customer", Some("CUST-1"));
        assert!(!cached.is_loading);

        let refreshed = data.refresh_doc("Customer", Some("CUST-1")).await;
        assert!(refreshed.record.is_some());
    }

    #[tokio::test]
    async fn test_refresh_after_error_keeps_previous_data() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": [{"name": "A"}]})),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let mut data = DataAccess::new(anonymous_client(&server));
        let query = Entity::Items.query(None);

        let first = data.load_list(&query).await;
        assert_eq!(first.records.len(), 1);

        let refreshed = data.refresh_list(&query).await;
        assert_eq!(refreshed.records.len(), 1);
        assert!(!refreshed.is_loading);
        assert_eq!(refreshed.is_error.as_ref().and_then(|e| e.status()), Some(502));
    }
}
