//! Request pipeline: auth injection, JSON encoding, status classification
//! and decoding of every call made to the library server.

use reqwest::Url;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::{
    credentials::{Credential, CredentialStore},
    error::{ApiError, AppResult},
};

use super::{Access, ApiRequest, HttpRequest, HttpResponse, Transport};

const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Clone)]
pub struct ApiGateway {
    base_url: Url,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialStore>,
}

impl ApiGateway {
    pub fn new(
        base_url: &str,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
    ) -> AppResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::Unknown(format!("Invalid base URL '{}': {}", base_url, e)))?;
        Ok(Self {
            base_url,
            transport,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Execute one request and decode its JSON body.
    ///
    /// At most one network attempt is made; failures are never retried.
    pub async fn perform<T: DeserializeOwned>(&self, request: ApiRequest) -> AppResult<T> {
        let token = match request.access {
            Access::Public => None,
            Access::Authenticated => match self.credentials.get() {
                Some(token) => Some(token),
                None => {
                    tracing::warn!("{} {} requires authentication but no credential is stored", request.method, request.path);
                    return Err(ApiError::AuthRequired);
                }
            },
        };

        let http = self.prepare(&request, token.as_ref())?;
        tracing::debug!("{} {} ({:?})", http.method, http.url.path(), request.access);

        let response = self.transport.send(http).await.map_err(|e| {
            tracing::warn!("{} {} failed: {}", request.method, request.path, e);
            ApiError::NetworkFailure(e)
        })?;

        let body = Self::classify(&request, response)?;

        serde_json::from_slice::<T>(&body).map_err(|e| {
            tracing::warn!("{} {} returned an undecodable body: {}", request.method, request.path, e);
            ApiError::from(e)
        })
    }

    fn prepare(&self, request: &ApiRequest, token: Option<&Credential>) -> AppResult<HttpRequest> {
        let mut url = self
            .base_url
            .join(&request.path)
            .map_err(|e| ApiError::Unknown(format!("Invalid request path '{}': {}", request.path, e)))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        let mut headers = vec![
            ("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()),
            ("Accept".to_string(), JSON_CONTENT_TYPE.to_string()),
        ];
        if let Some(token) = token {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token.expose())));
        }

        let body = request
            .body
            .as_ref()
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| ApiError::Unknown(format!("Could not encode request body: {}", e)))?;

        Ok(HttpRequest {
            method: request.method.clone(),
            url,
            headers,
            body,
        })
    }

    /// Keep 2xx bodies for decoding, turn anything else into a server failure
    fn classify(request: &ApiRequest, response: HttpResponse) -> AppResult<Vec<u8>> {
        if (200..=299).contains(&response.status) {
            return Ok(response.body);
        }

        let message = String::from_utf8_lossy(&response.body).trim().to_string();
        let message = (!message.is_empty()).then_some(message);
        tracing::warn!(
            "{} {} answered with status {}: {}",
            request.method,
            request.path,
            response.status,
            message.as_deref().unwrap_or("<empty body>")
        );

        Err(ApiError::ServerFailure {
            status_code: response.status,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::{endpoints, transport::MockTransport},
        credentials::MemoryCredentialStore,
        error::TransportError,
        models::{Book, BorrowRequest, BorrowResponse, UserProfile},
    };

    fn gateway(transport: MockTransport, store: MemoryCredentialStore) -> ApiGateway {
        ApiGateway::new("http://library.test", Arc::new(transport), Arc::new(store)).unwrap()
    }

    fn json_response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            body: body.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn authenticated_request_without_credential_never_hits_network() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(0);
        let gateway = gateway(transport, MemoryCredentialStore::new());

        let result = gateway.perform::<UserProfile>(endpoints::user_profile(3)).await;
        assert!(matches!(result, Err(ApiError::AuthRequired)));
    }

    #[tokio::test]
    async fn bearer_token_and_json_headers_are_attached() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.header("Authorization") == Some("Bearer tok-1")
                    && req.header("Content-Type") == Some("application/json")
                    && req.url.as_str() == "http://library.test/api/users/3/profile"
            })
            .times(1)
            .returning(|_| {
                Ok(json_response(
                    200,
                    r#"{"id":3,"name":"Lin","cardId":"C-3","account":"lin","email":"lin@example.org"}"#,
                ))
            });
        let gateway = gateway(transport, MemoryCredentialStore::with_token("tok-1"));

        let profile: UserProfile = gateway.perform(endpoints::user_profile(3)).await.unwrap();
        assert_eq!(profile.id, 3);
    }

    #[tokio::test]
    async fn public_request_carries_no_authorization() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| req.header("Authorization").is_none() && req.header("Content-Type").is_some())
            .times(1)
            .returning(|_| Ok(json_response(200, "[]")));
        let gateway = gateway(transport, MemoryCredentialStore::with_token("tok-1"));

        let books: Vec<Book> = gateway.perform(endpoints::books(None, None)).await.unwrap();
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn non_success_status_is_classified_without_decoding() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Ok(json_response(422, "No copies left")));
        let gateway = gateway(transport, MemoryCredentialStore::new());

        let result = gateway.perform::<Vec<Book>>(endpoints::books(None, None)).await;
        match result {
            Err(ApiError::ServerFailure { status_code, message }) => {
                assert_eq!(status_code, 422);
                assert_eq!(message.as_deref(), Some("No copies left"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_error_body_has_no_message() {
        let mut transport = MockTransport::new();
        transport.expect_send().returning(|_| Ok(json_response(500, "")));
        let gateway = gateway(transport, MemoryCredentialStore::new());

        let err = gateway
            .perform::<Vec<Book>>(endpoints::categories())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(500));
        assert!(matches!(err, ApiError::ServerFailure { message: None, .. }));
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_decode_failure() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(json_response(200, r#"{"success":"yes"}"#)));
        let gateway = gateway(transport, MemoryCredentialStore::with_token("tok"));

        let request = endpoints::borrow(&BorrowRequest { book_id: 7, user_id: 3 }).unwrap();
        let result = gateway.perform::<BorrowResponse>(request).await;
        assert!(matches!(result, Err(ApiError::DecodeFailure(_))));
    }

    #[tokio::test]
    async fn transport_error_is_a_network_failure() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Err(TransportError::Connect("connection refused".into())));
        let gateway = gateway(transport, MemoryCredentialStore::new());

        let result = gateway.perform::<Vec<Book>>(endpoints::categories()).await;
        assert!(matches!(
            result,
            Err(ApiError::NetworkFailure(TransportError::Connect(_)))
        ));
    }

    #[tokio::test]
    async fn borrow_round_trip_reads_loan_id() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                let body: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap_or_default()).unwrap();
                body == serde_json::json!({"bookId": 7, "userId": 3})
            })
            .returning(|_| {
                Ok(json_response(
                    200,
                    r#"{"success":true,"borrowedBookUniqueCode":"BK-001","loanId":55}"#,
                ))
            });
        let gateway = gateway(transport, MemoryCredentialStore::with_token("tok"));

        let request = endpoints::borrow(&BorrowRequest { book_id: 7, user_id: 3 }).unwrap();
        let response: BorrowResponse = gateway.perform(request).await.unwrap();
        assert_eq!(response.loan_id, Some(55));
        assert_eq!(response.borrowed_book_unique_code.as_deref(), Some("BK-001"));
    }

    #[tokio::test]
    async fn filter_query_is_encoded() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| req.url.query() == Some("categoryId=2&searchTerm=war+and+peace"))
            .returning(|_| Ok(json_response(200, "[]")));
        let gateway = gateway(transport, MemoryCredentialStore::new());

        let books: Vec<Book> = gateway
            .perform(endpoints::books(Some(2), Some("war and peace")))
            .await
            .unwrap();
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn every_2xx_status_is_decoded() {
        for status in [200, 201, 299] {
            let mut transport = MockTransport::new();
            transport
                .expect_send()
                .times(1)
                .returning(move |_| Ok(json_response(status, r#"[{"id":2,"categoryTitle":"History"}]"#)));
            let gateway = gateway(transport, MemoryCredentialStore::new());

            let categories: Vec<crate::models::Category> = gateway
                .perform(endpoints::categories())
                .await
                .unwrap_or_else(|e| panic!("status {} should decode: {:?}", status, e));
            assert_eq!(categories.len(), 1);
        }
    }

    #[tokio::test]
    async fn statuses_outside_2xx_are_never_decoded() {
        // The bodies are valid JSON for the target type, so a decode would succeed
        for status in [199, 300, 304] {
            let mut transport = MockTransport::new();
            transport
                .expect_send()
                .times(1)
                .returning(move |_| Ok(json_response(status, "[]")));
            let gateway = gateway(transport, MemoryCredentialStore::new());

            let result = gateway.perform::<Vec<Book>>(endpoints::categories()).await;
            match result {
                Err(ApiError::ServerFailure { status_code, message }) => {
                    assert_eq!(status_code, status);
                    assert_eq!(message.as_deref(), Some("[]"));
                }
                other => panic!("status {} gave {:?}", status, other),
            }
        }
    }
}
