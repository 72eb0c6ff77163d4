//! Trello API client implementation.
//!
//! This module provides the client for the two read-only Trello REST calls
//! the report needs. It handles request construction, authentication via
//! query parameters, cancellation and response classification.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Url};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::error::{ApiError, Result};
use super::types::{Board, Row};
use crate::config::Credentials;

/// Query parameters for the boards call: open boards with their open lists.
const BOARD_QUERY: &[(&str, &str)] = &[
    ("filter", "open"),
    ("fields", "id,name,lists"),
    ("lists", "open"),
    ("list_fields", "id,name"),
];

/// The operations the report needs from Trello.
///
/// Implemented by [`TrelloClient`] and by test doubles.
#[async_trait]
pub trait TrelloApi: Send + Sync {
    /// List the authenticated member's open boards, each with its open lists.
    async fn list_boards(&self, cancel: &CancellationToken) -> Result<Vec<Board>>;

    /// List the cards of a list.
    async fn list_cards(&self, list: &Row, cancel: &CancellationToken) -> Result<Vec<Row>>;
}

/// The Trello API client.
#[derive(Debug)]
pub struct TrelloClient {
    /// The HTTP client.
    client: Client,
    /// Base URL, key and token.
    credentials: Credentials,
}

impl TrelloClient {
    /// Create a new client without a request timeout.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_timeout(credentials, None)
    }

    /// Create a new client whose requests give up after `timeout`.
    pub fn with_timeout(credentials: Credentials, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            credentials,
        })
    }

    /// Build the full request URL.
    ///
    /// `segments` are appended to the base URL path, then `query`, then the
    /// key and token, which replace any earlier parameter of the same name.
    fn build_url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.credentials.base_url().clone();

        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.credentials.base_url().to_string()))?
            .pop_if_empty()
            .extend(segments);

        let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        pairs.extend(query.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        pairs.retain(|(k, _)| k != "key" && k != "token");

        url.query_pairs_mut()
            .clear()
            .extend_pairs(pairs)
            .append_pair("key", self.credentials.key())
            .append_pair("token", self.credentials.token());

        Ok(url)
    }

    /// Perform a GET request and decode the JSON body.
    ///
    /// Returns early with a transport error if `cancel` fires first.
    async fn get_json<T: DeserializeOwned>(&self, url: Url, cancel: &CancellationToken) -> Result<T> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(path = url.path(), "Request cancelled");
                Err(ApiError::cancelled())
            }
            result = self.execute_get(&url) => result,
        }
    }

    /// Execute a single GET request.
    async fn execute_get<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        // The query carries the key and token, so only the path is logged.
        debug!(path = url.path(), "GET");

        let response = self
            .client
            .get(url.clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        debug!(path = url.path(), %status, bytes = body.len(), "Response received");

        if !status.is_success() {
            return Err(ApiError::from_status(
                status,
                String::from_utf8_lossy(&body).into_owned(),
            ));
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl TrelloApi for TrelloClient {
    /// Calls `GET /1/members/me/boards`.
    #[instrument(skip(self, cancel))]
    async fn list_boards(&self, cancel: &CancellationToken) -> Result<Vec<Board>> {
        let url = self.build_url(&["1", "members", "me", "boards"], BOARD_QUERY)?;
        let boards: Vec<Board> = self.get_json(url, cancel).await?;
        debug!("Fetched {} boards", boards.len());
        Ok(boards)
    }

    /// Calls `GET /1/lists/{id}/cards`.
    #[instrument(skip(self, list, cancel), fields(list_id = %list.id))]
    async fn list_cards(&self, list: &Row, cancel: &CancellationToken) -> Result<Vec<Row>> {
        let url = self.build_url(&["1", "lists", &list.id, "cards"], &[])?;
        let cards: Vec<Row> = self.get_json(url, cancel).await?;
        debug!("Fetched {} cards", cards.len());
        Ok(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FAKE_KEY: &str = "fakekey12345678901234567890";
    const FAKE_TOKEN: &str = "faketoken12345678901234567890123456789012345678901234567890";

    fn client_for(base_url: &str) -> TrelloClient {
        let credentials = Credentials::new(base_url, FAKE_KEY, FAKE_TOKEN).unwrap();
        TrelloClient::new(credentials).unwrap()
    }

    fn list1() -> Row {
        Row::new("list1", "")
    }

    #[test]
    fn test_build_url_appends_path_and_credentials() {
        let client = client_for("https://api.trello.com");
        let url = client.build_url(&["1", "lists", "list1", "cards"], &[]).unwrap();

        assert_eq!(url.path(), "/1/lists/list1/cards");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("key".to_string(), FAKE_KEY.to_string()),
                ("token".to_string(), FAKE_TOKEN.to_string()),
            ]
        );
    }

    #[test]
    fn test_build_url_keeps_base_path() {
        let client = client_for("http://localhost:8080/trello/");
        let url = client.build_url(&["1", "members", "me", "boards"], &[]).unwrap();
        assert_eq!(url.path(), "/trello/1/members/me/boards");
    }

    #[test]
    fn test_build_url_credentials_override_existing_params() {
        let client = client_for("https://api.trello.com/?key=bogus&extra=1");
        let url = client
            .build_url(&["1", "lists", "x", "cards"], &[("token", "caller")])
            .unwrap();

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("extra".to_string(), "1".to_string()),
                ("key".to_string(), FAKE_KEY.to_string()),
                ("token".to_string(), FAKE_TOKEN.to_string()),
            ]
        );
    }

    #[test]
    fn test_build_url_escapes_list_id() {
        let client = client_for("https://api.trello.com");
        let url = client.build_url(&["1", "lists", "a/b c", "cards"], &[]).unwrap();
        assert_eq!(url.path(), "/1/lists/a%2Fb%20c/cards");
    }

    #[tokio::test]
    async fn test_list_boards_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1/members/me/boards"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .mount(&server)
            .await;

        let boards = client_for(&server.uri())
            .list_boards(&CancellationToken::new())
            .await
            .unwrap();
        assert!(boards.is_empty());
    }

    #[tokio::test]
    async fn test_list_boards_sends_query_and_decodes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1/members/me/boards"))
            .and(query_param("filter", "open"))
            .and(query_param("fields", "id,name,lists"))
            .and(query_param("lists", "open"))
            .and(query_param("list_fields", "id,name"))
            .and(query_param("key", FAKE_KEY))
            .and(query_param("token", FAKE_TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"[
                    {"name": "Boardy", "id": "abcd1", "lists": [{"id":"listb1l1", "name":"List B1L1"}]},
                    {"name": "B2", "id": "abcd2"}
                ]"#,
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let boards = client_for(&server.uri())
            .list_boards(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            boards,
            vec![
                Board::new("abcd1", "Boardy", vec![Row::new("listb1l1", "List B1L1")]),
                Board::new("abcd2", "B2", vec![]),
            ]
        );
    }

    #[tokio::test]
    async fn test_list_cards_path_and_decode() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1/lists/list1/cards"))
            .and(query_param("key", FAKE_KEY))
            .and(query_param("token", FAKE_TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"name": "Card 1", "id": "card1"}, {"name":"Card 2", "id":"card2"}]"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let cards = client_for(&server.uri())
            .list_cards(&list1(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            cards,
            vec![Row::new("card1", "Card 1"), Row::new("card2", "Card 2")]
        );
    }

    #[tokio::test]
    async fn test_list_cards_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1/lists/list1/cards"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .mount(&server)
            .await;

        let cards = client_for(&server.uri())
            .list_cards(&list1(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(cards.is_empty());
    }

    #[tokio::test]
    async fn test_unauthorized_includes_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_raw("Response body from trello", "text/plain; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let err = client_for(&server.uri())
            .list_cards(&list1(), &CancellationToken::new())
            .await
            .unwrap_err();

        match &err {
            ApiError::Api { status, body } => {
                assert_eq!(*status, StatusCode::UNAUTHORIZED);
                assert_eq!(body, "Response body from trello");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
        assert!(err.to_string().contains("Response body from trello"));
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("this is not valid json"))
            .mount(&server)
            .await;

        let err = client_for(&server.uri())
            .list_cards(&list1(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Decode(_)));
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[tokio::test]
    async fn test_wrong_shape_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":"not-a-list"}"#))
            .mount(&server)
            .await;

        let err = client_for(&server.uri())
            .list_boards(&CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unknown_host_is_transport_error() {
        let err = client_for("https://nosuchhost424242.invalid")
            .list_cards(&list1(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(err.is_transport(), "Expected transport error, got {:?}", err);
        assert!(err.to_string().contains("dns error"), "{}", err);
        assert!(!err.to_string().contains(FAKE_TOKEN));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(&format!("http://{}", addr))
            .list_cards(&list1(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_transport(), "Expected transport error, got {:?}", err);
    }

    #[tokio::test]
    async fn test_truncated_body_is_transport_error() {
        // Declares more body than it sends, then hangs up.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = "HTTP/1.1 200 OK\r\n\
                            Content-Type: application/json\r\n\
                            Content-Length: 1024\r\n\
                            \r\n\
                            []";
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        let err = client_for(&format!("http://{}", addr))
            .list_cards(&list1(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(err.is_transport(), "Expected transport error, got {:?}", err);
        assert!(err.to_string().contains("body"), "{}", err);
    }

    #[tokio::test]
    async fn test_cancelled_before_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(0)
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client_for(&server.uri())
            .list_boards(&cancel)
            .await
            .unwrap_err();
        assert!(err.is_transport());
        assert!(err.to_string().contains("cancelled"));
    }

    #[tokio::test]
    async fn test_cancel_aborts_in_flight_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("[]")
                    .set_delay(Duration::from_secs(30)),
            )
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let client = client_for(&server.uri());
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            client.list_cards(&list1(), &cancel),
        )
        .await
        .expect("cancellation did not abort the request");

        let err = result.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("[]")
                    .set_delay(Duration::from_secs(30)),
            )
            .mount(&server)
            .await;

        let credentials = Credentials::new(&server.uri(), FAKE_KEY, FAKE_TOKEN).unwrap();
        let client =
            TrelloClient::with_timeout(credentials, Some(Duration::from_millis(100))).unwrap();

        let err = client
            .list_boards(&CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }
}
