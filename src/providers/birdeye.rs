use crate::core::{
    FetchError, HistoryRange, PriceHistoryProvider, PricePoint, Token, TokenListProvider,
    TokenListQuery,
};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Url, header::ACCEPT};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, instrument};

const TOKEN_LIST_PATH: &str = "/defi/tokenlist";
const PRICE_HISTORY_PATH: &str = "/public/price_history";
const API_KEY_HEADER: &str = "X-API-KEY";

#[derive(Debug, Deserialize)]
struct TokenListResponse {
    data: TokenListData,
}

#[derive(Debug, Deserialize)]
struct TokenListData {
    tokens: Vec<Token>,
}

#[derive(Debug, Deserialize)]
struct PriceHistoryResponse {
    data: Vec<PricePoint>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

/// Decodes a `{ data: { tokens: [...] } }` body.
pub fn decode_token_list(body: &str) -> Result<Vec<Token>, FetchError> {
    serde_json::from_str::<TokenListResponse>(body)
        .map(|r| r.data.tokens)
        .map_err(|e| {
            error!(error = %e, "Invalid data structure received from API");
            FetchError::MalformedResponse(e.to_string())
        })
}

/// Decodes a `{ data: [{ unixTime, value }, ...] }` body.
pub fn decode_price_history(body: &str) -> Result<Vec<PricePoint>, FetchError> {
    serde_json::from_str::<PriceHistoryResponse>(body)
        .map(|r| r.data)
        .map_err(|e| FetchError::MalformedResponse(e.to_string()))
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|r| r.message)
}

/// Client for the Birdeye public API.
pub struct BirdeyeProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl BirdeyeProvider {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("soldash/0.1")
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(BirdeyeProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<String, FetchError> {
        let url = Url::parse_with_params(&format!("{}{}", self.base_url, path), params)
            .map_err(|e| FetchError::Request(format!("Invalid URL {}{}: {}", self.base_url, path, e)))?;
        debug!("Requesting {}", url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !status.is_success() {
            debug!(%status, body = %body, "API returned an error status");
            return Err(FetchError::Http {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl TokenListProvider for BirdeyeProvider {
    #[instrument(
        name = "BirdeyeTokenList",
        skip(self, query),
        fields(limit = query.limit, offset = query.offset)
    )]
    async fn fetch_token_list(&self, query: &TokenListQuery) -> Result<Vec<Token>, FetchError> {
        let body = self.get(TOKEN_LIST_PATH, &query.to_params()).await?;
        let tokens = decode_token_list(&body)?;
        debug!("Received {} tokens", tokens.len());
        Ok(tokens)
    }
}

#[async_trait]
impl PriceHistoryProvider for BirdeyeProvider {
    #[instrument(
        name = "BirdeyePriceHistory",
        skip(self),
        fields(address = %address, range = %range)
    )]
    async fn fetch_price_history(
        &self,
        address: &str,
        range: HistoryRange,
    ) -> Result<Vec<PricePoint>, FetchError> {
        let params = [
            ("address", address.to_string()),
            ("type", range.as_param().to_string()),
        ];
        let body = self.get(PRICE_HISTORY_PATH, &params).await?;
        decode_price_history(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const API_KEY: &str = "test-key";

    fn token_list_body(count: usize) -> String {
        let tokens: Vec<_> = (0..count)
            .map(|i| {
                serde_json::json!({
                    "address": format!("address{i}"),
                    "symbol": format!("TK{i}"),
                    "name": format!("Token {i}"),
                    "logoURI": "https://example.com/logo.png",
                    "price": 1.5,
                    "mc": 1_000_000.0,
                    "v24hUSD": 5000.0 - i as f64,
                    "v24hChangePercent": 1.25,
                    "liquidity": 20000.0,
                    "decimals": 6
                })
            })
            .collect();
        serde_json::json!({ "data": { "tokens": tokens }, "success": true }).to_string()
    }

    async fn create_mock_server(request_path: &str, response: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(response)
            .mount(&mock_server)
            .await;

        mock_server
    }

    fn provider(base_url: &str) -> BirdeyeProvider {
        BirdeyeProvider::new(base_url, API_KEY, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_successful_token_list_fetch() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TOKEN_LIST_PATH))
            .and(query_param("sort_by", "v24hUSD"))
            .and(query_param("sort_type", "desc"))
            .and(query_param("offset", "0"))
            .and(query_param("limit", "100"))
            .and(query_param("min_liquidity", "100"))
            .and(header(API_KEY_HEADER, API_KEY))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(token_list_body(3)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let tokens = provider(&mock_server.uri())
            .fetch_token_list(&TokenListQuery::default())
            .await
            .unwrap();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].symbol, "TK0");
        assert_eq!(tokens[0].price, Some(1.5));
        assert_eq!(tokens[2].volume_24h_usd, 4998.0);
    }

    #[tokio::test]
    async fn test_http_error_with_message() {
        let mock_server = create_mock_server(
            TOKEN_LIST_PATH,
            ResponseTemplate::new(401)
                .set_body_string(r#"{"success": false, "message": "Unauthorized"}"#),
        )
        .await;

        let result = provider(&mock_server.uri())
            .fetch_token_list(&TokenListQuery::default())
            .await;
        let err = result.unwrap_err();
        assert_eq!(
            err,
            FetchError::Http {
                status: 401,
                message: Some("Unauthorized".to_string())
            }
        );
        assert_eq!(err.to_string(), "API Error: 401 - Unauthorized");
    }

    #[tokio::test]
    async fn test_http_error_without_message() {
        let mock_server = create_mock_server(TOKEN_LIST_PATH, ResponseTemplate::new(500)).await;

        let err = provider(&mock_server.uri())
            .fetch_token_list(&TokenListQuery::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "API Error: 500 - Unknown error");
    }

    #[tokio::test]
    async fn test_malformed_token_list() {
        // "token" instead of "tokens"
        let mock_server = create_mock_server(
            TOKEN_LIST_PATH,
            ResponseTemplate::new(200).set_body_string(r#"{"data": {"token": []}}"#),
        )
        .await;

        let err = provider(&mock_server.uri())
            .fetch_token_list(&TokenListQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_tokens_must_be_an_array() {
        assert!(matches!(
            decode_token_list(r#"{"data": {"tokens": {"a": 1}}}"#),
            Err(FetchError::MalformedResponse(_))
        ));
        assert!(matches!(
            decode_token_list("not json"),
            Err(FetchError::MalformedResponse(_))
        ));
        assert_eq!(
            decode_token_list(r#"{"data": {"tokens": []}}"#).unwrap(),
            vec![]
        );
    }

    #[tokio::test]
    async fn test_timeout_is_network_error() {
        let mock_server = create_mock_server(
            TOKEN_LIST_PATH,
            ResponseTemplate::new(200)
                .set_body_string(token_list_body(1))
                .set_delay(Duration::from_secs(2)),
        )
        .await;

        let provider =
            BirdeyeProvider::new(&mock_server.uri(), API_KEY, Duration::from_millis(100)).unwrap();
        let err = provider
            .fetch_token_list(&TokenListQuery::default())
            .await
            .unwrap_err();
        assert!(err.is_network(), "unexpected error: {err:?}");
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let err = provider("http://127.0.0.1:1")
            .fetch_token_list(&TokenListQuery::default())
            .await
            .unwrap_err();
        assert!(err.is_network(), "unexpected error: {err:?}");
    }

    #[tokio::test]
    async fn test_invalid_request_is_request_error() {
        let err = provider("not a url")
            .fetch_token_list(&TokenListQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Request(_)), "unexpected error: {err:?}");

        let provider =
            BirdeyeProvider::new("http://127.0.0.1:1", "bad\nkey", Duration::from_secs(1))
                .unwrap();
        let err = provider
            .fetch_token_list(&TokenListQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Request(_)), "unexpected error: {err:?}");
        assert!(err.to_string().starts_with("Request Error:"));
    }

    #[tokio::test]
    async fn test_successful_price_history_fetch() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PRICE_HISTORY_PATH))
            .and(query_param("address", "address0"))
            .and(query_param("type", "7d"))
            .and(header(API_KEY_HEADER, API_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"data": [{"unixTime": 1728000000, "value": 1.5}, {"unixTime": 1728086400, "value": 1.75}]}"#,
            ))
            .mount(&mock_server)
            .await;

        let points = provider(&mock_server.uri())
            .fetch_price_history("address0", HistoryRange::SevenDays)
            .await
            .unwrap();
        assert_eq!(
            points,
            vec![
                PricePoint {
                    unix_time: 1728000000,
                    value: 1.5
                },
                PricePoint {
                    unix_time: 1728086400,
                    value: 1.75
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_price_history_errors() {
        let mock_server = create_mock_server(
            PRICE_HISTORY_PATH,
            ResponseTemplate::new(200).set_body_string(r#"{"data": {"items": []}}"#),
        )
        .await;
        let err = provider(&mock_server.uri())
            .fetch_price_history("address0", HistoryRange::OneDay)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse(_)));
    }
}
