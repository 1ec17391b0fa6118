//! # Indexer API Client
//!
//! Read-only client for the indexer API. Every collection endpoint takes
//! `from` / `size` query parameters and is exposed as an [`ApiCollection`],
//! which the [`PaginatedFetcher`](crate::fetcher::PaginatedFetcher) drains.
//!
//! A `200` with `[]` or `null` means the collection is exhausted.

use async_trait::async_trait;
use num_bigint::BigUint;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::marker::PhantomData;
use std::time::Duration;
use tracing::info;

use crate::config::NetworkConfig;
use crate::error::{Error, Result};
use crate::fetcher::{PageSource, Pagination};
use crate::model::{biguint_serde, Address};

/// One entry of an account's transaction history. Fields the workflows do
/// not read are kept in `extra` so a saved history loses nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTransaction {
    pub tx_hash: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiToken {
    pub identifier: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ticker: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiTokenAccount {
    pub address: String,
    #[serde(with = "biguint_serde")]
    pub balance: BigUint,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        let base_url = config.api_url.trim_end_matches('/').to_string();
        info!("🌐 API client initialized for {}", base_url);
        Ok(Self { base_url, client })
    }

    /// Total number of transactions of `address`.
    pub async fn transactions_count(&self, address: &Address) -> Result<u64> {
        let url = format!("{}/accounts/{address}/transactions/count", self.base_url);
        let response = self.client.get(url).header("accept", "application/json").send().await?;
        read_json(response).await
    }

    pub fn account_transactions(&self, address: &Address) -> ApiCollection<ApiTransaction> {
        ApiCollection::new(self.clone(), format!("/accounts/{address}/transactions"), Vec::new())
    }

    /// The whole fungible token catalogue, trimmed to id, name and ticker.
    pub fn fungible_tokens(&self) -> ApiCollection<ApiToken> {
        ApiCollection::new(
            self.clone(),
            "/tokens".to_string(),
            vec![
                ("type".to_string(), "FungibleESDT".to_string()),
                ("fields".to_string(), "identifier,name,ticker".to_string()),
            ],
        )
    }

    pub fn token_accounts(&self, token_id: &str) -> ApiCollection<ApiTokenAccount> {
        ApiCollection::new(self.clone(), format!("/tokens/{token_id}/accounts"), Vec::new())
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(Error::Provider {
            status: status.as_u16(),
            message: body.chars().take(200).collect(),
        });
    }
    parse_body(&body)
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        let excerpt: String = body.chars().take(200).collect();
        Error::InvalidResponse(format!("{e}: {excerpt}"))
    })
}

/// A paged API collection of `T`.
#[derive(Debug, Clone)]
pub struct ApiCollection<T> {
    api: ApiClient,
    path: String,
    query: Vec<(String, String)>,
    _item: PhantomData<fn() -> T>,
}

impl<T> ApiCollection<T> {
    fn new(api: ApiClient, path: String, query: Vec<(String, String)>) -> Self {
        Self {
            api,
            path,
            query,
            _item: PhantomData,
        }
    }
}

#[async_trait]
impl<T> PageSource for ApiCollection<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Item = T;

    fn describe(&self) -> String {
        self.path.clone()
    }

    async fn fetch_page(&self, page: Pagination) -> Result<Option<Vec<T>>> {
        let response = self
            .api
            .client
            .get(format!("{}{}", self.api.base_url, self.path))
            .query(&self.query)
            .query(&[("from", page.start), ("size", page.size)])
            .send()
            .await?;
        read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_and_empty_pages_parse() {
        let null: Option<Vec<ApiToken>> = parse_body("null").unwrap();
        assert!(null.is_none());
        let empty: Option<Vec<ApiToken>> = parse_body("[]").unwrap();
        assert_eq!(empty, Some(Vec::new()));
    }

    #[test]
    fn token_accounts_accept_string_balances() {
        let page: Option<Vec<ApiTokenAccount>> =
            parse_body(r#"[{"address":"erd1a","balance":"1000000000000000000000"},{"address":"erd1b","balance":"5"}]"#)
                .unwrap();
        let page = page.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].balance.to_string(), "1000000000000000000000");
    }

    #[test]
    fn transactions_keep_unknown_fields() {
        let body = r#"[{"txHash":"ab12","timestamp":1700000000,"value":"0","data":"aGVsbG8=","sender":"erd1s","status":"success"}]"#;
        let page: Option<Vec<ApiTransaction>> = parse_body(body).unwrap();
        let tx = &page.unwrap()[0];
        assert_eq!(tx.tx_hash, "ab12");
        assert_eq!(tx.extra["sender"], "erd1s");

        let saved = serde_json::to_value(tx).unwrap();
        assert_eq!(saved["status"], "success");
        assert_eq!(saved["txHash"], "ab12");
    }

    #[test]
    fn garbage_is_invalid_response() {
        let result: Result<Option<Vec<ApiToken>>> = parse_body("<html>");
        assert!(matches!(result, Err(Error::InvalidResponse(_))));
    }

    #[test]
    fn collections_name_their_endpoint() {
        let api = ApiClient::new(&NetworkConfig::default()).unwrap();
        assert_eq!(
            api.token_accounts("WINTER-1a2b3c").describe(),
            "/tokens/WINTER-1a2b3c/accounts"
        );
        assert_eq!(api.fungible_tokens().describe(), "/tokens");
        assert_eq!(
            api.account_transactions(&Address::new("erd1x")).describe(),
            "/accounts/erd1x/transactions"
        );
    }
}
