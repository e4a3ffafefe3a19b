//! HTTP implementation of [`ApiGateway`] over the REST backend.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use storefront_core::{BankDirectory, Product, QrPayment, SessionId};
use tracing::debug;
use url::Url;

use crate::config::ApiSettings;
use crate::error::{ClientError, ClientResult};
use crate::gateway::ApiGateway;
use crate::protocol::{BanksResponse, RemoteCart, RemoteCartItem, SaveCartAck, SaveCartRequest};

/// REST gateway backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
}

impl HttpGateway {
    /// Creates a gateway from API settings.
    pub fn new(settings: &ApiSettings) -> ClientResult<Self> {
        let base_url = settings.parsed_base_url()?;
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds `{base}/{segment}/{segment}...`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Make a GET request
    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> ClientResult<T> {
        let url = self.endpoint(segments)?;
        debug!(%url, "GET");

        let response = self.client.get(url).send().await?;
        Self::handle_response(response, segments).await
    }

    /// Make a POST request with JSON body
    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> ClientResult<T> {
        let url = self.endpoint(segments)?;
        debug!(%url, "POST");

        let response = self.client.post(url).json(body).send().await?;
        Self::handle_response(response, segments).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
        segments: &[&str],
    ) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return match status {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound {
                    resource: segments.join("/"),
                }),
                _ => Err(ClientError::Status {
                    status: status.as_u16(),
                    body,
                }),
            };
        }

        response.json().await.map_err(Into::into)
    }
}

#[async_trait]
impl ApiGateway for HttpGateway {
    async fn list_products(&self) -> ClientResult<Vec<Product>> {
        self.get(&["products"]).await
    }

    async fn get_product(&self, product_id: &str) -> ClientResult<Product> {
        self.get(&["products", product_id]).await
    }

    async fn save_cart(
        &self,
        session_id: &SessionId,
        items: &[RemoteCartItem],
    ) -> ClientResult<SaveCartAck> {
        let request = SaveCartRequest {
            session_id: session_id.clone(),
            items: items.to_vec(),
        };
        self.post(&["cart", "save"], &request).await
    }

    async fn load_cart(&self, session_id: &SessionId) -> ClientResult<Vec<RemoteCartItem>> {
        let cart: RemoteCart = self.get(&["cart", session_id.as_str()]).await?;
        Ok(cart.items)
    }

    async fn bank_directory(&self) -> ClientResult<BankDirectory> {
        let response: BanksResponse = self.get(&["banks"]).await?;
        Ok(response.banks)
    }

    async fn generate_qr(&self, bank: &str, amount: i64) -> ClientResult<QrPayment> {
        let amount = amount.to_string();
        self.get(&["qr-code", bank, &amount]).await
    }
}
