use std::time::Duration;

use async_trait::async_trait;
use nuzul_core::gateway::{
    ConfirmPaymentRequest, ConfirmPaymentResponse, CreateOrderRequest, CreateOrderResponse,
    GatewayError, ReservationGateway,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::types::{Hotel, PropertySignupRequest, PropertySignupResponse, Reservation, SiteConfig};

fn network_error(e: reqwest::Error) -> GatewayError {
    GatewayError::Network(e.to_string())
}

/// HTTP client of the reservation backend. Cheap to clone; the underlying
/// connection pool is shared.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Build a client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(network_error)?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Non-2xx responses become `Rejected` with the body as the message;
    /// undecodable bodies become `Decode`.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        tracing::debug!(path, "backend GET");
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(network_error)?;
        Self::decode(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GatewayError> {
        tracing::debug!(path, "backend POST");
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(network_error)?;
        Self::decode(response).await
    }

    /// Latest admin-managed site content (branding, terms, rates).
    pub async fn site_config(&self) -> Result<SiteConfig, GatewayError> {
        self.get_json("site-config/latest").await
    }

    /// Bookable hotels only; inactive properties stay hidden.
    pub async fn active_hotels(&self) -> Result<Vec<Hotel>, GatewayError> {
        self.get_json("hotels?active=true").await
    }

    /// Room-type codes the catalog knows, for search filters.
    pub async fn room_types(&self) -> Result<Vec<String>, GatewayError> {
        self.get_json("room-types").await
    }

    pub async fn property_signup(
        &self,
        request: &PropertySignupRequest,
    ) -> Result<PropertySignupResponse, GatewayError> {
        self.post_json("property-signup", request).await
    }

    /// Reservation by confirmation number, with its payment balance.
    pub async fn reservation(&self, confirmation_number: &str) -> Result<Reservation, GatewayError> {
        self.get_json(&format!("reservations/{confirmation_number}"))
            .await
    }

    /// Invoice PDF bytes for a reservation.
    pub async fn reservation_invoice(
        &self,
        confirmation_number: &str,
    ) -> Result<Vec<u8>, GatewayError> {
        let path = format!("reservations/{confirmation_number}/invoice");
        tracing::debug!(path = %path, "backend GET (binary)");
        let response = self
            .http
            .get(self.url(&path))
            .send()
            .await
            .map_err(network_error)?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        let bytes = response.bytes().await.map_err(network_error)?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ReservationGateway for BackendClient {
    async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, GatewayError> {
        self.post_json("payment-orders", request).await
    }

    async fn confirm_payment(
        &self,
        confirmation_number: &str,
        request: &ConfirmPaymentRequest,
    ) -> Result<ConfirmPaymentResponse, GatewayError> {
        self.post_json(
            &format!("reservations/{confirmation_number}/confirm-payment"),
            request,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining_normalizes_slashes() {
        let client =
            BackendClient::new("https://api.example.com/v1/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.url("hotels"), "https://api.example.com/v1/hotels");
        assert_eq!(client.url("/hotels"), "https://api.example.com/v1/hotels");
        assert_eq!(
            client.url("reservations/HJ-1/invoice"),
            "https://api.example.com/v1/reservations/HJ-1/invoice"
        );
    }
}
