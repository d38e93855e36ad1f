use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::booking::BookingRecord;
use crate::client::draft::DraftBooking;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server refused the booking; the message is meant for the user.
    #[error("{0}")]
    Validation(String),

    #[error("server responded with {status}: {body}")]
    Server { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// The booking endpoints as seen from the client.
#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn list(&self) -> Result<Vec<BookingRecord>, ApiError>;
    async fn create(&self, draft: &DraftBooking) -> Result<BookingRecord, ApiError>;
}

#[async_trait]
impl<T: BookingApi + ?Sized> BookingApi for Arc<T> {
    async fn list(&self) -> Result<Vec<BookingRecord>, ApiError> {
        (**self).list().await
    }

    async fn create(&self, draft: &DraftBooking) -> Result<BookingRecord, ApiError> {
        (**self).create(draft).await
    }
}

pub struct HttpBookingApi {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpBookingApi {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: format!("{}/api/booking", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl BookingApi for HttpBookingApi {
    async fn list(&self) -> Result<Vec<BookingRecord>, ApiError> {
        let response = self.client.get(&self.endpoint).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Server { status, body });
        }
        decode(&body)
    }

    async fn create(&self, draft: &DraftBooking) -> Result<BookingRecord, ApiError> {
        let response = self.client.post(&self.endpoint).json(draft).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::UNPROCESSABLE_ENTITY {
            return Err(ApiError::Validation(body));
        }
        if !status.is_success() {
            return Err(ApiError::Server { status, body });
        }
        decode(&body)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let api = HttpBookingApi::new("http://localhost:8080/", None).unwrap();
        assert_eq!(api.endpoint, "http://localhost:8080/api/booking");
    }

    #[test]
    fn test_decode_rejects_single_object_as_list() {
        let body = r#"{"id":1,"movie":"Tenet","slot":"9PM","seats":{},"created_at":"2024-06-12T18:00:00Z"}"#;
        let result: Result<Vec<BookingRecord>, _> = decode(body);
        assert!(matches!(result, Err(ApiError::Malformed(_))));
    }
}
