use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::Catalog;

#[derive(Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub state_file: PathBuf,
    pub request_timeout: Option<Duration>,
    pub catalog: Catalog,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            api_url: env::var("BOOKING_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            state_file: env::var("BOOKING_STATE_FILE")
                .unwrap_or_else(|_| ".booking-session.json".to_string())
                .into(),
            request_timeout: env::var("BOOKING_API_TIMEOUT_SECS").ok().map(|secs| {
                Duration::from_secs(
                    secs.parse()
                        .expect("BOOKING_API_TIMEOUT_SECS must be a number"),
                )
            }),
            catalog: Catalog::from_env(),
        }
    }
}
