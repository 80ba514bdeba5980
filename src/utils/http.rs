// src/utils/http.rs

//! HTTP client utilities.

use crate::error::Result;
use crate::models::ApiConfig;

/// Create a configured asynchronous HTTP client.
///
/// No timeout is set unless `api.timeout_secs` asks for one.
pub fn create_async_client(config: &ApiConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(&config.user_agent);
    if let Some(timeout) = config.timeout() {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}
