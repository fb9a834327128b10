// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Transport seam between the SDK and the network.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::config::SdkConfig;
use crate::envelope::Envelope;
use crate::error::{Result, SdkError};

/// Delivers an envelope and returns the raw reply body.
///
/// Implementations report every delivery failure (connection, timeout,
/// non-success HTTP status) as [`SdkError::Transport`] and never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, envelope: &Envelope) -> Result<Vec<u8>>;
}

/// JSON-over-HTTPS transport to the RackCorp endpoint.
///
/// Adds the API credentials to every envelope.
pub struct HttpTransport {
    http: reqwest::Client,
    api_url: String,
    api_uuid: String,
    api_secret: String,
}

impl HttpTransport {
    pub fn new(config: &SdkConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SdkError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_uuid: config.api_uuid.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    fn body(&self, envelope: &Envelope) -> Value {
        let mut object = envelope.to_json_object();
        object.insert("APIUUID".to_string(), Value::String(self.api_uuid.clone()));
        object.insert(
            "APISECRET".to_string(),
            Value::String(self.api_secret.clone()),
        );
        Value::Object(object)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, envelope: &Envelope) -> Result<Vec<u8>> {
        let action = envelope.action();
        let failed = |message: String| SdkError::Transport {
            action: action.to_string(),
            message,
        };

        debug!(action = %action, url = %self.api_url, "Posting envelope");

        let response = self
            .http
            .post(&self.api_url)
            .json(&self.body(envelope))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    failed(format!("request timed out: {}", e))
                } else {
                    failed(e.to_string())
                }
            })?;

        let response = response
            .error_for_status()
            .map_err(|e| failed(e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| failed(format!("failed to read response body: {}", e)))?;

        Ok(bytes.to_vec())
    }
}
