// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::code::ErrorCode;
use crate::raise_error;
use crate::{gmailer_version, modules::error::GmailerResult};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Authorized JSON client shared by the Gmail and Drive API wrappers.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    access_token: String,
}

impl HttpClient {
    pub fn new(access_token: impl Into<String>, timeout: Duration) -> GmailerResult<HttpClient> {
        let client = reqwest::ClientBuilder::new()
            .user_agent(format!("gmailer/{}", gmailer_version!()))
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                raise_error!(
                    format!("Failed to build HTTP client: {:#?}", e),
                    ErrorCode::InternalError
                )
            })?;

        Ok(Self {
            client,
            access_token: access_token.into(),
        })
    }

    pub async fn get(&self, url: &str, query: &[(&str, &str)]) -> GmailerResult<serde_json::Value> {
        let request = self.client.get(url).query(query);
        let response = self.send(request, url).await?;
        Self::json_body(response, url).await
    }

    pub async fn post<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: Option<&T>,
    ) -> GmailerResult<serde_json::Value> {
        let mut request = self.client.post(url);
        request = match body {
            Some(body) => request.json(body),
            None => request.header(reqwest::header::CONTENT_LENGTH, 0),
        };
        let response = self.send(request, url).await?;
        Self::json_body(response, url).await
    }

    pub async fn delete(&self, url: &str) -> GmailerResult<()> {
        let request = self.client.delete(url);
        self.send(request, url).await?;
        Ok(())
    }

    /// Issues a GET and hands back the successful response without reading
    /// its body, for media downloads that are consumed as a stream.
    pub async fn get_raw(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> GmailerResult<reqwest::Response> {
        let request = self.client.get(url).query(query);
        self.send(request, url).await
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> GmailerResult<reqwest::Response> {
        debug!("request {}", url);
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| {
                raise_error!(
                    format!("Request to {} failed: {:#?}", url, e),
                    ErrorCode::NetworkError
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(raise_error!(
                format!("{} responded with {}: {}", url, status, body),
                ErrorCode::HttpResponseError
            ));
        }
        Ok(response)
    }

    async fn json_body(response: reqwest::Response, url: &str) -> GmailerResult<serde_json::Value> {
        let text = response.text().await.map_err(|e| {
            raise_error!(
                format!("Failed to read response body from {}: {:#?}", url, e),
                ErrorCode::NetworkError
            )
        })?;
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| {
            raise_error!(
                format!("Response from {} is not valid JSON: {:#?}", url, e),
                ErrorCode::HttpResponseError
            )
        })
    }
}
