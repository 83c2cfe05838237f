//! HTTP report store client.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::{Error, Result};
use crate::report::MatchReportPayload;
use crate::submit::{classify_submission_failure, ReportSink, SubmissionReceipt};

/// Posts reports as JSON to a report store endpoint.
#[derive(Debug, Clone)]
pub struct HttpReportSink {
    client: Client,
    url: String,
    token: Option<String>,
}

impl HttpReportSink {
    /// Client for the endpoint at `url`.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("volley_report/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
            token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every submission.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

impl ReportSink for HttpReportSink {
    fn submit(&self, payload: &MatchReportPayload) -> Result<SubmissionReceipt> {
        let mut request = self.client.post(&self.url).json(payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|e| Error::Transport(e.to_string()))?;
        let status = response.status();
        let body = response.text().map_err(|e| Error::Transport(e.to_string()))?;
        log::debug!("Report store answered {} ({} bytes)", status, body.len());

        if !status.is_success() {
            return Err(classify_submission_failure(status.as_u16(), &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::Transport(format!("unexpected response from report store: {}", e)))
    }
}
