//! Tells a running dashboard to drop its browser-side session state.
//!
//! The request is advisory: a dashboard that is not running is the normal
//! case after a reset, so failures are reported and never retried.
use std::time::Duration;

use crate::config::settings::ServerSettings;
use crate::error::SignalError;

/// Something that can ask the dashboard to clear its state.
#[cfg_attr(test, mockall::automock)]
pub trait StateSignal: Send + Sync {
    /// Endpoint the signal is sent to, for reporting.
    fn endpoint(&self) -> String;

    /// Send the signal once.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError`] if the dashboard cannot be reached in time or
    /// answers with an error status.
    fn send(&self) -> Result<(), SignalError>;
}

/// `POST`s to the dashboard's clear-state endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct HttpStateSignal {
    url: String,
    timeout: Duration,
}

impl HttpStateSignal {
    /// Signal `url`, giving up after `timeout`.
    #[must_use]
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }

    /// Signal the endpoint described by `server`.
    #[must_use]
    pub fn from_settings(server: &ServerSettings) -> Self {
        Self::new(server.clear_state_url(), server.timeout())
    }
}

impl StateSignal for HttpStateSignal {
    fn endpoint(&self) -> String {
        self.url.clone()
    }

    fn send(&self) -> Result<(), SignalError> {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(self.timeout))
            .http_status_as_error(true)
            .build()
            .into();
        agent
            .post(&self.url)
            .send_empty()
            .map(|_| ())
            .map_err(|e| SignalError {
                url: self.url.clone(),
                message: e.to_string(),
            })
    }
}
