//! Shared HTTP plumbing for the gateways.

use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use taskmate_core::auth::CredentialStore;
use taskmate_core::error::{Result, TaskmateError};

/// Which side of the error taxonomy a failed call maps to.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Channel {
    /// Reads fail with `Fetch`; prior local state is preserved.
    Read,
    /// Writes fail with `Mutation`; optimistic changes get rolled back.
    Write,
}

impl Channel {
    pub(crate) fn error(self, message: String) -> TaskmateError {
        match self {
            Channel::Read => TaskmateError::Fetch { message },
            Channel::Write => TaskmateError::Mutation { message },
        }
    }
}

/// Builds the shared client with the bounded request timeout.
pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| TaskmateError::internal(format!("failed to build HTTP client: {err}")))
}

/// Maps a transport-level failure (connect, timeout) into the taxonomy.
///
/// A timeout fails exactly like a rejection; callers cannot distinguish the
/// two and handle both identically.
pub(crate) fn transport_error(channel: Channel, err: reqwest::Error) -> TaskmateError {
    let kind = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    channel.error(format!("{kind}: {err}"))
}

/// Checks the response status, invalidating the credential on 401.
pub(crate) async fn require_success(
    channel: Channel,
    response: Response,
    credential: &CredentialStore,
) -> Result<Response> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        credential.invalidate().await;
        return Err(TaskmateError::AuthRequired);
    }
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "failed to read error body".to_string());
        return Err(channel.error(format!("HTTP {status}: {body}")));
    }
    Ok(response)
}
