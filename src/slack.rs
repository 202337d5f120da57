// Slack client module: a small blocking HTTP client that uploads a profile
// photo through the `users.setPhoto` Web API method.

use anyhow::{Context, Result};
use log::{info, warn};
use reqwest::blocking::{multipart, Client};
use serde::Deserialize;
use std::path::Path;

/// Default `users.setPhoto` endpoint.
pub const SET_PHOTO_URL: &str = "https://slack.com/api/users.setPhoto";

/// Something that can publish a photo file as the user's profile photo.
pub trait PhotoUploader {
    fn upload(&self, token: &str, path: &Path) -> Result<()>;
}

/// Blocking client bound to a single `users.setPhoto` endpoint.
#[derive(Clone)]
pub struct SlackClient {
    client: Client,
    endpoint: String,
}

/// Envelope every Slack Web API method answers with.
#[derive(Deserialize, Debug, PartialEq)]
pub struct SetPhotoResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl SlackClient {
    /// Create a client for the endpoint in `SLACK_API_URL`, or
    /// [`SET_PHOTO_URL`] when the variable is unset.
    pub fn from_env() -> Result<Self> {
        let endpoint = std::env::var("SLACK_API_URL").unwrap_or_else(|_| SET_PHOTO_URL.into());
        Self::with_endpoint(endpoint)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::new(client, endpoint))
    }

    /// Use an already configured `reqwest` client.
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        SlackClient {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the multipart body: an `image` part with the file's bytes and
    /// base filename, plus a `token` text field.
    pub fn build_form(token: &str, path: &Path) -> Result<multipart::Form> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read photo {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".into());

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime_for(path))
            .context("Invalid image mime type")?;
        Ok(multipart::Form::new()
            .part("image", part)
            .text("token", token.to_string()))
    }

    /// POST `path` as the profile photo of the user owning `token`.
    ///
    /// Non-2xx statuses and `ok: false` answers are errors. A 2xx body
    /// that is not the usual JSON envelope is accepted with a warning.
    pub fn set_photo(&self, token: &str, path: &Path) -> Result<SetPhotoResponse> {
        let form = Self::build_form(token, path)?;
        let res = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .context("Failed to send setPhoto request")?;

        let status = res.status();
        if !status.is_success() {
            let txt = res.text().unwrap_or_else(|_| "".into());
            anyhow::bail!("Upload failed: {} - {}", status, txt);
        }
        let txt = res.text().context("Failed to read setPhoto response")?;
        match serde_json::from_str::<SetPhotoResponse>(&txt) {
            Ok(resp) if resp.ok => Ok(resp),
            Ok(resp) => anyhow::bail!(
                "Slack rejected photo: {}",
                resp.error.as_deref().unwrap_or("unknown error")
            ),
            Err(e) => {
                warn!("Unrecognized setPhoto response ({}): {}", e, txt);
                Ok(SetPhotoResponse { ok: true, error: None })
            }
        }
    }
}

impl PhotoUploader for SlackClient {
    fn upload(&self, token: &str, path: &Path) -> Result<()> {
        info!("Uploading {} to {}", path.display(), self.endpoint);
        self.set_photo(token, path)?;
        info!("Profile photo updated");
        Ok(())
    }
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}
