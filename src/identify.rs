//! Client for the external plant identification service (Pl@ntNet API).
//!
//! The service is a collaborator, not part of the engine: every transport
//! or parse failure is folded into [`IdentificationResult::error`] so the
//! resolvers only ever see the "absent/error" input shape.
use anyhow::{anyhow, Result};
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::models::IdentificationResult;

// ---

pub const DEFAULT_API_URL: &str = "https://my-api.plantnet.org/v2/identify/all";

pub struct PlantNetClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl PlantNetClient {
    // ---
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        PlantNetClient {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Identify the plant in `image`. Never fails; errors come back as an
    /// identification carrying an error marker.
    pub async fn identify(&self, image: Vec<u8>, filename: &str) -> IdentificationResult {
        // ---
        match self.request(image, filename).await {
            Ok(body) => parse_identification(&body),
            Err(e) => {
                tracing::error!("Identification request failed: {}", e);
                IdentificationResult::failed(format!("Identification request failed: {e}"))
            }
        }
    }

    async fn request(&self, image: Vec<u8>, filename: &str) -> Result<Value> {
        // ---
        let part = Part::bytes(image)
            .file_name(filename.to_string())
            .mime_str(mime_for(filename))?;
        let form = Form::new().text("organs", "auto").part("images", part);

        tracing::debug!("Sending {} to {}", filename, self.api_url);

        let response = self
            .http
            .post(&self.api_url)
            .query(&[("api-key", self.api_key.as_str())])
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("service returned {}: {}", status, text));
        }

        Ok(response.json().await?)
    }
}

/// Read the top-ranked result of an identification response.
///
/// The service reports score as a 0-1 fraction; it is scaled to 0-100.
pub fn parse_identification(body: &Value) -> IdentificationResult {
    // ---
    let Some(best) = body
        .get("results")
        .and_then(|r| r.as_array())
        .and_then(|r| r.first())
    else {
        return IdentificationResult::failed("No plant match found");
    };

    let species = best.get("species");
    let scientific_name = species
        .and_then(|s| {
            s.get("scientificNameWithoutAuthor")
                .or_else(|| s.get("scientificName"))
        })
        .and_then(Value::as_str)
        .map(String::from);
    let common_name = species
        .and_then(|s| s.get("commonNames"))
        .and_then(|c| c.as_array())
        .and_then(|c| c.iter().find_map(Value::as_str))
        .map(String::from);
    let confidence = best.get("score").and_then(Value::as_f64).map(|s| s * 100.0);

    if scientific_name.is_none() && common_name.is_none() {
        return IdentificationResult::failed("Identification response had no plant names");
    }

    IdentificationResult {
        scientific_name,
        common_name,
        confidence,
        error: None,
    }
}

fn mime_for(filename: &str) -> &'static str {
    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".png") {
        "image/png"
    } else {
        "image/jpeg"
    }
}
