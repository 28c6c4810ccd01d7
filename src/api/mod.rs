// Cravyn recipe service client

use anyhow::{Context, Result};
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::{AppConfig, Recipe};

/// `error_type` value the service uses when image generation is not billed
const BILLING_REQUIRED: &str = "billing_required";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// Service answered with a non-success status
    #[error("API error ({status}): {detail}")]
    Api { status: u16, detail: String },

    /// Response body did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Image generation is gated behind a billing account
    #[error("Billing required: {0}")]
    BillingRequired(String),
}

impl ApiError {
    pub fn is_billing_related(&self) -> bool {
        match self {
            Self::BillingRequired(_) => true,
            Self::Api { detail, .. } => mentions_billing(detail),
            Self::Network(_) | Self::Parse(_) => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Whether an error detail from the image endpoint is the upstream
/// "only available to billed users" rejection.
pub fn mentions_billing(detail: &str) -> bool {
    detail.contains("billed users")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateRecipeRequest {
    pub ingredients: Vec<String>,
    pub diet_type: Option<String>,
    pub cuisine: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    image_base64: Option<String>,
    #[serde(default)]
    error_type: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct CravynClient {
    base_url: String,
    client: Client,
}

impl CravynClient {
    pub fn new(base_url: &str, request_timeout: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(request_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(&config.service_url, config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Most recent recipes, in the order the service returns them
    pub async fn list_recipes(&self, limit: usize) -> Result<Vec<Recipe>, ApiError> {
        let url = format!("{}/api/recipes", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("limit", limit)])
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(response.json::<Vec<Recipe>>().await?)
    }

    pub async fn generate_recipe(&self, request: &GenerateRecipeRequest) -> Result<Recipe, ApiError> {
        let url = format!("{}/api/recipes/generate", self.base_url);

        let response = self.client.post(&url).json(request).send().await?;

        let response = check_status(response).await?;
        Ok(response.json::<Recipe>().await?)
    }

    /// A random recipe with no ingredient constraints
    pub async fn surprise_me(&self) -> Result<Recipe, ApiError> {
        let url = format!("{}/api/surprise-me", self.base_url);

        let response = self.client.get(&url).send().await?;

        let response = check_status(response).await?;
        Ok(response.json::<Recipe>().await?)
    }

    /// `{base}/api/recipes/{id}/{action}` with the id escaped as one path segment
    fn recipe_url(&self, recipe_id: &str, action: &str) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::Network(format!("Invalid service URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::Network(format!("Invalid service URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "recipes", recipe_id, action]);
        Ok(url)
    }

    /// Request an illustration for a stored recipe, returning the base64 image
    pub async fn generate_image(&self, recipe_id: &str) -> Result<String, ApiError> {
        let url = self.recipe_url(recipe_id, "generate-image")?;

        let response = self.client.post(url).send().await?;

        let response = check_status(response).await?;
        let body = response.json::<ImageResponse>().await?;

        if body.error_type.as_deref() == Some(BILLING_REQUIRED) {
            return Err(ApiError::BillingRequired(body.message.unwrap_or_default()));
        }

        body.image_base64
            .ok_or_else(|| ApiError::Parse("No image was returned".to_string()))
    }
}

/// Turn a non-success response into [`ApiError::Api`], keeping the service's
/// `detail` message when the body carries one.
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let detail = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) => text,
    };

    Err(ApiError::Api {
        status: status.as_u16(),
        detail,
    })
}
