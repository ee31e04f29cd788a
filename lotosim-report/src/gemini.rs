//! Client HTTP pour l'API Gemini (`generateContent`).
//!
//! Un seul appel, sans nouvelle tentative : en cas d'échec l'appelant
//! substitue le message de repli.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use lotosim_core::report::ReportGenerator;
use lotosim_core::{GameConfig, SimulationResult};

use crate::prompt::build_prompt;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

pub struct GeminiReporter {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    language: String,
    temperature: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GeminiReporter {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Impossible de créer le client HTTP")?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            language: "French".to_string(),
            temperature: 0.7,
        })
    }

    /// Clé lue dans `GEMINI_API_KEY`, à défaut `API_KEY`.
    pub fn from_env() -> Result<Self> {
        let key = API_KEY_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|k| !k.trim().is_empty()))
            .with_context(|| format!("Aucune clé API trouvée ({})", API_KEY_VARS.join(" ou ")))?;
        Self::new(key)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }

    fn request_body(&self, prompt: String) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: Some(prompt) }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        }
    }
}

/// Concatène les parties texte du premier candidat.
fn extract_text(response: GenerateResponse) -> Result<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        bail!("Réponse Gemini sans texte");
    }
    Ok(text)
}

#[async_trait]
impl ReportGenerator for GeminiReporter {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, result: &SimulationResult, config: &GameConfig) -> Result<String> {
        let prompt = build_prompt(result, config, &self.language);
        log::debug!("Requête Gemini ({}, {} caractères)", self.model, prompt.len());

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .context("Erreur HTTP vers Gemini")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Gemini a répondu {status}: {body}");
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .context("Réponse Gemini illisible")?;
        extract_text(parsed)
    }
}
