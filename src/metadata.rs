use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

use crate::constants::constants;

/// Summary and tags produced for a new entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AiMetadata {
  pub summary: String,
  pub tags: Vec<String>,
}

impl AiMetadata {
  /// What an entry gets when the generator can't answer.
  pub fn fallback() -> Self {
    let c = constants();
    Self { summary: c.fallback_summary.clone(), tags: vec![c.fallback_tag.clone()] }
  }
}

pub trait MetadataGenerator {
  fn generate(&self, title: &str, filename: &str) -> impl Future<Output = Result<AiMetadata>> + Send;
}

/// Ask `generator` for metadata; any failure is logged and replaced with
/// [`AiMetadata::fallback`], so entry creation always goes through.
pub async fn generate_or_fallback<G: MetadataGenerator>(generator: &G, title: &str, filename: &str) -> AiMetadata {
  match generator.generate(title, filename).await {
    Ok(meta) => {
      info!(tags = meta.tags.len(), "metadata: generated");
      meta
    }
    Err(e) => {
      warn!(err = ?e, "metadata: generation failed, using fallback");
      AiMetadata::fallback()
    }
  }
}

pub fn build_prompt(title: &str, filename: &str) -> String {
  format!(
    "Estou catalogando um vídeo pessoal na minha biblioteca chamada \"{app}\".\n\
     O título que dei é \"{title}\" e o nome original do arquivo é \"{filename}\".\n\n\
     Por favor, gere um resumo curto e divertido (máximo 2 frases) em Português do Brasil sobre o que esse vídeo \
     pode tratar (tente ser criativo baseado no título).\n\
     Além disso, forneça de 3 a 5 categorias curtas (tags) em Português.",
    app = constants().app_name,
  )
}

/// `generateContent` body with a JSON response schema of `{summary, tags}`.
fn request_body(title: &str, filename: &str) -> Value {
  json!({
    "contents": [{ "parts": [{ "text": build_prompt(title, filename) }] }],
    "generationConfig": {
      "responseMimeType": "application/json",
      "responseSchema": {
        "type": "OBJECT",
        "properties": {
          "summary": {
            "type": "STRING",
            "description": "Um resumo curto e engajador do conteúdo do vídeo em Português."
          },
          "tags": {
            "type": "ARRAY",
            "items": { "type": "STRING" },
            "description": "Uma lista de categorias em Português."
          }
        },
        "required": ["summary", "tags"]
      }
    }
  })
}

#[derive(Deserialize)]
struct GenerateResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
  content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
  #[serde(default)]
  parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
  text: Option<String>,
}

/// Pull the model's JSON text out of a `generateContent` response and parse it.
fn parse_response(body: &str) -> Result<AiMetadata> {
  let response: GenerateResponse = serde_json::from_str(body).context("Malformed generateContent response")?;
  let text: String = response
    .candidates
    .into_iter()
    .filter_map(|c| c.content)
    .flat_map(|c| c.parts)
    .filter_map(|p| p.text)
    .collect();
  if text.trim().is_empty() {
    return Err(anyhow!("No response text from model"));
  }
  serde_json::from_str(&text).context("Model text is not the expected {summary, tags} object")
}

pub struct GeminiClient {
  http: Client,
  base_url: String,
  model: String,
  api_key: Option<String>,
}

impl GeminiClient {
  pub fn new(base_url: &str, model: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
    let http = Client::builder().timeout(timeout).build().context("Failed to build HTTP client")?;
    Ok(Self {
      http,
      base_url: base_url.trim_end_matches('/').to_string(),
      model: model.to_string(),
      api_key: api_key.filter(|k| !k.trim().is_empty()),
    })
  }

  fn endpoint(&self) -> String {
    format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
  }
}

impl MetadataGenerator for GeminiClient {
  async fn generate(&self, title: &str, filename: &str) -> Result<AiMetadata> {
    let api_key = self.api_key.as_deref().ok_or_else(|| anyhow!("No Gemini API key configured"))?;

    let response = self
      .http
      .post(self.endpoint())
      .header("x-goog-api-key", api_key)
      .json(&request_body(title, filename))
      .send()
      .await
      .context("Metadata request failed")?;

    let status = response.status();
    let body = response.text().await.context("Failed to read metadata response")?;
    if !status.is_success() {
      return Err(anyhow!("Metadata request returned {}: {}", status, body));
    }
    parse_response(&body)
  }
}
