//! Gemini structuring client
//!
//! Calls the `generateContent` REST endpoint with a JSON response schema so
//! the model answers with exam records only.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;

use super::types::{parse_records, response_schema, ExamRecord, StructuringError};
use super::StructuringService;

/// Gemini client configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Google Gemini structuring service
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, StructuringError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StructuringError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn request_body(raw_text: &str) -> Value {
        serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": build_prompt(raw_text) }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema(),
                "temperature": 0.0
            }
        })
    }
}

/// Pull the generated JSON text out of a `generateContent` response
fn candidate_text(response: &Value) -> Result<String, StructuringError> {
    let parts = response["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| {
            let reason = response["candidates"][0]["finishReason"]
                .as_str()
                .or_else(|| response["promptFeedback"]["blockReason"].as_str())
                .unwrap_or("no candidates");
            StructuringError::EmptyResponse(reason.to_string())
        })?;

    let text: String = parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect();

    if text.trim().is_empty() {
        return Err(StructuringError::EmptyResponse("empty candidate text".into()));
    }
    Ok(text)
}

#[async_trait]
impl StructuringService for GeminiClient {
    async fn structure(&self, raw_text: &str) -> Result<Vec<ExamRecord>, StructuringError> {
        let started = Instant::now();
        tracing::info!(model = %self.config.model, "Sending text to Gemini");

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&Self::request_body(raw_text))
            .send()
            .await
            .map_err(|e| StructuringError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StructuringError::Status { status, body });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StructuringError::Transport(format!("Failed to read response: {}", e)))?;

        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Gemini response received"
        );

        let text = candidate_text(&body)?;
        parse_records(&text)
    }
}

/// Extraction prompt sent with the raw report text
pub fn build_prompt(raw_text: &str) -> String {
    format!(
        r#"Você é um assistente de extração de dados clínicos. Converta o texto do laudo laboratorial abaixo em JSON, seguindo estritamente o schema fornecido.
REGRAS:
1. EXAUSTIVIDADE: extraia cada componente de cada exame (hemograma, lipídios, bilirrubinas, etc.).
2. ORDEM: siga as categorias clínicas do laudo: hemograma (eritrócitos, leucócitos, plaquetas), perfil lipídico, bioquímica, enzimas hepáticas, hormônios e vitaminas.
3. VALOR E UNIDADE: copie 'ResultadoObtido', 'ValorReferencia' e 'UnidadeMedida' exatamente como aparecem.
4. DECIMAIS: use vírgula como separador decimal e ponto como separador de milhar (5.16 -> 5,16; 230.000 -> 230.000).
5. SIGLA: informe a abreviação usual (Creatinina -> Cr, Hemoglobina -> Hb, TGO -> TGO).
6. DATACOLETA: use a data de coleta do laudo ('Coleta: DD/MM/AAAA') em todos os exames; havendo várias, use a mais frequente.
TEXTO DO LAUDO:
---
{}
---"#,
        raw_text
    )
}
