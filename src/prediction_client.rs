use crate::errors::ClientError;
use crate::models::{
    ChatReply, ChatReplyBody, ChatRequest, ErrorBody, OcrPayload, PredictionRequest,
    PredictionResponse,
};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;

/// Reply used when `/chat` answers without `reply` or `response`.
pub const CHAT_FALLBACK_REPLY: &str = "Sorry, I didn't understand that.";

/// Client for the loan prediction server.
///
/// Each call issues exactly one request: no retries, and no timeout beyond
/// what the transport imposes.
#[derive(Clone)]
pub struct PredictionClient {
    client: reqwest::Client,
    base_url: String,
}

impl PredictionClient {
    /// Creates a new `PredictionClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Address every endpoint is resolved against.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().build().map_err(|e| {
            ClientError::Network(format!("Failed to create prediction client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a prediction request to the endpoint matching its shape.
    ///
    /// # Returns
    ///
    /// * `Result<PredictionResponse, ClientError>` - The prediction, a `Server`
    ///   error for non-success statuses, or a `Network` error for transport
    ///   failures and unreadable bodies.
    pub async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResponse, ClientError> {
        let url = format!("{}{}", self.base_url, request.endpoint());
        let builder = self.client.post(&url);

        let builder = match request {
            PredictionRequest::Manual(payload) => {
                tracing::info!("Requesting manual prediction: {}", url);
                builder.json(payload)
            }
            PredictionRequest::Ocr(payload) => {
                tracing::info!(
                    "Requesting OCR prediction with {} document(s): {}",
                    payload.parts.len(),
                    url
                );
                builder.multipart(multipart_form(payload)?)
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Network(format!("Prediction request failed: {}", e)))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            ClientError::Network(format!("Failed to read prediction response: {}", e))
        })?;

        if !status.is_success() {
            let message = server_error_message(&body);
            tracing::warn!(
                "Prediction server returned {}: {}",
                status,
                message.as_deref().unwrap_or("<no error message>")
            );
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let prediction: PredictionResponse = serde_json::from_slice(&body).map_err(|e| {
            ClientError::Network(format!("Failed to parse prediction response: {}", e))
        })?;

        tracing::info!(
            "✓ Prediction received (prediction={:?}, probability={:?})",
            prediction.prediction,
            prediction.probability
        );
        Ok(prediction)
    }

    /// Sends free text to the generic chat endpoint.
    ///
    /// The reply body is used whatever the status; only transport failures and
    /// unreadable bodies are errors.
    pub async fn chat(&self, text: &str) -> Result<ChatReply, ClientError> {
        let url = format!("{}/chat", self.base_url);
        tracing::info!("Sending chat message ({} chars): {}", text.len(), url);

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { message: text })
            .send()
            .await
            .map_err(|e| ClientError::Network(format!("Chat request failed: {}", e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!("Chat endpoint returned {}", status);
        }

        let body: ChatReplyBody = response
            .json()
            .await
            .map_err(|e| ClientError::Network(format!("Failed to parse chat response: {}", e)))?;

        let reply = [body.reply, body.response]
            .into_iter()
            .flatten()
            .find(|reply| !reply.is_empty())
            .unwrap_or_else(|| CHAT_FALLBACK_REPLY.to_string());

        Ok(ChatReply { reply })
    }
}

fn multipart_form(payload: &OcrPayload) -> Result<Form, ClientError> {
    payload.parts.iter().try_fold(Form::new(), |form, part| {
        let attachment = &part.attachment;
        let file = Part::bytes(attachment.bytes.clone())
            .file_name(attachment.file_name.clone())
            .mime_str(&attachment.content_type)
            .map_err(|e| {
                ClientError::Network(format!(
                    "Failed to encode {} upload: {}",
                    part.kind.field_name(),
                    e
                ))
            })?;
        Ok(form.part(part.kind.field_name(), file))
    })
}

fn server_error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .filter(|message| !message.trim().is_empty())
}
