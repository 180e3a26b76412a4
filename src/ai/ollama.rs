//! Local model path: `/api/chat` for images and PDFs, `/api/generate` for everything else.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use super::extract::extract_analysis;
use super::http_client::{ai_client, TEXT_TIMEOUT, VISION_TIMEOUT};
use super::{pdf, prompts, AiError, Provider};
use crate::models::AiAnalysis;
use crate::rules::template::split_name;

/// Marks vision variants in model names, e.g. `qwen3-vl:4b`
const VISION_MARKER: &str = "-vl";

/// Output budget for text-only naming
const NUM_PREDICT: u32 = 100;

const PROVIDER: Provider = Provider::Ollama;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_predict: u32,
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: ChatResponseMessage,
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Extensions the vision model is shown directly
pub fn is_image_extension(ext: &str) -> bool {
    matches!(
        ext.to_lowercase().as_str(),
        "jpg" | "jpeg" | "png" | "gif" | "bmp" | "webp" | "tiff" | "tif"
    )
}

/// Non-vision variant of `model` (first marker removed)
pub fn text_model_for(model: &str) -> String {
    model.replacen(VISION_MARKER, "", 1)
}

/// Suggest a name for `path` with an Ollama model.
///
/// Transport failures and error statuses are returned as errors. A failed
/// PDF render or a reply without usable JSON is not: those give a
/// zero-confidence answer that keeps the original name.
pub async fn analyze(base_url: &str, path: &Path, model: &str) -> Result<AiAnalysis, AiError> {
    analyze_with(base_url, path, model, |pdf: PathBuf| async move {
        pdf::render_first_page(&pdf).await
    })
    .await
}

/// [`analyze`] with the PDF rasterizer supplied by the caller
pub(crate) async fn analyze_with<R, Fut>(
    base_url: &str,
    path: &Path,
    model: &str,
    render: R,
) -> Result<AiAnalysis, AiError>
where
    R: FnOnce(PathBuf) -> Fut,
    Fut: Future<Output = io::Result<pdf::RenderedPage>>,
{
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let (base_name, ext) = split_name(&file_name);
    let ext = ext.trim_start_matches('.').to_lowercase();

    let is_image = is_image_extension(&ext);
    let is_pdf = ext == "pdf";

    let actual_model = if !is_image && !is_pdf && model.contains(VISION_MARKER) {
        let text_model = text_model_for(model);
        debug!(from = %model, to = %text_model, "Non-visual file, switching to text model");
        text_model
    } else {
        model.to_string()
    };

    // Held until the request finishes; dropping it removes the temp image.
    let rendered = if is_pdf {
        match render(path.to_path_buf()).await {
            Ok(page) => Some(page),
            Err(e) => {
                warn!(file = %file_name, error = %e, "PDF render failed, keeping original name");
                return Ok(AiAnalysis::fallback(base_name, "document"));
            }
        }
    } else {
        None
    };

    let image_path = if is_image {
        Some(path)
    } else {
        rendered.as_ref().map(|page| page.path())
    };

    let image = match image_path {
        Some(p) => match tokio::fs::read(p).await {
            Ok(bytes) => Some(STANDARD.encode(bytes)),
            Err(e) => {
                warn!(file = %file_name, error = %e, "Failed to read image, falling back to text prompt");
                None
            }
        },
        None => None,
    };

    let content = match image {
        Some(image) => {
            let prompt = if is_pdf {
                prompts::pdf_prompt()
            } else {
                prompts::image_prompt()
            };
            let request = ChatRequest {
                model: &actual_model,
                messages: vec![ChatMessage {
                    role: "user",
                    content: &prompt,
                    images: vec![image],
                }],
                stream: false,
            };
            debug!(endpoint = "/api/chat", model = %actual_model, file = %file_name, "Sending vision request");
            let response: ChatResponse =
                post_json(&format!("{}/api/chat", base_url), &request, VISION_TIMEOUT).await?;
            response.message.content
        }
        None => {
            let prompt = prompts::filename_prompt(base_name);
            let request = GenerateRequest {
                model: &actual_model,
                prompt: &prompt,
                stream: false,
                options: GenerateOptions {
                    num_predict: NUM_PREDICT,
                },
            };
            debug!(endpoint = "/api/generate", model = %actual_model, file = %file_name, "Sending text request");
            let response: GenerateResponse =
                post_json(&format!("{}/api/generate", base_url), &request, TEXT_TIMEOUT).await?;
            response.response
        }
    };
    drop(rendered);

    debug!(model = %actual_model, file = %file_name, raw = %content, "Model reply");

    let mut analysis = match extract_analysis(&content) {
        Ok(analysis) => analysis,
        Err(e) => {
            warn!(file = %file_name, error = %e, "Unusable model reply, keeping original name");
            return Ok(AiAnalysis::fallback(base_name, "unknown"));
        }
    };

    if analysis.suggested_name.trim().is_empty() {
        analysis.suggested_name = base_name.to_string();
        analysis.confidence = 0.0;
    }

    Ok(analysis)
}

async fn post_json<B, R>(url: &str, body: &B, timeout: Duration) -> Result<R, AiError>
where
    B: Serialize + ?Sized,
    R: serde::de::DeserializeOwned,
{
    let response = ai_client()
        .post(url)
        .timeout(timeout)
        .json(body)
        .send()
        .await
        .map_err(|e| AiError::from_reqwest(PROVIDER, e))?;

    if !response.status().is_success() {
        return Err(AiError::from_status(PROVIDER, response).await);
    }

    response
        .json()
        .await
        .map_err(|e| AiError::from_reqwest(PROVIDER, e))
}
