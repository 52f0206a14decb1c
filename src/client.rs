//! HTTP client for the hosted generative endpoints.
//!
//! One `GenClient` speaks the whole REST surface: grounded search and
//! image generation/editing via `models/{model}:generateContent`,
//! video generation via `models/{model}:predictLongRunning` plus
//! operation polling via `GET {operation.name}`. The API key rides as
//! a query parameter on every request.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::animate::{AspectRatio, VideoOperation, VideoService};
use crate::asset::ImageAsset;
use crate::config::ClientConfig;
use crate::failure::RemoteFailure;
use crate::{WanderError, WanderResult};

const NO_IMAGE_PRODUCED: &str = "no image produced";

#[derive(Debug)]
pub struct GenClient {
    http: reqwest::Client,
    config: ClientConfig,
}

/// Grounded-search result: the answer text plus whatever grounding
/// references the service attached.
///
/// References are extracted but deliberately not consumed anywhere
/// downstream; the wizard uses only the text.
#[derive(Debug, Clone)]
pub struct SearchAnswer {
    pub text: String,
    pub references: Vec<GroundingRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundingRef {
    pub title: String,
    pub uri: String,
}

impl GenClient {
    pub fn new(config: ClientConfig) -> WanderResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}?key={}",
            self.config.base_url.trim_end_matches('/'),
            path,
            self.config.api_key
        )
    }

    async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> WanderResult<R> {
        let response = self.http.post(self.endpoint(path)).json(body).send().await?;
        Self::read_json(response).await
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> WanderResult<R> {
        let response = self.http.get(self.endpoint(path)).send().await?;
        Self::read_json(response).await
    }

    async fn read_json<R: DeserializeOwned>(response: reqwest::Response) -> WanderResult<R> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WanderError::Remote(RemoteFailure::from_response(
                status.as_u16(),
                &body,
            )));
        }
        Ok(response.json().await?)
    }

    /// Free-text query against the search-grounded model. Only the
    /// answer text is consumed downstream; references ride along.
    pub async fn grounded_search(&self, query: &str) -> WanderResult<SearchAnswer> {
        info!(query, "grounded search");
        let request = GenerateContentRequest {
            contents: vec![Content::from_text(query)],
            tools: Some(vec![Tool {
                google_search: GoogleSearch {},
            }]),
            generation_config: None,
        };
        let path = format!("models/{}:generateContent", self.config.search_model);
        let response: GenerateContentResponse = self.post_json(&path, &request).await?;

        let text = response.joined_text();
        if text.is_empty() {
            return Err(WanderError::remote("search returned no text"));
        }
        Ok(SearchAnswer {
            text,
            references: response.grounding_refs(),
        })
    }

    /// Generate one image from a text prompt.
    pub async fn generate_image(&self, prompt: &str) -> WanderResult<ImageAsset> {
        info!("generating image");
        let request = GenerateContentRequest {
            contents: vec![Content::from_text(prompt)],
            tools: None,
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["IMAGE".into(), "TEXT".into()],
            }),
        };
        self.request_image(&request).await
    }

    /// Edit one or two source images under a text instruction.
    ///
    /// A text-only reply is a soft failure: the model's explanation is
    /// logged, then the same hard "no image produced" error is raised.
    pub async fn edit_image(
        &self,
        images: &[&ImageAsset],
        instruction: &str,
    ) -> WanderResult<ImageAsset> {
        info!(images = images.len(), "editing image");
        let mut parts: Vec<Part> = images.iter().map(|img| Part::inline(img)).collect();
        parts.push(Part::text(instruction));
        let request = GenerateContentRequest {
            contents: vec![Content { parts }],
            tools: None,
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["IMAGE".into(), "TEXT".into()],
            }),
        };
        self.request_image(&request).await
    }

    async fn request_image(&self, request: &GenerateContentRequest) -> WanderResult<ImageAsset> {
        let path = format!("models/{}:generateContent", self.config.image_model);
        let response: GenerateContentResponse = self.post_json(&path, request).await?;

        if let Some((mime, data)) = response.first_inline_image() {
            return ImageAsset::from_base64(&data, mime);
        }
        let explanation = response.joined_text();
        if !explanation.is_empty() {
            warn!(explanation, "model answered with text instead of an image");
        }
        Err(WanderError::remote(NO_IMAGE_PRODUCED))
    }
}

#[async_trait::async_trait]
impl VideoService for GenClient {
    async fn submit(
        &self,
        source: &ImageAsset,
        prompt: &str,
        aspect: AspectRatio,
    ) -> WanderResult<VideoOperation> {
        info!(aspect = %aspect, "submitting video generation");
        let request = VideoGenRequest {
            instances: vec![VideoInstance {
                prompt: prompt.to_owned(),
                image: Some(VideoImage {
                    bytes_base64_encoded: source.to_base64(),
                    mime_type: source.mime().to_owned(),
                }),
            }],
            parameters: VideoParameters {
                aspect_ratio: aspect.as_str().to_owned(),
                number_of_videos: 1,
                resolution: "1080p".to_owned(),
            },
        };
        let path = format!("models/{}:predictLongRunning", self.config.video_model);
        let wire: OperationWire = self.post_json(&path, &request).await?;
        wire.into_operation()
    }

    async fn poll(&self, operation: &VideoOperation) -> WanderResult<VideoOperation> {
        debug!(name = %operation.name, "polling video operation");
        let wire: OperationWire = self.get_json(&operation.name).await?;
        wire.into_operation()
    }

    fn download_url(&self, uri: &str) -> String {
        let sep = if uri.contains('?') { '&' } else { '?' };
        format!("{uri}{sep}key={}", self.config.api_key)
    }
}

// ---------------------------------------------------------------------------
// Wire payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn from_text(text: &str) -> Self {
        Self {
            parts: vec![Part::text(text)],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_owned()),
            inline_data: None,
        }
    }

    fn inline(image: &ImageAsset) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: image.mime().to_owned(),
                data: image.to_base64(),
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    uri: Option<String>,
    title: Option<String>,
}

impl GenerateContentResponse {
    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
    }

    fn joined_text(&self) -> String {
        self.parts()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
            .trim()
            .to_owned()
    }

    fn first_inline_image(&self) -> Option<(String, String)> {
        self.parts()
            .filter_map(|p| p.inline_data.as_ref())
            .map(|d| (d.mime_type.clone(), d.data.clone()))
            .next()
    }

    fn grounding_refs(&self) -> Vec<GroundingRef> {
        self.candidates
            .iter()
            .filter_map(|c| c.grounding_metadata.as_ref())
            .flat_map(|m| m.grounding_chunks.iter())
            .filter_map(|chunk| chunk.web.as_ref())
            .filter_map(|web| {
                let uri = web.uri.clone()?;
                Some(GroundingRef {
                    title: web.title.clone().unwrap_or_default(),
                    uri,
                })
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
struct VideoGenRequest {
    instances: Vec<VideoInstance>,
    parameters: VideoParameters,
}

#[derive(Debug, Serialize)]
struct VideoInstance {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<VideoImage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoImage {
    bytes_base64_encoded: String,
    mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoParameters {
    aspect_ratio: String,
    number_of_videos: u32,
    resolution: String,
}

#[derive(Debug, Deserialize)]
struct OperationWire {
    name: Option<String>,
    #[serde(default)]
    done: bool,
    response: Option<Value>,
    error: Option<OperationErrorWire>,
}

#[derive(Debug, Deserialize)]
struct OperationErrorWire {
    code: Option<i64>,
    message: Option<String>,
}

impl OperationWire {
    fn into_operation(self) -> WanderResult<VideoOperation> {
        let name = self
            .name
            .ok_or_else(|| WanderError::remote("operation response carried no name"))?;
        let video_uri = self.response.as_ref().and_then(extract_video_uri);
        let error = self.error.map(|e| {
            RemoteFailure::from_operation_error(
                e.code,
                e.message.unwrap_or_else(|| "operation failed".to_owned()),
                self.response.clone(),
            )
        });
        Ok(VideoOperation {
            name,
            done: self.done,
            video_uri,
            error,
        })
    }
}

fn extract_video_uri(response: &Value) -> Option<String> {
    response
        .get("generateVideoResponse")?
        .get("generatedSamples")?
        .get(0)?
        .get("video")?
        .get("uri")?
        .as_str()
        .map(str::to_owned)
}
