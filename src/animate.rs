//! Video-generation orchestrator: submit, recover once from a
//! classified auth failure, poll the long-running operation to a
//! terminal state, extract the result.
//!
//! States: SUBMITTING -> (AUTH_RECOVERY)? -> POLLING -> DONE | FAILED.
//! Submit always precedes any poll; polls are strictly sequential.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::asset::ImageAsset;
use crate::failure::{Recovery, RemoteFailure, classify, recovery_for};
use crate::{WanderError, WanderResult};

/// Prompt submitted when the caller provides a blank one.
pub const DEFAULT_ANIMATION_PROMPT: &str =
    "Bring this scene to life with subtle, natural motion.";

/// Requested output orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle to an in-flight remote video-generation job.
///
/// Mutated only by re-fetching from the service; terminal on the first
/// observation of `done`. Never cancelled locally.
#[derive(Debug, Clone)]
pub struct VideoOperation {
    /// Opaque continuation token used to re-fetch status.
    pub name: String,
    pub done: bool,
    /// Result locator, present once the operation completed usefully.
    pub video_uri: Option<String>,
    /// Terminal failure reported by the operation itself.
    pub error: Option<RemoteFailure>,
}

/// The remote video collaborator, as the orchestrator sees it.
#[async_trait::async_trait]
pub trait VideoService: Send + Sync {
    async fn submit(
        &self,
        source: &ImageAsset,
        prompt: &str,
        aspect: AspectRatio,
    ) -> WanderResult<VideoOperation>;

    async fn poll(&self, operation: &VideoOperation) -> WanderResult<VideoOperation>;

    /// Adapt a result locator into a directly fetchable URL.
    fn download_url(&self, uri: &str) -> String;
}

/// Optional host-provided interactive key-selection capability.
///
/// Invoked only as a reaction to a classified auth failure during
/// submit; when absent, such failures are fatal.
#[async_trait::async_trait]
pub trait KeySelector: Send + Sync {
    async fn select_key(&self) -> WanderResult<()>;
}

/// Timing and bounds for the poll loop.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Wait between status fetches.
    pub poll_interval: Duration,
    /// Wait after key selection, before the retried submit, so the new
    /// credential can propagate.
    pub settle_delay: Duration,
    /// Maximum poll attempts before giving up with a timeout.
    pub max_polls: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(5000),
            settle_delay: Duration::from_millis(1000),
            max_polls: 120,
        }
    }
}

/// Drive a video generation job to completion and return a fetchable
/// download URL.
pub async fn animate(
    service: &dyn VideoService,
    key_selector: Option<&dyn KeySelector>,
    source: &ImageAsset,
    prompt: &str,
    aspect: AspectRatio,
    policy: &PollPolicy,
) -> WanderResult<String> {
    let prompt = if prompt.trim().is_empty() {
        DEFAULT_ANIMATION_PROMPT
    } else {
        prompt
    };

    let mut operation = submit_with_recovery(service, key_selector, source, prompt, aspect, policy)
        .await?;
    info!(name = %operation.name, "video operation submitted");

    let mut polls = 0u32;
    while !operation.done {
        if polls >= policy.max_polls {
            return Err(WanderError::Timeout {
                polls,
                elapsed_secs: policy.poll_interval.as_secs().saturating_mul(polls as u64),
            });
        }
        sleep(policy.poll_interval).await;
        operation = service.poll(&operation).await?;
        polls += 1;
    }

    if let Some(failure) = operation.error {
        return Err(WanderError::Remote(failure));
    }
    let uri = operation.video_uri.ok_or_else(|| {
        WanderError::missing_result("terminal operation carried no video uri")
    })?;
    Ok(service.download_url(&uri))
}

/// Submit, with at most one key-selection-and-retry round.
async fn submit_with_recovery(
    service: &dyn VideoService,
    key_selector: Option<&dyn KeySelector>,
    source: &ImageAsset,
    prompt: &str,
    aspect: AspectRatio,
    policy: &PollPolicy,
) -> WanderResult<VideoOperation> {
    let err = match service.submit(source, prompt, aspect).await {
        Ok(operation) => return Ok(operation),
        Err(err) => err,
    };

    let recoverable = matches!(
        &err,
        WanderError::Remote(failure)
            if recovery_for(classify(failure)) == Recovery::ReselectKey
    );
    let Some(selector) = key_selector else {
        return Err(err);
    };
    if !recoverable {
        return Err(err);
    }

    warn!("submit failed with a missing-entity failure; invoking key selection");
    selector.select_key().await?;
    sleep(policy.settle_delay).await;
    service.submit(source, prompt, aspect).await
}
