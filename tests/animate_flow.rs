use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use wanderframe::{
    AspectRatio, DEFAULT_ANIMATION_PROMPT, ImageAsset, KeySelector, PollPolicy, RemoteFailure,
    VideoOperation, VideoService, WanderError, WanderResult, animate,
    failure::NOT_FOUND_PHRASE,
};

fn source() -> ImageAsset {
    ImageAsset::new(b"not-a-real-png".to_vec(), "image/png")
}

fn pending(name: &str) -> VideoOperation {
    VideoOperation {
        name: name.to_owned(),
        done: false,
        video_uri: None,
        error: None,
    }
}

fn finished(name: &str, uri: &str) -> VideoOperation {
    VideoOperation {
        name: name.to_owned(),
        done: true,
        video_uri: Some(uri.to_owned()),
        error: None,
    }
}

fn default_policy() -> PollPolicy {
    PollPolicy::default()
}

fn not_found_error() -> WanderError {
    WanderError::Remote(RemoteFailure::message(format!(
        "submit rejected: {NOT_FOUND_PHRASE}."
    )))
}

fn quota_error() -> WanderError {
    WanderError::Remote(RemoteFailure::from_response(
        429,
        r#"{"error": {"code": 429, "message": "Resource exhausted", "status": "RESOURCE_EXHAUSTED"}}"#,
    ))
}

/// Video collaborator driven by pre-scripted submit and poll outcomes.
struct ScriptedService {
    submits: Mutex<VecDeque<WanderResult<VideoOperation>>>,
    polls: Mutex<VecDeque<VideoOperation>>,
    submit_calls: AtomicU32,
    poll_calls: AtomicU32,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedService {
    fn new(
        submits: Vec<WanderResult<VideoOperation>>,
        polls: Vec<VideoOperation>,
    ) -> Self {
        Self {
            submits: Mutex::new(submits.into()),
            polls: Mutex::new(polls.into()),
            submit_calls: AtomicU32::new(0),
            poll_calls: AtomicU32::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn submit_count(&self) -> u32 {
        self.submit_calls.load(Ordering::SeqCst)
    }

    fn poll_count(&self) -> u32 {
        self.poll_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl VideoService for ScriptedService {
    async fn submit(
        &self,
        _source: &ImageAsset,
        prompt: &str,
        _aspect: AspectRatio,
    ) -> WanderResult<VideoOperation> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_owned());
        self.submits
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected extra submit")
    }

    async fn poll(&self, _operation: &VideoOperation) -> WanderResult<VideoOperation> {
        self.poll_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .polls
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected extra poll"))
    }

    fn download_url(&self, uri: &str) -> String {
        format!("{uri}?key=test-key")
    }
}

struct CountingSelector {
    calls: AtomicU32,
}

impl CountingSelector {
    fn new() -> Self {
        Self {
            calls: AtomicU32::new(0),
        }
    }

    fn count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl KeySelector for CountingSelector {
    async fn select_key(&self) -> WanderResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn two_pending_observations_mean_two_delayed_polls() {
    let service = ScriptedService::new(
        vec![Ok(pending("operations/op1"))],
        vec![pending("operations/op1"), finished("operations/op1", "https://v/clip.mp4")],
    );
    let started = tokio::time::Instant::now();

    let url = animate(
        &service,
        None,
        &source(),
        "waves rolling in",
        AspectRatio::Landscape,
        &default_policy(),
    )
    .await
    .unwrap();

    assert_eq!(url, "https://v/clip.mp4?key=test-key");
    assert_eq!(service.submit_count(), 1);
    assert_eq!(service.poll_count(), 2);
    // Two polls, each preceded by the 5 s interval.
    assert_eq!(started.elapsed(), Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn not_found_with_selector_retries_exactly_once() {
    let service = ScriptedService::new(
        vec![
            Err(not_found_error()),
            Ok(finished("operations/op2", "https://v/clip.mp4")),
        ],
        vec![],
    );
    let selector = CountingSelector::new();

    let url = animate(
        &service,
        Some(&selector),
        &source(),
        "prompt",
        AspectRatio::Portrait,
        &default_policy(),
    )
    .await
    .unwrap();

    assert_eq!(url, "https://v/clip.mp4?key=test-key");
    assert_eq!(selector.count(), 1);
    assert_eq!(service.submit_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn not_found_retry_failure_is_not_retried_again() {
    let service = ScriptedService::new(
        vec![Err(not_found_error()), Err(not_found_error())],
        vec![],
    );
    let selector = CountingSelector::new();

    let err = animate(
        &service,
        Some(&selector),
        &source(),
        "prompt",
        AspectRatio::Landscape,
        &default_policy(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, WanderError::Remote(_)));
    assert_eq!(selector.count(), 1);
    assert_eq!(service.submit_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn other_failures_never_invoke_key_selection() {
    let service = ScriptedService::new(vec![Err(quota_error())], vec![]);
    let selector = CountingSelector::new();

    let err = animate(
        &service,
        Some(&selector),
        &source(),
        "prompt",
        AspectRatio::Landscape,
        &default_policy(),
    )
    .await
    .unwrap_err();

    let WanderError::Remote(failure) = err else {
        panic!("expected the original remote failure");
    };
    assert_eq!(failure.code, Some(429));
    assert_eq!(selector.count(), 0);
    assert_eq!(service.submit_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn not_found_without_selector_is_fatal() {
    let service = ScriptedService::new(vec![Err(not_found_error())], vec![]);

    let err = animate(
        &service,
        None,
        &source(),
        "prompt",
        AspectRatio::Landscape,
        &default_policy(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, WanderError::Remote(_)));
    assert_eq!(service.submit_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn terminal_operation_without_uri_is_missing_result() {
    let terminal = VideoOperation {
        name: "operations/op3".to_owned(),
        done: true,
        video_uri: None,
        error: None,
    };
    let service = ScriptedService::new(vec![Ok(terminal)], vec![]);

    let err = animate(
        &service,
        None,
        &source(),
        "prompt",
        AspectRatio::Landscape,
        &default_policy(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, WanderError::MissingResult(_)));
}

#[tokio::test(start_paused = true)]
async fn terminal_operation_error_is_propagated() {
    let failed = VideoOperation {
        name: "operations/op4".to_owned(),
        done: true,
        video_uri: None,
        error: Some(RemoteFailure::from_operation_error(
            Some(13),
            "internal generation failure",
            None,
        )),
    };
    let service = ScriptedService::new(
        vec![Ok(pending("operations/op4"))],
        vec![failed],
    );

    let err = animate(
        &service,
        None,
        &source(),
        "prompt",
        AspectRatio::Landscape,
        &default_policy(),
    )
    .await
    .unwrap_err();

    let WanderError::Remote(failure) = err else {
        panic!("expected remote failure");
    };
    assert_eq!(failure.code, Some(13));
}

#[tokio::test(start_paused = true)]
async fn poll_bound_exceeded_times_out() {
    let polls = vec![pending("operations/op5"); 3];
    let service = ScriptedService::new(vec![Ok(pending("operations/op5"))], polls);
    let policy = PollPolicy {
        max_polls: 3,
        ..PollPolicy::default()
    };

    let err = animate(
        &service,
        None,
        &source(),
        "prompt",
        AspectRatio::Landscape,
        &policy,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, WanderError::Timeout { polls: 3, .. }));
    assert_eq!(service.poll_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn blank_prompt_falls_back_to_default() {
    let service = ScriptedService::new(
        vec![Ok(finished("operations/op6", "https://v/clip.mp4"))],
        vec![],
    );

    animate(
        &service,
        None,
        &source(),
        "   ",
        AspectRatio::Landscape,
        &default_policy(),
    )
    .await
    .unwrap();

    let prompts = service.prompts.lock().unwrap();
    assert_eq!(prompts.as_slice(), [DEFAULT_ANIMATION_PROMPT]);
}
