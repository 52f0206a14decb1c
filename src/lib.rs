#![forbid(unsafe_code)]

pub mod animate;
pub mod asset;
pub mod client;
pub mod compositor;
pub mod config;
pub mod error;
pub mod failure;
pub mod placement;
pub mod wizard;

pub use animate::{
    AspectRatio, DEFAULT_ANIMATION_PROMPT, KeySelector, PollPolicy, VideoOperation, VideoService,
    animate,
};
pub use asset::ImageAsset;
pub use client::{GenClient, GroundingRef, SearchAnswer};
pub use compositor::merge;
pub use config::ClientConfig;
pub use error::{WanderError, WanderResult};
pub use failure::{FailureKind, Recovery, RemoteFailure, classify, recovery_for};
pub use placement::{BASE_FRACTION, Placement, SCALE_MAX, SCALE_MIN};
