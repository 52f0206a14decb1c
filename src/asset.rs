use std::path::Path;

use anyhow::Context as _;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::RgbaImage;

use crate::{WanderError, WanderResult};

/// An opaque encoded raster image: byte payload plus MIME type.
///
/// Immutable once created. Every transformation (composite, remote
/// edit) produces a new `ImageAsset` rather than mutating in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    bytes: Vec<u8>,
    mime: String,
}

impl ImageAsset {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }

    /// Wrap encoded bytes, sniffing the MIME type from the payload.
    pub fn from_bytes(bytes: Vec<u8>) -> WanderResult<Self> {
        let format = image::guess_format(&bytes)
            .map_err(|e| WanderError::decode(format!("unrecognized image format: {e}")))?;
        Ok(Self {
            bytes,
            mime: format.to_mime_type().to_owned(),
        })
    }

    pub fn from_path(path: &Path) -> WanderResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read image '{}'", path.display()))?;
        Self::from_bytes(bytes)
    }

    /// Rebuild from a base64 payload as it arrives off the wire.
    pub fn from_base64(data: &str, mime: impl Into<String>) -> WanderResult<Self> {
        let bytes = BASE64
            .decode(data)
            .map_err(|e| WanderError::decode(format!("invalid base64 image payload: {e}")))?;
        Ok(Self {
            bytes,
            mime: mime.into(),
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Base64 of the encoded payload, for inline wire transport.
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    /// Decode to RGBA pixels. Fails with a decode error when the
    /// payload is not a parseable raster image.
    pub fn decode(&self) -> WanderResult<RgbaImage> {
        let dyn_img = image::load_from_memory(&self.bytes)
            .map_err(|e| WanderError::decode(format!("decode image from memory: {e}")))?;
        Ok(dyn_img.to_rgba8())
    }

    pub fn write_to(&self, path: &Path) -> WanderResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("write image '{}'", path.display()))?;
        Ok(())
    }
}
