//! Background removal through an ordered chain of providers.
//!
//! The segmentation model itself is out of process: a provider takes encoded
//! image bytes and returns an encoded image whose alpha channel is the
//! foreground mask. Providers are tried in order (typically hosted first,
//! local fallback second) and the first success wins.

use std::fmt;

use thiserror::Error;

use crate::decode::{decode_image_no_orientation, resize, DecodeError, FilterType};
use crate::mask::AlphaBuffer;

/// Failure reported by a single provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider could not be reached or loaded.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// The provider ran but did not produce an image.
    #[error("failed: {0}")]
    Failed(String),
}

/// One failed provider in a chain run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderAttempt {
    pub provider: String,
    pub error: ProviderError,
}

impl fmt::Display for ProviderAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.provider, self.error)
    }
}

fn describe_attempts(attempts: &[ProviderAttempt]) -> String {
    if attempts.is_empty() {
        return "no providers configured".to_string();
    }
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Error types for background removal.
#[derive(Debug, Error)]
pub enum BackgroundError {
    /// Every provider failed, or none were configured.
    #[error("Background removal model unavailable: {}", describe_attempts(.attempts))]
    ModelUnavailable { attempts: Vec<ProviderAttempt> },

    /// A provider returned bytes that do not decode as an image.
    #[error("Background removal returned an unreadable image: {0}")]
    InvalidOutput(#[from] DecodeError),
}

/// A segmentation backend.
pub trait BackgroundRemover {
    /// Short name used in logs and error reports.
    fn name(&self) -> &str;

    /// Encoded image in, encoded image with a foreground alpha out.
    fn remove(&self, image: &[u8]) -> Result<Vec<u8>, ProviderError>;
}

/// Ordered list of providers, resolved at call time.
#[derive(Default)]
pub struct ProviderChain {
    providers: Vec<Box<dyn BackgroundRemover>>,
}

impl fmt::Debug for ProviderChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl ProviderChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`ProviderChain::push`].
    pub fn with(mut self, provider: impl BackgroundRemover + 'static) -> Self {
        self.push(provider);
        self
    }

    /// Append a provider after the existing ones.
    pub fn push(&mut self, provider: impl BackgroundRemover + 'static) {
        self.providers.push(Box::new(provider));
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Run providers in order until one succeeds.
    ///
    /// # Errors
    ///
    /// `BackgroundError::ModelUnavailable` listing every attempt when no
    /// provider succeeded (including an empty chain).
    pub fn remove(&self, image: &[u8]) -> Result<Vec<u8>, BackgroundError> {
        let mut attempts = Vec::new();
        for provider in &self.providers {
            match provider.remove(image) {
                Ok(bytes) => {
                    log::info!(
                        "background removed by {} ({} bytes)",
                        provider.name(),
                        bytes.len()
                    );
                    return Ok(bytes);
                }
                Err(error) => {
                    log::warn!("background provider {} {}", provider.name(), error);
                    attempts.push(ProviderAttempt {
                        provider: provider.name().to_string(),
                        error,
                    });
                }
            }
        }
        Err(BackgroundError::ModelUnavailable { attempts })
    }
}

/// Turn provider output into a base alpha matching a `width x height` asset.
///
/// Output that comes back at a different size is resized first.
pub fn alpha_from_output(
    bytes: &[u8],
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<AlphaBuffer, BackgroundError> {
    let decoded = decode_image_no_orientation(bytes)?;
    let fitted = if decoded.dimensions() == (width, height) {
        decoded
    } else {
        log::debug!(
            "resizing background output {}x{} to {}x{}",
            decoded.width,
            decoded.height,
            width,
            height
        );
        resize(&decoded, width, height, filter)?
    };

    AlphaBuffer::from_values(width, height, fitted.alpha_channel()).ok_or_else(|| {
        BackgroundError::InvalidOutput(DecodeError::CorruptedFile(format!(
            "alpha size does not match {}x{}",
            width, height
        )))
    })
}
