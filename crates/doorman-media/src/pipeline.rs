//! The media pipeline: prompt in, watermarked local image out.

use crate::{download, retry::RetryPolicy, watermark};
use chrono::Utc;
use doorman_core::{error::DoormanError, traits::ImageGenerator};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A generated image on local disk, owned by the invocation that produced
/// it. Discarded after delivery or on terminal failure so local storage
/// does not grow without bound.
#[derive(Debug)]
pub struct PipelineArtifact {
    pub path: PathBuf,
    /// The prompt that produced the image.
    pub prompt: String,
    pub watermarked: bool,
}

impl PipelineArtifact {
    /// Read the image bytes for delivery.
    pub fn bytes(&self) -> Result<Vec<u8>, DoormanError> {
        Ok(std::fs::read(&self.path)?)
    }

    /// Delete the local file. Best-effort; a leftover file is only noise.
    pub fn discard(self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("could not remove artifact {}: {e}", self.path.display());
        } else {
            debug!("discarded artifact {}", self.path.display());
        }
    }
}

/// Drives generation (with retry), download, and watermarking.
pub struct MediaPipeline {
    generator: Arc<dyn ImageGenerator>,
    http: reqwest::Client,
    images_dir: PathBuf,
    watermark_path: Option<PathBuf>,
    retry: RetryPolicy,
}

impl MediaPipeline {
    pub fn new(
        generator: Arc<dyn ImageGenerator>,
        images_dir: PathBuf,
        watermark_path: Option<PathBuf>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            generator,
            http: reqwest::Client::new(),
            images_dir,
            watermark_path,
            retry,
        }
    }

    /// Run the generation half of the pipeline: generate (retrying
    /// transient failures), download, watermark.
    ///
    /// `slug` names the artifact file; pass the member's display name.
    pub async fn produce(
        &self,
        prompt: &str,
        slug: &str,
    ) -> Result<PipelineArtifact, DoormanError> {
        let url = self
            .retry
            .run(|attempt| {
                debug!("generation attempt {attempt}");
                self.generator.generate(prompt)
            })
            .await?;
        info!("image generated: {url}");

        let path = self.artifact_path(slug);
        download::download_to(&self.http, &url, &path).await?;

        let watermarked = match &self.watermark_path {
            Some(mark) => watermark::apply(&path, mark),
            None => false,
        };

        Ok(PipelineArtifact {
            path,
            prompt: prompt.to_string(),
            watermarked,
        })
    }

    /// Fetch arbitrary bytes over the pipeline's HTTP client. Used for
    /// avatar retrieval ahead of description.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, DoormanError> {
        download::fetch_bytes(&self.http, url).await
    }

    fn artifact_path(&self, slug: &str) -> PathBuf {
        let stamp = Utc::now().format("%Y-%m-%dT%H-%M-%S%.3f");
        self.images_dir.join(format!("{}-{stamp}.png", sanitize_slug(slug)))
    }
}

/// Keep artifact filenames safe regardless of what a display name contains.
fn sanitize_slug(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .take(48)
        .collect();
    if cleaned.is_empty() {
        "member".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FailingGenerator {
        calls: AtomicU32,
        transient: bool,
    }

    #[async_trait]
    impl ImageGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, DoormanError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(DoormanError::Generation {
                message: "boom".into(),
                transient: self.transient,
            })
        }
    }

    fn pipeline(generator: Arc<dyn ImageGenerator>, dir: &Path) -> MediaPipeline {
        MediaPipeline::new(
            generator,
            dir.to_path_buf(),
            None,
            RetryPolicy::new(3, std::time::Duration::from_millis(1)),
        )
    }

    #[tokio::test]
    async fn test_permanent_generation_failure_is_not_retried() {
        let dir = tempfile::tempdir().unwrap();
        let gen = Arc::new(FailingGenerator {
            calls: AtomicU32::new(0),
            transient: false,
        });
        let err = pipeline(gen.clone(), dir.path())
            .produce("a prompt", "ada")
            .await
            .unwrap_err();
        assert!(matches!(err, DoormanError::Generation { .. }));
        assert_eq!(gen.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_generation_failures_exhaust_retries() {
        let dir = tempfile::tempdir().unwrap();
        let gen = Arc::new(FailingGenerator {
            calls: AtomicU32::new(0),
            transient: true,
        });
        let err = pipeline(gen.clone(), dir.path())
            .produce("a prompt", "ada")
            .await
            .unwrap_err();
        assert!(matches!(err, DoormanError::GenerationExhausted { attempts: 3, .. }));
        assert_eq!(gen.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_sanitize_slug() {
        assert_eq!(sanitize_slug("Ada Lovelace"), "Ada_Lovelace");
        assert_eq!(sanitize_slug("../../etc"), "______etc");
        assert_eq!(sanitize_slug(""), "member");
    }

    #[test]
    fn test_artifact_discard_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.png");
        std::fs::write(&path, b"png").unwrap();
        let artifact = PipelineArtifact {
            path: path.clone(),
            prompt: "p".into(),
            watermarked: false,
        };
        assert_eq!(artifact.bytes().unwrap(), b"png");
        artifact.discard();
        assert!(!path.exists());
    }
}
