//! Face detection capability.
//!
//! The recognition model itself lives outside this crate. Anything that can
//! turn a [`FrameBuffer`] into zero or one [`Detection`] implements
//! [`FaceDetector`]; tests use the stub in [`crate::testing`].

use crate::errors::{FaceCaptureError, Result};
use crate::types::{Detection, FrameBuffer};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::OnceCell;

#[async_trait]
pub trait FaceDetector: Send + Sync {
    /// Load whatever the detector needs (network weights, sidecar process).
    ///
    /// Called at most once successfully per [`ModelGate`].
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// Find a single face in `frame`. `Ok(None)` means no face.
    async fn detect(&self, frame: &FrameBuffer) -> Result<Option<Detection>>;

    fn name(&self) -> &str;
}

/// Remembers a successful detector initialization.
///
/// A failed initialization is not cached, so the next capture tries again.
#[derive(Debug, Default)]
pub struct ModelGate {
    ready: OnceCell<()>,
}

impl ModelGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.initialized()
    }

    pub async fn ensure(&self, detector: &dyn FaceDetector) -> Result<()> {
        self.ready
            .get_or_try_init(|| async {
                log::info!("Loading face models for detector '{}'", detector.name());
                match detector.initialize().await {
                    Ok(()) => {
                        log::info!("Face models loaded");
                        Ok(())
                    }
                    Err(e) => {
                        log::error!("Face model initialization failed: {}", e);
                        Err(match e {
                            FaceCaptureError::ModelsUnavailable(msg) => {
                                FaceCaptureError::ModelsUnavailable(msg)
                            }
                            other => FaceCaptureError::ModelsUnavailable(other.to_string()),
                        })
                    }
                }
            })
            .await
            .map(|_| ())
    }
}

/// Runs an external helper program as the face detector.
///
/// Protocol: `program [args..] --check` must exit 0 once its models are
/// loadable. `program [args..]` reads a PNG frame on stdin and prints either
/// `null` or `{"box": {"x","y","width","height"}, "descriptor": [128 numbers]}`
/// on stdout.
#[derive(Debug, Clone)]
pub struct ExternalProcessDetector {
    program: PathBuf,
    args: Vec<String>,
}

impl ExternalProcessDetector {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Helper program this detector runs.
    pub fn program(&self) -> &std::path::Path {
        &self.program
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).kill_on_drop(true);
        cmd
    }
}

/// Parse the helper's stdout into a detection.
pub fn parse_detection_output(stdout: &[u8]) -> Result<Option<Detection>> {
    let text = std::str::from_utf8(stdout)
        .map_err(|e| FaceCaptureError::Detection(format!("detector output is not UTF-8: {}", e)))?
        .trim();
    if text.is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<Option<Detection>>(text)
        .map_err(|e| FaceCaptureError::Detection(format!("unreadable detector output: {}", e)))
}

#[async_trait]
impl FaceDetector for ExternalProcessDetector {
    async fn initialize(&self) -> Result<()> {
        let output = self
            .command()
            .arg("--check")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                FaceCaptureError::ModelsUnavailable(format!(
                    "failed to start {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(FaceCaptureError::ModelsUnavailable(format!(
                "{} --check exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }

    async fn detect(&self, frame: &FrameBuffer) -> Result<Option<Detection>> {
        let png = frame.to_png()?;

        let mut child = self
            .command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                FaceCaptureError::Detection(format!("failed to start {}: {}", self.program.display(), e))
            })?;

        // stdin is fed while stdout and stderr drain
        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&png).await?;
                stdin.shutdown().await?;
            }
            Ok::<(), std::io::Error>(())
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());

        let output =
            output.map_err(|e| FaceCaptureError::Detection(format!("detector did not finish: {}", e)))?;

        if !output.status.success() {
            return Err(FaceCaptureError::Detection(format!(
                "detector exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        // The helper may answer before consuming the whole frame.
        if let Err(e) = fed {
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(FaceCaptureError::Detection(format!("failed to send frame: {}", e)));
            }
        }

        parse_detection_output(&output.stdout)
    }

    fn name(&self) -> &str {
        "external-process"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubDetector;

    #[test]
    fn test_parse_null_and_empty() {
        assert!(parse_detection_output(b"null\n").unwrap().is_none());
        assert!(parse_detection_output(b"  ").unwrap().is_none());
    }

    #[test]
    fn test_parse_detection_with_descriptor() {
        let descriptor: Vec<String> = (0..128).map(|i| format!("{}", i as f32 / 1000.0)).collect();
        let json = format!(
            r#"{{"box":{{"x":10,"y":20,"width":150,"height":160}},"descriptor":[{}]}}"#,
            descriptor.join(",")
        );
        let detection = parse_detection_output(json.as_bytes()).unwrap().unwrap();
        assert_eq!(detection.bounding_box.width, 150.0);
        assert_eq!(detection.descriptor.unwrap().len(), 128);
    }

    #[test]
    fn test_parse_rejects_short_descriptor() {
        let json = r#"{"box":{"x":0,"y":0,"width":1,"height":1},"descriptor":[1.0,2.0]}"#;
        assert!(matches!(
            parse_detection_output(json.as_bytes()),
            Err(FaceCaptureError::Detection(_))
        ));
    }

    #[tokio::test]
    async fn test_gate_caches_success() {
        let detector = StubDetector::no_face();
        let gate = ModelGate::new();
        assert!(!gate.is_ready());
        gate.ensure(&detector).await.unwrap();
        gate.ensure(&detector).await.unwrap();
        assert!(gate.is_ready());
        assert_eq!(detector.init_calls(), 1);
    }

    #[tokio::test]
    async fn test_gate_retries_after_failure() {
        let detector = StubDetector::no_face().failing_init("weights missing");
        let gate = ModelGate::new();
        let err = gate.ensure(&detector).await.unwrap_err();
        assert!(matches!(err, FaceCaptureError::ModelsUnavailable(ref m) if m.contains("weights missing")));
        let _ = gate.ensure(&detector).await;
        assert_eq!(detector.init_calls(), 2);
        assert!(!gate.is_ready());
    }

    #[test]
    fn test_program_path_kept() {
        let detector = ExternalProcessDetector::new("/opt/facegate/detect", vec!["--gpu".to_string()]);
        assert_eq!(detector.program(), std::path::Path::new("/opt/facegate/detect"));
    }

    #[tokio::test]
    async fn test_missing_program_is_models_unavailable() {
        let detector = ExternalProcessDetector::new("/nonexistent/facegate-detector", vec![]);
        let err = detector.initialize().await.unwrap_err();
        assert!(matches!(err, FaceCaptureError::ModelsUnavailable(_)));
    }
}
