//! The PSI engine - one request in, one outcome out.

use crate::config::EngineConfig;
use crate::error::{CoreError, Result};
use crate::invoker;
use crate::output::{self, PsiOutcome};
use crate::request::PsiRequest;
use crate::workspace::{ReceiverSource, Workspace};

/// Runs PSI computations against the configured external binary.
///
/// Each [`execute`](PsiEngine::execute) call is fully independent:
/// decode the request, materialize a workspace, run the binary, parse
/// its output, tear the workspace down. Nothing is shared between
/// calls except the filesystem namespace, which workspace ids keep
/// collision-free.
#[derive(Debug, Clone)]
pub struct PsiEngine {
    config: EngineConfig,
}

impl PsiEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run one PSI computation.
    ///
    /// Workspace teardown is unconditional: the explicit destroy below
    /// covers success and handled errors, and the workspace's `Drop`
    /// impl covers panic and cancellation.
    pub async fn execute(&self, request: &PsiRequest) -> Result<PsiOutcome> {
        let start = std::time::Instant::now();

        // Decode before touching the filesystem, so a bad payload
        // leaves no artifact behind.
        let sender = request.decode_sender()?;
        let receiver = match request.decode_receiver()? {
            Some(bytes) => ReceiverSource::Inline(bytes),
            None => match &self.config.receiver_path {
                Some(path) => ReceiverSource::Existing(path.clone()),
                None => {
                    return Err(CoreError::InvalidConfig(
                        "request carried no receiver dataset and no receiver_path is configured"
                            .into(),
                    ))
                }
            },
        };

        let workspace = Workspace::create(
            &self.config.work_dir,
            &sender,
            receiver,
            &request.config_json,
        )
        .await?;
        let id = workspace.id();

        let result = self.run(&workspace).await;
        workspace.destroy().await;

        match &result {
            Ok(outcome) => tracing::info!(
                workspace_id = %id,
                audience_size = outcome.audience_size,
                impressions = outcome.impressions,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "PSI computation completed"
            ),
            Err(e) => tracing::warn!(
                workspace_id = %id,
                error = %e,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "PSI computation failed"
            ),
        }
        result
    }

    async fn run(&self, workspace: &Workspace) -> Result<PsiOutcome> {
        let output =
            invoker::invoke(&self.config.binary_path, workspace, self.config.timeout).await?;
        output::parse(&output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose, Engine as _};
    use std::path::PathBuf;

    fn temp_work_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "overlap-engine-test-{}-{}",
            tag,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn request(sender: &str) -> PsiRequest {
        PsiRequest {
            sender_csv: sender.to_string(),
            receiver_csv: Some(general_purpose::STANDARD.encode("r\n")),
            config_json: serde_json::json!({}),
        }
    }

    fn engine(work_dir: &PathBuf) -> PsiEngine {
        let config = EngineConfig::builder()
            .binary("/nonexistent/psi-binary")
            .work_dir(work_dir)
            .build()
            .unwrap();
        PsiEngine::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_base64_writes_nothing() {
        let dir = temp_work_dir("badb64");
        let engine = engine(&dir);

        let result = engine.execute(&request("!!not-base64!!")).await;
        match result {
            Err(CoreError::InvalidInput { field, .. }) => assert_eq!(field, "sender_csv"),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
        // Decoding failed before workspace creation, so the work dir
        // was never even created.
        assert!(!dir.exists() || std::fs::read_dir(&dir).unwrap().next().is_none());
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_missing_receiver_configuration() {
        let dir = temp_work_dir("norecv");
        let engine = engine(&dir);

        let req = PsiRequest {
            sender_csv: general_purpose::STANDARD.encode("s\n"),
            receiver_csv: None,
            config_json: serde_json::json!({}),
        };
        assert!(matches!(
            engine.execute(&req).await,
            Err(CoreError::InvalidConfig(_))
        ));
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_failed_launch_still_cleans_up() {
        let dir = temp_work_dir("cleanup");
        let engine = engine(&dir);

        let sender = general_purpose::STANDARD.encode("s\n");
        let result = engine.execute(&request(&sender)).await;
        assert!(matches!(result, Err(CoreError::LaunchFailed(_))));

        let leftovers: Vec<_> = std::fs::read_dir(&dir)
            .map(|rd| rd.filter_map(|e| e.ok()).collect())
            .unwrap_or_default();
        assert!(leftovers.is_empty(), "workspace files should be removed");
        std::fs::remove_dir_all(dir).ok();
    }
}
