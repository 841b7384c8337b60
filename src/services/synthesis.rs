//! External speech-synthesis capability.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::warn;

use crate::error::SynthesisError;

/// The engine contract: given normalized text and an output path, a playable
/// audio file appears at the output path or the call fails. Calls take
/// seconds; implementations must not block the runtime while they wait.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Writes `text` to `text_path` (UTF-8), then renders it to `output_path`.
    ///
    /// On failure the text artifact is removed before returning. On success
    /// it is left in place; the owning pipeline cleans it up together with
    /// the other run artifacts.
    async fn synthesize(
        &self,
        text: &str,
        text_path: &Path,
        output_path: &Path,
    ) -> Result<(), SynthesisError>;
}

/// Default synthesizer: spawns the configured engine as
/// `<command> <script> <text-file> <output-file>`. The engine owns voice
/// selection and audio encoding.
pub struct ProcessSynthesizer {
    command: String,
    script: String,
}

impl ProcessSynthesizer {
    pub fn new(command: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            script: script.into(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for ProcessSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        text_path: &Path,
        output_path: &Path,
    ) -> Result<(), SynthesisError> {
        tokio::fs::write(text_path, text)
            .await
            .map_err(SynthesisError::ArtifactWriteFailed)?;

        let outcome = Command::new(&self.command)
            .arg(&self.script)
            .arg(text_path)
            .arg(output_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        let detail = match outcome {
            Ok(output) => {
                let produced = tokio::fs::try_exists(output_path).await.unwrap_or(false);
                if output.status.success() && produced {
                    return Ok(());
                }
                format!(
                    "engine exited with {}{}; stderr: {}; stdout: {}",
                    output.status,
                    if produced { "" } else { " (no output file)" },
                    String::from_utf8_lossy(&output.stderr).trim(),
                    String::from_utf8_lossy(&output.stdout).trim(),
                )
            }
            Err(e) => format!("failed to spawn {}: {e}", self.command),
        };

        remove_text_artifact(text_path).await;
        Err(SynthesisError::SynthesisFailed { detail })
    }
}

/// The failure path must not leave the text artifact behind; its own failure
/// is logged and never masks the synthesis error.
async fn remove_text_artifact(text_path: &Path) {
    if let Err(e) = tokio::fs::remove_file(text_path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(
                "could not remove synthesis input {}: {e}",
                text_path.display()
            );
        }
    }
}
