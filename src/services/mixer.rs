//! Three-track mix: intro jingle, synthesized voice, outro jingle.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::warn;

use crate::error::MixError;

/// The published sound of the installation: intro at 0.7, voice boosted to
/// 4.0, outro at 0.7, concatenated in that order with no gap or crossfade.
const FILTER_GRAPH: &str = "[1:a]volume=4.0[voice_loud];\
                            [0:a]volume=0.7[intro];\
                            [2:a]volume=0.7[outro];\
                            [intro][voice_loud][outro]concat=n=3:v=0:a=1[out]";

#[async_trait]
pub trait AudioMixer: Send + Sync {
    /// Writes the mixed clip to `output`. No partial file is left behind on
    /// failure.
    async fn mix(
        &self,
        intro: &Path,
        voice: &Path,
        outro: &Path,
        output: &Path,
    ) -> Result<(), MixError>;
}

/// ffmpeg-backed mixer.
pub struct FfmpegMixer {
    ffmpeg: String,
}

impl FfmpegMixer {
    pub fn new(ffmpeg: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }
}

#[async_trait]
impl AudioMixer for FfmpegMixer {
    async fn mix(
        &self,
        intro: &Path,
        voice: &Path,
        outro: &Path,
        output: &Path,
    ) -> Result<(), MixError> {
        for asset in [intro, outro] {
            if !tokio::fs::try_exists(asset).await.unwrap_or(false) {
                return Err(MixError::MissingAsset(asset.to_path_buf()));
            }
        }

        let outcome = Command::new(&self.ffmpeg)
            .arg("-y")
            .arg("-i")
            .arg(intro)
            .arg("-i")
            .arg(voice)
            .arg("-i")
            .arg(outro)
            .arg("-filter_complex")
            .arg(FILTER_GRAPH)
            .args(["-map", "[out]"])
            .arg(output)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        let detail = match outcome {
            Ok(out) if out.status.success() => return Ok(()),
            Ok(out) => format!(
                "ffmpeg exited with {}; stderr: {}",
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            ),
            Err(e) => format!("failed to spawn {}: {e}", self.ffmpeg),
        };

        // A failed encode can leave a truncated file at the target path.
        if let Err(e) = tokio::fs::remove_file(output).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("could not remove partial mix output {}: {e}", output.display());
            }
        }

        Err(MixError::EncodingFailed { detail })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    fn fake_ffmpeg(dir: &Path, body: &str) -> PathBuf {
        let script = dir.join("ffmpeg.sh");
        fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[tokio::test]
    async fn missing_intro_is_rejected_before_spawning() {
        let dir = tempfile::tempdir().unwrap();
        let outro = dir.path().join("outro.mp3");
        fs::write(&outro, b"outro").unwrap();
        fs::write(dir.path().join("voice.mp3"), b"voice").unwrap();

        // A binary that cannot exist: if the precondition check were skipped,
        // the error would be EncodingFailed (spawn failure), not MissingAsset.
        let mixer = FfmpegMixer::new("/definitely/not/ffmpeg");
        let err = mixer
            .mix(
                &dir.path().join("intro.mp3"),
                &dir.path().join("voice.mp3"),
                &outro,
                &dir.path().join("out.mp3"),
            )
            .await
            .unwrap_err();

        match err {
            MixError::MissingAsset(path) => {
                assert!(path.ends_with("intro.mp3"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn encode_failure_removes_the_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["intro.mp3", "voice.mp3", "outro.mp3"] {
            fs::write(dir.path().join(name), name.as_bytes()).unwrap();
        }
        let out = dir.path().join("out.mp3");

        // Writes a truncated output file, then dies mid-encode.
        let script = fake_ffmpeg(
            dir.path(),
            &format!(
                "echo partial > {}\necho 'Invalid data found' >&2\nexit 1",
                out.display()
            ),
        );
        let mixer = FfmpegMixer::new(script.to_str().unwrap());
        let err = mixer
            .mix(
                &dir.path().join("intro.mp3"),
                &dir.path().join("voice.mp3"),
                &dir.path().join("outro.mp3"),
                &out,
            )
            .await
            .unwrap_err();

        match err {
            MixError::EncodingFailed { detail } => {
                assert!(detail.contains("Invalid data found"), "detail: {detail}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn successful_encode_leaves_the_output() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["intro.mp3", "voice.mp3", "outro.mp3"] {
            fs::write(dir.path().join(name), name.as_bytes()).unwrap();
        }
        let out = dir.path().join("out.mp3");

        // Takes the last argument as the output path, like the real binary.
        let script = fake_ffmpeg(
            dir.path(),
            "for last; do :; done\necho mixed > \"$last\"",
        );
        let mixer = FfmpegMixer::new(script.to_str().unwrap());
        mixer
            .mix(
                &dir.path().join("intro.mp3"),
                &dir.path().join("voice.mp3"),
                &dir.path().join("outro.mp3"),
                &out,
            )
            .await
            .unwrap();

        assert!(out.exists());
    }
}
