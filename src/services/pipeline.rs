//! Operator text → normalized text → synthesized voice → jingled clip.
//!
//! One async task per submission; concurrent runs own distinct artifact
//! names, so they never collide on temp files. Transient artifacts
//! (`text-{stamp}.txt`, `raw-{stamp}.mp3`) never outlive the run that made
//! them, on either the success or the failure path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::error::GenerateError;
use crate::models::announcement::Announcement;
use crate::services::lexicon;
use crate::services::mixer::AudioMixer;
use crate::services::synthesis::SpeechSynthesizer;
use crate::store::ids::IdGenerator;
use crate::store::AnnouncementStore;

pub struct AnnouncementPipeline {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    mixer: Arc<dyn AudioMixer>,
    announcements: Arc<AnnouncementStore>,
    ids: Arc<IdGenerator>,
    clip_dir: PathBuf,
    intro: PathBuf,
    outro: PathBuf,
    base_url: String,
}

impl AnnouncementPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        mixer: Arc<dyn AudioMixer>,
        announcements: Arc<AnnouncementStore>,
        ids: Arc<IdGenerator>,
        clip_dir: PathBuf,
        intro: PathBuf,
        outro: PathBuf,
        base_url: String,
    ) -> Self {
        Self {
            synthesizer,
            mixer,
            announcements,
            ids,
            clip_dir,
            intro,
            outro,
            base_url,
        }
    }

    /// Produce a playable clip from operator text and record it, newest
    /// first. The announcement only becomes visible once its clip file is
    /// fully written; no reader ever observes a half-made entry.
    pub async fn generate(
        &self,
        text: &str,
        title: Option<&str>,
    ) -> Result<Announcement, GenerateError> {
        if text.trim().is_empty() {
            return Err(GenerateError::EmptyText);
        }

        // Fail before spending seconds of synthesis on a doomed mix.
        for asset in [&self.intro, &self.outro] {
            if !tokio::fs::try_exists(asset).await.unwrap_or(false) {
                return Err(GenerateError::MissingAsset(asset.clone()));
            }
        }

        let normalized = lexicon::normalize(text);
        let stamp = self.ids.next();
        let text_path = self.clip_dir.join(format!("text-{stamp}.txt"));
        let raw_path = self.clip_dir.join(format!("raw-{stamp}.mp3"));
        let file_name = format!("announcement-{stamp}.mp3");
        let final_path = self.clip_dir.join(&file_name);

        // The gateway removes the text artifact itself when it fails.
        self.synthesizer
            .synthesize(&normalized, &text_path, &raw_path)
            .await?;

        if let Err(err) = self
            .mixer
            .mix(&self.intro, &raw_path, &self.outro, &final_path)
            .await
        {
            remove_transient(&raw_path).await;
            remove_transient(&text_path).await;
            return Err(err.into());
        }

        remove_transient(&raw_path).await;
        remove_transient(&text_path).await;

        let announcement = Announcement {
            id: stamp,
            title: title
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or("Untitled")
                .to_string(),
            audio_url: format!("{}/clips/{}", self.base_url, file_name),
            created_at: Utc::now(),
        };
        self.announcements.insert_front(announcement.clone()).await;
        info!(
            "announcement {} generated ({:?})",
            announcement.id, announcement.title
        );
        Ok(announcement)
    }
}

/// Best-effort removal: a leftover temp file must not fail a run that already
/// produced its clip, nor mask the error of one that did not.
async fn remove_transient(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("could not remove transient artifact {}: {e}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MixError, SynthesisError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Gateway stub honoring the real contract: writes the text artifact,
    /// writes the voice bytes on success, removes the text artifact on
    /// failure. Counts calls and records the text it was fed.
    struct StubSynthesizer {
        fail: bool,
        calls: AtomicUsize,
        last_text: Mutex<Option<String>>,
    }

    impl StubSynthesizer {
        fn ok() -> Self {
            Self {
                fail: false,
                calls: AtomicUsize::new(0),
                last_text: Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::ok()
            }
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for StubSynthesizer {
        async fn synthesize(
            &self,
            text: &str,
            text_path: &Path,
            output_path: &Path,
        ) -> Result<(), SynthesisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_text.lock().unwrap() = Some(text.to_string());
            tokio::fs::write(text_path, text)
                .await
                .map_err(SynthesisError::ArtifactWriteFailed)?;
            if self.fail {
                tokio::fs::remove_file(text_path).await.ok();
                return Err(SynthesisError::SynthesisFailed {
                    detail: "stub engine down".into(),
                });
            }
            tokio::fs::write(output_path, format!("[voice:{text}]"))
                .await
                .map_err(SynthesisError::ArtifactWriteFailed)?;
            Ok(())
        }
    }

    /// Mixer stub: concatenates the three inputs so the output visibly holds
    /// three segments in order.
    struct StubMixer {
        fail: bool,
    }

    #[async_trait]
    impl AudioMixer for StubMixer {
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
            if self.fail {
                return Err(MixError::EncodingFailed {
                    detail: "stub encoder down".into(),
                });
            }
            let mut joined = Vec::new();
            for part in [intro, voice, outro] {
                joined.extend(tokio::fs::read(part).await.map_err(|e| {
                    MixError::EncodingFailed {
                        detail: e.to_string(),
                    }
                })?);
            }
            tokio::fs::write(output, joined)
                .await
                .map_err(|e| MixError::EncodingFailed {
                    detail: e.to_string(),
                })?;
            Ok(())
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        clip_dir: PathBuf,
        announcements: Arc<AnnouncementStore>,
        synth: Arc<StubSynthesizer>,
        pipeline: AnnouncementPipeline,
    }

    fn fixture(synth: StubSynthesizer, mixer: StubMixer, with_outro: bool) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let clip_dir = dir.path().join("clips");
        std::fs::create_dir_all(&clip_dir).unwrap();

        let intro = dir.path().join("bell-intro.mp3");
        let outro = dir.path().join("bell-outro.mp3");
        std::fs::write(&intro, b"INTRO|").unwrap();
        if with_outro {
            std::fs::write(&outro, b"|OUTRO").unwrap();
        }

        let announcements = Arc::new(AnnouncementStore::default());
        let synth = Arc::new(synth);
        let pipeline = AnnouncementPipeline::new(
            synth.clone(),
            Arc::new(mixer),
            announcements.clone(),
            Arc::new(IdGenerator::new()),
            clip_dir.clone(),
            intro,
            outro,
            "http://localhost:8000".into(),
        );

        Fixture {
            _dir: dir,
            clip_dir,
            announcements,
            synth,
            pipeline,
        }
    }

    fn leftovers(clip_dir: &Path) -> Vec<String> {
        std::fs::read_dir(clip_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with("text-") || n.starts_with("raw-"))
            .collect()
    }

    #[tokio::test]
    async fn empty_text_is_rejected_up_front() {
        let f = fixture(StubSynthesizer::ok(), StubMixer { fail: false }, true);
        let err = f.pipeline.generate("   ", None).await.unwrap_err();
        assert!(matches!(err, GenerateError::EmptyText));
        assert_eq!(f.synth.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_outro_short_circuits_before_synthesis() {
        let f = fixture(StubSynthesizer::ok(), StubMixer { fail: false }, false);
        let err = f.pipeline.generate("halo", None).await.unwrap_err();
        assert!(matches!(err, GenerateError::MissingAsset(_)));
        assert_eq!(f.synth.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn synthesis_failure_leaves_no_artifacts_and_no_announcement() {
        let f = fixture(StubSynthesizer::failing(), StubMixer { fail: false }, true);
        let err = f.pipeline.generate("halo warga", None).await.unwrap_err();
        assert!(matches!(err, GenerateError::Synthesis(_)));
        assert!(f.announcements.list().await.is_empty());
        assert_eq!(leftovers(&f.clip_dir), Vec::<String>::new());
    }

    #[tokio::test]
    async fn mix_failure_cleans_both_transients() {
        let f = fixture(StubSynthesizer::ok(), StubMixer { fail: true }, true);
        let err = f.pipeline.generate("halo warga", None).await.unwrap_err();
        assert!(matches!(err, GenerateError::Mix(_)));
        assert!(f.announcements.list().await.is_empty());
        assert_eq!(leftovers(&f.clip_dir), Vec::<String>::new());
    }

    #[tokio::test]
    async fn successful_run_produces_a_three_segment_clip() {
        let f = fixture(StubSynthesizer::ok(), StubMixer { fail: false }, true);
        let announcement = f
            .pipeline
            .generate("Assalamualaikum, Allah SWT", Some("Reminder"))
            .await
            .unwrap();

        // The gateway saw the normalized text, not the raw submission.
        assert_eq!(
            f.synth.last_text.lock().unwrap().as_deref(),
            Some("Assalamu alaikum, Alloh Subhanahu wa Ta'ala")
        );

        assert_eq!(announcement.title, "Reminder");
        let file_name = format!("announcement-{}.mp3", announcement.id);
        assert_eq!(
            announcement.audio_url,
            format!("http://localhost:8000/clips/{file_name}")
        );

        // Intro, boosted voice, outro, in that order.
        let clip = std::fs::read(f.clip_dir.join(&file_name)).unwrap();
        assert_eq!(
            clip,
            b"INTRO|[voice:Assalamu alaikum, Alloh Subhanahu wa Ta'ala]|OUTRO"
        );

        // Transients are gone, the record is at the front of the store.
        assert_eq!(leftovers(&f.clip_dir), Vec::<String>::new());
        let listed = f.announcements.list().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, announcement.id);
    }

    #[tokio::test]
    async fn untitled_submissions_get_the_placeholder() {
        let f = fixture(StubSynthesizer::ok(), StubMixer { fail: false }, true);
        let announcement = f.pipeline.generate("halo", Some("  ")).await.unwrap();
        assert_eq!(announcement.title, "Untitled");
    }

    #[tokio::test]
    async fn concurrent_runs_do_not_share_artifacts() {
        let f = fixture(StubSynthesizer::ok(), StubMixer { fail: false }, true);
        let (a, b) = tokio::join!(
            f.pipeline.generate("pengumuman pertama", None),
            f.pipeline.generate("pengumuman kedua", None)
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_ne!(a.id, b.id);
        assert_ne!(a.audio_url, b.audio_url);
        assert_eq!(f.announcements.list().await.len(), 2);
        assert_eq!(leftovers(&f.clip_dir), Vec::<String>::new());
    }
}
