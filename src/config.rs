use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Public base URL clips are resolved against.
    pub base_url: String,
    pub access_code: String,
    /// Where finished clips (and per-run transients) live; served at /clips.
    pub clip_dir: PathBuf,
    pub intro_clip: PathBuf,
    pub outro_clip: PathBuf,
    /// Interpreter + script for the external synthesis engine.
    pub synthesis_command: String,
    pub synthesis_script: String,
    pub ffmpeg_bin: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env::var("PORT").unwrap_or_else(|_| "8000".into()).parse()?;
        Ok(Self {
            base_url: env::var("BASE_URL").unwrap_or_else(|_| format!("http://localhost:{port}")),
            access_code: env::var("ACCESS_CODE")
                .unwrap_or_else(|_| "change_this_access_code".into()),
            clip_dir: env::var("CLIP_DIR").unwrap_or_else(|_| "clips".into()).into(),
            intro_clip: env::var("INTRO_CLIP")
                .unwrap_or_else(|_| "assets/bell-intro.mp3".into())
                .into(),
            outro_clip: env::var("OUTRO_CLIP")
                .unwrap_or_else(|_| "assets/bell-outro.mp3".into())
                .into(),
            synthesis_command: env::var("SYNTHESIS_COMMAND").unwrap_or_else(|_| "python3".into()),
            synthesis_script: env::var("SYNTHESIS_SCRIPT")
                .unwrap_or_else(|_| "tts_engine.py".into()),
            ffmpeg_bin: env::var("FFMPEG_BIN").unwrap_or_else(|_| "ffmpeg".into()),
            host,
            port,
        })
    }
}
