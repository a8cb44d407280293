use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::Write;
use std::sync::Mutex;

/// Turns captured audio into text. An empty string means no speech was detected.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<String>;
}

/// Speaks (or otherwise presents) a reply.
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<()>;
}

/// Typed console input standing in for a microphone: the "audio" is UTF-8 text.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypedTranscriber;

#[async_trait]
impl SpeechToText for TypedTranscriber {
    async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        let text = std::str::from_utf8(audio).context("console input is not valid UTF-8")?;
        Ok(text.trim().to_string())
    }
}

/// Prints replies instead of speaking them.
pub struct ConsoleSpeaker<W: Write + Send> {
    out: Mutex<W>,
    prefix: String,
}

impl ConsoleSpeaker<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleSpeaker<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out), prefix: String::new() }
    }

    /// e.g. "Assistant: "
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl<W: Write + Send> TextToSpeech for ConsoleSpeaker<W> {
    async fn synthesize(&self, text: &str) -> Result<()> {
        let mut out = self.out.lock().map_err(|_| anyhow::anyhow!("console output lock poisoned"))?;
        writeln!(out, "{}{}", self.prefix, text)?;
        out.flush()?;
        Ok(())
    }
}
