use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::watch,
    task::JoinHandle,
};

/// Supplier of per-frame detector verdicts
#[async_trait]
pub trait FrameSource: Send {
    /// Whether at least one eye is visible in the current frame.
    /// Live sources return the newest verdict available rather than a
    /// queued older one. `None` means the source is exhausted and
    /// monitoring should stop.
    async fn next_frame(&mut self) -> Result<Option<bool>>;
}

/// Parse a single detector verdict
///
/// # Errors
///
/// Returns an error if the text is not a recognised boolean.
pub fn parse_verdict(text: &str) -> Result<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "eyes" => Ok(true),
        "0" | "false" | "no" | "n" | "none" => Ok(false),
        other => bail!("Unrecognised frame verdict: {other:?}"),
    }
}

/// Latest line seen by the reader task
type LineVerdict = Option<Result<bool, String>>;

/// Reads one verdict per line, e.g. from an external detector piped to stdin.
///
/// A background task consumes the input as fast as it arrives, so a detector
/// that writes faster than the monitor samples never builds up a backlog.
/// [`FrameSource::next_frame`] waits for a verdict newer than the last one
/// returned and yields the newest, dropping any in between. Blank lines are
/// ignored.
pub struct LineFrameSource {
    latest: watch::Receiver<LineVerdict>,
    reader: JoinHandle<()>,
}

impl LineFrameSource {
    /// Start reading `reader` on a background task. Must be called from
    /// within a tokio runtime.
    pub fn spawn<R>(reader: R) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let (tx, latest) = watch::channel(None);
        let reader = tokio::spawn(read_lines(reader, tx));
        Self { latest, reader }
    }
}

async fn read_lines<R>(reader: R, tx: watch::Sender<LineVerdict>)
where
    R: AsyncBufRead + Unpin + Send,
{
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                let verdict = parse_verdict(&line).map_err(|e| e.to_string());
                if tx.send(Some(verdict)).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                let _ = tx.send(Some(Err(format!("Failed to read frame: {e}"))));
                break;
            }
        }
    }
    log::debug!("Frame input closed");
}

#[async_trait]
impl FrameSource for LineFrameSource {
    async fn next_frame(&mut self) -> Result<Option<bool>> {
        // Errs only once the reader has stopped and every verdict was seen
        if self.latest.changed().await.is_err() {
            return Ok(None);
        }
        let verdict = self.latest.borrow_and_update().clone();
        match verdict {
            Some(Ok(visible)) => Ok(Some(visible)),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Ok(None),
        }
    }
}

impl Drop for LineFrameSource {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Fixed sequence of verdicts
#[derive(Debug, Clone, Default)]
pub struct ScriptedFrameSource {
    frames: VecDeque<bool>,
}

impl ScriptedFrameSource {
    pub fn new(frames: impl IntoIterator<Item = bool>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn push(&mut self, visible: bool) {
        self.frames.push_back(visible);
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

#[async_trait]
impl FrameSource for ScriptedFrameSource {
    async fn next_frame(&mut self) -> Result<Option<bool>> {
        Ok(self.frames.pop_front())
    }
}
