//! Line input for the chat loop.

use async_trait::async_trait;
use std::future::Future;
use std::io;
use std::pin::Pin;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Stdin};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Line(String),
    /// Input stream closed (Ctrl-D).
    Eof,
    /// Ctrl-C while waiting for input.
    Interrupted,
}

#[async_trait]
pub trait LineSource: Send {
    async fn next_line(&mut self) -> io::Result<InputEvent>;

    /// Resolves when the user asks to stop while no line is being read.
    /// Sources without an interrupt never resolve.
    async fn interrupted(&mut self) {
        std::future::pending::<()>().await
    }
}

type Interrupt = Pin<Box<dyn Future<Output = io::Result<()>> + Send>>;

/// Lines from a byte stream, racing a Ctrl-C listener.
///
/// The listener stays armed across turns and is also polled by
/// [`LineSource::interrupted`] while a request is in flight.
pub struct LineReader<R> {
    reader: BufReader<R>,
    buf: Vec<u8>,
    interrupt: Option<Interrupt>,
}

pub type StdinLines = LineReader<Stdin>;

impl LineReader<Stdin> {
    pub fn new() -> Self {
        Self {
            reader: BufReader::new(tokio::io::stdin()),
            buf: Vec::new(),
            interrupt: Some(Box::pin(tokio::signal::ctrl_c())),
        }
    }
}

impl Default for LineReader<Stdin> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    #[cfg(test)]
    fn with_interrupt(reader: R, interrupt: Option<Interrupt>) -> Self {
        Self {
            reader: BufReader::new(reader),
            buf: Vec::new(),
            interrupt,
        }
    }
}

enum Raced {
    Line(io::Result<Option<String>>),
    Interrupt(io::Result<()>),
}

fn line_event(line: Option<String>) -> InputEvent {
    match line {
        Some(line) => InputEvent::Line(line),
        None => InputEvent::Eof,
    }
}

/// Reads one line; invalid UTF-8 is replaced rather than rejected.
///
/// Partial reads stay in `buf`, so the call can be cancelled and resumed.
async fn read_line<R: AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
    buf: &mut Vec<u8>,
) -> io::Result<Option<String>> {
    reader.read_until(b'\n', buf).await?;
    if buf.is_empty() {
        return Ok(None);
    }
    let bytes = std::mem::take(buf);
    Ok(Some(decode_line(&bytes)))
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> LineSource for LineReader<R> {
    async fn next_line(&mut self) -> io::Result<InputEvent> {
        loop {
            let raced = match self.interrupt.as_mut() {
                None => return Ok(line_event(read_line(&mut self.reader, &mut self.buf).await?)),
                Some(interrupt) => tokio::select! {
                    line = read_line(&mut self.reader, &mut self.buf) => Raced::Line(line),
                    res = interrupt.as_mut() => Raced::Interrupt(res),
                },
            };

            match raced {
                Raced::Line(line) => return Ok(line_event(line?)),
                Raced::Interrupt(Ok(())) => {
                    self.interrupt = None;
                    return Ok(InputEvent::Interrupted);
                }
                Raced::Interrupt(Err(e)) => {
                    tracing::warn!(%e, "ctrl-c listener unavailable");
                    self.interrupt = None;
                }
            }
        }
    }

    async fn interrupted(&mut self) {
        if let Some(interrupt) = self.interrupt.as_mut() {
            let res = interrupt.as_mut().await;
            self.interrupt = None;
            match res {
                Ok(()) => return,
                Err(e) => tracing::warn!(%e, "ctrl-c listener unavailable"),
            }
        }
        std::future::pending::<()>().await
    }
}
