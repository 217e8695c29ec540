use crate::api::InferenceError;
use crate::models::GenerateChunk;
use bytes::{Bytes, BytesMut};
use colored::*;
use futures::{Stream, StreamExt};
use std::io::Write;
use std::time::Instant;
use tokio::time::{timeout, Duration};

const FLUSH_INTERVAL: Duration = Duration::from_millis(50);

/// Splits a byte stream into complete lines.
///
/// Bytes after the last newline are held back until more data arrives or
/// [`NdjsonDecoder::finish`] is called.
#[derive(Default)]
pub struct NdjsonDecoder {
    buf: BytesMut,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let line = self.buf.split_to(pos + 1);
            let text = String::from_utf8_lossy(&line);
            let text = text.trim();
            if !text.is_empty() {
                lines.push(text.to_string());
            }
        }
        lines
    }

    /// The trailing line when the stream ended without a newline.
    pub fn finish(&mut self) -> Option<String> {
        let rest = self.buf.split();
        let text = String::from_utf8_lossy(&rest);
        let text = text.trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }
}

pub struct StreamOptions<'a> {
    /// Printed once, right before the first fragment.
    pub speaker: &'a str,
    pub chunk_timeout: Duration,
    /// Budget of the whole request; reported when it expires mid-body.
    pub request_timeout: Duration,
    pub verbose: bool,
}

/// A fully reassembled reply.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    /// Lines that were not valid chunk JSON and were skipped.
    pub malformed_chunks: usize,
    pub elapsed: Duration,
}

enum LineOutcome {
    Continue,
    Done,
}

struct Assembler<'a, W: Write> {
    out: &'a mut W,
    options: &'a StreamOptions<'a>,
    text: String,
    malformed_chunks: usize,
    started_display: bool,
    last_flush: Instant,
}

impl<'a, W: Write> Assembler<'a, W> {
    fn handle_line(&mut self, line: &str) -> Result<LineOutcome, InferenceError> {
        let chunk = match serde_json::from_str::<GenerateChunk>(line) {
            Ok(chunk) => chunk,
            Err(e) => {
                self.malformed_chunks += 1;
                if self.options.verbose {
                    eprintln!("{}", format!("[veo] Skipping malformed chunk: {}", e).dimmed());
                }
                return Ok(LineOutcome::Continue);
            }
        };

        if let Some(message) = chunk.error {
            return Err(InferenceError::Server(message));
        }

        if !chunk.response.is_empty() {
            self.emit(&chunk.response)?;
            self.text.push_str(&chunk.response);
        }

        if chunk.done {
            Ok(LineOutcome::Done)
        } else {
            Ok(LineOutcome::Continue)
        }
    }

    fn emit(&mut self, fragment: &str) -> Result<(), InferenceError> {
        if !self.started_display {
            write!(self.out, "{}", self.options.speaker).map_err(InferenceError::Io)?;
            self.started_display = true;
        }
        write!(self.out, "{}", fragment).map_err(InferenceError::Io)?;
        if self.last_flush.elapsed() > FLUSH_INTERVAL {
            self.out.flush().map_err(InferenceError::Io)?;
            self.last_flush = Instant::now();
        }
        Ok(())
    }
}

async fn drain<S, W>(
    stream: &mut S,
    decoder: &mut NdjsonDecoder,
    assembler: &mut Assembler<'_, W>,
    chunk_timeout: Duration,
) -> Result<(), InferenceError>
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Unpin,
    W: Write,
{
    loop {
        match timeout(chunk_timeout, stream.next()).await {
            Ok(Some(chunk)) => {
                let request_timeout = assembler.options.request_timeout;
                let chunk = chunk.map_err(|e| {
                    if e.is_timeout() {
                        InferenceError::Timeout(request_timeout)
                    } else {
                        InferenceError::Network(e)
                    }
                })?;
                for line in decoder.push(&chunk) {
                    if let LineOutcome::Done = assembler.handle_line(&line)? {
                        return Ok(());
                    }
                }
            }
            Ok(None) => {
                if let Some(line) = decoder.finish() {
                    assembler.handle_line(&line)?;
                }
                return Ok(());
            }
            Err(_) => return Err(InferenceError::Timeout(chunk_timeout)),
        }
    }
}

/// Consume a newline-delimited JSON generate stream.
///
/// Fragments are written to `out` as they arrive and concatenated in
/// arrival order. Malformed lines are skipped; a transport error, a chunk
/// timeout or an `error` chunk aborts the whole reply.
pub async fn read_generate_stream<S, W>(
    mut stream: S,
    options: &StreamOptions<'_>,
    out: &mut W,
) -> Result<Completion, InferenceError>
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Unpin,
    W: Write,
{
    let started = Instant::now();
    let mut decoder = NdjsonDecoder::new();
    let mut assembler = Assembler {
        out,
        options,
        text: String::new(),
        malformed_chunks: 0,
        started_display: false,
        last_flush: Instant::now(),
    };

    if let Err(e) = drain(&mut stream, &mut decoder, &mut assembler, options.chunk_timeout).await {
        // Keep whatever was already shown on its own line.
        if assembler.started_display {
            let _ = writeln!(assembler.out);
            let _ = assembler.out.flush();
        }
        return Err(e);
    }

    if assembler.started_display {
        writeln!(assembler.out).map_err(InferenceError::Io)?;
    }
    assembler.out.flush().map_err(InferenceError::Io)?;

    let text = assembler.text.trim().to_string();
    if text.is_empty() {
        return Err(InferenceError::EmptyReply);
    }

    Ok(Completion {
        text,
        malformed_chunks: assembler.malformed_chunks,
        elapsed: started.elapsed(),
    })
}
