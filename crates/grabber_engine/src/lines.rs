use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Splits a process output stream into lines as they arrive.
///
/// Both `\n` and `\r` terminate a line, so carriage-return progress redraws are
/// seen as separate lines. Blank lines are skipped and invalid UTF-8 is replaced.
pub struct OutputLines<R> {
    reader: BufReader<R>,
    pending: Vec<u8>,
}

impl<R: AsyncRead + Unpin> OutputLines<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            pending: Vec::new(),
        }
    }

    /// Next non-empty line, or `None` once the stream is closed.
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        loop {
            let available = self.reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(self.take_pending());
            }
            match available.iter().position(|b| *b == b'\n' || *b == b'\r') {
                Some(idx) => {
                    self.pending.extend_from_slice(&available[..idx]);
                    self.reader.consume(idx + 1);
                    if let Some(line) = self.take_pending() {
                        return Ok(Some(line));
                    }
                }
                None => {
                    let len = available.len();
                    self.pending.extend_from_slice(available);
                    self.reader.consume(len);
                }
            }
        }
    }

    fn take_pending(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        Some(line)
    }
}
