use futures_util::FutureExt;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::{DEFAULT_CAPACITY, ReadError};

/// Successful outcome of one buffered read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The terminating condition was met; the destination holds this many bytes.
    Complete(usize),
    /// The limit was reached first. The destination holds one fragment and
    /// the rest stays buffered for the next call.
    Overflow(usize),
    /// Nothing is buffered or pending and a blocking refill was not allowed.
    EndOfStream,
}

impl ReadOutcome {
    /// Number of bytes produced into the destination.
    pub fn bytes(&self) -> usize {
        match self {
            Self::Complete(n) | Self::Overflow(n) => *n,
            Self::EndOfStream => 0,
        }
    }

    pub fn is_overflow(&self) -> bool {
        matches!(self, Self::Overflow(_))
    }
}

/// Read buffer with `start`/`end` cursors over an async byte stream.
///
/// The unconsumed region is `buf[start..end]`. Refills compact that region
/// to the front and append behind it, so bytes left over by one request are
/// the first bytes seen by the next.
pub struct BufferedReader<R> {
    inner: R,
    buf: Vec<u8>,
    start: usize,
    end: usize,
}

impl<R: AsyncRead + Unpin> BufferedReader<R> {
    /// Wraps `inner` with a [`DEFAULT_CAPACITY`] buffer.
    pub fn new(inner: R) -> Self {
        Self::with_capacity(DEFAULT_CAPACITY, inner)
    }

    /// Wraps `inner` with a buffer of `capacity` bytes (at least one).
    pub fn with_capacity(capacity: usize, inner: R) -> Self {
        Self {
            inner,
            buf: vec![0; capacity.max(1)],
            start: 0,
            end: 0,
        }
    }

    /// Unconsumed buffered bytes.
    pub fn remaining(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Current buffer size.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Marks `n` buffered bytes as consumed (clamped to what is buffered).
    pub fn consume(&mut self, n: usize) {
        self.start += n.min(self.end - self.start);
        if self.start == self.end {
            self.start = 0;
            self.end = 0;
        }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Returns the underlying stream. Buffered bytes are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Waits for the stream to deliver more bytes and appends them.
    ///
    /// Returns the number of bytes appended. A read of zero bytes means the
    /// peer closed the stream.
    pub async fn fill(&mut self) -> Result<usize, ReadError> {
        self.make_room();
        let n = self.inner.read(&mut self.buf[self.end..]).await?;
        self.appended(n)
    }

    /// Reads one line into `dest`.
    ///
    /// At most `limit` bytes are consumed per call. The `\n` and a directly
    /// preceding `\r` are not copied. When no newline shows up within
    /// `limit` bytes the fragment is returned as [`ReadOutcome::Overflow`].
    /// With `allow_refill == false`, nothing buffered and nothing pending,
    /// returns [`ReadOutcome::EndOfStream`]. A partially buffered line is
    /// waited for regardless of `allow_refill`.
    pub async fn read_line(
        &mut self,
        dest: &mut Vec<u8>,
        limit: usize,
        allow_refill: bool,
    ) -> Result<ReadOutcome, ReadError> {
        dest.clear();
        let limit = limit.max(1);

        loop {
            let scan = self.remaining().len().min(limit);
            let newline = self.remaining()[..scan].iter().position(|&b| b == b'\n');

            if let Some(pos) = newline {
                let line = &self.remaining()[..pos];
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                dest.extend_from_slice(line);
                self.consume(pos + 1);
                return Ok(ReadOutcome::Complete(dest.len()));
            }

            if scan >= limit {
                dest.extend_from_slice(&self.remaining()[..limit]);
                self.consume(limit);
                return Ok(ReadOutcome::Overflow(limit));
            }

            // A started line is always finished, even without refill.
            if !self.refill(allow_refill || !self.is_empty()).await? {
                return Ok(ReadOutcome::EndOfStream);
            }
        }
    }

    /// Reads whatever is available right now into `dest`.
    ///
    /// Completes once the buffer is drained and the stream has nothing
    /// pending. If nothing at all is available it blocks for the next bytes
    /// (`allow_refill`) or returns [`ReadOutcome::EndOfStream`].
    pub async fn read_until_idle(
        &mut self,
        dest: &mut Vec<u8>,
        limit: usize,
        allow_refill: bool,
    ) -> Result<ReadOutcome, ReadError> {
        dest.clear();
        let limit = limit.max(1);

        loop {
            if self.is_empty() && !self.try_fill_after(!dest.is_empty())? {
                if !dest.is_empty() {
                    return Ok(ReadOutcome::Complete(dest.len()));
                }
                if !allow_refill {
                    return Ok(ReadOutcome::EndOfStream);
                }
                self.fill().await?;
            }

            let take = self.remaining().len().min(limit - dest.len());
            dest.extend_from_slice(&self.remaining()[..take]);
            self.consume(take);

            if dest.len() >= limit {
                if self.is_empty() && !self.try_fill_after(true)? {
                    return Ok(ReadOutcome::Complete(dest.len()));
                }
                return Ok(ReadOutcome::Overflow(dest.len()));
            }
        }
    }

    /// Fills `dest` completely, draining the buffer before touching the
    /// stream.
    pub async fn read_exact(&mut self, dest: &mut [u8]) -> Result<usize, ReadError> {
        let buffered = self.remaining().len().min(dest.len());
        dest[..buffered].copy_from_slice(&self.remaining()[..buffered]);
        self.consume(buffered);

        if buffered < dest.len() {
            match self.inner.read_exact(&mut dest[buffered..]).await {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return Err(ReadError::Closed);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(dest.len())
    }

    /// Tops up the buffer for a request that ran out of bytes. Returns
    /// `false` when nothing is pending and blocking was not allowed.
    async fn refill(&mut self, allow_refill: bool) -> Result<bool, ReadError> {
        if self.try_fill()? {
            return Ok(true);
        }
        if !allow_refill {
            return Ok(false);
        }
        self.fill().await?;
        Ok(true)
    }

    /// Appends whatever the stream can deliver without waiting.
    fn try_fill(&mut self) -> Result<bool, ReadError> {
        self.make_room();
        let polled = self.inner.read(&mut self.buf[self.end..]).now_or_never();
        match polled {
            None => Ok(false),
            Some(result) => {
                self.appended(result?)?;
                Ok(true)
            }
        }
    }

    /// Like `try_fill`, but a close seen after bytes were produced is left for
    /// the next call to report, so those bytes still reach the caller.
    fn try_fill_after(&mut self, produced: bool) -> Result<bool, ReadError> {
        match self.try_fill() {
            Err(ReadError::Closed) if produced => Ok(false),
            other => other,
        }
    }

    fn appended(&mut self, n: usize) -> Result<usize, ReadError> {
        if n == 0 {
            return Err(ReadError::Closed);
        }
        self.end += n;
        Ok(n)
    }

    /// Moves unconsumed bytes to the front and guarantees free space behind them.
    fn make_room(&mut self) {
        if self.start > 0 {
            self.buf.copy_within(self.start..self.end, 0);
            self.end -= self.start;
            self.start = 0;
        }
        if self.end == self.buf.len() {
            let grown = self.buf.len() * 2;
            self.buf.resize(grown, 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn read_line_strips_crlf_and_keeps_the_rest() {
        let mut reader = BufferedReader::new(&b"HTTP/1.1 200 OK\r\nnext\n"[..]);
        let mut line = Vec::new();

        let outcome = reader.read_line(&mut line, 200, true).await.unwrap();
        assert_eq!(outcome, ReadOutcome::Complete(15));
        assert_eq!(line, b"HTTP/1.1 200 OK");

        let outcome = reader.read_line(&mut line, 200, true).await.unwrap();
        assert_eq!(outcome, ReadOutcome::Complete(4));
        assert_eq!(line, b"next");
    }

    #[tokio::test]
    async fn read_line_overflow_continues_where_it_stopped() {
        let mut reader = BufferedReader::with_capacity(3, &b"abcdefghij\r\nxyz\n"[..]);
        let mut line = Vec::new();
        let mut joined = Vec::new();

        let outcome = reader.read_line(&mut line, 4, true).await.unwrap();
        assert_eq!(outcome, ReadOutcome::Overflow(4));
        assert_eq!(line, b"abcd");
        joined.extend_from_slice(&line);

        let outcome = reader.read_line(&mut line, 4, true).await.unwrap();
        assert_eq!(outcome, ReadOutcome::Overflow(4));
        assert_eq!(line, b"efgh");
        joined.extend_from_slice(&line);

        let outcome = reader.read_line(&mut line, 4, true).await.unwrap();
        assert_eq!(outcome, ReadOutcome::Complete(2));
        joined.extend_from_slice(&line);
        assert_eq!(joined, b"abcdefghij");

        reader.read_line(&mut line, 4, true).await.unwrap();
        assert_eq!(line, b"xyz");
    }

    #[tokio::test]
    async fn read_line_grows_buffer_for_long_lines() {
        let mut reader = BufferedReader::with_capacity(4, &b"hello world\n"[..]);
        let mut line = Vec::new();

        let outcome = reader.read_line(&mut line, 64, true).await.unwrap();
        assert_eq!(outcome, ReadOutcome::Complete(11));
        assert_eq!(line, b"hello world");
        assert!(reader.capacity() >= 12);
    }

    #[tokio::test]
    async fn end_of_stream_only_when_nothing_is_buffered() {
        let (mut tx, rx) = tokio::io::duplex(64);
        let mut reader = BufferedReader::new(rx);
        let mut line = Vec::new();

        let outcome = reader.read_line(&mut line, 200, false).await.unwrap();
        assert_eq!(outcome, ReadOutcome::EndOfStream);
        assert!(line.is_empty());

        tx.write_all(b"done\n").await.unwrap();
        let outcome = reader.read_line(&mut line, 200, false).await.unwrap();
        assert_eq!(outcome, ReadOutcome::Complete(4));
        assert!(reader.is_empty());
    }

    #[tokio::test]
    async fn partial_line_is_finished_without_refill() {
        let (mut tx, rx) = tokio::io::duplex(64);
        let mut reader = BufferedReader::new(rx);
        let mut line = Vec::new();

        tx.write_all(b"partial").await.unwrap();
        let writer = tokio::spawn(async move {
            tokio::task::yield_now().await;
            tx.write_all(b" line\r\nnext").await.unwrap();
            tx
        });

        let outcome = reader.read_line(&mut line, 200, false).await.unwrap();
        assert_eq!(outcome, ReadOutcome::Complete(12));
        assert_eq!(line, b"partial line");
        assert_eq!(reader.remaining(), b"next");
        drop(writer.await.unwrap());
    }

    #[tokio::test]
    async fn closed_stream_is_an_error() {
        let mut reader = BufferedReader::new(&b"no newline"[..]);
        let mut line = Vec::new();

        let err = reader.read_line(&mut line, 200, true).await.unwrap_err();
        assert!(matches!(err, ReadError::Closed));
    }

    #[tokio::test]
    async fn read_until_idle_returns_what_is_available() {
        let (mut tx, rx) = tokio::io::duplex(64);
        let mut reader = BufferedReader::with_capacity(4, rx);
        let mut data = Vec::new();

        tx.write_all(b"abcdef").await.unwrap();
        let outcome = reader.read_until_idle(&mut data, 100, false).await.unwrap();
        assert_eq!(outcome, ReadOutcome::Complete(6));
        assert_eq!(data, b"abcdef");

        let outcome = reader.read_until_idle(&mut data, 100, false).await.unwrap();
        assert_eq!(outcome, ReadOutcome::EndOfStream);
        assert!(data.is_empty());
    }

    #[tokio::test]
    async fn read_until_idle_overflows_in_fragments() {
        let (mut tx, rx) = tokio::io::duplex(64);
        let mut reader = BufferedReader::new(rx);
        let mut data = Vec::new();

        tx.write_all(b"abcdef").await.unwrap();
        let outcome = reader.read_until_idle(&mut data, 4, true).await.unwrap();
        assert_eq!(outcome, ReadOutcome::Overflow(4));
        assert_eq!(data, b"abcd");

        let outcome = reader.read_until_idle(&mut data, 4, true).await.unwrap();
        assert_eq!(outcome, ReadOutcome::Complete(2));
        assert_eq!(data, b"ef");
    }

    #[tokio::test]
    async fn read_until_idle_exact_fit_is_complete() {
        let (mut tx, rx) = tokio::io::duplex(64);
        let mut reader = BufferedReader::new(rx);
        let mut data = Vec::new();

        tx.write_all(b"abcd").await.unwrap();
        let outcome = reader.read_until_idle(&mut data, 4, true).await.unwrap();
        assert_eq!(outcome, ReadOutcome::Complete(4));
    }

    #[tokio::test]
    async fn read_until_idle_waits_when_allowed() {
        let (mut tx, rx) = tokio::io::duplex(64);
        let mut reader = BufferedReader::new(rx);

        let writer = tokio::spawn(async move {
            tokio::task::yield_now().await;
            tx.write_all(b"late").await.unwrap();
            tx
        });

        let mut data = Vec::new();
        let outcome = reader.read_until_idle(&mut data, 100, true).await.unwrap();
        assert_eq!(outcome, ReadOutcome::Complete(4));
        assert_eq!(data, b"late");
        drop(writer.await.unwrap());
    }

    #[tokio::test]
    async fn read_until_idle_delivers_bytes_before_reporting_close() {
        let mut reader = BufferedReader::new(&b"last words"[..]);
        let mut data = Vec::new();

        let outcome = reader.read_until_idle(&mut data, 100, true).await.unwrap();
        assert_eq!(outcome, ReadOutcome::Complete(10));
        assert_eq!(data, b"last words");

        let err = reader.read_until_idle(&mut data, 100, true).await.unwrap_err();
        assert!(matches!(err, ReadError::Closed));
    }

    #[tokio::test]
    async fn read_exact_drains_buffer_before_stream() {
        let mut reader = BufferedReader::with_capacity(4, &b"5\r\nhello\r\n"[..]);
        let mut line = Vec::new();

        reader.read_line(&mut line, 200, true).await.unwrap();
        assert_eq!(line, b"5");
        assert_eq!(reader.remaining(), b"h");

        let mut body = [0u8; 5];
        let n = reader.read_exact(&mut body).await.unwrap();
        assert_eq!(n, 5);
        assert_eq!(&body, b"hello");
    }

    #[tokio::test]
    async fn read_exact_on_short_stream_is_closed() {
        let mut reader = BufferedReader::new(&b"abc"[..]);
        let mut body = [0u8; 5];

        let err = reader.read_exact(&mut body).await.unwrap_err();
        assert!(matches!(err, ReadError::Closed));
    }

    #[test]
    fn consume_is_clamped_and_resets_cursors() {
        let mut reader = BufferedReader::with_capacity(8, &b""[..]);
        reader.buf[..3].copy_from_slice(b"abc");
        reader.end = 3;

        reader.consume(1);
        assert_eq!(reader.remaining(), b"bc");

        reader.consume(10);
        assert!(reader.is_empty());
        assert_eq!((reader.start, reader.end), (0, 0));
    }
}
