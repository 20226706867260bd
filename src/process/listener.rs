// src/process/listener.rs

//! Background readers turning a child's output pipes into discrete lines.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use crate::process::filter::LineFilter;
use crate::protocol::ExecutionId;

/// Any readable pipe of a child process.
pub type OutputStream = Box<dyn AsyncRead + Send + Unpin>;

/// Reads the output of one execution until EOF and queues accepted lines.
///
/// On unix a child's stdout and stderr already arrive as one stream. Should
/// several streams be given, they all feed the same unbounded queue. Lines
/// keep their trailing newline.
#[derive(Debug)]
pub struct OutputListener {
    id: ExecutionId,
    queue: mpsc::UnboundedReceiver<String>,
    readers: Vec<JoinHandle<()>>,
}

impl OutputListener {
    /// Spawn one reader task per stream. Must be called inside a Tokio runtime.
    pub fn spawn(id: ExecutionId, streams: Vec<OutputStream>, filter: Arc<dyn LineFilter>) -> Self {
        let (tx, queue) = mpsc::unbounded_channel();
        let readers = streams
            .into_iter()
            .map(|stream| tokio::spawn(read_stream(id, stream, Arc::clone(&filter), tx.clone())))
            .collect();

        Self { id, queue, readers }
    }

    /// Move whatever is queued right now into `out` without waiting.
    pub fn drain_into(&mut self, out: &mut Vec<String>) {
        while let Ok(line) = self.queue.try_recv() {
            out.push(line);
        }
    }

    /// Wait for all readers to hit EOF (at most `within`), then drain the
    /// remaining lines into `out`.
    ///
    /// Readers still blocked after the deadline are aborted: a grandchild may
    /// hold the pipe open long after the child itself exited.
    pub async fn join(mut self, within: Duration, out: &mut Vec<String>) {
        let deadline = Instant::now() + within;

        for reader in &mut self.readers {
            if timeout_at(deadline, &mut *reader).await.is_err() {
                warn!(
                    execution_id = self.id,
                    "output reader still open after join timeout; aborting it"
                );
                reader.abort();
            }
        }

        self.drain_into(out);
    }
}

impl Drop for OutputListener {
    fn drop(&mut self) {
        for reader in &self.readers {
            reader.abort();
        }
    }
}

async fn read_stream(
    id: ExecutionId,
    stream: OutputStream,
    filter: Arc<dyn LineFilter>,
    tx: mpsc::UnboundedSender<String>,
) {
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf).into_owned();
                if !filter.accepts(&line) {
                    continue;
                }
                if tx.send(line).is_err() {
                    // Log side is gone.
                    break;
                }
            }
            Err(err) => {
                debug!(execution_id = id, error = %err, "output stream read failed; reader stopping");
                break;
            }
        }
    }

    debug!(execution_id = id, "output reader finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::filter::{AcceptAll, AnsiEscapeFilter};
    use std::io::Cursor;

    fn stream(text: &str) -> OutputStream {
        Box::new(Cursor::new(text.as_bytes().to_vec()))
    }

    #[tokio::test]
    async fn join_collects_all_lines_with_newlines() {
        let listener = OutputListener::spawn(1, vec![stream("one\ntwo\nthree")], Arc::new(AcceptAll));
        let mut out = Vec::new();
        listener.join(Duration::from_secs(1), &mut out).await;
        assert_eq!(out, vec!["one\n", "two\n", "three"]);
    }

    #[tokio::test]
    async fn escape_lines_are_filtered() {
        let listener = OutputListener::spawn(
            2,
            vec![stream("keep\n\x1b[2Kdrop\nkeep too\n")],
            Arc::new(AnsiEscapeFilter),
        );
        let mut out = Vec::new();
        listener.join(Duration::from_secs(1), &mut out).await;
        assert_eq!(out, vec!["keep\n", "keep too\n"]);
    }

    #[tokio::test]
    async fn multiple_streams_share_one_queue() {
        let listener = OutputListener::spawn(
            3,
            vec![stream("out\n"), stream("err\n")],
            Arc::new(AcceptAll),
        );
        let mut out = Vec::new();
        listener.join(Duration::from_secs(1), &mut out).await;
        out.sort();
        assert_eq!(out, vec!["err\n", "out\n"]);
    }

    #[tokio::test]
    async fn invalid_utf8_is_decoded_lossily() {
        let bytes: OutputStream = Box::new(Cursor::new(vec![b'a', 0xff, b'\n']));
        let listener = OutputListener::spawn(4, vec![bytes], Arc::new(AcceptAll));
        let mut out = Vec::new();
        listener.join(Duration::from_secs(1), &mut out).await;
        assert_eq!(out, vec!["a\u{fffd}\n"]);
    }

    #[tokio::test]
    async fn join_gives_up_on_streams_that_never_close() {
        // The write half is kept alive, so the reader never sees EOF.
        let (_writer, reader) = tokio::io::duplex(64);
        let listener = OutputListener::spawn(5, vec![Box::new(reader)], Arc::new(AcceptAll));
        let mut out = Vec::new();
        listener.join(Duration::from_millis(50), &mut out).await;
        assert!(out.is_empty());
    }
}
