//! Stream-based data source.
//!
//! Receives ticket batches from an async byte stream. This is useful
//! for network-based feeds, e.g. a TCP connection to a process that
//! forwards API responses as newline-delimited JSON.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;

use super::{TicketBatch, TicketSource};

/// A data source that receives ticket batches from an async stream.
///
/// This source spawns a background task that reads newline-delimited
/// JSON from the provided async reader and makes batches available via
/// `poll()`. Each line is parsed as one complete [`TicketBatch`].
///
/// # Example with a byte stream
///
/// ```
/// use std::io::Cursor;
/// use deskwatch::StreamSource;
///
/// # tokio_test::block_on(async {
/// let data = b"[]\n";
/// let stream = Cursor::new(data.to_vec());
/// let source = StreamSource::spawn(stream, "example");
/// # });
/// ```
#[derive(Debug)]
pub struct StreamSource {
    receiver: mpsc::Receiver<TicketBatch>,
    description: String,
    shared_error: Arc<Mutex<Option<String>>>,
    /// Error copied out of the shared slot on each poll, so that
    /// `error()` can hand out a plain reference.
    cached_error: Option<String>,
}

impl StreamSource {
    /// Spawn a background task that reads from the given async reader.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<R>(reader: R, description: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(16);
        let shared_error = Arc::new(Mutex::new(None));
        let error_handle = shared_error.clone();

        tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        // EOF
                        *error_handle.lock().unwrap() = Some("Connection closed".to_string());
                        break;
                    }
                    Ok(_) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        match serde_json::from_str::<TicketBatch>(trimmed) {
                            Ok(batch) => {
                                *error_handle.lock().unwrap() = None;
                                if tx.send(batch).await.is_err() {
                                    // Receiver dropped
                                    break;
                                }
                            }
                            Err(e) => {
                                *error_handle.lock().unwrap() = Some(format!("Parse error: {}", e));
                            }
                        }
                    }
                    Err(e) => {
                        *error_handle.lock().unwrap() = Some(format!("Read error: {}", e));
                        break;
                    }
                }
            }
        });

        Self {
            receiver: rx,
            description: format!("stream: {}", description),
            shared_error,
            cached_error: None,
        }
    }
}

impl TicketSource for StreamSource {
    fn poll(&mut self) -> Option<TicketBatch> {
        self.cached_error = self.shared_error.lock().unwrap().clone();

        // Try to receive without blocking
        match self.receiver.try_recv() {
            Ok(batch) => Some(batch),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                if self.cached_error.is_none() {
                    self.cached_error = Some("Stream disconnected".to_string());
                }
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.cached_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_json() -> &'static str {
        r#"[{"id":1,"status":"open"},{"id":2,"status":"new","priority":"urgent"}]"#
    }

    #[tokio::test]
    async fn test_stream_source_spawn() {
        // Create a cursor with newline-delimited JSON
        let data = format!("{}\n", sample_json());
        let cursor = Cursor::new(data);

        let mut source = StreamSource::spawn(cursor, "test");

        // Give the background task time to process
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        // Should receive the batch
        let batch = source.poll();
        assert!(batch.is_some());
        assert_eq!(batch.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_stream_source_multiple_batches() {
        let data = format!("{}\n{}\n", sample_json(), sample_json());
        let cursor = Cursor::new(data);

        let mut source = StreamSource::spawn(cursor, "test");

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        // Should receive both batches
        let b1 = source.poll();
        let b2 = source.poll();
        assert!(b1.is_some());
        assert!(b2.is_some());

        // No more data
        assert!(source.poll().is_none());
    }

    #[tokio::test]
    async fn test_stream_source_description() {
        let cursor = Cursor::new("");
        let source = StreamSource::spawn(cursor, "tcp://localhost:9090");
        assert_eq!(source.description(), "stream: tcp://localhost:9090");
    }

    #[tokio::test]
    async fn test_stream_source_invalid_json() {
        let data = "not valid json\n";
        let cursor = Cursor::new(data);

        let mut source = StreamSource::spawn(cursor, "test");

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        // Should not receive anything (invalid JSON is skipped)
        assert!(source.poll().is_none());
        // An error is surfaced (parse error, or EOF that followed it)
        assert!(source.error().is_some());
    }

    #[tokio::test]
    async fn test_stream_source_empty_stream() {
        let cursor = Cursor::new("");
        let mut source = StreamSource::spawn(cursor, "test");

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        // No data to receive
        assert!(source.poll().is_none());
    }
}
