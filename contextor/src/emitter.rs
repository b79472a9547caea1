//! Paced, cancellable delivery of a finished answer.
//!
//! The answer is complete before streaming starts; pacing only simulates
//! typing. Units are `char`s, so concatenating them gives back the exact
//! input string.

use std::time::Duration;

use async_stream::stream;
use futures::stream::BoxStream;
use tokio::sync::watch;
use tracing::debug;

/// Stops the stream it was issued with. Dropping the handle does not cancel.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct StreamEmitter {
    delay: Duration,
}

impl StreamEmitter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Streams `text` one char at a time with `delay` between chars.
    ///
    /// The stream ends early, without error, once the handle is cancelled
    /// or when the consumer drops it.
    pub fn emit(&self, text: String) -> (BoxStream<'static, char>, CancelHandle) {
        let (tx, mut rx) = watch::channel(false);
        let delay = self.delay;

        let units = stream! {
            let mut progress = Delivery {
                sent: 0,
                total: text.chars().count(),
            };
            for ch in text.chars() {
                if progress.sent > 0 {
                    tokio::select! {
                        biased;
                        _ = cancelled(&mut rx) => {}
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                if *rx.borrow() {
                    break;
                }
                progress.sent += 1;
                yield ch;
            }
        };

        (Box::pin(units), CancelHandle { tx })
    }
}

/// Logs streams that end before the last unit: cancelled or dropped by
/// the consumer.
struct Delivery {
    sent: usize,
    total: usize,
}

impl Drop for Delivery {
    fn drop(&mut self) {
        if self.sent < self.total {
            debug!(sent = self.sent, total = self.total, "answer stream stopped early");
        }
    }
}

/// Resolves once cancelled; never resolves if the handle is gone uncancelled.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|c| *c).await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn delivers_every_char_in_order() {
        let text = "I build backends in Rust. Ça va? 🦀".to_string();
        let (stream, _handle) = StreamEmitter::new(Duration::from_millis(15)).emit(text.clone());
        let out: String = stream.collect().await;
        assert_eq!(out, text);
    }

    #[tokio::test(start_paused = true)]
    async fn units_are_paced_by_the_delay() {
        let (stream, _handle) = StreamEmitter::new(Duration::from_millis(15)).emit("abcd".into());
        let t0 = Instant::now();
        let out: Vec<char> = stream.collect().await;
        assert_eq!(out, vec!['a', 'b', 'c', 'd']);
        let elapsed = t0.elapsed();
        assert!(elapsed >= Duration::from_millis(45) && elapsed < Duration::from_millis(60));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_after_k_units_yields_exactly_k() {
        let (mut stream, handle) = StreamEmitter::new(Duration::from_millis(15)).emit("hello world".into());
        let mut got = String::new();
        for _ in 0..3 {
            got.push(stream.next().await.unwrap());
        }
        handle.cancel();
        assert!(handle.is_cancelled());
        while let Some(ch) = stream.next().await {
            got.push(ch);
        }
        assert_eq!(got, "hel");
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_interrupts_a_pending_delay() {
        let (mut stream, handle) = StreamEmitter::new(Duration::from_secs(3600)).emit("ab".into());
        assert_eq!(stream.next().await, Some('a'));
        let t0 = Instant::now();
        let next = tokio::spawn(async move { stream.next().await });
        tokio::time::sleep(Duration::from_millis(1)).await;
        handle.cancel();
        assert_eq!(next.await.unwrap(), None);
        assert!(t0.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_does_not_cancel() {
        let (stream, handle) = StreamEmitter::new(Duration::from_millis(5)).emit("abc".into());
        drop(handle);
        let out: String = stream.collect().await;
        assert_eq!(out, "abc");
    }

    #[tokio::test]
    async fn empty_text_is_an_empty_stream() {
        let (stream, _handle) = StreamEmitter::new(Duration::from_millis(5)).emit(String::new());
        assert_eq!(stream.count().await, 0);
    }
}
