//! Single-slot command/response rendezvous.
//!
//! The adapter protocol is strictly request/response: one command in
//! flight, one prompt-terminated batch back. `ResponseWaiter` owns the
//! batch stream coming out of the framer pump plus the queue of lines that
//! arrived while nobody was waiting.

use std::sync::Mutex;
use std::time::Duration;

use regex::Regex;
use tokio::sync::mpsc;

use crate::error::{ScanError, ScanResult};

/// Default deadline for a response wait.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_millis(15_000);

/// A named predicate over response lines. The name ends up in timeout and
/// concurrency errors.
pub struct LineMatcher {
    description: String,
    predicate: Box<dyn Fn(&str) -> bool + Send + Sync>,
}

impl LineMatcher {
    pub fn new(
        description: impl Into<String>,
        predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Matches any line, including an empty one. Used for command acks
    /// where the content does not matter.
    pub fn any_line() -> Self {
        Self::new("any line", |_| true)
    }

    /// Matches lines against a compiled regex.
    pub fn regex(pattern: Regex) -> Self {
        let description = pattern.as_str().to_string();
        Self::new(description, move |line| pattern.is_match(line))
    }

    /// Matches lines starting with the given prefix.
    pub fn prefix(prefix: &'static str) -> Self {
        Self::new(format!("prefix {prefix:?}"), move |line| {
            line.starts_with(prefix)
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn matches(&self, line: &str) -> bool {
        (self.predicate)(line)
    }
}

/// Single-consumer rendezvous between the framer pump and protocol steps.
pub struct ResponseWaiter {
    /// Batch stream from the framer pump. The mutex doubles as the
    /// single-slot wait guard: a second waiter fails fast instead of
    /// queueing.
    batches: tokio::sync::Mutex<mpsc::UnboundedReceiver<Vec<String>>>,
    /// Lines that arrived while no wait was registered.
    received: Mutex<Vec<String>>,
    /// Description of the wait currently in flight, for error reporting.
    in_flight: Mutex<Option<String>>,
    timeout: Duration,
}

impl ResponseWaiter {
    pub fn new(batches: mpsc::UnboundedReceiver<Vec<String>>, timeout: Duration) -> Self {
        Self {
            batches: tokio::sync::Mutex::new(batches),
            received: Mutex::new(Vec::new()),
            in_flight: Mutex::new(None),
            timeout,
        }
    }

    /// Wait until a response line satisfies `matcher`, up to the configured
    /// timeout.
    pub async fn wait_line(&self, matcher: &LineMatcher) -> ScanResult<Vec<String>> {
        self.wait_line_within(matcher, self.timeout).await
    }

    /// Wait until a response line satisfies `matcher`.
    ///
    /// Lines that arrived while no wait was registered are checked first; a
    /// match there resolves synchronously with a snapshot of the whole
    /// queue, clearing it. Otherwise incoming batches are inspected until
    /// the deadline; a batch with no matching line is dropped, not queued —
    /// lines can be lost between a timeout and the next send. That gap is
    /// inherited from the wire protocol's one-request-at-a-time design.
    pub async fn wait_line_within(
        &self,
        matcher: &LineMatcher,
        timeout: Duration,
    ) -> ScanResult<Vec<String>> {
        // A queued match wins even over the concurrency guard.
        if let Some(snapshot) = self.take_queued_match(matcher) {
            return Ok(snapshot);
        }

        let mut rx = self.batches.try_lock().map_err(|_| {
            let current = self
                .in_flight
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| "unknown".into());
            ScanError::ConcurrentWait(current)
        })?;

        self.drain_idle(&mut rx);
        if let Some(snapshot) = self.take_queued_match(matcher) {
            return Ok(snapshot);
        }

        *self.in_flight.lock().unwrap() = Some(matcher.description().to_string());
        let result = self.next_match(&mut rx, matcher, timeout).await;
        *self.in_flight.lock().unwrap() = None;
        result
    }

    /// Snapshot and clear the queue when any queued line matches.
    fn take_queued_match(&self, matcher: &LineMatcher) -> Option<Vec<String>> {
        let mut received = self.received.lock().unwrap();
        if received.iter().any(|line| matcher.matches(line)) {
            Some(std::mem::take(&mut *received))
        } else {
            None
        }
    }

    /// Move batches that arrived while nobody was waiting into the queue.
    fn drain_idle(&self, rx: &mut mpsc::UnboundedReceiver<Vec<String>>) {
        let mut received = self.received.lock().unwrap();
        while let Ok(batch) = rx.try_recv() {
            received.extend(batch);
        }
    }

    async fn next_match(
        &self,
        rx: &mut mpsc::UnboundedReceiver<Vec<String>>,
        matcher: &LineMatcher,
        timeout: Duration,
    ) -> ScanResult<Vec<String>> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let batch = tokio::time::timeout_at(deadline, rx.recv())
                .await
                .map_err(|_| ScanError::Timeout {
                    predicate: matcher.description().to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                })?
                .ok_or(ScanError::Disconnected)?;

            if batch.iter().any(|line| matcher.matches(line)) {
                return Ok(batch);
            }
            tracing::debug!(
                lines = batch.len(),
                waiting_for = matcher.description(),
                "dropping unmatched batch"
            );
        }
    }

    /// Lines currently queued and unclaimed.
    pub fn queued(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn batch(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn queued_match_resolves_without_waiting() {
        let (tx, rx) = mpsc::unbounded_channel();
        let waiter = ResponseWaiter::new(rx, DEFAULT_WAIT_TIMEOUT);

        tx.send(batch(&["ELM327 v1.5"])).unwrap();
        tx.send(batch(&["OK"])).unwrap();

        let start = tokio::time::Instant::now();
        let lines = waiter
            .wait_line(&LineMatcher::prefix("OK"))
            .await
            .unwrap();

        assert_eq!(start.elapsed(), Duration::ZERO);
        // The snapshot is the whole queue, and the queue empties.
        assert_eq!(lines, batch(&["ELM327 v1.5", "OK"]));
        assert!(waiter.queued().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_after_exactly_the_deadline() {
        let (_tx, rx) = mpsc::unbounded_channel::<Vec<String>>();
        let waiter = ResponseWaiter::new(rx, Duration::from_millis(500));

        let start = tokio::time::Instant::now();
        let err = waiter.wait_line(&LineMatcher::any_line()).await.unwrap_err();

        assert_eq!(start.elapsed(), Duration::from_millis(500));
        match err {
            ScanError::Timeout {
                predicate,
                timeout_ms,
            } => {
                assert_eq!(predicate, "any line");
                assert_eq!(timeout_ms, 500);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn matching_batch_resolves_the_wait() {
        let (tx, rx) = mpsc::unbounded_channel();
        let waiter = Arc::new(ResponseWaiter::new(rx, DEFAULT_WAIT_TIMEOUT));

        let pending = {
            let waiter = waiter.clone();
            tokio::spawn(async move { waiter.wait_line(&LineMatcher::prefix("43 ")).await })
        };
        tokio::task::yield_now().await;

        tx.send(batch(&["43 01 03 00"])).unwrap();
        let lines = pending.await.unwrap().unwrap();
        assert_eq!(lines, batch(&["43 01 03 00"]));
    }

    #[tokio::test]
    async fn unmatched_batches_are_dropped_during_a_wait() {
        let (tx, rx) = mpsc::unbounded_channel();
        let waiter = Arc::new(ResponseWaiter::new(rx, DEFAULT_WAIT_TIMEOUT));

        let pending = {
            let waiter = waiter.clone();
            tokio::spawn(async move { waiter.wait_line(&LineMatcher::prefix("49 02")).await })
        };
        tokio::task::yield_now().await;

        tx.send(batch(&["SEARCHING..."])).unwrap();
        tx.send(batch(&["49 02 01 31 48 47"])).unwrap();

        let lines = pending.await.unwrap().unwrap();
        assert_eq!(lines, batch(&["49 02 01 31 48 47"]));
        // The unmatched batch did not land in the queue.
        assert!(waiter.queued().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn second_concurrent_wait_fails_fast() {
        let (_tx, rx) = mpsc::unbounded_channel::<Vec<String>>();
        let waiter = Arc::new(ResponseWaiter::new(rx, Duration::from_secs(60)));

        let first = {
            let waiter = waiter.clone();
            tokio::spawn(async move { waiter.wait_line(&LineMatcher::prefix("43 ")).await })
        };
        tokio::task::yield_now().await;

        let err = waiter
            .wait_line(&LineMatcher::any_line())
            .await
            .unwrap_err();
        match err {
            ScanError::ConcurrentWait(current) => assert_eq!(current, "prefix \"43 \""),
            other => panic!("expected concurrent wait error, got {other:?}"),
        }

        first.abort();
    }

    #[tokio::test]
    async fn closed_stream_surfaces_disconnect() {
        let (tx, rx) = mpsc::unbounded_channel::<Vec<String>>();
        let waiter = ResponseWaiter::new(rx, DEFAULT_WAIT_TIMEOUT);

        drop(tx);
        let err = waiter.wait_line(&LineMatcher::any_line()).await.unwrap_err();
        assert!(matches!(err, ScanError::Disconnected));
    }

    #[tokio::test]
    async fn regex_matcher_reports_its_pattern_on_timeout() {
        let (_tx, rx) = mpsc::unbounded_channel::<Vec<String>>();
        let waiter = ResponseWaiter::new(rx, Duration::from_millis(10));

        let pattern = Regex::new(r"(?i)49 02").unwrap();
        let err = waiter
            .wait_line(&LineMatcher::regex(pattern))
            .await
            .unwrap_err();
        match err {
            ScanError::Timeout { predicate, .. } => assert_eq!(predicate, "(?i)49 02"),
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
