//! Reconnecting stream client.
//!
//! The client owns one background task per `start`. The task runs the
//! connection state machine:
//!
//! ```text
//! Disconnected -> Connecting -> Connected
//!                     ^             |
//!                     +-- backoff <-+   (any transport error or stream end)
//! any state -> Stopping -> Disconnected  (stop)
//! ```
//!
//! Classified events and status notices are sent to the consumer over an
//! unbounded channel, so a slow consumer never stalls the socket read.

use std::sync::Arc;
use std::time::Duration;

use eureka_core::EventClassifier;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::StreamConfig;
use crate::error::StreamError;
use crate::protocol;
use crate::state::{ConnectionState, FeedUpdate, StatusUpdate};
use crate::transport::{Connector, Transport};

/// Upper bound on the close handshake of a finished connection.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Best-effort persistent subscription to the overlay plugin's log lines.
///
/// `start` must be called from within a tokio runtime.
pub struct StreamClient {
    config: StreamConfig,
    classifier: EventClassifier,
    connector: Arc<dyn Connector>,
    state: Arc<watch::Sender<ConnectionState>>,
    running: Option<Running>,
}

struct Running {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl StreamClient {
    pub fn new(config: StreamConfig, classifier: EventClassifier, connector: impl Connector) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            config,
            classifier,
            connector: Arc::new(connector),
            state: Arc::new(state),
            running: None,
        }
    }

    pub const fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Latest published connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Receiver that observes every state change.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Whether a background task is currently alive.
    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.task.is_finished())
    }

    /// Spawns the connection task, delivering updates to `updates`.
    ///
    /// Returns `false` without doing anything if a task is already running.
    pub fn start(&mut self, updates: mpsc::UnboundedSender<FeedUpdate>) -> bool {
        if self.is_running() {
            debug!("stream client already running");
            return false;
        }

        let (shutdown, shutdown_rx) = watch::channel(false);
        let worker = Worker {
            config: self.config.clone(),
            classifier: self.classifier.clone(),
            connector: Arc::clone(&self.connector),
            state: Arc::clone(&self.state),
            updates,
        };
        let task = tokio::spawn(worker.run(ShutdownSignal(shutdown_rx)));
        self.running = Some(Running { shutdown, task });
        true
    }

    /// Stops the connection task and waits for it to exit.
    ///
    /// Once this returns no further updates will be sent. Safe to call
    /// repeatedly or on a client that was never started.
    pub async fn stop(&mut self) {
        let Some(Running { shutdown, mut task }) = self.running.take() else {
            debug!("stop requested but stream client is not running");
            return;
        };

        shutdown.send_replace(true);
        match timeout(self.config.stop_timeout(), &mut task).await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => warn!(%error, "stream task ended abnormally"),
            Err(_) => {
                warn!(
                    timeout_ms = self.config.stop_timeout_ms,
                    "stream task did not stop in time, aborting"
                );
                task.abort();
                let _ = task.await;
            }
        }
        self.state.send_replace(ConnectionState::Disconnected);
    }
}

impl Drop for StreamClient {
    fn drop(&mut self) {
        // The detached task observes the flag and exits on its own.
        if let Some(running) = self.running.take() {
            running.shutdown.send_replace(true);
        }
    }
}

/// Receiving half of the stop flag.
struct ShutdownSignal(watch::Receiver<bool>);

impl ShutdownSignal {
    fn is_requested(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once stop is requested or the client is gone.
    async fn requested(&mut self) {
        let _ = self.0.wait_for(|stop| *stop).await;
    }

    /// Sleeps for `delay`. Returns `false` if stop interrupted the wait.
    async fn sleep(&mut self, delay: Duration) -> bool {
        tokio::select! {
            biased;
            () = self.requested() => false,
            () = tokio::time::sleep(delay) => true,
        }
    }
}

/// Why a single connection ended.
enum SessionEnd {
    Shutdown,
    ConsumerGone,
    Lost(StreamError),
}

struct Worker {
    config: StreamConfig,
    classifier: EventClassifier,
    connector: Arc<dyn Connector>,
    state: Arc<watch::Sender<ConnectionState>>,
    updates: mpsc::UnboundedSender<FeedUpdate>,
}

impl Worker {
    async fn run(self, mut shutdown: ShutdownSignal) {
        info!(url = %self.config.url, "stream client started");

        while !shutdown.is_requested() {
            let connecting = StatusUpdate::Connecting {
                url: self.config.url.clone(),
            };
            if !self.report(connecting) {
                break;
            }

            let error = match self.connect_and_listen(&mut shutdown).await {
                SessionEnd::Shutdown | SessionEnd::ConsumerGone => break,
                SessionEnd::Lost(error) => error,
            };
            if shutdown.is_requested() {
                break;
            }

            let delay = self.config.reconnect_backoff();
            warn!(
                url = %self.config.url,
                %error,
                delay_ms = self.config.reconnect_backoff_ms,
                "connection lost, retrying"
            );
            let retrying = StatusUpdate::Retrying {
                delay,
                reason: error.to_string(),
            };
            if !self.report(retrying) || !shutdown.sleep(delay).await {
                break;
            }
        }

        self.state.send_replace(ConnectionState::Stopping);
        self.report(StatusUpdate::Stopped);
        info!(url = %self.config.url, "stream client stopped");
    }

    async fn connect_and_listen(&self, shutdown: &mut ShutdownSignal) -> SessionEnd {
        let attempt = timeout(
            self.config.connect_timeout(),
            self.connector.connect(&self.config.url),
        );
        let connected = tokio::select! {
            biased;
            () = shutdown.requested() => return SessionEnd::Shutdown,
            result = attempt => result,
        };
        let mut transport = match connected {
            Ok(Ok(transport)) => transport,
            Ok(Err(error)) => return SessionEnd::Lost(error),
            Err(_) => {
                return SessionEnd::Lost(StreamError::ConnectTimeout(
                    self.config.connect_timeout(),
                ));
            }
        };

        let end = self.listen(transport.as_mut(), shutdown).await;
        if matches!(end, SessionEnd::Shutdown) {
            self.state.send_replace(ConnectionState::Stopping);
        }
        if timeout(CLOSE_TIMEOUT, transport.close()).await.is_err() {
            debug!("close handshake timed out");
        }
        end
    }

    async fn listen(&self, transport: &mut dyn Transport, shutdown: &mut ShutdownSignal) -> SessionEnd {
        let request = match protocol::subscribe_request() {
            Ok(request) => request,
            Err(error) => return SessionEnd::Lost(error.into()),
        };
        let sent = tokio::select! {
            biased;
            () = shutdown.requested() => return SessionEnd::Shutdown,
            result = transport.send_text(request) => result,
        };
        if let Err(error) = sent {
            return SessionEnd::Lost(error);
        }

        info!(url = %self.config.url, "subscribed to log lines");
        if !self.report(StatusUpdate::Connected) {
            return SessionEnd::ConsumerGone;
        }

        loop {
            let next = tokio::select! {
                biased;
                () = shutdown.requested() => return SessionEnd::Shutdown,
                next = transport.recv() => next,
            };
            match next {
                Some(Ok(text)) => {
                    if !self.dispatch(&text) {
                        return SessionEnd::ConsumerGone;
                    }
                }
                Some(Err(error)) => return SessionEnd::Lost(error),
                None => return SessionEnd::Lost(StreamError::Closed),
            }
        }
    }

    /// Classifies one inbound message. Returns `false` if the consumer is gone.
    fn dispatch(&self, text: &str) -> bool {
        let Some(line) = protocol::decode_log_line(text) else {
            return true;
        };
        let Some(event) = self.classifier.classify(&line) else {
            return true;
        };
        debug!(?event, "classified log line");
        self.deliver(FeedUpdate::Event(event))
    }

    /// Publishes the status's state and forwards it to the consumer.
    fn report(&self, status: StatusUpdate) -> bool {
        self.state.send_replace(status.state());
        debug!(%status, "status changed");
        self.deliver(FeedUpdate::Status(status))
    }

    fn deliver(&self, update: FeedUpdate) -> bool {
        if self.updates.send(update).is_err() {
            warn!("update receiver dropped; stopping stream client");
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use eureka_core::DomainEvent;
    use tokio::time::Instant;

    use super::*;

    const TS: &str = "2024-01-01T13:45:09.123Z";

    #[derive(Default)]
    struct Log {
        attempts: Vec<Instant>,
        sent: Vec<String>,
        closes: usize,
    }

    struct FakeTransport {
        incoming: mpsc::UnboundedReceiver<String>,
        log: Arc<Mutex<Log>>,
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn send_text(&mut self, text: String) -> Result<(), StreamError> {
            self.log.lock().unwrap().sent.push(text);
            Ok(())
        }

        async fn recv(&mut self) -> Option<Result<String, StreamError>> {
            self.incoming.recv().await.map(Ok)
        }

        async fn close(&mut self) {
            self.log.lock().unwrap().closes += 1;
        }
    }

    /// Hands out one scripted session per attempt, then refuses.
    struct FakeConnector {
        sessions: Mutex<VecDeque<mpsc::UnboundedReceiver<String>>>,
        log: Arc<Mutex<Log>>,
    }

    #[async_trait]
    impl Connector for FakeConnector {
        async fn connect(&self, _url: &str) -> Result<Box<dyn Transport>, StreamError> {
            self.log.lock().unwrap().attempts.push(Instant::now());
            let next = self.sessions.lock().unwrap().pop_front();
            match next {
                Some(incoming) => Ok(Box::new(FakeTransport {
                    incoming,
                    log: Arc::clone(&self.log),
                })),
                None => Err(io::Error::from(io::ErrorKind::ConnectionRefused).into()),
            }
        }
    }

    struct HangingConnector;

    #[async_trait]
    impl Connector for HangingConnector {
        async fn connect(&self, _url: &str) -> Result<Box<dyn Transport>, StreamError> {
            std::future::pending().await
        }
    }

    fn fake_client(
        sessions: usize,
    ) -> (
        StreamClient,
        Vec<mpsc::UnboundedSender<String>>,
        Arc<Mutex<Log>>,
    ) {
        let log = Arc::new(Mutex::new(Log::default()));
        let mut senders = Vec::new();
        let mut receivers = VecDeque::new();
        for _ in 0..sessions {
            let (tx, rx) = mpsc::unbounded_channel();
            senders.push(tx);
            receivers.push_back(rx);
        }
        let connector = FakeConnector {
            sessions: Mutex::new(receivers),
            log: Arc::clone(&log),
        };
        let client = StreamClient::new(
            StreamConfig::default(),
            EventClassifier::default(),
            connector,
        );
        (client, senders, log)
    }

    fn log_line(fields: &[&str]) -> String {
        serde_json::json!({"type": "LogLine", "line": fields}).to_string()
    }

    async fn next_update(rx: &mut mpsc::UnboundedReceiver<FeedUpdate>) -> FeedUpdate {
        timeout(Duration::from_secs(60), rx.recv())
            .await
            .expect("timed out waiting for update")
            .expect("update channel closed")
    }

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<FeedUpdate>) -> DomainEvent {
        loop {
            if let FeedUpdate::Event(event) = next_update(rx).await {
                return event;
            }
        }
    }

    /// Drains until the worker drops its sender.
    async fn drain(rx: &mut mpsc::UnboundedReceiver<FeedUpdate>) -> Vec<FeedUpdate> {
        let mut rest = Vec::new();
        while let Some(update) = rx.recv().await {
            rest.push(update);
        }
        rest
    }

    #[tokio::test(start_paused = true)]
    async fn delivers_tracked_events_and_skips_noise() {
        let (mut client, senders, log) = fake_client(1);
        let (tx, mut rx) = mpsc::unbounded_channel();
        assert!(client.start(tx));

        assert!(matches!(
            next_update(&mut rx).await,
            FeedUpdate::Status(StatusUpdate::Connecting { .. })
        ));
        assert_eq!(
            next_update(&mut rx).await,
            FeedUpdate::Status(StatusUpdate::Connected)
        );
        assert_eq!(client.state(), ConnectionState::Connected);

        let feed = &senders[0];
        feed.send("not json".into()).unwrap();
        feed.send(r#"{"type":"ChangeZone","zoneID":1}"#.into()).unwrap();
        feed.send(r#"{"type":"LogLine","line":[]}"#.into()).unwrap();
        feed.send(log_line(&["21", TS, "1", "Me", "7489", "Unrelated Skill"])).unwrap();
        feed.send(log_line(&["21", TS, "1"])).unwrap();
        feed.send(log_line(&["21", TS, "1", "Me", "7489", "Solid Reason"])).unwrap();
        feed.send(log_line(&["26", TS, "e1", "Eureka Moment", "10.00"])).unwrap();

        assert_eq!(
            next_event(&mut rx).await,
            DomainEvent::AbilityUse {
                name: "Solid Reason".into(),
                timestamp: TS.into()
            }
        );
        assert_eq!(
            next_event(&mut rx).await,
            DomainEvent::StatusGain {
                name: "Eureka Moment".into(),
                timestamp: TS.into()
            }
        );

        client.stop().await;
        assert_eq!(
            drain(&mut rx).await,
            vec![FeedUpdate::Status(StatusUpdate::Stopped)]
        );
        assert_eq!(client.state(), ConnectionState::Disconnected);

        let log = log.lock().unwrap();
        assert_eq!(log.attempts.len(), 1);
        assert_eq!(
            log.sent,
            vec![r#"{"call":"subscribe","events":["LogLine"]}"#.to_string()]
        );
        assert_eq!(log.closes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_at_backoff_interval_until_stopped() {
        let (mut client, _senders, log) = fake_client(0);
        let backoff = client.config().reconnect_backoff();
        let (tx, mut rx) = mpsc::unbounded_channel();
        client.start(tx);

        tokio::time::sleep(backoff * 3 + backoff / 2).await;
        let before_stop = Instant::now();
        client.stop().await;
        assert!(before_stop.elapsed() < backoff, "stop waited out the backoff");

        let attempts = log.lock().unwrap().attempts.clone();
        assert!(
            (3..=4).contains(&attempts.len()),
            "expected 3-4 attempts, got {}",
            attempts.len()
        );
        for pair in attempts.windows(2) {
            assert!(pair[1] - pair[0] >= backoff, "attempts closer than backoff");
        }

        let updates = drain(&mut rx).await;
        let retries = updates
            .iter()
            .filter(|update| matches!(update, FeedUpdate::Status(StatusUpdate::Retrying { .. })))
            .count();
        assert_eq!(retries, attempts.len());
        assert!(!updates.iter().any(|update| matches!(update, FeedUpdate::Event(_))));
        assert_eq!(updates.last(), Some(&FeedUpdate::Status(StatusUpdate::Stopped)));
        assert_eq!(log.lock().unwrap().closes, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reconnects_after_stream_end() {
        let (mut client, mut senders, log) = fake_client(2);
        let backoff = client.config().reconnect_backoff();
        let (tx, mut rx) = mpsc::unbounded_channel();
        client.start(tx);

        let second = senders.pop().unwrap();
        let first = senders.pop().unwrap();
        first
            .send(log_line(&["21", TS, "1", "Me", "7490", "Ageless Words"]))
            .unwrap();
        assert_eq!(next_event(&mut rx).await.name(), "Ageless Words");

        // Peer goes away.
        drop(first);
        loop {
            if let FeedUpdate::Status(StatusUpdate::Retrying { delay, .. }) = next_update(&mut rx).await {
                assert_eq!(delay, backoff);
                break;
            }
        }

        second
            .send(log_line(&["26", TS, "e1", "Eureka Moment"]))
            .unwrap();
        assert_eq!(next_event(&mut rx).await.name(), "Eureka Moment");
        client.stop().await;

        let log = log.lock().unwrap();
        assert_eq!(log.attempts.len(), 2);
        assert!(log.attempts[1] - log.attempts[0] >= backoff);
        assert_eq!(log.sent.len(), 2, "subscription is resent on every connection");
        assert_eq!(log.closes, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_idempotent_and_stop_is_repeatable() {
        let (mut client, _senders, log) = fake_client(1);
        client.stop().await;

        let (tx, mut rx) = mpsc::unbounded_channel();
        assert!(client.start(tx.clone()));
        assert!(!client.start(tx));
        assert!(client.is_running());

        assert_eq!(
            next_update(&mut rx).await,
            FeedUpdate::Status(StatusUpdate::Connecting {
                url: client.config().url.clone()
            })
        );
        assert_eq!(next_update(&mut rx).await, FeedUpdate::Status(StatusUpdate::Connected));

        client.stop().await;
        client.stop().await;
        assert!(!client.is_running());

        let stopped = drain(&mut rx)
            .await
            .into_iter()
            .filter(|update| *update == FeedUpdate::Status(StatusUpdate::Stopped))
            .count();
        assert_eq!(stopped, 1);
        assert_eq!(log.lock().unwrap().attempts.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_interrupts_pending_connect() {
        let mut client = StreamClient::new(
            StreamConfig::default(),
            EventClassifier::default(),
            HangingConnector,
        );
        let mut state = client.watch_state();
        let (tx, mut rx) = mpsc::unbounded_channel();
        client.start(tx);
        assert!(matches!(
            next_update(&mut rx).await,
            FeedUpdate::Status(StatusUpdate::Connecting { .. })
        ));
        assert_eq!(*state.borrow_and_update(), ConnectionState::Connecting);

        let before_stop = Instant::now();
        client.stop().await;
        assert!(before_stop.elapsed() < client.config().connect_timeout());
        assert_eq!(client.state(), ConnectionState::Disconnected);
        assert_eq!(drain(&mut rx).await, vec![FeedUpdate::Status(StatusUpdate::Stopped)]);
    }

    #[tokio::test(start_paused = true)]
    async fn connect_timeout_counts_as_lost_connection() {
        let config = StreamConfig {
            connect_timeout_ms: 500,
            ..Default::default()
        };
        let mut client = StreamClient::new(config, EventClassifier::default(), HangingConnector);
        let (tx, mut rx) = mpsc::unbounded_channel();
        client.start(tx);

        loop {
            if let FeedUpdate::Status(StatusUpdate::Retrying { reason, .. }) = next_update(&mut rx).await {
                assert!(reason.contains("timed out"), "{reason}");
                break;
            }
        }
        client.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_receiver_ends_task() {
        let (mut client, senders, _log) = fake_client(1);
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        client.start(tx);

        timeout(Duration::from_secs(10), async {
            while client.is_running() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("task should exit once the receiver is gone");
        drop(senders);

        // A finished task does not block a fresh start.
        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(client.start(tx));
        client.stop().await;
    }
}
