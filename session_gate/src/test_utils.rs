//! Test helpers shared by the unit tests in this crate.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

use crate::config::{BackendConfig, GateConfig};
use crate::storage::{SessionToken, SessionValidator, StorageError, ValidationOutcome};

/// Validator that returns a fixed outcome and counts how often it is asked.
#[derive(Clone)]
pub(crate) struct MockValidator {
    outcome: ValidationOutcome,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MockValidator {
    pub(crate) fn new(outcome: ValidationOutcome) -> Self {
        Self {
            outcome,
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn valid(identity: Option<&str>) -> Self {
        Self::new(ValidationOutcome::Valid {
            identity: identity.map(str::to_string),
        })
    }

    pub(crate) fn invalid() -> Self {
        Self::new(ValidationOutcome::Invalid)
    }

    pub(crate) fn unreachable() -> Self {
        Self::new(ValidationOutcome::BackendError(StorageError::Unreachable {
            backend: "mock:0".to_string(),
            message: "Connection refused".to_string(),
        }))
    }

    /// Answer only after `delay`.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn seen_tokens(&self) -> Vec<Vec<u8>> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SessionValidator for MockValidator {
    fn describe(&self) -> String {
        "mock:0".to_string()
    }

    async fn validate(&self, token: &SessionToken) -> ValidationOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(token.as_bytes().to_vec());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone()
    }
}

/// An enabled config with the default cookie name and redirect target.
pub(crate) fn enabled_config() -> GateConfig {
    GateConfig {
        enabled: true,
        backend: BackendConfig::Redis {
            host: "127.0.0.1".to_string(),
            port: 6379,
        },
        cookie_name: "ra_cookie".to_string(),
        redirect_target: "/auth".to_string(),
        identity_header: None,
        backend_timeout: None,
    }
}

/// Formatted log output collected from the current thread.
///
/// Install with [`CapturedLogs::install`] and keep the guard alive for as long
/// as events should be recorded. `#[tokio::test]` runs on the current thread,
/// so events from awaited futures are captured too.
#[derive(Clone, Default)]
pub(crate) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub(crate) fn install() -> (Self, DefaultGuard) {
        let logs = Self::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (logs, guard)
    }

    pub(crate) fn contents(&self) -> String {
        self.0
            .lock()
            .map(|buf| String::from_utf8_lossy(&buf).into_owned())
            .unwrap_or_default()
    }

    /// Lines logged at ERROR level.
    pub(crate) fn errors(&self) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.contains("ERROR"))
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Ok(mut inner) = self.0.lock() {
            inner.extend_from_slice(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
