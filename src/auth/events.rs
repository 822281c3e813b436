//! Outcome notification for the chain resolver.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

use super::{AuthError, Authentication, CredentialKind};
use crate::observability::Counter;

/// Receives resolution outcomes. Implementations must not fail or panic;
/// the resolver does not look at what they do.
pub trait AuthenticationEventSink: Send + Sync {
    fn on_success(&self, result: &dyn Authentication);

    fn on_failure(&self, error: &AuthError, credential: &dyn Authentication);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventSink;

impl AuthenticationEventSink for NoopEventSink {
    fn on_success(&self, _result: &dyn Authentication) {}

    fn on_failure(&self, _error: &AuthError, _credential: &dyn Authentication) {}
}

/// Emits one `tracing` event per outcome.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl AuthenticationEventSink for TracingEventSink {
    fn on_success(&self, result: &dyn Authentication) {
        tracing::info!(
            principal = result.name(),
            kind = %result.kind(),
            authorities = result.authorities().len(),
            "Authentication succeeded"
        );
    }

    fn on_failure(&self, error: &AuthError, credential: &dyn Authentication) {
        tracing::warn!(
            principal = credential.name(),
            kind = %credential.kind(),
            category = error.label(),
            error = %error,
            "Authentication failed"
        );
    }
}

/// Success and failure counters, with failures split by error class.
#[derive(Default)]
pub struct MetricsEventSink {
    pub successes: Counter,
    pub failures: Counter,
    pub account_status_failures: Counter,
    pub internal_service_failures: Counter,
    pub rejected_failures: Counter,
    pub provider_not_found_failures: Counter,
}

impl MetricsEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Failure count for an [`AuthError::label`].
    pub fn failures_for(&self, label: &str) -> u64 {
        match label {
            "account_status" => self.account_status_failures.get(),
            "internal_service" => self.internal_service_failures.get(),
            "rejected" => self.rejected_failures.get(),
            "provider_not_found" => self.provider_not_found_failures.get(),
            _ => 0,
        }
    }
}

impl AuthenticationEventSink for MetricsEventSink {
    fn on_success(&self, _result: &dyn Authentication) {
        self.successes.inc();
    }

    fn on_failure(&self, error: &AuthError, _credential: &dyn Authentication) {
        self.failures.inc();
        match error {
            AuthError::AccountStatus { .. } => self.account_status_failures.inc(),
            AuthError::InternalService { .. } => self.internal_service_failures.inc(),
            AuthError::Rejected { .. } => self.rejected_failures.inc(),
            AuthError::ProviderNotFound { .. } => self.provider_not_found_failures.inc(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
}

/// One recorded resolution outcome.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticationEvent {
    pub id: Uuid,
    pub at: DateTime<Utc>,
    pub outcome: Outcome,
    pub principal: String,
    pub kind: CredentialKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<&'static str>,
}

impl AuthenticationEvent {
    fn new(outcome: Outcome, subject: &dyn Authentication, error: Option<&AuthError>) -> Self {
        Self {
            id: Uuid::new_v4(),
            at: Utc::now(),
            outcome,
            principal: subject.name().to_string(),
            kind: subject.kind(),
            error: error.map(ToString::to_string),
            category: error.map(AuthError::label),
        }
    }
}

const DEFAULT_CAPACITY: usize = 1024;

/// Keeps the most recent outcomes in memory, oldest dropped first.
pub struct RecordingEventSink {
    events: Mutex<VecDeque<AuthenticationEvent>>,
    capacity: usize,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY))),
            capacity: capacity.max(1),
        }
    }

    pub fn events(&self) -> Vec<AuthenticationEvent> {
        self.events.lock().iter().cloned().collect()
    }

    pub fn successes(&self) -> usize {
        self.count(Outcome::Success)
    }

    pub fn failures(&self) -> usize {
        self.count(Outcome::Failure)
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    fn count(&self, outcome: Outcome) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.outcome == outcome)
            .count()
    }

    fn record(&self, event: AuthenticationEvent) {
        let mut events = self.events.lock();
        if events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }
}

impl Default for RecordingEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthenticationEventSink for RecordingEventSink {
    fn on_success(&self, result: &dyn Authentication) {
        self.record(AuthenticationEvent::new(Outcome::Success, result, None));
    }

    fn on_failure(&self, error: &AuthError, credential: &dyn Authentication) {
        self.record(AuthenticationEvent::new(
            Outcome::Failure,
            credential,
            Some(error),
        ));
    }
}

/// Forwards every event to each inner sink in order.
#[derive(Default, Clone)]
pub struct CompositeEventSink {
    sinks: Vec<Arc<dyn AuthenticationEventSink>>,
}

impl CompositeEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn AuthenticationEventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn push(&mut self, sink: Arc<dyn AuthenticationEventSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl AuthenticationEventSink for CompositeEventSink {
    fn on_success(&self, result: &dyn Authentication) {
        for sink in &self.sinks {
            sink.on_success(result);
        }
    }

    fn on_failure(&self, error: &AuthError, credential: &dyn Authentication) {
        for sink in &self.sinks {
            sink.on_failure(error, credential);
        }
    }
}
