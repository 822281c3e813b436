//! Resolver chain tests
//!
//! Precedence, short-circuiting, fallback delegation, credential erasure and
//! event publication through the public API.
//!
//! Run: cargo nextest run --test resolver_chain

use std::collections::HashMap;
use std::sync::Arc;

use gatekeeper::auth::{
    AccountStatus, AuthError, AuthResult, Authentication, AuthenticationDetails,
    AuthenticationManager, AuthenticationStrategy, AuthenticationToken, ChainResolver,
    CredentialKind, MetricsEventSink, RecordingEventSink, ResolverBuilder, StrategyConfigurer,
};
use gatekeeper::config::{MemoryConfigProvider, SecuritySettings};
use gatekeeper::SecurityContext;
use parking_lot::Mutex;
use secrecy::ExposeSecret;

/// Password check against a fixed user table, recording who was asked.
struct UserTable {
    name: &'static str,
    users: HashMap<&'static str, &'static str>,
    locked: Vec<&'static str>,
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl UserTable {
    fn new(name: &'static str, log: &Arc<Mutex<Vec<&'static str>>>) -> Self {
        Self {
            name,
            users: HashMap::new(),
            locked: Vec::new(),
            log: log.clone(),
        }
    }

    fn user(mut self, user: &'static str, password: &'static str) -> Self {
        self.users.insert(user, password);
        self
    }

    fn locked(mut self, user: &'static str) -> Self {
        self.locked.push(user);
        self
    }
}

impl AuthenticationStrategy for UserTable {
    fn name(&self) -> &str {
        self.name
    }

    fn supports(&self, kind: CredentialKind) -> bool {
        kind == CredentialKind::USERNAME_PASSWORD
    }

    fn authenticate(
        &self,
        credential: &dyn Authentication,
    ) -> AuthResult<Option<Box<dyn Authentication>>> {
        self.log.lock().push(self.name);
        let user = credential.name();
        if self.locked.iter().any(|u| *u == user) {
            return Err(AuthError::account_status(AccountStatus::Locked, user));
        }
        let Some(expected) = self.users.get(user) else {
            return Err(AuthError::bad_credentials(format!("{} unknown to {}", user, self.name)));
        };
        let presented = credential.credentials().map(|s| s.expose_secret().to_string());
        if presented.as_deref() != Some(*expected) {
            return Err(AuthError::bad_credentials(format!("wrong password for {}", user)));
        }
        let token = AuthenticationToken::authenticated(
            CredentialKind::USERNAME_PASSWORD,
            user,
            [format!("ROLE_{}", self.name.to_uppercase())],
        )
        .with_credentials(*expected);
        Ok(Some(Box::new(token)))
    }
}

fn init_logs() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn login(user: &str, password: &str) -> AuthenticationToken {
    AuthenticationToken::unauthenticated(CredentialKind::USERNAME_PASSWORD, user, password)
}

fn new_log() -> Arc<Mutex<Vec<&'static str>>> {
    Arc::new(Mutex::new(Vec::new()))
}

fn fallback<F>(f: F) -> Arc<dyn AuthenticationManager>
where
    F: Fn(&dyn Authentication) -> AuthResult<Box<dyn Authentication>> + Send + Sync + 'static,
{
    Arc::new(f)
}

// =============================================================================
// Precedence
// =============================================================================

mod precedence {
    use super::*;

    #[test]
    fn test_first_success_wins_and_later_strategies_skipped() {
        init_logs();
        let log = new_log();
        let resolver = ChainResolver::builder()
            .strategy(Arc::new(UserTable::new("ldap", &log)))
            .strategy(Arc::new(UserTable::new("db", &log).user("alice", "pw")))
            .strategy(Arc::new(UserTable::new("cache", &log).user("alice", "pw")))
            .build()
            .unwrap();

        let result = resolver.resolve(&login("alice", "pw")).unwrap();
        assert_eq!(result.authorities(), ["ROLE_DB".to_string()]);
        assert_eq!(*log.lock(), vec!["ldap", "db"]);
    }

    #[test]
    fn test_account_status_stops_chain() {
        let log = new_log();
        let fallback_called = Arc::new(Mutex::new(false));
        let flag = fallback_called.clone();
        let resolver = ChainResolver::builder()
            .strategy(Arc::new(UserTable::new("ldap", &log).locked("alice")))
            .strategy(Arc::new(UserTable::new("db", &log).user("alice", "pw")))
            .fallback(fallback(move |c| {
                *flag.lock() = true;
                Err(AuthError::provider_not_found(c.kind()))
            }))
            .build()
            .unwrap();

        let err = resolver.resolve(&login("alice", "pw")).unwrap_err();
        assert!(matches!(err, AuthError::AccountStatus { status: AccountStatus::Locked, .. }));
        assert_eq!(*log.lock(), vec!["ldap"]);
        assert!(!*fallback_called.lock());
    }

    #[test]
    fn test_only_last_rejection_is_reported() {
        let log = new_log();
        let resolver = ChainResolver::builder()
            .strategy(Arc::new(UserTable::new("ldap", &log)))
            .strategy(Arc::new(UserTable::new("db", &log).user("alice", "other")))
            .build()
            .unwrap();

        let err = resolver.resolve(&login("alice", "pw")).unwrap_err();
        assert_eq!(err.to_string(), "Bad credentials: wrong password for alice");
    }

    #[test]
    fn test_unsupported_kind_without_fallback() {
        let log = new_log();
        let resolver = ChainResolver::builder()
            .strategy(Arc::new(UserTable::new("db", &log).user("svc", "t")))
            .build()
            .unwrap();
        let bearer = AuthenticationToken::unauthenticated(CredentialKind::BEARER_TOKEN, "svc", "t");

        let err = resolver.resolve(&bearer).unwrap_err();
        assert!(matches!(
            err,
            AuthError::ProviderNotFound { kind } if kind == CredentialKind::BEARER_TOKEN
        ));
        assert!(log.lock().is_empty());
    }
}

// =============================================================================
// Fallback
// =============================================================================

mod delegation {
    use super::*;

    #[test]
    fn test_fallback_only_when_chain_exhausted() {
        init_logs();
        let log = new_log();
        let calls = Arc::new(Mutex::new(0usize));
        let counter = calls.clone();
        let resolver = ChainResolver::builder()
            .strategy(Arc::new(UserTable::new("db", &log).user("alice", "pw")))
            .fallback(fallback(move |c| {
                *counter.lock() += 1;
                Ok(Box::new(AuthenticationToken::authenticated(
                    c.kind(),
                    "parent",
                    ["ROLE_PARENT"],
                )))
            }))
            .build()
            .unwrap();

        assert_eq!(resolver.resolve(&login("alice", "pw")).unwrap().name(), "alice");
        assert_eq!(*calls.lock(), 0);

        assert_eq!(resolver.resolve(&login("bob", "pw")).unwrap().name(), "parent");
        assert_eq!(*calls.lock(), 1);
    }

    #[test]
    fn test_empty_chain_uses_fallback() {
        let resolver = ChainResolver::builder()
            .fallback(fallback(|c| {
                Ok(Box::new(AuthenticationToken::authenticated(c.kind(), c.name(), ["ROLE_USER"])))
            }))
            .build()
            .unwrap();

        assert!(resolver.resolve(&login("carol", "pw")).unwrap().is_authenticated());
        assert!(resolver.strategies().is_empty());
    }

    #[test]
    fn test_events_published_once_across_nested_resolvers() {
        let log = new_log();
        let parent_events = Arc::new(RecordingEventSink::new());
        let child_events = Arc::new(RecordingEventSink::new());

        let parent = ChainResolver::builder()
            .strategy(Arc::new(UserTable::new("parent", &log).user("bob", "pw")))
            .event_sink(parent_events.clone())
            .build()
            .unwrap();
        let child = ChainResolver::builder()
            .strategy(Arc::new(UserTable::new("child", &log).user("alice", "pw")))
            .fallback(Arc::new(parent))
            .event_sink(child_events.clone())
            .build()
            .unwrap();

        child.resolve(&login("bob", "pw")).unwrap();
        assert_eq!(parent_events.successes(), 1);
        assert_eq!(child_events.successes(), 0);

        child.resolve(&login("mallory", "pw")).unwrap_err();
        assert_eq!(parent_events.failures(), 1);
        assert_eq!(child_events.failures(), 0);

        child.resolve(&login("alice", "pw")).unwrap();
        assert_eq!(child_events.successes(), 1);
    }
}

// =============================================================================
// Results
// =============================================================================

mod results {
    use super::*;

    #[test]
    fn test_credentials_scrubbed_unless_retained() {
        let log = new_log();
        let erasing = ChainResolver::builder()
            .strategy(Arc::new(UserTable::new("db", &log).user("alice", "pw")))
            .build()
            .unwrap();
        assert!(erasing.resolve(&login("alice", "pw")).unwrap().credentials().is_none());

        let retaining = ChainResolver::builder()
            .strategy(Arc::new(UserTable::new("db", &log).user("alice", "pw")))
            .retain_credentials(true)
            .build()
            .unwrap();
        let result = retaining.resolve(&login("alice", "pw")).unwrap();
        assert_eq!(result.credentials().unwrap().expose_secret(), "pw");
    }

    #[tokio::test]
    async fn test_settings_control_erasure() {
        let provider = MemoryConfigProvider::new().value("security.erase_credentials", "false");
        let settings = SecuritySettings::load(&provider).await.unwrap();

        let log = new_log();
        let resolver = ChainResolver::builder()
            .strategy(Arc::new(UserTable::new("db", &log).user("alice", "pw")))
            .settings(&settings)
            .build()
            .unwrap();
        assert!(resolver.retains_credentials());
    }

    #[test]
    fn test_details_carried_to_result() {
        let log = new_log();
        let resolver = ChainResolver::builder()
            .strategy(Arc::new(UserTable::new("db", &log).user("alice", "pw")))
            .build()
            .unwrap();
        let details = AuthenticationDetails::new()
            .remote_address("203.0.113.9")
            .session_id("s-1");

        let result = resolver
            .resolve(&login("alice", "pw").with_details(details.clone()))
            .unwrap();
        assert_eq!(result.details(), Some(&details));
    }

    #[test]
    fn test_resolve_into_context() {
        let log = new_log();
        let resolver = ChainResolver::builder()
            .strategy(Arc::new(UserTable::new("db", &log).user("alice", "pw")))
            .build()
            .unwrap();
        let mut ctx = SecurityContext::empty();

        assert!(resolver.resolve_into(&mut ctx, &login("alice", "nope")).is_err());
        assert!(ctx.authentication().is_none());

        resolver.resolve_into(&mut ctx, &login("alice", "pw")).unwrap();
        assert!(ctx.is_authenticated());
        assert_eq!(ctx.authentication().unwrap().name(), "alice");
    }

    #[test]
    fn test_metrics_sink_counts_outcomes() {
        let log = new_log();
        let metrics = Arc::new(MetricsEventSink::new());
        let resolver = ChainResolver::builder()
            .strategy(Arc::new(UserTable::new("db", &log).user("alice", "pw").locked("bob")))
            .event_sink(metrics.clone())
            .build()
            .unwrap();

        resolver.resolve(&login("alice", "pw")).unwrap();
        resolver.resolve(&login("alice", "bad")).unwrap_err();
        resolver.resolve(&login("bob", "pw")).unwrap_err();

        assert_eq!(metrics.successes.get(), 1);
        assert_eq!(metrics.failures.get(), 2);
        assert_eq!(metrics.failures_for("account_status"), 1);
        assert_eq!(metrics.failures_for("rejected"), 1);
    }
}

// =============================================================================
// Concurrency and builder integration
// =============================================================================

mod integration {
    use super::*;

    #[test]
    fn test_resolver_shared_across_threads() {
        let log = new_log();
        let resolver = Arc::new(
            ChainResolver::builder()
                .strategy(Arc::new(UserTable::new("db", &log).user("alice", "pw")))
                .build()
                .unwrap(),
        );

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let resolver = resolver.clone();
                std::thread::spawn(move || {
                    let password = if i % 2 == 0 { "pw" } else { "wrong" };
                    resolver.resolve(&login("alice", password)).is_ok()
                })
            })
            .collect();
        let ok = handles
            .into_iter()
            .filter_map(|h| h.join().ok())
            .filter(|ok| *ok)
            .count();

        assert_eq!(ok, 4);
        assert_eq!(log.lock().len(), 8);
    }

    #[test]
    fn test_resolver_from_configured_builder() {
        let log = new_log();
        let builder = ResolverBuilder::configured();
        builder
            .register(StrategyConfigurer::new(Arc::new(UserTable::new("ldap", &log))))
            .unwrap();
        builder
            .register(StrategyConfigurer::new(Arc::new(
                UserTable::new("db", &log).user("alice", "pw"),
            )))
            .unwrap();

        let resolver = builder.build().unwrap();
        assert!(Arc::ptr_eq(&resolver, &builder.build().unwrap()));
        assert_eq!(resolver.resolve(&login("alice", "pw")).unwrap().name(), "alice");
        assert_eq!(*log.lock(), vec!["ldap", "db"]);
    }
}
