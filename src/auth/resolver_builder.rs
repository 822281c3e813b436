//! Assembling a [`ChainResolver`] from configurers.

use std::sync::Arc;

use super::{AuthenticationEventSink, AuthenticationManager, AuthenticationStrategy, ChainResolver};
use crate::builder::{BuildTarget, BuilderContext, ConfiguredBuilder, Configurer};
use crate::config::SecuritySettings;
use crate::Result;

/// Build target collecting everything a [`ChainResolver`] needs.
///
/// ```rust
/// use std::sync::Arc;
/// use gatekeeper::auth::{
///     AuthError, AuthResult, Authentication, FallbackConfigurer, ResolverBuilder,
/// };
///
/// # fn main() -> gatekeeper::Result<()> {
/// let builder = ResolverBuilder::configured();
/// builder.register(FallbackConfigurer::new(Arc::new(
///     |c: &dyn Authentication| -> AuthResult<Box<dyn Authentication>> {
///         Err(AuthError::provider_not_found(c.kind()))
///     },
/// )))?;
/// let resolver = builder.build()?;
/// assert!(resolver.fallback().is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ResolverBuilder {
    strategies: Vec<Arc<dyn AuthenticationStrategy>>,
    fallback: Option<Arc<dyn AuthenticationManager>>,
    event_sink: Option<Arc<dyn AuthenticationEventSink>>,
    retain_credentials: bool,
}

impl ResolverBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A configured builder where same-kind configurers accumulate, so
    /// several [`StrategyConfigurer`]s can each contribute strategies.
    pub fn configured() -> ConfiguredBuilder<Self> {
        ConfiguredBuilder::accumulating(Self::new())
    }

    pub fn from_settings(settings: &SecuritySettings) -> ConfiguredBuilder<Self> {
        let target = Self {
            retain_credentials: !settings.erase_credentials,
            ..Self::default()
        };
        ConfiguredBuilder::from_settings(target, settings)
    }

    pub fn add_strategy(&mut self, strategy: Arc<dyn AuthenticationStrategy>) -> &mut Self {
        self.strategies.push(strategy);
        self
    }

    pub fn set_fallback(&mut self, fallback: Arc<dyn AuthenticationManager>) -> &mut Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn set_event_sink(&mut self, sink: Arc<dyn AuthenticationEventSink>) -> &mut Self {
        self.event_sink = Some(sink);
        self
    }

    pub fn set_retain_credentials(&mut self, retain: bool) -> &mut Self {
        self.retain_credentials = retain;
        self
    }

    /// True once there is at least one strategy or a fallback.
    pub fn is_configured(&self) -> bool {
        !self.strategies.is_empty() || self.fallback.is_some()
    }

    pub fn strategy_count(&self) -> usize {
        self.strategies.len()
    }
}

impl BuildTarget for ResolverBuilder {
    type Output = Arc<ChainResolver>;

    fn perform_build(ctx: &mut BuilderContext<'_, Self>) -> Result<Self::Output> {
        let target = ctx.target_mut();
        if !target.is_configured() {
            tracing::debug!("No authentication strategies and no fallback manager defined");
        }

        let mut builder = ChainResolver::builder()
            .strategies(std::mem::take(&mut target.strategies))
            .retain_credentials(target.retain_credentials);
        if let Some(fallback) = target.fallback.take() {
            builder = builder.fallback(fallback);
        }
        if let Some(sink) = target.event_sink.take() {
            builder = builder.event_sink(sink);
        }

        let resolver = builder.build()?;
        Ok(Arc::new(ctx.post_process(resolver)))
    }
}

/// Contributes strategies, in order, during the configuring stage.
pub struct StrategyConfigurer {
    strategies: Vec<Arc<dyn AuthenticationStrategy>>,
}

impl StrategyConfigurer {
    pub fn new(strategy: Arc<dyn AuthenticationStrategy>) -> Self {
        Self {
            strategies: vec![strategy],
        }
    }

    pub fn with(mut self, strategy: Arc<dyn AuthenticationStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }
}

impl FromIterator<Arc<dyn AuthenticationStrategy>> for StrategyConfigurer {
    fn from_iter<I: IntoIterator<Item = Arc<dyn AuthenticationStrategy>>>(iter: I) -> Self {
        Self {
            strategies: iter.into_iter().collect(),
        }
    }
}

impl Configurer<ResolverBuilder> for StrategyConfigurer {
    fn configure(&self, ctx: &mut BuilderContext<'_, ResolverBuilder>) -> Result<()> {
        let target = ctx.target_mut();
        for strategy in &self.strategies {
            target.add_strategy(strategy.clone());
        }
        Ok(())
    }
}

/// Sets the fallback manager.
pub struct FallbackConfigurer {
    fallback: Arc<dyn AuthenticationManager>,
}

impl FallbackConfigurer {
    pub fn new(fallback: Arc<dyn AuthenticationManager>) -> Self {
        Self { fallback }
    }
}

impl Configurer<ResolverBuilder> for FallbackConfigurer {
    fn configure(&self, ctx: &mut BuilderContext<'_, ResolverBuilder>) -> Result<()> {
        ctx.target_mut().set_fallback(self.fallback.clone());
        Ok(())
    }
}

pub struct EventSinkConfigurer {
    sink: Arc<dyn AuthenticationEventSink>,
}

impl EventSinkConfigurer {
    pub fn new(sink: Arc<dyn AuthenticationEventSink>) -> Self {
        Self { sink }
    }
}

impl Configurer<ResolverBuilder> for EventSinkConfigurer {
    fn configure(&self, ctx: &mut BuilderContext<'_, ResolverBuilder>) -> Result<()> {
        ctx.target_mut().set_event_sink(self.sink.clone());
        Ok(())
    }
}

/// Publishes [`SecuritySettings`] as a shared object during init and
/// applies the credential-erasure flag during configure. Other configurers
/// can read the settings from the shared table once init has run.
pub struct SettingsConfigurer {
    settings: SecuritySettings,
}

impl SettingsConfigurer {
    pub fn new(settings: SecuritySettings) -> Self {
        Self { settings }
    }
}

impl Configurer<ResolverBuilder> for SettingsConfigurer {
    fn init(&self, ctx: &mut BuilderContext<'_, ResolverBuilder>) -> Result<()> {
        ctx.set_shared(self.settings.clone());
        Ok(())
    }

    fn configure(&self, ctx: &mut BuilderContext<'_, ResolverBuilder>) -> Result<()> {
        let settings = ctx.required_shared::<SecuritySettings>()?;
        ctx.target_mut()
            .set_retain_credentials(!settings.erase_credentials);
        Ok(())
    }
}
