//! The configurer-driven builder engine.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;

use super::configurer::ConfigurerRef;
use super::{
    BuildState, CompositePostProcessor, Configurer, ConfigurerKind, ObjectPostProcessor,
    SharedObjects,
};
use crate::config::SecuritySettings;
use crate::{Error, Result};

/// The concrete builder a [`ConfiguredBuilder`] drives.
///
/// Implementors hold whatever the configurers accumulate (reachable through
/// [`BuilderContext::target_mut`]) and turn it into the final object in
/// [`perform_build`](Self::perform_build).
pub trait BuildTarget: Send + Sized + 'static {
    /// The built object. Returned by clone on every later call, so use an
    /// `Arc` when callers need reference identity.
    type Output: Clone + Send + Sync + 'static;

    /// Runs after entering the initializing stage, before any `init`.
    fn before_init(_ctx: &mut BuilderContext<'_, Self>) -> Result<()> {
        Ok(())
    }

    /// Runs after entering the configuring stage, before any `configure`.
    fn before_configure(_ctx: &mut BuilderContext<'_, Self>) -> Result<()> {
        Ok(())
    }

    fn perform_build(ctx: &mut BuilderContext<'_, Self>) -> Result<Self::Output>;
}

fn single<C: 'static>(list: Vec<Arc<C>>) -> Result<Option<Arc<C>>> {
    match list.len() {
        0 => Ok(None),
        1 => Ok(list.into_iter().next()),
        n => Err(Error::illegal_state(format!(
            "only one configurer expected for {}, but got {}",
            ConfigurerKind::of::<C>(),
            n
        ))),
    }
}

struct BuilderCore<T: BuildTarget> {
    target: T,
    configurers: IndexMap<ConfigurerKind, Vec<ConfigurerRef<T>>>,
    added_in_initializing: Vec<ConfigurerRef<T>>,
    shared: SharedObjects,
    state: BuildState,
    allow_same_kind: bool,
    post_processor: CompositePostProcessor,
    object: Option<T::Output>,
}

impl<T: BuildTarget> BuilderCore<T> {
    fn add<C: Configurer<T>>(&mut self, configurer: Arc<C>) -> Result<()> {
        let entry = ConfigurerRef::new(configurer);
        if self.state.is_configured() {
            return Err(Error::illegal_state(format!(
                "cannot apply {} to a builder that is already {}",
                entry.kind, self.state
            )));
        }

        if self.allow_same_kind {
            self.configurers
                .entry(entry.kind)
                .or_default()
                .push(entry.clone());
        } else {
            self.configurers.insert(entry.kind, vec![entry.clone()]);
        }

        if self.state.is_initializing() {
            tracing::trace!(kind = %entry.kind, "Configurer registered while initializing");
            self.added_in_initializing.push(entry);
        }
        Ok(())
    }

    fn all_configurers(&self) -> Vec<ConfigurerRef<T>> {
        self.configurers.values().flatten().cloned().collect()
    }

    fn configurers_of<C: Configurer<T>>(&self) -> Vec<Arc<C>> {
        self.configurers
            .get(&ConfigurerKind::of::<C>())
            .map(|list| list.iter().filter_map(ConfigurerRef::downcast::<C>).collect())
            .unwrap_or_default()
    }

    fn remove_configurers_of<C: Configurer<T>>(&mut self) -> Vec<Arc<C>> {
        let kind = ConfigurerKind::of::<C>();
        let Some(removed) = self.configurers.shift_remove(&kind) else {
            return Vec::new();
        };
        self.added_in_initializing.retain(|entry| entry.kind != kind);
        removed.iter().filter_map(ConfigurerRef::downcast::<C>).collect()
    }

    fn build(&mut self) -> Result<T::Output> {
        match self.state {
            BuildState::Unbuilt => {}
            BuildState::Built => {
                return self
                    .object
                    .clone()
                    .ok_or_else(|| Error::illegal_state("builder is built but holds no object"));
            }
            aborted => {
                return Err(Error::illegal_state(format!(
                    "a previous build failed while {}; builders cannot be rebuilt",
                    aborted
                )));
            }
        }

        self.state = self.state.transition(BuildState::Initializing)?;
        T::before_init(&mut BuilderContext { core: &mut *self })?;
        self.init_configurers()?;

        self.state = self.state.transition(BuildState::Configuring)?;
        T::before_configure(&mut BuilderContext { core: &mut *self })?;
        self.configure_configurers()?;

        self.state = self.state.transition(BuildState::Building)?;
        let object = T::perform_build(&mut BuilderContext { core: &mut *self })?;
        self.object = Some(object.clone());

        self.state = self.state.transition(BuildState::Built)?;
        Ok(object)
    }

    fn init_configurers(&mut self) -> Result<()> {
        let registered = self.all_configurers();
        tracing::debug!(count = registered.len(), "Initializing configurers");
        for entry in &registered {
            entry.configurer.init(&mut BuilderContext { core: &mut *self })?;
        }

        // Configurers registered by the pass above get their init now; they
        // may not register any more.
        let late = std::mem::take(&mut self.added_in_initializing);
        if !late.is_empty() {
            tracing::debug!(count = late.len(), "Initializing late-registered configurers");
        }
        for entry in &late {
            entry.configurer.init(&mut BuilderContext { core: &mut *self })?;
        }

        if let Some(extra) = self.added_in_initializing.first() {
            return Err(Error::illegal_state(format!(
                "{} was registered while initializing late-registered configurers; \
                 nested registration is limited to one level",
                extra.kind
            )));
        }
        Ok(())
    }

    fn configure_configurers(&mut self) -> Result<()> {
        let registered = self.all_configurers();
        tracing::debug!(count = registered.len(), "Configuring configurers");
        for entry in &registered {
            entry.configurer.configure(&mut BuilderContext { core: &mut *self })?;
        }
        Ok(())
    }
}

/// What configurers and build hooks see while a build is running.
///
/// The owning builder's lock is held for the whole build, so every
/// mutation during a build goes through this handle.
pub struct BuilderContext<'a, T: BuildTarget> {
    core: &'a mut BuilderCore<T>,
}

impl<T: BuildTarget> BuilderContext<'_, T> {
    /// Registers another configurer. Allowed while initializing; the new
    /// configurer receives its `init` later in the same stage.
    pub fn register<C: Configurer<T>>(&mut self, configurer: C) -> Result<Arc<C>> {
        self.register_arc(Arc::new(configurer))
    }

    pub fn register_arc<C: Configurer<T>>(&mut self, configurer: Arc<C>) -> Result<Arc<C>> {
        self.core.add(configurer.clone())?;
        Ok(configurer)
    }

    pub fn set_shared<V: Send + Sync + 'static>(&mut self, value: V) -> Option<Arc<V>> {
        self.core.shared.insert(value)
    }

    pub fn shared<V: Send + Sync + 'static>(&self) -> Option<Arc<V>> {
        self.core.shared.get()
    }

    /// Like [`shared`](Self::shared), but a missing value is an error.
    pub fn required_shared<V: Send + Sync + 'static>(&self) -> Result<Arc<V>> {
        self.shared().ok_or_else(|| {
            Error::illegal_state(format!(
                "shared object {} has not been set",
                std::any::type_name::<V>()
            ))
        })
    }

    pub fn shared_objects(&self) -> &SharedObjects {
        &self.core.shared
    }

    pub fn configurers<C: Configurer<T>>(&self) -> Vec<Arc<C>> {
        self.core.configurers_of()
    }

    pub fn remove_configurers<C: Configurer<T>>(&mut self) -> Vec<Arc<C>> {
        self.core.remove_configurers_of()
    }

    pub fn configurer<C: Configurer<T>>(&self) -> Result<Option<Arc<C>>> {
        single(self.core.configurers_of::<C>())
    }

    pub fn state(&self) -> BuildState {
        self.core.state
    }

    pub fn target(&self) -> &T {
        &self.core.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.core.target
    }

    /// Runs `object` through the builder's post-processors for type `O`.
    pub fn post_process<O: 'static>(&self, object: O) -> O {
        self.core.post_processor.post_process(object)
    }
}

/// Builds `T::Output` exactly once from a set of registered configurers.
///
/// Lifecycle: `init` on every configurer, then `configure` on every
/// configurer, then [`BuildTarget::perform_build`]. Later calls to
/// [`build`](Self::build) return the cached object without touching any
/// configurer.
///
/// All operations serialize on one lock. Configurers must use the
/// [`BuilderContext`] they are handed; calling back into the owning
/// `ConfiguredBuilder` from a callback deadlocks.
pub struct ConfiguredBuilder<T: BuildTarget> {
    core: Mutex<BuilderCore<T>>,
}

impl<T: BuildTarget> ConfiguredBuilder<T> {
    /// A second configurer of an already-registered kind replaces the first.
    pub fn new(target: T) -> Self {
        Self::with_options(target, false)
    }

    /// Configurers of the same kind accumulate instead of replacing.
    pub fn accumulating(target: T) -> Self {
        Self::with_options(target, true)
    }

    pub fn from_settings(target: T, settings: &SecuritySettings) -> Self {
        Self::with_options(target, settings.allow_same_kind_configurers)
    }

    fn with_options(target: T, allow_same_kind: bool) -> Self {
        Self {
            core: Mutex::new(BuilderCore {
                target,
                configurers: IndexMap::new(),
                added_in_initializing: Vec::new(),
                shared: SharedObjects::new(),
                state: BuildState::Unbuilt,
                allow_same_kind,
                post_processor: CompositePostProcessor::new(),
                object: None,
            }),
        }
    }

    /// Replaces the post-processors applied to objects this builder creates.
    pub fn post_processor(self, post_processor: CompositePostProcessor) -> Self {
        self.core.lock().post_processor = post_processor;
        self
    }

    pub fn add_post_processor<O, P>(&self, processor: P)
    where
        O: 'static,
        P: ObjectPostProcessor<O> + 'static,
    {
        self.core.lock().post_processor.add::<O, P>(processor);
    }

    /// Registers a configurer under its concrete type.
    ///
    /// Fails with [`Error::IllegalState`] once the build has reached the
    /// configuring stage.
    pub fn register<C: Configurer<T>>(&self, configurer: C) -> Result<Arc<C>> {
        self.register_arc(Arc::new(configurer))
    }

    /// Registers `configurer` after letting `customize` adjust it.
    pub fn register_with<C, F>(&self, mut configurer: C, customize: F) -> Result<Arc<C>>
    where
        C: Configurer<T>,
        F: FnOnce(&mut C),
    {
        customize(&mut configurer);
        self.register(configurer)
    }

    pub fn register_arc<C: Configurer<T>>(&self, configurer: Arc<C>) -> Result<Arc<C>> {
        self.core.lock().add(configurer.clone())?;
        Ok(configurer)
    }

    /// Runs the lifecycle on first call; returns the cached object afterwards.
    ///
    /// Any error from a hook, configurer or the construction step is returned
    /// unchanged and leaves the builder unusable.
    pub fn build(&self) -> Result<T::Output> {
        self.core.lock().build()
    }

    /// Best-effort variant of [`build`](Self::build): failures are logged at
    /// debug level and reported as `None`.
    pub fn get_or_build(&self) -> Option<T::Output> {
        let mut core = self.core.lock();
        if !core.state.is_unbuilt() {
            if core.object.is_none() {
                tracing::debug!(state = %core.state, "Builder holds no object, returning none");
            }
            return core.object.clone();
        }
        match core.build() {
            Ok(object) => Some(object),
            Err(e) => {
                tracing::debug!(error = %e, "Failed to perform build, returning none");
                None
            }
        }
    }

    /// The built object, if the build has completed.
    pub fn object(&self) -> Option<T::Output> {
        self.core.lock().object.clone()
    }

    pub fn state(&self) -> BuildState {
        self.core.lock().state
    }

    pub fn set_shared<V: Send + Sync + 'static>(&self, value: V) -> Option<Arc<V>> {
        self.core.lock().shared.insert(value)
    }

    pub fn shared<V: Send + Sync + 'static>(&self) -> Option<Arc<V>> {
        self.core.lock().shared.get()
    }

    pub fn shared_types(&self) -> Vec<&'static str> {
        self.core.lock().shared.type_names()
    }

    pub fn configurers<C: Configurer<T>>(&self) -> Vec<Arc<C>> {
        self.core.lock().configurers_of()
    }

    pub fn remove_configurers<C: Configurer<T>>(&self) -> Vec<Arc<C>> {
        self.core.lock().remove_configurers_of()
    }

    /// The single configurer of kind `C`; an error if several are registered.
    pub fn configurer<C: Configurer<T>>(&self) -> Result<Option<Arc<C>>> {
        single(self.core.lock().configurers_of::<C>())
    }

    pub fn remove_configurer<C: Configurer<T>>(&self) -> Result<Option<Arc<C>>> {
        let mut core = self.core.lock();
        let count = core.configurers_of::<C>().len();
        if count > 1 {
            return Err(Error::illegal_state(format!(
                "only one configurer expected for {}, but got {}",
                ConfigurerKind::of::<C>(),
                count
            )));
        }
        Ok(core.remove_configurers_of::<C>().into_iter().next())
    }

    /// Registered kinds in registration order.
    pub fn configurer_kinds(&self) -> Vec<ConfigurerKind> {
        self.core.lock().configurers.keys().copied().collect()
    }

    /// Runs `f` against the concrete builder outside of a build.
    pub fn with_target<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.core.lock().target)
    }
}

impl<T: BuildTarget + Default> Default for ConfiguredBuilder<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: BuildTarget> fmt::Debug for ConfiguredBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ConfiguredBuilder");
        match self.core.try_lock() {
            Some(core) => s
                .field("state", &core.state)
                .field("configurers", &core.configurers.keys().collect::<Vec<_>>())
                .field("shared", &core.shared)
                .field("allow_same_kind", &core.allow_same_kind)
                .finish(),
            None => s.field("state", &"<locked>").finish_non_exhaustive(),
        }
    }
}
