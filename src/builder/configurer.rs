//! Configurer trait and kind identity.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use super::{BuildTarget, BuilderContext};
use crate::Result;

/// A unit of setup logic contributed to a [`ConfiguredBuilder`](super::ConfiguredBuilder).
///
/// Every registered configurer gets `init` once (all of them, in
/// registration order) and then `configure` once. State that another
/// configurer needs should go through the shared-object table on the
/// context rather than through the configurer itself.
///
/// Both callbacks default to no-ops, so a configurer only implements the
/// stage it cares about.
///
/// # Example
///
/// ```rust
/// use gatekeeper::builder::{BuildTarget, BuilderContext, Configurer};
///
/// struct Greeting(String);
///
/// struct GreetingBuilder {
///     parts: Vec<String>,
/// }
///
/// impl BuildTarget for GreetingBuilder {
///     type Output = std::sync::Arc<Greeting>;
///
///     fn perform_build(ctx: &mut BuilderContext<'_, Self>) -> gatekeeper::Result<Self::Output> {
///         Ok(std::sync::Arc::new(Greeting(ctx.target().parts.join(" "))))
///     }
/// }
///
/// struct Hello;
///
/// impl Configurer<GreetingBuilder> for Hello {
///     fn configure(
///         &self,
///         ctx: &mut BuilderContext<'_, GreetingBuilder>,
///     ) -> gatekeeper::Result<()> {
///         ctx.target_mut().parts.push("hello".into());
///         Ok(())
///     }
/// }
/// ```
pub trait Configurer<T: BuildTarget>: Send + Sync + 'static {
    /// Called during the initializing stage. May register further configurers.
    fn init(&self, _ctx: &mut BuilderContext<'_, T>) -> Result<()> {
        Ok(())
    }

    /// Called during the configuring stage. Registration is closed by now.
    fn configure(&self, _ctx: &mut BuilderContext<'_, T>) -> Result<()> {
        Ok(())
    }
}

/// Identity of a configurer's concrete type.
#[derive(Clone, Copy)]
pub struct ConfigurerKind {
    id: TypeId,
    name: &'static str,
}

impl ConfigurerKind {
    pub fn of<C: 'static>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: std::any::type_name::<C>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path.
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

impl PartialEq for ConfigurerKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConfigurerKind {}

impl std::hash::Hash for ConfigurerKind {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ConfigurerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConfigurerKind").field(&self.name).finish()
    }
}

impl fmt::Display for ConfigurerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// A registered configurer: the callable handle plus a type-erased handle to
/// the same allocation for typed lookups.
pub(crate) struct ConfigurerRef<T: BuildTarget> {
    pub(crate) kind: ConfigurerKind,
    pub(crate) configurer: Arc<dyn Configurer<T>>,
    any: Arc<dyn Any + Send + Sync>,
}

impl<T: BuildTarget> ConfigurerRef<T> {
    pub(crate) fn new<C: Configurer<T>>(configurer: Arc<C>) -> Self {
        Self {
            kind: ConfigurerKind::of::<C>(),
            any: configurer.clone(),
            configurer,
        }
    }

    pub(crate) fn downcast<C: Configurer<T>>(&self) -> Option<Arc<C>> {
        self.any.clone().downcast::<C>().ok()
    }
}

impl<T: BuildTarget> Clone for ConfigurerRef<T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            configurer: self.configurer.clone(),
            any: self.any.clone(),
        }
    }
}

impl<T: BuildTarget> fmt::Debug for ConfigurerRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConfigurerRef").field(&self.kind.name).finish()
    }
}
