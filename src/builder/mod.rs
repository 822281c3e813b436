//! Configurer-driven builders.
//!
//! A [`ConfiguredBuilder`] owns a concrete [`BuildTarget`] and a table of
//! [`Configurer`]s. Building walks a fixed lifecycle ([`BuildState`]):
//! every configurer's `init`, then every configurer's `configure`, then the
//! target's construction step. The result is cached; registration closes
//! once configuration starts.
//!
//! ```rust
//! use std::sync::Arc;
//! use gatekeeper::builder::{BuildTarget, BuilderContext, ConfiguredBuilder, Configurer};
//!
//! #[derive(Default)]
//! struct Pipeline {
//!     stages: Vec<&'static str>,
//! }
//!
//! impl BuildTarget for Pipeline {
//!     type Output = Arc<Vec<&'static str>>;
//!
//!     fn perform_build(ctx: &mut BuilderContext<'_, Self>) -> gatekeeper::Result<Self::Output> {
//!         Ok(Arc::new(ctx.target().stages.clone()))
//!     }
//! }
//!
//! struct Headers;
//!
//! impl Configurer<Pipeline> for Headers {
//!     fn configure(&self, ctx: &mut BuilderContext<'_, Pipeline>) -> gatekeeper::Result<()> {
//!         ctx.target_mut().stages.push("headers");
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> gatekeeper::Result<()> {
//! let builder = ConfiguredBuilder::new(Pipeline::default());
//! builder.register(Headers)?;
//! let pipeline = builder.build()?;
//! assert_eq!(*pipeline, vec!["headers"]);
//! assert!(Arc::ptr_eq(&pipeline, &builder.build()?));
//! # Ok(())
//! # }
//! ```

mod configured;
mod configurer;
mod post_process;
mod shared;
mod state;

pub use configured::{BuildTarget, BuilderContext, ConfiguredBuilder};
pub use configurer::{Configurer, ConfigurerKind};
pub use post_process::{CompositePostProcessor, ObjectPostProcessor};
pub use shared::SharedObjects;
pub use state::BuildState;
