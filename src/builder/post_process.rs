//! Object post-processing applied to everything a builder instantiates.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Wraps or replaces objects of type `O` created during a build.
pub trait ObjectPostProcessor<O>: Send + Sync {
    fn post_process(&self, object: O) -> O;

    /// Lower values run first.
    fn order(&self) -> i32 {
        0
    }
}

impl<O, F> ObjectPostProcessor<O> for F
where
    F: Fn(O) -> O + Send + Sync,
{
    fn post_process(&self, object: O) -> O {
        self(object)
    }
}

struct Registered {
    order: i32,
    target: TypeId,
    target_name: &'static str,
    // Holds an `Arc<dyn ObjectPostProcessor<O>>` for `target == TypeId::of::<O>()`.
    processor: Box<dyn Any + Send + Sync>,
}

/// Ordered collection of processors for heterogeneous object types.
///
/// `post_process::<O>` runs only the processors registered for `O`, in
/// ascending [`order`](ObjectPostProcessor::order); ties keep insertion order.
#[derive(Default)]
pub struct CompositePostProcessor {
    processors: Vec<Registered>,
}

impl CompositePostProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<O, P>(&mut self, processor: P) -> &mut Self
    where
        O: 'static,
        P: ObjectPostProcessor<O> + 'static,
    {
        self.add_arc::<O>(Arc::new(processor))
    }

    pub fn add_arc<O: 'static>(&mut self, processor: Arc<dyn ObjectPostProcessor<O>>) -> &mut Self {
        let order = processor.order();
        self.processors.push(Registered {
            order,
            target: TypeId::of::<O>(),
            target_name: std::any::type_name::<O>(),
            processor: Box::new(processor),
        });
        self.processors.sort_by_key(|p| p.order);
        self
    }

    /// Builder-style variant of [`add`](Self::add).
    pub fn with<O, P>(mut self, processor: P) -> Self
    where
        O: 'static,
        P: ObjectPostProcessor<O> + 'static,
    {
        self.add::<O, P>(processor);
        self
    }

    pub fn post_process<O: 'static>(&self, mut object: O) -> O {
        let target = TypeId::of::<O>();
        for registered in self.processors.iter().filter(|p| p.target == target) {
            if let Some(processor) = registered
                .processor
                .downcast_ref::<Arc<dyn ObjectPostProcessor<O>>>()
            {
                object = processor.post_process(object);
            }
        }
        object
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

impl fmt::Debug for CompositePostProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let targets: Vec<_> = self
            .processors
            .iter()
            .map(|p| (p.target_name, p.order))
            .collect();
        f.debug_struct("CompositePostProcessor")
            .field("processors", &targets)
            .finish()
    }
}
