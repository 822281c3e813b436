//! Build lifecycle state machine.

use std::fmt;

use crate::{Error, Result};

/// Lifecycle stage of a [`ConfiguredBuilder`](super::ConfiguredBuilder).
///
/// Stages only move forward, one at a time:
/// `Unbuilt → Initializing → Configuring → Building → Built`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BuildState {
    #[default]
    Unbuilt,
    Initializing,
    Configuring,
    Building,
    Built,
}

/// Every legal `(from, to)` pair. Anything absent is rejected.
const TRANSITIONS: &[(BuildState, BuildState)] = &[
    (BuildState::Unbuilt, BuildState::Initializing),
    (BuildState::Initializing, BuildState::Configuring),
    (BuildState::Configuring, BuildState::Building),
    (BuildState::Building, BuildState::Built),
];

impl BuildState {
    pub fn all() -> &'static [BuildState] {
        &[
            BuildState::Unbuilt,
            BuildState::Initializing,
            BuildState::Configuring,
            BuildState::Building,
            BuildState::Built,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildState::Unbuilt => "unbuilt",
            BuildState::Initializing => "initializing",
            BuildState::Configuring => "configuring",
            BuildState::Building => "building",
            BuildState::Built => "built",
        }
    }

    /// Returns true if `self → to` appears in the transition table.
    pub fn can_transition(self, to: BuildState) -> bool {
        TRANSITIONS.iter().any(|&(f, t)| f == self && t == to)
    }

    /// Moves to `to`, or fails with [`Error::IllegalState`] if the pair is
    /// not in the transition table.
    pub fn transition(self, to: BuildState) -> Result<BuildState> {
        if self.can_transition(to) {
            tracing::trace!(from = self.as_str(), to = to.as_str(), "Build state transition");
            Ok(to)
        } else {
            Err(Error::illegal_state(format!(
                "illegal build state transition: {} -> {}",
                self, to
            )))
        }
    }

    /// Stages reachable from `self` by following the table (excluding `self`).
    fn successors(self) -> Vec<BuildState> {
        let mut out = Vec::new();
        let mut current = self;
        while let Some(&(_, next)) = TRANSITIONS.iter().find(|&&(f, _)| f == current) {
            out.push(next);
            current = next;
        }
        out
    }

    pub fn is_unbuilt(&self) -> bool {
        *self == BuildState::Unbuilt
    }

    pub fn is_initializing(&self) -> bool {
        *self == BuildState::Initializing
    }

    /// Configuring or any later stage. Registration is closed from here on.
    pub fn is_configured(&self) -> bool {
        *self == BuildState::Configuring || BuildState::Configuring.successors().contains(self)
    }

    pub fn is_built(&self) -> bool {
        *self == BuildState::Built
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
