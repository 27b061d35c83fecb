//! Per-invocation session settings.
//!
//! Passed by reference to every operation that may prompt or that changes
//! behaviour with the user's flags. There is no process-wide state.

use crate::core::config::SessionConfig;
use crate::core::domain::Lookup;

/// Interaction flags for one logical command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    /// A user can be asked questions.
    pub interactive: bool,
    /// Accept defaults without asking (`--yes`).
    pub always_yes: bool,
    /// Duplicate attribute keys are an error on lookup.
    pub strict_keys: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            interactive: true,
            always_yes: false,
            strict_keys: false,
        }
    }
}

impl Session {
    /// Never prompts; for scripts and tests.
    pub fn non_interactive() -> Self {
        Self {
            interactive: false,
            ..Self::default()
        }
    }

    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn with_always_yes(mut self, always_yes: bool) -> Self {
        self.always_yes = always_yes;
        self
    }

    pub fn with_strict_keys(mut self, strict_keys: bool) -> Self {
        self.strict_keys = strict_keys;
        self
    }

    /// Whether a prompt may actually be shown.
    pub fn can_prompt(&self) -> bool {
        self.interactive && !self.always_yes
    }

    /// Attribute lookup mode for this session.
    pub fn lookup(&self) -> Lookup {
        if self.strict_keys {
            Lookup::Strict
        } else {
            Lookup::First
        }
    }
}

impl From<&SessionConfig> for Session {
    fn from(config: &SessionConfig) -> Self {
        Self {
            interactive: config.interactive,
            always_yes: config.always_yes,
            strict_keys: config.strict_keys,
        }
    }
}
