//! Terminal capability probing.
//!
//! Detection runs once at startup and only looks at `TERM`. Terminals that
//! cannot be trusted with a scroll region (`dumb`, unset `TERM` on non-Windows
//! hosts) make the renderer repaint rows instead of shifting them.

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct TerminalCapabilities {
    pub supports_scroll_region: bool,
}

impl TerminalCapabilities {
    pub fn detect() -> Self {
        let term = std::env::var("TERM").ok();
        let caps = Self::from_term(term.as_deref());
        debug!(target: "runtime", term = term.as_deref().unwrap_or(""), ?caps, "terminal_capabilities");
        caps
    }

    /// Capabilities implied by a `TERM` value.
    pub fn from_term(term: Option<&str>) -> Self {
        let supports_scroll_region = match term {
            Some(t) => !t.is_empty() && t != "dumb",
            None => cfg!(windows),
        };
        Self {
            supports_scroll_region,
        }
    }
}
