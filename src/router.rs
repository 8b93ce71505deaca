//! Single-slot command routing between the assistant and the mounted page.
//!
//! The slot holds at most one page handler; the last registration wins and
//! nothing is keyed by page identity. `NAVIGATE` never reaches the slot: it
//! is handed back to the caller, which owns navigation.

use std::sync::Arc;

use crate::command::VoiceCommand;
use crate::lock::Shared;
use crate::log_debug;

/// Callback a page installs to receive its commands. Runs synchronously on
/// the dispatching thread; panics are not caught.
pub type PageHandler = Arc<dyn Fn(&VoiceCommand) + Send + Sync>;

/// Host-side navigation collaborator. Routes are passed through verbatim.
pub trait Navigator {
    fn navigate(&mut self, route: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The caller must navigate to this route.
    Navigate(String),
    Delivered,
    /// No page handler was registered.
    Dropped,
}

#[derive(Clone)]
pub struct CommandRouter {
    slot: Shared<Option<PageHandler>>,
}

impl Default for CommandRouter {
    fn default() -> Self {
        Self {
            slot: Shared::new("page slot", None),
        }
    }
}

impl std::fmt::Debug for CommandRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRouter")
            .field("has_handler", &self.has_handler())
            .finish()
    }
}

impl CommandRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the slot with `handler`. Dropping the returned guard clears the slot.
    pub fn register(&self, handler: PageHandler) -> PageRegistration {
        let replaced = self.slot.lock().replace(handler).is_some();
        log_debug(if replaced {
            "voice handler registered (replaced previous)"
        } else {
            "voice handler registered"
        });
        PageRegistration {
            router: self.clone(),
        }
    }

    pub fn register_fn<F>(&self, handler: F) -> PageRegistration
    where
        F: Fn(&VoiceCommand) + Send + Sync + 'static,
    {
        self.register(Arc::new(handler))
    }

    /// Clear the slot, whoever registered it.
    pub fn unregister(&self) {
        self.slot.lock().take();
        log_debug("voice handler unregistered");
    }

    pub fn has_handler(&self) -> bool {
        self.slot.lock().is_some()
    }

    pub fn dispatch(&self, command: &VoiceCommand) -> DispatchOutcome {
        let outcome = match command {
            VoiceCommand::Navigate(route) => DispatchOutcome::Navigate(route.clone()),
            _ => {
                // Clone out so the handler runs without the slot locked.
                let handler = self.slot.lock().clone();
                match handler {
                    Some(handler) => {
                        handler(command);
                        DispatchOutcome::Delivered
                    }
                    None => DispatchOutcome::Dropped,
                }
            }
        };
        tracing::info!(
            action = %command.action(),
            outcome = ?outcome,
            "voice command dispatched"
        );
        outcome
    }
}

/// Scoped registration; releasing it (or dropping it) unregisters.
#[must_use = "dropping the registration immediately unregisters the page handler"]
pub struct PageRegistration {
    router: CommandRouter,
}

impl PageRegistration {
    pub fn release(self) {}
}

impl Drop for PageRegistration {
    fn drop(&mut self) {
        self.router.unregister();
    }
}
