// ── Dispatcher ──
//
// Routes a call by name to its registered handler. The handler runs on
// its own task; a panic there is reported as `HandlerCrashed` and leaves
// the registry and the shared connection untouched.

use std::sync::Arc;

use tracing::{debug, error, warn};

use panos_core::ConnectionManager;

use crate::error::DispatchError;
use crate::outcome::Outcome;
use crate::registry::{Arguments, CommandRegistry, Context, panic_message};

#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    context: Context,
}

impl Dispatcher {
    pub fn new(registry: Arc<CommandRegistry>, connection: Arc<ConnectionManager>) -> Self {
        Self {
            registry,
            context: Context::new(connection),
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Run the named command with `args`.
    ///
    /// Handler failures arrive as `Ok` failure outcomes; only an unknown
    /// name or a crashed handler is an `Err`.
    pub async fn dispatch(&self, name: &str, args: Arguments) -> Result<Outcome, DispatchError> {
        let command = self
            .registry
            .get(name)
            .ok_or_else(|| DispatchError::UnknownCommand { name: name.to_owned() })?;

        debug!(command = name, args = args.len(), "dispatching");
        let handler = command.handler();
        let ctx = self.context.clone();
        let task = tokio::spawn(async move { (*handler)(ctx, args).await });

        match task.await {
            Ok(outcome) => {
                if outcome.is_error {
                    warn!(command = name, text = %outcome.text, "command failed");
                }
                Ok(outcome)
            }
            Err(join_err) => {
                let reason = if join_err.is_panic() {
                    panic_message(&*join_err.into_panic())
                } else {
                    "task was cancelled".to_owned()
                };
                error!(command = name, %reason, "handler crashed");
                Err(DispatchError::HandlerCrashed {
                    command: name.to_owned(),
                    reason,
                })
            }
        }
    }

    /// [`dispatch`](Self::dispatch), with dispatch errors rendered as
    /// failure text.
    pub async fn call(&self, name: &str, args: Arguments) -> Outcome {
        self.dispatch(name, args)
            .await
            .unwrap_or_else(Outcome::failure)
    }
}
