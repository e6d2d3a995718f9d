// ── Command registry ──
//
// Handler units are listed explicitly in a table. Discovery runs each
// unit's `register` entry point against a staging registry, catching
// errors and panics, and merges the staged commands only if every name
// is free. One unit's failure never touches another unit's commands.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::future::{self as fut, BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::{debug, error, info};

use panos_core::{ConnectionManager, CoreError, DeviceSession};

use crate::error::{RegistryError, ToolError};
use crate::outcome::{FAILURE_MARKER, Outcome, SUCCESS_MARKER};

/// Named arguments of one call, as received.
pub type Arguments = Map<String, Value>;

/// A registered command's entry point.
pub type HandlerFn = Arc<dyn Fn(Context, Arguments) -> BoxFuture<'static, Outcome> + Send + Sync>;

/// A handler unit's registration entry point.
pub type RegisterFn = fn(&mut CommandRegistry) -> Result<(), RegistryError>;

// ── Context ─────────────────────────────────────────────────────────

/// What the dispatcher hands every handler call.
#[derive(Clone)]
pub struct Context {
    connection: Arc<ConnectionManager>,
}

impl Context {
    pub fn new(connection: Arc<ConnectionManager>) -> Self {
        Self { connection }
    }

    /// The shared device session, connecting on first use.
    pub async fn session(&self) -> Result<Arc<dyn DeviceSession>, CoreError> {
        self.connection.get_connection().await
    }
}

// ── Command ─────────────────────────────────────────────────────────

/// A command registration record. Immutable once built.
pub struct Command {
    name: String,
    description: String,
    input_schema: Value,
    handler: HandlerFn,
}

impl Command {
    /// Build a command, checking the name and argument schema.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        handler: HandlerFn,
    ) -> Result<Self, RegistryError> {
        let name = name.into();
        let invalid = |reason: &str| RegistryError::InvalidDefinition {
            name: name.clone(),
            reason: reason.to_owned(),
        };

        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(invalid("name must be non-empty snake_case"));
        }
        if input_schema.get("type").and_then(Value::as_str) != Some("object") {
            return Err(invalid("input schema must have type \"object\""));
        }
        let properties = input_schema
            .get("properties")
            .and_then(Value::as_object)
            .ok_or_else(|| invalid("input schema must declare properties"))?;
        if let Some(required) = input_schema.get("required").and_then(Value::as_array) {
            let undeclared = required
                .iter()
                .any(|r| r.as_str().is_none_or(|r| !properties.contains_key(r)));
            if undeclared {
                return Err(invalid("every required argument must be a declared property"));
            }
        }

        Ok(Self {
            name,
            description: description.into(),
            input_schema,
            handler,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn input_schema(&self) -> &Value {
        &self.input_schema
    }

    /// The `tools/list` entry for this command.
    pub fn definition(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema,
        })
    }

    pub(crate) fn handler(&self) -> HandlerFn {
        Arc::clone(&self.handler)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Adapt a typed async handler into a [`HandlerFn`].
///
/// Arguments are deserialized into `A`; unknown extra fields are ignored
/// and a decode failure becomes the call's failure text.
pub fn handler<A, F, Fut>(f: F) -> HandlerFn
where
    A: DeserializeOwned + Send + 'static,
    F: Fn(Context, A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<String, ToolError>> + Send + 'static,
{
    Arc::new(
        move |ctx: Context, args: Arguments| match serde_json::from_value::<A>(Value::Object(args)) {
            Ok(parsed) => f(ctx, parsed).map(Outcome::from_result).boxed(),
            Err(e) => fut::ready(Outcome::failure(ToolError::InvalidArguments(e.to_string()))).boxed(),
        },
    )
}

// ── Registry ────────────────────────────────────────────────────────

/// Command name → registration record, in registration order.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<Arc<Command>>,
    index: HashMap<String, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command. A name that is already taken is rejected and the
    /// existing registration is kept.
    pub fn register(&mut self, command: Command) -> Result<(), RegistryError> {
        if self.index.contains_key(command.name()) {
            return Err(RegistryError::Duplicate {
                name: command.name().to_owned(),
            });
        }
        self.index.insert(command.name().to_owned(), self.commands.len());
        self.commands.push(Arc::new(command));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<Command>> {
        self.index.get(name).map(|&i| Arc::clone(&self.commands[i]))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter().map(|c| &**c)
    }

    pub fn names(&self) -> Vec<String> {
        self.commands.iter().map(|c| c.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Move every staged command in, or none of them.
    fn absorb(&mut self, staged: CommandRegistry) -> Result<(), RegistryError> {
        if let Some(taken) = staged.commands.iter().find(|c| self.contains(c.name())) {
            return Err(RegistryError::Duplicate {
                name: taken.name().to_owned(),
            });
        }
        for command in staged.commands {
            self.index.insert(command.name().to_owned(), self.commands.len());
            self.commands.push(command);
        }
        Ok(())
    }
}

// ── Discovery ───────────────────────────────────────────────────────

/// One independently authored handler unit.
#[derive(Clone, Copy)]
pub struct HandlerUnit {
    pub module: &'static str,
    /// Units without an entry point are skipped.
    pub register: Option<RegisterFn>,
}

/// Where a unit ended up after discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitState {
    Discovered,
    Loaded,
    Registered,
    Skipped,
    LoadFailed { reason: String },
    RegisterFailed { reason: String },
}

impl UnitState {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::LoadFailed { .. } | Self::RegisterFailed { .. })
    }
}

#[derive(Debug, Clone)]
pub struct UnitReport {
    pub module: &'static str,
    pub commands: Vec<String>,
    pub state: UnitState,
}

/// Per-unit outcome of a discovery pass.
#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    pub units: Vec<UnitReport>,
}

impl LoadSummary {
    pub fn registered(&self) -> usize {
        self.count(|s| *s == UnitState::Registered)
    }

    pub fn failed(&self) -> usize {
        self.count(UnitState::is_failure)
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| *s == UnitState::Skipped)
    }

    pub fn failures(&self) -> impl Iterator<Item = &UnitReport> {
        self.units.iter().filter(|u| u.state.is_failure())
    }

    fn count(&self, pred: impl Fn(&UnitState) -> bool) -> usize {
        self.units.iter().filter(|u| pred(&u.state)).count()
    }

    /// One line per unit, then the totals.
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = self
            .units
            .iter()
            .filter_map(|u| match &u.state {
                UnitState::Registered => Some(format!(
                    "{SUCCESS_MARKER} {} ({})",
                    u.module,
                    u.commands.join(", ")
                )),
                UnitState::LoadFailed { reason } => {
                    Some(format!("{FAILURE_MARKER} {}: load failed: {reason}", u.module))
                }
                UnitState::RegisterFailed { reason } => Some(format!(
                    "{FAILURE_MARKER} {}: registration failed: {reason}",
                    u.module
                )),
                UnitState::Discovered | UnitState::Loaded | UnitState::Skipped => None,
            })
            .collect();
        lines.push(format!(
            "{} unit(s) registered, {} failed",
            self.registered(),
            self.failed()
        ));
        lines.join("\n")
    }
}

/// Run every unit's entry point and collect the registry and summary.
///
/// Never fails as a whole: errors and panics are recorded per unit.
pub fn discover(units: &[HandlerUnit]) -> (CommandRegistry, LoadSummary) {
    let mut registry = CommandRegistry::new();
    let mut summary = LoadSummary::default();

    for unit in units {
        let mut report = UnitReport {
            module: unit.module,
            commands: Vec::new(),
            state: UnitState::Discovered,
        };

        let Some(entry) = unit.register else {
            debug!(module = unit.module, "no register entry point, skipping");
            report.state = UnitState::Skipped;
            summary.units.push(report);
            continue;
        };
        report.state = UnitState::Loaded;

        let mut staged = CommandRegistry::new();
        report.state = match panic::catch_unwind(AssertUnwindSafe(|| entry(&mut staged))) {
            Err(payload) => UnitState::LoadFailed {
                reason: format!("panicked: {}", panic_message(&*payload)),
            },
            Ok(Err(e @ RegistryError::InvalidDefinition { .. })) => UnitState::LoadFailed {
                reason: e.to_string(),
            },
            Ok(Err(e @ RegistryError::Duplicate { .. })) => UnitState::RegisterFailed {
                reason: e.to_string(),
            },
            Ok(Ok(())) => {
                let names = staged.names();
                match registry.absorb(staged) {
                    Ok(()) => {
                        report.commands = names;
                        UnitState::Registered
                    }
                    Err(e) => UnitState::RegisterFailed {
                        reason: e.to_string(),
                    },
                }
            }
        };

        match &report.state {
            UnitState::Registered => {
                info!(module = unit.module, commands = ?report.commands, "{SUCCESS_MARKER} loaded handler unit");
            }
            UnitState::LoadFailed { reason } | UnitState::RegisterFailed { reason } => {
                error!(module = unit.module, %reason, "{FAILURE_MARKER} handler unit failed");
            }
            _ => {}
        }
        summary.units.push(report);
    }

    info!(
        registered = summary.registered(),
        failed = summary.failed(),
        commands = registry.len(),
        "handler discovery complete"
    );
    (registry, summary)
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn noop() -> HandlerFn {
        handler(|_ctx: Context, _args: Map<String, Value>| async { Ok::<_, ToolError>("ok".to_owned()) })
    }

    fn schema() -> Value {
        json!({ "type": "object", "properties": {} })
    }

    fn register_ping(registry: &mut CommandRegistry) -> Result<(), RegistryError> {
        registry.register(Command::new("ping", "first", schema(), noop())?)
    }

    fn register_ping_again(registry: &mut CommandRegistry) -> Result<(), RegistryError> {
        registry.register(Command::new("ping", "second", schema(), noop())?)
    }

    fn register_pong(registry: &mut CommandRegistry) -> Result<(), RegistryError> {
        registry.register(Command::new("pong", "other", schema(), noop())?)
    }

    fn register_bad_schema(registry: &mut CommandRegistry) -> Result<(), RegistryError> {
        registry.register(Command::new("bad", "", json!({ "type": "string" }), noop())?)
    }

    fn register_panics(_registry: &mut CommandRegistry) -> Result<(), RegistryError> {
        panic!("boom");
    }

    #[test]
    fn duplicate_name_fails_second_unit_only() {
        let (registry, summary) = discover(&[
            HandlerUnit {
                module: "a",
                register: Some(register_ping),
            },
            HandlerUnit {
                module: "b",
                register: Some(register_ping_again),
            },
            HandlerUnit {
                module: "c",
                register: Some(register_pong),
            },
        ]);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("ping").unwrap().description(), "first");
        assert!(registry.contains("pong"));
        assert!(matches!(summary.units[1].state, UnitState::RegisterFailed { .. }));
        assert_eq!(summary.registered(), 2);
        assert_eq!(summary.failed(), 1);
    }

    #[test]
    fn load_failures_and_panics_are_isolated() {
        let (registry, summary) = discover(&[
            HandlerUnit {
                module: "bad",
                register: Some(register_bad_schema),
            },
            HandlerUnit {
                module: "panics",
                register: Some(register_panics),
            },
            HandlerUnit {
                module: "empty",
                register: None,
            },
            HandlerUnit {
                module: "ok",
                register: Some(register_pong),
            },
        ]);

        assert_eq!(registry.names(), vec!["pong"]);
        assert!(matches!(summary.units[0].state, UnitState::LoadFailed { .. }));
        let UnitState::LoadFailed { ref reason } = summary.units[1].state else {
            panic!("panicking unit should fail to load");
        };
        assert!(reason.contains("boom"));
        assert_eq!(summary.units[2].state, UnitState::Skipped);
        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.failed(), 2);
    }

    #[test]
    fn summary_renders_markers() {
        let (_, summary) = discover(&[
            HandlerUnit {
                module: "ok",
                register: Some(register_pong),
            },
            HandlerUnit {
                module: "bad",
                register: Some(register_bad_schema),
            },
        ]);
        let text = summary.render();
        assert!(text.contains("✓ ok (pong)"));
        assert!(text.contains("✗ bad: load failed"));
        assert!(text.ends_with("1 unit(s) registered, 1 failed"));
    }

    #[test]
    fn required_must_be_declared() {
        let err = Command::new(
            "x",
            "",
            json!({ "type": "object", "properties": {}, "required": ["name"] }),
            noop(),
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidDefinition { .. }));
    }

    #[test]
    fn names_must_be_snake_case() {
        assert!(Command::new("Create-Thing", "", schema(), noop()).is_err());
        assert!(Command::new("create_thing2", "", schema(), noop()).is_ok());
    }
}
