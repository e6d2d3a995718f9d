// ── In-memory device ──
//
// Enforces the device-side rules the core relies on: name uniqueness on
// create, and rejection of updates and deletes for absent names. Knobs
// let tests fail connects and fetches.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::config::DeviceTarget;
use crate::device::{Connector, DeviceSession};
use crate::error::CoreError;
use crate::model::{AddressObject, Entity, EntityKind, SecurityRule};

#[derive(Default)]
struct State {
    addresses: Vec<AddressObject>,
    rules: Vec<SecurityRule>,
    op_outputs: HashMap<String, String>,
    op_log: Vec<String>,
    fetch_failure: Option<String>,
}

#[derive(Default)]
struct Inner {
    state: Mutex<State>,
    connects: AtomicUsize,
    failing_connects: AtomicU32,
    commits: AtomicUsize,
}

/// A firewall that lives in memory. Clones share state.
#[derive(Clone, Default)]
pub struct FakeDevice {
    inner: Arc<Inner>,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // ── Seeding and inspection ───────────────────────────────────────

    pub fn seed_address(&self, address: AddressObject) {
        self.state().addresses.push(address);
    }

    pub fn seed_rule(&self, rule: SecurityRule) {
        self.state().rules.push(rule);
    }

    pub fn addresses(&self) -> Vec<AddressObject> {
        self.state().addresses.clone()
    }

    pub fn rules(&self) -> Vec<SecurityRule> {
        self.state().rules.clone()
    }

    /// Stored output for an operational command.
    pub fn set_op_output(&self, command: impl Into<String>, output: impl Into<String>) {
        self.state().op_outputs.insert(command.into(), output.into());
    }

    /// Operational commands received, in order.
    pub fn op_log(&self) -> Vec<String> {
        self.state().op_log.clone()
    }

    pub fn connect_count(&self) -> usize {
        self.inner.connects.load(Ordering::SeqCst)
    }

    /// Successful create, update and delete commits.
    pub fn commit_count(&self) -> usize {
        self.inner.commits.load(Ordering::SeqCst)
    }

    // ── Failure injection ────────────────────────────────────────────

    /// The next `n` connect attempts fail.
    pub fn fail_next_connects(&self, n: u32) {
        self.inner.failing_connects.store(n, Ordering::SeqCst);
    }

    /// Every fetch fails with `message` until [`Self::restore_fetches`].
    pub fn fail_fetches(&self, message: impl Into<String>) {
        self.state().fetch_failure = Some(message.into());
    }

    pub fn restore_fetches(&self) {
        self.state().fetch_failure = None;
    }

    fn committed(&self) {
        self.inner.commits.fetch_add(1, Ordering::SeqCst);
    }
}

fn position_of<T>(items: &[T], name: &str, key: impl Fn(&T) -> &str) -> Option<usize> {
    items.iter().position(|item| key(item) == name)
}

fn no_such_object(name: &str) -> CoreError {
    CoreError::Remote {
        message: format!("No such node: {name}"),
    }
}

#[async_trait]
impl Connector for FakeDevice {
    async fn connect(&self, target: &DeviceTarget) -> Result<Arc<dyn DeviceSession>, CoreError> {
        self.inner.connects.fetch_add(1, Ordering::SeqCst);
        let remaining = self.inner.failing_connects.load(Ordering::SeqCst);
        if remaining > 0 {
            self.inner
                .failing_connects
                .store(remaining - 1, Ordering::SeqCst);
            return Err(CoreError::Connection {
                target: target.address().to_owned(),
                reason: "connection refused".into(),
            });
        }
        Ok(Arc::new(self.clone()))
    }
}

#[async_trait]
impl DeviceSession for FakeDevice {
    async fn fetch_all(&self, kind: EntityKind) -> Result<Vec<Entity>, CoreError> {
        let state = self.state();
        if let Some(ref message) = state.fetch_failure {
            return Err(CoreError::Remote {
                message: message.clone(),
            });
        }
        Ok(match kind {
            EntityKind::Address => state.addresses.iter().cloned().map(Entity::from).collect(),
            EntityKind::SecurityRule => state.rules.iter().cloned().map(Entity::from).collect(),
        })
    }

    async fn commit_create(&self, entity: &Entity) -> Result<(), CoreError> {
        let mut state = self.state();
        let exists = match entity {
            Entity::Address(a) => position_of(&state.addresses, &a.name, |x| &x.name).is_some(),
            Entity::SecurityRule(r) => position_of(&state.rules, &r.name, |x| &x.name).is_some(),
        };
        if exists {
            return Err(CoreError::Remote {
                message: format!("{} already exists", entity.name()),
            });
        }
        match entity {
            Entity::Address(a) => state.addresses.push(a.clone()),
            Entity::SecurityRule(r) => state.rules.push(r.clone()),
        }
        drop(state);
        self.committed();
        Ok(())
    }

    async fn commit_update(&self, entity: &Entity) -> Result<(), CoreError> {
        let mut state = self.state();
        match entity {
            Entity::Address(a) => {
                let i = position_of(&state.addresses, &a.name, |x| &x.name)
                    .ok_or_else(|| no_such_object(&a.name))?;
                state.addresses[i] = a.clone();
            }
            Entity::SecurityRule(r) => {
                let i = position_of(&state.rules, &r.name, |x| &x.name)
                    .ok_or_else(|| no_such_object(&r.name))?;
                state.rules[i] = r.clone();
            }
        }
        drop(state);
        self.committed();
        Ok(())
    }

    async fn commit_delete(&self, entity: &Entity) -> Result<(), CoreError> {
        let mut state = self.state();
        match entity {
            Entity::Address(a) => {
                let i = position_of(&state.addresses, &a.name, |x| &x.name)
                    .ok_or_else(|| no_such_object(&a.name))?;
                state.addresses.remove(i);
            }
            Entity::SecurityRule(r) => {
                let i = position_of(&state.rules, &r.name, |x| &x.name)
                    .ok_or_else(|| no_such_object(&r.name))?;
                state.rules.remove(i);
            }
        }
        drop(state);
        self.committed();
        Ok(())
    }

    async fn run_op(&self, command: &str) -> Result<String, CoreError> {
        let mut state = self.state();
        state.op_log.push(command.to_owned());
        Ok(state.op_outputs.get(command).cloned().unwrap_or_else(|| {
            format!("<response status=\"success\"><result>{command}</result></response>")
        }))
    }
}
