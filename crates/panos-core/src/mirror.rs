// ── Resource mirror ──
//
// A snapshot is a full fetch of one entity kind, owned by the call that
// asked for it. Nothing is cached between calls: the device may have been
// changed by anyone since the last fetch.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::device::DeviceSession;
use crate::error::CoreError;
use crate::model::Resource;

/// Every entity of one kind, in device order, as of `fetched_at`.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    items: Vec<T>,
    fetched_at: DateTime<Utc>,
}

impl<T: Resource> Snapshot<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Exact, case-sensitive lookup by name.
    pub fn find(&self, name: &str) -> Result<&T, CoreError> {
        self.items
            .iter()
            .find(|item| item.name() == name)
            .ok_or_else(|| CoreError::not_found(T::KIND, name))
    }
}

/// Fetch every entity of `T`'s kind. A failed fetch is an error, never
/// an empty snapshot.
pub async fn refresh<T: Resource>(session: &dyn DeviceSession) -> Result<Snapshot<T>, CoreError> {
    let entities = session.fetch_all(T::KIND).await?;
    let items = entities
        .into_iter()
        .map(|entity| {
            let kind = entity.kind();
            T::from_entity(entity).ok_or_else(|| {
                CoreError::Internal(format!("expected {} but device returned {kind}", T::KIND))
            })
        })
        .collect::<Result<Vec<T>, CoreError>>()?;

    debug!(kind = %T::KIND, count = items.len(), "refreshed snapshot");
    Ok(Snapshot {
        items,
        fetched_at: Utc::now(),
    })
}
