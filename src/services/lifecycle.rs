//! Generic entity lifecycle engine.
//!
//! Every persisted kind in the system (leads, clients, companies, accounts,
//! tokens, interactions) shares the same create/read/delete shape; the only
//! per-entity differences are what counts as a duplicate and what defaulting
//! must happen before the first insert. Both are expressed as
//! [`LifecycleHooks`] so each concrete service is one instantiation of
//! [`LifecycleService`] rather than a copy of the flow.
//!
//! Update semantics are deliberately NOT uniform: each concrete service owns
//! its sparse-merge rules and calls [`LifecycleService::persist_update`] to
//! get the shared timestamp bookkeeping.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use crate::errors::{Error, Result};

/// A persisted record with identity and audit timestamps.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Entity kind name used in NotFound/AlreadyExists errors.
    const KIND: &'static str;

    fn id(&self) -> &str;

    /// Stamp both audit timestamps; called exactly once, before insert.
    fn stamp_created(&mut self, at: DateTime<Utc>);

    /// Refresh the update timestamp; called on every mutation.
    fn stamp_updated(&mut self, at: DateTime<Utc>);
}

/// Minimal persistence contract the engine needs from a repository.
///
/// Unique-key and predicate lookups are entity-specific and live on the
/// per-entity repository traits; hooks reach them through their own handles.
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<E>>;
    async fn find_all(&self) -> Result<Vec<E>>;
    async fn insert(&self, entity: &E) -> Result<()>;
    async fn save(&self, entity: &E) -> Result<()>;
    async fn delete_by_id(&self, id: &str) -> Result<()>;
}

/// The two extension points of the engine. Defaults are no-ops so entities
/// without a natural key or insert-time defaulting implement nothing.
#[async_trait]
pub trait LifecycleHooks<E: Entity>: Send + Sync {
    /// Return the natural key of an existing record that conflicts with the
    /// candidate, or `None` when the candidate may be inserted.
    async fn find_conflict(&self, _candidate: &E) -> Result<Option<String>> {
        Ok(None)
    }

    /// Mutate the entity in place before its first insert (hash a secret,
    /// stamp a default status, force a flag).
    fn before_insert(&self, _entity: &mut E) -> Result<()> {
        Ok(())
    }
}

/// Hooks instance for entities that need neither extension point.
pub struct NoHooks;

#[async_trait]
impl<E: Entity> LifecycleHooks<E> for NoHooks {}

/// Generic create/read/delete engine over one entity kind.
pub struct LifecycleService<E: Entity, H: LifecycleHooks<E>> {
    store: Arc<dyn EntityStore<E>>,
    hooks: H,
    _entity: PhantomData<E>,
}

impl<E: Entity, H: LifecycleHooks<E>> LifecycleService<E, H> {
    pub fn new(store: Arc<dyn EntityStore<E>>, hooks: H) -> Self {
        Self { store, hooks, _entity: PhantomData }
    }

    pub fn store(&self) -> &Arc<dyn EntityStore<E>> {
        &self.store
    }

    /// Create the entity: conflict check, before-insert hook, timestamp
    /// stamping, insert. Nothing is persisted when the conflict check fails.
    #[instrument(skip(self, entity), fields(kind = E::KIND))]
    pub async fn create(&self, mut entity: E) -> Result<E> {
        if let Some(key) = self.hooks.find_conflict(&entity).await? {
            return Err(Error::already_exists(E::KIND, key));
        }

        self.hooks.before_insert(&mut entity)?;
        entity.stamp_created(Utc::now());

        self.store.insert(&entity).await?;
        debug!(kind = E::KIND, id = entity.id(), "entity created");
        Ok(entity)
    }

    /// Fetch by id, mapping absence to a typed NotFound.
    #[instrument(skip(self), fields(kind = E::KIND, id = id))]
    pub async fn get(&self, id: &str) -> Result<E> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(E::KIND, id))
    }

    /// List every entity of this kind; an empty store yields an empty vec.
    #[instrument(skip(self), fields(kind = E::KIND))]
    pub async fn list(&self) -> Result<Vec<E>> {
        self.store.find_all().await
    }

    /// Delete by id and return the value as it was immediately before
    /// removal. Absence is a typed NotFound.
    #[instrument(skip(self), fields(kind = E::KIND, id = id))]
    pub async fn delete(&self, id: &str) -> Result<E> {
        let entity = self.get(id).await?;
        self.store.delete_by_id(id).await?;
        debug!(kind = E::KIND, id = id, "entity deleted");
        Ok(entity)
    }

    /// Refresh the update timestamp and save. Concrete services apply their
    /// sparse merges first, then call this.
    pub async fn persist_update(&self, entity: &mut E) -> Result<()> {
        entity.stamp_updated(Utc::now());
        self.store.save(entity).await
    }
}

/// Copy-if-present merge for a required destination field.
pub fn merge<T>(dst: &mut T, src: Option<T>) {
    if let Some(value) = src {
        *dst = value;
    }
}

/// Copy-if-present merge for an optional destination field. A `None` source
/// leaves the destination untouched (a field can be cleared only through an
/// entity-specific operation, never through the sparse merge).
pub fn merge_opt<T>(dst: &mut Option<T>, src: Option<T>) {
    if src.is_some() {
        *dst = src;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct Widget {
        id: String,
        label: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    }

    impl Widget {
        fn new(id: &str, label: &str) -> Self {
            let epoch = DateTime::<Utc>::UNIX_EPOCH;
            Self { id: id.into(), label: label.into(), created_at: epoch, updated_at: epoch }
        }
    }

    impl Entity for Widget {
        const KIND: &'static str = "Widget";

        fn id(&self) -> &str {
            &self.id
        }

        fn stamp_created(&mut self, at: DateTime<Utc>) {
            self.created_at = at;
            self.updated_at = at;
        }

        fn stamp_updated(&mut self, at: DateTime<Utc>) {
            self.updated_at = at;
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        items: Mutex<HashMap<String, Widget>>,
    }

    #[async_trait]
    impl EntityStore<Widget> for MemoryStore {
        async fn find_by_id(&self, id: &str) -> Result<Option<Widget>> {
            Ok(self.items.lock().await.get(id).cloned())
        }

        async fn find_all(&self) -> Result<Vec<Widget>> {
            Ok(self.items.lock().await.values().cloned().collect())
        }

        async fn insert(&self, entity: &Widget) -> Result<()> {
            self.items.lock().await.insert(entity.id.clone(), entity.clone());
            Ok(())
        }

        async fn save(&self, entity: &Widget) -> Result<()> {
            self.items.lock().await.insert(entity.id.clone(), entity.clone());
            Ok(())
        }

        async fn delete_by_id(&self, id: &str) -> Result<()> {
            self.items.lock().await.remove(id);
            Ok(())
        }
    }

    struct LabelUniqueHooks {
        store: Arc<MemoryStore>,
    }

    #[async_trait]
    impl LifecycleHooks<Widget> for LabelUniqueHooks {
        async fn find_conflict(&self, candidate: &Widget) -> Result<Option<String>> {
            let items = self.store.items.lock().await;
            Ok(items
                .values()
                .find(|w| w.label == candidate.label)
                .map(|w| w.label.clone()))
        }

        fn before_insert(&self, entity: &mut Widget) -> Result<()> {
            if entity.label.is_empty() {
                entity.label = "unnamed".to_string();
            }
            Ok(())
        }
    }

    fn service_with_store() -> (LifecycleService<Widget, LabelUniqueHooks>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let hooks = LabelUniqueHooks { store: store.clone() };
        (LifecycleService::new(store.clone(), hooks), store)
    }

    #[tokio::test]
    async fn create_stamps_timestamps_and_runs_hook() {
        let (service, _) = service_with_store();

        let created = service.create(Widget::new("w1", "")).await.expect("create");
        assert_eq!(created.label, "unnamed");
        assert!(created.created_at > DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(created.created_at, created.updated_at);
    }

    #[tokio::test]
    async fn create_duplicate_fails_without_side_effect() {
        let (service, store) = service_with_store();

        service.create(Widget::new("w1", "alpha")).await.expect("first create");
        let err = service.create(Widget::new("w2", "alpha")).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyExists { .. }));

        // The loser must not have been persisted
        assert_eq!(store.items.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let (service, _) = service_with_store();
        let err = service.get("nope").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert_eq!(err.to_string(), "Widget not found: 'nope'");
    }

    #[tokio::test]
    async fn list_empty_store_yields_empty_vec() {
        let (service, _) = service_with_store();
        assert!(service.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn delete_returns_pre_removal_value() {
        let (service, store) = service_with_store();

        let created = service.create(Widget::new("w1", "alpha")).await.expect("create");
        let removed = service.delete("w1").await.expect("delete");

        assert_eq!(removed, created);
        assert!(store.items.lock().await.is_empty());

        let err = service.delete("w1").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn persist_update_refreshes_updated_only() {
        let (service, _) = service_with_store();

        let mut widget = service.create(Widget::new("w1", "alpha")).await.expect("create");
        let created_at = widget.created_at;
        let updated_before = widget.updated_at;

        widget.label = "beta".to_string();
        service.persist_update(&mut widget).await.expect("update");

        assert_eq!(widget.created_at, created_at);
        assert!(widget.updated_at >= updated_before);

        let stored = service.get("w1").await.expect("get");
        assert_eq!(stored.label, "beta");
    }

    #[test]
    fn merge_applies_only_present_values() {
        let mut label = "alpha".to_string();
        merge(&mut label, None);
        assert_eq!(label, "alpha");
        merge(&mut label, Some("beta".to_string()));
        assert_eq!(label, "beta");

        let mut phone: Option<String> = Some("123".to_string());
        merge_opt(&mut phone, None);
        assert_eq!(phone.as_deref(), Some("123"));
        merge_opt(&mut phone, Some("456".to_string()));
        assert_eq!(phone.as_deref(), Some("456"));
    }
}
