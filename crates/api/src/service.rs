//! Mutation service: business rules in front of the entity store.
//!
//! Every accepted mutation also enqueues a toast, so callers get the
//! store change and its user-facing acknowledgement from one call.

use std::sync::Arc;

use lager_core::{InventorySnapshot, InventoryStats, Product, ProductId, ProductPatch};
use lager_notify::{NotificationQueue, Severity};
use lager_store::EntityStore;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::{LagerError, LagerResult};

/// What a mutation did. `NotFound` and `Duplicate` are outcomes, not
/// errors: the caller decides whether to surface them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    NotFound,
    Duplicate,
}

/// Owns the store and the notification queue; all writes go through here.
pub struct InventoryService {
    store: EntityStore,
    notifications: NotificationQueue,
}

impl Default for InventoryService {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryService {
    pub fn new() -> Self {
        Self {
            store: EntityStore::new(),
            notifications: NotificationQueue::default(),
        }
    }

    pub fn with_ttl(ttl: std::time::Duration) -> Self {
        Self {
            store: EntityStore::new(),
            notifications: NotificationQueue::new(ttl),
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationQueue {
        &mut self.notifications
    }

    /// Replace the whole catalog, e.g. after a successful fetch.
    pub fn load(&mut self, records: Vec<Product>) {
        let n = records.len();
        self.store.set_all(records);
        info!(count = n, epoch = self.store.epoch(), "service: catalog loaded");
    }

    pub fn snapshot(&self) -> Arc<InventorySnapshot> {
        self.store.freeze()
    }

    pub fn stats(&self) -> InventoryStats {
        lager_select::compute_stats(&self.store.freeze())
    }

    /// Insert a new record. Validation failures are errors; a duplicate id
    /// is an outcome the store absorbs.
    pub fn add_product(&mut self, product: Product) -> LagerResult<MutationOutcome> {
        validate_name(&product.name)?;
        validate_price(product.price)?;
        let name = product.name.clone();
        if !self.store.add_one(product) {
            warn!(%name, "service: add ignored, id already present");
            return Ok(MutationOutcome::Duplicate);
        }
        metrics::counter!("mutations_applied_total", 1u64);
        self.notifications.enqueue(
            Severity::Success,
            "Product Added",
            format!("{name} has been added to inventory."),
            Instant::now(),
        );
        Ok(MutationOutcome::Applied)
    }

    /// Merge a patch into an existing record, restamping `last_updated`.
    pub fn update_product(
        &mut self,
        id: &ProductId,
        patch: ProductPatch,
    ) -> LagerResult<MutationOutcome> {
        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        if let Some(price) = patch.price {
            validate_price(price)?;
        }
        let now = chrono::Utc::now().timestamp();
        if !self.store.update_one(id, &patch, now) {
            warn!(%id, "service: update target not found");
            return Ok(MutationOutcome::NotFound);
        }
        // read back the post-merge name for the toast
        let name = self
            .store
            .get(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.clone());
        metrics::counter!("mutations_applied_total", 1u64);
        self.notifications.enqueue(
            Severity::Success,
            "Product Updated",
            format!("{name} has been updated."),
            Instant::now(),
        );
        Ok(MutationOutcome::Applied)
    }

    pub fn delete_product(&mut self, id: &ProductId) -> LagerResult<MutationOutcome> {
        if !self.store.remove_one(id) {
            warn!(%id, "service: delete target not found");
            return Ok(MutationOutcome::NotFound);
        }
        metrics::counter!("mutations_applied_total", 1u64);
        self.notifications.enqueue(
            Severity::Success,
            "Product Deleted",
            "The product has been removed from inventory.",
            Instant::now(),
        );
        Ok(MutationOutcome::Applied)
    }
}

fn validate_name(name: &str) -> LagerResult<()> {
    if name.trim().is_empty() {
        return Err(LagerError::Validation("product name must not be empty".into()));
    }
    Ok(())
}

fn validate_price(price: f64) -> LagerResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(LagerError::Validation("price must be a non-negative number".into()));
    }
    Ok(())
}
