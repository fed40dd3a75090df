//! Lager store: normalized in-RAM product table and snapshot publisher.
//!
//! The `EntityStore` keeps an ordered id sequence plus an id -> record map;
//! both always agree in membership. Readers never see the mutable table:
//! they get immutable `InventorySnapshot`s swapped through `ArcSwap`, with
//! an epoch watch channel to learn about swaps.

#![forbid(unsafe_code)]

use std::sync::Arc;

use arc_swap::ArcSwap;
use lager_core::{InventorySnapshot, Product, ProductId, ProductPatch, StockStatus};
use rustc_hash::FxHashMap;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// Normalized collection: ordered ids plus id -> record mapping.
///
/// All operations are synchronous and total: unknown ids are absorbed as
/// no-ops and duplicates are ignored. Callers that need to know must check
/// first (or go through the service layer, which reports an outcome).
pub struct EntityStore {
    ids: Vec<ProductId>,
    map: FxHashMap<ProductId, Product>,
    epoch: u64,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self { ids: Vec::new(), map: FxHashMap::default(), epoch: 0 }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn ids(&self) -> &[ProductId] {
        &self.ids
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.map.get(id)
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.ids.iter().filter_map(|id| self.map.get(id))
    }

    /// Replace the entire content. Duplicate ids in the input keep the
    /// last occurrence. Status is re-derived, never trusted from input.
    pub fn set_all(&mut self, records: Vec<Product>) {
        self.ids.clear();
        self.map.clear();
        for mut p in records {
            p.status = StockStatus::from_quantity(p.quantity);
            if !self.map.contains_key(&p.id) {
                self.ids.push(p.id.clone());
            }
            self.map.insert(p.id.clone(), p);
        }
        self.bump();
        metrics::gauge!("store_products", self.ids.len() as f64);
    }

    /// Append a new record; an existing id is silently ignored.
    pub fn add_one(&mut self, mut record: Product) -> bool {
        if self.map.contains_key(&record.id) {
            debug!(id = %record.id, "add_one: id exists, ignored");
            return false;
        }
        record.status = StockStatus::from_quantity(record.quantity);
        self.ids.push(record.id.clone());
        self.map.insert(record.id.clone(), record);
        self.bump();
        metrics::gauge!("store_products", self.ids.len() as f64);
        true
    }

    /// Merge a patch into an existing record, stamping `last_updated` with
    /// `now` and re-deriving status from the (possibly new) quantity.
    /// No-op when the id is unknown.
    pub fn update_one(&mut self, id: &str, patch: &ProductPatch, now: i64) -> bool {
        let Some(p) = self.map.get_mut(id) else {
            debug!(id = %id, "update_one: unknown id, ignored");
            return false;
        };
        patch.apply_to(p);
        p.status = StockStatus::from_quantity(p.quantity);
        p.last_updated = now;
        self.bump();
        true
    }

    /// Remove one record. The id sequence splices; survivors keep their
    /// relative order. No-op when the id is unknown.
    pub fn remove_one(&mut self, id: &str) -> bool {
        if self.map.remove(id).is_none() {
            debug!(id = %id, "remove_one: unknown id, ignored");
            return false;
        }
        self.ids.retain(|x| x != id);
        self.bump();
        metrics::gauge!("store_products", self.ids.len() as f64);
        true
    }

    fn bump(&mut self) {
        self.epoch = self.epoch.saturating_add(1);
        metrics::counter!("store_mutations_total", 1u64);
    }

    /// Freeze the current content into an immutable snapshot.
    pub fn freeze(&self) -> Arc<InventorySnapshot> {
        Arc::new(InventorySnapshot {
            epoch: self.epoch,
            items: self.iter().cloned().collect(),
        })
    }
}

/// Mutation commands accepted by the inventory loop. Each is applied as a
/// targeted single-key merge or a whole-container replacement; there is no
/// read-modify-write from outside.
#[derive(Debug, Clone)]
pub enum Mutation {
    SetAll(Vec<Product>),
    Add(Product),
    Update { id: ProductId, patch: ProductPatch, now: i64 },
    Remove(ProductId),
}

/// Handle for readers: current snapshot plus epoch subscription.
pub struct StoreHandle {
    snap: Arc<ArcSwap<InventorySnapshot>>,
    epoch_rx: watch::Receiver<u64>,
}

impl StoreHandle {
    pub fn current(&self) -> Arc<InventorySnapshot> {
        self.snap.load_full()
    }

    pub fn subscribe_epoch(&self) -> watch::Receiver<u64> {
        self.epoch_rx.clone()
    }
}

/// Spawn the inventory apply loop: consumes mutations, applies them to the
/// store, and swaps a fresh snapshot after each drained batch. Returns the
/// mutation sender and a read handle.
pub fn spawn_inventory(cap: usize) -> (mpsc::Sender<Mutation>, StoreHandle) {
    let (tx, mut rx) = mpsc::channel::<Mutation>(cap);
    let snap = Arc::new(ArcSwap::from_pointee(InventorySnapshot::default()));
    let (epoch_tx, epoch_rx) = watch::channel(0u64);
    let snap_clone = Arc::clone(&snap);

    tokio::spawn(async move {
        let mut store = EntityStore::new();
        let mut dirty = false;
        let mut ticker = tokio::time::interval(std::time::Duration::from_millis(8));
        loop {
            tokio::select! {
                maybe = rx.recv() => {
                    match maybe {
                        Some(m) => {
                            apply_mutation(&mut store, m);
                            dirty = true;
                        }
                        None => {
                            debug!("mutation channel closed; flushing and exiting inventory loop");
                            if dirty {
                                publish(&store, &snap_clone, &epoch_tx);
                            }
                            break;
                        }
                    }
                }
                _ = ticker.tick() => {
                    if dirty {
                        publish(&store, &snap_clone, &epoch_tx);
                        dirty = false;
                    }
                }
            }
        }
        info!("inventory loop stopped");
    });

    (tx, StoreHandle { snap, epoch_rx })
}

fn apply_mutation(store: &mut EntityStore, m: Mutation) {
    match m {
        Mutation::SetAll(records) => store.set_all(records),
        Mutation::Add(p) => {
            store.add_one(p);
        }
        Mutation::Update { id, patch, now } => {
            store.update_one(&id, &patch, now);
        }
        Mutation::Remove(id) => {
            store.remove_one(&id);
        }
    }
}

fn publish(
    store: &EntityStore,
    snap: &Arc<ArcSwap<InventorySnapshot>>,
    epoch_tx: &watch::Sender<u64>,
) {
    let next = store.freeze();
    let epoch = next.epoch;
    snap.store(next);
    let _ = epoch_tx.send(epoch);
}
