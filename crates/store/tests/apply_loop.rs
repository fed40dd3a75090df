#![forbid(unsafe_code)]

use lager_core::{Product, ProductPatch, StockStatus};
use lager_store::{spawn_inventory, Mutation};

fn product(n: u32, quantity: u32) -> Product {
    Product {
        id: format!("prod-{}", n),
        sku: format!("SKU-{:06}", n),
        name: format!("Widget Pro {}", n),
        category: "Electronics".into(),
        price: 19.99,
        quantity,
        status: StockStatus::from_quantity(quantity),
        supplier: "TechCorp".into(),
        location: "Warehouse A".into(),
        last_updated: 0,
    }
}

#[tokio::test]
async fn loop_applies_mutations_and_swaps_snapshots() {
    let (tx, handle) = spawn_inventory(64);
    let mut epoch_rx = handle.subscribe_epoch();

    tx.send(Mutation::SetAll(vec![product(1, 0), product(2, 10)]))
        .await
        .unwrap();
    epoch_rx.changed().await.unwrap();
    let snap = handle.current();
    assert_eq!(snap.items.len(), 2);
    assert_eq!(snap.items[0].status, StockStatus::OutOfStock);

    tx.send(Mutation::Update {
        id: "prod-2".into(),
        patch: ProductPatch { quantity: Some(60), ..Default::default() },
        now: 123,
    })
    .await
    .unwrap();
    tx.send(Mutation::Remove("prod-1".into())).await.unwrap();
    // the ticker may publish between the two mutations; wait until both landed
    let snap2 = loop {
        epoch_rx.changed().await.unwrap();
        let s = handle.current();
        if s.items.len() == 1 {
            break s;
        }
    };
    assert_eq!(snap2.items.len(), 1);
    assert_eq!(snap2.items[0].id, "prod-2");
    assert_eq!(snap2.items[0].status, StockStatus::InStock);
    assert_eq!(snap2.items[0].last_updated, 123);
    assert!(snap2.epoch > snap.epoch);

    // dropping the sender flushes and stops the loop
    drop(tx);
}

#[tokio::test]
async fn snapshots_are_immutable_across_swaps() {
    let (tx, handle) = spawn_inventory(16);
    let mut epoch_rx = handle.subscribe_epoch();

    tx.send(Mutation::SetAll(vec![product(1, 5)])).await.unwrap();
    epoch_rx.changed().await.unwrap();
    let before = handle.current();

    tx.send(Mutation::Remove("prod-1".into())).await.unwrap();
    epoch_rx.changed().await.unwrap();
    let after = handle.current();

    // the old snapshot still holds the removed row
    assert_eq!(before.items.len(), 1);
    assert_eq!(after.items.len(), 0);
}
