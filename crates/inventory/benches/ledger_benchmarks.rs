use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::Utc;
use stockbook_core::ItemId;
use stockbook_inventory::{recompute_aggregates, MovementEntry, NewMovement, StockMovement};

fn build_history(item_id: ItemId, len: usize) -> Vec<StockMovement> {
    (0..len)
        .map(|i| {
            let entry = match i % 3 {
                0 => MovementEntry::Restock {
                    quantity: (i % 50 + 1) as i64,
                },
                1 => MovementEntry::Sale {
                    sold_quantity: (i % 20 + 1) as i64,
                },
                _ => MovementEntry::Adjustment {
                    quantity: if i % 2 == 0 { 3 } else { -3 },
                },
            };
            StockMovement::record(NewMovement::new(item_id, entry), Utc::now()).unwrap()
        })
        .collect()
}

fn bench_recompute_aggregates(c: &mut Criterion) {
    let mut group = c.benchmark_group("recompute_aggregates");

    for movement_count in [10, 100, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*movement_count as u64));
        group.bench_with_input(
            BenchmarkId::new("fold", movement_count),
            movement_count,
            |b, &count| {
                let item_id = ItemId::new();
                let history = build_history(item_id, count);
                b.iter(|| black_box(recompute_aggregates(black_box(&history))));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_recompute_aggregates);
criterion_main!(benches);
