use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sim_core::ItemSlot;
use sim_runtime::Engine;

fn bench_season(c: &mut Criterion) {
    c.bench_function("full_season", |b| {
        b.iter(|| {
            let mut engine = Engine::from_seed(42);
            while !engine.is_over() {
                for slot in ItemSlot::ALL {
                    let _ = engine.purchase(slot, 4);
                }
                let _ = engine.manufacture(ItemSlot::ALL[0], 4);
                let _ = engine.sell(ItemSlot::ALL[0], 4);
                engine.advance_month();
            }
            black_box(engine.net_worth())
        })
    });
}

criterion_group!(benches, bench_season);
criterion_main!(benches);
