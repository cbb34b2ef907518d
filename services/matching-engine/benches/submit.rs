use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use matching_engine::{EngineConfig, MatchingEngine};
use rust_decimal::Decimal;
use types::ids::{CompetitorId, Symbol};
use types::order::{OrderRequest, Side};

fn seeded_engine() -> MatchingEngine {
    let mut engine = MatchingEngine::new(EngineConfig::default());
    engine.add_symbol(Symbol::new("NVR"));
    for name in ["maker", "taker"] {
        engine.register_competitor(CompetitorId::new(name), Decimal::from(10_000_000));
    }
    // 50 levels of depth on each side
    for i in 0..50 {
        let bid = Decimal::new(15_000 - i * 5, 2);
        let ask = Decimal::new(15_005 + i * 5, 2);
        let size = Decimal::from(10);
        let _ = engine.submit(OrderRequest::limit("maker", "NVR", Side::Bid, bid, size));
        let _ = engine.submit(OrderRequest::limit("maker", "NVR", Side::Ask, ask, size));
    }
    engine
}

fn bench_submit(c: &mut Criterion) {
    c.bench_function("submit_passive_limit", |b| {
        b.iter_batched(
            seeded_engine,
            |mut engine| {
                for i in 0..100 {
                    let price = Decimal::new(14_000 - i, 2);
                    let _ = black_box(engine.submit(OrderRequest::limit(
                        "taker",
                        "NVR",
                        Side::Bid,
                        price,
                        Decimal::ONE,
                    )));
                }
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("submit_sweeping_market", |b| {
        b.iter_batched(
            seeded_engine,
            |mut engine| {
                black_box(engine.submit(OrderRequest::market(
                    "taker",
                    "NVR",
                    Side::Bid,
                    Decimal::from(250),
                )))
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_submit);
criterion_main!(benches);
