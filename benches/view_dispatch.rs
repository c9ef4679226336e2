//! View Benchmarks
//!
//! Benchmarks for the view engine covering:
//! - Cached lookup (hit) versus fresh construction
//! - Dispatch of attribute getters and setters
//! - Provided-body composition
//! - Child enumeration scaling
//!
//! ## Running
//!
//! ```bash
//! cargo bench --bench view_dispatch
//! cargo bench --bench view_dispatch -- "views/lookup"
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use facets::{
    Arg, Contract, ContractSchema, Entity, Marker, MethodSchema, Reply, Result, TypeRef, Value,
    View, ViewEngine,
};

// =============================================================================
// Bench Contract
// =============================================================================

fn doubled(view: &View, _: &[Arg]) -> Result<Reply> {
    let score = view.invoke("score", &[])?.into_optional::<i64>()?;
    Ok(Reply::Value(Value::Int(score.unwrap_or(0) * 2)))
}

struct Player(View);

impl Contract for Player {
    const NAME: &'static str = "Player";

    fn schema() -> ContractSchema {
        ContractSchema::entity(Self::NAME)
            .method(
                MethodSchema::new("score")
                    .returns(TypeRef::optional(TypeRef::payload::<i64>()))
                    .marked(Marker::GetAttribute("score")),
            )
            .method(
                MethodSchema::new("set_score")
                    .param(TypeRef::payload::<i64>())
                    .returns(TypeRef::optional(TypeRef::payload::<i64>()))
                    .marked(Marker::SetAttribute("score")),
            )
            .method(
                MethodSchema::new("doubled")
                    .returns(TypeRef::payload::<i64>())
                    .provided(doubled),
            )
            .method(
                MethodSchema::new("team")
                    .returns(TypeRef::set_of(TypeRef::contract::<Player>()))
                    .marked(Marker::GetEntities { of_type: false }),
            )
    }

    fn from_view(view: View) -> Self {
        Player(view)
    }

    fn as_view(&self) -> &View {
        &self.0
    }
}

/// Child counts for enumeration scaling.
const CHILD_COUNTS: &[usize] = &[1, 16, 256];

// =============================================================================
// Benchmarks
// =============================================================================

fn views_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("views/lookup");
    group.throughput(Throughput::Elements(1));

    let engine = ViewEngine::new();
    let entity = Entity::new();
    engine.get_or_create(&entity, Player::contract()).unwrap();

    group.bench_function("cached_hit", |b| {
        b.iter(|| black_box(engine.get_or_create(&entity, Player::contract()).unwrap()))
    });

    group.bench_function("uncached", |b| {
        b.iter(|| black_box(engine.create_uncached(&entity, Player::contract()).unwrap()))
    });

    group.finish();
}

fn views_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("views/dispatch");
    group.throughput(Throughput::Elements(1));

    let engine = ViewEngine::new();
    let entity = Entity::new();
    let view = engine.get_or_create(&entity, Player::contract()).unwrap();
    view.invoke("set_score", &[Arg::value(1_i64)]).unwrap();

    group.bench_function("get_attribute", |b| {
        b.iter(|| black_box(view.invoke("score", &[]).unwrap()))
    });

    let mut n = 0_i64;
    group.bench_function("set_attribute", |b| {
        b.iter(|| {
            n += 1;
            black_box(view.invoke("set_score", &[Arg::value(n)]).unwrap())
        })
    });

    group.bench_function("provided_body", |b| {
        b.iter(|| black_box(view.invoke("doubled", &[]).unwrap()))
    });

    group.bench_function("pass_through", |b| {
        b.iter(|| black_box(view.invoke("id", &[]).unwrap()))
    });

    group.finish();
}

fn views_enumeration(c: &mut Criterion) {
    let mut group = c.benchmark_group("views/enumeration");

    for &count in CHILD_COUNTS {
        let engine = ViewEngine::new();
        let entity = Entity::new();
        for _ in 0..count {
            entity.new_child(&[]);
        }
        let view = engine.get_or_create(&entity, Player::contract()).unwrap();

        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(BenchmarkId::new("team_set", count), |b| {
            b.iter(|| black_box(view.invoke("team", &[]).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, views_lookup, views_dispatch, views_enumeration);
criterion_main!(benches);
