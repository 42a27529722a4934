use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sqlfluent::{BoolOp, Query};

/// Build a query with `n` IN-list values and `n` nested OR leaves:
/// SELECT * FROM t WHERE id IN (:param_1, ...) AND (c0 = :v0 OR c1 = :v1 ...)
fn build_query(n: usize) -> Query {
    let mut q = Query::new();
    q.select(["id", "name"]).from("{t}").order_by("id").limit(50);
    let root = q.where_clause();
    root.in_list("id", (0..n as i64).collect::<Vec<_>>());
    root.nested(BoolOp::Or, |c| {
        for i in 0..n {
            c.add_with(format!("c{i} = :v{i}"), [(format!("v{i}"), i as i64)]);
        }
    });
    q
}

fn bench_to_sql(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_builder/to_sql");

    for n in [1, 5, 10, 50, 100] {
        let q = build_query(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &q, |b, q| {
            b.iter(|| black_box(q.to_sql()));
        });
    }

    group.finish();
}

fn bench_params(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_builder/params");

    for n in [1, 5, 10, 50, 100] {
        let q = build_query(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &q, |b, q| {
            b.iter(|| black_box(q.params()));
        });
    }

    group.finish();
}

fn bench_to_positional(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_builder/to_positional");

    for n in [1, 10, 100] {
        let q = build_query(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &q, |b, q| {
            b.iter(|| black_box(q.to_positional()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_to_sql, bench_params, bench_to_positional);
criterion_main!(benches);
