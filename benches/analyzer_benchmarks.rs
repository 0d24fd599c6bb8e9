//! End-to-end analyzer benchmarks.
//!
//! Measures the pattern front end across its pipeline stages: lexing,
//! parsing, the canonical rewrites, and full semantic analysis.
//!
//! ```bash
//! cargo bench
//! cargo bench pattern_parsing
//! cargo bench pipeline_stages
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gql_analyzer::lexer::Lexer;
use gql_analyzer::semantic::SyntaxAnalyzer;
use gql_analyzer::{parse, rewrite};

fn analyze(source: &str) {
    let mut program = parse(source).program.expect("benchmark query parses");
    SyntaxAnalyzer::new()
        .analyze(&mut program)
        .expect("benchmark query analyzes");
}

fn bench_pattern_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern_parsing");

    let queries = vec![
        ("minimal", "MATCH (n)"),
        ("labeled_chain", "MATCH (a:Person)-[e:KNOWS]->(b:Person)"),
        ("properties", "MATCH (a:Person {name: 'Alice', age: 30})"),
        (
            "quantified",
            "MATCH TRAIL ((a:Person)-[e:KNOWS]->(b:Person)){1,5}",
        ),
        (
            "union",
            "MATCH (a)-[b]->(c) | (a)-[d]->(e) | (a)~[f]~(g)",
        ),
        (
            "simplified",
            "MATCH (a) ~/ KNOWS |+| (LIKES | FOLLOWS FOLLOWS) /~> (b)",
        ),
    ];

    for (name, query) in queries {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(name), &query, |b, q| {
            b.iter(|| parse(black_box(q)));
        });
    }

    group.finish();
}

fn bench_full_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_analysis");

    let queries = vec![
        ("simple", "MATCH (a)-[b]->(c) WHERE a.age > 18"),
        (
            "selective",
            "MATCH ANY SHORTEST (x) ((a)-[b]->)+ (y), (x)-[z]->(w)",
        ),
        (
            "union_where",
            "MATCH ((a)-[b]->(c) WHERE a.p = 1) | ((a)-[d]->(e) WHERE a.q = 2)",
        ),
        (
            "property_heavy",
            "MATCH (a {p1: 1, p2: 2, p3: 3})-[e {q1: 1}]->(b {r1: 1, r2: 2})",
        ),
    ];

    for (name, query) in queries {
        group.bench_with_input(BenchmarkId::from_parameter(name), &query, |b, q| {
            b.iter(|| analyze(black_box(q)));
        });
    }

    group.finish();
}

fn bench_wide_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("wide_patterns");
    group.sample_size(50);

    for width in [10usize, 50, 100] {
        let mut query = String::from("MATCH (n0)");
        for i in 1..width {
            query.push_str(&format!("-[e{i}]->(n{i})"));
        }

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{width}_hops")),
            &query,
            |b, q| {
                b.iter(|| analyze(black_box(q)));
            },
        );
    }

    group.finish();
}

fn bench_pipeline_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_stages");

    let query = "MATCH (a:Person {name: 'Alice'}) -/KNOWS/-> (b WHERE b.age > 25), (a)-[e]->(c)";

    group.bench_function("01_lexer_only", |b| {
        b.iter(|| Lexer::new(black_box(query)).tokenize());
    });

    group.bench_function("02_parse_only", |b| {
        b.iter(|| parse(black_box(query)));
    });

    group.bench_function("03_parse_and_rewrite", |b| {
        b.iter(|| {
            let mut program = parse(black_box(query)).program.expect("parses");
            rewrite::rewrite_program(&mut program).expect("rewrites");
            program
        });
    });

    group.bench_function("04_parse_rewrite_analyze", |b| {
        b.iter(|| analyze(black_box(query)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_pattern_parsing,
    bench_full_analysis,
    bench_wide_patterns,
    bench_pipeline_stages,
);

criterion_main!(benches);
