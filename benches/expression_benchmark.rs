//! Remote Expression Benchmarks
//!
//! Covers compilation, evaluation and the canonical encoding of programs of
//! increasing size.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use remote_expression::capability::{Equatable, Numeric};
use remote_expression::codec;
use remote_expression::{
    EvaluationContext, Evaluator, Expression, Function, ProgramDigest, RuntimeValue,
};
use std::hint::black_box;

/// `depth` nested applications of an increment function to the subject
fn increment_chain(depth: usize) -> Expression<i64> {
    let inc = Function::new(|x: Expression<i64>| x.add(Expression::integer(1), Numeric::integer()));
    (0..depth).fold(Expression::identity(), |acc, _| inc.apply(acc))
}

/// Guarded division evaluated on both branches of a diverge
fn guarded_division() -> Expression<i64> {
    Expression::let_in(Expression::<i64>::identity(), |b| {
        b.clone()
            .equal_to(Expression::integer(0), Equatable::integer())
            .diverge(
                Expression::integer(0),
                Expression::integer(100).divide(b, Numeric::integer()),
            )
    })
}

const DEPTHS: &[usize] = &[1, 8, 64];

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    group.throughput(Throughput::Elements(1));

    for depth in DEPTHS {
        let expression = increment_chain(*depth);
        group.bench_with_input(
            BenchmarkId::new("increment_chain", depth),
            &expression,
            |b, expr| b.iter(|| black_box(expr.compile())),
        );
    }

    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    group.throughput(Throughput::Elements(1));

    let evaluator = Evaluator::new();
    let context = EvaluationContext::new();

    for depth in DEPTHS {
        let program = increment_chain(*depth).compile();
        group.bench_with_input(
            BenchmarkId::new("increment_chain", depth),
            &program,
            |b, program| {
                b.iter(|| black_box(evaluator.evaluate(program, &context, &RuntimeValue::Integer(0))))
            },
        );
    }

    let program = guarded_division().compile();
    for subject in [0i64, 5] {
        group.bench_with_input(
            BenchmarkId::new("guarded_division", subject),
            &RuntimeValue::Integer(subject),
            |b, subject| b.iter(|| black_box(evaluator.evaluate(&program, &context, subject))),
        );
    }

    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    for depth in DEPTHS {
        let program = increment_chain(*depth).compile();
        let bytes = codec::to_canonical_bytes(&program);
        group.throughput(Throughput::Bytes(bytes.len() as u64));

        group.bench_with_input(BenchmarkId::new("encode", depth), &program, |b, program| {
            b.iter(|| black_box(codec::to_canonical_bytes(program)))
        });
        group.bench_with_input(BenchmarkId::new("decode", depth), &bytes, |b, bytes| {
            b.iter(|| black_box(codec::from_slice(bytes)))
        });
        group.bench_with_input(BenchmarkId::new("digest", depth), &program, |b, program| {
            b.iter(|| black_box(ProgramDigest::of(program)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compile, bench_evaluate, bench_codec);
criterion_main!(benches);
