//! Interpreter execution benchmarks
//!
//! Measures the tree-walking interpreter on small programs:
//! - Arithmetic and loop performance
//! - Method call overhead
//! - String allocation and in-place mutation
//! - Parse cost versus execution cost

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use garnet_runtime::lexer::Lexer;
use garnet_runtime::parser::Parser;
use garnet_runtime::{RuntimeConfig, State};

/// Evaluate source on a fresh buffered state
fn eval_run(source: &str) {
    let mut state = State::open_with(RuntimeConfig::buffered()).unwrap();
    let _ = state.eval_string(source);
    state.close();
}

/// Lex and parse only
fn parse_only(source: &str) {
    let (tokens, _) = Lexer::new(source).tokenize();
    let _ = Parser::new(tokens).parse();
}

fn bench_arithmetic_loop(c: &mut Criterion) {
    c.bench_function("eval_arithmetic_loop_10k", |b| {
        let code = "sum = 0\ni = 0\nwhile i < 10000\n  sum += i\n  i += 1\nend\nsum";
        b.iter(|| eval_run(black_box(code)));
    });
}

fn bench_fibonacci(c: &mut Criterion) {
    c.bench_function("eval_fibonacci_18", |b| {
        let code = "def fib(n)\n  return n if n <= 1\n  fib(n - 1) + fib(n - 2)\nend\nfib(18)";
        b.iter(|| eval_run(black_box(code)));
    });
}

fn bench_string_building(c: &mut Criterion) {
    c.bench_function("eval_string_append_1k", |b| {
        let code = "s = ''\ni = 0\nwhile i < 1000\n  s << 'ab'\n  i += 1\nend\ns.upcase!";
        b.iter(|| eval_run(black_box(code)));
    });
}

fn bench_open_close(c: &mut Criterion) {
    c.bench_function("state_open_close", |b| {
        b.iter(|| {
            let state = State::open_with(RuntimeConfig::buffered()).unwrap();
            black_box(state.close())
        });
    });
}

fn bench_parse_vs_eval(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_vs_eval");
    let code = "def f(x)\n  x * 2 + 1\nend\ni = 0\nwhile i < 200\n  f(i)\n  i += 1\nend";
    group.bench_with_input(BenchmarkId::new("parse", "loop_200"), code, |b, code| {
        b.iter(|| parse_only(black_box(code)));
    });
    group.bench_with_input(BenchmarkId::new("eval", "loop_200"), code, |b, code| {
        b.iter(|| eval_run(black_box(code)));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_arithmetic_loop,
    bench_fibonacci,
    bench_string_building,
    bench_open_close,
    bench_parse_vs_eval
);
criterion_main!(benches);
