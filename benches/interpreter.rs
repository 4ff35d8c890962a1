use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use voidshell::{Interpreter, ShellObject, Variables};

fn bench_evaluate(c: &mut Criterion) {
    let interpreter = Interpreter::new();
    let variables = Variables::new()
        .with("age", ShellObject::Integer(25))
        .with("name", ShellObject::from("John"))
        .with("active", ShellObject::Boolean(true));

    c.bench_function("assignment", |b| {
        b.iter(|| interpreter.evaluate(black_box("score = 42"), &variables))
    });

    c.bench_function("arithmetic", |b| {
        b.iter(|| interpreter.evaluate(black_box("(age + 5) * 3 % 7 - 2 / 4"), &variables))
    });

    c.bench_function("logic", |b| {
        b.iter(|| {
            interpreter.evaluate(
                black_box("name == 'John' and not active or 1 < age <= 30"),
                &variables,
            )
        })
    });

    c.bench_function("not_found", |b| {
        b.iter(|| interpreter.evaluate(black_box("ls -la ~/projects"), &variables))
    });
}

criterion_group!(benches, bench_evaluate);
criterion_main!(benches);
