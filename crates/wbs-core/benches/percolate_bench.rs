use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use wbs_core::{DepthCode, Percolator, TaskRecord, Tree, TreeBuilder};

/// Tree with `fanout` children per node down to `depth` levels
fn plan(fanout: usize, depth: usize) -> Tree {
    fn add(builder: &mut TreeBuilder, level: usize, fanout: usize, depth: usize, counter: &mut usize) {
        *counter += 1;
        let day = *counter % 28 + 1;
        let mut record = TaskRecord::new(DepthCode::for_level('*', level), format!("t{counter}"), "task")
            .with_status(i32::try_from(*counter % 101).unwrap_or(0));
        if *counter % 3 == 0 {
            record = record.with_start(format!("2024-03-{day:02}"));
        }
        if *counter % 5 == 0 {
            record = record.with_end(format!("2024-09-{day:02}"));
        }
        builder.add_node(record).unwrap();
        if level < depth {
            for _ in 0..fanout {
                add(builder, level + 1, fanout, depth, counter);
            }
        }
    }

    let mut builder = TreeBuilder::new();
    let mut counter = 0;
    add(&mut builder, 0, fanout, depth, &mut counter);
    builder.finish()
}

fn bench_percolate(c: &mut Criterion) {
    let mut group = c.benchmark_group("percolate");
    for (fanout, depth) in [(4, 5), (10, 3), (2, 12)] {
        let tree = plan(fanout, depth);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{fanout}x{depth}")),
            &tree,
            |b, tree| {
                b.iter(|| {
                    let mut tree = tree.clone();
                    black_box(Percolator::new().with_fix(true).run(&mut tree))
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_percolate);
criterion_main!(benches);
