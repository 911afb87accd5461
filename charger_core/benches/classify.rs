use charger_core::{
    ClassificationResult, RankScope, RawSample, SampleFrame, classify, rank_cells,
};
use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

// Deterministic tap frames spread across all three bands
fn synth_frames(n: usize, seed: u32) -> Vec<SampleFrame> {
    let mut state = seed.max(1);
    let mut next_code = || {
        let mut x = state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        state = x;
        (x & 0x0FFF) as u16
    };
    (0..n)
        .map(|_| {
            let mut taps = [RawSample::ZERO; 6];
            for t in &mut taps {
                *t = RawSample::masked(next_code());
            }
            SampleFrame::from_cells(taps)
        })
        .collect()
}

pub fn bench_classify_rank(c: &mut Criterion) {
    let mut g = c.benchmark_group("cycle");
    //   BENCH_SAMPLE_SIZE=10 cargo bench -p charger_core --bench classify
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE")
        && let Ok(n) = ss.parse::<usize>()
    {
        g.sample_size(n.max(10));
    }

    let frames = synth_frames(4_096, 0xC0FFEE);

    g.bench_function("classify", |b| {
        b.iter(|| {
            for f in &frames {
                black_box(classify(black_box(f.cells)));
            }
        })
    });

    for scope in [RankScope::Populated, RankScope::All] {
        g.bench_function(format!("rank_{scope:?}").to_lowercase(), |b| {
            b.iter_batched(
                || frames.clone(),
                |fs| {
                    for f in &fs {
                        let r = rank_cells(
                            f,
                            ClassificationResult {
                                cell_count: 6,
                                fault: false,
                            },
                            scope,
                        );
                        black_box(r);
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }
    g.finish();
}

criterion_group!(cycle, bench_classify_rank);
criterion_main!(cycle);
