use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ring_buffer::VoteWindow;

fn bench_vote_window(c: &mut Criterion) {
    c.bench_function("vote_window_push_9", |b| {
        let mut window = VoteWindow::new(9);
        let mut i = 0u32;
        b.iter(|| {
            i = i.wrapping_add(1);
            window.push(black_box(i % 4 != 0));
            black_box(window.negative_fraction())
        })
    });
}

criterion_group!(benches, bench_vote_window);
criterion_main!(benches);
