//! Benchmarks for the pagination core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use shelf_reader::{
    find_page_containing_offset, Book, DisplayConfig, Measure, MemoryStore, Paginator,
    ReaderSession, TextMetricsMeasurer,
};

fn default_config() -> DisplayConfig {
    DisplayConfig::new(420.0, 720.0)
}

fn sample_book(chapters: usize, paragraphs: usize) -> String {
    let mut content = String::new();
    for chapter in 0..chapters {
        content.push_str(&format!("<h1>Chapter {}</h1>", chapter + 1));
        for i in 0..paragraphs {
            content.push_str(&format!(
                "<p>Paragraph {} keeps going long enough to wrap over several lines. \
                 It has sentences, clauses, and <em>inline markup</em>; 中文内容也在这里，用来测试宽字符。</p>",
                i
            ));
        }
    }
    content
}

fn bench_measure_fragment(c: &mut Criterion) {
    c.bench_function("measure_fragment", |b| {
        let content = sample_book(1, 20);
        let config = default_config();
        let mut measurer = TextMetricsMeasurer::new();

        b.iter(|| {
            black_box(measurer.measure(black_box(&content), &config).ok());
        });
    });
}

fn bench_paginate_small(c: &mut Criterion) {
    c.bench_function("paginate_small_book", |b| {
        let content = sample_book(2, 10);
        let config = default_config();
        let mut measurer = TextMetricsMeasurer::new();

        b.iter(|| {
            let mut paginator = Paginator::new();
            black_box(paginator.paginate(&content, &config, &mut measurer));
        });
    });
}

fn bench_paginate_large(c: &mut Criterion) {
    let mut group = c.benchmark_group("paginate_large_book");
    group.sample_size(10);
    group.bench_function("text_metrics", |b| {
        // ~100 pages
        let content = sample_book(20, 25);
        let config = default_config();
        let mut measurer = TextMetricsMeasurer::new();

        b.iter(|| {
            let mut paginator = Paginator::new();
            black_box(paginator.paginate(&content, &config, &mut measurer));
        });
    });
    group.finish();
}

fn bench_cache_hit(c: &mut Criterion) {
    c.bench_function("paginate_cache_hit", |b| {
        let content = sample_book(5, 20);
        let config = default_config();
        let mut measurer = TextMetricsMeasurer::new();
        let mut paginator = Paginator::new();
        paginator.paginate(&content, &config, &mut measurer);

        b.iter(|| {
            black_box(paginator.paginate(black_box(&content), &config, &mut measurer));
        });
    });
}

fn bench_find_page(c: &mut Criterion) {
    c.bench_function("find_page_containing_offset", |b| {
        let content = sample_book(10, 20);
        let mut paginator = Paginator::new();
        let pages = paginator.paginate(&content, &default_config(), &mut TextMetricsMeasurer::new());
        let offset = content.len() * 2 / 3;

        b.iter(|| {
            black_box(find_page_containing_offset(&pages, black_box(offset)));
        });
    });
}

fn bench_font_reflow(c: &mut Criterion) {
    let mut group = c.benchmark_group("font_size_reflow");
    group.sample_size(10);
    group.bench_function("session", |b| {
        let book = Book::new("bench", "Bench", sample_book(5, 20));
        let mut session = ReaderSession::open(
            book,
            MemoryStore::new(),
            TextMetricsMeasurer::new(),
            420.0,
            720.0,
        );
        session.navigate(session.state().total_pages / 2);
        let mut step = 0.5;

        b.iter(|| {
            if !session.change_font_size(step) {
                step = -step;
                session.change_font_size(step);
            }
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_measure_fragment,
    bench_paginate_small,
    bench_paginate_large,
    bench_cache_hit,
    bench_find_page,
    bench_font_reflow,
);

criterion_main!(benches);
