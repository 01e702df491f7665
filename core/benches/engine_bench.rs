use criterion::{criterion_group, criterion_main, Criterion};
use lyric_core::tokenizer::tokenize;
use lyric_core::Index;

fn synthetic_corpus(docs: usize) -> Vec<String> {
    let words = ["love", "baby", "night", "heart", "dance", "rain", "road", "fire", "home", "blue", "gold", "river"];
    (0..docs)
        .map(|i| (0..40).map(|j| words[(i * 7 + j * 3 + j * j) % words.len()]).collect::<Vec<_>>().join(" "))
        .collect()
}

fn bench_engine(c: &mut Criterion) {
    let corpus = synthetic_corpus(2_000);
    c.bench_function("tokenize_line", |b| b.iter(|| tokenize(&corpus[0])));
    c.bench_function("build_2k", |b| b.iter(|| Index::from_texts(corpus.iter().cloned())));
    let index = Index::from_texts(corpus.iter().cloned());
    c.bench_function("search_2k", |b| b.iter(|| index.search("heart of gold on the river road")));
}

criterion_group!(benches, bench_engine);
criterion_main!(benches);
