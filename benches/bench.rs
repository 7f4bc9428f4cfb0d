// Criterion benchmarks for Bsky Org Search

use bsky_org_search::core::{distance::levenshtein_distance, filters::matches_organization, Matcher};
use bsky_org_search::models::{ActorProfile, MatchThresholds, SearchQuery};
use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn create_actor(id: usize) -> ActorProfile {
    let (display_name, description) = match id % 4 {
        0 => ("University of Oxford", "Official account of the University"),
        1 => ("Oxford University Press", "Publishing since 1478"),
        2 => ("Oxfrod Univeristy Alumni", "Unofficial alumni group"),
        _ => ("Home Baker", "Bread, cakes and the occasional pie"),
    };

    ActorProfile {
        handle: format!("actor{}.bsky.social", id),
        display_name: Some(display_name.to_string()),
        description: Some(description.to_string()),
        follower_count: id as u64,
        following_count: 10,
        posts_count: 100,
    }
}

fn bench_levenshtein_distance(c: &mut Criterion) {
    c.bench_function("levenshtein_distance", |b| {
        b.iter(|| levenshtein_distance(black_box("wellcome"), black_box("welcome")));
    });

    c.bench_function("levenshtein_distance_long", |b| {
        b.iter(|| {
            levenshtein_distance(
                black_box("london school of hygiene and tropical medicine"),
                black_box("london school of economics and political science"),
            )
        });
    });
}

fn bench_matches_organization(c: &mut Criterion) {
    let thresholds = MatchThresholds::default();

    c.bench_function("matches_organization_exact", |b| {
        b.iter(|| {
            matches_organization(
                black_box("Natural History Museum"),
                black_box("natural history museum london"),
                &thresholds,
            )
        });
    });

    // Falls through every stage to the fuzzy comparison
    c.bench_function("matches_organization_fuzzy", |b| {
        b.iter(|| {
            matches_organization(
                black_box("Wellcome Sanger Institute"),
                black_box("welcome sanger institue genomics research"),
                &thresholds,
            )
        });
    });
}

fn bench_evaluate_page(c: &mut Criterion) {
    let matcher = Matcher::default();
    let query = SearchQuery::new("University of Oxford", "university");
    let date = NaiveDate::from_ymd_opt(2024, 11, 20).unwrap();

    let mut group = c.benchmark_group("evaluate_page");

    for page_size in [10, 25, 50, 100].iter() {
        let actors: Vec<ActorProfile> = (0..*page_size).map(create_actor).collect();

        group.bench_with_input(BenchmarkId::new("actors", page_size), page_size, |b, _| {
            b.iter(|| matcher.evaluate_page(black_box(&query), black_box(actors.clone()), date));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_levenshtein_distance,
    bench_matches_organization,
    bench_evaluate_page
);

criterion_main!(benches);
