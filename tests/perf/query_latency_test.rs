use std::time::Instant;

use crate::model::Candidate;
use crate::search::{EditDistanceScorer, MatchEngine, MatchOptions};

fn p95_ms(samples: &mut [f64]) -> f64 {
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let last = samples.len().saturating_sub(1);
    let idx = ((last as f64) * 0.95).round() as usize;
    samples[idx.min(last)]
}

#[test]
fn warm_query_p95_under_50ms() {
    let mut bookmarks: Vec<Candidate> = (0..2_000)
        .map(|i| {
            Candidate::new(
                &i.to_string(),
                &format!("Reading list {i:04}"),
                &format!("https://news.example.org/articles/{i:04}"),
            )
        })
        .collect();

    bookmarks.push(Candidate::new("gh", "GitHub", "https://github.com"));

    let mut engine = MatchEngine::new(Box::new(EditDistanceScorer::default()), MatchOptions::default());
    engine.index(bookmarks).expect("index should build");

    for _ in 0..10 {
        let _ = engine.query("gthub");
    }

    let mut batch_p95 = Vec::with_capacity(5);
    for _ in 0..5 {
        let mut samples = Vec::with_capacity(40);
        for _ in 0..40 {
            let start = Instant::now();
            let results = engine.query("gthub");
            samples.push(start.elapsed().as_secs_f64() * 1000.0);
            assert_eq!(results[0].candidate.id, "gh");
        }
        batch_p95.push(p95_ms(&mut samples));
    }

    batch_p95.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median_p95 = batch_p95[batch_p95.len() / 2];

    assert!(
        median_p95 <= 50.0,
        "median batch p95 too high: {median_p95:.3}ms (budget 50.0ms); batches={batch_p95:?}",
    );
}
