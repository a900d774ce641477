use std::hint::black_box;
use std::time::Instant;

use serde_json::json;
use titik_fiksi::{
    adjacency_confirmed, chapter_code, render_body, resolve_catalog, ChapterStrategy,
    MemorySource, SiteConfig,
};

const SIZES: &[usize] = &[10, 100, 199];

#[derive(Clone, Debug)]
struct CaseResult {
    fixture: String,
    case: String,
    iterations: usize,
    min_ns: u128,
    median_ns: u128,
    mean_ns: u128,
    max_ns: u128,
    fetches_per_iter: usize,
}

fn percentile_u128(sorted: &[u128], percentile: f64) -> u128 {
    let idx = ((sorted.len().saturating_sub(1) as f64) * percentile).round() as usize;
    sorted[idx]
}

fn body(paragraphs: usize) -> String {
    let mut out = String::new();
    for n in 0..paragraphs {
        out.push_str(&format!(
            "Paragraf {} dengan **penekanan** dan *miring* <tanda> & lainnya.\nBaris kedua.\n\n",
            n
        ));
        if n % 10 == 9 {
            out.push_str("***\n\n");
        }
    }
    out
}

fn fixture(chapters: usize) -> MemorySource {
    let mut source = MemorySource::new();
    let mut listed = Vec::with_capacity(chapters);
    for n in 1..=chapters {
        let code = chapter_code(n);
        let doc = json!({ "title": format!("Bab {}", n), "content": body(20) });
        source.insert(format!("content/chapters/probe-{}.json", code), doc.clone());
        let mut entry = doc;
        entry["code"] = json!(code);
        entry["published"] = json!(true);
        listed.push(entry);
    }
    source.insert(
        "content/chapters/aggregate.json",
        json!({ "chapters": listed }),
    );
    source
}

fn run_case<F>(
    fixture: &str,
    case: &str,
    source: &MemorySource,
    warmup_iters: usize,
    measure_iters: usize,
    mut op: F,
) -> CaseResult
where
    F: FnMut() -> usize,
{
    for _ in 0..warmup_iters {
        black_box(op());
    }

    source.reset_log();
    let mut time_samples = Vec::with_capacity(measure_iters);
    for _ in 0..measure_iters {
        let start = Instant::now();
        black_box(op());
        time_samples.push(start.elapsed().as_nanos());
    }
    let fetches = source.fetch_count() / measure_iters.max(1);

    time_samples.sort_unstable();
    let time_sum: u128 = time_samples.iter().copied().sum();
    CaseResult {
        fixture: fixture.to_string(),
        case: case.to_string(),
        iterations: measure_iters,
        min_ns: time_samples[0],
        median_ns: percentile_u128(&time_samples, 0.5),
        mean_ns: time_sum / time_samples.len() as u128,
        max_ns: time_samples[time_samples.len() - 1],
        fetches_per_iter: fetches,
    }
}

fn main() {
    let quick = std::env::args().any(|arg| arg == "--quick");
    let warmup_iters = if quick { 1 } else { 3 };
    let measure_iters = if quick { 5 } else { 30 };

    println!("# titik-fiksi catalog benchmark");
    println!(
        "# mode={} warmup_iters={} measure_iters={}",
        if quick { "quick" } else { "full" },
        warmup_iters,
        measure_iters
    );
    println!("fixture,case,iterations,min_ns,median_ns,mean_ns,max_ns,fetches_per_iter");

    let aggregate = SiteConfig {
        strategy: ChapterStrategy::Aggregate,
        ..SiteConfig::default()
    };
    let probe = SiteConfig {
        strategy: ChapterStrategy::Probe,
        ..SiteConfig::default()
    };

    let mut results = Vec::new();
    for &size in SIZES {
        let key = format!("chapters-{}", size);
        let source = fixture(size);

        results.push(run_case(
            &key,
            "resolve_aggregate",
            &source,
            warmup_iters,
            measure_iters,
            || resolve_catalog(&source, &aggregate, "aggregate").len(),
        ));
        results.push(run_case(
            &key,
            "resolve_probe",
            &source,
            warmup_iters,
            measure_iters,
            || resolve_catalog(&source, &probe, "probe").len(),
        ));

        let probed = resolve_catalog(&source, &probe, "probe");
        let middle = chapter_code(size / 2 + 1);
        results.push(run_case(
            &key,
            "adjacency_confirmed_probe",
            &source,
            warmup_iters,
            measure_iters,
            || {
                adjacency_confirmed(&source, &probe, &probed, &middle)
                    .map(|nav| nav.index)
                    .unwrap_or_default()
            },
        ));
    }

    let long_body = body(400);
    let empty = MemorySource::new();
    results.push(run_case(
        "body-400-paragraphs",
        "render_body",
        &empty,
        warmup_iters,
        measure_iters,
        || render_body(Some(long_body.as_str())).len(),
    ));

    for r in results {
        println!(
            "{},{},{},{},{},{},{},{}",
            r.fixture,
            r.case,
            r.iterations,
            r.min_ns,
            r.median_ns,
            r.mean_ns,
            r.max_ns,
            r.fetches_per_iter
        );
    }
}
