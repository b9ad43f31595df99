//! Integration tests for NlgKernels
//!
//! These tests drive whole records through the facade crate.

use nlgkernels::core::config::NarrativeConfig;
use nlgkernels::core::registry::KernelRegistry;
use nlgkernels::narrative::{Record, RecordReader, ReportGenerator, SectionKind};
use serde_json::{json, Value};
use std::io::Cursor;

const MARCH_1_2021: i64 = 1_614_556_800_000;
const THIRTY_DAYS: i64 = 30 * 86_400_000;
const BINS: usize = 12;

fn topic(index: usize, counts: &[f64], regions: Value, buzzwords: Value) -> Value {
    let mut bins = vec![json!({"c": [], "n": [], "p": []}); index + 1];
    let n: Vec<f64> = counts.iter().map(|c| -(c / 5.0).floor()).collect();
    let p: Vec<f64> = counts.iter().map(|c| (c / 2.0).floor()).collect();
    let terms: Vec<Value> = counts
        .iter()
        .map(|_| json!([{"text": format!("word{}", index), "c": 1}]))
        .collect();
    bins[index] = json!({"c": counts, "n": n, "p": p, "terms": terms});

    let total: f64 = counts.iter().sum();
    json!({
        "c": total,
        "n": n.iter().sum::<f64>(),
        "p": p.iter().sum::<f64>(),
        "weight": 1,
        "top_regions": regions,
        "buzzwords": buzzwords,
        "timebin": {
            "bucket_start": MARCH_1_2021,
            "bucket_end": MARCH_1_2021 + BINS as i64 * THIRTY_DAYS,
            "interval": THIRTY_DAYS,
            "bins": bins
        }
    })
}

/// Two topics: a steady climb and a flat line.
fn rising_record() -> Value {
    let climbing: Vec<f64> = (0..BINS).map(|t| 10.0 + t as f64).collect();
    let flat = vec![5.0; BINS];
    json!([
        topic(
            0,
            &climbing,
            json!([
                {"display_name": "Canada", "c": 120, "n": -10, "p": 40},
                {"display_name": "Unknown", "c": 66, "n": -2, "p": 5}
            ]),
            json!([{"term": "rate_hike", "c": 30, "n": -6, "p": 12}])
        ),
        topic(
            1,
            &flat,
            json!([{"display_name": "Mexico", "c": 60, "n": -5, "p": 10}]),
            json!([{"term": "rate_hike", "c": 6, "n": 0, "p": 3}])
        ),
    ])
}

// ============================================================================
// Catalog and Registry Tests
// ============================================================================

#[test]
fn test_catalog_domains() {
    let domains = nlgkernels::catalog::domains();
    let features: Vec<&str> = domains.iter().map(|d| d.feature).collect();
    assert_eq!(features, vec!["temporal", "comparative", "narrative"]);

    for domain in &domains {
        assert!(!domain.description.is_empty());
        assert!(domain.kernel_count > 0, "Domain {} has no kernels", domain.name);
    }
}

#[test]
fn test_register_all_twice_fails() {
    let mut registry = KernelRegistry::new();
    nlgkernels::register_all(&mut registry).unwrap();
    assert_eq!(registry.total_count(), nlgkernels::catalog::total_kernel_count());
    assert!(nlgkernels::register_all(&mut registry).is_err());
}

// ============================================================================
// End-to-End Report Tests
// ============================================================================

#[test]
fn test_rising_record_report() {
    let record: Record = serde_json::from_value(rising_record()).unwrap();
    let report = ReportGenerator::new().generate(&record).unwrap();

    let overview = &report.section(SectionKind::Overview).unwrap().lines;
    assert_eq!(
        overview[0],
        "The 246 documents collected from March 1st, 2021 to February 24th, 2022 \
         are categorized into 2 topics."
    );

    let counts = &report.section(SectionKind::TemporalCounts).unwrap().lines;
    assert!(counts[0].contains("an overall significant upward trend"));
    assert_eq!(
        counts[1],
        "It reaches peak at January, 2022 and touches valley at March, 2021."
    );

    let buzzwords = &report.section(SectionKind::Buzzwords).unwrap().lines;
    assert!(buzzwords[1].starts_with("rate hike: appeared in 36 out of 246 documents"));
}

#[test]
fn test_geography_skips_unknown_sentinel() {
    let record: Record = serde_json::from_value(rising_record()).unwrap();
    let report = ReportGenerator::new().generate(&record).unwrap();

    let geography = &report.section(SectionKind::Geography).unwrap().lines;
    assert_eq!(
        geography[0],
        "These documents come from Canada, Mexico, and other countries/areas."
    );
}

#[test]
fn test_custom_unknown_region_name() {
    let config = NarrativeConfig::from_toml("unknown_region = \"Elsewhere\"\n").unwrap();
    assert_eq!(config.words_display_num, 5);

    let mut value = rising_record();
    value[0]["top_regions"][1]["display_name"] = json!("Elsewhere");
    let record: Record = serde_json::from_value(value).unwrap();

    let report = ReportGenerator::with_config(config)
        .unwrap()
        .generate(&record)
        .unwrap();
    let geography = &report.section(SectionKind::Geography).unwrap().lines;
    assert!(geography[0].ends_with("and other countries/areas."));
}

#[test]
fn test_json_lines_stream() {
    let line = serde_json::to_string(&rising_record()).unwrap();
    let input = format!("{}\n\n{{not json}}\n{}\n", line, line);
    let generator = ReportGenerator::new();

    let results: Vec<_> = RecordReader::new(Cursor::new(input)).collect();
    assert_eq!(results.len(), 3);
    assert!(results[1].is_err());

    let first = generator.generate(results[0].as_ref().unwrap()).unwrap();
    let second = generator.generate(results[2].as_ref().unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_report_serializes() {
    let record: Record = serde_json::from_value(rising_record()).unwrap();
    let report = ReportGenerator::new().generate(&record).unwrap();

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["sections"][0]["kind"], "Overview");
    assert_eq!(
        value["sections"].as_array().unwrap().len(),
        SectionKind::ALL.len()
    );
}
