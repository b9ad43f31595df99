//! Narrative composition.
//!
//! Each function turns verdicts that were already computed into the lines of
//! one report section. No statistic is evaluated here; outlier sets,
//! relatedness tallies and trend analyses arrive ready-made, so the wording
//! can be tested apart from the numbers behind it.

use nlgkernel_comparative::{BucketTally, CorrelationBucket, OutlierSet};
use nlgkernel_core::error::Result;
use nlgkernel_temporal::{SeriesAnalysis, TimeRangeLabel};

use crate::aggregate::{Aggregates, BuzzwordStats, TermStats};
use crate::format::{count, join_and, mean, percent, score, std_dev};
use crate::templates::{
    self, render, select_group, select_source, select_trend, Cardinality, GroupRule, Polarity,
    Slots, Spread, TrendKey, TrendRule,
};

/// Peak and valley slot labels of a series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeakValley {
    /// Label of the bin with the largest value.
    pub peak: String,
    /// Label of the bin with the smallest value.
    pub valley: String,
}

// ============================================================================
// Overview and Buzzwords
// ============================================================================

/// "The N documents collected from A to B are categorized into K topics."
pub fn overview(documents: f64, topics: usize, range: &TimeRangeLabel) -> Result<Vec<String>> {
    let slots = Slots::new()
        .set("documents", count(documents))
        .set("start", range.start.as_str())
        .set("end", range.end.as_str())
        .set("topics", topics.to_string());
    Ok(vec![render(templates::OVERVIEW, &slots)?])
}

/// Top buzzwords with their appearance share and average sentiment.
pub fn buzzwords(words: &[&BuzzwordStats], documents: f64) -> Result<Vec<String>> {
    if words.is_empty() {
        return Ok(Vec::new());
    }

    let mut lines = vec![templates::BUZZWORD_HEADER.to_string()];
    for word in words {
        let share = if documents > 0.0 {
            word.count / documents
        } else {
            0.0
        };
        let slots = Slots::new()
            .set("term", word.term.replace('_', " "))
            .set("count", count(word.count))
            .set("documents", count(documents))
            .set("share", percent(share, 2))
            .set("score", score(word.sentiment()));
        lines.push(render(templates::BUZZWORD_ITEM, &slots)?);
    }
    Ok(lines)
}

// ============================================================================
// Topics
// ============================================================================

/// Spread of topic proportions and the topics that stand out above it.
pub fn topic_proportions(
    aggregates: &Aggregates,
    outliers: &OutlierSet,
    words: usize,
) -> Result<Vec<String>> {
    let proportions: Vec<f64> = aggregates.topics.iter().map(|t| t.proportion).collect();
    let (min, max) = min_max(&proportions);
    let range = render(
        templates::PROPORTION_RANGE,
        &Slots::new()
            .set("min", percent(min, 1))
            .set("max", percent(max, 1)),
    )?;

    let Some(cardinality) = Cardinality::count(outliers.above.len()) else {
        let even = render(
            templates::PROPORTION_EVEN,
            &Slots::new()
                .set("mean", percent(mean(&proportions), 1))
                .set("sd", percent(std_dev(&proportions), 2)),
        )?;
        return Ok(vec![format!("{} {}", range, even)]);
    };

    let mut lines = vec![range];
    let rule = select_group(templates::TOPIC_PROPORTION_OUTLIERS, cardinality)?;
    let items = outliers.above.iter().map(|&id| {
        topic_slots(aggregates, id, words).set("value", percent(proportions[id], 1))
    });
    lines.extend(group_lines(rule, &Slots::new(), items)?);
    Ok(lines)
}

/// Spread of topic sentiment and the topics that stand out on either side.
pub fn topic_sentiment(
    aggregates: &Aggregates,
    outliers: &OutlierSet,
    words: usize,
) -> Result<Vec<String>> {
    let scores: Vec<f64> = aggregates.topics.iter().map(|t| t.sentiment).collect();
    let (min, max) = min_max(&scores);
    let range = render(
        templates::SENTIMENT_RANGE,
        &Slots::new().set("min", score(min)).set("max", score(max)),
    )?;

    if outliers.is_empty() {
        let even = render(
            templates::SENTIMENT_EVEN,
            &Slots::new()
                .set("mean", score(mean(&scores)))
                .set("sd", score(std_dev(&scores))),
        )?;
        return Ok(vec![format!("{} {}", range, even)]);
    }

    let mut lines = vec![range];
    for (members, table) in [
        (&outliers.above, templates::TOPIC_POSITIVE_OUTLIERS),
        (&outliers.below, templates::TOPIC_NEGATIVE_OUTLIERS),
    ] {
        let Some(cardinality) = Cardinality::count(members.len()) else {
            continue;
        };
        let rule = select_group(table, cardinality)?;
        let items = members
            .iter()
            .map(|&id| topic_slots(aggregates, id, words).set("value", score(scores[id])));
        lines.extend(group_lines(rule, &Slots::new(), items)?);
    }
    Ok(lines)
}

fn topic_slots(aggregates: &Aggregates, id: usize, words: usize) -> Slots {
    Slots::new()
        .set("id", id.to_string())
        .set("keywords", join_and(aggregates.keywords(id, words)))
}

// ============================================================================
// Geography
// ============================================================================

/// Where the documents come from, and which regions stand out.
///
/// Outlier sets are indexed like `aggregates.regions` and must already have
/// the unknown-origin sentinel removed.
pub fn geography(
    aggregates: &Aggregates,
    count_outliers: &OutlierSet,
    sentiment_outliers: &OutlierSet,
) -> Result<Vec<String>> {
    let unknown = aggregates.has_unknown_region();
    let known: Vec<&str> = aggregates
        .regions_by_count()
        .into_iter()
        .filter(|r| !r.unknown)
        .map(|r| r.name.as_str())
        .collect();

    let named_limit = if unknown { 2 } else { 3 };
    let spread = match known.len() {
        0 => Spread::Unidentified,
        n if n > named_limit => Spread::Many,
        _ => Spread::Few,
    };
    let regions = if unknown {
        known.join(", ")
    } else {
        join_and(&known)
    };
    let source = select_source(unknown, spread)?;
    let mut lines = vec![render(
        source.sentence,
        &Slots::new()
            .set("regions", regions)
            .set("known", known.len().to_string()),
    )?];

    // Comparisons need at least two identified regions.
    if known.len() < 2 {
        return Ok(lines);
    }

    let total = aggregates.region_documents();
    let shares: Vec<f64> = aggregates
        .regions
        .iter()
        .map(|r| if total > 0.0 { r.count / total } else { 0.0 })
        .collect();
    let scores: Vec<f64> = aggregates.regions.iter().map(|r| r.sentiment()).collect();

    match Cardinality::count(count_outliers.above.len()) {
        Some(cardinality) => {
            let rule = select_group(templates::REGION_COUNT_OUTLIERS, cardinality)?;
            let items = count_outliers.above.iter().map(|&i| {
                Slots::new()
                    .set("region", aggregates.regions[i].name.as_str())
                    .set("share", percent(shares[i], 1))
            });
            lines.extend(group_lines(rule, &Slots::new(), items)?);
        }
        None => lines.push(render(
            templates::REGION_COUNT_EVEN,
            &Slots::new()
                .set("mean", percent(mean(&shares), 1))
                .set("sd", percent(std_dev(&shares), 2)),
        )?),
    }

    if sentiment_outliers.is_empty() {
        lines.push(render(
            templates::REGION_SENTIMENT_EVEN,
            &Slots::new()
                .set("mean", score(mean(&scores)))
                .set("sd", score(std_dev(&scores))),
        )?);
        return Ok(lines);
    }

    for (members, table) in [
        (&sentiment_outliers.above, templates::REGION_POSITIVE_OUTLIERS),
        (&sentiment_outliers.below, templates::REGION_NEGATIVE_OUTLIERS),
    ] {
        let Some(cardinality) = Cardinality::count(members.len()) else {
            continue;
        };
        let rule = select_group(table, cardinality)?;
        let items = members.iter().map(|&i| {
            let region = &aggregates.regions[i];
            Slots::new()
                .set("region", region.name.as_str())
                .set("score", score(scores[i]))
                .set("count", count(region.count))
                .set("share", percent(shares[i], 2))
        });
        lines.extend(group_lines(rule, &Slots::new(), items)?);
    }
    Ok(lines)
}

// ============================================================================
// Temporal Trends
// ============================================================================

/// Trend and periodicity of the total document counts.
pub fn count_trend(
    analysis: &SeriesAnalysis,
    range: &TimeRangeLabel,
    extremes: Option<&PeakValley>,
) -> Result<Vec<String>> {
    trend_lines(
        templates::COUNT_TREND,
        analysis,
        Polarity::Positive,
        range,
        extremes,
    )
}

/// Trend and periodicity of the average sentiment, framed by its sign.
pub fn sentiment_trend(
    analysis: &SeriesAnalysis,
    average: f64,
    range: &TimeRangeLabel,
    extremes: Option<&PeakValley>,
) -> Result<Vec<String>> {
    trend_lines(
        templates::SENTIMENT_TREND,
        analysis,
        Polarity::of(average),
        range,
        extremes,
    )
}

fn trend_lines(
    table: &[TrendRule],
    analysis: &SeriesAnalysis,
    polarity: Polarity,
    range: &TimeRangeLabel,
    extremes: Option<&PeakValley>,
) -> Result<Vec<String>> {
    let key = TrendKey {
        polarity,
        strength: analysis.strength,
        direction: analysis.trend.direction,
        periodicity: analysis.periodicity.class,
    };
    let rule = select_trend(table, &key)?;

    let mut slots = Slots::new()
        .set("trend", analysis.trend_label())
        .set("periodicity", analysis.periodicity_label())
        .set("start", range.start.as_str())
        .set("end", range.end.as_str());
    let mut lines = vec![render(rule.sentence, &slots)?];

    if let (Some(template), Some(pv)) = (rule.extremes.template(), extremes) {
        slots = slots
            .set("peak", pv.peak.as_str())
            .set("valley", pv.valley.as_str());
        lines.push(render(template, &slots)?);
    }
    Ok(lines)
}

// ============================================================================
// Correlation
// ============================================================================

/// Relatedness of each topic's document counts to the total.
pub fn count_correlation(tally: &BucketTally, members: usize) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for bucket in CorrelationBucket::ALL {
        lines.extend(bucket_sentence(
            templates::COUNT_CORRELATION,
            tally,
            bucket,
            members,
        )?);
    }
    Ok(lines)
}

/// Relatedness of each topic's sentiment to the overall sentiment.
///
/// Buckets run from most contrary to most related. Topics in a contrary
/// bucket are listed with their most frequent key words.
pub fn sentiment_correlation(
    tally: &BucketTally,
    members: usize,
    aggregates: &Aggregates,
    words: usize,
) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for bucket in CorrelationBucket::ALL.into_iter().rev() {
        let sentence = bucket_sentence(templates::SENTIMENT_CORRELATION, tally, bucket, members)?;
        let Some(sentence) = sentence else {
            continue;
        };
        lines.push(sentence);

        if !bucket.is_contrary() {
            continue;
        }
        let topics: Vec<(usize, String)> = tally
            .get(bucket)
            .iter()
            .filter_map(|&id| {
                let terms = aggregates.topic_top_terms(id, words);
                if terms.is_empty() {
                    return None;
                }
                let listed: Vec<String> = terms
                    .iter()
                    .map(|(text, share)| format!("{} ({})", text, percent(*share, 1)))
                    .collect();
                Some((id, listed.join(", ")))
            })
            .collect();
        let Some(cardinality) = Cardinality::count(topics.len()) else {
            continue;
        };
        let rule = select_group(templates::CONTRARY_TOPIC_TERMS, cardinality)?;
        let items = topics
            .into_iter()
            .map(|(id, terms)| Slots::new().set("id", id.to_string()).set("terms", terms));
        lines.extend(group_lines(rule, &Slots::new(), items)?);
    }
    Ok(lines)
}

fn bucket_sentence(
    table: &[GroupRule],
    tally: &BucketTally,
    bucket: CorrelationBucket,
    members: usize,
) -> Result<Option<String>> {
    let k = tally.get(bucket).len();
    let Some(cardinality) = Cardinality::of(k, members) else {
        return Ok(None);
    };
    let rule = select_group(table, cardinality)?;
    let slots = Slots::new()
        .set("k", k.to_string())
        .set("total", members.to_string())
        .set("bucket", bucket.phrase());
    rule.header.map(|h| render(h, &slots)).transpose()
}

// ============================================================================
// Key Words
// ============================================================================

/// Key words that generate most of the discussion, with their shares.
pub fn key_words(terms: &[&TermStats]) -> Result<Vec<String>> {
    let Some(cardinality) = Cardinality::count(terms.len()) else {
        return Ok(Vec::new());
    };
    let total: f64 = terms.iter().map(|t| t.count).sum();
    let rule = select_group(templates::KEY_WORDS, cardinality)?;
    let items = terms.iter().map(|t| {
        let share = if total > 0.0 { t.count / total } else { 0.0 };
        Slots::new()
            .set("term", t.text.as_str())
            .set("share", percent(share, 1))
    });
    group_lines(rule, &Slots::new(), items)
}

// ============================================================================
// Helpers
// ============================================================================

fn group_lines(
    rule: &GroupRule,
    header: &Slots,
    items: impl IntoIterator<Item = Slots>,
) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    if let Some(template) = rule.header {
        lines.push(render(template, header)?);
    }
    if let Some(template) = rule.item {
        for slots in items {
            lines.push(render(template, &slots)?);
        }
    }
    Ok(lines)
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}
