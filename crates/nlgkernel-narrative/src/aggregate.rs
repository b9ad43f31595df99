//! One-pass aggregation of a record into frozen snapshots.
//!
//! Regions, buzzwords and terms are accumulated in first-seen order behind a
//! name index, then frozen. Rankings sort stably, so ties keep the order in
//! which names first appeared in the record.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::record::{BinSeries, Record, TopicEntry};
use nlgkernel_core::error::Result;

// ============================================================================
// Snapshot Types
// ============================================================================

/// Per-topic totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopicSummary {
    /// Topic id (position in the record).
    pub index: usize,
    /// Document count.
    pub count: f64,
    /// Average sentiment per document.
    pub sentiment: f64,
    /// Share of all documents.
    pub proportion: f64,
}

/// Totals for one source region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionStats {
    /// Region name.
    pub name: String,
    /// Document count over all topics.
    pub count: f64,
    /// Net sentiment sum over all topics.
    pub sentiment_sum: f64,
    /// Set for the sentinel region of documents without a known origin.
    pub unknown: bool,
}

impl RegionStats {
    /// Average sentiment per document.
    pub fn sentiment(&self) -> f64 {
        if self.count > 0.0 {
            self.sentiment_sum / self.count
        } else {
            0.0
        }
    }
}

/// Totals for one buzzword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuzzwordStats {
    /// Term as it appears in the record.
    pub term: String,
    /// Count scaled by each topic's weight.
    pub weighted_count: f64,
    /// Net sentiment sum.
    pub sentiment_sum: f64,
    /// Raw count of documents mentioning the term.
    pub count: f64,
}

impl BuzzwordStats {
    /// Average sentiment per mention.
    pub fn sentiment(&self) -> f64 {
        if self.count > 0.0 {
            self.sentiment_sum / self.count
        } else {
            0.0
        }
    }
}

/// Occurrences of a key word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermStats {
    /// Term text.
    pub text: String,
    /// Occurrences summed over bins.
    pub count: f64,
}

/// Frozen aggregates of one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregates {
    /// One summary per topic, in topic order.
    pub topics: Vec<TopicSummary>,
    /// Total documents over all topics.
    pub total_documents: f64,
    /// Regions in first-seen order.
    pub regions: Vec<RegionStats>,
    /// Buzzwords in first-seen order.
    pub buzzwords: Vec<BuzzwordStats>,
    /// Key words per topic, in first-seen order.
    pub topic_terms: Vec<Vec<TermStats>>,
    /// Key words over all topics, in first-seen order.
    pub overall_terms: Vec<TermStats>,
    /// Each topic's buzzwords by count, underscores rendered as spaces.
    pub topic_keywords: Vec<Vec<String>>,
}

// ============================================================================
// Accumulation
// ============================================================================

/// Insertion-ordered accumulator keyed by name.
#[derive(Debug, Clone)]
struct Ledger<T> {
    index: HashMap<String, usize>,
    entries: Vec<T>,
}

impl<T> Default for Ledger<T> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<T> Ledger<T> {
    fn upsert(&mut self, key: &str, init: impl FnOnce() -> T) -> &mut T {
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => {
                let idx = self.entries.len();
                self.index.insert(key.to_string(), idx);
                self.entries.push(init());
                idx
            }
        };
        &mut self.entries[idx]
    }

    fn freeze(self) -> Vec<T> {
        self.entries
    }
}

/// Builds `Aggregates` one topic at a time.
#[derive(Debug)]
pub struct AggregateBuilder {
    unknown_region: String,
    topics: Vec<TopicSummary>,
    regions: Ledger<RegionStats>,
    buzzwords: Ledger<BuzzwordStats>,
    topic_terms: Vec<Vec<TermStats>>,
    overall_terms: Ledger<TermStats>,
    topic_keywords: Vec<Vec<String>>,
}

impl AggregateBuilder {
    /// Start an empty accumulation.
    ///
    /// # Arguments
    /// * `unknown_region` - Name of the region sentinel for unknown origin
    pub fn new(unknown_region: impl Into<String>) -> Self {
        Self {
            unknown_region: unknown_region.into(),
            topics: Vec::new(),
            regions: Ledger::default(),
            buzzwords: Ledger::default(),
            topic_terms: Vec::new(),
            overall_terms: Ledger::default(),
            topic_keywords: Vec::new(),
        }
    }

    /// Fold one topic and its temporal series into the totals.
    pub fn add_topic(&mut self, topic: &TopicEntry, series: &BinSeries) {
        self.topics.push(TopicSummary {
            index: self.topics.len(),
            count: topic.c,
            sentiment: topic.sentiment(),
            proportion: 0.0,
        });

        for region in &topic.top_regions {
            let unknown = region.display_name == self.unknown_region;
            let stats = self
                .regions
                .upsert(&region.display_name, || RegionStats {
                    name: region.display_name.clone(),
                    count: 0.0,
                    sentiment_sum: 0.0,
                    unknown,
                });
            stats.count += region.c;
            stats.sentiment_sum += region.n + region.p;
        }

        for word in &topic.buzzwords {
            let stats = self.buzzwords.upsert(&word.term, || BuzzwordStats {
                term: word.term.clone(),
                weighted_count: 0.0,
                sentiment_sum: 0.0,
                count: 0.0,
            });
            stats.weighted_count += word.c * topic.weight;
            stats.sentiment_sum += word.n + word.p;
            stats.count += word.c;
        }

        let mut terms: Ledger<TermStats> = Ledger::default();
        for term in series.terms.iter().flatten().flatten() {
            for ledger in [&mut terms, &mut self.overall_terms] {
                ledger
                    .upsert(&term.text, || TermStats {
                        text: term.text.clone(),
                        count: 0.0,
                    })
                    .count += term.c;
            }
        }
        self.topic_terms.push(terms.freeze());

        let keywords = ranked(&topic.buzzwords, |b| b.c)
            .into_iter()
            .map(|b| b.display_term())
            .collect();
        self.topic_keywords.push(keywords);
    }

    /// Freeze the totals.
    pub fn build(self) -> Aggregates {
        let total_documents: f64 = self.topics.iter().map(|t| t.count).sum();
        let topics = self
            .topics
            .into_iter()
            .map(|t| TopicSummary {
                proportion: if total_documents > 0.0 {
                    t.count / total_documents
                } else {
                    0.0
                },
                ..t
            })
            .collect();

        Aggregates {
            topics,
            total_documents,
            regions: self.regions.freeze(),
            buzzwords: self.buzzwords.freeze(),
            topic_terms: self.topic_terms,
            overall_terms: self.overall_terms.freeze(),
            topic_keywords: self.topic_keywords,
        }
    }
}

impl Aggregates {
    /// Aggregate a validated record.
    ///
    /// # Arguments
    /// * `record` - Record whose shape has been validated
    /// * `unknown_region` - Name of the region sentinel for unknown origin
    pub fn collect(record: &Record, unknown_region: &str) -> Result<Self> {
        let mut builder = AggregateBuilder::new(unknown_region);
        for (i, topic) in record.topics.iter().enumerate() {
            builder.add_topic(topic, record.topic_series(i)?);
        }
        let aggregates = builder.build();

        tracing::debug!(
            topics = aggregates.topics.len(),
            regions = aggregates.regions.len(),
            buzzwords = aggregates.buzzwords.len(),
            terms = aggregates.overall_terms.len(),
            "Aggregated record"
        );
        Ok(aggregates)
    }

    /// Buzzwords with the largest weighted counts.
    pub fn top_buzzwords(&self, k: usize) -> Vec<&BuzzwordStats> {
        top(&self.buzzwords, k, |b| b.weighted_count)
    }

    /// Key words with the most occurrences over all topics.
    pub fn top_terms(&self, k: usize) -> Vec<&TermStats> {
        top(&self.overall_terms, k, |t| t.count)
    }

    /// A topic's most frequent key words with their share of its occurrences.
    pub fn topic_top_terms(&self, topic: usize, k: usize) -> Vec<(&str, f64)> {
        let Some(terms) = self.topic_terms.get(topic) else {
            return Vec::new();
        };
        let total: f64 = terms.iter().map(|t| t.count).sum();
        top(terms, k, |t| t.count)
            .into_iter()
            .map(|t| {
                let share = if total > 0.0 { t.count / total } else { 0.0 };
                (t.text.as_str(), share)
            })
            .collect()
    }

    /// A topic's top buzzwords for display.
    pub fn keywords(&self, topic: usize, k: usize) -> &[String] {
        self.topic_keywords
            .get(topic)
            .map(|words| &words[..k.min(words.len())])
            .unwrap_or(&[])
    }

    /// Regions by document count, largest first.
    pub fn regions_by_count(&self) -> Vec<&RegionStats> {
        ranked(&self.regions, |r| r.count)
    }

    /// Documents over all regions.
    pub fn region_documents(&self) -> f64 {
        self.regions.iter().map(|r| r.count).sum()
    }

    /// True when the unknown-origin sentinel is among the regions.
    pub fn has_unknown_region(&self) -> bool {
        self.regions.iter().any(|r| r.unknown)
    }

    /// Number of regions other than the sentinel.
    pub fn known_region_count(&self) -> usize {
        self.regions.iter().filter(|r| !r.unknown).count()
    }
}

/// Stable descending ranking by `key`.
fn ranked<T>(items: &[T], key: impl Fn(&T) -> f64) -> Vec<&T> {
    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort_by(|a, b| key(b).total_cmp(&key(a)));
    sorted
}

fn top<T>(items: &[T], k: usize, key: impl Fn(&T) -> f64) -> Vec<&T> {
    let mut sorted = ranked(items, key);
    sorted.truncate(k);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> Record {
        let bins = |i: usize| {
            let mut bins = vec![json!({"c": [0, 0], "n": [0, 0], "p": [0, 0]}); 2];
            bins[i] = if i == 0 {
                json!({"c": [3, 3], "n": [0, 0], "p": [0, 0],
                       "terms": [[{"text": "vaccine", "c": 3}, {"text": "mask", "c": 1}], null]})
            } else {
                json!({"c": [1, 1], "n": [0, 0], "p": [0, 0],
                       "terms": [[{"text": "mask", "c": 2}], [{"text": "travel", "c": 2}]]})
            };
            json!({"bucket_start": 0, "bucket_end": 1, "interval": 1, "bins": bins})
        };
        serde_json::from_value(json!([
            {
                "c": 6, "n": -2, "p": 8, "weight": 2.0,
                "top_regions": [
                    {"display_name": "France", "c": 4, "n": -1, "p": 5},
                    {"display_name": "Unknown", "c": 2, "n": 0, "p": 1}
                ],
                "buzzwords": [{"term": "public_health", "c": 2, "n": 0, "p": 2},
                              {"term": "lockdown", "c": 5, "n": -3, "p": 1}],
                "timebin": bins(0)
            },
            {
                "c": 2, "n": -1, "p": 0, "weight": 1.0,
                "top_regions": [{"display_name": "France", "c": 2, "n": -1, "p": 0}],
                "buzzwords": [{"term": "public_health", "c": 3, "n": 1, "p": 1}],
                "timebin": bins(1)
            }
        ]))
        .unwrap()
    }

    #[test]
    fn test_topic_summaries() {
        let agg = Aggregates::collect(&record(), "Unknown").unwrap();
        assert_eq!(agg.total_documents, 8.0);
        assert_eq!(agg.topics[0].proportion, 0.75);
        assert_eq!(agg.topics[0].sentiment, 1.0);
        assert_eq!(agg.topics[1].sentiment, -0.5);
    }

    #[test]
    fn test_regions_merge_by_name() {
        let agg = Aggregates::collect(&record(), "Unknown").unwrap();
        assert_eq!(agg.regions.len(), 2);
        assert_eq!(agg.regions[0].count, 6.0);
        assert_eq!(agg.regions[0].sentiment(), 0.5);
        assert!(agg.has_unknown_region());
        assert_eq!(agg.known_region_count(), 1);
        assert_eq!(agg.region_documents(), 8.0);
    }

    #[test]
    fn test_buzzwords_weighted() {
        let agg = Aggregates::collect(&record(), "Unknown").unwrap();
        let top = agg.top_buzzwords(5);
        // lockdown 5*2 = 10, public_health 2*2 + 3*1 = 7
        assert_eq!(top[0].term, "lockdown");
        assert_eq!(top[1].weighted_count, 7.0);
        assert_eq!(top[1].count, 5.0);
        assert_eq!(top[1].sentiment(), 0.8);
        assert_eq!(agg.keywords(0, 5), &["lockdown", "public health"]);
        assert_eq!(agg.keywords(1, 0).len(), 0);
    }

    #[test]
    fn test_terms() {
        let agg = Aggregates::collect(&record(), "Unknown").unwrap();
        let overall: Vec<&str> = agg.top_terms(2).iter().map(|t| t.text.as_str()).collect();
        // vaccine 3, mask 3, travel 2; ties keep first-seen order
        assert_eq!(overall, vec!["vaccine", "mask"]);

        let topic1 = agg.topic_top_terms(1, 5);
        assert_eq!(topic1, vec![("mask", 0.5), ("travel", 0.5)]);
        assert!(agg.topic_top_terms(9, 5).is_empty());
    }
}
