//! Input record model and JSON-lines ingestion.
//!
//! One line of input is a JSON array with one entry per topic. Topic `i`
//! reads its temporal series from `timebin.bins[i]` of its own entry; the
//! report period comes from the first topic.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use nlgkernel_core::error::{KernelError, Result};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Record Types
// ============================================================================

/// One report's worth of topics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    /// Topic entries, in topic-id order.
    pub topics: Vec<TopicEntry>,
}

/// Aggregates for a single topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicEntry {
    /// Document count.
    pub c: f64,
    /// Negative sentiment sum.
    pub n: f64,
    /// Positive sentiment sum.
    pub p: f64,
    /// Weight applied to this topic's buzzword counts.
    #[serde(default = "default_weight", deserialize_with = "number_or_string")]
    pub weight: f64,
    /// Most frequent source regions.
    #[serde(default)]
    pub top_regions: Vec<RegionEntry>,
    /// Most frequent buzzwords.
    #[serde(default)]
    pub buzzwords: Vec<BuzzwordEntry>,
    /// Binned temporal counts.
    pub timebin: TimeBin,
}

impl TopicEntry {
    /// Average sentiment per document on the -5..+5 scale.
    pub fn sentiment(&self) -> f64 {
        (self.n + self.p) / self.c
    }
}

/// Documents from one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionEntry {
    /// Region name as displayed.
    pub display_name: String,
    /// Document count.
    pub c: f64,
    /// Negative sentiment sum.
    #[serde(default)]
    pub n: f64,
    /// Positive sentiment sum.
    #[serde(default)]
    pub p: f64,
}

/// One buzzword of a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuzzwordEntry {
    /// Term, words joined by underscores.
    pub term: String,
    /// Documents mentioning the term.
    pub c: f64,
    /// Negative sentiment sum.
    #[serde(default)]
    pub n: f64,
    /// Positive sentiment sum.
    #[serde(default)]
    pub p: f64,
}

impl BuzzwordEntry {
    /// Term with underscores rendered as spaces.
    pub fn display_term(&self) -> String {
        self.term.replace('_', " ")
    }
}

/// Time binning shared by every series of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBin {
    /// Start of bin 0, epoch milliseconds.
    pub bucket_start: i64,
    /// End of the last bin, epoch milliseconds.
    pub bucket_end: i64,
    /// Bin width, milliseconds.
    pub interval: i64,
    /// Per-topic series.
    pub bins: Vec<BinSeries>,
}

/// Per-bin counts for one topic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BinSeries {
    /// Document counts.
    pub c: Vec<f64>,
    /// Negative sentiment sums.
    pub n: Vec<f64>,
    /// Positive sentiment sums.
    pub p: Vec<f64>,
    /// Term counts, one optional list per bin.
    #[serde(default)]
    pub terms: Vec<Option<Vec<TermCount>>>,
}

impl BinSeries {
    /// Number of bins.
    pub fn len(&self) -> usize {
        self.c.len()
    }

    /// True when there are no bins.
    pub fn is_empty(&self) -> bool {
        self.c.is_empty()
    }

    /// Net sentiment sum per bin.
    pub fn sentiment_sums(&self) -> Vec<f64> {
        self.n.iter().zip(&self.p).map(|(n, p)| n + p).collect()
    }
}

/// Occurrences of a term within one bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermCount {
    /// Term text.
    pub text: String,
    /// Occurrence count.
    pub c: f64,
}

fn default_weight() -> f64 {
    1.0
}

fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Weight {
        Number(f64),
        Text(String),
    }

    match Weight::deserialize(deserializer)? {
        Weight::Number(w) => Ok(w),
        Weight::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

// ============================================================================
// Record Access and Validation
// ============================================================================

impl Record {
    /// Parse one JSON line.
    pub fn from_json(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }

    /// Number of topics.
    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    /// Time binning of the report period (taken from the first topic).
    pub fn timebin(&self) -> Result<&TimeBin> {
        self.topics
            .first()
            .map(|t| &t.timebin)
            .ok_or_else(|| KernelError::validation("record has no topics"))
    }

    /// Temporal series of topic `index`.
    pub fn topic_series(&self, index: usize) -> Result<&BinSeries> {
        self.topics
            .get(index)
            .and_then(|t| t.timebin.bins.get(index))
            .ok_or_else(|| {
                KernelError::validation(format!("topic {} has no temporal series", index))
            })
    }

    /// Number of bins in the report period.
    pub fn slot_count(&self) -> Result<usize> {
        Ok(self.topic_series(0)?.len())
    }

    /// Total document count over all topics.
    pub fn total_documents(&self) -> f64 {
        self.topics.iter().map(|t| t.c).sum()
    }

    /// Check the record shape before any statistic runs.
    pub fn validate(&self) -> Result<()> {
        let timebin = self.timebin()?;
        if timebin.interval <= 0 {
            return Err(KernelError::validation(format!(
                "bin interval must be positive, got {}",
                timebin.interval
            )));
        }
        if timebin.bucket_end < timebin.bucket_start {
            tracing::warn!(
                start = timebin.bucket_start,
                end = timebin.bucket_end,
                "Report period ends before it starts"
            );
        }

        let slots = self.slot_count()?;
        if slots == 0 {
            return Err(KernelError::validation("temporal series has no bins"));
        }

        for (i, topic) in self.topics.iter().enumerate() {
            if !(topic.c.is_finite() && topic.c > 0.0) {
                return Err(KernelError::validation(format!(
                    "topic {} has document count {}",
                    i, topic.c
                )));
            }
            if !(topic.weight.is_finite() && topic.weight >= 0.0) {
                return Err(KernelError::validation(format!(
                    "topic {} has weight {}",
                    i, topic.weight
                )));
            }
            if !(topic.n.is_finite() && topic.p.is_finite()) {
                return Err(KernelError::validation(format!(
                    "topic {} has non-finite sentiment",
                    i
                )));
            }

            let series = self.topic_series(i)?;
            for (field, values) in [("c", &series.c), ("n", &series.n), ("p", &series.p)] {
                if values.len() != slots {
                    return Err(KernelError::validation(format!(
                        "topic {} series `{}` has {} bins, expected {}",
                        i,
                        field,
                        values.len(),
                        slots
                    )));
                }
                if values.iter().any(|v| !v.is_finite()) {
                    return Err(KernelError::validation(format!(
                        "topic {} series `{}` contains non-finite values",
                        i, field
                    )));
                }
            }
            if series.c.iter().any(|&c| c < 0.0) {
                return Err(KernelError::validation(format!(
                    "topic {} has negative bin counts",
                    i
                )));
            }

            if let Some(region) = topic.top_regions.iter().find(|r| r.c < 0.0) {
                return Err(KernelError::validation(format!(
                    "region {} of topic {} has negative count",
                    region.display_name, i
                )));
            }
            if let Some(word) = topic.buzzwords.iter().find(|b| !b.c.is_finite() || b.c < 0.0) {
                return Err(KernelError::validation(format!(
                    "buzzword {} of topic {} has count {}",
                    word.term, i, word.c
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// JSON-Lines Reader
// ============================================================================

/// Iterator over the records of a JSON-lines source. Blank lines are skipped.
#[derive(Debug)]
pub struct RecordReader<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> RecordReader<R> {
    /// Wrap a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }

    /// One-based number of the last line read.
    pub fn line(&self) -> usize {
        self.line
    }
}

impl RecordReader<BufReader<File>> {
    /// Open a JSON-lines file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line += 1;
                    let trimmed = self.buf.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let parsed = Record::from_json(trimmed);
                    if let Err(e) = &parsed {
                        tracing::warn!(line = self.line, error = %e, "Unreadable record");
                    }
                    return Some(parsed);
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    fn topic(i: usize, c: f64) -> serde_json::Value {
        let mut bins = vec![json!({"c": [0, 0], "n": [0, 0], "p": [0, 0]}); i + 1];
        bins[i] = json!({
            "c": [c - 1.0, 1.0], "n": [-1, 0], "p": [2, 1],
            "terms": [[{"text": "a", "c": 2}], null]
        });
        json!({
            "c": c, "n": -1, "p": 3, "weight": "0.5",
            "top_regions": [{"display_name": "France", "c": c, "n": -1, "p": 3}],
            "buzzwords": [{"term": "machine_learning", "c": 3}],
            "timebin": {
                "bucket_start": 0, "bucket_end": 172_800_000, "interval": 86_400_000,
                "bins": bins
            }
        })
    }

    #[test]
    fn test_parse_and_validate() {
        let line = json!([topic(0, 10.0), topic(1, 4.0)]).to_string();
        let record = Record::from_json(&line).unwrap();
        record.validate().unwrap();

        assert_eq!(record.topic_count(), 2);
        assert_eq!(record.slot_count().unwrap(), 2);
        assert_eq!(record.total_documents(), 14.0);
        assert_eq!(record.topics[0].weight, 0.5);
        assert_eq!(record.topic_series(1).unwrap().c, vec![3.0, 1.0]);
        assert_eq!(record.topics[1].buzzwords[0].display_term(), "machine learning");
        assert_eq!(record.topics[0].buzzwords[0].n, 0.0);
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let line = json!([{"c": 1, "n": 0, "p": 0}]).to_string();
        assert!(matches!(
            Record::from_json(&line),
            Err(KernelError::DeserializationError(_))
        ));
    }

    #[test]
    fn test_shape_errors() {
        let mut value = json!([topic(0, 10.0)]);
        value[0]["timebin"]["interval"] = json!(0);
        let record: Record = serde_json::from_value(value).unwrap();
        assert!(matches!(record.validate(), Err(KernelError::ValidationError(_))));

        let mut value = json!([topic(0, 10.0)]);
        value[0]["timebin"]["bins"][0]["n"] = json!([0, 0, 0]);
        let record: Record = serde_json::from_value(value).unwrap();
        assert!(record.validate().is_err());

        let mut value = json!([topic(0, 10.0)]);
        value[0]["c"] = json!(0);
        let record: Record = serde_json::from_value(value).unwrap();
        assert!(record.validate().is_err());

        // Topic 1 must find its series at bins[1].
        let mut value = json!([topic(0, 10.0), topic(1, 4.0)]);
        value[1]["timebin"]["bins"] = json!([{"c": [1, 1], "n": [0, 0], "p": [0, 0]}]);
        let record: Record = serde_json::from_value(value).unwrap();
        assert!(record.validate().is_err());

        assert!(Record { topics: vec![] }.validate().is_err());
    }

    #[test]
    fn test_reader_skips_blank_lines() {
        let line = json!([topic(0, 10.0)]).to_string();
        let input = format!("{}\n\n{}\n", line, line);
        let mut reader = RecordReader::new(Cursor::new(input));
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_ok());
        assert_eq!(reader.line(), 3);
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_reader_reports_bad_lines() {
        let mut reader = RecordReader::new(Cursor::new("not json\n"));
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }
}
