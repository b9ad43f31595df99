//! Report generation.
//!
//! `ReportGenerator` runs every statistic a record needs, in section order,
//! and hands the verdicts to the composer. Degenerate statistics fall back
//! to neutral wording; only a malformed record aborts the report.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregates;
use crate::composer::{self, PeakValley};
use crate::format;
use crate::messages::{ReportInput, ReportOutput};
use crate::record::{Record, TimeBin};
use nlgkernel_comparative::{BucketTally, CorrelationClassifier, MadOutlier, Relatedness};
use nlgkernel_core::{
    config::NarrativeConfig,
    domain::Domain,
    error::Result,
    kernel::KernelMetadata,
    traits::{BatchKernel, Kernel},
};
use nlgkernel_temporal::{PeriodicityAnalysis, PrunedSeries, TimeLabelTranslator, TimeUnit};

// ============================================================================
// Report Types
// ============================================================================

/// Report sections, in the order they are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    /// Document and topic totals.
    Overview,
    /// Top buzzwords.
    Buzzwords,
    /// Topic shares and outliers.
    TopicProportions,
    /// Topic sentiment and outliers.
    TopicSentiment,
    /// Source regions and outliers.
    Geography,
    /// Trend of the total document counts.
    TemporalCounts,
    /// Topic counts against the total.
    CountCorrelation,
    /// Key words over all topics.
    KeyWords,
    /// Trend of the average sentiment.
    TemporalSentiment,
    /// Topic sentiment against the overall sentiment.
    SentimentCorrelation,
}

impl SectionKind {
    /// All sections in report order.
    pub const ALL: [SectionKind; 10] = [
        SectionKind::Overview,
        SectionKind::Buzzwords,
        SectionKind::TopicProportions,
        SectionKind::TopicSentiment,
        SectionKind::Geography,
        SectionKind::TemporalCounts,
        SectionKind::CountCorrelation,
        SectionKind::KeyWords,
        SectionKind::TemporalSentiment,
        SectionKind::SentimentCorrelation,
    ];

    /// Short name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Overview => "overview",
            SectionKind::Buzzwords => "buzzwords",
            SectionKind::TopicProportions => "topic-proportions",
            SectionKind::TopicSentiment => "topic-sentiment",
            SectionKind::Geography => "geography",
            SectionKind::TemporalCounts => "temporal-counts",
            SectionKind::CountCorrelation => "count-correlation",
            SectionKind::KeyWords => "key-words",
            SectionKind::TemporalSentiment => "temporal-sentiment",
            SectionKind::SentimentCorrelation => "sentiment-correlation",
        }
    }
}

/// Lines of one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Which section this is.
    pub kind: SectionKind,
    /// Narrative lines.
    pub lines: Vec<String>,
}

/// A generated narrative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Sections in report order.
    pub sections: Vec<Section>,
}

impl Report {
    /// Section of a given kind.
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// Every line, in order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.sections
            .iter()
            .flat_map(|s| s.lines.iter().map(String::as_str))
    }

    /// Total number of lines.
    pub fn line_count(&self) -> usize {
        self.sections.iter().map(|s| s.lines.len()).sum()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for section in self.sections.iter().filter(|s| !s.lines.is_empty()) {
            if !first {
                writeln!(f)?;
            }
            first = false;
            for line in &section.lines {
                writeln!(f, "{}", line)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Report Generator Kernel
// ============================================================================

/// Report generation kernel.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    metadata: KernelMetadata,
    config: NarrativeConfig,
    translator: TimeLabelTranslator,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator {
    /// Create a report generator with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: Self::kernel_metadata(),
            config: NarrativeConfig::default(),
            translator: TimeLabelTranslator::new(),
        }
    }

    /// Create a report generator from a validated configuration.
    pub fn with_config(config: NarrativeConfig) -> Result<Self> {
        config.validate()?;
        let translator = TimeLabelTranslator::with_utc_offset_minutes(config.utc_offset_minutes)?;
        Ok(Self {
            metadata: Self::kernel_metadata(),
            config,
            translator,
        })
    }

    fn kernel_metadata() -> KernelMetadata {
        KernelMetadata::batch("narrative/report", Domain::Narrative)
            .with_description("Statistical narrative report for one record")
    }

    /// Configuration in effect.
    pub fn config(&self) -> &NarrativeConfig {
        &self.config
    }

    /// Narrate one record.
    pub fn generate(&self, record: &Record) -> Result<Report> {
        record.validate()?;
        tracing::info!(
            topics = record.topic_count(),
            documents = record.total_documents(),
            "Generating report"
        );

        let config = &self.config;
        let words = config.words_display_num;
        let threshold = config.outlier_threshold;

        let aggregates = Aggregates::collect(record, &config.unknown_region)?;
        let timebin = record.timebin()?;
        let range = self.translator.translate_range(
            timebin.bucket_start,
            timebin.bucket_end,
            timebin.interval,
        )?;

        let mut report = Report::default();
        let mut push = |kind: SectionKind, lines: Vec<String>| {
            report.sections.push(Section { kind, lines });
        };

        push(
            SectionKind::Overview,
            composer::overview(aggregates.total_documents, aggregates.topics.len(), &range)?,
        );
        push(
            SectionKind::Buzzwords,
            composer::buzzwords(&aggregates.top_buzzwords(words), aggregates.total_documents)?,
        );

        // Topics: one-sided for shares, two-sided for sentiment.
        let proportions: Vec<f64> = aggregates.topics.iter().map(|t| t.proportion).collect();
        let proportion_outliers = MadOutlier::detect(&proportions, threshold);
        push(
            SectionKind::TopicProportions,
            composer::topic_proportions(&aggregates, &proportion_outliers, words)?,
        );

        let sentiments: Vec<f64> = aggregates.topics.iter().map(|t| t.sentiment).collect();
        let sentiment_outliers = MadOutlier::detect(&sentiments, threshold);
        push(
            SectionKind::TopicSentiment,
            composer::topic_sentiment(&aggregates, &sentiment_outliers, words)?,
        );

        // Regions: the unknown-origin sentinel takes part in the statistics
        // but is never reported as an outlier.
        let region_total = aggregates.region_documents();
        let shares: Vec<f64> = aggregates
            .regions
            .iter()
            .map(|r| {
                if region_total > 0.0 {
                    r.count / region_total
                } else {
                    0.0
                }
            })
            .collect();
        let scores: Vec<f64> = aggregates.regions.iter().map(|r| r.sentiment()).collect();
        let is_known = |i: usize| !aggregates.regions[i].unknown;
        let mut region_counts = MadOutlier::detect(&shares, threshold);
        region_counts.retain(is_known);
        let mut region_sentiment = MadOutlier::detect(&scores, threshold);
        region_sentiment.retain(is_known);
        push(
            SectionKind::Geography,
            composer::geography(&aggregates, &region_counts, &region_sentiment)?,
        );

        // Temporal counts.
        let signals = Signals::collect(record)?;
        let counts = PrunedSeries::from_values(&signals.totals);
        let count_analysis = PeriodicityAnalysis::analyze_or_fallback(
            &counts.values,
            range.unit,
            config.exploratory_alpha,
            config.trend_alpha,
        )?;
        tracing::debug!(
            series = "count",
            trend = %count_analysis.trend_label(),
            p = count_analysis.p_value,
            period = count_analysis.periodicity.period,
            "Temporal verdict"
        );
        let count_extremes = self.peak_valley(&counts, timebin, range.unit)?;
        push(
            SectionKind::TemporalCounts,
            composer::count_trend(&count_analysis, &range, count_extremes.as_ref())?,
        );

        let mut count_relatedness = Vec::with_capacity(record.topic_count());
        for i in 0..record.topic_count() {
            let series = record.topic_series(i)?;
            count_relatedness.push(CorrelationClassifier::compute(&series.c, &signals.totals)?);
        }
        let count_tally = tally(&count_relatedness, "count");
        push(
            SectionKind::CountCorrelation,
            composer::count_correlation(&count_tally, count_relatedness.len())?,
        );

        push(
            SectionKind::KeyWords,
            composer::key_words(&aggregates.top_terms(words))?,
        );

        // Temporal sentiment.
        let sentiment = PrunedSeries::aligned_to(&signals.sentiment, &signals.totals);
        let average = format::mean(&sentiment.values);
        let sentiment_analysis = PeriodicityAnalysis::analyze_or_fallback(
            &sentiment.values,
            range.unit,
            config.exploratory_alpha,
            config.trend_alpha,
        )?;
        tracing::debug!(
            series = "sentiment",
            average,
            trend = %sentiment_analysis.trend_label(),
            p = sentiment_analysis.p_value,
            period = sentiment_analysis.periodicity.period,
            "Temporal verdict"
        );
        let sentiment_extremes = self.peak_valley(&sentiment, timebin, range.unit)?;
        push(
            SectionKind::TemporalSentiment,
            composer::sentiment_trend(
                &sentiment_analysis,
                average,
                &range,
                sentiment_extremes.as_ref(),
            )?,
        );

        let mut sentiment_relatedness = Vec::with_capacity(record.topic_count());
        for i in 0..record.topic_count() {
            let series = record.topic_series(i)?;
            let keep: Vec<bool> = series.c.iter().map(|&c| c > 0.0).collect();
            let per_document = per_document(&series.c, &series.sentiment_sums());
            sentiment_relatedness.push(CorrelationClassifier::compute_masked(
                &per_document,
                &signals.sentiment,
                &keep,
            )?);
        }
        let sentiment_tally = tally(&sentiment_relatedness, "sentiment");
        push(
            SectionKind::SentimentCorrelation,
            composer::sentiment_correlation(
                &sentiment_tally,
                sentiment_relatedness.len(),
                &aggregates,
                words,
            )?,
        );

        tracing::info!(
            sections = report.sections.len(),
            lines = report.line_count(),
            "Report generated"
        );
        Ok(report)
    }

    fn peak_valley(
        &self,
        series: &PrunedSeries,
        timebin: &TimeBin,
        unit: TimeUnit,
    ) -> Result<Option<PeakValley>> {
        let (Some(peak), Some(valley)) = (series.argmax_bin(), series.argmin_bin()) else {
            return Ok(None);
        };
        let label = |bin: usize| {
            self.translator.translate_slot(
                bin,
                timebin.bucket_start,
                timebin.bucket_end,
                timebin.interval,
                unit,
            )
        };
        Ok(Some(PeakValley {
            peak: label(peak)?,
            valley: label(valley)?,
        }))
    }
}

/// Per-bin totals over all topics.
struct Signals {
    /// Documents per bin.
    totals: Vec<f64>,
    /// Average sentiment per document per bin, 0 where a bin is empty.
    sentiment: Vec<f64>,
}

impl Signals {
    fn collect(record: &Record) -> Result<Self> {
        let slots = record.slot_count()?;
        let mut totals = vec![0.0; slots];
        let mut sums = vec![0.0; slots];
        for i in 0..record.topic_count() {
            let series = record.topic_series(i)?;
            for (j, (c, s)) in series.c.iter().zip(series.sentiment_sums()).enumerate() {
                totals[j] += c;
                sums[j] += s;
            }
        }
        let sentiment = per_document(&totals, &sums);
        Ok(Self { totals, sentiment })
    }
}

fn per_document(counts: &[f64], sums: &[f64]) -> Vec<f64> {
    counts
        .iter()
        .zip(sums)
        .map(|(&c, &s)| if c > 0.0 { s / c } else { 0.0 })
        .collect()
}

fn tally(results: &[Relatedness], series: &'static str) -> BucketTally {
    let tally = BucketTally::tally(results);
    if !tally.indeterminate.is_empty() {
        tracing::warn!(
            series,
            topics = ?tally.indeterminate,
            "Topics left out of correlation buckets"
        );
    }
    tally
}

impl Kernel for ReportGenerator {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }

    fn validate(&self) -> Result<()> {
        self.config.validate()
    }
}

impl BatchKernel<ReportInput, ReportOutput> for ReportGenerator {
    fn execute(&self, input: ReportInput) -> Result<ReportOutput> {
        let start = Instant::now();
        let report = self.generate(&input.record)?;
        Ok(ReportOutput {
            report,
            compute_time_us: start.elapsed().as_micros() as u64,
        })
    }

    fn validate_input(&self, input: &ReportInput) -> Result<()> {
        input.record.validate()
    }
}
