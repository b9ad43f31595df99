//! Temporal analysis types and data structures.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Time Series Types
// ============================================================================

/// A binned time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// One observation per bin.
    pub values: Vec<f64>,
    /// Absolute start of bin 0, epoch milliseconds.
    pub start_ms: i64,
    /// Bin width in milliseconds.
    pub interval_ms: i64,
}

impl TimeSeries {
    /// Create a new time series from values (no wall-clock anchor).
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            start_ms: 0,
            interval_ms: 1,
        }
    }

    /// Create a time series anchored on a start timestamp and bin width.
    pub fn with_timing(values: Vec<f64>, start_ms: i64, interval_ms: i64) -> Self {
        Self {
            values,
            start_ms,
            interval_ms,
        }
    }

    /// Get the length of the series.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the mean of the series.
    pub fn mean(&self) -> f64 {
        mean(&self.values)
    }

    /// Drop zero-valued bins, remembering where each survivor came from.
    pub fn prune_zeros(&self) -> PrunedSeries {
        PrunedSeries::from_values(&self.values)
    }
}

/// A series with zero bins removed.
///
/// `bins[i]` is the original bin index of `values[i]`, so peaks and valleys
/// found in the pruned series still map back to wall-clock time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrunedSeries {
    /// Retained values, in bin order.
    pub values: Vec<f64>,
    /// Original bin index of each retained value.
    pub bins: Vec<usize>,
}

impl PrunedSeries {
    /// Keep every nonzero value of `values`.
    pub fn from_values(values: &[f64]) -> Self {
        let (bins, values) = values
            .iter()
            .enumerate()
            .filter(|(_, &v)| v != 0.0)
            .map(|(i, &v)| (i, v))
            .unzip();
        Self { values, bins }
    }

    /// Keep `values[i]` wherever `support[i]` is nonzero.
    ///
    /// Used to align a sentiment series with the bins that carried documents.
    pub fn aligned_to(values: &[f64], support: &[f64]) -> Self {
        let (bins, values) = values
            .iter()
            .zip(support)
            .enumerate()
            .filter(|(_, (_, &s))| s != 0.0)
            .map(|(i, (&v, _))| (i, v))
            .unzip();
        Self { values, bins }
    }

    /// Number of retained values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when nothing was retained.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Original bin of the largest value (first on ties).
    pub fn argmax_bin(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (&bin, &v) in self.bins.iter().zip(&self.values) {
            match best {
                Some((_, b)) if v <= b => {}
                _ => best = Some((bin, v)),
            }
        }
        best.map(|(bin, _)| bin)
    }

    /// Original bin of the smallest value (first on ties).
    pub fn argmin_bin(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (&bin, &v) in self.bins.iter().zip(&self.values) {
            match best {
                Some((_, b)) if v >= b => {}
                _ => best = Some((bin, v)),
            }
        }
        best.map(|(bin, _)| bin)
    }
}

/// Arithmetic mean, 0 for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

// ============================================================================
// Trend Types
// ============================================================================

/// Direction of a monotonic trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendDirection {
    /// Significant increase.
    Upward,
    /// Significant decrease.
    Downward,
    /// No significant monotonic change.
    None,
}

impl TrendDirection {
    /// Phrase used in narrative sentences.
    pub const fn phrase(&self) -> &'static str {
        match self {
            TrendDirection::Upward => "upward trend",
            TrendDirection::Downward => "downward trend",
            TrendDirection::None => "neither obvious upward nor downward trend",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phrase())
    }
}

/// Result of a Mann-Kendall test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendVerdict {
    /// Trend direction.
    pub direction: TrendDirection,
    /// |z| exceeded the two-sided critical value.
    pub significant: bool,
    /// Two-sided p-value.
    pub p_value: f64,
    /// Continuity-corrected normal score.
    pub z_score: f64,
    /// Kendall S statistic.
    pub s: i64,
    /// Variance of S under the null hypothesis, tie-corrected.
    pub variance: f64,
    /// Set when var(S) is zero and the test is undefined.
    pub indeterminate: bool,
    /// Number of observations tested.
    pub n: usize,
}

impl TrendVerdict {
    /// Neutral verdict used when the test cannot be evaluated.
    pub fn indeterminate(n: usize) -> Self {
        Self {
            direction: TrendDirection::None,
            significant: false,
            p_value: 1.0,
            z_score: 0.0,
            s: 0,
            variance: 0.0,
            indeterminate: true,
            n,
        }
    }
}

/// Qualifier placed in front of the trend phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendStrength {
    /// p < 0.1
    Significant,
    /// 0.1 <= p < 0.5
    Plausible,
    /// Anything else, or no direction.
    None,
}

impl TrendStrength {
    /// Grade a verdict. A verdict without direction carries no qualifier.
    pub fn grade(verdict: &TrendVerdict) -> Self {
        if verdict.direction == TrendDirection::None {
            return TrendStrength::None;
        }
        if verdict.p_value < 0.1 {
            TrendStrength::Significant
        } else if verdict.p_value < 0.5 {
            TrendStrength::Plausible
        } else {
            TrendStrength::None
        }
    }
}

// ============================================================================
// Periodicity Types
// ============================================================================

/// How pronounced the seasonal swing is relative to the mean level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PeriodicityClass {
    /// ratio < 0.01 or undefined
    None,
    /// [0.01, 0.05)
    Slight,
    /// [0.05, 0.15)
    Moderate,
    /// >= 0.15
    Evident,
}

impl PeriodicityClass {
    /// Classify an amplitude ratio.
    pub fn classify(ratio: f64) -> Self {
        if ratio.is_nan() || ratio < 0.01 {
            PeriodicityClass::None
        } else if ratio < 0.05 {
            PeriodicityClass::Slight
        } else if ratio < 0.15 {
            PeriodicityClass::Moderate
        } else {
            PeriodicityClass::Evident
        }
    }

    /// Adjective used in labels.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PeriodicityClass::None => "",
            PeriodicityClass::Slight => "slight",
            PeriodicityClass::Moderate => "moderate",
            PeriodicityClass::Evident => "evident",
        }
    }
}

/// Dominant period of a series and its strength.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodicityVerdict {
    /// Period in bins (0 when no period was found).
    pub period: usize,
    /// max |seasonal| / |mean level|, NaN when undefined.
    pub amplitude_ratio: f64,
    /// Strength class.
    pub class: PeriodicityClass,
    /// Unit of one bin.
    pub unit: TimeUnit,
}

impl PeriodicityVerdict {
    /// Verdict for a series with no usable period.
    pub fn none(unit: TimeUnit) -> Self {
        Self {
            period: 0,
            amplitude_ratio: f64::NAN,
            class: PeriodicityClass::None,
            unit,
        }
    }

    /// "evident periodicity of 7 days", or empty when there is none.
    pub fn label(&self) -> String {
        if self.class == PeriodicityClass::None {
            return String::new();
        }
        let unit = if self.period > 1 {
            self.unit.plural()
        } else {
            self.unit.as_str().to_string()
        };
        format!(
            "{} periodicity of {} {}",
            self.class.as_str(),
            self.period,
            unit
        )
    }
}

/// Combined trend and periodicity verdict for one series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesAnalysis {
    /// Mann-Kendall verdict on the deseasonalized trend.
    pub trend: TrendVerdict,
    /// Qualifier derived from the verdict's p-value.
    pub strength: TrendStrength,
    /// Seasonal verdict.
    pub periodicity: PeriodicityVerdict,
    /// p-value of the trend test.
    pub p_value: f64,
}

impl SeriesAnalysis {
    /// Assemble an analysis from its verdicts.
    pub fn new(trend: TrendVerdict, periodicity: PeriodicityVerdict) -> Self {
        Self {
            strength: TrendStrength::grade(&trend),
            p_value: trend.p_value,
            trend,
            periodicity,
        }
    }

    /// "an overall significant upward trend", or the bare phrase.
    pub fn trend_label(&self) -> String {
        match self.strength {
            TrendStrength::Significant => {
                format!("an overall significant {}", self.trend.direction.phrase())
            }
            TrendStrength::Plausible => {
                format!("an overall plausible {}", self.trend.direction.phrase())
            }
            TrendStrength::None => self.trend.direction.phrase().to_string(),
        }
    }

    /// Periodicity label, empty when none.
    pub fn periodicity_label(&self) -> String {
        self.periodicity.label()
    }
}

// ============================================================================
// Decomposition Types
// ============================================================================

/// Additive seasonal decomposition result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionResult {
    /// Centered moving-average trend, NaN at the edges.
    pub trend: Vec<f64>,
    /// Seasonal component (periodic with `period`).
    pub seasonal: Vec<f64>,
    /// Observed minus trend minus seasonal.
    pub residual: Vec<f64>,
    /// Series length.
    pub n: usize,
    /// Period used.
    pub period: usize,
}

impl DecompositionResult {
    /// The trend values that are defined.
    pub fn finite_trend(&self) -> Vec<f64> {
        self.trend.iter().copied().filter(|v| v.is_finite()).collect()
    }
}

/// Periodogram estimate (one-sided, density scaling).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Periodogram {
    /// Frequencies in cycles per bin, k/n for k = 0..=n/2.
    pub frequencies: Vec<f64>,
    /// Power spectral density at each frequency.
    pub power: Vec<f64>,
    /// Length of the analyzed series.
    pub n: usize,
}

// ============================================================================
// Calendar Types
// ============================================================================

/// Calendar unit of a bin interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Second
    Second,
    /// Minute
    Minute,
    /// Hour
    Hour,
    /// Day
    Day,
    /// Week
    Week,
    /// Month
    Month,
    /// Season (quarter)
    Season,
    /// Year
    Year,
    /// Decade
    Decade,
}

impl TimeUnit {
    /// All units, finest first.
    pub const ALL: [TimeUnit; 9] = [
        TimeUnit::Second,
        TimeUnit::Minute,
        TimeUnit::Hour,
        TimeUnit::Day,
        TimeUnit::Week,
        TimeUnit::Month,
        TimeUnit::Season,
        TimeUnit::Year,
        TimeUnit::Decade,
    ];

    /// Singular unit name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Second => "second",
            TimeUnit::Minute => "minute",
            TimeUnit::Hour => "hour",
            TimeUnit::Day => "day",
            TimeUnit::Week => "week",
            TimeUnit::Month => "month",
            TimeUnit::Season => "season",
            TimeUnit::Year => "year",
            TimeUnit::Decade => "decade",
        }
    }

    /// Plural unit name.
    pub fn plural(&self) -> String {
        format!("{}s", self.as_str())
    }

    /// Position in `ALL`.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Parse a singular unit name.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|u| u.as_str() == s)
    }

    /// Resolution a range label uses when this unit dominates.
    pub fn resolution(&self) -> Resolution {
        if self.index() <= TimeUnit::Week.index() {
            Resolution::Precise
        } else {
            Resolution::Coarse
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether range labels carry clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    /// "H:MM AM, Month Dth, YYYY"
    Precise,
    /// "Month Dth, YYYY"
    Coarse,
}

/// Broken-down wall-clock fields of one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFields {
    /// Year
    pub year: i32,
    /// Month, 1-12
    pub month: u32,
    /// Day of month, 1-31
    pub day: u32,
    /// Hour on a 12-hour clock, 1-12
    pub hour12: u32,
    /// "AM" or "PM"
    pub meridiem: String,
    /// Minute
    pub minute: u32,
    /// Second
    pub second: u32,
    /// Microsecond
    pub microsecond: u32,
}

/// Start and end labels for a report period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRangeLabel {
    /// Label of the period start.
    pub start: String,
    /// Label of the period end.
    pub end: String,
    /// Resolution the labels were rendered at.
    pub resolution: Resolution,
    /// Dominant unit of the bin interval.
    pub unit: TimeUnit,
    /// Calendar fields of the start.
    pub start_fields: CalendarFields,
    /// Calendar fields of the end.
    pub end_fields: CalendarFields,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pruned_series_keeps_bins() {
        let pruned = PrunedSeries::from_values(&[0.0, 3.0, 0.0, 5.0, 1.0]);
        assert_eq!(pruned.values, vec![3.0, 5.0, 1.0]);
        assert_eq!(pruned.bins, vec![1, 3, 4]);
        assert_eq!(pruned.argmax_bin(), Some(3));
        assert_eq!(pruned.argmin_bin(), Some(4));
    }

    #[test]
    fn test_pruned_series_first_on_ties() {
        let pruned = PrunedSeries::from_values(&[2.0, 0.0, 2.0, 1.0, 1.0]);
        assert_eq!(pruned.argmax_bin(), Some(0));
        assert_eq!(pruned.argmin_bin(), Some(3));
        assert_eq!(PrunedSeries::default().argmax_bin(), None);
    }

    #[test]
    fn test_aligned_to_support() {
        let pruned = PrunedSeries::aligned_to(&[0.5, -1.0, 0.0, 2.0], &[1.0, 0.0, 4.0, 2.0]);
        assert_eq!(pruned.values, vec![0.5, 0.0, 2.0]);
        assert_eq!(pruned.bins, vec![0, 2, 3]);
    }

    #[test]
    fn test_periodicity_class_boundaries() {
        assert_eq!(PeriodicityClass::classify(f64::NAN), PeriodicityClass::None);
        assert_eq!(PeriodicityClass::classify(0.0099), PeriodicityClass::None);
        assert_eq!(PeriodicityClass::classify(0.01), PeriodicityClass::Slight);
        assert_eq!(PeriodicityClass::classify(0.05), PeriodicityClass::Moderate);
        assert_eq!(PeriodicityClass::classify(0.15), PeriodicityClass::Evident);
    }

    #[test]
    fn test_periodicity_label_pluralizes() {
        let mut verdict = PeriodicityVerdict {
            period: 7,
            amplitude_ratio: 0.2,
            class: PeriodicityClass::Evident,
            unit: TimeUnit::Day,
        };
        assert_eq!(verdict.label(), "evident periodicity of 7 days");
        verdict.period = 1;
        assert_eq!(verdict.label(), "evident periodicity of 1 day");
        assert_eq!(PeriodicityVerdict::none(TimeUnit::Day).label(), "");
    }

    #[test]
    fn test_trend_label() {
        let mut trend = TrendVerdict::indeterminate(10);
        trend.direction = TrendDirection::Upward;
        trend.p_value = 0.03;
        let analysis = SeriesAnalysis::new(trend, PeriodicityVerdict::none(TimeUnit::Day));
        assert_eq!(analysis.trend_label(), "an overall significant upward trend");

        trend.direction = TrendDirection::Downward;
        trend.p_value = 0.3;
        let analysis = SeriesAnalysis::new(trend, PeriodicityVerdict::none(TimeUnit::Day));
        assert_eq!(analysis.trend_label(), "an overall plausible downward trend");

        let neutral = SeriesAnalysis::new(
            TrendVerdict::indeterminate(3),
            PeriodicityVerdict::none(TimeUnit::Day),
        );
        assert_eq!(
            neutral.trend_label(),
            "neither obvious upward nor downward trend"
        );
    }

    #[test]
    fn test_time_unit_resolution() {
        assert_eq!(TimeUnit::Second.resolution(), Resolution::Precise);
        assert_eq!(TimeUnit::Week.resolution(), Resolution::Precise);
        assert_eq!(TimeUnit::Month.resolution(), Resolution::Coarse);
        assert_eq!(TimeUnit::parse("season"), Some(TimeUnit::Season));
        assert_eq!(TimeUnit::Decade.index(), 8);
    }
}
