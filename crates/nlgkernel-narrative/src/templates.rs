//! Sentence templates and the rule tables that select them.
//!
//! Templates carry `{name}` slots filled by [`render`]. Branching on
//! verdicts lives here as data: a table is scanned top to bottom and the
//! first rule whose conditions match the verdict tuple wins, so more specific
//! rules come first and each table ends in a catch-all.

use nlgkernel_core::error::{KernelError, Result};
use nlgkernel_temporal::{PeriodicityClass, TrendDirection, TrendStrength};

// ============================================================================
// Slots and Rendering
// ============================================================================

/// Named values for a template's slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slots {
    values: Vec<(&'static str, String)>,
}

impl Slots {
    /// Empty slot set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a slot, replacing an earlier value of the same name.
    pub fn set(mut self, name: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
        self
    }

    /// Value of a slot.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Fill every `{name}` slot of a template.
///
/// A slot without a value is an internal error: tables and composer must
/// agree on slot names.
pub fn render(template: &str, slots: &Slots) -> Result<String> {
    let mut out = String::with_capacity(template.len() + 32);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| {
            KernelError::internal(format!("unterminated slot in template: {}", template))
        })?;
        let name = &after[..close];
        let value = slots
            .get(name)
            .ok_or_else(|| KernelError::internal(format!("template slot `{}` has no value", name)))?;
        out.push_str(value);
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

// ============================================================================
// Rule Conditions
// ============================================================================

/// Condition on one verdict field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Is<T> {
    /// Matches anything.
    Any,
    /// Matches exactly this value.
    Eq(T),
    /// Matches anything but this value.
    Ne(T),
}

impl<T: PartialEq> Is<T> {
    /// Whether `value` satisfies the condition.
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Is::Any => true,
            Is::Eq(v) => v == value,
            Is::Ne(v) => v != value,
        }
    }
}

/// Condition on the periodicity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// Any class.
    Any,
    /// No periodicity.
    Absent,
    /// Any periodicity.
    Present,
    /// Slight periodicity only.
    Slight,
    /// Moderate or evident periodicity.
    Pronounced,
}

impl Period {
    /// Whether `class` satisfies the condition.
    pub fn matches(&self, class: PeriodicityClass) -> bool {
        match self {
            Period::Any => true,
            Period::Absent => class == PeriodicityClass::None,
            Period::Present => class != PeriodicityClass::None,
            Period::Slight => class == PeriodicityClass::Slight,
            Period::Pronounced => class >= PeriodicityClass::Moderate,
        }
    }
}

/// Sign of the average sentiment over the report period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Average above zero.
    Positive,
    /// Average at or below zero.
    Negative,
}

impl Polarity {
    /// Polarity of an average score.
    pub fn of(average: f64) -> Self {
        if average > 0.0 {
            Polarity::Positive
        } else {
            Polarity::Negative
        }
    }
}

// ============================================================================
// Trend Rules
// ============================================================================

/// Order in which the peak and valley are mentioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremes {
    /// Peak, then valley.
    PeakFirst,
    /// Valley, then peak.
    ValleyFirst,
    /// Not mentioned.
    Omit,
}

impl Extremes {
    /// Template for the follow-up sentence.
    pub const fn template(&self) -> Option<&'static str> {
        match self {
            Extremes::PeakFirst => Some("It reaches peak at {peak} and touches valley at {valley}."),
            Extremes::ValleyFirst => {
                Some("It touches valley at {valley} and reaches peak at {peak}.")
            }
            Extremes::Omit => None,
        }
    }
}

/// Verdict tuple a trend sentence is selected by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendKey {
    /// Sign of the average sentiment (positive for count series).
    pub polarity: Polarity,
    /// Trend qualifier.
    pub strength: TrendStrength,
    /// Trend direction.
    pub direction: TrendDirection,
    /// Periodicity class.
    pub periodicity: PeriodicityClass,
}

/// One row of a trend table.
#[derive(Debug, Clone, Copy)]
pub struct TrendRule {
    /// Polarity condition.
    pub polarity: Is<Polarity>,
    /// Strength condition.
    pub strength: Is<TrendStrength>,
    /// Direction condition.
    pub direction: Is<TrendDirection>,
    /// Periodicity condition.
    pub periodicity: Period,
    /// Sentence with `{trend}`, `{periodicity}`, `{start}` and `{end}` slots.
    pub sentence: &'static str,
    /// Peak and valley follow-up.
    pub extremes: Extremes,
}

impl TrendRule {
    /// Whether the rule applies to `key`.
    pub fn matches(&self, key: &TrendKey) -> bool {
        self.polarity.matches(&key.polarity)
            && self.strength.matches(&key.strength)
            && self.direction.matches(&key.direction)
            && self.periodicity.matches(key.periodicity)
    }
}

/// First rule of `table` matching `key`.
pub fn select_trend<'a>(table: &'a [TrendRule], key: &TrendKey) -> Result<&'a TrendRule> {
    table
        .iter()
        .find(|rule| rule.matches(key))
        .ok_or_else(|| KernelError::internal(format!("no trend template for {:?}", key)))
}

const fn rule(
    polarity: Is<Polarity>,
    strength: Is<TrendStrength>,
    direction: Is<TrendDirection>,
    periodicity: Period,
    sentence: &'static str,
    extremes: Extremes,
) -> TrendRule {
    TrendRule {
        polarity,
        strength,
        direction,
        periodicity,
        sentence,
        extremes,
    }
}

/// Trend of the total document counts.
pub const COUNT_TREND: &[TrendRule] = &[
    rule(
        Is::Any,
        Is::Any,
        Is::Any,
        Period::Absent,
        "For all of the documents, the temporal pattern exhibits {trend} over the period from {start} to {end}.",
        Extremes::PeakFirst,
    ),
    rule(
        Is::Any,
        Is::Eq(TrendStrength::Significant),
        Is::Any,
        Period::Present,
        "For all of the documents, the temporal pattern exhibits {trend} with {periodicity} over the period from {start} to {end}.",
        Extremes::PeakFirst,
    ),
    rule(
        Is::Any,
        Is::Any,
        Is::Any,
        Period::Pronounced,
        "For all of the documents, the temporal pattern exhibits {periodicity} with {trend} over the period from {start} to {end}.",
        Extremes::PeakFirst,
    ),
    rule(
        Is::Any,
        Is::Any,
        Is::Any,
        Period::Any,
        "For all of the documents, the temporal pattern exhibits {trend} with {periodicity} over the period from {start} to {end}.",
        Extremes::PeakFirst,
    ),
];

/// Trend of the average sentiment per bin.
pub const SENTIMENT_TREND: &[TrendRule] = &[
    // Positive average, no periodicity.
    rule(
        Is::Eq(Polarity::Positive),
        Is::Any,
        Is::Eq(TrendDirection::Downward),
        Period::Absent,
        "Although the overall average sentiment for all of the documents over the period from {start} to {end} is positive, for the total number of positive sentiment documents, the temporal pattern exhibits {trend} during the period.",
        Extremes::ValleyFirst,
    ),
    rule(
        Is::Eq(Polarity::Positive),
        Is::Eq(TrendStrength::Plausible),
        Is::Eq(TrendDirection::Upward),
        Period::Absent,
        "The overall average sentiment for all of the documents over the period from {start} to {end} is positive. And for the total number of positive sentiment documents, the temporal pattern exhibits {trend} during the period.",
        Extremes::PeakFirst,
    ),
    rule(
        Is::Eq(Polarity::Positive),
        Is::Any,
        Is::Any,
        Period::Absent,
        "The overall average sentiment for all of the documents over the period from {start} to {end} is positive. For the total number of positive sentiment documents, the temporal pattern exhibits {trend} during the period.",
        Extremes::PeakFirst,
    ),
    // Positive average, periodic.
    rule(
        Is::Eq(Polarity::Positive),
        Is::Eq(TrendStrength::Plausible),
        Is::Eq(TrendDirection::Downward),
        Period::Pronounced,
        "Although the overall average sentiment for all of the documents over the period from {start} to {end} is positive, for the total number of positive sentiment documents, the temporal pattern exhibits {periodicity}, with {trend} during the period.",
        Extremes::ValleyFirst,
    ),
    rule(
        Is::Eq(Polarity::Positive),
        Is::Any,
        Is::Eq(TrendDirection::Downward),
        Period::Present,
        "Although the overall average sentiment for all of the documents over the period from {start} to {end} is positive, for the total number of positive sentiment documents, the temporal pattern exhibits {trend}, with {periodicity} during this period.",
        Extremes::ValleyFirst,
    ),
    rule(
        Is::Eq(Polarity::Positive),
        Is::Ne(TrendStrength::Significant),
        Is::Any,
        Period::Pronounced,
        "The overall average sentiment for all of the documents over the period from {start} to {end} is positive. For the total number of positive sentiment documents, the temporal pattern exhibits {periodicity}, with {trend} during the period.",
        Extremes::PeakFirst,
    ),
    rule(
        Is::Eq(Polarity::Positive),
        Is::Any,
        Is::Any,
        Period::Present,
        "The overall average sentiment for all of the documents over the period from {start} to {end} is positive. For the total number of positive sentiment documents, the temporal pattern exhibits {trend} with {periodicity} during the period.",
        Extremes::PeakFirst,
    ),
    // Negative average.
    rule(
        Is::Eq(Polarity::Negative),
        Is::Any,
        Is::Any,
        Period::Absent,
        "The overall average sentiment for all of the documents over the period from {start} to {end} is negative. For the total negative sentiment documents, the temporal pattern exhibits {trend} during the period.",
        Extremes::Omit,
    ),
    rule(
        Is::Eq(Polarity::Negative),
        Is::Eq(TrendStrength::Significant),
        Is::Eq(TrendDirection::Upward),
        Period::Present,
        "Although the overall average sentiment for all of the documents over the period from {start} to {end} is negative, there is a significant improvement for the total sentiment scores, associated with {periodicity} during the period.",
        Extremes::PeakFirst,
    ),
    rule(
        Is::Eq(Polarity::Negative),
        Is::Eq(TrendStrength::Significant),
        Is::Eq(TrendDirection::Downward),
        Period::Present,
        "The overall average sentiment for all of the documents over the period from {start} to {end} is negative. What is worse, there is a severe deterioration for the total sentiment scores, associated with {periodicity} during this period.",
        Extremes::ValleyFirst,
    ),
    rule(
        Is::Eq(Polarity::Negative),
        Is::Eq(TrendStrength::Plausible),
        Is::Eq(TrendDirection::Upward),
        Period::Slight,
        "Although the overall average sentiment over the period from {start} to {end} is negative, there is {trend} for the total sentiment scores, associated with {periodicity} during this period.",
        Extremes::PeakFirst,
    ),
    rule(
        Is::Eq(Polarity::Negative),
        Is::Eq(TrendStrength::Plausible),
        Is::Eq(TrendDirection::Upward),
        Period::Pronounced,
        "Although the overall average sentiment over the period from {start} to {end} is negative, there is {periodicity} for the total sentiment scores, associated with a plausible improvement during this period.",
        Extremes::PeakFirst,
    ),
    rule(
        Is::Eq(Polarity::Negative),
        Is::Eq(TrendStrength::Plausible),
        Is::Eq(TrendDirection::Downward),
        Period::Slight,
        "The overall average sentiment for all of the documents over the period from {start} to {end} is negative. What is worse, there is a plausible deterioration for the total sentiment scores, associated with {periodicity} during this period.",
        Extremes::ValleyFirst,
    ),
    rule(
        Is::Eq(Polarity::Negative),
        Is::Eq(TrendStrength::Plausible),
        Is::Eq(TrendDirection::Downward),
        Period::Pronounced,
        "The overall average sentiment for all of the documents over the period from {start} to {end} is negative. What is worse, there is {periodicity} for the total sentiment scores, associated with a plausible deterioration during this period.",
        Extremes::ValleyFirst,
    ),
    rule(
        Is::Eq(Polarity::Negative),
        Is::Any,
        Is::Any,
        Period::Any,
        "The overall average sentiment for all of the documents over the period from {start} to {end} is negative. For the total negative sentiment documents, the temporal pattern exhibits {trend} with {periodicity} during the period.",
        Extremes::PeakFirst,
    ),
];

// ============================================================================
// Group Rules
// ============================================================================

/// How many members of a population a sentence speaks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Every member.
    All,
    /// Exactly one member (and not all).
    One,
    /// Several members (and not all).
    Many,
}

impl Cardinality {
    /// Cardinality of `k` out of `total`; `None` when `k` is zero.
    pub fn of(k: usize, total: usize) -> Option<Self> {
        match k {
            0 => None,
            k if k == total => Some(Cardinality::All),
            1 => Some(Cardinality::One),
            _ => Some(Cardinality::Many),
        }
    }

    /// One or many, ignoring the population size; `None` when `k` is zero.
    pub fn count(k: usize) -> Option<Self> {
        match k {
            0 => None,
            1 => Some(Cardinality::One),
            _ => Some(Cardinality::Many),
        }
    }
}

/// One row of a group table: an optional header and a per-member line.
#[derive(Debug, Clone, Copy)]
pub struct GroupRule {
    /// Cardinality the rule applies to.
    pub cardinality: Cardinality,
    /// Sentence rendered once with the group slots.
    pub header: Option<&'static str>,
    /// Line rendered once per member with that member's slots.
    pub item: Option<&'static str>,
}

/// Rule of `table` for `cardinality`.
pub fn select_group(table: &[GroupRule], cardinality: Cardinality) -> Result<&GroupRule> {
    table
        .iter()
        .find(|rule| rule.cardinality == cardinality)
        .ok_or_else(|| KernelError::internal(format!("no group template for {:?}", cardinality)))
}

const fn group(
    cardinality: Cardinality,
    header: Option<&'static str>,
    item: Option<&'static str>,
) -> GroupRule {
    GroupRule {
        cardinality,
        header,
        item,
    }
}

/// Topics whose share of documents is an upper outlier.
pub const TOPIC_PROPORTION_OUTLIERS: &[GroupRule] = &[
    group(
        Cardinality::One,
        Some("There is one topic that captures comparably more documents:"),
        Some("Topic {id} ({value}), top keywords: {keywords}."),
    ),
    group(
        Cardinality::Many,
        Some("The topics that capture comparably more documents include:"),
        Some("Topic {id} ({value}), top keywords: {keywords}."),
    ),
];

/// Topics whose average sentiment is an upper outlier.
pub const TOPIC_POSITIVE_OUTLIERS: &[GroupRule] = &[
    group(
        Cardinality::One,
        Some("There is one topic that captures comparably more positive sentiment:"),
        Some("Topic {id} ({value}), top keywords: {keywords}."),
    ),
    group(
        Cardinality::Many,
        Some("The topics that capture comparably more positive sentiment include:"),
        Some("Topic {id} ({value}), top keywords: {keywords}."),
    ),
];

/// Topics whose average sentiment is a lower outlier.
pub const TOPIC_NEGATIVE_OUTLIERS: &[GroupRule] = &[
    group(
        Cardinality::One,
        Some("There is one topic that captures comparably more negative sentiment:"),
        Some("Topic {id} ({value}), top keywords: {keywords}."),
    ),
    group(
        Cardinality::Many,
        Some("The topics that capture comparably more negative sentiment include:"),
        Some("Topic {id} ({value}), top keywords: {keywords}."),
    ),
];

/// Regions whose share of documents is an upper outlier.
pub const REGION_COUNT_OUTLIERS: &[GroupRule] = &[
    group(
        Cardinality::One,
        None,
        Some("{region} captures comparably more documents ({share}) than the others."),
    ),
    group(
        Cardinality::Many,
        Some("The following countries/areas capture comparably more documents than the others:"),
        Some("{region}: {share}."),
    ),
];

/// Regions whose average sentiment is an upper outlier.
pub const REGION_POSITIVE_OUTLIERS: &[GroupRule] = &[
    group(
        Cardinality::One,
        None,
        Some("{region} captures comparably more positive documents than the others: on average {score} out of a (-5, +5) scale over {count} documents ({share} in total)."),
    ),
    group(
        Cardinality::Many,
        Some("The following countries/areas capture comparably more positive documents than the others:"),
        Some("{region}: on average {score} out of a (-5, +5) scale over {count} documents ({share} in total)."),
    ),
];

/// Regions whose average sentiment is a lower outlier.
pub const REGION_NEGATIVE_OUTLIERS: &[GroupRule] = &[
    group(
        Cardinality::One,
        None,
        Some("{region} captures comparably more negative documents than the others: on average {score} out of a (-5, +5) scale over {count} documents ({share} in total)."),
    ),
    group(
        Cardinality::Many,
        Some("The following countries/areas capture comparably more negative documents than the others:"),
        Some("{region}: on average {score} out of a (-5, +5) scale over {count} documents ({share} in total)."),
    ),
];

/// Topic count series per relatedness bucket.
pub const COUNT_CORRELATION: &[GroupRule] = &[
    group(
        Cardinality::All,
        Some("All of the categories in the documents are {bucket} with the change of the total trend."),
        None,
    ),
    group(
        Cardinality::One,
        Some("1 of the total {total} categories is {bucket} with the total document amount trend."),
        None,
    ),
    group(
        Cardinality::Many,
        Some("{k} of the total {total} categories are {bucket} with the total document amount trend."),
        None,
    ),
];

/// Topic sentiment series per relatedness bucket.
pub const SENTIMENT_CORRELATION: &[GroupRule] = &[
    group(
        Cardinality::All,
        Some("All of the topics are {bucket} in sentiment to the overall trend."),
        None,
    ),
    group(
        Cardinality::One,
        Some("1 of the {total} topics is {bucket} in sentiment to the overall trend."),
        None,
    ),
    group(
        Cardinality::Many,
        Some("{k} of the {total} topics are {bucket} in sentiment to the overall trend."),
        None,
    ),
];

/// Key words of topics that move against the overall sentiment.
pub const CONTRARY_TOPIC_TERMS: &[GroupRule] = &[
    group(
        Cardinality::One,
        Some("The topic id and frequently mentioned words in this topic include:"),
        Some("No.{id} topic: {terms}, etc."),
    ),
    group(
        Cardinality::Many,
        Some("The topic ids and frequently mentioned words in these topics include:"),
        Some("No.{id} topic: {terms}, etc."),
    ),
];

/// Key words over all topics.
pub const KEY_WORDS: &[GroupRule] = &[
    group(
        Cardinality::One,
        None,
        Some("Among these categories, {term} generates most of the discussions ({share} of the documents)."),
    ),
    group(
        Cardinality::Many,
        Some("Among these categories, the key words that generate most of the discussions are:"),
        Some("{term} ({share} of the documents)"),
    ),
];

// ============================================================================
// Fixed Sentences
// ============================================================================

/// Corpus overview.
pub const OVERVIEW: &str =
    "The {documents} documents collected from {start} to {end} are categorized into {topics} topics.";

/// Buzzword list header.
pub const BUZZWORD_HEADER: &str = "Top buzzwords and the sentiment (on a -5 ~ 5 scale) associated with them mentioned in these documents include:";

/// One buzzword.
pub const BUZZWORD_ITEM: &str = "{term}: appeared in {count} out of {documents} documents ({share}), with overall {score} sentiment.";

/// Range of topic proportions.
pub const PROPORTION_RANGE: &str =
    "The proportion of each topic in the total documents ranges from {min} to {max}.";

/// Topic proportions without outliers.
pub const PROPORTION_EVEN: &str =
    "The proportions are evenly distributed, with mean of {mean} and SD of {sd}.";

/// Range of topic sentiment.
pub const SENTIMENT_RANGE: &str =
    "The sentiment score of each topic ranges from {min} to {max}, out of a (-5, +5) scale.";

/// Topic sentiment without outliers.
pub const SENTIMENT_EVEN: &str = "The sentiment scores are evenly distributed among all of the topics, with mean of {mean} and SD of {sd}.";

/// Regional document shares without outliers.
pub const REGION_COUNT_EVEN: &str =
    "The documents come evenly from these countries/areas, with mean of {mean} and SD of {sd}.";

/// Regional sentiment without outliers.
pub const REGION_SENTIMENT_EVEN: &str = "The sentiment scores of these documents are similar across different countries/areas, with mean of {mean} and SD of {sd}.";

// ============================================================================
// Source Regions
// ============================================================================

/// How many identified regions the documents come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spread {
    /// No identified region.
    Unidentified,
    /// Few enough to name each one.
    Few,
    /// Too many to name.
    Many,
}

/// One row of the source-region table.
#[derive(Debug, Clone, Copy)]
pub struct SourceRule {
    /// Whether the unknown-origin sentinel is present.
    pub unknown: Is<bool>,
    /// Spread condition.
    pub spread: Spread,
    /// Sentence with `{regions}` and `{known}` slots.
    pub sentence: &'static str,
}

/// Source-region sentence by (unknown present, spread).
pub const SOURCES: &[SourceRule] = &[
    SourceRule {
        unknown: Is::Any,
        spread: Spread::Unidentified,
        sentence: "The source countries/areas of the documents cannot be identified.",
    },
    SourceRule {
        unknown: Is::Any,
        spread: Spread::Many,
        sentence: "These documents come from more than {known} countries/areas.",
    },
    SourceRule {
        unknown: Is::Eq(true),
        spread: Spread::Few,
        sentence: "These documents come from {regions}, and other countries/areas.",
    },
    SourceRule {
        unknown: Is::Eq(false),
        spread: Spread::Few,
        sentence: "These documents come from {regions}.",
    },
];

/// Source-region rule for a (unknown present, spread) pair.
pub fn select_source(unknown: bool, spread: Spread) -> Result<&'static SourceRule> {
    SOURCES
        .iter()
        .find(|rule| rule.unknown.matches(&unknown) && rule.spread == spread)
        .ok_or_else(|| {
            KernelError::internal(format!("no source template for ({}, {:?})", unknown, spread))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRENGTHS: [TrendStrength; 3] = [
        TrendStrength::Significant,
        TrendStrength::Plausible,
        TrendStrength::None,
    ];
    const DIRECTIONS: [TrendDirection; 3] = [
        TrendDirection::Upward,
        TrendDirection::Downward,
        TrendDirection::None,
    ];
    const CLASSES: [PeriodicityClass; 4] = [
        PeriodicityClass::None,
        PeriodicityClass::Slight,
        PeriodicityClass::Moderate,
        PeriodicityClass::Evident,
    ];

    fn keys() -> Vec<TrendKey> {
        let mut keys = Vec::new();
        for polarity in [Polarity::Positive, Polarity::Negative] {
            for strength in STRENGTHS {
                for direction in DIRECTIONS {
                    for periodicity in CLASSES {
                        keys.push(TrendKey {
                            polarity,
                            strength,
                            direction,
                            periodicity,
                        });
                    }
                }
            }
        }
        keys
    }

    fn trend_slots() -> Slots {
        Slots::new()
            .set("trend", "T")
            .set("periodicity", "P")
            .set("start", "S")
            .set("end", "E")
            .set("peak", "HI")
            .set("valley", "LO")
    }

    #[test]
    fn test_render() {
        let slots = Slots::new().set("a", "1").set("b", "two").set("a", "one");
        assert_eq!(render("{a} and {b}.", &slots).unwrap(), "one and two.");
        assert_eq!(render("no slots", &slots).unwrap(), "no slots");
        assert!(render("{missing}", &slots).is_err());
        assert!(render("{a", &slots).is_err());
    }

    #[test]
    fn test_trend_tables_are_total() {
        for key in keys() {
            for table in [COUNT_TREND, SENTIMENT_TREND] {
                let rule = select_trend(table, &key).unwrap();
                render(rule.sentence, &trend_slots()).unwrap();
                if let Some(extremes) = rule.extremes.template() {
                    render(extremes, &trend_slots()).unwrap();
                }
            }
        }
    }

    #[test]
    fn test_no_periodicity_never_mentions_it() {
        for key in keys()
            .into_iter()
            .filter(|k| k.periodicity == PeriodicityClass::None)
        {
            for table in [COUNT_TREND, SENTIMENT_TREND] {
                let rule = select_trend(table, &key).unwrap();
                assert!(!rule.sentence.contains("{periodicity}"), "{:?}", key);
            }
        }
    }

    #[test]
    fn test_sentiment_downward_reports_valley_first() {
        let key = TrendKey {
            polarity: Polarity::Positive,
            strength: TrendStrength::Significant,
            direction: TrendDirection::Downward,
            periodicity: PeriodicityClass::Evident,
        };
        let rule = select_trend(SENTIMENT_TREND, &key).unwrap();
        assert!(rule.sentence.starts_with("Although"));
        assert_eq!(rule.extremes, Extremes::ValleyFirst);
    }

    #[test]
    fn test_plausible_pronounced_leads_with_periodicity() {
        let key = TrendKey {
            polarity: Polarity::Positive,
            strength: TrendStrength::Plausible,
            direction: TrendDirection::Upward,
            periodicity: PeriodicityClass::Moderate,
        };
        let rule = select_trend(COUNT_TREND, &key).unwrap();
        let text = render(rule.sentence, &trend_slots()).unwrap();
        assert!(text.contains("exhibits P with T"));

        let slight = TrendKey {
            periodicity: PeriodicityClass::Slight,
            ..key
        };
        let rule = select_trend(COUNT_TREND, &slight).unwrap();
        let text = render(rule.sentence, &trend_slots()).unwrap();
        assert!(text.contains("exhibits T with P"));
    }

    #[test]
    fn test_cardinality() {
        assert_eq!(Cardinality::of(0, 5), None);
        assert_eq!(Cardinality::of(5, 5), Some(Cardinality::All));
        assert_eq!(Cardinality::of(1, 5), Some(Cardinality::One));
        assert_eq!(Cardinality::of(1, 1), Some(Cardinality::All));
        assert_eq!(Cardinality::of(3, 5), Some(Cardinality::Many));
        assert_eq!(Cardinality::count(1), Some(Cardinality::One));
        assert_eq!(Cardinality::count(4), Some(Cardinality::Many));
    }

    #[test]
    fn test_group_tables_cover_one_and_many() {
        for table in [
            TOPIC_PROPORTION_OUTLIERS,
            TOPIC_POSITIVE_OUTLIERS,
            TOPIC_NEGATIVE_OUTLIERS,
            REGION_COUNT_OUTLIERS,
            REGION_POSITIVE_OUTLIERS,
            REGION_NEGATIVE_OUTLIERS,
            COUNT_CORRELATION,
            SENTIMENT_CORRELATION,
            CONTRARY_TOPIC_TERMS,
            KEY_WORDS,
        ] {
            assert!(select_group(table, Cardinality::One).is_ok());
            assert!(select_group(table, Cardinality::Many).is_ok());
        }
        assert!(select_group(COUNT_CORRELATION, Cardinality::All).is_ok());
        assert!(select_group(KEY_WORDS, Cardinality::All).is_err());
    }

    #[test]
    fn test_singular_plural_wording() {
        let slots = Slots::new()
            .set("k", "1")
            .set("total", "4")
            .set("bucket", "weakly related");
        let one = select_group(SENTIMENT_CORRELATION, Cardinality::One).unwrap();
        assert_eq!(
            render(one.header.unwrap(), &slots).unwrap(),
            "1 of the 4 topics is weakly related in sentiment to the overall trend."
        );
    }

    #[test]
    fn test_sources() {
        for unknown in [true, false] {
            for spread in [Spread::Unidentified, Spread::Few, Spread::Many] {
                assert!(select_source(unknown, spread).is_ok());
            }
        }
        let rule = select_source(true, Spread::Few).unwrap();
        let slots = Slots::new().set("regions", "France, Spain");
        assert_eq!(
            render(rule.sentence, &slots).unwrap(),
            "These documents come from France, Spain, and other countries/areas."
        );
    }
}
