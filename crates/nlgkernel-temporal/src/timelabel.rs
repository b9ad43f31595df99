//! Calendar labels for report periods and bins.
//!
//! Converts epoch-millisecond timestamps and a bin interval into phrases such
//! as "9:05 AM, March 3rd, 2021" or "the 2nd week of March, 2021".

use std::time::Instant;

use chrono::{DateTime, Datelike, FixedOffset, Offset, Timelike, Utc};

use crate::messages::{TimeLabelInput, TimeLabelOutput};
use crate::types::{CalendarFields, Resolution, TimeRangeLabel, TimeUnit};
use nlgkernel_core::{
    domain::Domain,
    error::{KernelError, Result},
    kernel::KernelMetadata,
    traits::{BatchKernel, Kernel},
};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Successive divisors from seconds up to decades.
const UNIT_DIVISORS: [i64; 8] = [60, 60, 24, 7, 4, 3, 4, 10];

// ============================================================================
// Time Label Translator Kernel
// ============================================================================

/// Time label translator kernel.
///
/// Renders calendar phrases in a fixed UTC offset.
#[derive(Debug, Clone)]
pub struct TimeLabelTranslator {
    metadata: KernelMetadata,
    offset: FixedOffset,
}

impl Default for TimeLabelTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeLabelTranslator {
    /// Create a translator rendering in UTC.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::batch("temporal/time-label", Domain::TemporalAnalysis)
                .with_description("Epoch timestamps and bin intervals to calendar phrases"),
            offset: Utc.fix(),
        }
    }

    /// Create a translator rendering at `minutes` east of UTC.
    pub fn with_utc_offset_minutes(minutes: i32) -> Result<Self> {
        let offset = FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
            KernelError::validation(format!("UTC offset out of range: {} minutes", minutes))
        })?;
        Ok(Self {
            offset,
            ..Self::new()
        })
    }

    /// Dominant calendar unit of a bin interval.
    ///
    /// Walks up the unit ladder with floor division until the quotient is at
    /// most one. Intervals beyond a decade clamp to `Decade`.
    pub fn dominant_unit(interval_ms: i64) -> TimeUnit {
        let mut quotient = interval_ms / 1000;
        for (unit, divisor) in TimeUnit::ALL.iter().zip(UNIT_DIVISORS) {
            if quotient <= 1 {
                return *unit;
            }
            quotient /= divisor;
        }
        TimeUnit::Decade
    }

    /// Calendar fields of an instant.
    pub fn fields(&self, timestamp_ms: i64) -> Result<CalendarFields> {
        Ok(calendar_fields(&self.datetime(timestamp_ms)?))
    }

    /// Label the start and end of a report period.
    ///
    /// # Arguments
    /// * `start_ms` - Period start, epoch milliseconds
    /// * `end_ms` - Period end, epoch milliseconds
    /// * `interval_ms` - Bin width, milliseconds, positive
    pub fn translate_range(
        &self,
        start_ms: i64,
        end_ms: i64,
        interval_ms: i64,
    ) -> Result<TimeRangeLabel> {
        if interval_ms <= 0 {
            return Err(KernelError::validation(format!(
                "bin interval must be positive, got {}",
                interval_ms
            )));
        }

        let unit = Self::dominant_unit(interval_ms);
        let resolution = unit.resolution();
        let start_fields = self.fields(start_ms)?;
        let end_fields = self.fields(end_ms)?;

        let render = |f: &CalendarFields| match resolution {
            Resolution::Precise => clock_date(f),
            Resolution::Coarse => month_day_year(f),
        };

        let label = TimeRangeLabel {
            start: render(&start_fields),
            end: render(&end_fields),
            resolution,
            unit,
            start_fields,
            end_fields,
        };

        tracing::debug!(
            unit = %unit,
            ?resolution,
            start = %label.start,
            end = %label.end,
            "Translated range"
        );
        Ok(label)
    }

    /// Label one bin.
    ///
    /// # Arguments
    /// * `index` - Zero-based bin index
    /// * `start_ms` - Start of bin 0
    /// * `end_ms` - End of the period (only checked for ordering)
    /// * `interval_ms` - Bin width
    /// * `unit` - Unit to render at
    pub fn translate_slot(
        &self,
        index: usize,
        start_ms: i64,
        end_ms: i64,
        interval_ms: i64,
        unit: TimeUnit,
    ) -> Result<String> {
        if end_ms < start_ms {
            tracing::warn!(start_ms, end_ms, "Period ends before it starts");
        }

        let offset_ms = i64::try_from(index)
            .ok()
            .and_then(|i| i.checked_mul(interval_ms))
            .and_then(|d| d.checked_add(start_ms))
            .ok_or(KernelError::InvalidTimestamp(start_ms))?;
        let dt = self.datetime(offset_ms)?;
        let f = calendar_fields(&dt);

        let label = match unit {
            TimeUnit::Second => format!(
                "{}:{:02}:{:02} {}, {}",
                f.hour12,
                f.minute,
                f.second,
                f.meridiem,
                month_day_year(&f)
            ),
            TimeUnit::Minute => clock_date(&f),
            TimeUnit::Hour => format!("{} {}, {}", f.hour12, f.meridiem, month_day_year(&f)),
            TimeUnit::Day => month_day_year(&f),
            TimeUnit::Week => format!(
                "the {} week of {}, {}",
                ordinal(week_of_month(&dt)),
                month_name(f.month),
                f.year
            ),
            TimeUnit::Month => format!("{}, {}", month_name(f.month), f.year),
            TimeUnit::Season => format!("Q{} {}", (f.month - 1) / 3 + 1, f.year),
            TimeUnit::Year => f.year.to_string(),
            TimeUnit::Decade => format!("the {}s", f.year.div_euclid(10) * 10),
        };

        Ok(label)
    }

    fn datetime(&self, timestamp_ms: i64) -> Result<DateTime<FixedOffset>> {
        DateTime::from_timestamp_millis(timestamp_ms)
            .map(|dt| dt.with_timezone(&self.offset))
            .ok_or(KernelError::InvalidTimestamp(timestamp_ms))
    }
}

fn calendar_fields(dt: &DateTime<FixedOffset>) -> CalendarFields {
    let (pm, hour12) = dt.hour12();
    CalendarFields {
        year: dt.year(),
        month: dt.month(),
        day: dt.day(),
        hour12,
        meridiem: if pm { "PM" } else { "AM" }.to_string(),
        minute: dt.minute(),
        second: dt.second(),
        microsecond: dt.nanosecond() / 1000 % 1_000_000,
    }
}

/// Week of month, counting from the week holding the 1st (Monday-based).
fn week_of_month(dt: &DateTime<FixedOffset>) -> u32 {
    let first_weekday = dt
        .date_naive()
        .with_day(1)
        .map(|d| d.weekday().num_days_from_monday())
        .unwrap_or(0);
    (dt.day() + first_weekday).div_ceil(7)
}

fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("")
}

/// Drop the leading zero of a zero-padded two-digit field ("03" -> "3").
pub fn strip_leading_zero(field: &str) -> &str {
    match field.strip_prefix('0') {
        Some(rest) if !rest.is_empty() => rest,
        _ => field,
    }
}

/// English ordinal suffix; 11th, 12th and 13th take "th".
pub fn ordinal_suffix(n: u32) -> &'static str {
    if (11..=13).contains(&(n % 100)) {
        return "th";
    }
    match n % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// "3rd" from 3.
pub fn ordinal(n: u32) -> String {
    format!("{}{}", n, ordinal_suffix(n))
}

/// "March 3rd" from the zero-padded day field.
fn day_phrase(f: &CalendarFields) -> String {
    let padded = format!("{:02}", f.day);
    let day = strip_leading_zero(&padded);
    format!("{} {}{}", month_name(f.month), day, ordinal_suffix(f.day))
}

/// "March 3rd, 2021"
fn month_day_year(f: &CalendarFields) -> String {
    format!("{}, {}", day_phrase(f), f.year)
}

/// "9:05 AM, March 3rd, 2021"
fn clock_date(f: &CalendarFields) -> String {
    format!(
        "{}:{:02} {}, {}",
        f.hour12,
        f.minute,
        f.meridiem,
        month_day_year(f)
    )
}

impl Kernel for TimeLabelTranslator {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

impl BatchKernel<TimeLabelInput, TimeLabelOutput> for TimeLabelTranslator {
    fn execute(&self, input: TimeLabelInput) -> Result<TimeLabelOutput> {
        let start = Instant::now();
        let range = self.translate_range(input.start_ms, input.end_ms, input.interval_ms)?;
        let slots = input
            .slots
            .iter()
            .map(|&i| {
                self.translate_slot(i, input.start_ms, input.end_ms, input.interval_ms, range.unit)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(TimeLabelOutput {
            range,
            slots,
            compute_time_us: start.elapsed().as_micros() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: i64 = 86_400_000;
    // 2021-03-03T09:05:07Z, a Wednesday
    const MARCH_3_2021: i64 = 1_614_762_307_000;

    #[test]
    fn test_dominant_unit() {
        assert_eq!(TimeLabelTranslator::dominant_unit(500), TimeUnit::Second);
        assert_eq!(TimeLabelTranslator::dominant_unit(1_000), TimeUnit::Second);
        assert_eq!(TimeLabelTranslator::dominant_unit(60_000), TimeUnit::Minute);
        assert_eq!(TimeLabelTranslator::dominant_unit(3_600_000), TimeUnit::Hour);
        assert_eq!(TimeLabelTranslator::dominant_unit(DAY_MS), TimeUnit::Day);
        assert_eq!(TimeLabelTranslator::dominant_unit(7 * DAY_MS), TimeUnit::Week);
        assert_eq!(TimeLabelTranslator::dominant_unit(30 * DAY_MS), TimeUnit::Month);
        assert_eq!(TimeLabelTranslator::dominant_unit(91 * DAY_MS), TimeUnit::Season);
        assert_eq!(TimeLabelTranslator::dominant_unit(365 * DAY_MS), TimeUnit::Year);
        assert_eq!(TimeLabelTranslator::dominant_unit(i64::MAX), TimeUnit::Decade);
    }

    #[test]
    fn test_daily_year_range_is_precise() {
        let translator = TimeLabelTranslator::new();
        let label = translator
            .translate_range(0, 31_536_000_000, DAY_MS)
            .unwrap();
        assert_eq!(label.unit, TimeUnit::Day);
        assert_eq!(label.resolution, Resolution::Precise);
        assert_eq!(label.start, "12:00 AM, January 1st, 1970");
        assert_eq!(label.end, "12:00 AM, January 1st, 1971");
    }

    #[test]
    fn test_coarse_range() {
        let translator = TimeLabelTranslator::new();
        let label = translator
            .translate_range(MARCH_3_2021, MARCH_3_2021 + 300 * DAY_MS, 30 * DAY_MS)
            .unwrap();
        assert_eq!(label.resolution, Resolution::Coarse);
        assert_eq!(label.start, "March 3rd, 2021");
        assert_eq!(label.start_fields.hour12, 9);
        assert_eq!(label.start_fields.meridiem, "AM");
    }

    #[test]
    fn test_slot_labels() {
        let t = TimeLabelTranslator::new();
        let slot = |unit| t.translate_slot(0, MARCH_3_2021, MARCH_3_2021, DAY_MS, unit).unwrap();
        assert_eq!(slot(TimeUnit::Second), "9:05:07 AM, March 3rd, 2021");
        assert_eq!(slot(TimeUnit::Minute), "9:05 AM, March 3rd, 2021");
        assert_eq!(slot(TimeUnit::Hour), "9 AM, March 3rd, 2021");
        assert_eq!(slot(TimeUnit::Day), "March 3rd, 2021");
        // March 2021 starts on a Monday
        assert_eq!(slot(TimeUnit::Week), "the 1st week of March, 2021");
        assert_eq!(slot(TimeUnit::Month), "March, 2021");
        assert_eq!(slot(TimeUnit::Season), "Q1 2021");
        assert_eq!(slot(TimeUnit::Year), "2021");
        assert_eq!(slot(TimeUnit::Decade), "the 2020s");
    }

    #[test]
    fn test_slot_index_offsets_start() {
        let t = TimeLabelTranslator::new();
        let label = t
            .translate_slot(9, MARCH_3_2021, MARCH_3_2021 + 30 * DAY_MS, DAY_MS, TimeUnit::Day)
            .unwrap();
        assert_eq!(label, "March 12th, 2021");
        let label = t
            .translate_slot(8, MARCH_3_2021, MARCH_3_2021 + 30 * DAY_MS, DAY_MS, TimeUnit::Week)
            .unwrap();
        assert_eq!(label, "the 2nd week of March, 2021");
    }

    #[test]
    fn test_slot_zero_round_trips_range_start() {
        let t = TimeLabelTranslator::new();

        let precise = t.translate_range(MARCH_3_2021, MARCH_3_2021 + DAY_MS, 3_600_000).unwrap();
        let slot = t
            .translate_slot(0, MARCH_3_2021, MARCH_3_2021 + DAY_MS, 3_600_000, TimeUnit::Minute)
            .unwrap();
        assert_eq!(precise.start, slot);

        let coarse = t
            .translate_range(MARCH_3_2021, MARCH_3_2021 + 400 * DAY_MS, 30 * DAY_MS)
            .unwrap();
        let slot = t
            .translate_slot(0, MARCH_3_2021, MARCH_3_2021 + 400 * DAY_MS, 30 * DAY_MS, TimeUnit::Day)
            .unwrap();
        assert_eq!(coarse.start, slot);
    }

    #[test]
    fn test_ordinals() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(21), "21st");
        assert_eq!(ordinal(22), "22nd");
        assert_eq!(ordinal(31), "31st");
    }

    #[test]
    fn test_strip_leading_zero() {
        assert_eq!(strip_leading_zero("03"), "3");
        assert_eq!(strip_leading_zero("10"), "10");
        assert_eq!(strip_leading_zero("0"), "0");
    }

    #[test]
    fn test_utc_offset() {
        let t = TimeLabelTranslator::with_utc_offset_minutes(-600).unwrap();
        // 09:05 UTC is 11:05 PM the previous day at UTC-10
        let label = t
            .translate_slot(0, MARCH_3_2021, MARCH_3_2021, DAY_MS, TimeUnit::Minute)
            .unwrap();
        assert_eq!(label, "11:05 PM, March 2nd, 2021");
        assert!(TimeLabelTranslator::with_utc_offset_minutes(24 * 60).is_err());
    }

    #[test]
    fn test_invalid_inputs() {
        let t = TimeLabelTranslator::new();
        assert!(t.translate_range(0, DAY_MS, 0).is_err());
        assert!(matches!(
            t.translate_slot(usize::MAX, 0, 0, DAY_MS, TimeUnit::Day),
            Err(KernelError::InvalidTimestamp(_))
        ));
    }
}
