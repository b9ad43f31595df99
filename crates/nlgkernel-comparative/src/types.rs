//! Comparative analysis types.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Outlier Types
// ============================================================================

/// Members of a distribution flagged as outliers, split around the mean.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlierSet {
    /// Flagged indices whose value exceeds the distribution mean.
    pub above: Vec<usize>,
    /// Flagged indices whose value is below (or at) the distribution mean.
    pub below: Vec<usize>,
    /// Mean of the distribution.
    pub mean: f64,
    /// Number of members examined.
    pub members: usize,
}

impl OutlierSet {
    /// Total number of flagged members.
    pub fn len(&self) -> usize {
        self.above.len() + self.below.len()
    }

    /// True when nothing was flagged.
    pub fn is_empty(&self) -> bool {
        self.above.is_empty() && self.below.is_empty()
    }

    /// Drop members for which `keep` is false, e.g. the unknown region.
    pub fn retain(&mut self, mut keep: impl FnMut(usize) -> bool) {
        self.above.retain(|&i| keep(i));
        self.below.retain(|&i| keep(i));
    }
}

// ============================================================================
// Correlation Types
// ============================================================================

/// Relatedness bucket of a Pearson coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CorrelationBucket {
    /// r >= 0.7
    StronglyRelated,
    /// 0.3 <= r < 0.7
    WeaklyRelated,
    /// -0.3 <= r < 0.3
    NotRelated,
    /// -0.7 <= r < -0.3
    WeaklyContrary,
    /// r < -0.7
    StronglyContrary,
}

impl CorrelationBucket {
    /// All buckets, most related first.
    pub const ALL: [CorrelationBucket; 5] = [
        CorrelationBucket::StronglyRelated,
        CorrelationBucket::WeaklyRelated,
        CorrelationBucket::NotRelated,
        CorrelationBucket::WeaklyContrary,
        CorrelationBucket::StronglyContrary,
    ];

    /// Bucket for a coefficient. Total over [-1, 1]; values outside are clamped.
    pub fn classify(r: f64) -> Self {
        let r = r.clamp(-1.0, 1.0);
        if r >= 0.7 {
            CorrelationBucket::StronglyRelated
        } else if r >= 0.3 {
            CorrelationBucket::WeaklyRelated
        } else if r >= -0.3 {
            CorrelationBucket::NotRelated
        } else if r >= -0.7 {
            CorrelationBucket::WeaklyContrary
        } else {
            CorrelationBucket::StronglyContrary
        }
    }

    /// Phrase used in narrative sentences.
    pub const fn phrase(&self) -> &'static str {
        match self {
            CorrelationBucket::StronglyRelated => "strongly related",
            CorrelationBucket::WeaklyRelated => "weakly related",
            CorrelationBucket::NotRelated => "not related",
            CorrelationBucket::WeaklyContrary => "weakly contrary",
            CorrelationBucket::StronglyContrary => "strongly contrary",
        }
    }

    /// True for the two contrary buckets.
    pub const fn is_contrary(&self) -> bool {
        matches!(
            self,
            CorrelationBucket::WeaklyContrary | CorrelationBucket::StronglyContrary
        )
    }

    /// Position in `ALL`.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for CorrelationBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phrase())
    }
}

/// Correlation of one series against a reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Relatedness {
    /// Pearson coefficient, `None` when undefined.
    pub coefficient: Option<f64>,
    /// Bucket, `None` when undefined.
    pub bucket: Option<CorrelationBucket>,
    /// Number of bins paired.
    pub pairs: usize,
}

impl Relatedness {
    /// Undefined correlation over `pairs` bins.
    pub fn indeterminate(pairs: usize) -> Self {
        Self {
            coefficient: None,
            bucket: None,
            pairs,
        }
    }
}

/// Members grouped by bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketTally {
    /// Member indices per bucket, in `CorrelationBucket::ALL` order.
    pub members: [Vec<usize>; 5],
    /// Members whose correlation is undefined.
    pub indeterminate: Vec<usize>,
}

impl BucketTally {
    /// Group a list of relatedness results by bucket.
    pub fn tally(results: &[Relatedness]) -> Self {
        let mut tally = Self::default();
        for (i, result) in results.iter().enumerate() {
            match result.bucket {
                Some(bucket) => tally.members[bucket.index()].push(i),
                None => tally.indeterminate.push(i),
            }
        }
        tally
    }

    /// Members in `bucket`.
    pub fn get(&self, bucket: CorrelationBucket) -> &[usize] {
        &self.members[bucket.index()]
    }

    /// Number of members with a defined bucket.
    pub fn classified(&self) -> usize {
        self.members.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(CorrelationBucket::classify(1.0), CorrelationBucket::StronglyRelated);
        assert_eq!(CorrelationBucket::classify(0.7), CorrelationBucket::StronglyRelated);
        assert_eq!(CorrelationBucket::classify(0.69), CorrelationBucket::WeaklyRelated);
        assert_eq!(CorrelationBucket::classify(0.3), CorrelationBucket::WeaklyRelated);
        assert_eq!(CorrelationBucket::classify(0.0), CorrelationBucket::NotRelated);
        assert_eq!(CorrelationBucket::classify(-0.3), CorrelationBucket::NotRelated);
        assert_eq!(CorrelationBucket::classify(-0.31), CorrelationBucket::WeaklyContrary);
        assert_eq!(CorrelationBucket::classify(-0.7), CorrelationBucket::WeaklyContrary);
        assert_eq!(CorrelationBucket::classify(-0.71), CorrelationBucket::StronglyContrary);
        assert_eq!(CorrelationBucket::classify(-1.0), CorrelationBucket::StronglyContrary);
    }

    #[test]
    fn test_bucket_total_over_range() {
        let mut r = -1.0;
        while r <= 1.0 {
            let bucket = CorrelationBucket::classify(r);
            assert!(CorrelationBucket::ALL.contains(&bucket));
            r += 0.01;
        }
        assert_eq!(CorrelationBucket::classify(1.5), CorrelationBucket::StronglyRelated);
    }

    #[test]
    fn test_tally() {
        let results = [
            Relatedness {
                coefficient: Some(0.9),
                bucket: Some(CorrelationBucket::StronglyRelated),
                pairs: 5,
            },
            Relatedness::indeterminate(1),
            Relatedness {
                coefficient: Some(-0.9),
                bucket: Some(CorrelationBucket::StronglyContrary),
                pairs: 5,
            },
        ];
        let tally = BucketTally::tally(&results);
        assert_eq!(tally.get(CorrelationBucket::StronglyRelated), &[0]);
        assert_eq!(tally.get(CorrelationBucket::StronglyContrary), &[2]);
        assert_eq!(tally.indeterminate, vec![1]);
        assert_eq!(tally.classified(), 2);
    }

    #[test]
    fn test_outlier_set_retain() {
        let mut set = OutlierSet {
            above: vec![0, 3],
            below: vec![2],
            mean: 1.0,
            members: 4,
        };
        set.retain(|i| i != 3);
        assert_eq!(set.above, vec![0]);
        assert_eq!(set.len(), 2);
    }
}
