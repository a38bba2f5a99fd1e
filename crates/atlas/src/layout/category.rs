//! Node categories and freshness buckets.
//!
//! Categories drive grouping: in automatic mode each category gets its own
//! chain of regions, in manual mode categories are spread proportionally
//! over the supplied regions. Freshness buckets also feed the packer's
//! priority so that recently updated nodes are placed first.

use std::fmt;

use atlas_core::sizing::NodeKind;

use crate::model::NodeSpec;

const SECONDS_PER_DAY: i64 = 86_400;

const ROOT_BONUS: u32 = 4;
const HUB_BONUS: u32 = 2;

/// The group a node belongs to.
///
/// The derived ordering is the processing order: freshness buckets from
/// freshest to stalest, then named categories alphabetically, then nodes
/// without any category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Fresh(usize),
    Named(String),
    Uncategorized,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fresh(bucket) => write!(f, "freshness-{bucket}"),
            Self::Named(name) => write!(f, "{name}"),
            Self::Uncategorized => write!(f, "uncategorized"),
        }
    }
}

/// Age thresholds, in days, splitting nodes into freshness buckets.
///
/// With bounds `[1, 7, 30]` there are four buckets: at most one day old,
/// at most a week, at most a month, and older.
#[derive(Debug, Clone, PartialEq)]
pub struct FreshnessBuckets {
    bounds_days: Vec<u32>,
}

impl FreshnessBuckets {
    pub fn new(bounds_days: Vec<u32>) -> Self {
        Self { bounds_days }
    }

    /// Number of buckets, including the final "stale" bucket.
    pub fn count(&self) -> usize {
        self.bounds_days.len() + 1
    }

    /// Bucket of a node last updated at `timestamp`, seen from `now`.
    ///
    /// Timestamps in the future count as age zero.
    ///
    /// ```
    /// # use atlas::layout::category::FreshnessBuckets;
    /// let buckets = FreshnessBuckets::new(vec![1, 7, 30]);
    /// let now = 100 * 86_400;
    ///
    /// assert_eq!(buckets.bucket(now - 3_600, now), 0);
    /// assert_eq!(buckets.bucket(now - 3 * 86_400, now), 1);
    /// assert_eq!(buckets.bucket(now - 400 * 86_400, now), 3);
    /// ```
    pub fn bucket(&self, timestamp: i64, now: i64) -> usize {
        let age_seconds = now.saturating_sub(timestamp).max(0);
        let age_days = age_seconds / SECONDS_PER_DAY;
        self.bounds_days
            .iter()
            .position(|&bound| age_days <= i64::from(bound))
            .unwrap_or(self.bounds_days.len())
    }

    /// Human-readable name of a bucket.
    pub fn label(&self, bucket: usize) -> String {
        match self.bounds_days.get(bucket) {
            Some(bound) => format!("updated within {bound}d"),
            None => "stale".to_string(),
        }
    }
}

/// Derives a node's category. An explicit category wins; otherwise a
/// freshness timestamp is bucketed when a reference time is known.
pub fn categorize(node: &NodeSpec, buckets: &FreshnessBuckets, now: Option<i64>) -> Category {
    if let Some(name) = node.category() {
        return Category::Named(name.to_string());
    }
    match (node.freshness_timestamp(), now) {
        (Some(timestamp), Some(now)) => Category::Fresh(buckets.bucket(timestamp, now)),
        _ => Category::Uncategorized,
    }
}

/// Display name of a category.
pub fn category_label(category: &Category, buckets: &FreshnessBuckets) -> String {
    match category {
        Category::Fresh(bucket) => buckets.label(*bucket),
        other => other.to_string(),
    }
}

/// Packing priority from node kind and freshness; higher is placed first.
pub fn priority(kind: NodeKind, category: &Category, buckets: &FreshnessBuckets) -> u32 {
    let kind_bonus = match kind {
        NodeKind::Root => ROOT_BONUS,
        NodeKind::Hub => HUB_BONUS,
        NodeKind::Leaf => 0,
    };
    let freshness_bonus = match category {
        Category::Fresh(bucket) => buckets.count().saturating_sub(*bucket) as u32,
        _ => 0,
    };
    kind_bonus + freshness_bonus
}

/// Region index for the category ranked `rank` out of `categories`, spread
/// proportionally over `regions` regions.
///
/// ```
/// # use atlas::layout::category::proportional_slot;
/// // Six categories over three regions: two per region.
/// let slots: Vec<usize> = (0..6).map(|rank| proportional_slot(rank, 6, 3)).collect();
/// assert_eq!(slots, vec![0, 0, 1, 1, 2, 2]);
/// ```
pub fn proportional_slot(rank: usize, categories: usize, regions: usize) -> usize {
    if categories == 0 || regions == 0 {
        return 0;
    }
    (rank * regions / categories).min(regions - 1)
}
