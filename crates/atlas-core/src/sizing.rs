//! Node size classification.
//!
//! A node's placement size comes either from an explicit override or from a
//! logarithmic mapping of a magnitude metric onto the range spanned by a
//! [`TierList`], snapped to the nearest tier. Tiers are chosen so that the
//! footprint radius `k × size` is a whole number of grid units.
//!
//! The same metadata also decides the node's [`NodeKind`], which feeds the
//! packer's secondary priority.

use log::trace;
use thiserror::Error;

/// Tolerance used when checking that `k × tier` is integral.
const INTEGRAL_TOLERANCE: f32 = 1e-4;

/// Errors raised while classifying sizes or building a tier list.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SizingError {
    #[error("invalid size {0}: sizes must be finite and positive")]
    InvalidSize(f32),

    #[error("tier list must not be empty")]
    EmptyTiers,

    #[error("tier list must be strictly ascending and positive (offending tier {0})")]
    UnorderedTiers(f32),

    #[error("footprint scale {scale} × tier {tier} is not a whole number of grid units")]
    FractionalFootprint { scale: f32, tier: f32 },

    #[error("invalid footprint scale {0}")]
    InvalidScale(f32),
}

/// Ordered list of allowed node sizes.
#[derive(Debug, Clone, PartialEq)]
pub struct TierList {
    tiers: Vec<f32>,
}

impl TierList {
    /// Builds a tier list, checking that every `footprint_scale × tier` is integral.
    ///
    /// # Errors
    ///
    /// Returns a [`SizingError`] for an empty list, unordered or non-positive
    /// tiers, or tiers that would produce fractional footprint radii.
    pub fn new(tiers: Vec<f32>, footprint_scale: f32) -> Result<Self, SizingError> {
        if !(footprint_scale.is_finite() && footprint_scale > 0.0) {
            return Err(SizingError::InvalidScale(footprint_scale));
        }
        if tiers.is_empty() {
            return Err(SizingError::EmptyTiers);
        }

        let mut previous = 0.0_f32;
        for &tier in &tiers {
            if !tier.is_finite() || tier <= previous {
                return Err(SizingError::UnorderedTiers(tier));
            }
            let radius = footprint_scale * tier;
            if (radius - radius.round()).abs() > INTEGRAL_TOLERANCE {
                return Err(SizingError::FractionalFootprint {
                    scale: footprint_scale,
                    tier,
                });
            }
            previous = tier;
        }

        Ok(Self { tiers })
    }

    /// Smallest tier.
    pub fn min(&self) -> f32 {
        self.tiers[0]
    }

    /// Largest tier.
    pub fn max(&self) -> f32 {
        self.tiers[self.tiers.len() - 1]
    }

    /// Number of tiers.
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// Always false; a tier list has at least one entry.
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Tier at `index`, saturating at the top tier.
    pub fn get(&self, index: usize) -> f32 {
        self.tiers[index.min(self.tiers.len() - 1)]
    }

    /// Index of the tier nearest to `value`; ties go to the smaller tier.
    pub fn nearest_index(&self, value: f32) -> usize {
        let mut best = 0;
        for (idx, &tier) in self.tiers.iter().enumerate().skip(1) {
            if (tier - value).abs() < (self.tiers[best] - value).abs() {
                best = idx;
            }
        }
        best
    }
}

impl Default for TierList {
    fn default() -> Self {
        Self {
            tiers: vec![1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0],
        }
    }
}

/// Role of a node in the map, derived from its metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Leaf,
    Hub,
    Root,
}

/// Metadata a node offers for classification.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SizeHints {
    /// Explicit size override, used verbatim.
    pub explicit: Option<f32>,
    /// Magnitude metric such as a download or line count.
    pub magnitude: Option<u64>,
    /// Number of dependencies; stands in for the magnitude when it is absent.
    pub dependency_count: Option<u32>,
    /// Importance score in `[0, 1]`.
    pub importance: Option<f32>,
    /// Whether the node is a root of the visualised graph.
    pub is_root: bool,
}

/// Derives placement sizes and node kinds from [`SizeHints`].
#[derive(Debug, Clone)]
pub struct SizeClassifier {
    tiers: TierList,
    footprint_scale: f32,
    max_magnitude: u64,
    root_tier_bump: usize,
    hub_dependency_threshold: u32,
    hub_importance_threshold: f32,
}

impl Default for SizeClassifier {
    fn default() -> Self {
        Self {
            tiers: TierList::default(),
            footprint_scale: 2.0,
            max_magnitude: 10_000,
            root_tier_bump: 1,
            hub_dependency_threshold: 10,
            hub_importance_threshold: 0.75,
        }
    }
}

impl SizeClassifier {
    /// Creates a classifier over `tiers` with footprint radius `footprint_scale × size`.
    pub fn new(tiers: TierList, footprint_scale: f32) -> Self {
        Self {
            tiers,
            footprint_scale,
            ..Self::default()
        }
    }

    /// Sets the magnitude that maps onto the top tier.
    pub fn with_max_magnitude(mut self, max_magnitude: u64) -> Self {
        self.max_magnitude = max_magnitude.max(1);
        self
    }

    /// Sets how many tiers root nodes are bumped up by.
    pub fn with_root_tier_bump(mut self, bump: usize) -> Self {
        self.root_tier_bump = bump;
        self
    }

    /// Sets the dependency count and importance at which a node becomes a hub.
    pub fn with_hub_thresholds(mut self, dependency_count: u32, importance: f32) -> Self {
        self.hub_dependency_threshold = dependency_count;
        self.hub_importance_threshold = importance;
        self
    }

    /// Returns the tier list.
    pub fn tiers(&self) -> &TierList {
        &self.tiers
    }

    /// Returns k, the footprint radius per unit of size.
    pub fn footprint_scale(&self) -> f32 {
        self.footprint_scale
    }

    /// Footprint radius of a node of the given size.
    pub fn radius(&self, size: f32) -> f32 {
        self.footprint_scale * size
    }

    /// Computes a node's placement size.
    ///
    /// # Errors
    ///
    /// Returns [`SizingError::InvalidSize`] when an explicit size is zero,
    /// negative or not finite.
    ///
    /// # Examples
    ///
    /// ```
    /// # use atlas_core::sizing::{SizeClassifier, SizeHints};
    /// let classifier = SizeClassifier::default();
    ///
    /// let explicit = SizeHints { explicit: Some(2.7), ..SizeHints::default() };
    /// assert_eq!(classifier.classify(&explicit).unwrap(), 2.7);
    ///
    /// let huge = SizeHints { magnitude: Some(1_000_000), ..SizeHints::default() };
    /// assert_eq!(classifier.classify(&huge).unwrap(), 4.0);
    /// ```
    pub fn classify(&self, hints: &SizeHints) -> Result<f32, SizingError> {
        if let Some(size) = hints.explicit {
            if !size.is_finite() || size <= 0.0 {
                return Err(SizingError::InvalidSize(size));
            }
            return Ok(size);
        }

        let magnitude = hints
            .magnitude
            .or(hints.dependency_count.map(u64::from))
            .unwrap_or(0);

        let mut index = self.tiers.nearest_index(self.magnitude_to_size(magnitude));
        if hints.is_root {
            index += self.root_tier_bump;
        }
        let size = self.tiers.get(index);

        trace!(magnitude, is_root = hints.is_root, size; "Classified node size");
        Ok(size)
    }

    /// Determines the node kind from the root flag and hub thresholds.
    pub fn kind(&self, hints: &SizeHints) -> NodeKind {
        if hints.is_root {
            return NodeKind::Root;
        }
        let many_dependencies = hints
            .dependency_count
            .is_some_and(|count| count >= self.hub_dependency_threshold);
        let important = hints
            .importance
            .is_some_and(|importance| importance >= self.hub_importance_threshold);

        if many_dependencies || important {
            NodeKind::Hub
        } else {
            NodeKind::Leaf
        }
    }

    /// Logarithmic map of `magnitude` onto `[min_tier, max_tier]`.
    fn magnitude_to_size(&self, magnitude: u64) -> f32 {
        let capped = magnitude.min(self.max_magnitude) as f64;
        let fraction = (1.0 + capped).ln() / (1.0 + self.max_magnitude as f64).ln();
        let span = (self.tiers.max() - self.tiers.min()) as f64;
        (self.tiers.min() as f64 + span * fraction) as f32
    }
}
