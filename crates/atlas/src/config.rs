//! Configuration types for Atlas map layouts.
//!
//! This module provides the configuration structures that control how nodes
//! are sized, packed into regions, projected to screen space and dragged.
//! All types implement [`serde::Deserialize`]; every field is optional and
//! falls back to the documented default.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining every section.
//! - [`LayoutConfig`] - Region geometry, spacing and allocation policy.
//! - [`SizingConfig`] - Tier list and classification thresholds.
//! - [`InteractionConfig`] - Drag-time proximity settings.
//! - [`ProjectionConfig`] - Isometric tile dimensions.
//!
//! # Example
//!
//! ```
//! # use atlas::config::AppConfig;
//! let config: AppConfig = toml::from_str(
//!     r#"
//!     [layout]
//!     region_size = 40.0
//!     spacing = 1.0
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.layout().region_size(), 40.0);
//! assert_eq!(config.layout().columns(), 4);
//! assert!(config.validate().is_ok());
//! ```

use serde::Deserialize;

use atlas_core::{
    footprint::FootprintShape,
    projection::IsoProjection,
    sizing::{SizeClassifier, TierList},
};

use crate::error::AtlasError;

/// Top-level configuration root.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Region and packing settings.
    #[serde(default)]
    layout: LayoutConfig,

    /// Size classification settings.
    #[serde(default)]
    sizing: SizingConfig,

    /// Drag interaction settings.
    #[serde(default)]
    interaction: InteractionConfig,

    /// Screen projection settings.
    #[serde(default)]
    projection: ProjectionConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(
        layout: LayoutConfig,
        sizing: SizingConfig,
        interaction: InteractionConfig,
        projection: ProjectionConfig,
    ) -> Self {
        Self {
            layout,
            sizing,
            interaction,
            projection,
        }
    }

    /// Replaces the layout section.
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    /// Replaces the sizing section.
    pub fn with_sizing(mut self, sizing: SizingConfig) -> Self {
        self.sizing = sizing;
        self
    }

    /// Replaces the interaction section.
    pub fn with_interaction(mut self, interaction: InteractionConfig) -> Self {
        self.interaction = interaction;
        self
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the sizing configuration.
    pub fn sizing(&self) -> &SizingConfig {
        &self.sizing
    }

    /// Returns the interaction configuration.
    pub fn interaction(&self) -> &InteractionConfig {
        &self.interaction
    }

    /// Returns the projection configuration.
    pub fn projection(&self) -> &ProjectionConfig {
        &self.projection
    }

    /// Checks every section.
    ///
    /// # Errors
    ///
    /// Returns [`AtlasError::Config`] naming the first invalid option.
    pub fn validate(&self) -> Result<(), AtlasError> {
        self.layout.validate()?;
        self.sizing.classifier()?;
        self.interaction.validate()?;
        self.projection.projection()?;
        Ok(())
    }
}

/// What the automatic allocator does once `max_regions` regions exist and
/// nodes are still waiting for a place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionCapPolicy {
    /// Log a warning and report the remaining nodes as overflow.
    #[default]
    Truncate,
    /// Abort the layout with [`AtlasError::RegionCapExceeded`].
    Fail,
}

/// Region geometry, spacing and allocation policy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width and height of every region, in grid units.
    region_size: f32,
    /// Empty grid units between neighbouring regions in world space.
    /// Never narrower than `spacing`; see [`LayoutConfig::region_pitch`].
    region_gap: f32,
    /// Fixed column count N; region `order` maps to `(order / N, order % N)`.
    columns: usize,
    /// Maximum number of regions the automatic allocator may create.
    max_regions: usize,
    /// Minimum gap between two footprints, in grid units.
    spacing: f32,
    /// Distance between neighbouring candidate centers scanned by the packer.
    search_step: f32,
    /// Collision metric of footprints.
    footprint_shape: FootprintShape,
    /// Automatic mode: give each category its own chain of regions.
    group_by_category: bool,
    /// Automatic mode: behaviour at the region cap.
    region_cap_policy: RegionCapPolicy,
    /// Upper bounds, in days, of the freshness buckets (ascending).
    freshness_buckets: Vec<u32>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            region_size: 25.0,
            region_gap: 1.0,
            columns: 4,
            max_regions: 64,
            spacing: 0.5,
            search_step: 1.0,
            footprint_shape: FootprintShape::Circle,
            group_by_category: true,
            region_cap_policy: RegionCapPolicy::Truncate,
            freshness_buckets: vec![1, 7, 30, 90, 365],
        }
    }
}

impl LayoutConfig {
    pub fn with_region_size(mut self, region_size: f32) -> Self {
        self.region_size = region_size;
        self
    }

    pub fn with_region_gap(mut self, region_gap: f32) -> Self {
        self.region_gap = region_gap;
        self
    }

    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_max_regions(mut self, max_regions: usize) -> Self {
        self.max_regions = max_regions;
        self
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_search_step(mut self, search_step: f32) -> Self {
        self.search_step = search_step;
        self
    }

    pub fn with_footprint_shape(mut self, shape: FootprintShape) -> Self {
        self.footprint_shape = shape;
        self
    }

    pub fn with_group_by_category(mut self, group: bool) -> Self {
        self.group_by_category = group;
        self
    }

    pub fn with_region_cap_policy(mut self, policy: RegionCapPolicy) -> Self {
        self.region_cap_policy = policy;
        self
    }

    pub fn with_freshness_buckets(mut self, buckets: Vec<u32>) -> Self {
        self.freshness_buckets = buckets;
        self
    }

    pub fn region_size(&self) -> f32 {
        self.region_size
    }

    pub fn region_gap(&self) -> f32 {
        self.region_gap
    }

    /// Distance between the origins of neighbouring regions.
    ///
    /// The gap is widened to `spacing` when configured smaller, so footprints
    /// at the edges of adjacent regions keep the same margin as footprints
    /// inside one region.
    pub fn region_pitch(&self) -> f32 {
        self.region_size + self.region_gap.max(self.spacing)
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn max_regions(&self) -> usize {
        self.max_regions
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn search_step(&self) -> f32 {
        self.search_step
    }

    pub fn footprint_shape(&self) -> FootprintShape {
        self.footprint_shape
    }

    pub fn group_by_category(&self) -> bool {
        self.group_by_category
    }

    pub fn region_cap_policy(&self) -> RegionCapPolicy {
        self.region_cap_policy
    }

    pub fn freshness_buckets(&self) -> &[u32] {
        &self.freshness_buckets
    }

    fn validate(&self) -> Result<(), AtlasError> {
        if !(self.region_size.is_finite() && self.region_size > 0.0) {
            return Err(invalid("layout.region_size", self.region_size));
        }
        if !(self.region_gap.is_finite() && self.region_gap >= 0.0) {
            return Err(invalid("layout.region_gap", self.region_gap));
        }
        if self.columns == 0 {
            return Err(invalid("layout.columns", self.columns));
        }
        if self.max_regions == 0 {
            return Err(invalid("layout.max_regions", self.max_regions));
        }
        if !(self.spacing.is_finite() && self.spacing >= 0.0) {
            return Err(invalid("layout.spacing", self.spacing));
        }
        if !(self.search_step.is_finite() && self.search_step > 0.0) {
            return Err(invalid("layout.search_step", self.search_step));
        }
        if self.freshness_buckets.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(AtlasError::Config(
                "layout.freshness_buckets must be strictly ascending".to_string(),
            ));
        }
        Ok(())
    }
}

/// Tier list and classification thresholds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    /// k in `radius = k × size`.
    footprint_scale: f32,
    /// Allowed sizes, ascending; `footprint_scale × tier` must be integral.
    tiers: Vec<f32>,
    /// Magnitude that maps onto the largest tier.
    max_magnitude: u64,
    /// Tiers added to the size of root nodes.
    root_tier_bump: usize,
    /// Dependency count from which a node counts as a hub.
    hub_dependency_threshold: u32,
    /// Importance from which a node counts as a hub.
    hub_importance_threshold: f32,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            footprint_scale: 2.0,
            tiers: vec![1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0],
            max_magnitude: 10_000,
            root_tier_bump: 1,
            hub_dependency_threshold: 10,
            hub_importance_threshold: 0.75,
        }
    }
}

impl SizingConfig {
    pub fn with_footprint_scale(mut self, scale: f32) -> Self {
        self.footprint_scale = scale;
        self
    }

    pub fn with_tiers(mut self, tiers: Vec<f32>) -> Self {
        self.tiers = tiers;
        self
    }

    pub fn footprint_scale(&self) -> f32 {
        self.footprint_scale
    }

    /// Builds the [`SizeClassifier`] described by this section.
    ///
    /// # Errors
    ///
    /// Returns [`AtlasError::Config`] for an invalid tier list or scale.
    pub fn classifier(&self) -> Result<SizeClassifier, AtlasError> {
        let tiers = TierList::new(self.tiers.clone(), self.footprint_scale)
            .map_err(|err| AtlasError::Config(format!("sizing: {err}")))?;
        if !self.hub_importance_threshold.is_finite() {
            return Err(invalid(
                "sizing.hub_importance_threshold",
                self.hub_importance_threshold,
            ));
        }
        Ok(SizeClassifier::new(tiers, self.footprint_scale)
            .with_max_magnitude(self.max_magnitude)
            .with_root_tier_bump(self.root_tier_bump)
            .with_hub_thresholds(self.hub_dependency_threshold, self.hub_importance_threshold))
    }
}

/// Drag-time settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Extra distance beyond touching within which nodes count as "nearby".
    proximity_threshold: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            proximity_threshold: 2.0,
        }
    }
}

impl InteractionConfig {
    pub fn with_proximity_threshold(mut self, threshold: f32) -> Self {
        self.proximity_threshold = threshold;
        self
    }

    pub fn proximity_threshold(&self) -> f32 {
        self.proximity_threshold
    }

    fn validate(&self) -> Result<(), AtlasError> {
        if !(self.proximity_threshold.is_finite() && self.proximity_threshold >= 0.0) {
            return Err(invalid(
                "interaction.proximity_threshold",
                self.proximity_threshold,
            ));
        }
        Ok(())
    }
}

/// Isometric tile dimensions in screen units.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    tile_width: f32,
    tile_height: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            tile_width: 64.0,
            tile_height: 32.0,
        }
    }
}

impl ProjectionConfig {
    /// Builds the [`IsoProjection`] described by this section.
    ///
    /// # Errors
    ///
    /// Returns [`AtlasError::Config`] for non-positive tile dimensions.
    pub fn projection(&self) -> Result<IsoProjection, AtlasError> {
        IsoProjection::new(self.tile_width, self.tile_height)
            .map_err(|err| AtlasError::Config(format!("projection: {err}")))
    }
}

fn invalid(option: &str, value: impl std::fmt::Display) -> AtlasError {
    AtlasError::Config(format!("invalid value {value} for {option}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_region_pitch_keeps_spacing_between_regions() {
        let config = LayoutConfig::default().with_spacing(0.5);

        assert_eq!(config.clone().with_region_gap(2.0).region_pitch(), 27.0);
        assert_eq!(config.with_region_gap(0.0).region_pitch(), 25.5);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [layout]
            max_regions = 3
            footprint_shape = "square"
            region_cap_policy = "fail"

            [interaction]
            proximity_threshold = 4.0
            "#,
        )
        .unwrap();

        assert_eq!(config.layout().max_regions(), 3);
        assert_eq!(config.layout().footprint_shape(), FootprintShape::Square);
        assert_eq!(config.layout().region_cap_policy(), RegionCapPolicy::Fail);
        assert_eq!(config.layout().region_size(), 25.0);
        assert_eq!(config.interaction().proximity_threshold(), 4.0);
        assert_eq!(config.sizing(), &SizingConfig::default());
    }

    #[test]
    fn test_rejects_invalid_layout_values() {
        let cases = [
            LayoutConfig::default().with_region_size(0.0),
            LayoutConfig::default().with_region_size(f32::NAN),
            LayoutConfig::default().with_region_gap(-1.0),
            LayoutConfig::default().with_columns(0),
            LayoutConfig::default().with_max_regions(0),
            LayoutConfig::default().with_spacing(-0.5),
            LayoutConfig::default().with_search_step(0.0),
            LayoutConfig::default().with_freshness_buckets(vec![7, 7]),
        ];

        for layout in cases {
            let config = AppConfig::default().with_layout(layout.clone());
            assert!(
                matches!(config.validate(), Err(AtlasError::Config(_))),
                "expected rejection of {layout:?}"
            );
        }
    }

    #[test]
    fn test_rejects_fractional_tiers() {
        let config = AppConfig::default()
            .with_sizing(SizingConfig::default().with_tiers(vec![1.0, 1.25]));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sizing"));
    }

    #[test]
    fn test_rejects_negative_proximity() {
        let config = AppConfig::default()
            .with_interaction(InteractionConfig::default().with_proximity_threshold(-1.0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_tile() {
        let config: AppConfig = toml::from_str("[projection]\ntile_width = 0.0").unwrap();
        assert!(config.validate().is_err());
    }
}
