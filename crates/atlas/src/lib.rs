//! Atlas - Node placement for isometric maps.
//!
//! Sizes nodes into tiers, packs them into fixed-size regions without
//! footprint overlap, spreads them over many regions, and validates live
//! drags of single nodes against everything else on the map.

pub mod config;
pub mod error;
pub mod export;
pub mod interaction;
pub mod layout;
pub mod model;

pub use atlas_core::{footprint, geometry, identifier, projection, sizing, spatial};

pub use error::AtlasError;

use log::{debug, info, trace};

use config::AppConfig;
use export::LayoutReport;
use interaction::Scene;
use layout::RegionAllocator;
use model::{Layout, MapDocument};

/// Builder for laying out Atlas maps.
///
/// This provides an API for processing map documents through parsing,
/// layout, reporting and interaction stages.
///
/// # Examples
///
/// ```rust
/// use atlas::{LayoutBuilder, config::AppConfig};
///
/// let source = r#"
///     [[nodes]]
///     id = "serde"
///     magnitude = 5000
///
///     [[nodes]]
///     id = "log"
/// "#;
///
/// let builder = LayoutBuilder::new(AppConfig::default());
///
/// // Parse source to a map document
/// let document = builder.parse(source).expect("Failed to parse");
///
/// // Place every node
/// let layout = builder.layout(&document).expect("Failed to lay out");
/// assert_eq!(layout.placed_count(), 2);
///
/// // Project for a renderer
/// let report = builder.report(&layout).expect("Failed to project");
/// assert_eq!(report.regions().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct LayoutBuilder {
    config: AppConfig,
}

impl LayoutBuilder {
    /// Create a new layout builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including layout and sizing settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse a TOML map document.
    ///
    /// # Arguments
    ///
    /// * `source` - Map document as TOML text
    ///
    /// # Errors
    ///
    /// Returns [`AtlasError::Parse`] with the offending span for malformed
    /// documents.
    pub fn parse(&self, source: &str) -> Result<MapDocument, AtlasError> {
        info!("Parsing map document");

        let document: MapDocument =
            toml::from_str(source).map_err(|err| AtlasError::new_parse_error(err, source))?;

        debug!(
            nodes = document.nodes().len(),
            regions = document.regions().len();
            "Map document parsed successfully"
        );
        trace!(document:?; "Parsed map document");

        Ok(document)
    }

    /// Place every node of `document`.
    ///
    /// Documents with regions are laid out in manual mode, documents without
    /// in automatic mode.
    ///
    /// # Errors
    ///
    /// Returns [`AtlasError::Config`] for invalid configuration,
    /// [`AtlasError::InvalidInput`] for invalid nodes or regions, and
    /// [`AtlasError::RegionCapExceeded`] when the region cap policy says so.
    pub fn layout(&self, document: &MapDocument) -> Result<Layout, AtlasError> {
        self.config.validate()?;
        let classifier = self.config.sizing().classifier()?;
        let allocator = RegionAllocator::new(self.config.layout(), &classifier)
            .with_reference_time(document.now());

        let layout = if document.is_manual() {
            info!(regions = document.regions().len(); "Allocating nodes to supplied regions");
            allocator.allocate_manual(document.nodes(), document.regions())?
        } else {
            info!("Allocating nodes to generated regions");
            allocator.allocate_automatic(document.nodes())?
        };

        info!(
            regions = layout.regions().len(),
            placed = layout.placed_count(),
            overflow = layout.overflow().len();
            "Layout calculated"
        );
        Ok(layout)
    }

    /// Project a layout into screen space.
    ///
    /// # Errors
    ///
    /// Returns [`AtlasError::Config`] for invalid projection settings.
    pub fn report(&self, layout: &Layout) -> Result<LayoutReport, AtlasError> {
        let projection = self.config.projection().projection()?;
        let report = LayoutReport::from_layout(layout, &projection)?;
        debug!("Layout report built");
        Ok(report)
    }

    /// Build an interaction scene for dragging nodes of `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`AtlasError::Config`] for invalid projection settings.
    pub fn scene(&self, layout: &Layout) -> Result<Scene, AtlasError> {
        Scene::from_layout(layout, &self.config)
    }
}
