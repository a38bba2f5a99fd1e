//! Atlas Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Atlas layout
//! engine and its consumers. It includes:
//!
//! - **Identifiers**: String-interned node and region identifiers ([`identifier::Id`])
//! - **Geometry**: Points, sizes and bounds ([`geometry`] module)
//! - **Projection**: The isometric grid/screen mapping ([`projection::IsoProjection`])
//! - **Sizing**: Tiered size classification ([`sizing::SizeClassifier`])
//! - **Footprints**: Node exclusion zones and their overlap tests ([`footprint`] module)
//! - **Spatial index**: R-tree lookups over placed footprints ([`spatial::SpatialIndex`])

pub mod footprint;
pub mod geometry;
pub mod identifier;
pub mod projection;
pub mod sizing;
pub mod spatial;
