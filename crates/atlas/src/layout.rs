//! Region layout.
//!
//! - [`packer`] fills a single region.
//! - [`allocator`] spreads nodes over many regions, in automatic or manual mode.
//! - [`category`] groups nodes and ranks them for packing.

pub mod allocator;
pub mod category;
pub mod packer;

pub use allocator::RegionAllocator;
pub use packer::{PackItem, PackResult, RegionPacker};
