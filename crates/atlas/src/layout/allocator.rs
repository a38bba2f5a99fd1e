//! Multi-region allocation.
//!
//! [`RegionAllocator`] runs the [`RegionPacker`] over a set of regions and
//! assembles the final [`Layout`] in absolute grid coordinates. Region
//! `order` maps to `(row, col) = (order / N, order % N)` for the configured
//! column count N, and region origins are laid out on that grid with
//! `region_gap` units between neighbours, never less than `spacing`.
//!
//! # Automatic mode
//!
//! Nodes are grouped by [`Category`] (when enabled) and each group fills a
//! chain of freshly created regions: whatever overflows one region seeds the
//! next. Creation stops at `max_regions`; what happens to the nodes still
//! waiting is decided by [`RegionCapPolicy`].
//!
//! # Manual mode
//!
//! The caller supplies the regions. Nodes are handled in three passes:
//!
//! 1. Nodes with an assigned region and a saved position are put back at
//!    that position if it still fits and does not collide; otherwise they
//!    are re-packed with the next pass.
//! 2. Remaining nodes with an assigned region are packed around the nodes
//!    already in that region.
//! 3. Unassigned nodes are mapped to regions proportionally by category,
//!    packed, and spilled over the other regions when their target is full.

use std::collections::{BTreeMap, HashSet};

use indexmap::IndexMap;
use log::{debug, warn};

use atlas_core::{
    footprint::{Footprint, TOLERANCE},
    geometry::{Bounds, Point, Size},
    identifier::Id,
    sizing::SizeClassifier,
};

use crate::{
    config::{LayoutConfig, RegionCapPolicy},
    error::AtlasError,
    layout::{
        category::{self, Category, FreshnessBuckets},
        packer::{PackItem, PackResult, RegionPacker},
    },
    model::{
        GridPosition, Layout, NodeSpec, OverflowNode, OverflowReason, PlacedNode, RegionLayout,
        RegionSpec,
    },
};

/// A validated node ready for packing.
#[derive(Debug)]
struct Candidate<'n> {
    spec: &'n NodeSpec,
    item: PackItem,
    category: Category,
}

/// A caller-supplied region being filled, positions local to its origin.
#[derive(Debug)]
struct Slot<'r> {
    spec: &'r RegionSpec,
    grid: GridPosition,
    placed: Vec<PlacedNode>,
}

/// Distributes nodes over regions.
///
/// The allocator holds no state between calls; every `allocate_*` call is a
/// pure function of its arguments and the configuration.
#[derive(Debug)]
pub struct RegionAllocator<'a> {
    config: &'a LayoutConfig,
    classifier: &'a SizeClassifier,
    packer: RegionPacker,
    buckets: FreshnessBuckets,
    now: Option<i64>,
}

impl<'a> RegionAllocator<'a> {
    /// Creates an allocator. The configuration is expected to be validated.
    pub fn new(config: &'a LayoutConfig, classifier: &'a SizeClassifier) -> Self {
        Self {
            config,
            classifier,
            packer: RegionPacker::from_config(config),
            buckets: FreshnessBuckets::new(config.freshness_buckets().to_vec()),
            now: None,
        }
    }

    /// Sets the reference time used to bucket freshness timestamps.
    ///
    /// Without one, nodes that only carry a timestamp are uncategorised.
    pub fn with_reference_time(mut self, now: Option<i64>) -> Self {
        self.now = now;
        self
    }

    /// Lays out `nodes` over regions created on demand.
    ///
    /// # Errors
    ///
    /// Returns [`AtlasError::InvalidInput`] for duplicate ids or invalid node
    /// metadata, and [`AtlasError::RegionCapExceeded`] when the region cap is
    /// reached under [`RegionCapPolicy::Fail`].
    pub fn allocate_automatic(&self, nodes: &[NodeSpec]) -> Result<Layout, AtlasError> {
        let candidates = self.prepare(nodes)?;
        let (fitting, mut overflow) = self.split_oversized(candidates);
        let area = Size::square(self.config.region_size());
        let mut regions: Vec<RegionLayout> = Vec::new();

        let mut groups = self.group(fitting).into_iter();
        'groups: while let Some((category, mut pending)) = groups.next() {
            let mut chain = 0;
            while !pending.is_empty() {
                if regions.len() >= self.config.max_regions() {
                    let remaining: Vec<PackItem> = pending
                        .drain(..)
                        .chain(groups.by_ref().flat_map(|(_, items)| items))
                        .collect();
                    self.handle_region_cap(remaining, &mut overflow)?;
                    break 'groups;
                }

                let order = regions.len();
                let PackResult { placed, overflow: rest } = self.packer.pack(pending, area);
                if placed.is_empty() {
                    warn!(
                        category:% = category,
                        nodes = rest.len();
                        "Nodes do not fit into an empty region"
                    );
                    overflow.extend(
                        rest.iter()
                            .map(|item| overflow_node(item, OverflowReason::Unplaceable)),
                    );
                    break;
                }

                let grid = GridPosition::from_order(order, self.config.columns());
                let name = self.region_name(&category, chain, order);
                debug!(
                    order,
                    name:% = name,
                    placed = placed.len(),
                    carried = rest.len();
                    "Created region"
                );
                regions.push(self.region_layout(
                    Id::indexed("region", order),
                    name,
                    grid,
                    placed,
                ));
                pending = rest;
                chain += 1;
            }
        }

        debug!(regions = regions.len(), overflow = overflow.len(); "Automatic allocation finished");
        Ok(Layout::new(regions, overflow))
    }

    /// Lays out `nodes` over the caller-supplied `regions`.
    ///
    /// # Errors
    ///
    /// Returns [`AtlasError::InvalidInput`] for duplicate node ids, duplicate
    /// region ids or orders, and invalid node metadata.
    pub fn allocate_manual(
        &self,
        nodes: &[NodeSpec],
        regions: &[RegionSpec],
    ) -> Result<Layout, AtlasError> {
        let mut slots = self.manual_slots(regions)?;
        let candidates = self.prepare(nodes)?;
        let (fitting, mut overflow) = self.split_oversized(candidates);
        let area = Size::square(self.config.region_size());
        let local_bounds = Bounds::new_from_top_left(Point::default(), area);

        let mut assigned: IndexMap<Id, Vec<PackItem>> = IndexMap::new();
        let mut unassigned: Vec<Candidate> = Vec::new();

        for candidate in fitting {
            let Some(region_id) = candidate.spec.assigned_region() else {
                unassigned.push(candidate);
                continue;
            };
            let Some(slot) = slots.get_mut(&region_id) else {
                warn!(
                    node_id:% = candidate.item.id(),
                    region_id:% = region_id;
                    "Node assigned to unknown region, treating it as unassigned"
                );
                unassigned.push(candidate);
                continue;
            };
            let restored = candidate
                .spec
                .saved_position()
                .is_some_and(|saved| self.restore_saved(slot, &candidate.item, saved, &local_bounds));
            if restored {
                continue;
            }
            assigned.entry(region_id).or_default().push(candidate.item);
        }

        for (region_id, items) in assigned {
            let Some(slot) = slots.get_mut(&region_id) else {
                continue;
            };
            for item in self.pack_into(slot, items, area) {
                warn!(
                    node_id:% = item.id(),
                    region_id:% = region_id;
                    "Assigned region is full"
                );
                overflow.push(overflow_node(&item, OverflowReason::RegionFull));
            }
        }

        self.distribute(unassigned, &mut slots, area, &mut overflow);

        let regions = slots
            .into_values()
            .map(|slot| {
                self.region_layout(slot.spec.id(), slot.spec.name(), slot.grid, slot.placed)
            })
            .collect::<Vec<_>>();
        debug!(regions = regions.len(), overflow = overflow.len(); "Manual allocation finished");
        Ok(Layout::new(regions, overflow))
    }

    /// Validates nodes and turns them into packer items.
    fn prepare<'n>(&self, nodes: &'n [NodeSpec]) -> Result<Vec<Candidate<'n>>, AtlasError> {
        let mut seen = HashSet::with_capacity(nodes.len());
        nodes
            .iter()
            .map(|spec| {
                let id = spec.id();
                if !seen.insert(id) {
                    return Err(AtlasError::InvalidInput(format!("duplicate node id `{id}`")));
                }

                let hints = spec.size_hints();
                if let Some(importance) = hints.importance.filter(|value| !value.is_finite()) {
                    return Err(AtlasError::InvalidInput(format!(
                        "node `{id}`: invalid importance {importance}"
                    )));
                }
                if let Some(saved) = spec.saved_position() {
                    saved.finite().map_err(|err| {
                        AtlasError::InvalidInput(format!("node `{id}`: saved position: {err}"))
                    })?;
                }

                let size = self
                    .classifier
                    .classify(&hints)
                    .map_err(|err| AtlasError::InvalidInput(format!("node `{id}`: {err}")))?;
                let category = category::categorize(spec, &self.buckets, self.now);
                let priority =
                    category::priority(self.classifier.kind(&hints), &category, &self.buckets);
                let item = PackItem::new(id, size, self.classifier.radius(size))
                    .with_priority(priority);

                Ok(Candidate {
                    spec,
                    item,
                    category,
                })
            })
            .collect()
    }

    /// Separates nodes whose footprint cannot fit any region.
    fn split_oversized<'n>(
        &self,
        candidates: Vec<Candidate<'n>>,
    ) -> (Vec<Candidate<'n>>, Vec<OverflowNode>) {
        let limit = self.config.region_size() + TOLERANCE;
        let (fitting, oversized): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|candidate| candidate.item.radius() * 2.0 <= limit);

        let overflow = oversized
            .iter()
            .map(|candidate| {
                warn!(
                    node_id:% = candidate.item.id(),
                    size = candidate.item.size();
                    "Node footprint is larger than a region"
                );
                overflow_node(&candidate.item, OverflowReason::Oversized)
            })
            .collect();
        (fitting, overflow)
    }

    /// Groups candidates by category in processing order.
    fn group(&self, candidates: Vec<Candidate>) -> Vec<(Category, Vec<PackItem>)> {
        if !self.config.group_by_category() {
            let items = candidates.into_iter().map(|c| c.item).collect();
            return vec![(Category::Uncategorized, items)];
        }

        let mut groups: BTreeMap<Category, Vec<PackItem>> = BTreeMap::new();
        for candidate in candidates {
            groups
                .entry(candidate.category)
                .or_default()
                .push(candidate.item);
        }
        groups.into_iter().collect()
    }

    fn handle_region_cap(
        &self,
        remaining: Vec<PackItem>,
        overflow: &mut Vec<OverflowNode>,
    ) -> Result<(), AtlasError> {
        let cap = self.config.max_regions();
        match self.config.region_cap_policy() {
            RegionCapPolicy::Fail => Err(AtlasError::RegionCapExceeded {
                cap,
                remaining: remaining.len(),
            }),
            RegionCapPolicy::Truncate => {
                warn!(
                    cap,
                    dropped = remaining.len();
                    "Region cap reached, remaining nodes moved to overflow"
                );
                overflow.extend(
                    remaining
                        .iter()
                        .map(|item| overflow_node(item, OverflowReason::RegionCapReached)),
                );
                Ok(())
            }
        }
    }

    fn region_name(&self, category: &Category, chain: usize, order: usize) -> String {
        if !self.config.group_by_category() {
            return format!("Region {}", order + 1);
        }
        let label = category::category_label(category, &self.buckets);
        if chain == 0 {
            label
        } else {
            format!("{label} ({})", chain + 1)
        }
    }

    /// Checks caller-supplied regions and orders them by `order`.
    fn manual_slots<'r>(
        &self,
        regions: &'r [RegionSpec],
    ) -> Result<IndexMap<Id, Slot<'r>>, AtlasError> {
        let mut sorted: Vec<&RegionSpec> = regions.iter().collect();
        sorted.sort_by_key(|region| region.order());

        let mut orders = HashSet::with_capacity(sorted.len());
        let mut slots = IndexMap::with_capacity(sorted.len());
        for spec in sorted {
            if !orders.insert(spec.order()) {
                return Err(AtlasError::InvalidInput(format!(
                    "region `{}` reuses order {}",
                    spec.id(),
                    spec.order()
                )));
            }
            let slot = Slot {
                spec,
                grid: GridPosition::from_order(spec.order(), self.config.columns()),
                placed: Vec::new(),
            };
            if slots.insert(spec.id(), slot).is_some() {
                return Err(AtlasError::InvalidInput(format!(
                    "duplicate region id `{}`",
                    spec.id()
                )));
            }
        }
        Ok(slots)
    }

    /// Puts a node back at its saved absolute position if that is still valid.
    fn restore_saved(
        &self,
        slot: &mut Slot,
        item: &PackItem,
        saved: Point,
        local_bounds: &Bounds,
    ) -> bool {
        let local = saved.sub_point(self.region_origin(slot.grid));
        let footprint = Footprint::new(local, item.radius());
        let valid = footprint.fits_within(local_bounds)
            && !slot.placed.iter().any(|other| {
                footprint.collides(
                    &other.footprint(),
                    self.packer.spacing(),
                    self.packer.shape(),
                )
            });

        if valid {
            debug!(node_id:% = item.id(), position:? = saved; "Restored saved position");
            slot.placed
                .push(PlacedNode::new(item.id(), local, item.size(), item.radius()));
        } else {
            warn!(
                node_id:% = item.id(),
                position:? = saved;
                "Saved position is out of bounds or overlaps, repacking node"
            );
        }
        valid
    }

    /// Spreads unassigned nodes over the slots by category.
    fn distribute(
        &self,
        unassigned: Vec<Candidate>,
        slots: &mut IndexMap<Id, Slot>,
        area: Size,
        overflow: &mut Vec<OverflowNode>,
    ) {
        if unassigned.is_empty() {
            return;
        }

        let region_count = slots.len();
        let mut categories: Vec<&Category> = unassigned.iter().map(|c| &c.category).collect();
        categories.sort();
        categories.dedup();

        let mut targeted: BTreeMap<usize, Vec<PackItem>> = BTreeMap::new();
        for candidate in &unassigned {
            let rank = categories
                .binary_search(&&candidate.category)
                .unwrap_or_else(|index| index);
            let target = category::proportional_slot(rank, categories.len(), region_count);
            targeted.entry(target).or_default().push(candidate.item);
        }

        let mut leftovers: Vec<(usize, Vec<PackItem>)> = Vec::new();
        for (target, items) in targeted {
            let rest = match slots.get_index_mut(target) {
                Some((_, slot)) => self.pack_into(slot, items, area),
                None => items,
            };
            if !rest.is_empty() {
                leftovers.push((target, rest));
            }
        }

        for (home, mut rest) in leftovers {
            for offset in 1..region_count {
                if rest.is_empty() {
                    break;
                }
                if let Some((_, slot)) = slots.get_index_mut((home + offset) % region_count) {
                    rest = self.pack_into(slot, rest, area);
                }
            }
            for item in rest {
                warn!(node_id:% = item.id(); "No region has room for unassigned node");
                overflow.push(overflow_node(&item, OverflowReason::NoRegionFits));
            }
        }
    }

    /// Packs `items` into `slot`, returning what did not fit.
    fn pack_into(&self, slot: &mut Slot, items: Vec<PackItem>, area: Size) -> Vec<PackItem> {
        let result = self.packer.pack_around(items, area, &slot.placed);
        slot.placed.extend(result.placed);
        result.overflow
    }

    /// Top-left corner of the region at `grid` in world space.
    fn region_origin(&self, grid: GridPosition) -> Point {
        let pitch = self.config.region_pitch();
        Point::new(grid.col() as f32 * pitch, grid.row() as f32 * pitch)
    }

    fn region_layout(
        &self,
        id: Id,
        name: impl Into<String>,
        grid: GridPosition,
        local_nodes: Vec<PlacedNode>,
    ) -> RegionLayout {
        let origin = self.region_origin(grid);
        let bounds = Bounds::new_from_top_left(origin, Size::square(self.config.region_size()));
        let nodes = local_nodes
            .into_iter()
            .map(|node| node.translate(origin))
            .collect();
        RegionLayout::new(id, name, grid, bounds, nodes)
    }
}

fn overflow_node(item: &PackItem, reason: OverflowReason) -> OverflowNode {
    OverflowNode::new(item.id(), item.size(), reason)
}
