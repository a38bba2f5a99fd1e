//! End-to-end placement and drag scenarios.

use float_cmp::assert_approx_eq;

use atlas::{
    config::LayoutConfig,
    footprint::{Footprint, FootprintShape},
    geometry::{Bounds, Point, Size},
    identifier::Id,
    interaction::{DragEvent, Scene},
    layout::{PackItem, RegionAllocator, RegionPacker},
    model::{Layout, NodeSpec},
    projection::IsoProjection,
    sizing::SizeClassifier,
};

fn packer() -> RegionPacker {
    RegionPacker::new(0.5, 1.0, FootprintShape::Circle)
}

fn item(id: &str, size: f32) -> PackItem {
    PackItem::new(Id::new(id), size, size * 2.0)
}

fn automatic(nodes: &[NodeSpec], config: &LayoutConfig) -> Layout {
    let classifier = SizeClassifier::default();
    RegionAllocator::new(config, &classifier)
        .allocate_automatic(nodes)
        .expect("automatic allocation")
}

#[test]
fn single_small_node_sits_one_radius_in() {
    let result = packer().pack(vec![item("solo", 1.0)], Size::square(10.0));

    assert_eq!(result.placed.len(), 1);
    let position = result.placed[0].position();
    assert!(position.x() >= 2.0);
    assert!(position.y() >= 2.0);
}

#[test]
fn two_nodes_keep_radius_sum_plus_spacing() {
    let result = packer().pack(vec![item("a", 1.5), item("b", 1.5)], Size::square(25.0));

    assert_eq!(result.placed.len(), 2);
    let distance = result.placed[0]
        .position()
        .distance(result.placed[1].position());
    assert!(distance >= 6.5, "centers only {distance} apart");
}

#[test]
fn node_wider_than_region_overflows() {
    let result = packer().pack(vec![item("huge", 3.0)], Size::square(10.0));

    assert!(result.placed.is_empty());
    assert_eq!(result.overflow.len(), 1);
}

#[test]
fn many_nodes_spill_into_new_regions_without_overlap() {
    let config = LayoutConfig::default();
    let nodes: Vec<NodeSpec> = (0..25)
        .map(|i| NodeSpec::new(Id::indexed("node", i)).with_size(2.0))
        .collect();

    let layout = automatic(&nodes, &config);

    assert!(layout.regions().len() > 1);
    assert_eq!(layout.placed_count(), 25);
    assert!(layout.overflow().is_empty());

    let placed: Vec<_> = layout.nodes().collect();
    for (i, a) in placed.iter().enumerate() {
        for b in &placed[i + 1..] {
            let distance = a.position().distance(b.position());
            assert!(
                distance >= a.radius() + b.radius() + config.spacing(),
                "{} and {} overlap",
                a.id(),
                b.id()
            );
        }
    }

    let mut slots: Vec<_> = layout
        .regions()
        .iter()
        .map(|region| region.grid_position())
        .collect();
    slots.sort();
    slots.dedup();
    assert_eq!(slots.len(), layout.regions().len());
}

#[test]
fn drag_freezes_on_contact_then_snaps_to_free_cell() {
    let projection = IsoProjection::new(64.0, 32.0).unwrap();
    let bounds = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::square(30.0));
    let mut scene = Scene::new(projection, bounds);
    let dragged = Id::new("dragged");
    let target = Id::new("target");
    scene.insert_node(dragged, Footprint::new(Point::new(5.0, 5.0), 2.0));
    scene.insert_node(target, Footprint::new(Point::new(15.0, 5.0), 2.0));

    let grid_to_pointer = |dx: f32| projection.to_screen(Point::new(dx, 0.0)).unwrap();

    let mut session = scene.begin_drag(dragged, Point::default()).unwrap();
    let accepted = session.drag_move(grid_to_pointer(4.0));
    assert_eq!(accepted, Point::new(9.0, 5.0));

    // Straight into the target: rejected, position frozen.
    let frozen = session.drag_move(grid_to_pointer(9.0));
    assert_eq!(frozen, accepted);

    // Touching distance, half a cell short of the next integer.
    let near = session.drag_move(grid_to_pointer(5.5));
    assert_approx_eq!(f32, near.x(), 10.5, epsilon = 1e-4);
    let released = session.end();

    assert_eq!(released, Point::new(10.0, 5.0));
    assert_eq!(scene.position(dragged), Some(released));
    assert!(!scene.panning_suspended());

    let ends: Vec<_> = scene
        .take_events()
        .into_iter()
        .filter(|event| matches!(event, DragEvent::Ended { .. }))
        .collect();
    assert_eq!(
        ends,
        vec![DragEvent::Ended {
            node: dragged,
            position: Point::new(10.0, 5.0),
            committed: true,
        }]
    );
}

#[test]
fn drag_reverts_when_no_cell_is_free() {
    let projection = IsoProjection::new(64.0, 32.0).unwrap();
    let bounds = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::square(30.0));
    let mut scene = Scene::new(projection, bounds);
    let dragged = Id::new("dragged");
    scene.insert_node(dragged, Footprint::new(Point::new(5.0, 12.0), 2.0));
    scene.insert_node(Id::new("left"), Footprint::new(Point::new(1.0, 5.0), 2.0));
    scene.insert_node(Id::new("right"), Footprint::new(Point::new(10.0, 5.0), 2.0));

    let mut session = scene.begin_drag(dragged, Point::default()).unwrap();
    // Exactly between the two neighbours; both integer cells collide.
    let pointer = projection.to_screen(Point::new(0.5, -7.0)).unwrap();
    assert_eq!(session.drag_move(pointer), Point::new(5.5, 5.0));

    assert_eq!(session.end(), Point::new(5.0, 12.0));
    assert_eq!(scene.position(dragged), Some(Point::new(5.0, 12.0)));
}

#[test]
fn determinism_same_input_same_layout() {
    let config = LayoutConfig::default();
    let nodes: Vec<NodeSpec> = (0..40)
        .map(|i| {
            NodeSpec::new(Id::indexed("node", i))
                .with_magnitude((i as u64 * 379) % 10_000)
                .with_category(if i % 3 == 0 { "even" } else { "odd" })
        })
        .collect();

    assert_eq!(automatic(&nodes, &config), automatic(&nodes, &config));
}

#[test]
fn largest_first_in_empty_region() {
    let result = packer().pack(
        vec![item("small", 1.0), item("largest", 4.0), item("medium", 2.5)],
        Size::square(25.0),
    );

    assert_eq!(result.placed[0].id(), "largest");
    assert_eq!(result.placed[0].position(), Point::new(8.0, 8.0));
}
