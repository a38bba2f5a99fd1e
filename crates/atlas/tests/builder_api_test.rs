//! Integration tests for the LayoutBuilder API
//!
//! These tests verify that the public API works and is usable.

use atlas::{
    AtlasError, LayoutBuilder,
    config::{AppConfig, LayoutConfig, RegionCapPolicy},
    interaction::DragEvent,
    model::OverflowReason,
};

const AUTOMATIC: &str = r#"
    [[nodes]]
    id = "core"
    magnitude = 9000
    is_root = true

    [[nodes]]
    id = "billing"
    magnitude = 1200
    category = "payments"

    [[nodes]]
    id = "scratch"
"#;

const MANUAL: &str = r#"
    [[regions]]
    id = "frontend"
    name = "Frontend"
    order = 0

    [[regions]]
    id = "backend"
    name = "Backend"
    order = 1

    [[nodes]]
    id = "web"
    size = 2.0
    assigned_region = "frontend"
    saved_position = { x = 6.0, y = 6.0 }

    [[nodes]]
    id = "api"
    size = 2.0
    assigned_region = "backend"
"#;

#[test]
fn test_parse_simple_document() {
    let builder = LayoutBuilder::default();
    let result = builder.parse(AUTOMATIC);
    assert!(
        result.is_ok(),
        "Should parse valid document: {:?}",
        result.err()
    );

    let document = result.unwrap();
    assert_eq!(document.nodes().len(), 3);
    assert!(!document.is_manual());
}

#[test]
fn test_parse_error_carries_span() {
    let builder = LayoutBuilder::default();
    let err = builder.parse("[[nodes]]\nid = true\n").unwrap_err();

    match err {
        AtlasError::Parse { span, src, .. } => {
            assert!(span.is_some());
            assert!(src.contains("id = true"));
        }
        other => panic!("Expected parse error, got {other:?}"),
    }
}

#[test]
fn test_automatic_layout_and_report() {
    let builder = LayoutBuilder::default();
    let document = builder.parse(AUTOMATIC).expect("Failed to parse document");
    let layout = builder.layout(&document).expect("Failed to lay out");

    assert_eq!(layout.placed_count(), 3);
    assert!(layout.overflow().is_empty());
    // "payments" first, then everything without a category.
    assert_eq!(layout.regions().len(), 2);
    assert_eq!(layout.regions()[0].name(), "payments");

    let report = builder.report(&layout).expect("Failed to build report");
    let text = report.to_toml_string().expect("Failed to serialize report");
    assert!(text.contains("id = \"core\""));
    assert!(text.contains("screen_x"));
}

#[test]
fn test_manual_layout_keeps_saved_positions() {
    let builder = LayoutBuilder::default();
    let document = builder.parse(MANUAL).expect("Failed to parse document");
    assert!(document.is_manual());

    let layout = builder.layout(&document).expect("Failed to lay out");

    let (region, web) = layout.find_node("web".into()).unwrap();
    assert_eq!(region.id(), "frontend");
    assert_eq!(web.position().x(), 6.0);
    assert_eq!(web.position().y(), 6.0);

    let (region, api) = layout.find_node("api".into()).unwrap();
    assert_eq!(region.id(), "backend");
    assert!(region.bounds().contains_point(api.position()));
}

#[test]
fn test_builder_with_invalid_config() {
    let config = AppConfig::default().with_layout(LayoutConfig::default().with_region_size(-4.0));
    let builder = LayoutBuilder::new(config);
    let document = builder.parse(AUTOMATIC).unwrap();

    assert!(matches!(
        builder.layout(&document),
        Err(AtlasError::Config(_))
    ));
}

#[test]
fn test_region_cap_policies() {
    let source: String = (0..40)
        .map(|i| format!("[[nodes]]\nid = \"n{i}\"\nsize = 2.0\n\n"))
        .collect();

    let truncating = LayoutBuilder::new(
        AppConfig::default().with_layout(LayoutConfig::default().with_max_regions(1)),
    );
    let document = truncating.parse(&source).unwrap();
    let layout = truncating.layout(&document).unwrap();
    assert_eq!(layout.regions().len(), 1);
    assert!(
        layout
            .overflow()
            .iter()
            .all(|node| node.reason() == OverflowReason::RegionCapReached)
    );

    let failing = LayoutBuilder::new(
        AppConfig::default().with_layout(
            LayoutConfig::default()
                .with_max_regions(1)
                .with_region_cap_policy(RegionCapPolicy::Fail),
        ),
    );
    assert!(matches!(
        failing.layout(&document),
        Err(AtlasError::RegionCapExceeded { cap: 1, .. })
    ));
}

#[test]
fn test_scene_from_layout() {
    let builder = LayoutBuilder::default();
    let document = builder.parse(MANUAL).unwrap();
    let layout = builder.layout(&document).unwrap();
    let mut scene = builder.scene(&layout).expect("Failed to build scene");

    assert_eq!(scene.len(), 2);

    let session = scene.begin_drag("web".into(), Default::default()).unwrap();
    let position = session.end();
    assert_eq!(scene.position("web".into()), Some(position));

    let events = scene.take_events();
    assert!(matches!(events[0], DragEvent::Started { .. }));
    assert!(matches!(events[1], DragEvent::Ended { committed: true, .. }));
}
