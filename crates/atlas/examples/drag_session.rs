//! Lays out a small map and drags one node around it.
//!
//! Run with `cargo run -p atlas --example drag_session`.

use atlas::{LayoutBuilder, config::AppConfig, geometry::Point, identifier::Id};

const MAP: &str = r#"
now = 1700000000

[[nodes]]
id = "core"
magnitude = 9000
is_root = true

[[nodes]]
id = "billing"
magnitude = 2500
category = "payments"

[[nodes]]
id = "ledger"
magnitude = 800
category = "payments"

[[nodes]]
id = "scratch"
size = 1.0
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let builder = LayoutBuilder::new(AppConfig::default());
    let document = builder.parse(MAP)?;
    let layout = builder.layout(&document)?;

    for region in layout.regions() {
        println!("{} ({})", region.name(), region.id());
        for node in region.nodes() {
            println!("  {:<8} {:?}", node.id().to_string(), node.position());
        }
    }

    let mut scene = builder.scene(&layout)?;
    let node = Id::new("ledger");
    let projection = *scene.projection();

    if let Some(mut session) = scene.begin_drag(node, Point::default()) {
        for step in 1..=4 {
            let pointer = projection.to_screen(Point::new(step as f32 * 1.5, 0.0))?;
            let shown = session.drag_move(pointer);
            println!("move {step}: {shown:?} near {:?}", session.nearby());
        }
        let released = session.end();
        println!("released at {released:?}");
    }

    for event in scene.take_events() {
        println!("{event:?}");
    }

    Ok(())
}
