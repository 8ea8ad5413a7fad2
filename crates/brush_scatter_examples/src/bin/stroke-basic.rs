use brush_scatter::prelude::*;
use brush_scatter_examples::{
    init_tracing, render_instances_to_png, rolling_hills, wavy_drag, AssetStyle, RenderConfig,
};
use glam::Vec2;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let terrain = rolling_hills(200.0, 1.0, 12, 7)?;
    let mut scene = MemoryScene::new();
    let mut history = PlacementHistory::new();

    let config = PlacementConfig::default()
        .with_spacing(SpacingRange::new(1.5, 6.0))
        .with_density(0.6)
        .with_selection(SelectionPolicy::Weighted)
        .with_scatter(
            ScatterConfig::default()
                .with_constraints(SurfaceConstraints::new().with_max_slope_degrees(35.0)),
        )
        .with_seed(42);
    let pool = AssetPool::new()
        .with_weighted_asset("pine", 3.0)
        .with_weighted_asset("oak", 1.0)
        .with_weighted_asset("rock", 0.5);
    let mut tool = ModelPlacementBrushTool::try_new(config)?.with_asset_pool(pool);

    let path = wavy_drag(Vec2::new(-80.0, -40.0), Vec2::new(80.0, 40.0), 25.0, 60);
    let mut ctx = BrushContext::new(&terrain, &mut scene, &mut history);
    for center in path {
        tool.act(&BrushFootprint::new(center, 10.0), &mut ctx);
    }
    let committed = tool.on_brush_release(&mut ctx).unwrap_or(0);
    tracing::info!("Committed {} instances in one stroke.", committed);

    let mut rc =
        RenderConfig::new((1000, 1000), Vec2::new(200.0, 200.0)).with_height_range(0.0, 10.0);
    rc.set_asset_style(
        "pine",
        AssetStyle {
            color: [20, 90, 40],
            radius: 5,
        },
    )
    .set_asset_style(
        "oak",
        AssetStyle {
            color: [110, 70, 20],
            radius: 7,
        },
    )
    .set_asset_style(
        "rock",
        AssetStyle {
            color: [120, 120, 130],
            radius: 4,
        },
    );
    render_instances_to_png(scene.instances(), Some(&terrain), &rc, "stroke-basic.png")?;
    Ok(())
}
