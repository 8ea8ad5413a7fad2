use brush_scatter::prelude::*;
use brush_scatter_examples::{
    init_tracing, render_instances_to_png, rolling_hills, wavy_drag, AssetStyle, RenderConfig,
};
use glam::Vec2;

const CATALOG: [&str; 6] = [
    "Tree_Oak",
    "Tree_Pine",
    "Tree_Birch",
    "Rock_Small",
    "Rock_Large",
    "Bush",
];

fn main() -> anyhow::Result<()> {
    init_tracing();

    let terrain = rolling_hills(160.0, 1.0, 8, 11)?;
    let mut scene = MemoryScene::new();
    let mut history = PlacementHistory::new();

    // Editor flow: search the catalog, toggle results, apply.
    let mut selection = AssetSelection::new();
    for id in filter_by_name(CATALOG.iter().copied(), "tree") {
        selection.toggle(id);
    }
    selection.toggle("Tree_Birch");
    let mut tool = ModelPlacementBrushTool::try_new(
        PlacementConfig::default()
            .with_spacing(SpacingRange::new(2.0, 6.0))
            .with_seed(9),
    )?;
    tool.set_asset_pool(selection.to_pool());

    let mut events = VecSink::only([
        BrushEventKind::StrokeStarted,
        BrushEventKind::StrokeCommitted,
        BrushEventKind::StrokeAborted,
    ]);

    {
        let mut ctx =
            BrushContext::new(&terrain, &mut scene, &mut history).with_events(&mut events);

        for center in wavy_drag(Vec2::new(-60.0, -30.0), Vec2::new(60.0, -30.0), 10.0, 40) {
            tool.act(&BrushFootprint::new(center, 8.0), &mut ctx);
        }
        tool.on_brush_release(&mut ctx);

        // Second stroke with rocks, cancelled halfway.
        let rocks = filter_by_name(CATALOG.iter().copied(), "rock");
        tool.set_asset_pool(AssetPool::from_ids(rocks));
        for center in wavy_drag(Vec2::new(-60.0, 30.0), Vec2::new(60.0, 30.0), 10.0, 20) {
            tool.act(&BrushFootprint::new(center, 8.0), &mut ctx);
        }
        tool.on_brush_cancel(&mut ctx);

        // Third stroke, committed.
        for center in wavy_drag(Vec2::new(-60.0, 30.0), Vec2::new(60.0, 30.0), 10.0, 40) {
            tool.act(&BrushFootprint::new(center, 8.0), &mut ctx);
        }
        tool.on_brush_release(&mut ctx);
    }

    for event in events.as_slice() {
        tracing::info!("{:?}", event);
    }

    let mut rc =
        RenderConfig::new((800, 800), Vec2::new(160.0, 160.0)).with_height_range(0.0, 10.0);
    for (id, color) in [
        ("Tree_Oak", [110, 70, 20]),
        ("Tree_Pine", [20, 90, 40]),
        ("Rock_Small", [150, 150, 160]),
        ("Rock_Large", [90, 90, 100]),
    ] {
        rc.set_asset_style(id, AssetStyle { color, radius: 5 });
    }

    render_instances_to_png(
        scene.instances(),
        Some(&terrain),
        &rc,
        "stroke-undo-redo-1-both.png",
    )?;

    let removed = history.undo(&mut scene).unwrap_or(0);
    tracing::info!("Undo removed {} instances.", removed);
    render_instances_to_png(
        scene.instances(),
        Some(&terrain),
        &rc,
        "stroke-undo-redo-2-undone.png",
    )?;

    let restored = history.redo(&mut scene).unwrap_or(0);
    tracing::info!("Redo restored {} instances.", restored);
    render_instances_to_png(
        scene.instances(),
        Some(&terrain),
        &rc,
        "stroke-undo-redo-3-redone.png",
    )?;
    Ok(())
}
