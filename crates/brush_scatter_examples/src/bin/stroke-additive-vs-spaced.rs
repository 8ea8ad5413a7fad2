use brush_scatter::prelude::*;
use brush_scatter_examples::{init_tracing, render_instances_to_png, AssetStyle, RenderConfig};
use glam::Vec2;

const TICKS: usize = 40;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let ground = FlatSurface::centered(0.0, Vec2::new(120.0, 60.0));
    let mut scene = MemoryScene::new();
    let mut history = PlacementHistory::new();
    let pool = AssetPool::from_ids(["grass"]);

    let mut tool = ModelPlacementBrushTool::try_new(
        PlacementConfig::default()
            .with_spacing(SpacingRange::new(1.0, 4.0))
            .with_seed(3),
    )?;

    // Hold the brush still: spaced strokes saturate, additive strokes keep stacking.
    for (center, additive) in [(Vec2::new(-30.0, 0.0), false), (Vec2::new(30.0, 0.0), true)] {
        let mut sink = VecSink::only([BrushEventKind::TickFinished]);
        let mut ctx =
            BrushContext::new(&ground, &mut scene, &mut history).with_events(&mut sink);
        let footprint = BrushFootprint::new(center, 15.0);
        for _ in 0..TICKS {
            tool.on_brush_tick(&footprint, Density::new(0.5), &pool, additive, &mut ctx);
        }
        let count = tool.on_brush_release(&mut ctx).unwrap_or(0);

        let placed_per_tick: Vec<usize> = sink
            .as_slice()
            .iter()
            .filter_map(|e| match e {
                BrushEvent::TickFinished { outcome, .. } => Some(outcome.placed),
                _ => None,
            })
            .collect();
        tracing::info!(
            "{} stroke: {} instances, last ticks placed {:?}.",
            if additive { "Additive" } else { "Spaced" },
            count,
            &placed_per_tick[placed_per_tick.len().saturating_sub(5)..]
        );
    }

    let mut rc =
        RenderConfig::new((1200, 600), Vec2::new(120.0, 60.0)).with_background([40, 40, 40]);
    rc.set_asset_style(
        "grass",
        AssetStyle {
            color: [120, 220, 90],
            radius: 3,
        },
    );
    render_instances_to_png(
        scene.instances(),
        None,
        &rc,
        "stroke-additive-vs-spaced.png",
    )?;
    Ok(())
}
