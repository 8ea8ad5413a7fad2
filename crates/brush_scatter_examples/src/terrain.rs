use brush_scatter::prelude::{Heightfield, Result};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

fn unit(rng: &mut StdRng) -> f32 {
    (rng.next_u32() >> 8) as f32 / (1u32 << 24) as f32
}

/// Square height field of `extent` world units centered on the origin, made of
/// random smooth hills.
pub fn rolling_hills(extent: f32, cell_size: f32, hills: usize, seed: u64) -> Result<Heightfield> {
    let mut rng = StdRng::seed_from_u64(seed);
    let bumps: Vec<(Vec2, f32, f32)> = (0..hills)
        .map(|_| {
            let center = (Vec2::new(unit(&mut rng), unit(&mut rng)) - 0.5) * extent;
            let height = 2.0 + unit(&mut rng) * 8.0;
            let width = extent * (0.08 + unit(&mut rng) * 0.15);
            (center, height, width)
        })
        .collect();

    let vertices = (extent / cell_size).ceil() as usize + 1;
    let origin = Vec2::splat(-extent * 0.5);
    Heightfield::from_fn(origin, cell_size, vertices, vertices, |x, z| {
        let p = Vec2::new(x, z);
        bumps
            .iter()
            .map(|&(c, h, w)| h * (-(p - c).length_squared() / (2.0 * w * w)).exp())
            .sum()
    })
}

/// Evenly spaced brush positions along a sine wave from `start` to `end`.
pub fn wavy_drag(start: Vec2, end: Vec2, amplitude: f32, ticks: usize) -> Vec<Vec2> {
    let dir = end - start;
    let normal = dir.perp().normalize_or_zero();
    (0..ticks)
        .map(|i| {
            let t = i as f32 / (ticks.max(2) - 1) as f32;
            start + dir * t + normal * amplitude * (t * std::f32::consts::TAU).sin()
        })
        .collect()
}
