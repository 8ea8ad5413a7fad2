use std::collections::HashMap;
use std::path::Path;

use brush_scatter::prelude::{PlacedInstance, SurfaceSampler};
use glam::Vec2;
use image::{Rgb, RgbImage};
use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber honoring `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Marker drawn for instances of one asset.
#[derive(Debug, Clone, Copy)]
pub struct AssetStyle {
    pub color: [u8; 3],
    /// Marker radius in pixels at scale `1.0`.
    pub radius: u32,
}

impl Default for AssetStyle {
    fn default() -> Self {
        Self {
            color: [255, 0, 255],
            radius: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub image_size: (u32, u32),
    /// Lower corner of the rendered `(x, z)` region.
    pub domain_min: Vec2,
    pub domain_extent: Vec2,
    pub background: [u8; 3],
    /// Height range mapped to dark..bright when shading a surface.
    pub height_range: (f32, f32),
    styles: HashMap<String, AssetStyle>,
}

impl RenderConfig {
    /// Render a region of `domain_extent` centered on the origin.
    pub fn new(image_size: (u32, u32), domain_extent: Vec2) -> Self {
        Self {
            image_size,
            domain_min: -domain_extent * 0.5,
            domain_extent,
            background: [230, 230, 230],
            height_range: (0.0, 1.0),
            styles: HashMap::new(),
        }
    }

    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = background;
        self
    }

    pub fn with_height_range(mut self, min: f32, max: f32) -> Self {
        self.height_range = (min, max);
        self
    }

    pub fn set_asset_style(&mut self, asset: impl Into<String>, style: AssetStyle) -> &mut Self {
        self.styles.insert(asset.into(), style);
        self
    }

    fn style(&self, asset: &str) -> AssetStyle {
        self.styles.get(asset).copied().unwrap_or_default()
    }

    fn pixel_to_world(&self, px: u32, py: u32) -> Vec2 {
        let (w, h) = self.image_size;
        let u = (px as f32 + 0.5) / w as f32;
        let v = (py as f32 + 0.5) / h as f32;
        self.domain_min + Vec2::new(u, v) * self.domain_extent
    }

    fn world_to_pixel(&self, p: Vec2) -> (i64, i64) {
        let (w, h) = self.image_size;
        let t = (p - self.domain_min) / self.domain_extent;
        ((t.x * w as f32) as i64, (t.y * h as f32) as i64)
    }
}

/// Draw `instances` top-down, optionally over a height-shaded `surface`, and save a PNG.
pub fn render_instances_to_png<'a, P: AsRef<Path>>(
    instances: impl IntoIterator<Item = &'a PlacedInstance>,
    surface: Option<&dyn SurfaceSampler>,
    config: &RenderConfig,
    path: P,
) -> anyhow::Result<()> {
    let (w, h) = config.image_size;
    let mut img = RgbImage::from_pixel(w, h, Rgb(config.background));

    if let Some(surface) = surface {
        let (lo, hi) = config.height_range;
        let span = (hi - lo).max(f32::EPSILON);
        for py in 0..h {
            for px in 0..w {
                let p = config.pixel_to_world(px, py);
                if let Ok(height) = surface.height_at(p.x, p.y) {
                    let t = ((height - lo) / span).clamp(0.0, 1.0);
                    let shade = |c: f32| (c * (0.55 + 0.45 * t)) as u8;
                    img.put_pixel(px, py, Rgb([shade(150.0), shade(190.0), shade(120.0)]));
                }
            }
        }
    }

    for instance in instances {
        let style = config.style(&instance.asset);
        let radius = ((style.radius as f32) * instance.scale).round().max(1.0) as i64;
        let (cx, cy) = config.world_to_pixel(instance.xz());
        draw_disc(&mut img, cx, cy, radius, style.color);
    }

    img.save(path.as_ref())?;
    tracing::info!("Wrote {}.", path.as_ref().display());
    Ok(())
}

fn draw_disc(img: &mut RgbImage, cx: i64, cy: i64, radius: i64, color: [u8; 3]) {
    let (w, h) = (img.width() as i64, img.height() as i64);
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy > radius * radius {
                continue;
            }
            let (x, y) = (cx + dx, cy + dy);
            if x >= 0 && y >= 0 && x < w && y < h {
                img.put_pixel(x as u32, y as u32, Rgb(color));
            }
        }
    }
}
