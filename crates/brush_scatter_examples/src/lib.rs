#![forbid(unsafe_code)]

mod rendering;
mod terrain;

pub use rendering::{init_tracing, render_instances_to_png, AssetStyle, RenderConfig};
pub use terrain::{rolling_hills, wavy_drag};
