//! Debug renders of generated fields as RGBA images.
//!
//! Provides [`DebugImage`] plus renderers for scalar gradients, surface class
//! maps and the packed world-data format used to persist climate layers.

mod image;
mod renderers;

pub use self::image::DebugImage;
pub use renderers::{
    DEEP_GRADIENT_STOPS, deep_gradient_color, render_deep_gradient, render_gradient,
    render_surface, render_world_data, world_data_from_image,
};
