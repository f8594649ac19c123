//! Field renderers: two-color gradient, six-stop deep gradient, surface
//! classes, and packed world data.

use super::image::DebugImage;
use crate::field::{ClassField, ScalarField};
use crate::remap::{inverse_lerp, map};
use crate::world::{SurfaceTable, WorldData};

/// Colors of the deep gradient at 0, 0.2, 0.4, 0.6, 0.8 and 1.
pub const DEEP_GRADIENT_STOPS: [[u8; 4]; 6] = [
    [255, 0, 255, 255],
    [0, 0, 255, 255],
    [0, 255, 0, 255],
    [255, 255, 0, 255],
    [255, 128, 0, 255],
    [255, 0, 0, 255],
];

fn lerp_rgba(a: [u8; 4], b: [u8; 4], t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    std::array::from_fn(|i| {
        let v = f32::from(a[i]) + (f32::from(b[i]) - f32::from(a[i])) * t;
        v.round() as u8
    })
}

fn unit_to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn image_for(width: usize, length: usize) -> DebugImage {
    DebugImage::new(width as u32, length as u32)
}

/// Blend from `min_color` to `max_color` as values go from `min` to `max`.
pub fn render_gradient(
    field: &ScalarField,
    min_color: [u8; 4],
    max_color: [u8; 4],
    min: f32,
    max: f32,
) -> DebugImage {
    let (width, length) = field.dimensions();
    let mut image = image_for(width, length);
    for y in 0..length {
        for x in 0..width {
            let t = inverse_lerp(min, max, field.get(x, y));
            image.set_pixel(x as u32, y as u32, lerp_rgba(min_color, max_color, t));
        }
    }
    image
}

/// Color of normalized `value` on the magenta-to-red deep gradient.
pub fn deep_gradient_color(value: f32) -> [u8; 4] {
    let value = value.clamp(0.0, 1.0);
    let segments = (DEEP_GRADIENT_STOPS.len() - 1) as f32;
    let scaled = value * segments;
    let band = (scaled.floor() as usize).min(DEEP_GRADIENT_STOPS.len() - 2);
    lerp_rgba(
        DEEP_GRADIENT_STOPS[band],
        DEEP_GRADIENT_STOPS[band + 1],
        scaled - band as f32,
    )
}

/// Render `field` on the deep gradient, optionally reversed.
pub fn render_deep_gradient(field: &ScalarField, inverse: bool, min: f32, max: f32) -> DebugImage {
    let (width, length) = field.dimensions();
    let mut image = image_for(width, length);
    for y in 0..length {
        for x in 0..width {
            let mut value = map(field.get(x, y), min, max, 0.0, 1.0);
            if inverse {
                value = 1.0 - value;
            }
            image.set_pixel(x as u32, y as u32, deep_gradient_color(value));
        }
    }
    image
}

/// Paint each cell with its surface band's color.
pub fn render_surface(classes: &ClassField, bands: &SurfaceTable) -> DebugImage {
    let mut image = image_for(classes.width(), classes.length());
    for y in 0..classes.length() {
        for x in 0..classes.width() {
            let color = bands.get(classes.get(x, y)).color;
            image.set_pixel(x as u32, y as u32, color);
        }
    }
    image
}

/// Pack elevation, temperature and moisture into the R, G and B channels.
pub fn render_world_data(world: &WorldData) -> DebugImage {
    let (width, length) = world.elevation.dimensions();
    let mut image = image_for(width, length);
    for y in 0..length {
        for x in 0..width {
            image.set_pixel(
                x as u32,
                y as u32,
                [
                    unit_to_byte(world.elevation.get(x, y)),
                    unit_to_byte(world.temperature.get(x, y)),
                    unit_to_byte(world.moisture.get(x, y)),
                    255,
                ],
            );
        }
    }
    image
}

/// Decode an image written by [`render_world_data`].
///
/// Only the climate layers survive the round trip; surface classes and
/// weights come back as `None`. Values are quantized to 1/255.
pub fn world_data_from_image(image: &DebugImage) -> WorldData {
    let (width, length) = (image.width as usize, image.height as usize);
    let channel = |c: usize| {
        ScalarField::from_fn(width, length, |x, y| {
            f32::from(image.get_pixel(x as u32, y as u32)[c]) / 255.0
        })
    };
    WorldData {
        elevation: channel(0),
        temperature: channel(1),
        moisture: channel(2),
        surface: None,
        weights: None,
    }
}
