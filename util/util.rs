#![allow(dead_code)]

use std::sync::OnceLock;

use domcol::PixelBuffer;
use palette::Srgb;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;

pub const SIZES: [(u32, u32); 3] = [(128, 128), (1024, 1024), (3000, 2000)];

pub fn noise_image(width: u32, height: u32, seed: u64) -> PixelBuffer {
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);
    let pixels = (0..width * height)
        .map(|_| {
            let [r, g, b] = rng.gen::<[u8; 3]>();
            Srgb::new(r, g, b)
        })
        .collect();

    PixelBuffer::new(width, height, pixels).unwrap()
}

#[allow(clippy::cast_possible_truncation)]
pub fn gradient_image(width: u32, height: u32) -> PixelBuffer {
    let pixels = (0..height)
        .flat_map(|y| {
            (0..width).map(move |x| {
                let r = (x * 255 / width.max(2).saturating_sub(1)) as u8;
                let g = (y * 255 / height.max(2).saturating_sub(1)) as u8;
                Srgb::new(r, g, r / 2 + g / 2)
            })
        })
        .collect();

    PixelBuffer::new(width, height, pixels).unwrap()
}

fn load_images() -> Vec<(String, PixelBuffer)> {
    SIZES
        .iter()
        .flat_map(|&(width, height)| {
            [
                (
                    format!("noise_{width}x{height}"),
                    noise_image(width, height, 0),
                ),
                (
                    format!("gradient_{width}x{height}"),
                    gradient_image(width, height),
                ),
            ]
        })
        .collect()
}

static IMAGES: OnceLock<Vec<(String, PixelBuffer)>> = OnceLock::new();

pub fn images() -> &'static [(String, PixelBuffer)] {
    IMAGES.get_or_init(load_images)
}
