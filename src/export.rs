use std::path::Path;

use image::{Rgb, RgbImage};

use crate::error::LsystemError;
use crate::turtle::{Geometry, Point};

const MARGIN: f64 = 40.0;
const BACKGROUND: Rgb<u8> = Rgb([16, 20, 24]);
const BRANCH: Rgb<u8> = Rgb([127, 208, 112]);
const LEAF: Rgb<u8> = Rgb([224, 96, 128]);

/// Rasterize the geometry scaled-to-fit into a `width` x `height` image and
/// write it to `path`. Empty geometry produces a plain background.
pub fn save_png<P: AsRef<Path>>(
    geometry: &Geometry,
    width: u32,
    height: u32,
    path: P,
) -> Result<(), LsystemError> {
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);

    if let Some((min, max)) = geometry.bounds() {
        let span_x = (max.x - min.x).max(1e-9);
        let span_y = (max.y - min.y).max(1e-9);
        let scale = ((width as f64 - MARGIN) / span_x).min((height as f64 - MARGIN) / span_y);
        let cx = (min.x + max.x) / 2.0;
        let cy = (min.y + max.y) / 2.0;

        let to_screen = |p: Point| {
            (
                (p.x - cx) * scale + width as f64 / 2.0,
                (p.y - cy) * scale + height as f64 / 2.0,
            )
        };

        for segment in &geometry.segments {
            let (x0, y0) = to_screen(segment.start);
            let (x1, y1) = to_screen(segment.end);
            draw_line(&mut img, x0, y0, x1, y1, BRANCH);
        }
        for leaf in &geometry.leaves {
            let (x, y) = to_screen(*leaf);
            for dy in -1..=1i64 {
                for dx in -1..=1i64 {
                    put_pixel(&mut img, x.round() as i64 + dx, y.round() as i64 + dy, LEAF);
                }
            }
        }
    }

    img.save(path)?;
    Ok(())
}

fn put_pixel(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    img.put_pixel(x as u32, y as u32, color);
}

fn draw_line(img: &mut RgbImage, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgb<u8>) {
    let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0);
    let n = steps as usize;
    for i in 0..=n {
        let t = i as f64 / steps;
        put_pixel(
            img,
            (x0 + (x1 - x0) * t).round() as i64,
            (y0 + (y1 - y0) * t).round() as i64,
            color,
        );
    }
}
