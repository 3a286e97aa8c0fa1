use minifb::{Key, Window, WindowOptions};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::turtle::{Geometry, Point};

const WIDTH: usize = 900;
const HEIGHT: usize = 700;
const MARGIN: f64 = 40.0;

const BACKGROUND: u32 = 0x101418;
const BRANCH: u32 = 0x7FD070;
const LEAF: u32 = 0xE06080;
const TEXT: u32 = 0xFFFFFF;

/// What the window shows: the latest generated geometry plus the sequence
/// length for the overlay. The console loop swaps it wholesale on
/// regeneration.
#[derive(Clone)]
pub struct Scene {
    pub sequence_len: usize,
    pub geometry: Geometry,
}

impl Scene {
    pub fn empty() -> Self {
        Scene {
            sequence_len: 0,
            geometry: Geometry::default(),
        }
    }
}

// Simple 3x5 pixel font, just the glyphs the overlay needs
fn draw_char(buffer: &mut [u32], x: usize, y: usize, ch: char, color: u32) {
    let pattern: &[u8] = match ch {
        '0' => &[0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => &[0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => &[0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => &[0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => &[0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => &[0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => &[0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => &[0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => &[0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => &[0b111, 0b101, 0b111, 0b001, 0b111],
        ':' => &[0b000, 0b010, 0b000, 0b010, 0b000],
        ' ' => &[0b000, 0b000, 0b000, 0b000, 0b000],
        'a' => &[0b111, 0b101, 0b111, 0b101, 0b101],
        'b' => &[0b110, 0b101, 0b110, 0b101, 0b110],
        'e' => &[0b111, 0b100, 0b111, 0b100, 0b111],
        'g' => &[0b111, 0b100, 0b101, 0b101, 0b111],
        'l' => &[0b100, 0b100, 0b100, 0b100, 0b111],
        'm' => &[0b101, 0b111, 0b111, 0b101, 0b101],
        'n' => &[0b101, 0b111, 0b111, 0b111, 0b101],
        'o' => &[0b111, 0b101, 0b101, 0b101, 0b111],
        's' => &[0b111, 0b100, 0b111, 0b001, 0b111],
        't' => &[0b111, 0b010, 0b010, 0b010, 0b010],
        'v' => &[0b101, 0b101, 0b101, 0b101, 0b010],
        'y' => &[0b101, 0b101, 0b111, 0b010, 0b010],
        _ => &[0b000, 0b000, 0b000, 0b000, 0b000],
    };

    for (dy, &row) in pattern.iter().enumerate() {
        if y + dy >= HEIGHT {
            break;
        }
        for dx in 0..3 {
            if x + dx >= WIDTH {
                break;
            }
            if row & (1 << (2 - dx)) != 0 {
                buffer[(y + dy) * WIDTH + (x + dx)] = color;
            }
        }
    }
}

fn draw_text(buffer: &mut [u32], x: usize, y: usize, text: &str, color: u32) {
    let mut offset_x = x;
    for ch in text.chars() {
        if offset_x + 4 >= WIDTH {
            break;
        }
        draw_char(buffer, offset_x, y, ch, color);
        offset_x += 4;
    }
}

fn put_pixel(buffer: &mut [u32], x: i64, y: i64, color: u32) {
    if x < 0 || y < 0 || x >= WIDTH as i64 || y >= HEIGHT as i64 {
        return;
    }
    buffer[y as usize * WIDTH + x as usize] = color;
}

fn draw_line(buffer: &mut [u32], x0: f64, y0: f64, x1: f64, y1: f64, color: u32) {
    let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0);
    let n = steps as usize;
    for i in 0..=n {
        let t = i as f64 / steps;
        put_pixel(
            buffer,
            (x0 + (x1 - x0) * t).round() as i64,
            (y0 + (y1 - y0) * t).round() as i64,
            color,
        );
    }
}

fn draw_dot(buffer: &mut [u32], x: f64, y: f64, color: u32) {
    for dy in -1..=1i64 {
        for dx in -1..=1i64 {
            put_pixel(buffer, x.round() as i64 + dx, y.round() as i64 + dy, color);
        }
    }
}

fn render_geometry(buffer: &mut [u32], geometry: &Geometry) {
    let Some((min, max)) = geometry.bounds() else {
        return;
    };
    let span_x = (max.x - min.x).max(1e-9);
    let span_y = (max.y - min.y).max(1e-9);
    let scale = ((WIDTH as f64 - MARGIN) / span_x).min((HEIGHT as f64 - MARGIN) / span_y);
    let cx = (min.x + max.x) / 2.0;
    let cy = (min.y + max.y) / 2.0;

    let to_screen = |p: Point| {
        (
            (p.x - cx) * scale + WIDTH as f64 / 2.0,
            (p.y - cy) * scale + HEIGHT as f64 / 2.0,
        )
    };

    for segment in &geometry.segments {
        let (x0, y0) = to_screen(segment.start);
        let (x1, y1) = to_screen(segment.end);
        draw_line(buffer, x0, y0, x1, y1, BRANCH);
    }
    for leaf in &geometry.leaves {
        let (x, y) = to_screen(*leaf);
        draw_dot(buffer, x, y, LEAF);
    }
}

/// Open the live window on its own thread. It re-renders the shared scene
/// at 30 fps until closed or Escape is pressed.
pub fn spawn_viewer(scene: Arc<Mutex<Scene>>) {
    thread::spawn(move || {
        let mut window = Window::new(
            "L-System Garden",
            WIDTH,
            HEIGHT,
            WindowOptions::default(),
        )
        .unwrap();

        window.set_target_fps(30);

        let mut buffer: Vec<u32> = vec![0; WIDTH * HEIGHT];

        while window.is_open() && !window.is_key_down(Key::Escape) {
            let snapshot = { scene.lock().unwrap().clone() };

            buffer.fill(BACKGROUND);
            render_geometry(&mut buffer, &snapshot.geometry);

            draw_text(
                &mut buffer,
                10,
                10,
                &format!("symbols: {}", snapshot.sequence_len),
                TEXT,
            );
            draw_text(
                &mut buffer,
                10,
                25,
                &format!("segments: {}", snapshot.geometry.segments.len()),
                TEXT,
            );
            draw_text(
                &mut buffer,
                10,
                40,
                &format!("leaves: {}", snapshot.geometry.leaves.len()),
                TEXT,
            );

            window.update_with_buffer(&buffer, WIDTH, HEIGHT).unwrap();
        }
    });
}
