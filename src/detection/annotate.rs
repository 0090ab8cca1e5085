use ab_glyph::FontVec;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::path::Path;

use crate::models::{Contour, PlateRect};

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/System/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Gap between the top of a plate box and the label baseline
const LABEL_OFFSET: i32 = 10;

/// Load the label font from `preferred`, falling back to common system fonts
pub fn load_font(preferred: Option<&Path>) -> Option<FontVec> {
    let preferred = preferred.into_iter().map(Path::to_path_buf);
    let system = SYSTEM_FONTS.iter().map(|p| Path::new(p).to_path_buf());

    for path in preferred.chain(system) {
        let Ok(font_data) = std::fs::read(&path) else {
            continue;
        };
        match FontVec::try_from_vec(font_data) {
            Ok(font) => {
                log::debug!("loaded label font {}", path.display());
                return Some(font);
            }
            Err(e) => log::debug!("skipping font {}: {}", path.display(), e),
        }
    }

    None
}

/// Trace every contour as a closed polyline, one pixel wide
pub fn draw_contours(img: &mut RgbImage, contours: &[Contour], color: [u8; 3]) {
    let color = Rgb(color);
    for contour in contours {
        let points = &contour.points;
        match points.len() {
            0 => {}
            1 => {
                let p = points[0];
                if p.x >= 0 && p.y >= 0 && (p.x as u32) < img.width() && (p.y as u32) < img.height() {
                    img.put_pixel(p.x as u32, p.y as u32, color);
                }
            }
            n => {
                for i in 0..n {
                    let a = points[i];
                    let b = points[(i + 1) % n];
                    draw_line_segment_mut(
                        img,
                        (a.x as f32, a.y as f32),
                        (b.x as f32, b.y as f32),
                        color,
                    );
                }
            }
        }
    }
}

/// Outline `rect` with a box `thickness` pixels wide, centred on its border
pub fn draw_plate_box(img: &mut RgbImage, rect: &PlateRect, color: [u8; 3], thickness: u32) {
    let color = Rgb(color);
    let base = Rect::at(rect.x as i32, rect.y as i32).of_size(rect.width, rect.height);
    let inset = (thickness as i32 - 1) / 2;

    for t in 0..thickness as i32 {
        let grow = t - inset;
        let width = rect.width as i32 + 2 * grow;
        let height = rect.height as i32 + 2 * grow;
        if width <= 0 || height <= 0 {
            continue;
        }
        let ring = Rect::at(base.left() - grow, base.top() - grow).of_size(width as u32, height as u32);
        draw_hollow_rect_mut(img, ring, color);
    }
}

/// Write `text` just above `rect`
pub fn draw_label(
    img: &mut RgbImage,
    rect: &PlateRect,
    text: &str,
    color: [u8; 3],
    scale: f32,
    font: &FontVec,
) {
    let x = rect.x as i32;
    let y = rect.y as i32 - LABEL_OFFSET - scale.round() as i32;
    draw_text_mut(img, Rgb(color), x, y, scale, font, text);
}
