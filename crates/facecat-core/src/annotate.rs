//! Bounding-box and name overlays for live frames.

use crate::types::RecognizedFace;
use ab_glyph::{FontRef, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

/// Outline colour for identified faces.
pub const MATCH_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
/// Outline colour for unknown faces.
pub const UNKNOWN_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const BOX_THICKNESS: u32 = 2;

const LABEL_FONT: &[u8] = include_bytes!("../assets/fonts/DejaVuSans-Bold.ttf");
const LABEL_SCALE: f32 = 16.0;
/// Vertical gap between the label baseline area and the box.
const LABEL_GAP: i32 = 4;

fn label_font() -> Option<FontRef<'static>> {
    match FontRef::try_from_slice(LABEL_FONT) {
        Ok(font) => Some(font),
        Err(e) => {
            tracing::warn!(error = %e, "label font unusable, drawing boxes only");
            None
        }
    }
}

/// Outline every recognized face and write its name just above the box:
/// green when identified, red when unknown.
pub fn annotate(image: &mut RgbImage, faces: &[RecognizedFace]) {
    let (w, h) = image.dimensions();
    let font = label_font();
    for face in faces {
        let Some((left, top, right, bottom)) = face.location.pixel_rect(w, h) else {
            continue;
        };
        let color = if face.result.is_match() { MATCH_COLOR } else { UNKNOWN_COLOR };

        for t in 0..BOX_THICKNESS {
            let width = (right - left + 1).saturating_sub(2 * t);
            let height = (bottom - top + 1).saturating_sub(2 * t);
            if width == 0 || height == 0 {
                break;
            }
            let rect = Rect::at((left + t) as i32, (top + t) as i32).of_size(width, height);
            draw_hollow_rect_mut(image, rect, color);
        }

        if let Some(font) = &font {
            draw_label(image, font, face.label(), left, top, color);
        }
    }
}

fn draw_label(image: &mut RgbImage, font: &FontRef<'_>, text: &str, left: u32, top: u32, color: Rgb<u8>) {
    let scale = PxScale::from(LABEL_SCALE);
    let (_, text_height) = text_size(scale, font, text);
    let y = (top as i32 - LABEL_GAP - text_height as i32).max(0);
    draw_text_mut(image, color, left as i32, y, scale, font, text);
}
