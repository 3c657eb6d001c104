use std::io::Cursor;

use super::*;
use crate::{
    assets::{
        bundle::MemoryBundle,
        resolver::{ScaleTag, Sprite},
    },
    clock::{digits::ClockReading, hour_cycle::HourCycle},
    layout::{container::Container, engine::LayoutEngine},
};

const GLYPH: [u8; 4] = [0, 255, 0, 255];
const BASE: [u8; 4] = [255, 0, 0, 255];
const ROD: [u8; 4] = [0, 0, 255, 255];
const OTHER: [u8; 4] = [255, 255, 255, 255];

fn png(rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn elements() -> ElementSet {
    let mut bundle = MemoryBundle::new();
    for sprite in Sprite::all() {
        let (name, color) = match sprite {
            Sprite::Rod(_) => ("rod.png".to_string(), ROD),
            Sprite::Glyph(_) => (format!("{}_1x.png", sprite.resource_name()), GLYPH),
            Sprite::BasePlate => (format!("{}_1x.png", sprite.resource_name()), BASE),
            _ => (format!("{}_1x.png", sprite.resource_name()), OTHER),
        };
        bundle.insert(name, png(color));
    }
    ElementSet::load(&bundle, ScaleTag::X1).unwrap()
}

fn settings() -> RenderSettings {
    RenderSettings {
        clear_rgba: Some([0, 0, 0, 255]),
        text_rgba: None,
    }
}

fn assert_near(px: Option<[u8; 4]>, expected: [u8; 4]) {
    let px = px.unwrap();
    for (a, b) in px.iter().zip(expected) {
        assert!(a.abs_diff(b) <= 2, "{px:?} != {expected:?}");
    }
}

fn render(reading: ClockReading) -> FrameRGBA {
    let size = Container::WidgetMedium.natural_size(810.0);
    let list = LayoutEngine::new(Container::WidgetMedium)
        .render(size, reading, HourCycle::TwentyFourHour)
        .unwrap();
    let mut backend = CpuBackend::new(settings(), None).unwrap();
    backend.render(&list, &elements()).unwrap()
}

#[test]
fn frame_matches_container_size() {
    let frame = render(ClockReading::new(10, 24).unwrap());
    assert_eq!(frame.width, 810);
    assert_eq!(frame.height, 426);
    assert!(frame.premultiplied);
    assert_eq!(frame.data.len(), 810 * 426 * 4);
}

#[test]
fn elements_land_where_the_layout_puts_them() {
    let frame = render(ClockReading::new(10, 24).unwrap());

    // Tube A center on the primary canvas (offset 8 from the top).
    assert_near(frame.pixel(119, 192), GLYPH);
    // Base plate is painted over the colon.
    assert_near(frame.pixel(405, 372), BASE);
    // Middle rod inside the strip beneath the face.
    assert_near(frame.pixel(405, 407), ROD);
    // Gap between tubes A and B near the top.
    assert_eq!(frame.pixel(199, 19), Some([0, 0, 0, 255]));
}

#[test]
fn rendering_is_deterministic() {
    let a = render(ClockReading::new(7, 5).unwrap());
    let b = render(ClockReading::new(7, 5).unwrap());
    assert_eq!(a, b);
}

#[test]
fn message_without_font_is_a_cleared_frame() {
    let mut backend = CpuBackend::new(settings(), None).unwrap();
    assert!(!backend.has_font());
    let frame = backend
        .render_message(Size::new(64.0, 32.0), "Missing assets", 14.0)
        .unwrap();
    assert_eq!((frame.width, frame.height), (64, 32));
    assert!(frame.data.chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
}

#[test]
fn oversized_canvas_is_a_render_error() {
    let mut backend = CpuBackend::new(settings(), None).unwrap();
    let err = backend
        .render_message(Size::new(70_000.0, 10.0), "x", 14.0)
        .unwrap_err();
    assert!(matches!(err, NixieError::Render(_)));
}
