use super::*;
use crate::{
    assets::bundle::{DirBundle, MemoryBundle},
    render::backend::RenderSettings,
};

#[test]
fn empty_bundle_degrades_to_placeholder() {
    let view = ClockView::load(&MemoryBundle::new(), Container::ScreenSaver).unwrap();
    let ClockView::Placeholder(message) = &view else {
        panic!("expected placeholder");
    };
    assert_eq!(message, Container::ScreenSaver.placeholder_message());
    assert!(view.is_placeholder());
}

#[test]
fn corrupt_bundle_degrades_to_placeholder() {
    let mut bundle = MemoryBundle::new();
    bundle.insert("tube_a_00_1x.png", b"junk".to_vec());
    let view = ClockView::load(&bundle, Container::WidgetMedium).unwrap();
    assert!(view.is_placeholder());
}

#[test]
fn missing_directory_degrades_to_placeholder() {
    let bundle = DirBundle::new("target/no_such_bundle_dir");
    let view = ClockView::load(&bundle, Container::WidgetExtraLarge).unwrap();
    assert!(view.is_placeholder());
}

#[test]
fn placeholder_renders_at_requested_size() {
    let engine = LayoutEngine::new(Container::WidgetMedium);
    let view = ClockView::Placeholder("Missing assets".to_string());
    let mut backend = CpuBackend::new(
        RenderSettings {
            clear_rgba: Some([10, 10, 10, 255]),
            text_rgba: None,
        },
        None,
    )
    .unwrap();
    let frame = render_frame(
        &engine,
        &view,
        &mut backend,
        Size::new(120.0, 60.0),
        ClockReading::new(8, 0).unwrap(),
        HourCycle::TwelveHour,
    )
    .unwrap();
    assert_eq!((frame.width, frame.height), (120, 60));
    assert_eq!(frame.pixel(0, 0), Some([10, 10, 10, 255]));
}
