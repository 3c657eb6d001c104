use super::*;

#[test]
fn per_container_parameters() {
    assert_eq!(Container::WidgetMedium.scale(), ScaleTag::X1);
    assert_eq!(Container::WidgetExtraLarge.scale(), ScaleTag::X2);
    assert_eq!(Container::ScreenSaver.scale(), ScaleTag::X3);

    assert_eq!(Container::WidgetMedium.meridiem_font_size(), 14.0);
    assert_eq!(Container::WidgetExtraLarge.meridiem_font_size(), 18.0);
    assert_eq!(Container::ScreenSaver.meridiem_font_size(), 20.0);

    assert_eq!(Container::ScreenSaver.meridiem_min_height(), Some(150.0));
    assert_eq!(Container::WidgetMedium.meridiem_min_height(), None);
    assert_eq!(Container::WidgetMedium.placeholder_message(), "Missing assets");
    assert!(
        Container::ScreenSaver
            .placeholder_message()
            .contains("reinstall")
    );
}

#[test]
fn widget_frame_pads_top_and_puts_rods_below() {
    let size = Container::WidgetMedium.natural_size(810.0);
    let frame = Container::WidgetMedium.frame(size).unwrap();

    assert_eq!(frame.primary.x0, 0.0);
    assert_eq!(frame.primary.y0, 8.0);
    assert!((frame.primary.width() - 810.0).abs() < 1e-9);
    assert!((frame.primary.height() - 380.0).abs() < 1e-9);

    assert_eq!(frame.rods.y0, frame.primary.y1);
    assert_eq!(frame.rods.y1, size.height);
    assert!(frame.rods.height() > 0.0);
}

#[test]
fn screen_saver_caps_width_and_centers_face() {
    let size = Size::new(1920.0, 1080.0);
    let frame = Container::ScreenSaver.frame(size).unwrap();

    assert!((frame.primary.width() - SCREEN_SAVER_MAX_WIDTH).abs() < 1e-9);
    assert!((frame.primary.center().x - 960.0).abs() < 1e-9);
    assert!((frame.primary.center().y - 540.0).abs() < 1e-9);
    assert_eq!(frame.rods.x0, frame.primary.x0);
    assert_eq!(frame.rods.x1, frame.primary.x1);
    assert_eq!(frame.rods.y1, 1080.0);
}

#[test]
fn short_container_never_offsets_negative() {
    let frame = Container::ScreenSaver.frame(Size::new(1000.0, 100.0)).unwrap();
    assert_eq!(frame.primary.y0, 0.0);
    assert_eq!(frame.rods.height(), 0.0);
}

#[test]
fn frame_rejects_degenerate_sizes() {
    assert!(Container::WidgetMedium.frame(Size::new(0.0, 10.0)).is_err());
    assert!(
        Container::WidgetMedium
            .frame(Size::new(f64::INFINITY, 10.0))
            .is_err()
    );
}

#[test]
fn parses_user_facing_names() {
    assert_eq!("medium".parse::<Container>().unwrap(), Container::WidgetMedium);
    assert_eq!(
        "extra-large".parse::<Container>().unwrap(),
        Container::WidgetExtraLarge
    );
    assert_eq!(
        "screen-saver".parse::<Container>().unwrap(),
        Container::ScreenSaver
    );
    assert!(matches!(
        "tiny".parse::<Container>(),
        Err(NixieError::Config(_))
    ));
}
