use std::io::Cursor;

use super::*;

#[test]
fn decode_image_png_dimensions_and_premul() {
    let src_rgba = vec![100u8, 50u8, 200u8, 128u8];
    let img = image::RgbaImage::from_raw(1, 1, src_rgba).unwrap();

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let bitmap = decode_image(&buf, "pixel").unwrap();
    assert_eq!(bitmap.width, 1);
    assert_eq!(bitmap.height, 1);
    assert_eq!(
        bitmap.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn transparent_pixels_zero_their_color() {
    let img = image::RgbaImage::from_raw(1, 1, vec![255, 255, 255, 0]).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let bitmap = decode_image(&buf, "clear").unwrap();
    assert_eq!(bitmap.rgba8_premul.as_slice(), &[0, 0, 0, 0]);
}

#[test]
fn garbage_bytes_are_a_decode_failure() {
    let err = decode_image(b"definitely not a png", "tube_a_00_1x.png").unwrap_err();
    assert!(matches!(err, NixieError::DecodeFailed(_)));
    assert!(err.to_string().contains("tube_a_00_1x.png"));
}
