use std::sync::Arc;

use crate::foundation::error::{NixieError, NixieResult};

/// Decoded bitmap in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct Bitmap {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8, tightly packed.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode an encoded image (PNG and the other formats `image` enables) to a [`Bitmap`].
///
/// `origin` names the resource in the error message.
pub fn decode_image(bytes: &[u8], origin: &str) -> NixieResult<Bitmap> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| NixieError::decode(format!("'{origin}': {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(NixieError::decode(format!("'{origin}': image is empty")));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(Bitmap {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
