use crate::foundation::error::{NixieError, NixieResult};

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Source-over of one premultiplied pixel onto another.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    match src[3] {
        0 => dst,
        255 => src,
        sa => {
            let inv = 255 - u16::from(sa);
            std::array::from_fn(|i| src[i].saturating_add(mul_div255(u16::from(dst[i]), inv)))
        }
    }
}

/// Composite a whole surface onto another of the same size.
pub fn over_in_place(dst: &mut [u8], src: &[u8]) -> NixieResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(NixieError::render("surfaces must be equal-length rgba8 buffers"));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Fill every pixel with `rgba`.
pub fn fill(dst: &mut [u8], rgba: PremulRgba8) {
    for px in dst.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
