use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    assets::{
        decode::Bitmap,
        resolver::{ElementSet, ResolvedElement},
    },
    foundation::{
        core::{Affine, Canvas, Point, Rect, Rgba8Premul, Size, Vec2},
        error::{NixieError, NixieResult},
    },
    layout::engine::{DrawCommand, DrawList, DrawPass},
    render::{
        backend::{FrameRGBA, RenderSettings},
        composite::{fill, over_in_place},
        text::{LoadedFont, TextBrushRgba8, TextLayoutEngine, measure},
    },
};

const DEFAULT_TEXT_RGBA: [u8; 4] = [255, 214, 170, 255];

/// Executes draw lists on the CPU with `vello_cpu`.
///
/// Each pass is rasterized into its own container-sized surface and then composited over
/// the cleared frame, in pass order.
pub struct CpuBackend {
    settings: RenderSettings,
    font: Option<vello_cpu::peniko::FontData>,
    text: Option<TextLayoutEngine>,
    image_cache: HashMap<String, vello_cpu::Image>,
    warned_no_font: bool,
}

impl CpuBackend {
    /// Create a backend. Without a font, text commands are skipped.
    pub fn new(settings: RenderSettings, font: Option<&LoadedFont>) -> NixieResult<Self> {
        let (font_data, text) = match font {
            Some(f) => {
                let engine = TextLayoutEngine::new(f)?;
                tracing::debug!(
                    family = engine.family_name(),
                    origin = %f.origin,
                    "text font ready"
                );
                let data = vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(f.bytes.as_ref().clone()),
                    f.index,
                );
                (Some(data), Some(engine))
            }
            None => (None, None),
        };
        Ok(Self {
            settings,
            font: font_data,
            text,
            image_cache: HashMap::new(),
            warned_no_font: false,
        })
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Rasterize `list` using bitmaps from `elements`.
    #[tracing::instrument(skip_all, fields(reading = %list.reading, passes = list.passes.len()))]
    pub fn render(&mut self, list: &DrawList, elements: &ElementSet) -> NixieResult<FrameRGBA> {
        let canvas = Canvas::from_size(list.canvas)?;
        let (w, h) = surface_dims(canvas)?;

        let mut frame = vello_cpu::Pixmap::new(w, h);
        fill(frame.data_as_u8_slice_mut(), self.clear_premul());

        for pass in &list.passes {
            let mut surface = vello_cpu::Pixmap::new(w, h);
            let mut ctx = vello_cpu::RenderContext::new(w, h);
            self.draw_pass(&mut ctx, pass, elements)?;
            ctx.flush();
            ctx.render_to_pixmap(&mut surface);
            over_in_place(frame.data_as_u8_slice_mut(), surface.data_as_u8_slice())?;
        }

        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: frame.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    /// Draw `message` centered on a cleared canvas, wrapped to the canvas width.
    pub fn render_message(
        &mut self,
        size: Size,
        message: &str,
        font_size: f64,
    ) -> NixieResult<FrameRGBA> {
        let canvas = Canvas::from_size(size)?;
        let (w, h) = surface_dims(canvas)?;

        let mut frame = vello_cpu::Pixmap::new(w, h);
        fill(frame.data_as_u8_slice_mut(), self.clear_premul());

        let mut surface = vello_cpu::Pixmap::new(w, h);
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        let max_width = (size.width * 0.9) as f32;
        self.draw_text(
            &mut ctx,
            message,
            Point::new(size.width / 2.0, size.height / 2.0),
            font_size,
            1.0,
            Some(max_width),
        )?;
        ctx.flush();
        ctx.render_to_pixmap(&mut surface);
        over_in_place(frame.data_as_u8_slice_mut(), surface.data_as_u8_slice())?;

        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: frame.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn clear_premul(&self) -> [u8; 4] {
        self.settings
            .clear_rgba
            .map(|[r, g, b, a]| Rgba8Premul::from_straight_rgba(r, g, b, a).to_array())
            .unwrap_or([0, 0, 0, 0])
    }

    fn draw_pass(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        pass: &DrawPass,
        elements: &ElementSet,
    ) -> NixieResult<()> {
        let offset = pass.region.origin().to_vec2();
        for cmd in &pass.commands {
            match cmd {
                DrawCommand::Image {
                    sprite,
                    rect,
                    opacity,
                } => {
                    let element = elements.get(*sprite)?;
                    self.draw_image(ctx, element, *rect + offset, *opacity)?;
                }
                DrawCommand::Text {
                    text,
                    center,
                    font_size,
                    opacity,
                } => {
                    self.draw_text(ctx, text, *center + offset, *font_size, *opacity, None)?;
                }
            }
        }
        Ok(())
    }

    fn draw_image(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        element: &ResolvedElement,
        rect: Rect,
        opacity: f32,
    ) -> NixieResult<()> {
        if rect.width() <= 0.0 || rect.height() <= 0.0 || opacity <= 0.0 {
            return Ok(());
        }

        let paint = self.image_paint_for(element)?;
        let bitmap = element.bitmap();
        let (bw, bh) = (f64::from(bitmap.width), f64::from(bitmap.height));

        let transform = Affine::translate(Vec2::new(rect.x0, rect.y0))
            * Affine::scale_non_uniform(rect.width() / bw, rect.height() / bh);

        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(affine_to_cpu(transform));
        ctx.set_paint(paint);
        if opacity < 1.0 {
            ctx.push_opacity_layer(opacity);
        }
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, bw, bh));
        if opacity < 1.0 {
            ctx.pop_layer();
        }
        Ok(())
    }

    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        center: Point,
        font_size: f64,
        opacity: f32,
        max_width: Option<f32>,
    ) -> NixieResult<()> {
        let (Some(engine), Some(font)) = (self.text.as_mut(), self.font.as_ref()) else {
            if !self.warned_no_font {
                tracing::warn!(%text, "no font available; skipping text");
                self.warned_no_font = true;
            }
            return Ok(());
        };

        let [r, g, b, a] = self.settings.text_rgba.unwrap_or(DEFAULT_TEXT_RGBA);
        let layout = engine.layout_plain(
            text,
            font_size as f32,
            TextBrushRgba8 { r, g, b, a },
            max_width,
        )?;
        let extent = measure(&layout);
        let origin = Vec2::new(center.x - extent.width / 2.0, center.y - extent.height / 2.0);

        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(affine_to_cpu(Affine::translate(origin)));
        if opacity < 1.0 {
            ctx.push_opacity_layer(opacity);
        }

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }

        if opacity < 1.0 {
            ctx.pop_layer();
        }
        Ok(())
    }

    fn image_paint_for(&mut self, element: &ResolvedElement) -> NixieResult<vello_cpu::Image> {
        if let Some(paint) = self.image_cache.get(element.id()) {
            return Ok(paint.clone());
        }

        let pixmap = bitmap_to_pixmap(element.bitmap())?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        self.image_cache
            .insert(element.id().to_string(), paint.clone());
        Ok(paint)
    }
}

fn surface_dims(canvas: Canvas) -> NixieResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| NixieError::render("surface width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| NixieError::render("surface height exceeds u16"))?;
    Ok((w, h))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bitmap_to_pixmap(bitmap: &Bitmap) -> NixieResult<vello_cpu::Pixmap> {
    let w: u16 = bitmap
        .width
        .try_into()
        .map_err(|_| NixieError::render("image width exceeds u16"))?;
    let h: u16 = bitmap
        .height
        .try_into()
        .map_err(|_| NixieError::render("image height exceeds u16"))?;
    if bitmap.rgba8_premul.len() != bitmap.width as usize * bitmap.height as usize * 4 {
        return Err(NixieError::render("bitmap byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(bitmap.width as usize * bitmap.height as usize);
    for px in bitmap.rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
