use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;

use crate::foundation::{
    core::Size,
    error::{NixieError, NixieResult},
};

/// Where the overlay and placeholder font comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontSource {
    /// A TTF/OTF/TTC file.
    File(PathBuf),
    /// The system's default sans-serif face.
    System,
}

/// Raw font bytes plus the face index within them.
#[derive(Clone, Debug)]
pub struct LoadedFont {
    pub bytes: Arc<Vec<u8>>,
    pub index: u32,
    /// Where the bytes came from, for diagnostics.
    pub origin: String,
}

/// Resolve `source` to font bytes.
///
/// A configured file that cannot be read is an error. No system sans-serif face is not:
/// text is then skipped and `Ok(None)` is returned.
pub fn load_font(source: &FontSource) -> NixieResult<Option<LoadedFont>> {
    match source {
        FontSource::File(path) => load_font_file(path).map(Some),
        FontSource::System => Ok(load_system_sans_serif()),
    }
}

fn load_font_file(path: &Path) -> NixieResult<LoadedFont> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("read font file '{}'", path.display()))?;
    if bytes.is_empty() {
        return Err(NixieError::config(format!(
            "font file '{}' is empty",
            path.display()
        )));
    }
    Ok(LoadedFont {
        bytes: Arc::new(bytes),
        index: 0,
        origin: path.display().to_string(),
    })
}

fn load_system_sans_serif() -> Option<LoadedFont> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();

    let query = usvg::fontdb::Query {
        families: &[usvg::fontdb::Family::SansSerif],
        weight: usvg::fontdb::Weight::NORMAL,
        stretch: usvg::fontdb::Stretch::Normal,
        style: usvg::fontdb::Style::Normal,
    };
    let Some(id) = db.query(&query) else {
        tracing::debug!(faces = db.len(), "no system sans-serif face");
        return None;
    };
    let origin = db
        .face(id)
        .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
        .unwrap_or_else(|| "system sans-serif".to_string());
    let (bytes, index) = db.with_face_data(id, |data, index| (data.to_vec(), index))?;
    tracing::debug!(family = %origin, "resolved system font");
    Some(LoadedFont {
        bytes: Arc::new(bytes),
        index,
        origin,
    })
}

/// RGBA8 brush color used by Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Builds Parley layouts with one registered font.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
}

impl TextLayoutEngine {
    pub(crate) fn new(font: &LoadedFont) -> NixieResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font.bytes.as_ref().clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            NixieError::render(format!("no font families registered from {}", font.origin))
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| NixieError::render("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
        })
    }

    pub(crate) fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Shape `text`, wrapping at `max_width_px` when given.
    pub(crate) fn layout_plain(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
        max_width_px: Option<f32>,
    ) -> NixieResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(NixieError::validation("text size must be finite and > 0"));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        if let Some(w) = max_width_px {
            layout.break_all_lines(Some(w));
            layout.align(
                Some(w),
                parley::Alignment::Start,
                parley::AlignmentOptions::default(),
            );
        } else {
            layout.break_all_lines(None);
        }

        Ok(layout)
    }
}

/// Bounding size of a laid-out block.
pub(crate) fn measure(layout: &parley::Layout<TextBrushRgba8>) -> Size {
    let mut w = 0.0f64;
    let mut h = 0.0f64;
    for line in layout.lines() {
        let m = line.metrics();
        w = w.max(f64::from(m.advance));
        h += f64::from(m.ascent + m.descent + m.leading);
    }
    Size::new(w, h)
}
