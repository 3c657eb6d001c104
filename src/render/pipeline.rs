use crate::{
    assets::{bundle::ResourceBundle, resolver::ElementSet},
    clock::{digits::ClockReading, hour_cycle::HourCycle},
    foundation::{core::Size, error::NixieResult},
    layout::{container::Container, engine::LayoutEngine},
    render::{backend::FrameRGBA, cpu::CpuBackend},
};

/// What a container shows: the face, or a message when its bitmaps are unusable.
#[derive(Clone, Debug)]
pub enum ClockView {
    Face(ElementSet),
    Placeholder(String),
}

impl ClockView {
    /// Load the element set for `container`.
    ///
    /// Missing or undecodable bitmaps degrade to the container's placeholder message; any
    /// other failure (an unreadable bundle directory, for instance) is returned.
    pub fn load(bundle: &dyn ResourceBundle, container: Container) -> NixieResult<Self> {
        match ElementSet::load(bundle, container.scale()) {
            Ok(set) => Ok(ClockView::Face(set)),
            Err(e) if e.is_resource_error() => {
                tracing::warn!(error = %e, ?container, "showing placeholder");
                Ok(ClockView::Placeholder(
                    container.placeholder_message().to_string(),
                ))
            }
            Err(e) => Err(e),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, ClockView::Placeholder(_))
    }
}

/// Lay out and rasterize one frame.
///
/// Pipeline:
/// 1. [`LayoutEngine::render`] builds the draw list
/// 2. [`CpuBackend::render`] executes it against the loaded bitmaps
///
/// A placeholder view skips layout and draws its message instead.
pub fn render_frame(
    engine: &LayoutEngine,
    view: &ClockView,
    backend: &mut CpuBackend,
    size: Size,
    reading: ClockReading,
    hour_cycle: HourCycle,
) -> NixieResult<FrameRGBA> {
    match view {
        ClockView::Face(elements) => {
            let list = engine.render(size, reading, hour_cycle)?;
            backend.render(&list, elements)
        }
        ClockView::Placeholder(message) => {
            backend.render_message(size, message, engine.container().meridiem_font_size())
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
