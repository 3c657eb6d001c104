//! Nixie is a renderer for a decorative Nixie tube clock face.
//!
//! The face is composited from pre-rendered bitmaps (digit tubes, colon, base plate,
//! support rods) laid out proportionally on an 81:38 canvas:
//!
//! - Load an [`ElementSet`] from a [`ResourceBundle`] (or fall back to a [`ClockView`]
//!   placeholder)
//! - Turn a [`ClockReading`] into a [`DrawList`] with a [`LayoutEngine`]
//! - Rasterize it with the [`CpuBackend`] into a [`FrameRGBA`]
//!
//! [`MinuteTicker`] and [`LocaleObserver`] drive redraws once per wall-clock minute and
//! track the 12/24-hour preference.
#![forbid(unsafe_code)]

mod assets;
mod clock;
mod config;
mod foundation;
mod geometry;
mod layout;
mod render;

pub use crate::assets::bundle::{DirBundle, IMAGE_EXTENSION, MemoryBundle, ResourceBundle};
pub use crate::assets::decode::{Bitmap, decode_image};
pub use crate::assets::resolver::{ElementSet, ResolvedElement, ScaleTag, Sprite, resolve};
pub use crate::clock::digits::{ClockReading, DigitSelection, Glyph, Meridiem, map_digits};
pub use crate::clock::hour_cycle::{
    EnvLocale, FixedLocale, HourCycle, HourCyclePreference, LocaleObserver, LocaleSource,
    Subscription, hour_cycle_for_locale,
};
pub use crate::clock::schedule::{
    FixedClock, MinuteTicker, Sleeper, SystemClock, ThreadSleeper, Tick, TimeSource,
    WIDGET_TIMELINE_ENTRIES, minute_start, timeline, until_next_minute,
};
pub use crate::config::{DEFAULT_ASSET_DIR, NixieConfig};
pub use crate::foundation::core::{Canvas, Point, Rect, Rgba8Premul, Size};
pub use crate::foundation::error::{NixieError, NixieResult};
pub use crate::geometry::table::{
    CANVAS_ASPECT_RATIO, ElementKind, NormalizedGeometry, REFERENCE_CANVAS, RodIndex, TubeIndex,
};
pub use crate::layout::container::{Container, ContainerFrame};
pub use crate::layout::engine::{
    DrawCommand, DrawList, DrawPass, LayoutEngine, PassKind, PowerState, element_rect, rod_rect,
};
pub use crate::render::backend::{FrameRGBA, RenderSettings};
pub use crate::render::cpu::CpuBackend;
pub use crate::render::pipeline::{ClockView, render_frame};
pub use crate::render::text::{FontSource, LoadedFont, load_font};
