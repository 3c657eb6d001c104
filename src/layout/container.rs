use crate::{
    assets::resolver::ScaleTag,
    foundation::{
        core::{Rect, Size},
        error::{NixieError, NixieResult},
    },
    geometry::table::CANVAS_ASPECT_RATIO,
};

/// Widest primary canvas the screen saver draws, in points.
pub const SCREEN_SAVER_MAX_WIDTH: f64 = 1160.0;

/// Hosting context the face is drawn into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Container {
    #[default]
    WidgetMedium,
    WidgetExtraLarge,
    ScreenSaver,
}

/// Where the two drawing passes land inside a container.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ContainerFrame {
    /// The 81:38 clock face itself.
    pub primary: Rect,
    /// Strip directly beneath the face holding the support rods. May be empty.
    pub rods: Rect,
}

impl Container {
    /// Bitmap tier the container loads.
    pub fn scale(self) -> ScaleTag {
        match self {
            Container::WidgetMedium => ScaleTag::X1,
            Container::WidgetExtraLarge => ScaleTag::X2,
            Container::ScreenSaver => ScaleTag::X3,
        }
    }

    /// Point size of the AM/PM overlay.
    pub fn meridiem_font_size(self) -> f64 {
        match self {
            Container::WidgetMedium => 14.0,
            Container::WidgetExtraLarge => 18.0,
            Container::ScreenSaver => 20.0,
        }
    }

    /// Primary canvas height below which the AM/PM overlay is hidden.
    pub fn meridiem_min_height(self) -> Option<f64> {
        match self {
            Container::ScreenSaver => Some(150.0),
            Container::WidgetMedium | Container::WidgetExtraLarge => None,
        }
    }

    /// Text shown instead of the face when the element set fails to load.
    pub fn placeholder_message(self) -> &'static str {
        match self {
            Container::ScreenSaver => {
                "Assets are missing for the Nixie screen saver. Please reinstall the bundle."
            }
            Container::WidgetMedium | Container::WidgetExtraLarge => "Missing assets",
        }
    }

    fn top_padding(self) -> f64 {
        match self {
            Container::WidgetMedium => 8.0,
            Container::WidgetExtraLarge => 20.0,
            Container::ScreenSaver => 0.0,
        }
    }

    /// Width:height of the whole widget, rods included.
    fn widget_aspect(self) -> Option<f64> {
        match self {
            Container::WidgetMedium => Some(27.0 / 14.2),
            Container::WidgetExtraLarge => Some(27.0 / 14.5),
            Container::ScreenSaver => None,
        }
    }

    /// Size used when the caller gives no explicit dimensions.
    pub fn default_size(self) -> Size {
        match self {
            Container::WidgetMedium => self.natural_size(364.0),
            Container::WidgetExtraLarge => self.natural_size(715.0),
            Container::ScreenSaver => Size::new(1440.0, 900.0),
        }
    }

    /// Container size for a given width.
    ///
    /// Widgets derive their height from their fixed aspect ratio. The screen saver fills
    /// whatever screen it runs on, so it is given just enough height for the face.
    pub fn natural_size(self, width: f64) -> Size {
        match self.widget_aspect() {
            Some(aspect) => Size::new(width, (width / aspect).round()),
            None => {
                let face_width = width.min(SCREEN_SAVER_MAX_WIDTH);
                Size::new(width, (face_width / CANVAS_ASPECT_RATIO).ceil())
            }
        }
    }

    /// Place the primary canvas and rod strip inside a container of `size`.
    pub fn frame(self, size: Size) -> NixieResult<ContainerFrame> {
        if !(size.width.is_finite() && size.height.is_finite())
            || size.width <= 0.0
            || size.height <= 0.0
        {
            return Err(NixieError::validation(format!(
                "container size must be finite and positive, got {}x{}",
                size.width, size.height
            )));
        }

        let (x, width) = match self {
            Container::ScreenSaver => {
                let width = size.width.min(SCREEN_SAVER_MAX_WIDTH);
                ((size.width - width) / 2.0, width)
            }
            Container::WidgetMedium | Container::WidgetExtraLarge => (0.0, size.width),
        };
        let height = width / CANVAS_ASPECT_RATIO;
        let y = match self {
            Container::ScreenSaver => ((size.height - height) / 2.0).max(0.0),
            Container::WidgetMedium | Container::WidgetExtraLarge => self.top_padding(),
        };

        let primary = Rect::new(x, y, x + width, y + height);
        let strip_top = primary.y1.min(size.height);
        let rods = Rect::new(x, strip_top, x + width, size.height);
        Ok(ContainerFrame { primary, rods })
    }
}

impl std::str::FromStr for Container {
    type Err = NixieError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "medium" | "widget_medium" => Ok(Container::WidgetMedium),
            "xl" | "extra_large" | "widget_extra_large" => Ok(Container::WidgetExtraLarge),
            "screensaver" | "screen_saver" => Ok(Container::ScreenSaver),
            other => Err(NixieError::config(format!(
                "unknown container '{other}' (expected medium, extra-large or screen-saver)"
            ))),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/container.rs"]
mod tests;
