use crate::{
    assets::resolver::Sprite,
    clock::{
        digits::{ClockReading, map_digits},
        hour_cycle::HourCycle,
    },
    foundation::{
        core::{Point, Rect, Size},
        error::{NixieError, NixieResult},
    },
    geometry::table::{ElementKind, RodIndex},
    layout::container::Container,
};

/// Relative position of the AM/PM overlay's center on the primary canvas.
pub const MERIDIEM_CENTER: Point = Point::new(0.5, 0.12);

/// Opacity of the AM/PM overlay.
pub const MERIDIEM_OPACITY: f32 = 0.35;

/// Which bitmap variant the tubes show.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerState {
    /// Digits lit.
    #[default]
    On,
    /// Tubes dark.
    Off,
    /// Digits dark, envelope glow off too.
    EnvelopeOff,
}

impl std::str::FromStr for PowerState {
    type Err = NixieError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "on" => Ok(PowerState::On),
            "off" => Ok(PowerState::Off),
            "env_off" | "envelope_off" => Ok(PowerState::EnvelopeOff),
            other => Err(NixieError::config(format!(
                "unknown power state '{other}' (expected on, off or env-off)"
            ))),
        }
    }
}

/// Absolute rectangle of `kind` on a canvas of `canvas` size.
///
/// Elements are center-anchored: the rectangle's center lands on the relative center scaled
/// to the canvas. Support rods keep their proportional width but always span the full
/// canvas height from the top edge.
pub fn element_rect(canvas: Size, kind: ElementKind) -> Rect {
    let geom = kind.geometry();
    let width = geom.size.width * canvas.width;
    let cx = geom.center.x * canvas.width;

    if kind.is_full_bleed() {
        let x0 = cx - width / 2.0;
        return Rect::new(x0, 0.0, x0 + width, canvas.height);
    }

    let height = geom.size.height * canvas.height;
    let cy = geom.center.y * canvas.height;
    Rect::from_center_size(Point::new(cx, cy), Size::new(width, height))
}

/// Rectangle of rod `rod` inside a rod strip of `strip` size.
pub fn rod_rect(strip: Size, rod: RodIndex) -> Rect {
    element_rect(strip, ElementKind::SupportRod(rod))
}

/// One drawing instruction, in coordinates local to its pass.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    /// Scale a bitmap into `rect`.
    Image {
        sprite: Sprite,
        rect: Rect,
        opacity: f32,
    },
    /// Draw a single line of text centered on `center`.
    Text {
        text: String,
        center: Point,
        font_size: f64,
        opacity: f32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassKind {
    /// The clock face: tubes, overlay, colon, base plate.
    Primary,
    /// Support rods beneath the face.
    Rods,
}

/// A group of commands drawn into one region of the container.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DrawPass {
    pub kind: PassKind,
    /// Placement of the pass inside the container; command coordinates are relative to
    /// its top-left corner.
    pub region: Rect,
    pub commands: Vec<DrawCommand>,
}

/// Everything needed to draw one frame of the face, in paint order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DrawList {
    pub container: Container,
    /// Size of the whole container.
    pub canvas: Size,
    pub reading: ClockReading,
    pub hour_cycle: HourCycle,
    pub passes: Vec<DrawPass>,
}

impl DrawList {
    pub fn command_count(&self) -> usize {
        self.passes.iter().map(|p| p.commands.len()).sum()
    }

    pub fn pass(&self, kind: PassKind) -> Option<&DrawPass> {
        self.passes.iter().find(|p| p.kind == kind)
    }
}

/// Turns a time reading into a [`DrawList`] for one container.
///
/// Rendering is pure: the same inputs always produce the same list, and nothing is loaded
/// or drawn here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayoutEngine {
    container: Container,
    power: PowerState,
}

impl LayoutEngine {
    pub fn new(container: Container) -> Self {
        Self {
            container,
            power: PowerState::On,
        }
    }

    pub fn with_power(mut self, power: PowerState) -> Self {
        self.power = power;
        self
    }

    pub fn container(&self) -> Container {
        self.container
    }

    pub fn power(&self) -> PowerState {
        self.power
    }

    /// Lay out the face for `reading` in a container of `container_size`.
    pub fn render(
        &self,
        container_size: Size,
        reading: ClockReading,
        hour_cycle: HourCycle,
    ) -> NixieResult<DrawList> {
        let frame = self.container.frame(container_size)?;

        let mut passes = vec![DrawPass {
            kind: PassKind::Primary,
            region: frame.primary,
            commands: self.primary_commands(frame.primary.size(), reading, hour_cycle),
        }];

        let strip = frame.rods.size();
        if strip.width > 0.0 && strip.height > 0.0 {
            passes.push(DrawPass {
                kind: PassKind::Rods,
                region: frame.rods,
                commands: RodIndex::ALL
                    .into_iter()
                    .map(|rod| DrawCommand::Image {
                        sprite: Sprite::Rod(rod),
                        rect: rod_rect(strip, rod),
                        opacity: 1.0,
                    })
                    .collect(),
            });
        }

        Ok(DrawList {
            container: self.container,
            canvas: container_size,
            reading,
            hour_cycle,
            passes,
        })
    }

    fn primary_commands(
        &self,
        canvas: Size,
        reading: ClockReading,
        hour_cycle: HourCycle,
    ) -> Vec<DrawCommand> {
        let selection = map_digits(reading.hour(), reading.minute(), hour_cycle.uses_24_hour());
        let mut commands = Vec::with_capacity(8);

        for glyph in selection.glyphs() {
            let sprite = match self.power {
                PowerState::On => Sprite::Glyph(glyph),
                PowerState::Off => Sprite::TubeOff(glyph.tube()),
                PowerState::EnvelopeOff => Sprite::TubeEnvelopeOff(glyph.tube()),
            };
            commands.push(DrawCommand::Image {
                sprite,
                rect: element_rect(canvas, sprite.kind()),
                opacity: 1.0,
            });
        }

        let tall_enough = self
            .container
            .meridiem_min_height()
            .is_none_or(|min| canvas.height >= min);
        if let Some(meridiem) = selection.meridiem
            && tall_enough
        {
            commands.push(DrawCommand::Text {
                text: meridiem.label().to_string(),
                center: Point::new(
                    MERIDIEM_CENTER.x * canvas.width,
                    MERIDIEM_CENTER.y * canvas.height,
                ),
                font_size: self.container.meridiem_font_size(),
                opacity: MERIDIEM_OPACITY,
            });
        }

        for sprite in [Sprite::Colon, Sprite::BasePlate] {
            commands.push(DrawCommand::Image {
                sprite,
                rect: element_rect(canvas, sprite.kind()),
                opacity: 1.0,
            });
        }

        commands
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/engine.rs"]
mod tests;
