use crate::foundation::core::{Point, Size};

/// Resolution of the reference artwork every normalized value was measured against.
pub const REFERENCE_CANVAS: Size = Size::new(4050.0, 1900.0);

/// Width:height ratio of the primary canvas (81:38).
pub const CANVAS_ASPECT_RATIO: f64 = 81.0 / 38.0;

// Element sizes relative to the 4050x1900 reference.
const TUBE_SIZE: Size = Size::new(0.18059, 0.95936); // 731.4 x 1822.8
const COLON_SIZE: Size = Size::new(0.06469, 0.74553); // 262 x 1416.5
const BASE_SIZE: Size = Size::new(1.0, 0.08368); // 4050 x 159
const ROD_SIZE: Size = Size::new(0.02345, 1.0); // 95 wide, height unused

// Centers measured by overlaying the individual layers on the reference artwork.
const BASE_CENTER: Point = Point::new(0.5, 0.95832);
const COLON_CENTER: Point = Point::new(0.5, 0.62615);
const TUBE_A_CENTER: Point = Point::new(0.14739, 0.48601);
const TUBE_B_CENTER: Point = Point::new(0.34511, 0.48601);
const TUBE_C_CENTER: Point = Point::new(0.65488, 0.48601);
const TUBE_D_CENTER: Point = Point::new(0.85260, 0.48601);
const ROD_A_CENTER: Point = Point::new(0.05913, 0.0);
const ROD_B_CENTER: Point = Point::new(0.5, 0.0);
const ROD_C_CENTER: Point = Point::new(0.94111, 0.0);

/// One of the four digit tubes, left to right.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TubeIndex {
    A,
    B,
    C,
    D,
}

impl TubeIndex {
    pub const ALL: [TubeIndex; 4] = [TubeIndex::A, TubeIndex::B, TubeIndex::C, TubeIndex::D];

    /// Lowercase letter used in resource names (`tube_a_...`).
    pub fn letter(self) -> char {
        match self {
            TubeIndex::A => 'a',
            TubeIndex::B => 'b',
            TubeIndex::C => 'c',
            TubeIndex::D => 'd',
        }
    }

    /// Number of digit glyphs physically present in the tube.
    ///
    /// Tube A carries the hour tens digit (0-2) and tube C the minute tens digit (0-5).
    pub fn glyph_count(self) -> u8 {
        match self {
            TubeIndex::A => 3,
            TubeIndex::B => 10,
            TubeIndex::C => 6,
            TubeIndex::D => 10,
        }
    }
}

/// One of the three vertical support rods, left to right.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RodIndex {
    A,
    B,
    C,
}

impl RodIndex {
    pub const ALL: [RodIndex; 3] = [RodIndex::A, RodIndex::B, RodIndex::C];
}

/// Kind of drawable element; the key into the geometry table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Tube(TubeIndex),
    Colon,
    BasePlate,
    SupportRod(RodIndex),
}

/// Center and size of an element as fractions of the canvas.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NormalizedGeometry {
    pub center: Point,
    pub size: Size,
}

impl ElementKind {
    pub fn relative_size(self) -> Size {
        match self {
            ElementKind::Tube(_) => TUBE_SIZE,
            ElementKind::Colon => COLON_SIZE,
            ElementKind::BasePlate => BASE_SIZE,
            ElementKind::SupportRod(_) => ROD_SIZE,
        }
    }

    pub fn relative_center(self) -> Point {
        match self {
            ElementKind::Tube(idx) => match idx {
                TubeIndex::A => TUBE_A_CENTER,
                TubeIndex::B => TUBE_B_CENTER,
                TubeIndex::C => TUBE_C_CENTER,
                TubeIndex::D => TUBE_D_CENTER,
            },
            ElementKind::SupportRod(idx) => match idx {
                RodIndex::A => ROD_A_CENTER,
                RodIndex::B => ROD_B_CENTER,
                RodIndex::C => ROD_C_CENTER,
            },
            ElementKind::Colon => COLON_CENTER,
            ElementKind::BasePlate => BASE_CENTER,
        }
    }

    pub fn geometry(self) -> NormalizedGeometry {
        NormalizedGeometry {
            center: self.relative_center(),
            size: self.relative_size(),
        }
    }

    /// Rods ignore their normalized height and span the whole canvas they are drawn on.
    pub fn is_full_bleed(self) -> bool {
        matches!(self, ElementKind::SupportRod(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/table.rs"]
mod tests;
