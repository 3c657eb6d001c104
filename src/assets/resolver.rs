use crate::{
    assets::{
        bundle::{IMAGE_EXTENSION, ResourceBundle},
        decode::{Bitmap, decode_image},
    },
    clock::digits::Glyph,
    foundation::error::{NixieError, NixieResult},
    geometry::table::{ElementKind, RodIndex, TubeIndex},
};

/// Resolution tier of the bitmap assets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ScaleTag {
    #[serde(rename = "1x")]
    X1,
    #[serde(rename = "2x")]
    X2,
    #[serde(rename = "3x")]
    X3,
}

impl ScaleTag {
    pub fn as_str(self) -> &'static str {
        match self {
            ScaleTag::X1 => "1x",
            ScaleTag::X2 => "2x",
            ScaleTag::X3 => "3x",
        }
    }
}

impl std::fmt::Display for ScaleTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A loaded bitmap bound to the element it depicts.
///
/// Two elements are equal when their resource identities are equal.
#[derive(Clone, Debug)]
pub struct ResolvedElement {
    id: String,
    bitmap: Bitmap,
    kind: ElementKind,
}

impl ResolvedElement {
    /// Resource file name the bitmap was loaded from.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Same bitmap, drawn as a different element.
    fn rebind(&self, kind: ElementKind) -> Self {
        Self {
            id: self.id.clone(),
            bitmap: self.bitmap.clone(),
            kind,
        }
    }
}

impl PartialEq for ResolvedElement {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ResolvedElement {}

/// Load the bitmap for `resource_name` at `scale`.
///
/// Looks up `<resource_name>_<scale>.png`. Support rods may also come from the
/// scale-independent `<resource_name>.png`; every other element must exist for the
/// requested tier.
pub fn resolve(
    bundle: &dyn ResourceBundle,
    kind: ElementKind,
    resource_name: &str,
    scale: ScaleTag,
) -> NixieResult<ResolvedElement> {
    let mut candidates = vec![format!("{resource_name}_{scale}.{IMAGE_EXTENSION}")];
    if is_scale_independent(kind) {
        candidates.push(format!("{resource_name}.{IMAGE_EXTENSION}"));
    }

    for file_name in &candidates {
        let Some(bytes) = bundle.read(file_name)? else {
            continue;
        };
        let bitmap = decode_image(&bytes, file_name)?;
        tracing::debug!(
            id = %file_name,
            width = bitmap.width,
            height = bitmap.height,
            "resolved element"
        );
        return Ok(ResolvedElement {
            id: file_name.clone(),
            bitmap,
            kind,
        });
    }

    Err(NixieError::not_found(format!(
        "image element {} not found in {}",
        candidates.join(" or "),
        bundle.describe()
    )))
}

fn is_scale_independent(kind: ElementKind) -> bool {
    matches!(kind, ElementKind::SupportRod(_))
}

/// Which bitmap a draw command refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sprite {
    /// A lit digit.
    Glyph(Glyph),
    /// Tube with the cathodes unpowered.
    TubeOff(TubeIndex),
    /// Tube with the envelope glow off.
    TubeEnvelopeOff(TubeIndex),
    Colon,
    BasePlate,
    Rod(RodIndex),
}

impl Sprite {
    /// Resource base name, before the scale suffix and extension.
    pub fn resource_name(self) -> String {
        match self {
            Sprite::Glyph(g) => format!("tube_{}_0{}", g.tube().letter(), g.digit()),
            Sprite::TubeOff(t) => format!("tube_{}_off", t.letter()),
            Sprite::TubeEnvelopeOff(t) => format!("tube_{}_env_off", t.letter()),
            Sprite::Colon => "colon_on".to_string(),
            Sprite::BasePlate => "base_default".to_string(),
            Sprite::Rod(_) => "rod".to_string(),
        }
    }

    pub fn kind(self) -> ElementKind {
        match self {
            Sprite::Glyph(g) => ElementKind::Tube(g.tube()),
            Sprite::TubeOff(t) | Sprite::TubeEnvelopeOff(t) => ElementKind::Tube(t),
            Sprite::Colon => ElementKind::Colon,
            Sprite::BasePlate => ElementKind::BasePlate,
            Sprite::Rod(r) => ElementKind::SupportRod(r),
        }
    }

    /// Every sprite a complete element set contains.
    pub fn all() -> Vec<Sprite> {
        let mut out = Vec::new();
        for tube in TubeIndex::ALL {
            let glyphs = (0..tube.glyph_count()).filter_map(|d| Glyph::new(tube, d));
            out.extend(glyphs.map(Sprite::Glyph));
            out.push(Sprite::TubeEnvelopeOff(tube));
            out.push(Sprite::TubeOff(tube));
        }
        out.push(Sprite::Colon);
        out.push(Sprite::BasePlate);
        out.extend(RodIndex::ALL.into_iter().map(Sprite::Rod));
        out
    }
}

#[derive(Clone, Debug)]
struct TubeElements {
    digits: Vec<ResolvedElement>,
    env_off: ResolvedElement,
    off: ResolvedElement,
}

/// Every bitmap one clock face needs, for a single scale tier.
#[derive(Clone, Debug)]
pub struct ElementSet {
    scale: ScaleTag,
    tubes: [TubeElements; 4],
    colon: ResolvedElement,
    base: ResolvedElement,
    rods: [ResolvedElement; 3],
}

impl ElementSet {
    /// Load the full set from `bundle`. Any missing or undecodable bitmap fails the whole
    /// load; no partial set is ever returned.
    #[tracing::instrument(skip(bundle), fields(bundle = %bundle.describe()))]
    pub fn load(bundle: &dyn ResourceBundle, scale: ScaleTag) -> NixieResult<Self> {
        let load = |sprite: Sprite| resolve(bundle, sprite.kind(), &sprite.resource_name(), scale);

        let tube = |t: TubeIndex| -> NixieResult<TubeElements> {
            let digits = (0..t.glyph_count())
                .filter_map(|d| Glyph::new(t, d))
                .map(|g| load(Sprite::Glyph(g)))
                .collect::<NixieResult<Vec<_>>>()?;
            Ok(TubeElements {
                digits,
                env_off: load(Sprite::TubeEnvelopeOff(t))?,
                off: load(Sprite::TubeOff(t))?,
            })
        };

        let tubes = [
            tube(TubeIndex::A)?,
            tube(TubeIndex::B)?,
            tube(TubeIndex::C)?,
            tube(TubeIndex::D)?,
        ];
        let colon = load(Sprite::Colon)?;
        let base = load(Sprite::BasePlate)?;
        let rod = load(Sprite::Rod(RodIndex::A))?;
        let rods = [
            rod.clone(),
            rod.rebind(ElementKind::SupportRod(RodIndex::B)),
            rod.rebind(ElementKind::SupportRod(RodIndex::C)),
        ];

        Ok(Self {
            scale,
            tubes,
            colon,
            base,
            rods,
        })
    }

    pub fn scale(&self) -> ScaleTag {
        self.scale
    }

    pub fn get(&self, sprite: Sprite) -> NixieResult<&ResolvedElement> {
        let element = match sprite {
            Sprite::Glyph(g) => self.tubes[tube_slot(g.tube())]
                .digits
                .get(usize::from(g.digit())),
            Sprite::TubeOff(t) => Some(&self.tubes[tube_slot(t)].off),
            Sprite::TubeEnvelopeOff(t) => Some(&self.tubes[tube_slot(t)].env_off),
            Sprite::Colon => Some(&self.colon),
            Sprite::BasePlate => Some(&self.base),
            Sprite::Rod(r) => Some(&self.rods[rod_slot(r)]),
        };
        element.ok_or_else(|| {
            NixieError::validation(format!("no element for {}", sprite.resource_name()))
        })
    }
}

fn tube_slot(t: TubeIndex) -> usize {
    match t {
        TubeIndex::A => 0,
        TubeIndex::B => 1,
        TubeIndex::C => 2,
        TubeIndex::D => 3,
    }
}

fn rod_slot(r: RodIndex) -> usize {
    match r {
        RodIndex::A => 0,
        RodIndex::B => 1,
        RodIndex::C => 2,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resolver.rs"]
mod tests;
