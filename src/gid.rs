//! Global tile ids and the flip/rotation flags packed into their top bits.

/// Horizontal flip flag (bit 31).
pub const FLIP_H: u32 = 0x8000_0000;
/// Vertical flip flag (bit 30).
pub const FLIP_V: u32 = 0x4000_0000;
/// Diagonal flip flag (bit 29).
pub const FLIP_D: u32 = 0x2000_0000;

/// Clockwise rotation applied to a cell when it is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    /// No rotation.
    #[default]
    None,
    /// 90 degrees.
    Quarter,
    /// 180 degrees.
    Half,
    /// 270 degrees.
    ThreeQuarters,
}

impl Rotation {
    /// Rotation in whole degrees.
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::None => 0,
            Rotation::Quarter => 90,
            Rotation::Half => 180,
            Rotation::ThreeQuarters => 270,
        }
    }

    /// Rotation in radians.
    pub fn radians(self) -> f32 {
        f32::from(self.degrees()).to_radians()
    }
}

/// The 3-bit flip code carried by a raw gid: bit 4 is horizontal, bit 2
/// vertical, bit 1 diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FlipCode(u8);

impl FlipCode {
    /// No flags set.
    pub const NONE: FlipCode = FlipCode(0);

    /// Builds a code from its 3-bit value, `None` when out of range.
    pub fn new(bits: u8) -> Option<Self> {
        (bits < 8).then_some(FlipCode(bits))
    }

    /// The raw 3-bit value.
    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Whether no flag is set.
    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Rotation and "mirrored after rotation" flag this code stands for.
    pub fn transform(self) -> (Rotation, bool) {
        match self.0 {
            1 => (Rotation::ThreeQuarters, true),
            2 => (Rotation::Half, true),
            3 => (Rotation::ThreeQuarters, false),
            4 => (Rotation::None, true),
            5 => (Rotation::Quarter, false),
            6 => (Rotation::Half, false),
            7 => (Rotation::Quarter, true),
            _ => (Rotation::None, false),
        }
    }

    /// Inverse of [`FlipCode::transform`].
    pub fn from_transform(rotation: Rotation, flipped: bool) -> Self {
        let bits = match (rotation, flipped) {
            (Rotation::None, false) => 0,
            (Rotation::ThreeQuarters, true) => 1,
            (Rotation::Half, true) => 2,
            (Rotation::ThreeQuarters, false) => 3,
            (Rotation::None, true) => 4,
            (Rotation::Quarter, false) => 5,
            (Rotation::Half, false) => 6,
            (Rotation::Quarter, true) => 7,
        };
        FlipCode(bits)
    }
}

/// A raw 32-bit gid as stored in a tile stream, flags included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileGid(pub u32);

impl TileGid {
    /// The stored value, flags included.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Strips the flag bits.
    ///
    /// Each threshold is compared with `>` and the bit is subtracted when it
    /// fires, so a value sitting exactly on a flag bit keeps it as part of the id.
    pub fn split(self) -> (u32, FlipCode) {
        let mut gid = self.0;
        let mut code = 0u8;
        if gid > FLIP_D {
            if gid > FLIP_H {
                gid -= FLIP_H;
                code += 4;
            }
            if gid > FLIP_V {
                gid -= FLIP_V;
                code += 2;
            }
            if gid > FLIP_D {
                gid -= FLIP_D;
                code += 1;
            }
        }
        (gid, FlipCode(code))
    }

    /// The id with flags removed.
    #[inline]
    pub fn clean(self) -> u32 {
        self.split().0
    }

    /// The flags alone.
    #[inline]
    pub fn flip_code(self) -> FlipCode {
        self.split().1
    }

    /// Packs an id and a flip code back into a raw gid, `None` when the
    /// flags do not fit above `id`.
    pub fn encode(id: u32, code: FlipCode) -> Option<Self> {
        let mut raw = id;
        if code.0 & 4 != 0 {
            raw = raw.checked_add(FLIP_H)?;
        }
        if code.0 & 2 != 0 {
            raw = raw.checked_add(FLIP_V)?;
        }
        if code.0 & 1 != 0 {
            raw = raw.checked_add(FLIP_D)?;
        }
        Some(TileGid(raw))
    }
}
