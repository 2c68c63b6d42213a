/// A straight (non-premultiplied) sRGB color with 8 bits per channel, as stored in label files.
#[repr(transparent)]
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, Debug, Default, bytemuck::Pod, bytemuck::Zeroable,
)]
pub struct Color(pub [u8; 4]);
impl Color {
    pub const TRANSPARENT: Self = Self([0; 4]);
    pub const WHITE: Self = Self([255; 4]);
    pub const BLACK: Self = Self([0, 0, 0, 255]);
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }
    #[must_use]
    pub const fn alpha(self) -> u8 {
        self.0[3]
    }
    /// The same color with alpha forced to fully opaque.
    #[must_use]
    pub const fn opaque(self) -> Self {
        let [r, g, b, _] = self.0;
        Self([r, g, b, 255])
    }
    #[must_use]
    pub const fn is_transparent(self) -> bool {
        self.0[3] == 0
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("expected 3, 6, or 8 hex digits after '#', found {0}")]
    BadLength(usize),
    #[error("invalid hex digit")]
    BadDigit,
    #[error("unknown color name {0:?}")]
    UnknownName(String),
}

/// Names accepted in class files besides hex notation.
const NAMED: &[(&str, Color)] = &[
    ("black", Color::BLACK),
    ("white", Color::WHITE),
    ("red", Color::rgb(255, 0, 0)),
    ("green", Color::rgb(0, 128, 0)),
    ("lime", Color::rgb(0, 255, 0)),
    ("blue", Color::rgb(0, 0, 255)),
    ("yellow", Color::rgb(255, 255, 0)),
    ("cyan", Color::rgb(0, 255, 255)),
    ("magenta", Color::rgb(255, 0, 255)),
    ("orange", Color::rgb(255, 165, 0)),
    ("purple", Color::rgb(128, 0, 128)),
    ("gray", Color::rgb(128, 128, 128)),
    ("grey", Color::rgb(128, 128, 128)),
    ("transparent", Color::TRANSPARENT),
];

/// Parse `#RGB`, `#RRGGBB`, `#AARRGGBB` (alpha first!), or a handful of common names.
impl std::str::FromStr for Color {
    type Err = ColorParseError;
    fn from_str(str: &str) -> Result<Self, Self::Err> {
        let str = str.trim();
        let Some(hex) = str.strip_prefix('#') else {
            let lower = str.to_ascii_lowercase();
            return NAMED
                .iter()
                .find_map(|&(name, color)| (name == lower).then_some(color))
                .ok_or(ColorParseError::UnknownName(lower));
        };
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::BadDigit);
        }
        let byte = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| ColorParseError::BadDigit);
        match hex.len() {
            3 => {
                // Each digit is doubled, #abc == #aabbcc
                let mut channels = [0u8; 3];
                for (channel, digit) in channels.iter_mut().zip(hex.chars()) {
                    let nibble = digit.to_digit(16).ok_or(ColorParseError::BadDigit)? as u8;
                    *channel = nibble << 4 | nibble;
                }
                let [r, g, b] = channels;
                Ok(Self::rgb(r, g, b))
            }
            6 => Ok(Self::rgb(byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?)),
            8 => Ok(Self::rgba(
                byte(&hex[2..4])?,
                byte(&hex[4..6])?,
                byte(&hex[6..8])?,
                byte(&hex[0..2])?,
            )),
            len => Err(ColorParseError::BadLength(len)),
        }
    }
}
impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [r, g, b, a] = self.0;
        if a == 255 {
            write!(f, "#{r:02x}{g:02x}{b:02x}")
        } else {
            write!(f, "#{a:02x}{r:02x}{g:02x}{b:02x}")
        }
    }
}
