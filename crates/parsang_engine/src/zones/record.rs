use std::fmt;

pub type Rgb = [u8; 3];

pub const BACKGROUND_RGB: Rgb = [40, 40, 40];
const MALFORMED_HEX_RGB: Rgb = [255, 255, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaletteToken {
    Visited,
    Current,
    Cached,
    Grey,
    LightGrey,
    Magenta,
    White,
    Black,
}

impl PaletteToken {
    const ALL: [PaletteToken; 8] = [
        PaletteToken::Visited,
        PaletteToken::Current,
        PaletteToken::Cached,
        PaletteToken::Grey,
        PaletteToken::LightGrey,
        PaletteToken::Magenta,
        PaletteToken::White,
        PaletteToken::Black,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|token| token.name().eq_ignore_ascii_case(name))
    }

    pub const fn name(self) -> &'static str {
        match self {
            PaletteToken::Visited => "visited",
            PaletteToken::Current => "current",
            PaletteToken::Cached => "cached",
            PaletteToken::Grey => "grey",
            PaletteToken::LightGrey => "lightgrey",
            PaletteToken::Magenta => "magenta",
            PaletteToken::White => "white",
            PaletteToken::Black => "black",
        }
    }

    pub const fn rgb(self) -> Rgb {
        match self {
            PaletteToken::Visited | PaletteToken::Grey => [128, 128, 128],
            PaletteToken::Current | PaletteToken::Magenta => [255, 0, 255],
            PaletteToken::Cached | PaletteToken::LightGrey => [211, 211, 211],
            PaletteToken::White => [255, 255, 255],
            PaletteToken::Black => [0, 0, 0],
        }
    }
}

/// Color attached to a zone: a palette token, a `#rrggbb` literal, or text we keep but cannot draw.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ZoneColor {
    Token(PaletteToken),
    Rgb(Rgb),
    Unrecognized(String),
}

impl ZoneColor {
    pub const VISITED: ZoneColor = ZoneColor::Token(PaletteToken::Visited);
    pub const CURRENT: ZoneColor = ZoneColor::Token(PaletteToken::Current);
    pub const CACHED: ZoneColor = ZoneColor::Token(PaletteToken::Cached);

    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(hex) = text.strip_prefix('#') {
            if let Some(rgb) = parse_hex_rgb(hex) {
                return ZoneColor::Rgb(rgb);
            }
        } else if let Some(token) = PaletteToken::from_name(text) {
            return ZoneColor::Token(token);
        }
        ZoneColor::Unrecognized(text.to_string())
    }

    pub fn resolve(&self) -> Rgb {
        match self {
            ZoneColor::Token(token) => token.rgb(),
            ZoneColor::Rgb(rgb) => *rgb,
            ZoneColor::Unrecognized(text) if text.starts_with('#') => MALFORMED_HEX_RGB,
            ZoneColor::Unrecognized(_) => BACKGROUND_RGB,
        }
    }
}

fn parse_hex_rgb(hex: &str) -> Option<Rgb> {
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |start: usize| u8::from_str_radix(&hex[start..start + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

impl fmt::Display for ZoneColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneColor::Token(token) => f.write_str(token.name()),
            ZoneColor::Rgb([r, g, b]) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
            ZoneColor::Unrecognized(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneRecord {
    pub name: Option<String>,
    pub color: Option<ZoneColor>,
    pub is_current: bool,
}

pub(crate) static EMPTY_RECORD: ZoneRecord = ZoneRecord {
    name: None,
    color: None,
    is_current: false,
};

impl ZoneRecord {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none() && !self.is_current
    }

    pub fn resolved_color(&self) -> Rgb {
        self.color
            .as_ref()
            .map(ZoneColor::resolve)
            .unwrap_or(BACKGROUND_RGB)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_literal_parses_case_insensitively_and_displays_lowercase() {
        let color = ZoneColor::parse("#554F97");
        assert_eq!(color, ZoneColor::Rgb([0x55, 0x4f, 0x97]));
        assert_eq!(color.to_string(), "#554f97");
    }

    #[test]
    fn palette_names_resolve_to_fixed_colors() {
        assert_eq!(ZoneColor::parse("visited"), ZoneColor::VISITED);
        assert_eq!(ZoneColor::parse("Magenta").resolve(), [255, 0, 255]);
        assert_eq!(ZoneColor::CACHED.resolve(), [211, 211, 211]);
        assert_eq!(ZoneColor::CURRENT.to_string(), "current");
    }

    #[test]
    fn malformed_hex_is_white_and_unknown_name_is_background() {
        let short = ZoneColor::parse("#12");
        assert_eq!(short, ZoneColor::Unrecognized("#12".to_string()));
        assert_eq!(short.resolve(), [255, 255, 255]);
        assert_eq!(ZoneColor::parse("chartreuse").resolve(), BACKGROUND_RGB);
    }

    #[test]
    fn empty_record_resolves_to_background() {
        let record = ZoneRecord::default();
        assert!(record.is_empty());
        assert_eq!(record.resolved_color(), BACKGROUND_RGB);
        assert_eq!(EMPTY_RECORD, record);
    }
}
