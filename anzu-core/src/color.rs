//! Terminal color representation
//!
//! Supports:
//! - Named 16-color palette (standard ANSI colors)
//! - 256-color indexed palette
//! - 24-bit true color (RGB)

use serde::{Deserialize, Serialize};

/// Represents a terminal color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Color {
    /// Default foreground or background color
    #[default]
    Default,
    /// Named color from the 16-color palette (0-15)
    Named(NamedColor),
    /// 256-color palette index (0-255)
    Indexed(u8),
    /// 24-bit RGB color
    Rgb(Rgb),
}

/// Named colors from the standard 16-color ANSI palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum NamedColor {
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    White = 7,
    BrightBlack = 8,
    BrightRed = 9,
    BrightGreen = 10,
    BrightYellow = 11,
    BrightBlue = 12,
    BrightMagenta = 13,
    BrightCyan = 14,
    BrightWhite = 15,
}

impl NamedColor {
    /// Convert from SGR color offset (30-37 for fg, 40-47 for bg)
    pub fn from_sgr_normal(code: u16) -> Option<Self> {
        match code {
            0 => Some(NamedColor::Black),
            1 => Some(NamedColor::Red),
            2 => Some(NamedColor::Green),
            3 => Some(NamedColor::Yellow),
            4 => Some(NamedColor::Blue),
            5 => Some(NamedColor::Magenta),
            6 => Some(NamedColor::Cyan),
            7 => Some(NamedColor::White),
            _ => None,
        }
    }

    /// Convert from SGR bright color offset (90-97 for fg, 100-107 for bg)
    pub fn from_sgr_bright(code: u16) -> Option<Self> {
        match code {
            0 => Some(NamedColor::BrightBlack),
            1 => Some(NamedColor::BrightRed),
            2 => Some(NamedColor::BrightGreen),
            3 => Some(NamedColor::BrightYellow),
            4 => Some(NamedColor::BrightBlue),
            5 => Some(NamedColor::BrightMagenta),
            6 => Some(NamedColor::BrightCyan),
            7 => Some(NamedColor::BrightWhite),
            _ => None,
        }
    }

    /// Index in the 256-color palette
    pub fn to_index(self) -> u8 {
        self as u8
    }
}

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}
