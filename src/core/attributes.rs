use std::fmt;

use image::Rgb;
use serde::{Deserialize, Serialize};

use crate::core::error::{GenError, Result};

/// Six lowercase hex digits, no leading `#`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    /// Accepts `rrggbb` or `#rrggbb`, any case; stores lowercase without the prefix.
    pub fn parse(raw: &str) -> Result<Self> {
        let code = raw.strip_prefix('#').unwrap_or(raw);
        if code.len() != 6 || !code.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(GenError::InvalidArgument(format!(
                "color {raw:?} is not a 6-digit hex code"
            )));
        }
        Ok(Self(code.to_ascii_lowercase()))
    }

    pub fn from_rgb(rgb: Rgb<u8>) -> Self {
        let [r, g, b] = rgb.0;
        Self(format!("{r:02x}{g:02x}{b:02x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_rgb(&self) -> Rgb<u8> {
        // Validated at construction, so every pair parses.
        let channel = |i: usize| u8::from_str_radix(&self.0[i..i + 2], 16).unwrap_or(0);
        Rgb([channel(0), channel(2), channel(4)])
    }
}

impl TryFrom<String> for HexColor {
    type Error = GenError;
    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(value: HexColor) -> Self {
        value.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One `{"trait_type": .., "value": ..}` metadata object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trait {
    pub trait_type: String,
    pub value: String,
}

impl Trait {
    fn new(trait_type: &str, value: impl Into<String>) -> Self {
        Self {
            trait_type: trait_type.to_owned(),
            value: value.into(),
        }
    }
}

/// Sampled attributes of one generated item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSet {
    bg_color: HexColor,
    letter: char,
    letter_color: HexColor,
}

impl AttributeSet {
    pub const TRAIT_NAMES: [&'static str; 3] = ["bg_color", "letter", "letter_color"];

    pub fn new(bg_color: HexColor, letter: char, letter_color: HexColor) -> Self {
        Self {
            bg_color,
            letter,
            letter_color,
        }
    }

    pub fn bg_color(&self) -> &HexColor {
        &self.bg_color
    }

    pub fn letter(&self) -> char {
        self.letter
    }

    pub fn letter_color(&self) -> &HexColor {
        &self.letter_color
    }

    /// Flat trait projection in declared field order.
    pub fn to_trait_list(&self) -> Vec<Trait> {
        let [bg, letter, fg] = Self::TRAIT_NAMES;
        vec![
            Trait::new(bg, self.bg_color.as_str()),
            Trait::new(letter, self.letter.to_string()),
            Trait::new(fg, self.letter_color.as_str()),
        ]
    }

    /// Compact JSON array written to the `{index}-meta.json` sidecar.
    pub fn to_metadata_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.to_trait_list())
    }
}
