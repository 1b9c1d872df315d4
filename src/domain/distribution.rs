// Categorical breakdown domain models
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub name: String,
    pub raw_value: f64,
}

impl DistributionEntry {
    pub fn new(name: impl Into<String>, raw_value: f64) -> Self {
        Self {
            name: name.into(),
            raw_value,
        }
    }
}

/// Palette slots a renderer maps to concrete colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorToken {
    Primary,
    Secondary,
    Tertiary,
    Quaternary,
    Quinary,
}

impl ColorToken {
    pub const PALETTE: [ColorToken; 5] = [
        ColorToken::Primary,
        ColorToken::Secondary,
        ColorToken::Tertiary,
        ColorToken::Quaternary,
        ColorToken::Quinary,
    ];

    pub fn for_position(position: usize) -> Self {
        Self::PALETTE[position % Self::PALETTE.len()]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColorToken::Primary => "primary",
            ColorToken::Secondary => "secondary",
            ColorToken::Tertiary => "tertiary",
            ColorToken::Quaternary => "quaternary",
            ColorToken::Quinary => "quinary",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub name: String,
    pub percentage: f64,
    pub absolute_value: f64,
    pub color: ColorToken,
}
