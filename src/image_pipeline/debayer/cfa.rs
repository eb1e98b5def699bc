//! Bayer color filter array layouts and per-site channel classification

use serde::{Deserialize, Serialize};

/// Bayer site within a 2x2 tile. Discriminants index black levels and accumulators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BayerChannel {
    Red = 0,
    GreenR = 1,
    GreenB = 2,
    Blue = 3,
}

impl BayerChannel {
    pub const ALL: [BayerChannel; 4] = [
        BayerChannel::Red,
        BayerChannel::GreenR,
        BayerChannel::GreenB,
        BayerChannel::Blue,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn is_green(self) -> bool {
        matches!(self, BayerChannel::GreenR | BayerChannel::GreenB)
    }
}

/// Bayer pattern, named by the top-left 2x2 tile read row by row.
///
/// Discriminants follow the camera HAL color filter arrangement codes, which
/// encode the tile phase in two bits (bit 0 horizontal, bit 1 vertical).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CfaPattern {
    #[default]
    Rggb = 0,
    Grbg = 1,
    Gbrg = 2,
    Bggr = 3,
}

use BayerChannel::{Blue as B, GreenB as Gb, GreenR as Gr, Red as R};

// Indexed by pattern, then by (row & 1) << 1 | (col & 1).
const TILE_LAYOUT: [[BayerChannel; 4]; 4] = [
    [R, Gr, Gb, B],
    [Gr, R, B, Gb],
    [Gb, B, R, Gr],
    [B, Gb, Gr, R],
];

impl CfaPattern {
    pub const ALL: [CfaPattern; 4] = [
        CfaPattern::Rggb,
        CfaPattern::Grbg,
        CfaPattern::Gbrg,
        CfaPattern::Bggr,
    ];

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(CfaPattern::Rggb),
            1 => Some(CfaPattern::Grbg),
            2 => Some(CfaPattern::Gbrg),
            3 => Some(CfaPattern::Bggr),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim();
        if let Ok(code) = normalized.parse::<i64>() {
            return Self::from_code(code);
        }
        match normalized.to_ascii_uppercase().as_str() {
            "RGGB" => Some(CfaPattern::Rggb),
            "GRBG" => Some(CfaPattern::Grbg),
            "GBRG" => Some(CfaPattern::Gbrg),
            "BGGR" => Some(CfaPattern::Bggr),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            CfaPattern::Rggb => "RGGB",
            CfaPattern::Grbg => "GRBG",
            CfaPattern::Gbrg => "GBRG",
            CfaPattern::Bggr => "BGGR",
        }
    }

    /// Channel of the sensor site at ROI-local `(x, y)`.
    #[inline]
    pub fn channel_at(self, x: usize, y: usize) -> BayerChannel {
        TILE_LAYOUT[self as usize][((y & 1) << 1) | (x & 1)]
    }

    /// Pattern seen by a crop whose origin is at `(left, top)` in the full frame.
    pub fn shifted(self, left: u32, top: u32) -> Self {
        let mask = (left & 1) | ((top & 1) << 1);
        match Self::from_code(i64::from(self.code() as u32 ^ mask)) {
            Some(pattern) => pattern,
            None => self,
        }
    }

    /// Pattern whose top-left tile matches the given sites (row-major).
    pub fn from_tile(tile: [BayerChannel; 4]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|pattern| TILE_LAYOUT[*pattern as usize] == tile)
    }
}

/// CFA value as it appears on the wire: either the integer code or the name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CfaValue {
    Code(i64),
    Name(String),
}

impl CfaValue {
    pub fn resolve(&self) -> Option<CfaPattern> {
        match self {
            CfaValue::Code(code) => CfaPattern::from_code(*code),
            CfaValue::Name(name) => CfaPattern::from_name(name),
        }
    }
}

impl From<CfaPattern> for CfaValue {
    fn from(pattern: CfaPattern) -> Self {
        CfaValue::Name(pattern.name().to_string())
    }
}
