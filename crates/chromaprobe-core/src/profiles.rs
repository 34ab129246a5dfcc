//! Color vision deficiency types and their built-in testing profiles.
//!
//! Each profile lists named ranges of priority colors: the regions where a
//! person with that condition is most likely to confuse colors, and therefore
//! where testing effort pays off first.

use std::fmt;
use std::str::FromStr;

use crate::engine::errors::ChromaError;
use crate::engine::pair::ColorId;
use crate::external::ProfileProvider;

/// Color vision condition being tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CvdType {
    Deuteranomaly,
    Protanomaly,
    Tritanomaly,
    Deuteranopia,
    Protanopia,
    Tritanopia,
    Achromatopsia,
    Achromatomaly,
    Normal,
}

impl CvdType {
    pub const ALL: [CvdType; 9] = [
        CvdType::Deuteranomaly,
        CvdType::Protanomaly,
        CvdType::Tritanomaly,
        CvdType::Deuteranopia,
        CvdType::Protanopia,
        CvdType::Tritanopia,
        CvdType::Achromatopsia,
        CvdType::Achromatomaly,
        CvdType::Normal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CvdType::Deuteranomaly => "deuteranomaly",
            CvdType::Protanomaly => "protanomaly",
            CvdType::Tritanomaly => "tritanomaly",
            CvdType::Deuteranopia => "deuteranopia",
            CvdType::Protanopia => "protanopia",
            CvdType::Tritanopia => "tritanopia",
            CvdType::Achromatopsia => "achromatopsia",
            CvdType::Achromatomaly => "achromatomaly",
            CvdType::Normal => "normal",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            CvdType::Deuteranomaly => "Deuteranomaly (Green-Weak)",
            CvdType::Protanomaly => "Protanomaly (Red-Weak)",
            CvdType::Tritanomaly => "Tritanomaly (Blue-Weak)",
            CvdType::Deuteranopia => "Deuteranopia (No Green)",
            CvdType::Protanopia => "Protanopia (No Red)",
            CvdType::Tritanopia => "Tritanopia (No Blue)",
            CvdType::Achromatopsia => "Achromatopsia (No Color)",
            CvdType::Achromatomaly => "Achromatomaly (Partial Monochromacy)",
            CvdType::Normal => "Normal Vision",
        }
    }

    /// Monochromacy variants, where simulated confusion is coarse across the
    /// whole palette.
    pub fn is_total_color_blindness(self) -> bool {
        matches!(self, CvdType::Achromatopsia | CvdType::Achromatomaly)
    }
}

impl fmt::Display for CvdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CvdType {
    type Err = ChromaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        CvdType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ChromaError::InvalidInput(format!("unknown CVD type '{}'", s)))
    }
}

/// A named group of colors worth testing together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityRange {
    pub name: &'static str,
    pub colors: &'static [&'static str],
}

/// Testing focus for one CVD type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestingProfile {
    pub name: &'static str,
    pub description: &'static str,
    pub ranges: &'static [PriorityRange],
}

impl TestingProfile {
    /// Priority colors flattened across ranges, in declaration order.
    ///
    /// Colors shared between ranges appear once per range, as declared.
    pub fn priority_colors(&self) -> Vec<ColorId> {
        self.ranges
            .iter()
            .flat_map(|r| r.colors.iter())
            .filter_map(|c| ColorId::new(*c).ok())
            .collect()
    }
}

static DEUTERANOMALY: TestingProfile = TestingProfile {
    name: "Deuteranomaly",
    description: "Green-weak color vision",
    ranges: &[
        PriorityRange {
            name: "Mid-reds and greens",
            colors: &["#FF0000", "#00FF00", "#808000", "#FF6600"],
        },
        PriorityRange {
            name: "Blue-greens and grays",
            colors: &["#008080", "#808080", "#00FFFF", "#666666"],
        },
        PriorityRange {
            name: "Pinks and light grays",
            colors: &["#FFC0CB", "#FFB6C1", "#D3D3D3", "#C0C0C0"],
        },
        PriorityRange {
            name: "Purples and blues",
            colors: &["#800080", "#0000FF", "#4B0082", "#8A2BE2"],
        },
        PriorityRange {
            name: "Browns, oranges, greens",
            colors: &["#A52A2A", "#FF8C00", "#228B22", "#8B4513"],
        },
    ],
};

static PROTANOMALY: TestingProfile = TestingProfile {
    name: "Protanomaly",
    description: "Red-weak color vision",
    ranges: &[
        PriorityRange {
            name: "Reds and dark greens",
            colors: &["#FF0000", "#8B0000", "#006400", "#228B22"],
        },
        PriorityRange {
            name: "Orange and brown",
            colors: &["#FF8C00", "#FFA500", "#A52A2A", "#8B4513"],
        },
        PriorityRange {
            name: "Red-purple and blue",
            colors: &["#C71585", "#8B008B", "#0000FF", "#4169E1"],
        },
        PriorityRange {
            name: "Pink and light gray",
            colors: &["#FFC0CB", "#FFB6C1", "#D3D3D3", "#DCDCDC"],
        },
        PriorityRange {
            name: "Yellow-green and cyan",
            colors: &["#9ACD32", "#ADFF2F", "#00FFFF", "#00CED1"],
        },
    ],
};

static TRITANOMALY: TestingProfile = TestingProfile {
    name: "Tritanomaly",
    description: "Blue-weak color vision",
    ranges: &[
        PriorityRange {
            name: "Blues and greens",
            colors: &["#0000FF", "#00FF00", "#008080", "#00FFFF"],
        },
        PriorityRange {
            name: "Yellow and violet",
            colors: &["#FFFF00", "#FFD700", "#8A2BE2", "#9400D3"],
        },
        PriorityRange {
            name: "Blue-green and gray",
            colors: &["#20B2AA", "#48D1CC", "#808080", "#A9A9A9"],
        },
        PriorityRange {
            name: "Orange and pink",
            colors: &["#FF8C00", "#FFA500", "#FFC0CB", "#FF69B4"],
        },
        PriorityRange {
            name: "Light blue and white",
            colors: &["#87CEEB", "#ADD8E6", "#F0F0F0", "#FFFFFF"],
        },
    ],
};

static DEUTERANOPIA: TestingProfile = TestingProfile {
    name: "Deuteranopia",
    description: "No green perception",
    ranges: &[
        PriorityRange {
            name: "All reds and greens",
            colors: &["#FF0000", "#00FF00", "#FFFF00", "#FF6600"],
        },
        PriorityRange {
            name: "Browns and greens",
            colors: &["#A52A2A", "#8B4513", "#228B22", "#006400"],
        },
        PriorityRange {
            name: "Purples and blues",
            colors: &["#800080", "#0000FF", "#8A2BE2", "#4169E1"],
        },
        PriorityRange {
            name: "Gray spectrum",
            colors: &["#404040", "#808080", "#C0C0C0", "#E0E0E0"],
        },
    ],
};

static PROTANOPIA: TestingProfile = TestingProfile {
    name: "Protanopia",
    description: "No red perception",
    ranges: &[
        PriorityRange {
            name: "All reds",
            colors: &["#FF0000", "#8B0000", "#DC143C", "#B22222"],
        },
        PriorityRange {
            name: "Reds and greens",
            colors: &["#FF0000", "#00FF00", "#808000", "#FF8C00"],
        },
        PriorityRange {
            name: "Orange and yellow",
            colors: &["#FF8C00", "#FFA500", "#FFFF00", "#FFD700"],
        },
        PriorityRange {
            name: "Pink and gray",
            colors: &["#FFC0CB", "#FFB6C1", "#D3D3D3", "#DCDCDC"],
        },
    ],
};

static TRITANOPIA: TestingProfile = TestingProfile {
    name: "Tritanopia",
    description: "No blue perception",
    ranges: &[
        PriorityRange {
            name: "All blues",
            colors: &["#0000FF", "#0000CD", "#4169E1", "#1E90FF"],
        },
        PriorityRange {
            name: "Blues and yellows",
            colors: &["#0000FF", "#FFFF00", "#00FFFF", "#FFD700"],
        },
        PriorityRange {
            name: "Violets and greens",
            colors: &["#8A2BE2", "#9400D3", "#00FF00", "#32CD32"],
        },
        PriorityRange {
            name: "Cyan and pink",
            colors: &["#00FFFF", "#00CED1", "#FFC0CB", "#FF69B4"],
        },
    ],
};

static ACHROMATOPSIA: TestingProfile = TestingProfile {
    name: "Achromatopsia",
    description: "No color perception",
    ranges: &[
        PriorityRange {
            name: "Full grayscale",
            colors: &["#000000", "#404040", "#808080", "#C0C0C0", "#FFFFFF"],
        },
        PriorityRange {
            name: "Brightness levels",
            colors: &["#1A1A1A", "#333333", "#666666", "#999999", "#CCCCCC"],
        },
    ],
};

static ACHROMATOMALY: TestingProfile = TestingProfile {
    name: "Achromatomaly",
    description: "Partial monochromacy - reduced color perception",
    ranges: &[
        PriorityRange {
            name: "Saturated vs desaturated reds",
            colors: &["#FF0000", "#8B0000", "#CD5C5C", "#F08080"],
        },
        PriorityRange {
            name: "Saturated vs desaturated greens",
            colors: &["#00FF00", "#228B22", "#90EE90", "#98FB98"],
        },
        PriorityRange {
            name: "Saturated vs desaturated blues",
            colors: &["#0000FF", "#00008B", "#87CEEB", "#ADD8E6"],
        },
        PriorityRange {
            name: "High vs medium saturation",
            colors: &["#FF1493", "#DB7093", "#FFA500", "#FFDAB9"],
        },
        PriorityRange {
            name: "Brightness levels",
            colors: &["#000000", "#404040", "#808080", "#C0C0C0", "#FFFFFF"],
        },
    ],
};

static NORMAL: TestingProfile = TestingProfile {
    name: "Normal Vision",
    description: "Full color perception",
    ranges: &[
        PriorityRange {
            name: "Primary colors",
            colors: &["#FF0000", "#00FF00", "#0000FF"],
        },
        PriorityRange {
            name: "Secondary colors",
            colors: &["#FFFF00", "#FF00FF", "#00FFFF"],
        },
        PriorityRange {
            name: "Earth tones",
            colors: &["#A52A2A", "#8B4513", "#D2691E", "#CD853F"],
        },
        PriorityRange {
            name: "Pastels",
            colors: &["#FFB6C1", "#E0BBE4", "#B4E7CE", "#FFF4E6"],
        },
    ],
};

/// Built-in testing profile for a CVD type.
pub fn testing_profile(cvd: CvdType) -> &'static TestingProfile {
    match cvd {
        CvdType::Deuteranomaly => &DEUTERANOMALY,
        CvdType::Protanomaly => &PROTANOMALY,
        CvdType::Tritanomaly => &TRITANOMALY,
        CvdType::Deuteranopia => &DEUTERANOPIA,
        CvdType::Protanopia => &PROTANOPIA,
        CvdType::Tritanopia => &TRITANOPIA,
        CvdType::Achromatopsia => &ACHROMATOPSIA,
        CvdType::Achromatomaly => &ACHROMATOMALY,
        CvdType::Normal => &NORMAL,
    }
}

/// [`ProfileProvider`] backed by the built-in profile tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinProfiles;

impl ProfileProvider for BuiltinProfiles {
    fn priority_colors(&self, cvd: CvdType) -> Vec<ColorId> {
        testing_profile(cvd).priority_colors()
    }
}
