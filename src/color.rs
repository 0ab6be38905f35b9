//! Deterministic residue → color assignment.
//!
//! Residues are spread evenly around the hue circle in their sorted order,
//! so the same set of residue names always produces the same palette. The
//! reserved [`WILDCARD`] key carries the default color for atoms that match
//! no residue entry.

use std::fmt;

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::options::PaletteOptions;

/// Reserved color-map key for the default/unmatched color.
pub const WILDCARD: &str = "*";

/// A color in either HSL (percent saturation/lightness) or linear RGB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    /// RGB components in `[0, 1]`.
    ///
    /// Listed first: untagged decoding would otherwise read a three-element
    /// array as positional HSL fields.
    Rgb([f32; 3]),
    /// Hue in degrees, saturation and lightness in percent.
    Hsl {
        /// Hue angle in degrees, `[0, 360)`.
        hue: f32,
        /// Saturation, `[0, 100]`.
        saturation: f32,
        /// Lightness, `[0, 100]`.
        lightness: f32,
    },
}

impl Color {
    /// Pure white.
    pub const WHITE: Self = Self::Rgb([1.0, 1.0, 1.0]);

    /// Convert to RGB components in `[0, 1]`.
    #[must_use]
    pub fn to_rgb(self) -> [f32; 3] {
        match self {
            Self::Rgb(rgb) => rgb,
            Self::Hsl {
                hue,
                saturation,
                lightness,
            } => hsl_to_rgb(hue, saturation / 100.0, lightness / 100.0),
        }
    }

    /// CSS color string, e.g. `hsl(180, 70%, 50%)` or `#ffffff`.
    #[must_use]
    pub fn to_css(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Hsl {
                hue,
                saturation,
                lightness,
            } => write!(f, "hsl({hue}, {saturation}%, {lightness}%)"),
            Self::Rgb([r, g, b]) => write!(
                f,
                "#{:02x}{:02x}{:02x}",
                channel_byte(r),
                channel_byte(g),
                channel_byte(b)
            ),
        }
    }
}

fn channel_byte(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn hsl_to_rgb(hue: f32, s: f32, l: f32) -> [f32; 3] {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    [r + m, g + m, b + m]
}

/// Residue name → color, plus the wildcard default.
///
/// Residue entries keep the sorted order they were assigned in. The map is
/// always built whole by [`ColorMap::assign`]; there is no way to merge one
/// load's colors into another's.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMap {
    residues: IndexMap<String, Color>,
    wildcard: Color,
}

impl ColorMap {
    /// Spread `residues` evenly around the hue circle: residue `i` of `n`
    /// gets hue `i * 360 / n`. An empty slice yields a map holding only the
    /// wildcard.
    #[must_use]
    pub fn assign(residues: &[String], palette: &PaletteOptions) -> Self {
        let n = residues.len();
        let mut map = IndexMap::with_capacity(n);
        for (i, residue) in residues.iter().enumerate() {
            if residue == WILDCARD {
                log::warn!(
                    "residue named {WILDCARD:?} shadows the wildcard color key"
                );
            }
            let hue = i as f32 * 360.0 / n as f32;
            let _ = map.insert(
                residue.clone(),
                Color::Hsl {
                    hue,
                    saturation: palette.saturation,
                    lightness: palette.lightness,
                },
            );
        }
        Self {
            residues: map,
            wildcard: palette.wildcard,
        }
    }

    /// Exact lookup. Residue entries win over the wildcard key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Color> {
        self.residues
            .get(key)
            .copied()
            .or_else(|| (key == WILDCARD).then_some(self.wildcard))
    }

    /// Color for `residue`, falling back to the wildcard color.
    #[must_use]
    pub fn color_for(&self, residue: &str) -> Color {
        self.residues.get(residue).copied().unwrap_or(self.wildcard)
    }

    /// The wildcard default color.
    #[must_use]
    pub fn wildcard(&self) -> Color {
        self.wildcard
    }

    /// Residue names in assignment order.
    pub fn residues(&self) -> impl Iterator<Item = &str> {
        self.residues.keys().map(String::as_str)
    }

    /// Number of residue entries (the wildcard is not counted).
    #[must_use]
    pub fn residue_count(&self) -> usize {
        self.residues.len()
    }

    /// All entries: residues in order, then the wildcard.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Color)> {
        self.residues
            .iter()
            .map(|(name, color)| (name.as_str(), *color))
            .chain(std::iter::once((WILDCARD, self.wildcard)))
    }
}

/// Serializes as a JSON object of CSS color strings, wildcard last.
impl Serialize for ColorMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.residues.len() + 1))?;
        for (name, color) in self.iter() {
            map.serialize_entry(name, &color.to_css())?;
        }
        map.end()
    }
}
