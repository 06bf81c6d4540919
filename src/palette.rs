//! Colour palettes offered as a style hint, and the single-choice selector.

use crate::error::LogoError;

/// A named, ordered set of colours.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorPalette {
    /// Display name, also used in the prompt
    pub name: &'static str,
    /// Hex colour values, in display order
    pub colors: &'static [&'static str],
}

/// The palettes offered on the page, first one selected by default.
pub static COLOR_PALETTES: [ColorPalette; 6] = [
    ColorPalette {
        name: "Vibrant",
        colors: &["#FF5733", "#33FF57", "#3357FF", "#FF33A1"],
    },
    ColorPalette {
        name: "Corporate Blue",
        colors: &["#0D47A1", "#1976D2", "#42A5F5", "#90CAF9"],
    },
    ColorPalette {
        name: "Forest Green",
        colors: &["#1B5E20", "#388E3C", "#66BB6A", "#A5D6A7"],
    },
    ColorPalette {
        name: "Modern Tech",
        colors: &["#4A90E2", "#7ED321", "#F5A623", "#D0021B"],
    },
    ColorPalette {
        name: "Luxury Gold",
        colors: &["#B8860B", "#D4AF37", "#FFD700", "#F0E68C"],
    },
    ColorPalette {
        name: "Playful Pink",
        colors: &["#FF69B4", "#FFB6C1", "#FFC0CB", "#DB7093"],
    },
];

/// Tracks which palette is selected. Exactly one always is.
#[derive(Clone, Debug)]
pub struct PaletteSelector {
    palettes: &'static [ColorPalette],
    selected: usize,
}

impl Default for PaletteSelector {
    fn default() -> Self {
        Self {
            palettes: &COLOR_PALETTES,
            selected: 0,
        }
    }
}

impl PaletteSelector {
    /// Selector over `palettes` with the first one selected; `None` if empty.
    pub fn new(palettes: &'static [ColorPalette]) -> Option<Self> {
        if palettes.is_empty() {
            return None;
        }
        Some(Self {
            palettes,
            selected: 0,
        })
    }

    /// Selects the palette called `name`, deselecting the rest.
    pub fn select(&mut self, name: &str) -> Result<(), LogoError> {
        let index = self
            .palettes
            .iter()
            .position(|palette| palette.name == name)
            .ok_or(LogoError::BadRequest)?;
        self.selected = index;
        Ok(())
    }

    /// Name of the selected palette.
    pub fn current_selection(&self) -> &'static str {
        self.palettes
            .get(self.selected)
            .map(|palette| palette.name)
            .unwrap_or_default()
    }

    /// Every palette with its selection flag, in display order.
    pub fn entries(&self) -> impl Iterator<Item = (&'static ColorPalette, bool)> + '_ {
        self.palettes
            .iter()
            .enumerate()
            .map(move |(index, palette)| (palette, index == self.selected))
    }
}
