//! Film recipes: the fixed parameter bundles that drive the pipeline.
//!
//! A [`Recipe`] is pure configuration data. The same code path runs for
//! every recipe; only the numbers change. The built-in table
//! ([`RECIPES`]) is a compile-time `static` and is never mutated.
//!
//! The pipeline does not validate recipes. Values outside the
//! documented ranges are used as-is as weighting scalars, and the
//! per-channel clamp keeps every output in `0..=255`. Callers that want
//! to reject such values can opt in with [`Recipe::validate`].

use std::borrow::Cow;
use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::types::PipelineError;

/// Base color-response formula applied first in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilmSimulation {
    /// Muted colors: blend 15% toward gray.
    ClassicChrome,
    /// Soft, warm negative: per-channel gain (R up, B down).
    ProNegStd,
    /// Cinematic and desaturated: blend 20% toward gray.
    Eterna,
    /// Vivid slide film: push channels away from gray by 1.4x.
    Velvia,
}

impl FilmSimulation {
    /// Every simulation, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::ClassicChrome,
        Self::ProNegStd,
        Self::Eterna,
        Self::Velvia,
    ];
}

impl fmt::Display for FilmSimulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClassicChrome => f.write_str("classic-chrome"),
            Self::ProNegStd => f.write_str("pro-neg-std"),
            Self::Eterna => f.write_str("eterna"),
            Self::Velvia => f.write_str("velvia"),
        }
    }
}

/// Three-level switch shared by grain, Color Chrome and Color Chrome Blue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffectLevel {
    /// Effect disabled.
    #[default]
    Off,
    /// Subtle effect.
    Weak,
    /// Pronounced effect.
    Strong,
}

impl EffectLevel {
    /// Returns `true` for [`EffectLevel::Off`].
    #[must_use]
    pub const fn is_off(self) -> bool {
        matches!(self, Self::Off)
    }
}

impl fmt::Display for EffectLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => f.write_str("off"),
            Self::Weak => f.write_str("weak"),
            Self::Strong => f.write_str("strong"),
        }
    }
}

/// Dynamic range setting of the source camera recipe.
///
/// Carried as metadata only. No pipeline stage reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DynamicRange {
    /// DR100.
    #[serde(rename = "DR100")]
    Dr100,
    /// DR200.
    #[serde(rename = "DR200")]
    Dr200,
    /// DR400.
    #[serde(rename = "DR400")]
    Dr400,
}

impl fmt::Display for DynamicRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dr100 => f.write_str("DR100"),
            Self::Dr200 => f.write_str("DR200"),
            Self::Dr400 => f.write_str("DR400"),
        }
    }
}

/// Per-channel white balance shift in camera steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WhiteBalanceShift {
    /// Red shift, each step is a 2% gain change.
    pub red: i32,
    /// Blue shift, each step is a 2% gain change.
    pub blue: i32,
}

impl WhiteBalanceShift {
    /// Create a new shift.
    #[must_use]
    pub const fn new(red: i32, blue: i32) -> Self {
        Self { red, blue }
    }

    /// Returns `true` when both shifts are zero.
    #[must_use]
    pub const fn is_neutral(self) -> bool {
        self.red == 0 && self.blue == 0
    }
}

/// A named film emulation look.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Display name.
    pub name: Cow<'static, str>,

    /// Short human-readable description.
    #[serde(default)]
    pub description: Cow<'static, str>,

    /// Base look.
    pub film_simulation: FilmSimulation,

    /// Highlight gain bias, documented range `-2..=4`.
    pub highlights: i32,

    /// Shadow gain bias, documented range `-2..=4`.
    pub shadows: i32,

    /// Global saturation bias, documented range `-4..=4`.
    pub color: i32,

    /// Unsharp-mask amount, documented range `-4..=4`.
    /// Negative values soften.
    pub sharpness: i32,

    /// Monochromatic grain amplitude.
    pub grain: EffectLevel,

    /// Red/blue gain shift, documented range `-9..=9` each.
    pub white_balance_shift: WhiteBalanceShift,

    /// Mid-tone saturation boost.
    pub color_chrome: EffectLevel,

    /// Selective boost of blue-dominant mid-tones.
    pub color_chrome_blue: EffectLevel,

    /// Local-contrast amount, documented range `-5..=5`.
    pub clarity: i32,

    /// Advisory dynamic range metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_range: Option<DynamicRange>,
}

/// Documented range of [`Recipe::highlights`] and [`Recipe::shadows`].
pub const TONE_RANGE: RangeInclusive<i32> = -2..=4;
/// Documented range of [`Recipe::color`] and [`Recipe::sharpness`].
pub const COLOR_RANGE: RangeInclusive<i32> = -4..=4;
/// Documented range of each [`WhiteBalanceShift`] component.
pub const WHITE_BALANCE_RANGE: RangeInclusive<i32> = -9..=9;
/// Documented range of [`Recipe::clarity`].
pub const CLARITY_RANGE: RangeInclusive<i32> = -5..=5;

impl Recipe {
    /// A recipe whose optional stages are all disabled.
    ///
    /// Film simulation has no neutral variant, so this is not an
    /// identity transform: the base look still applies.
    #[must_use]
    pub const fn neutral(film_simulation: FilmSimulation) -> Self {
        Self {
            name: Cow::Borrowed("Neutral"),
            description: Cow::Borrowed(""),
            film_simulation,
            highlights: 0,
            shadows: 0,
            color: 0,
            sharpness: 0,
            grain: EffectLevel::Off,
            white_balance_shift: WhiteBalanceShift::new(0, 0),
            color_chrome: EffectLevel::Off,
            color_chrome_blue: EffectLevel::Off,
            clarity: 0,
            dynamic_range: None,
        }
    }

    /// Check every numeric field against its documented range.
    ///
    /// The pipeline never calls this; it is for callers that accept
    /// recipes from outside the built-in table.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidRecipe`] naming every field that
    /// is out of range.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let checks: [(&str, i32, &RangeInclusive<i32>); 7] = [
            ("highlights", self.highlights, &TONE_RANGE),
            ("shadows", self.shadows, &TONE_RANGE),
            ("color", self.color, &COLOR_RANGE),
            ("sharpness", self.sharpness, &COLOR_RANGE),
            (
                "white_balance_shift.red",
                self.white_balance_shift.red,
                &WHITE_BALANCE_RANGE,
            ),
            (
                "white_balance_shift.blue",
                self.white_balance_shift.blue,
                &WHITE_BALANCE_RANGE,
            ),
            ("clarity", self.clarity, &CLARITY_RANGE),
        ];

        let problems: Vec<String> = checks
            .iter()
            .filter(|(_, value, range)| !range.contains(value))
            .map(|(field, value, range)| {
                format!(
                    "{field}={value} outside {}..={}",
                    range.start(),
                    range.end()
                )
            })
            .collect();

        if problems.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::InvalidRecipe(problems.join(", ")))
        }
    }
}

impl Default for Recipe {
    fn default() -> Self {
        NANO_BANANA_PRO
    }
}

/// One row of the built-in recipe table.
#[derive(Debug)]
pub struct RecipeEntry {
    /// Stable lookup identifier (e.g. `"kodak-portra-400"`).
    pub id: &'static str,
    /// The recipe values.
    pub recipe: Recipe,
}

/// Identifier of the recipe used when none is chosen.
pub const DEFAULT_RECIPE_ID: &str = "nano-banana-pro";

const NANO_BANANA_PRO: Recipe = Recipe {
    name: Cow::Borrowed("Nano Banana Pro"),
    description: Cow::Borrowed("Warm, muted tones with lifted shadows"),
    film_simulation: FilmSimulation::ClassicChrome,
    highlights: -1,
    shadows: -1,
    color: -1,
    sharpness: -2,
    grain: EffectLevel::Weak,
    white_balance_shift: WhiteBalanceShift::new(2, -5),
    color_chrome: EffectLevel::Weak,
    color_chrome_blue: EffectLevel::Strong,
    clarity: -2,
    dynamic_range: None,
};

/// The built-in recipe table, in display order.
pub static RECIPES: [RecipeEntry; 9] = [
    RecipeEntry {
        id: DEFAULT_RECIPE_ID,
        recipe: NANO_BANANA_PRO,
    },
    RecipeEntry {
        id: "kodak-portra-400",
        recipe: Recipe {
            name: Cow::Borrowed("Kodak Portra 400"),
            description: Cow::Borrowed("Classic film with sophisticated soft tones"),
            film_simulation: FilmSimulation::Eterna,
            highlights: 1,
            shadows: 1,
            color: 2,
            sharpness: -2,
            grain: EffectLevel::Weak,
            white_balance_shift: WhiteBalanceShift::new(-2, -4),
            color_chrome: EffectLevel::Weak,
            color_chrome_blue: EffectLevel::Strong,
            clarity: -2,
            dynamic_range: Some(DynamicRange::Dr200),
        },
    },
    RecipeEntry {
        id: "nightwalker",
        recipe: Recipe {
            name: Cow::Borrowed("Nightwalker"),
            description: Cow::Borrowed("Street photography with cyber teal tones for night lights"),
            film_simulation: FilmSimulation::Velvia,
            highlights: -2,
            shadows: 2,
            color: 4,
            sharpness: -2,
            grain: EffectLevel::Strong,
            white_balance_shift: WhiteBalanceShift::new(-7, -3),
            color_chrome: EffectLevel::Weak,
            color_chrome_blue: EffectLevel::Strong,
            clarity: 0,
            dynamic_range: Some(DynamicRange::Dr200),
        },
    },
    RecipeEntry {
        id: "123-chrome",
        recipe: Recipe {
            name: Cow::Borrowed("123 Chrome"),
            description: Cow::Borrowed("Classic Kodachrome look for landscape and travel"),
            film_simulation: FilmSimulation::ClassicChrome,
            highlights: -1,
            shadows: -2,
            color: 3,
            sharpness: 0,
            grain: EffectLevel::Off,
            white_balance_shift: WhiteBalanceShift::new(1, -2),
            color_chrome: EffectLevel::Weak,
            color_chrome_blue: EffectLevel::Strong,
            clarity: 0,
            dynamic_range: Some(DynamicRange::Dr400),
        },
    },
    RecipeEntry {
        id: "eastman-color",
        recipe: Recipe {
            name: Cow::Borrowed("Eastman Color"),
            description: Cow::Borrowed("Early Kodak 35mm film with striking blues"),
            film_simulation: FilmSimulation::ClassicChrome,
            highlights: 1,
            shadows: -1,
            color: 0,
            sharpness: 0,
            grain: EffectLevel::Weak,
            white_balance_shift: WhiteBalanceShift::new(-5, -7),
            color_chrome: EffectLevel::Off,
            color_chrome_blue: EffectLevel::Off,
            clarity: -3,
            dynamic_range: Some(DynamicRange::Dr100),
        },
    },
    RecipeEntry {
        id: "kodak-gold-200",
        recipe: Recipe {
            name: Cow::Borrowed("Kodak Gold 200"),
            description: Cow::Borrowed("Warm golden hour tones"),
            film_simulation: FilmSimulation::ClassicChrome,
            highlights: 1,
            shadows: 0,
            color: 3,
            sharpness: 0,
            grain: EffectLevel::Weak,
            white_balance_shift: WhiteBalanceShift::new(5, -3),
            color_chrome: EffectLevel::Strong,
            color_chrome_blue: EffectLevel::Off,
            clarity: 1,
            dynamic_range: None,
        },
    },
    RecipeEntry {
        id: "fuji-astia",
        recipe: Recipe {
            name: Cow::Borrowed("Fuji Astia 100F"),
            description: Cow::Borrowed("Natural colors with fine detail"),
            film_simulation: FilmSimulation::ProNegStd,
            highlights: 0,
            shadows: 0,
            color: 1,
            sharpness: 1,
            grain: EffectLevel::Off,
            white_balance_shift: WhiteBalanceShift::new(-1, 1),
            color_chrome: EffectLevel::Weak,
            color_chrome_blue: EffectLevel::Weak,
            clarity: 2,
            dynamic_range: None,
        },
    },
    RecipeEntry {
        id: "cinematic-eterna",
        recipe: Recipe {
            name: Cow::Borrowed("Cinematic Eterna"),
            description: Cow::Borrowed("Desaturated cinematic look"),
            film_simulation: FilmSimulation::Eterna,
            highlights: -2,
            shadows: 2,
            color: -2,
            sharpness: -3,
            grain: EffectLevel::Strong,
            white_balance_shift: WhiteBalanceShift::new(0, 2),
            color_chrome: EffectLevel::Off,
            color_chrome_blue: EffectLevel::Weak,
            clarity: -3,
            dynamic_range: None,
        },
    },
    RecipeEntry {
        id: "pro-neg-hi",
        recipe: Recipe {
            name: Cow::Borrowed("Pro Neg. Hi"),
            description: Cow::Borrowed("High contrast professional negative"),
            film_simulation: FilmSimulation::ProNegStd,
            highlights: 2,
            shadows: -2,
            color: 0,
            sharpness: -1,
            grain: EffectLevel::Weak,
            white_balance_shift: WhiteBalanceShift::new(3, 0),
            color_chrome: EffectLevel::Weak,
            color_chrome_blue: EffectLevel::Weak,
            clarity: 0,
            dynamic_range: None,
        },
    },
];

/// Find a built-in recipe by identifier.
#[must_use]
pub fn find(id: &str) -> Option<&'static Recipe> {
    RECIPES
        .iter()
        .find(|entry| entry.id == id)
        .map(|entry| &entry.recipe)
}

/// Resolve a built-in recipe by identifier.
///
/// There is no fallback: an unknown identifier is a caller error.
///
/// # Errors
///
/// Returns [`PipelineError::UnknownRecipe`] if no recipe has this
/// identifier.
pub fn lookup(id: &str) -> Result<&'static Recipe, PipelineError> {
    find(id).ok_or_else(|| PipelineError::UnknownRecipe(id.to_owned()))
}

/// Identifiers of all built-in recipes, in table order.
pub fn ids() -> impl Iterator<Item = &'static str> {
    RECIPES.iter().map(|entry| entry.id)
}
