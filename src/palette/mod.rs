//! Planet types and their color tables.

use std::fmt;
use std::str::FromStr;

use image::Rgba;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by palette lookups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaletteError {
    #[error("Unknown planet type: {0}")]
    UnknownPlanetType(String),
}

/// Supported planet archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanetType {
    Desert,
    Furnace,
    Grave,
    Ice,
    Jovian,
    Jungle,
    Living,
    Ocean,
    Rocky,
    Tainted,
    Vital,
    Shattered,
}

impl PlanetType {
    pub const ALL: [PlanetType; 12] = [
        PlanetType::Desert,
        PlanetType::Furnace,
        PlanetType::Grave,
        PlanetType::Ice,
        PlanetType::Jovian,
        PlanetType::Jungle,
        PlanetType::Living,
        PlanetType::Ocean,
        PlanetType::Rocky,
        PlanetType::Tainted,
        PlanetType::Vital,
        PlanetType::Shattered,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PlanetType::Desert => "desert",
            PlanetType::Furnace => "furnace",
            PlanetType::Grave => "grave",
            PlanetType::Ice => "ice",
            PlanetType::Jovian => "jovian",
            PlanetType::Jungle => "jungle",
            PlanetType::Living => "living",
            PlanetType::Ocean => "ocean",
            PlanetType::Rocky => "rocky",
            PlanetType::Tainted => "tainted",
            PlanetType::Vital => "vital",
            PlanetType::Shattered => "shattered",
        }
    }

    fn index(&self) -> u64 {
        PlanetType::ALL.iter().position(|t| t == self).unwrap_or(0) as u64
    }
}

impl fmt::Display for PlanetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlanetType {
    type Err = PaletteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "toxic" {
            return Ok(PlanetType::Tainted);
        }
        PlanetType::ALL
            .iter()
            .copied()
            .find(|t| t.name() == lower)
            .ok_or_else(|| PaletteError::UnknownPlanetType(s.to_string()))
    }
}

/// Color lookups consumed by the cloud and atmosphere layers.
pub trait ColorPalette: Send + Sync {
    /// Atmosphere tint for `planet_type`; unknown types are an error.
    fn get_atmosphere_color(&self, planet_type: &str) -> Result<Rgba<u8>, PaletteError>;

    /// Cloud color for `planet_type`; unknown types fall back to translucent white.
    fn get_cloud_color(&self, planet_type: &str) -> Rgba<u8>;

    /// Dominant surface color, used for placeholder planets.
    fn get_base_color(&self, planet_type: &str) -> Result<Rgba<u8>, PaletteError>;
}

const UNKNOWN_CLOUD_COLOR: Rgba<u8> = Rgba([255, 255, 255, 180]);
const CLOUD_WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

fn atmosphere_table(t: PlanetType) -> &'static [[u8; 4]] {
    match t {
        PlanetType::Desert => &[[255, 200, 150, 60], [255, 220, 180, 40]],
        PlanetType::Furnace => &[[255, 100, 0, 80], [255, 150, 50, 60]],
        PlanetType::Grave => &[[150, 150, 150, 40], [180, 180, 180, 30]],
        PlanetType::Ice => &[[200, 240, 255, 50], [220, 255, 255, 40]],
        PlanetType::Jovian => &[[255, 220, 180, 70], [255, 240, 200, 50]],
        PlanetType::Jungle => &[[150, 255, 150, 60], [200, 255, 200, 40]],
        PlanetType::Living => &[[220, 150, 220, 70], [240, 180, 240, 50]],
        PlanetType::Ocean => &[[150, 200, 255, 70], [180, 230, 255, 50]],
        PlanetType::Rocky => &[[200, 200, 200, 40], [220, 220, 220, 30]],
        PlanetType::Tainted => &[[150, 255, 100, 70], [200, 255, 150, 50]],
        PlanetType::Vital => &[[150, 200, 255, 60], [200, 230, 255, 40]],
        PlanetType::Shattered => &[[255, 100, 50, 80], [255, 150, 100, 60]],
    }
}

fn base_table(t: PlanetType) -> &'static [[u8; 3]] {
    match t {
        PlanetType::Desert => &[[210, 180, 140], [244, 164, 96], [222, 184, 135]],
        PlanetType::Furnace => &[[139, 0, 0], [178, 34, 34], [165, 42, 42]],
        PlanetType::Grave => &[[105, 105, 105], [128, 128, 128], [169, 169, 169]],
        PlanetType::Ice => &[[240, 248, 255], [240, 255, 255], [230, 230, 250]],
        PlanetType::Jovian => &[[255, 222, 173], [222, 184, 135], [210, 180, 140]],
        PlanetType::Jungle => &[[34, 139, 34], [0, 128, 0], [0, 100, 0]],
        PlanetType::Living => &[[221, 160, 221], [218, 112, 214], [186, 85, 211]],
        PlanetType::Ocean => &[[0, 128, 128], [0, 139, 139], [32, 178, 170]],
        PlanetType::Rocky => &[[112, 128, 144], [119, 136, 153], [128, 128, 128]],
        PlanetType::Tainted => &[[85, 107, 47], [107, 142, 35], [128, 128, 0]],
        PlanetType::Vital => &[[0, 128, 128], [46, 139, 87], [60, 179, 113]],
        PlanetType::Shattered => &[[139, 0, 0], [165, 42, 42], [178, 34, 34]],
    }
}

/// Table-driven palette.
///
/// Each lookup seeds a fresh generator from `(seed, planet type, table)`, so
/// repeated lookups agree and no state is shared between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticPalette {
    seed: u64,
}

impl StaticPalette {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn rng_for(&self, t: PlanetType, table: u64) -> ChaCha8Rng {
        let mix = self
            .seed
            .wrapping_mul(0x2545_F491_4F6C_DD1D)
            .wrapping_add(t.index() * 31 + table);
        ChaCha8Rng::seed_from_u64(mix)
    }
}

impl ColorPalette for StaticPalette {
    fn get_atmosphere_color(&self, planet_type: &str) -> Result<Rgba<u8>, PaletteError> {
        let t: PlanetType = planet_type.parse()?;
        let mut rng = self.rng_for(t, 1);
        let choices = atmosphere_table(t);
        let c = choices.choose(&mut rng).copied().unwrap_or(choices[0]);
        Ok(Rgba(c))
    }

    fn get_cloud_color(&self, planet_type: &str) -> Rgba<u8> {
        match planet_type.parse::<PlanetType>() {
            Ok(_) => CLOUD_WHITE,
            Err(_) => UNKNOWN_CLOUD_COLOR,
        }
    }

    fn get_base_color(&self, planet_type: &str) -> Result<Rgba<u8>, PaletteError> {
        let t: PlanetType = planet_type.parse()?;
        let mut rng = self.rng_for(t, 2);
        let choices = base_table(t);
        let [r, g, b] = choices.choose(&mut rng).copied().unwrap_or(choices[0]);
        Ok(Rgba([r, g, b, 255]))
    }
}
