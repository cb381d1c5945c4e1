//! Serde data file structs for game content definitions.
//!
//! These structs define the on-disk format for starting resources and
//! factory templates. They are deserialized from JSON data files and
//! then resolved into simulation types by the loader.

use serde::Deserialize;

/// Top-level game data file.
#[derive(Debug, Clone, Deserialize)]
pub struct GameDataFile {
    /// Starting ledger contents, resource name to quantity.
    #[serde(default)]
    pub resources: Vec<ResourceData>,
    #[serde(default)]
    pub factories: Vec<FactoryData>,
}

/// A starting resource entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceData {
    pub name: String,
    pub amount: u32,
}

/// A factory template in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct FactoryData {
    pub name: String,
    pub capacity: u32,
    pub recipe: RecipeData,
}

/// A recipe definition in a data file. `requires_input` defaults to
/// true; an infinite source must opt out explicitly.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeData {
    pub output: String,
    #[serde(default = "default_output_amount")]
    pub output_amount: u32,
    /// Cycle length in seconds; fractional values are allowed.
    pub cycle_seconds: f64,
    #[serde(default = "default_true")]
    pub requires_input: bool,
    #[serde(default)]
    pub requirements: Vec<RequirementData>,
}

/// One input requirement of a recipe.
#[derive(Debug, Clone, Deserialize)]
pub struct RequirementData {
    pub resource: String,
    pub amount: u32,
}

fn default_output_amount() -> u32 {
    1
}

fn default_true() -> bool {
    true
}
