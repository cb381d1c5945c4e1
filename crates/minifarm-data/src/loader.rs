//! Resolve JSON game data into validated simulation types.
//!
//! Loading is strict: every factory config is validated up front and
//! duplicate factory names are rejected, so a bad data file fails at
//! startup rather than surfacing as a stuck factory mid-game.

use crate::schema::{FactoryData, GameDataFile};
use minifarm_core::fixed::seconds;
use minifarm_core::orchestrator::FactoryOrchestrator;
use minifarm_core::recipe::{ConfigError, FactoryConfig, Recipe, ResourceRequirement};
use std::collections::BTreeSet;

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("invalid factory config: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("duplicate factory name: {0:?}")]
    DuplicateFactoryName(String),
    #[error("factory {0:?}: cycle_seconds must be a finite positive number")]
    BadCycleSeconds(String),
}

/// Validated game content, ready to instantiate.
#[derive(Debug, Clone)]
pub struct GameData {
    pub resources: Vec<(String, u32)>,
    pub factories: Vec<FactoryConfig>,
}

impl GameData {
    /// Instantiate an orchestrator with the starting resources and one
    /// factory per template.
    pub fn build_orchestrator(&self) -> Result<FactoryOrchestrator, ConfigError> {
        let mut orch = FactoryOrchestrator::new();
        for (resource, amount) in &self.resources {
            orch.add_resource(resource, *amount);
        }
        for config in &self.factories {
            orch.create_factory(config.clone())?;
        }
        Ok(orch)
    }
}

/// Load and validate game data from a JSON string.
pub fn load_game_data(json: &str) -> Result<GameData, DataLoadError> {
    let file: GameDataFile = serde_json::from_str(json)?;
    resolve(file)
}

/// Load and validate game data from JSON bytes.
pub fn load_game_data_bytes(bytes: &[u8]) -> Result<GameData, DataLoadError> {
    let file: GameDataFile = serde_json::from_slice(bytes)?;
    resolve(file)
}

fn resolve(file: GameDataFile) -> Result<GameData, DataLoadError> {
    let mut seen = BTreeSet::new();
    let mut factories = Vec::with_capacity(file.factories.len());
    for data in &file.factories {
        if !seen.insert(data.name.clone()) {
            return Err(DataLoadError::DuplicateFactoryName(data.name.clone()));
        }
        factories.push(resolve_factory(data)?);
    }
    Ok(GameData {
        resources: file
            .resources
            .into_iter()
            .map(|r| (r.name, r.amount))
            .collect(),
        factories,
    })
}

fn resolve_factory(data: &FactoryData) -> Result<FactoryConfig, DataLoadError> {
    if !data.recipe.cycle_seconds.is_finite() || data.recipe.cycle_seconds <= 0.0 {
        return Err(DataLoadError::BadCycleSeconds(data.name.clone()));
    }
    let config = FactoryConfig {
        name: data.name.clone(),
        capacity: data.capacity,
        recipe: Recipe {
            output_resource: data.recipe.output.clone(),
            output_amount: data.recipe.output_amount,
            cycle_duration: seconds(data.recipe.cycle_seconds),
            requires_input: data.recipe.requires_input,
            requirements: data
                .recipe
                .requirements
                .iter()
                .map(|req| ResourceRequirement {
                    resource: req.resource.clone(),
                    amount: req.amount,
                })
                .collect(),
        },
    };
    config.validate()?;
    Ok(config)
}

// ===========================================================================
// Tests
// ===========================================================================
