use crate::fixed::Seconds;
use crate::id::ResourceName;

// ---------------------------------------------------------------------------
// Recipe types
// ---------------------------------------------------------------------------

/// An input requirement, consumed once per queued cycle at order time.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResourceRequirement {
    pub resource: ResourceName,
    pub amount: u32,
}

/// What a factory produces: immutable once assigned. A factory's recipe
/// may be replaced wholesale via [`crate::factory::Factory::set_recipe`],
/// never merged.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Recipe {
    pub output_resource: ResourceName,
    /// Units of output produced per completed cycle.
    pub output_amount: u32,
    /// Wall-clock length of one production cycle.
    pub cycle_duration: Seconds,
    /// When false the factory is an infinite source: no requirements are
    /// consumed and production is limited only by capacity.
    pub requires_input: bool,
    pub requirements: Vec<ResourceRequirement>,
}

/// Template a factory instance is created from.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FactoryConfig {
    /// Unique name; the join key between live factories and saved records.
    pub name: String,
    /// Maximum stock the factory can hold.
    pub capacity: u32,
    pub recipe: Recipe,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A misconfigured factory is a setup bug, not a runtime economic
/// condition: it surfaces as an error at creation time instead of an
/// outcome code.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("factory {0:?}: capacity must be positive")]
    ZeroCapacity(String),
    #[error("factory {0:?}: recipe output amount must be positive")]
    ZeroOutputAmount(String),
    #[error("factory {0:?}: cycle duration must be positive")]
    NonPositiveCycleDuration(String),
    #[error("factory {0:?}: requirement for {1:?} has zero amount")]
    ZeroRequirementAmount(String, String),
    #[error("factory {0:?}: requires input but lists no requirements")]
    MissingRequirements(String),
    #[error("factory {0:?}: empty output resource name")]
    EmptyOutputResource(String),
}

impl FactoryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity(self.name.clone()));
        }
        self.recipe.validate(&self.name)
    }
}

impl Recipe {
    pub fn validate(&self, factory_name: &str) -> Result<(), ConfigError> {
        if self.output_resource.is_empty() {
            return Err(ConfigError::EmptyOutputResource(factory_name.to_string()));
        }
        if self.output_amount == 0 {
            return Err(ConfigError::ZeroOutputAmount(factory_name.to_string()));
        }
        if self.cycle_duration <= Seconds::ZERO {
            return Err(ConfigError::NonPositiveCycleDuration(
                factory_name.to_string(),
            ));
        }
        if self.requires_input && self.requirements.is_empty() {
            return Err(ConfigError::MissingRequirements(factory_name.to_string()));
        }
        for req in &self.requirements {
            if req.amount == 0 {
                return Err(ConfigError::ZeroRequirementAmount(
                    factory_name.to_string(),
                    req.resource.clone(),
                ));
            }
        }
        Ok(())
    }
}
