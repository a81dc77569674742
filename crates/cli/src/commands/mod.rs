//! Command implementations.

mod info;
mod plan;
mod run;
mod validate;

pub use info::run_info;
pub use plan::run_plan;
pub use run::run_pipeline;
pub use validate::run_validate;

use std::path::Path;

use contracts::SimulationBlueprint;

use crate::error::{CliError, Result};

/// Load the blueprint at `path`, or the demo defaults when no path is given
pub(crate) fn load_blueprint(path: Option<&Path>) -> Result<SimulationBlueprint> {
    if let Some(path) = path {
        if !path.exists() {
            return Err(CliError::config_not_found(path.display().to_string()));
        }
    }
    Ok(config_loader::ConfigLoader::load_or_default(path)?)
}
