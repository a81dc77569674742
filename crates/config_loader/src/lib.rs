//! # Config Loader
//!
//! 配置加载与校验。
//!
//! 负责：
//! - 按扩展名解析 TOML / JSON，省略的段落取演示路线默认值
//! - 取值范围校验（速率顺序、坐标范围、sink 参数等）
//! - 将生效配置序列化回 TOML / JSON
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("route.toml")).unwrap();
//! println!("Vehicle: {}", blueprint.route.vehicle_id);
//! ```

mod parser;
mod validator;

pub use contracts::SimulationBlueprint;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Read, parse and validate a configuration file
    ///
    /// # Errors
    /// Unknown extension, unreadable file, malformed content or an out-of-range value.
    pub fn load_from_path(path: &Path) -> Result<SimulationBlueprint, ContractError> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load from `path` when given, otherwise the validated demo defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<SimulationBlueprint, ContractError> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => {
                let blueprint = SimulationBlueprint::default();
                validator::validate(&blueprint)?;
                Ok(blueprint)
            }
        }
    }

    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<SimulationBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }

    /// Re-run validation, e.g. after command-line overrides were applied
    pub fn validate(blueprint: &SimulationBlueprint) -> Result<(), ContractError> {
        validator::validate(blueprint)
    }

    /// Serialize the effective configuration, defaults included
    pub fn render(
        blueprint: &SimulationBlueprint,
        format: ConfigFormat,
    ) -> Result<String, ContractError> {
        parser::render(blueprint, format)
    }
}
