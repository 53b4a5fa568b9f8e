use crate::error::Error;
use crate::hasher::{HashAlgorithm, DEFAULT_BLOCK_SIZE};
use crate::model::{IdentityPolicy, ReconcileOptions};
use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "RECONCILE";

/// Defaults for a run, overridable through `RECONCILE_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub remove_all_duplicates: bool,
    pub block_size: usize,
    pub hash_algorithm: HashAlgorithm,
    pub identity_policy: IdentityPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            remove_all_duplicates: true,
            block_size: DEFAULT_BLOCK_SIZE,
            hash_algorithm: HashAlgorithm::default(),
            identity_policy: IdentityPolicy::default(),
        }
    }
}

impl AppConfig {
    pub fn reconcile_options(&self, simulate: bool) -> ReconcileOptions {
        ReconcileOptions {
            remove_all_duplicates: self.remove_all_duplicates,
            simulate,
            identity_policy: self.identity_policy,
            hash_algorithm: self.hash_algorithm,
            block_size: self.block_size,
        }
    }
}

pub fn load_configuration() -> Result<AppConfig, Error> {
    build_configuration(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
}

fn build_configuration(environment: Environment) -> Result<AppConfig, Error> {
    let builder = Config::builder()
        .set_default("remove_all_duplicates", true)?
        .set_default("block_size", DEFAULT_BLOCK_SIZE as i64)?
        .set_default("hash_algorithm", "sha256")?
        .set_default("identity_policy", "content")?
        .add_source(environment)
        .build()?;
    let config = builder.try_deserialize::<AppConfig>()?;

    if config.block_size == 0 {
        return Err(ConfigError::Message("block_size must be greater than zero".to_string()).into());
    }

    Ok(config)
}
