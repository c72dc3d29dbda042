mod env;
mod settings;
mod types;

pub use env::DEFAULT_ENV_PREFIX;
pub use settings::{GateSettings, locations_from_json};
pub use types::{
    BackendConfig, BackendKind, DEFAULT_COLLECTION_NAME, DEFAULT_COOKIE_NAME,
    DEFAULT_POSTGRES_DESCRIPTOR, DEFAULT_REDIRECT_TARGET, DEFAULT_REDIS_HOST, DEFAULT_REDIS_PORT,
    GateConfig,
};

pub(crate) use settings::validate_collection_name;
