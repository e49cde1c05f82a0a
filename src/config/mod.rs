mod types;

pub use types::load_config;
pub use types::Config;
pub use types::ExistingPositionPolicy;
pub use types::ManagerConfig;
