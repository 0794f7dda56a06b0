//! Application services (use cases).

mod config_composer;
mod connection_resolver;
mod deploy_service;
mod middleware_composer;
mod settings;

pub use config_composer::ConfigComposer;
pub use connection_resolver::{ConnectionResolver, DSN_KEY, OPTIONS_KEY};
pub use deploy_service::{DeployReport, DeployService};
pub use middleware_composer::MiddlewareComposer;
pub use settings::{ASSET_PATH_KEY, HttpClientSettings, TEMPLATE_PATHS_KEY, TemplateSettings};
