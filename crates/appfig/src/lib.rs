pub mod app_config;
pub mod block;
pub mod classmap;
pub mod document;
pub mod error;
pub mod installer;
pub mod ordering;

pub use app_config::AppConfig;
pub use block::{find_block, Block};
pub use classmap::ClassMap;
pub use document::Document;
pub use error::{InstallerError, Result};
pub use installer::{ConfigInstaller, CoreProvider, FacadeOutcome, ProviderInstall};
