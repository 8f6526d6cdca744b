//! Installer-facing operations against a Laravel application.
//!
//! Each operation is self-contained: load `config/app.php`, scan, splice in
//! memory, rewrite the whole file. Nothing is cached across calls and no
//! locking is taken; the calling environment is a one-shot install script.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::app_config::AppConfig;
use crate::classmap::{class_from_source, ClassMap};
use crate::error::InstallerError;
use crate::Result;

/// The provider every package of a vendor shares, registered once before
/// any package-specific provider. Inserted together with its heading
/// comment at the sorted position.
#[derive(Debug, Clone)]
pub struct CoreProvider {
    pub class: String,
    pub heading: Vec<String>,
}

impl Default for CoreProvider {
    fn default() -> Self {
        CoreProvider {
            class: "Nodes\\ServiceProvider".to_string(),
            heading: vec![
                "/*".to_string(),
                " * Nodes Service Providers".to_string(),
                " */".to_string(),
            ],
        }
    }
}

/// Outcome of `install_service_provider`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderInstall {
    /// The provider was inserted; carries the resolved class name.
    Installed(String),
    AlreadyInstalled,
}

/// Outcome of `install_facades`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacadeOutcome {
    /// All requested aliases are present (inserted or already there).
    Applied,
    /// The config file has no aliases block; nothing was touched.
    Unsupported,
}

/// Laravel package auto-discovery metadata under `extra.laravel`.
#[derive(Debug, Default, Deserialize)]
struct PackageManifest {
    #[serde(default)]
    extra: ManifestExtra,
}

#[derive(Debug, Default, Deserialize)]
struct ManifestExtra {
    #[serde(default)]
    laravel: LaravelExtra,
}

#[derive(Debug, Default, Deserialize)]
struct LaravelExtra {
    #[serde(default)]
    providers: Vec<String>,
}

/// Registers one package's service provider and facades in an
/// application's `config/app.php`.
pub struct ConfigInstaller {
    app_root: PathBuf,
    package: String,
    config_path: PathBuf,
    core: CoreProvider,
}

impl ConfigInstaller {
    /// `package` is the Composer name, `vendor/name`.
    pub fn new(app_root: impl Into<PathBuf>, package: impl Into<String>) -> ConfigInstaller {
        let app_root = app_root.into();
        let config_path = app_root.join("config").join("app.php");
        ConfigInstaller {
            app_root,
            package: package.into(),
            config_path,
            core: CoreProvider::default(),
        }
    }

    pub fn with_core_provider(mut self, core: CoreProvider) -> ConfigInstaller {
        self.core = core;
        self
    }

    /// Override the config file location, relative to the app root.
    pub fn with_config_path(mut self, relative: impl AsRef<Path>) -> ConfigInstaller {
        self.config_path = self.app_root.join(relative);
        self
    }

    fn package_dir(&self) -> PathBuf {
        self.app_root.join("vendor").join(&self.package)
    }

    fn classmap_path(&self) -> PathBuf {
        self.app_root.join("vendor/composer/autoload_classmap.php")
    }

    /// Resolve the fully-qualified class of `provider_file` inside the
    /// package: classmap reverse lookup first, then the provider source
    /// itself. All failure modes are `Config` errors.
    fn provider_class(&self, provider_file: &str) -> Result<String> {
        let dir = self.package_dir();
        if !dir.is_dir() {
            return Err(InstallerError::Config(format!(
                "package directory missing: {}",
                dir.display()
            )));
        }

        let candidates = [dir.join("src").join(provider_file), dir.join(provider_file)];
        let path = candidates
            .iter()
            .find(|p| p.is_file())
            .ok_or_else(|| {
                InstallerError::Config(format!(
                    "provider file {provider_file} not found in {}",
                    dir.display()
                ))
            })?;

        let classmap_path = self.classmap_path();
        if classmap_path.is_file() {
            let map = ClassMap::load(&classmap_path)?;
            if let Some(class) = map.class_for_path(path) {
                log::debug!("Resolved {provider_file} via classmap: {class}");
                return Ok(class.to_string());
            }
        }

        let source = fs::read_to_string(path)?;
        class_from_source(&source).ok_or_else(|| {
            InstallerError::Config(format!(
                "could not resolve provider class from {}",
                path.display()
            ))
        })
    }

    /// Whether the package's provider is already registered. Never mutates
    /// the config file; a missing package or unresolvable provider is a
    /// `Config` error, not a silent `false`.
    pub fn is_package_installed(&self, provider_file: &str) -> Result<bool> {
        let class = self.provider_class(provider_file)?;
        let config = AppConfig::load(&self.config_path)?;
        config.has_provider(&class)
    }

    /// Idempotently ensure the core provider entry exists, heading comment
    /// included. Returns `true` when it was inserted.
    pub fn add_core_provider(&self) -> Result<bool> {
        let mut config = AppConfig::load(&self.config_path)?;
        if config.has_provider(&self.core.class)? {
            return Ok(false);
        }

        config.insert_provider(&self.core.class, &self.core.heading)?;
        config.save(&self.config_path)?;
        log::debug!("Inserted core provider {}", self.core.class);
        Ok(true)
    }

    /// Ensure the package's provider is registered, inserting the core
    /// provider first when it is itself missing.
    pub fn install_service_provider(&self, provider_file: &str) -> Result<ProviderInstall> {
        let class = self.provider_class(provider_file)?;
        let mut config = AppConfig::load(&self.config_path)?;

        if config.has_provider(&class)? {
            return Ok(ProviderInstall::AlreadyInstalled);
        }

        if !config.has_provider(&self.core.class)? {
            config.insert_provider(&self.core.class, &self.core.heading)?;
        }
        config.insert_provider(&class, &[])?;
        config.save(&self.config_path)?;

        log::debug!("Installed service provider {class}");
        Ok(ProviderInstall::Installed(class))
    }

    /// Register facade aliases, `short name -> facade class`, skipping
    /// pairs that are already present. A config file without an aliases
    /// block is reported as `Unsupported` and left untouched; an empty
    /// mapping is a `Config` error.
    pub fn install_facades(&self, aliases: &IndexMap<String, String>) -> Result<FacadeOutcome> {
        if aliases.is_empty() {
            return Err(InstallerError::Config("no facade aliases given".to_string()));
        }

        let mut config = AppConfig::load(&self.config_path)?;
        if !config.has_aliases_block() {
            log::debug!("No aliases block in {}, skipping facades", self.config_path.display());
            return Ok(FacadeOutcome::Unsupported);
        }

        let mut changed = false;
        for (name, class) in aliases {
            if config.has_alias(name)? {
                continue;
            }
            config.insert_alias(name, class)?;
            changed = true;
        }

        if changed {
            config.save(&self.config_path)?;
        }
        Ok(FacadeOutcome::Applied)
    }

    /// Providers the package declares for Laravel auto-discovery
    /// (`extra.laravel.providers` in its composer.json).
    pub fn discover_providers(&self) -> Result<Vec<String>> {
        let manifest_path = self.package_dir().join("composer.json");
        if !manifest_path.is_file() {
            return Err(InstallerError::Config(format!(
                "composer.json missing for package {}",
                self.package
            )));
        }

        let content = fs::read_to_string(&manifest_path)?;
        let manifest: PackageManifest = serde_json::from_str(&content)?;
        Ok(manifest.extra.laravel.providers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const APP_CONFIG: &str = "<?php\n\nreturn [\n\n    'providers' => [\n        App\\Providers\\RouteServiceProvider::class,\n    ],\n\n    'aliases' => [\n        'Alpha' => A\\Alpha::class,\n        'Gamma' => G\\Gamma::class,\n    ],\n\n];\n";

    const PROVIDER_SOURCE: &str =
        "<?php\nnamespace Vendor\\Pkg;\n\nclass ServiceProvider\n{\n}\n";

    /// Lay out a minimal application tree with one installed package.
    fn fixture_app() -> (TempDir, ConfigInstaller) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        fs::create_dir_all(root.join("config")).unwrap();
        fs::write(root.join("config/app.php"), APP_CONFIG).unwrap();

        let pkg_src = root.join("vendor/vendor/pkg/src");
        fs::create_dir_all(&pkg_src).unwrap();
        fs::write(pkg_src.join("ServiceProvider.php"), PROVIDER_SOURCE).unwrap();
        fs::write(
            root.join("vendor/vendor/pkg/composer.json"),
            r#"{"name": "vendor/pkg", "extra": {"laravel": {"providers": ["Vendor\\Pkg\\ServiceProvider"]}}}"#,
        )
        .unwrap();

        let installer = ConfigInstaller::new(root, "vendor/pkg");
        (dir, installer)
    }

    fn config_content(dir: &TempDir) -> String {
        fs::read_to_string(dir.path().join("config/app.php")).unwrap()
    }

    #[test]
    fn test_missing_package_dir_is_config_error() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        fs::write(dir.path().join("config/app.php"), APP_CONFIG).unwrap();

        let installer = ConfigInstaller::new(dir.path(), "missing/pkg");
        let err = installer.is_package_installed("ServiceProvider.php").unwrap_err();
        assert!(matches!(err, InstallerError::Config(_)));
    }

    #[test]
    fn test_missing_provider_file_is_config_error() {
        let (_dir, installer) = fixture_app();
        let err = installer.is_package_installed("OtherProvider.php").unwrap_err();
        assert!(matches!(err, InstallerError::Config(_)));
    }

    #[test]
    fn test_is_package_installed_does_not_mutate() {
        let (dir, installer) = fixture_app();
        assert!(!installer.is_package_installed("ServiceProvider.php").unwrap());
        assert_eq!(config_content(&dir), APP_CONFIG);
    }

    #[test]
    fn test_provider_class_prefers_classmap() {
        let (dir, installer) = fixture_app();
        let composer_dir = dir.path().join("vendor/composer");
        fs::create_dir_all(&composer_dir).unwrap();
        fs::write(
            composer_dir.join("autoload_classmap.php"),
            "<?php\n$vendorDir = dirname(__DIR__);\n$baseDir = dirname($vendorDir);\n\nreturn array(\n    'Mapped\\\\Provider' => $vendorDir . '/vendor/pkg/src/ServiceProvider.php',\n);\n",
        )
        .unwrap();

        let result = installer.install_service_provider("ServiceProvider.php").unwrap();
        assert_eq!(result, ProviderInstall::Installed("Mapped\\Provider".to_string()));
    }

    #[test]
    fn test_install_service_provider_inserts_core_first() {
        let (dir, installer) = fixture_app();
        let result = installer.install_service_provider("ServiceProvider.php").unwrap();
        assert_eq!(
            result,
            ProviderInstall::Installed("Vendor\\Pkg\\ServiceProvider".to_string())
        );

        let content = config_content(&dir);
        assert!(content.contains("Nodes\\ServiceProvider::class,"));
        assert!(content.contains("Vendor\\Pkg\\ServiceProvider::class,"));

        // App < Nodes < Vendor, segment-wise
        let app = content.find("App\\Providers\\RouteServiceProvider").unwrap();
        let core = content.find("Nodes\\ServiceProvider").unwrap();
        let pkg = content.find("Vendor\\Pkg\\ServiceProvider").unwrap();
        assert!(app < core && core < pkg);
    }

    #[test]
    fn test_install_service_provider_is_idempotent() {
        let (dir, installer) = fixture_app();
        installer.install_service_provider("ServiceProvider.php").unwrap();
        let after_first = config_content(&dir);

        let second = installer.install_service_provider("ServiceProvider.php").unwrap();
        assert_eq!(second, ProviderInstall::AlreadyInstalled);
        assert_eq!(config_content(&dir), after_first);
    }

    #[test]
    fn test_is_package_installed_after_install() {
        let (_dir, installer) = fixture_app();
        installer.install_service_provider("ServiceProvider.php").unwrap();
        assert!(installer.is_package_installed("ServiceProvider.php").unwrap());
    }

    #[test]
    fn test_add_core_provider_end_to_end() {
        let (dir, installer) = fixture_app();

        assert!(installer.add_core_provider().unwrap());
        let content = config_content(&dir);
        assert!(content.contains("         * Nodes Service Providers"));
        assert!(content.contains("        Nodes\\ServiceProvider::class,"));

        // Second call detects the existing entry and rewrites nothing.
        assert!(!installer.add_core_provider().unwrap());
        assert_eq!(config_content(&dir), content);
    }

    #[test]
    fn test_install_facades_sorted_and_idempotent() {
        let (dir, installer) = fixture_app();
        let mut aliases = IndexMap::new();
        aliases.insert("Beta".to_string(), "B\\Beta".to_string());
        aliases.insert("Alpha".to_string(), "A\\Alpha".to_string());

        let outcome = installer.install_facades(&aliases).unwrap();
        assert_eq!(outcome, FacadeOutcome::Applied);

        let content = config_content(&dir);
        let alpha = content.find("'Alpha'").unwrap();
        let beta = content.find("'Beta'").unwrap();
        let gamma = content.find("'Gamma'").unwrap();
        assert!(alpha < beta && beta < gamma);
        assert_eq!(content.matches("'Alpha'").count(), 1);
    }

    #[test]
    fn test_install_facades_without_aliases_block() {
        let (dir, installer) = fixture_app();
        fs::write(
            dir.path().join("config/app.php"),
            "<?php\nreturn [\n    'providers' => [\n    ],\n];\n",
        )
        .unwrap();
        let before = config_content(&dir);

        let mut aliases = IndexMap::new();
        aliases.insert("Beta".to_string(), "B\\Beta".to_string());
        let outcome = installer.install_facades(&aliases).unwrap();
        assert_eq!(outcome, FacadeOutcome::Unsupported);
        assert_eq!(config_content(&dir), before);
    }

    #[test]
    fn test_install_facades_empty_mapping_is_config_error() {
        let (_dir, installer) = fixture_app();
        let err = installer.install_facades(&IndexMap::new()).unwrap_err();
        assert!(matches!(err, InstallerError::Config(_)));
    }

    #[test]
    fn test_discover_providers() {
        let (_dir, installer) = fixture_app();
        assert_eq!(
            installer.discover_providers().unwrap(),
            vec!["Vendor\\Pkg\\ServiceProvider".to_string()]
        );
    }

    #[test]
    fn test_discover_providers_without_extra() {
        let (dir, installer) = fixture_app();
        fs::write(
            dir.path().join("vendor/vendor/pkg/composer.json"),
            r#"{"name": "vendor/pkg"}"#,
        )
        .unwrap();
        assert!(installer.discover_providers().unwrap().is_empty());
    }
}
