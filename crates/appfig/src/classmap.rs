//! Composer classmap lookup - resolves class names to files and back.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::Result;

/// Read-only map from fully-qualified class name to the file defining it,
/// loaded from Composer's generated `vendor/composer/autoload_classmap.php`.
pub struct ClassMap {
    entries: HashMap<String, PathBuf>,
}

impl ClassMap {
    /// Parse a generated classmap file.
    ///
    /// The file is scanned line by line for entries of the shape
    /// `'Fully\\Qualified\\Name' => $baseDir . '/path/File.php',`; the
    /// `$vendorDir`/`$baseDir` placeholders resolve relative to the
    /// classmap's own location, mirroring how Composer writes them.
    pub fn load(path: &Path) -> Result<ClassMap> {
        let content = std::fs::read_to_string(path)?;

        // vendor/composer/autoload_classmap.php: $vendorDir = dirname(__DIR__)
        let composer_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let vendor_dir = composer_dir.parent().unwrap_or(composer_dir).to_path_buf();
        let base_dir = vendor_dir.parent().unwrap_or(&vendor_dir).to_path_buf();

        let entry = Regex::new(
            r"'((?:[A-Za-z0-9_]+\\\\)*[A-Za-z0-9_]+)'\s*=>\s*\$(vendorDir|baseDir)\s*\.\s*'([^']+)'",
        )
        .unwrap();

        let mut entries = HashMap::new();
        for line in content.lines() {
            if let Some(caps) = entry.captures(line) {
                let class = caps[1].replace("\\\\", "\\");
                let root = if &caps[2] == "vendorDir" { &vendor_dir } else { &base_dir };
                let rel = caps[3].trim_start_matches('/');
                entries.insert(class, root.join(rel));
            }
        }

        log::debug!("Loaded {} classmap entries from {}", entries.len(), path.display());
        Ok(ClassMap { entries })
    }

    /// Build a classmap directly from entries.
    pub fn from_entries<I, S, P>(entries: I) -> ClassMap
    where
        I: IntoIterator<Item = (S, P)>,
        S: Into<String>,
        P: Into<PathBuf>,
    {
        ClassMap {
            entries: entries.into_iter().map(|(c, p)| (c.into(), p.into())).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// File defining `class`, if known.
    pub fn path_of(&self, class: &str) -> Option<&Path> {
        self.entries.get(class.trim_start_matches('\\')).map(PathBuf::as_path)
    }

    /// Reverse lookup: the class defined by `path`.
    pub fn class_for_path(&self, path: &Path) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, mapped)| mapped.as_path() == path)
            .map(|(class, _)| class.as_str())
    }
}

/// Extract the first class-like declaration from PHP source, namespace
/// included. Fallback for packages whose classmap has not been dumped yet.
pub fn class_from_source(content: &str) -> Option<String> {
    let namespace_re = Regex::new(r"(?m)^\s*namespace\s+([A-Za-z_][A-Za-z0-9_\\]*)\s*[;{]").unwrap();
    let class_re = Regex::new(
        r"(?m)^\s*(?:abstract\s+|final\s+)?(?:class|interface|trait|enum)\s+([A-Za-z_][A-Za-z0-9_]*)",
    )
    .unwrap();

    let name = class_re.captures(content)?.get(1)?.as_str();
    match namespace_re.captures(content).and_then(|c| c.get(1)) {
        Some(ns) => Some(format!("{}\\{}", ns.as_str(), name)),
        None => Some(name.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CLASSMAP: &str = r#"<?php

// autoload_classmap.php @generated by Composer

$vendorDir = dirname(__DIR__);
$baseDir = dirname($vendorDir);

return array(
    'App\\Providers\\AppServiceProvider' => $baseDir . '/app/Providers/AppServiceProvider.php',
    'Vendor\\Pkg\\ServiceProvider' => $vendorDir . '/vendor/pkg/src/ServiceProvider.php',
);
"#;

    fn write_classmap(dir: &TempDir) -> PathBuf {
        let composer_dir = dir.path().join("vendor/composer");
        fs::create_dir_all(&composer_dir).unwrap();
        let path = composer_dir.join("autoload_classmap.php");
        fs::write(&path, CLASSMAP).unwrap();
        path
    }

    #[test]
    fn test_load_resolves_base_and_vendor_dirs() {
        let dir = TempDir::new().unwrap();
        let map = ClassMap::load(&write_classmap(&dir)).unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(
            map.path_of("App\\Providers\\AppServiceProvider").unwrap(),
            dir.path().join("app/Providers/AppServiceProvider.php")
        );
        assert_eq!(
            map.path_of("Vendor\\Pkg\\ServiceProvider").unwrap(),
            dir.path().join("vendor/vendor/pkg/src/ServiceProvider.php")
        );
    }

    #[test]
    fn test_class_for_path() {
        let dir = TempDir::new().unwrap();
        let map = ClassMap::load(&write_classmap(&dir)).unwrap();

        let provider = dir.path().join("vendor/vendor/pkg/src/ServiceProvider.php");
        assert_eq!(map.class_for_path(&provider), Some("Vendor\\Pkg\\ServiceProvider"));
        assert_eq!(map.class_for_path(Path::new("/elsewhere/Other.php")), None);
    }

    #[test]
    fn test_path_of_ignores_leading_backslash() {
        let map = ClassMap::from_entries([("Foo\\Bar", "/src/Bar.php")]);
        assert!(map.path_of("\\Foo\\Bar").is_some());
    }

    #[test]
    fn test_class_from_source_namespaced() {
        let source = "<?php\nnamespace Vendor\\Pkg;\n\nclass ServiceProvider\n{\n}\n";
        assert_eq!(class_from_source(source), Some("Vendor\\Pkg\\ServiceProvider".to_string()));
    }

    #[test]
    fn test_class_from_source_global() {
        let source = "<?php\nfinal class Lonely {}\n";
        assert_eq!(class_from_source(source), Some("Lonely".to_string()));
    }

    #[test]
    fn test_class_from_source_none() {
        assert_eq!(class_from_source("<?php\nreturn [];\n"), None);
    }
}
