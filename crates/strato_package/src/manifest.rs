//! Package manifest parsing.
//!
//! The manifest is a TOML resource inside the container. It is parsed
//! once at load time and folded into the immutable metadata snapshot;
//! nothing re-reads it later.

use std::path::Path;

use serde::Deserialize;

use strato_shared::{ApiLevel, PackageMetadata};

use crate::error::{LoadError, LoadResult};

/// The declared contents of a package manifest.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageManifest {
    /// Package identifier, e.g. `com.example.app`.
    pub package_name: String,
    /// Human-readable version string.
    pub version_name: String,
    /// Monotonic version code.
    pub version_code: u32,
    /// Minimum platform level the package requires.
    pub min_sdk: ApiLevel,
    /// Platform level the package targets.
    pub target_sdk: ApiLevel,
    /// Fully-qualified name of the entry component.
    pub entry_component: String,
    /// Capabilities the package declares. Defaults to none.
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl PackageManifest {
    /// Parses a manifest from TOML bytes.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::ManifestInvalid`] when the bytes are not
    /// UTF-8, not valid TOML, or fail validation.
    pub fn parse(bytes: &[u8]) -> LoadResult<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| LoadError::ManifestInvalid(format!("manifest is not UTF-8: {e}")))?;
        let manifest: Self =
            toml::from_str(text).map_err(|e| LoadError::ManifestInvalid(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Checks the declared fields for internal consistency.
    fn validate(&self) -> LoadResult<()> {
        if self.package_name.is_empty() {
            return Err(LoadError::ManifestInvalid(
                "package_name must not be empty".to_owned(),
            ));
        }
        if self.entry_component.is_empty() {
            return Err(LoadError::ManifestInvalid(
                "entry_component must not be empty".to_owned(),
            ));
        }
        if self.min_sdk > self.target_sdk {
            return Err(LoadError::ManifestInvalid(format!(
                "min_sdk {} exceeds target_sdk {}",
                self.min_sdk, self.target_sdk
            )));
        }
        Ok(())
    }

    /// Folds the manifest into the immutable metadata snapshot.
    #[must_use]
    pub fn into_metadata(self, source_path: &Path) -> PackageMetadata {
        PackageMetadata::new(
            self.package_name,
            self.version_name,
            self.version_code,
            self.min_sdk,
            self.target_sdk,
            self.capabilities,
            self.entry_component,
            source_path.to_path_buf(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
        package_name = "com.example.demo"
        version_name = "1.0.0"
        version_code = 1
        min_sdk = 29
        target_sdk = 33
        entry_component = "com.example.demo.MainActivity"
        capabilities = ["strato.capability.INTERNET"]
    "#;

    #[test]
    fn test_parse_valid_manifest() {
        let manifest = PackageManifest::parse(VALID.as_bytes()).unwrap();
        assert_eq!(manifest.package_name, "com.example.demo");
        assert_eq!(manifest.min_sdk, ApiLevel::Api29);
        assert_eq!(manifest.target_sdk, ApiLevel::Api33);
        assert_eq!(manifest.capabilities.len(), 1);
    }

    #[test]
    fn test_capabilities_default_to_empty() {
        let toml = r#"
            package_name = "com.example.bare"
            version_name = "0.1"
            version_code = 1
            min_sdk = 29
            target_sdk = 29
            entry_component = "com.example.bare.Main"
        "#;
        let manifest = PackageManifest::parse(toml.as_bytes()).unwrap();
        assert!(manifest.capabilities.is_empty());
    }

    #[test]
    fn test_min_sdk_above_target_rejected() {
        let toml = r#"
            package_name = "com.example.bad"
            version_name = "0.1"
            version_code = 1
            min_sdk = 33
            target_sdk = 29
            entry_component = "com.example.bad.Main"
        "#;
        let err = PackageManifest::parse(toml.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::ManifestInvalid(_)));
    }

    #[test]
    fn test_unsupported_level_rejected() {
        let toml = r#"
            package_name = "com.example.old"
            version_name = "0.1"
            version_code = 1
            min_sdk = 21
            target_sdk = 29
            entry_component = "com.example.old.Main"
        "#;
        assert!(PackageManifest::parse(toml.as_bytes()).is_err());
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let err = PackageManifest::parse(&[0xFF, 0xFE, 0x00]).unwrap_err();
        assert!(matches!(err, LoadError::ManifestInvalid(_)));
    }

    #[test]
    fn test_into_metadata_carries_source_path() {
        let manifest = PackageManifest::parse(VALID.as_bytes()).unwrap();
        let meta = manifest.into_metadata(Path::new("/tmp/demo.pkg"));
        assert_eq!(meta.source_path(), Path::new("/tmp/demo.pkg"));
        assert_eq!(meta.entry_component(), "com.example.demo.MainActivity");
    }
}
