//! Build configurations of a build unit

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::file_reference::FileRefId;

/// Whether a named configuration is a debug or a release build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigurationKind {
    Debug,
    Release,
}

/// One named configuration with its inline settings.
///
/// `base_configuration` points at the generated fragment file whose entries
/// take authority over any key it declares.
#[derive(Debug, Clone, Serialize)]
pub struct BuildConfiguration {
    pub name: String,
    pub kind: ConfigurationKind,
    pub build_settings: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_configuration: Option<FileRefId>,
}

impl BuildConfiguration {
    pub fn new(name: impl Into<String>, kind: ConfigurationKind) -> Self {
        BuildConfiguration {
            name: name.into(),
            kind,
            build_settings: BTreeMap::new(),
            base_configuration: None,
        }
    }

    pub fn is_debug(&self) -> bool {
        self.kind == ConfigurationKind::Debug
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.build_settings.insert(key.into(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_debug() {
        assert!(BuildConfiguration::new("Debug", ConfigurationKind::Debug).is_debug());
        assert!(!BuildConfiguration::new("App Store", ConfigurationKind::Release).is_debug());
    }

    #[test]
    fn test_kind_serde() {
        let kind: ConfigurationKind = serde_yaml::from_str("release").unwrap();
        assert_eq!(kind, ConfigurationKind::Release);
    }
}
