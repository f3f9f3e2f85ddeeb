// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{BannerSize, Platform};

/// Ad network test banner units, used in development builds.
const TEST_BANNER_ANDROID: &str = "ca-app-pub-3940256099942544/6300978111";
const TEST_BANNER_IOS: &str = "ca-app-pub-3940256099942544/2934735716";

/// Production banner unit identifiers per platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdUnitIds {
    pub android: String,
    pub ios: String,
}

impl Default for AdUnitIds {
    fn default() -> Self {
        Self {
            android: "ca-app-pub-7896727622535419/9945496251".into(),
            ios: "ca-app-pub-7896727622535419/3140414754".into(),
        }
    }
}

/// Host application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// URL of the embedded web document.
    pub document_url: String,
    /// Production banner unit identifiers.
    pub ad_unit_ids: AdUnitIds,
    /// Development builds show the ad network's test banner.
    pub development_build: bool,
    /// Request non-personalized ads only.
    pub non_personalized_ads_only: bool,
    /// Banner size requested from the ad surface.
    pub banner_size: BannerSize,
    /// SKUs offered by the desktop stub store.
    pub catalog: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            document_url: "https://www.during.money".into(),
            ad_unit_ids: AdUnitIds::default(),
            development_build: cfg!(debug_assertions),
            non_personalized_ads_only: true,
            banner_size: BannerSize::FullBanner,
            catalog: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Effective banner unit identifier for the given platform.
    ///
    /// Returns `None` on platforms without an ad surface.
    pub fn ad_unit_id(&self, platform: Platform) -> Option<&str> {
        match (platform, self.development_build) {
            (Platform::Android, true) => Some(TEST_BANNER_ANDROID),
            (Platform::Ios, true) => Some(TEST_BANNER_IOS),
            (Platform::Android, false) => Some(&self.ad_unit_ids.android),
            (Platform::Ios, false) => Some(&self.ad_unit_ids.ios),
            (Platform::Other, _) => None,
        }
    }

    /// Read configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Write configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_build_uses_test_units() {
        let config = AppConfig {
            development_build: true,
            ..Default::default()
        };
        assert_eq!(config.ad_unit_id(Platform::Android), Some(TEST_BANNER_ANDROID));
        assert_eq!(config.ad_unit_id(Platform::Ios), Some(TEST_BANNER_IOS));
    }

    #[test]
    fn production_build_uses_configured_units() {
        let config = AppConfig {
            development_build: false,
            ..Default::default()
        };
        assert_eq!(
            config.ad_unit_id(Platform::Ios),
            Some("ca-app-pub-7896727622535419/3140414754")
        );
        assert_eq!(config.ad_unit_id(Platform::Other), None);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kassa.json");
        let config = AppConfig {
            catalog: vec!["coins_100".into(), "remove_ads".into()],
            non_personalized_ads_only: false,
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.catalog, config.catalog);
        assert!(!loaded.non_personalized_ads_only);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kassa.json");
        std::fs::write(&path, r#"{"catalog":["coins_100"]}"#).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.catalog, vec!["coins_100".to_string()]);
        assert_eq!(loaded.document_url, "https://www.during.money");
        assert_eq!(loaded.banner_size, BannerSize::FullBanner);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, crate::KassaError::Io(_)));
    }
}
