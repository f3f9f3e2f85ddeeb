// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ad visibility — whether the promotional banner is mounted.

use kassa_core::AppConfig;
use kassa_core::types::{BannerSize, Platform};

/// What the shell needs to mount the banner surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdBanner {
    pub unit_id: String,
    pub size: BannerSize,
    pub non_personalized_ads_only: bool,
}

impl AdBanner {
    /// Resolve the banner for this platform. `None` where no unit exists.
    pub fn from_config(config: &AppConfig, platform: Platform) -> Option<Self> {
        let unit_id = config.ad_unit_id(platform)?;
        Some(Self {
            unit_id: unit_id.to_owned(),
            size: config.banner_size,
            non_personalized_ads_only: config.non_personalized_ads_only,
        })
    }
}

/// Holds the ad visibility flag. Starts visible; only the web document
/// changes it, and the last write wins.
#[derive(Debug, Clone)]
pub struct AdVisibilityController {
    visible: bool,
    banner: Option<AdBanner>,
}

impl AdVisibilityController {
    pub fn new(banner: Option<AdBanner>) -> Self {
        Self {
            visible: true,
            banner,
        }
    }

    /// Returns `true` when the value changed.
    pub fn set_visible(&mut self, visible: bool) -> bool {
        let changed = self.visible != visible;
        self.visible = visible;
        changed
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The banner to mount, or `None` while hidden.
    pub fn banner(&self) -> Option<&AdBanner> {
        if self.visible { self.banner.as_ref() } else { None }
    }
}
