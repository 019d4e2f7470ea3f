use serde::Deserialize;
use std::sync::Arc;

use crate::executor::Timeouts;

/// Conformance class suffixes the background tests depend on.
pub const MAPS_CORE_CLASS: &str = "ogcapi-maps-1/1.0/conf/core";
pub const MAPS_BACKGROUND_CLASS: &str = "ogcapi-maps-1/1.0/conf/background";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Root URL of the implementation under test
    #[serde(default)]
    pub iut: Option<String>,
    /// Maximum number of collections inspected by the map operation test
    #[serde(default = "default_collection_limit")]
    pub collection_limit: usize,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub style: StyleConfig,
    #[serde(default = "default_required_classes")]
    pub required_classes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            iut: None,
            collection_limit: default_collection_limit(),
            map: MapConfig::default(),
            timeouts: TimeoutConfig::default(),
            style: StyleConfig::default(),
            required_classes: default_required_classes(),
        }
    }
}

fn default_collection_limit() -> usize {
    10
}

fn default_required_classes() -> Vec<String> {
    vec![MAPS_CORE_CLASS.to_string(), MAPS_BACKGROUND_CLASS.to_string()]
}

/// Fixed parameters of every map request
#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_size")]
    pub width: u32,
    #[serde(default = "default_size")]
    pub height: u32,
    #[serde(default = "default_valid_bbox")]
    pub valid_bbox: String,
    /// Exceeds the valid latitude range so the image edges fall in void areas
    #[serde(default = "default_void_bbox")]
    pub void_bbox: String,
    #[serde(default = "default_sample_inset")]
    pub sample_inset: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            width: default_size(),
            height: default_size(),
            valid_bbox: default_valid_bbox(),
            void_bbox: default_void_bbox(),
            sample_inset: default_sample_inset(),
        }
    }
}

fn default_format() -> String {
    "image/png".to_string()
}

fn default_size() -> u32 {
    400
}

fn default_valid_bbox() -> String {
    "-180,-90,180,90".to_string()
}

fn default_void_bbox() -> String {
    "-180,-120,180,120".to_string()
}

fn default_sample_inset() -> u32 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_map_connect")]
    pub map_connect_secs: u64,
    #[serde(default = "default_map_read")]
    pub map_read_secs: u64,
    #[serde(default = "default_precheck_connect")]
    pub precheck_connect_secs: u64,
    #[serde(default = "default_precheck_read")]
    pub precheck_read_secs: u64,
    #[serde(default = "default_discovery")]
    pub discovery_connect_secs: u64,
    #[serde(default = "default_discovery")]
    pub discovery_read_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            map_connect_secs: default_map_connect(),
            map_read_secs: default_map_read(),
            precheck_connect_secs: default_precheck_connect(),
            precheck_read_secs: default_precheck_read(),
            discovery_connect_secs: default_discovery(),
            discovery_read_secs: default_discovery(),
        }
    }
}

impl TimeoutConfig {
    pub fn map(&self) -> Timeouts {
        Timeouts::from_secs(self.map_connect_secs, self.map_read_secs)
    }

    pub fn precheck(&self) -> Timeouts {
        Timeouts::from_secs(self.precheck_connect_secs, self.precheck_read_secs)
    }

    pub fn discovery(&self) -> Timeouts {
        Timeouts::from_secs(self.discovery_connect_secs, self.discovery_read_secs)
    }
}

fn default_map_connect() -> u64 {
    30
}

fn default_map_read() -> u64 {
    60
}

fn default_precheck_connect() -> u64 {
    5
}

fn default_precheck_read() -> u64 {
    10
}

fn default_discovery() -> u64 {
    10
}

/// Style used by the bgcolor definition test. A configured id takes
/// precedence over auto-discovery.
#[derive(Debug, Clone, Deserialize)]
pub struct StyleConfig {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default = "default_auto_discover")]
    pub auto_discover: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            id: None,
            background: None,
            auto_discover: default_auto_discover(),
        }
    }
}

fn default_auto_discover() -> bool {
    true
}

impl Config {
    pub fn load() -> Result<Arc<Self>, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("mapsprobe").required(false))
            .add_source(
                config::Environment::with_prefix("MAPSPROBE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Config = config.try_deserialize()?;
        Ok(Arc::new(settings))
    }

    /// Settings for a given IUT with every other value at its default.
    pub fn for_iut(iut: impl Into<String>) -> Self {
        Self {
            iut: Some(iut.into()),
            ..Self::default()
        }
    }

    pub fn require_iut(&self) -> Result<&str, config::ConfigError> {
        self.iut
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| config::ConfigError::NotFound("iut".to_string()))
    }
}
