use anyhow::Context;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use terrastream_common::{AREA_SIZE, AreaIndex};
use terrastream_input::{CameraControlConfig, KeyBindings};
use terrastream_stream::StreamConfig;
use terrastream_terrain::TerrainShape;

/// Everything a simulation run can be configured with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub stream: StreamConfig,
    pub camera: CameraControlConfig,
    pub bindings: KeyBindings,
    pub terrain: TerrainShape,
    /// Camera start position.
    pub start: Vec3,
    /// Areas without data; they load as invalid tiles.
    pub missing_areas: Vec<AreaIndex>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            stream: StreamConfig::default(),
            camera: CameraControlConfig::default(),
            bindings: KeyBindings::default(),
            terrain: TerrainShape::default(),
            start: Vec3::new(32.5 * AREA_SIZE, 120.0, 32.5 * AREA_SIZE),
            missing_areas: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_yaml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::KeyCode;

    #[test]
    fn default_config_round_trips_through_yaml() {
        let config = AppConfig::default();
        let text = config.to_yaml().unwrap();
        let back: AppConfig = serde_yaml::from_str(&text).unwrap();
        assert_eq!(back.stream, config.stream);
        assert_eq!(back.bindings, config.bindings);
        assert_eq!(back.start, config.start);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let yaml = "stream:\n  load_radius: 3\nbindings:\n  camera:\n    up: [Space]\nmissing_areas:\n  - { x: 1, y: 2 }\n";
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.stream.load_radius, 3);
        assert_eq!(config.stream.unload_radius, 2);
        assert_eq!(config.bindings.camera.up, vec![KeyCode::Space]);
        assert_eq!(config.bindings.camera.forward, vec![KeyCode::KeyW]);
        assert_eq!(config.missing_areas, vec![AreaIndex::new(1, 2)]);
        assert_eq!(config.camera.turn_factor, 0.2);
    }
}
