use crate::action::CameraAction;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use winit::keyboard::KeyCode;

/// Errors loading bindings or control configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Key chords for each camera action. A chord fires only while every key
/// in it is held; an empty chord never fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraBindings {
    pub forward: Vec<KeyCode>,
    pub backward: Vec<KeyCode>,
    pub right: Vec<KeyCode>,
    pub left: Vec<KeyCode>,
    pub up: Vec<KeyCode>,
    pub down: Vec<KeyCode>,
}

impl Default for CameraBindings {
    fn default() -> Self {
        Self {
            forward: vec![KeyCode::KeyW],
            backward: vec![KeyCode::KeyS],
            right: vec![KeyCode::KeyD],
            left: vec![KeyCode::KeyA],
            up: vec![KeyCode::KeyQ],
            down: vec![KeyCode::KeyE],
        }
    }
}

impl CameraBindings {
    pub fn keys(&self, action: CameraAction) -> &[KeyCode] {
        match action {
            CameraAction::Forward => &self.forward,
            CameraAction::Backward => &self.backward,
            CameraAction::Right => &self.right,
            CameraAction::Left => &self.left,
            CameraAction::Up => &self.up,
            CameraAction::Down => &self.down,
        }
    }
}

/// All key bindings of the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub camera: CameraBindings,
}

impl KeyBindings {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let bindings = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.display(), "key bindings loaded");
        Ok(bindings)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_wsdaqe() {
        let b = KeyBindings::default();
        assert_eq!(b.camera.keys(CameraAction::Forward), &[KeyCode::KeyW]);
        assert_eq!(b.camera.keys(CameraAction::Backward), &[KeyCode::KeyS]);
        assert_eq!(b.camera.keys(CameraAction::Right), &[KeyCode::KeyD]);
        assert_eq!(b.camera.keys(CameraAction::Left), &[KeyCode::KeyA]);
        assert_eq!(b.camera.keys(CameraAction::Up), &[KeyCode::KeyQ]);
        assert_eq!(b.camera.keys(CameraAction::Down), &[KeyCode::KeyE]);
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let yaml = "camera:\n  forward: [ShiftLeft, ArrowUp]\n";
        let b = KeyBindings::from_yaml_str(yaml).unwrap();
        assert_eq!(b.camera.forward, vec![KeyCode::ShiftLeft, KeyCode::ArrowUp]);
        assert_eq!(b.camera.left, vec![KeyCode::KeyA]);
    }

    #[test]
    fn yaml_survives_save_and_load() {
        let mut b = KeyBindings::default();
        b.camera.up = vec![KeyCode::Space];
        let text = b.to_yaml().unwrap();
        assert_eq!(KeyBindings::from_yaml_str(&text).unwrap(), b);
    }

    #[test]
    fn unknown_key_is_a_parse_error() {
        let err = KeyBindings::from_yaml_str("camera:\n  up: [NotAKey]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = KeyBindings::load(Path::new("/nonexistent/bindings.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/bindings.yaml"));
    }
}
