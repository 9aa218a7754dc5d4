use crate::ProjectError;
use kinship_graph::{Canvas, Color, LayoutKind, LayoutSettings, palette_color};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub canvas: Canvas,
    pub default_layout: LayoutKind,
    pub layout: LayoutSettings,
    /// Screen-space radius for click hit testing.
    pub hit_radius: f32,
    /// Hex colors replacing the built-in generation palette. Empty keeps the default.
    pub palette: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            default_layout: LayoutKind::default(),
            layout: LayoutSettings::default(),
            hit_radius: 24.0,
            palette: Vec::new(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ProjectError> {
        let content = fs::read_to_string(path).map_err(|source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings = serde_json::from_str(&content)?;
        settings.check_palette()?;
        Ok(settings)
    }

    /// Reads `path` when given and present, otherwise falls back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ProjectError> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            Some(path) => {
                tracing::debug!("Settings file {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ProjectError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn check_palette(&self) -> Result<(), ProjectError> {
        for hex in &self.palette {
            if Color::from_hex(hex).is_none() {
                return Err(ProjectError::InvalidSetting(format!(
                    "palette color {hex} is not a hex color"
                )));
            }
        }
        Ok(())
    }

    /// Generation color honoring the palette override.
    pub fn generation_color(&self, generation: i32) -> String {
        palette_color(&self.palette, generation).to_hex()
    }

    /// Layout knobs with the top-level palette applied, unless the layout
    /// section carries its own.
    pub fn layout_settings(&self) -> LayoutSettings {
        let mut layout = self.layout.clone();
        if layout.palette.is_empty() {
            layout.palette = self.palette.clone();
        }
        layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "default_layout": "radial", "layout": { "margin": 10.0 } }"#)
            .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.default_layout, LayoutKind::Radial);
        assert_eq!(settings.layout.margin, 10.0);
        assert_eq!(settings.layout.node_radius, LayoutSettings::default().node_radius);
        assert_eq!(settings.canvas, Canvas::default());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let settings = Settings::load_or_default(Some(&dir.path().join("nope.json"))).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_palette_override() {
        let settings = Settings {
            palette: vec!["#111111".to_string(), "#222222".to_string()],
            ..Settings::default()
        };
        assert_eq!(settings.generation_color(0), "#111111");
        assert_eq!(settings.generation_color(3), "#222222");
        assert_eq!(settings.generation_color(-4), "#111111");
        assert_eq!(
            Settings::default().generation_color(0),
            kinship_graph::generation_color(0)
        );
    }

    #[test]
    fn test_layout_and_generations_agree_on_palette() {
        use kinship_core::{Connection, Person, RelationshipType};
        use kinship_graph::{calculate_generations, layouter_for};

        let settings = Settings {
            palette: vec!["#AA0000".to_string(), "#00aa00".to_string()],
            ..Settings::default()
        };
        let persons = vec![Person::new("mum", "Mum"), Person::new("kid", "Kid")];
        let connections = vec![Connection::new("e1", "mum", "kid", RelationshipType::Parent)];

        let generations = calculate_generations(&persons, &connections);
        let layout = layouter_for(LayoutKind::Tree, &settings.layout_settings()).layout(
            &persons,
            &connections,
            settings.canvas,
        );
        for node in &layout.nodes {
            let generation = generations[&node.person_id].generation;
            assert_eq!(node.colors.fill, settings.generation_color(generation));
        }
        assert_eq!(settings.generation_color(0), "#aa0000");
    }

    #[test]
    fn test_bad_palette_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "palette": ["teal"] }"#).unwrap();
        assert!(matches!(
            Settings::load(&path),
            Err(ProjectError::InvalidSetting(_))
        ));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            hit_radius: 12.0,
            default_layout: LayoutKind::Force,
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }
}
