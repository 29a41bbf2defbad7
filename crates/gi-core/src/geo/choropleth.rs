use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::aggregate::CountrySelection;
use crate::colors::{choropleth_color, Rgb};
use crate::types::CountryAggregate;
use crate::ConfigError;

const STROKE_SELECTED: Rgb = Rgb::new(0x11, 0x18, 0x27);
const STROKE_DEFAULT: Rgb = Rgb::new(0x66, 0x66, 0x66);

/// Country features from a world boundaries `GeoJSON` file.
///
/// Only the `ISO_A2` and `ADMIN` properties are kept; geometry is left to
/// whatever ends up drawing the polygons.
#[derive(Debug, Clone, Default)]
pub struct WorldBoundaries {
    pub features: Vec<WorldFeature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldFeature {
    pub iso: String,
    pub name: String,
}

#[derive(Deserialize)]
struct RawCollection {
    #[serde(default)]
    features: Vec<RawFeature>,
}

#[derive(Deserialize)]
struct RawFeature {
    #[serde(default)]
    properties: RawProperties,
}

#[derive(Default, Deserialize)]
struct RawProperties {
    #[serde(rename = "ISO_A2", default)]
    iso_a2: Option<String>,
    #[serde(rename = "ADMIN", default)]
    admin: Option<String>,
}

impl WorldBoundaries {
    /// Parse a `GeoJSON` `FeatureCollection`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::WorldFileParse`] if the document is not a
    /// feature collection.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let raw: RawCollection = serde_json::from_str(json).map_err(ConfigError::WorldFileParse)?;
        let features = raw
            .features
            .into_iter()
            .map(|f| {
                let iso = f.properties.iso_a2.unwrap_or_default().to_uppercase();
                let name = f.properties.admin.unwrap_or_else(|| iso.clone());
                WorldFeature { iso, name }
            })
            .collect();
        Ok(Self { features })
    }
}

/// Read world boundaries from disk.
///
/// # Errors
///
/// Returns [`ConfigError::WorldFileIo`] if the file cannot be read, or
/// [`ConfigError::WorldFileParse`] if it is not valid `GeoJSON`.
pub fn load_world(path: &Path) -> Result<WorldBoundaries, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::WorldFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    WorldBoundaries::from_json_str(&content)
}

/// How one country polygon should be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureStyle {
    pub iso: String,
    pub name: String,
    pub fill: Rgb,
    pub stroke: Rgb,
    pub weight: f64,
    pub fill_opacity: f64,
    pub tooltip: String,
    pub aggregate: Option<CountryAggregate>,
    pub selected: bool,
}

/// Style every feature in `world` from the per-country aggregates.
#[must_use]
pub fn choropleth_styles(
    world: &WorldBoundaries,
    countries: &[CountryAggregate],
    selection: &CountrySelection,
) -> Vec<FeatureStyle> {
    let by_iso: HashMap<String, &CountryAggregate> = countries
        .iter()
        .map(|c| (c.cc.to_uppercase(), c))
        .collect();

    world
        .features
        .iter()
        .map(|feature| {
            let rec = by_iso.get(&feature.iso).copied();
            let selected = selection.is_selected(&feature.iso);
            let tooltip = match rec {
                Some(r) => format!(
                    "{}\nAvg sentiment: {:.2}\nPosts: {}",
                    feature.name, r.avg, r.n
                ),
                None => format!("{}\nNo data", feature.name),
            };
            FeatureStyle {
                iso: feature.iso.clone(),
                name: feature.name.clone(),
                fill: choropleth_color(rec.map(|r| r.avg)),
                stroke: if selected { STROKE_SELECTED } else { STROKE_DEFAULT },
                weight: if selected { 1.5 } else { 0.6 },
                fill_opacity: if rec.is_some() { 0.85 } else { 0.35 },
                tooltip,
                aggregate: rec.cloned(),
                selected,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::NO_DATA;

    const WORLD: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "properties": { "ISO_A2": "DE", "ADMIN": "Germany" }, "geometry": null },
            { "type": "Feature", "properties": { "ISO_A2": "fr", "ADMIN": "France" }, "geometry": null },
            { "type": "Feature", "properties": { "ISO_A2": "NO" }, "geometry": null }
        ]
    }"#;

    #[test]
    fn parses_features_and_uppercases_codes() {
        let world = WorldBoundaries::from_json_str(WORLD).unwrap();
        assert_eq!(world.features.len(), 3);
        assert_eq!(world.features[1].iso, "FR");
        assert_eq!(world.features[2].name, "NO");
    }

    #[test]
    fn rejects_non_geojson() {
        let err = WorldBoundaries::from_json_str("[1, 2]").unwrap_err();
        assert!(matches!(err, ConfigError::WorldFileParse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_world(Path::new("/definitely/not/here.geo.json")).unwrap_err();
        assert!(matches!(err, ConfigError::WorldFileIo { .. }));
    }

    #[test]
    fn styles_reflect_data_and_selection() {
        let world = WorldBoundaries::from_json_str(WORLD).unwrap();
        let countries = vec![CountryAggregate {
            cc: "de".to_string(),
            n: 7,
            avg: 0.5,
        }];
        let mut selection = CountrySelection::default();
        selection.toggle("FR");

        let styles = choropleth_styles(&world, &countries, &selection);

        let de = &styles[0];
        assert_eq!(de.fill.css(), "rgb(110, 220, 140)");
        assert_eq!(de.fill_opacity, 0.85);
        assert_eq!(de.tooltip, "Germany\nAvg sentiment: 0.50\nPosts: 7");
        assert!(!de.selected);
        assert_eq!(de.weight, 0.6);

        let fr = &styles[1];
        assert_eq!(fr.fill, NO_DATA);
        assert_eq!(fr.fill_opacity, 0.35);
        assert_eq!(fr.tooltip, "France\nNo data");
        assert!(fr.selected);
        assert_eq!(fr.stroke.hex(), "#111827");
        assert_eq!(fr.weight, 1.5);
    }
}
