//! Read-only configuration tables: style presets, modifier fragments and the
//! social creator's platforms and moods.
//!
//! A [`Catalog`] is built once (either [`Catalog::builtin`] or a JSON file) and
//! then shared immutably. Table order is meaningful: modifier fragments are
//! always concatenated in catalog order.

mod builtin;

use std::path::Path;

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylePreset {
    pub id: String,
    pub name: String,
    pub description: String,
    pub prompt_template: String,
    /// Opaque presentation reference; never inspected by the engine.
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierFragment {
    pub id: String,
    pub label: String,
    pub prompt_fragment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub id: String,
    pub name: String,
    pub aspect_ratio: String,
    /// Tone and composition hints handed to the drafting model.
    #[serde(default)]
    pub guidance: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mood {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    styles: IndexMap<String, StylePreset>,
    modifiers: IndexMap<String, ModifierFragment>,
    platforms: IndexMap<String, Platform>,
    moods: IndexMap<String, Mood>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    styles: Option<Vec<StylePreset>>,
    #[serde(default)]
    modifiers: Option<Vec<ModifierFragment>>,
    #[serde(default)]
    platforms: Option<Vec<Platform>>,
    #[serde(default)]
    moods: Option<Vec<Mood>>,
}

impl Catalog {
    pub fn builtin() -> Self {
        Self {
            styles: builtin::styles(),
            modifiers: builtin::modifiers(),
            platforms: builtin::platforms(),
            moods: builtin::moods(),
        }
    }

    /// Parses a catalog document. Sections that are absent fall back to the
    /// built-in tables; duplicate ids within a section are rejected.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let file: CatalogFile =
            serde_json::from_str(raw).context("catalog is not valid JSON")?;
        let builtin = Self::builtin();
        Ok(Self {
            styles: match file.styles {
                Some(rows) => index_unique("styles", rows, |row| &row.id)?,
                None => builtin.styles,
            },
            modifiers: match file.modifiers {
                Some(rows) => index_unique("modifiers", rows, |row| &row.id)?,
                None => builtin.modifiers,
            },
            platforms: match file.platforms {
                Some(rows) => index_unique("platforms", rows, |row| &row.id)?,
                None => builtin.platforms,
            },
            moods: match file.moods {
                Some(rows) => index_unique("moods", rows, |row| &row.id)?,
                None => builtin.moods,
            },
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed reading catalog {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("invalid catalog {}", path.display()))
    }

    pub fn style(&self, id: &str) -> Option<&StylePreset> {
        self.styles.get(id)
    }

    pub fn styles(&self) -> impl Iterator<Item = &StylePreset> {
        self.styles.values()
    }

    pub fn modifier(&self, id: &str) -> Option<&ModifierFragment> {
        self.modifiers.get(id)
    }

    /// Modifiers in catalog order.
    pub fn modifiers(&self) -> impl Iterator<Item = &ModifierFragment> {
        self.modifiers.values()
    }

    pub fn platform(&self, id: &str) -> Option<&Platform> {
        self.platforms.get(id)
    }

    pub fn platforms(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.values()
    }

    pub fn default_platform(&self) -> Option<&Platform> {
        self.platforms.values().next()
    }

    pub fn mood(&self, id: &str) -> Option<&Mood> {
        self.moods.get(id)
    }

    pub fn moods(&self) -> impl Iterator<Item = &Mood> {
        self.moods.values()
    }

    pub fn default_mood(&self) -> Option<&Mood> {
        self.moods.values().next()
    }
}

fn index_unique<T>(
    section: &str,
    rows: Vec<T>,
    key: impl Fn(&T) -> &String,
) -> Result<IndexMap<String, T>> {
    let mut map = IndexMap::with_capacity(rows.len());
    for row in rows {
        let id = key(&row).trim().to_string();
        if id.is_empty() {
            bail!("catalog section '{section}' contains an entry with an empty id");
        }
        if map.contains_key(&id) {
            bail!("catalog section '{section}' contains duplicate id '{id}'");
        }
        map.insert(id, row);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::Catalog;

    #[test]
    fn builtin_tables_have_expected_shape() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.styles().count(), 10);
        assert_eq!(catalog.modifiers().count(), 14);
        assert_eq!(catalog.platforms().count(), 6);
        assert_eq!(catalog.moods().count(), 9);

        let headshot = catalog.style("studio-headshot").map(|style| style.name.as_str());
        assert_eq!(headshot, Some("Studio Headshot"));
        assert_eq!(
            catalog.modifiers().next().map(|row| row.id.as_str()),
            Some("maintain-likeness")
        );
        assert_eq!(
            catalog.default_platform().map(|row| row.id.as_str()),
            Some("linkedin")
        );
        assert_eq!(
            catalog.platform("instagram-story").map(|row| row.aspect_ratio.as_str()),
            Some("9:16")
        );
        assert_eq!(
            catalog.default_mood().map(|row| row.id.as_str()),
            Some("professional")
        );
    }

    #[test]
    fn json_catalog_overrides_sections_and_keeps_order() -> anyhow::Result<()> {
        let catalog = Catalog::from_json_str(
            r#"{
                "modifiers": [
                    {"id": "b", "label": "B", "prompt_fragment": "second"},
                    {"id": "a", "label": "A", "prompt_fragment": "first"}
                ]
            }"#,
        )?;
        let ids: Vec<&str> = catalog.modifiers().map(|row| row.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(catalog.styles().count(), 10);
        Ok(())
    }

    #[test]
    fn json_catalog_rejects_duplicate_ids() {
        let err = Catalog::from_json_str(
            r#"{"moods": [{"id": "calm", "label": "Calm"}, {"id": "calm", "label": "Again"}]}"#,
        )
        .err()
        .map(|err| err.to_string())
        .unwrap_or_default();
        assert_eq!(err, "catalog section 'moods' contains duplicate id 'calm'");
    }

    #[test]
    fn load_reads_catalog_file() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{"styles": [{"id": "noir", "name": "Noir", "description": "d", "prompt_template": "Film noir."}]}"#,
        )?;
        let catalog = Catalog::load(&path)?;
        assert_eq!(catalog.styles().count(), 1);
        assert_eq!(
            catalog.style("noir").map(|row| row.icon.as_str()),
            Some("")
        );
        Ok(())
    }
}
