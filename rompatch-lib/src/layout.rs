//! Archive directory layout and the optional `rompatch.toml` overrides.
//!
//! Defaults, relative to the archive root:
//! ```text
//! config/                              systems.json, base-roms.json
//! metadata/<baserom>/*.md
//! patches/<baserom>/*.{bps,ips,...}
//! docs/manifest.json
//! docs/assets/css/generated/badges.css
//! .backup/
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use rompatch_core::ConfigTables;

use crate::error::ArchiveError;

pub const SETTINGS_FILE: &str = "rompatch.toml";

/// Resolved locations of everything the tools read or write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLayout {
    pub root: PathBuf,
    pub config_dir: PathBuf,
    pub metadata_dir: PathBuf,
    pub patches_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub badges_path: PathBuf,
    pub backup_dir: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    paths: PathOverrides,
}

#[derive(Debug, Default, Deserialize)]
struct PathOverrides {
    config: Option<PathBuf>,
    metadata: Option<PathBuf>,
    patches: Option<PathBuf>,
    manifest: Option<PathBuf>,
    badges: Option<PathBuf>,
    backup: Option<PathBuf>,
}

impl ArchiveLayout {
    /// The default layout under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            config_dir: root.join("config"),
            metadata_dir: root.join("metadata"),
            patches_dir: root.join("patches"),
            manifest_path: root.join("docs").join("manifest.json"),
            badges_path: root
                .join("docs")
                .join("assets")
                .join("css")
                .join("generated")
                .join("badges.css"),
            backup_dir: root.join(".backup"),
            root,
        }
    }

    /// The layout under `root`, with `rompatch.toml` overrides applied if present.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self, ArchiveError> {
        let mut layout = Self::new(root);
        let settings_path = layout.root.join(SETTINGS_FILE);
        if !settings_path.is_file() {
            return Ok(layout);
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| ArchiveError::io(settings_path.display().to_string(), e))?;
        let settings: SettingsFile =
            toml::from_str(&contents).map_err(|e| ArchiveError::Settings {
                path: settings_path.display().to_string(),
                source: e,
            })?;
        log::debug!("Loaded layout overrides from {}", settings_path.display());

        let p = settings.paths;
        let root = layout.root.clone();
        let resolve = |over: Option<PathBuf>, slot: &mut PathBuf| {
            if let Some(over) = over {
                *slot = root.join(over);
            }
        };
        resolve(p.config, &mut layout.config_dir);
        resolve(p.metadata, &mut layout.metadata_dir);
        resolve(p.patches, &mut layout.patches_dir);
        resolve(p.manifest, &mut layout.manifest_path);
        resolve(p.badges, &mut layout.badges_path);
        resolve(p.backup, &mut layout.backup_dir);
        Ok(layout)
    }

    pub fn load_tables(&self) -> Result<ConfigTables, ArchiveError> {
        Ok(ConfigTables::load(&self.config_dir)?)
    }

    /// Fail unless both the metadata and patches directories exist.
    pub fn require_archive_dirs(&self) -> Result<(), ArchiveError> {
        require_dir("Metadata", &self.metadata_dir)?;
        require_dir("Patches", &self.patches_dir)
    }

    /// `path` relative to the archive root, for display.
    pub fn display_path<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}

pub(crate) fn require_dir(kind: &'static str, dir: &Path) -> Result<(), ArchiveError> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(ArchiveError::dir_not_found(kind, dir.display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_settings_file() {
        let tmp = TempDir::new().unwrap();
        let layout = ArchiveLayout::load(tmp.path()).unwrap();
        assert_eq!(layout, ArchiveLayout::new(tmp.path()));
        assert_eq!(layout.metadata_dir, tmp.path().join("metadata"));
        assert_eq!(
            layout.badges_path,
            tmp.path().join("docs/assets/css/generated/badges.css")
        );
    }

    #[test]
    fn settings_override_selected_paths() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(SETTINGS_FILE),
            "[paths]\npatches = \"data/patches\"\nbackup = \"/var/backups/rompatch\"\n",
        )
        .unwrap();

        let layout = ArchiveLayout::load(tmp.path()).unwrap();
        assert_eq!(layout.patches_dir, tmp.path().join("data/patches"));
        assert_eq!(layout.backup_dir, PathBuf::from("/var/backups/rompatch"));
        assert_eq!(layout.metadata_dir, tmp.path().join("metadata"));
    }

    #[test]
    fn malformed_settings_is_fatal() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(SETTINGS_FILE), "[paths\n").unwrap();
        let err = ArchiveLayout::load(tmp.path()).unwrap_err();
        assert!(matches!(err, ArchiveError::Settings { .. }));
    }

    #[test]
    fn missing_archive_dirs_are_reported() {
        let tmp = TempDir::new().unwrap();
        let layout = ArchiveLayout::new(tmp.path());
        let err = layout.require_archive_dirs().unwrap_err();
        assert!(matches!(err, ArchiveError::DirNotFound { kind: "Metadata", .. }));

        std::fs::create_dir(&layout.metadata_dir).unwrap();
        let err = layout.require_archive_dirs().unwrap_err();
        assert!(matches!(err, ArchiveError::DirNotFound { kind: "Patches", .. }));

        std::fs::create_dir(&layout.patches_dir).unwrap();
        layout.require_archive_dirs().unwrap();
    }
}
