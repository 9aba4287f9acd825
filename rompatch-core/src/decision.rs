//! Resolve one metadata record and its patch file into a rename decision.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{ConfigTables, UNKNOWN_ABBR, UNKNOWN_CRC};
use crate::error::MetadataError;
use crate::metadata::{PatchMetadata, load_metadata};
use crate::standardize::{
    crc_from_filename, extract_year, generate_filename, normalize_title, parse_version,
};

/// The canonical name computed for one patch file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameDecision {
    pub old_filename: String,
    pub new_filename: String,
    pub metadata_path: PathBuf,
    pub patch_path: PathBuf,
    pub needs_rename: bool,
    pub warnings: Vec<String>,
}

impl RenameDecision {
    /// Path the patch file will have after renaming.
    pub fn target_path(&self) -> PathBuf {
        match self.patch_path.parent() {
            Some(dir) => dir.join(&self.new_filename),
            None => PathBuf::from(&self.new_filename),
        }
    }

    /// Stem of the new filename, used for the renamed metadata file.
    pub fn new_stem(&self) -> &str {
        Path::new(&self.new_filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.new_filename)
    }

    /// Path the metadata file will have after renaming (`<new stem>.md`).
    pub fn metadata_target_path(&self) -> PathBuf {
        let name = format!("{}.md", self.new_stem());
        match self.metadata_path.parent() {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }
}

/// Compute the decision for an already-parsed record.
pub fn resolve_decision(
    tables: &ConfigTables,
    metadata: &PatchMetadata,
    metadata_path: &Path,
    patch_path: &Path,
) -> RenameDecision {
    let mut warnings = Vec::new();

    let old_filename = patch_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let title = normalize_title(&metadata.title);
    if title.is_empty() {
        warnings.push(format!(
            "Title \"{}\" normalizes to an empty string",
            metadata.title
        ));
    }

    let system = tables.system_abbr(&metadata.system);
    if system == UNKNOWN_ABBR {
        warnings.push(format!("Unknown system: {}", metadata.system));
    }

    let baserom_name = metadata.base_rom.as_str();
    let baserom = tables.baserom_abbr(baserom_name);
    if baserom == UNKNOWN_ABBR {
        warnings.push(format!("Unknown base ROM: {baserom_name}"));
    }

    let hint = metadata
        .crc
        .as_deref()
        .or_else(|| crc_from_filename(&old_filename, baserom));
    let variants = tables.baserom_variants(baserom_name);
    let crc = tables.find_matching_crc(baserom_name, hint);
    if crc == UNKNOWN_CRC {
        warnings.push(format!("No CRC found for {baserom_name}"));
    }
    let hint_matched = hint.is_some_and(|h| variants.iter().any(|v| v.crc == h));
    if variants.len() > 1 && !hint_matched {
        let regions = variants
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        warnings.push(format!("Multiple CRC variants available: {regions}"));
    }

    let (version, variant) = parse_version(metadata.version.as_deref().unwrap_or(""));
    let year = extract_year(metadata.released.as_deref());
    let extension = patch_path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();

    let new_filename = generate_filename(
        &title, system, baserom, crc, &version, &variant, &year, &extension,
    );
    let needs_rename = old_filename != new_filename;

    RenameDecision {
        old_filename,
        new_filename,
        metadata_path: metadata_path.to_path_buf(),
        patch_path: patch_path.to_path_buf(),
        needs_rename,
        warnings,
    }
}

/// Load a metadata file and compute the decision for `patch_path`.
pub fn standardize_from_metadata(
    tables: &ConfigTables,
    metadata_path: &Path,
    patch_path: &Path,
) -> Result<RenameDecision, MetadataError> {
    let metadata = load_metadata(metadata_path)?;
    Ok(resolve_decision(tables, &metadata, metadata_path, patch_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> ConfigTables {
        let systems = serde_json::from_str(
            r#"{ "GBA": { "name": "Game Boy Advance" }, "NDS": { "name": "Nintendo DS" } }"#,
        )
        .unwrap();
        let base_roms = serde_json::from_str(
            r#"{
                "emerald": { "abbreviation": "EM", "variants": [{ "crc": "1961", "region": "USA" }] },
                "firered": {
                    "abbreviation": "FR",
                    "variants": [
                        { "crc": "BPRE", "region": "USA" },
                        { "crc": "84EE", "region": "USA Rev 1" }
                    ]
                },
                "bare": { "abbreviation": "BR" }
            }"#,
        )
        .unwrap();
        ConfigTables::new(systems, base_roms)
    }

    fn meta(title: &str, system: &str, base_rom: &str) -> PatchMetadata {
        PatchMetadata {
            title: title.to_string(),
            system: system.to_string(),
            base_rom: base_rom.to_string(),
            version: Some("v11.010".to_string()),
            released: Some("2025-01-04".to_string()),
            file: None,
            crc: None,
        }
    }

    fn decide(m: &PatchMetadata, patch: &str) -> RenameDecision {
        resolve_decision(
            &tables(),
            m,
            Path::new("metadata/emerald/ee.md"),
            &Path::new("patches/emerald").join(patch),
        )
    }

    #[test]
    fn canonical_name_for_single_variant() {
        let d = decide(
            &meta("Pokemon Emerald Enhanced", "Game Boy Advance", "emerald"),
            "ee.xdelta",
        );
        assert_eq!(d.new_filename, "EMERALD-ENHANCED_GBA_EM-1961_11.010_2025.xdelta");
        assert_eq!(d.old_filename, "ee.xdelta");
        assert!(d.needs_rename);
        assert!(d.warnings.is_empty(), "{:?}", d.warnings);
        assert_eq!(
            d.target_path(),
            Path::new("patches/emerald/EMERALD-ENHANCED_GBA_EM-1961_11.010_2025.xdelta")
        );
        assert_eq!(
            d.metadata_target_path(),
            Path::new("metadata/emerald/EMERALD-ENHANCED_GBA_EM-1961_11.010_2025.md")
        );
    }

    #[test]
    fn already_canonical_needs_no_rename() {
        let d = decide(
            &meta("Emerald Enhanced", "GBA", "emerald"),
            "EMERALD-ENHANCED_GBA_EM-1961_11.010_2025.xdelta",
        );
        assert!(!d.needs_rename);
    }

    #[test]
    fn unknown_lookups_use_sentinels() {
        let d = decide(&meta("Crystal Clear", "Game Boy Color", "crystal"), "cc.bps");
        assert_eq!(d.new_filename, "CRYSTAL-CLEAR_UNK_UNK-XXXX_11.010_2025.bps");
        assert!(d.warnings.iter().any(|w| w == "No CRC found for crystal"));
        assert!(d.warnings.iter().any(|w| w.starts_with("Unknown system")));
        assert!(d.warnings.iter().any(|w| w.starts_with("Unknown base ROM")));
    }

    #[test]
    fn base_rom_without_variants_warns() {
        let d = decide(&meta("Bare", "GBA", "bare"), "b.ips");
        assert_eq!(d.new_filename, "BARE_GBA_BR-XXXX_11.010_2025.ips");
        assert_eq!(d.warnings, vec!["No CRC found for bare".to_string()]);
    }

    #[test]
    fn multiple_variants_warn_and_use_first() {
        let d = decide(&meta("Fire Red Plus", "GBA", "firered"), "frp.bps");
        assert_eq!(d.new_filename, "FIRE-RED-PLUS_GBA_FR-BPRE_11.010_2025.bps");
        assert_eq!(
            d.warnings,
            vec!["Multiple CRC variants available: BPRE (USA), 84EE (USA Rev 1)".to_string()]
        );
    }

    #[test]
    fn metadata_crc_hint_resolves_ambiguity() {
        let mut m = meta("Fire Red Plus", "GBA", "firered");
        m.crc = Some("84EE".to_string());
        let d = decide(&m, "frp.bps");
        assert_eq!(d.new_filename, "FIRE-RED-PLUS_GBA_FR-84EE_11.010_2025.bps");
        assert!(d.warnings.is_empty());
    }

    #[test]
    fn filename_crc_hint_keeps_chosen_variant() {
        let d = decide(
            &meta("Fire Red Plus", "GBA", "firered"),
            "FIRE-RED-PLUS_GBA_FR-84EE_11.010_2025.bps",
        );
        assert!(!d.needs_rename);
        assert!(d.warnings.is_empty());
    }

    #[test]
    fn unmatched_hint_still_warns() {
        let mut m = meta("Fire Red Plus", "GBA", "firered");
        m.crc = Some("FFFF".to_string());
        let d = decide(&m, "frp.bps");
        assert!(d.new_filename.contains("FR-BPRE"));
        assert_eq!(d.warnings.len(), 1);
    }

    #[test]
    fn missing_version_and_date_fall_back() {
        let mut m = meta("Emerald Enhanced", "GBA", "emerald");
        m.version = None;
        m.released = Some("not a date".to_string());
        let d = decide(&m, "ee.xdelta");
        assert_eq!(d.new_filename, "EMERALD-ENHANCED_GBA_EM-1961_0.0_0000.xdelta");
    }

    #[test]
    fn empty_title_warns() {
        let d = decide(&meta("!!!", "GBA", "emerald"), "x.bps");
        assert!(d.new_filename.starts_with("_GBA_"));
        assert_eq!(d.warnings.len(), 1);
    }
}
