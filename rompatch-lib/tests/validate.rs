use rompatch_core::ConfigTables;
use rompatch_lib::{ArchiveLayout, validate_manifest, validate_pr_files};
use std::fs;
use tempfile::TempDir;

const CANONICAL: &str = "EMERALD-ENHANCED_GBA_EM-1961_11.010_2025.xdelta";

fn setup_archive() -> (TempDir, ArchiveLayout, ConfigTables) {
    let tmp = TempDir::new().unwrap();
    let layout = ArchiveLayout::new(tmp.path());
    fs::create_dir_all(&layout.config_dir).unwrap();
    fs::write(
        layout.config_dir.join("systems.json"),
        r#"{ "GBA": { "name": "Game Boy Advance" } }"#,
    )
    .unwrap();
    fs::write(
        layout.config_dir.join("base-roms.json"),
        r#"{ "emerald": { "abbreviation": "EM", "variants": [{ "crc": "1961", "region": "USA" }] } }"#,
    )
    .unwrap();
    for dir in ["metadata/emerald", "patches/emerald", "docs"] {
        fs::create_dir_all(tmp.path().join(dir)).unwrap();
    }
    let tables = layout.load_tables().unwrap();
    (tmp, layout, tables)
}

fn write_metadata(layout: &ArchiveLayout, stem: &str, file_ref: Option<&str>) {
    let file_line = file_ref
        .map(|f| format!("file: \"{f}\"\n"))
        .unwrap_or_default();
    fs::write(
        layout.metadata_dir.join("emerald").join(format!("{stem}.md")),
        format!(
            "---\ntitle: Emerald Enhanced\nsystem: GBA\nbaseRom: emerald\nversion: v11.010\nreleased: 2025-01-04\n{file_line}---\n"
        ),
    )
    .unwrap();
}

fn write_patch(layout: &ArchiveLayout, name: &str) {
    fs::write(layout.patches_dir.join("emerald").join(name), b"PATCH").unwrap();
}

fn write_manifest(layout: &ArchiveLayout, json: &str) {
    fs::write(&layout.manifest_path, json).unwrap();
}

#[test]
fn canonical_manifest_is_valid() {
    let (_tmp, layout, tables) = setup_archive();
    let stem = CANONICAL.trim_end_matches(".xdelta");
    write_metadata(&layout, stem, None);
    write_patch(&layout, CANONICAL);
    write_manifest(
        &layout,
        &format!(r#"[{{ "id": "ee", "file": "../patches/emerald/{CANONICAL}", "baseRom": "emerald" }}]"#),
    );

    let report = validate_manifest(&layout.manifest_path, &layout.metadata_dir, &tables);
    assert!(report.valid, "{:?}", report.errors);
}

#[test]
fn manifest_reports_each_problem() {
    let (_tmp, layout, tables) = setup_archive();
    write_metadata(&layout, "notes", Some("../patches/emerald/ee.xdelta"));
    write_patch(&layout, "ee.xdelta");
    write_patch(&layout, "lonely.bps");
    write_manifest(
        &layout,
        r#"[
  { "id": "ee", "file": "../patches/emerald/ee.xdelta", "baseRom": "emerald" },
  { "id": "gone", "file": "../patches/emerald/gone.bps", "baseRom": "emerald" },
  { "id": "fr", "file": "../patches/emerald/lonely.bps", "baseRom": "firered" },
  { "id": "lonely", "file": "../patches/emerald/lonely.bps", "baseRom": "emerald" }
]"#,
    );

    let report = validate_manifest(&layout.manifest_path, &layout.metadata_dir, &tables);
    assert!(!report.valid);
    assert_eq!(
        report.errors,
        vec![
            format!("Non-standard filename: ee.xdelta → {CANONICAL}"),
            "Missing patch file: ../patches/emerald/gone.bps".to_string(),
            "Missing metadata directory for firered".to_string(),
            "No metadata file found for ../patches/emerald/lonely.bps".to_string(),
        ]
    );
}

#[test]
fn entry_without_baserom_is_reported_alone() {
    let (_tmp, layout, tables) = setup_archive();
    write_patch(&layout, "ee.xdelta");
    write_manifest(
        &layout,
        r#"[
  { "id": "ee", "file": "../patches/emerald/ee.xdelta" },
  { "id": "gone", "file": "../patches/emerald/gone.bps", "baseRom": "emerald" }
]"#,
    );

    let report = validate_manifest(&layout.manifest_path, &layout.metadata_dir, &tables);
    assert_eq!(
        report.errors,
        vec![
            "Missing baseRom for ee".to_string(),
            "Missing patch file: ../patches/emerald/gone.bps".to_string(),
        ]
    );
}

#[test]
fn manifest_report_serializes_as_json() {
    let (_tmp, layout, tables) = setup_archive();
    write_manifest(&layout, "[]");
    let report = validate_manifest(&layout.manifest_path, &layout.metadata_dir, &tables);
    assert_eq!(
        serde_json::to_string(&report).unwrap(),
        r#"{"valid":true,"errors":[]}"#
    );
}

#[test]
fn pr_validation_lists_non_compliant_files() {
    let (tmp, layout, tables) = setup_archive();
    write_metadata(&layout, "ee", None);
    write_patch(&layout, "ee.xdelta");
    write_metadata(&layout, "no-patch", None);
    fs::write(layout.metadata_dir.join("emerald/bad.md"), "plain text\n").unwrap();

    let report =
        validate_pr_files(&layout.metadata_dir, &layout.patches_dir, &tables, tmp.path()).unwrap();
    assert!(!report.valid);
    assert_eq!(report.issues.len(), 2, "{:?}", report.issues);

    let error = &report.issues[0];
    assert_eq!(error.expected, "ERROR");
    assert!(error.current.ends_with("bad.md"));
    assert!(error.metadata.starts_with("Validation failed: "));

    let rename = &report.issues[1];
    assert_eq!(rename.current, "ee.xdelta");
    assert_eq!(rename.expected, CANONICAL);
    assert_eq!(
        rename.metadata,
        std::path::Path::new("metadata/emerald/ee.md").display().to_string()
    );
}

#[test]
fn pr_validation_clean_tree() {
    let (tmp, layout, tables) = setup_archive();
    let stem = CANONICAL.trim_end_matches(".xdelta");
    write_metadata(&layout, stem, None);
    write_patch(&layout, CANONICAL);

    let report =
        validate_pr_files(&layout.metadata_dir, &layout.patches_dir, &tables, tmp.path()).unwrap();
    assert!(report.valid);
    assert!(report.issues.is_empty());
}
