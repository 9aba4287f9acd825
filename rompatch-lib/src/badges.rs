//! Badge stylesheet generated from the config tables.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rompatch_core::{BaseRomRecord, ConfigTables, SystemRecord};

use crate::error::ArchiveError;

pub const CSS_HEADER: &str = "/* Auto-generated from config/systems.json and config/base-roms.json */
/* DO NOT EDIT MANUALLY - Run: rompatch badges */

";

const DEFAULT_GRADIENT: &str = "    background: linear-gradient(135deg, #667eea, #764ba2);";
const DEFAULT_TEXT: &str = "    color: #ffffff;";

/// `.badge-system` rules, one per system with colors, in key order.
pub fn generate_system_badges(systems: &BTreeMap<String, SystemRecord>) -> String {
    let mut css = vec![
        "/* System badges */".to_string(),
        ".badge-system {".to_string(),
        DEFAULT_GRADIENT.to_string(),
        DEFAULT_TEXT.to_string(),
        "}\n".to_string(),
    ];

    for (abbr, system) in systems {
        let Some(colors) = &system.colors else {
            continue;
        };
        match &system.released {
            Some(year) => css.push(format!("/* {} ({year}) */", system.name)),
            None => css.push(format!("/* {} */", system.name)),
        }
        css.push(format!(".badge-system[data-system=\"{}\"],", system.name));
        css.push(format!(".badge-system[data-system=\"{abbr}\"] {{"));
        css.push(format!(
            "    background: linear-gradient(135deg, {}, {});",
            colors.primary, colors.secondary
        ));
        css.push(format!("    color: {};", colors.text));
        css.push("}\n".to_string());
    }

    css.join("\n")
}

/// `.badge-rom` rules, one per base ROM with colors, sorted by key.
pub fn generate_rom_badges(base_roms: &BTreeMap<String, BaseRomRecord>) -> String {
    let mut css = vec![
        "/* ROM badges */".to_string(),
        ".badge-rom {".to_string(),
        DEFAULT_GRADIENT.to_string(),
        DEFAULT_TEXT.to_string(),
        "}\n".to_string(),
    ];

    for (key, rom) in base_roms {
        let Some(colors) = &rom.colors else {
            continue;
        };
        let name = rom.full_name.as_deref().unwrap_or(key);
        css.push(format!(".badge-rom[data-rom=\"{name}\"] {{"));
        css.push(format!(
            "    background: linear-gradient(135deg, {}, {});",
            colors.primary, colors.secondary
        ));
        css.push(format!("    color: {};", colors.text));
        css.push("}\n".to_string());
    }

    css.join("\n")
}

/// Full stylesheet body (without the header): system rules, then ROM rules.
pub fn generate_badge_css(tables: &ConfigTables) -> String {
    format!(
        "{}\n{}",
        generate_system_badges(&tables.systems),
        generate_rom_badges(&tables.base_roms)
    )
}

/// Write `css` to `path` behind [`CSS_HEADER`], creating parent directories.
pub fn write_css_file(path: &Path, css: &str) -> Result<(), ArchiveError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| ArchiveError::io(parent.display().to_string(), e))?;
    }
    fs::write(path, format!("{CSS_HEADER}{css}"))
        .map_err(|e| ArchiveError::io(path.display().to_string(), e))
}
