//! Systems and base-ROM lookup tables.
//!
//! Both tables live as JSON objects in the archive's `config/` directory:
//!
//! ```text
//! config/
//!   systems.json     { "GBA": { "name": "Game Boy Advance", "released": 2001, "colors": {...} } }
//!   base-roms.json   { "Emerald": { "abbreviation": "EM", "variants": [{ "crc": "1961", "region": "USA" }] } }
//! ```
//!
//! The tables are loaded once per invocation and handed to the standardizer
//! as a read-only [`ConfigTables`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Abbreviation used when a system or base ROM has no config entry.
pub const UNKNOWN_ABBR: &str = "UNK";

/// CRC code used when a base ROM has no registered variants.
pub const UNKNOWN_CRC: &str = "XXXX";

pub const SYSTEMS_FILE: &str = "systems.json";
pub const BASE_ROMS_FILE: &str = "base-roms.json";

/// Badge color triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeColors {
    pub primary: String,
    pub secondary: String,
    pub text: String,
}

/// Release year as written in `systems.json`: either `2001` or `"2001"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReleaseYear {
    Number(u32),
    Text(String),
}

impl fmt::Display for ReleaseYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseYear::Number(n) => write!(f, "{n}"),
            ReleaseYear::Text(s) => f.write_str(s),
        }
    }
}

/// A console definition, keyed by its abbreviation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemRecord {
    /// Full display name (e.g., "Game Boy Advance")
    pub name: String,
    #[serde(default)]
    pub released: Option<ReleaseYear>,
    #[serde(default)]
    pub colors: Option<BadgeColors>,
}

/// One regional release of a base ROM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrcVariant {
    pub crc: String,
    #[serde(default)]
    pub region: String,
}

impl fmt::Display for CrcVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.crc, self.region)
    }
}

/// A base ROM definition, keyed by the name metadata files use in `baseRom`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseRomRecord {
    pub abbreviation: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub variants: Vec<CrcVariant>,
    #[serde(default)]
    pub colors: Option<BadgeColors>,
}

/// The two config tables, loaded once and passed by reference.
#[derive(Debug, Clone, Default)]
pub struct ConfigTables {
    pub systems: BTreeMap<String, SystemRecord>,
    pub base_roms: BTreeMap<String, BaseRomRecord>,
}

impl ConfigTables {
    pub fn new(
        systems: BTreeMap<String, SystemRecord>,
        base_roms: BTreeMap<String, BaseRomRecord>,
    ) -> Self {
        Self { systems, base_roms }
    }

    /// Load `systems.json` and `base-roms.json` from `config_dir`.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let systems = load_json_table(&config_dir.join(SYSTEMS_FILE))?;
        let base_roms = load_json_table(&config_dir.join(BASE_ROMS_FILE))?;
        Ok(Self { systems, base_roms })
    }

    /// Abbreviation for a system given either its key or its full name.
    pub fn system_abbr(&self, system_name: &str) -> &str {
        self.systems
            .iter()
            .find(|(abbr, data)| data.name == system_name || abbr.as_str() == system_name)
            .map(|(abbr, _)| abbr.as_str())
            .unwrap_or(UNKNOWN_ABBR)
    }

    pub fn baserom_abbr(&self, rom_name: &str) -> &str {
        self.base_roms
            .get(rom_name)
            .map(|rom| rom.abbreviation.as_str())
            .unwrap_or(UNKNOWN_ABBR)
    }

    /// All registered CRC variants for a base ROM, in config order.
    pub fn baserom_variants(&self, rom_name: &str) -> &[CrcVariant] {
        self.base_roms
            .get(rom_name)
            .map(|rom| rom.variants.as_slice())
            .unwrap_or(&[])
    }

    /// Pick the CRC for a base ROM.
    ///
    /// A hint matching a registered variant wins; otherwise the first
    /// variant is used. Returns [`UNKNOWN_CRC`] when none are registered.
    pub fn find_matching_crc(&self, rom_name: &str, crc_hint: Option<&str>) -> &str {
        let variants = self.baserom_variants(rom_name);
        let Some(first) = variants.first() else {
            return UNKNOWN_CRC;
        };
        if let Some(hint) = crc_hint {
            if let Some(v) = variants.iter().find(|v| v.crc == hint) {
                return &v.crc;
            }
        }
        &first.crc
    }
}

fn load_json_table<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        source: e,
    })
}
