//! Patch metadata files: YAML front matter followed by free-form markdown.
//!
//! ```text
//! ---
//! title: "Emerald Enhanced"
//! system: Game Boy Advance
//! baseRom: emerald
//! version: v11.010
//! released: 2025-01-04
//! file: "../patches/emerald/EMERALD-ENHANCED_GBA_EM-1961_11.010_2025.xdelta"
//! ---
//! Changelog and notes...
//! ```

use std::ops::Range;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::MetadataError;

/// Prefix that `file` references carry, relative to the metadata directory.
pub const PATCHES_REF_PREFIX: &str = "../patches/";

/// Fields read from a metadata file's front matter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchMetadata {
    #[serde(deserialize_with = "scalar_string")]
    pub title: String,
    #[serde(deserialize_with = "scalar_string")]
    pub system: String,
    #[serde(deserialize_with = "scalar_string")]
    pub base_rom: String,
    #[serde(default, deserialize_with = "opt_scalar_string")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "opt_scalar_string")]
    pub released: Option<String>,
    /// Patch file reference, usually `../patches/<baserom>/<name>`
    #[serde(default, deserialize_with = "opt_scalar_string")]
    pub file: Option<String>,
    /// Preferred CRC variant when the base ROM has several
    #[serde(default, deserialize_with = "opt_scalar_string")]
    pub crc: Option<String>,
}

impl PatchMetadata {
    /// The `file` reference with the `../patches/` prefix removed.
    pub fn patch_ref(&self) -> Option<&str> {
        let file = self.file.as_deref()?;
        Some(file.strip_prefix(PATCHES_REF_PREFIX).unwrap_or(file))
    }
}

/// YAML scalars that we read as text (`version: 1.2` is a float to YAML).
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

fn scalar_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Scalar::deserialize(d).map(Scalar::into_string)
}

fn opt_scalar_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(d)?.map(Scalar::into_string))
}

/// Location of the front matter block inside a metadata file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter<'a> {
    /// YAML text between the fences (including its final newline)
    pub yaml: &'a str,
    /// Byte range of `yaml` within the whole file
    pub yaml_range: Range<usize>,
    /// Everything after the closing fence line
    pub body: &'a str,
}

fn is_fence(line: &str) -> bool {
    line.trim_end() == "---"
}

/// Find the `---` fenced block at the top of `content`.
pub fn split_front_matter(content: &str) -> Option<FrontMatter<'_>> {
    let mut lines = content.split_inclusive('\n');
    let first = lines.next()?;
    if !first.ends_with('\n') || !is_fence(first) {
        return None;
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if is_fence(line) {
            return Some(FrontMatter {
                yaml: &content[yaml_start..offset],
                yaml_range: yaml_start..offset,
                body: &content[offset + line.len()..],
            });
        }
        offset += line.len();
    }
    None
}

/// Parse metadata from file contents. `origin` is used in error messages.
pub fn parse_metadata(content: &str, origin: &str) -> Result<PatchMetadata, MetadataError> {
    let front = split_front_matter(content).ok_or_else(|| MetadataError::no_front_matter(origin))?;
    let mut metadata: PatchMetadata =
        serde_yml::from_str(front.yaml).map_err(|e| MetadataError::Parse {
            path: origin.to_string(),
            source: e,
        })?;

    // `version: 1.10` is a float to YAML; keep the digits as written
    for (key, slot) in [
        ("version", &mut metadata.version),
        ("released", &mut metadata.released),
        ("crc", &mut metadata.crc),
    ] {
        if slot.is_some()
            && let Some(raw) = numeric_scalar(front.yaml, key)
        {
            *slot = Some(raw.to_string());
        }
    }
    Ok(metadata)
}

/// Source text of a top-level plain scalar that YAML would read as a number.
fn numeric_scalar<'a>(yaml: &'a str, key: &str) -> Option<&'a str> {
    let value = yaml
        .lines()
        .find_map(|line| top_level_value(line.trim_end_matches('\r'), key))?;
    let value = match value.find(" #") {
        Some(i) => &value[..i],
        None => value,
    }
    .trim();
    let numeric = value.parse::<f64>().is_ok() || value.parse::<i64>().is_ok();
    numeric.then_some(value)
}

/// Text after `key:` when `line` is a top-level (unindented) mapping entry.
fn top_level_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(key)?.trim_start_matches([' ', '\t']);
    rest.strip_prefix(':')
}

/// Read and parse a metadata file.
pub fn load_metadata(path: &Path) -> Result<PatchMetadata, MetadataError> {
    let content = std::fs::read_to_string(path).map_err(|e| MetadataError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_metadata(&content, &path.display().to_string())
}

/// Point the front matter's `file:` key at `new_ref`.
///
/// Only the `file:` line inside the front matter changes; when the key is
/// missing it is appended before the closing fence. Returns `None` if the
/// content has no front matter.
pub fn rewrite_file_field(content: &str, new_ref: &str) -> Option<String> {
    let front = split_front_matter(content)?;
    let new_line = format!("file: \"{new_ref}\"");

    let mut offset = front.yaml_range.start;
    for line in front.yaml.split_inclusive('\n') {
        let text = line.trim_end_matches(['\r', '\n']);
        if is_file_key(text) {
            let terminator = &line[text.len()..];
            let mut out = String::with_capacity(content.len() + new_ref.len());
            out.push_str(&content[..offset]);
            out.push_str(&new_line);
            out.push_str(terminator);
            out.push_str(&content[offset + line.len()..]);
            return Some(out);
        }
        offset += line.len();
    }

    let end = front.yaml_range.end;
    let newline = if content[..end].ends_with("\r\n") { "\r\n" } else { "\n" };
    let mut out = String::with_capacity(content.len() + new_line.len() + 2);
    out.push_str(&content[..end]);
    out.push_str(&new_line);
    out.push_str(newline);
    out.push_str(&content[end..]);
    Some(out)
}

/// `file:` as a top-level key (no indentation).
fn is_file_key(line: &str) -> bool {
    top_level_value(line, "file").is_some()
}
