use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use rompatch_core::metadata::PATCHES_REF_PREFIX;
use rompatch_core::{
    ConfigTables, MetadataError, PatchMetadata, RenameDecision, load_metadata, resolve_decision,
    rewrite_file_field,
};

use crate::error::ArchiveError;
use crate::layout::require_dir;

/// Patch extensions tried, in order, when a record has no usable `file` reference.
pub const PATCH_EXTENSIONS: [&str; 8] = ["bps", "ips", "ups", "xdelta", "gba", "nds", "gb", "gbc"];

/// Progress information for callbacks.
#[derive(Debug, Clone)]
pub enum PlanProgress {
    /// Metadata files found
    Scanned { file_count: usize },
    /// Resolving one metadata record
    Resolving {
        file_name: String,
        file_index: usize,
        total: usize,
    },
    Done,
}

/// Options controlling which records are planned.
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Only plan records under `metadata/<baserom>/`
    pub baserom: Option<String>,
}

/// What happened to one metadata record during planning.
#[derive(Debug)]
pub enum RecordOutcome {
    Planned(RenameDecision),
    /// No patch file could be located for the record
    Skipped { metadata_path: PathBuf },
    /// The metadata file could not be read or parsed
    Failed {
        metadata_path: PathBuf,
        error: MetadataError,
    },
}

/// Result of planning renames across the archive.
#[derive(Debug)]
pub struct RenamePlan {
    pub metadata_dir: PathBuf,
    pub patches_dir: PathBuf,
    pub outcomes: Vec<RecordOutcome>,
}

impl RenamePlan {
    pub fn decisions(&self) -> impl Iterator<Item = &RenameDecision> {
        self.outcomes.iter().filter_map(|o| match o {
            RecordOutcome::Planned(d) => Some(d),
            _ => None,
        })
    }

    /// Decisions whose patch file is not yet canonically named.
    pub fn renames(&self) -> impl Iterator<Item = &RenameDecision> {
        self.decisions().filter(|d| d.needs_rename)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &Path> {
        self.outcomes.iter().filter_map(|o| match o {
            RecordOutcome::Skipped { metadata_path } => Some(metadata_path.as_path()),
            _ => None,
        })
    }

    pub fn failed(&self) -> impl Iterator<Item = (&Path, &MetadataError)> {
        self.outcomes.iter().filter_map(|o| match o {
            RecordOutcome::Failed {
                metadata_path,
                error,
            } => Some((metadata_path.as_path(), error)),
            _ => None,
        })
    }

    pub fn rename_count(&self) -> usize {
        self.renames().count()
    }

    /// Check the plan, returning it wrapped as executable only if it has no issues.
    pub fn validated(&self) -> Result<ValidatedPlan<'_>, Vec<PlanIssue>> {
        let issues = validate_plan(self);
        if issues.is_empty() {
            Ok(ValidatedPlan { plan: self })
        } else {
            Err(issues)
        }
    }
}

/// A plan that passed [`validate_plan`]. The only input [`execute_renames`] accepts.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedPlan<'a> {
    plan: &'a RenamePlan,
}

impl<'a> ValidatedPlan<'a> {
    pub fn plan(&self) -> &'a RenamePlan {
        self.plan
    }
}

/// A problem that blocks a plan from being applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanIssue {
    /// Several metadata records describe the same patch file
    SharedSource {
        patch: PathBuf,
        sources: Vec<PathBuf>,
    },
    /// Several records compute the same patch filename
    DuplicateTarget {
        filename: String,
        sources: Vec<PathBuf>,
    },
    /// The new patch filename already belongs to another file on disk
    TargetExists { source: PathBuf, target: PathBuf },
    /// Several renamed records would write the same metadata file
    DuplicateMetadataTarget {
        target: PathBuf,
        sources: Vec<PathBuf>,
    },
    /// The renamed metadata file already exists as another file
    MetadataTargetExists { source: PathBuf, target: PathBuf },
}

fn file_names(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| {
            p.file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned()
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for PlanIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanIssue::SharedSource { patch, sources } => write!(
                f,
                "Patch described by several metadata files: {} ({})",
                patch.display(),
                file_names(sources)
            ),
            PlanIssue::DuplicateTarget { filename, sources } => {
                write!(f, "Duplicate filename: {filename} ({})", file_names(sources))
            }
            PlanIssue::TargetExists { source, target } => write!(
                f,
                "File already exists: {} (wanted by {})",
                target.display(),
                source.display()
            ),
            PlanIssue::DuplicateMetadataTarget { target, sources } => write!(
                f,
                "Duplicate metadata filename: {} ({})",
                target.display(),
                file_names(sources)
            ),
            PlanIssue::MetadataTargetExists { source, target } => write!(
                f,
                "Metadata file already exists: {} (wanted by {})",
                target.display(),
                source.display()
            ),
        }
    }
}

/// Collect the metadata files to plan, sorted by path.
///
/// With a base-ROM filter only `<metadata>/<baserom>/*.md` is read; otherwise
/// every `.md` below `metadata_dir` is included.
pub fn scan_metadata_files(
    metadata_dir: &Path,
    baserom: Option<&str>,
) -> Result<Vec<PathBuf>, ArchiveError> {
    let mut files: Vec<PathBuf> = match baserom {
        Some(sub) => {
            let dir = metadata_dir.join(sub);
            if !dir.is_dir() {
                return Ok(Vec::new());
            }
            fs::read_dir(&dir)
                .map_err(|e| ArchiveError::io(dir.display().to_string(), e))?
                .flatten()
                .map(|e| e.path())
                .filter(|p| p.is_file() && is_markdown(p))
                .collect()
        }
        None => WalkDir::new(metadata_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_markdown(e.path()))
            .map(|e| e.into_path())
            .collect(),
    };
    files.sort();
    Ok(files)
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}

/// Locate the patch file a metadata record describes.
///
/// Tries the `file` reference first, then `<patches>/<subdir>/<stem>.<ext>`
/// for each of [`PATCH_EXTENSIONS`], where `<subdir>` is the metadata file's
/// parent directory name.
pub fn find_patch_file(
    metadata: &PatchMetadata,
    patches_dir: &Path,
    metadata_path: &Path,
) -> Option<PathBuf> {
    if let Some(reference) = metadata.patch_ref() {
        let candidate = patches_dir.join(reference);
        if candidate.is_file() {
            return Some(candidate);
        }
        log::debug!(
            "{}: file reference {reference:?} does not exist, trying stem lookup",
            metadata_path.display()
        );
    }

    let subdir = metadata_path.parent()?.file_name()?;
    let stem = metadata_path.file_stem()?.to_str()?;
    let patch_subdir = patches_dir.join(subdir);
    if !patch_subdir.is_dir() {
        return None;
    }

    PATCH_EXTENSIONS
        .iter()
        .map(|ext| patch_subdir.join(format!("{stem}.{ext}")))
        .find(|p| p.is_file())
}

/// Plan renames for every metadata record.
///
/// Per-record problems are recorded as [`RecordOutcome::Skipped`] or
/// [`RecordOutcome::Failed`] and logged; only a missing top-level directory
/// is an error.
pub fn plan_renames(
    metadata_dir: &Path,
    patches_dir: &Path,
    tables: &ConfigTables,
    options: &PlanOptions,
    progress: &dyn Fn(PlanProgress),
) -> Result<RenamePlan, ArchiveError> {
    require_dir("Metadata", metadata_dir)?;
    require_dir("Patches", patches_dir)?;

    let files = scan_metadata_files(metadata_dir, options.baserom.as_deref())?;
    let total = files.len();
    progress(PlanProgress::Scanned { file_count: total });

    let mut outcomes = Vec::with_capacity(total);
    for (i, md_path) in files.into_iter().enumerate() {
        let file_name = md_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("?")
            .to_string();

        progress(PlanProgress::Resolving {
            file_name: file_name.clone(),
            file_index: i,
            total,
        });

        let metadata = match load_metadata(&md_path) {
            Ok(m) => m,
            Err(error) => {
                log::warn!("Error processing {file_name}: {error}");
                outcomes.push(RecordOutcome::Failed {
                    metadata_path: md_path,
                    error,
                });
                continue;
            }
        };

        match find_patch_file(&metadata, patches_dir, &md_path) {
            Some(patch_path) => {
                let decision = resolve_decision(tables, &metadata, &md_path, &patch_path);
                outcomes.push(RecordOutcome::Planned(decision));
            }
            None => {
                log::warn!("No patch file found for {file_name}");
                outcomes.push(RecordOutcome::Skipped {
                    metadata_path: md_path,
                });
            }
        }
    }

    progress(PlanProgress::Done);

    Ok(RenamePlan {
        metadata_dir: metadata_dir.to_path_buf(),
        patches_dir: patches_dir.to_path_buf(),
        outcomes,
    })
}

/// Where a decision leaves its metadata file once the plan is applied.
fn final_metadata_path(d: &RenameDecision) -> PathBuf {
    if d.needs_rename {
        d.metadata_target_path()
    } else {
        d.metadata_path.clone()
    }
}

/// Report every collision in the plan. Nothing is corrected.
///
/// Records sharing a patch file, and filenames reported as duplicates, are
/// not reported again by the later checks.
pub fn validate_plan(plan: &RenamePlan) -> Vec<PlanIssue> {
    let mut issues = Vec::new();

    let mut by_source: BTreeMap<&Path, Vec<&RenameDecision>> = BTreeMap::new();
    for d in plan.decisions() {
        by_source.entry(d.patch_path.as_path()).or_default().push(d);
    }
    let mut shared: HashSet<&Path> = HashSet::new();
    for (patch, group) in &by_source {
        if group.len() > 1 {
            shared.insert(*patch);
            issues.push(PlanIssue::SharedSource {
                patch: patch.to_path_buf(),
                sources: group.iter().map(|d| d.metadata_path.clone()).collect(),
            });
        }
    }

    let decisions: Vec<&RenameDecision> = plan
        .decisions()
        .filter(|d| !shared.contains(d.patch_path.as_path()))
        .collect();

    let mut by_name: BTreeMap<&str, Vec<&RenameDecision>> = BTreeMap::new();
    for &d in &decisions {
        by_name.entry(d.new_filename.as_str()).or_default().push(d);
    }

    let mut duplicated: HashSet<&str> = HashSet::new();
    for (name, group) in &by_name {
        if group.len() > 1 {
            duplicated.insert(*name);
            issues.push(PlanIssue::DuplicateTarget {
                filename: name.to_string(),
                sources: group.iter().map(|d| d.patch_path.clone()).collect(),
            });
        }
    }

    let unique: Vec<&RenameDecision> = decisions
        .iter()
        .copied()
        .filter(|d| !duplicated.contains(d.new_filename.as_str()))
        .collect();

    let mut by_metadata: BTreeMap<PathBuf, Vec<&RenameDecision>> = BTreeMap::new();
    for &d in &unique {
        by_metadata.entry(final_metadata_path(d)).or_default().push(d);
    }
    let mut duplicated_metadata: HashSet<&Path> = HashSet::new();
    for (target, group) in &by_metadata {
        if group.len() > 1 {
            duplicated_metadata.insert(target.as_path());
            issues.push(PlanIssue::DuplicateMetadataTarget {
                target: target.clone(),
                sources: group.iter().map(|d| d.metadata_path.clone()).collect(),
            });
        }
    }

    for d in unique.iter().filter(|d| d.needs_rename) {
        let target = d.target_path();
        if target != d.patch_path && target.exists() {
            issues.push(PlanIssue::TargetExists {
                source: d.patch_path.clone(),
                target,
            });
        }

        let md_target = d.metadata_target_path();
        if md_target != d.metadata_path
            && !duplicated_metadata.contains(md_target.as_path())
            && md_target.exists()
        {
            issues.push(PlanIssue::MetadataTargetExists {
                source: d.metadata_path.clone(),
                target: md_target,
            });
        }
    }

    issues
}

/// Options controlling rename execution.
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Report what would happen without touching the filesystem
    pub dry_run: bool,
    /// Copy originals into a timestamped directory under this root first
    pub backup_root: Option<PathBuf>,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            dry_run: true,
            backup_root: None,
        }
    }
}

/// Summary of a rename run.
#[derive(Debug, Clone, Default)]
pub struct RenameSummary {
    pub renamed: usize,
    pub would_rename: usize,
    pub already_correct: usize,
    pub metadata_updated: usize,
    pub backed_up: usize,
    pub backup_dir: Option<PathBuf>,
    pub errors: Vec<String>,
}

/// Apply a validated plan.
///
/// For each record that needs it: back up the originals (if requested),
/// rename the patch, then rewrite the metadata `file:` reference and rename
/// the metadata file to `<new stem>.md`. Failures are collected per record.
pub fn execute_renames(validated: &ValidatedPlan<'_>, options: &ExecuteOptions) -> RenameSummary {
    let plan = validated.plan();
    let mut summary = RenameSummary {
        already_correct: plan.decisions().filter(|d| !d.needs_rename).count(),
        ..Default::default()
    };

    if options.dry_run {
        summary.would_rename = plan.rename_count();
        return summary;
    }

    let backup_dir = options.backup_root.as_ref().map(|root| {
        root.join(
            chrono::Local::now()
                .format("%Y-%m-%d_%H%M%S")
                .to_string(),
        )
    });
    summary.backup_dir = backup_dir.clone();

    for decision in plan.renames() {
        if let Some(dir) = &backup_dir {
            match backup_originals(decision, dir) {
                Ok(()) => summary.backed_up += 1,
                Err(e) => {
                    summary.errors.push(format!(
                        "Backup failed for {}, not renamed: {e}",
                        decision.old_filename
                    ));
                    continue;
                }
            }
        }

        let target = decision.target_path();
        if target.exists() && target != decision.patch_path {
            summary
                .errors
                .push(format!("Target already exists: {}", target.display()));
            continue;
        }

        if let Err(e) = fs::rename(&decision.patch_path, &target) {
            summary.errors.push(format!(
                "Failed to rename {} -> {}: {e}",
                decision.old_filename, decision.new_filename
            ));
            continue;
        }
        summary.renamed += 1;

        let reference = patch_reference(&plan.patches_dir, &target);
        match update_metadata_file(decision, &reference) {
            Ok(new_path) => {
                summary.metadata_updated += 1;
                log::debug!("Updated metadata {}", new_path.display());
            }
            Err(e) => summary.errors.push(format!(
                "Renamed {} but failed to update {}: {e}",
                decision.old_filename,
                decision.metadata_path.display()
            )),
        }
    }

    summary
}

/// `../patches/<path below the patches dir>`, with `/` separators.
pub fn patch_reference(patches_dir: &Path, patch_path: &Path) -> String {
    let relative = match patch_path.strip_prefix(patches_dir) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) => {
            // Fall back to `<parent dir name>/<file name>`
            let mut rel = PathBuf::new();
            if let Some(parent) = patch_path.parent().and_then(|p| p.file_name()) {
                rel.push(parent);
            }
            if let Some(name) = patch_path.file_name() {
                rel.push(name);
            }
            rel
        }
    };
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!("{PATCHES_REF_PREFIX}{}", parts.join("/"))
}

fn backup_originals(decision: &RenameDecision, backup_dir: &Path) -> std::io::Result<()> {
    copy_into(&decision.patch_path, &backup_dir.join("patches"))?;
    copy_into(&decision.metadata_path, &backup_dir.join("metadata"))
}

/// Copy `file` to `<dest_root>/<parent dir name>/<file name>`.
fn copy_into(file: &Path, dest_root: &Path) -> std::io::Result<()> {
    let dest_dir = match file.parent().and_then(|p| p.file_name()) {
        Some(sub) => dest_root.join(sub),
        None => dest_root.to_path_buf(),
    };
    fs::create_dir_all(&dest_dir)?;
    let name = file
        .file_name()
        .ok_or_else(|| std::io::Error::other(format!("no file name: {}", file.display())))?;
    fs::copy(file, dest_dir.join(name))?;
    Ok(())
}

/// Rewrite the metadata `file:` reference and move the file to `<new stem>.md`.
fn update_metadata_file(decision: &RenameDecision, reference: &str) -> std::io::Result<PathBuf> {
    let content = fs::read_to_string(&decision.metadata_path)?;
    let updated = rewrite_file_field(&content, reference)
        .ok_or_else(|| std::io::Error::other("metadata has no front matter"))?;

    let new_path = decision.metadata_target_path();
    fs::write(&new_path, updated)?;
    if new_path != decision.metadata_path {
        fs::remove_file(&decision.metadata_path)?;
    }
    Ok(new_path)
}
