//! The cleanup pipeline: prune, optimize, rewrite, remove originals.

use crate::cli::output::{Output, SummaryText};
use crate::error::Result;
use crate::note::Note;
use crate::optimize;
use crate::rewrite::rewrite_references;
use crate::scan::{categorize_images, scan_notes};
use crate::workspace::Workspace;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Counts reported at the end of a run.
///
/// A dry run reports the same intentions a real run would then perform.
#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub dry_run: bool,
    pub notes_scanned: usize,
    pub images_found: usize,
    pub unreferenced_deleted: usize,
    pub optimized: usize,
    pub renamed_only: usize,
    pub already_optimized: usize,
    pub failed: usize,
    pub references_updated: usize,
    pub notes_updated: usize,
    pub originals_removed: usize,
    pub bytes_freed: u64,
}

impl SummaryText for RunSummary {
    fn to_text(&self) -> String {
        let mut text = String::new();
        if self.dry_run {
            text.push_str("Dry run: no changes were made.\n");
        }
        text.push_str(&format!("Notes scanned:         {}\n", self.notes_scanned));
        text.push_str(&format!("Images found:          {}\n", self.images_found));
        text.push_str(&format!("Unreferenced deleted:  {}\n", self.unreferenced_deleted));
        text.push_str(&format!("Optimized:             {}\n", self.optimized));
        text.push_str(&format!("Renamed only:          {}\n", self.renamed_only));
        text.push_str(&format!("Already optimized:     {}\n", self.already_optimized));
        text.push_str(&format!("References updated:    {}\n", self.references_updated));
        text.push_str(&format!("Notes updated:         {}\n", self.notes_updated));
        text.push_str(&format!("Originals removed:     {}\n", self.originals_removed));
        text.push_str(&format!("Failed:                {}\n", self.failed));
        text.push_str(&format!(
            "Space freed:           {:.1} MB\n",
            self.bytes_freed as f64 / (1024.0 * 1024.0)
        ));
        text
    }
}

fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Execute the full cleanup pipeline over a workspace.
///
/// Per-image failures are logged and counted, never fatal; only setup and
/// discovery errors propagate.
pub fn run(
    workspace: &Workspace,
    dry_run: bool,
    keep_originals: bool,
    output: &Output,
) -> Result<RunSummary> {
    let mut summary = RunSummary {
        dry_run,
        ..Default::default()
    };

    let scan = scan_notes(workspace)?;
    let images = workspace.list_images()?;
    summary.notes_scanned = scan.notes.len();
    summary.images_found = images.len();

    let (referenced, unreferenced) = categorize_images(&images, &scan.references);

    prune_unreferenced(workspace, &unreferenced, dry_run, output, &mut summary);

    // Notes are mutated in memory while images are processed, then saved in
    // one pass so a per-image failure never leaves a note half-rewritten.
    let mut notes: BTreeMap<PathBuf, Note> = scan
        .notes
        .into_iter()
        .map(|n| (n.path.clone(), n))
        .collect();
    let mut dirty: BTreeSet<PathBuf> = BTreeSet::new();
    let mut pending_originals: Vec<(PathBuf, PathBuf)> = Vec::new();
    let images_dir_name = workspace.images_dir_name();

    for (image_path, referencing) in &referenced {
        process_image(
            workspace,
            image_path,
            referencing,
            &images_dir_name,
            dry_run,
            keep_originals,
            output,
            &mut summary,
            &mut notes,
            &mut dirty,
            &mut pending_originals,
        );
    }

    save_notes(&notes, &dirty, dry_run, output, &mut summary);
    remove_originals(workspace, &pending_originals, dry_run, output, &mut summary);

    Ok(summary)
}

fn prune_unreferenced(
    workspace: &Workspace,
    unreferenced: &[PathBuf],
    dry_run: bool,
    output: &Output,
    summary: &mut RunSummary,
) {
    for image in unreferenced {
        let size = file_size(image);
        if dry_run {
            output.info(&format!(
                "Would delete: {} ({:.1} KB, not referenced by any note)",
                file_name(image),
                size as f64 / 1024.0
            ));
            summary.unreferenced_deleted += 1;
            summary.bytes_freed += size;
        } else {
            match workspace.delete_file(image) {
                Ok(()) => {
                    output.info(&format!(
                        "Deleted: {} ({:.1} KB, not referenced by any note)",
                        file_name(image),
                        size as f64 / 1024.0
                    ));
                    summary.unreferenced_deleted += 1;
                    summary.bytes_freed += size;
                }
                Err(e) => {
                    output.warn(&e.to_string());
                    summary.failed += 1;
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn process_image(
    workspace: &Workspace,
    image_path: &Path,
    referencing: &[PathBuf],
    images_dir_name: &str,
    dry_run: bool,
    keep_originals: bool,
    output: &Output,
    summary: &mut RunSummary,
    notes: &mut BTreeMap<PathBuf, Note>,
    dirty: &mut BTreeSet<PathBuf>,
    pending_originals: &mut Vec<(PathBuf, PathBuf)>,
) {
    let old_name = file_name(image_path);

    if optimize::is_already_optimized(image_path) {
        output.info(&format!("Already optimized: {}", old_name));
        summary.already_optimized += 1;
        return;
    }

    let optimized = match optimize::optimize(image_path) {
        Ok(optimized) => optimized,
        Err(e) => {
            output.warn(&e.to_string());
            summary.failed += 1;
            return;
        }
    };

    let note_stem = referencing[0]
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("note");
    let new_name = optimize::optimized_name(note_stem, &optimized.hash());

    if optimized.over_budget {
        output.warn(&format!(
            "could not reduce {} below the size budget ({:.1} KB at quality floor)",
            old_name,
            optimized.bytes.len() as f64 / 1024.0
        ));
    }

    if new_name == old_name {
        output.info(&format!("No changes needed: {}", old_name));
        summary.already_optimized += 1;
        return;
    }

    let target = workspace.image_path(&new_name);
    let size_kb = optimized.bytes.len() as f64 / 1024.0;
    let verbatim = optimized.quality.is_none();

    if dry_run {
        let action = if verbatim { "Would rename" } else { "Would optimize" };
        output.info(&format!(
            "{}: {} -> {} ({:.1} KB)",
            action, old_name, new_name, size_kb
        ));
    } else {
        // Byte-identical duplicates hash to the same target; the first one
        // already wrote it.
        if !target.exists() {
            if let Err(e) = workspace.write_file(&target, &optimized.bytes) {
                output.warn(&e.to_string());
                summary.failed += 1;
                return;
            }
        }
        match optimized.quality {
            Some(quality) => output.info(&format!(
                "Optimized: {} -> {} (quality {}, {:.1} KB)",
                old_name, new_name, quality, size_kb
            )),
            None => output.info(&format!(
                "Renamed: {} -> {} ({:.1} KB)",
                old_name, new_name, size_kb
            )),
        }
    }

    if verbatim {
        summary.renamed_only += 1;
    } else {
        summary.optimized += 1;
    }

    for note_path in referencing {
        if let Some(note) = notes.get_mut(note_path) {
            let (new_content, replaced) =
                rewrite_references(&note.content, &old_name, &new_name, images_dir_name);
            if replaced > 0 {
                note.content = new_content;
                summary.references_updated += replaced;
                dirty.insert(note_path.clone());
            }
        }
    }

    if !keep_originals {
        pending_originals.push((image_path.to_path_buf(), target));
    }
}

fn save_notes(
    notes: &BTreeMap<PathBuf, Note>,
    dirty: &BTreeSet<PathBuf>,
    dry_run: bool,
    output: &Output,
    summary: &mut RunSummary,
) {
    for path in dirty {
        let note = &notes[path];
        if dry_run {
            output.info(&format!("Would update: {}", file_name(path)));
            summary.notes_updated += 1;
        } else {
            match note.save() {
                Ok(()) => {
                    output.info(&format!("Updated: {}", file_name(path)));
                    summary.notes_updated += 1;
                }
                Err(e) => {
                    output.warn(&e.to_string());
                    summary.failed += 1;
                }
            }
        }
    }
}

fn remove_originals(
    workspace: &Workspace,
    pending: &[(PathBuf, PathBuf)],
    dry_run: bool,
    output: &Output,
    summary: &mut RunSummary,
) {
    for (original, target) in pending {
        let size = file_size(original);
        if dry_run {
            output.info(&format!("Would remove original: {}", file_name(original)));
            summary.originals_removed += 1;
            summary.bytes_freed += size;
        } else if original.exists() && target.exists() {
            match workspace.delete_file(original) {
                Ok(()) => {
                    output.info(&format!("Removed original: {}", file_name(original)));
                    summary.originals_removed += 1;
                    summary.bytes_freed += size;
                }
                Err(e) => {
                    output.warn(&e.to_string());
                    summary.failed += 1;
                }
            }
        }
    }
}
