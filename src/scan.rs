//! Reference scanning: which images do the notes actually use?

use crate::error::Result;
use crate::note::Note;
use crate::workspace::Workspace;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Union of image filenames referenced across all notes, with the notes
/// that reference each one in scan order.
///
/// Read-only after the scan; a filename absent from the set is safe to
/// delete from the images directory.
#[derive(Debug, Default)]
pub struct ReferenceSet {
    by_filename: BTreeMap<String, Vec<PathBuf>>,
}

impl ReferenceSet {
    /// Whether any note references this filename.
    pub fn contains(&self, filename: &str) -> bool {
        self.by_filename.contains_key(filename)
    }

    /// Notes referencing this filename, in scan order.
    pub fn referencing_notes(&self, filename: &str) -> &[PathBuf] {
        self.by_filename
            .get(filename)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Number of distinct referenced filenames.
    pub fn len(&self) -> usize {
        self.by_filename.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_filename.is_empty()
    }
}

/// Result of scanning the notes tree.
#[derive(Debug)]
pub struct Scan {
    /// All notes that could be read, in path order.
    pub notes: Vec<Note>,
    /// The global reference set.
    pub references: ReferenceSet,
}

/// Scan all markdown notes under the workspace root and collect their
/// image references.
///
/// Unreadable notes are skipped with a warning; only discovery failures on
/// the root itself are fatal.
pub fn scan_notes(workspace: &Workspace) -> Result<Scan> {
    let mut notes = Vec::new();
    let mut references = ReferenceSet::default();

    for path in workspace.list_notes()? {
        let note = match Note::load(&path) {
            Ok(note) => note,
            Err(e) => {
                eprintln!("Warning: could not read {}: {}", path.display(), e);
                continue;
            }
        };

        for image_ref in note.image_refs() {
            let entry = references
                .by_filename
                .entry(image_ref.filename.clone())
                .or_default();
            if !entry.contains(&note.path) {
                entry.push(note.path.clone());
            }
        }

        notes.push(note);
    }

    Ok(Scan { notes, references })
}

/// Split the images on disk into referenced (with their referencing notes)
/// and unreferenced.
pub fn categorize_images(
    images: &[PathBuf],
    references: &ReferenceSet,
) -> (Vec<(PathBuf, Vec<PathBuf>)>, Vec<PathBuf>) {
    let mut referenced = Vec::new();
    let mut unreferenced = Vec::new();

    for image in images {
        let filename = image
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();

        let notes = references.referencing_notes(filename);
        if notes.is_empty() {
            unreferenced.push(image.clone());
        } else {
            referenced.push((image.clone(), notes.to_vec()));
        }
    }

    (referenced, unreferenced)
}
