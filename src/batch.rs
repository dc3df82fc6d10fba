//! Input discovery and output layout for batch conversion

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Directory created inside the input directory by a flat batch run
pub const BATCH_OUTPUT_DIR: &str = "converted_pdfs";

/// Root under which a recursive run mirrors its input tree
pub const RECURSIVE_OUTPUT_ROOT: &str = "PDF";

/// Whether `path` has an `.eml` extension, ignoring case
#[must_use]
pub fn is_eml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("eml"))
}

/// Default output directory for a flat batch over `input`
#[must_use]
pub fn default_batch_output(input: &Path) -> PathBuf {
    input.join(BATCH_OUTPUT_DIR)
}

/// Default output directory for a recursive batch over `input`
#[must_use]
pub fn default_recursive_output(input: &Path) -> PathBuf {
    Path::new(RECURSIVE_OUTPUT_ROOT).join(input.file_name().unwrap_or_default())
}

/// Destination for `file` found under `input_root`, keeping its relative
/// location inside `output_dir` and swapping the extension
#[must_use]
pub fn destination_for(input_root: &Path, output_dir: &Path, file: &Path, ext: &str) -> PathBuf {
    let relative = file.strip_prefix(input_root).unwrap_or(file);
    output_dir.join(relative).with_extension(ext)
}

/// `.eml` files directly inside `dir`, sorted by path
pub fn list_eml_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_eml(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Recreate the directory tree of `input` under `output_dir`, empty
/// directories included, and return every `.eml` file found in walk order.
/// Unreadable entries are logged and skipped.
pub fn mirror_tree(input: &Path, output_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {e}");
                continue;
            }
        };

        let relative = entry.path().strip_prefix(input).unwrap_or(entry.path());
        if entry.file_type().is_dir() {
            fs::create_dir_all(output_dir.join(relative))?;
        } else if entry.file_type().is_file() && is_eml(entry.path()) {
            files.push(entry.into_path());
        }
    }

    info!(
        "Mirrored {} -> {} ({} .eml files)",
        input.display(),
        output_dir.display(),
        files.len()
    );
    Ok(files)
}
