//! Keeps the output directory in step with the sources: any generated page
//! that the current posts and tags don't account for is deleted, so renamed
//! or removed posts and tags leave nothing behind.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::collection::{Collection, ARCHIVE_PAGE, HOME_PAGE, TAGS_PAGE};
use crate::post::HTML_EXTENSION;
use crate::slug::tag_file_name;

/// The names of every page the current build produces: the home and tags
/// pages, the archive if there is one, one page per post, and one page per
/// tag.
pub fn expected_files(collection: &Collection) -> BTreeSet<String> {
    let mut expected = BTreeSet::new();
    expected.insert(HOME_PAGE.to_owned());
    expected.insert(TAGS_PAGE.to_owned());
    if collection.has_archive() {
        expected.insert(ARCHIVE_PAGE.to_owned());
    }
    for post in collection.active.iter().chain(&collection.archived) {
        expected.insert(post.file_name.clone());
    }
    for tag in collection.tags.keys() {
        expected.insert(tag_file_name(tag));
    }
    expected
}

/// Deletes every `.html` file directly inside `output_directory` whose name
/// isn't in `expected`, returning the deleted names in sorted order. Other
/// files (feeds, assets) and subdirectories are left alone.
pub fn reconcile(output_directory: &Path, expected: &BTreeSet<String>) -> Result<Vec<String>> {
    let mut deleted = Vec::new();
    for result in WalkDir::new(output_directory)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = result?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = match entry.file_name().to_str() {
            Some(name) if name.ends_with(HTML_EXTENSION) && !expected.contains(name) => name,
            _ => continue,
        };

        fs::remove_file(entry.path()).map_err(|err| Error::Remove {
            path: entry.path().to_owned(),
            err,
        })?;
        log::info!("deleted: {}", name);
        deleted.push(name.to_owned());
    }
    Ok(deleted)
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem cleaning up the output directory.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the output directory can't be listed.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// Returned when a stale page can't be deleted.
    #[error("deleting `{}`: {err}", .path.display())]
    Remove { path: PathBuf, err: std::io::Error },
}
