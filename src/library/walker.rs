//! Filesystem walker: course directories under a root, video files under a
//! course directory.
//!
//! Walks are soft-fail: entries that cannot be read (permission denied,
//! broken symlinks) are skipped so one bad subtree never blocks indexing of
//! its siblings.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::natural::natural_key;

/// Video container extensions admitted by the walker (lowercase).
pub const VIDEO_EXTS: [&str; 5] = ["mp4", "mkv", "webm", "mov", "m4v"];

/// A video file discovered under a course directory.
#[derive(Debug, Clone)]
pub struct VideoEntry {
    /// Path as walked (not yet canonicalized).
    pub path: PathBuf,
    /// Name of the immediate parent directory; groups lessons into sections.
    pub section: String,
    /// Path relative to the course directory, serialized as a string.
    pub order_key: String,
}

/// Whether a path carries one of the allow-listed video extensions
/// (case-insensitive).
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| VIDEO_EXTS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Immediate subdirectories of `root`, sorted by natural order of their
/// directory names. A missing or unreadable root yields an empty list
/// rather than an error.
pub fn course_dirs(root: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();

    dirs.sort_by_cached_key(|p| {
        natural_key(&p.file_name().unwrap_or_default().to_string_lossy())
    });
    dirs
}

/// Video files beneath `course_dir`, in natural order of their full path
/// string so cross-directory ordering is stable. Re-walks the filesystem on
/// every call.
///
/// Each entry carries its section label (immediate parent directory name;
/// for a file directly under the course directory that is the course
/// directory itself) and its order key (course-relative path).
pub fn video_files(course_dir: &Path) -> impl Iterator<Item = VideoEntry> + use<> {
    let mut files: Vec<PathBuf> = WalkDir::new(course_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!("skipping unreadable entry: {}", err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_video_file(path))
        .collect();

    files.sort_by_cached_key(|path| natural_key(&path.to_string_lossy()));

    let course_dir = course_dir.to_path_buf();
    files.into_iter().map(move |path| {
        let section = path
            .parent()
            .and_then(|p| p.file_name())
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        let order_key = path
            .strip_prefix(&course_dir)
            .unwrap_or(&path)
            .to_string_lossy()
            .into_owned();
        VideoEntry {
            path,
            section,
            order_key,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"").unwrap();
    }

    #[test]
    fn missing_root_yields_nothing() {
        let temp = TempDir::new().unwrap();
        let gone = temp.path().join("nope");
        assert!(course_dirs(&gone).is_empty());
    }

    #[test]
    fn root_that_is_a_file_yields_nothing() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("flat");
        fs::write(&file, b"").unwrap();
        assert!(course_dirs(&file).is_empty());
    }

    #[test]
    fn course_dirs_skip_files_and_sort_naturally() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("10 Advanced")).unwrap();
        fs::create_dir(temp.path().join("2 Basics")).unwrap();
        fs::write(temp.path().join("notes.txt"), b"").unwrap();

        let dirs = course_dirs(temp.path());
        let names: Vec<_> = dirs
            .iter()
            .map(|d| d.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["2 Basics", "10 Advanced"]);
    }

    #[test]
    fn video_files_filter_sort_and_tag() {
        let temp = TempDir::new().unwrap();
        let course = temp.path().join("CourseA");
        touch(&course, "02 Basics/2 - Vars.MKV");
        touch(&course, "01 Intro/1 - Welcome.mp4");
        touch(&course, "01 Intro/notes.pdf");
        touch(&course, "10 Extras/deep/bonus.webm");

        let entries: Vec<_> = video_files(&course).collect();
        let keys: Vec<_> = entries.iter().map(|e| e.order_key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "01 Intro/1 - Welcome.mp4",
                "02 Basics/2 - Vars.MKV",
                "10 Extras/deep/bonus.webm",
            ]
        );

        assert_eq!(entries[0].section, "01 Intro");
        assert_eq!(entries[1].section, "02 Basics");
        // Section is the *immediate* parent, regardless of depth.
        assert_eq!(entries[2].section, "deep");
    }

    #[test]
    fn file_directly_under_course_gets_course_as_section() {
        let temp = TempDir::new().unwrap();
        let course = temp.path().join("Standalone");
        touch(&course, "only.mp4");

        let entries: Vec<_> = video_files(&course).collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].section, "Standalone");
        assert_eq!(entries[0].order_key, "only.mp4");
    }

    #[test]
    fn walk_is_restartable() {
        let temp = TempDir::new().unwrap();
        let course = temp.path().join("CourseA");
        touch(&course, "s1/a.mp4");

        assert_eq!(video_files(&course).count(), 1);
        touch(&course, "s1/b.mp4");
        // A fresh invocation re-walks the tree and sees the new file.
        assert_eq!(video_files(&course).count(), 2);
    }
}
