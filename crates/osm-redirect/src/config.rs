// SPDX-License-Identifier: MIT
//
// Where the mirror file lives.
//
// The directory is always relative to a base directory, normally the
// process's working directory at construction time. The default is
// `output/` under it, or `../output/` when the working directory is named
// `bin` or `build`, so a program run from its build tree writes next to the
// tree instead of inside it.
//
// Paths are composed lexically: `.` and `..` are resolved by looking at the
// components alone, without asking the filesystem (no symlink resolution).

use std::env;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Default name of the mirror file.
pub const DEFAULT_FILENAME: &str = "redirected_output.txt";

/// Default directory name under the base directory.
pub const DEFAULT_DIRECTORY: &str = "output";

/// Base directory names that put the default directory one level up.
const BUILD_DIR_NAMES: [&str; 2] = ["bin", "build"];

/// Location of the mirror file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    base_dir: PathBuf,
    directory: PathBuf,
    filename: String,
}

impl MirrorConfig {
    /// Defaults for a process running in `cwd`.
    #[must_use]
    pub fn for_working_dir(cwd: impl Into<PathBuf>) -> Self {
        let base_dir = cwd.into();
        let in_build_dir = base_dir
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| BUILD_DIR_NAMES.contains(&name));
        let relative = if in_build_dir {
            Path::new("..").join(DEFAULT_DIRECTORY)
        } else {
            PathBuf::from(DEFAULT_DIRECTORY)
        };
        let directory = normalize_lexically(&base_dir.join(relative));
        Self {
            base_dir,
            directory,
            filename: DEFAULT_FILENAME.to_string(),
        }
    }

    /// Defaults for the current working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be determined.
    pub fn from_current_dir() -> io::Result<Self> {
        Ok(Self::for_working_dir(env::current_dir()?))
    }

    /// Replace the filename.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.set_filename(filename);
        self
    }

    /// Replace the directory, composed onto the base directory.
    #[must_use]
    pub fn with_directory(mut self, directory: impl AsRef<Path>) -> Self {
        self.set_directory(directory);
        self
    }

    pub fn set_filename(&mut self, filename: impl Into<String>) {
        self.filename = filename.into();
    }

    /// Set the directory. Relative paths are joined onto the base directory;
    /// absolute paths replace it.
    pub fn set_directory(&mut self, directory: impl AsRef<Path>) {
        self.directory = normalize_lexically(&self.base_dir.join(directory));
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Directory joined with filename.
    #[must_use]
    pub fn filepath(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }
}

/// Resolve `.` and `..` without touching the filesystem.
///
/// `..` removes the previous normal component. At the root it is dropped;
/// at the start of a relative path it is kept.
#[must_use]
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                Some(Component::ParentDir | Component::CurDir) | None => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_is_output_under_cwd() {
        let config = MirrorConfig::for_working_dir("/home/me/project");
        assert_eq!(config.directory(), Path::new("/home/me/project/output"));
        assert_eq!(config.filename(), "redirected_output.txt");
        assert_eq!(
            config.filepath(),
            PathBuf::from("/home/me/project/output/redirected_output.txt")
        );
    }

    #[test]
    fn build_and_bin_dirs_go_one_level_up() {
        for dir in ["/home/me/project/build", "/home/me/project/bin"] {
            let config = MirrorConfig::for_working_dir(dir);
            assert_eq!(config.directory(), Path::new("/home/me/project/output"));
        }
    }

    #[test]
    fn similarly_named_dirs_are_not_build_dirs() {
        let config = MirrorConfig::for_working_dir("/srv/builder");
        assert_eq!(config.directory(), Path::new("/srv/builder/output"));
    }

    #[test]
    fn relative_directory_joins_base() {
        let config = MirrorConfig::for_working_dir("/work").with_directory("logs/./today");
        assert_eq!(config.directory(), Path::new("/work/logs/today"));
        assert_eq!(config.base_dir(), Path::new("/work"));
    }

    #[test]
    fn parent_segments_resolve_lexically() {
        let config = MirrorConfig::for_working_dir("/work/a").with_directory("../b/../c");
        assert_eq!(config.directory(), Path::new("/work/c"));
    }

    #[test]
    fn absolute_directory_replaces_base() {
        let config = MirrorConfig::for_working_dir("/work").with_directory("/var/log/osm");
        assert_eq!(config.directory(), Path::new("/var/log/osm"));
    }

    #[test]
    fn filename_override() {
        let config = MirrorConfig::for_working_dir("/work").with_filename("session.log");
        assert_eq!(config.filepath(), PathBuf::from("/work/output/session.log"));
    }

    #[test]
    fn normalize_keeps_leading_parents_of_relative_paths() {
        assert_eq!(normalize_lexically(Path::new("../../x/./y")), PathBuf::from("../../x/y"));
        assert_eq!(normalize_lexically(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn normalize_clamps_at_root() {
        assert_eq!(normalize_lexically(Path::new("/../etc")), PathBuf::from("/etc"));
    }
}
