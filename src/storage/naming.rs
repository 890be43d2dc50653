use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::debug;

/// An output location decided at the start of an episode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedArtifact {
    /// File name, e.g. `My Recording-3.mp4`
    pub name: String,
    /// Full path under the storage directory
    pub path: PathBuf,
}

/// Derives non-colliding artifact paths inside one storage directory
///
/// Candidates are `<base>-<n>.<ext>` for n = 1, 2, ... and the first path with
/// nothing on disk wins. Directories count as occupied. Names are decided once
/// and never re-validated, so a file deleted later does not free its name for
/// the running episode.
#[derive(Debug, Clone)]
pub struct ArtifactNamer {
    directory: PathBuf,
    extension: String,
}

impl ArtifactNamer {
    pub fn new(directory: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            extension: extension.into(),
        }
    }

    /// Reserve the first free `<base_name>-<n>.<ext>`
    ///
    /// Creates the storage directory if it doesn't exist.
    pub fn reserve(&self, base_name: &str) -> io::Result<ReservedArtifact> {
        fs::create_dir_all(&self.directory)?;

        let mut n: u64 = 1;
        loop {
            let name = format!("{}-{}.{}", base_name, n, self.extension);
            let path = self.directory.join(&name);

            // symlink_metadata so a dangling link still counts as taken
            match fs::symlink_metadata(&path) {
                Ok(_) => {
                    debug!("Output candidate taken: {}", path.display());
                    n += 1;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Ok(ReservedArtifact { name, path });
                }
                Err(e) => return Err(e),
            }
        }
    }
}
