//! Package container access.
//!
//! The loader's entire contract with the container format lives in the
//! [`Container`] trait: stat a named entry, stream its bytes into a
//! caller-provided buffer. The shipped implementation reads gzip
//! tarballs; swapping the format means implementing one trait.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;

use crate::error::{LoadError, LoadResult};

/// Name of the executable payload entry inside a package.
pub const PAYLOAD_ENTRY: &str = "payload.bin";

/// Name of the manifest entry inside a package.
pub const MANIFEST_ENTRY: &str = "manifest.toml";

/// Narrow collaborator interface over the package container format.
pub trait Container {
    /// Returns the size in bytes of the named entry, or `None` when the
    /// entry does not exist.
    fn stat(&self, name: &str) -> LoadResult<Option<u64>>;

    /// Streams the named entry's bytes into `buf`, replacing its
    /// contents. Returns `false` (leaving `buf` empty) when the entry
    /// does not exist.
    fn read(&self, name: &str, buf: &mut Vec<u8>) -> LoadResult<bool>;
}

/// Gzip-tarball container opened by path.
///
/// Tar has no central directory, so each operation walks the archive
/// from the start. Packages are read twice at load time (manifest and
/// payload); that cost is paid once per process.
#[derive(Debug)]
pub struct TarContainer {
    /// Path of the container on disk.
    path: PathBuf,
}

impl TarContainer {
    /// Opens a container by path.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::NotFound`] when the path does not exist and
    /// [`LoadError::Archive`] when it cannot be opened for reading.
    pub fn open(path: &Path) -> LoadResult<Self> {
        if !path.exists() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }
        // Open eagerly so a permission problem surfaces as a load
        // failure instead of during the first entry walk.
        File::open(path).map_err(|e| LoadError::archive(&e))?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Walks the archive entries, invoking `visit` on the entry whose
    /// path matches `name`. Returns `None` when no entry matches.
    fn find_entry<T>(
        &self,
        name: &str,
        mut visit: impl FnMut(&mut tar::Entry<'_, GzDecoder<File>>) -> LoadResult<T>,
    ) -> LoadResult<Option<T>> {
        let file = File::open(&self.path).map_err(|e| LoadError::archive(&e))?;
        let mut archive = Archive::new(GzDecoder::new(file));
        let entries = archive.entries().map_err(|e| LoadError::archive(&e))?;

        for entry in entries {
            let mut entry = entry.map_err(|e| LoadError::archive(&e))?;
            let path = entry.path().map_err(|e| LoadError::archive(&e))?;
            if path.as_ref() == Path::new(name) {
                return visit(&mut entry).map(Some);
            }
        }
        Ok(None)
    }
}

impl Container for TarContainer {
    fn stat(&self, name: &str) -> LoadResult<Option<u64>> {
        self.find_entry(name, |entry| Ok(entry.size()))
    }

    fn read(&self, name: &str, buf: &mut Vec<u8>) -> LoadResult<bool> {
        buf.clear();
        let found = self.find_entry(name, |entry| {
            entry
                .read_to_end(buf)
                .map_err(|e| LoadError::archive(&e))?;
            Ok(())
        })?;
        Ok(found.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::tests::write_package;

    #[test]
    fn test_open_missing_path_is_not_found() {
        let err = TarContainer::open(Path::new("/nonexistent/app.pkg")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn test_stat_and_read_existing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_package(dir.path(), true, None);

        let container = TarContainer::open(&path).unwrap();
        let size = container.stat(PAYLOAD_ENTRY).unwrap().unwrap();
        assert!(size > 0);

        let mut buf = Vec::new();
        assert!(container.read(PAYLOAD_ENTRY, &mut buf).unwrap());
        assert_eq!(buf.len() as u64, size);
    }

    #[test]
    fn test_missing_entry_reports_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_package(dir.path(), true, None);

        let container = TarContainer::open(&path).unwrap();
        assert!(container.stat("no-such-entry").unwrap().is_none());

        let mut buf = vec![1u8, 2, 3];
        assert!(!container.read("no-such-entry", &mut buf).unwrap());
        assert!(buf.is_empty());
    }
}
