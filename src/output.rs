//! Scoped manifest output.
//!
//! Manifests are written to a temporary file beside the destination, synced,
//! and renamed into place, so a failure at any point leaves either the old
//! file or nothing. Destinations that already hold the same bytes are not
//! touched, keeping their timestamps stable for the incremental pass.

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result as AnyResult};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs as cap_fs};
use tempfile::Builder;
use tracing::{debug, info};

use crate::error::DependInfoError;

/// What happened to a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// New content was written.
    Written,
    /// The destination already held identical content.
    Unchanged,
}

/// Return `true` when `path` is the CLI sentinel indicating "write to stdout".
#[must_use]
pub fn is_stdout_path(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Create every missing directory above `path`.
fn ensure_parent_dirs(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) else {
        return Ok(());
    };
    let (dir, relative) = derive_dir_and_relative(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    dir.create_dir_all(relative.as_std_path())
}

/// Open the nearest existing ancestor of `path` and express `path` relative
/// to it.
fn derive_dir_and_relative(path: &Utf8Path) -> io::Result<(cap_fs::Dir, Utf8PathBuf)> {
    if path.is_relative() {
        let dir = cap_fs::Dir::open_ambient_dir(".", ambient_authority())?;
        return Ok((dir, path.to_owned()));
    }
    let (base, dir) = path
        .ancestors()
        .find_map(|candidate| {
            cap_fs::Dir::open_ambient_dir(candidate.as_std_path(), ambient_authority())
                .ok()
                .map(|dir| (candidate.to_owned(), dir))
        })
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no existing ancestor directory for {path}"),
            )
        })?;
    let relative = path
        .strip_prefix(&base)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?
        .to_owned();
    Ok((dir, relative))
}

fn write_replacing(path: &Utf8Path, content: &str) -> io::Result<()> {
    ensure_parent_dirs(path)?;
    let parent = path
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name().unwrap_or("manifest");
    let mut tmp = Builder::new()
        .prefix(&format!(".{file_name}."))
        .suffix(".tmp")
        .tempfile_in(parent)?;
    {
        let handle = tmp.as_file_mut();
        handle.write_all(content.as_bytes())?;
        handle.flush()?;
        handle.sync_all()?;
    }
    // Dropping the temporary on any earlier `?` removes it.
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// Write `content` to `path` atomically unless it already matches.
///
/// # Errors
///
/// Returns [`DependInfoError::UnwritableDestination`] if directories cannot
/// be created or the file cannot be written or renamed into place. No partial
/// file is left at `path`.
pub fn write_if_changed(path: &Utf8Path, content: &str) -> Result<WriteOutcome, DependInfoError> {
    if std::fs::read(path).is_ok_and(|existing| existing == content.as_bytes()) {
        debug!(path = %path, "manifest unchanged");
        return Ok(WriteOutcome::Unchanged);
    }
    write_replacing(path, content).map_err(|source| DependInfoError::UnwritableDestination {
        path: path.to_owned(),
        source,
    })?;
    info!("Wrote dependency manifest to {path}");
    Ok(WriteOutcome::Written)
}

fn is_broken_pipe(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::BrokenPipe
}

fn write_all_ignoring_broken_pipe(writer: &mut impl Write, buf: &[u8]) -> io::Result<()> {
    match writer.write_all(buf) {
        Ok(()) => Ok(()),
        Err(err) if is_broken_pipe(&err) => Ok(()),
        Err(err) => Err(err),
    }
}

fn flush_ignoring_broken_pipe(writer: &mut impl Write) -> io::Result<()> {
    match writer.flush() {
        Ok(()) => Ok(()),
        Err(err) if is_broken_pipe(&err) => Ok(()),
        Err(err) => Err(err),
    }
}

/// Stream `content` to stdout, treating a closed pipe as success.
///
/// # Errors
///
/// Returns an error if writing or flushing stdout fails for any other
/// reason.
pub fn write_stdout(content: &str) -> AnyResult<()> {
    let mut stdout = io::stdout().lock();
    write_all_ignoring_broken_pipe(&mut stdout, content.as_bytes())
        .context("failed to write manifest to stdout")?;
    flush_ignoring_broken_pipe(&mut stdout).context("failed to flush stdout")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result, ensure};
    use rstest::rstest;
    use std::fs;

    fn utf8(path: &Path) -> Result<Utf8PathBuf> {
        Utf8PathBuf::from_path_buf(path.to_path_buf())
            .map_err(|p| anyhow::anyhow!("non UTF-8 temp path {}", p.display()))
    }

    #[rstest]
    #[case("-", true)]
    #[case("DependInfo.cmake", false)]
    #[case("./-", false)]
    fn is_stdout_path_detects_dash(#[case] candidate: &str, #[case] expected: bool) {
        assert_eq!(is_stdout_path(Path::new(candidate)), expected);
    }

    #[test]
    fn write_creates_parent_directories() -> Result<()> {
        let temp = tempfile::tempdir().context("create temp dir")?;
        let root = utf8(temp.path())?;
        let target = root.join("CMakeFiles/app.dir/DependInfo.cmake");

        let outcome = write_if_changed(&target, "SET(X\n  )\n")?;

        ensure!(outcome == WriteOutcome::Written, "expected a fresh write");
        let written = fs::read_to_string(&target).context("read manifest")?;
        ensure!(written == "SET(X\n  )\n", "unexpected contents {written:?}");
        Ok(())
    }

    #[test]
    fn identical_content_is_left_untouched() -> Result<()> {
        let temp = tempfile::tempdir().context("create temp dir")?;
        let target = utf8(temp.path())?.join("DependInfo.cmake");
        write_if_changed(&target, "same")?;
        let before = fs::metadata(&target)?.modified()?;

        let outcome = write_if_changed(&target, "same")?;

        ensure!(outcome == WriteOutcome::Unchanged, "expected no rewrite");
        ensure!(
            fs::metadata(&target)?.modified()? == before,
            "modification time changed"
        );
        Ok(())
    }

    #[test]
    fn changed_content_replaces_file_without_leftovers() -> Result<()> {
        let temp = tempfile::tempdir().context("create temp dir")?;
        let target = utf8(temp.path())?.join("DependInfo.cmake");
        write_if_changed(&target, "old")?;

        write_if_changed(&target, "new")?;

        ensure!(fs::read_to_string(&target)? == "new", "content not replaced");
        let entries = fs::read_dir(temp.path())?.count();
        ensure!(entries == 1, "temporary files left behind: {entries}");
        Ok(())
    }

    #[test]
    fn unwritable_destination_leaves_nothing() -> Result<()> {
        let temp = tempfile::tempdir().context("create temp dir")?;
        let root = utf8(temp.path())?;
        // A regular file where a directory is needed makes creation fail.
        fs::write(root.join("blocker"), "x")?;
        let target = root.join("blocker/DependInfo.cmake");

        let err = write_if_changed(&target, "content").expect_err("must fail");

        ensure!(
            matches!(err, DependInfoError::UnwritableDestination { ref path, .. } if *path == target),
            "unexpected error {err:?}"
        );
        ensure!(!target.as_std_path().exists(), "partial file left behind");
        Ok(())
    }
}
