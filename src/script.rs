//! Executes a package's `INSTALL`/`REMOVE` scripts inside the target root,
//! grounded on the reference implementation's `xbps_file_exec` family.

use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};

/// Which embedded script to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptKind {
    /// The archive's `INSTALL` script.
    Install,
    /// The archive's `REMOVE` script.
    Remove,
}

impl ScriptKind {
    /// What: The argument name used in error messages and archive entries.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Install => "INSTALL",
            Self::Remove => "REMOVE",
        }
    }
}

/// Which invocation of the script this is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Runs before the unpack/remove filesystem effects.
    Pre,
    /// Runs after the unpack/remove filesystem effects.
    Post,
}

impl Phase {
    /// What: The single argument passed to the script.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pre => "pre",
            Self::Post => "post",
        }
    }
}

/// What: Read the process's effective user id.
///
/// Details:
/// - A direct, minimal FFI call rather than a dependency, since this is the
///   only libc surface the engine needs.
#[cfg(unix)]
fn effective_uid() -> u32 {
    unsafe extern "C" {
        fn geteuid() -> u32;
    }
    unsafe { geteuid() }
}

#[cfg(not(unix))]
const fn effective_uid() -> u32 {
    1
}

/// What: Run `kind`'s script (if the archive carried one) for `phase`.
///
/// Inputs:
/// - `root`: target installation root.
/// - `script`: the script's bytes, or `None` if the archive carried none
///   (a no-op in that case).
/// - `kind`: `INSTALL` or `REMOVE`.
/// - `phase`: `pre` or `post`.
/// - `pkgver`: `pkgname-version`, used only for error context.
///
/// Output:
/// - `Ok(())` if no script was present, or the script exited zero.
/// - `Err(Error::ScriptFailed)` naming `kind`, `phase`, and the exit code
///   otherwise.
///
/// Details:
/// - The script is written to a staging file under `root` and executed
///   there, `chroot`ed into `root` when the process is effectively root and
///   `root/bin/sh` exists, otherwise run with `root` as the current
///   directory (§4.7, mirroring `pfcexec`'s `do_chroot` decision).
pub fn run(root: &Path, script: Option<&[u8]>, kind: ScriptKind, phase: Phase, pkgver: &str) -> Result<()> {
    let Some(contents) = script else {
        return Ok(());
    };

    let staging_name = format!(".xbps-{}", kind.as_str().to_ascii_lowercase());
    let staging_path = root.join(&staging_name);
    std::fs::write(&staging_path, contents)?;
    std::fs::set_permissions(&staging_path, std::fs::Permissions::from_mode(0o755))?;

    let do_chroot = effective_uid() == 0 && root.join("bin/sh").exists();
    let status = if do_chroot {
        Command::new("chroot")
            .arg(root)
            .arg(format!("/{staging_name}"))
            .arg(phase.as_str())
            .status()?
    } else {
        Command::new(&staging_path)
            .current_dir(root)
            .arg(phase.as_str())
            .status()?
    };

    let _ = std::fs::remove_file(&staging_path);

    if status.success() {
        Ok(())
    } else {
        Err(Error::ScriptFailed {
            pkgver: pkgver.to_string(),
            script: kind.as_str(),
            phase: phase.as_str(),
            code: status.code().unwrap_or(-1),
        })
    }
}
