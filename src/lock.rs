//! Single-instance guard: an exclusive `flock` on `{data_dir}/relay.lock`.

use relay_core::error::RelayError;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Held for the life of the process. The OS drops the lock when the file
/// is closed, so release also happens on crash.
#[derive(Debug)]
pub struct InstanceLock {
    file: File,
    path: PathBuf,
}

impl InstanceLock {
    /// Take the lock without blocking. Fails if another process holds it.
    pub fn acquire(path: &Path) -> Result<Self, RelayError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        // SAFETY: `file` owns a valid descriptor for the duration of the call.
        let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
        if result != 0 {
            return Err(RelayError::Lock(format!(
                "another instance is already running (lock held on {})",
                path.display()
            )));
        }

        file.set_len(0)?;
        writeln!(file, "{}", std::process::id())?;
        info!("acquired instance lock {}", path.display());
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        // SAFETY: the descriptor is still open; it closes right after this.
        unsafe {
            libc::flock(self.file.as_raw_fd(), libc::LOCK_UN);
        }
        debug!("released instance lock {}", self.path.display());
    }
}
