//! Scratch-file buffers that stand in for kernel pipes between pipeline
//! stages. A stage writes its whole output into one buffer; the engine then
//! hands those bytes to the next stage's input buffer. Sequential by design:
//! no partial-read races, no pipe-full deadlock, at the cost of buffering
//! each stage's entire output.

use std::env;
use std::os::unix::io::RawFd;
use std::path::PathBuf;

use nix::fcntl::{open, OFlag};
use nix::sys::stat::{fstat, Mode};
use nix::unistd::{self, Whence};

const CHUNK_SIZE: usize = 4096;

/// An open scratch file plus its path. Dropping it closes the fd and removes
/// the file.
pub struct Transport {
    fd: RawFd,
    path: PathBuf,
}

fn scratch_path(tag: &str) -> PathBuf {
    // Pid suffix keeps concurrent shells off each other's buffers.
    env::temp_dir().join(format!(".tsh-{}-{}", tag, unistd::getpid()))
}

impl Transport {
    /// Opens the scratch file for `tag`, created if absent and truncated to
    /// empty with the cursor at the start.
    pub fn create(tag: &str) -> nix::Result<Transport> {
        let path = scratch_path(tag);
        let fd = open(
            &path,
            OFlag::O_CREAT | OFlag::O_RDWR | OFlag::O_TRUNC,
            Mode::S_IRUSR | Mode::S_IWUSR,
        )?;
        Ok(Transport { fd, path })
    }

    pub fn fd(&self) -> RawFd {
        self.fd
    }

    /// Moves the read cursor back to the start.
    pub fn rewind(&self) -> nix::Result<()> {
        unistd::lseek(self.fd, 0, Whence::SeekSet)?;
        Ok(())
    }

    /// Truncates to empty and resets the cursor. The cursor reset matters:
    /// a child that read or wrote this buffer advanced the shared file
    /// offset, and later writes must not leave a hole before the data.
    pub fn clear(&self) -> nix::Result<()> {
        unistd::ftruncate(self.fd, 0)?;
        self.rewind()
    }

    /// Replaces this buffer's contents with everything in `other`, read from
    /// its start. `other` is left untouched.
    pub fn fill_from(&self, other: &Transport) -> nix::Result<()> {
        self.clear()?;
        other.rewind()?;
        let mut buf = [0u8; CHUNK_SIZE];
        loop {
            let n = unistd::read(other.fd, &mut buf)?;
            if n == 0 {
                break;
            }
            unistd::write(self.fd, &buf[..n])?;
        }
        Ok(())
    }

    /// Copies the whole buffer, from its start, to `dest`.
    pub fn drain_to(&self, dest: RawFd) -> nix::Result<()> {
        self.rewind()?;
        let mut buf = [0u8; CHUNK_SIZE];
        loop {
            let n = unistd::read(self.fd, &mut buf)?;
            if n == 0 {
                break;
            }
            unistd::write(dest, &buf[..n])?;
        }
        Ok(())
    }

    pub fn len(&self) -> nix::Result<u64> {
        Ok(fstat(self.fd)?.st_size as u64)
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        let _ = unistd::close(self.fd);
        let _ = unistd::unlink(&self.path);
    }
}
