//! Spawning one pipeline stage. The parent gets a pid back immediately;
//! everything else happens on the child side of the fork and ends in
//! `_exit`, never by unwinding back into the shell's stack.

use std::ffi::{self, CString};
use std::fmt;
use std::ops::Range;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::RawFd;

use nix::unistd::{self, ForkResult, Pid};

use crate::search;
use crate::tokens::Tokens;

#[derive(Debug)]
enum ChildError {
    NotFound(String),
    Nul(ffi::NulError),
    Sys(nix::Error),
}

impl From<ffi::NulError> for ChildError {
    fn from(e: ffi::NulError) -> ChildError {
        ChildError::Nul(e)
    }
}

impl From<nix::Error> for ChildError {
    fn from(e: nix::Error) -> ChildError {
        ChildError::Sys(e)
    }
}

impl fmt::Display for ChildError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChildError::NotFound(name) => write!(f, "{}: command not found", name),
            ChildError::Nul(e) => write!(f, "argument contains nul byte: {}", e),
            ChildError::Sys(e) => write!(f, "exec failed: {}", e),
        }
    }
}

/// Forks and, in the child, binds `input`/`output` onto stdin/stdout and
/// replaces the image with the stage's resolved executable. The parent does
/// not wait here; blocking is the engine's job.
pub fn launch(
    tokens: &Tokens,
    stage: Range<usize>,
    input: RawFd,
    output: RawFd,
) -> nix::Result<Pid> {
    match unsafe { unistd::fork() }? {
        ForkResult::Parent { child } => Ok(child),
        ForkResult::Child => run_child(tokens, stage, input, output),
    }
}

fn run_child(tokens: &Tokens, stage: Range<usize>, input: RawFd, output: RawFd) -> ! {
    let status = match exec_stage(tokens, stage, input, output) {
        Err(ChildError::NotFound(name)) => {
            // Diagnostic goes to the child's (possibly redirected) stdout,
            // matching the shell's single-stream behavior.
            let line = format!("{}: command not found\n", name);
            let _ = unistd::write(libc::STDOUT_FILENO, line.as_bytes());
            127
        }
        Err(e) => {
            let line = format!("{}\n", e);
            let _ = unistd::write(libc::STDERR_FILENO, line.as_bytes());
            126
        }
        Ok(never) => match never {},
    };
    unsafe { libc::_exit(status) }
}

fn exec_stage(
    tokens: &Tokens,
    stage: Range<usize>,
    input: RawFd,
    output: RawFd,
) -> Result<std::convert::Infallible, ChildError> {
    unistd::dup2(input, libc::STDIN_FILENO)?;
    unistd::dup2(output, libc::STDOUT_FILENO)?;

    let words = tokens.slice(stage);
    let name = &words[0];
    let argv: Vec<CString> = words
        .iter()
        .map(|w| CString::new(w.as_bytes()))
        .collect::<Result<_, _>>()?;

    let path = match search::resolve(name) {
        Some(path) => CString::new(path.as_os_str().as_bytes())?,
        None => return Err(ChildError::NotFound(name.clone())),
    };
    unistd::execv(&path, &argv)?;
    unreachable!()
}
