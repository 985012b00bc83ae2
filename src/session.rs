//! Per-process shell state and the interactive-startup terminal handshake.

use std::os::unix::io::RawFd;

use nix::sys::signal::{kill, Signal};
use nix::sys::termios::{tcgetattr, Termios};
use nix::unistd::{self, Pid};

/// State fixed at startup, plus the prompt counter. Built once and passed by
/// reference; nothing here is a process-wide singleton.
pub struct Session {
    pub interactive: bool,
    pub terminal: RawFd,
    pub pgid: Pid,
    /// Terminal mode snapshot taken when the shell claimed the terminal,
    /// kept so it survives until process teardown.
    pub tmodes: Option<Termios>,
    /// Zero-based count of lines accepted so far; shown in the prompt.
    pub lines_accepted: usize,
}

impl Session {
    /// Runs the one-time startup sequence. When stdin is a terminal, waits
    /// until our process group is the foreground group, then takes ownership
    /// of the terminal and snapshots its mode.
    pub fn init() -> Session {
        let terminal = libc::STDIN_FILENO;
        let interactive = unistd::isatty(terminal).unwrap_or(false);
        let mut pgid = unistd::getpgrp();
        let mut tmodes = None;

        if interactive {
            // Not in the foreground yet: stop ourselves with SIGTTIN and
            // retry when the terminal owner continues us.
            loop {
                pgid = unistd::getpgrp();
                match unistd::tcgetpgrp(terminal) {
                    Ok(fg) if fg == pgid => break,
                    Ok(_) => {
                        let _ = kill(Pid::from_raw(-pgid.as_raw()), Signal::SIGTTIN);
                    }
                    Err(_) => break,
                }
            }
            pgid = unistd::getpid();
            let _ = unistd::tcsetpgrp(terminal, pgid);
            tmodes = tcgetattr(terminal).ok();
        }

        Session { interactive, terminal, pgid, tmodes, lines_accepted: 0 }
    }
}
