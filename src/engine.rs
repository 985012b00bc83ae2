//! The pipeline execution engine: classifies a tokenized line, wires each
//! stage's standard streams, and drives the launcher one stage at a time.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::ops::Range;
use std::os::unix::io::{AsRawFd, RawFd};

use nix::sys::wait::waitpid;
use nix::unistd::Pid;

use crate::launch;
use crate::tokens::Tokens;
use crate::transport::Transport;

#[derive(Debug)]
pub enum ExecError {
    /// The redirection target could not be opened in the requested mode.
    /// Surfaced instead of launching with an invalid descriptor.
    Redirect { target: String, cause: io::Error },
    /// The scratch buffers backing a pipeline could not be set up.
    Transport(nix::Error),
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExecError::Redirect { target, cause } => {
                write!(f, "cannot open {}: {}", target, cause)
            }
            ExecError::Transport(e) => write!(f, "pipeline buffer failed: {}", e),
        }
    }
}

impl std::error::Error for ExecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecError::Redirect { cause, .. } => Some(cause),
            ExecError::Transport(e) => Some(e),
        }
    }
}

impl From<nix::Error> for ExecError {
    fn from(e: nix::Error) -> ExecError {
        ExecError::Transport(e)
    }
}

/// How one line is to be executed. Pipe wins over redirection; a line is
/// expected to carry at most one kind of operator.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Shape {
    Pipeline,
    RedirectOut,
    RedirectIn,
    Plain,
}

pub fn classify(tokens: &Tokens) -> Shape {
    if tokens.contains("|") {
        Shape::Pipeline
    } else if tokens.contains(">") {
        Shape::RedirectOut
    } else if tokens.contains("<") {
        Shape::RedirectIn
    } else {
        Shape::Plain
    }
}

/// Splits the sequence into per-stage index ranges at each `|` token.
fn split_stages(tokens: &Tokens) -> Vec<Range<usize>> {
    let mut stages = Vec::new();
    let mut start = 0;
    for i in 0..tokens.len() {
        if tokens.get(i) == Some("|") {
            stages.push(start..i);
            start = i + 1;
        }
    }
    stages.push(start..tokens.len());
    stages
}

/// Executes one non-builtin line. Per-stage failures are reported as they
/// happen and never abort the surrounding shell; only setup failures
/// (redirect target, scratch buffers) surface as errors.
pub fn run(tokens: &Tokens) -> Result<(), ExecError> {
    match classify(tokens) {
        Shape::Pipeline => run_pipeline(tokens),
        Shape::RedirectOut => run_redirect(tokens, Shape::RedirectOut),
        Shape::RedirectIn => run_redirect(tokens, Shape::RedirectIn),
        Shape::Plain => {
            run_stage(tokens, 0..tokens.len(), libc::STDIN_FILENO, libc::STDOUT_FILENO);
            Ok(())
        }
    }
}

/// Launches one stage and blocks until it exits. Spawn and wait failures
/// are diagnosed immediately; the caller carries on either way.
fn run_stage(tokens: &Tokens, stage: Range<usize>, input: RawFd, output: RawFd) {
    if stage.is_empty() {
        return;
    }
    match launch::launch(tokens, stage, input, output) {
        Ok(pid) => reap(pid),
        Err(e) => {
            let _ = writeln!(io::stderr(), "tsh: cannot spawn: {}", e);
        }
    }
}

fn reap(pid: Pid) {
    if let Err(e) = waitpid(pid, None) {
        let _ = writeln!(io::stderr(), "tsh: wait for {} failed: {}", pid, e);
    }
}

/// The `|` case. Stages run strictly one at a time; two scratch buffers
/// alternate as a stage's input and output, and the bytes are handed over
/// between stages. The last stage's output is drained to the user.
fn run_pipeline(tokens: &Tokens) -> Result<(), ExecError> {
    let input = Transport::create("in")?;
    let output = Transport::create("out")?;

    for (i, stage) in split_stages(tokens).into_iter().enumerate() {
        input.rewind()?;
        let stage_input = if i == 0 { libc::STDIN_FILENO } else { input.fd() };
        run_stage(tokens, stage, stage_input, output.fd());

        // Hand this stage's output to the next stage as input.
        input.fill_from(&output)?;
        output.clear()?;
    }

    input.drain_to(libc::STDOUT_FILENO)?;
    input.clear()?;
    Ok(())
}

/// The single-operator `>` / `<` case: the last token names the file, the
/// stage is everything before the operator.
fn run_redirect(tokens: &Tokens, shape: Shape) -> Result<(), ExecError> {
    let len = tokens.len();
    let target = tokens.get(len - 1).unwrap_or_default().to_owned();
    let stage = 0..len.saturating_sub(2);

    let mut options = OpenOptions::new();
    match shape {
        Shape::RedirectOut => options.write(true).create(true).truncate(true),
        _ => options.read(true),
    };
    let file: File = options
        .open(&target)
        .map_err(|cause| ExecError::Redirect { target, cause })?;

    let fd = file.as_raw_fd();
    match shape {
        Shape::RedirectOut => run_stage(tokens, stage, libc::STDIN_FILENO, fd),
        _ => run_stage(tokens, stage, fd, libc::STDOUT_FILENO),
    }
    // `file` dropped here, after the child has exited.
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::tokenize;

    #[test]
    fn classification_priority() {
        assert_eq!(classify(&tokenize("ls -l")), Shape::Plain);
        assert_eq!(classify(&tokenize("cat f | wc")), Shape::Pipeline);
        assert_eq!(classify(&tokenize("echo hi > f")), Shape::RedirectOut);
        assert_eq!(classify(&tokenize("wc -l < f")), Shape::RedirectIn);
        // Pipe takes precedence over redirection operators.
        assert_eq!(classify(&tokenize("cat < f | wc")), Shape::Pipeline);
    }

    #[test]
    fn stage_split_counts_and_bounds() {
        let tokens = tokenize("a b | c | d e f");
        let stages = split_stages(&tokens);
        assert_eq!(stages, vec![0..2, 3..4, 5..8]);

        let tokens = tokenize("only one stage");
        assert_eq!(split_stages(&tokens), vec![0..3]);
    }

    #[test]
    fn k_pipes_make_k_plus_one_stages() {
        let tokens = tokenize("a | b | c | d");
        assert_eq!(split_stages(&tokens).len(), 4);
    }

    #[test]
    fn missing_redirect_target_is_surfaced() {
        let err = run(&tokenize("wc -l < /nonexistent-xyz/f")).unwrap_err();
        match err {
            ExecError::Redirect { target, .. } => {
                assert_eq!(target, "/nonexistent-xyz/f");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
