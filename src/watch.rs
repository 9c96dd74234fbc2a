//! the watched command.

use {
    crate::{Error, Render, SubprocessError},
    std::{
        ffi::OsString,
        io::Write,
        process::{Command, Stdio},
    },
    tracing::{debug, warn},
};

/// runs a command once per frame, and draws what it printed.
#[derive(Clone, Debug)]
pub struct Subprocess {
    program: OsString,
    args: Vec<OsString>,
    /// whether a failing command ends the loop, rather than being shown in the frame.
    strict: bool,
}

// === impl Subprocess ===

impl Subprocess {
    /// returns a subprocess running `command`, whose first element is the program.
    pub fn new(command: Vec<OsString>, strict: bool) -> Result<Self, SubprocessError> {
        let mut command = command.into_iter();
        let program = command.next().ok_or(SubprocessError::Empty)?;

        Ok(Self {
            program,
            args: command.collect(),
            strict,
        })
    }

    fn display(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// runs the command to completion, and returns its output.
    fn run(&self) -> Result<Vec<u8>, (Vec<u8>, SubprocessError)> {
        let Self { program, args, .. } = self;

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| {
                let error = SubprocessError::Spawn {
                    program: self.display(),
                    source,
                };
                (Vec::new(), error)
            })?;

        let mut printed = output.stdout;
        printed.extend_from_slice(&output.stderr);

        if output.status.success() {
            Ok(printed)
        } else {
            let error = SubprocessError::Status {
                program: self.display(),
                status: output.status,
            };
            Err((printed, error))
        }
    }

    /// reports a failed run: fatally in strict mode, and inside the frame otherwise.
    ///
    /// a command killed by an interrupt signal ends the loop in either mode.
    fn surface(&self, error: SubprocessError, out: &mut dyn Write) -> Result<(), Error> {
        if error.interrupted() {
            debug!(%error, "watched command was interrupted");
            return Err(Error::Interrupted);
        }
        if self.strict {
            return Err(error.into());
        }

        warn!(%error, "watched command failed");
        writeln!(out, "{}", error)?;
        if let Some(source) = std::error::Error::source(&error) {
            writeln!(out, "  {}", source)?;
        }

        Ok(())
    }
}

impl Render for Subprocess {
    fn render(&mut self, out: &mut dyn Write) -> Result<(), Error> {
        match self.run() {
            Ok(printed) => {
                debug!(bytes = printed.len(), "watched command succeeded");
                out.write_all(&printed)?;
                Ok(())
            }
            Err((printed, error)) => {
                out.write_all(&printed)?;
                self.surface(error, out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn empty_command() {
        let err = Subprocess::new(Vec::new(), false).unwrap_err();
        assert!(matches!(err, SubprocessError::Empty));
    }

    #[test]
    fn splits_program_and_arguments() {
        let subprocess = Subprocess::new(command(&["ls", "-l", "/tmp"]), false).unwrap();
        assert_eq!(subprocess.program, "ls");
        assert_eq!(subprocess.args, command(&["-l", "/tmp"]));
    }

    #[test]
    fn missing_program_is_reported_in_the_frame() {
        let mut subprocess = Subprocess::new(command(&["pdwnutil-test-no-such-program"]), false).unwrap();
        let mut out = Vec::<u8>::new();
        subprocess.render(&mut out).unwrap();

        let frame = String::from_utf8(out).unwrap();
        assert!(frame.starts_with("failed to launch `pdwnutil-test-no-such-program`\n"), "{frame:?}");
    }

    #[test]
    fn missing_program_is_fatal_when_strict() {
        let mut subprocess = Subprocess::new(command(&["pdwnutil-test-no-such-program"]), true).unwrap();
        let mut out = Vec::<u8>::new();
        let err = subprocess.render(&mut out).unwrap_err();

        assert!(matches!(err, Error::Subprocess(SubprocessError::Spawn { .. })));
        assert!(out.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn output_is_drawn() {
        let mut subprocess = Subprocess::new(command(&["sh", "-c", "echo out; echo err >&2"]), false).unwrap();
        let mut out = Vec::<u8>::new();
        subprocess.render(&mut out).unwrap();
        assert_eq!(out, b"out\nerr\n");
    }

    #[cfg(unix)]
    #[test]
    fn failure_follows_the_output() {
        let mut subprocess = Subprocess::new(command(&["sh", "-c", "echo partial; exit 3"]), false).unwrap();
        let mut out = Vec::<u8>::new();
        subprocess.render(&mut out).unwrap();

        let frame = String::from_utf8(out).unwrap();
        assert!(frame.starts_with("partial\n`sh` exited with"), "{frame:?}");
    }

    #[cfg(unix)]
    #[test]
    fn failure_is_fatal_when_strict() {
        let mut subprocess = Subprocess::new(command(&["false"]), true).unwrap();
        let err = subprocess.render(&mut Vec::<u8>::new()).unwrap_err();
        assert!(matches!(err, Error::Subprocess(SubprocessError::Status { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn terminated_command_is_an_interrupt() {
        for strict in [false, true] {
            let mut subprocess = Subprocess::new(command(&["sh", "-c", "kill -TERM $$"]), strict).unwrap();
            let err = subprocess.render(&mut Vec::<u8>::new()).unwrap_err();
            assert!(matches!(err, Error::Interrupted), "{err:?}");
        }
    }
}
