// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Implementation of an external command with optional standard input,
//! environment variables and captured output.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::config::StepProperties;
use crate::errors::ExecutionError;

/// External command to be executed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GmxCommand {
    program: String,
    args: Vec<String>,
    stdin: Option<String>,
    env: Vec<(String, String)>,
    current_dir: Option<PathBuf>,
}

/// Output of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Return code of the command. Commands terminated by a signal have return code 1.
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl GmxCommand {
    /// Create a new command running `program`.
    pub fn new(program: &str) -> Self {
        GmxCommand {
            program: program.to_owned(),
            ..Default::default()
        }
    }

    /// Create a new command from a line containing the program and optionally
    /// its leading arguments separated by whitespace.
    ///
    /// ## Returns
    /// `ExecutionError::EmptyCommand` if the line contains no program.
    pub fn from_line(line: &str) -> Result<Self, ExecutionError> {
        let mut split = line.split_whitespace();
        let program = split
            .next()
            .ok_or_else(|| ExecutionError::EmptyCommand(line.to_owned()))?;

        let mut command = GmxCommand::new(program);
        command.args(split);
        Ok(command)
    }

    /// Add an argument to the command.
    pub fn arg(&mut self, arg: impl ToString) -> &mut Self {
        self.args.push(arg.to_string());
        self
    }

    /// Add multiple arguments to the command.
    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.args.extend(args.into_iter().map(|x| x.to_string()));
        self
    }

    /// Add a flag followed by its value.
    pub fn option(&mut self, flag: &str, value: impl ToString) -> &mut Self {
        self.arg(flag).arg(value)
    }

    /// Set the text written to the standard input of the command.
    pub fn stdin(&mut self, input: &str) -> &mut Self {
        self.stdin = Some(input.to_owned());
        self
    }

    /// Set an environment variable for the command.
    pub fn env(&mut self, key: &str, value: &str) -> &mut Self {
        self.env.push((key.to_owned(), value.to_owned()));
        self
    }

    /// Set the working directory of the command.
    pub fn current_dir(&mut self, dir: impl AsRef<Path>) -> &mut Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Run this command through `prefix` (e.g. an MPI launcher).
    /// The program of this command becomes an argument of `prefix`.
    pub fn prepend(&mut self, prefix: &GmxCommand) -> &mut Self {
        let mut args = prefix.args.clone();
        args.push(std::mem::take(&mut self.program));
        args.append(&mut self.args);

        self.program = prefix.program.clone();
        self.args = args;
        self.env.extend(prefix.env.iter().cloned());
        self
    }

    /// Get the program to be run.
    pub fn get_program(&self) -> &str {
        &self.program
    }

    /// Get the arguments of the command.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get the standard input of the command.
    pub fn get_stdin(&self) -> Option<&str> {
        self.stdin.as_deref()
    }

    /// Get the working directory of the command.
    pub fn get_current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// Get the environment variables set for the command.
    pub fn get_env(&self) -> &[(String, String)] {
        &self.env
    }

    /// Get the command as a single line that can be interpreted by a shell.
    pub fn command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|x| shell_quote(x))
            .collect::<Vec<String>>()
            .join(" ")
    }

    /// Run the command and wait for it to finish. The output of the command is captured.
    pub fn execute(&self) -> Result<CommandOutput, ExecutionError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if self.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            });

        for (key, value) in &self.env {
            command.env(key, value);
        }

        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        let mut child = command
            .spawn()
            .map_err(|_| ExecutionError::CouldNotSpawn(self.command_line()))?;

        if let (Some(input), Some(mut pipe)) = (&self.stdin, child.stdin.take()) {
            match pipe.write_all(input.as_bytes()) {
                // the process does not have to read its input
                Err(e) if e.kind() != ErrorKind::BrokenPipe => {
                    return Err(ExecutionError::CouldNotCommunicate(self.command_line()))
                }
                _ => (),
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|_| ExecutionError::CouldNotCommunicate(self.command_line()))?;

        Ok(CommandOutput {
            code: output.status.code().unwrap_or(1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Run the command appending its output into the log files of the step.
    ///
    /// ## Returns
    /// Return code of the command.
    pub fn launch(&self, logs: &StepLogs) -> Result<i32, ExecutionError> {
        log::info!("Executing: {}", self.command_line());
        if let Some(input) = &self.stdin {
            log::debug!("Standard input: {:?}", input);
        }

        let output = self.execute()?;

        logs.append(&output)?;
        for line in output.stdout.lines() {
            log::debug!("{}", line);
        }
        for line in output.stderr.lines() {
            log::debug!("{}", line);
        }

        if output.code == 0 {
            log::info!("Exit code: 0");
        } else {
            log::warn!("Exit code: {}", output.code);
        }

        Ok(output.code)
    }
}

/// Quote the argument if it contains characters interpreted by a shell.
fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg.chars().all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '=' | ',' | '+' | '@')
        });

    if safe {
        arg.to_owned()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Log files of a step into which the output of the commands is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepLogs {
    out: PathBuf,
    err: PathBuf,
}

impl StepLogs {
    /// Log files `<path>/<prefix>_<step>_log.out` and `<path>/<prefix>_<step>_log.err`.
    pub fn new(step: &StepProperties) -> Self {
        StepLogs {
            out: step.path.join(step.create_name("log.out")),
            err: step.path.join(step.create_name("log.err")),
        }
    }

    /// Get the path to the log file of the standard output.
    pub fn out_path(&self) -> &Path {
        &self.out
    }

    /// Get the path to the log file of the standard error output.
    pub fn err_path(&self) -> &Path {
        &self.err
    }

    fn append(&self, output: &CommandOutput) -> Result<(), ExecutionError> {
        append_to(&self.out, &output.stdout)?;
        append_to(&self.err, &output.stderr)
    }
}

fn append_to(path: &Path, text: &str) -> Result<(), ExecutionError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|_| ExecutionError::CouldNotWriteLog(Box::from(path)))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|_| ExecutionError::CouldNotWriteLog(Box::from(path)))?;

    file.write_all(text.as_bytes())
        .map_err(|_| ExecutionError::CouldNotWriteLog(Box::from(path)))
}

/******************************/
/*         UNIT TESTS         */
/******************************/
