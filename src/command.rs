//! Shell command construction and execution.
//!
//! Every remote operation is one [`ShellCommand`] sent through `ssh`; local
//! ones that need a shell run under `sh -c`. Copies and moves go through
//! [`Rsync`], which always runs on this machine unless both ends share a
//! remote host.

use std::{borrow::Cow, path::Path as StdPath, process::Stdio, time::Duration};
use tokio::{io::AsyncWriteExt, process::Command, time};

use crate::{
    config::{self, Config},
    error::{Error, ErrorKind, Result},
    host::{Host, DEFAULT_PORT},
    path::Path,
};

/// Extra stderr fragments recognised on rsync failures.
pub(crate) const RSYNC_HINTS: &[(&str, ErrorKind)] =
    &[("Read-only file system", ErrorKind::PermissionDenied)];

/// Quote a string for a POSIX shell. Strings made only of safe characters
/// are returned unchanged.
pub fn quote(s: &str) -> Cow<'_, str> {
    let safe = |c: char| c.is_ascii_alphanumeric() || "@%+=:,./_-".contains(c);

    if !s.is_empty() && s.chars().all(safe) {
        return Cow::Borrowed(s);
    }

    Cow::Owned(format!("'{}'", s.replace('\'', r#"'"'"'"#)))
}

/// Quote a path for a shell, leaving a leading `~` or `~user` unquoted so
/// the shell still expands it.
pub fn quote_path(path: &StdPath) -> String {
    let path = path.to_string_lossy();

    if let Some(rest) = path.strip_prefix('~') {
        let (user, tail) = rest.split_once('/').unwrap_or((rest, ""));
        let plain_user = user
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._-".contains(c));

        if plain_user {
            return match tail {
                "" if rest.ends_with('/') => format!("~{user}/"),
                "" => format!("~{user}"),
                tail => format!("~{user}/{}", quote(tail)),
            };
        }
    }

    quote(&path).into_owned()
}

/// Interpreter used for a command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shell {
    Sh,
    /// Needed for `shopt` when globbing
    Bash,
}

/// One shell line run on a [`Host`].
#[derive(Debug, Clone)]
pub(crate) struct ShellCommand<'a> {
    line: String,
    shell: Shell,
    stdin: Option<&'a [u8]>,
    transfer: bool,
}

impl<'a> ShellCommand<'a> {
    pub fn new<T: Into<String>>(line: T) -> Self {
        Self {
            line: line.into(),
            shell: Shell::Sh,
            stdin: None,
            transfer: false,
        }
    }

    pub fn shell(mut self, shell: Shell) -> Self {
        self.shell = shell;
        self
    }

    /// Data piped to the command's stdin
    pub fn stdin(mut self, data: &'a [u8]) -> Self {
        self.stdin = Some(data);
        self
    }

    /// Moves file contents, so it is bounded by
    /// [`Config::transfer_timeout`] instead of [`Config::timeout`]
    pub fn transfer(mut self) -> Self {
        self.transfer = true;
        self
    }

    fn timeout(&self, config: &Config) -> Option<Duration> {
        match self.transfer {
            true => config.transfer_timeout,
            false => Some(config.timeout),
        }
    }

    /// Builds the process that runs this line on `host`.
    pub fn build(&self, host: &Host, config: &Config) -> Command {
        let program = match self.shell {
            Shell::Sh => "sh",
            Shell::Bash => "bash",
        };

        match host {
            Host::Local => {
                let mut command = Command::new(program);
                command.arg("-c").arg(&self.line);
                command
            }
            Host::Remote(remote) => {
                // ssh hands the joined trailing arguments to the remote
                // login shell, which may not be POSIX (fish, csh), so the
                // line is always interpreted by an explicit sh or bash
                let remote_line = format!("{program} -c {}", quote(&self.line));

                let mut command = Command::new(&config.ssh_program);
                command
                    .args(config.ssh_args())
                    .arg("-p")
                    .arg(remote.port.to_string())
                    .arg(remote.address())
                    .arg(remote_line);
                command
            }
        }
    }

    /// Runs on `host` and returns stdout verbatim.
    pub async fn run(&self, host: &Host) -> Result<Vec<u8>> {
        let config = config::config();
        execute(self.build(host, &config), self.stdin, &[], self.timeout(&config)).await
    }

    /// Runs on `host` and returns stdout as text without trailing line breaks.
    pub async fn run_text(&self, host: &Host) -> Result<String> {
        let stdout = self.run(host).await?;
        let text = String::from_utf8(stdout)
            .map_err(|e| Error::UnexpectedOutput(format!("{}: {e}", self.line)))?;
        Ok(crate::utils::trim_newlines(&text).to_owned())
    }
}

/// `rsync` between two paths, at most one of which is remote unless both
/// share a host.
#[derive(Debug, Clone)]
pub(crate) struct Rsync<'a> {
    source: &'a Path,
    destination: &'a Path,
    contents_only: bool,
    args: Vec<&'static str>,
}

impl<'a> Rsync<'a> {
    pub fn new(source: &'a Path, destination: &'a Path) -> Self {
        Self {
            source,
            destination,
            contents_only: false,
            args: vec!["-a"],
        }
    }

    /// Copy the contents of a source directory rather than the directory
    pub fn contents_only(mut self, contents_only: bool) -> Self {
        self.contents_only = contents_only;
        self
    }

    pub fn arg(mut self, arg: &'static str) -> Self {
        self.args.push(arg);
        self
    }

    fn source_arg(&self, path: String) -> String {
        match self.contents_only && !path.ends_with('/') {
            true => format!("{path}/"),
            false => path,
        }
    }

    pub fn build(&self, config: &Config) -> Result<Command> {
        let (src_host, dst_host) = (self.source.host(), self.destination.host());

        // Both ends on one remote host: let that host run rsync itself
        if let (Host::Remote(src), Host::Remote(dst)) = (src_host, dst_host) {
            if src != dst {
                return Err(Error::HostMismatch {
                    left: src.to_string(),
                    right: dst.to_string(),
                });
            }

            let line = format!(
                "{} {} {} {}",
                config.rsync_program,
                self.args.join(" "),
                self.source_arg(quote_path(self.source.as_std_path())),
                quote_path(self.destination.as_std_path()),
            );

            return Ok(ShellCommand::new(line).build(src_host, config));
        }

        let mut command = Command::new(&config.rsync_program);
        command.args(&self.args);

        if let Some(remote) = src_host.as_remote().or(dst_host.as_remote()) {
            let mut shell = vec![config.ssh_program.clone()];
            shell.extend(config.ssh_args());
            if remote.port != DEFAULT_PORT {
                shell.extend(["-p".to_owned(), remote.port.to_string()]);
            }
            command.arg("-e").arg(shell.join(" "));
        }

        command
            .arg(self.source_arg(endpoint(self.source)))
            .arg(endpoint(self.destination));

        Ok(command)
    }

    pub async fn run(&self) -> Result<()> {
        let config = config::config();
        execute(self.build(&config)?, None, RSYNC_HINTS, config.transfer_timeout)
            .await
            .map(|_| ())
    }
}

/// How rsync names a path: `[user@]host:path` for remotes, and local
/// relative paths anchored with `./` so a colon in them is not read as a
/// host separator.
fn endpoint(path: &Path) -> String {
    let text = path.as_std_path().to_string_lossy();
    match path.host().as_remote() {
        Some(remote) => format!("{}:{text}", remote.address()),
        None if path.is_absolute() || text.starts_with("./") => text.into_owned(),
        None => format!("./{text}"),
    }
}

/// Spawns `command`, feeds `stdin`, waits at most `timeout` (forever when
/// `None`) and returns stdout. A non-zero exit becomes an [`Error`] chosen
/// from stderr.
pub(crate) async fn execute(
    mut command: Command,
    stdin: Option<&[u8]>,
    hints: &[(&str, ErrorKind)],
    timeout: Option<Duration>,
) -> Result<Vec<u8>> {
    debug!("Running: {:?}", command.as_std());

    command
        .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command.spawn().map_err(|e| {
        Error::IO(format!(
            "failed to spawn {:?}: {e}",
            command.as_std().get_program()
        ))
    })?;
    let pipe = child.stdin.take();

    let feed = async move {
        if let (Some(data), Some(mut pipe)) = (stdin, pipe) {
            pipe.write_all(data).await?;
            pipe.shutdown().await?;
        }
        Ok::<_, std::io::Error>(())
    };

    let finished = async { tokio::join!(feed, child.wait_with_output()) };
    let (fed, output) = match timeout {
        Some(limit) => time::timeout(limit, finished).await?,
        None => finished.await,
    };
    let output = output?;

    trace!(
        "exit {:?}, {} bytes stdout, {} bytes stderr",
        output.status.code(),
        output.stdout.len(),
        output.stderr.len()
    );

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::from_failure(output.status.code(), &stderr, hints));
    }

    // A broken pipe only matters if the command claimed success
    fed?;

    Ok(output.stdout)
}
