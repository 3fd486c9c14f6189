//! Host-agnostic paths.
//!
//! A [`Path`] is a [`std::path::PathBuf`] plus the [`Host`] it lives on.
//! Local paths look like
//!
//! ```text
//! foo/bar.rs
//! /path/to/here
//! ```
//!
//! and remote paths carry an address prefix:
//!
//! ```text
//! my-server:/path/to/here
//! me@pypi.org:~/.config/mypy
//! root@localhost:8080:/etc/config
//! ```
//!
//! A path is remote when a colon appears before the first `/` (or `~`) and
//! is immediately followed by it. Everything before that colon is the
//! address.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{
    ffi::OsStr,
    fmt,
    ops::Div,
    path::{Path as StdPath, PathBuf},
    str::FromStr,
    time::SystemTime,
};
use tokio::{fs, task};

use crate::{
    command::{quote_path, Rsync, Shell, ShellCommand},
    error::{Error, Result},
    host::{Host, Remote},
    metadata::{Metadata, STAT_FORMAT},
};

/// Split a path string into a host and a local-style path.
///
/// So `server:/bin/sh` becomes `Remote("server")` and `/bin/sh`.
pub fn split(path: &str) -> Result<(Host, PathBuf)> {
    for root in ['/', '~'] {
        let marker = format!(":{root}");
        let Some(at) = path.find(&marker) else {
            continue;
        };

        let first_colon = path.find(':').unwrap_or(at);
        let first_root = path.find(root).unwrap_or(usize::MAX);

        if first_colon < first_root {
            let remote: Remote = path[..at].parse()?;
            return Ok((remote.into(), PathBuf::from(&path[at + 1..])));
        }
    }

    Ok((Host::Local, PathBuf::from(path)))
}

/// How [`Path::mkdir`] treats missing parents and an existing directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirOptions {
    /// Create missing parent directories
    pub parents: bool,
    /// Succeed if the directory already exists
    pub exist_ok: bool,
}

/// Representation of a path on a host.
///
/// Immutable: every method that "changes" the path returns a new one on the
/// same host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    host: Host,
    path: PathBuf,
}

impl Path {
    /// Parses `[user@]host[:port]:/path`, `...:~/path`, or a plain local path.
    pub fn parse(path: &str) -> Result<Self> {
        let (host, path) = split(path)?;
        Ok(Self { host, path })
    }

    /// A path on `remote`. A relative `path` is taken from the remote home
    /// directory, so `b/c` becomes `~/b/c`.
    pub fn new_remote<P: Into<PathBuf>>(remote: Remote, path: P) -> Self {
        let host = Host::from(remote);
        let path = anchored(&host, path.into());
        Self { host, path }
    }

    /// A path on the same host as `self`
    fn sibling<P: Into<PathBuf>>(&self, path: P) -> Self {
        Self {
            path: anchored(&self.host, path.into()),
            host: self.host.clone(),
        }
    }

    fn quoted(&self) -> String {
        quote_path(&self.path)
    }

    fn same_host(&self, other: &Self) -> Result<()> {
        if self.host != other.host {
            return Err(Error::HostMismatch {
                left: self.host.to_string(),
                right: other.host.to_string(),
            });
        }
        Ok(())
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    /// True if the path is on a remote host
    pub fn is_remote(&self) -> bool {
        self.host.is_remote()
    }

    /// Name of the remote part of the path or `None` if local
    pub fn remote(&self) -> Option<String> {
        self.host.as_remote().map(ToString::to_string)
    }

    /// Remote and path strings. Remote is empty if local.
    pub fn rparts(&self) -> (String, String) {
        (self.host.to_string(), self.path.to_string_lossy().into_owned())
    }

    /// The path without its host. Only meaningful to the local filesystem
    /// when [`Path::is_remote`] is false.
    pub fn as_std_path(&self) -> &StdPath {
        &self.path
    }

    pub fn into_parts(self) -> (Host, PathBuf) {
        (self.host, self.path)
    }

    pub fn file_name(&self) -> Option<&OsStr> {
        self.path.file_name()
    }

    pub fn file_stem(&self) -> Option<&OsStr> {
        self.path.file_stem()
    }

    pub fn extension(&self) -> Option<&OsStr> {
        self.path.extension()
    }

    /// Every suffix of the final component, with leading dots,
    /// e.g. `[".tar", ".gz"]` for `archive.tar.gz`
    pub fn suffixes(&self) -> Vec<String> {
        let Some(name) = self.path.file_name() else {
            return Vec::new();
        };
        let name = name.to_string_lossy();
        let name = name.trim_start_matches('.');

        if name.ends_with('.') {
            return Vec::new();
        }

        name.split('.')
            .skip(1)
            .map(|suffix| format!(".{suffix}"))
            .collect()
    }

    /// The parent directory on the same host. `None` for a root, and for a
    /// remote `~` or `~user`.
    pub fn parent(&self) -> Option<Self> {
        match self.path.parent() {
            Some(parent) if self.is_remote() && parent.as_os_str().is_empty() => None,
            parent => parent.map(|parent| self.sibling(parent)),
        }
    }

    /// The components of the path, ignoring the host
    pub fn parts(&self) -> Vec<String> {
        self.path
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect()
    }

    pub fn is_absolute(&self) -> bool {
        self.path.is_absolute()
    }

    #[must_use]
    pub fn with_file_name<S: AsRef<OsStr>>(&self, name: S) -> Self {
        self.sibling(self.path.with_file_name(name))
    }

    #[must_use]
    pub fn with_extension<S: AsRef<OsStr>>(&self, extension: S) -> Self {
        self.sibling(self.path.with_extension(extension))
    }

    /// Replace the file stem, keeping the extension
    #[must_use]
    pub fn with_stem<S: AsRef<OsStr>>(&self, stem: S) -> Self {
        let mut name = stem.as_ref().to_owned();
        if let Some(extension) = self.path.extension() {
            name.push(".");
            name.push(extension);
        }
        self.with_file_name(name)
    }

    /// Joins onto the path, staying on the same host. An absolute `path`
    /// replaces `self` entirely.
    #[must_use]
    pub fn join<P: AsRef<StdPath>>(&self, path: P) -> Self {
        self.sibling(self.path.join(path))
    }

    /// Like [`Path::join`] for another host-aware path, which must be on
    /// the same host
    pub fn try_join(&self, other: &Self) -> Result<Self> {
        self.same_host(other)?;
        Ok(self.join(&other.path))
    }

    /// The path relative to `base`. Hosts must match.
    ///
    /// The result is a plain local relative path, ready to be joined onto
    /// a directory on any host.
    pub fn relative_to(&self, base: &Self) -> Result<Self> {
        self.same_host(base)?;
        match self.path.strip_prefix(&base.path) {
            Ok(relative) => Ok(Self::from(relative.to_path_buf())),
            Err(_) => Err(Error::NotRelative {
                path: self.to_string(),
                base: base.to_string(),
            }),
        }
    }

    pub fn is_relative_to(&self, base: &Self) -> bool {
        self.host == base.host && self.path.starts_with(&base.path)
    }
}

/// Remote paths are always rooted at `/` or `~`, the only forms the
/// address prefix can be parsed back from.
fn anchored(host: &Host, path: PathBuf) -> PathBuf {
    let rooted = path.is_absolute() || path.as_os_str().to_string_lossy().starts_with('~');
    match host {
        Host::Remote(_) if !rooted => StdPath::new("~").join(path),
        _ => path,
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::from(PathBuf::from("."))
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Path {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A `std` path is always local
impl From<PathBuf> for Path {
    fn from(path: PathBuf) -> Self {
        Self {
            host: Host::Local,
            path,
        }
    }
}

impl From<&StdPath> for Path {
    fn from(path: &StdPath) -> Self {
        Self::from(path.to_path_buf())
    }
}

/// String form is `<host>:<path>`, or just the path when local
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.host.prefix(), self.path.display())
    }
}

impl PartialEq<StdPath> for Path {
    fn eq(&self, other: &StdPath) -> bool {
        !self.is_remote() && self.path == other
    }
}

impl PartialEq<PathBuf> for Path {
    fn eq(&self, other: &PathBuf) -> bool {
        self == other.as_path()
    }
}

impl<P: AsRef<StdPath>> Div<P> for &Path {
    type Output = Path;

    fn div(self, rhs: P) -> Path {
        self.join(rhs)
    }
}

impl<P: AsRef<StdPath>> Div<P> for Path {
    type Output = Path;

    fn div(self, rhs: P) -> Path {
        self.join(rhs)
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Filesystem operations. Local paths go through `tokio::fs`, remote ones
/// run a single command over ssh.
impl Path {
    /// Checks a file or folder exists at the path
    pub async fn try_exists(&self) -> Result<bool> {
        if !self.is_remote() {
            return Ok(fs::try_exists(&self.path).await?);
        }

        let line = format!("test -e {} && echo yes || echo no", self.quoted());
        match ShellCommand::new(line).run_text(&self.host).await?.as_str() {
            "yes" => Ok(true),
            "no" => Ok(false),
            other => Err(Error::UnexpectedOutput(format!("exists: {other:?}"))),
        }
    }

    /// Like [`Path::try_exists`], reporting `false` when the check itself
    /// fails. Use [`Path::try_exists`] to tell a missing path from an
    /// unreachable host.
    pub async fn exists(&self) -> bool {
        match self.try_exists().await {
            Ok(exists) => exists,
            Err(e) => {
                warn!("cannot check whether {self} exists: {e}");
                false
            }
        }
    }

    /// Reads the contents of a file to the end.
    pub async fn read(&self) -> Result<Vec<u8>> {
        if !self.is_remote() {
            return Ok(fs::read(&self.path).await?);
        }

        ShellCommand::new(format!("cat {}", self.quoted()))
            .transfer()
            .run(&self.host)
            .await
    }

    /// Reads the whole file as UTF-8. Trailing newlines are kept.
    pub async fn read_to_string(&self) -> Result<String> {
        if !self.is_remote() {
            return Ok(fs::read_to_string(&self.path).await?);
        }

        String::from_utf8(self.read().await?)
            .map_err(|e| Error::UnexpectedOutput(format!("{self}: {e}")))
    }

    /// Writes `data` to the file, creating or truncating it.
    pub async fn write<D: AsRef<[u8]>>(&self, data: D) -> Result<()> {
        if !self.is_remote() {
            return Ok(fs::write(&self.path, data).await?);
        }

        ShellCommand::new(format!("cat > {}", self.quoted()))
            .stdin(data.as_ref())
            .transfer()
            .run(&self.host)
            .await
            .map(|_| ())
    }

    pub async fn write_text(&self, text: &str) -> Result<()> {
        self.write(text.as_bytes()).await
    }

    /// Creates the file if missing, otherwise updates its modification time.
    pub async fn touch(&self) -> Result<()> {
        if self.is_remote() {
            return ShellCommand::new(format!("touch {}", self.quoted()))
                .run(&self.host)
                .await
                .map(|_| ());
        }

        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.into_std().await.set_modified(SystemTime::now())?;
        Ok(())
    }

    /// Creates a directory as described by `options`.
    pub async fn mkdir(&self, options: DirOptions) -> Result<()> {
        if !self.is_remote() {
            return self.mkdir_local(options).await;
        }

        let path = self.quoted();
        let line = match (options.parents, options.exist_ok) {
            (true, true) => format!("mkdir -p {path}"),
            (true, false) => format!(
                "if test -e {path}; then echo \"mkdir: {path}: File exists\" >&2; exit 1; fi; mkdir -p {path}"
            ),
            (false, true) => format!("test -d {path} || mkdir {path}"),
            (false, false) => format!("mkdir {path}"),
        };

        ShellCommand::new(line).run(&self.host).await.map(|_| ())
    }

    async fn mkdir_local(&self, options: DirOptions) -> Result<()> {
        if options.parents {
            if !options.exist_ok && fs::try_exists(&self.path).await? {
                return Err(Error::AlreadyExists(self.to_string()));
            }
            return Ok(fs::create_dir_all(&self.path).await?);
        }

        match fs::create_dir(&self.path).await {
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && options.exist_ok => {
                match fs::metadata(&self.path).await?.is_dir() {
                    true => Ok(()),
                    false => Err(e.into()),
                }
            }
            result => Ok(result?),
        }
    }

    /// Creates a new, empty directory. The parent must exist.
    pub async fn create_dir(&self) -> Result<()> {
        self.mkdir(DirOptions::default()).await
    }

    /// Creates a directory and all missing parents.
    pub async fn create_dir_all(&self) -> Result<()> {
        self.mkdir(DirOptions {
            parents: true,
            exist_ok: true,
        })
        .await
    }

    /// Makes this path a symlink pointing at `target`, which is interpreted
    /// on this path's host.
    pub async fn symlink_to<P: AsRef<StdPath>>(&self, target: P) -> Result<()> {
        let target = target.as_ref();

        if self.is_remote() {
            let line = format!("ln -s {} {}", quote_path(target), self.quoted());
            return ShellCommand::new(line).run(&self.host).await.map(|_| ());
        }

        symlink_local(target, &self.path).await
    }

    async fn stat(&self, follow_symlinks: bool) -> Result<Metadata> {
        if !self.is_remote() {
            let metadata = match follow_symlinks {
                true => fs::metadata(&self.path).await?,
                false => fs::symlink_metadata(&self.path).await?,
            };
            return Ok(Metadata::from(&metadata));
        }

        let line = format!(
            "stat {}--format='{STAT_FORMAT}' {}",
            if follow_symlinks { "-L " } else { "" },
            self.quoted()
        );
        ShellCommand::new(line).run_text(&self.host).await?.parse()
    }

    /// Queries metadata, following symlinks.
    pub async fn metadata(&self) -> Result<Metadata> {
        self.stat(true).await
    }

    /// Queries metadata of the path itself, not what a symlink points at.
    pub async fn symlink_metadata(&self) -> Result<Metadata> {
        self.stat(false).await
    }

    async fn check_type(&self, follow_symlinks: bool, check: fn(&Metadata) -> bool) -> Result<bool> {
        match self.stat(follow_symlinks).await {
            Ok(metadata) => Ok(check(&metadata)),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// `false` when the path does not exist
    pub async fn is_dir(&self) -> Result<bool> {
        self.check_type(true, Metadata::is_dir).await
    }

    pub async fn is_file(&self) -> Result<bool> {
        self.check_type(true, Metadata::is_file).await
    }

    pub async fn is_symlink(&self) -> Result<bool> {
        self.check_type(false, Metadata::is_symlink).await
    }

    pub async fn is_socket(&self) -> Result<bool> {
        self.check_type(true, Metadata::is_socket).await
    }

    /// Removes a file. With `missing_ok` a missing file is not an error.
    pub async fn remove_file(&self, missing_ok: bool) -> Result<()> {
        if self.is_remote() {
            let line = format!("rm {}{}", if missing_ok { "-f " } else { "" }, self.quoted());
            return ShellCommand::new(line).run(&self.host).await.map(|_| ());
        }

        match fs::remove_file(&self.path).await {
            Err(e) if missing_ok && e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            result => Ok(result?),
        }
    }

    /// Removes an empty directory.
    pub async fn remove_dir(&self) -> Result<()> {
        if !self.is_remote() {
            return Ok(fs::remove_dir(&self.path).await?);
        }

        ShellCommand::new(format!("rmdir {}", self.quoted()))
            .run(&self.host)
            .await
            .map(|_| ())
    }

    /// Sets the permission bits, e.g. `0o644`.
    pub async fn set_permissions(&self, mode: u32) -> Result<()> {
        if self.is_remote() {
            let line = format!("chmod {mode:o} {}", self.quoted());
            return ShellCommand::new(line).run(&self.host).await.map(|_| ());
        }

        chmod_local(&self.path, mode).await
    }

    /// Resolves symlinks and relative components. A path that cannot be
    /// resolved is returned unchanged.
    pub async fn canonicalize(&self) -> Result<Self> {
        if !self.is_remote() {
            return match fs::canonicalize(&self.path).await {
                Ok(path) => Ok(self.sibling(path)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!("cannot resolve {self}, keeping it as is: {e}");
                    Ok(self.clone())
                }
                Err(e) => Err(e.into()),
            };
        }

        let path = self.quoted();
        let line = format!("realpath {path} 2>/dev/null || echo {path}");
        let resolved = ShellCommand::new(line).run_text(&self.host).await?;
        Ok(self.sibling(resolved))
    }

    /// Paths under this directory matching `pattern`, in listing order.
    ///
    /// Remote patterns are expanded by bash with `extglob` and `globstar`,
    /// so the pattern must not contain unquoted whitespace. Metacharacters
    /// in the directory itself are matched literally on both hosts.
    pub async fn glob(&self, pattern: &str) -> Result<Vec<Self>> {
        if self.is_remote() {
            // shopt must run on its own line: bash parses a whole line
            // before executing it, and extglob syntax is a parse error
            // until the option is on
            let line = format!(
                "shopt -s extglob globstar\nls -d {}/{pattern} 2>/dev/null || true",
                self.quoted()
            );
            let listing = ShellCommand::new(line)
                .shell(Shell::Bash)
                .run_text(&self.host)
                .await?;

            return Ok(listing
                .lines()
                .filter(|line| !line.is_empty())
                .map(|line| self.sibling(line))
                .collect());
        }

        let full = glob_pattern(&self.path, pattern)?;

        let found = task::spawn_blocking(move || -> Result<Vec<PathBuf>> {
            glob::glob(&full)?
                .map(|entry| entry.map_err(|e| Error::from(std::io::Error::from(e))))
                .collect()
        })
        .await
        .map_err(|e| Error::IO(e.to_string()))??;

        Ok(found.into_iter().map(|path| self.sibling(path)).collect())
    }

    /// The entries of this directory, without `.` and `..`, sorted by name.
    pub async fn read_dir(&self) -> Result<Vec<Self>> {
        let mut names: Vec<PathBuf> = if self.is_remote() {
            let line = format!("cd {} && ls -A", self.quoted());
            ShellCommand::new(line)
                .run_text(&self.host)
                .await?
                .lines()
                .filter(|line| !line.is_empty())
                .map(PathBuf::from)
                .collect()
        } else {
            let mut names = Vec::new();
            let mut entries = fs::read_dir(&self.path).await?;
            while let Some(entry) = entries.next_entry().await? {
                names.push(PathBuf::from(entry.file_name()));
            }
            names
        };

        names.sort();
        Ok(names.into_iter().map(|name| self.join(name)).collect())
    }

    /// Copies a file or directory to `destination` on any host.
    ///
    /// With `contents_only` a directory's contents land in `destination`
    /// rather than the directory itself.
    pub async fn copy_to(&self, destination: &Self, contents_only: bool) -> Result<()> {
        Rsync::new(self, destination)
            .contents_only(contents_only)
            .run()
            .await
    }

    /// Moves a file or directory to `destination` on any host. Without
    /// `overwrite`, files already present at the destination are kept.
    pub async fn move_to(&self, destination: &Self, contents_only: bool, overwrite: bool) -> Result<()> {
        let mut rsync = Rsync::new(self, destination)
            .contents_only(contents_only)
            .arg("--remove-source-files");
        if !overwrite {
            rsync = rsync.arg("--ignore-existing");
        }
        rsync.run().await
    }

    /// Renames to `destination`, replacing it if it exists.
    pub async fn rename(&self, destination: &Self) -> Result<()> {
        match (&self.host, &destination.host) {
            (Host::Local, Host::Local) => Ok(fs::rename(&self.path, &destination.path).await?),
            (Host::Remote(src), Host::Remote(dst)) if src == dst => {
                let line = format!("mv -f {} {}", self.quoted(), destination.quoted());
                ShellCommand::new(line).run(&self.host).await.map(|_| ())
            }
            _ => self.move_to(destination, false, true).await,
        }
    }

    /// Alias of [`Path::rename`]
    pub async fn replace(&self, destination: &Self) -> Result<()> {
        self.rename(destination).await
    }
}

/// `pattern` under `dir`, with the glob metacharacters of `dir` escaped.
fn glob_pattern(dir: &StdPath, pattern: &str) -> Result<String> {
    let dir = dir
        .to_str()
        .ok_or_else(|| Error::InvalidPattern(dir.to_string_lossy().into_owned()))?;
    let escaped = glob::Pattern::escape(dir);

    Ok(match escaped.ends_with('/') || escaped.is_empty() {
        true => format!("{escaped}{pattern}"),
        false => format!("{escaped}/{pattern}"),
    })
}

#[cfg(unix)]
async fn symlink_local(target: &StdPath, link: &StdPath) -> Result<()> {
    Ok(fs::symlink(target, link).await?)
}

#[cfg(not(unix))]
async fn symlink_local(_target: &StdPath, link: &StdPath) -> Result<()> {
    Err(Error::IO(format!("symlinks are not supported here: {}", link.display())))
}

#[cfg(unix)]
async fn chmod_local(path: &StdPath, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    Ok(fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await?)
}

#[cfg(not(unix))]
async fn chmod_local(path: &StdPath, mode: u32) -> Result<()> {
    let mut permissions = fs::metadata(path).await?.permissions();
    permissions.set_readonly(mode & 0o222 == 0);
    Ok(fs::set_permissions(path, permissions).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn path(s: &str) -> Result<Path> {
        Path::parse(s)
    }

    fn check(input: &str, path_out: &str, host: Host) {
        let path = Path::parse(input).unwrap();
        assert_eq!(path.path, PathBuf::from(path_out), "path of {input:?}");
        assert_eq!(path.host, host, "host of {input:?}");
    }

    fn remote(s: &str) -> Host {
        Host::Remote(s.parse().unwrap())
    }

    #[test]
    fn test_creation() {
        for local in ["/foo/bar", "foo/bar", "~/foo/bar", "~me/foo/bar", "/x@foo/bar", "/fo:o/bar", "abc:def"] {
            check(local, local, Host::Local);
        }

        check("there:/foo", "/foo", remote("there"));
        check("me@there:/fo:o/bar", "/fo:o/bar", remote("me@there"));
        check("me@there:60:~", "~", remote("me@there:60"));
        check("there:/60:x", "/60:x", remote("there"));
        check("name@a:~name/.config", "~name/.config", remote("name@a"));
        check("1:2:/3", "/3", Host::Remote(Remote::new("1").with_port(2)));
    }

    #[test]
    fn test_creation_invalid_address() {
        assert!(matches!(Path::parse("a:b:c:/x"), Err(Error::InvalidAddress(_))));
        assert!(matches!(Path::parse("@host:/x"), Err(Error::InvalidAddress(_))));
        assert!(matches!(Path::parse("host:port:/x"), Err(Error::InvalidAddress(_))));
    }

    #[test]
    fn test_default_and_std_conversion() {
        let path = Path::default();
        assert_eq!(path.path, PathBuf::from("."));
        assert_eq!(path.host, Host::Local);

        let path = Path::from(PathBuf::from("a:/b"));
        assert_eq!(path.path, PathBuf::from("a:/b"));
        assert!(!path.is_remote());

        let path = Path::parse("a:/b").unwrap();
        assert_eq!(path.clone(), path);
        assert_eq!(path.host, remote("a"));
    }

    #[test]
    fn test_properties() {
        assert_eq!(path("foo:/bar").unwrap().remote().as_deref(), Some("foo"));
        assert_eq!(path("a@foo:/bar").unwrap().remote().as_deref(), Some("a@foo"));
        assert_eq!(path("a@foo:1:/bar").unwrap().remote().as_deref(), Some("a@foo:1"));
        assert_eq!(path("/bar").unwrap().remote(), None);

        assert_eq!(
            path("a@foo:/bar/foo").unwrap().parent(),
            Some(path("a@foo:/bar").unwrap())
        );
        assert_eq!(
            path("a@foo:~bar/foo").unwrap().parent(),
            Some(path("a@foo:~bar").unwrap())
        );

        assert!(path("a@foo:/bar/foo").unwrap().is_remote());
        assert!(!path("~bar/foo").unwrap().is_remote());

        assert_eq!(
            path("a@b:9:/x/y").unwrap().rparts(),
            ("a@b:9".to_owned(), "/x/y".to_owned())
        );
        assert_eq!(path("x/y").unwrap().rparts(), (String::new(), "x/y".to_owned()));
    }

    #[test]
    fn test_display() {
        for s in ["a@b:123:~/xyz", "there:/foo", "relative/path", "/abs"] {
            assert_eq!(path(s).unwrap().to_string(), s);
        }
        assert_eq!(path("a@b:22:/x").unwrap().to_string(), "a@b:/x");
    }

    #[test]
    fn test_equality() {
        assert_eq!(path("abc/def.g").unwrap(), path("abc/def.g").unwrap());
        assert_eq!(path("a@x:/abc/def.g").unwrap(), path("a@x:/abc/def.g").unwrap());
        assert_ne!(path("abc/def.g").unwrap(), path("def/abc.g").unwrap());
        assert_ne!(path("x:/abc/def.g").unwrap(), path("/abc/def.g").unwrap());

        assert!(path("abc/def.g").unwrap() == *StdPath::new("abc/def.g"));
        assert_eq!(path("abc/def.g").unwrap(), PathBuf::from("abc/def.g"));
        assert_ne!(path("x:/abc/def.g").unwrap(), PathBuf::from("/abc/def.g"));

        let set: HashSet<Path> = ["x:/a", "x:/a", "y:/a", "/a"]
            .into_iter()
            .map(|s| path(s).unwrap())
            .collect();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_join() {
        let base = path("a:/b").unwrap();
        assert_eq!(&base / "c", path("a:/b/c").unwrap());
        assert_eq!(base.clone() / "c" / "d.txt", path("a:/b/c/d.txt").unwrap());
        assert_eq!(&base / "/abs", path("a:/abs").unwrap());

        assert_eq!(base.try_join(&path("a:/z").unwrap()).unwrap(), path("a:/z").unwrap());
        assert!(matches!(
            base.try_join(&path("c").unwrap()),
            Err(Error::HostMismatch { .. })
        ));
    }

    #[test]
    fn test_name_accessors() {
        let p = path("h:/dir/archive.tar.gz").unwrap();
        assert_eq!(p.file_name(), Some(OsStr::new("archive.tar.gz")));
        assert_eq!(p.file_stem(), Some(OsStr::new("archive.tar")));
        assert_eq!(p.extension(), Some(OsStr::new("gz")));
        assert_eq!(p.suffixes(), [".tar", ".gz"]);
        assert_eq!(p.parts(), ["/", "dir", "archive.tar.gz"]);
        assert!(p.is_absolute());

        assert_eq!(path(".bashrc").unwrap().suffixes(), Vec::<String>::new());
        assert_eq!(path("trailing.").unwrap().suffixes(), Vec::<String>::new());
        assert!(!path("h:~/x").unwrap().is_absolute());
    }

    #[test]
    fn test_with_methods() {
        let p = path("h:/dir/file.txt").unwrap();
        assert_eq!(p.with_file_name("other.rs"), path("h:/dir/other.rs").unwrap());
        assert_eq!(p.with_extension("md"), path("h:/dir/file.md").unwrap());
        assert_eq!(p.with_extension(""), path("h:/dir/file").unwrap());
        assert_eq!(p.with_stem("renamed"), path("h:/dir/renamed.txt").unwrap());
        assert_eq!(
            path("/dir/noext").unwrap().with_stem("x"),
            path("/dir/x").unwrap()
        );
    }

    #[test]
    fn test_relative() {
        let p = path("h:/a/b/c").unwrap();
        let base = path("h:/a").unwrap();

        assert_eq!(p.relative_to(&base).unwrap(), Path::from(PathBuf::from("b/c")));
        assert!(p.is_relative_to(&base));
        assert!(!p.is_relative_to(&path("/a").unwrap()));
        assert!(!p.is_relative_to(&path("h:/z").unwrap()));

        assert!(matches!(
            p.relative_to(&path("/a").unwrap()),
            Err(Error::HostMismatch { .. })
        ));
        assert!(matches!(
            p.relative_to(&path("h:/z").unwrap()),
            Err(Error::NotRelative { .. })
        ));
    }

    #[test]
    fn test_remote_paths_round_trip_through_strings() {
        let relative = path("h:/a/b/c").unwrap().relative_to(&path("h:/a").unwrap()).unwrap();
        assert!(!relative.is_remote());
        assert_eq!(path(&relative.to_string()).unwrap(), relative);
        assert_eq!(&path("h:~/x").unwrap() / relative.as_std_path(), path("h:~/x/b/c").unwrap());

        let p = Path::new_remote(Remote::new("h"), "b/c");
        assert_eq!(p.to_string(), "h:~/b/c");
        assert_eq!(path(&p.to_string()).unwrap(), p);

        let home = path("me@h:~").unwrap();
        assert_eq!(home.parent(), None);
        assert_eq!(path("me@h:~me").unwrap().parent(), None);
        assert_eq!(path("/").unwrap().parent(), None);
        assert_eq!(path("x").unwrap().parent(), Some(path("").unwrap()));

        let renamed = home.with_file_name("other");
        assert_eq!(renamed.to_string(), "me@h:~/other");
        assert_eq!(path(&renamed.to_string()).unwrap(), renamed);

        for p in [Path::new_remote(Remote::new("h").with_port(2200), "x"), path("h:/").unwrap()] {
            let json = serde_json::to_string(&p).unwrap();
            assert_eq!(serde_json::from_str::<Path>(&json).unwrap(), p);
        }
    }

    #[test]
    fn test_glob_pattern_escapes_directory() {
        assert_eq!(glob_pattern(StdPath::new("/logs[2024]"), "*.log").unwrap(), "/logs[[]2024[]]/*.log");
        assert_eq!(glob_pattern(StdPath::new("/a?b*"), "**/*.rs").unwrap(), "/a[?]b[*]/**/*.rs");
        assert_eq!(glob_pattern(StdPath::new("/"), "*").unwrap(), "/*");
        assert_eq!(glob_pattern(StdPath::new("plain"), "*.rs").unwrap(), "plain/*.rs");
    }

    #[test]
    fn test_serde_as_string() {
        let p = path("me@box:2200:/srv/data").unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#""me@box:2200:/srv/data""#);
        assert_eq!(serde_json::from_str::<Path>(&json).unwrap(), p);
        assert!(serde_json::from_str::<Path>(r#""a:b:c:/x""#).is_err());
    }
}
