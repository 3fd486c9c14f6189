//! Machines a path can live on.
//!
//! A [`Remote`] is written `[user@]hostname[:port]` and is reached with the
//! `ssh` binary. [`Host::Local`] is the machine running this process.

use std::{fmt, str::FromStr};

use crate::error::{Error, Result};

pub const DEFAULT_PORT: u16 = 22;

/// SSH-able host machine
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Remote {
    pub hostname: String,
    /// Login user, `None` leaves the choice to ssh and its config
    pub user: Option<String>,
    pub port: u16,
}

impl Remote {
    pub fn new<T: Into<String>>(hostname: T) -> Self {
        Self {
            hostname: hostname.into(),
            user: None,
            port: DEFAULT_PORT,
        }
    }

    #[must_use]
    pub fn with_user<T: Into<String>>(mut self, user: T) -> Self {
        self.user = Some(user.into());
        self
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// The destination argument given to ssh: `[user@]hostname`
    pub fn address(&self) -> String {
        match &self.user {
            Some(user) => format!("{user}@{}", self.hostname),
            None => self.hostname.clone(),
        }
    }
}

impl FromStr for Remote {
    type Err = Error;

    /// From a string `[<user>@]<hostname>[:<port>]`
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidAddress(s.to_owned());

        let (address, port) = match s.split_once(':') {
            Some((_, port)) if port.contains(':') => return Err(invalid()),
            Some((address, port)) => (address, port.parse::<u16>().map_err(|_| invalid())?),
            None => (s, DEFAULT_PORT),
        };

        let (user, hostname) = match address.split_once('@') {
            Some((_, host)) if host.contains('@') => return Err(invalid()),
            Some((user, host)) if !user.is_empty() => (Some(user.to_owned()), host),
            Some(_) => return Err(invalid()),
            None => (None, address),
        };

        if hostname.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            hostname: hostname.to_owned(),
            user,
            port,
        })
    }
}

/// Describe the host with a simple string, excluding defaults
impl fmt::Display for Remote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address())?;
        if self.port != DEFAULT_PORT {
            write!(f, ":{}", self.port)?;
        }
        Ok(())
    }
}

/// Where a [`Path`](crate::Path) lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Host {
    #[default]
    Local,
    Remote(Remote),
}

impl Host {
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// The prefix that is added to a path to fully describe it.
    ///
    /// Empty for [`Host::Local`], `me@there:8000:` for a remote.
    pub fn prefix(&self) -> String {
        match self {
            Self::Local => String::new(),
            Self::Remote(remote) => format!("{remote}:"),
        }
    }

    pub fn as_remote(&self) -> Option<&Remote> {
        match self {
            Self::Local => None,
            Self::Remote(remote) => Some(remote),
        }
    }
}

impl From<Remote> for Host {
    fn from(remote: Remote) -> Self {
        Self::Remote(remote)
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => Ok(()),
            Self::Remote(remote) => remote.fmt(f),
        }
    }
}
