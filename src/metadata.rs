use serde::{Deserialize, Serialize};
#[cfg(unix)]
use std::os::unix::fs::MetadataExt;
use std::{
    fs,
    str::FromStr,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use crate::{
    error::{Error, Result},
    utils,
};

/// `stat --format` producing the fields of [`Metadata`] in declaration order.
///
/// `%f` is the raw mode in hex, the rest are decimal.
pub(crate) const STAT_FORMAT: &str = "%f %i %d %h %u %g %s %X %Y %W";

const S_IFMT: u32 = 0o170000;

/// Types according to mode unix
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileType(u32);

bitflags! {
    impl FileType: u32 {
        const FIFO = 0o010000;
        const CHR = 0o020000;
        const DIR = 0o040000;
        const BLK = 0o060000;
        const REG = 0o100000;
        const LNK = 0o120000;
        const SOCK = 0o140000;
    }
}

/// Result of a `stat` on either side.
/// Implements most [Metadata](std::fs::Metadata) methods
///
/// Times are seconds since the unix epoch. A `ctime` of zero means the
/// remote `stat` could not report a birth time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub mode: u32,
    pub ino: u64,
    pub dev: u64,
    pub nlink: u64,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
    pub atime: i64,
    pub mtime: i64,
    pub ctime: i64,
}

macro_rules! impl_fn_type {
    ($get_name:ident, $doc_name:expr, $flag:ident) => {
        #[doc = "Returns `true` if is a "]
        #[doc = $doc_name]
        pub fn $get_name(&self) -> bool {
            self.file_type() == FileType::$flag
        }
    };
}

impl Metadata {
    impl_fn_type!(is_dir, "dir", DIR);
    impl_fn_type!(is_file, "regular file", REG);
    impl_fn_type!(is_symlink, "symlink", LNK);
    impl_fn_type!(is_socket, "socket", SOCK);
    impl_fn_type!(is_fifo, "fifo", FIFO);
    impl_fn_type!(is_block, "block device", BLK);
    impl_fn_type!(is_char, "character device", CHR);

    /// The type bits of the mode. Compared whole, since e.g. `SOCK`
    /// contains the bits of `DIR`.
    pub fn file_type(&self) -> FileType {
        FileType::from_bits_retain(self.mode & S_IFMT)
    }

    /// Permission bits, including setuid/setgid/sticky
    pub fn permissions(&self) -> u32 {
        self.mode & 0o7777
    }

    /// Returns the size of the file
    pub fn len(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the last access time
    pub fn accessed(&self) -> SystemTime {
        from_unix(self.atime)
    }

    /// Returns the last modification time
    pub fn modified(&self) -> SystemTime {
        from_unix(self.mtime)
    }

    /// Returns the creation time, or `None` when unknown
    pub fn created(&self) -> Option<SystemTime> {
        (self.ctime != 0).then(|| from_unix(self.ctime))
    }
}

fn from_unix(secs: i64) -> SystemTime {
    match u64::try_from(secs) {
        Ok(secs) => UNIX_EPOCH + Duration::from_secs(secs),
        Err(_) => UNIX_EPOCH - Duration::from_secs(secs.unsigned_abs()),
    }
}

/// Parses one line printed by `stat --format` with [`STAT_FORMAT`]
impl FromStr for Metadata {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let unexpected = || Error::UnexpectedOutput(format!("stat: {s:?}"));

        let fields: Vec<&str> = s.split_whitespace().collect();
        let [mode, ino, dev, nlink, uid, gid, size, atime, mtime, ctime] = fields[..] else {
            return Err(unexpected());
        };

        macro_rules! field {
            ($value:expr) => {
                $value.parse().map_err(|_| unexpected())?
            };
        }

        Ok(Self {
            mode: u32::from_str_radix(mode, 16).map_err(|_| unexpected())?,
            ino: field!(ino),
            dev: field!(dev),
            nlink: field!(nlink),
            uid: field!(uid),
            gid: field!(gid),
            size: field!(size),
            atime: field!(atime),
            mtime: field!(mtime),
            // GNU stat prints `-` or `?` here on older versions without birth times
            ctime: ctime.parse().unwrap_or(0),
        })
    }
}

/// For simple conversion of local `Metadata`
impl From<&fs::Metadata> for Metadata {
    #[cfg(unix)]
    fn from(metadata: &fs::Metadata) -> Self {
        Self {
            mode: metadata.mode(),
            ino: metadata.ino(),
            dev: metadata.dev(),
            nlink: metadata.nlink(),
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size(),
            atime: metadata.atime(),
            mtime: metadata.mtime(),
            ctime: metadata.created().map(utils::unix).unwrap_or(0),
        }
    }

    #[cfg(not(unix))]
    fn from(metadata: &fs::Metadata) -> Self {
        let kind = if metadata.is_dir() {
            FileType::DIR
        } else if metadata.is_symlink() {
            FileType::LNK
        } else {
            FileType::REG
        };
        let perms = if metadata.permissions().readonly() { 0o555 } else { 0o777 };

        Self {
            mode: kind.bits() | perms,
            nlink: 1,
            size: metadata.len(),
            atime: metadata.accessed().map(utils::unix).unwrap_or(0),
            mtime: metadata.modified().map(utils::unix).unwrap_or(0),
            ctime: metadata.created().map(utils::unix).unwrap_or(0),
            ..Default::default()
        }
    }
}
