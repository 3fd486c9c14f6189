//! Host-agnostic paths.
//!
//! [`Path`] accepts `[user@]host[:port]:/remote/path` anywhere a local path
//! would do, and runs its file operations either through `tokio::fs` or as
//! shell commands over `ssh` (copies and moves go through `rsync`).
//!
//! ```no_run
//! # async fn demo() -> remotelib::Result<()> {
//! let config = remotelib::Path::parse("me@server:2222:~/.config/app.toml")?;
//! if config.exists().await {
//!     let text = config.read_to_string().await?;
//!     config.with_extension("bak").write_text(&text).await?;
//! }
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate log;
#[macro_use]
extern crate bitflags;

mod command;
mod config;
mod error;
/// Local and remote hosts
pub mod host;
pub mod metadata;
mod path;
mod utils;

pub use command::{quote, quote_path};
pub use config::{config, set_config, Config, DEFAULT_SSH_OPTIONS};
pub use error::{Error, ErrorKind, Result};
pub use host::{Host, Remote};
pub use metadata::{FileType, Metadata};
pub use path::{split, DirOptions, Path};
