//! CLI commands module.

mod decode;
mod encode;
mod stream;
mod toc;
mod util;
mod version;

pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use toc::TocCommand;
pub use version::VersionCommand;

pub(crate) use util::*;
