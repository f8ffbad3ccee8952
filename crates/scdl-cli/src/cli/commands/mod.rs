//! CLI command handlers.

mod download;
mod list;

pub use download::{run_download, DownloadArgs};
pub use list::run_list;
