//! Single-stream HTTP GET of one track into a local file.
//!
//! Streams the body into `<dest>.part`, reporting the running byte count after
//! every chunk, and renames onto `dest` once the whole body arrived.
//! Cancellation is observed between chunks and from curl's progress callback,
//! so a stalled transfer is aborted too.

mod error;

pub use error::TransferError;

use std::cell::{Cell, RefCell};
use std::path::Path;
use std::str;

use crate::storage::PartFile;
use crate::transport::Transport;

/// Downloads `url` into `dest`, calling `on_progress` with the cumulative byte
/// count after each chunk. Returns the number of bytes written.
///
/// Holds one connection slot from the transport's budget while running.
/// On any error (including cancellation) the partial file is removed.
pub fn download_to_file(
    transport: &Transport,
    url: &str,
    dest: &Path,
    on_progress: &mut dyn FnMut(u64),
    cancel: &dyn Fn() -> bool,
) -> Result<u64, TransferError> {
    let _slot = transport
        .budget()
        .acquire(cancel)
        .ok_or(TransferError::Cancelled)?;
    if cancel() {
        return Err(TransferError::Cancelled);
    }

    let mut part = PartFile::create(dest)?;
    match transfer_into(transport, url, &mut part, on_progress, cancel) {
        Ok(received) => {
            part.finalize(dest)?;
            Ok(received)
        }
        Err(e) => {
            part.discard();
            Err(e)
        }
    }
}

fn transfer_into(
    transport: &Transport,
    url: &str,
    part: &mut PartFile,
    on_progress: &mut dyn FnMut(u64),
    cancel: &dyn Fn() -> bool,
) -> Result<u64, TransferError> {
    let opts = transport.options();
    let received = Cell::new(0u64);
    let status = Cell::new(0u32);
    let cancelled = Cell::new(false);
    let storage_error: RefCell<Option<std::io::Error>> = RefCell::new(None);

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    opts.apply(&mut easy)?;
    easy.low_speed_limit(opts.low_speed_limit)?;
    easy.low_speed_time(opts.low_speed_time)?;
    easy.progress(true)?;

    let perform_result = {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(line) = str::from_utf8(data) {
                if let Some(code) = parse_status_line(line) {
                    status.set(code);
                }
            }
            true
        })?;
        transfer.write_function(|data| {
            if cancel() {
                cancelled.set(true);
                return Ok(0);
            }
            // Don't write error pages to disk; the status is reported after perform.
            if !(200..300).contains(&status.get()) {
                return Ok(0);
            }
            if let Err(e) = part.write(data) {
                storage_error.borrow_mut().replace(e);
                return Ok(0);
            }
            let total = received.get() + data.len() as u64;
            received.set(total);
            on_progress(total);
            Ok(data.len())
        })?;
        transfer.progress_function(|_, _, _, _| {
            if cancel() {
                cancelled.set(true);
                return false;
            }
            true
        })?;
        transfer.perform()
    };

    if cancelled.get() {
        return Err(TransferError::Cancelled);
    }
    if let Err(e) = perform_result {
        if let Some(io_err) = storage_error.borrow_mut().take() {
            return Err(TransferError::Storage(io_err));
        }
        let code = easy.response_code().unwrap_or(0);
        if e.is_write_error() && code != 0 && !(200..300).contains(&code) {
            return Err(TransferError::Http(code));
        }
        return Err(TransferError::Curl(e));
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(TransferError::Http(code));
    }

    let received = received.get();
    let expected = easy.content_length_download()?;
    if expected >= 0.0 && received != expected as u64 {
        return Err(TransferError::PartialTransfer {
            expected: expected as u64,
            received,
        });
    }
    Ok(received)
}

/// Status code from an `HTTP/1.1 200 OK` line; None for other header lines.
fn parse_status_line(line: &str) -> Option<u32> {
    let line = line.trim_end();
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}
