use std::path::Path;

use voxbridge_protocol::constants::{ALLOWED_AUDIO_EXTENSIONS, MAX_UPLOAD_SIZE};

use crate::{TransferError, format_size};

/// Checks an audio file before any bytes leave the machine.
///
/// Rejects:
/// - Extensions outside the allow-list (case-insensitive)
/// - Empty files
/// - Files above [`MAX_UPLOAD_SIZE`]
pub fn validate_audio_file(filename: &str, size: u64) -> Result<(), TransferError> {
    let extension = Path::new(filename)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());

    match extension {
        Some(ext) if ALLOWED_AUDIO_EXTENSIONS.contains(&ext.as_str()) => {}
        _ => {
            return Err(TransferError::UnsupportedFormat {
                filename: filename.to_string(),
            });
        }
    }

    if size == 0 {
        return Err(TransferError::EmptyFile {
            filename: filename.to_string(),
        });
    }

    if size > MAX_UPLOAD_SIZE {
        return Err(TransferError::FileTooLarge {
            filename: filename.to_string(),
            size: format_size(size),
            limit: format_size(MAX_UPLOAD_SIZE),
        });
    }

    tracing::debug!(filename, size = %format_size(size), "audio file accepted");
    Ok(())
}
