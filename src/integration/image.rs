//! Image attachments
//!
//! Files are read on a worker thread and handed back as `data:` URIs, the
//! form stored on uploaded-image messages.

use crate::{Result, VocalisError};
use base64::Engine;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::path::{Path, PathBuf};
use std::thread;
use tracing::{debug, info, warn};

/// Outcome of a load request
#[derive(Clone, Debug, PartialEq)]
pub enum ImageEvent {
    Loaded { path: PathBuf, data_uri: String },
    Failed { path: PathBuf, error: String },
}

/// MIME type guessed from the file extension
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Read `path` fully and encode it as a data URI
pub fn read_data_uri(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    debug!("Read {} bytes from {:?}", bytes.len(), path);
    Ok(encode_data_uri(mime_for_path(path), &bytes))
}

/// Background reader for image attachments
pub struct ImageLoader {
    request_tx: Sender<PathBuf>,
    event_rx: Receiver<ImageEvent>,
}

impl ImageLoader {
    pub fn start() -> Result<Self> {
        let (request_tx, request_rx) = unbounded::<PathBuf>();
        let (event_tx, event_rx) = unbounded();

        thread::Builder::new()
            .name("image-loader".into())
            .spawn(move || {
                while let Ok(path) = request_rx.recv() {
                    let event = match read_data_uri(&path) {
                        Ok(data_uri) => ImageEvent::Loaded { path, data_uri },
                        Err(e) => {
                            warn!("Failed to read image {:?}: {}", path, e);
                            ImageEvent::Failed {
                                path,
                                error: e.to_string(),
                            }
                        }
                    };
                    if event_tx.send(event).is_err() {
                        break;
                    }
                }
                info!("Image loader stopped");
            })
            .map_err(|e| VocalisError::ChannelError(format!("Failed to spawn image loader: {}", e)))?;

        Ok(Self {
            request_tx,
            event_rx,
        })
    }

    pub fn request(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.request_tx
            .send(path.into())
            .map_err(|e| VocalisError::ChannelError(format!("Image loader gone: {}", e)))
    }

    pub fn events(&self) -> Receiver<ImageEvent> {
        self.event_rx.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("a.png")), "image/png");
        assert_eq!(mime_for_path(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("icon.svg")), "image/svg+xml");
        assert_eq!(mime_for_path(Path::new("notes.txt")), "application/octet-stream");
        assert_eq!(mime_for_path(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn test_encode_data_uri() {
        assert_eq!(encode_data_uri("image/gif", b"GIF89a"), "data:image/gif;base64,R0lGODlh");
    }

    #[test]
    fn test_loader_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pixel.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let loader = ImageLoader::start().unwrap();
        loader.request(&path).unwrap();

        match loader.events().recv_timeout(Duration::from_secs(5)).unwrap() {
            ImageEvent::Loaded { data_uri, .. } => assert_eq!(data_uri, "data:image/png;base64,iVBORw=="),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_loader_reports_missing_file() {
        let loader = ImageLoader::start().unwrap();
        loader.request("/nonexistent/photo.jpg").unwrap();

        let event = loader.events().recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(event, ImageEvent::Failed { .. }));
    }
}
