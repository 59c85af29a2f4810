//! Scoped access to an image source.
//!
//! A [`CaptureSession`] acquires its device on open and releases it when
//! dropped, so capture, cancel and error paths all give the device back.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, ScoutError};
use crate::identify::data_uri_from_bytes;

/// Something that produces cover images: a camera, a file, a test double.
pub trait CaptureDevice {
    fn acquire(&mut self) -> Result<()>;

    /// Grab one frame as encoded image bytes. Only called while acquired.
    fn capture_frame(&mut self) -> Result<Vec<u8>>;

    /// Must be safe to call on an already released device.
    fn release(&mut self);
}

/// An acquired device. Released on drop.
pub struct CaptureSession<'a, D: CaptureDevice + ?Sized> {
    device: &'a mut D,
}

impl<'a, D: CaptureDevice + ?Sized> CaptureSession<'a, D> {
    pub fn open(device: &'a mut D) -> Result<Self> {
        device.acquire()?;
        debug!("Capture device acquired");
        Ok(Self { device })
    }

    /// Capture one frame as a data URI and end the session.
    pub fn capture(self) -> Result<String> {
        let bytes = self.device.capture_frame()?;
        data_uri_from_bytes(&bytes)
    }

    /// End the session without capturing.
    pub fn cancel(self) {
        debug!("Capture cancelled");
    }
}

impl<D: CaptureDevice + ?Sized> Drop for CaptureSession<'_, D> {
    fn drop(&mut self) {
        self.device.release();
        debug!("Capture device released");
    }
}

/// Image file on disk used as a capture source. Holds the file open while
/// acquired.
pub struct FileSource {
    path: PathBuf,
    handle: Option<File>,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            handle: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_acquired(&self) -> bool {
        self.handle.is_some()
    }
}

impl CaptureDevice for FileSource {
    fn acquire(&mut self) -> Result<()> {
        let file = File::open(&self.path)
            .map_err(|e| ScoutError::Image(format!("Cannot open {:?}: {}", self.path, e)))?;
        self.handle = Some(file);
        Ok(())
    }

    fn capture_frame(&mut self) -> Result<Vec<u8>> {
        let file = self
            .handle
            .as_mut()
            .ok_or_else(|| ScoutError::Image("Capture source is not open".to_string()))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| ScoutError::Image(format!("Failed to read {:?}: {}", self.path, e)))?;
        if bytes.is_empty() {
            warn!("Capture source {:?} is empty", self.path);
            return Err(ScoutError::Image(format!("{:?} is empty", self.path)));
        }
        Ok(bytes)
    }

    fn release(&mut self) {
        self.handle = None;
    }
}
