use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::errors::CoreError;

/// Where the encoded store image lives.
///
/// A backend only moves whole images: `store` must replace the previous
/// image atomically, so a reader never sees a half-written file.
pub trait StorageBackend: Send + Sync {
    /// Read the current image, `None` if nothing has been written yet.
    fn load(&self) -> Result<Option<Vec<u8>>, CoreError>;

    /// Replace the current image.
    fn store(&self, bytes: &[u8]) -> Result<(), CoreError>;
}

/// Store image kept in a single file on disk (native only).
///
/// Writes go to a `.tmp` sibling that is renamed over the target.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileBackend {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn temp_path(&self) -> std::path::PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl StorageBackend for FileBackend {
    fn load(&self) -> Result<Option<Vec<u8>>, CoreError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, bytes: &[u8]) -> Result<(), CoreError> {
        let tmp = self.temp_path();
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory backend. Used for ephemeral stores and for simulating an
/// unavailable device in tests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    image: Mutex<Option<Vec<u8>>>,
    unavailable: AtomicBool,
    failing_writes: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing image (e.g. a legacy-generation file).
    pub fn with_image(bytes: Vec<u8>) -> Self {
        Self {
            image: Mutex::new(Some(bytes)),
            ..Self::default()
        }
    }

    /// While unavailable every load and store fails.
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Make the next `count` stores fail, then recover.
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    /// Number of successful stores so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Copy of the current image.
    pub fn image(&self) -> Option<Vec<u8>> {
        self.image.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn check_available(&self) -> Result<(), CoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CoreError::FileIO("memory backend unavailable".into()));
        }
        Ok(())
    }
}

impl StorageBackend for MemoryBackend {
    fn load(&self) -> Result<Option<Vec<u8>>, CoreError> {
        self.check_available()?;
        Ok(self.image())
    }

    fn store(&self, bytes: &[u8]) -> Result<(), CoreError> {
        self.check_available()?;
        let pending = self.failing_writes.load(Ordering::SeqCst);
        if pending > 0 {
            self.failing_writes.store(pending - 1, Ordering::SeqCst);
            return Err(CoreError::FileIO("injected write failure".into()));
        }
        *self.image.lock().unwrap_or_else(|e| e.into_inner()) = Some(bytes.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Backends are commonly shared between a store and the code observing it.
impl<B: StorageBackend + ?Sized> StorageBackend for std::sync::Arc<B> {
    fn load(&self) -> Result<Option<Vec<u8>>, CoreError> {
        (**self).load()
    }

    fn store(&self, bytes: &[u8]) -> Result<(), CoreError> {
        (**self).store(bytes)
    }
}
