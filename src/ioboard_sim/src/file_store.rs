use std::fs;
use std::path::PathBuf;

use ioboard::{NvError, ParamStore};

/// Parameter store backed by a file, standing in for the board's EEPROM.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ParamStore for FileStore {
    fn load(&mut self, buf: &mut [u8]) -> Result<(), NvError> {
        let data = fs::read(&self.path).map_err(|e| {
            eprintln!("⚠️ cannot read {}: {}", self.path.display(), e);
            NvError::Store
        })?;
        let src = data.get(..buf.len()).ok_or(NvError::Store)?;
        buf.copy_from_slice(src);
        Ok(())
    }

    fn save(&mut self, data: &[u8]) -> Result<(), NvError> {
        fs::write(&self.path, data).map_err(|e| {
            eprintln!("⚠️ cannot write {}: {}", self.path.display(), e);
            NvError::Store
        })
    }
}
