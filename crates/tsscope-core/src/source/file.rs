use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use log::debug;

use super::{ByteSource, SourceError};

/// A `ByteSource` reading directly from a file on disk.
///
/// The length is captured once at open time; the file is opened read-only.
///
/// # Examples
/// ```no_run
/// use std::path::Path;
///
/// use tsscope_core::{ByteSource, FileByteSource};
///
/// let mut source = FileByteSource::open(Path::new("capture.ts"))?;
/// let first = source.read_byte()?;
/// println!("{} starts with {first:#04x}", source);
/// source.close()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct FileByteSource {
    path: PathBuf,
    file: Option<File>,
    length: u64,
}

impl FileByteSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        let length = file.metadata()?.len();
        debug!("opened {} ({} bytes)", path.display(), length);
        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            length,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file_mut(&mut self) -> Result<&mut File, SourceError> {
        self.file.as_mut().ok_or(SourceError::Closed)
    }
}

impl ByteSource for FileByteSource {
    fn read_byte(&mut self) -> Result<u8, SourceError> {
        let mut byte = [0u8; 1];
        match self.file_mut()?.read_exact(&mut byte) {
            Ok(()) => Ok(byte[0]),
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => Err(SourceError::EndOfInput),
            Err(err) => Err(SourceError::Io(err)),
        }
    }

    fn read_block(&mut self, dest: &mut [u8]) -> Result<usize, SourceError> {
        let file = self.file_mut()?;
        let mut filled = 0;
        while filled < dest.len() {
            match file.read(&mut dest[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(SourceError::Io(err)),
            }
        }
        Ok(filled)
    }

    fn length(&self) -> u64 {
        self.length
    }

    fn seek(&mut self, position: u64) -> Result<(), SourceError> {
        self.file_mut()?.seek(SeekFrom::Start(position))?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), SourceError> {
        if self.file.take().is_some() {
            debug!("closed {}", self.path.display());
        }
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

impl fmt::Display for FileByteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
