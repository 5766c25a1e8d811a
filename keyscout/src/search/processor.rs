use memmap2::Mmap;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{trace, warn};

use super::matcher::KeywordMatcher;
use crate::config::EncodingMode;
use crate::errors::{SearchError, SearchResult};
use crate::results::PartialResult;

const BUFFER_CAPACITY: usize = 65536;
pub(crate) const SMALL_FILE_THRESHOLD: u64 = 32 * 1024; // 32KB
pub(crate) const LARGE_FILE_THRESHOLD: u64 = 10 * 1024 * 1024; // 10MB

/// Decodes file bytes according to the encoding mode
fn decode_bytes<'a>(
    bytes: &'a [u8],
    path: &Path,
    encoding_mode: EncodingMode,
) -> SearchResult<Cow<'a, str>> {
    match encoding_mode {
        EncodingMode::FailFast => std::str::from_utf8(bytes)
            .map(Cow::Borrowed)
            .map_err(|e| SearchError::encoding_error(path, e)),
        EncodingMode::Lossy => {
            let cow = String::from_utf8_lossy(bytes);
            // Owned means at least one invalid sequence was replaced
            if let Cow::Owned(_) = cow {
                warn!("Invalid UTF-8 replaced in file: {}", path.display());
            }
            Ok(cow)
        }
    }
}

/// Reads files as text and runs the keyword matcher over them
#[derive(Debug, Clone)]
pub struct FileProcessor {
    matcher: KeywordMatcher,
    encoding_mode: EncodingMode,
}

impl FileProcessor {
    /// Creates a new FileProcessor with the given keyword matcher
    pub fn new(matcher: KeywordMatcher, encoding_mode: EncodingMode) -> Self {
        Self {
            matcher,
            encoding_mode,
        }
    }

    pub fn matcher(&self) -> &KeywordMatcher {
        &self.matcher
    }

    /// Reads the whole file as text.
    ///
    /// Small files are read in one call, large ones are memory mapped and the
    /// rest go through a buffered reader. Any failure comes back as an error
    /// for this file alone.
    pub fn read_text(&self, path: &Path) -> SearchResult<String> {
        self.read_counted(path).map(|(text, _)| text)
    }

    /// Reads the file as text along with the number of bytes taken from disk
    fn read_counted(&self, path: &Path) -> SearchResult<(String, u64)> {
        let size = match path.metadata() {
            Ok(metadata) => Some(metadata.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SearchError::file_not_found(path));
            }
            Err(e) => {
                warn!("Failed to get metadata for {}: {}", path.display(), e);
                None
            }
        };

        match size {
            Some(size) if size < SMALL_FILE_THRESHOLD => self.read_small_file(path),
            Some(size) if size >= LARGE_FILE_THRESHOLD => self.read_mmap_file(path),
            _ => self.read_buffered_file(path),
        }
    }

    fn decode(&self, bytes: &[u8], path: &Path) -> SearchResult<(String, u64)> {
        let text = decode_bytes(bytes, path, self.encoding_mode)?.into_owned();
        Ok((text, bytes.len() as u64))
    }

    fn read_small_file(&self, path: &Path) -> SearchResult<(String, u64)> {
        trace!("Reading small file: {}", path.display());
        let bytes = std::fs::read(path).map_err(|e| SearchError::from_io(path, e))?;
        self.decode(&bytes, path)
    }

    fn read_buffered_file(&self, path: &Path) -> SearchResult<(String, u64)> {
        trace!("Reading buffered file: {}", path.display());
        let file = File::open(path).map_err(|e| SearchError::from_io(path, e))?;
        let mut reader = BufReader::with_capacity(BUFFER_CAPACITY, file);
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| SearchError::from_io(path, e))?;
        self.decode(&bytes, path)
    }

    fn read_mmap_file(&self, path: &Path) -> SearchResult<(String, u64)> {
        trace!("Memory mapping file: {}", path.display());
        let file = File::open(path).map_err(|e| SearchError::from_io(path, e))?;
        // The map lives only for this call and is never written through
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| SearchError::from_io(path, e))?;
        self.decode(&mmap, path)
    }

    /// Scans one file, mapping every keyword it contains to `[path]`
    pub fn scan_file(&self, path: &Path) -> SearchResult<PartialResult> {
        trace!("Scanning file: {}", path.display());
        let (content, bytes_read) = self.read_counted(path)?;
        let found = self.matcher.matching(&content);
        Ok(PartialResult::for_file(path, found, bytes_read))
    }
}
