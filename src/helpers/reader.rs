use crate::error::BarcodeError;
use std::fs::File;
use std::io::BufReader;
use std::io::Cursor;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum UnifiedReaderError {
    #[error("No data from remote file: '{0}'")]
    RemoteFileNoDataError(String),
}

/// A unified reader over local files, remote URLs and in-memory uploads
pub(crate) enum UnifiedReader {
    /// Local file reader
    Local(BufReader<File>),
    /// Remote URL content (in-memory buffer)
    Remote(Cursor<Vec<u8>>),
    /// Uploaded bytes that never touched the disk
    Memory(Cursor<Vec<u8>>),
}

impl UnifiedReader {
    /// Opens a file from either a local path or remote URL.
    /// Remote URLs are fetched through DuckDB's `read_blob`, which handles
    /// http, https, s3, gs and friends together with their credentials.
    pub(crate) fn new(file_name: &str) -> Result<UnifiedReader, BarcodeError> {
        if Self::is_remote_url(file_name) {
            Self::read_blob_with_duckdb(file_name)
        } else {
            let file = File::open(file_name)?;
            Ok(UnifiedReader::Local(BufReader::new(file)))
        }
    }

    /// Wraps an upload buffer
    pub(crate) fn from_bytes(bytes: Vec<u8>) -> UnifiedReader {
        UnifiedReader::Memory(Cursor::new(bytes))
    }

    /// Checks if a file name represents a remote URL
    pub(crate) fn is_remote_url(file_name: &str) -> bool {
        if let Ok(url) = Url::parse(file_name) {
            // Windows drive letters parse as single-letter schemes
            url.scheme() != "file" && url.scheme().len() > 1
        } else {
            false
        }
    }

    /// Reads the leading bytes of the content and rewinds to the start
    pub(crate) fn peek_signature(&mut self, signature: &mut [u8]) -> std::io::Result<usize> {
        let mut filled = 0;
        while filled < signature.len() {
            let read = self.read(&mut signature[filled..])?;
            if read == 0 {
                break;
            }
            filled += read;
        }
        self.seek(SeekFrom::Start(0))?;
        Ok(filled)
    }

    fn read_blob_with_duckdb(file_name: &str) -> Result<UnifiedReader, BarcodeError> {
        let connection = duckdb::Connection::open_in_memory().map_err(crate::database::StorageError::from)?;
        let result: Result<Vec<u8>, _> = connection.query_row("SELECT content FROM read_blob(?)", [file_name], |row| row.get(0));
        connection.close().map_err(|(_, e)| crate::database::StorageError::from(e))?;

        let bytes = result.map_err(|e| std::io::Error::other(format!("Read '{}' failed: {}", file_name, e)))?;
        if bytes.is_empty() {
            Err(UnifiedReaderError::RemoteFileNoDataError(file_name.to_owned()))?;
        }

        Ok(UnifiedReader::Remote(Cursor::new(bytes)))
    }
}

impl Read for UnifiedReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            UnifiedReader::Local(reader) => reader.read(buf),
            UnifiedReader::Remote(reader) => reader.read(buf),
            UnifiedReader::Memory(reader) => reader.read(buf),
        }
    }
}

impl Seek for UnifiedReader {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        match self {
            UnifiedReader::Local(reader) => reader.seek(pos),
            UnifiedReader::Remote(reader) => reader.seek(pos),
            UnifiedReader::Memory(reader) => reader.seek(pos),
        }
    }
}
