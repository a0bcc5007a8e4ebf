//! Locating and fetching presentation documents.
//!
//! Remote documents are spooled into a temporary file that lives exactly as
//! long as the returned [`LocalDocument`].

use spellcheck_core::{extract_document, Document, Error, Result};
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use reqwest::Url;
use std::time::Duration;
use tempfile::NamedTempFile;

use crate::package::has_zip_magic;
use crate::parser::PptxReader;

/// Where a document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// An `http://` or `https://` URL.
    Url(String),
    /// A file on the local filesystem.
    Path(PathBuf),
}

impl DocumentSource {
    /// Interpret a command-line argument as a URL, `file://` URL, or path.
    ///
    /// `file://` URLs are percent-decoded. Anything that is not an http(s)
    /// or file URL is taken as a path.
    pub fn parse(location: &str) -> Self {
        match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Url(location.to_string()),
            Ok(url) if url.scheme() == "file" => match url.to_file_path() {
                Ok(path) => Self::Path(path),
                Err(()) => Self::Path(PathBuf::from(location)),
            },
            _ => Self::Path(PathBuf::from(location)),
        }
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Settings for fetching remote documents.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    timeout: Duration,
    temp_dir: Option<PathBuf>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchOptions {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            temp_dir: None,
        }
    }

    /// Set the overall timeout for one download.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Spool downloads into `dir` instead of the system temp directory.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }
}

/// A document available on the local filesystem.
///
/// When the document was downloaded, the backing temporary file is deleted
/// when this value is dropped.
#[derive(Debug)]
pub struct LocalDocument {
    path: PathBuf,
    temp: Option<NamedTempFile>,
}

impl LocalDocument {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the document is a transient download.
    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }

    /// Open the document for reading.
    pub fn open(&self) -> Result<File> {
        Ok(File::open(&self.path)?)
    }
}

/// Make `source` available locally, downloading it if needed.
pub fn fetch(source: &DocumentSource, options: &FetchOptions) -> Result<LocalDocument> {
    match source {
        DocumentSource::Path(path) => {
            let mut file = File::open(path).map_err(|e| {
                Error::DownloadError(format!("cannot open {}: {}", path.display(), e))
            })?;
            check_magic(&mut file)?;
            Ok(LocalDocument {
                path: path.clone(),
                temp: None,
            })
        }
        DocumentSource::Url(url) => download(url, options),
    }
}

fn download(url: &str, options: &FetchOptions) -> Result<LocalDocument> {
    log::info!("Downloading {}", url);

    let client = reqwest::blocking::Client::builder()
        .timeout(options.timeout)
        .build()
        .map_err(|e| Error::DownloadError(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .map_err(|e| Error::DownloadError(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::DownloadError(format!("HTTP {} for {}", status, url)));
    }

    spool_to_temp(response, options)
}

/// Copy `body` into a new temporary file and check that it looks like a PPTX.
///
/// The temporary file is removed again if anything fails.
pub fn spool_to_temp<B: Read>(mut body: B, options: &FetchOptions) -> Result<LocalDocument> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("pptx-spellcheck-").suffix(".pptx");

    let mut temp = match &options.temp_dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };

    let bytes = io::copy(&mut body, temp.as_file_mut())
        .map_err(|e| Error::DownloadError(format!("failed to read response body: {}", e)))?;
    temp.as_file_mut().flush()?;
    log::debug!("Stored {} bytes at {}", bytes, temp.path().display());

    check_magic(temp.as_file_mut())?;

    Ok(LocalDocument {
        path: temp.path().to_path_buf(),
        temp: Some(temp),
    })
}

fn check_magic(file: &mut File) -> Result<()> {
    let mut magic = [0u8; 4];
    file.seek(SeekFrom::Start(0))?;
    let read = file.read(&mut magic)?;
    file.seek(SeekFrom::Start(0))?;

    if read < magic.len() || !has_zip_magic(&magic) {
        return Err(Error::UnsupportedFormat(
            "file is not a PPTX (ZIP) package".to_string(),
        ));
    }
    Ok(())
}

/// Fetch `source` and extract its document, removing any download afterwards.
pub fn extract_from_source(source: &DocumentSource, options: &FetchOptions) -> Result<Document> {
    let local = fetch(source, options)?;
    let mut reader = PptxReader::open(local.path())?;
    extract_document(&mut reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{sp_tree, text_box, PptxBuilder};
    use std::io::Cursor;
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    #[test]
    fn test_parse_source() {
        assert_eq!(
            DocumentSource::parse("https://example.com/a.pptx"),
            DocumentSource::Url("https://example.com/a.pptx".into())
        );
        assert_eq!(
            DocumentSource::parse("HTTP://example.com/a.pptx"),
            DocumentSource::Url("HTTP://example.com/a.pptx".into())
        );
        assert_eq!(
            DocumentSource::parse("file:///tmp/a.pptx"),
            DocumentSource::Path(PathBuf::from("/tmp/a.pptx"))
        );
        assert_eq!(
            DocumentSource::parse("file:///tmp/my%20deck.pptx"),
            DocumentSource::Path(PathBuf::from("/tmp/my deck.pptx"))
        );
        assert_eq!(
            DocumentSource::parse("file:///tmp/%EB%B0%9C%ED%91%9C.pptx"),
            DocumentSource::Path(PathBuf::from("/tmp/발표.pptx"))
        );
        assert_eq!(
            DocumentSource::parse("slides/a.pptx"),
            DocumentSource::Path(PathBuf::from("slides/a.pptx"))
        );
    }

    #[test]
    fn test_spooled_file_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let options = FetchOptions::new().with_temp_dir(dir.path());
        let bytes = PptxBuilder::new().slide("<p:spTree/>").build();

        let local = spool_to_temp(Cursor::new(bytes), &options).unwrap();
        let path = local.path().to_path_buf();
        assert!(local.is_temporary());
        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("pptx"));

        drop(local);
        assert!(!path.exists());
    }

    #[test]
    fn test_invalid_download_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let options = FetchOptions::new().with_temp_dir(dir.path());

        let result = spool_to_temp(Cursor::new(b"<html>not found</html>".to_vec()), &options);
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_local_file() {
        let source = DocumentSource::Path(PathBuf::from("/nonexistent/deck.pptx"));
        assert!(matches!(
            fetch(&source, &FetchOptions::new()),
            Err(Error::DownloadError(_))
        ));
    }

    #[test]
    fn test_fetch_percent_encoded_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("my deck.pptx");
        std::fs::write(&path, PptxBuilder::new().slide("<p:spTree/>").build()).unwrap();

        let url = Url::from_file_path(&path).unwrap();
        assert!(url.as_str().contains("my%20deck.pptx"));

        let local = fetch(&DocumentSource::parse(url.as_str()), &FetchOptions::new()).unwrap();
        assert_eq!(local.path(), path.as_path());
        assert!(!local.is_temporary());
    }

    #[test]
    fn test_download_error_status() {
        let base = serve_once("HTTP/1.1 500 Internal Server Error\r\nContent-Length: 4\r\nConnection: close\r\n\r\nboom");
        let source = DocumentSource::Url(format!("{}/deck.pptx", base));

        match fetch(&source, &FetchOptions::new()) {
            Err(Error::DownloadError(message)) => assert!(message.contains("500"), "{}", message),
            other => panic!("expected a download error, got {:?}", other),
        }
    }

    #[test]
    fn test_download_is_spooled() {
        let bytes = PptxBuilder::new().slide("<p:spTree/>").build();
        let mut response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            bytes.len()
        )
        .into_bytes();
        response.extend_from_slice(&bytes);
        let base = serve_bytes_once(response);

        let dir = tempfile::tempdir().unwrap();
        let options = FetchOptions::new().with_temp_dir(dir.path());
        let local = fetch(&DocumentSource::Url(format!("{}/deck.pptx", base)), &options).unwrap();

        assert!(local.is_temporary());
        assert!(local.path().starts_with(dir.path()));
    }

    /// Serve one canned HTTP response on a local port and return its base URL.
    fn serve_once(response: &'static str) -> String {
        serve_bytes_once(response.as_bytes().to_vec())
    }

    fn serve_bytes_once(response: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            read_request_head(&mut stream);
            stream.write_all(&response).unwrap();
        });
        format!("http://{}", addr)
    }

    fn read_request_head(stream: &mut TcpStream) {
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..n]);
        }
    }

    #[test]
    fn test_extract_from_local_path() {
        let mut file = tempfile::Builder::new().suffix(".pptx").tempfile().unwrap();
        let bytes = PptxBuilder::new()
            .slide(&sp_tree(&[text_box(2, &[&["안녕하세요", " 반갑습니다"]])]))
            .build();
        file.write_all(&bytes).unwrap();

        let source = DocumentSource::parse(file.path().to_str().unwrap());
        let local = fetch(&source, &FetchOptions::new()).unwrap();
        assert!(!local.is_temporary());

        let doc = extract_from_source(&source, &FetchOptions::new()).unwrap();
        assert_eq!(doc.stats.runs, 2);
        assert!(file.path().exists());
    }
}
