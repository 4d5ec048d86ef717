use std::io::{Read, Write};
use std::path::Path;

/// Infer the format of a file from its extension (lowercase, without the leading dot)
pub fn format_from_path(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
}

fn unknown_format_error() -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        "Could not infer format from path",
    )
}

/// Trait for importing types from a file path or reader
pub trait Importable: Sized {
    /// The error type returned by import operations
    type Error: std::error::Error + Send + Sync + 'static + From<std::io::Error>;

    /// Import from a reader, specifying the format (e.g., `xml` or `json`).
    fn import_from_reader<R: Read>(reader: R, format: &str) -> Result<Self, Self::Error>;

    /// Import from a file path, inferring the format from the file extension.
    fn import_from_path<P: AsRef<Path>>(path: P) -> Result<Self, Self::Error> {
        let path = path.as_ref();
        let format = format_from_path(path).ok_or_else(unknown_format_error)?;
        let file = std::fs::File::open(path)?;
        Self::import_from_reader(std::io::BufReader::new(file), &format)
    }

    /// Import from a byte slice, specifying the format.
    fn import_from_bytes(bytes: &[u8], format: &str) -> Result<Self, Self::Error> {
        Self::import_from_reader(std::io::Cursor::new(bytes), format)
    }
}

/// Trait for exporting types to a file path or writer
pub trait Exportable {
    /// The error type returned by export operations
    type Error: std::error::Error + Send + Sync + 'static + From<std::io::Error>;

    /// Export to a writer, specifying the format.
    fn export_to_writer<W: Write>(&self, writer: W, format: &str) -> Result<(), Self::Error>;

    /// Export to a file path, inferring the format from the file extension.
    fn export_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), Self::Error> {
        let path = path.as_ref();
        let format = format_from_path(path).ok_or_else(unknown_format_error)?;
        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        self.export_to_writer(&mut writer, &format)?;
        writer.flush()?;
        Ok(())
    }

    /// Export to a byte array ([`Vec<u8>`]), specifying the format.
    fn export_to_bytes(&self, format: &str) -> Result<Vec<u8>, Self::Error> {
        let mut bytes = Vec::new();
        self.export_to_writer(&mut bytes, format)?;
        Ok(bytes)
    }
}
