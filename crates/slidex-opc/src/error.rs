//! Error types for OPC package operations

use thiserror::Error;

/// Errors that can occur while reading or writing a package
#[derive(Error, Debug)]
pub enum OpcError {
    /// Error reading or writing the ZIP archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing XML content
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A part referenced by name does not exist in the package
    #[error("Part not found: {0}")]
    MissingPart(String),

    /// Invalid package or XML structure
    #[error("Invalid package structure: {0}")]
    InvalidStructure(String),
}

/// Result type for OPC operations
pub type Result<T> = std::result::Result<T, OpcError>;
