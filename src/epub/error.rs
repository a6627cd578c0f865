//! Error types for EPUB parsing.

use thiserror::Error;

/// Errors that can occur while reading an EPUB container.
#[derive(Debug, Error)]
pub enum EpubError {
    /// The bytes are not a readable zip archive.
    #[error("invalid EPUB container: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// A file referenced by the container or package is missing.
    #[error("missing {path} in EPUB container")]
    MissingResource {
        /// Container path that was not found.
        path: String,
    },

    /// `container.xml` does not name a package document.
    #[error("container.xml does not name a package document")]
    MissingRootfile,

    /// An XML document could not be parsed.
    #[error("malformed XML in {path}: {source}")]
    Xml {
        /// Container path of the document.
        path: String,
        /// The underlying parser error.
        #[source]
        source: roxmltree::Error,
    },

    /// A text document is not valid UTF-8.
    #[error("{path} is not valid UTF-8")]
    Encoding {
        /// Container path of the document.
        path: String,
    },

    /// A content document could not be rendered to text.
    #[error("failed to render {path} as text: {source}")]
    Markup {
        /// Container path of the document.
        path: String,
        /// The underlying renderer error.
        #[source]
        source: html2text::Error,
    },

    /// Reading a file out of the archive failed.
    #[error("IO error reading {path}: {source}")]
    Io {
        /// Container path of the document.
        path: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl EpubError {
    /// Creates a missing-resource error.
    pub fn missing(path: impl Into<String>) -> Self {
        Self::MissingResource { path: path.into() }
    }

    /// Creates an XML error.
    pub fn xml(path: impl Into<String>, source: roxmltree::Error) -> Self {
        Self::Xml {
            path: path.into(),
            source,
        }
    }

    /// Creates a markup rendering error.
    pub fn markup(path: impl Into<String>, source: html2text::Error) -> Self {
        Self::Markup {
            path: path.into(),
            source,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
