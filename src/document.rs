//! Whole-file entry points for [`Document`].
//!
//! Text and path input both end up in [`Document::from_bytes`], so every entry
//! point validates the same way.

use std::path::Path;
use std::str::FromStr;

use crate::codec::GpxElement;
use crate::error::{GpxError, Result};
use crate::gpx_types::Document;
use crate::options::WriteOptions;
use crate::xml::{XmlDocument, XmlNode};

const GPX_VERSION: &str = "1.1";
const GPX_NAMESPACE: &str = "http://www.topografix.com/GPX/1/1";

impl Document {
    /// Decode a GPX file held in memory. The bytes must be UTF-8.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes).map_err(|_| GpxError::missing("xml"))?;
        let xml = XmlDocument::parse(text)?;
        let root = xml
            .first_descendant(Document::TAG)
            .ok_or_else(|| GpxError::missing("Document"))?;
        Document::decode(root)
    }

    /// Read and decode a GPX file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Reading GPX file {}", path.display());
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// The full file text with default [`WriteOptions`].
    pub fn to_text(&self) -> String {
        self.to_text_with(&WriteOptions::default())
    }

    pub fn to_text_with(&self, options: &WriteOptions) -> String {
        XmlDocument::with_root(self.root_element(options)).to_xml_string(options)
    }

    /// UTF-8 bytes of [`Document::to_text`], ready to be written to a `.gpx` file.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_text().into_bytes()
    }

    fn root_element(&self, options: &WriteOptions) -> XmlNode {
        let mut root = self.encode();
        if options.schema_attributes {
            root.set_attribute("version", GPX_VERSION);
            root.set_attribute("xmlns", GPX_NAMESPACE);
        }
        root
    }
}

impl FromStr for Document {
    type Err = GpxError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_bytes(s.as_bytes())
    }
}
