use wasm_bindgen::JsValue;

/// Everything that can go wrong while turning bytes into a [`crate::Document`].
///
/// Encoding never fails, so every variant belongs to the decode side.
#[derive(Debug, thiserror::Error)]
pub enum GpxError {
    /// A required attribute or element is absent, or its text is not a valid
    /// value for the field. The payload names the field (`"latitude"`,
    /// `"name"`, ...), `"Document"` when no `<gpx>` element exists and `"xml"`
    /// when the input is not UTF-8.
    #[error("Missing required element '{0}'")]
    MissingRequiredElement(String),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GpxError {
    pub(crate) fn missing(field: &str) -> Self {
        Self::MissingRequiredElement(field.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GpxError>;

impl From<GpxError> for JsValue {
    fn from(e: GpxError) -> Self {
        js_sys::Error::new(&e.to_string()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_element_message_names_field() {
        let err = GpxError::missing("latitude");
        assert_eq!(err.to_string(), "Missing required element 'latitude'");
        assert!(matches!(err, GpxError::MissingRequiredElement(ref f) if f == "latitude"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: GpxError = io.into();
        assert!(matches!(err, GpxError::Io(_)));
        assert!(err.to_string().starts_with("IO error"));
    }
}
