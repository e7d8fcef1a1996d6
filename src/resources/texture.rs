use uuid::Uuid;

/// Texture descriptor. Pixel data lives on the native side; the catalog only
/// keeps what scripts need to reference and inspect it.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub uuid: Uuid,
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Where the native loader fetched the image from, if anywhere.
    pub uri: Option<String>,
}

impl Texture {
    #[must_use]
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            width,
            height,
            uri: None,
        }
    }

    #[must_use]
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    #[must_use]
    pub fn aspect(&self) -> Option<f32> {
        (self.height != 0).then(|| self.width as f32 / self.height as f32)
    }
}
