use indexmap::IndexMap;
use tracing::debug;
use uuid::Uuid;

use crate::media::UploadedImage;

/// Host-side thumbnail reference for an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewHandle(String);

impl PreviewHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewEntry {
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: usize,
}

/// Tracks live preview handles so that replacing uploads never leaks them.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    live: IndexMap<PreviewHandle, PreviewEntry>,
    released: u64,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, image: &UploadedImage) -> PreviewHandle {
        let handle = PreviewHandle(format!("preview-{}", Uuid::new_v4()));
        self.live.insert(
            handle.clone(),
            PreviewEntry {
                filename: image.origin_filename().to_string(),
                mime_type: image.mime_type().to_string(),
                size_bytes: image.bytes().len(),
            },
        );
        handle
    }

    pub fn revoke_all(&mut self) -> usize {
        let count = self.live.len();
        self.live.clear();
        self.released += count as u64;
        if count > 0 {
            debug!(count, "released preview handles");
        }
        count
    }

    pub fn get(&self, handle: &PreviewHandle) -> Option<&PreviewEntry> {
        self.live.get(handle)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn released_count(&self) -> u64 {
        self.released
    }
}

#[cfg(test)]
mod tests {
    use super::PreviewRegistry;
    use crate::media::UploadedImage;

    #[test]
    fn revoke_all_releases_every_live_handle() {
        let mut registry = PreviewRegistry::new();
        let a = registry.create(&UploadedImage::new(b"a".to_vec(), "image/png", "a.png"));
        let b = registry.create(&UploadedImage::new(b"bb".to_vec(), "image/jpeg", "b.jpg"));
        assert_ne!(a, b);
        assert_eq!(registry.get(&b).map(|entry| entry.size_bytes), Some(2));

        assert_eq!(registry.revoke_all(), 2);
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.released_count(), 2);
        assert!(registry.get(&a).is_none());
    }
}
