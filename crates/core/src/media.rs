//! Uploaded media: per-kind upload rules and the storage collaborator.
//!
//! The database only ever holds storage keys. Turning a key into a public URL
//! (and writing the bytes in the first place) is the job of a [`MediaStore`],
//! so nothing outside the store builds storage paths.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::validation::FieldErrors;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const MIB: u64 = 1024 * 1024;

/// Largest accepted panorama image (inclusive).
pub const MAX_PANORAMA_BYTES: u64 = 10 * MIB;

/// Largest accepted voiceover track (inclusive).
pub const MAX_VOICEOVER_BYTES: u64 = 20 * MIB;

/// Largest accepted map image or tour thumbnail (inclusive).
pub const MAX_IMAGE_BYTES: u64 = 10 * MIB;

/// Content types accepted for voiceover audio.
pub const VOICEOVER_CONTENT_TYPES: &[&str] = &["audio/mpeg", "audio/mp3", "audio/wav"];

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// Every media slot in the data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Thumbnail,
    Panorama,
    Voiceover,
    MapImage,
}

impl MediaKind {
    /// Resolve a multipart field name to the slot it fills.
    pub fn from_field(name: &str) -> Option<Self> {
        match name {
            "thumbnail" => Some(Self::Thumbnail),
            "panorama_image" => Some(Self::Panorama),
            "voiceover_audio" => Some(Self::Voiceover),
            "map_image" => Some(Self::MapImage),
            _ => None,
        }
    }

    /// API field name of this slot.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Thumbnail => "thumbnail",
            Self::Panorama => "panorama_image",
            Self::Voiceover => "voiceover_audio",
            Self::MapImage => "map_image",
        }
    }

    /// Storage folder, relative to the store root, always ending in `/`.
    pub fn folder(self) -> &'static str {
        match self {
            Self::Thumbnail => "tours/thumbnails/",
            Self::Panorama => "scenes/panoramas/",
            Self::Voiceover => "scenes/audio/",
            Self::MapImage => "scenes/maps/",
        }
    }

    pub fn max_bytes(self) -> u64 {
        match self {
            Self::Panorama => MAX_PANORAMA_BYTES,
            Self::Voiceover => MAX_VOICEOVER_BYTES,
            Self::Thumbnail | Self::MapImage => MAX_IMAGE_BYTES,
        }
    }

    /// Content types are compared case-insensitively, ignoring parameters
    /// such as `; charset=...`.
    pub fn accepts_content_type(self, content_type: &str) -> bool {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match self {
            Self::Voiceover => VOICEOVER_CONTENT_TYPES.contains(&essence.as_str()),
            Self::Thumbnail | Self::Panorama | Self::MapImage => essence.starts_with("image/"),
        }
    }

    fn size_message(self) -> &'static str {
        match self {
            Self::Panorama => "Panorama image file size cannot exceed 10MB.",
            Self::Voiceover => "Audio file size cannot exceed 20MB.",
            Self::MapImage => "Map image file size cannot exceed 10MB.",
            Self::Thumbnail => "Thumbnail file size cannot exceed 10MB.",
        }
    }

    fn type_message(self) -> &'static str {
        match self {
            Self::Panorama => "Only image files are allowed for panorama.",
            Self::Voiceover => "Only MP3 and WAV audio files are allowed.",
            Self::MapImage => "Only image files are allowed for the map.",
            Self::Thumbnail => "Only image files are allowed for the thumbnail.",
        }
    }
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

/// A file received from a client, not yet stored.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl MediaUpload {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Record every rule `upload` breaks for `kind` under the slot's field name.
pub fn check_upload(kind: MediaKind, upload: &MediaUpload, errors: &mut FieldErrors) {
    if upload.size() > kind.max_bytes() {
        errors.add(kind.field_name(), kind.size_message());
    }
    if !kind.accepts_content_type(&upload.content_type) {
        errors.add(kind.field_name(), kind.type_message());
    }
}

// ---------------------------------------------------------------------------
// Storage collaborator
// ---------------------------------------------------------------------------

/// File storage and URL resolution for uploaded media.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persist `upload` into the slot's folder and return its storage key.
    async fn put(&self, kind: MediaKind, upload: &MediaUpload) -> Result<String, CoreError>;

    /// Remove a stored file. Removing a key that no longer exists is not an error.
    async fn delete(&self, key: &str) -> Result<(), CoreError>;

    /// Fully-resolved public URL for a storage key.
    fn url(&self, key: &str) -> String;
}

/// Resolve an optional storage key; empty keys count as absent.
pub fn resolve_url(store: &dyn MediaStore, key: Option<&str>) -> Option<String> {
    key.filter(|k| !k.is_empty()).map(|k| store.url(k))
}
