mod thumbnail_registry;

pub use thumbnail_registry::ThumbnailPreviewRegistry;
