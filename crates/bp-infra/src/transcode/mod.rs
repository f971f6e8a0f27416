mod http_transcoder;
mod image_transcoder;

pub use http_transcoder::HttpTranscoder;
pub use image_transcoder::ImageTranscoder;
