mod candidate_loader;

pub use candidate_loader::{load_candidate, load_candidates, mime_from_extension};
