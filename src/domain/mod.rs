pub mod document;
pub mod job_record;
pub mod normalizer;
pub mod phone;
pub mod url_classifier;

pub use document::*;
pub use job_record::*;
pub use url_classifier::*;
