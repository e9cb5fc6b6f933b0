pub mod fetcher;
pub mod field_resolver;
pub mod job_search;
pub mod link_ranker;
pub mod listing_paginator;
pub mod retry_policy;
pub mod strategies;

pub use fetcher::*;
pub use field_resolver::*;
pub use job_search::*;
pub use link_ranker::*;
pub use listing_paginator::*;
pub use retry_policy::*;
