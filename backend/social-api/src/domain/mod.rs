pub mod filters;
pub mod models;
pub mod pagination;
pub mod requests;

pub use filters::{PostFilter, PostListQuery, PostOrdering};
pub use models::*;
pub use pagination::{Page, PageQuery, PageRequest, DEFAULT_PAGE_SIZE};
