pub mod cache;
pub mod colormap;
pub mod config;
pub mod export;
pub mod model;
pub mod pivot;
pub mod search;
pub mod treemap;
pub mod view;

pub use cache::*;
pub use config::*;
pub use model::*;
pub use pivot::*;
pub use treemap::*;
pub use view::*;
