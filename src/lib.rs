pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod model;
pub mod scrape;
pub mod utils;

pub use extractor::{ExtractError, SourceFormat, extract};
pub use model::{ArrivalStatus, Direction, RouteExtractionResult, StopRecord};
