pub mod ebus_api_model;
pub mod route;
pub mod stop;

pub use route::*;
pub use stop::*;
