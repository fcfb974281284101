pub mod engine;
pub mod backends;
pub mod cli;
pub mod utils;

pub use engine::*;
pub use backends::*;
pub use cli::*;
pub use utils::*;
