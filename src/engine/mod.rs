// Dispatch core
pub mod backend_registry;
pub mod builtins;
pub mod extensions;
pub mod frame;
pub mod resolver;
pub mod runtime;
pub mod switcher;

pub use backend_registry::*;
pub use extensions::*;
pub use frame::*;
pub use resolver::{Attribute, BoundMethod, SPECIAL_METHODS};
pub use runtime::*;
