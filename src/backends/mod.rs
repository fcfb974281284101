// Backend implementations
pub mod backend_trait;
pub mod column_store;
pub mod kernels;
pub mod row_store;

pub use backend_trait::*;
pub use column_store::*;
pub use row_store::*;
