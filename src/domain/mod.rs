pub mod errors;
pub mod flows;
pub mod models;
pub mod wizard;

pub use errors::*;
pub use flows::*;
pub use models::*;
pub use wizard::*;
