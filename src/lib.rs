pub mod color;
pub mod config;
pub mod discovery;
pub mod error;
pub mod evaluate;
pub mod executor;
pub mod gate;
pub mod inspect;
pub mod matrix;
pub mod policy;
pub mod report;
pub mod suite;

pub use config::Config;
pub use error::{SuiteError, SuiteResult};
pub use suite::{AbstractTest, Suite};
