//! Command implementations.

pub mod config;
pub mod extract;
pub mod prompts;
pub mod run;
pub mod scan;

pub use self::config::execute_config;
pub use self::extract::execute_extract;
pub use self::prompts::execute_prompts;
pub use self::run::execute_run;
pub use self::scan::execute_scan;
