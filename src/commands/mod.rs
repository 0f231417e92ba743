//! CLI commands implementation

pub mod alerts;
pub mod detect;
pub mod history;
pub mod init;
pub mod run;
pub mod status;
pub mod summarize;

pub use alerts::*;
pub use detect::*;
pub use history::*;
pub use init::*;
pub use run::*;
pub use status::*;
pub use summarize::*;
