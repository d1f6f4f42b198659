pub mod paths;
pub mod process;

pub use paths::{resolve_data_dir, TargetPaths};
pub use process::{ProcessProbe, SystemProcessProbe};
