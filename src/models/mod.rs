pub mod cleanup;
pub mod events;
pub mod settings;
pub mod status;

pub use cleanup::*;
pub use events::*;
pub use settings::*;
pub use status::*;
