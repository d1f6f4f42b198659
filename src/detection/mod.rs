pub mod status;

pub use status::inspect;
