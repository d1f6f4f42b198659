pub mod profiles;
pub mod sanitizer;

pub use sanitizer::apply_profile;
