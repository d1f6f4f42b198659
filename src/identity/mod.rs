pub mod ids;
pub mod store;

pub use ids::{generate_device_id, generate_machine_id_hash, is_valid_uuid};
pub use store::{read_telemetry, strip_chat_keys, write_telemetry};
