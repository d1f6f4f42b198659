use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Fresh v4 UUID in canonical hyphenated form.
pub fn generate_device_id() -> String {
    Uuid::new_v4().to_string()
}

/// SHA-256 of a fresh v4 UUID's canonical text, as 64 lowercase hex chars.
pub fn generate_machine_id_hash() -> String {
    hash_identifier(&Uuid::new_v4().to_string())
}

pub fn hash_identifier(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn is_valid_uuid(value: &str) -> bool {
    Uuid::parse_str(value.trim()).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_id_is_canonical_v4() {
        let id = generate_device_id();
        assert_eq!(id.len(), 36);
        let parsed = Uuid::parse_str(&id).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(parsed.to_string(), id);
    }

    #[test]
    fn machine_id_hash_is_64_lower_hex() {
        let hash = generate_machine_id_hash();
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn fresh_values_differ() {
        assert_ne!(generate_device_id(), generate_device_id());
        assert_ne!(generate_machine_id_hash(), generate_machine_id_hash());
    }

    #[test]
    fn hash_matches_known_digest() {
        assert_eq!(
            hash_identifier("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
