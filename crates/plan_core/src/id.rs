use rand::Rng;
use uuid::Uuid;

use crate::InstanceId;

/// Generate a v4-format UUID from the caller's RNG. Seeded RNGs give
/// reproducible instance ids.
pub fn generate_uuid(rng: &mut impl Rng) -> Uuid {
    let bytes: [u8; 16] = rng.gen();
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

pub fn generate_instance_id(rng: &mut impl Rng) -> InstanceId {
    InstanceId(generate_uuid(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn same_seed_gives_same_instance_id() {
        let mut rng1 = ChaCha8Rng::seed_from_u64(7);
        let mut rng2 = ChaCha8Rng::seed_from_u64(7);
        let id1 = generate_instance_id(&mut rng1);
        let id2 = generate_instance_id(&mut rng2);
        assert_eq!(id1, id2);
        assert_eq!(id1.0.get_version(), Some(uuid::Version::Random));
    }

    #[test]
    fn consecutive_ids_differ() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let first = generate_instance_id(&mut rng);
        let second = generate_instance_id(&mut rng);
        assert_ne!(first, second);
    }

    #[test]
    fn display_is_prefixed_and_hyphenless() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let shown = generate_instance_id(&mut rng).to_string();
        assert!(shown.starts_with("inst_"));
        assert!(!shown.contains('-'));
    }
}
