use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use uuid::{Builder, Uuid};

pub trait IdGenerator: Send + Sync {
    fn new_id(&self) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

// Fallback for hosts without a cryptographic source. Output keeps the v4 shape.
#[derive(Debug)]
pub struct SeededIdGenerator {
    rng: Mutex<StdRng>,
}

impl SeededIdGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_os_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }
}

impl IdGenerator for SeededIdGenerator {
    fn new_id(&self) -> String {
        let mut bytes = [0u8; 16];
        match self.rng.lock() {
            Ok(mut rng) => rng.fill(&mut bytes),
            Err(poisoned) => poisoned.into_inner().fill(&mut bytes),
        }
        Builder::from_random_bytes(bytes).into_uuid().to_string()
    }
}
