//! Conversion options shared by every format.

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

/// Options for one conversion, usually read from a JSON config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortOptions {
    /// Apply the "Stat Nature" and "Hyper Training" meta tags before
    /// exporting.
    pub battle_stat_override: bool,
    /// Seed for anything generated at random (PIDs). Unseeded conversions
    /// draw from the OS.
    pub seed: Option<u64>,
}

impl PortOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    #[test]
    fn test_defaults_and_partial_config() {
        assert_eq!(PortOptions::from_json("{}").unwrap(), PortOptions::default());

        let options = PortOptions::from_json(r#"{ "seed": 7 }"#).unwrap();
        assert_eq!(options.seed, Some(7));
        assert!(!options.battle_stat_override);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let options = PortOptions {
            seed: Some(42),
            ..Default::default()
        };
        let a: u32 = options.rng().random();
        let b: u32 = options.rng().random();
        assert_eq!(a, b);
    }
}
