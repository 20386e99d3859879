//! What a Gen 3 PID decides, and finding a PID that decides it right.

use pkport::errors::PortError;
use rand::Rng;

use crate::dex::{Gender, GenderRatio, NATURES};

/// Upper bound on random draws before giving up.
const MAX_ATTEMPTS: u32 = 1 << 20;

/// Number of Unown letters, A to Z then '?' and '!'.
pub const UNOWN_LETTERS: u32 = 28;

pub fn nature_of(pid: u32) -> u32 {
    pid % 25
}

/// The Unown letter (0 = A .. 27 = '!') a PID shows.
pub fn unown_letter(pid: u32) -> u32 {
    let pair = |shift: u32| (pid >> shift) & 0b11;
    ((pair(24) << 6) | (pair(16) << 4) | (pair(8) << 2) | pair(0)) % UNOWN_LETTERS
}

pub fn unown_letter_name(letter: u32) -> String {
    match letter {
        26 => "?".to_string(),
        27 => "!".to_string(),
        l => char::from_u32(u32::from('A') + l).map_or_else(String::new, String::from),
    }
}

pub fn is_shiny(pid: u32, tid: u16, sid: u16) -> bool {
    let value = u32::from(tid) ^ u32::from(sid) ^ (pid >> 16) ^ (pid & 0xFFFF);
    value < 8
}

/// The traits a pku pins down through its PID.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PidTraits {
    /// Only set for species that can be either gender.
    pub gender: Option<Gender>,
    pub nature: Option<u32>,
    pub unown: Option<u32>,
    pub shiny: Option<bool>,
}

/// The identity a PID is checked against.
#[derive(Debug, Clone, Copy)]
pub struct Owner {
    pub ratio: GenderRatio,
    pub tid: u16,
    pub sid: u16,
}

impl PidTraits {
    /// Names of the traits `pid` contradicts.
    pub fn mismatches(&self, pid: u32, owner: Owner) -> Vec<&'static str> {
        let mut wrong = Vec::new();
        if self.gender.is_some_and(|g| owner.ratio.gender_of(pid) != g) {
            wrong.push("gender");
        }
        if self.nature.is_some_and(|n| nature_of(pid) != n) {
            wrong.push("nature");
        }
        if self.unown.is_some_and(|l| unown_letter(pid) != l) {
            wrong.push("form");
        }
        if self.shiny.is_some_and(|s| is_shiny(pid, owner.tid, owner.sid) != s) {
            wrong.push("shininess");
        }
        wrong
    }

    pub fn matches(&self, pid: u32, owner: Owner) -> bool {
        self.mismatches(pid, owner).is_empty()
    }

    /// A random PID with every pinned trait.
    ///
    /// The low byte is drawn from the range that gives the wanted gender
    /// and, for shiny PIDs, the high half is derived from the low half so
    /// only nature and form are left to chance.
    pub fn generate(&self, owner: Owner, rng: &mut impl Rng) -> Result<u32, PortError> {
        let low_bytes = match (self.gender, owner.ratio) {
            (Some(Gender::Female), GenderRatio::Mixed(t)) => 0..u32::from(t),
            (Some(Gender::Male), GenderRatio::Mixed(t)) => u32::from(t)..256,
            _ => 0..256,
        };
        if low_bytes.is_empty() {
            return Err(PortError::Format(format!(
                "no PID gives a {:?} {:?} Pokémon",
                self.gender, owner.ratio
            )));
        }

        let id = u32::from(owner.tid) ^ u32::from(owner.sid);
        for _ in 0..MAX_ATTEMPTS {
            let low = (rng.random_range(0..=0xFFu32) << 8) | rng.random_range(low_bytes.clone());
            let high = match self.shiny {
                Some(true) => (id ^ low ^ rng.random_range(0..8u32)) & 0xFFFF,
                _ => rng.random_range(0..=0xFFFFu32),
            };
            let pid = (high << 16) | low;
            if self.matches(pid, owner) {
                return Ok(pid);
            }
        }

        Err(PortError::Format(format!(
            "no PID found for {self:?} after {MAX_ATTEMPTS} attempts"
        )))
    }

    /// A short description of what `pid` decides, one trait per line.
    pub fn describe(pid: u32, owner: Owner, unown: bool) -> String {
        let mut lines = vec![
            format!("PID: {pid:#010X}"),
            format!("Gender: {}", owner.ratio.gender_of(pid).name()),
            format!("Nature: {}", NATURES[nature_of(pid) as usize]),
        ];
        if unown {
            lines.push(format!("Form: {}", unown_letter_name(unown_letter(pid))));
        }
        lines.push(format!(
            "Shiny: {}",
            if is_shiny(pid, owner.tid, owner.sid) { "Yes" } else { "No" }
        ));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    const OWNER: Owner = Owner {
        ratio: GenderRatio::Mixed(31),
        tid: 12345,
        sid: 54321,
    };

    #[test]
    fn test_pid_traits() {
        assert_eq!(NATURES[nature_of(0x1234_5678) as usize], "Gentle");
        assert_eq!(unown_letter(0), 0);
        assert_eq!(unown_letter_name(26), "?");
        assert_eq!(unown_letter_name(1), "B");
        assert!(is_shiny(0, 0, 7));
        assert!(!is_shiny(0, 0, 8));
    }

    #[test]
    fn test_mismatches_name_the_wrong_traits() {
        let traits = PidTraits {
            gender: Some(Gender::Female),
            nature: Some(21),
            ..Default::default()
        };
        assert_eq!(traits.mismatches(0x1234_5678, OWNER), vec!["gender"]);
        assert!(PidTraits::default().matches(0x1234_5678, OWNER));
    }

    #[test]
    fn test_generated_pids_match() {
        let mut rng = StdRng::seed_from_u64(3);
        let cases = [
            PidTraits {
                gender: Some(Gender::Female),
                nature: Some(3),
                shiny: Some(true),
                ..Default::default()
            },
            PidTraits {
                nature: Some(24),
                shiny: Some(false),
                ..Default::default()
            },
        ];
        for traits in cases {
            let pid = traits.generate(OWNER, &mut rng).unwrap();
            assert!(traits.matches(pid, OWNER), "{traits:?} {pid:#X}");
        }

        let unown = PidTraits {
            unown: Some(27),
            ..Default::default()
        };
        let owner = Owner {
            ratio: GenderRatio::Genderless,
            ..OWNER
        };
        let pid = unown.generate(owner, &mut rng).unwrap();
        assert_eq!(unown_letter(pid), 27);
    }

    #[test]
    fn test_impossible_gender_is_an_error() {
        let traits = PidTraits {
            gender: Some(Gender::Female),
            ..Default::default()
        };
        let owner = Owner {
            ratio: GenderRatio::Mixed(0),
            ..OWNER
        };
        assert!(traits.generate(owner, &mut StdRng::seed_from_u64(0)).is_err());
    }
}
