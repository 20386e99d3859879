//! Properties of the Gen 3 tables and PID generation.

use pkport_formats::{
    dex::{Gender, GenderRatio, GrowthRate, MAX_LEVEL},
    gen3::{charset::Gen3Charset, pid::{self, Owner, PidTraits}},
};
use pkport::tag::TextCodec;
use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

fn growth() -> impl Strategy<Value = GrowthRate> {
    prop::sample::select(vec![
        GrowthRate::Erratic,
        GrowthRate::Fast,
        GrowthRate::MediumFast,
        GrowthRate::MediumSlow,
        GrowthRate::Slow,
        GrowthRate::Fluctuating,
    ])
}

proptest! {
    #[test]
    fn level_of_a_levels_exp_is_that_level(rate in growth(), level in 1..=MAX_LEVEL) {
        prop_assert_eq!(rate.level_at(rate.exp_at(level)), level);
    }

    #[test]
    fn exp_never_decreases_with_level(rate in growth(), level in 1..MAX_LEVEL) {
        prop_assert!(rate.exp_at(level) <= rate.exp_at(level + 1));
    }

    #[test]
    fn generated_pids_have_the_asked_traits(
        seed in any::<u64>(),
        nature in 0u32..25,
        female in any::<bool>(),
        shiny in any::<bool>(),
        tid in any::<u16>(),
        sid in any::<u16>(),
    ) {
        let traits = PidTraits {
            gender: Some(if female { Gender::Female } else { Gender::Male }),
            nature: Some(nature),
            unown: None,
            shiny: Some(shiny),
        };
        let owner = Owner { ratio: GenderRatio::Mixed(127), tid, sid };
        let generated = traits.generate(owner, &mut StdRng::seed_from_u64(seed)).unwrap();

        prop_assert_eq!(pid::nature_of(generated), nature);
        prop_assert_eq!(pid::is_shiny(generated, tid, sid), shiny);
        prop_assert!(traits.matches(generated, owner));
    }

    #[test]
    fn encodable_text_decodes_unchanged(text in "[A-Za-z0-9]{0,10}") {
        let charset = Gen3Charset;
        let bytes: Vec<u8> = text.chars().filter_map(|c| charset.encode(c)).collect();
        prop_assert_eq!(charset.decode_str(&bytes), text);
    }
}
