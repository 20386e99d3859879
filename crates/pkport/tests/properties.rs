//! Properties that must hold for every input:
//! - alert merge is associative and `None` is its identity
//! - clamping a value already in range changes nothing and raises nothing
//! - a multi-value tag never yields more than one alert
//! - whatever the store accepts, it reads back unchanged

use pkport::{
    alert::{Alert, combine},
    bits::{BitOrder, value_range},
    record::SourceValue,
    store::BitStore,
    tag::{self, ArraySlot, Unspecified, ValueSlot},
};
use proptest::prelude::*;

fn alert() -> impl Strategy<Value = Option<Alert>> {
    proptest::option::of(
        (prop::sample::select(vec!["IVs", "EVs", "Nature", "PID"]), "[a-z ]{0,8}")
            .prop_map(|(title, message)| Alert::new(title, message)),
    )
}

fn source() -> impl Strategy<Value = SourceValue<i128>> {
    prop_oneof![
        Just(SourceValue::<i128>::Unspecified),
        "[a-z]{1,4}".prop_map(SourceValue::<i128>::Invalid),
        (-1000i128..1000).prop_map(SourceValue::Valid),
    ]
}

proptest! {
    #[test]
    fn merge_is_associative(a in alert(), b in alert(), c in alert()) {
        let left = combine(combine(a.clone(), b.clone()), c.clone());
        let right = combine(a, combine(b, c));
        prop_assert_eq!(left, right);
    }

    #[test]
    fn none_is_merge_identity(a in alert()) {
        prop_assert_eq!(combine(a.clone(), None), a.clone());
        prop_assert_eq!(combine(None, a.clone()), a);
    }

    #[test]
    fn clamp_in_range_is_identity(min in -500i128..0, span in 0i128..500, offset in 0i128..500) {
        let max = min + span;
        let value = min + offset.min(span);
        prop_assert_eq!(tag::clamp(value, min, max), (value, None));

        let mut out = 0;
        let mut slot = ValueSlot::new(&mut out, min, max);
        let alert = tag::numeric("Level", SourceValue::Valid(value), &mut slot, min, Unspecified::Alert);
        prop_assert_eq!(alert.unwrap(), None);
        prop_assert_eq!(out, value);
    }

    #[test]
    fn clamp_is_idempotent(value in -2000i128..2000, min in -500i128..0, span in 0i128..500) {
        let max = min + span;
        let (once, _) = tag::clamp(value, min, max);
        prop_assert_eq!(tag::clamp(once, min, max), (once, None));
    }

    #[test]
    fn multi_numeric_alerts_at_most_once(sources in proptest::collection::vec(source(), 6)) {
        let names = ["HP", "Attack", "Defense", "Sp. Attack", "Sp. Defense", "Speed"];
        let mut values = [0i128; 6];
        let mut slot = ArraySlot::new(&mut values, 0, 31);
        let alert = tag::multi_numeric("IVs", &names, sources, &mut slot, 0, Unspecified::Alert).unwrap();

        if let Some(alert) = alert {
            prop_assert_eq!(alert.title(), "IVs");
        }
        prop_assert!(values.iter().all(|v| (0..=31).contains(v)));
    }

    #[test]
    fn store_reads_back_what_it_accepts(
        byte in 0usize..8,
        bit in 0usize..8,
        width in 1usize..=64,
        raw in any::<u64>(),
        lsb in any::<bool>(),
    ) {
        let order = if lsb { BitOrder::LsbFirst } else { BitOrder::MsbFirst };
        let mut store = BitStore::new(17, order);
        let (_, max) = value_range(width, false);
        let value = i128::from(raw) & max;

        store.set(byte, bit, width, value).unwrap();
        prop_assert_eq!(store.get(byte, bit, width).unwrap(), value as u128);
    }
}
