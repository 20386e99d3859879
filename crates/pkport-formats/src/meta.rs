//! Meta tags: tags that rewrite other tags before a format sees them.

use pkport::{alert::Alert, record::SemanticRecord};

use crate::dex;

pub const BATTLE_STAT_OVERRIDE: &str = "Battle Stat Override";

/// Stat names as pku documents spell them.
const STATS: [&str; 6] = ["HP", "Attack", "Defense", "Sp. Attack", "Sp. Defense", "Speed"];

/// Applies "Stat Nature" over "Nature" and maxes every hyper trained IV.
/// Returns a note describing what changed.
pub fn apply_battle_stat_override(record: &mut SemanticRecord) -> Option<Alert> {
    let mut alert: Option<Alert> = None;
    let mut note = |text: String| {
        alert = Some(match alert.take() {
            Some(a) => a.with_paragraph(text),
            None => Alert::new(BATTLE_STAT_OVERRIDE, text),
        });
    };

    if let Some(stat_nature) = record.string(&["Stat Nature"]).valid() {
        match dex::nature_index(&stat_nature) {
            Some(i) => {
                let nature = dex::NATURES[i as usize];
                record.set(&["Nature"], nature);
                note(format!("The Stat Nature ({nature}) replaced the Nature."));
            }
            None => note(format!(
                "The Stat Nature \"{stat_nature}\" is not a nature, ignoring it."
            )),
        }
    }

    let trained: Vec<&str> = STATS
        .into_iter()
        .filter(|stat| record.boolean(&["Hyper Training", *stat]).valid() == Some(true))
        .collect();
    if !trained.is_empty() {
        for stat in &trained {
            record.set(&["IVs", *stat], 31);
        }
        note(format!(
            "The {} IV(s) were hyper trained and set to 31.",
            trained.join(", ")
        ));
    }

    alert
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_overrides_nature_and_ivs() {
        let mut record = SemanticRecord::from_value(json!({
            "Nature": "Hardy",
            "Stat Nature": "adamant",
            "IVs": { "Attack": 3, "Speed": 10 },
            "Hyper Training": { "Attack": true, "Speed": false }
        }))
        .unwrap();

        let alert = apply_battle_stat_override(&mut record).unwrap();

        assert_eq!(record.string(&["Nature"]).valid().as_deref(), Some("Adamant"));
        assert_eq!(record.int(&["IVs", "Attack"]).valid(), Some(31));
        assert_eq!(record.int(&["IVs", "Speed"]).valid(), Some(10));
        assert_eq!(alert.title(), BATTLE_STAT_OVERRIDE);
        assert!(alert.message().contains("Attack IV(s)"));
    }

    #[test]
    fn test_nothing_to_apply() {
        let mut record = SemanticRecord::from_value(json!({ "Nature": "Hardy" })).unwrap();
        assert!(apply_battle_stat_override(&mut record).is_none());
        assert_eq!(record.string(&["Nature"]).valid().as_deref(), Some("Hardy"));
    }
}
