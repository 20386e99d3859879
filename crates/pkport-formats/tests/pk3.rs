//! pk3 export and import through the full pipelines.

use pkport::{alert::ChoiceAlert, errors::PortError, record::SemanticRecord};
use pkport_formats::{
    Format, PortOptions, export,
    gen3::{exporter, layout, pid},
    import,
};
use serde_json::{Value, json};

fn seeded() -> PortOptions {
    PortOptions {
        seed: Some(7),
        ..Default::default()
    }
}

fn record(value: Value) -> SemanticRecord {
    SemanticRecord::from_value(value).unwrap()
}

fn decline(_: &ChoiceAlert) -> Option<usize> {
    None
}

fn bulbasaur() -> Value {
    json!({
        "Species": "Bulbasaur",
        "Nickname": "BULBA",
        "PID": 0x1234_5678u32,
        "Nature": "Gentle",
        "Gender": "Male",
        "Level": 5,
        "Friendship": 70,
        "Ability": "Overgrow",
        "Item": "Oran Berry",
        "Markings": ["Blue Circle", "Blue Heart"],
        "Game Info": {
            "TID": 12345,
            "SID": 54321,
            "OT": "ASH",
            "Gender": "Male",
            "Language": "English",
            "Origin Game": "Ruby"
        },
        "Catch Info": {
            "Met Location": "Route 101",
            "Met Level": 5,
            "Ball": "Great Ball"
        },
        "Moves": [
            { "Name": "Tackle", "PP Ups": 3 },
            { "Name": "Growl" }
        ],
        "IVs": { "HP": 31, "Attack": 20, "Defense": 10, "Sp. Attack": 31, "Sp. Defense": 0, "Speed": 5 },
        "EVs": { "HP": 4, "Sp. Attack": 252 },
        "Ribbons": ["Cool Ribbon Hyper", "Effort Ribbon"]
    })
}

#[test]
fn bulbasaur_exports_and_imports_back() {
    let exported = export(Format::Pk3, record(bulbasaur()), &seeded(), &mut decline).unwrap();
    assert_eq!(exported.bytes.len(), layout::SIZE);

    let checksum = u16::from_le_bytes([exported.bytes[0x1C], exported.bytes[0x1D]]);
    assert_eq!(checksum, layout::checksum(&exported.bytes));
    assert_eq!(&exported.bytes[..4], &0x1234_5678u32.to_le_bytes());

    let imported = import(Format::Pk3, &exported.bytes).unwrap();
    assert!(imported.warnings.get("Checksum").is_none());

    let r = &imported.record;
    assert_eq!(r.string(&["Species"]).valid().unwrap(), "Bulbasaur");
    assert_eq!(r.string(&["Nickname"]).valid().unwrap(), "BULBA");
    assert_eq!(r.string(&["Nature"]).valid().unwrap(), "Gentle");
    assert_eq!(r.string(&["Gender"]).valid().unwrap(), "Male");
    assert_eq!(r.int(&["EXP"]).valid(), Some(135));
    assert_eq!(r.int(&["Level"]).valid(), Some(5));
    assert_eq!(r.int(&["Friendship"]).valid(), Some(70));
    assert_eq!(r.string(&["Item"]).valid().unwrap(), "Oran Berry");
    assert_eq!(r.string(&["Ability"]).valid().unwrap(), "Overgrow");
    assert_eq!(r.string(&["Game Info", "OT"]).valid().unwrap(), "ASH");
    assert_eq!(r.int(&["Game Info", "TID"]).valid(), Some(12345));
    assert_eq!(r.string(&["Game Info", "Origin Game"]).valid().unwrap(), "Ruby");
    assert_eq!(r.string(&["Catch Info", "Met Location"]).valid().unwrap(), "Route 101");
    assert_eq!(r.string(&["Catch Info", "Ball"]).valid().unwrap(), "Great Ball");
    assert_eq!(r.int(&["IVs", "Speed"]).valid(), Some(5));
    assert_eq!(r.int(&["EVs", "Sp. Attack"]).valid(), Some(252));
    assert_eq!(
        r.get(&["Moves"]).unwrap(),
        &json!([{ "Name": "Tackle", "PP Ups": 3 }, { "Name": "Growl", "PP Ups": 0 }])
    );
    assert_eq!(
        r.strings(&["Markings"]).valid().unwrap(),
        vec!["Blue Circle", "Blue Heart"]
    );
    assert_eq!(
        r.strings(&["Ribbons"]).valid().unwrap(),
        vec!["Cool Ribbon", "Cool Ribbon Super", "Cool Ribbon Hyper", "Effort Ribbon"]
    );
}

#[test]
fn pp_includes_pp_ups() {
    let exported = export(Format::Pk3, record(bulbasaur()), &seeded(), &mut decline).unwrap();
    // Tackle: 35 base, 3 PP Ups. Growl: 40 base.
    assert_eq!(exported.bytes[0x34], 56);
    assert_eq!(exported.bytes[0x35], 40);
    assert_eq!(exported.bytes[0x36], 0);
}

#[test]
fn contest_ribbons_are_backfilled() {
    let exported = export(Format::Pk3, record(bulbasaur()), &seeded(), &mut decline).unwrap();
    let ribbons = exported.warnings.get("Ribbons").unwrap();
    assert!(ribbons.message().contains("adding those ribbons"));
}

#[test]
fn contradicting_pid_asks_before_committing() {
    let mut value = bulbasaur();
    value["Nature"] = json!("Adamant");
    let mut pending = exporter::start(record(value), &seeded()).unwrap();

    let errors = pending.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].title(), "PID");
    assert_eq!(errors[0].choices[0].name, "Keep PID");
    assert!(errors[0].alert.message().contains("nature"));

    pending.resolve(0, 1).unwrap();
    let regenerated = u32::try_from(pending.data().get("PID").unwrap()).unwrap();
    assert_eq!(pid::nature_of(regenerated), 3);

    let finished = pending.finish(&mut decline).unwrap();
    assert_eq!(u32::try_from(finished.data.get("PID").unwrap()).unwrap(), regenerated);
}

#[test]
fn keeping_a_contradicting_pid() {
    let mut value = bulbasaur();
    value["Nature"] = json!("Adamant");
    let mut keep = |_: &ChoiceAlert| Some(0);
    let exported = export(Format::Pk3, record(value), &seeded(), &mut keep).unwrap();
    assert_eq!(&exported.bytes[..4], &0x1234_5678u32.to_le_bytes());
}

#[test]
fn declining_a_choice_is_unresolved() {
    let mut value = bulbasaur();
    value["EXP"] = json!(1000);
    let err = export(Format::Pk3, record(value), &seeded(), &mut decline).unwrap_err();
    assert!(matches!(err, PortError::Unresolved(tag) if tag == "EXP"));
}

#[test]
fn missing_pid_is_generated_to_fit() {
    let value = json!({
        "Species": "Unown",
        "Forms": ["B"],
        "Nature": "Bold",
        "Shiny": true,
        "Game Info": { "TID": 1, "SID": 2 }
    });
    let exported = export(Format::Pk3, record(value), &seeded(), &mut decline).unwrap();
    let generated = u32::from_le_bytes(exported.bytes[..4].try_into().unwrap());

    assert_eq!(pid::unown_letter(generated), 1);
    assert_eq!(pid::nature_of(generated), 5);
    assert!(pid::is_shiny(generated, 1, 2));
    assert_eq!(
        exported.warnings.get("PID").unwrap().message(),
        "No PID was specified, generating one that fits the other tags."
    );
}

#[test]
fn same_seed_same_pid() {
    let value = json!({ "Species": "Pikachu", "Nature": "Timid" });
    let a = export(Format::Pk3, record(value.clone()), &seeded(), &mut decline).unwrap();
    let b = export(Format::Pk3, record(value), &seeded(), &mut decline).unwrap();
    assert_eq!(a.bytes, b.bytes);
}

#[test]
fn ability_outside_the_species_falls_back() {
    let mut value = bulbasaur();
    value["Ability"] = json!("Blaze");
    let exported = export(Format::Pk3, record(value), &seeded(), &mut decline).unwrap();
    assert_eq!(
        exported.warnings.get("Ability").unwrap().message(),
        "This species cannot have the ability \"Blaze\", using the default: Overgrow."
    );
    assert_eq!(exported.bytes[0x4B] >> 7, 0);
}

#[test]
fn unknown_ability_falls_back_to_the_default() {
    let mut value = bulbasaur();
    value["Ability"] = json!("Not An Ability");
    let exported = export(Format::Pk3, record(value), &seeded(), &mut decline).unwrap();
    assert_eq!(
        exported.warnings.get("Ability").unwrap().message(),
        "The ability \"Not An Ability\" is not supported by this format, using the default: Overgrow."
    );
    assert_eq!(exported.bytes[0x4B] >> 7, 0);

    let imported = import(Format::Pk3, &exported.bytes).unwrap();
    assert_eq!(imported.record.string(&["Ability"]).valid().unwrap(), "Overgrow");
}

#[test]
fn mew_is_offered_a_fateful_encounter() {
    let value = json!({ "Species": "Mew", "PID": 0, "Level": 30 });
    let mut pending = exporter::start(record(value), &seeded()).unwrap();
    assert_eq!(pending.errors()[0].title(), "Fateful Encounter");

    pending.resolve(0, 1).unwrap();
    let finished = pending.finish(&mut decline).unwrap();
    assert!(finished.data.get_bool("Fateful Encounter").unwrap());
}

#[test]
fn byte_override_wins_over_checksum() {
    let mut value = bulbasaur();
    value["Byte Override"] = json!({ "pk3": [ { "byte": 0x1C, "width": 16, "value": 0xBEEF } ] });
    let exported = export(Format::Pk3, record(value), &seeded(), &mut decline).unwrap();
    assert_eq!(&exported.bytes[0x1C..0x1E], &0xBEEFu16.to_le_bytes());

    let imported = import(Format::Pk3, &exported.bytes).unwrap();
    assert!(imported.warnings.get("Checksum").is_some());
}

#[test]
fn format_override_applies_to_pk3_only() {
    let mut value = bulbasaur();
    value["Format Overrides"] = json!({ "pk3": { "Nickname": "SEED" }, "Showdown": { "Nickname": "Other" } });
    let exported = export(Format::Pk3, record(value), &seeded(), &mut decline).unwrap();
    let imported = import(Format::Pk3, &exported.bytes).unwrap();
    assert_eq!(imported.record.string(&["Nickname"]).valid().unwrap(), "SEED");
}

#[test]
fn gen3_eggs_use_the_egg_name() {
    let value = json!({
        "Species": "Pikachu",
        "Nickname": "Egg",
        "PID": 0x100,
        "Egg Info": { "Is Egg": true },
        "Game Info": { "Language": "English", "Origin Game": "Emerald" }
    });
    let exported = export(Format::Pk3, record(value), &seeded(), &mut decline).unwrap();
    assert_eq!(exported.bytes[0x12], 1);
    assert_eq!(exported.bytes[0x13] & 0b100, 0b100);

    let imported = import(Format::Pk3, &exported.bytes).unwrap();
    assert_eq!(imported.record.boolean(&["Egg Info", "Is Egg"]).valid(), Some(true));
    assert_eq!(imported.record.string(&["Nickname"]).valid().unwrap(), "タマゴ");
}

#[test]
fn unportable_records_are_rejected() {
    let later = record(json!({ "Species": "Turtwig" }));
    assert!(matches!(exporter::can_port(&later), Err(PortError::CannotPort(_))));

    let shadow = record(json!({ "Species": "Pikachu", "Shadow Info": { "Shadow": true } }));
    assert!(matches!(
        exporter::can_port(&shadow),
        Err(PortError::CannotPort(m)) if m == "Cannot be a Shadow Pokémon."
    ));
}

#[test]
fn party_sized_files_import() {
    let exported = export(Format::Pk3, record(bulbasaur()), &seeded(), &mut decline).unwrap();
    let mut party = exported.bytes.clone();
    party.resize(layout::PARTY_SIZE, 0);
    assert!(import(Format::Pk3, &party).is_ok());
    assert!(import(Format::Pk3, &exported.bytes[..79]).is_err());
}
