//! pk3 → pku.

use pkport::{
    alert::{Alert, ChoiceAlert},
    errors::PortError,
    pipeline::{Finished, Pipeline, Session},
    record::SemanticRecord,
    scheduler::{Operation, Phase},
    tag::TextCodec,
    target::BinaryTarget,
};
use serde_json::{Map, Value, json};
use tracing::warn;

use super::{
    charset::Gen3Charset,
    layout::{self, PARTY_SIZE, SIZE},
    pid,
};
use crate::dex::{self, GameGroup, Species};

#[derive(Default)]
pub struct ImportWork {
    species: Option<&'static Species>,
    group: Option<GameGroup>,
}

impl ImportWork {
    fn species(&self) -> Result<&'static Species, PortError> {
        self.species
            .ok_or_else(|| PortError::Format("species read before the Species operation ran".to_string()))
    }
}

pub type ImportSession = Session<BinaryTarget, SemanticRecord, ImportWork>;

const CHARSET: Gen3Charset = Gen3Charset;

pub fn operations() -> Vec<Operation<ImportSession>> {
    vec![
        Operation::new("Checksum", Phase::PreProcessing, checksum),
        Operation::new("Species", Phase::PreProcessing, species),
        Operation::new("PID", Phase::FirstPass, pid_traits),
        Operation::new("Trainer", Phase::FirstPass, trainer),
        Operation::new("Nickname", Phase::FirstPass, nickname).requires(&["Trainer"]),
        Operation::new("Item", Phase::FirstPass, item),
        Operation::new("Experience", Phase::FirstPass, experience),
        Operation::new("Moves", Phase::FirstPass, moves),
        Operation::new("Stats", Phase::FirstPass, stats),
        Operation::new("Catch Info", Phase::FirstPass, catch_info).requires(&["Trainer"]),
        Operation::new("Ability", Phase::FirstPass, ability),
        Operation::new("Egg", Phase::FirstPass, egg),
        Operation::new("Ribbons", Phase::FirstPass, ribbons),
        Operation::new("Markings", Phase::FirstPass, markings),
    ]
}

/// Reads a stored (80 byte) or party (100 byte) pk3. The party stats are
/// derived data and are ignored.
pub fn import(bytes: &[u8]) -> Result<Finished<SemanticRecord>, PortError> {
    if bytes.len() != SIZE && bytes.len() != PARTY_SIZE {
        return Err(PortError::Format(format!(
            "a pk3 is {SIZE} or {PARTY_SIZE} bytes long, got {}",
            bytes.len()
        )));
    }

    let target = BinaryTarget::from_bytes(layout::layout()?, bytes[..SIZE].to_vec())?;
    let session = Session::new(target, SemanticRecord::new(), ImportWork::default());
    let pending = Pipeline::new(operations())?.start(session)?;
    pending.finish(&mut |_: &ChoiceAlert| -> Option<usize> { None })
}

fn field(source: &BinaryTarget, name: &str) -> Result<u32, PortError> {
    let value = source.get(name)?;
    u32::try_from(value).map_err(|_| PortError::Format(format!("{name} holds {value}")))
}

fn elements(source: &BinaryTarget, name: &str) -> Result<Vec<u32>, PortError> {
    source
        .get_array(name)?
        .into_iter()
        .map(|v| u32::try_from(v).map_err(|_| PortError::Format(format!("{name} holds {v}"))))
        .collect()
}

fn text(source: &BinaryTarget, name: &str) -> Result<String, PortError> {
    let bytes: Vec<u8> = elements(source, name)?
        .into_iter()
        .map(|v| u8::try_from(v).unwrap_or(CHARSET.terminator()))
        .collect();
    Ok(CHARSET.decode_str(&bytes))
}

fn named(names: &[&str], values: &[u32]) -> Value {
    let map: Map<String, Value> = names
        .iter()
        .zip(values)
        .map(|(n, v)| (n.to_string(), Value::from(*v)))
        .collect();
    Value::Object(map)
}

fn unknown(tag: &str, what: &str, index: u32) -> Alert {
    Alert::new(tag, format!("The {what} index {index} is not known, skipping it."))
}

fn checksum(ctx: &mut ImportSession) -> Result<(), PortError> {
    let stored = field(&ctx.source, "Checksum")?;
    let computed = u32::from(layout::checksum(ctx.source.bytes()));
    if stored != computed {
        warn!(stored, computed, "pk3 checksum mismatch");
        ctx.warn(Alert::new(
            "Checksum",
            format!("The checksum {stored:#06X} does not match the data ({computed:#06X}). The file may be corrupt."),
        ));
    }
    Ok(())
}

fn species(ctx: &mut ImportSession) -> Result<(), PortError> {
    let index = field(&ctx.source, "Species")?;
    if index == 0 || !ctx.source.get_bool("Has Species")? {
        return Err(PortError::CannotPort("The pk3 is an empty slot.".to_string()));
    }
    let species = u16::try_from(index)
        .ok()
        .and_then(dex::species_by_gen3)
        .ok_or_else(|| PortError::CannotPort(format!("Unknown Gen 3 species index {index}.")))?;

    ctx.work.species = Some(species);
    ctx.data.set(&["Species"], species.name);
    ctx.data.set(&["Dex Number"], species.dex);
    Ok(())
}

fn pid_traits(ctx: &mut ImportSession) -> Result<(), PortError> {
    let species = ctx.work.species()?;
    let pid = field(&ctx.source, "PID")?;
    let tid = u16::try_from(field(&ctx.source, "TID")?).unwrap_or_default();
    let sid = u16::try_from(field(&ctx.source, "SID")?).unwrap_or_default();

    ctx.data.set(&["PID"], pid);
    ctx.data.set(&["Nature"], dex::NATURES[pid::nature_of(pid) as usize]);
    let gender = species.gender.fixed().unwrap_or_else(|| species.gender.gender_of(pid));
    ctx.data.set(&["Gender"], gender.name());
    if species.dex == 201 {
        let letter = pid::unown_letter_name(pid::unown_letter(pid));
        ctx.data.set(&["Forms"], vec![letter]);
    }
    ctx.data.set(&["Shiny"], pid::is_shiny(pid, tid, sid));
    Ok(())
}

fn trainer(ctx: &mut ImportSession) -> Result<(), PortError> {
    let mut info = Map::new();
    info.insert("TID".to_string(), field(&ctx.source, "TID")?.into());
    info.insert("SID".to_string(), field(&ctx.source, "SID")?.into());
    info.insert("OT".to_string(), text(&ctx.source, "OT")?.into());
    let gender = if ctx.source.get_bool("OT Gender")? { "Female" } else { "Male" };
    info.insert("Gender".to_string(), gender.into());

    let language = field(&ctx.source, "Language")?;
    match u8::try_from(language).ok().and_then(dex::language_by_gen3) {
        Some(name) => {
            info.insert("Language".to_string(), name.into());
        }
        None => ctx.warn(unknown("Language", "language", language)),
    }

    let origin = field(&ctx.source, "Origin Game")?;
    if origin != 0 {
        match u8::try_from(origin).ok().and_then(dex::game_by_gen3) {
            Some(game) => {
                ctx.work.group = Some(game.group);
                info.insert("Origin Game".to_string(), game.name.into());
            }
            None => ctx.warn(unknown("Origin Game", "game", origin)),
        }
    }

    ctx.data.set(&["Game Info"], Value::Object(info));
    Ok(())
}

fn nickname(ctx: &mut ImportSession) -> Result<(), PortError> {
    let egg_name = ctx
        .data
        .string(&["Game Info", "Language"])
        .valid()
        .and_then(|l| dex::egg_name(&l));
    let nickname = match (ctx.source.get_bool("Use Egg Name")?, egg_name) {
        (true, Some(name)) => name.to_string(),
        _ => text(&ctx.source, "Nickname")?,
    };
    if !nickname.is_empty() {
        ctx.data.set(&["Nickname"], nickname);
    }
    Ok(())
}

fn item(ctx: &mut ImportSession) -> Result<(), PortError> {
    let index = field(&ctx.source, "Item")?;
    if index == 0 {
        return Ok(());
    }
    match u16::try_from(index).ok().and_then(dex::item_by_gen3) {
        Some(item) => ctx.data.set(&["Item"], item.name),
        None => ctx.warn(unknown("Item", "item", index)),
    }
    Ok(())
}

fn experience(ctx: &mut ImportSession) -> Result<(), PortError> {
    let growth = ctx.work.species()?.growth;
    let exp = field(&ctx.source, "Experience")?;
    ctx.data.set(&["EXP"], exp);
    ctx.data.set(&["Level"], growth.level_at(exp));
    Ok(())
}

fn moves(ctx: &mut ImportSession) -> Result<(), PortError> {
    let indices = elements(&ctx.source, "Moves")?;
    let ups = elements(&ctx.source, "PP Ups")?;

    let mut moves = Vec::with_capacity(4);
    for (&index, &pp_ups) in indices.iter().zip(&ups) {
        if index == 0 {
            continue;
        }
        match u16::try_from(index).ok().and_then(dex::move_by_index) {
            Some(m) => moves.push(json!({ "Name": m.name, "PP Ups": pp_ups })),
            None => ctx.warn(unknown("Moves", "move", index)),
        }
    }
    ctx.data.set(&["Moves"], moves);
    Ok(())
}

fn stats(ctx: &mut ImportSession) -> Result<(), PortError> {
    ctx.data.set(&["Friendship"], field(&ctx.source, "Friendship")?);
    ctx.data.set(&["EVs"], named(&dex::GEN3_STATS, &elements(&ctx.source, "EVs")?));
    ctx.data.set(&["IVs"], named(&dex::GEN3_STATS, &elements(&ctx.source, "IVs")?));
    ctx.data.set(
        &["Contest Stats"],
        named(&dex::CONTEST_STATS, &elements(&ctx.source, "Contest Stats")?),
    );
    ctx.data.set(
        &["Pokérus"],
        named(&["Days", "Strain"], &elements(&ctx.source, "Pokérus")?),
    );
    Ok(())
}

fn catch_info(ctx: &mut ImportSession) -> Result<(), PortError> {
    let group = ctx.work.group.unwrap_or(GameGroup::Hoenn);
    let location = field(&ctx.source, "Met Location")?;
    match u8::try_from(location).ok().and_then(|i| dex::location_name(group, i)) {
        Some(name) => ctx.data.set(&["Catch Info", "Met Location"], name),
        None => ctx.warn(unknown("Met Location", "location", location)),
    }

    ctx.data.set(&["Catch Info", "Met Level"], field(&ctx.source, "Met Level")?);

    let ball = field(&ctx.source, "Ball")?;
    match ball.checked_sub(1).and_then(|i| dex::BALLS.get(i as usize)) {
        Some(name) => ctx.data.set(&["Catch Info", "Ball"], *name),
        None => ctx.warn(unknown("Ball", "ball", ball)),
    }

    let fateful = ctx.source.get_bool("Fateful Encounter")?;
    ctx.data.set(&["Catch Info", "Fateful Encounter"], fateful);
    Ok(())
}

fn ability(ctx: &mut ImportSession) -> Result<(), PortError> {
    let abilities = ctx.work.species()?.abilities;
    let slot = usize::from(ctx.source.get_bool("Ability Slot")?);
    if let Some(name) = abilities.get(slot).or_else(|| abilities.first()) {
        ctx.data.set(&["Ability"], *name);
    }
    Ok(())
}

fn egg(ctx: &mut ImportSession) -> Result<(), PortError> {
    if ctx.source.get_bool("Is Egg")? {
        ctx.data.set(&["Egg Info", "Is Egg"], true);
    }
    Ok(())
}

fn ribbons(ctx: &mut ImportSession) -> Result<(), PortError> {
    let ranks = elements(&ctx.source, "Contest Ribbons")?;
    let flags = elements(&ctx.source, "Ribbons")?;

    let mut names: Vec<String> = Vec::new();
    for (category, &rank) in dex::CONTEST_CATEGORIES.iter().zip(&ranks) {
        names.extend(dex::contest_ribbons(category).into_iter().take(rank as usize));
    }
    names.extend(
        dex::GEN3_RIBBONS
            .iter()
            .zip(&flags)
            .filter(|&(_, &set)| set != 0)
            .map(|(name, _)| name.to_string()),
    );

    if !names.is_empty() {
        ctx.data.set(&["Ribbons"], names);
    }
    Ok(())
}

fn markings(ctx: &mut ImportSession) -> Result<(), PortError> {
    let bits = elements(&ctx.source, "Markings")?;
    let marks: Vec<&str> = dex::MARKINGS
        .iter()
        .filter(|(_, bit)| bits.get(usize::from(*bit)).is_some_and(|&b| b != 0))
        .map(|(name, _)| *name)
        .collect();
    if !marks.is_empty() {
        ctx.data.set(&["Markings"], marks);
    }
    Ok(())
}
