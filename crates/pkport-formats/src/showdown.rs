//! pku → Showdown team text.

use std::fmt;

use pkport::{
    alert::{Alert, ChoiceAlert},
    errors::PortError,
    pipeline::{Finished, Pipeline, Session},
    record::{SemanticRecord, SourceValue},
    scheduler::{Operation, Phase},
    tag::{self, ArraySlot, Encoding, FlagSlot, IndexSlot, Unspecified, ValueSlot},
};
use serde::Serialize;
use serde_json::Value;

use crate::{
    dex::{self, Gender, Species},
    meta,
    options::PortOptions,
};

pub const FORMAT: &str = "Showdown";

/// pku stat names with their Showdown abbreviations, in Showdown order.
const STATS: [(&str, &str); 6] = [
    ("HP", "HP"),
    ("Attack", "Atk"),
    ("Defense", "Def"),
    ("Sp. Attack", "SpA"),
    ("Sp. Defense", "SpD"),
    ("Speed", "Spe"),
];

const NO_ABILITY: &str = "None (Showdown will pick one)";

/// One Pokémon of a Showdown team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowdownSet {
    pub showdown_name: String,
    pub nickname: Option<String>,
    pub gender: Option<Gender>,
    /// Empty when the Pokémon holds nothing.
    pub item: String,
    /// Empty to let Showdown pick.
    pub ability: String,
    pub level: i128,
    pub friendship: i128,
    pub ivs: [i128; 6],
    pub evs: [i128; 6],
    /// Empty to let Showdown use its default.
    pub nature: String,
    pub shiny: bool,
    pub gigantamax: bool,
    pub moves: Vec<String>,
}

impl Default for ShowdownSet {
    fn default() -> Self {
        Self {
            showdown_name: String::new(),
            nickname: None,
            gender: None,
            item: String::new(),
            ability: String::new(),
            level: 100,
            friendship: 255,
            ivs: [31; 6],
            evs: [0; 6],
            nature: String::new(),
            shiny: false,
            gigantamax: false,
            moves: Vec::new(),
        }
    }
}

fn spread(values: &[i128; 6], skip: i128) -> Option<String> {
    let parts: Vec<String> = values
        .iter()
        .zip(STATS)
        .filter(|&(&v, _)| v != skip)
        .map(|(v, (_, abbr))| format!("{v} {abbr}"))
        .collect();
    (!parts.is_empty()).then(|| parts.join(" / "))
}

impl fmt::Display for ShowdownSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.nickname {
            Some(nickname) if *nickname != self.showdown_name => {
                write!(f, "{nickname} ({})", self.showdown_name)?
            }
            _ => write!(f, "{}", self.showdown_name)?,
        }
        match self.gender {
            Some(Gender::Male) => write!(f, " (M)")?,
            Some(Gender::Female) => write!(f, " (F)")?,
            _ => {}
        }
        if !self.item.is_empty() {
            write!(f, " @ {}", self.item)?;
        }
        writeln!(f)?;

        if !self.ability.is_empty() {
            writeln!(f, "Ability: {}", self.ability)?;
        }
        if self.level != 100 {
            writeln!(f, "Level: {}", self.level)?;
        }
        if self.shiny {
            writeln!(f, "Shiny: Yes")?;
        }
        if self.friendship != 255 {
            writeln!(f, "Happiness: {}", self.friendship)?;
        }
        if self.gigantamax {
            writeln!(f, "Gigantamax: Yes")?;
        }
        if let Some(evs) = spread(&self.evs, 0) {
            writeln!(f, "EVs: {evs}")?;
        }
        if !self.nature.is_empty() {
            writeln!(f, "{} Nature", self.nature)?;
        }
        if let Some(ivs) = spread(&self.ivs, 31) {
            writeln!(f, "IVs: {ivs}")?;
        }
        for m in &self.moves {
            writeln!(f, "- {m}")?;
        }
        Ok(())
    }
}

pub struct ShowdownWork {
    options: PortOptions,
    species: Option<&'static Species>,
}

pub type ShowdownSession = Session<SemanticRecord, ShowdownSet, ShowdownWork>;

fn forms(record: &SemanticRecord) -> Option<String> {
    record
        .strings(&["Forms"])
        .valid()
        .filter(|f| !f.is_empty())
        .map(|f| f.join("-"))
}

fn showdown_name(record: &SemanticRecord) -> Option<(&'static Species, &'static str)> {
    let species = dex::species_by_name(&record.string(&["Species"]).valid()?)?;
    let name = species.showdown_name(forms(record).as_deref())?;
    Some((species, name))
}

/// Whether `record` can be written as a Showdown set at all.
pub fn can_port(record: &SemanticRecord) -> Result<(), PortError> {
    let record = record.with_format_override(FORMAT);
    if record.boolean(&["Egg Info", "Is Egg"]).valid() == Some(true) {
        return Err(PortError::CannotPort("Cannot be an Egg.".to_string()));
    }
    if showdown_name(&record).is_none() {
        return Err(PortError::CannotPort(
            "Species/Form/Appearance doesn't exist in Showdown.".to_string(),
        ));
    }
    Ok(())
}

pub fn operations() -> Vec<Operation<ShowdownSession>> {
    vec![
        Operation::new("Format Override", Phase::FormatOverride, format_override),
        Operation::new("Battle Stat Override", Phase::PreProcessing, battle_stat_override),
        Operation::new("Showdown Name", Phase::FirstPass, name),
        Operation::new("Nickname", Phase::FirstPass, nickname),
        Operation::new("Gender", Phase::FirstPass, gender).requires(&["Showdown Name"]),
        Operation::new("Item", Phase::FirstPass, item),
        Operation::new("Ability", Phase::FirstPass, ability),
        Operation::new("Level", Phase::FirstPass, level),
        Operation::new("Friendship", Phase::FirstPass, friendship),
        Operation::new("IVs", Phase::FirstPass, ivs),
        Operation::new("EVs", Phase::FirstPass, evs),
        Operation::new("Nature", Phase::FirstPass, nature),
        Operation::new("Shiny", Phase::FirstPass, shiny),
        Operation::new("Gigantamax", Phase::FirstPass, gigantamax),
        Operation::new("Moves", Phase::FirstPass, moves),
    ]
}

/// Converts `record` to a Showdown set. Showdown has nothing ambiguous to
/// resolve, so the conversion runs straight through.
pub fn export(record: SemanticRecord, options: &PortOptions) -> Result<Finished<ShowdownSet>, PortError> {
    can_port(&record)?;
    let work = ShowdownWork {
        options: options.clone(),
        species: None,
    };
    let session = Session::new(record, ShowdownSet::default(), work);
    Pipeline::new(operations())?
        .start(session)?
        .finish(&mut |_: &ChoiceAlert| -> Option<usize> { None })
}

fn format_override(ctx: &mut ShowdownSession) -> Result<(), PortError> {
    ctx.source = ctx.source.with_format_override(FORMAT);
    Ok(())
}

fn battle_stat_override(ctx: &mut ShowdownSession) -> Result<(), PortError> {
    if ctx.work.options.battle_stat_override {
        let alert = meta::apply_battle_stat_override(&mut ctx.source);
        ctx.warn(alert);
    }
    Ok(())
}

fn name(ctx: &mut ShowdownSession) -> Result<(), PortError> {
    let (species, name) = showdown_name(&ctx.source).ok_or_else(|| {
        PortError::CannotPort("Species/Form/Appearance doesn't exist in Showdown.".to_string())
    })?;
    ctx.work.species = Some(species);
    ctx.data.showdown_name = name.to_string();
    Ok(())
}

fn nickname(ctx: &mut ShowdownSession) -> Result<(), PortError> {
    let nickname = ctx.source.string(&["Nickname"]).valid().filter(|n| !n.is_empty());
    if nickname.as_deref().is_some_and(|n| n.starts_with(' ')) {
        ctx.warn(Alert::new(
            "Nickname",
            "Showdown does not recognize leading spaces in nicknames.",
        ));
    }
    ctx.data.nickname = nickname;
    Ok(())
}

/// Showdown writes whatever gender it is given; genderless is no gender.
fn gender(ctx: &mut ShowdownSession) -> Result<(), PortError> {
    let fixed = ctx.work.species.and_then(|s| s.gender.fixed());
    let given = ctx.source.string(&["Gender"]).valid().and_then(|g| Gender::parse(&g));
    ctx.data.gender = given
        .or(fixed)
        .filter(|g| *g != Gender::Genderless);
    Ok(())
}

fn item(ctx: &mut ShowdownSession) -> Result<(), PortError> {
    let source = ctx.source.string(&["Item"]);
    let lookup = |name: &str| {
        if name.eq_ignore_ascii_case("None") {
            return Some(Encoding::Name(String::new()));
        }
        dex::item_by_name(name).map(|i| Encoding::Name(i.name.to_string()))
    };
    let alert = tag::indexed(
        "Item",
        source,
        IndexSlot::Name(&mut ctx.data.item),
        "None",
        lookup,
        Unspecified::Silent,
    )?;
    ctx.warn(alert);
    Ok(())
}

fn ability(ctx: &mut ShowdownSession) -> Result<(), PortError> {
    let source = ctx.source.string(&["Ability"]);
    let lookup = |name: &str| {
        if name == NO_ABILITY {
            return Some(Encoding::Name(String::new()));
        }
        dex::canonical_ability(name).map(|a| Encoding::Name(a.to_string()))
    };
    let alert = tag::indexed(
        "Ability",
        source,
        IndexSlot::Name(&mut ctx.data.ability),
        NO_ABILITY,
        lookup,
        Unspecified::Silent,
    )?;
    ctx.warn(alert);
    Ok(())
}

fn level(ctx: &mut ShowdownSession) -> Result<(), PortError> {
    let source = ctx.source.int(&["Level"]);
    let max = i128::from(dex::MAX_LEVEL);
    let mut slot = ValueSlot::new(&mut ctx.data.level, 1, max);
    let alert = tag::numeric("Level", source, &mut slot, max, Unspecified::Alert)?;
    ctx.warn(alert);
    Ok(())
}

fn friendship(ctx: &mut ShowdownSession) -> Result<(), PortError> {
    let source = ctx.source.int(&["Friendship"]);
    let mut slot = ValueSlot::new(&mut ctx.data.friendship, 0, 255);
    let alert = tag::numeric("Friendship", source, &mut slot, 255, Unspecified::Alert)?;
    ctx.warn(alert);
    Ok(())
}

fn stat_spread(
    ctx: &mut ShowdownSession,
    name: &str,
    max: i128,
    default: i128,
    unspecified: Unspecified,
) -> Result<(), PortError> {
    let names = STATS.map(|(stat, _)| stat);
    let sources = names.iter().map(|s| ctx.source.int(&[name, *s])).collect();
    let values = if name == "IVs" { &mut ctx.data.ivs } else { &mut ctx.data.evs };
    let mut slot = ArraySlot::new(values, 0, max);
    let alert = tag::multi_numeric(name, &names, sources, &mut slot, default, unspecified)?;
    ctx.warn(alert);
    Ok(())
}

fn ivs(ctx: &mut ShowdownSession) -> Result<(), PortError> {
    stat_spread(ctx, "IVs", 31, 31, Unspecified::Alert)
}

fn evs(ctx: &mut ShowdownSession) -> Result<(), PortError> {
    stat_spread(ctx, "EVs", 255, 0, Unspecified::Silent)
}

fn nature(ctx: &mut ShowdownSession) -> Result<(), PortError> {
    const DEFAULT: &str = "Using the default: None (Showdown uses Serious when no nature is specified.)";
    let alert = match ctx.source.string(&["Nature"]) {
        SourceValue::Unspecified => Some(Alert::new("Nature", format!("No nature was specified. {DEFAULT}"))),
        SourceValue::Invalid(raw) | SourceValue::Valid(raw) => match dex::nature_index(&raw) {
            Some(i) => {
                ctx.data.nature = dex::NATURES[i as usize].to_string();
                None
            }
            None => Some(Alert::new(
                "Nature",
                format!("The Nature \"{raw}\" is not valid in this format. {DEFAULT}"),
            )),
        },
    };
    ctx.warn(alert);
    Ok(())
}

fn shiny(ctx: &mut ShowdownSession) -> Result<(), PortError> {
    let source = ctx.source.boolean(&["Shiny"]);
    let alert = tag::boolean("Shiny", source, &mut FlagSlot(&mut ctx.data.shiny), false, Unspecified::Silent)?;
    ctx.warn(alert);
    Ok(())
}

fn gigantamax(ctx: &mut ShowdownSession) -> Result<(), PortError> {
    let source = ctx.source.boolean(&["Gigantamax Factor"]);
    let mut slot = FlagSlot(&mut ctx.data.gigantamax);
    let alert = tag::boolean("Gigantamax Factor", source, &mut slot, false, Unspecified::Silent)?;
    ctx.warn(alert);
    Ok(())
}

fn moves(ctx: &mut ShowdownSession) -> Result<(), PortError> {
    let mut kept: Vec<&'static str> = Vec::with_capacity(4);
    let mut invalid = Vec::new();
    let mut extra = false;
    for entry in ctx.source.array(&["Moves"]) {
        let name = entry.get("Name").and_then(Value::as_str);
        match name.and_then(dex::move_by_name) {
            Some(m) if kept.contains(&m.name) => {}
            Some(m) if kept.len() < 4 => kept.push(m.name),
            Some(_) => extra = true,
            None => invalid.push(name.map_or_else(|| entry.to_string(), str::to_string)),
        }
    }

    let mut alert = None;
    if !invalid.is_empty() {
        alert = Some(Alert::new(
            "Moves",
            format!(
                "The moves {} are not supported by this format and were skipped.",
                invalid.join(", ")
            ),
        ));
    }
    if extra {
        let more = Alert::new(
            "Moves",
            "This pku has more than 4 valid moves, only the first 4 were kept.",
        );
        alert = pkport::alert::combine(alert, Some(more));
    }

    ctx.data.moves = kept.into_iter().map(str::to_string).collect();
    ctx.warn(alert);
    Ok(())
}
