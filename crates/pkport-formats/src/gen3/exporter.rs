//! pku → pk3.

use pkport::{
    alert::{Alert, AlertKind, Choice, ChoiceAlert},
    errors::PortError,
    overrides::{self, BytePatch},
    pipeline::{Pending, Pipeline, Session},
    record::{SemanticRecord, SourceValue, int_value},
    resolver::ErrorResolver,
    scheduler::{Operation, Phase},
    tag::{self, Encoding, FieldSlot, IndexSlot, TextCodec, Unspecified},
    target::BinaryTarget,
};
use rand::rngs::StdRng;
use serde_json::Value;

use super::{
    charset::Gen3Charset,
    layout::{self, FORMAT},
    pid::{Owner, PidTraits, UNOWN_LETTERS},
};
use crate::{
    dex::{self, Gender, GameGroup, Game, Species},
    meta,
    options::PortOptions,
};

/// Working values shared between pk3 export operations.
pub struct Pk3Work {
    options: PortOptions,
    rng: StdRng,
    species: Option<&'static Species>,
    nature: Option<u32>,
    gender: Option<Gender>,
    unown: Option<u32>,
    game: Option<&'static Game>,
    legal_egg: bool,
    /// Positions in the pku's move list of the moves that were kept.
    moves: Vec<usize>,
    patches: Vec<BytePatch>,
}

impl Pk3Work {
    fn new(options: &PortOptions) -> Self {
        Self {
            options: options.clone(),
            rng: options.rng(),
            species: None,
            nature: None,
            gender: None,
            unown: None,
            game: None,
            legal_egg: false,
            moves: Vec::new(),
            patches: Vec::new(),
        }
    }

    fn species(&self) -> Result<&'static Species, PortError> {
        self.species
            .ok_or_else(|| PortError::Format("species read before the Dex operation ran".to_string()))
    }
}

pub type Pk3Session = Session<SemanticRecord, BinaryTarget, Pk3Work>;
pub type Pk3Pending = Pending<SemanticRecord, BinaryTarget, Pk3Work>;

const CHARSET: Gen3Charset = Gen3Charset;

const SPECIES_REASON: &str = "Must be a species & form that exists in Gen 3.";
const SHADOW_REASON: &str = "Cannot be a Shadow Pokémon.";

/// Whether `record` can be written as a pk3 at all.
pub fn can_port(record: &SemanticRecord) -> Result<(), PortError> {
    let record = record.with_format_override(FORMAT);
    let species = record
        .string(&["Species"])
        .valid()
        .and_then(|name| dex::species_by_name(&name))
        .filter(|s| s.gen3.is_some())
        .ok_or_else(|| PortError::CannotPort(SPECIES_REASON.to_string()))?;

    let form = form_name(&record);
    if !form.is_empty() && !is_default_form(&form) && species.form(&form).is_none() {
        return Err(PortError::CannotPort(SPECIES_REASON.to_string()));
    }

    if record.boolean(&["Shadow Info", "Shadow"]).valid() == Some(true) {
        return Err(PortError::CannotPort(SHADOW_REASON.to_string()));
    }

    Ok(())
}

/// The pk3 export operations.
pub fn operations() -> Vec<Operation<Pk3Session>> {
    vec![
        Operation::new("Format Override", Phase::FormatOverride, format_override),
        Operation::new("Battle Stat Override", Phase::PreProcessing, battle_stat_override),
        Operation::new("Dex", Phase::PreProcessing, dex_number).requires(&["Battle Stat Override"]),
        Operation::new("Species", Phase::FirstPass, species),
        Operation::new("Nature", Phase::FirstPass, nature),
        Operation::new("Gender", Phase::FirstPass, gender),
        Operation::new("Form", Phase::FirstPass, form),
        Operation::new("TID", Phase::FirstPass, tid),
        Operation::new("SID", Phase::FirstPass, sid),
        Operation::new("PID", Phase::FirstPass, pid).requires(&["Gender", "Form", "Nature", "TID", "SID"]),
        Operation::new("Origin Game", Phase::FirstPass, origin_game),
        Operation::new("Met Location", Phase::FirstPass, met_location).requires(&["Origin Game"]),
        Operation::new("Egg", Phase::FirstPass, egg).requires(&["Origin Game"]),
        Operation::new("Language", Phase::FirstPass, language).requires(&["Egg"]),
        Operation::new("Nickname", Phase::FirstPass, nickname).requires(&["Language"]),
        Operation::new("OT", Phase::FirstPass, ot).requires(&["Language"]),
        Operation::new("Markings", Phase::FirstPass, markings),
        Operation::new("Item", Phase::FirstPass, item),
        Operation::new("Experience", Phase::FirstPass, experience),
        Operation::new("Moves", Phase::FirstPass, moves),
        Operation::new("PP Ups", Phase::FirstPass, pp_ups).requires(&["Moves"]),
        Operation::new("PP", Phase::FirstPass, pp).requires(&["Moves", "PP Ups"]),
        Operation::new("Friendship", Phase::FirstPass, friendship),
        Operation::new("EVs", Phase::FirstPass, evs),
        Operation::new("Contest Stats", Phase::FirstPass, contest_stats),
        Operation::new("Pokérus", Phase::FirstPass, pokerus),
        Operation::new("Met Level", Phase::FirstPass, met_level),
        Operation::new("Ball", Phase::FirstPass, ball),
        Operation::new("OT Gender", Phase::FirstPass, ot_gender),
        Operation::new("IVs", Phase::FirstPass, ivs),
        Operation::new("Ability Slot", Phase::FirstPass, ability_slot),
        Operation::new("Ribbons", Phase::FirstPass, ribbons),
        Operation::new("Fateful Encounter", Phase::FirstPass, fateful_encounter),
        Operation::new("Byte Override", Phase::FirstPass, collect_byte_override),
        Operation::new("Checksum", Phase::PostProcessing, checksum),
        Operation::new("Apply Byte Override", Phase::PostProcessing, apply_byte_override)
            .requires(&["Checksum"]),
    ]
}

/// Runs the first pass of a pk3 export. The result lists any choices the
/// caller still has to make.
pub fn start(record: SemanticRecord, options: &PortOptions) -> Result<Pk3Pending, PortError> {
    can_port(&record)?;
    let target = BinaryTarget::new(layout::layout()?);
    let session = Session::new(record, target, Pk3Work::new(options));
    Pipeline::new(operations())?.start(session)
}

fn form_name(record: &SemanticRecord) -> String {
    record
        .strings(&["Forms"])
        .valid()
        .unwrap_or_default()
        .join("-")
}

fn is_default_form(form: &str) -> bool {
    form.eq_ignore_ascii_case("default") || form.eq_ignore_ascii_case("normal")
}

fn to_u16(value: i128) -> Result<u16, PortError> {
    u16::try_from(value).map_err(|_| PortError::Format(format!("{value} does not fit in 16 bits")))
}

fn to_u32(value: i128) -> Result<u32, PortError> {
    u32::try_from(value).map_err(|_| PortError::Format(format!("{value} does not fit in 32 bits")))
}

/* ------------------------------------
 * Pre-processing
 * ------------------------------------ */

fn format_override(ctx: &mut Pk3Session) -> Result<(), PortError> {
    ctx.source = ctx.source.with_format_override(FORMAT);
    Ok(())
}

fn battle_stat_override(ctx: &mut Pk3Session) -> Result<(), PortError> {
    if ctx.work.options.battle_stat_override {
        let alert = meta::apply_battle_stat_override(&mut ctx.source);
        ctx.warn(alert);
    }
    Ok(())
}

fn dex_number(ctx: &mut Pk3Session) -> Result<(), PortError> {
    let species = ctx
        .source
        .string(&["Species"])
        .valid()
        .and_then(|name| dex::species_by_name(&name))
        .ok_or_else(|| PortError::CannotPort(SPECIES_REASON.to_string()))?;
    ctx.work.species = Some(species);
    Ok(())
}

/* ------------------------------------
 * Identity
 * ------------------------------------ */

fn species(ctx: &mut Pk3Session) -> Result<(), PortError> {
    let species = ctx.work.species()?;
    let index = species
        .gen3
        .ok_or_else(|| PortError::CannotPort(SPECIES_REASON.to_string()))?;
    ctx.data.set("Species", i128::from(index))?;
    ctx.data.set_bool("Has Species", true)?;
    Ok(())
}

fn nature(ctx: &mut Pk3Session) -> Result<(), PortError> {
    let alert = match ctx.source.string(&["Nature"]) {
        SourceValue::Unspecified => Some(Alert::new(
            "Nature",
            "No nature specified, using the nature decided by the PID.",
        )),
        SourceValue::Invalid(raw) | SourceValue::Valid(raw) => match dex::nature_index(&raw) {
            Some(i) => {
                ctx.work.nature = Some(i);
                None
            }
            None => Some(Alert::new(
                "Nature",
                format!("The nature \"{raw}\" is not valid in this format. Using the nature decided by the PID."),
            )),
        },
    };
    ctx.warn(alert);
    Ok(())
}

fn gender(ctx: &mut Pk3Session) -> Result<(), PortError> {
    let ratio = ctx.work.species()?.gender;
    let source = ctx.source.string(&["Gender"]);

    let alert = match (ratio.fixed(), source) {
        (Some(_), SourceValue::Unspecified) => None,
        (Some(fixed), SourceValue::Invalid(raw) | SourceValue::Valid(raw)) => {
            (Gender::parse(&raw) != Some(fixed)).then(|| {
                Alert::new(
                    "Gender",
                    format!(
                        "This species is always {}, ignoring the gender \"{raw}\".",
                        fixed.name().to_lowercase()
                    ),
                )
            })
        }
        (None, SourceValue::Unspecified) => Some(Alert::new(
            "Gender",
            "No gender specified, using the gender decided by the PID.",
        )),
        (None, SourceValue::Invalid(raw) | SourceValue::Valid(raw)) => match Gender::parse(&raw) {
            Some(g @ (Gender::Male | Gender::Female)) => {
                ctx.work.gender = Some(g);
                None
            }
            _ => Some(Alert::new(
                "Gender",
                format!("The gender \"{raw}\" is not valid in this format. Using the gender decided by the PID."),
            )),
        },
    };
    ctx.warn(alert);
    Ok(())
}

fn form(ctx: &mut Pk3Session) -> Result<(), PortError> {
    let species = ctx.work.species()?;
    let form = form_name(&ctx.source).to_lowercase();
    if form.is_empty() || is_default_form(&form) {
        return Ok(());
    }

    let alert = match (species.dex, form.as_str()) {
        (201, letter) => {
            ctx.work.unown = match letter.as_bytes() {
                &[c @ b'a'..=b'z'] => Some(u32::from(c - b'a')),
                b"?" => Some(UNOWN_LETTERS - 2),
                b"!" => Some(UNOWN_LETTERS - 1),
                _ => None,
            };
            match ctx.work.unown {
                Some(_) => None,
                None => Some(form_alert(AlertKind::Invalid, &form)?),
            }
        }
        (386, "attack" | "defense" | "speed") => Some(Alert::new(
            "Form",
            "Note that in generation 3, Deoxys' form depends on what game it is currently in.",
        )),
        (351, "sunny" | "rainy" | "snowy") => {
            let name = species.form(&form).map_or(form.as_str(), |f| f.name);
            Some(form_alert(AlertKind::InBattle, name)?)
        }
        _ => Some(form_alert(AlertKind::Invalid, &form)?),
    };
    ctx.warn(alert);
    Ok(())
}

fn form_alert(kind: AlertKind, form: &str) -> Result<Alert, PortError> {
    let message = match kind {
        AlertKind::InBattle => {
            format!("Castform's {form} form only exists in battle, using the default form.")
        }
        AlertKind::Invalid => format!("The form \"{form}\" is not valid in this format, using the default form."),
        kind => {
            return Err(PortError::UnsupportedAlert {
                tag: "Form".to_string(),
                kind,
            });
        }
    };
    Ok(Alert::new("Form", message))
}

fn tid(ctx: &mut Pk3Session) -> Result<(), PortError> {
    let source = ctx.source.int(&["Game Info", "TID"]);
    let mut slot = FieldSlot::new(&mut ctx.data, "TID")?;
    let alert = tag::numeric("TID", source, &mut slot, 0, Unspecified::Silent)?;
    ctx.warn(alert);
    Ok(())
}

fn sid(ctx: &mut Pk3Session) -> Result<(), PortError> {
    let source = ctx.source.int(&["Game Info", "SID"]);
    let mut slot = FieldSlot::new(&mut ctx.data, "SID")?;
    let alert = tag::numeric("SID", source, &mut slot, 0, Unspecified::Silent)?;
    ctx.warn(alert);
    Ok(())
}

fn write_pid(target: &mut BinaryTarget, pid: u32) -> Result<(), PortError> {
    Ok(target.set("PID", i128::from(pid))?)
}

fn pid(ctx: &mut Pk3Session) -> Result<(), PortError> {
    let species = ctx.work.species()?;
    let owner = Owner {
        ratio: species.gender,
        tid: to_u16(ctx.data.get("TID")?)?,
        sid: to_u16(ctx.data.get("SID")?)?,
    };
    let traits = PidTraits {
        gender: ctx.work.gender,
        nature: ctx.work.nature,
        unown: ctx.work.unown,
        shiny: ctx.source.boolean(&["Shiny"]).valid(),
    };
    let is_unown = species.dex == 201;

    let source = ctx.source.int(&["PID"]);
    let given = match &source {
        SourceValue::Valid(v) => u32::try_from(*v).ok(),
        _ => None,
    };

    let Some(given) = given else {
        let generated = traits.generate(owner, &mut ctx.work.rng)?;
        let message = match source {
            SourceValue::Unspecified => "No PID was specified, generating one that fits the other tags.".to_string(),
            SourceValue::Invalid(raw) => {
                format!("The PID \"{raw}\" is not valid in this format, generating one that fits the other tags.")
            }
            SourceValue::Valid(v) => {
                format!("The PID {v} does not fit in 32 bits, generating one that fits the other tags.")
            }
        };
        ctx.warn(Alert::new("PID", message));
        ctx.defer(ErrorResolver::single("PID", generated, write_pid));
        return Ok(());
    };

    let wrong = traits.mismatches(given, owner);
    if wrong.is_empty() {
        ctx.defer(ErrorResolver::single("PID", given, write_pid));
        return Ok(());
    }

    let generated = traits.generate(owner, &mut ctx.work.rng)?;
    let alert = ChoiceAlert::new(
        "PID",
        format!(
            "The PID {given:#010X} does not match this pku's {}.",
            wrong.join(" and ")
        ),
        vec![
            Choice::new("Keep PID", PidTraits::describe(given, owner, is_unown)),
            Choice::new("Regenerate PID", PidTraits::describe(generated, owner, is_unown)),
        ],
    );
    ctx.defer(ErrorResolver::new(
        "PID",
        vec![given, generated],
        Some(alert),
        write_pid,
    )?);
    Ok(())
}

/* ------------------------------------
 * Origin and trainer
 * ------------------------------------ */

fn origin_game(ctx: &mut Pk3Session) -> Result<(), PortError> {
    let source = ctx.source.string(&["Game Info", "Origin Game"]);
    ctx.work.game = source
        .as_valid()
        .and_then(|name| dex::game_by_name(name))
        .filter(|g| g.gen3.is_some());

    let lookup = |name: &str| {
        if name.eq_ignore_ascii_case("None") {
            return Some(Encoding::Index(0));
        }
        dex::game_by_name(name)?
            .gen3
            .map(|i| Encoding::Index(i.into()))
    };
    let slot = IndexSlot::Field(FieldSlot::new(&mut ctx.data, "Origin Game")?);
    let alert = tag::indexed("Origin Game", source, slot, "None", lookup, Unspecified::Silent)?;
    ctx.warn(alert);
    Ok(())
}

fn met_location(ctx: &mut Pk3Session) -> Result<(), PortError> {
    let group = ctx.work.game.map_or(GameGroup::Hoenn, |g| g.group);
    let source = ctx.source.string(&["Catch Info", "Met Location"]);
    let lookup = |name: &str| dex::location_index(group, name).map(|i| Encoding::Index(i.into()));
    let slot = IndexSlot::Field(FieldSlot::new(&mut ctx.data, "Met Location")?);
    let alert = tag::indexed(
        "Met Location",
        source,
        slot,
        dex::default_location(group),
        lookup,
        Unspecified::Alert,
    )?;
    ctx.warn(alert);
    Ok(())
}

/// Eggs from a Gen 3 game whose nickname is the egg name of their language
/// are stored the way the games store them: Japanese with the egg-name flag.
fn egg(ctx: &mut Pk3Session) -> Result<(), PortError> {
    let source = ctx.source.boolean(&["Egg Info", "Is Egg"]);
    let is_egg = source.as_valid() == Some(&true);
    let mut slot = FieldSlot::new(&mut ctx.data, "Is Egg")?;
    let alert = tag::boolean("Egg", source, &mut slot, false, Unspecified::Silent)?;
    ctx.warn(alert);

    if is_egg && ctx.data.get("Origin Game")? != 0 {
        let language = ctx.source.string(&["Game Info", "Language"]).valid();
        let nickname = ctx.source.string(&["Nickname"]).valid();
        let egg_name = language.as_deref().and_then(dex::egg_name);
        if egg_name.is_some() && egg_name == nickname.as_deref() {
            ctx.data.set_bool("Use Egg Name", true)?;
            ctx.work.legal_egg = true;
        }
    }
    Ok(())
}

fn language(ctx: &mut Pk3Session) -> Result<(), PortError> {
    if ctx.work.legal_egg {
        let japanese = dex::language_index("Japanese").unwrap_or(1);
        ctx.data.set("Language", i128::from(japanese))?;
        return Ok(());
    }

    let source = ctx.source.string(&["Game Info", "Language"]);
    let lookup = |name: &str| dex::language_index(name).map(|i| Encoding::Index(i.into()));
    let slot = IndexSlot::Field(FieldSlot::new(&mut ctx.data, "Language")?);
    let alert = tag::indexed("Language", source, slot, "English", lookup, Unspecified::Alert)?;
    ctx.warn(alert);
    Ok(())
}

fn nickname(ctx: &mut Pk3Session) -> Result<(), PortError> {
    if ctx.work.legal_egg {
        let blank = vec![i128::from(CHARSET.terminator()); layout::NICKNAME_LEN];
        ctx.data.set_array("Nickname", &blank)?;
        return Ok(());
    }

    let default = ctx.work.species()?.name.to_uppercase();
    let source = ctx.source.string(&["Nickname"]);
    let mut slot = FieldSlot::new(&mut ctx.data, "Nickname")?;
    let alert = tag::string("Nickname", source, &mut slot, &CHARSET, &default, Unspecified::Silent)?;
    ctx.warn(alert);
    Ok(())
}

fn ot(ctx: &mut Pk3Session) -> Result<(), PortError> {
    let source = ctx.source.string(&["Game Info", "OT"]);
    let mut slot = FieldSlot::new(&mut ctx.data, "OT")?;
    let alert = tag::string("OT", source, &mut slot, &CHARSET, "", Unspecified::Alert)?;
    ctx.warn(alert);
    Ok(())
}

fn markings(ctx: &mut Pk3Session) -> Result<(), PortError> {
    let marks = ctx.source.strings(&["Markings"]).valid().unwrap_or_default();
    for (name, bit) in dex::MARKINGS {
        let marked = marks.iter().any(|m| m.eq_ignore_ascii_case(name));
        ctx.data.set_element("Markings", usize::from(bit), i128::from(marked))?;
    }
    Ok(())
}

fn item(ctx: &mut Pk3Session) -> Result<(), PortError> {
    let source = ctx.source.string(&["Item"]);
    let lookup = |name: &str| {
        if name.eq_ignore_ascii_case("None") {
            return Some(Encoding::Index(0));
        }
        dex::item_by_name(name)?.gen3.map(|i| Encoding::Index(i.into()))
    };
    let slot = IndexSlot::Field(FieldSlot::new(&mut ctx.data, "Item")?);
    let alert = tag::indexed("Item", source, slot, "None", lookup, Unspecified::Silent)?;
    ctx.warn(alert);
    Ok(())
}

/* ------------------------------------
 * Stats and moves
 * ------------------------------------ */

fn write_exp(target: &mut BinaryTarget, exp: u32) -> Result<(), PortError> {
    Ok(target.set("Experience", i128::from(exp))?)
}

/// EXP and Level both decide the stored EXP. When they disagree the caller
/// picks which one wins.
fn experience(ctx: &mut Pk3Session) -> Result<(), PortError> {
    let growth = ctx.work.species()?.growth;
    let max_level = i128::from(dex::MAX_LEVEL);
    let max_exp = i128::from(growth.max_exp());

    let level = match ctx.source.int(&["Level"]) {
        SourceValue::Valid(v) => {
            let (level, kind) = tag::clamp(v, 1, max_level);
            if let Some(kind) = kind {
                ctx.warn(tag::numeric_alert("Level", kind, None, (1, max_level), 1)?);
            }
            Some(to_u32(level)?)
        }
        SourceValue::Invalid(raw) => {
            ctx.warn(tag::numeric_alert(
                "Level",
                AlertKind::Invalid,
                Some(&raw),
                (1, max_level),
                1,
            )?);
            None
        }
        SourceValue::Unspecified => None,
    };

    let exp = match ctx.source.int(&["EXP"]) {
        SourceValue::Valid(v) => {
            let (exp, kind) = tag::clamp(v, 0, max_exp);
            if let Some(kind) = kind {
                ctx.warn(tag::numeric_alert("EXP", kind, None, (0, max_exp), 0)?);
            }
            Some(to_u32(exp)?)
        }
        SourceValue::Invalid(raw) => {
            ctx.warn(tag::numeric_alert(
                "EXP",
                AlertKind::Invalid,
                Some(&raw),
                (0, max_exp),
                0,
            )?);
            None
        }
        SourceValue::Unspecified => None,
    };

    let resolver = match (exp, level) {
        (None, None) => {
            if !ctx.source.contains(&["Level"]) && !ctx.source.contains(&["EXP"]) {
                ctx.warn(Alert::new(
                    "EXP",
                    "No EXP or Level was specified, setting it to level 1 (0 EXP).",
                ));
            }
            ErrorResolver::single("EXP", 0, write_exp)
        }
        (Some(exp), None) => ErrorResolver::single("EXP", exp, write_exp),
        (None, Some(level)) => ErrorResolver::single("EXP", growth.exp_at(level), write_exp),
        (Some(exp), Some(level)) if growth.level_at(exp) == level => {
            ErrorResolver::single("EXP", exp, write_exp)
        }
        (Some(exp), Some(level)) => {
            let from_level = growth.exp_at(level);
            let alert = ChoiceAlert::new(
                "EXP",
                format!("This pku's EXP ({exp}) does not match its Level ({level})."),
                vec![
                    Choice::new("Use EXP", format!("EXP: {exp}\nLevel: {}", growth.level_at(exp))),
                    Choice::new("Use Level", format!("EXP: {from_level}\nLevel: {level}")),
                ],
            );
            ErrorResolver::new("EXP", vec![exp, from_level], Some(alert), write_exp)?
        }
    };
    ctx.defer(resolver);
    Ok(())
}

fn moves(ctx: &mut Pk3Session) -> Result<(), PortError> {
    let entries = ctx.source.array(&["Moves"]);
    let mut kept: Vec<(usize, &'static dex::Move)> = Vec::with_capacity(4);
    let mut invalid = Vec::new();
    let mut extra = 0;

    for (i, entry) in entries.iter().enumerate() {
        let name = entry.get("Name").and_then(Value::as_str);
        let known = name
            .and_then(dex::move_by_name)
            .filter(|m| m.index <= dex::LAST_GEN3_MOVE);
        match known {
            Some(m) if kept.iter().any(|(_, k)| k.index == m.index) => {}
            Some(m) if kept.len() < 4 => kept.push((i, m)),
            Some(_) => extra += 1,
            None => invalid.push(name.map_or_else(|| entry.to_string(), str::to_string)),
        }
    }

    let mut indices = [0i128; 4];
    for (slot, (_, m)) in indices.iter_mut().zip(&kept) {
        *slot = i128::from(m.index);
    }
    ctx.data.set_array("Moves", &indices)?;
    ctx.work.moves = kept.iter().map(|&(i, _)| i).collect();

    let mut alert = None;
    if entries.is_empty() {
        alert = Some(moves_alert(AlertKind::Unspecified, "")?);
    }
    if !invalid.is_empty() {
        let a = moves_alert(AlertKind::Invalid, &invalid.join(", "))?;
        alert = pkport::alert::combine(alert, Some(a));
    }
    if extra > 0 {
        alert = pkport::alert::combine(alert, Some(moves_alert(AlertKind::TooLong, "")?));
    }
    ctx.warn(alert);
    Ok(())
}

fn moves_alert(kind: AlertKind, detail: &str) -> Result<Alert, PortError> {
    let message = match kind {
        AlertKind::Unspecified => "This pku has no moves, leaving every move slot empty.".to_string(),
        AlertKind::Invalid => format!("The moves {detail} are not supported by this format and were skipped."),
        AlertKind::TooLong => "This pku has more than 4 valid moves, only the first 4 were kept.".to_string(),
        kind => {
            return Err(PortError::UnsupportedAlert {
                tag: "Moves".to_string(),
                kind,
            });
        }
    };
    Ok(Alert::new("Moves", message))
}

fn pp_ups(ctx: &mut Pk3Session) -> Result<(), PortError> {
    let entries = ctx.source.array(&["Moves"]);
    let mut names = Vec::with_capacity(4);
    let mut sources = Vec::with_capacity(4);
    for slot in 0..4 {
        match ctx.work.moves.get(slot).and_then(|&i| entries.get(i)) {
            Some(entry) => {
                let name = entry.get("Name").and_then(Value::as_str).unwrap_or_default();
                names.push(name.to_string());
                sources.push(entry.get("PP Ups").map_or(SourceValue::Unspecified, int_value));
            }
            None => {
                names.push(format!("Move {}", slot + 1));
                sources.push(SourceValue::Valid(0));
            }
        }
    }

    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut slot = FieldSlot::new(&mut ctx.data, "PP Ups")?;
    let alert = tag::multi_numeric("PP Ups", &names, sources, &mut slot, 0, Unspecified::Silent)?;
    ctx.warn(alert);
    Ok(())
}

fn pp(ctx: &mut Pk3Session) -> Result<(), PortError> {
    for slot in 0..4 {
        let index = to_u16(ctx.data.get_element("Moves", slot)?)?;
        let ups = u8::try_from(ctx.data.get_element("PP Ups", slot)?).unwrap_or(0);
        let pp = dex::move_by_index(index).map_or(0, |m| dex::pp_with_ups(m.pp, ups));
        ctx.data.set_element("PP", slot, i128::from(pp))?;
    }
    Ok(())
}

fn friendship(ctx: &mut Pk3Session) -> Result<(), PortError> {
    let source = ctx.source.int(&["Friendship"]);
    let mut slot = FieldSlot::new(&mut ctx.data, "Friendship")?;
    let alert = tag::numeric("Friendship", source, &mut slot, 0, Unspecified::Alert)?;
    ctx.warn(alert);
    Ok(())
}

fn stat_block(
    ctx: &mut Pk3Session,
    name: &str,
    field: &str,
    names: &[&str],
    default: i128,
    unspecified: Unspecified,
) -> Result<(), PortError> {
    let sources = names.iter().map(|n| ctx.source.int(&[name, *n])).collect();
    let mut slot = FieldSlot::new(&mut ctx.data, field)?;
    let alert = tag::multi_numeric(name, names, sources, &mut slot, default, unspecified)?;
    ctx.warn(alert);
    Ok(())
}

fn evs(ctx: &mut Pk3Session) -> Result<(), PortError> {
    stat_block(ctx, "EVs", "EVs", &dex::GEN3_STATS, 0, Unspecified::Silent)
}

fn contest_stats(ctx: &mut Pk3Session) -> Result<(), PortError> {
    stat_block(ctx, "Contest Stats", "Contest Stats", &dex::CONTEST_STATS, 0, Unspecified::Silent)
}

fn pokerus(ctx: &mut Pk3Session) -> Result<(), PortError> {
    stat_block(ctx, "Pokérus", "Pokérus", &["Days", "Strain"], 0, Unspecified::Silent)
}

fn ivs(ctx: &mut Pk3Session) -> Result<(), PortError> {
    stat_block(ctx, "IVs", "IVs", &dex::GEN3_STATS, 0, Unspecified::Alert)
}

/* ------------------------------------
 * Catch info
 * ------------------------------------ */

fn met_level(ctx: &mut Pk3Session) -> Result<(), PortError> {
    let source = ctx.source.int(&["Catch Info", "Met Level"]);
    let mut slot = FieldSlot::new(&mut ctx.data, "Met Level")?;
    let alert = tag::numeric("Met Level", source, &mut slot, 0, Unspecified::Alert)?;
    ctx.warn(alert);
    Ok(())
}

fn ball(ctx: &mut Pk3Session) -> Result<(), PortError> {
    let source = ctx.source.string(&["Catch Info", "Ball"]);
    let lookup = |name: &str| dex::ball_index(name).map(|i| Encoding::Index(i.into()));
    let slot = IndexSlot::Field(FieldSlot::new(&mut ctx.data, "Ball")?);
    let alert = tag::indexed("Ball", source, slot, "Poké Ball", lookup, Unspecified::Alert)?;
    ctx.warn(alert);
    Ok(())
}

fn ot_gender(ctx: &mut Pk3Session) -> Result<(), PortError> {
    let source = ctx.source.string(&["Game Info", "Gender"]);
    let lookup = |name: &str| match Gender::parse(name) {
        Some(Gender::Male) => Some(Encoding::Index(0)),
        Some(Gender::Female) => Some(Encoding::Index(1)),
        _ => None,
    };
    let slot = IndexSlot::Field(FieldSlot::new(&mut ctx.data, "OT Gender")?);
    let alert = tag::indexed("OT Gender", source, slot, "Male", lookup, Unspecified::Silent)?;
    ctx.warn(alert);
    Ok(())
}

fn ability_slot(ctx: &mut Pk3Session) -> Result<(), PortError> {
    let slots = ctx.work.species()?.abilities;
    let first = slots.first().copied().unwrap_or("None");
    let source = ctx.source.string(&["Ability"]);

    let (second, alert) = match source {
        SourceValue::Unspecified => (
            false,
            Some(tag::index_alert("Ability", AlertKind::Unspecified, None, first)?),
        ),
        SourceValue::Invalid(raw) | SourceValue::Valid(raw) => match dex::ability_index(&raw) {
            Some(i) if i <= dex::LAST_GEN3_ABILITY => {
                let is_slot = |k: usize| slots.get(k).and_then(|a| dex::ability_index(a)) == Some(i);
                let alert = (!is_slot(0) && !is_slot(1)).then(|| {
                    Alert::new(
                        "Ability",
                        format!("This species cannot have the ability \"{raw}\", using the default: {first}."),
                    )
                });
                (is_slot(1), alert)
            }
            _ => (
                false,
                Some(tag::index_alert("Ability", AlertKind::Invalid, Some(&raw), first)?),
            ),
        },
    };

    ctx.data.set_bool("Ability Slot", second)?;
    ctx.warn(alert);
    Ok(())
}

fn ribbons(ctx: &mut Pk3Session) -> Result<(), PortError> {
    let names = ctx.source.strings(&["Ribbons"]).valid().unwrap_or_default();
    let has = |ribbon: &str| names.iter().any(|n| n.eq_ignore_ascii_case(ribbon));

    let mut backfilled = false;
    let mut ranks = [0i128; 5];
    for (rank, category) in ranks.iter_mut().zip(dex::CONTEST_CATEGORIES) {
        let owned = dex::contest_ribbons(category).map(|r| has(&r));
        let highest = owned.iter().rposition(|&o| o).map_or(0, |p| p + 1);
        backfilled |= owned[..highest].iter().any(|&o| !o);
        *rank = highest as i128;
    }
    ctx.data.set_array("Contest Ribbons", &ranks)?;

    let flags: Vec<i128> = dex::GEN3_RIBBONS.iter().map(|r| i128::from(has(*r))).collect();
    ctx.data.set_array("Ribbons", &flags)?;

    let unsupported: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|n| {
            !dex::GEN3_RIBBONS.iter().any(|r| r.eq_ignore_ascii_case(n))
                && !dex::CONTEST_CATEGORIES
                    .iter()
                    .any(|c| dex::contest_ribbons(c).iter().any(|r| r.eq_ignore_ascii_case(n)))
        })
        .collect();

    let mut alert = None;
    if !unsupported.is_empty() {
        alert = Some(Alert::new(
            "Ribbons",
            format!(
                "The ribbons {} are not supported by this format and were skipped.",
                unsupported.join(", ")
            ),
        ));
    }
    if backfilled {
        let note = Alert::new(
            "Ribbons",
            "This pku has a Gen 3 contest ribbon of some category with rank super or higher, \
             but doesn't have the ribbons below that rank. This is impossible in this format, \
             adding those ribbons.",
        );
        alert = pkport::alert::combine(alert, Some(note));
    }
    ctx.warn(alert);
    Ok(())
}

fn write_fateful(target: &mut BinaryTarget, fateful: bool) -> Result<(), PortError> {
    Ok(target.set_bool("Fateful Encounter", fateful)?)
}

/// Mew and Deoxys only obey in Gen 3 if met in a fateful encounter.
fn fateful_encounter(ctx: &mut Pk3Session) -> Result<(), PortError> {
    let species = ctx.work.species()?;
    let fateful = ctx.source.boolean(&["Catch Info", "Fateful Encounter"]).valid() == Some(true);

    let resolver = match species.dex {
        151 | 386 if !fateful => {
            let pkmn = species.name;
            let alert = ChoiceAlert::new(
                "Fateful Encounter",
                format!(
                    "This {pkmn} was not met in a fateful encounter. Note that, in the Gen 3 games, \
                     {pkmn} will only obey the player if it was met in a fateful encounter."
                ),
                vec![
                    Choice::new("Keep Fateful Encounter", format!("Fateful Encounter: false\n{pkmn} won't obey.")),
                    Choice::new("Set Fateful Encounter", format!("Fateful Encounter: true\n{pkmn} will obey.")),
                ],
            );
            ErrorResolver::new("Fateful Encounter", vec![false, true], Some(alert), write_fateful)?
        }
        _ => ErrorResolver::single("Fateful Encounter", fateful, write_fateful),
    };
    ctx.defer(resolver);
    Ok(())
}

/* ------------------------------------
 * Byte override and checksum
 * ------------------------------------ */

fn collect_byte_override(ctx: &mut Pk3Session) -> Result<(), PortError> {
    let (patches, alert) = overrides::collect(&ctx.source, FORMAT, ctx.data.layout().size());
    ctx.work.patches = patches;
    ctx.warn(alert);
    Ok(())
}

fn checksum(ctx: &mut Pk3Session) -> Result<(), PortError> {
    let sum = layout::checksum(ctx.data.bytes());
    ctx.data.set("Checksum", i128::from(sum))?;
    Ok(())
}

fn apply_byte_override(ctx: &mut Pk3Session) -> Result<(), PortError> {
    overrides::apply(&mut ctx.data, &ctx.work.patches)
}
