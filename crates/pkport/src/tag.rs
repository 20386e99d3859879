//! Tag processing primitives.
//!
//! Each primitive reads one semantic value, applies the usual policy and
//! writes the result to a slot:
//! - unspecified: write the default, alert unless the policy is [Unspecified::Silent]
//! - out of bounds: clamp, alert with the direction and the bound
//! - invalid: write the default, alert with the rejected value
//! - valid: write as-is, no alert
//!
//! Every primitive returns at most one [Alert] for its tag.

use crate::{
    alert::{Alert, AlertKind, combine},
    errors::{PortError, StoreError},
    record::SourceValue,
    target::BinaryTarget,
};

/// What to do when a source value is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unspecified {
    /// Write the default and say so.
    #[default]
    Alert,
    /// Write the default quietly.
    Silent,
}

/// A destination for one bounded integer.
pub trait NumericSlot {
    /// Inclusive range the slot accepts.
    fn bounds(&self) -> (i128, i128);
    fn write(&mut self, value: i128) -> Result<(), PortError>;
}

/// A destination for a fixed number of bounded integers.
pub trait NumericArraySlot {
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Inclusive range every element accepts.
    fn bounds(&self) -> (i128, i128);
    fn write(&mut self, index: usize, value: i128) -> Result<(), PortError>;
}

/// A named field of a [BinaryTarget].
pub struct FieldSlot<'a> {
    target: &'a mut BinaryTarget,
    field: &'a str,
    bounds: (i128, i128),
    len: usize,
}

impl<'a> FieldSlot<'a> {
    pub fn new(target: &'a mut BinaryTarget, field: &'a str) -> Result<Self, PortError> {
        let (bounds, len) = {
            let f = target.field(field)?;
            (f.range(), f.count())
        };

        Ok(Self {
            target,
            field,
            bounds,
            len,
        })
    }
}

impl NumericSlot for FieldSlot<'_> {
    fn bounds(&self) -> (i128, i128) {
        self.bounds
    }

    fn write(&mut self, value: i128) -> Result<(), PortError> {
        Ok(self.target.set(self.field, value)?)
    }
}

impl NumericArraySlot for FieldSlot<'_> {
    fn len(&self) -> usize {
        self.len
    }

    fn bounds(&self) -> (i128, i128) {
        self.bounds
    }

    fn write(&mut self, index: usize, value: i128) -> Result<(), PortError> {
        Ok(self.target.set_element(self.field, index, value)?)
    }
}

/// A plain integer with explicit bounds, for text formats.
pub struct ValueSlot<'a> {
    value: &'a mut i128,
    bounds: (i128, i128),
}

impl<'a> ValueSlot<'a> {
    pub fn new(value: &'a mut i128, min: i128, max: i128) -> Self {
        Self {
            value,
            bounds: (min, max),
        }
    }
}

impl NumericSlot for ValueSlot<'_> {
    fn bounds(&self) -> (i128, i128) {
        self.bounds
    }

    fn write(&mut self, value: i128) -> Result<(), PortError> {
        let (min, max) = self.bounds;
        if value < min || value > max {
            return Err(StoreError::OutOfRange { value, min, max }.into());
        }
        *self.value = value;
        Ok(())
    }
}

/// A flag stored as a `bool`.
pub struct FlagSlot<'a>(pub &'a mut bool);

impl NumericSlot for FlagSlot<'_> {
    fn bounds(&self) -> (i128, i128) {
        (0, 1)
    }

    fn write(&mut self, value: i128) -> Result<(), PortError> {
        *self.0 = value != 0;
        Ok(())
    }
}

/// A slice of plain integers sharing one set of bounds.
pub struct ArraySlot<'a> {
    values: &'a mut [i128],
    bounds: (i128, i128),
}

impl<'a> ArraySlot<'a> {
    pub fn new(values: &'a mut [i128], min: i128, max: i128) -> Self {
        Self {
            values,
            bounds: (min, max),
        }
    }
}

impl NumericArraySlot for ArraySlot<'_> {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn bounds(&self) -> (i128, i128) {
        self.bounds
    }

    fn write(&mut self, index: usize, value: i128) -> Result<(), PortError> {
        let (min, max) = self.bounds;
        if value < min || value > max {
            return Err(StoreError::OutOfRange { value, min, max }.into());
        }
        let len = self.values.len();
        let slot = self
            .values
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfBounds {
                field: format!("<{len} values>"),
                index,
            })?;
        *slot = value;
        Ok(())
    }
}

/// Clamps `value` into `min..=max`, reporting which bound was hit.
pub fn clamp(value: i128, min: i128, max: i128) -> (i128, Option<AlertKind>) {
    if value > max {
        (max, Some(AlertKind::Overflow))
    } else if value < min {
        (min, Some(AlertKind::Underflow))
    } else {
        (value, None)
    }
}

/// Ports a single integer tag.
pub fn numeric(
    tag: &str,
    source: SourceValue<i128>,
    slot: &mut impl NumericSlot,
    default: i128,
    unspecified: Unspecified,
) -> Result<Option<Alert>, PortError> {
    let bounds = slot.bounds();
    let (value, kind, raw) = match source {
        SourceValue::Unspecified => (default, Some(AlertKind::Unspecified), None),
        SourceValue::Invalid(raw) => (default, Some(AlertKind::Invalid), Some(raw)),
        SourceValue::Valid(v) => {
            let (v, kind) = clamp(v, bounds.0, bounds.1);
            (v, kind, None)
        }
    };
    slot.write(value)?;

    match kind {
        None => Ok(None),
        Some(AlertKind::Unspecified) if unspecified == Unspecified::Silent => Ok(None),
        Some(kind) => numeric_alert(tag, kind, raw.as_deref(), bounds, default).map(Some),
    }
}

/// The alert for a single integer tag.
pub fn numeric_alert(
    tag: &str,
    kind: AlertKind,
    raw: Option<&str>,
    (min, max): (i128, i128),
    default: i128,
) -> Result<Alert, PortError> {
    let message = match kind {
        AlertKind::Overflow => format!("The {tag} tag was too high. Rounding it down to {max}."),
        AlertKind::Underflow => format!("The {tag} tag was too low. Rounding it up to {min}."),
        AlertKind::Unspecified => format!("No {tag} was specified, setting it to {default}."),
        AlertKind::Invalid => format!(
            "The {tag} \"{}\" is not a whole number, setting it to {default}.",
            raw.unwrap_or_default()
        ),
        kind => return Err(unsupported(tag, kind)),
    };

    Ok(Alert::new(tag, message))
}

/// Ports a tag made of several named integers, e.g. the six IVs.
///
/// Each element is classified on its own, but the tag produces at most one
/// alert, with the sub-tags grouped by what happened to them.
pub fn multi_numeric(
    tag: &str,
    names: &[&str],
    sources: Vec<SourceValue<i128>>,
    slot: &mut impl NumericArraySlot,
    default: i128,
    unspecified: Unspecified,
) -> Result<Option<Alert>, PortError> {
    if names.len() != sources.len() || slot.len() != sources.len() {
        return Err(PortError::SubtagMismatch {
            tag: tag.to_string(),
            names: names.len(),
            values: sources.len(),
        });
    }

    let bounds = slot.bounds();
    let mut kinds = Vec::with_capacity(sources.len());
    // Invalid sub-tags are reported with the text they held.
    let mut labels: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    for (i, source) in sources.into_iter().enumerate() {
        let (value, kind) = match source {
            SourceValue::Unspecified => (default, Some(AlertKind::Unspecified)),
            SourceValue::Invalid(raw) => {
                labels[i] = format!("{} (\"{raw}\")", names[i]);
                (default, Some(AlertKind::Invalid))
            }
            SourceValue::Valid(v) => clamp(v, bounds.0, bounds.1),
        };
        slot.write(i, value)?;
        kinds.push(kind);
    }

    let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
    multi_numeric_alert(tag, &labels, &kinds, bounds, default, unspecified)
}

/// The single alert for a multi-value tag, or `None` if nothing happened.
pub fn multi_numeric_alert(
    tag: &str,
    names: &[&str],
    kinds: &[Option<AlertKind>],
    (min, max): (i128, i128),
    default: i128,
    unspecified: Unspecified,
) -> Result<Option<Alert>, PortError> {
    if names.len() != kinds.len() {
        return Err(PortError::SubtagMismatch {
            tag: tag.to_string(),
            names: names.len(),
            values: kinds.len(),
        });
    }

    if !kinds.is_empty() && kinds.iter().all(|k| *k == Some(AlertKind::Unspecified)) {
        return Ok(match unspecified {
            Unspecified::Alert => Some(Alert::new(
                tag,
                format!("No {tag} were specified, setting them all to {default}."),
            )),
            Unspecified::Silent => None,
        });
    }

    let mut overflow = Vec::new();
    let mut underflow = Vec::new();
    let mut invalid = Vec::new();
    let mut missing = Vec::new();
    for (&name, kind) in names.iter().zip(kinds) {
        match kind {
            None => {}
            Some(AlertKind::Overflow) => overflow.push(name),
            Some(AlertKind::Underflow) => underflow.push(name),
            Some(AlertKind::Invalid) => invalid.push(name),
            Some(AlertKind::Unspecified) => {
                if unspecified == Unspecified::Alert {
                    missing.push(name);
                }
            }
            Some(kind) => return Err(unsupported(tag, *kind)),
        }
    }

    let paragraphs = [
        (overflow, format!("were too high. Rounding them down to {max}.")),
        (underflow, format!("were too low. Rounding them up to {min}.")),
        (invalid, format!("were not whole numbers. Setting them to {default}.")),
        (missing, format!("were unspecified. Setting them to {default}.")),
    ];

    let alert = paragraphs
        .into_iter()
        .filter(|(names, _)| !names.is_empty())
        .map(|(names, rest)| Alert::new(tag, format!("The {} tag(s) {rest}", names.join(", "))))
        .reduce(Alert::merge);

    Ok(alert)
}

/// How an indexed value is stored by a format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoding {
    /// A numeric index, e.g. an item number.
    Index(i128),
    /// A display string, e.g. a Showdown item name.
    Name(String),
}

/// Where an indexed value is written.
pub enum IndexSlot<'a> {
    Field(FieldSlot<'a>),
    /// An empty string means "none".
    Name(&'a mut String),
}

fn write_encoding(tag: &str, slot: IndexSlot<'_>, encoding: Encoding) -> Result<(), PortError> {
    match (slot, encoding) {
        (IndexSlot::Field(mut field), Encoding::Index(i)) => NumericSlot::write(&mut field, i),
        (IndexSlot::Name(name), Encoding::Name(s)) => {
            *name = s;
            Ok(())
        }
        _ => Err(PortError::RepresentationMismatch(tag.to_string())),
    }
}

/// Ports a tag whose value comes from a lookup table, e.g. an item or a ball.
///
/// `lookup` maps a display name to the format's encoding; `None` means the
/// format does not know the value. The default must be in the table.
pub fn indexed(
    tag: &str,
    source: SourceValue<String>,
    slot: IndexSlot<'_>,
    default: &str,
    lookup: impl Fn(&str) -> Option<Encoding>,
    unspecified: Unspecified,
) -> Result<Option<Alert>, PortError> {
    let found = match &source {
        SourceValue::Valid(name) => lookup(name),
        _ => None,
    };

    let (encoding, kind, raw) = match (found, source) {
        (Some(encoding), _) => (encoding, None, None),
        (None, SourceValue::Valid(raw) | SourceValue::Invalid(raw)) => {
            (default_encoding(tag, default, &lookup)?, Some(AlertKind::Invalid), Some(raw))
        }
        (None, SourceValue::Unspecified) => (
            default_encoding(tag, default, &lookup)?,
            Some(AlertKind::Unspecified),
            None,
        ),
    };
    write_encoding(tag, slot, encoding)?;

    match kind {
        None => Ok(None),
        Some(AlertKind::Unspecified) if unspecified == Unspecified::Silent => Ok(None),
        Some(kind) => index_alert(tag, kind, raw.as_deref(), default).map(Some),
    }
}

fn default_encoding(
    tag: &str,
    default: &str,
    lookup: &impl Fn(&str) -> Option<Encoding>,
) -> Result<Encoding, PortError> {
    lookup(default).ok_or_else(|| PortError::UnresolvableDefault {
        tag: tag.to_string(),
        default: default.to_string(),
    })
}

/// The alert for an indexed tag.
pub fn index_alert(
    tag: &str,
    kind: AlertKind,
    raw: Option<&str>,
    default: &str,
) -> Result<Alert, PortError> {
    let lower = tag.to_lowercase();
    let message = match kind {
        AlertKind::Unspecified => {
            format!("No {lower} was specified, using the default: {default}.")
        }
        AlertKind::Invalid => format!(
            "The {lower} \"{}\" is not supported by this format, using the default: {default}.",
            raw.unwrap_or_default()
        ),
        kind => return Err(unsupported(tag, kind)),
    };

    Ok(Alert::new(tag, message))
}

/// Ports a true/false tag.
pub fn boolean(
    tag: &str,
    source: SourceValue<bool>,
    slot: &mut impl NumericSlot,
    default: bool,
    unspecified: Unspecified,
) -> Result<Option<Alert>, PortError> {
    let (value, kind, raw) = match source {
        SourceValue::Valid(b) => (b, None, None),
        SourceValue::Invalid(raw) => (default, Some(AlertKind::Invalid), Some(raw)),
        SourceValue::Unspecified => (default, Some(AlertKind::Unspecified), None),
    };
    slot.write(i128::from(value))?;

    match kind {
        None => Ok(None),
        Some(AlertKind::Unspecified) if unspecified == Unspecified::Silent => Ok(None),
        Some(kind) => boolean_alert(tag, kind, raw.as_deref(), default).map(Some),
    }
}

/// The alert for a true/false tag.
pub fn boolean_alert(
    tag: &str,
    kind: AlertKind,
    raw: Option<&str>,
    default: bool,
) -> Result<Alert, PortError> {
    let message = match kind {
        AlertKind::Unspecified => format!("No {tag} was specified, setting it to {default}."),
        AlertKind::Invalid => format!(
            "The {tag} \"{}\" is not true or false, setting it to {default}.",
            raw.unwrap_or_default()
        ),
        kind => return Err(unsupported(tag, kind)),
    };

    Ok(Alert::new(tag, message))
}

/// A single-byte character set.
pub trait TextCodec {
    fn encode(&self, c: char) -> Option<u8>;
    fn decode(&self, byte: u8) -> Option<char>;
    /// Ends a string and pads the rest of its field.
    fn terminator(&self) -> u8;

    /// Decodes up to the first terminator, skipping unknown bytes.
    fn decode_str(&self, bytes: &[u8]) -> String {
        bytes
            .iter()
            .take_while(|&&b| b != self.terminator())
            .filter_map(|&b| self.decode(b))
            .collect()
    }
}

/// Ports a string tag through `codec` into a fixed-length character array.
///
/// Characters the codec cannot encode are dropped, text longer than the
/// slot is truncated and the remainder is padded with the terminator.
pub fn string(
    tag: &str,
    source: SourceValue<String>,
    slot: &mut impl NumericArraySlot,
    codec: &impl TextCodec,
    default: &str,
    unspecified: Unspecified,
) -> Result<Option<Alert>, PortError> {
    let (text, mut alert) = match source {
        SourceValue::Valid(text) => (text, None),
        SourceValue::Invalid(raw) => {
            let alert = string_alert(tag, AlertKind::Casted, &raw)?;
            (raw, Some(alert))
        }
        SourceValue::Unspecified => {
            let alert = match unspecified {
                Unspecified::Alert => Some(string_alert(tag, AlertKind::Unspecified, default)?),
                Unspecified::Silent => None,
            };
            (default.to_string(), alert)
        }
    };

    let mut encoded = Vec::with_capacity(text.len());
    let mut rejected = String::new();
    for c in text.chars() {
        match codec.encode(c) {
            Some(byte) => encoded.push(byte),
            None if !rejected.contains(c) => rejected.push(c),
            None => {}
        }
    }
    if !rejected.is_empty() {
        alert = combine(alert, Some(string_alert(tag, AlertKind::Invalid, &rejected)?));
    }

    let max = slot.len();
    if encoded.len() > max {
        encoded.truncate(max);
        alert = combine(
            alert,
            Some(string_alert(tag, AlertKind::TooLong, &max.to_string())?),
        );
    }

    for i in 0..max {
        let byte = encoded.get(i).copied().unwrap_or(codec.terminator());
        slot.write(i, i128::from(byte))?;
    }

    Ok(alert)
}

/// The alert for a string tag. `detail` is the default, the rejected
/// characters, the maximum length or the raw value depending on `kind`.
pub fn string_alert(tag: &str, kind: AlertKind, detail: &str) -> Result<Alert, PortError> {
    let message = match kind {
        AlertKind::Unspecified if detail.is_empty() => {
            format!("No {tag} was specified, leaving it blank.")
        }
        AlertKind::Unspecified => {
            format!("No {tag} was specified, using the default: \"{detail}\".")
        }
        AlertKind::Invalid => format!(
            "The {tag} contained characters this format cannot store (\"{detail}\"). They were removed."
        ),
        AlertKind::TooLong => {
            format!("The {tag} was too long. Truncating it to {detail} characters.")
        }
        AlertKind::Casted => format!("The {tag} was not text, reading it as \"{detail}\"."),
        kind => return Err(unsupported(tag, kind)),
    };

    Ok(Alert::new(tag, message))
}

fn unsupported(tag: &str, kind: AlertKind) -> PortError {
    PortError::UnsupportedAlert {
        tag: tag.to_string(),
        kind,
    }
}
