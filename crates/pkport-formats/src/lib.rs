//! # pkport-formats
//!
//! The formats pkport converts between: Gen 3 `pk3` files (both ways) and
//! Showdown team text (export only), plus the lookup tables they share.
//!
//! Exports that need a decision (a PID that contradicts the other tags, an
//! EXP that contradicts the level) ask the [Chooser] passed in.

use std::{fmt, str::FromStr};

use pkport::{
    alert::AlertLog,
    errors::PortError,
    record::SemanticRecord,
    resolver::Chooser,
};
use thiserror::Error;

pub mod dex;
pub mod gen3;
pub mod meta;
pub mod options;
pub mod showdown;

pub use options::PortOptions;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("unknown format `{0}`, expected `pk3` or `showdown`")]
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Pk3,
    Showdown,
}

impl Format {
    pub fn name(self) -> &'static str {
        match self {
            Format::Pk3 => gen3::layout::FORMAT,
            Format::Showdown => showdown::FORMAT,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pk3" | "gen3" => Ok(Format::Pk3),
            "showdown" | "txt" => Ok(Format::Showdown),
            _ => Err(FormatError::Unknown(s.to_string())),
        }
    }
}

/// A finished export: the file contents and what was lost on the way.
#[derive(Debug)]
pub struct Exported {
    pub bytes: Vec<u8>,
    pub warnings: AlertLog,
}

/// Exports `record` to `format`, putting any pending choice to `chooser`.
pub fn export(
    format: Format,
    record: SemanticRecord,
    options: &PortOptions,
    chooser: &mut dyn Chooser,
) -> Result<Exported, PortError> {
    match format {
        Format::Pk3 => {
            let finished = gen3::exporter::start(record, options)?.finish(chooser)?;
            Ok(Exported {
                bytes: finished.data.into_bytes(),
                warnings: finished.warnings,
            })
        }
        Format::Showdown => {
            let finished = showdown::export(record, options)?;
            Ok(Exported {
                bytes: finished.data.to_string().into_bytes(),
                warnings: finished.warnings,
            })
        }
    }
}

/// A finished import.
#[derive(Debug)]
pub struct Imported {
    pub record: SemanticRecord,
    pub warnings: AlertLog,
}

pub fn import(format: Format, bytes: &[u8]) -> Result<Imported, PortError> {
    match format {
        Format::Pk3 => {
            let finished = gen3::importer::import(bytes)?;
            Ok(Imported {
                record: finished.data,
                warnings: finished.warnings,
            })
        }
        Format::Showdown => Err(PortError::Format(
            "Showdown sets can only be exported".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names() {
        assert_eq!("PK3".parse::<Format>().unwrap(), Format::Pk3);
        assert_eq!("showdown".parse::<Format>().unwrap(), Format::Showdown);
        assert!("pk9".parse::<Format>().is_err());
        assert_eq!(Format::Showdown.to_string(), "Showdown");
    }

    #[test]
    fn test_showdown_cannot_be_imported() {
        assert!(matches!(import(Format::Showdown, b""), Err(PortError::Format(_))));
    }
}
