//! pkport: convert pku documents to and from game formats.
//!
//! ```bash
//! # pku → pk3, answering the PID question up front
//! pkport export bulbasaur.pku -f pk3 -o bulbasaur.pk3 --choice PID=0
//!
//! # pku → Showdown text on stdout
//! pkport export bulbasaur.pku -f showdown
//!
//! # pk3 → pku
//! pkport import bulbasaur.pk3 -o bulbasaur.pku
//! ```
//!
//! Warnings go to stderr. Choices not given with `--choice` are asked on
//! the terminal, or fail the conversion when stdin is not a terminal.

use std::{
    collections::HashMap,
    fs,
    io::{self, BufRead, IsTerminal, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use pkport::{
    alert::{AlertLog, ChoiceAlert},
    record::SemanticRecord,
    resolver::Chooser,
};
use pkport_formats::{Format, PortOptions, gen3};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pkport", author, version, about = "Convert pku documents to and from game formats")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON file with conversion options (`battle_stat_override`, `seed`).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level regardless of RUST_LOG.
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a pku document to a format.
    Export(ExportCmd),
    /// Convert a file of some format to a pku document.
    Import(ImportCmd),
}

#[derive(Args)]
struct ExportCmd {
    /// The pku (JSON) document.
    input: PathBuf,

    /// `pk3` or `showdown`.
    #[arg(long, short, default_value = "pk3")]
    format: Format,

    /// Where to write the result. Defaults to stdout.
    #[arg(long, short, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Answer a choice ahead of time, e.g. `PID=1`. Repeatable.
    #[arg(long = "choice", value_name = "TITLE=INDEX", value_parser = parse_choice)]
    choices: Vec<(String, usize)>,

    /// Print every field of an exported pk3 to stderr.
    #[arg(long)]
    dump: bool,
}

#[derive(Args)]
struct ImportCmd {
    /// The file to read.
    input: PathBuf,

    #[arg(long, short, default_value = "pk3")]
    format: Format,

    /// Where to write the pku document. Defaults to stdout.
    #[arg(long, short, value_name = "PATH")]
    output: Option<PathBuf>,
}

fn parse_choice(s: &str) -> Result<(String, usize)> {
    let (title, index) = s
        .rsplit_once('=')
        .ok_or_else(|| anyhow!("expected TITLE=INDEX, got `{s}`"))?;
    let index = index
        .trim()
        .parse()
        .with_context(|| format!("`{index}` is not a choice index"))?;
    Ok((title.trim().to_string(), index))
}

/// Answers choices from `--choice`, then from the terminal if there is one.
struct CliChooser {
    preset: HashMap<String, usize>,
    interactive: bool,
}

impl CliChooser {
    fn ask(&self, alert: &ChoiceAlert) -> io::Result<Option<usize>> {
        let mut stderr = io::stderr().lock();
        writeln!(stderr, "\n{}: {}", alert.title(), alert.alert.message())?;
        for (i, choice) in alert.choices.iter().enumerate() {
            writeln!(stderr, "  [{i}] {}", choice.name)?;
            for line in choice.description.lines() {
                writeln!(stderr, "      {line}")?;
            }
        }
        write!(stderr, "choice> ")?;
        stderr.flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim().parse().ok().filter(|&i| i < alert.choices.len()))
    }
}

impl Chooser for CliChooser {
    fn choose(&mut self, alert: &ChoiceAlert) -> Option<usize> {
        if let Some(&index) = self.preset.get(&alert.title()) {
            debug!(title = %alert.title(), index, "using preset choice");
            return Some(index);
        }
        if !self.interactive {
            return None;
        }
        self.ask(alert).ok().flatten()
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_options(path: Option<&Path>) -> Result<PortOptions> {
    let Some(path) = path else {
        return Ok(PortOptions::default());
    };
    let json = fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    PortOptions::from_json(&json).with_context(|| format!("parsing config {}", path.display()))
}

fn print_warnings(warnings: &AlertLog) {
    for alert in warnings.iter() {
        eprintln!("warning [{}]: {}", alert.title(), alert.message());
    }
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => fs::write(path, bytes).with_context(|| format!("writing {}", path.display())),
        None => io::stdout().lock().write_all(bytes).context("writing to stdout"),
    }
}

fn export(cmd: ExportCmd, options: &PortOptions) -> Result<()> {
    let json = fs::read_to_string(&cmd.input).with_context(|| format!("reading {}", cmd.input.display()))?;
    let record = SemanticRecord::from_json(&json).with_context(|| format!("parsing {}", cmd.input.display()))?;

    let mut chooser = CliChooser {
        preset: cmd.choices.into_iter().collect(),
        interactive: io::stdin().is_terminal(),
    };
    let exported = pkport_formats::export(cmd.format, record, options, &mut chooser)
        .with_context(|| format!("exporting {} to {}", cmd.input.display(), cmd.format))?;
    print_warnings(&exported.warnings);
    info!(format = %cmd.format, bytes = exported.bytes.len(), "exported");

    if cmd.dump {
        if cmd.format != Format::Pk3 {
            bail!("--dump only applies to pk3 exports");
        }
        let fields = gen3::layout::layout()?.parse(&exported.bytes)?;
        eprintln!("{}", serde_json::to_string_pretty(&fields)?);
    }

    write_output(cmd.output.as_deref(), &exported.bytes)
}

fn import(cmd: ImportCmd) -> Result<()> {
    let bytes = fs::read(&cmd.input).with_context(|| format!("reading {}", cmd.input.display()))?;
    let imported = pkport_formats::import(cmd.format, &bytes)
        .with_context(|| format!("importing {} as {}", cmd.input.display(), cmd.format))?;
    print_warnings(&imported.warnings);

    let mut json = serde_json::to_string_pretty(&imported.record.into_value())?;
    json.push('\n');
    write_output(cmd.output.as_deref(), json.as_bytes())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let options = load_options(cli.config.as_deref())?;

    match cli.command {
        Command::Export(cmd) => export(cmd, &options),
        Command::Import(cmd) => import(cmd),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("PID=1").unwrap(), ("PID".to_string(), 1));
        assert_eq!(
            parse_choice("Fateful Encounter = 0").unwrap(),
            ("Fateful Encounter".to_string(), 0)
        );
        assert!(parse_choice("PID").is_err());
        assert!(parse_choice("PID=x").is_err());
    }

    #[test]
    fn test_preset_choices_answer_without_a_terminal() {
        let mut chooser = CliChooser {
            preset: HashMap::from([("EXP".to_string(), 1)]),
            interactive: false,
        };
        let alert = |title: &str| ChoiceAlert::new(title, "", vec![]);
        assert_eq!(chooser.choose(&alert("EXP")), Some(1));
        assert_eq!(chooser.choose(&alert("PID")), None);
    }
}
