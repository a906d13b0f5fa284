use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use temporal_adapter::{
    AdapterOptions, DateValue, FormatKey, Input, NativeDate, TemporalAdapter, TemporalValue,
    Variant,
};
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser)]
#[command(
    name = "temporal-adapter",
    version,
    about = "Parse, format and lay out dates"
)]
struct Cli {
    /// BCP-47 locale tag (default: en-US)
    #[arg(long, global = true)]
    locale: Option<String>,

    /// Kind of value to produce: date, date-time or time
    #[arg(long, global = true)]
    variant: Option<Variant>,

    /// IANA time zone for local conversions (default: system zone)
    #[arg(long, global = true)]
    time_zone: Option<String>,

    /// TOML file with adapter options; flags take precedence
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Strictly parse TEXT against PATTERN
    Parse { text: String, pattern: String },
    /// Render INPUT with a pattern, a named format or the variant default
    Format {
        input: String,
        pattern: Option<String>,
        /// Named format such as keyboardDate or fullDateTime12h
        #[arg(long, conflicts_with = "pattern")]
        key: Option<FormatKey>,
        /// Prefer the 12-hour default format
        #[arg(long)]
        ampm: bool,
    },
    /// Print the month grid containing INPUT
    Calendar {
        #[arg(default_value = "now")]
        input: String,
    },
    /// List the first day of every year from START through END
    Years { start: String, end: String },
    /// Print the short weekday names in locale order
    Weekdays,
}

const HELP: &str = "\
commands:
  parse <text> | <pattern>     strict parse
  format <input> [| <pattern>] render an input
  calendar [input]             month grid
  years <start> | <end>        year starts in range
  weekdays                     weekday names
  valid <input>                validity check
  date <input>                 normalize an input
inputs: now, null, @<epoch millis>, or any date text";

/// `now` and the empty string stand for "no argument", `null` for no date,
/// `@<millis>` for a native instant.
fn raw_input(arg: &str) -> Input {
    match arg.trim() {
        "" | "now" => Input::Undefined,
        "null" => Input::Null,
        s => match s.strip_prefix('@').map(str::parse::<f64>) {
            Some(Ok(ms)) => Input::Native(NativeDate::from_millis(ms)),
            _ => Input::Text(s.to_string()),
        },
    }
}

fn describe(value: Option<&DateValue>) -> String {
    match value {
        None => "null".to_string(),
        Some(Ok(v)) => v.to_string(),
        Some(Err(e)) => format!("parse error: {e}"),
    }
}

fn build_adapter(cli: &Cli) -> Result<TemporalAdapter> {
    let mut options = match &cli.config {
        Some(path) => AdapterOptions::load(path)?,
        None => AdapterOptions::default(),
    };
    if let Some(locale) = &cli.locale {
        options.locale = Some(locale.clone());
    }
    if let Some(variant) = cli.variant {
        options.variant = variant;
    }
    if let Some(zone) = &cli.time_zone {
        options.time_zone = Some(zone.clone());
    }
    if options.locale.is_none() {
        options.locale = Some("en-US".to_string());
    }
    Ok(TemporalAdapter::from_options(&options)?)
}

fn require(adapter: &TemporalAdapter, arg: &str) -> Result<TemporalValue> {
    match adapter.date(raw_input(arg))? {
        Some(Ok(value)) => Ok(value),
        Some(Err(e)) => Err(e.into()),
        None => bail!("'{arg}' is not a date"),
    }
}

fn parse_cmd(adapter: &TemporalAdapter, text: &str, pattern: &str) -> Result<String> {
    Ok(describe(adapter.parse(text, pattern)?.as_ref()))
}

fn format_cmd(
    adapter: &TemporalAdapter,
    input: &str,
    pattern: Option<&str>,
    key: Option<FormatKey>,
    ampm: bool,
) -> Result<String> {
    let input = raw_input(input);
    let text = match (pattern, key) {
        (Some(pattern), _) => adapter.format(input, pattern)?,
        (None, Some(key)) => adapter.format_key(input, key)?,
        (None, None) => adapter.format(input, adapter.default_format(ampm))?,
    };
    Ok(text)
}

fn calendar_cmd(adapter: &TemporalAdapter, input: &str) -> Result<String> {
    let value = require(adapter, input)?;
    let mut out = String::new();
    writeln!(out, "{:^28}", adapter.get_calendar_header_text(value)?)?;
    for name in adapter.get_weekdays()? {
        write!(out, "{name:>4}")?;
    }
    for week in adapter.get_week_array(value)? {
        out.push('\n');
        for day in week {
            if adapter.is_same_month(day, value)? {
                write!(out, "{:>4}", adapter.get_day_text(day)?)?;
            } else {
                out.push_str("   .");
            }
        }
    }
    Ok(out)
}

fn years_cmd(adapter: &TemporalAdapter, start: &str, end: &str) -> Result<String> {
    let years = adapter.get_year_range(require(adapter, start)?, require(adapter, end)?)?;
    let texts = years
        .into_iter()
        .map(|year| adapter.get_year_text(year))
        .collect::<temporal_adapter::Result<Vec<_>>>()?;
    Ok(texts.join(" "))
}

fn weekdays_cmd(adapter: &TemporalAdapter) -> Result<String> {
    Ok(adapter.get_weekdays()?.join(" "))
}

fn split_pair(rest: &str) -> Result<(&str, &str)> {
    rest.split_once('|')
        .map(|(a, b)| (a.trim(), b.trim()))
        .context("expected two arguments separated by '|'")
}

fn eval_line(adapter: &TemporalAdapter, line: &str) -> Result<String> {
    let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    match command {
        "parse" => {
            let (text, pattern) = split_pair(rest)?;
            parse_cmd(adapter, text, pattern)
        }
        "format" => match rest.split_once('|') {
            Some((input, pattern)) => format_cmd(adapter, input, Some(pattern.trim()), None, false),
            None => format_cmd(adapter, rest, None, None, false),
        },
        "calendar" => calendar_cmd(adapter, rest),
        "years" => {
            let (start, end) = split_pair(rest)?;
            years_cmd(adapter, start, end)
        }
        "weekdays" => weekdays_cmd(adapter),
        "valid" => Ok(adapter.is_valid(raw_input(rest))?.to_string()),
        "date" => Ok(describe(adapter.date(raw_input(rest))?.as_ref())),
        "help" => Ok(HELP.to_string()),
        other => bail!("unknown command '{other}', try 'help'"),
    }
}

fn run_repl(adapter: &TemporalAdapter) -> ExitCode {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("temporal-adapter v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'help' for commands. Press Ctrl-D to exit.");

    loop {
        print!("> ");
        if stdout.flush().is_err() {
            break;
        }

        let mut line = String::new();
        let read_result = stdin.lock().read_line(&mut line);

        match read_result {
            Ok(0) => break,
            Ok(_) => {
                let trimmed = line.trim();
                if matches!(trimmed, "quit" | "exit") {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                match eval_line(adapter, trimmed) {
                    Ok(output) => println!("{output}"),
                    Err(e) => eprintln!("Error: {e:#}"),
                }
            }
            Err(e) => {
                eprintln!("Read error: {e}");
                return ExitCode::from(1);
            }
        }
    }

    println!();
    ExitCode::SUCCESS
}

fn run(cli: Cli) -> Result<ExitCode> {
    let adapter = build_adapter(&cli)?;
    let output = match &cli.command {
        None => return Ok(run_repl(&adapter)),
        Some(Command::Parse { text, pattern }) => parse_cmd(&adapter, text, pattern)?,
        Some(Command::Format {
            input,
            pattern,
            key,
            ampm,
        }) => format_cmd(&adapter, input, pattern.as_deref(), *key, *ampm)?,
        Some(Command::Calendar { input }) => calendar_cmd(&adapter, input)?,
        Some(Command::Years { start, end }) => years_cmd(&adapter, start, end)?,
        Some(Command::Weekdays) => weekdays_cmd(&adapter)?,
    };
    println!("{output}");
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}
