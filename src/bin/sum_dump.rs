use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use indoc::indoc;
use log::{LevelFilter, info, warn};
use serde_json::json;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use fim_sum::identity::PlatformResolver;
use fim_sum::{Decoded, EventProjector, FieldLabels, SumMessage, decode_message, resolve_names};

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::exit;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SumOutputFormat {
    Json,
    Jsonl,
    Record,
}

struct SumDump {
    /// `None` reads from stdin.
    input: Option<PathBuf>,
    output_target: Option<PathBuf>,
    output_format: SumOutputFormat,
    labels: FieldLabels,
    skip_malformed: bool,
    resolve_names: bool,
    verbosity_level: Option<LevelFilter>,
}

impl SumDump {
    pub fn from_cli_matches(matches: &ArgMatches) -> Result<Self> {
        let input = match matches.get_one::<String>("INPUT").map(String::as_str) {
            None | Some("-") => None,
            Some(path) => Some(PathBuf::from(path)),
        };

        let output_format = match matches
            .get_one::<String>("output-format")
            .map(String::as_str)
        {
            Some("jsonl") => SumOutputFormat::Jsonl,
            Some("record") => SumOutputFormat::Record,
            _ => SumOutputFormat::Json,
        };

        let labels = match matches.get_one::<String>("labels") {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read labels file `{path}`"))?;
                FieldLabels::from_json_str(&text)
                    .with_context(|| format!("invalid labels file `{path}`"))?
            }
            None => FieldLabels::default(),
        };

        let verbosity_level = match matches.get_count("verbose") {
            0 => None,
            1 => Some(LevelFilter::Info),
            2 => Some(LevelFilter::Debug),
            3 => Some(LevelFilter::Trace),
            _ => {
                eprintln!("using more than  -vvv does not affect verbosity level");
                Some(LevelFilter::Trace)
            }
        };

        Ok(SumDump {
            input,
            output_target: matches.get_one::<String>("output-target").map(PathBuf::from),
            output_format,
            labels,
            skip_malformed: matches.get_flag("skip-malformed"),
            resolve_names: matches.get_flag("resolve-names"),
            verbosity_level,
        })
    }

    /// Main entry point for `SumDump`
    pub fn run(&self) -> Result<()> {
        self.try_to_initialize_logging();

        let reader: Box<dyn BufRead> = match &self.input {
            Some(path) => Box::new(BufReader::new(
                File::open(path)
                    .with_context(|| format!("failed to open input `{}`", path.display()))?,
            )),
            None => Box::new(BufReader::new(io::stdin())),
        };

        let mut output: Box<dyn Write> = match &self.output_target {
            Some(path) => Box::new(BufWriter::new(create_output_file(path)?)),
            None => Box::new(BufWriter::new(io::stdout())),
        };

        let projector = EventProjector::new(&self.labels);
        let mut skipped = 0_usize;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.context("failed to read input")?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }

            let message = match decode_message(line) {
                Ok(message) => message,
                Err(e) if self.skip_malformed => {
                    warn!("skipping line {}: {}", line_no + 1, e);
                    skipped += 1;
                    continue;
                }
                Err(e) => bail!("line {}: {}", line_no + 1, e),
            };

            self.dump_message(&mut output, &projector, message)
                .with_context(|| format!("line {}", line_no + 1))?;
        }

        output.flush().context("failed to flush output")?;

        if skipped > 0 {
            info!("skipped {skipped} malformed lines");
        }

        Ok(())
    }

    fn dump_message(
        &self,
        output: &mut dyn Write,
        projector: &EventProjector<'_>,
        message: SumMessage,
    ) -> Result<()> {
        let SumMessage { path, outcome } = message;

        let mut sum = match outcome {
            Decoded::Deleted => {
                match self.output_format {
                    SumOutputFormat::Record => writeln!(output, "-1 {path}")?,
                    _ => self.write_json(output, &json!({"filename": path, "deleted": true}))?,
                }
                return Ok(());
            }
            Decoded::Summary(sum) => sum,
        };

        if self.resolve_names {
            resolve_names(&PlatformResolver::default(), Path::new(&path), &mut sum);
        }

        match self.output_format {
            SumOutputFormat::Record => writeln!(output, "{sum} {path}")?,
            _ => {
                let event = projector.project(&path, &sum)?;
                self.write_json(output, &event)?;
            }
        }

        Ok(())
    }

    fn write_json(&self, output: &mut dyn Write, value: &impl serde::Serialize) -> Result<()> {
        let data = match self.output_format {
            SumOutputFormat::Json => serde_json::to_string_pretty(value)?,
            _ => serde_json::to_string(value)?,
        };
        writeln!(output, "{data}")?;
        Ok(())
    }

    fn try_to_initialize_logging(&self) {
        if let Some(level) = self.verbosity_level {
            if let Err(e) = TermLogger::init(
                level,
                Config::default(),
                TerminalMode::Stderr,
                ColorChoice::Auto,
            ) {
                eprintln!("Failed to initialize logging: {e}");
            }
        }
    }
}

/// Refuses to overwrite directories, creates parent directories if needed.
fn create_output_file(path: &Path) -> Result<File> {
    if path.is_dir() {
        bail!(
            "There is a directory at {}, refusing to overwrite",
            path.display()
        );
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create `{}`", parent.display()))?;
    }

    File::create(path).with_context(|| format!("failed to create `{}`", path.display()))
}

fn command() -> Command {
    Command::new("sum_dump")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Utility to decode file integrity checksum messages")
        .long_about(indoc!(r#"
            Utility to decode file integrity checksum messages.

            Every input line is `<checksum> <path>`, where the checksum is either
            `SIZE:PERM:UID:GID:MD5:SHA1[:UNAME:GNAME:MTIME:INODE[:SHA256]]`
            or `-1` for a deleted file.
        "#))
        .arg(
            Arg::new("INPUT")
                .help("Input file, `-` or nothing reads from stdin."),
        )
        .arg(
            Arg::new("output-format")
                .short('o')
                .long("format")
                .value_parser(["json", "jsonl", "record"])
                .default_value("json")
                .help("Sets the output format")
                .long_help(indoc!(r#"
                    Sets the output format:
                        "json"   - prints indented events.
                        "jsonl"  - prints one event per line.
                        "record" - re-encodes each checksum.
                "#)),
        )
        .arg(
            Arg::new("output-target")
                .long("output")
                .short('f')
                .value_name("PATH")
                .help("Writes output to the file specified instead of stdout, errors will still be printed to stderr. \
                       Will create parent directories if needed."),
        )
        .arg(
            Arg::new("labels")
                .long("labels")
                .value_name("PATH")
                .help("JSON object overriding field-table labels, e.g. {\"perm\": \"mode\"}."),
        )
        .arg(
            Arg::new("skip-malformed")
                .long("skip-malformed")
                .action(ArgAction::SetTrue)
                .help("When set, malformed lines are logged and skipped instead of aborting."),
        )
        .arg(
            Arg::new("resolve-names")
                .long("resolve-names")
                .action(ArgAction::SetTrue)
                .help("When set, missing owner and group names are looked up on this machine."),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .action(ArgAction::Count)
                .help("-v - info, -vv - debug, -vvv - trace."),
        )
}

fn main() {
    let matches = command().get_matches();

    let result = SumDump::from_cli_matches(&matches).and_then(|app| app.run());
    if let Err(e) = result {
        eprintln!("{e:?}");
        exit(1);
    }
}
