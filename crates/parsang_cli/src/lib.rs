use std::io::Write;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use parsang_engine::zones::{ZoneColor, ZoneRecord};
use parsang_engine::{load_viewer_config, CurrentLocation, ViewerConfig, WorldGrid, ZoneSession};
use tracing::debug;

pub const DEFAULT_WATCH_INTERVAL_MS: u64 = 1_000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonOptions {
    pub save_dir: Option<PathBuf>,
    pub save_uid: Option<String>,
    pub level: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Status,
    Watch {
        interval_ms: u64,
        /// `None` watches until the process is killed.
        iterations: Option<u64>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedArgs {
    Help,
    Run {
        kind: CommandKind,
        options: CommonOptions,
    },
}

pub fn parse_args(args: &[String]) -> Result<ParsedArgs, String> {
    if args.is_empty() {
        return Err(usage_text());
    }
    if args[0] == "-h" || args[0] == "--help" {
        return Ok(ParsedArgs::Help);
    }

    let mut options = CommonOptions::default();
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "--save-dir" => {
                let value = option_value(args, index, "--save-dir")?;
                options.save_dir = Some(PathBuf::from(value));
                index += 2;
            }
            "--uid" => {
                let value = option_value(args, index, "--uid")?;
                options.save_uid = Some(value.to_string());
                index += 2;
            }
            "--level" => {
                let value = option_value(args, index, "--level")?;
                options.level = Some(
                    value
                        .parse::<u32>()
                        .map_err(|_| format!("invalid --level value '{value}' (expected u32)"))?,
                );
                index += 2;
            }
            _ => break,
        }
    }

    let command = args
        .get(index)
        .ok_or_else(|| "missing subcommand".to_string())?
        .as_str();
    let command_args = &args[(index + 1)..];

    let kind = match command {
        "status" => {
            if !command_args.is_empty() {
                return Err("status takes no arguments".to_string());
            }
            CommandKind::Status
        }
        "watch" => parse_watch_args(command_args)?,
        other => return Err(format!("unknown subcommand '{other}'")),
    };

    Ok(ParsedArgs::Run { kind, options })
}

fn parse_watch_args(args: &[String]) -> Result<CommandKind, String> {
    let mut interval_ms = DEFAULT_WATCH_INTERVAL_MS;
    let mut iterations = None;
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "--interval-ms" => {
                let value = option_value(args, index, "--interval-ms")?;
                interval_ms = value
                    .parse::<u64>()
                    .ok()
                    .filter(|ms| *ms > 0)
                    .ok_or_else(|| {
                        format!("invalid --interval-ms value '{value}' (expected u64 > 0)")
                    })?;
                index += 2;
            }
            "--iterations" => {
                let value = option_value(args, index, "--iterations")?;
                iterations = Some(value.parse::<u64>().map_err(|_| {
                    format!("invalid --iterations value '{value}' (expected u64)")
                })?);
                index += 2;
            }
            other => {
                return Err(format!(
                    "unknown watch argument '{other}' (expected --interval-ms or --iterations)"
                ))
            }
        }
    }
    Ok(CommandKind::Watch {
        interval_ms,
        iterations,
    })
}

fn option_value<'a>(args: &'a [String], index: usize, flag: &str) -> Result<&'a str, String> {
    args.get(index + 1)
        .map(String::as_str)
        .ok_or_else(|| format!("missing value for {flag}"))
}

pub fn usage_text() -> String {
    [
        "parsang_cli - headless zone-state reader",
        "",
        "Usage:",
        "  parsang_cli [--save-dir <path>] [--uid <id>] [--level <u32>] status",
        "  parsang_cli [--save-dir <path>] [--uid <id>] [--level <u32>] watch [--interval-ms <u64>] [--iterations <u64>]",
        "",
        "Defaults:",
        "  --save-dir from PARSANG_SAVE_DIR, else the working directory",
        "  --uid from PARSANG_SAVE_UID; without it the zone cache is skipped",
        "  --interval-ms 1000",
    ]
    .join("\n")
}

/// Applies command-line options over an already-loaded viewer config.
pub fn apply_options(config: &mut ViewerConfig, options: &CommonOptions) {
    if let Some(dir) = &options.save_dir {
        config.sources.save_dir = dir.clone();
    }
    if let Some(uid) = &options.save_uid {
        config.sources.save_uid = Some(uid.clone());
    }
}

pub fn open_session(config: &ViewerConfig) -> ZoneSession {
    let mut session = ZoneSession::new(
        config.sources.resolve(),
        config.map.scan_mode,
        config.map.poll_interval(),
    );
    session.startup(Instant::now());
    session
}

pub fn run<W: Write>(kind: CommandKind, options: CommonOptions, stdout: &mut W) -> Result<(), String> {
    let mut config =
        load_viewer_config(|key| std::env::var(key).ok()).map_err(|error| error.to_string())?;
    apply_options(&mut config, &options);
    let mut session = open_session(&config);

    match kind {
        CommandKind::Status => write_out(
            stdout,
            &render_status(&session, options.level, &config.map.grid),
        ),
        CommandKind::Watch {
            interval_ms,
            iterations,
        } => watch(&mut session, Duration::from_millis(interval_ms), iterations, stdout),
    }
}

pub fn watch<W: Write>(
    session: &mut ZoneSession,
    interval: Duration,
    iterations: Option<u64>,
    stdout: &mut W,
) -> Result<(), String> {
    let mut reported = session.current_location();
    write_out(stdout, &format_location_line(reported))?;

    let mut completed = 0u64;
    while iterations.map_or(true, |limit| completed < limit) {
        thread::sleep(interval);
        let outcome = session.scan_log();
        debug!(outcome = ?outcome, "watch_poll");
        let location = session.current_location();
        if location != reported {
            write_out(stdout, &format_location_line(location))?;
            reported = location;
        }
        completed += 1;
    }
    Ok(())
}

fn format_location_line(location: CurrentLocation) -> String {
    format!("current: {location}\n")
}

/// One-shot report: current location, record counts per level, then visited named zones.
/// Zones outside the world grid are never drawn, so they are counted but not listed.
pub fn render_status(session: &ZoneSession, level: Option<u32>, grid: &WorldGrid) -> String {
    let store = session.store();
    let mut out = format_location_line(session.current_location());

    let levels = store
        .levels()
        .into_iter()
        .filter(|candidate| level.map_or(true, |wanted| wanted == *candidate))
        .collect::<Vec<_>>();
    out.push_str(&format!("records: {}\n", store.query(level).len()));
    for candidate in &levels {
        out.push_str(&format!(
            "  level {candidate}: {}\n",
            store.query(Some(*candidate)).len()
        ));
    }
    let outside = store
        .query(level)
        .iter()
        .filter(|(coord, _)| !coord.is_within_world(grid))
        .count();
    if outside > 0 {
        out.push_str(&format!("outside world: {outside}\n"));
    }

    let mut named = store
        .query(level)
        .iter()
        .filter(|(coord, record)| coord.is_within_world(grid) && is_visited(record))
        .filter_map(|(coord, record)| record.name.as_ref().map(|name| (coord, name.clone())))
        .collect::<Vec<_>>();
    named.sort_by_key(|(coord, _)| {
        (
            coord.level(),
            coord.parsang_y(),
            coord.parsang_x(),
            coord.zone_y(),
            coord.zone_x(),
        )
    });
    out.push_str(&format!("visited named zones: {}\n", named.len()));
    for (coord, name) in named {
        out.push_str(&format!("  {coord} {name}\n"));
    }
    out
}

fn is_visited(record: &ZoneRecord) -> bool {
    record.is_current || record.color == Some(ZoneColor::VISITED)
}

fn write_out<W: Write>(stdout: &mut W, text: &str) -> Result<(), String> {
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|error| format!("failed to write output: {error}"))
}
