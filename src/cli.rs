use crate::formatter::DEFAULT_COMMENT_TOKEN;
use crate::render::{Backend, Engine};
use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use log::LevelFilter;
use std::ffi::OsString;
use std::path::PathBuf;

/// What to convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Update a target file on disk, optionally naming its Org document.
    Sync {
        target: Option<PathBuf>,
        companion: Option<PathBuf>,
    },
    /// Read a target from stdin, write the result to stdout.
    Pipe { companion: PathBuf },
}

pub struct Config {
    pub mode: Mode,
    pub backend: Backend,
    pub engine: Engine,
    pub comment_token: String,
    /// Whether questions may be asked on the terminal.
    pub interactive: bool,
    /// Remember the companion without asking.
    pub assume_yes: bool,
    pub verbosity: u8,
}

impl Config {
    /// Log level for the `-v` count: `info` by default, then `debug`, then `trace`.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbosity {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn command() -> Command {
    let org = Arg::new("org")
        .short('o')
        .long("org")
        .value_name("FILE")
        .help("Org document to render")
        .num_args(1);

    Command::new("org2comment")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Renders an Org document into the Commentary section of an Emacs Lisp file")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("backend")
                .short('b')
                .long("backend")
                .value_name("NAME")
                .env("ORG2COMMENT_BACKEND")
                .default_value(Backend::DEFAULT)
                .help("Export backend, e.g. ascii or markdown")
                .global(true),
        )
        .arg(
            Arg::new("engine")
                .short('e')
                .long("engine")
                .value_name("ENGINE")
                .value_parser(Engine::NAMES)
                .default_value("emacs")
                .help("Program that performs the export")
                .global(true),
        )
        .arg(
            Arg::new("comment-token")
                .short('c')
                .long("comment-token")
                .value_name("TOKEN")
                .default_value(DEFAULT_COMMENT_TOKEN)
                .help("Line comment token prefixed to every rendered line")
                .global(true),
        )
        .arg(
            Arg::new("yes")
                .short('y')
                .long("yes")
                .action(ArgAction::SetTrue)
                .help("Remember the Org document in the target without asking")
                .global(true),
        )
        .arg(
            Arg::new("no-input")
                .long("no-input")
                .action(ArgAction::SetTrue)
                .help("Never prompt; fail when a path is missing")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase log output (repeatable)")
                .global(true),
        )
        .subcommand(
            Command::new("sync")
                .about("Update the Commentary section of a file in place")
                .arg(
                    Arg::new("target")
                        .value_name("TARGET")
                        .help("Emacs Lisp file to update; asked for when omitted"),
                )
                .arg(org.clone()),
        )
        .subcommand(
            Command::new("pipe")
                .about("Read a file on stdin and print it with a fresh Commentary section")
                .arg(org.required(true)),
        )
}

pub fn parse_args() -> Result<Config> {
    from_matches(&command().get_matches())
}

pub fn parse_from<I, T>(args: I) -> Result<Config>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command().try_get_matches_from(args)?;
    from_matches(&matches)
}

fn from_matches(matches: &ArgMatches) -> Result<Config> {
    let mode = match matches.subcommand() {
        Some(("sync", sub)) => Mode::Sync {
            target: sub.get_one::<String>("target").map(PathBuf::from),
            companion: sub.get_one::<String>("org").map(PathBuf::from),
        },
        Some(("pipe", sub)) => Mode::Pipe {
            companion: sub
                .get_one::<String>("org")
                .map(PathBuf::from)
                .ok_or_else(|| anyhow::anyhow!("--org is required"))?,
        },
        _ => anyhow::bail!("No command given"),
    };

    let backend = matches
        .get_one::<String>("backend")
        .map(Backend::new)
        .unwrap_or_default();

    let engine = matches
        .get_one::<String>("engine")
        .map(|s| s.parse::<Engine>())
        .transpose()?
        .unwrap_or_default();

    let comment_token = matches
        .get_one::<String>("comment-token")
        .cloned()
        .unwrap_or_else(|| DEFAULT_COMMENT_TOKEN.to_string());

    Ok(Config {
        mode,
        backend,
        engine,
        comment_token,
        interactive: !matches.get_flag("no-input"),
        assume_yes: matches.get_flag("yes"),
        verbosity: matches.get_count("verbose"),
    })
}
