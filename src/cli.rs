//! Command-line interface
//!
//! ```text
//! pixel-arcade list
//! pixel-arcade <demo> [--frames N] [--seed S] [--config PATH] [--realtime] [--dump]
//! ```

use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::demos::DemoKind;
use crate::settings::SettingsError;

/// Frames a headless run lasts unless `--frames` says otherwise
pub const DEFAULT_FRAMES: u64 = 600;

pub const USAGE: &str =
    "usage: pixel-arcade <demo|list> [--frames N] [--seed S] [--config PATH] [--realtime] [--dump]";

#[derive(Debug, Error)]
pub enum CliError {
    #[error("unknown demo '{0}' (try `pixel-arcade list`)")]
    UnknownDemo(String),

    #[error("unknown flag '{0}'")]
    UnknownFlag(String),

    #[error("{flag} expects a value")]
    MissingValue { flag: &'static str },

    #[error("bad value '{value}' for {flag}")]
    BadValue { flag: &'static str, value: String },

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("failed to write summary: {0}")]
    Output(#[from] serde_json::Error),
}

/// Options for running one demo
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub demo: DemoKind,
    pub frames: u64,
    pub seed: Option<u64>,
    pub config: Option<PathBuf>,
    /// Pace ticks against the wall clock instead of running flat out
    pub realtime: bool,
    /// Include the last frame's draw commands in the summary
    pub dump: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    List,
    Help,
    Run(RunOptions),
}

impl CliCommand {
    /// Parse the process arguments
    pub fn from_env() -> Result<Self, CliError> {
        Self::parse(env::args().skip(1))
    }

    /// Parse arguments (without the program name)
    pub fn parse<I>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut args = args.into_iter().map(Into::into);

        let demo = match args.next().as_deref() {
            None | Some("help" | "-h" | "--help") => return Ok(CliCommand::Help),
            Some("list") => return Ok(CliCommand::List),
            Some(name) => DemoKind::from_str(name).ok_or_else(|| CliError::UnknownDemo(name.to_string()))?,
        };

        let mut opts = RunOptions {
            demo,
            frames: DEFAULT_FRAMES,
            seed: None,
            config: None,
            realtime: false,
            dump: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--frames" => opts.frames = parse_value("--frames", args.next())?,
                "--seed" => opts.seed = Some(parse_value("--seed", args.next())?),
                "--config" => {
                    let path = args.next().ok_or(CliError::MissingValue { flag: "--config" })?;
                    opts.config = Some(PathBuf::from(path));
                }
                "--realtime" => opts.realtime = true,
                "--dump" => opts.dump = true,
                _ => return Err(CliError::UnknownFlag(arg)),
            }
        }

        if opts.frames == 0 {
            return Err(CliError::BadValue {
                flag: "--frames",
                value: "0".to_string(),
            });
        }
        Ok(CliCommand::Run(opts))
    }
}

fn parse_value<T: std::str::FromStr>(flag: &'static str, value: Option<String>) -> Result<T, CliError> {
    let value = value.ok_or(CliError::MissingValue { flag })?;
    value.parse().map_err(|_| CliError::BadValue { flag, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_flags() {
        let cmd = CliCommand::parse(["shooter", "--frames", "120", "--seed", "42", "--dump"]).unwrap();
        let CliCommand::Run(opts) = cmd else {
            panic!("expected a run command");
        };
        assert_eq!(opts.demo, DemoKind::Shooter);
        assert_eq!(opts.frames, 120);
        assert_eq!(opts.seed, Some(42));
        assert!(opts.dump);
        assert!(!opts.realtime);
        assert_eq!(opts.config, None);
    }

    #[test]
    fn test_defaults() {
        let CliCommand::Run(opts) = CliCommand::parse(["paddle"]).unwrap() else {
            panic!("expected a run command");
        };
        assert_eq!(opts.demo, DemoKind::Catch);
        assert_eq!(opts.frames, DEFAULT_FRAMES);
        assert_eq!(CliCommand::parse(Vec::<String>::new()).unwrap(), CliCommand::Help);
        assert_eq!(CliCommand::parse(["list"]).unwrap(), CliCommand::List);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(CliCommand::parse(["pong"]), Err(CliError::UnknownDemo(_))));
        assert!(matches!(
            CliCommand::parse(["snake", "--frames", "lots"]),
            Err(CliError::BadValue { flag: "--frames", .. })
        ));
        assert!(matches!(
            CliCommand::parse(["snake", "--seed"]),
            Err(CliError::MissingValue { flag: "--seed" })
        ));
        assert!(matches!(CliCommand::parse(["snake", "--fast"]), Err(CliError::UnknownFlag(_))));
        assert!(matches!(CliCommand::parse(["snake", "--frames", "0"]), Err(CliError::BadValue { .. })));
    }
}
