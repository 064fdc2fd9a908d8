//! Command line argument parsing
//!
//! Subcommands:
//! - `scan`: Print the gift codes found in a text file or stdin
//! - `redeem`: Redeem codes given inline or found in a text file
//! - `show-config`: Show configuration discovery information
//! - `init-config`: Write a default configuration file

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ExecutionMode {
    Scan(ScanConfig),
    Redeem(RedeemConfig),
    ShowConfig,
    InitConfig { path: Option<PathBuf> },
}

/// Where free text is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextInput {
    File(PathBuf),
    Stdin,
}

#[derive(Debug)]
pub struct ScanConfig {
    pub input: TextInput,
    pub config_override: Option<PathBuf>,
    pub verbose: bool,
}

#[derive(Debug)]
pub struct RedeemConfig {
    pub codes: Vec<String>,
    pub input: Option<TextInput>,
    pub config_override: Option<PathBuf>,
    pub json: bool,
    pub verbose: bool,
}

impl ExecutionMode {
    pub fn verbose(&self) -> bool {
        match self {
            ExecutionMode::Scan(config) => config.verbose,
            ExecutionMode::Redeem(config) => config.verbose,
            ExecutionMode::ShowConfig | ExecutionMode::InitConfig { .. } => false,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "gift-redeemer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Finds gift links in text and redeems them with a pool of account tokens")]
#[command(long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the gift codes found in a text file
    Scan {
        /// Text file to scan, or `-` for stdin
        file: PathBuf,
        /// Configuration file path (for custom link prefixes)
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,
        /// Enable verbose output
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },
    /// Redeem gift codes with the configured tokens
    Redeem {
        /// Codes to redeem directly
        codes: Vec<String>,
        /// Also redeem every code found in this text file (`-` for stdin)
        #[arg(short = 'f', long = "file")]
        file: Option<PathBuf>,
        /// Configuration file path
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,
        /// Print results as JSON
        #[arg(long = "json")]
        json: bool,
        /// Enable verbose output
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },
    /// Show configuration discovery information
    ShowConfig,
    /// Write a default configuration file
    InitConfig {
        /// Where to write it (defaults to ~/.redeemer/config.toml)
        path: Option<PathBuf>,
    },
}

impl Args {
    pub fn parse() -> Self {
        Parser::parse()
    }

    pub fn mode(&self) -> Result<ExecutionMode, String> {
        match &self.command {
            Some(Commands::Scan {
                file,
                config,
                verbose,
            }) => Ok(ExecutionMode::Scan(ScanConfig {
                input: Self::text_input(file),
                config_override: config.clone(),
                verbose: *verbose,
            })),
            Some(Commands::Redeem {
                codes,
                file,
                config,
                json,
                verbose,
            }) => {
                if codes.is_empty() && file.is_none() {
                    return Err(
                        "Nothing to redeem. Pass codes or a text file with --file.".to_string()
                    );
                }

                Ok(ExecutionMode::Redeem(RedeemConfig {
                    codes: codes.clone(),
                    input: file.as_deref().map(Self::text_input),
                    config_override: config.clone(),
                    json: *json,
                    verbose: *verbose,
                }))
            }
            Some(Commands::ShowConfig) => Ok(ExecutionMode::ShowConfig),
            Some(Commands::InitConfig { path }) => Ok(ExecutionMode::InitConfig {
                path: path.clone(),
            }),
            None => Err(
                "No command specified. Use 'gift-redeemer --help' to see available commands."
                    .to_string(),
            ),
        }
    }

    fn text_input(path: &Path) -> TextInput {
        if path.as_os_str() == "-" {
            TextInput::Stdin
        } else {
            TextInput::File(path.to_path_buf())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_command_with_file() {
        let args = Args {
            command: Some(Commands::Scan {
                file: PathBuf::from("chat.log"),
                config: None,
                verbose: true,
            }),
        };

        if let ExecutionMode::Scan(config) = args.mode().unwrap() {
            assert_eq!(config.input, TextInput::File(PathBuf::from("chat.log")));
            assert!(config.verbose);
        } else {
            panic!("Expected Scan mode");
        }
    }

    #[test]
    fn test_dash_reads_stdin() {
        let args = Args {
            command: Some(Commands::Redeem {
                codes: vec![],
                file: Some(PathBuf::from("-")),
                config: None,
                json: true,
                verbose: false,
            }),
        };

        if let ExecutionMode::Redeem(config) = args.mode().unwrap() {
            assert_eq!(config.input, Some(TextInput::Stdin));
            assert!(config.json);
        } else {
            panic!("Expected Redeem mode");
        }
    }

    #[test]
    fn test_redeem_requires_codes_or_file() {
        let args = Args {
            command: Some(Commands::Redeem {
                codes: vec![],
                file: None,
                config: None,
                json: false,
                verbose: false,
            }),
        };
        assert!(args.mode().is_err());
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "gift-redeemer",
            "redeem",
            "AbCdEf1234567890",
            "--config",
            "redeemer.toml",
            "-v",
        ])
        .unwrap();

        if let ExecutionMode::Redeem(config) = args.mode().unwrap() {
            assert_eq!(config.codes, vec!["AbCdEf1234567890".to_string()]);
            assert_eq!(config.config_override, Some(PathBuf::from("redeemer.toml")));
            assert!(config.verbose);
            assert!(config.input.is_none());
        } else {
            panic!("Expected Redeem mode");
        }
    }

    #[test]
    fn test_init_config_command() {
        let args = Args::try_parse_from(["gift-redeemer", "init-config", "redeemer.toml"]).unwrap();
        match args.mode().unwrap() {
            ExecutionMode::InitConfig { path } => {
                assert_eq!(path, Some(PathBuf::from("redeemer.toml")));
            }
            other => panic!("Expected InitConfig mode, got {:?}", other),
        }

        let args = Args::try_parse_from(["gift-redeemer", "init-config"]).unwrap();
        assert!(matches!(
            args.mode().unwrap(),
            ExecutionMode::InitConfig { path: None }
        ));
    }

    #[test]
    fn test_no_command_error() {
        let args = Args { command: None };
        assert!(args.mode().is_err());
    }
}
