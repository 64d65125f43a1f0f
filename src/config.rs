use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use toml::Value;

use crate::protocol::RunMode;

/// Factory default FTDI device node; a config file or `--serial-port`
/// overrides it.
const DEFAULT_DEVICE: &str = "/dev/tty.usbserial-A50543G8";
const DEFAULT_BAUD_RATE: usize = 9600;
const DEFAULT_READ_TIMEOUT_MS: u64 = 1000;
const DEFAULT_RUN_MODE: &str = "md";

#[derive(Parser, Debug)]
#[command(version, about = "Upload a ROM to a Mega EverDrive X7 and boot it")]
pub struct Args {
    /// Path to the ROM file to upload
    pub rom: PathBuf,

    /// Serial port of the cartridge
    #[arg(long)]
    pub serial_port: Option<String>,

    /// Serial baud rate
    #[arg(long)]
    pub baud_rate: Option<usize>,

    /// Serial read timeout in milliseconds
    #[arg(long)]
    pub read_timeout: Option<u64>,

    /// Run mode for the ROM: md, sms, cd, os, m10 or ssf
    #[arg(long)]
    pub run_mode: Option<String>,
}

/// Immutable session configuration, merged from defaults, the optional
/// config file and command line flags, in increasing precedence.
#[derive(Debug, Clone)]
pub struct Config {
    pub rom: PathBuf,
    pub device: String,
    pub baud_rate: usize,
    pub read_timeout: Duration,
    pub run_mode: RunMode,
}

impl Config {
    pub fn resolve(args: Args) -> Result<Config> {
        Config::merge(args, FileSettings::load()?)
    }

    fn merge(args: Args, file: FileSettings) -> Result<Config> {
        let mode = args
            .run_mode
            .or(file.run_mode)
            .unwrap_or_else(|| DEFAULT_RUN_MODE.to_string());
        Ok(Config {
            rom: args.rom,
            device: args
                .serial_port
                .or(file.device)
                .unwrap_or_else(|| DEFAULT_DEVICE.to_string()),
            baud_rate: args.baud_rate.or(file.baud_rate).unwrap_or(DEFAULT_BAUD_RATE),
            read_timeout: Duration::from_millis(
                args.read_timeout
                    .or(file.read_timeout_ms)
                    .unwrap_or(DEFAULT_READ_TIMEOUT_MS),
            ),
            run_mode: mode.parse()?,
        })
    }
}

/// Defaults read from `config.toml` in the platform config directory. A
/// missing file is fine, unknown keys are ignored and only values of the
/// right type are picked up.
#[derive(Debug, Default)]
struct FileSettings {
    device: Option<String>,
    baud_rate: Option<usize>,
    read_timeout_ms: Option<u64>,
    run_mode: Option<String>,
}

impl FileSettings {
    fn load() -> Result<Self> {
        if let Some(proj_dirs) = directories::ProjectDirs::from("com", "GitHub", "x7run") {
            let settings_file = proj_dirs.config_dir().join("config.toml");
            if settings_file.exists() {
                let content = std::fs::read_to_string(&settings_file)
                    .with_context(|| format!("reading {}", settings_file.display()))?;
                return FileSettings::from_str(&content)
                    .map_err(|err| anyhow!("error parsing {}: {err}", settings_file.display()));
            }
        }
        Ok(FileSettings::default())
    }

    fn from_str(input_text: &str) -> Result<Self, toml::de::Error> {
        let value = input_text.parse::<Value>()?;
        let mut result = FileSettings::default();
        parse_value(&mut result, &value);
        Ok(result)
    }
}

fn parse_value(settings: &mut FileSettings, value: &Value) {
    if let Value::Table(table) = value {
        for (k, v) in table {
            match k.as_str() {
                "serial_port" => {
                    if let Value::String(device) = v {
                        settings.device = Some(device.clone());
                    }
                }
                "baud_rate" => {
                    if let Value::Integer(baud) = v {
                        if *baud > 0 {
                            settings.baud_rate = Some(*baud as usize);
                        }
                    }
                }
                "read_timeout" => {
                    if let Value::Integer(ms) = v {
                        if *ms > 0 {
                            settings.read_timeout_ms = Some(*ms as u64);
                        }
                    }
                }
                "run_mode" => {
                    if let Value::String(mode) = v {
                        settings.run_mode = Some(mode.clone());
                    }
                }
                _ => {}
            }
        }
    }
}
