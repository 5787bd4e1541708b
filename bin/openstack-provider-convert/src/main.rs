// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use openstack_provider_types_versions::scheme::{ApiVersion, Scheme};
use openstack_provider_types_versions::{v1alpha1, v1alpha2};
use slog::{debug, o, Drain, Level, Logger};

#[derive(Debug, Parser)]
#[clap(about, version)]
/// Convert OpenStack machine provider configurations between API versions
struct Opt {
    /// Scheme configuration file (TOML)
    #[clap(short, long, action)]
    config: Option<PathBuf>,

    /// Enable debugging
    #[clap(short, long, action)]
    debug: bool,

    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Re-encode a document in another API version
    Convert {
        /// Input document, or "-" for stdin
        #[clap(action)]
        input: PathBuf,

        /// Target version (defaults to the preferred version)
        #[clap(long, value_parser = parse_version)]
        to: Option<ApiVersion>,
    },

    /// Print the internal representation of a document
    Normalize {
        /// Input document, or "-" for stdin
        #[clap(action)]
        input: PathBuf,
    },

    /// Print the JSON schema of a versioned document
    Schema {
        /// Version to describe (defaults to the preferred version)
        #[clap(value_parser = parse_version)]
        version: Option<ApiVersion>,
    },
}

fn parse_version(s: &str) -> anyhow::Result<ApiVersion> {
    s.parse().map_err(|e| anyhow!("{e}"))
}

/// Create a top-level logger that outputs to stderr
fn create_logger(opt: &Opt) -> Logger {
    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let level = if opt.debug { Level::Debug } else { Level::Info };
    let drain = slog::LevelFilter(drain, level).fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    Logger::root(drain, o!())
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value)?;
    println!("{out}");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let opt = Opt::parse();
    let log = create_logger(&opt);

    let config = match &opt.config {
        Some(path) => openstack_scheme_config::parse(path).with_context(
            || format!("failed to parse config {}", path.display()),
        )?,
        None => Default::default(),
    };
    debug!(log, "using scheme config"; "config" => ?config);
    let scheme =
        Scheme::new(&config, log.clone()).context("invalid scheme config")?;

    match opt.cmd {
        Command::Convert { input, to } => {
            let raw = read_input(&input)?;
            let out = scheme
                .convert(&raw, to)
                .context("failed to convert document")?;
            print_json(&out)?;
        }
        Command::Normalize { input } => {
            let raw = read_input(&input)?;
            let config =
                scheme.decode(&raw).context("failed to decode document")?;
            print_json(&config)?;
        }
        Command::Schema { version } => {
            let schema = match version
                .unwrap_or_else(|| scheme.preferred_version())
            {
                ApiVersion::V1Alpha1 => {
                    schemars::schema_for!(v1alpha1::MachineProviderConfig)
                }
                ApiVersion::V1Alpha2 => {
                    schemars::schema_for!(v1alpha2::MachineProviderConfig)
                }
            };
            print_json(&schema)?;
        }
    }

    Ok(())
}
