//! tas-pkg - package lifecycle tool for the tas_agent boot-time agent.
//!
//! - `package` builds the agent and produces `tas_agent.tar.gz`
//! - `install` copies an extracted package onto a root, or removes it (`-r`)
//! - `preflight` checks packaging inputs
//! - `extract` unpacks a package tarball

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};

use tas_pkg::install::{InstallOptions, Mode, DEFAULT_ROOT};
use tas_pkg::layout::Platform;
use tas_pkg::package::{
    AgentSource, PackageOptions, DEFAULT_CONFIG, DEFAULT_DEST, DEFAULT_ROOT_CERT,
};

#[derive(Parser)]
#[command(name = "tas-pkg")]
#[command(version, about = "Package, install and remove the tas_agent boot-time agent")]
#[command(
    after_help = "QUICK START:\n  tas-pkg preflight           Check packaging inputs\n  tas-pkg package             Build target/package/tas_agent.tar.gz\n  sudo ./install.sh -u        Install from an extracted package\n  sudo ./install.sh -r -u     Remove and rebuild the initramfs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the agent and produce the package tarball
    Package {
        #[command(flatten)]
        inputs: PackageArgs,
    },

    /// Install an extracted package onto a root (or remove it with -r)
    Install {
        /// Target root directory
        #[arg(short = 'd', long = "dest", value_name = "DESTDIR", default_value = DEFAULT_ROOT)]
        root: PathBuf,

        /// Remove a previous installation instead of installing
        #[arg(short, long)]
        remove: bool,

        /// Regenerate the initramfs for the running kernel afterwards
        #[arg(short, long)]
        update_initramfs: bool,

        /// Extracted package tree (default: current directory)
        #[arg(long, default_value = ".")]
        source: PathBuf,

        #[arg(long, value_enum, default_value_t = Platform::Ubuntu)]
        platform: Platform,
    },

    /// Check packaging inputs without building anything
    Preflight {
        #[command(flatten)]
        inputs: PackageArgs,

        /// Fail if any checks fail (exit code 1)
        #[arg(long)]
        strict: bool,
    },

    /// Extract a package tarball and verify its contents
    Extract {
        /// Package tarball
        #[arg(default_value = "./target/package/tas_agent.tar.gz")]
        tarball: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        #[arg(long, value_enum, default_value_t = Platform::Ubuntu)]
        platform: Platform,
    },
}

#[derive(Args)]
struct PackageArgs {
    /// Destination directory (cleared before use)
    #[arg(short = 'd', long = "dest", value_name = "DESTDIR", default_value = DEFAULT_DEST)]
    dest: PathBuf,

    /// Root certificate installed as /etc/tas_agent/root_cert.pem
    #[arg(short = 'r', long, value_name = "ROOTCERT", default_value = DEFAULT_ROOT_CERT)]
    root_cert: PathBuf,

    /// Agent configuration installed as /etc/tas_agent/config
    #[arg(short = 'e', long, value_name = "CONFIG", default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    #[arg(long, value_enum, default_value_t = Platform::Ubuntu)]
    platform: Platform,

    /// Agent checkout holding the sources, platform scripts and install.sh
    #[arg(long, default_value = ".")]
    source_dir: PathBuf,

    /// Build tool (default: cargo on PATH)
    #[arg(long, env = "TAS_PKG_CARGO")]
    cargo: Option<PathBuf>,

    /// Use an already-built agent binary instead of building (overrides --cargo)
    #[arg(long)]
    prebuilt: Option<PathBuf>,
}

impl PackageArgs {
    fn into_options(self) -> anyhow::Result<PackageOptions> {
        let tool_binary = std::env::current_exe()?;
        let agent = match self.prebuilt {
            Some(path) => AgentSource::Prebuilt(path),
            None => AgentSource::Build {
                toolchain: self.cargo,
            },
        };
        Ok(PackageOptions {
            dest: self.dest,
            root_cert: self.root_cert,
            config: self.config,
            platform: self.platform,
            source_dir: self.source_dir,
            agent,
            tool_binary,
        })
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Package { inputs } => {
            commands::cmd_package(&inputs.into_options()?)?;
        }

        Commands::Install {
            root,
            remove,
            update_initramfs,
            source,
            platform,
        } => {
            let opts = InstallOptions {
                root,
                source,
                platform,
                mode: if remove { Mode::Remove } else { Mode::Install },
                update_initramfs,
            };
            commands::cmd_install(&opts)?;
        }

        Commands::Preflight { inputs, strict } => {
            commands::cmd_preflight(&inputs.into_options()?, strict)?;
        }

        Commands::Extract {
            tarball,
            output,
            platform,
        } => {
            commands::cmd_extract(&tarball, &output, platform)?;
        }
    }

    Ok(())
}

/// Help for the subcommand named on the command line, or the top-level help.
fn usage_help() -> String {
    let mut cmd = Cli::command();
    cmd.build();
    let requested = std::env::args()
        .skip(1)
        .find(|arg| cmd.find_subcommand(arg).is_some());
    match requested.and_then(|name| cmd.find_subcommand_mut(&name).cloned()) {
        Some(mut sub) => sub.render_help().to_string(),
        None => cmd.render_help().to_string(),
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                // clap already printed the full help for these
                ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => ExitCode::FAILURE,
                _ => {
                    eprintln!("\n{}", usage_help());
                    ExitCode::FAILURE
                }
            };
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
