//! Entry point for the dupescan CLI.

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use dupescan::{
    cli::{Cli, Commands},
    config::Config,
    error::ExitCode,
    logging,
    media::ffmpeg::FfmpegOpener,
    pipeline,
};
use std::io;

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not usage errors.
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                let _ = e.print();
                std::process::exit(ExitCode::Success.as_i32());
            }
            let _ = e.print();
            std::process::exit(ExitCode::UsageError.as_i32());
        }
    };

    logging::init_logging(cli.verbose, cli.quiet);

    let config = Config::load();
    log::debug!("Effective configuration: {config:?}");

    let mut stdout = io::stdout().lock();
    match cli.command {
        Commands::Dedup(args) => {
            pipeline::exact::run(&args.directory, args.follow_symlinks, &config, &mut stdout)?;
        }
        Commands::Img(args) => {
            pipeline::image::run(&args.directory, args.follow_symlinks, &config, &mut stdout)?;
        }
        Commands::Vid(args) => {
            let opener = FfmpegOpener::new();
            pipeline::video::run(
                &args.directory,
                args.follow_symlinks,
                &config,
                &opener,
                &mut stdout,
            )?;
        }
    }

    Ok(())
}
