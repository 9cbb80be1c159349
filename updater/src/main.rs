//! GMaven prebuilts updater CLI entrypoint.
//!
//! Downloads the configured artifacts, rebuilds the prebuilts directory and
//! commits the result to the enclosing git repository.

use camino::Utf8PathBuf;
use clap::Parser;
use gmaven_updater::cli::Cli;
use gmaven_updater::config::UpdaterConfig;
use gmaven_updater::error::{Result, UpdaterError};
use gmaven_updater::exec::SystemCommandExecutor;
use gmaven_updater::fetch::download::HttpDownloader;
use gmaven_updater::fetch::index::GroupIndex;
use gmaven_updater::manifest::{Pom2BpGenerator, ensure_generator_available};
use gmaven_updater::output::{report_commit, write_stderr_line};
use gmaven_updater::update::{UpdateServices, update_gmaven};
use gmaven_updater::vcs::VcsGuard;
use log::{error, info};
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    let cwd = current_dir()?;
    let config = load_config(cli, &cwd)?;
    ensure_generator_available(&config.manifest.generator)?;

    let executor = SystemCommandExecutor::default();
    let vcs = VcsGuard::new(executor, &cwd);
    vcs.ensure_clean(cli.commit_first)?;
    let _cleanup = vcs.cleanup_guard();

    let downloader = HttpDownloader;
    let index = GroupIndex::new(downloader, &config.base_url);
    let generator = Pom2BpGenerator::new(&config.manifest.generator, executor);
    let services = UpdateServices {
        index: &index,
        downloader: &downloader,
        generator: &generator,
    };
    let summary = update_gmaven(&config, &services).inspect_err(|_| {
        error!("Failed to update GMaven, aborting...");
    })?;
    info!(
        "Updated {} artifact(s) in {}",
        summary.report.artifacts.len(),
        summary.report.destination
    );

    let invocation = std::env::args().collect::<Vec<_>>().join(" ");
    let commit = vcs.commit_update(&config.destination, &summary.requested, &invocation)?;
    report_commit(stderr, &commit);
    Ok(())
}

fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir()?;
    Utf8PathBuf::from_path_buf(cwd).map_err(|path| UpdaterError::NonUtf8Path {
        path: path.display().to_string(),
    })
}

fn load_config(cli: &Cli, cwd: &camino::Utf8Path) -> Result<UpdaterConfig> {
    let mut config = match cli.config_path(cwd) {
        Some(path) => UpdaterConfig::load(&path)?,
        None => UpdaterConfig::default(),
    };
    if let Some(destination) = &cli.destination {
        config.destination = destination.clone();
    }
    Ok(config)
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}
