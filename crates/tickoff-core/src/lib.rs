pub mod app;
pub mod cli;
pub mod config;
pub mod filter;
pub mod input;
pub mod navigator;
pub mod render;
pub mod screens;
pub mod store;
pub mod task;

use std::ffi::OsString;
use std::io::{
  self,
  IsTerminal
};

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

use crate::config::StoreBackend;
use crate::store::{
  DocumentStore,
  FileStore,
  MemoryStore
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting tickoff"
  );
  debug!(?pre.rc_overrides, "preprocessed rc overrides");

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  );
  if cli.memory {
    cfg.set(
      "store.backend",
      StoreBackend::Memory.to_string()
    );
  }

  let store = open_store(
    &cfg,
    cli.data.as_deref()
  )?;
  let collection = cfg.collection();

  let stdout = io::stdout();
  let renderer = render::Renderer::new(
    &cfg,
    stdout.is_terminal()
  )?;

  let mut app = app::App::new(
    store, collection, renderer
  );
  app.run(
    io::stdin().lock(),
    stdout.lock()
  )?;

  info!("done");
  Ok(())
}

fn open_store(
  cfg: &config::Config,
  data_override: Option<&std::path::Path>
) -> anyhow::Result<Box<dyn DocumentStore>>
{
  let backend = cfg.backend()?;
  debug!(%backend, "selected store backend");

  match backend {
    | StoreBackend::Memory => {
      Ok(Box::new(MemoryStore::new()))
    }
    | StoreBackend::File => {
      let data_dir =
        config::resolve_data_dir(
          cfg,
          data_override
        )
        .context(
          "failed to resolve data \
           directory"
        )?;

      let store = FileStore::open(
        &data_dir
      )
      .with_context(|| {
        format!(
          "failed to open store at {}",
          data_dir.display()
        )
      })?;
      Ok(Box::new(store))
    }
  }
}
