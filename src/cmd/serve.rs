//! Serve command - run the HTTP API

use super::Env;
use crate::api::{self, AppState};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to listen on (defaults to bind_address from the settings)
    #[arg(long)]
    bind: Option<String>,
}

impl ServeCommand {
    pub fn exec(&self, env: &Env) -> anyhow::Result<()> {
        let addr = self
            .bind
            .clone()
            .unwrap_or_else(|| env.settings.bind_address.clone());
        let state = AppState::new(env.rates.clone(), env.context, Arc::new(env.store()));
        log::info!(
            "Serving fiscal year {} rates, data in {}",
            env.rates.fiscal_year,
            env.data_dir.display()
        );

        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(api::serve(state, &addr))
    }
}
