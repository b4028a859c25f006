pub mod commands;
pub mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::api::Api;
use crate::auth::JwtAuthentication;
use crate::config::{AppConfig, RootOptions};
use config::ServeConfig;

#[derive(Parser)]
#[command(name = "roadwork")]
#[command(about = "Serve role-gated CRUD routes generated from model definitions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Generate routes and start the HTTP server")]
    Serve {
        #[arg(long, short, help = "YAML file describing the models to serve")]
        config: Option<PathBuf>,
        #[arg(long, short, help = "Port to listen on (overrides ROADWORK_PORT)")]
        port: Option<u16>,
    },

    #[command(about = "Print the generated route table without serving it")]
    Routes {
        #[arg(long, short, help = "YAML file describing the models to serve")]
        config: Option<PathBuf>,
        #[arg(long, help = "Output in JSON format")]
        json: bool,
    },

    #[command(about = "Issue a bearer token for testing role-gated routes")]
    Token {
        #[arg(long, help = "Caller identity, used as the owner id")]
        id: String,
        #[arg(long = "scope", help = "Role granted to the caller (repeatable)")]
        scopes: Vec<String>,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let app_config = crate::config::config();

    match cli.command {
        Commands::Serve { config, port } => {
            let serve_config = ServeConfig::load_or_demo(config.as_deref())?;
            commands::serve::handle(app_config, &serve_config, port).await
        }
        Commands::Routes { config, json } => {
            let serve_config = ServeConfig::load_or_demo(config.as_deref())?;
            commands::routes::handle(app_config, &serve_config, json)
        }
        Commands::Token { id, scopes } => commands::token::handle(app_config, id, scopes),
    }
}

/// Build the route registry for every configured model
pub fn build_api(app_config: &AppConfig, serve_config: &ServeConfig) -> anyhow::Result<Api> {
    let root_options = match &serve_config.base_path {
        Some(base_path) => RootOptions::new(base_path.clone())?,
        None => app_config.root_options(),
    };

    let mut api = Api::new(root_options)?;
    api.add_authentication(Arc::new(JwtAuthentication::from_config(app_config)));

    for model_config in &serve_config.models {
        api.generate(model_config.model(), model_config.options())
            .with_context(|| format!("failed to generate routes for '{}'", model_config.route))?;
    }

    Ok(api)
}
