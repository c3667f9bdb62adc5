pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "sankhya")]
#[command(about = "Sankhya CLI - Validate, run and inspect read-only ERP queries")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Check a statement against the read-only rules without sending it")]
    Validate {
        #[arg(help = "SQL statement")]
        sql: String,
    },

    #[command(about = "Log in to the Sankhya API and print the issued token")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, env = "SANKHYA_PASSWORD", help = "Password (or SANKHYA_PASSWORD)")]
        password: String,
    },

    #[command(about = "Validate and execute a statement through the gateway")]
    Query {
        #[arg(help = "SQL statement")]
        sql: String,
        #[arg(long, env = "SANKHYA_TOKEN", help = "Upstream bearer token (or SANKHYA_TOKEN)")]
        token: String,
        #[arg(long = "param", help = "Positional parameter, parsed as JSON when possible")]
        params: Vec<String>,
    },

    #[command(about = "Print schema, relations and primary keys of a table")]
    Inspect {
        #[arg(help = "Table name, e.g. TGFPRO")]
        table: String,
        #[arg(long, env = "SANKHYA_TOKEN", help = "Upstream bearer token (or SANKHYA_TOKEN)")]
        token: String,
        #[arg(long, help = "Print the field/relation summary instead of raw metadata")]
        module: bool,
    },

    #[command(about = "Decode a token's claims without verifying its signature")]
    Decode {
        #[arg(help = "JWT issued by the Sankhya API")]
        token: String,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Validate { sql } => commands::validate::handle(&sql, output_format),
        Commands::Decode { token } => commands::decode::handle(&token, output_format),
        Commands::Login { username, password } => {
            commands::login::handle(&username, &password, output_format).await
        }
        Commands::Query { sql, token, params } => {
            commands::query::handle(&sql, &token, &params, output_format).await
        }
        Commands::Inspect { table, token, module } => {
            commands::inspect::handle(&table, &token, module, output_format).await
        }
    }
}
