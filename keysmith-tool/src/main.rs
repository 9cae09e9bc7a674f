//! Keysmith keyset tool
//!
//! Keyset files are always written encrypted under the configured master
//! key (`KEYSMITH_MASTER_KEY`, required). Relative paths resolve against
//! `KEYSMITH_KEYSET_DIR`. Run with `--help` for the command list.
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Cli, Context};
use keysmith_config::KeysmithConfig;
use keysmith_keys::init_keyset_manager;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = KeysmithConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    let logging = if config.log_json {
        keysmith_logging::init_logging("keysmith-tool", &config.log_level())
    } else {
        keysmith_logging::init_console_logging("keysmith-tool", &config.log_level())
    };
    logging.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(keyset_dir = %config.keyset_dir.display(), "Configuration loaded");

    let ctx = Context::from_config(config, init_keyset_manager())?;

    match commands::run(&ctx, cli.command).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Command failed");
            Err(e)
        }
    }
}
