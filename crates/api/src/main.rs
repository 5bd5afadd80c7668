//! Routinely - habit scheduling and skincare catalog backend
//!
//! Boots the application context and reports on it.
//!
//! ```text
//! routinely              # migrate and print a health report
//! routinely today <user> # print the user's today view as JSON
//! ```

use anyhow::{bail, Context};
use routinely_api::utils::logging::init_tracing;
use routinely_api::AppContext;

#[tokio::main]
#[allow(clippy::print_stdout)]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    let config = routinely_infra::config::load().context("loading configuration")?;
    init_tracing(&config.logging);
    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "loaded .env"),
        Err(e) => tracing::debug!(error = %e, "no .env file loaded"),
    }

    let ctx = AppContext::new_with_config(config).await.context("starting application context")?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.as_slice() {
        [] => {
            let health = ctx.health_check().await;
            println!("{}", serde_json::to_string_pretty(&health)?);
            if !health.is_healthy {
                bail!("application is unhealthy");
            }
        }
        [command, user_id] if command == "today" => {
            let view = ctx.today.get_today_habits(user_id).await?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        _ => bail!("usage: routinely [today <user-id>]"),
    }

    Ok(())
}
