use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

mod cli;
mod config;
mod errors;
mod gateway;
mod log;
mod normalize;
mod prompt;
mod provider;
mod server;
mod ux;
mod wire;

use cli::{Command, GenerateArgs, ServeArgs};
use config::Config;
use gateway::Gateway;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    config::load_dotenv();

    let args = cli::Args::parse();
    let mut cfg = Config::load(args.config.as_deref())?;
    args.apply(&mut cfg);

    let prov = provider::make_provider(&cfg)?;
    let gateway = Gateway::from_config(&cfg, prov);

    match args.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(_) => {
            tracing::info!(provider = cfg.provider.label(), model = cfg.model(), "starting IdeaZen gateway");
            let server = server::ApiServer::new(cfg.bind_addr(), gateway);
            server.start().await
        }
        Command::Generate(g) => run_generate(&gateway, &g).await,
        Command::Verify => {
            let content = gateway
                .verify()
                .await
                .with_context(|| format!("{} verification failed", cfg.provider.label()))?;
            println!("{} verification: SUCCESS", cfg.provider.label());
            println!("Response content: {content}");
            Ok(())
        }
    }
}

async fn run_generate(gateway: &Gateway, g: &GenerateArgs) -> anyhow::Result<()> {
    let req = g.to_request();
    let result = gateway.generate(&req).await?;

    if g.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        ux::show_result(&result);
    }

    if let Some(dir) = &g.save_dir {
        let run = Uuid::new_v4();
        let saved = log::save_run(dir, run, &req, &gateway.prompt(&req), &gateway.settings().model, &result)?;
        eprintln!("saved run {run} to {}", saved.dir.display());
        eprintln!("  request:  {}", saved.request.display());
        eprintln!("  response: {}", saved.response.display());
    }
    Ok(())
}
