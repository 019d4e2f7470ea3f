use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mapsprobe::{AbstractTest, Config, Suite};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mapsprobe=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // mapsprobe [IUT_URL] [--json] [--test <id>]...
    let args: Vec<String> = env::args().skip(1).collect();
    let json_output = args.iter().any(|arg| arg == "--json");

    let mut selected = Vec::new();
    let mut iut = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => {}
            "--test" | "-t" => {
                let id = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--test needs an abstract test id"))?;
                let test = AbstractTest::from_id(id)
                    .ok_or_else(|| anyhow::anyhow!("Unknown abstract test: {}", id))?;
                selected.push(test);
            }
            other if other.starts_with('-') => anyhow::bail!("Unknown option: {}", other),
            other => iut = Some(other.to_string()),
        }
    }

    // Load configuration
    let mut config = Config::load()?;
    if let Some(iut) = iut {
        Arc::make_mut(&mut config).iut = Some(iut);
    }

    let suite = Suite::new(config)?;
    let report = if selected.is_empty() {
        suite.run().await
    } else {
        suite.run_tests(&selected).await
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report);
    }

    Ok(if report.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
