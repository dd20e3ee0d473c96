use stockwatch::adapters::postgres::{create_pool, run_migrations};
use stockwatch::application::{Ports, ServiceOptions, StockWatch};
use stockwatch::config::AppConfig;
use stockwatch::telemetry;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // The subscriber may not be installed yet.
        eprintln!("stockwatch: {e}");
        tracing::error!("Startup failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    telemetry::init(&config.logging);

    let pool = create_pool(&config.database).await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    if config.database.run_migrations {
        run_migrations(&pool).await?;
        tracing::info!("Migrations applied");
    }

    let service = StockWatch::new(Ports::postgres(pool), ServiceOptions::from(&config));
    let plans = service.list_plans().await;
    match plans.into_data() {
        Some(catalogue) => tracing::info!(
            plans = catalogue.plans.len(),
            addons = catalogue.addons.len(),
            "Plan catalogue loaded"
        ),
        None => return Err("failed to load plan catalogue".into()),
    }

    Ok(())
}
