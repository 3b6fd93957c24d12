use std::sync::Arc;

use gator::{build_registry, config_path, Config, Context, Database};

#[tokio::main]
async fn main() {
    gator::logging::init("warn");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        eprintln!("usage: gator <command> [args...]");
        std::process::exit(1);
    };

    let config_path = config_path();
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let db = match Database::connect(&config.db_url).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let registry = build_registry();
    let ctx = Context::new(Arc::new(db), config_path);

    if let Err(e) = registry.run(command, ctx, rest.to_vec()).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
