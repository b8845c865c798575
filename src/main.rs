use anyhow::Result;
use org2comment::{cli::parse_args, run};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = parse_args()?;

    env_logger::Builder::new()
        .filter_level(config.log_level())
        .format_timestamp(None)
        .parse_default_env()
        .init();

    run(config).await
}
