use anyhow::Context;
use api_connector::utils::{logger, validation::Validate};
use api_connector::{
    ApiBody, ApiConnector, ApiError, CliConfig, Command, ReqwestTransport, RequestConfig,
    StaticHost,
};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger(cli.verbose, config.log_level());
    } else {
        logger::init_cli_logger(cli.verbose, config.log_level());
    }

    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let transport = ReqwestTransport::from_settings(config.scheme(), &config.transport_settings())
        .context("failed to build HTTP transport")?;
    let connector = ApiConnector::new(transport, StaticHost::new(config.host()));
    let prefix = Some(config.prefix());

    tracing::info!("🌐 Using API host: {}", connector.host());

    if let Err(e) = run(&connector, cli.command, prefix).await {
        match e.downcast_ref::<ApiError>() {
            Some(api_error) => {
                tracing::error!("❌ Request failed: {}", api_error);
                eprintln!("❌ {}", api_error);
                std::process::exit(2);
            }
            None => return Err(e),
        }
    }

    Ok(())
}

async fn run(
    connector: &ApiConnector<ReqwestTransport, StaticHost>,
    command: Command,
    prefix: Option<&str>,
) -> anyhow::Result<()> {
    let options = RequestConfig::new();

    match command {
        Command::Fetch { path } => {
            let value: serde_json::Value = connector.fetch_api(&path, options, prefix).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Command::Get { path } => {
            let text = connector.get_api(&path, options, prefix).await?;
            println!("{}", text);
        }
        Command::Head { path } => {
            let not_ok = connector.head_api(&path, options, prefix).await?;
            println!("{}", if not_ok { "not ok" } else { "ok" });
        }
        Command::Download { path, output } => {
            let bytes = connector.download_api(&path, options, prefix).await?;
            tokio::fs::write(&output, &bytes)
                .await
                .with_context(|| format!("failed to write {}", output.display()))?;
            tracing::info!("📁 Saved {} bytes to {}", bytes.len(), output.display());
        }
        Command::Post { path, body } => {
            let body = parse_body(body.as_deref())?;
            let result = connector
                .post_api(&path, body.as_ref(), options, prefix)
                .await?;
            print_body(result)?;
        }
        Command::Patch { path, body } => {
            let body = parse_body(body.as_deref())?;
            let result = connector
                .patch_api(&path, body.as_ref(), options, prefix)
                .await?;
            print_body(result)?;
        }
        Command::Delete { path } => {
            let value: serde_json::Value = connector.delete_api(&path, options, prefix).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}

fn parse_body(body: Option<&str>) -> anyhow::Result<Option<serde_json::Value>> {
    body.map(|raw| serde_json::from_str(raw).context("--body must be valid JSON"))
        .transpose()
}

fn print_body(body: ApiBody<serde_json::Value>) -> anyhow::Result<()> {
    match body {
        ApiBody::Parsed(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        ApiBody::Raw(text) => println!("{}", text),
    }
    Ok(())
}
