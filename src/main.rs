mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use role_scout::{logger, App, Config, DownloadOptions};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(api) = cli.api {
        config.api_base_url = api;
    }
    if cli.verbose {
        config.verbose_logging = true;
    }

    // 初始化日志
    logger::init(config.verbose_logging);

    match cli.command {
        Commands::Lookup { company, role, pdf } => {
            let app = App::initialize(config)?;
            app.lookup_one(&company, &role, pdf).await?;
        }
        Commands::Batch {
            file,
            max_rows,
            csv,
            no_download,
        } => {
            if let Some(max_rows) = max_rows {
                config.max_batch_rows = max_rows;
            }
            let app = App::initialize(config)?;
            let downloads = DownloadOptions {
                pdf: !no_download,
                csv: csv && !no_download,
            };
            app.run_batch(&file, downloads).await?;
        }
    }

    Ok(())
}
