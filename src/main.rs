//! CLI entry point for the fakeua tool.

use anyhow::{Context, Result};
use clap::Parser;
use fakeua_core::convert::{self, ConvertInput, ConvertOptions};
use fakeua_core::{DatasetLoader, HttpFetcher, SamplingPolicy, Settings, UserAgent};
use tracing::{debug, info};

mod app_config;
mod cli;

use app_config::FileConfig;
use cli::{Args, Command, ConvertArgs, GetArgs, UpdateArgs};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let loaded = app_config::load_default_file_config()?;
    if loaded.config.is_some() {
        debug!(path = ?loaded.path, "loaded config file");
    }
    let file_config = loaded.file_config();

    match args.command {
        Command::Get(get) => run_get(get, &file_config).await,
        Command::Update(update) => run_update(update, &file_config).await,
        Command::Convert(convert) => run_convert(convert, &file_config).await,
    }
}

fn settings_from(file_config: &FileConfig) -> Settings {
    let mut settings = Settings::default();
    file_config.apply(&mut settings);
    settings
}

fn loader_from(file_config: &FileConfig, data: Option<std::path::PathBuf>) -> Result<DatasetLoader> {
    let mut loader = DatasetLoader::new(settings_from(file_config))
        .context("Failed to create HTTP client")?
        .use_remote_fallback(file_config.use_remote_fallback.unwrap_or(true))
        .verify_tls(file_config.verify_tls.unwrap_or(true));
    if let Some(path) = data {
        loader = loader.with_path(path);
    }
    Ok(loader)
}

async fn run_get(args: GetArgs, file_config: &FileConfig) -> Result<()> {
    let mut builder = UserAgent::builder()
        .min_version(args.min_version)
        .min_percentage(args.min_percentage);
    if args.browser != fakeua_core::sampler::RANDOM {
        builder = builder.browsers([args.browser.as_str()]);
    }
    if !args.os.is_empty() {
        builder = builder.os(&args.os);
    }
    if !args.platform.is_empty() {
        builder = builder.platforms(&args.platform);
    }
    if args.weighted {
        builder = builder.sampling(SamplingPolicy::Weighted);
    }
    if args.no_fallback {
        builder = builder.no_fallback();
    }
    if let Some(path) = args.data {
        builder = builder.loader(loader_from(file_config, Some(path))?);
    }

    let accessor = builder.build().await.context("Failed to load user agents")?;
    let record = accessor
        .get_browser(&args.browser)
        .with_context(|| format!("No user agent for '{}'", args.browser))?;

    if args.json {
        let line = serde_json::to_string(&record).context("Failed to encode record")?;
        println!("{line}");
    } else {
        println!("{}", record.useragent);
    }
    Ok(())
}

async fn run_update(args: UpdateArgs, file_config: &FileConfig) -> Result<()> {
    let mut loader = loader_from(file_config, args.data)?;
    if args.no_remote_fallback {
        loader = loader.use_remote_fallback(false);
    }
    if args.insecure {
        loader = loader.verify_tls(false);
    }

    info!(path = %loader.path().display(), "rebuilding dataset");
    let dataset = loader.update().await.context("Failed to rebuild dataset")?;
    info!(
        records = dataset.len(),
        path = %loader.path().display(),
        "dataset updated"
    );
    Ok(())
}

async fn run_convert(args: ConvertArgs, file_config: &FileConfig) -> Result<()> {
    let input = match (args.input, args.download) {
        (Some(path), _) => ConvertInput::File(path),
        (None, Some(url)) => ConvertInput::Url(url),
        (None, None) => anyhow::bail!("Either --input or --download is required"),
    };
    let options = ConvertOptions {
        limit: args.limit.and_then(|n| usize::try_from(n).ok()),
        threads: args.threads.and_then(|n| usize::try_from(n).ok()),
    };
    let fetcher = HttpFetcher::new(&settings_from(file_config))
        .context("Failed to create HTTP client")?;

    let summary = convert::run(&input, &args.output, &options, &fetcher)
        .await
        .with_context(|| format!("Failed to convert into {}", args.output.display()))?;
    info!(
        parsed = summary.parsed,
        written = summary.written,
        output = %args.output.display(),
        "conversion finished"
    );
    Ok(())
}
