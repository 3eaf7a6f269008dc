use anyhow::Context as _;
use clap::{Parser, Subcommand};
use polyglot::{config, Formatter, Localizer, MemoryDocument, UrlContext, Vars};
use polyglot_memory::{DiagnosticsLog, Store};
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "polyglot",
    version,
    about = "Resolve languages, look up translations and localize documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "polyglot.toml")]
    config: String,

    /// Address the application was opened with; its language parameter
    /// overrides every other preference.
    #[arg(short, long)]
    url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which language would be selected and why.
    Resolve,
    /// Look up a dotted key in the active language.
    Translate {
        /// Dotted key, e.g. `nav.home`.
        key: String,
        /// Placeholder values as `name=value`.
        vars: Vec<String>,
        /// Switch to this language first.
        #[arg(short, long)]
        lang: Option<String>,
    },
    /// Localize a JSON document and print or write the result.
    Sync {
        /// Document file (`{"lang": "...", "elements": [...]}`).
        document: String,
        /// Switch to this language first.
        #[arg(short, long)]
        lang: Option<String>,
        /// Write here instead of stdout.
        #[arg(short, long)]
        out: Option<String>,
    },
    /// Format a value with the active language's conventions.
    Format {
        #[command(subcommand)]
        kind: FormatKind,
        /// Format for this language instead of the resolved one.
        #[arg(short, long, global = true)]
        lang: Option<String>,
    },
    /// Show recorded load failures and the most frequent missing keys.
    Diagnostics {
        #[arg(short, long, default_value_t = 10)]
        limit: i64,
    },
}

#[derive(Subcommand)]
enum FormatKind {
    Number {
        value: f64,
        #[arg(short, long, default_value_t = 2)]
        decimals: usize,
    },
    Currency {
        amount: f64,
    },
    /// Date as `YYYY-MM-DD`.
    Date {
        date: chrono::NaiveDate,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (cfg, defaulted) = load_config(&cli.config)?;
    let _log_guard = init_logging(&cfg.general)?;
    if defaulted {
        tracing::info!("config file {} not found, using defaults", cli.config);
    }

    let app = App::build(&cfg, cli.url.as_deref()).await?;
    let env_locale = sys_locale::get_locale();
    app.run(&cfg, cli.command, env_locale.as_deref()).await
}

/// Load `path`, reporting whether the file was missing and defaults apply.
fn load_config(path: &str) -> anyhow::Result<(config::Config, bool)> {
    let defaulted = !Path::new(path).exists();
    Ok((config::load(path)?, defaulted))
}

/// Everything a command needs, built from config.
struct App {
    localizer: Localizer,
    request: Option<Arc<UrlContext>>,
    store: Option<Store>,
    diagnostics: Option<JoinHandle<()>>,
}

impl App {
    async fn build(cfg: &config::Config, url: Option<&str>) -> anyhow::Result<Self> {
        let supported = cfg.languages.to_supported()?;
        let source = polyglot_sources::from_config(&cfg.source)?;
        let (preferences, store) = polyglot_memory::from_config(&cfg.store).await?;

        let mut localizer = Localizer::new(supported, Arc::from(source), preferences)
            .with_document_config(cfg.document.clone());

        let request = match url {
            Some(url) => Some(Arc::new(UrlContext::parse(url, cfg.request.param.clone())?)),
            None => None,
        };
        if let Some(ref request) = request {
            localizer = localizer.with_request_context(request.clone());
        }

        let diagnostics = store.as_ref().map(|store| {
            let log = DiagnosticsLog::new(store.pool().clone());
            tokio::spawn(log.run(localizer.subscribe()))
        });

        Ok(Self {
            localizer,
            request,
            store,
            diagnostics,
        })
    }

    /// Run one command, then shut down whether or not it succeeded.
    async fn run(
        self,
        cfg: &config::Config,
        command: Commands,
        env_locale: Option<&str>,
    ) -> anyhow::Result<()> {
        let result = self.execute(cfg, command, env_locale).await;
        self.shutdown().await;
        result
    }

    async fn execute(
        &self,
        cfg: &config::Config,
        command: Commands,
        env_locale: Option<&str>,
    ) -> anyhow::Result<()> {
        match command {
            Commands::Resolve => {
                let (language, from) = self.localizer.resolve(env_locale).await;
                println!("language: {language}");
                println!("source:   {from:?}");
                println!(
                    "supported: {}",
                    self.localizer
                        .supported()
                        .iter()
                        .map(|c| c.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                if let Some(ref request) = self.request {
                    println!("url:      {}", request.url());
                }
            }
            Commands::Translate { key, vars, lang } => {
                self.activate(env_locale, lang.as_deref()).await?;
                let vars = Vars::from_pairs(&vars);
                println!("{}", self.localizer.translate(&key, &vars));
            }
            Commands::Sync {
                document,
                lang,
                out,
            } => {
                let text = std::fs::read_to_string(&document)
                    .with_context(|| format!("failed to read {document}"))?;
                let mut doc = MemoryDocument::from_json_str(&text)?;

                self.activate(env_locale, lang.as_deref()).await?;
                let report = self.localizer.sync_document(&mut doc);
                tracing::info!(
                    "synchronized {} elements and {} selectors in {}",
                    report.translated,
                    report.selectors,
                    self.localizer.current_language()
                );

                let rendered = doc.to_json_pretty()?;
                match out {
                    Some(path) => std::fs::write(&path, rendered)
                        .with_context(|| format!("failed to write {path}"))?,
                    None => println!("{rendered}"),
                }
            }
            Commands::Format { kind, lang } => {
                let language = match lang {
                    Some(ref raw) => self.localizer.supported().coerce(raw),
                    None => self.localizer.resolve(env_locale).await.0,
                };
                let formatter = Formatter::new(&language, &cfg.format);
                let rendered = match kind {
                    FormatKind::Number { value, decimals } => formatter.number(value, decimals),
                    FormatKind::Currency { amount } => formatter.currency(amount),
                    FormatKind::Date { date } => formatter.date(date),
                };
                println!("{rendered}");
            }
            Commands::Diagnostics { limit } => {
                let Some(ref store) = self.store else {
                    anyhow::bail!(
                        "diagnostics need the sqlite store backend (store.backend = \"{}\")",
                        cfg.store.backend
                    );
                };
                let log = DiagnosticsLog::new(store.pool().clone());

                println!("Recent load failures:");
                let failures = log.recent_load_failures(limit).await?;
                if failures.is_empty() {
                    println!("  (none)");
                }
                for f in failures {
                    println!("  {} {}: {}", f.created_at, f.language, f.error);
                }

                println!("\nMost frequent missing keys:");
                let missing = log.top_missing_keys(limit).await?;
                if missing.is_empty() {
                    println!("  (none)");
                }
                for m in missing {
                    println!("  {:>5}  {}  {}", m.count, m.language, m.key);
                }
            }
        }
        Ok(())
    }

    /// Start the localizer, then switch to `lang` unless it is already active.
    async fn activate(&self, env_locale: Option<&str>, lang: Option<&str>) -> anyhow::Result<()> {
        self.localizer.start(env_locale).await;
        if let Some(lang) = lang {
            self.localizer.ensure_language(lang).await?;
        }
        Ok(())
    }

    /// Drop the localizer so the diagnostics task sees the channel close,
    /// then wait for it to flush.
    async fn shutdown(self) {
        let Self {
            localizer,
            diagnostics,
            ..
        } = self;
        drop(localizer);
        if let Some(handle) = diagnostics {
            if let Err(e) = handle.await {
                tracing::warn!("diagnostics task failed: {e}");
            }
        }
    }
}

/// Install the tracing subscriber. `RUST_LOG` wins over `general.log_level`.
/// When `general.log_dir` is set, logs go to a file there instead of stderr.
fn init_logging(general: &config::GeneralConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&general.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if general.log_dir.is_empty() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    }

    let dir = config::shellexpand(&general.log_dir);
    std::fs::create_dir_all(Path::new(&dir))
        .with_context(|| format!("failed to create log dir {dir}"))?;
    let appender = tracing_appender::rolling::never(&dir, "polyglot.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(Some(guard))
}
