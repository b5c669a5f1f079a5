use dotenvy::dotenv;
use gramfetch::bot::handlers::Command;
use gramfetch::config::{Settings, COOKIES_FILE, DOWNLOAD_DIR};
use gramfetch::download::{Extractor, ExtractorConfig};
use gramfetch::{bot, config};
use regex::Regex;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Regex patterns for redacting the bot token from log output
struct RedactionPatterns {
    token1: Regex,
    token2: Regex,
    token3: Regex,
}

impl RedactionPatterns {
    /// Initialize all regex patterns
    ///
    /// # Errors
    ///
    /// Returns an error if any regex pattern is invalid
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            token1: Regex::new(r"(https?://[^/]+/bot)([0-9]+:[A-Za-z0-9_-]+)(/['\s]*)")?,
            token2: Regex::new(r"([0-9]{8,10}:[A-Za-z0-9_-]{35})")?,
            token3: Regex::new(r"(bot[0-9]{8,10}:)[A-Za-z0-9_-]+")?,
        })
    }

    fn redact(&self, input: &str) -> String {
        let mut output = input.to_string();
        output = self
            .token1
            .replace_all(&output, "$1[TELEGRAM_TOKEN]$3")
            .to_string();
        output = self
            .token2
            .replace_all(&output, "[TELEGRAM_TOKEN]")
            .to_string();
        output = self
            .token3
            .replace_all(&output, "$1[TELEGRAM_TOKEN]")
            .to_string();
        output
    }
}

struct RedactingWriter<W: Write> {
    inner: W,
    patterns: Arc<RedactionPatterns>,
}

impl<W: Write> RedactingWriter<W> {
    const fn new(inner: W, patterns: Arc<RedactionPatterns>) -> Self {
        Self { inner, patterns }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        let redacted = self.patterns.redact(&s);
        self.inner.write_all(redacted.as_bytes())?;
        // We return the original buffer length to satisfy the contract,
        // even if the redacted string length differs.
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct RedactingMakeWriter<F> {
    make_inner: F,
    patterns: Arc<RedactionPatterns>,
}

impl<F> RedactingMakeWriter<F> {
    const fn new(make_inner: F, patterns: Arc<RedactionPatterns>) -> Self {
        Self {
            make_inner,
            patterns,
        }
    }
}

impl<'a, F, W> tracing_subscriber::fmt::MakeWriter<'a> for RedactingMakeWriter<F>
where
    F: Fn() -> W + 'static,
    W: Write,
{
    type Writer = RedactingWriter<W>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter::new((self.make_inner)(), self.patterns.clone())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv().ok();

    // Initialize redaction patterns early (before logging)
    let patterns = Arc::new(RedactionPatterns::new().map_err(|e| {
        eprintln!("Failed to compile regex patterns: {e}");
        e
    })?);

    // Setup logging with redaction
    init_logging(patterns);

    info!("Starting Instagram Downloader Bot...");

    // Load settings
    let settings = init_settings();
    info!("Telegram application id: {}", settings.api_id);

    init_download_dir();
    materialize_cookies(&settings);

    let extractor = Arc::new(Extractor::new(ExtractorConfig {
        download_dir: PathBuf::from(DOWNLOAD_DIR),
        cookies_file: PathBuf::from(COOKIES_FILE),
        user_agent: config::EXTRACTOR_USER_AGENT.to_string(),
        referer: config::EXTRACTOR_REFERER.to_string(),
        timeout: Duration::from_secs(config::EXTRACTION_TIMEOUT_SECS),
        max_concurrent: config::MAX_CONCURRENT_EXTRACTIONS,
    }));

    let bot = Bot::new(settings.bot_token.clone());
    let handler = setup_handler();

    info!("Bot is running...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![extractor])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

fn init_logging(patterns: Arc<RedactionPatterns>) {
    let make_writer = RedactingMakeWriter::new(io::stderr, patterns);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(make_writer))
        .init();
}

fn init_settings() -> Settings {
    match Settings::new() {
        Ok(s) => {
            info!("Configuration loaded successfully.");
            s
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_download_dir() {
    match std::fs::create_dir_all(DOWNLOAD_DIR) {
        Ok(()) => info!("Download directory: {}", DOWNLOAD_DIR),
        Err(e) => {
            error!("Failed to create download directory: {}", e);
            std::process::exit(1);
        }
    }
}

/// Write the cookies file from the environment-supplied value, explicitly
/// and before the extractor is built. A write failure is not fatal: private
/// content will fail later with a classified error instead.
fn materialize_cookies(settings: &Settings) {
    if let Some(content) = &settings.cookies_content {
        info!("Found COOKIES_CONTENT, writing to {COOKIES_FILE}");
        if let Err(e) = std::fs::write(COOKIES_FILE, content) {
            error!("Failed to write {COOKIES_FILE} from env var: {e}");
        }
    }

    let found = Path::new(COOKIES_FILE).exists();
    info!(
        "Cookies file: {}",
        if found { "Found" } else { "Not found" }
    );
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry().branch(
        Update::filter_message()
            .branch(
                dptree::entry()
                    .filter_command::<Command>()
                    .endpoint(handle_command),
            )
            .branch(
                dptree::filter(|msg: Message| msg.chat.is_private() && msg.text().is_some())
                    .endpoint(handle_text_message),
            )
            .branch(
                dptree::filter(|msg: Message| {
                    msg.photo().is_some() || msg.video().is_some() || msg.document().is_some()
                })
                .endpoint(handle_media_message),
            ),
    )
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
) -> Result<(), teloxide::RequestError> {
    let res = match cmd {
        Command::Start => bot::handlers::start(bot, msg).await,
        Command::Help => bot::handlers::help(bot, msg).await,
    };
    if let Err(e) = res {
        error!("Command error: {}", e);
    }
    respond(())
}

async fn handle_text_message(
    bot: Bot,
    msg: Message,
    extractor: Arc<Extractor>,
) -> Result<(), teloxide::RequestError> {
    let chat_id = msg.chat.id;
    if let Err(e) = Box::pin(bot::handlers::handle_text(bot.clone(), msg, extractor)).await {
        error!("Text handler error: {:#}", e);
        if let Err(send_err) = bot::handlers::report_unexpected_failure(bot, chat_id).await {
            error!("Failed to send failure notice: {}", send_err);
        }
    }
    respond(())
}

async fn handle_media_message(bot: Bot, msg: Message) -> Result<(), teloxide::RequestError> {
    if let Err(e) = bot::handlers::reject_media(bot, msg).await {
        error!("Media handler error: {}", e);
    }
    respond(())
}
