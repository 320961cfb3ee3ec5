//!
//! openphotobox CLI binary
//! -----------------------
//! Command-line client for an OpenPhotobox backend. Signs in, lists the library,
//! uploads files and follows the live event stream. The session is kept in the
//! session file between runs.

use std::env;

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use openphotobox::api::types::{AlbumListParams, AssetListParams, LoginRequest, PersonListParams};
use openphotobox::api::{ApiResponse, EndpointMethod, SearchParams, UploadMetadata, UploadSource};
use openphotobox::cli::{print_records, response_value};
use openphotobox::upload::UploadObserver;
use openphotobox::{AppContext, ClientConfig};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--api <url>] [--json] <command> [args..]\n\nCommands:\n  login <user> <password>          sign in and remember the session\n  logout                           sign out and forget the session\n  whoami                           show the signed-in user (refreshed from the server)\n  setup-status                     report whether first-run setup is still needed\n  storage-status                   report whether a storage directory is configured\n  albums                           list albums\n  assets                           list assets\n  people                           list people\n  search <query>                   semantic search over the library\n  upload <files..> [--caption c]   upload files with progress\n  watch                            print asset_ready events as they arrive\n  call <method> <path> [json]      call any endpoint; json is the body (or query for GET)\n\nFlags:\n  --api <url>    Backend base URL (default: $OPENPHOTOBOX_API_BASE or http://localhost:8000)\n  --json         Print raw JSON instead of tables\n  -h, --help     Show this help\n\nEnvironment:\n  OPENPHOTOBOX_SESSION_FILE         where the session is stored\n  OPENPHOTOBOX_EVENTS_RECONNECT_MS  delay before the event stream reconnects\n  RUST_LOG                          log filter (default: info)"
    );
}

struct Options {
    api: Option<String>,
    json: bool,
    caption: Option<String>,
    command: String,
    args: Vec<String>,
}

fn parse_args(mut args: Vec<String>) -> Result<Option<Options>> {
    let mut api = None;
    let mut json = false;
    let mut caption = None;
    let mut rest = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--api" => {
                i += 1;
                api = Some(args.get(i).cloned().ok_or_else(|| anyhow!("--api requires a URL"))?);
            }
            "--caption" => {
                i += 1;
                caption = Some(args.get(i).cloned().ok_or_else(|| anyhow!("--caption requires a value"))?);
            }
            "--json" => json = true,
            "-h" | "--help" => return Ok(None),
            _ => rest.push(std::mem::take(&mut args[i])),
        }
        i += 1;
    }
    if rest.is_empty() {
        return Ok(None);
    }
    let command = rest.remove(0);
    Ok(Some(Options { api, json, caption, command, args: rest }))
}

fn emit<T: Serialize>(resp: ApiResponse<T>, json: bool) -> Result<()> {
    if let Some(details) = resp.error_details() {
        for e in &details.errors {
            eprintln!("  {}: {}", e.field, e.message);
        }
    }
    match response_value(resp)? {
        Some(val) => {
            if json || !print_records(&val) {
                println!("{}", serde_json::to_string_pretty(&val)?);
            }
        }
        None => println!("ok"),
    }
    Ok(())
}

struct ProgressPrinter;

impl UploadObserver for ProgressPrinter {
    fn on_progress(&self, id: &str, progress: u8) { println!("{id}: {progress}%"); }
    fn on_complete(&self, id: &str, asset_id: &str) { println!("{id}: stored as asset {asset_id}"); }
    fn on_error(&self, id: &str, error: &str) { eprintln!("{id}: {error}"); }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("invalid log filter")?;
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();

    let mut args: Vec<String> = env::args().collect();
    let program = args.remove(0);
    let Some(opts) = parse_args(args)? else {
        print_usage(&program);
        return Ok(());
    };

    let mut config = ClientConfig::from_env()?;
    if let Some(api) = &opts.api {
        config.api_base = ClientConfig::new(api)?.api_base;
    }
    let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(
        target: "openphotobox",
        "openphotobox {}: RUST_LOG='{}', api_base={}, session_file='{}'",
        opts.command, rust_log, config.api_base, config.session_file.display()
    );
    let ctx = AppContext::new(config)?;
    run(&ctx, opts).await
}

async fn run(ctx: &AppContext, opts: Options) -> Result<()> {
    let api = &ctx.api;
    match opts.command.as_str() {
        "login" => {
            let [user, password] = opts.args.as_slice() else { bail!("usage: login <user> <password>") };
            let resp = ctx.session.login(&LoginRequest::new(user, password)).await?;
            println!("signed in as {}", resp.user.username);
        }
        "logout" => {
            let next = ctx.session.logout().await;
            println!("signed out (next: {next})");
        }
        "whoami" => match ctx.session.get_profile().await? {
            Some(user) => println!("{}", serde_json::to_string_pretty(&user)?),
            None => bail!("not signed in"),
        },
        "setup-status" => emit(api.setup.check().await, true)?,
        "storage-status" => emit(api.storage.status().await, true)?,
        "albums" => emit(api.albums.list(Some(&AlbumListParams::default())).await, opts.json)?,
        "assets" => emit(api.assets.list(Some(&AssetListParams::default())).await, opts.json)?,
        "people" => emit(api.people.list(Some(&PersonListParams::default())).await, opts.json)?,
        "search" => {
            if opts.args.is_empty() {
                bail!("usage: search <query>");
            }
            emit(api.search.search(&SearchParams::query(opts.args.join(" "))).await, opts.json)?
        }
        "upload" => {
            if opts.args.is_empty() {
                bail!("usage: upload <files..> [--caption c]");
            }
            let uploader = ctx.uploader();
            let check = uploader.check_storage_configuration().await;
            if !check.configured {
                bail!(check.message.unwrap_or_default());
            }
            let mut sources = Vec::with_capacity(opts.args.len());
            for path in &opts.args {
                sources.push(UploadSource::from_path(path).await?);
            }
            let metadata = UploadMetadata { caption: opts.caption.clone(), ..Default::default() };
            let items = uploader.upload_files(sources, &ProgressPrinter, Some(&metadata)).await;
            let failed = items.iter().filter(|i| i.error.is_some()).count();
            if opts.json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            }
            if failed > 0 {
                bail!("{failed} of {} uploads failed", items.len());
            }
        }
        "watch" => {
            let _sub = ctx.events.on_asset_ready(|payload| println!("asset_ready {payload}"));
            let handle = ctx.start_events();
            tokio::signal::ctrl_c().await?;
            handle.abort();
        }
        "call" => {
            let (method, path) = match opts.args.as_slice() {
                [m, p, ..] => (m.parse::<EndpointMethod>().map_err(|e| anyhow!(e))?, p.clone()),
                _ => bail!("usage: call <method> <path> [json]"),
            };
            let payload: Option<Value> = match opts.args.get(2) {
                Some(raw) => Some(serde_json::from_str(raw).context("payload is not valid JSON")?),
                None => None,
            };
            let endpoint = api.utils.endpoint(method, path);
            let resp: ApiResponse<Value> = if method == EndpointMethod::Get {
                endpoint.call(None, payload.as_ref()).await
            } else {
                endpoint.call(payload.as_ref(), None).await
            };
            emit(resp, opts.json)?;
        }
        other => bail!("unknown command '{other}' (try --help)"),
    }
    Ok(())
}
