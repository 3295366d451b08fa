//! Command-line front end for the book cache.
//!
//! The first argument names the page to load (`list`, `detail`, `edit`,
//! `delete`); flags stand in for the `id` query parameter and the edit form
//! fields. The outcome is printed as text, or as one JSON document with
//! `--json`.

use anyhow::{Context, Result, anyhow};
use bookcache::{
    BookId, EditFields, FileStore, OpenLibraryClient, Overrides, PageMode, PageRequest, Settings,
    init_logging, run_page,
};
use log::debug;
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = CliArgs::parse()?;
    init_logging()?;

    let settings = Settings::resolve(args.overrides)?;
    debug!(
        "store={} api={}",
        settings.store_path.display(),
        settings.api_base
    );

    let store = FileStore::new(&settings.store_path);
    let source = OpenLibraryClient::with_timeout(&settings.api_base, settings.timeout)?;

    let outcome = run_page(&args.request, &source, &store).await?;
    if args.json {
        println!("{}", serde_json::to_string(&outcome)?);
    } else {
        print!("{outcome}");
    }
    Ok(())
}

struct CliArgs {
    request: PageRequest,
    overrides: Overrides,
    json: bool,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = env::args_os().skip(1);
        let mut mode: Option<PageMode> = None;
        let mut id: Option<String> = None;
        let mut edits = EditFields::default();
        let mut overrides = Overrides::default();
        let mut json = false;

        while let Some(arg_os) = args.next() {
            let arg = os_to_string(arg_os);
            match arg.as_str() {
                "--id" => id = Some(next_value(&mut args, "--id")?),
                "--title" => edits.title = Some(next_value(&mut args, "--title")?),
                "--author" => edits.author = Some(next_value(&mut args, "--author")?),
                "--editorial" => edits.editorial = Some(next_value(&mut args, "--editorial")?),
                "--pages" => edits.pages = Some(next_value(&mut args, "--pages")?),
                "--store" => {
                    overrides.store = Some(PathBuf::from(next_value(&mut args, "--store")?))
                }
                "--api-base" => overrides.api_base = Some(next_value(&mut args, "--api-base")?),
                "--timeout-secs" => {
                    overrides.timeout_secs = Some(next_value(&mut args, "--timeout-secs")?)
                }
                "--json" => json = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                other if other.starts_with('-') => {
                    eprintln!("Unknown flag: {other}");
                    print_usage();
                    std::process::exit(1);
                }
                page => {
                    if mode.is_some() {
                        return Err(anyhow!("Unexpected argument: {page}"));
                    }
                    mode = Some(PageMode::try_from(page)?);
                }
            }
        }

        let mode = mode.ok_or_else(|| anyhow!("Missing page (one of list, detail, edit, delete)"))?;
        if !mode.takes_id() && id.is_some() {
            return Err(anyhow!("--id is not used by the {mode} page"));
        }
        if mode != PageMode::Edit && !edits.is_empty() {
            return Err(anyhow!("field flags are only accepted by the edit page"));
        }

        let mut request = PageRequest::new(mode).with_edits(edits);
        if let Some(id) = id {
            request = request.with_id(BookId(id));
        }

        Ok(Self {
            request,
            overrides,
            json,
        })
    }
}

fn next_value(args: &mut impl Iterator<Item = OsString>, flag: &str) -> Result<String> {
    args.next()
        .map(os_to_string)
        .ok_or_else(|| anyhow!("Missing value for {flag}"))
        .with_context(|| format!("parsing {flag}"))
}

fn os_to_string(value: OsString) -> String {
    value.to_string_lossy().into_owned()
}

fn print_usage() {
    eprintln!(
        "Usage: bookcache <list|detail|edit|delete> [--id ID] [--json]\n\
         \n\
         Pages:\n\
         \x20 list                 fetch a fresh catalog and list it\n\
         \x20 detail --id ID       show one cached book\n\
         \x20 edit --id ID         show the edit form; add field flags to save\n\
         \x20 delete --id ID       remove one book and list the rest\n\
         \n\
         Edit fields:\n\
         \x20 --title T  --author A  --editorial E  --pages P\n\
         \n\
         Settings:\n\
         \x20 --store PATH         cache file (env BOOKCACHE_STORE)\n\
         \x20 --api-base URL       API host (env BOOKCACHE_API_BASE)\n\
         \x20 --timeout-secs N     request timeout (env BOOKCACHE_TIMEOUT_SECS)\n\
         \x20 --json               print the outcome as JSON\n\
         \n\
         Logging is controlled by BOOKCACHE_LOG (default: warn)."
    );
}
