use anyhow::{Context, Result, anyhow, bail};
use bookcache::{
    BookId, BookRecord, CatalogSource, EditionDetail, FileStore, Pages, RawAuthor, RawWork,
};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::process::{Command, Output};
use std::thread;
use tempfile::TempDir;

/// Catalog source answering from fixed data and recording edition lookups.
#[derive(Default)]
pub struct ScriptedSource {
    works: Option<Vec<RawWork>>,
    details: BTreeMap<String, EditionDetail>,
    lookups: RefCell<Vec<Option<String>>>,
}

impl ScriptedSource {
    pub fn listing(works: Vec<RawWork>) -> Self {
        Self {
            works: Some(works),
            ..Self::default()
        }
    }

    /// Source whose listing request fails.
    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn with_detail(mut self, key: &str, publisher: &str, pages: u64) -> Self {
        self.details.insert(
            key.to_string(),
            EditionDetail {
                publisher: Some(publisher.to_string()),
                pages: Some(pages),
            },
        );
        self
    }

    pub fn lookups(&self) -> Vec<Option<String>> {
        self.lookups.borrow().clone()
    }
}

impl CatalogSource for ScriptedSource {
    async fn fetch_subject_works(&self) -> Result<Vec<RawWork>> {
        self.works
            .clone()
            .ok_or_else(|| anyhow!("connection refused"))
    }

    async fn fetch_work_detail(&self, edition_key: Option<&str>) -> EditionDetail {
        self.lookups
            .borrow_mut()
            .push(edition_key.map(str::to_string));
        edition_key
            .and_then(|key| self.details.get(key).cloned())
            .unwrap_or_default()
    }
}

pub fn raw_work(key: Option<&str>, title: &str, author: Option<&str>) -> RawWork {
    RawWork {
        cover_edition_key: key.map(str::to_string),
        title: Some(title.to_string()),
        authors: author
            .map(|name| {
                vec![RawAuthor {
                    name: Some(name.to_string()),
                }]
            })
            .unwrap_or_default(),
    }
}

pub fn record(id: &str, title: &str, author: &str) -> BookRecord {
    BookRecord {
        id: BookId::from(id),
        title: title.to_string(),
        author: author.to_string(),
        editorial: "Vintage".to_string(),
        pages: Pages::Count(250),
    }
}

/// Empty temp dir plus a file store inside it.
pub fn temp_store() -> Result<(TempDir, FileStore)> {
    let dir = TempDir::new().context("failed to allocate temp dir")?;
    let store = FileStore::new(dir.path().join("storage.json"));
    Ok((dir, store))
}

/// Run the compiled binary against `store_path` with no network configured.
pub fn run_bookcache(store_path: &Path, args: &[&str]) -> Result<Output> {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_bookcache"));
    cmd.args(args)
        .arg("--store")
        .arg(store_path)
        .arg("--api-base")
        .arg("http://127.0.0.1:9")
        .env_remove("BOOKCACHE_LOG");
    cmd.output()
        .with_context(|| format!("failed to run command: {:?}", cmd))
}

pub fn stdout_of(output: &Output) -> Result<String> {
    if !output.status.success() {
        bail!(
            "command failed: status {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// One canned reply: requests whose target starts with `prefix` get `status`
/// and `body`.
pub struct Canned {
    pub prefix: &'static str,
    pub status: u16,
    pub body: String,
}

impl Canned {
    pub fn new(prefix: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self {
            prefix,
            status,
            body: body.into(),
        }
    }
}

/// Serve canned replies on a loopback port from a background thread and
/// return the base URL. Unmatched targets get a 404.
pub fn serve_canned(replies: Vec<Canned>) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").context("failed to bind loopback port")?;
    let addr = listener.local_addr()?;
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let _ = answer(stream, &replies);
        }
    });
    Ok(format!("http://{addr}"))
}

fn answer(mut stream: TcpStream, replies: &[Canned]) -> io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header)? == 0 || header == "\r\n" {
            break;
        }
    }

    let target = request_line.split_whitespace().nth(1).unwrap_or("/");
    let (status, body) = replies
        .iter()
        .find(|reply| target.starts_with(reply.prefix))
        .map(|reply| (reply.status, reply.body.as_str()))
        .unwrap_or((404, "not found"));
    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        503 => "Service Unavailable",
        _ => "Status",
    };
    write!(
        stream,
        "HTTP/1.1 {status} {reason}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )?;
    stream.flush()
}
