mod render;
mod shell;

use anyhow::Context;
use clap::{Parser, Subcommand};
use env_logger::{Builder, Env};
use log::error;
use render::{FileInfo, hex_dump, page_from_text};
use std::path::{Path, PathBuf};
use storage::config::PageFileOptions;
use storage::disk::file_handle::FileHandle;
use storage::disk::file_system::PageFileManager;
use storage::disk::page_store::PageStore;
use storage::page::page_file::Page;

#[derive(Parser)]
#[command(name = "pagectl")]
#[command(about = "Create, inspect and edit fixed-size page files")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long, default_value = ".")]
    data_dir: String,

    /// JSON file with page file options
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    Create {
        name: String,
    },
    Destroy {
        name: String,
    },
    Info {
        name: String,
        #[arg(long)]
        json: bool,
    },
    Read {
        name: String,
        page: u32,
    },
    Write {
        name: String,
        page: u32,
        #[arg(long, conflicts_with = "text")]
        fill: Option<u8>,
        #[arg(long)]
        text: Option<String>,
    },
    Append {
        name: String,
    },
    Ensure {
        name: String,
        pages: u32,
    },
    Shell,
}

fn init_logger() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = run(Cli::parse()) {
        error!("{:?}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let data_dir = std::env::var("PAGECTL_DATA").unwrap_or(cli.data_dir);
    let options = load_options(cli.config.as_deref())?;
    let pm = PageFileManager::with_options(&data_dir, options)
        .with_context(|| format!("initializing data dir {:?}", data_dir))?;

    match cli.command {
        Some(command) => execute(command, &pm),
        None => shell::run(&pm),
    }
}

fn load_options(path: Option<&Path>) -> anyhow::Result<PageFileOptions> {
    let Some(path) = path else {
        return Ok(PageFileOptions::default());
    };
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {:?}", path))
}

fn execute(command: Commands, pm: &PageFileManager) -> anyhow::Result<()> {
    match command {
        Commands::Create { name } => {
            pm.create_page_file(&name)?;
            println!("created {}", name);
        }
        Commands::Destroy { name } => {
            pm.destroy_page_file(&name)?;
            println!("destroyed {}", name);
        }
        Commands::Info { name, json } => {
            with_page_file(pm, &name, |fh| {
                let info = FileInfo::gather(fh, pm.options().page_count_policy)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&info)?);
                } else {
                    println!("{}", info.to_text());
                }
                Ok(())
            })?;
        }
        Commands::Read { name, page } => {
            with_page_file(pm, &name, |fh| {
                let mut pg = Page::zeroed();
                fh.read_block(page, &mut pg)?;
                print!("{}", hex_dump(&pg));
                Ok(())
            })?;
        }
        Commands::Write {
            name,
            page,
            fill,
            text,
        } => {
            let pg = match (fill, text) {
                (Some(byte), None) => Page::filled(byte),
                (None, Some(text)) => page_from_text(&text)?,
                _ => anyhow::bail!("write needs exactly one of --fill or --text"),
            };
            with_page_file(pm, &name, |fh| Ok(fh.write_block(page, &pg)?))?;
            println!("wrote page {} of {}", page, name);
        }
        Commands::Append { name } => {
            let total = with_page_file(pm, &name, |fh| {
                fh.append_empty_block()?;
                Ok(fh.total_pages()?)
            })?;
            println!("{} now has {} pages", name, total);
        }
        Commands::Ensure { name, pages } => {
            let total = with_page_file(pm, &name, |fh| {
                fh.ensure_capacity(pages)?;
                Ok(fh.total_pages()?)
            })?;
            println!("{} has {} pages", name, total);
        }
        Commands::Shell => shell::run(pm)?,
    }
    Ok(())
}

/// Opens `name`, runs `f`, and closes the file again whatever `f` returned.
fn with_page_file<T>(
    pm: &PageFileManager,
    name: &str,
    f: impl FnOnce(&mut FileHandle) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    let mut fh = pm.open_page_file(name)?;
    let result = f(&mut fh);
    let closed = fh.close();
    let value = result?;
    closed?;
    Ok(value)
}
