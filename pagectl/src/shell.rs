use crate::render::{FileInfo, hex_dump};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::Write;
use storage::disk::file_handle::FileHandle;
use storage::disk::file_system::PageFileManager;
use storage::disk::page_store::PageStore;
use storage::page::page_file::Page;

#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Interactive session holding at most one open page file.
pub struct Session<'a> {
    pm: &'a PageFileManager,
    fh: FileHandle,
}

impl<'a> Session<'a> {
    pub fn new(pm: &'a PageFileManager) -> Self {
        Self {
            pm,
            fh: FileHandle::closed(),
        }
    }

    pub fn handle(&self) -> &FileHandle {
        &self.fh
    }

    pub fn execute(&mut self, line: &str, out: &mut impl Write) -> anyhow::Result<Flow> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&cmd, args)) = words.split_first() else {
            return Ok(Flow::Continue);
        };

        let mut pg = Page::zeroed();
        match (cmd.to_lowercase().as_str(), args) {
            ("exit" | "quit", []) => {
                if self.fh.is_open() {
                    self.fh.close()?;
                }
                return Ok(Flow::Exit);
            }
            ("help", []) => print_help(out)?,
            ("clear" | "cls", []) => {
                write!(out, "\x1B[2J\x1B[1;1H")?;
                out.flush()?;
            }
            ("create", [name]) => {
                self.pm.create_page_file(name)?;
                writeln!(out, "created {}", name)?;
            }
            ("destroy", [name]) => {
                self.pm.destroy_page_file(name)?;
                writeln!(out, "destroyed {}", name)?;
            }
            ("open", [name]) => {
                if self.fh.is_open() {
                    self.fh.close()?;
                }
                self.fh = self.pm.open_page_file(name)?;
                writeln!(out, "opened {} ({} pages)", name, self.fh.total_pages()?)?;
            }
            ("close", []) => {
                self.fh.close()?;
                writeln!(out, "closed")?;
            }
            ("info", []) => {
                let info = FileInfo::gather(&self.fh, self.pm.options().page_count_policy)?;
                writeln!(out, "{}", info.to_text())?;
            }
            ("pos", []) => writeln!(out, "{}", self.fh.block_position()?)?,
            ("read", [n]) => {
                self.fh.read_block(n.parse()?, &mut pg)?;
                write!(out, "{}", hex_dump(&pg))?;
            }
            ("first", []) => {
                self.fh.read_first_block(&mut pg)?;
                self.dump(&pg, out)?;
            }
            ("last", []) => {
                self.fh.read_last_block(&mut pg)?;
                self.dump(&pg, out)?;
            }
            ("next", []) => {
                self.fh.read_next_block(&mut pg)?;
                self.dump(&pg, out)?;
            }
            ("prev", []) => {
                self.fh.read_previous_block(&mut pg)?;
                self.dump(&pg, out)?;
            }
            ("current", []) => {
                self.fh.read_current_block(&mut pg)?;
                self.dump(&pg, out)?;
            }
            ("write", [n, byte]) => {
                self.fh.write_block(n.parse()?, &Page::filled(byte.parse()?))?;
                writeln!(out, "wrote page {}", n)?;
            }
            ("append", []) => {
                self.fh.append_empty_block()?;
                writeln!(out, "appended page {}", self.fh.block_position()?)?;
            }
            ("ensure", [n]) => {
                self.fh.ensure_capacity(n.parse()?)?;
                writeln!(out, "{} pages", self.fh.total_pages()?)?;
            }
            _ => anyhow::bail!("unknown command or wrong arguments: {}", line.trim()),
        }
        Ok(Flow::Continue)
    }

    fn dump(&self, pg: &Page, out: &mut impl Write) -> anyhow::Result<()> {
        writeln!(out, "page {}", self.fh.block_position()?)?;
        write!(out, "{}", hex_dump(pg))?;
        Ok(())
    }
}

pub fn run(pm: &PageFileManager) -> anyhow::Result<()> {
    println!("Page file shell");
    println!("Type 'help' for help, 'exit' or 'quit' to quit");
    println!("Data directory: {}\n", pm.base().display());

    let mut session = Session::new(pm);
    let mut rl = DefaultEditor::new()?;
    let mut stdout = std::io::stdout();

    loop {
        match rl.readline("pages> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;

                match session.execute(line, &mut stdout) {
                    Ok(Flow::Exit) => {
                        println!("Goodbye!");
                        break;
                    }
                    Ok(Flow::Continue) => {}
                    Err(e) => println!("Error: {:#}", e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    if session.fh.is_open() {
        session.fh.close()?;
    }
    Ok(())
}

fn print_help(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "Page file shell help:")?;
    writeln!(out, "---------------------")?;
    writeln!(out)?;
    writeln!(out, "  Files:")?;
    writeln!(out, "    create <name>     - create a file holding one zero page")?;
    writeln!(out, "    destroy <name>    - delete a file")?;
    writeln!(out, "    open <name>       - open a file, closing the current one")?;
    writeln!(out, "    close             - close the open file")?;
    writeln!(out, "    info              - show size and page count")?;
    writeln!(out)?;
    writeln!(out, "  Pages:")?;
    writeln!(out, "    read <n>          - dump page n")?;
    writeln!(out, "    first | last      - dump the first or last page")?;
    writeln!(out, "    next | prev       - dump the page after or before the current one")?;
    writeln!(out, "    current           - dump the current page")?;
    writeln!(out, "    pos               - print the current page number")?;
    writeln!(out, "    write <n> <byte>  - fill page n with one byte value")?;
    writeln!(out, "    append            - add a zero page at the end")?;
    writeln!(out, "    ensure <n>        - grow the file to at least n pages")?;
    writeln!(out)?;
    writeln!(out, "  Shell:")?;
    writeln!(out, "    help | clear | cls | exit | quit")?;
    Ok(())
}
