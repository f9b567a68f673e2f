use clap::{Args, Subcommand, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};

use cmpsync_schema::DocumentKind;

use crate::exit::{io_error, CliResult};
use crate::output::OutputFormat;

pub mod cookie;
pub mod filter;
pub mod merge;
pub mod validate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge the global vendor list with built-in and publisher custom vendors.
    Merge(MergeArgs),
    /// Remove custom vendors from a vendor list.
    FilterList(FilterArgs),
    /// Remove custom vendors from a getVendorConsents result.
    FilterConsents(FilterArgs),
    /// Remove custom vendors from a decoded consent record.
    FilterRecord(FilterArgs),
    /// Encode or decode the known-vendor cookie.
    #[command(subcommand)]
    Cookie(CookieCommand),
    /// Validate a document against its built-in schema.
    Validate(ValidateArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Merge(args) => merge::run(args, format),
        Command::FilterList(args) => filter::run_list(args, format),
        Command::FilterConsents(args) => filter::run_consents(args, format),
        Command::FilterRecord(args) => filter::run_record(args, format),
        Command::Cookie(command) => cookie::run(command, format),
        Command::Validate(args) => validate::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Read a document from `path`, or from stdin when `path` is `-`.
pub fn read_document(path: &Path) -> CliResult<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|err| io_error("read stdin", err))?;
        return Ok(text);
    }
    std::fs::read_to_string(path).map_err(|err| io_error(&format!("read {}", path.display()), err))
}

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Global vendor list (JSON).
    #[arg(long, value_name = "FILE")]
    pub global: PathBuf,
    /// Publisher custom vendor list (JSON).
    #[arg(long, value_name = "FILE")]
    pub custom: Option<PathBuf>,
    /// Publisher vendor list restricting the global vendors (JSON).
    #[arg(long, value_name = "FILE")]
    pub publisher: Option<PathBuf>,
    /// Leave out the built-in custom vendors.
    #[arg(long)]
    pub no_builtin: bool,
}

#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Input document (JSON), `-` for stdin.
    pub file: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum CookieCommand {
    /// Encode vendor ids as a cookie value.
    Encode(CookieEncodeArgs),
    /// Decode a cookie value.
    Decode(CookieDecodeArgs),
}

#[derive(Args, Debug)]
pub struct CookieEncodeArgs {
    /// Global vendor ids (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub global: Vec<u32>,
    /// Custom vendor ids (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub custom: Vec<u32>,
}

#[derive(Args, Debug)]
pub struct CookieDecodeArgs {
    /// Cookie value.
    pub value: String,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum KindArg {
    VendorList,
    Config,
    CmpCall,
}

impl From<KindArg> for DocumentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::VendorList => DocumentKind::VendorList,
            KindArg::Config => DocumentKind::Config,
            KindArg::CmpCall => DocumentKind::CmpCall,
        }
    }
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Document to validate (JSON), `-` for stdin.
    pub file: PathBuf,
    /// Document kind.
    #[arg(long, value_enum)]
    pub kind: KindArg,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
