use cmpsync_proxy::CmpConfig;
use cmpsync_schema::{DocumentKind, SchemaRegistry};
use serde::Serialize;

use crate::cmd::{read_document, ValidateArgs};
use crate::exit::{proxy_error, schema_error, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct ValidateOutput {
    kind: &'static str,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn run(args: ValidateArgs, format: OutputFormat) -> CliResult<i32> {
    let kind = DocumentKind::from(args.kind);
    let registry = SchemaRegistry::builtin().map_err(|err| schema_error("load schemas", err))?;
    let document = read_document(&args.file)?;

    let mut error = registry
        .validate(kind, document.as_bytes())
        .err()
        .map(|err| err.to_string());
    if error.is_none() && kind == DocumentKind::Config {
        // Schema-valid configs can still be unusable.
        error = CmpConfig::from_json(&document)
            .map_err(|err| proxy_error("config", err))
            .err()
            .map(|err| err.message);
    }
    let out = ValidateOutput {
        kind: kind.name(),
        valid: error.is_none(),
        error,
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table | OutputFormat::Pretty => match &out.error {
            None => println!("{}: valid {}", args.file.display(), out.kind),
            Some(err) => println!("{}: invalid {}: {err}", args.file.display(), out.kind),
        },
    }

    Ok(if out.valid { SUCCESS } else { DATA_INVALID })
}
