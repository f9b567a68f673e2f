use cmpsync_cookie::KnownVendorsRecord;

use crate::cmd::{CookieCommand, CookieDecodeArgs, CookieEncodeArgs};
use crate::exit::{cookie_error, CliResult, SUCCESS};
use crate::output::{print_known_vendors, OutputFormat};

pub fn run(command: CookieCommand, format: OutputFormat) -> CliResult<i32> {
    match command {
        CookieCommand::Encode(args) => encode(args, format),
        CookieCommand::Decode(args) => decode(args, format),
    }
}

fn encode(args: CookieEncodeArgs, format: OutputFormat) -> CliResult<i32> {
    // Ids are routed by the custom threshold, not by the flag they came in.
    let record = KnownVendorsRecord::from_vendor_ids(args.global.into_iter().chain(args.custom));
    let value = record
        .encode()
        .map_err(|err| cookie_error("encode", err))?;
    print_known_vendors(&record, Some(&value), format);
    Ok(SUCCESS)
}

fn decode(args: CookieDecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let record =
        KnownVendorsRecord::decode(&args.value).map_err(|err| cookie_error("decode", err))?;
    print_known_vendors(&record, None, format);
    Ok(SUCCESS)
}
