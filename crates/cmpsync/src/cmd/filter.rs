use cmpsync_vendor::{
    filter_record, filter_vendor_consent_map, filter_vendor_list, ConsentRecord, VendorConsents,
    CUSTOM_VENDOR_START_ID,
};
use serde::de::DeserializeOwned;

use crate::cmd::{read_document, FilterArgs};
use crate::exit::{json_error, CliResult, SUCCESS};
use crate::output::{print_record, print_vendor_consents, print_vendor_list, OutputFormat};

pub fn run_list(args: FilterArgs, format: OutputFormat) -> CliResult<i32> {
    let mut list = load(&args)?;
    filter_vendor_list(&mut list, CUSTOM_VENDOR_START_ID);
    print_vendor_list(&list, format);
    Ok(SUCCESS)
}

/// The `metadata` consent string is passed through untouched.
pub fn run_consents(args: FilterArgs, format: OutputFormat) -> CliResult<i32> {
    let mut consents: VendorConsents = load(&args)?;
    if !consents.metadata.is_empty() {
        tracing::warn!("metadata consent string is not re-encoded and may name custom vendors");
    }
    filter_vendor_consent_map(&mut consents, CUSTOM_VENDOR_START_ID);
    print_vendor_consents(&consents, format);
    Ok(SUCCESS)
}

pub fn run_record(args: FilterArgs, format: OutputFormat) -> CliResult<i32> {
    let mut record: ConsentRecord = load(&args)?;
    filter_record(&mut record, CUSTOM_VENDOR_START_ID);
    print_record(&record, format);
    Ok(SUCCESS)
}

fn load<T: DeserializeOwned>(args: &FilterArgs) -> CliResult<T> {
    let text = read_document(&args.file)?;
    serde_json::from_str(&text)
        .map_err(|err| json_error(&format!("parse {}", args.file.display()), err))
}
