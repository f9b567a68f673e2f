use std::collections::BTreeSet;
use std::path::Path;

use cmpsync_vendor::{
    built_in_custom_vendors, merge, restrict_to, CustomVendorList, ListenerRegistry, VendorList,
};

use crate::cmd::{read_document, MergeArgs};
use crate::exit::{json_error, CliResult, SUCCESS};
use crate::output::{print_vendor_list, OutputFormat};

pub fn run(args: MergeArgs, format: OutputFormat) -> CliResult<i32> {
    let mut global = load_list(&args.global)?;
    if let Some(path) = &args.publisher {
        let allowed: BTreeSet<u32> = load_list(path)?.vendor_ids().collect();
        global = restrict_to(global, &allowed);
    }

    let built_in = (!args.no_builtin).then(built_in_custom_vendors);
    let custom = args
        .custom
        .as_deref()
        .map(load_list)
        .transpose()?
        .map(CustomVendorList::from);

    let mut listeners = ListenerRegistry::new();
    let merged = merge(global, built_in, custom, &mut listeners);
    tracing::debug!(
        vendors = merged.vendors.len(),
        version = merged.vendor_list_version,
        "merged vendor lists"
    );

    print_vendor_list(&merged, format);
    Ok(SUCCESS)
}

pub(crate) fn load_list(path: &Path) -> CliResult<VendorList> {
    let text = read_document(path)?;
    serde_json::from_str(&text).map_err(|err| json_error(&format!("parse {}", path.display()), err))
}
