use cmpsync_vendor::{BUILT_IN_VENDOR_LIST_VERSION, CUSTOM_VENDOR_START_ID};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("cmpsync {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: cmpsync");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("CMPSYNC_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("custom_vendor_start_id: {CUSTOM_VENDOR_START_ID}");
    println!("built_in_vendor_list_version: {BUILT_IN_VENDOR_LIST_VERSION}");
    println!(
        "features: proxy={}, schema={}, cli=true",
        cfg!(feature = "proxy"),
        cfg!(feature = "schema")
    );

    Ok(SUCCESS)
}
