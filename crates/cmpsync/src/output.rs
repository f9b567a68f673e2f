use std::collections::{BTreeMap, BTreeSet};
use std::io::IsTerminal;

use clap::ValueEnum;
use cmpsync_cookie::KnownVendorsRecord;
use cmpsync_vendor::{is_custom_vendor, ConsentRecord, VendorConsents, VendorList, CUSTOM_VENDOR_START_ID};
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn join_ids(ids: &BTreeSet<u32>) -> String {
    ids.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn kind(vendor_id: u32) -> &'static str {
    if is_custom_vendor(vendor_id, CUSTOM_VENDOR_START_ID) {
        "custom"
    } else {
        "global"
    }
}

pub fn print_vendor_list(list: &VendorList, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(list),
        OutputFormat::Table => {
            let mut table = new_table(vec!["ID", "KIND", "NAME", "PURPOSES", "LEG. INT.", "FEATURES"]);
            for vendor in &list.vendors {
                table.add_row(vec![
                    vendor.id.to_string(),
                    kind(vendor.id).to_string(),
                    vendor.name.clone(),
                    join_ids(&vendor.purpose_ids),
                    join_ids(&vendor.leg_int_purpose_ids),
                    join_ids(&vendor.feature_ids),
                ]);
            }
            println!("Vendor list version {}", list.vendor_list_version);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "version={} vendors={}",
                list.vendor_list_version,
                list.vendors.len()
            );
            for vendor in &list.vendors {
                println!("  {:>5} {:<6} {}", vendor.id, kind(vendor.id), vendor.name);
            }
        }
    }
}

fn print_consent_map(title: &str, consents: &BTreeMap<u32, bool>) {
    let mut table = new_table(vec![title, "CONSENT"]);
    for (id, consent) in consents {
        table.add_row(vec![id.to_string(), consent.to_string()]);
    }
    println!("{table}");
}

pub fn print_vendor_consents(consents: &VendorConsents, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(consents),
        OutputFormat::Table => {
            println!("maxVendorId {}", consents.max_vendor_id);
            print_consent_map("PURPOSE", &consents.purpose_consents);
            print_consent_map("VENDOR", &consents.vendor_consents);
        }
        OutputFormat::Pretty => {
            let granted: BTreeSet<u32> = consents
                .vendor_consents
                .iter()
                .filter(|(_, consent)| **consent)
                .map(|(id, _)| *id)
                .collect();
            println!(
                "maxVendorId={} vendors={} granted={}",
                consents.max_vendor_id,
                consents.vendor_consents.len(),
                join_ids(&granted)
            );
        }
    }
}

pub fn print_record(record: &ConsentRecord, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(record),
        OutputFormat::Table => {
            let mut table = new_table(vec!["FIELD", "VALUE"]);
            table
                .add_row(vec!["version".to_string(), record.version.to_string()])
                .add_row(vec![
                    "vendorListVersion".to_string(),
                    record.vendor_list_version.to_string(),
                ])
                .add_row(vec!["maxVendorId".to_string(), record.max_vendor_id.to_string()])
                .add_row(vec![
                    "selectedVendorIds".to_string(),
                    join_ids(&record.selected_vendor_ids),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "maxVendorId={} vendors={}",
                record.max_vendor_id,
                join_ids(&record.selected_vendor_ids)
            );
        }
    }
}

#[derive(Serialize)]
struct KnownVendorsOutput<'a> {
    value: Option<&'a str>,
    global: &'a BTreeSet<u32>,
    custom: &'a BTreeSet<u32>,
}

pub fn print_known_vendors(record: &KnownVendorsRecord, value: Option<&str>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&KnownVendorsOutput {
            value,
            global: &record.global,
            custom: &record.custom,
        }),
        OutputFormat::Table => {
            let mut table = new_table(vec!["KIND", "COUNT", "IDS"]);
            table
                .add_row(vec![
                    "global".to_string(),
                    record.global.len().to_string(),
                    join_ids(&record.global),
                ])
                .add_row(vec![
                    "custom".to_string(),
                    record.custom.len().to_string(),
                    join_ids(&record.custom),
                ]);
            if let Some(value) = value {
                println!("{value}");
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            if let Some(value) = value {
                println!("{value}");
            }
            println!(
                "global={} custom={}",
                join_ids(&record.global),
                join_ids(&record.custom)
            );
        }
    }
}
