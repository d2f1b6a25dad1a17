use std::collections::BTreeMap;

use serde::Serialize;

use super::platforms::{rds_engine_labels, EC2_PLATFORMS};
use super::pricing::PriceTable;
use super::Service;

/// One unsold (region, OS/engine) combination for the availability table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnavailabilityEntry {
    pub region_name: String,
    pub region_code: String,
    pub label: String,
    pub os_key: String,
}

/// Cross-reference the region catalog against an instance's price table.
///
/// A region with no prices at all yields a single `("All", "*")` entry; a
/// priced region yields one entry per missing OS/engine. Pure set
/// difference — never fails, and resolving twice gives identical output.
pub fn unavailable_instances(
    service: Service,
    prices: &PriceTable,
    regions: &BTreeMap<String, String>,
) -> Vec<UnavailabilityEntry> {
    let mut denylist = Vec::new();

    for (code, display) in regions {
        let Some(oses) = prices.oses(code) else {
            denylist.push(UnavailabilityEntry {
                region_name: display.clone(),
                region_code: code.clone(),
                label: "All".to_string(),
                os_key: "*".to_string(),
            });
            continue;
        };

        match service {
            // EC2 price tables stay keyed by OS code.
            Service::Ec2 => {
                for (os_code, label) in EC2_PLATFORMS {
                    if !oses.contains_key(*os_code) {
                        denylist.push(UnavailabilityEntry {
                            region_name: display.clone(),
                            region_code: code.clone(),
                            label: (*label).to_string(),
                            os_key: (*os_code).to_string(),
                        });
                    }
                }
            }
            // RDS price tables are keyed by engine label.
            Service::Rds => {
                for label in rds_engine_labels() {
                    if !oses.contains_key(label) {
                        denylist.push(UnavailabilityEntry {
                            region_name: display.clone(),
                            region_code: code.clone(),
                            label: label.to_string(),
                            os_key: label.to_string(),
                        });
                    }
                }
            }
        }
    }

    denylist
}

// ── Tests ──
