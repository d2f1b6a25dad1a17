//! Fixed code -> display-label tables for purchasable platforms.
//!
//! EC2 prices are keyed by short OS codes ("linux", "mswinSQLWeb"); RDS
//! prices are keyed by numeric engine identifiers from the pricing API.

/// EC2 operating-system code -> display label.
pub const EC2_PLATFORMS: &[(&str, &str)] = &[
    ("linux", "Linux"),
    ("mswin", "Windows"),
    ("rhel", "Red Hat"),
    ("sles", "SUSE"),
    ("linuxSQL", "Linux SQL Server"),
    ("linuxSQLWeb", "Linux SQL Server for Web"),
    ("linuxSQLEnterprise", "Linux SQL Enterprise"),
    ("mswinSQL", "Windows SQL Server"),
    ("mswinSQLWeb", "Windows SQL Web"),
    ("mswinSQLEnterprise", "Windows SQL Enterprise"),
    ("rhelSQL", "Red Hat SQL Server"),
    ("rhelSQLWeb", "Red Hat SQL Web"),
    ("rhelSQLEnterprise", "Red Hat SQL Enterprise"),
];

/// RDS engine code -> display label. Codes not listed here are pseudo-products
/// and are skipped during price normalization.
pub const RDS_ENGINES: &[(&str, &str)] = &[
    ("2", "MySQL"),
    ("3", "Oracle Standard One BYOL"),
    ("4", "Oracle Standard BYOL"),
    ("5", "Oracle"),
    ("6", "Oracle Standard One"),
    ("9", "SQL Server"),
    ("10", "SQL Server Express"),
    ("11", "SQL Server Standard"),
    ("12", "SQL Server Standard"),
    ("14", "PostgreSQL"),
    ("15", "SQL Server Enterprise"),
    ("16", "Aurora MySQL"),
    ("18", "MariaDB"),
    ("19", "Oracle Standard Two BYOL"),
    ("20", "Oracle Standard Two"),
    ("21", "Aurora PostgreSQL"),
    ("210", "MySQL (Outpost On-Prem)"),
    ("220", "PostgreSQL (Outpost On-Prem)"),
    ("230", "SQL Server Enterprise (Outpost On-Prem)"),
    ("231", "SQL Server (Outpost On-Prem)"),
    ("232", "SQL Server Web (Outpost On-Prem)"),
];

pub fn rds_engine_label(code: &str) -> Option<&'static str> {
    RDS_ENGINES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
}

/// RDS engine labels with duplicates removed ("SQL Server Standard" appears
/// under two codes), first-appearance order preserved.
pub fn rds_engine_labels() -> Vec<&'static str> {
    let mut seen = Vec::new();
    for (_, label) in RDS_ENGINES {
        if !seen.contains(label) {
            seen.push(label);
        }
    }
    seen
}

// ── Tests ──
