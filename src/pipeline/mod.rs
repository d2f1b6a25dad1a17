pub mod attributes;
pub mod availability;
pub mod catalog;
pub mod family;
pub mod platforms;
pub mod pricing;

/// Which AWS service a dataset belongs to.
///
/// Instance-name parsing differs per service, so the parsing rules live here
/// as methods rather than being branched inline at every call site. A new
/// service plugs in by extending this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Ec2,
    Rds,
}

impl Service {
    pub fn key(self) -> &'static str {
        match self {
            Service::Ec2 => "ec2",
            Service::Rds => "rds",
        }
    }

    /// Family type prefix of a dotted instance name.
    ///
    /// EC2 names are `<type>.<size>` ("m5.large" -> "m5"). RDS names carry a
    /// product tag, `db.<type>.<size>` ("db.r5.large" -> "r5").
    pub fn family_of(self, name: &str) -> &str {
        let mut segments = name.split('.');
        let first = segments.next().unwrap_or(name);
        match self {
            Service::Ec2 => first,
            Service::Rds => segments.next().unwrap_or(first),
        }
    }

    /// 2-character size-class prefix used for cross-family variant grouping.
    pub fn variant_of(self, name: &str) -> &str {
        let family = self.family_of(name);
        family.get(..2).unwrap_or(family)
    }

    /// Raw attribute key holding the vCPU count.
    pub fn vcpu_key(self) -> &'static str {
        match self {
            Service::Ec2 => "vCPU",
            Service::Rds => "vcpu",
        }
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ec2_family_is_first_segment() {
        assert_eq!(Service::Ec2.family_of("m5.large"), "m5");
        assert_eq!(Service::Ec2.family_of("c5n.18xlarge"), "c5n");
        assert_eq!(Service::Ec2.family_of("u-6tb1.metal"), "u-6tb1");
    }

    #[test]
    fn rds_family_skips_product_tag() {
        assert_eq!(Service::Rds.family_of("db.r5.large"), "r5");
        assert_eq!(Service::Rds.family_of("db.m6g.12xlarge"), "m6g");
    }

    #[test]
    fn variant_is_two_chars_of_family() {
        assert_eq!(Service::Ec2.variant_of("m5ad.24xlarge"), "m5");
        assert_eq!(Service::Rds.variant_of("db.r5.large"), "r5");
    }

    #[test]
    fn short_family_is_its_own_variant() {
        assert_eq!(Service::Ec2.variant_of("x.large"), "x");
    }
}
