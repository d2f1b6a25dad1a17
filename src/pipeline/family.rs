use std::collections::HashMap;

use serde::Serialize;

use super::Service;
use crate::data::InstanceRecord;

/// One size within a family, as shown in the family widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FamilyMember {
    pub name: String,
    pub cpus: u32,
    pub memory: f64,
}

/// One family inside a 2-character variant group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantEntry {
    pub family: String,
    pub name: String,
}

/// Lookup tables produced by [`assemble`], consumed by page rendering.
#[derive(Debug, Default)]
pub struct FamilyTables {
    members: HashMap<String, Vec<FamilyMember>>,
    family_by_name: HashMap<String, String>,
    variants: HashMap<String, Vec<VariantEntry>>,
}

impl FamilyTables {
    pub fn family_of(&self, name: &str) -> Option<&str> {
        self.family_by_name.get(name).map(String::as_str)
    }

    pub fn members(&self, family: &str) -> &[FamilyMember] {
        self.members.get(family).map_or(&[], Vec::as_slice)
    }

    pub fn variant_group(&self, variant: &str) -> &[VariantEntry] {
        self.variants.get(variant).map_or(&[], Vec::as_slice)
    }

    pub fn family_count(&self) -> usize {
        self.members.len()
    }

    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }
}

/// Group instances into families by type prefix and into cross-family
/// variant groups by 2-character size class.
///
/// Family member lists keep duplicates (a re-processed instance appears
/// twice); variant groups dedupe on the family prefix. Members sort
/// ascending by vCPU count, with bare-metal sizes moved to the end of their
/// family, relative order preserved.
pub fn assemble(service: Service, instances: &[InstanceRecord]) -> FamilyTables {
    let mut tables = FamilyTables::default();

    for i in instances {
        let name = i.instance_type().to_string();
        let family = service.family_of(&name).to_string();
        let variant = service.variant_of(&name).to_string();

        let group = tables.variants.entry(variant).or_default();
        if !group.iter().any(|e| e.family == family) {
            group.push(VariantEntry {
                family: family.clone(),
                name: name.clone(),
            });
        }

        tables
            .members
            .entry(family.clone())
            .or_default()
            .push(FamilyMember {
                name: name.clone(),
                cpus: i.vcpus(service),
                memory: i.memory(),
            });

        tables.family_by_name.insert(name, family);
    }

    for list in tables.members.values_mut() {
        list.sort_by_key(|m| m.cpus);
        let (metal, rest): (Vec<_>, Vec<_>) =
            list.drain(..).partition(|m| m.name.ends_with("metal"));
        list.extend(rest);
        list.extend(metal);
    }

    tables
}

// ── Tests ──
