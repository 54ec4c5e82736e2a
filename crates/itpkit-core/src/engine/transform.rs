//! Atom deletion with contiguous renumbering and charge redistribution.

use super::error::EngineError;
use crate::core::models::atom::{Atom, AtomTable};
use crate::core::models::ids::AtomId;
use crate::core::models::system::{MoleculeTopology, Section};
use crate::core::models::topology::TermKind;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Old-to-new atom ids of the atoms that survived a deletion.
///
/// Deleted ids are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMapping {
    map: BTreeMap<AtomId, AtomId>,
}

impl IdMapping {
    pub fn get(&self, old: AtomId) -> Option<AtomId> {
        self.map.get(&old).copied()
    }

    /// Maps an id through the table, leaving unknown ids unchanged.
    pub fn resolve(&self, old: AtomId) -> AtomId {
        self.get(old).unwrap_or(old)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates `(old, new)` pairs by ascending old id.
    pub fn iter(&self) -> impl Iterator<Item = (AtomId, AtomId)> + '_ {
        self.map.iter().map(|(&old, &new)| (old, new))
    }

    /// True when no surviving atom changed its id.
    pub fn is_identity(&self) -> bool {
        self.map.iter().all(|(old, new)| old == new)
    }

    pub fn to_string_map(&self) -> BTreeMap<String, String> {
        self.map
            .iter()
            .map(|(old, new)| (old.to_string(), new.to_string()))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrimStats {
    pub atoms_removed: usize,
    /// Requested ids that matched no atom.
    pub missing_ids: Vec<AtomId>,
    /// Sum of the original charges of the removed atoms.
    pub removed_charge: f64,
    /// Charge added to every surviving atom.
    pub charge_shift: f64,
    pub terms_removed: BTreeMap<TermKind, usize>,
    /// Divisor used for the charge shift.
    pub normalization_count: usize,
}

impl TrimStats {
    pub fn total_terms_removed(&self) -> usize {
        self.terms_removed.values().sum()
    }
}

#[derive(Debug, Clone)]
pub struct Trimmed {
    pub topology: MoleculeTopology,
    pub mapping: IdMapping,
    pub stats: TrimStats,
}

impl Trimmed {
    pub fn into_parts(self) -> (MoleculeTopology, IdMapping) {
        (self.topology, self.mapping)
    }
}

/// Removes atoms and every bonded term that references them.
///
/// The charge carried by the removed atoms, taken from their original values,
/// is divided by `normalization_count` and added to each surviving atom.
/// Survivors are renumbered `1..=N` by ascending original id and all bonded
/// terms are rewritten to the new ids. Ids without a matching atom are
/// ignored.
///
/// The charge total is conserved only when `normalization_count` equals the
/// number of survivors; other divisors are honoured as given.
///
/// # Errors
///
/// Returns [`EngineError::ZeroNormalization`] if `normalization_count` is zero.
pub fn delete_atoms(
    mut topology: MoleculeTopology,
    ids: &BTreeSet<AtomId>,
    normalization_count: usize,
) -> Result<Trimmed, EngineError> {
    if normalization_count == 0 {
        return Err(EngineError::ZeroNormalization);
    }

    let mut stats = TrimStats {
        normalization_count,
        ..TrimStats::default()
    };
    let mut mapping = IdMapping::default();

    match topology.atoms_mut() {
        Some(table) => {
            for &id in ids {
                match table.get(id) {
                    Some(atom) => stats.removed_charge += atom.charge,
                    None => stats.missing_ids.push(id),
                }
            }
            stats.charge_shift = stats.removed_charge / normalization_count as f64;

            let before = table.len();
            let renumbered = renumber(std::mem::take(table), ids, stats.charge_shift, &mut mapping);
            stats.atoms_removed = before - renumbered.len();
            *table = renumbered;
        }
        None => stats.missing_ids.extend(ids.iter().copied()),
    }

    if !stats.missing_ids.is_empty() {
        warn!(
            "{} requested atom id(s) not present in the topology: {:?}",
            stats.missing_ids.len(),
            stats.missing_ids.iter().map(|id| id.get()).collect::<Vec<_>>()
        );
    }

    for section in topology.sections_mut() {
        if let Section::Terms { kind, terms } = section {
            let before = terms.len();
            terms.retain(|term| !term.references_any(|id| ids.contains(&id)));
            for term in terms.iter_mut() {
                for id in term.atoms.iter_mut() {
                    *id = mapping.resolve(*id);
                }
            }
            let removed = before - terms.len();
            debug!(section = %kind, removed, kept = terms.len(), "Filtered bonded terms.");
            if removed > 0 {
                stats.terms_removed.insert(*kind, removed);
            }
        }
    }

    info!(
        atoms_removed = stats.atoms_removed,
        terms_removed = stats.total_terms_removed(),
        charge_shift = stats.charge_shift,
        "Deleted atoms and renumbered topology."
    );

    Ok(Trimmed {
        topology,
        mapping,
        stats,
    })
}

fn renumber(
    table: AtomTable,
    ids: &BTreeSet<AtomId>,
    charge_shift: f64,
    mapping: &mut IdMapping,
) -> AtomTable {
    let mut survivors: Vec<Atom> = table
        .into_atoms()
        .into_iter()
        .filter(|atom| !ids.contains(&atom.nr))
        .collect();
    survivors.sort_by_key(|atom| atom.nr);

    survivors
        .into_iter()
        .zip(1u32..)
        .map(|(mut atom, new)| {
            let new_id = AtomId::new(new);
            mapping.map.insert(atom.nr, new_id);
            atom.nr = new_id;
            atom.charge += charge_shift;
            atom
        })
        .collect()
}
