use super::ids::AtomId;
use std::collections::HashMap;

/// One record of an `[ atoms ]` section.
///
/// The `nr` field doubles as the key of the record inside an [`AtomTable`],
/// so the two can never disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The atom id (`nr` column).
    pub nr: AtomId,
    /// The force-field atom type (e.g., "CT", "HC").
    pub atom_type: String,
    /// The residue number (`resi`/`resnr` column).
    pub resi: i32,
    /// The residue name (e.g., "ALA").
    pub res: String,
    /// The atom name (e.g., "CA").
    pub name: String,
    /// The charge-group number.
    pub cgnr: i32,
    /// The partial charge in elementary charge units.
    pub charge: f64,
    /// The atomic mass in atomic mass units.
    pub mass: f64,
    /// Free text found after the inline comment marker, if any.
    pub comment: Option<String>,
}

impl Atom {
    /// Creates an atom with zero charge and mass and no comment.
    pub fn new(nr: AtomId, atom_type: &str, resi: i32, res: &str, name: &str, cgnr: i32) -> Self {
        Self {
            nr,
            atom_type: atom_type.to_string(),
            resi,
            res: res.to_string(),
            name: name.to_string(),
            cgnr,
            charge: 0.0,
            mass: 0.0,
            comment: None,
        }
    }

    pub fn with_charge(mut self, charge: f64) -> Self {
        self.charge = charge;
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }
}

/// The atoms of a molecule, kept in file order with an id lookup on the side.
///
/// File order and numeric order are separate concerns: iteration with
/// [`AtomTable::iter`] follows insertion, [`AtomTable::iter_by_id`] follows
/// ascending ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtomTable {
    atoms: Vec<Atom>,
    index: HashMap<AtomId, usize>,
}

impl AtomTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an atom keyed by its `nr`.
    ///
    /// If an atom with the same id already exists it is replaced in place,
    /// keeping its original position, and the previous record is returned.
    pub fn insert(&mut self, atom: Atom) -> Option<Atom> {
        match self.index.get(&atom.nr) {
            Some(&pos) => Some(std::mem::replace(&mut self.atoms[pos], atom)),
            None => {
                self.index.insert(atom.nr, self.atoms.len());
                self.atoms.push(atom);
                None
            }
        }
    }

    pub fn get(&self, id: AtomId) -> Option<&Atom> {
        self.index.get(&id).map(|&pos| &self.atoms[pos])
    }

    pub fn get_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.index.get(&id).map(|&pos| &mut self.atoms[pos])
    }

    pub fn contains(&self, id: AtomId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Iterates atoms in the order they were inserted.
    pub fn iter(&self) -> impl Iterator<Item = &Atom> {
        self.atoms.iter()
    }

    /// Returns the atoms sorted by ascending id.
    pub fn iter_by_id(&self) -> impl Iterator<Item = &Atom> {
        let mut sorted: Vec<&Atom> = self.atoms.iter().collect();
        sorted.sort_by_key(|atom| atom.nr);
        sorted.into_iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = AtomId> + '_ {
        self.atoms.iter().map(|atom| atom.nr)
    }

    pub fn total_charge(&self) -> f64 {
        self.atoms.iter().map(|atom| atom.charge).sum()
    }

    pub fn into_atoms(self) -> Vec<Atom> {
        self.atoms
    }
}

impl FromIterator<Atom> for AtomTable {
    fn from_iter<T: IntoIterator<Item = Atom>>(iter: T) -> Self {
        let mut table = AtomTable::new();
        for atom in iter {
            table.insert(atom);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(nr: u32, name: &str, charge: f64) -> Atom {
        Atom::new(AtomId::new(nr), "CT", 1, "ALA", name, nr as i32).with_charge(charge)
    }

    #[test]
    fn insert_and_lookup_by_id() {
        let mut table = AtomTable::new();
        assert!(table.insert(atom(3, "CA", 0.1)).is_none());
        assert!(table.insert(atom(1, "N", -0.3)).is_none());

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(AtomId::new(3)).unwrap().name, "CA");
        assert!(table.contains(AtomId::new(1)));
        assert!(!table.contains(AtomId::new(2)));
    }

    #[test]
    fn duplicate_id_replaces_in_place_and_returns_previous() {
        let mut table = AtomTable::new();
        table.insert(atom(1, "N", 0.0));
        table.insert(atom(2, "CA", 0.0));
        let previous = table.insert(atom(1, "H", 0.2));

        assert_eq!(previous.unwrap().name, "N");
        assert_eq!(table.len(), 2);
        let names: Vec<_> = table.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["H", "CA"]);
    }

    #[test]
    fn iteration_orders_are_independent() {
        let table: AtomTable = vec![atom(10, "C", 0.0), atom(2, "N", 0.0), atom(5, "O", 0.0)]
            .into_iter()
            .collect();

        let file_order: Vec<u32> = table.iter().map(|a| a.nr.get()).collect();
        let id_order: Vec<u32> = table.iter_by_id().map(|a| a.nr.get()).collect();
        assert_eq!(file_order, vec![10, 2, 5]);
        assert_eq!(id_order, vec![2, 5, 10]);
    }

    #[test]
    fn total_charge_sums_all_atoms() {
        let table: AtomTable = vec![atom(1, "N", -0.5), atom(2, "H", 0.25), atom(3, "H", 0.25)]
            .into_iter()
            .collect();
        assert!(table.total_charge().abs() < 1e-12);
    }

    #[test]
    fn get_mut_edits_the_stored_record() {
        let mut table: AtomTable = vec![atom(1, "N", 0.0)].into_iter().collect();
        table.get_mut(AtomId::new(1)).unwrap().charge = 0.5;
        assert_eq!(table.get(AtomId::new(1)).unwrap().charge, 0.5);
    }
}
