// Variable inclusion policy: per-column modeling and type metadata.

use std::collections::HashMap;

/// Per-column metadata: whether the column feeds the model, and whether it
/// is categorical (vs numeric).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarSpec {
    pub include: bool,
    pub is_categorical: bool,
}

impl VarSpec {
    pub const fn new(include: bool, is_categorical: bool) -> Self {
        Self {
            include,
            is_categorical,
        }
    }
}

/// Columns this policy has never seen are excluded categoricals.
impl Default for VarSpec {
    fn default() -> Self {
        Self::new(false, true)
    }
}

/// Mapping from column name to [`VarSpec`]. Lookups for unknown columns
/// yield the default spec; mutating accessors insert it first.
#[derive(Debug, Clone, Default)]
pub struct VarPolicy {
    specs: HashMap<String, VarSpec>,
}

impl VarPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Policy seeded with the rotoguru game-log columns and the columns this
    /// crate derives from them.
    pub fn rotoguru() -> Self {
        let seed: &[(&str, VarSpec)] = &[
            // rotoguru
            ("Date", VarSpec::new(false, true)),
            ("GID", VarSpec::new(false, true)),
            ("Pos", VarSpec::new(true, true)),
            ("Name", VarSpec::new(true, true)),
            ("Starter", VarSpec::new(false, true)),
            ("FD Pts", VarSpec::new(false, false)),
            ("FD Salary", VarSpec::new(true, false)),
            ("Team", VarSpec::new(true, true)),
            ("H/A", VarSpec::new(true, true)),
            ("Oppt", VarSpec::new(true, true)),
            ("Team Score", VarSpec::new(false, false)),
            ("Oppt Score", VarSpec::new(false, false)),
            ("Minutes", VarSpec::new(false, false)),
            ("Stat line", VarSpec::new(false, true)),
            // derived
            ("Fan Points", VarSpec::new(false, false)),
            ("Assists", VarSpec::new(false, false)),
            ("Rebounds", VarSpec::new(false, false)),
            ("Blocks", VarSpec::new(false, false)),
            ("Points", VarSpec::new(false, false)),
            ("Steals", VarSpec::new(false, false)),
            ("Turnovers", VarSpec::new(false, false)),
        ];
        Self {
            specs: seed
                .iter()
                .map(|(name, spec)| (name.to_string(), *spec))
                .collect(),
        }
    }

    /// Spec for a column, defaulting on a lookup miss without inserting.
    pub fn get(&self, name: &str) -> VarSpec {
        self.specs.get(name).copied().unwrap_or_default()
    }

    /// Mutable spec for a column, inserting the default on a lookup miss.
    pub fn spec_mut(&mut self, name: &str) -> &mut VarSpec {
        self.specs.entry(name.to_string()).or_default()
    }

    /// Mark the named columns include=true, inserting unknown names with the
    /// default spec first. With `strict`, every other known column is marked
    /// include=false.
    pub fn include(&mut self, names: &[&str], strict: bool) {
        self.set_included(names, true, strict);
    }

    /// Mark the named columns include=false; with `strict`, every other
    /// known column is marked include=true.
    pub fn exclude(&mut self, names: &[&str], strict: bool) {
        self.set_included(names, false, strict);
    }

    fn set_included(&mut self, names: &[&str], value: bool, strict: bool) {
        for name in names {
            self.spec_mut(name).include = value;
        }
        if strict {
            for (name, spec) in self.specs.iter_mut() {
                if !names.contains(&name.as_str()) {
                    spec.include = !value;
                }
            }
        }
    }

    /// Names currently marked include=true, sorted for stable output.
    pub fn included(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .specs
            .iter()
            .filter(|(_, spec)| spec.include)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
