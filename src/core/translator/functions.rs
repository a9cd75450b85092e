//! Spreadsheet function → target dialect function table

/// One function mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionEntry {
    /// Spreadsheet name, uppercase
    pub name: &'static str,
    /// Target callee (or constant when `constant` is set)
    pub target: &'static str,
    /// Nullary spreadsheet function rendered as a bare constant
    pub constant: bool,
}

const fn call(name: &'static str, target: &'static str) -> FunctionEntry {
    FunctionEntry {
        name,
        target,
        constant: false,
    }
}

const DEFAULT_FUNCTIONS: &[FunctionEntry] = &[
    FunctionEntry {
        name: "PI",
        target: "Math.PI",
        constant: true,
    },
    call("SQRT", "Math.sqrt"),
    call("POW", "Math.pow"),
    call("POWER", "Math.pow"),
    call("ABS", "Math.abs"),
    call("ROUND", "Math.round"),
    call("FLOOR", "Math.floor"),
    call("CEIL", "Math.ceil"),
    call("CEILING", "Math.ceil"),
    call("TRUNC", "Math.trunc"),
    call("SIGN", "Math.sign"),
    call("SIN", "Math.sin"),
    call("COS", "Math.cos"),
    call("TAN", "Math.tan"),
    call("ASIN", "Math.asin"),
    call("ACOS", "Math.acos"),
    call("ATAN", "Math.atan"),
    call("MIN", "Math.min"),
    call("MAX", "Math.max"),
    call("EXP", "Math.exp"),
    call("LOG", "Math.log"),
    call("LN", "Math.log"),
    call("LOG10", "Math.log10"),
];

/// Immutable, ordered function table
#[derive(Debug, Clone)]
pub struct FunctionTable {
    entries: Vec<FunctionEntry>,
}

impl Default for FunctionTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_FUNCTIONS.to_vec(),
        }
    }
}

impl FunctionTable {
    /// Case-insensitive lookup
    pub fn get(&self, name: &str) -> Option<&FunctionEntry> {
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    pub fn entries(&self) -> &[FunctionEntry] {
        &self.entries
    }

    /// Constant entries (rendered without a call)
    pub fn constants(&self) -> impl Iterator<Item = &FunctionEntry> {
        self.entries.iter().filter(|entry| entry.constant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = FunctionTable::default();
        assert_eq!(table.get("sqrt").map(|e| e.target), Some("Math.sqrt"));
        assert_eq!(table.get("Log10").map(|e| e.target), Some("Math.log10"));
        assert!(table.get("VLOOKUP").is_none());
    }

    #[test]
    fn test_pi_is_the_only_constant() {
        let table = FunctionTable::default();
        let constants: Vec<_> = table.constants().map(|e| e.name).collect();
        assert_eq!(constants, vec!["PI"]);
    }

    #[test]
    fn test_names_are_unique_and_uppercase() {
        let table = FunctionTable::default();
        let mut names: Vec<_> = table.entries().iter().map(|e| e.name).collect();
        assert!(names.iter().all(|n| n.chars().all(|c| !c.is_ascii_lowercase())));
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), table.entries().len());
    }
}
