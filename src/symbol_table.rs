//! Symbol table shared by the two translation passes.

use std::collections::HashMap;

use crate::utils::suggest;

/// What kind of definition introduced a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// `name:` in the code section.
    Label,

    /// `name DIRECTIVE argument` in the data section.
    Variable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
    pub kind: SymbolKind,

    /// Address of the first cell introduced after the definition.
    pub address: u32,

    /// Source line of the definition.
    pub line: usize,
}

/// Labels and variables live in a single namespace, so a name can only be defined once
/// regardless of its kind.
#[derive(Default, Debug, Clone)]
pub struct SymbolTable {
    inner: HashMap<String, SymbolInfo>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            inner: HashMap::new(),
        }
    }

    /// Defines a new symbol.
    ///
    /// # Errors
    /// Returns the existing definition if `label` has already been defined.
    pub(crate) fn define_symbol(&mut self, label: &str, info: SymbolInfo) -> Result<(), SymbolInfo> {
        if let Some(existing) = self.inner.get(label) {
            return Err(existing.clone());
        }

        self.inner.insert(label.to_string(), info);

        Ok(())
    }

    pub fn get_symbol_by_label<S: AsRef<str>>(&self, label: S) -> Option<&SymbolInfo> {
        self.inner.get(label.as_ref())
    }

    /// Address of a label or a variable.
    pub fn resolve<S: AsRef<str>>(&self, label: S) -> Option<u32> {
        self.get_symbol_by_label(label).map(|info| info.address)
    }

    /// Address of a symbol that must have been defined as a label.
    pub fn resolve_label<S: AsRef<str>>(&self, label: S) -> Option<u32> {
        self.get_symbol_by_label(label)
            .filter(|info| info.kind == SymbolKind::Label)
            .map(|info| info.address)
    }

    /// The closest defined name of the given kind (or of any kind), for error messages.
    pub(crate) fn suggest(&self, label: &str, kind: Option<SymbolKind>) -> Option<String> {
        let names = self.inner.iter()
            .filter(|(_, info)| kind.map_or(true, |kind| info.kind == kind))
            .map(|(name, _)| name.as_str());

        suggest(label, names)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SymbolInfo)> {
        self.inner.iter().map(|(name, info)| (name.as_str(), info))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[test]
fn test_symbol_table() {
    let mut table = SymbolTable::new();

    let label = SymbolInfo { kind: SymbolKind::Label, address: 3, line: 2 };
    let variable = SymbolInfo { kind: SymbolKind::Variable, address: 10, line: 8 };

    assert_eq!(table.define_symbol("loop", label.clone()), Ok(()));
    assert_eq!(table.define_symbol("count", variable.clone()), Ok(()));
    assert_eq!(table.define_symbol("loop", variable.clone()), Err(label));

    assert_eq!(table.resolve("count"), Some(10));
    assert_eq!(table.resolve_label("count"), None);
    assert_eq!(table.resolve_label("loop"), Some(3));
    assert_eq!(table.suggest("lopo", Some(SymbolKind::Label)), Some("loop".to_string()));
    assert_eq!(table.suggest("lopo", Some(SymbolKind::Variable)), None);
    assert_eq!(table.len(), 2);

    let mut symbols: Vec<_> = table.iter()
        .map(|(name, info)| (name, info.kind, info.address))
        .collect();
    symbols.sort_by_key(|symbol| symbol.2);
    assert_eq!(symbols, vec![("loop", SymbolKind::Label, 3), ("count", SymbolKind::Variable, 10)]);
}
