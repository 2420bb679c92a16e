use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::value::Label;

/// Name to code-index mapping built during assembly.
///
/// Names are matched case-insensitively; [`Label::new`] already upper-cases
/// on construction and lookups normalise the query, so only one spelling is
/// ever stored. Each name can be added exactly once.
///
/// [`Label::new`]: struct.Label.html#method.new
#[derive(Clone, Debug, Default)]
pub struct LabelTable {
    map: HashMap<String, Label>,
}

impl LabelTable {
    pub fn new() -> LabelTable {
        LabelTable {
            map: HashMap::new(),
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.map.contains_key(&name.to_ascii_uppercase())
    }

    /// Inserts `label` under its own name; errors when the name is taken.
    pub fn add(&mut self, label: Label) -> Result<(), ()> {
        match self.map.entry(label.name().to_owned()) {
            Entry::Occupied(_) => Err(()),
            Entry::Vacant(slot) => {
                slot.insert(label);
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Label> {
        self.map.get(&name.to_ascii_uppercase())
    }

    pub fn remove(&mut self, name: &str) -> Option<Label> {
        self.map.remove(&name.to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
