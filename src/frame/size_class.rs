//! Notification size table.
//!
//! The concentrator emits notifications at a handful of fixed sizes, each
//! packing a known envelope layout. Lookup is by exact byte length.

use crate::config::{SizeClass, SizeRule};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct SizeClassTable {
    rules: HashMap<usize, SizeRule>,
}

impl SizeClassTable {
    pub fn new(classes: &[SizeClass]) -> Self {
        Self {
            rules: classes.iter().map(|c| (c.size, c.rule.clone())).collect(),
        }
    }

    pub fn lookup(&self, len: usize) -> Option<&SizeRule> {
        self.rules.get(&len)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Known sizes in ascending order
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes: Vec<usize> = self.rules.keys().copied().collect();
        sizes.sort_unstable();
        sizes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExtractorConfig, TelegramKind};

    #[test]
    fn test_default_table() {
        let table = SizeClassTable::new(&ExtractorConfig::default().size_classes);
        assert_eq!(table.sizes(), vec![59, 70, 96, 244]);
        assert_eq!(
            table.lookup(96),
            Some(&SizeRule::Strip {
                header: 54,
                trailer: 4,
                expect: TelegramKind::Compact
            })
        );
        assert_eq!(table.lookup(244), Some(&SizeRule::Scan));
        assert_eq!(table.lookup(100), None);
    }
}
