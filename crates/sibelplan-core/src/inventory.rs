//! Per-page luminaire counts for the side panel and legend.

use crate::objects::AnnotationObject;
use crate::store::PageObjects;
use std::collections::BTreeMap;

/// Bucket key for symbols with no circuit assigned.
pub const UNASSIGNED_CIRCUIT: &str = "—";

/// Counts derived from one page's objects. Keys are sorted so UI lists and
/// the rendered legend come out in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    pub by_symbol: BTreeMap<String, usize>,
    pub by_circuit: BTreeMap<String, usize>,
    pub route_count: usize,
    pub text_count: usize,
}

impl Inventory {
    pub fn for_page(page: &PageObjects) -> Self {
        let mut inv = Inventory::default();
        for obj in &page.objects {
            match obj {
                AnnotationObject::Symbol(sym) => {
                    *inv.by_symbol.entry(sym.symbol_id.clone()).or_insert(0) += 1;
                    let circuit = if sym.circuit.is_empty() {
                        UNASSIGNED_CIRCUIT.to_string()
                    } else {
                        sym.circuit.clone()
                    };
                    *inv.by_circuit.entry(circuit).or_insert(0) += 1;
                }
                AnnotationObject::Route(_) => inv.route_count += 1,
                AnnotationObject::Text(_) => inv.text_count += 1,
            }
        }
        inv
    }

    pub fn total_symbols(&self) -> usize {
        self.by_symbol.values().sum()
    }
}
