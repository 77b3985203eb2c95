//! Append-only sale log for audit.
//!
//! Sales are recorded once at settlement and never mutated. The log keeps
//! insertion order (UUIDv7 sale IDs also sort by time).

use openlot_types::{AssetRef, SaleEvent, SaleId};

/// Append-only store of completed sales.
#[derive(Debug, Default)]
pub struct SaleLog {
    sales: Vec<SaleEvent>,
}

impl SaleLog {
    #[must_use]
    pub fn new() -> Self {
        Self { sales: Vec::new() }
    }

    /// Append a completed sale.
    pub fn record(&mut self, sale: SaleEvent) {
        self.sales.push(sale);
    }

    /// All sales in settlement order.
    pub fn iter(&self) -> impl Iterator<Item = &SaleEvent> {
        self.sales.iter()
    }

    /// Look up a sale by id.
    #[must_use]
    pub fn get(&self, sale_id: SaleId) -> Option<&SaleEvent> {
        self.sales.iter().find(|s| s.sale_id == sale_id)
    }

    /// All sales of one asset, in settlement order.
    #[must_use]
    pub fn by_asset(&self, asset: &AssetRef) -> Vec<&SaleEvent> {
        self.sales.iter().filter(|s| &s.asset == asset).collect()
    }

    /// The most recent sale, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&SaleEvent> {
        self.sales.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sales.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }
}
