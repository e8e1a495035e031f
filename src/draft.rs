use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;

use crate::catalog::LineCatalog;
use crate::errors::ServiceError;
use crate::models::draft::OrderLineDraft;
use crate::models::payload::WorkOrderPayload;
use crate::models::recipe::ResolvedRecipe;

/// Capture of a row's resolution counter at request time. A resolution
/// result is applied only while the ticket still matches the row's current
/// counter, so a late response from an earlier edit can never overwrite
/// newer row state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionTicket {
    row_id: u64,
    seq: u64,
}

/// Ordered, mutable list of work-order line drafts.
///
/// Mirrors the editable grid of the order-creation form: rows are appended
/// with a suggested correlative number, can be bulk-imported from
/// tab-separated text, and hold per-row lookup errors that block nothing
/// until submission-time validation.
pub struct DraftGrid {
    rows: Vec<OrderLineDraft>,
    catalog: LineCatalog,
    next_row_id: u64,
    seed_number: u64,
}

impl DraftGrid {
    /// Creates the grid with one empty row numbered `last_order_number + 1`.
    pub fn new(catalog: LineCatalog, last_order_number: u64) -> Self {
        let mut grid = Self {
            rows: Vec::new(),
            catalog,
            next_row_id: 0,
            seed_number: last_order_number,
        };
        grid.add_row();
        grid
    }

    pub fn rows(&self) -> &[OrderLineDraft] {
        &self.rows
    }

    pub fn row(&self, id: u64) -> Option<&OrderLineDraft> {
        self.rows.iter().find(|r| r.id == id)
    }

    fn row_mut(&mut self, id: u64) -> Option<&mut OrderLineDraft> {
        self.rows.iter_mut().find(|r| r.id == id)
    }

    fn next_correlative(&self) -> u64 {
        self.rows
            .iter()
            .filter_map(|r| r.numeric_order_number())
            .max()
            .unwrap_or(self.seed_number)
            + 1
    }

    /// Appends an empty row with the next suggested order number and
    /// returns its id.
    pub fn add_row(&mut self) -> u64 {
        let id = self.next_row_id;
        self.next_row_id += 1;
        let number = self.next_correlative();
        self.rows.push(OrderLineDraft::empty(id, number));
        id
    }

    pub fn remove_row(&mut self, id: u64) {
        self.rows.retain(|r| r.id != id);
    }

    /// Clears every row and re-seeds a single empty one (full-form reset).
    pub fn reset(&mut self) {
        self.rows.clear();
        self.add_row();
    }

    /// Bulk paste of tab-separated rows, columns mapped positionally:
    /// order number, SKU, description, quantity, line, supervisor.
    /// Returns the ids of the created rows.
    pub fn paste_tsv(&mut self, text: &str) -> Result<Vec<u64>, ServiceError> {
        let mut created = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let cols: Vec<&str> = line.split('\t').map(str::trim).collect();
            let quantity = match cols.get(3) {
                Some(raw) if !raw.is_empty() => raw.parse::<Decimal>().map_err(|_| {
                    ServiceError::InvalidInput(format!(
                        "Cantidad inválida '{}' en la fila {}",
                        raw,
                        index + 1
                    ))
                })?,
                _ => Decimal::ZERO,
            };

            let id = self.add_row();
            let row = self.row_mut(id).expect("row just added");
            if let Some(number) = cols.first().filter(|v| !v.is_empty()) {
                row.order_number = (*number).to_string();
            }
            row.sku = cols.get(1).unwrap_or(&"").to_uppercase();
            row.product_name = cols.get(2).unwrap_or(&"").to_string();
            row.quantity = quantity;
            if let Some(line_name) = cols.get(4).filter(|v| !v.is_empty()) {
                self.set_production_line(id, line_name);
            }
            if let Some(sup) = cols.get(5).filter(|v| !v.is_empty()) {
                self.set_supervisor(id, sup);
            }
            created.push(id);
        }
        Ok(created)
    }

    /// Records a SKU edit: clears any previously resolved recipe, bumps the
    /// row's resolution counter and returns the ticket for the new lookup.
    pub fn set_sku(&mut self, id: u64, sku: &str) -> Option<ResolutionTicket> {
        let row = self.row_mut(id)?;
        row.sku = sku.trim().to_uppercase();
        row.clear_recipe();
        row.error = None;
        row.resolve_seq += 1;
        Some(ResolutionTicket {
            row_id: id,
            seq: row.resolve_seq,
        })
    }

    /// Starts a resolution for the row's current SKU without changing it
    /// (used when importing rows that already carry SKUs).
    pub fn begin_resolution(&mut self, id: u64) -> Option<(ResolutionTicket, String)> {
        let row = self.row_mut(id)?;
        row.resolve_seq += 1;
        Some((
            ResolutionTicket {
                row_id: id,
                seq: row.resolve_seq,
            },
            row.sku.clone(),
        ))
    }

    /// Applies a finished recipe resolution to its row. Returns `false` when
    /// the result was discarded: row gone, or a newer edit bumped the
    /// counter past the ticket.
    pub fn apply_resolution(
        &mut self,
        ticket: ResolutionTicket,
        outcome: Result<Arc<ResolvedRecipe>, ServiceError>,
    ) -> bool {
        let Some(row) = self.row_mut(ticket.row_id) else {
            return false;
        };
        if row.resolve_seq != ticket.seq {
            debug!(
                row = ticket.row_id,
                stale = ticket.seq,
                current = row.resolve_seq,
                "discarding stale recipe resolution"
            );
            return false;
        }
        match outcome {
            Ok(recipe) => row.apply_recipe(&recipe),
            Err(err) => {
                row.clear_recipe();
                row.error = Some(err.user_message());
            }
        }
        true
    }

    /// Applies the result of an order-number lookup. When the order exists
    /// its stored content populates the row (the caller then re-resolves the
    /// recipe for the new SKU); when it does not, the error is attached and
    /// no data is overwritten.
    pub fn apply_order_lookup(
        &mut self,
        id: u64,
        number: &str,
        outcome: Result<WorkOrderPayload, ServiceError>,
    ) -> Option<ResolutionTicket> {
        let row = self.row_mut(id)?;
        row.order_number = number.trim().to_string();
        match outcome {
            Ok(order) => {
                row.sku = order.contenido.sku.to_uppercase();
                row.product_name = order.contenido.descripcion.clone();
                row.quantity = order.contenido.cantidad;
                row.production_line = order.contenido.linea.clone();
                row.supervisor = order.contenido.encargado.clone();
                row.clear_recipe();
                row.error = None;
                row.resolve_seq += 1;
                Some(ResolutionTicket {
                    row_id: id,
                    seq: row.resolve_seq,
                })
            }
            Err(err) => {
                row.error = Some(err.user_message());
                None
            }
        }
    }

    /// Selecting a production line auto-selects its default supervisor when
    /// the current supervisor doesn't belong to that line.
    pub fn set_production_line(&mut self, id: u64, line: &str) {
        let Some(pos) = self.rows.iter().position(|r| r.id == id) else {
            return;
        };
        let current = self.rows[pos].supervisor.clone();
        let keep = !current.is_empty() && self.catalog.supervisor_belongs(line, &current);
        let default = if keep {
            None
        } else {
            self.catalog.default_supervisor(line).map(|s| s.name.clone())
        };
        let row = &mut self.rows[pos];
        row.production_line = line.trim().to_string();
        if let Some(name) = default {
            row.supervisor = name;
        }
    }

    /// Selecting a supervisor auto-fills that supervisor's line.
    pub fn set_supervisor(&mut self, id: u64, supervisor: &str) {
        let line = self
            .catalog
            .line_of_supervisor(supervisor)
            .map(|l| l.name.clone());
        if let Some(row) = self.rows.iter_mut().find(|r| r.id == id) {
            row.supervisor = supervisor.trim().to_string();
            if let Some(line_name) = line {
                row.production_line = line_name;
            }
        }
    }

    pub fn set_quantity(&mut self, id: u64, quantity: Decimal) {
        if let Some(row) = self.row_mut(id) {
            row.quantity = quantity;
        }
    }

    pub fn set_order_number(&mut self, id: u64, number: &str) {
        if let Some(row) = self.row_mut(id) {
            row.order_number = number.trim().to_string();
        }
    }
}
