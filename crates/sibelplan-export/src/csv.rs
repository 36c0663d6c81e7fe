//! CSV bill of materials for one page's symbols.

use sibelplan_core::store::PageObjects;

/// Column header, written unquoted.
pub const CSV_HEADER: &str = "page,symbolId,label,circuit,phase,group,x,y,w,h,rot";

/// Suggested download filename. Page numbers are one-based for humans.
pub fn csv_filename(page_index: usize) -> String {
    format!("sibel_page_{}.csv", page_index + 1)
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Render the symbols of one page as CSV, in z-order.
///
/// Routes and text objects are not part of the bill of materials. Data
/// fields are always quoted; coordinates are rounded to whole units.
pub fn export_symbols_csv(page: &PageObjects, page_index: usize) -> String {
    let mut out = String::from(CSV_HEADER);
    for sym in page.symbols() {
        let row = [
            (page_index + 1).to_string(),
            sym.symbol_id.clone(),
            sym.label.clone(),
            sym.circuit.clone(),
            sym.phase.clone(),
            sym.group.clone(),
            sym.x.round().to_string(),
            sym.y.round().to_string(),
            sym.w.to_string(),
            sym.h.to_string(),
            sym.rot.to_string(),
        ];
        out.push('\n');
        let quoted: Vec<String> = row.iter().map(|f| quote(f)).collect();
        out.push_str(&quoted.join(","));
    }
    out
}
