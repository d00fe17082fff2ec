use super::ui;
use crate::core::Converter;
use anyhow::{Context, Result};
use comfy_table::Cell;

/// Coverage table of every archived currency.
pub fn display_coverage(converter: &Converter) -> String {
    let coverage = converter.list_currencies();
    if coverage.is_empty() {
        return ui::style_text(
            "No rates archived yet. Run `fxarchive fetch` first.",
            ui::StyleType::Subtle,
        );
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell("Bank"),
        ui::header_cell("Quote"),
        ui::header_cell("Earliest"),
        ui::header_cell("Latest"),
        ui::header_cell("Days"),
    ]);

    for (code, range) in &coverage {
        let (bank, quote) = converter
            .archive()
            .get(code)
            .map(|entry| (entry.bank.name.clone(), entry.bank.direction.describe()))
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(code),
            Cell::new(bank),
            Cell::new(quote),
            Cell::new(range.earliest_date),
            Cell::new(range.latest_date),
            ui::number_cell(range.total_days),
        ]);
    }

    format!(
        "{}\n\n{}",
        ui::style_text("Available currencies", ui::StyleType::Title),
        table
    )
}

pub fn coverage_json(converter: &Converter) -> Result<String> {
    serde_json::to_string_pretty(&converter.list_currencies())
        .context("Failed to serialize currency coverage")
}
