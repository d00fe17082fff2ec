use super::ui;
use crate::core::ingest::{IngestSummary, Ingestor, SourceOutcome};
use crate::core::{RateSource, YearRange};
use crate::store::RateStore;
use comfy_table::Cell;

impl IngestSummary {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Currency"),
            ui::header_cell("Bank"),
            ui::header_cell("Direction"),
            ui::header_cell("Fetched"),
            ui::header_cell("Existing"),
            ui::header_cell("Added"),
            ui::header_cell("Status"),
        ]);

        for report in &self.reports {
            let mut row = vec![
                Cell::new(&report.currency),
                Cell::new(&report.bank),
                Cell::new(report.direction.to_string()),
            ];
            match &report.outcome {
                SourceOutcome::Updated {
                    fetched,
                    existing,
                    added,
                } => row.extend([
                    ui::number_cell(*fetched),
                    ui::number_cell(*existing),
                    ui::added_cell(*added),
                    Cell::new("ok"),
                ]),
                SourceOutcome::Failed { error } => row.extend([
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new("-"),
                    ui::error_cell(error),
                ]),
            }
            table.add_row(row);
        }

        let mut output = format!(
            "{}\n\n",
            ui::style_text("Rate archive update", ui::StyleType::Title)
        );
        output.push_str(&table.to_string());

        let failures = self.failures();
        let footer = if failures > 0 {
            ui::style_text(
                &format!("{failures} source(s) failed, see above"),
                ui::StyleType::Error,
            )
        } else if self.changed() {
            ui::style_text("Archive updated", ui::StyleType::TotalValue)
        } else {
            ui::style_text("All sources up to date", ui::StyleType::Subtle)
        };
        output.push_str(&format!("\n\n{footer}"));
        output
    }
}

/// Runs every source with a progress bar on stderr.
pub async fn run_fetch(
    store: &RateStore,
    sources: &[Box<dyn RateSource>],
    years: YearRange,
) -> IngestSummary {
    let pb = ui::new_progress_bar(sources.len() as u64);
    pb.set_message(format!("Fetching rates for {years}"));

    let summary = Ingestor::new(store)
        .run_with(sources, years, |report| {
            pb.set_message(format!("Processed {}", report.currency));
            pb.inc(1);
        })
        .await;

    pb.finish_and_clear();
    summary
}
