use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::path::Path;

use super::dedup::Respondent;
use super::tabulate::Summary;
use crate::error::Result;
use crate::model::language_label;

/// Write the summary and the respondent list to an Excel workbook
pub fn write_report_xlsx(summary: &Summary, respondents: &[Respondent], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    write_summary_sheet(sheet, summary)?;

    let sheet = workbook.add_worksheet();
    write_respondents_sheet(sheet, respondents)?;

    workbook.save(path)?;
    log::info!("Wrote report workbook {}", path.display());
    Ok(())
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_border_bottom(FormatBorder::Thin)
}

/// One block per question, then the language block
fn write_summary_sheet(sheet: &mut Worksheet, summary: &Summary) -> Result<()> {
    sheet.set_name("Summary")?;
    sheet.set_column_width(0, 28)?; // Label
    sheet.set_column_width(1, 10)?; // Count
    sheet.set_column_width(2, 10)?; // Share

    let header = header_format();
    let percent = Format::new().set_num_format("0.0%");

    sheet.write_string_with_format(0, 0, "Respondents", &header)?;
    sheet.write_number(0, 1, summary.respondents as f64)?;

    let mut row: u32 = 2;
    for tally in &summary.questions {
        sheet.write_string_with_format(row, 0, tally.question.key(), &header)?;
        sheet.write_string_with_format(row, 1, "Count", &header)?;
        sheet.write_string_with_format(row, 2, "Share", &header)?;
        row += 1;

        for count in &tally.counts {
            sheet.write_string(row, 0, &count.label)?;
            sheet.write_number(row, 1, count.count as f64)?;
            if tally.total > 0 {
                sheet.write_number_with_format(row, 2, count.count as f64 / tally.total as f64, &percent)?;
            }
            row += 1;
        }
        row += 1;
    }

    sheet.write_string_with_format(row, 0, "Language", &header)?;
    sheet.write_string_with_format(row, 1, "Count", &header)?;
    sheet.write_string_with_format(row, 2, "Share", &header)?;
    row += 1;
    for lang in &summary.languages {
        sheet.write_string(row, 0, &lang.label)?;
        sheet.write_number(row, 1, lang.count as f64)?;
        if summary.respondents > 0 {
            sheet.write_number_with_format(row, 2, lang.count as f64 / summary.respondents as f64, &percent)?;
        }
        row += 1;
    }

    Ok(())
}

fn write_respondents_sheet(sheet: &mut Worksheet, respondents: &[Respondent]) -> Result<()> {
    sheet.set_name("Respondents")?;
    sheet.set_column_width(0, 26)?; // Timestamp
    sheet.set_column_width(1, 16)?; // Language
    sheet.set_column_width(2, 24)?; // Player
    sheet.set_column_width(6, 12)?; // Submissions

    let header = header_format();
    let center = Format::new().set_align(FormatAlign::Center);

    let headers = ["Timestamp", "Language", "Player", "Q2_time", "Q3_time", "Q4_day", "Submissions"];
    for (col, title) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &header)?;
    }

    for (idx, respondent) in respondents.iter().enumerate() {
        let row = (idx + 1) as u32;
        let record = &respondent.record;
        sheet.write_string(row, 0, &record.timestamp)?;
        sheet.write_string(row, 1, language_label(&record.language.to_lowercase()))?;
        sheet.write_string(row, 2, &record.player_name)?;
        sheet.write_string_with_format(row, 3, &record.q2_time, &center)?;
        sheet.write_string_with_format(row, 4, &record.q3_time, &center)?;
        sheet.write_string_with_format(row, 5, &record.q4_day, &center)?;
        sheet.write_number_with_format(row, 6, respondent.submissions as f64, &center)?;
    }

    Ok(())
}
