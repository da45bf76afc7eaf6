// Copyright 2023 Remi Bernotavicius

use crate::shopping::ShoppingListItem;
use crate::week::MealWeek;
use derive_more::Display;
use std::path::{Path, PathBuf};

pub mod csv;
pub mod pdf;

#[derive(Debug, Display, Copy, Clone, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    #[display("CSV")]
    Csv,
    #[display("PDF")]
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Pdf => "pdf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Pdf => "application/pdf",
        }
    }
}

/// `courses_<first day of the week>.<extension>`
pub fn file_name(format: ExportFormat, week: MealWeek) -> String {
    format!(
        "courses_{}.{}",
        week.first_day().format("%Y-%m-%d"),
        format.extension()
    )
}

/// Dates as they are printed in exported documents, `DD/MM/YYYY`.
pub fn date_label(date: chrono::NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn render(
    format: ExportFormat,
    week: MealWeek,
    items: &[ShoppingListItem],
) -> crate::Result<Vec<u8>> {
    Ok(match format {
        ExportFormat::Csv => self::csv::to_csv(items)?.into_bytes(),
        ExportFormat::Pdf => self::pdf::to_pdf(
            items,
            &date_label(week.first_day()),
            &date_label(week.last_day()),
        ),
    })
}

/// Writes the shopping list for `week` into `dir` and returns the path of the new file.
pub fn save_shopping_list(
    dir: &Path,
    format: ExportFormat,
    week: MealWeek,
    items: &[ShoppingListItem],
) -> crate::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name(format, week));
    std::fs::write(&path, render(format, week, items)?)?;
    log::info!(
        "wrote {format} shopping list ({}) to {}",
        format.mime_type(),
        path.display()
    );
    Ok(path)
}

#[cfg(test)]
fn week() -> MealWeek {
    MealWeek::containing("2024-03-07".parse().unwrap())
}

#[test]
fn export_file_names() {
    assert_eq!(file_name(ExportFormat::Csv, week()), "courses_2024-03-04.csv");
    assert_eq!(file_name(ExportFormat::Pdf, week()), "courses_2024-03-04.pdf");
}

#[test]
fn export_date_labels() {
    assert_eq!(date_label(week().first_day()), "04/03/2024");
    assert_eq!(date_label(week().last_day()), "10/03/2024");
}

#[test]
fn save_shopping_list_writes_files() {
    use std::{env, fs};

    let dir = env::temp_dir().join(format!("meal-planner-export-{}", std::process::id()));
    let items = vec![ShoppingListItem {
        name: "Farine".into(),
        quantities: "200g, 1/2 cup".into(),
    }];

    let csv_path = save_shopping_list(&dir, ExportFormat::Csv, week(), &items).unwrap();
    assert_eq!(csv_path, dir.join("courses_2024-03-04.csv"));
    assert_eq!(
        fs::read_to_string(&csv_path).unwrap(),
        "Ingrédient,Quantité\r\nFarine,\"200g, 1/2 cup\"\r\n"
    );

    let pdf_path = save_shopping_list(&dir, ExportFormat::Pdf, week(), &items).unwrap();
    let document = fs::read(&pdf_path).unwrap();
    assert!(document.starts_with(b"%PDF-"));
    assert!(document
        .windows(b"Semaine du 04/03/2024 au 10/03/2024".len())
        .any(|w| w == b"Semaine du 04/03/2024 au 10/03/2024"));

    fs::remove_dir_all(&dir).unwrap();
}
