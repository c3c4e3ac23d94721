// src/reporter.rs
// Shopping list export: plain text for reading, CSV for spreadsheets.
// Both are returned as download bodies, never written to disk.

use chrono::{DateTime, Local};
use csv::Writer;
use std::error::Error;

use crate::analyst::truncate;
use crate::memory::ShoppingListItem;

const DESCRIPTION_CHARS: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Csv,
}

impl ExportFormat {
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("txt") | Some("text") => Some(ExportFormat::Text),
            Some("csv") => Some(ExportFormat::Csv),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Text => "text/plain; charset=utf-8",
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Text => "shopping_list.txt",
            ExportFormat::Csv => "shopping_list.csv",
        }
    }
}

pub struct Reporter;

impl Reporter {
    pub fn export_text(items: &[ShoppingListItem], generated_at: DateTime<Local>) -> String {
        let mut out = String::from("🛒 My Shopping List\n");
        out.push_str(&"=".repeat(30));
        out.push_str("\n\n");

        for (i, item) in items.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, item.title));
            if !item.description.is_empty() {
                out.push_str(&format!(
                    "   📝 Description: {}...\n",
                    truncate(&item.description, DESCRIPTION_CHARS)
                ));
            }
            out.push_str(&format!("   💰 Price: {}\n", item.price));
            out.push_str(&format!("   🏪 Store: {}\n", item.source));
            out.push_str(&format!("   🔗 Link: {}\n", item.url));
            out.push_str(&format!("   🕒 Added: {}\n\n", item.added_at.format("%Y-%m-%d %H:%M")));
        }

        out.push_str(&format!("Generated on: {}\n", generated_at.format("%Y-%m-%d %H:%M:%S")));
        out
    }

    pub fn export_csv(items: &[ShoppingListItem]) -> Result<String, Box<dyn Error>> {
        let mut wtr = Writer::from_writer(Vec::new());

        wtr.write_record(["title", "description", "price", "store", "url", "added_at"])?;
        for item in items {
            let added = item.added_at.format("%Y-%m-%d %H:%M:%S").to_string();
            wtr.write_record([
                item.title.as_str(),
                item.description.as_str(),
                item.price.as_str(),
                item.source.as_str(),
                item.url.as_str(),
                added.as_str(),
            ])?;
        }

        let bytes = wtr.into_inner().map_err(|e| e.to_string())?;
        Ok(String::from_utf8(bytes)?)
    }
}
