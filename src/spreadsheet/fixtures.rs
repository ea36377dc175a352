//! In-memory `.xlsx` builder for tests.
//!
//! Cell notation: `""` leaves the cell out, `#12` is a number, `@45292` a number
//! with a date style, `!#N/A` an error cell, anything else a shared string.
//! Strings are written as raw XML, so entities such as `&amp;` are resolved on read.

use std::io::Cursor;
use std::io::Write;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::spreadsheet::reference::index_to_reference;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><cellXfs count="2"><xf numFmtId="0"/><xf numFmtId="14"/></cellXfs></styleSheet>"#;

#[derive(Default)]
pub(crate) struct Workbook {
    sheets: Vec<(String, Vec<Vec<String>>)>,
}

impl Workbook {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn sheet(mut self, name: &str, rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        self.sheets.push((name.to_owned(), rows));
        self
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut shared_strings = Vec::<String>::new();
        let mut worksheets = Vec::<String>::new();
        for (_, rows) in &self.sheets {
            let mut xml = String::from(r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#);
            for (row, cells) in rows.iter().enumerate() {
                xml.push_str(&format!(r#"<row r="{}">"#, row + 1));
                for (col, cell) in cells.iter().enumerate() {
                    let reference = index_to_reference(row, col);
                    if cell.is_empty() {
                        continue;
                    } else if let Some(number) = cell.strip_prefix('#') {
                        xml.push_str(&format!(r#"<c r="{reference}"><v>{number}</v></c>"#));
                    } else if let Some(number) = cell.strip_prefix('@') {
                        xml.push_str(&format!(r#"<c r="{reference}" s="1"><v>{number}</v></c>"#));
                    } else if let Some(error) = cell.strip_prefix('!') {
                        xml.push_str(&format!(r#"<c r="{reference}" t="e"><v>{error}</v></c>"#));
                    } else {
                        xml.push_str(&format!(r#"<c r="{reference}" t="s"><v>{}</v></c>"#, shared_strings.len()));
                        shared_strings.push(cell.to_owned());
                    }
                }
                xml.push_str("</row>");
            }
            xml.push_str("</sheetData></worksheet>");
            worksheets.push(xml);
        }

        let mut workbook = String::from(r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#);
        let mut relationships = String::from(r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
        for (index, (name, _)) in self.sheets.iter().enumerate() {
            let id = index + 1;
            workbook.push_str(&format!(r#"<sheet name="{name}" sheetId="{id}" r:id="rId{id}"/>"#));
            relationships.push_str(&format!(
                r#"<Relationship Id="rId{id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{id}.xml"/>"#
            ));
        }
        workbook.push_str("</sheets></workbook>");
        relationships.push_str("</Relationships>");

        let mut strings = String::from(r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#);
        for string in &shared_strings {
            strings.push_str(&format!("<si><t>{string}</t></si>"));
        }
        strings.push_str("</sst>");

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        let mut entry = |name: &str, content: &str| {
            writer.start_file(name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        };
        entry("xl/workbook.xml", &workbook);
        entry("xl/_rels/workbook.xml.rels", &relationships);
        entry("xl/styles.xml", STYLES);
        entry("xl/sharedStrings.xml", &strings);
        for (index, xml) in worksheets.iter().enumerate() {
            entry(&format!("xl/worksheets/sheet{}.xml", index + 1), xml);
        }
        writer.finish().unwrap().into_inner()
    }
}
