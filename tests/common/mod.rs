use std::io::Cursor;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const HEADER: [&str; 6] = [
    "Customer ID",
    "PO Number",
    "Item Code",
    "Series Number Start",
    "Series Number End",
    "Item Info",
];

/// Cell of a generated worksheet
pub enum Value<'a> {
    Text(&'a str),
    Number(f64),
    Blank,
}

/// Builds a single-sheet `.xlsx` workbook with inline strings, the way some
/// exporters write it (no shared string table, no styles part).
pub fn xlsx(sheet_name: &str, rows: &[Vec<Value>]) -> Vec<u8> {
    let mut sheet = String::from(r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#);
    for (index, cells) in rows.iter().enumerate() {
        sheet.push_str(&format!(r#"<row r="{}">"#, index + 1));
        for (col, value) in cells.iter().enumerate() {
            let reference = format!("{}{}", (b'A' + col as u8) as char, index + 1);
            match value {
                Value::Text(text) => sheet.push_str(&format!(
                    r#"<c r="{reference}" t="inlineStr"><is><t>{text}</t></is></c>"#
                )),
                Value::Number(number) => sheet.push_str(&format!(r#"<c r="{reference}"><v>{number}</v></c>"#)),
                Value::Blank => {}
            }
        }
        sheet.push_str("</row>");
    }
    sheet.push_str("</sheetData></worksheet>");

    let workbook = format!(
        r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{sheet_name}" sheetId="1" r:id="rId1"/></sheets></workbook>"#
    );
    let relationships = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in [
        ("xl/workbook.xml", workbook.as_str()),
        ("xl/_rels/workbook.xml.rels", relationships),
        ("xl/worksheets/sheet1.xml", sheet.as_str()),
    ] {
        writer.start_file(name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub fn range<'a>(customer: &'a str, po: &'a str, item: &'a str, start: f64, end: f64, info: &'a str) -> Vec<Value<'a>> {
    vec![
        Value::Text(customer),
        Value::Text(po),
        Value::Text(item),
        Value::Number(start),
        Value::Number(end),
        Value::Text(info),
    ]
}

pub fn header() -> Vec<Value<'static>> {
    HEADER.iter().map(|column| Value::Text(column)).collect()
}

pub fn write(path: &Path, bytes: &[u8]) {
    std::fs::write(path, bytes).unwrap();
}
