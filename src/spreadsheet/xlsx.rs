use crate::error::BarcodeError;
use crate::helpers::reader::UnifiedReader;
use crate::helpers::xml::XmlAttributeHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::excel;
use crate::spreadsheet::excel::load_relationships;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::row::RawRow;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::BufReader;
use tracing::debug;
use zip::read::ZipFile;
use zip::ZipArchive;

// XML tag names of the SpreadsheetML parts
const TAG_CUSTOM_FORMATS: QName = QName(b"numFmts"); // Custom number formats container
const TAG_CUSTOM_FORMAT: QName = QName(b"numFmt");   // Individual custom number format
const TAG_FORMAT_INDEXES: QName = QName(b"cellXfs");  // Cell format indexes container
const TAG_FORMAT_INDEX: QName = QName(b"xf");         // Individual cell format index
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");   // Shared string table item
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");       // Phonetic text for Asian languages
const TAG_TEXT: QName = QName(b"t");                  // Text content within strings
const TAG_WORKBOOK_PROPERTIES: QName = QName(b"workbookPr");
const TAG_SHEET: QName = QName(b"sheet");
const TAG_ROW: QName = QName(b"row");
const TAG_CELL: QName = QName(b"c");
const TAG_INLINE_STRING: QName = QName(b"is");
const TAG_VALUE: QName = QName(b"v");

/// An Excel 2007+ workbook (`.xlsx`, `.xlsm`, `.xlam`)
pub struct XlsxSpreadsheet {
    /// File name (or upload name) of the workbook
    pub(crate) name: String,
    /// ZIP archive containing the workbook parts
    zip: ZipArchive<UnifiedReader>,
    /// Parsed number formats for cell type detection
    number_formats: Vec<CellType>,
    /// List of worksheets with (name, zip_path) pairs, in workbook order
    sheets: Vec<(String, String)>,
}

impl XlsxSpreadsheet {
    /// Opens a workbook from a local path or a remote URL
    pub fn open(file_name: &str) -> Result<XlsxSpreadsheet, BarcodeError> {
        let reader = UnifiedReader::new(file_name)?;
        Self::load(file_name, reader)
    }

    /// Opens a workbook held in memory, such as an upload buffer
    pub fn from_bytes(name: &str, bytes: Vec<u8>) -> Result<XlsxSpreadsheet, BarcodeError> {
        if bytes.is_empty() {
            Err(SpreadsheetError::EmptyUploadError(name.to_owned()))?;
        }
        Self::load(name, UnifiedReader::from_bytes(bytes))
    }

    fn load(name: &str, reader: UnifiedReader) -> Result<XlsxSpreadsheet, BarcodeError> {
        let (zip, number_formats, sheets) = excel::open(name, reader, load_workbook, load_number_formats)?;
        Ok(XlsxSpreadsheet {
            name: name.to_owned(),
            zip,
            number_formats,
            sheets,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reads the selected sheet into rows keyed by the header row.
    pub fn read_rows(&mut self, criteria: &Criteria) -> Result<Vec<RawRow>, BarcodeError> {
        let sheet = self.read_sheet(criteria)?;
        let shared_strings = self.load_shared_strings()?;
        let rows = sheet.rows(&shared_strings)?;
        debug!(workbook = %self.name, sheet = %sheet.name, rows = rows.len(), "read sheet");
        Ok(rows)
    }

    /// Loads the shared string table; workbooks without one have no shared strings.
    fn load_shared_strings(&mut self) -> Result<Vec<String>, BarcodeError> {
        let mut shared_strings = Vec::<String>::new();
        let mut reader = match self.zip.xml_reader("xl/sharedStrings.xml")? {
            Some(reader) => reader,
            None => return Ok(shared_strings),
        };

        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
                let string = read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?;
                shared_strings.push(string);
            }
        });
        Ok(shared_strings)
    }

    /// Reads the first sheet accepted by the criteria
    fn read_sheet(&mut self, criteria: &Criteria) -> Result<Sheet, BarcodeError> {
        let (sheet_name, zip_path) = self.sheets
            .iter()
            .find(|(sheet_name, _)| criteria.accept(sheet_name))
            .cloned()
            .ok_or_else(|| SpreadsheetError::SheetNotFoundError(self.name.to_owned()))?;

        let mut sheet = Sheet::new(&self.name, &sheet_name);
        let mut row_count = 0usize;
        let mut col_count = 0usize;
        let mut row = 0usize;
        let mut col = 0usize;
        let mut kind = CellType::default();
        let mut value = String::new();
        let mut reader = self.zip.xml_reader(&zip_path)?
            .ok_or_else(|| SpreadsheetError::FileError(zip_path.to_owned()))?;
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_ROW => {
                row_count = event.get_attribute_value("r")?
                    .and_then(|number| number.parse::<usize>().ok())
                    .map(|number| number.saturating_sub(1))
                    .unwrap_or(row_count);
                col_count = 0;
            }
            Event::End(event) if event.name() == TAG_ROW => {
                row_count += 1;
            }
            Event::Start(event) if event.name() == TAG_CELL => {
                (row, col) = event.get_attribute_value("r")?
                    .and_then(|reference| reference_to_index(&reference))
                    .unwrap_or((row_count, col_count));
                col_count = col + 1;
                value.clear();
                kind = event.get_attribute_value("t")?.map(|t| {
                    match t.as_ref() {
                        "inlineStr" | "str" => CellType::InlineString,
                        "s" => CellType::SharedString,
                        "d" => CellType::IsoDateTime,
                        "b" => CellType::Boolean,
                        "e" => if criteria.error_as_null { CellType::Empty } else { CellType::Error },
                        _ => CellType::Number,
                    }
                }).unwrap_or(CellType::Number);
                if let Some(format_id) = event.get_attribute_value("s")? {
                    if kind == CellType::Number && !format_id.is_empty() {
                        let index = format_id.parse::<usize>()?;
                        kind = self.number_formats.get(index).copied().unwrap_or(CellType::Number);
                    }
                }
            }
            Event::Start(event) if kind != CellType::Empty && event.name() == TAG_INLINE_STRING => {
                value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
            }
            Event::Start(event) if kind != CellType::Empty && event.name() == TAG_VALUE => {
                value = read_string_value(&mut reader, TAG_VALUE, true)?;
            }
            Event::End(event) if event.name() == TAG_CELL => {
                if kind == CellType::Error && !value.is_empty() {
                    Err(SpreadsheetError::CellValueError(
                        sheet.file_name.to_owned(),
                        sheet.name.to_owned(),
                        index_to_reference(row, col),
                        value.to_owned(),
                    ))?
                } else if kind != CellType::Empty && !value.is_empty() {
                    sheet.push(Cell {
                        row,
                        col,
                        kind,
                        value: std::mem::take(&mut value),
                    });
                }
                kind = CellType::default();
            },
        });

        Ok(sheet)
    }
}

/// Loads sheet names and paths from `workbook.xml`, and whether the 1904 date system is used
fn load_workbook(zip: &mut ZipArchive<UnifiedReader>) -> Result<(Vec<(String, String)>, bool), BarcodeError> {
    let relationships = load_relationships(zip, "xl/_rels/workbook.xml.rels")?;
    let mut reader = zip.xml_reader("xl/workbook.xml")?
        .ok_or_else(|| SpreadsheetError::FileError("xl/workbook.xml".to_string()))?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    let mut is_1904 = false;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let mut name = None::<Cow<str>>;
            let mut id = None::<Cow<str>>;
            for result in event.attributes() {
                let attribute = result?;
                let key = attribute.key.local_name();
                if key.as_ref() == b"name" {
                    name = Some(attribute.get_value()?);
                } else if key.as_ref() == b"id" {
                    id = Some(attribute.get_value()?);
                }
            }
            if let Some((name, id)) = name.zip(id) {
                if let Some(path) = relationships.get(id.as_ref()) {
                    sheets.push((name.to_string(), path.to_owned()));
                }
            }
        }
        Event::Start(event) if event.name() == TAG_WORKBOOK_PROPERTIES => {
            is_1904 = event.get_attribute_value("date1904")?
                .map(|value| value.eq("1") || value.eq("true"))
                .unwrap_or(false);
        }
    });
    Ok((sheets, is_1904))
}

/// Loads cell styles from `styles.xml`, resolving each style to the cell type of its number format
fn load_number_formats(zip: &mut ZipArchive<UnifiedReader>, is_1904: bool) -> Result<Vec<CellType>, BarcodeError> {
    let mut reader = match zip.xml_reader("xl/styles.xml")? {
        Some(reader) => reader,
        None => return Ok(Vec::new()),
    };

    let mut custom_formats_context = false;
    let mut custom_formats = HashMap::<String, CellType>::new();

    let mut format_indexes_context = false;
    let mut format_indexes = Vec::<String>::new();

    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = true,
        Event::End(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = false,
        Event::Start(event) if custom_formats_context && event.name() == TAG_CUSTOM_FORMAT => {
            let id = event.get_attribute_value("numFmtId")?;
            let format = event.get_attribute_value("formatCode")?;
            if let Some((id, format)) = id.zip(format) {
                let style = CellType::parse_custom_number_format(&format, is_1904);
                custom_formats.insert(id.to_string(), style);
            }
        }

        Event::Start(event) if event.name() == TAG_FORMAT_INDEXES => format_indexes_context = true,
        Event::End(event) if event.name() == TAG_FORMAT_INDEXES => {
            format_indexes_context = false;
            // cellXfs follows numFmts in styles.xml
            break;
        }
        Event::Start(event) if format_indexes_context && event.name() == TAG_FORMAT_INDEX => {
            let id = event.get_attribute_value("numFmtId")?.unwrap_or(Cow::Borrowed("0"));
            format_indexes.push(id.to_string());
        }
    });

    Ok(excel::load_number_formats(format_indexes, custom_formats, is_1904))
}

/// Reads the text of a string item, skipping phonetic runs
fn read_string_value(
    reader: &mut XmlReader<BufReader<ZipFile<'_, UnifiedReader>>>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, BarcodeError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::fixtures::Workbook;
    use crate::spreadsheet::CellValue;

    #[test]
    fn reads_first_sheet_rows() {
        let bytes = Workbook::new()
            .sheet("Ranges", &[
                &["Customer ID", "PO Number", "Item Info"],
                &["ACME", "#1001", "Widget &amp; bolt"],
                &["", "", ""],
                &["Globex", "#1002", "Gadget"],
            ])
            .sheet("Other", &[&["Customer ID"], &["Initech"]])
            .to_bytes();
        let mut spreadsheet = XlsxSpreadsheet::from_bytes("ranges.xlsx", bytes).unwrap();

        let sheet_names = spreadsheet.sheets.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>();
        assert_eq!(sheet_names, vec!["Ranges", "Other"]);
        let rows = spreadsheet.read_rows(&Criteria::default()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].number(), 2);
        assert_eq!(rows[0].get("Customer ID"), Some(&CellValue::Text("ACME".to_owned())));
        assert_eq!(rows[0].get("PO Number"), Some(&CellValue::Number(1001.0)));
        assert_eq!(rows[0].get("Item Info"), Some(&CellValue::Text("Widget & bolt".to_owned())));
        assert_eq!(rows[1].number(), 4);
        assert_eq!(rows[1].get("Customer ID"), Some(&CellValue::Text("Globex".to_owned())));
    }

    #[test]
    fn selects_sheet_by_pattern() {
        let bytes = Workbook::new()
            .sheet("Sheet1", &[&["Customer ID"], &["ACME"]])
            .sheet("Ranges 2024", &[&["Customer ID"], &["Initech"]])
            .to_bytes();
        let mut spreadsheet = XlsxSpreadsheet::from_bytes("ranges.xlsx", bytes).unwrap();

        let rows = spreadsheet.read_rows(&Criteria::new(Some("Ranges*"), false).unwrap()).unwrap();
        assert_eq!(rows[0].get("Customer ID"), Some(&CellValue::Text("Initech".to_owned())));

        let missing = spreadsheet.read_rows(&Criteria::new(Some("Archive"), false).unwrap());
        assert!(missing.is_err());
    }

    #[test]
    fn error_cells_fail_unless_null() {
        let bytes = Workbook::new()
            .sheet("Sheet1", &[&["Item Info", "Customer ID"], &["!#N/A", "ACME"]])
            .to_bytes();

        let mut spreadsheet = XlsxSpreadsheet::from_bytes("ranges.xlsx", bytes.clone()).unwrap();
        let error = spreadsheet.read_rows(&Criteria::default()).unwrap_err();
        assert!(error.to_string().contains("A2"), "{}", error);

        let mut spreadsheet = XlsxSpreadsheet::from_bytes("ranges.xlsx", bytes).unwrap();
        let rows = spreadsheet.read_rows(&Criteria::new(None, true).unwrap()).unwrap();
        assert_eq!(rows[0].get("Item Info"), None);
        assert_eq!(rows[0].get("Customer ID"), Some(&CellValue::Text("ACME".to_owned())));
    }

    #[test]
    fn date_styled_numbers_render_as_dates() {
        let bytes = Workbook::new()
            .sheet("Sheet1", &[&["Item Info"], &["@45292"]])
            .to_bytes();
        let mut spreadsheet = XlsxSpreadsheet::from_bytes("ranges.xlsx", bytes).unwrap();

        let rows = spreadsheet.read_rows(&Criteria::default()).unwrap();
        assert_eq!(rows[0].get("Item Info"), Some(&CellValue::Text("2024-01-01".to_owned())));
    }

    #[test]
    fn rejects_empty_upload_and_garbage() {
        assert!(XlsxSpreadsheet::from_bytes("ranges.xlsx", Vec::new()).is_err());
        assert!(XlsxSpreadsheet::from_bytes("ranges.xlsx", b"not a workbook".to_vec()).is_err());
    }
}
