use serde::Deserialize;
use serde::Serialize;

/// A serial-number interval mapped to item information, scoped by customer, PO and item code.
///
/// Bounds are fixed-width, zero-padded text, so string order equals numeric order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeRecord {
    pub customer_id: String,
    pub po_number: String,
    pub item_code: String,
    /// Inclusive lower bound
    pub range_start: String,
    /// Inclusive upper bound
    pub range_end: String,
    pub item_info: String,
}

impl RangeRecord {
    pub fn new(
        customer_id: &str,
        po_number: &str,
        item_code: &str,
        range_start: &str,
        range_end: &str,
        item_info: &str,
    ) -> Self {
        RangeRecord {
            customer_id: customer_id.to_owned(),
            po_number: po_number.to_owned(),
            item_code: item_code.to_owned(),
            range_start: range_start.to_owned(),
            range_end: range_end.to_owned(),
            item_info: item_info.to_owned(),
        }
    }

    /// Case-insensitive comparison of the lookup key
    pub fn has_key(&self, customer_id: &str, po_number: &str, item_code: &str) -> bool {
        eq_ignore_case(&self.customer_id, customer_id)
            && eq_ignore_case(&self.po_number, po_number)
            && eq_ignore_case(&self.item_code, item_code)
    }

    pub fn contains(&self, serial: &str) -> bool {
        self.range_start.as_str() <= serial && serial <= self.range_end.as_str()
    }

    /// Same lookup key and intersecting intervals
    pub fn overlaps(&self, other: &RangeRecord) -> bool {
        self.has_key(&other.customer_id, &other.po_number, &other.item_code)
            && self.range_start <= other.range_end
            && other.range_start <= self.range_end
    }
}

pub(crate) fn eq_ignore_case(left: &str, right: &str) -> bool {
    left == right || left.to_lowercase() == right.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_case_insensitive() {
        let record = RangeRecord::new("ACME", "PO1", "It-1", "0001", "0010", "Widget");
        assert!(record.has_key("acme", "po1", "IT-1"));
        assert!(!record.has_key("acme", "po2", "it-1"));
    }

    #[test]
    fn bounds_are_inclusive() {
        let record = RangeRecord::new("ACME", "PO1", "IT1", "0005", "0010", "Widget");
        assert!(record.contains("0005"));
        assert!(record.contains("0010"));
        assert!(!record.contains("0004"));
        assert!(!record.contains("0011"));
    }

    #[test]
    fn overlapping_ranges() {
        let first = RangeRecord::new("ACME", "PO1", "IT1", "0001", "0010", "Widget");
        let touching = RangeRecord::new("acme", "po1", "it1", "0010", "0020", "Widget");
        let disjoint = RangeRecord::new("ACME", "PO1", "IT1", "0011", "0020", "Widget");
        let other_key = RangeRecord::new("ACME", "PO2", "IT1", "0001", "0010", "Widget");

        assert!(first.overlaps(&touching));
        assert!(touching.overlaps(&first));
        assert!(!first.overlaps(&disjoint));
        assert!(!first.overlaps(&other_key));
    }

    #[test]
    fn serializes_with_stored_field_names() {
        let record = RangeRecord::new("ACME", "PO1", "IT1", "0001", "0010", "Widget");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["customer_id"], "ACME");
        assert_eq!(json["range_end"], "0010");
    }
}
