//! Sheet parsing: UTF-8 decoding, a header-keyed CSV row iterator, and
//! coercion of each row into a [`RowRecord`].

use std::io;

use csv::StringRecord;
use tracing::debug;

use crate::constants::{
    COST_PRICE_PER_UNIT, COST_PRICE_TOTAL, HAND_IN_STOCK, OPENING_STOCK, PRODUCT_ID, PRODUCT_NAME,
    PURCHASE_STOCK, UNITS_SOLD,
};
use crate::error::{ForwarderError, Result};
use crate::types::{Money, RowRecord};

/// Decode uploaded bytes as UTF-8, dropping a leading byte-order mark.
pub fn decode_utf8(bytes: &[u8]) -> Result<&str> {
    let text = std::str::from_utf8(bytes)?;
    Ok(text.strip_prefix('\u{FEFF}').unwrap_or(text))
}

/// Lazy iterator over the data rows of a CSV sheet.
///
/// The first line supplies the column names. Rows may be shorter than the
/// header (missing cells count as missing fields) or longer (extra cells are
/// ignored). Each call to `next` reads and converts exactly one row.
pub struct RowReader<R: io::Read> {
    headers: StringRecord,
    records: csv::StringRecordsIntoIter<R>,
}

impl<R: io::Read> RowReader<R> {
    pub fn from_reader(rdr: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(rdr);
        let headers = reader.headers()?.clone();
        debug!(
            "RowReader: headers={:?}",
            headers.iter().collect::<Vec<_>>()
        );
        Ok(Self {
            headers,
            records: reader.into_records(),
        })
    }
}

impl<'a> RowReader<&'a [u8]> {
    pub fn from_text(text: &'a str) -> Result<Self> {
        Self::from_reader(text.as_bytes())
    }
}

impl<R: io::Read> Iterator for RowReader<R> {
    type Item = Result<RowRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(r) => r,
            Err(e) => return Some(Err(e.into())),
        };
        Some(convert_row(&self.headers, &record))
    }
}

/// Map one CSV record onto the fixed product schema.
pub fn convert_row(headers: &StringRecord, record: &StringRecord) -> Result<RowRecord> {
    let line = record.position().map(|p| p.line()).unwrap_or_default();
    let row = Row {
        headers,
        record,
        line,
    };

    Ok(RowRecord {
        product_id: row.text(PRODUCT_ID),
        product_name: row.text(PRODUCT_NAME),
        opening_stock: row.integer(OPENING_STOCK)?,
        purchase_stock: row.integer(PURCHASE_STOCK)?,
        units_sold: row.integer(UNITS_SOLD)?,
        hand_in_stock: row.integer(HAND_IN_STOCK)?,
        cost_price_per_unit: row.money(COST_PRICE_PER_UNIT)?,
        cost_price_total: row.money(COST_PRICE_TOTAL)?,
    })
}

struct Row<'a> {
    headers: &'a StringRecord,
    record: &'a StringRecord,
    line: u64,
}

impl<'a> Row<'a> {
    /// Raw cell for a column; the last column wins when a header repeats.
    fn get(&self, name: &str) -> Option<&'a str> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(_, h)| *h == name)
            .last()
            .and_then(|(i, _)| self.record.get(i))
    }

    /// Trimmed cell, or None when the column is absent or blank.
    fn value(&self, name: &str) -> Option<&'a str> {
        self.get(name).map(str::trim).filter(|v| !v.is_empty())
    }

    fn text(&self, name: &str) -> Option<String> {
        self.get(name).map(str::to_string)
    }

    fn integer(&self, name: &'static str) -> Result<i64> {
        match self.value(name) {
            None => Ok(0),
            Some(v) => v.parse::<i64>().map_err(|_| self.invalid(name, v, "integer")),
        }
    }

    fn money(&self, name: &'static str) -> Result<Money> {
        match self.value(name) {
            None => Ok(Money::default()),
            Some(v) => match v.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Money(n)),
                _ => Err(self.invalid(name, v, "decimal")),
            },
        }
    }

    fn invalid(&self, field: &'static str, value: &str, expected: &'static str) -> ForwarderError {
        ForwarderError::Conversion {
            line: self.line,
            field,
            value: value.to_string(),
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "product_id,product_name,opening_stock,purchase_stock,units_sold,\
                          hand_in_stock,cost_price_per_unit,cost_price_total";

    fn rows(text: &str) -> Vec<Result<RowRecord>> {
        RowReader::from_text(text).unwrap().collect()
    }

    #[test]
    fn test_full_row_is_converted() {
        let text = format!("{HEADER}\nP-1,Widget,10,5,3,12,2.5,30\n");
        let rows = rows(&text);
        assert_eq!(rows.len(), 1);
        let record = rows[0].as_ref().unwrap();
        assert_eq!(record.product_id.as_deref(), Some("P-1"));
        assert_eq!(record.product_name.as_deref(), Some("Widget"));
        assert_eq!(record.opening_stock, 10);
        assert_eq!(record.purchase_stock, 5);
        assert_eq!(record.units_sold, 3);
        assert_eq!(record.hand_in_stock, 12);
        assert_eq!(record.cost_price_per_unit.to_string(), "2.50");
        assert_eq!(record.cost_price_total.to_string(), "30.00");
    }

    #[test]
    fn test_missing_columns_use_defaults() {
        let rows = rows("product_id,units_sold\nP-9,4\n");
        let record = rows[0].as_ref().unwrap();
        assert_eq!(record.product_id.as_deref(), Some("P-9"));
        assert_eq!(record.product_name, None);
        assert_eq!(record.units_sold, 4);
        assert_eq!(record.opening_stock, 0);
        assert_eq!(record.cost_price_per_unit.to_string(), "0.00");
        assert_eq!(record.cost_price_total.to_string(), "0.00");
    }

    #[test]
    fn test_blank_and_short_cells_use_defaults() {
        let text = format!("{HEADER}\nP-2,Bolt, ,,7\n");
        let rows = rows(&text);
        let record = rows[0].as_ref().unwrap();
        assert_eq!(record.opening_stock, 0);
        assert_eq!(record.purchase_stock, 0);
        assert_eq!(record.units_sold, 7);
        assert_eq!(record.hand_in_stock, 0);
        assert_eq!(record.cost_price_total.to_string(), "0.00");
    }

    #[test]
    fn test_non_numeric_integer_is_rejected() {
        let text = format!("{HEADER}\nP-1,Widget,1,1,1,1,1,1\nP-2,Nut,1,1,lots,1,1,1\n");
        let rows = rows(&text);
        assert!(rows[0].is_ok());
        match &rows[1] {
            Err(ForwarderError::Conversion {
                line, field, value, ..
            }) => {
                assert_eq!(*line, 3);
                assert_eq!(*field, "units_sold");
                assert_eq!(value, "lots");
            }
            other => panic!("expected conversion error, got {other:?}"),
        }
    }

    #[test]
    fn test_decimal_in_integer_field_is_rejected() {
        let rows = rows("opening_stock\n3.0\n");
        assert!(matches!(
            rows[0],
            Err(ForwarderError::Conversion { field: "opening_stock", .. })
        ));
    }

    #[test]
    fn test_non_finite_money_is_rejected() {
        let rows = rows("cost_price_total\nNaN\n");
        assert!(matches!(
            rows[0],
            Err(ForwarderError::Conversion { expected: "decimal", .. })
        ));
    }

    #[test]
    fn test_repeated_header_last_column_wins() {
        let rows = rows("units_sold,units_sold\n1,2\n");
        assert_eq!(rows[0].as_ref().unwrap().units_sold, 2);

        let ids = self::rows("product_id,units_sold,product_id\nA,1,B\nC,2\n");
        assert_eq!(ids[0].as_ref().unwrap().product_id.as_deref(), Some("B"));
        // the later column is missing from a short row
        assert_eq!(ids[1].as_ref().unwrap().product_id, None);
    }

    #[test]
    fn test_quoted_fields_and_crlf() {
        let rows = rows("product_id,product_name\r\nP-1,\"Nut, hex\"\r\nP-2,\"Two\nlines\"\r\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].as_ref().unwrap().product_name.as_deref(),
            Some("Nut, hex")
        );
        assert_eq!(
            rows[1].as_ref().unwrap().product_name.as_deref(),
            Some("Two\nlines")
        );
    }

    #[test]
    fn test_header_only_and_empty_input_yield_no_rows() {
        assert!(rows(HEADER).is_empty());
        assert!(rows("").is_empty());
    }

    #[test]
    fn test_reader_is_lazy() {
        let text = format!("{HEADER}\nP-1,A,1,1,1,1,1,1\nP-2,B,x,1,1,1,1,1\n");
        let mut reader = RowReader::from_text(&text).unwrap();
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_decode_strips_bom_and_rejects_invalid_bytes() {
        let with_bom = b"\xEF\xBB\xBFproduct_id\nP-1\n";
        let text = decode_utf8(with_bom).unwrap();
        let rows = rows(text);
        assert_eq!(rows[0].as_ref().unwrap().product_id.as_deref(), Some("P-1"));

        let latin1 = b"product_name\ncaf\xE9\n";
        assert!(matches!(
            decode_utf8(latin1),
            Err(ForwarderError::Decoding(_))
        ));
    }
}
