/// Multipart field carrying the uploaded sheet
pub const UPLOAD_FIELD: &str = "file";

/// Uploads must carry this filename suffix (case-sensitive)
pub const CSV_EXTENSION: &str = ".csv";

pub const UPLOAD_ROUTE: &str = "/api/csvtojson/upload/";

pub const SUCCESS_MESSAGE: &str = "CSV processed successfully";
pub const MISSING_FILE_MESSAGE: &str = "No file provided.";
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid file format. Please upload a CSV file.";

pub const DEFAULT_DOWNSTREAM_URL: &str = "http://127.0.0.1:8000/api/add_product/";

// Column names in the uploaded sheet; also the JSON keys sent downstream
pub const PRODUCT_ID: &str = "product_id";
pub const PRODUCT_NAME: &str = "product_name";
pub const OPENING_STOCK: &str = "opening_stock";
pub const PURCHASE_STOCK: &str = "purchase_stock";
pub const UNITS_SOLD: &str = "units_sold";
pub const HAND_IN_STOCK: &str = "hand_in_stock";
pub const COST_PRICE_PER_UNIT: &str = "cost_price_per_unit";
pub const COST_PRICE_TOTAL: &str = "cost_price_total";

/// Returns true when the filename carries the expected sheet extension
pub fn has_csv_extension(filename: &str) -> bool {
    filename.ends_with(CSV_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_check() {
        assert!(has_csv_extension("stock.csv"));
        assert!(has_csv_extension("reports/2024.q1.csv"));
        assert!(!has_csv_extension("data.txt"));
        assert!(!has_csv_extension("stock.csv.bak"));
        assert!(!has_csv_extension("STOCK.CSV"));
    }
}
