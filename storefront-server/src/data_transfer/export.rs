//! CSV catalog export
//!
//! Columns follow the import schema so an export can be edited and
//! re-imported, plus two derived columns for marketplace feeds.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Product, ProductCondition};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const EXPORT_COLUMNS: [&str; 21] = [
    "partNumber",
    "name",
    "description",
    "price",
    "originalPrice",
    "categoryId",
    "subcategoryId",
    "status",
    "brand",
    "oem",
    "compatibility",
    "condition",
    "year",
    "carBrand",
    "carModel",
    "metaTitle",
    "metaDescription",
    "metaKeywords",
    "slug",
    "quantity",
    "isUsed",
];

fn number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn export_record(p: &Product) -> [String; 21] {
    [
        p.part_number.clone(),
        p.name.clone(),
        text(&p.description),
        number(p.price),
        p.original_price.map(number).unwrap_or_default(),
        p.category_id.map(|id| id.to_string()).unwrap_or_default(),
        p.subcategory_id.map(|id| id.to_string()).unwrap_or_default(),
        p.status.as_str().to_string(),
        text(&p.brand),
        text(&p.oem),
        p.compatibility.join(", "),
        p.condition.as_str().to_string(),
        p.year.map(|y| y.to_string()).unwrap_or_default(),
        text(&p.car_brand),
        text(&p.car_model),
        text(&p.seo.title),
        text(&p.seo.description),
        p.seo.keywords.join(", "),
        text(&p.seo.slug),
        u8::from(p.status.is_available()).to_string(),
        u8::from(p.condition == ProductCondition::Used).to_string(),
    ]
}

fn export_failed(e: impl std::fmt::Display) -> AppError {
    tracing::error!(error = %e, "CSV export failed");
    AppError::with_message(ErrorCode::ExportFailed, "Failed to build export file")
}

/// UTF-8 CSV with a leading byte order mark
pub fn export_csv(products: &[Product]) -> AppResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    writer.write_record(EXPORT_COLUMNS).map_err(export_failed)?;
    for p in products {
        writer.write_record(export_record(p)).map_err(export_failed)?;
    }
    writer.into_inner().map_err(export_failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::engine::tests::product;
    use crate::data_transfer::rows::parse_csv;
    use shared::models::ProductStatus;

    #[test]
    fn bom_header_and_derived_columns() {
        let mut used = product(1, "Фара левая", "FL-1", 4500.0);
        used.condition = ProductCondition::Used;
        used.compatibility = vec!["BMW E46".into(), "BMW E90".into()];
        used.original_price = Some(5000.5);
        let mut gone = product(2, "Mirror", "M-2", 10.0);
        gone.status = ProductStatus::Discontinued;

        let bytes = export_csv(&[used, gone]).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let body = String::from_utf8(bytes[3..].to_vec()).unwrap();
        let mut lines = body.lines();
        assert_eq!(lines.next().unwrap(), EXPORT_COLUMNS.join(","));
        let first = lines.next().unwrap();
        assert!(first.starts_with("FL-1,Фара левая,,4500,5000.5,"));
        assert!(first.contains("\"BMW E46, BMW E90\""));
        assert!(first.ends_with(",1,1"));
        assert!(lines.next().unwrap().ends_with(",0,0"));
    }

    #[test]
    fn export_reads_back_through_the_importer() {
        let mut p = product(1, "Pad", "P-1", 99.9);
        p.brand = Some("ATE".into());
        let rows = parse_csv(&export_csv(&[p]).unwrap()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].data.part_number(), Some("P-1"));
        assert_eq!(rows[0].data.brand.as_deref(), Some("ATE"));
        assert_eq!(rows[0].data.price.as_deref(), Some("99.9"));
    }
}
