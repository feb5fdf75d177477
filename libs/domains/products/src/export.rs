//! Catalog export to spreadsheet form.

use chrono::Utc;
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::error::{ProductError, ProductResult};
use crate::models::Product;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const COLUMNS: [(&str, f64); 14] = [
    ("Slug", 50.0),
    ("Nombre", 50.0),
    ("Descripción", 50.0),
    ("Precio", 10.0),
    ("Segundo precio", 10.0),
    ("Stock", 10.0),
    ("Envío gratis", 25.0),
    ("ID del video", 25.0),
    ("Fecha de creación", 25.0),
    ("Fecha de actualización", 25.0),
    ("Orden en pantalla", 10.0),
    ("Categoría", 50.0),
    ("Unidad", 50.0),
    ("Creado por", 50.0),
];

/// File name for today's export, without extension.
pub fn export_filename() -> String {
    format!("productos_{}", Utc::now().format("%Y-%m-%d"))
}

/// Renders the whole catalog as an xlsx workbook.
pub fn products_to_xlsx(products: &[Product]) -> ProductResult<Vec<u8>> {
    build_workbook(products).map_err(|e| {
        tracing::error!("Error building xlsx export: {:?}", e);
        ProductError::Internal("Error al generar el archivo de exportación".to_string())
    })
}

fn build_workbook(products: &[Product]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Products")?;

    let bold = Format::new().set_bold();
    for (col, (header, width)) in COLUMNS.iter().enumerate() {
        let col = col as u16;
        worksheet.set_column_width(col, *width)?;
        worksheet.write_with_format(0, col, *header, &bold)?;
    }

    for (index, product) in products.iter().enumerate() {
        let row = index as u32 + 1;
        worksheet.write(row, 0, &product.slug)?;
        worksheet.write(row, 1, &product.name)?;
        worksheet.write(row, 2, &product.description)?;
        worksheet.write(row, 3, product.price)?;
        worksheet.write(row, 4, product.second_price.unwrap_or(0.0))?;
        worksheet.write(row, 5, product.stock as f64)?;
        worksheet.write(row, 6, if product.free_shipping { "Sí" } else { "No" })?;
        worksheet.write(row, 7, product.video_id.as_deref().unwrap_or(""))?;
        worksheet.write(row, 8, product.created_at.to_rfc3339())?;
        worksheet.write(row, 9, product.updated_at.to_rfc3339())?;
        worksheet.write(row, 10, product.display_order as f64)?;
        worksheet.write(row, 11, product.category_id.to_string())?;
        worksheet.write(row, 12, product.unity_id.to_string())?;
        worksheet.write(row, 13, product.user_id.to_string())?;
    }

    workbook.save_to_buffer()
}
