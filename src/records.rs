use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::coerce::{coerce_date, coerce_number};
use crate::columns::{locate_header_row, mapped_headers, resolve_column_map, FieldKey};
use crate::grid::{row_is_blank, Cell, Grid};

/// Structural import failures. Messages are shown to the operator verbatim.
/// Per-cell problems never surface here; they degrade to a null date or a
/// zero amount inside the affected record.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("File Excel phải có ít nhất 2 dòng (header + data)")]
    TooFewRows,
    #[error("Không tìm thấy header row trong file Excel")]
    HeaderNotFound,
    #[error("File Excel không có dữ liệu hợp lệ")]
    EmptyDataset,
    #[error("Lỗi đọc file Excel: {0}")]
    Workbook(String),
    #[error("Không hỗ trợ định dạng file .{0} (chỉ hỗ trợ .xlsx/.xls)")]
    UnsupportedFormat(String),
}

/// One normalized POS transaction. `id` is assigned densely from 1 in sheet
/// order when the dataset is built. `ngay` never carries a time of day;
/// `gio` is the sole carrier of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionRecord {
    pub id: i64,
    pub stt: Option<String>,
    pub ngay: Option<NaiveDate>,
    pub gio: Option<String>,
    pub tram: Option<String>,
    pub tru_bom: Option<String>,
    pub mat_hang: Option<String>,
    pub so_luong: f64,
    pub don_gia: f64,
    pub thanh_tien: f64,
    pub trang_thai_thanh_toan: Option<String>,
    pub ma_khach_hang: Option<String>,
    pub ten_khach_hang: Option<String>,
    pub loai_khach_hang: Option<String>,
    pub ngay_thanh_toan: Option<NaiveDate>,
    pub nhan_vien: Option<String>,
    pub bien_so_xe: Option<String>,
    pub trang_thai_hoa_don: Option<String>,
}

/// Everything the builder learned about one sheet: where the header sat,
/// which columns mapped, and the records themselves.
#[derive(Debug, Clone)]
pub struct SheetParse {
    pub header_row: usize,
    pub columns: BTreeMap<String, String>,
    pub records: Vec<TransactionRecord>,
}

fn text_value(cell: &Cell) -> Option<String> {
    cell.to_display_string()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// Per-key dispatch: date keys go through date coercion, the three numeric
// keys through number coercion, everything else is trimmed text.
fn apply_cell(record: &mut TransactionRecord, key: FieldKey, cell: &Cell) {
    match key {
        FieldKey::Ngay => record.ngay = coerce_date(cell).map(|dt| dt.date()),
        FieldKey::NgayThanhToan => record.ngay_thanh_toan = coerce_date(cell).map(|dt| dt.date()),
        FieldKey::SoLuong => record.so_luong = coerce_number(cell),
        FieldKey::DonGia => record.don_gia = coerce_number(cell),
        FieldKey::ThanhTien => record.thanh_tien = coerce_number(cell),
        FieldKey::Stt => record.stt = text_value(cell),
        FieldKey::Gio => record.gio = text_value(cell),
        FieldKey::Tram => record.tram = text_value(cell),
        FieldKey::TruBom => record.tru_bom = text_value(cell),
        FieldKey::MatHang => record.mat_hang = text_value(cell),
        FieldKey::TrangThaiThanhToan => record.trang_thai_thanh_toan = text_value(cell),
        FieldKey::MaKhachHang => record.ma_khach_hang = text_value(cell),
        FieldKey::TenKhachHang => record.ten_khach_hang = text_value(cell),
        FieldKey::LoaiKhachHang => record.loai_khach_hang = text_value(cell),
        FieldKey::NhanVien => record.nhan_vien = text_value(cell),
        FieldKey::BienSoXe => record.bien_so_xe = text_value(cell),
        FieldKey::TrangThaiHoaDon => record.trang_thai_hoa_don = text_value(cell),
    }
}

/// Parse a decoded grid into records. Fails only on structural problems:
/// fewer than two rows, or no detectable header. An empty record set is a
/// valid result; whether that is an error belongs to the caller.
pub fn parse_grid(grid: &Grid) -> Result<SheetParse, ImportError> {
    if grid.len() < 2 {
        return Err(ImportError::TooFewRows);
    }
    let header_row = locate_header_row(grid).ok_or(ImportError::HeaderNotFound)?;
    debug!(header_row, "header row located");

    let column_map = resolve_column_map(&grid[header_row]);
    debug!(mapped_columns = column_map.len(), "header columns mapped");

    let mut records = Vec::new();
    for row in &grid[header_row + 1..] {
        if row_is_blank(row) {
            continue;
        }
        let mut record = TransactionRecord {
            id: records.len() as i64 + 1,
            ..TransactionRecord::default()
        };
        for (col_idx, key) in &column_map {
            let cell = row.get(*col_idx).unwrap_or(&Cell::Empty);
            apply_cell(&mut record, *key, cell);
        }
        records.push(record);
    }
    debug!(records = records.len(), "transaction records built");

    Ok(SheetParse {
        header_row,
        columns: mapped_headers(&grid[header_row]),
        records,
    })
}

/// Records only, preserving sheet order.
pub fn build_records(grid: &Grid) -> Result<Vec<TransactionRecord>, ImportError> {
    parse_grid(grid).map(|parse| parse.records)
}
