use std::collections::BTreeMap;

use crate::grid::{Cell, Grid};

/// Canonical field keys for one POS transaction. Every mapped sheet column
/// resolves to exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Stt,
    Ngay,
    Gio,
    Tram,
    TruBom,
    MatHang,
    SoLuong,
    DonGia,
    ThanhTien,
    TrangThaiThanhToan,
    MaKhachHang,
    TenKhachHang,
    LoaiKhachHang,
    NgayThanhToan,
    NhanVien,
    BienSoXe,
    TrangThaiHoaDon,
}

impl FieldKey {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::Stt => "stt",
            FieldKey::Ngay => "ngay",
            FieldKey::Gio => "gio",
            FieldKey::Tram => "tram",
            FieldKey::TruBom => "truBom",
            FieldKey::MatHang => "matHang",
            FieldKey::SoLuong => "soLuong",
            FieldKey::DonGia => "donGia",
            FieldKey::ThanhTien => "thanhTien",
            FieldKey::TrangThaiThanhToan => "trangThaiThanhToan",
            FieldKey::MaKhachHang => "maKhachHang",
            FieldKey::TenKhachHang => "tenKhachHang",
            FieldKey::LoaiKhachHang => "loaiKhachHang",
            FieldKey::NgayThanhToan => "ngayThanhToan",
            FieldKey::NhanVien => "nhanVien",
            FieldKey::BienSoXe => "bienSoXe",
            FieldKey::TrangThaiHoaDon => "trangThaiHoaDon",
        }
    }
}

// Column labels as they appear in operator exports. Many-to-one on purpose:
// both currency-unit spellings of the amount column map to the same key.
const COLUMN_LABELS: &[(&str, FieldKey)] = &[
    ("STT", FieldKey::Stt),
    ("Ngày", FieldKey::Ngay),
    ("Giờ", FieldKey::Gio),
    ("Trạm", FieldKey::Tram),
    ("Trụ bơm", FieldKey::TruBom),
    ("Mặt hàng", FieldKey::MatHang),
    ("Số lượng", FieldKey::SoLuong),
    ("Đơn giá", FieldKey::DonGia),
    ("Thành tiền (VND)", FieldKey::ThanhTien),
    ("Thành tiền (VNĐ)", FieldKey::ThanhTien),
    ("Trạng thái thanh toán", FieldKey::TrangThaiThanhToan),
    ("Mã khách hàng", FieldKey::MaKhachHang),
    ("Tên khách hàng", FieldKey::TenKhachHang),
    ("Loại khách hàng", FieldKey::LoaiKhachHang),
    ("Ngày thanh toán", FieldKey::NgayThanhToan),
    ("Nhân viên", FieldKey::NhanVien),
    ("Biển số xe", FieldKey::BienSoXe),
    ("Trạng thái hoá đơn", FieldKey::TrangThaiHoaDon),
];

// Labels a real header row must contain at least this many of. Exports
// prepend title and blank rows in unpredictable numbers, so substring
// matching over a handful of key labels beats a full schema check.
const HEADER_KEY_LABELS: &[&str] = &["STT", "Ngày", "Giờ", "Trạm", "Mặt hàng"];
const HEADER_KEY_MIN_MATCHES: usize = 3;

/// Resolve a header label to its canonical key: exact match first, then
/// case-insensitive. Unknown or empty labels map to nothing.
pub fn map_header_label(label: &str) -> Option<FieldKey> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    for (known, key) in COLUMN_LABELS {
        if *known == label {
            return Some(*key);
        }
    }
    let lowered = label.to_lowercase();
    for (known, key) in COLUMN_LABELS {
        if known.to_lowercase() == lowered {
            return Some(*key);
        }
    }
    None
}

/// Scan top to bottom for the first row where at least three key labels
/// appear as case-insensitive substrings of its text cells.
pub fn locate_header_row(grid: &Grid) -> Option<usize> {
    for (idx, row) in grid.iter().enumerate() {
        let found = HEADER_KEY_LABELS
            .iter()
            .filter(|label| {
                let needle = label.to_lowercase();
                row.iter().any(|cell| {
                    cell.as_text()
                        .map(|text| text.trim().to_lowercase().contains(&needle))
                        .unwrap_or(false)
                })
            })
            .count();
        if found >= HEADER_KEY_MIN_MATCHES {
            return Some(idx);
        }
    }
    None
}

/// Column index → canonical key for every mapped header cell, in sheet order.
pub fn resolve_column_map(header_row: &[Cell]) -> Vec<(usize, FieldKey)> {
    let mut mapped = Vec::new();
    for (idx, cell) in header_row.iter().enumerate() {
        let Some(label) = cell.to_display_string() else {
            continue;
        };
        if let Some(key) = map_header_label(&label) {
            mapped.push((idx, key));
        }
    }
    mapped
}

/// Canonical key → source header label, for import previews.
pub fn mapped_headers(header_row: &[Cell]) -> BTreeMap<String, String> {
    let mut mapping = BTreeMap::new();
    for (idx, key) in resolve_column_map(header_row) {
        if let Some(label) = header_row[idx].to_display_string() {
            mapping.insert(key.as_str().to_string(), label.trim().to_string());
        }
    }
    mapping
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|c| Cell::Text(c.to_string())).collect()
    }

    #[test]
    fn header_found_behind_preamble_rows() {
        let grid: Grid = vec![
            text_row(&["BÁO CÁO GIAO DỊCH THÁNG 5"]),
            vec![Cell::Empty],
            text_row(&["STT", "Ngày", "Giờ", "Trạm", "Mặt hàng"]),
            text_row(&["1", "01/05/2024", "14:05", "Trạm A", "Xăng"]),
        ];
        assert_eq!(locate_header_row(&grid), Some(2));
    }

    #[test]
    fn preamble_rows_never_qualify() {
        // A title mentioning one or two key labels stays below the threshold.
        let grid: Grid = vec![
            text_row(&["Danh sách giao dịch theo Ngày và Trạm"]),
            text_row(&["STT", "Ngày", "Giờ", "Trạm"]),
        ];
        assert_eq!(locate_header_row(&grid), Some(1));
    }

    #[test]
    fn header_match_is_order_independent_and_case_insensitive() {
        let grid: Grid = vec![text_row(&["mặt hàng", "trạm", "giờ", "ngày"])];
        assert_eq!(locate_header_row(&grid), Some(0));
    }

    #[test]
    fn header_not_found_reported() {
        let grid: Grid = vec![text_row(&["a", "b"]), text_row(&["c", "d"])];
        assert_eq!(locate_header_row(&grid), None);
    }

    #[test]
    fn non_text_cells_do_not_match_key_labels() {
        let grid: Grid = vec![vec![
            Cell::Number(1.0),
            Cell::Text("Ngày".to_string()),
            Cell::Text("Giờ".to_string()),
        ]];
        assert_eq!(locate_header_row(&grid), None);
    }

    #[test]
    fn exact_label_mapping() {
        assert_eq!(map_header_label("Thành tiền (VND)"), Some(FieldKey::ThanhTien));
        assert_eq!(map_header_label("Thành tiền (VNĐ)"), Some(FieldKey::ThanhTien));
        assert_eq!(map_header_label("Trụ bơm"), Some(FieldKey::TruBom));
    }

    #[test]
    fn case_insensitive_label_fallback() {
        assert_eq!(map_header_label("stt"), Some(FieldKey::Stt));
        assert_eq!(map_header_label("NGÀY"), Some(FieldKey::Ngay));
    }

    #[test]
    fn unknown_or_empty_labels_map_to_nothing() {
        assert_eq!(map_header_label("Ghi chú"), None);
        assert_eq!(map_header_label("   "), None);
    }

    #[test]
    fn column_map_skips_unmapped_columns() {
        let header = text_row(&["STT", "Ghi chú", "Ngày", ""]);
        let map = resolve_column_map(&header);
        assert_eq!(map, vec![(0, FieldKey::Stt), (2, FieldKey::Ngay)]);
    }
}
