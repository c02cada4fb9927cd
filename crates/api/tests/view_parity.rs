//! Property test: an export snapshot contains exactly the rows a list
//! view with the same spec would show, in the same order, and
//! pagination slices the same row set without loss or duplication.
//!
//! Specs are randomized with a fixed seed so failures reproduce.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stocktake_core::export::Table;
use stocktake_core::view::{
    filter_and_sort, paginate, FilterSpec, ListRecord, PageSpec, SortDirection, SortSpec, ViewSpec,
};
use stocktake_db::models::asset::AssetRow;

const STATUSES: &[&str] = &["in_use", "in_storage", "under_repair", "disposed", "lost"];
const SECTIONS: &[&str] = &["IT", "Finance", "Warehouse", "Reception"];
const PRODUCTS: &[&str] = &[
    "Latitude 5440",
    "ProBook 450",
    "ThinkPad T14",
    "MacBook Air",
    "UltraSharp U2723",
    "LaserJet Pro",
];

fn random_date(rng: &mut StdRng) -> Option<NaiveDate> {
    if rng.random_bool(0.2) {
        return None;
    }
    let year = rng.random_range(2020..=2026);
    let month = rng.random_range(1..=12);
    let day = rng.random_range(1..=28);
    NaiveDate::from_ymd_opt(year, month, day)
}

fn random_rows(rng: &mut StdRng, count: usize) -> Vec<AssetRow> {
    (0..count)
        .map(|i| AssetRow {
            id: i as i64 + 1,
            inventory_code: format!("INV-{:04}", rng.random_range(0..2000)),
            product_name: PRODUCTS[rng.random_range(0..PRODUCTS.len())].to_string(),
            serial_number: rng
                .random_bool(0.7)
                .then(|| format!("SN{:06}", rng.random_range(0..999_999))),
            description: None,
            status: STATUSES[rng.random_range(0..STATUSES.len())].to_string(),
            section_name: rng
                .random_bool(0.8)
                .then(|| SECTIONS[rng.random_range(0..SECTIONS.len())].to_string()),
            location_name: None,
            supplier_name: None,
            purchase_date: random_date(rng),
            invoice_number: None,
            warranty_expiry_date: random_date(rng),
        })
        .collect()
}

/// A spec the engine accepts: text filters only on non-date columns,
/// date ranges only on date columns.
fn random_spec(rng: &mut StdRng) -> ViewSpec {
    let columns = AssetRow::columns();
    let filter = match rng.random_range(0..4) {
        0 => FilterSpec::default(),
        1 => {
            let texty: Vec<_> = columns
                .iter()
                .filter(|c| c.kind != stocktake_core::view::ColumnKind::Date)
                .collect();
            let col = texty[rng.random_range(0..texty.len())];
            FilterSpec {
                attribute: Some(col.key.to_string()),
                text: Some(["a", "IN", "book", "50", "IT"][rng.random_range(0..5)].to_string()),
                ..FilterSpec::default()
            }
        }
        2 => {
            let datey: Vec<_> = columns
                .iter()
                .filter(|c| c.kind == stocktake_core::view::ColumnKind::Date)
                .collect();
            let col = datey[rng.random_range(0..datey.len())];
            FilterSpec {
                attribute: Some(col.key.to_string()),
                date_from: NaiveDate::from_ymd_opt(2021, 6, 1),
                date_to: rng.random_bool(0.5).then(|| {
                    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
                }),
                ..FilterSpec::default()
            }
        }
        _ => FilterSpec {
            statuses: vec!["In Use".to_string(), "Lost".to_string()],
            ..FilterSpec::default()
        },
    };
    let sort = rng.random_bool(0.7).then(|| SortSpec {
        column: columns[rng.random_range(0..columns.len())].key.to_string(),
        direction: if rng.random_bool(0.5) {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        },
    });
    ViewSpec { filter, sort }
}

fn display_row(row: &AssetRow) -> Vec<String> {
    AssetRow::columns()
        .iter()
        .map(|c| row.cell(c.key).display())
        .collect()
}

#[test]
fn export_table_matches_the_filtered_list_exactly() {
    let mut rng = StdRng::seed_from_u64(0x5707_CA7E);
    for _ in 0..200 {
        let n = rng.random_range(0..60);
        let rows = random_rows(&mut rng, n);
        let spec = random_spec(&mut rng);

        let filtered = filter_and_sort(&rows, &spec).expect("generated specs are valid");
        let table = Table::from_records("Assets", &filtered);

        assert_eq!(table.rows.len(), filtered.len());
        for (exported, listed) in table.rows.iter().zip(filtered.iter()) {
            assert_eq!(exported, &display_row(listed));
        }
    }
}

#[test]
fn pages_partition_the_filtered_rows() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..100 {
        let n = rng.random_range(0..120);
        let rows = random_rows(&mut rng, n);
        let spec = random_spec(&mut rng);
        let filtered = filter_and_sort(&rows, &spec).expect("generated specs are valid");
        let all_ids: Vec<i64> = filtered.iter().map(|r| r.id).collect();

        let per_page = [10usize, 25, 50, 100][rng.random_range(0..4)];
        let mut collected = Vec::new();
        let mut page_no = 1;
        loop {
            let page = paginate(
                filtered.iter().map(|r| r.id).collect(),
                PageSpec {
                    page: page_no,
                    per_page,
                },
            );
            assert_eq!(page.total, all_ids.len());
            if page.items.is_empty() {
                break;
            }
            collected.extend(page.items);
            page_no += 1;
        }
        assert_eq!(collected, all_ids);
    }
}
