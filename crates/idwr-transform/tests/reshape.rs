//! Wide/long round trips over generated count tables.

use std::collections::BTreeSet;

use idwr_common::{column_i64, column_string};
use idwr_model::{COUNT, DISEASE, DatasetKind, PREFECTURE, SourceTag, SurveillanceRecord, WEEK};
use idwr_transform::{build_stage_frame, iso_week_sunday, melt_long, pivot_wide};
use polars::prelude::DataFrame;
use proptest::prelude::*;

const PREFECTURES: [&str; 3] = ["Hokkaido", "Tokyo", "Okinawa"];
const DISEASES: [&str; 3] = ["Measles", "Rubella", "Pertussis"];

fn triples(df: &DataFrame) -> BTreeSet<(String, i64, String, i64)> {
    (0..df.height())
        .filter_map(|idx| {
            Some((
                column_string(df, PREFECTURE, idx)?,
                column_i64(df, WEEK, idx)?,
                column_string(df, DISEASE, idx)?,
                column_i64(df, COUNT, idx)?,
            ))
        })
        .collect()
}

fn table(cells: &[(usize, i32, usize, i64)]) -> DataFrame {
    let mut seen = BTreeSet::new();
    let records: Vec<SurveillanceRecord> = cells
        .iter()
        .filter(|(p, w, d, _)| seen.insert((*p, *w, *d)))
        .map(|&(p, week, d, count)| {
            SurveillanceRecord::new(
                PREFECTURES[p],
                2024,
                week,
                DISEASES[d],
                SourceTag::AllCaseReporting,
            )
            .with_date(iso_week_sunday(2024, week))
            .with_count(Some(count))
        })
        .collect();
    build_stage_frame(DatasetKind::Bullet, &records).unwrap()
}

#[test]
fn pivot_then_melt_preserves_counts() {
    let long = table(&[(0, 1, 0, 4), (0, 1, 1, 0), (1, 2, 2, 11)]);
    let back = melt_long(&pivot_wide(&long).unwrap()).unwrap();
    assert_eq!(triples(&back), triples(&long));
}

proptest! {
    #[test]
    fn round_trip_preserves_key_disease_count(
        cells in proptest::collection::vec((0usize..3, 1i32..=52, 0usize..3, 0i64..1000), 0..40)
    ) {
        let long = table(&cells);
        let back = melt_long(&pivot_wide(&long).unwrap()).unwrap();
        prop_assert_eq!(triples(&back), triples(&long));
        prop_assert_eq!(back.height(), long.height());
    }
}
