//! Signed lag/lead shifting of a series' date index.

use crate::domain::{Offset, Series};
use crate::error::AppError;

/// Move every observation of `series` by `offset`.
///
/// Values are untouched; only their dates move. A positive offset relabels the
/// value observed at `d` as belonging to `d + offset`.
pub fn shift(series: &Series, offset: Offset) -> Result<Series, AppError> {
    if offset.amount == 0 {
        return Ok(series.clone());
    }

    let mut shifted = Series::new(series.id.clone());
    for (date, value) in &series.points {
        let moved = offset.apply(*date).ok_or_else(|| {
            AppError::Usage(format!(
                "Offset {offset} moves {} ({date}) outside the supported calendar.",
                series.id
            ))
        })?;
        shifted.points.insert(moved, *value);
    }
    Ok(shifted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SeriesId;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn positive_offset_moves_later() {
        let s = Series::from_points(
            SeriesId::new("DCOILWTICO").unwrap(),
            [(d(2020, 1, 1), Some(57.5)), (d(2020, 2, 1), Some(50.5))],
        );
        let shifted = shift(&s, Offset::months(12)).unwrap();
        assert_eq!(shifted.points[&d(2021, 1, 1)], Some(57.5));
        assert_eq!(shifted.points[&d(2021, 2, 1)], Some(50.5));
    }

    #[test]
    fn negative_day_offset_moves_earlier() {
        let s = Series::from_points(SeriesId::new("M2SL").unwrap(), [(d(2024, 4, 4), Some(1.0))]);
        let shifted = shift(&s, Offset::days(-94)).unwrap();
        assert_eq!(shifted.first_date(), Some(d(2024, 1, 1)));
    }

    proptest! {
        #[test]
        fn month_shift_is_invertible(k in -600i32..600, months in prop::collection::btree_set(0u32..240, 1..40)) {
            let base = d(1990, 1, 1);
            let s = Series::from_points(
                SeriesId::new("S").unwrap(),
                months.iter().map(|&m| (base.checked_add_months(chrono::Months::new(m)).unwrap(), Some(f64::from(m)))),
            );
            let back = shift(&shift(&s, Offset::months(k)).unwrap(), Offset::months(k).inverse()).unwrap();
            prop_assert_eq!(back, s);
        }

        #[test]
        fn day_shift_is_invertible(k in -5000i32..5000, days in prop::collection::btree_set(0u64..4000, 1..40)) {
            let base = d(2010, 1, 1);
            let s = Series::from_points(
                SeriesId::new("S").unwrap(),
                days.iter().map(|&n| (base.checked_add_days(chrono::Days::new(n)).unwrap(), Some(n as f64))),
            );
            let back = shift(&shift(&s, Offset::days(k)).unwrap(), Offset::days(-k)).unwrap();
            prop_assert_eq!(back, s);
        }
    }
}
