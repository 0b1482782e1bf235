use crate::prelude::{FieldError, FieldResult};

/// Index of the channel with the largest magnitude.
///
/// Ties resolve to the lowest index. NaN ranks below every number, so an
/// all-NaN vector selects channel 0.
pub fn select(values: &[f64]) -> FieldResult<usize> {
    if values.is_empty() {
        return Err(FieldError::EmptyInput);
    }
    let mut best: Option<(usize, f64)> = None;
    for (index, value) in values.iter().enumerate() {
        let magnitude = value.abs();
        if magnitude.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, top)| magnitude > top) {
            best = Some((index, magnitude));
        }
    }
    Ok(best.map_or(0, |(index, _)| index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_largest_magnitude() {
        assert_eq!(select(&[-70.0, -50.0, -65.0, -55.0]).unwrap(), 0);
        assert_eq!(select(&[-40.0, -50.0, -65.0, -55.0]).unwrap(), 2);
        assert_eq!(select(&[5.0]).unwrap(), 0);
    }

    #[test]
    fn ties_go_to_lowest_index() {
        assert_eq!(select(&[-60.0, 60.0, -10.0, -10.0]).unwrap(), 0);
        assert_eq!(select(&[1.0, -80.0, 80.0, 80.0]).unwrap(), 1);
    }

    #[test]
    fn nan_never_wins() {
        assert_eq!(select(&[f64::NAN, -3.0, 2.0]).unwrap(), 1);
        assert_eq!(select(&[f64::NAN, f64::NAN]).unwrap(), 0);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(select(&[]), Err(FieldError::EmptyInput)));
    }
}
