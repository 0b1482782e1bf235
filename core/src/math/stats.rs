pub struct StatsHelper;

impl StatsHelper {
    /// Smallest and largest finite sample, used as a colour scale by displays.
    pub fn finite_range<'a, I>(samples: I) -> Option<(f64, f64)>
    where
        I: IntoIterator<Item = &'a f64>,
    {
        samples
            .into_iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |range, v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_range_skips_non_finite_values() {
        let samples = [f64::NAN, -70.0, -45.0, f64::INFINITY];
        assert_eq!(StatsHelper::finite_range(&samples), Some((-70.0, -45.0)));
        assert_eq!(StatsHelper::finite_range(&[f64::NAN]), None);
    }
}
