//! Human-readable byte sizes for `show`/`list -s` output (§6 ambient stack),
//! grounded on the auto-scaling, one-decimal-place behavior described for
//! `lib/humanize_number.c`'s `HN_AUTOSCALE | HN_DECIMAL` mode rather than a
//! general-purpose crate.

/// Binary-prefix scale suffixes, smallest to largest.
const SUFFIXES: &[&str] = &["B", "K", "M", "G", "T", "P", "E"];

/// What: Render `bytes` as an auto-scaled, human-readable size.
///
/// Inputs:
/// - `bytes`: a byte count, such as a `filename-size` or manifest file length.
///
/// Output:
/// - A string like `"512B"`, `"4.0K"`, or `"1.5G"`.
///
/// Details:
/// - Scales by repeatedly dividing by 1024 until the value fits under it,
///   capped at the largest known suffix (`E`, exabytes).
/// - Below the `K` scale, no decimal point is shown (`"512B"`, not
///   `"512.0B"`), matching the reference's integer byte case.
/// - At or above `K`, one decimal place is always shown, even for a value
///   that divides evenly (`"4.0K"`, not `"4K"`).
#[must_use]
pub fn humanize(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes}{}", SUFFIXES[0]);
    }

    let mut value = bytes as f64;
    let mut scale = 0;
    while value >= 1024.0 && scale < SUFFIXES.len() - 1 {
        value /= 1024.0;
        scale += 1;
    }
    format!("{value:.1}{}", SUFFIXES[scale])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_kilobyte_has_no_decimal() {
        assert_eq!(humanize(0), "0B");
        assert_eq!(humanize(512), "512B");
        assert_eq!(humanize(1023), "1023B");
    }

    #[test]
    fn exact_kilobyte_still_shows_one_decimal() {
        assert_eq!(humanize(1024), "1.0K");
        assert_eq!(humanize(4096), "4.0K");
    }

    #[test]
    fn scales_up_through_megabytes_and_gigabytes() {
        assert_eq!(humanize(1024 * 1024), "1.0M");
        assert_eq!(humanize(1024 * 1024 * 1024 + 512 * 1024 * 1024), "1.5G");
    }

    #[test]
    fn caps_at_the_largest_known_suffix() {
        let huge = u64::MAX;
        assert!(humanize(huge).ends_with('E'));
    }
}
