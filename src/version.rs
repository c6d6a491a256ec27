//! Version comparison, ported bit-for-bit from the reference `xbps_cmpver`
//! grammar.
//!
//! Versions have the shape `[NAME-]VERSION[_REVISION][-EPOCH]`. `EPOCH`
//! supersedes `VERSION` supersedes `REVISION`. `VERSION` is itself a
//! dot-separated sequence of `(number, letter, patchlevel)` components; see
//! [`compare`] for the full grammar.

use std::cmp::Ordering;

/// Stage keywords recognized inside a component's letter position, in the
/// exact order the reference implementation checks them, with the exact
/// numeric offsets it assigns (`'p'-'a'+1 == 16`, `'r'-'a'+1 == 18`, not
/// sequential small integers).
const STAGES: &[(&str, i32)] = &[
    ("pl", 0),
    ("alpha", 1),
    ("beta", 2),
    ("pre", 16),
    ("rc", 18),
];

/// One `(N, L, P)` version component.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
struct Component {
    /// Leading integer. Missing is `-1`; the `*` wildcard is `-2`.
    n: i64,
    /// Letter or stage-keyword code. Missing is `0`.
    a: i32,
    /// Trailing patchlevel integer. `0` when no letter, `-1` when a letter
    /// is present but no digits follow it.
    pl: i64,
}

/// What: Split a `pkgver`-shaped string into its version body, epoch, and revision.
///
/// Inputs:
/// - `pkgver`: a string of the shape `[NAME-]VERSION[_REVISION][-EPOCH]`.
///
/// Output:
/// - `(body, epoch, revision)`, where `body` is the substring of `pkgver`
///   holding the dot-separated version components, with the optional
///   `_REVISION` and `-EPOCH` suffixes stripped.
///
/// Details:
/// - Mirrors `split_version` in the reference comparator exactly, including
///   the quirk that the epoch search scans from the revision's underscore
///   (inclusive of the revision digits), not from after the revision value,
///   since the well-formed grammar never places a `-` inside the digits.
fn split_version(pkgver: &str) -> (&str, u64, u64) {
    let version_start = pkgver.rfind('-').map_or(0, |idx| idx + 1);
    let version_str = &pkgver[version_start..];

    let underscore = version_str.rfind('_');
    let revision = underscore
        .and_then(|idx| parse_leading_u64(&version_str[idx + 1..]))
        .unwrap_or(0);

    let epoch_search_start = underscore.map_or(0, |idx| idx + 1);
    let epoch_dash = version_str[epoch_search_start..]
        .rfind('-')
        .map(|idx| epoch_search_start + idx);
    let epoch = epoch_dash
        .and_then(|idx| parse_leading_u64(&version_str[idx + 1..]))
        .unwrap_or(0);

    let body_end = underscore.or(epoch_dash).unwrap_or(version_str.len());
    (&version_str[..body_end], epoch, revision)
}

/// What: Parse the longest leading run of ASCII digits as a `u64`.
fn parse_leading_u64(s: &str) -> Option<u64> {
    let len = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if len == 0 { None } else { s[..len].parse().ok() }
}

/// What: Parse the longest leading run of ASCII digits as an `i64`, returning
/// the value and the number of bytes consumed.
fn parse_leading_i64(s: &str) -> Option<(i64, usize)> {
    let len = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if len == 0 {
        None
    } else {
        s[..len].parse().ok().map(|n| (n, len))
    }
}

/// What: Find a stage keyword at the start of `s`, matched case-insensitively
/// and only when not followed by another letter.
///
/// Output:
/// - `Some((value, byte_len))` for the first matching keyword in [`STAGES`]
///   order.
fn match_stage(s: &str) -> Option<(i32, usize)> {
    let lower = s.to_ascii_lowercase();
    for (name, value) in STAGES {
        if lower.starts_with(name) {
            let next = s.as_bytes().get(name.len());
            if !next.is_some_and(u8::is_ascii_alphabetic) {
                return Some((*value, name.len()));
            }
        }
    }
    None
}

/// What: Parse one `(N, L, P)` component starting at `s`, returning it and the
/// unconsumed remainder.
///
/// Details:
/// - Ported from `get_component`: a leading digit run becomes `N`; a leading
///   `*` becomes `N = -2` and consumes up to the next `+` or end of string;
///   anything else leaves `N = -1` and marks the component as "stage-eligible"
///   (a bare letter run immediately following it may be absorbed as the
///   component's own letter rather than starting a new component).
/// - A stage keyword is absorbed into the current component only when that
///   component had no leading digit (`hasstage`); otherwise parsing stops
///   before the keyword so the next call starts a fresh component there,
///   which is the "separator inserted before pl/alpha/beta/pre/rc" rule.
fn get_component(s: &str) -> (Component, &str) {
    let mut component = Component::default();
    let mut rest = s;
    let mut has_patchlevel;
    let has_stage;

    if let Some((n, len)) = parse_leading_i64(rest) {
        component.n = n;
        rest = &rest[len..];
        has_stage = false;
    } else if rest.starts_with('*') {
        component.n = -2;
        has_stage = false;
        let skip = rest
            .char_indices()
            .find(|(_, c)| *c == '+')
            .map_or(rest.len(), |(idx, _)| idx);
        rest = &rest[skip..];
    } else {
        component.n = -1;
        has_stage = true;
    }

    if let Some(first) = rest.chars().next().filter(char::is_ascii_alphabetic) {
        has_patchlevel = true;
        let second_is_alpha = rest
            .chars()
            .nth(1)
            .is_some_and(|c| c.is_ascii_alphabetic());
        let mut consumed_as_stage = false;
        if second_is_alpha {
            if let Some((value, len)) = match_stage(rest) {
                if has_stage {
                    component.a = value;
                    rest = &rest[len..];
                } else {
                    component.a = 0;
                    has_patchlevel = false;
                }
                consumed_as_stage = true;
            }
        }
        if !consumed_as_stage {
            component.a = i32::from(first.to_ascii_lowercase() as u8 - b'a') + 1;
            while rest.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
                rest = &rest[1..];
            }
        }
    } else {
        component.a = 0;
        has_patchlevel = false;
    }

    component.pl = if has_patchlevel {
        if let Some((pl, len)) = parse_leading_i64(rest) {
            rest = &rest[len..];
            pl
        } else {
            -1
        }
    } else {
        0
    };

    while let Some(c) = rest.chars().next() {
        if c.is_ascii_digit() || c.is_ascii_alphabetic() || c == '+' || c == '*' {
            break;
        }
        rest = &rest[1..];
    }

    (component, rest)
}

/// What: Compare two `pkgver`-shaped version strings.
///
/// Inputs:
/// - `a`, `b`: strings of the shape `[NAME-]VERSION[_REVISION][-EPOCH]`.
///
/// Output:
/// - `Ordering::Less`/`Equal`/`Greater` for `a < b`, `a == b`, `a > b`.
///
/// Details:
/// - Epoch is compared first, then the dot-separated version body
///   component-by-component, then revision.
/// - A body is split into components at `.`; any byte outside
///   `[a-zA-Z0-9.+*]` is treated as a separator, consecutive separators
///   collapse, and missing trailing components compare as `(0, 0, 0)`.
/// - `*` is the smallest possible component. A stage keyword
///   (`pl`/`alpha`/`beta`/`pre`/`rc`) absorbs into the preceding bare letter
///   position; unrecognized letters sort by their first letter only.
/// - A literal `+` splits the body into blocks compared independently; once
///   one side's components in a block are exhausted, further components on
///   that side pad as the implicit zero component until the other side's
///   block also ends, then both sides advance past their `+`.
///
/// # Example
///
/// ```
/// use xbps_rs::version::compare;
/// use std::cmp::Ordering;
///
/// assert_eq!(compare("foo-1.2.0", "foo-1.2"), Ordering::Equal);
/// assert_eq!(compare("foo-1.0_1", "foo-1.0"), Ordering::Greater);
/// assert_eq!(compare("foo-1.0alpha3", "foo-1.0"), Ordering::Less);
/// assert_eq!(compare("foo-2.*", "foo-2pl1"), Ordering::Less);
/// ```
#[must_use]
pub fn compare(a: &str, b: &str) -> Ordering {
    let (body_a, epoch_a, revision_a) = split_version(a);
    let (body_b, epoch_b, revision_b) = split_version(b);

    let by_epoch = epoch_a.cmp(&epoch_b);
    if by_epoch != Ordering::Equal {
        return by_epoch;
    }

    if !body_a.eq_ignore_ascii_case(body_b) {
        let mut rest_a = body_a;
        let mut rest_b = body_b;
        while !rest_a.is_empty() || !rest_b.is_empty() {
            let blocked_a = rest_a.is_empty() || rest_a.starts_with('+');
            let blocked_b = rest_b.is_empty() || rest_b.starts_with('+');

            let comp_a = if blocked_a {
                Component::default()
            } else {
                let (c, next) = get_component(rest_a);
                rest_a = next;
                c
            };
            let comp_b = if blocked_b {
                Component::default()
            } else {
                let (c, next) = get_component(rest_b);
                rest_b = next;
                c
            };

            if blocked_a && blocked_b {
                if rest_a.starts_with('+') {
                    rest_a = &rest_a[1..];
                }
                if rest_b.starts_with('+') {
                    rest_b = &rest_b[1..];
                }
                continue;
            }

            let ordering = comp_a.cmp(&comp_b);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
    }

    revision_a.cmp(&revision_b)
}

/// What: `true` if `version` satisfies `predicate` of the shape `OP VERSION`
/// where `OP` is one of `<`, `<=`, `=`, `>=`, `>`.
///
/// Inputs:
/// - `version`: candidate version string (no name prefix).
/// - `predicate`: the constraint portion of a dependency string, e.g. `">=1.0"`.
///
/// Output:
/// - `true` if `compare(version, predicate_version)` matches `OP`.
/// - `false` for an unrecognized operator.
#[must_use]
pub fn satisfies(version: &str, predicate: &str) -> bool {
    let (op, target) = split_operator(predicate);
    let ordering = compare(version, target);
    match op {
        "<" => ordering == Ordering::Less,
        "<=" => ordering != Ordering::Greater,
        "=" => ordering == Ordering::Equal,
        ">=" => ordering != Ordering::Less,
        ">" => ordering == Ordering::Greater,
        _ => false,
    }
}

/// What: Split a constraint string into its operator and version target.
///
/// Output:
/// - `(op, version)`, where `op` is `""` (meaning "any version") if no
///   recognized operator prefixes the string.
#[must_use]
pub fn split_operator(constraint: &str) -> (&str, &str) {
    for op in ["<=", ">=", "<", "=", ">"] {
        if let Some(rest) = constraint.strip_prefix(op) {
            return (op, rest);
        }
    }
    ("", constraint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_zero_component_is_implicit_padding_not_greater() {
        assert_eq!(compare("foo-1.2.0", "foo-1.2"), Ordering::Equal);
    }

    #[test]
    fn revision_breaks_ties() {
        assert_eq!(compare("foo-1.0_1", "foo-1.0"), Ordering::Greater);
        assert_eq!(compare("foo-1.0_1", "foo-1.0_0"), Ordering::Greater);
    }

    #[test]
    fn bare_letter_sorts_before_stage_absorbed_into_new_component() {
        assert_eq!(compare("foo-1.0alpha3", "foo-1.0"), Ordering::Less);
    }

    #[test]
    fn star_is_smaller_than_any_real_component() {
        assert_eq!(compare("foo-2.*", "foo-2pl1"), Ordering::Less);
        assert_eq!(compare("foo-2.*", "foo-2alpha3"), Ordering::Less);
    }

    #[test]
    fn pl_sorts_before_every_other_letter() {
        assert_eq!(compare("foo-0.1pl11", "foo-0.1alpha3"), Ordering::Less);
    }

    #[test]
    fn alpha_beta_pre_rc_sort_in_declared_order() {
        assert_eq!(compare("foo-1.0alpha1", "foo-1.0beta1"), Ordering::Less);
        assert_eq!(compare("foo-1.0beta1", "foo-1.0pre1"), Ordering::Less);
        assert_eq!(compare("foo-1.0pre1", "foo-1.0rc1"), Ordering::Less);
    }

    #[test]
    fn missing_trailing_components_compare_as_zero() {
        assert_eq!(compare("foo-1.0", "foo-1.0.0"), Ordering::Equal);
        assert_eq!(compare("foo-1", "foo-1.0"), Ordering::Equal);
    }

    #[test]
    fn epoch_supersedes_version_body() {
        assert_eq!(compare("foo-1.0-1", "foo-9.9-0"), Ordering::Greater);
    }

    #[test]
    fn reflexive_and_equal() {
        assert_eq!(compare("foo-1.2.3", "foo-1.2.3"), Ordering::Equal);
    }

    #[test]
    fn antisymmetric_for_a_sample_of_pairs() {
        let pairs = [
            ("foo-1.2.0", "foo-1.2"),
            ("foo-1.0_1", "foo-1.0"),
            ("foo-1.0alpha3", "foo-1.0"),
            ("foo-2.*", "foo-2pl1"),
            ("foo-1.0", "foo-1.0.0"),
        ];
        for (a, b) in pairs {
            assert_eq!(compare(a, b), compare(b, a).reverse());
        }
    }

    #[test]
    fn plain_version_without_name_prefix_works() {
        assert_eq!(compare("1.2.3", "1.2.4"), Ordering::Less);
    }

    #[test]
    fn satisfies_checks_the_operator() {
        assert!(satisfies("1.2", ">=1.0"));
        assert!(!satisfies("1.2", ">=2.0"));
        assert!(satisfies("1.2", "=1.2"));
        assert!(satisfies("1.2", "<2.0"));
    }

    #[test]
    fn split_operator_recognizes_two_char_ops_before_one_char() {
        assert_eq!(split_operator(">=1.0"), (">=", "1.0"));
        assert_eq!(split_operator(">1.0"), (">", "1.0"));
        assert_eq!(split_operator("bare"), ("", "bare"));
    }

    #[test]
    fn plus_block_padding_favors_block_with_real_content() {
        assert_eq!(compare("foo-1.0+1", "foo-1.0+0"), Ordering::Greater);
        assert_eq!(compare("foo-1.0+", "foo-1.0+1"), Ordering::Less);
    }
}
