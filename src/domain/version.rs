//! Version comparison between packaged and upstream releases
//!
//! Versions are compared with semver when both sides parse as semver,
//! otherwise by their dot/dash separated components. Each component is
//! ordered by its leading number, then by its qualifier: `rc`, `beta`,
//! `alpha` and `dev` rank below the bare release.

use std::cmp::Ordering;

/// Returns true if `upstream` is strictly newer than `current`
pub fn is_newer(upstream: &str, current: &str) -> bool {
    compare_versions(upstream, current) == Ordering::Greater
}

/// Compare two version strings
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a = a.trim();
    let b = b.trim();
    let strip = |s: &str| -> String { s.strip_prefix('v').unwrap_or(s).to_string() };

    if let (Ok(va), Ok(vb)) = (
        semver::Version::parse(&strip(a)),
        semver::Version::parse(&strip(b)),
    ) {
        return va.cmp(&vb);
    }

    compare_numeric(a, b)
}

/// Trailing qualifier of a version component such as `rc1` in `0rc1`
///
/// Declaration order is rank order: pre-releases sort below the bare
/// release, any other qualifier (`1.1.1w`, `2.0p1`) above it.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Qualifier {
    PreRelease { rank: u8, number: u64 },
    Release,
    Post { tag: String, number: u64 },
}

impl Qualifier {
    fn parse(s: &str) -> Self {
        if s.is_empty() {
            return Qualifier::Release;
        }
        let s = s.to_ascii_lowercase();
        let tag: String = s.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
        let number = leading_number(&s[tag.len()..]).unwrap_or(0);
        let rank = match tag.as_str() {
            "dev" => Some(0),
            "a" | "alpha" => Some(1),
            "b" | "beta" => Some(2),
            "pre" | "c" | "rc" => Some(3),
            _ => None,
        };
        match rank {
            Some(rank) => Qualifier::PreRelease { rank, number },
            None => Qualifier::Post { tag, number },
        }
    }
}

/// Leading decimal digits of `s`, if any
fn leading_number(s: &str) -> Option<u64> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s[..end].parse().ok()
}

/// One dot/dash separated component: its leading number and qualifier
fn parse_component(part: &str) -> (u64, Qualifier) {
    let digits = part.find(|c: char| !c.is_ascii_digit()).unwrap_or(part.len());
    let number = part[..digits].parse().unwrap_or(0);
    (number, Qualifier::parse(&part[digits..]))
}

/// Component-wise comparison; missing trailing components count as a bare zero
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let parse_parts = |s: &str| -> Vec<(u64, Qualifier)> {
        let s = s.strip_prefix('v').unwrap_or(s);
        s.split(['.', '-', '_', '~'])
            .filter(|p| !p.is_empty())
            .map(parse_component)
            .collect()
    };

    let parts_a = parse_parts(a);
    let parts_b = parse_parts(b);
    let len = parts_a.len().max(parts_b.len());
    let zero = (0, Qualifier::Release);

    for i in 0..len {
        let pa = parts_a.get(i).unwrap_or(&zero);
        let pb = parts_b.get(i).unwrap_or(&zero);
        match pa.cmp(pb) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_versions_basic() {
        assert_eq!(compare_versions("1.0.0", "1.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("1.0.0", "2.0.0"), Ordering::Less);
        assert_eq!(compare_versions("2.0.0", "1.0.0"), Ordering::Greater);
    }

    #[test]
    fn test_compare_versions_multi_digit() {
        assert_eq!(compare_versions("1.9.0", "1.10.0"), Ordering::Less);
        assert_eq!(compare_versions("10.0.0", "9.0.0"), Ordering::Greater);
    }

    #[test]
    fn test_compare_versions_v_prefix() {
        assert_eq!(compare_versions("v1.2.3", "1.2.3"), Ordering::Equal);
        assert_eq!(compare_versions("v2.0.0", "v1.9.9"), Ordering::Greater);
    }

    #[test]
    fn test_compare_versions_semver_prerelease() {
        assert_eq!(compare_versions("1.0.0-alpha", "1.0.0"), Ordering::Less);
        assert_eq!(compare_versions("1.0.0-beta", "1.0.0-alpha"), Ordering::Greater);
    }

    #[test]
    fn test_compare_versions_non_semver_lengths() {
        // missing components are zero
        assert_eq!(compare_versions("1.0", "1.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("2.1", "2.0.9"), Ordering::Greater);
        assert_eq!(compare_versions("1.2.3.4", "1.2.3"), Ordering::Greater);
    }

    #[test]
    fn test_compare_versions_date_style() {
        assert_eq!(compare_versions("20240105", "20231230"), Ordering::Greater);
    }

    #[test]
    fn test_is_newer() {
        assert!(is_newer("3.3.0", "3.2.0"));
        assert!(!is_newer("3.2.0", "3.2.0"));
        assert!(!is_newer("3.1.0", "3.2.0"));
    }

    #[test]
    fn test_release_is_newer_than_its_candidates() {
        assert!(is_newer("2.1.0", "2.1.0rc1"));
        assert!(!is_newer("2.1.0rc1", "2.1.0"));
        assert!(is_newer("2.1", "2.1-rc1"));
        assert!(is_newer("2.1.0rc2", "2.1.0rc1"));
        assert!(is_newer("2.1.0rc1", "2.1.0b3"));
        assert!(is_newer("2.1.0b1", "2.1.0a9"));
    }

    #[test]
    fn test_qualified_component_keeps_its_number() {
        assert!(is_newer("1.10rc1", "1.9"));
        assert!(!is_newer("1.9", "1.10rc1"));
        assert!(is_newer("1.10", "1.10rc1"));
    }

    #[test]
    fn test_letter_patch_releases() {
        assert!(is_newer("1.1.1w", "1.1.1v"));
        assert!(is_newer("1.1.1w", "1.1.1"));
        assert_eq!(compare_versions("9.6p1", "9.6P1"), Ordering::Equal);
    }
}
