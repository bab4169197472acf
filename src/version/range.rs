//! npm version range parsing.
//!
//! A [`Range`] is a list of alternatives separated by `||`. Each
//! alternative is a set of comparators that must all hold. Caret, tilde,
//! X-ranges and hyphen ranges are desugared into plain comparators over
//! [`semver::Version`], using `-0` upper bounds so that pre-releases of the
//! next excluded version do not slip in.

use semver::{BuildMetadata, Prerelease, Version};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while parsing a range.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("invalid version range '{range}': {reason}")]
    Invalid { range: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Comparator {
    op: Op,
    version: Version,
}

impl Comparator {
    fn new(op: Op, version: Version) -> Self {
        Self { op, version }
    }

    fn matches(&self, version: &Version) -> bool {
        match self.op {
            Op::Lt => version < &self.version,
            Op::Le => version <= &self.version,
            Op::Gt => version > &self.version,
            Op::Ge => version >= &self.version,
            Op::Eq => version == &self.version,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::Eq => "=",
        };
        write!(f, "{}{}", op, self.version)
    }
}

/// A possibly partial version such as `1`, `1.x` or `1.2.3-beta.1`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Partial {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    pre: Prerelease,
}

impl Partial {
    fn parse(input: &str) -> Result<Self, String> {
        let trimmed = input.trim_start_matches('=').trim_start_matches(['v', 'V']);
        let without_build = trimmed.split_once('+').map_or(trimmed, |(core, _)| core);
        let (core, pre) = match without_build.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (without_build, None),
        };

        let mut numbers = [None; 3];
        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() > 3 {
            return Err(format!("too many components in '{input}'"));
        }
        let mut wildcard_seen = false;
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            if matches!(*part, "x" | "X" | "*") {
                wildcard_seen = true;
                continue;
            }
            let n: u64 = part
                .parse()
                .map_err(|_| format!("'{part}' is not a version number in '{input}'"))?;
            // Anything after a wildcard is a wildcard too (`1.x.3` is `1.x`).
            if !wildcard_seen {
                *slot = Some(n);
            }
        }
        let [major, minor, patch] = numbers;

        let pre = match pre {
            Some(pre) if patch.is_none() => {
                return Err(format!("pre-release '{pre}' on partial version '{input}'"));
            }
            Some(pre) => Prerelease::new(pre).map_err(|e| e.to_string())?,
            None => Prerelease::EMPTY,
        };

        Ok(Self {
            major,
            minor,
            patch,
            pre,
        })
    }

    fn is_any(&self) -> bool {
        self.major.is_none()
    }

    /// Fill missing components with zero.
    fn floor(&self) -> Version {
        let mut v = Version::new(
            self.major.unwrap_or(0),
            self.minor.unwrap_or(0),
            self.patch.unwrap_or(0),
        );
        v.pre = self.pre.clone();
        v
    }
}

fn version(major: u64, minor: u64, patch: u64) -> Version {
    Version::new(major, minor, patch)
}

/// `major.minor.patch-0`, the lowest version of that release.
fn lowest(major: u64, minor: u64, patch: u64) -> Version {
    let mut v = Version::new(major, minor, patch);
    v.pre = Prerelease::new("0").unwrap_or_default();
    v
}

/// The lowest version of all, used to express "nothing matches".
fn nothing() -> Vec<Comparator> {
    vec![Comparator::new(Op::Lt, lowest(0, 0, 0))]
}

/// `v-0` when pre-releases are eligible and `v` names none, else `v`.
fn lower(mut v: Version, include_prerelease: bool) -> Version {
    if include_prerelease && v.pre.is_empty() {
        v.pre = Prerelease::new("0").unwrap_or_default();
    }
    v
}

fn caret(p: &Partial, include_prerelease: bool) -> Vec<Comparator> {
    let Some(major) = p.major else {
        return Vec::new();
    };
    let Some(minor) = p.minor else {
        return vec![
            Comparator::new(Op::Ge, lower(version(major, 0, 0), include_prerelease)),
            Comparator::new(Op::Lt, lowest(major.saturating_add(1), 0, 0)),
        ];
    };
    let upper = match p.patch {
        None if major == 0 => lowest(0, minor.saturating_add(1), 0),
        None => lowest(major.saturating_add(1), 0, 0),
        Some(patch) if major == 0 && minor == 0 => lowest(0, 0, patch.saturating_add(1)),
        Some(_) if major == 0 => lowest(0, minor.saturating_add(1), 0),
        Some(_) => lowest(major.saturating_add(1), 0, 0),
    };
    // A complete `^1.2.3` keeps its exact floor.
    let floor = if p.patch.is_some() && major != 0 {
        p.floor()
    } else {
        lower(p.floor(), include_prerelease)
    };
    vec![Comparator::new(Op::Ge, floor), Comparator::new(Op::Lt, upper)]
}

fn tilde(p: &Partial) -> Vec<Comparator> {
    let Some(major) = p.major else {
        return Vec::new();
    };
    let upper = match p.minor {
        None => lowest(major.saturating_add(1), 0, 0),
        Some(minor) => lowest(major, minor.saturating_add(1), 0),
    };
    vec![
        Comparator::new(Op::Ge, p.floor()),
        Comparator::new(Op::Lt, upper),
    ]
}

/// Bare or `=` versions: exact when complete, an X-range otherwise.
fn exact(p: &Partial, include_prerelease: bool) -> Vec<Comparator> {
    match (p.major, p.minor, p.patch) {
        (None, _, _) => Vec::new(),
        (Some(major), None, _) => vec![
            Comparator::new(Op::Ge, lower(version(major, 0, 0), include_prerelease)),
            Comparator::new(Op::Lt, lowest(major.saturating_add(1), 0, 0)),
        ],
        (Some(major), Some(minor), None) => vec![
            Comparator::new(Op::Ge, lower(version(major, minor, 0), include_prerelease)),
            Comparator::new(Op::Lt, lowest(major, minor.saturating_add(1), 0)),
        ],
        (Some(_), Some(_), Some(_)) => vec![Comparator::new(Op::Eq, p.floor())],
    }
}

/// `<`, `<=`, `>`, `>=` against a possibly partial version.
fn primitive(op: Op, p: &Partial, include_prerelease: bool) -> Vec<Comparator> {
    if p.is_any() {
        return match op {
            Op::Lt | Op::Gt => nothing(),
            _ => Vec::new(),
        };
    }
    let major = p.major.unwrap_or(0);
    match (op, p.minor, p.patch) {
        (Op::Gt, None, _) => vec![Comparator::new(
            Op::Ge,
            lower(version(major.saturating_add(1), 0, 0), include_prerelease),
        )],
        (Op::Gt, Some(minor), None) => vec![Comparator::new(
            Op::Ge,
            lower(version(major, minor.saturating_add(1), 0), include_prerelease),
        )],
        (Op::Ge, _, None) => vec![Comparator::new(Op::Ge, lower(p.floor(), include_prerelease))],
        (Op::Le, None, _) => vec![Comparator::new(Op::Lt, lowest(major.saturating_add(1), 0, 0))],
        (Op::Le, Some(minor), None) => {
            vec![Comparator::new(Op::Lt, lowest(major, minor.saturating_add(1), 0))]
        }
        (Op::Lt, _, None) => vec![Comparator::new(
            Op::Lt,
            lowest(major, p.minor.unwrap_or(0), 0),
        )],
        _ => vec![Comparator::new(op, p.floor())],
    }
}

fn hyphen(from: &Partial, to: &Partial, include_prerelease: bool) -> Vec<Comparator> {
    let mut set = Vec::new();
    if !from.is_any() {
        set.push(Comparator::new(Op::Ge, lower(from.floor(), include_prerelease)));
    }
    match (to.major, to.minor, to.patch) {
        (None, _, _) => {}
        (Some(major), None, _) => {
            set.push(Comparator::new(Op::Lt, lowest(major.saturating_add(1), 0, 0)));
        }
        (Some(major), Some(minor), None) => {
            set.push(Comparator::new(Op::Lt, lowest(major, minor.saturating_add(1), 0)));
        }
        (Some(major), Some(minor), Some(patch)) if include_prerelease && to.pre.is_empty() => {
            set.push(Comparator::new(Op::Lt, lowest(major, minor, patch.saturating_add(1))));
        }
        (Some(_), Some(_), Some(_)) => set.push(Comparator::new(Op::Le, to.floor())),
    }
    set
}

fn parse_comparator(token: &str, include_prerelease: bool) -> Result<Vec<Comparator>, String> {
    const PREFIXES: [&str; 8] = [">=", "<=", "~>", ">", "<", "=", "~", "^"];

    let prefix = PREFIXES.iter().find(|p| token.starts_with(*p)).copied();
    let rest = prefix.map_or(token, |p| &token[p.len()..]);
    if rest.is_empty() {
        return Err(format!("operator '{token}' has no version"));
    }
    let partial = Partial::parse(rest)?;

    Ok(match prefix {
        Some("^") => caret(&partial, include_prerelease),
        Some("~") | Some("~>") => tilde(&partial),
        Some(">=") => primitive(Op::Ge, &partial, include_prerelease),
        Some("<=") => primitive(Op::Le, &partial, include_prerelease),
        Some(">") => primitive(Op::Gt, &partial, include_prerelease),
        Some("<") => primitive(Op::Lt, &partial, include_prerelease),
        _ => exact(&partial, include_prerelease),
    })
}

/// Join free-standing operators with the version that follows (`>= 1.2`).
fn tokens(set: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut pending = String::new();
    for word in set.split_whitespace() {
        if word.chars().all(|c| matches!(c, '<' | '>' | '=' | '~' | '^')) {
            pending.push_str(word);
            continue;
        }
        out.push(format!("{pending}{word}"));
        pending.clear();
    }
    if !pending.is_empty() {
        out.push(pending);
    }
    out
}

fn parse_set(set: &str, include_prerelease: bool) -> Result<Vec<Comparator>, String> {
    let words: Vec<&str> = set.split_whitespace().collect();
    if let [from, "-", to] = words.as_slice() {
        return Ok(hyphen(
            &Partial::parse(from)?,
            &Partial::parse(to)?,
            include_prerelease,
        ));
    }

    let mut comparators = Vec::new();
    for token in tokens(set) {
        comparators.extend(parse_comparator(&token, include_prerelease)?);
    }
    Ok(comparators)
}

/// A parsed npm range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    /// Alternatives; an empty alternative matches every version.
    sets: Vec<Vec<Comparator>>,
    include_prerelease: bool,
}

impl Range {
    /// Parse an npm range expression with pre-release versions eligible.
    pub fn parse(input: &str) -> Result<Self, RangeError> {
        Self::parse_with(input, true)
    }

    /// Parse an npm range expression.
    ///
    /// With `include_prerelease`, partial and open lower bounds start at the
    /// `-0` pre-release of their version, so `18` admits `18.0.0-rc.0`.
    /// Without it, a pre-release version only matches an alternative that
    /// names a pre-release of the same `major.minor.patch`.
    pub fn parse_with(input: &str, include_prerelease: bool) -> Result<Self, RangeError> {
        let sets = input
            .split("||")
            .map(|set| parse_set(set, include_prerelease))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|reason| RangeError::Invalid {
                range: input.to_string(),
                reason,
            })?;
        Ok(Self {
            sets,
            include_prerelease,
        })
    }

    /// Whether `version` satisfies any alternative.
    pub fn matches(&self, version: &Version) -> bool {
        let mut version = version.clone();
        version.build = BuildMetadata::EMPTY;

        self.sets.iter().any(|set| {
            if !set.iter().all(|c| c.matches(&version)) {
                return false;
            }
            if version.pre.is_empty() || self.include_prerelease {
                return true;
            }
            set.iter().any(|c| {
                !c.version.pre.is_empty()
                    && c.version.major == version.major
                    && c.version.minor == version.minor
                    && c.version.patch == version.patch
            })
        })
    }
}

impl FromStr for Range {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Range::parse(s)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, set) in self.sets.iter().enumerate() {
            if i > 0 {
                f.write_str(" || ")?;
            }
            if set.is_empty() {
                f.write_str("*")?;
            }
            for (j, c) in set.iter().enumerate() {
                if j > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}
