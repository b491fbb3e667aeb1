use std::cmp::Ordering;

/// Numeric identifiers sort by value and come first, the rest sort as strings.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

pub fn sort_unique(ids: &mut Vec<String>) {
    ids.sort_by(|a, b| compare_ids(a, b));
    ids.dedup();
}

/// Set difference `b \ a` of two lists sorted by [`compare_ids`].
pub fn difference(a: &[String], b: &[String]) -> Vec<String> {
    let mut diff = Vec::with_capacity(b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match compare_ids(&a[i], &b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => {
                diff.push(b[j].clone());
                j += 1;
            }
            Ordering::Equal => {
                i += 1;
                j += 1;
            }
        }
    }
    diff.extend_from_slice(&b[j..]);
    diff
}

/// The identifier sets of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// What the upstream lists right now.
    pub current: Vec<String>,
    /// Known from earlier runs but gone from the upstream.
    pub archive: Vec<String>,
    /// Everything ever seen.
    pub all: Vec<String>,
}

pub fn reconcile(mut fresh: Vec<String>, mut historical: Vec<String>) -> Reconciled {
    sort_unique(&mut fresh);
    historical.extend(fresh.iter().cloned());
    sort_unique(&mut historical);
    let archive = difference(&fresh, &historical);
    Reconciled {
        current: fresh,
        archive,
        all: historical,
    }
}
