use crate::finding::Finding;

/// Decides whether two findings are the same issue. Reconciliation consults
/// nothing else, so swapping the implementation changes which findings count
/// as resolved.
pub trait Equivalence {
    fn equivalent(&self, a: &Finding, b: &Finding) -> bool;
}

impl<F> Equivalence for F
where
    F: Fn(&Finding, &Finding) -> bool,
{
    fn equivalent(&self, a: &Finding, b: &Finding) -> bool {
        self(a, b)
    }
}

/// Message, sticky flag, file and line must all match.
#[derive(Debug, Default, Clone, Copy)]
pub struct Structural;

impl Equivalence for Structural {
    fn equivalent(&self, a: &Finding, b: &Finding) -> bool {
        a == b
    }
}

/// Message and sticky flag only. For hosts whose location data is unstable
/// between runs, such as line numbers shifting under a rebase.
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoreLocation;

impl Equivalence for IgnoreLocation {
    fn equivalent(&self, a: &Finding, b: &Finding) -> bool {
        a.message == b.message && a.sticky == b.sticky
    }
}

/// Resolve a configured policy name.
pub fn by_name(name: &str) -> Option<Box<dyn Equivalence>> {
    match name {
        "structural" => Some(Box::new(Structural)),
        "ignore-location" => Some(Box::new(IgnoreLocation)),
        _ => None,
    }
}
