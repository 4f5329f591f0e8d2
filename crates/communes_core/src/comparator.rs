//! Ordering functions over commune records.
//!
//! Names are compared on a folded form (canonical decomposition, combining
//! marks dropped, lowercased, `œ`/`æ` expanded) so that "Épinay" sorts next to
//! "Epinay". Equal folded names fall back to the raw text, then to the INSEE
//! code, then to the passthrough fields. Records that still compare equal are
//! equal as values.

use std::cmp::Ordering;

use serde_json::{Map, Value};
use shared::domain::{CommuneRecord, SortDirection, SortField};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

fn folded(name: &str) -> impl Iterator<Item = char> + '_ {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .flat_map(|c| match c {
            'œ' => ['o', 'e'].into_iter().take(2),
            'æ' => ['a', 'e'].into_iter().take(2),
            other => [other, other].into_iter().take(1),
        })
}

/// Locale-aware, case-insensitive comparison of two commune names.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    folded(a).cmp(folded(b)).then_with(|| a.cmp(b))
}

/// Missing populations order before every known value.
pub fn compare_populations(a: Option<u64>, b: Option<u64>) -> Ordering {
    a.cmp(&b)
}

fn base_ordering(field: SortField, a: &CommuneRecord, b: &CommuneRecord) -> Ordering {
    let primary = match field {
        SortField::Name => Ordering::Equal,
        SortField::Population => compare_populations(a.population, b.population),
    };
    primary
        .then_with(|| compare_names(&a.name, &b.name))
        .then_with(|| a.code.cmp(&b.code))
        .then_with(|| compare_passthrough(&a.extra, &b.extra))
}

/// Canonical JSON text of the passthrough fields; `Map` keeps keys sorted.
fn compare_passthrough(a: &Map<String, Value>, b: &Map<String, Value>) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    let a = serde_json::to_string(a).unwrap_or_default();
    let b = serde_json::to_string(b).unwrap_or_default();
    a.cmp(&b)
}

/// Builds the comparator for `field` in `direction`.
///
/// The direction multiplies the whole key, tie-break included, so reversing a
/// list sorted one way yields exactly the list sorted the other way. Records
/// tied on `field` therefore come out in descending name order under
/// [`SortDirection::Desc`]; this is intended.
pub fn make_comparator(
    field: SortField,
    direction: SortDirection,
) -> impl Fn(&CommuneRecord, &CommuneRecord) -> Ordering + Copy {
    move |a, b| direction.apply(base_ordering(field, a, b))
}

#[cfg(test)]
#[path = "tests/comparator_tests.rs"]
mod tests;
