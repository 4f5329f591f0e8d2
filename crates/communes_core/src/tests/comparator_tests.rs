use super::*;

fn commune(name: &str, population: Option<u64>) -> CommuneRecord {
    CommuneRecord::new(name, population)
}

fn names(records: &[CommuneRecord]) -> Vec<&str> {
    records.iter().map(|record| record.name.as_str()).collect()
}

#[test]
fn accented_names_sort_next_to_their_plain_spelling() {
    let mut records = vec![
        commune("Fontenay", Some(1)),
        commune("Épinay", Some(1)),
        commune("Elancourt", Some(1)),
        commune("Epinay", Some(1)),
        commune("Ézy", Some(1)),
    ];

    records.sort_by(make_comparator(SortField::Name, SortDirection::Asc));

    assert_eq!(
        names(&records),
        vec!["Elancourt", "Epinay", "Épinay", "Ézy", "Fontenay"]
    );
}

#[test]
fn name_comparison_ignores_case() {
    assert_eq!(compare_names("achères", "Andrésy"), Ordering::Less);
    assert_eq!(compare_names("LE CHESNAY", "le pecq"), Ordering::Less);
    assert_eq!(compare_names("Œuilly", "Oeuf"), Ordering::Greater);
}

#[test]
fn missing_population_sorts_first_ascending_and_last_descending() {
    let mut records = vec![
        commune("Trappes", Some(32000)),
        commune("Unknown", None),
        commune("Maurepas", Some(19000)),
    ];

    records.sort_by(make_comparator(SortField::Population, SortDirection::Asc));
    assert_eq!(names(&records), vec!["Unknown", "Maurepas", "Trappes"]);

    records.sort_by(make_comparator(SortField::Population, SortDirection::Desc));
    assert_eq!(names(&records), vec!["Trappes", "Maurepas", "Unknown"]);
}

#[test]
fn equal_populations_are_ordered_by_name() {
    let mut records = vec![
        commune("Bazoches", Some(500)),
        commune("Auteuil", Some(500)),
        commune("Condé", Some(500)),
    ];

    records.sort_by(make_comparator(SortField::Population, SortDirection::Asc));
    assert_eq!(names(&records), vec!["Auteuil", "Bazoches", "Condé"]);
}

#[test]
fn reversed_ascending_matches_descending_with_ties() {
    let mut ascending = vec![
        commune("Bazoches", Some(500)),
        commune("Auteuil", None),
        commune("Condé", Some(500)),
        commune("Auffargis", None),
        commune("Auteuil", Some(500)).with_code("78033"),
        commune("Auteuil", Some(500)).with_code("78032"),
    ];
    let mut descending = ascending.clone();

    ascending.sort_by(make_comparator(SortField::Population, SortDirection::Asc));
    ascending.reverse();
    descending.sort_by(make_comparator(SortField::Population, SortDirection::Desc));

    assert_eq!(ascending, descending);
}

#[test]
fn codeless_duplicates_are_ordered_by_passthrough_fields() {
    let mut first = commune("Auteuil", Some(500));
    first.extra.insert("codeDepartement".into(), serde_json::json!("91"));
    let mut second = commune("Auteuil", Some(500));
    second.extra.insert("codeDepartement".into(), serde_json::json!("78"));

    let mut ascending = vec![first.clone(), second.clone()];
    ascending.sort_by(make_comparator(SortField::Name, SortDirection::Asc));
    ascending.reverse();
    let mut descending = vec![first, second];
    descending.sort_by(make_comparator(SortField::Name, SortDirection::Desc));

    assert_eq!(ascending, descending);
    assert_eq!(descending[0].extra["codeDepartement"], "91");
}
