//! Achatinellidae subfamily routing
//!
//! Genus fragments are matched by substring, in table order; the first
//! subfamily with a matching fragment wins.

const SUBFAMILIES: &[(&str, &[&str])] = &[
    (
        "Achatinellinae",
        &["Achatinella", "Newcombia", "Partulina", "Perdicella"],
    ),
    ("Auriculellinae", &["Auriculella", "Gulickia"]),
    (
        "Tornatellidinae",
        &["Philopoa", "Tornatellaria", "Tornatellides"],
    ),
    ("Tornatellininae", &["Elasmias"]),
    (
        "Pacificellinae",
        &["Lamellidea", "Pacificella", "Tornatellinops"],
    ),
];

/// Subfamily for a scientific name (or genus) in Achatinellidae
pub fn achatinellid_subfamily(sciname: &str) -> Option<&'static str> {
    SUBFAMILIES
        .iter()
        .find(|(_, genera)| genera.iter().any(|genus| sciname.contains(genus)))
        .map(|(subfamily, _)| *subfamily)
}
