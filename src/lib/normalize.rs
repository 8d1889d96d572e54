/// Boundary names as they appear in the `st_nm` property of the India
/// state boundary file.
const CANONICAL_NAMES: &[&str] = &[
    "Andaman & Nicobar",
    "Andhra Pradesh",
    "Arunachal Pradesh",
    "Assam",
    "Bihar",
    "Chandigarh",
    "Chhattisgarh",
    "Dadra and Nagar Haveli and Daman and Diu",
    "Delhi",
    "Goa",
    "Gujarat",
    "Haryana",
    "Himachal Pradesh",
    "Jammu & Kashmir",
    "Jharkhand",
    "Karnataka",
    "Kerala",
    "Ladakh",
    "Lakshadweep",
    "Madhya Pradesh",
    "Maharashtra",
    "Manipur",
    "Meghalaya",
    "Mizoram",
    "Nagaland",
    "Odisha",
    "Puducherry",
    "Punjab",
    "Rajasthan",
    "Sikkim",
    "Tamil Nadu",
    "Telangana",
    "Tripura",
    "Uttar Pradesh",
    "Uttarakhand",
    "West Bengal",
];

/// Lookup keys (see `lookup_key`) of spellings that differ from the
/// canonical name by more than case, spacing or punctuation.
const ALIASES: &[(&str, &str)] = &[
    ("andamanandnicobarislands", "Andaman & Nicobar"),
    ("andamannicobar", "Andaman & Nicobar"),
    ("andamannicobarislands", "Andaman & Nicobar"),
    ("jammukashmir", "Jammu & Kashmir"),
    ("tamilnadu", "Tamil Nadu"),
    ("orissa", "Odisha"),
    ("pondicherry", "Puducherry"),
    ("uttaranchal", "Uttarakhand"),
    ("chhatisgarh", "Chhattisgarh"),
    ("nctofdelhi", "Delhi"),
    ("newdelhi", "Delhi"),
    ("dadranagarhaveli", "Dadra and Nagar Haveli and Daman and Diu"),
    ("dadraandnagarhaveli", "Dadra and Nagar Haveli and Daman and Diu"),
    ("damananddiu", "Dadra and Nagar Haveli and Daman and Diu"),
    ("dnhdd", "Dadra and Nagar Haveli and Daman and Diu"),
];

/// Identifiers granting access to the whole country.
const COUNTRY_WIDE: &[&str] = &["india", "allindia", "all", "allcountry"];

/// Case, whitespace and punctuation insensitive key; `&` reads as `and`.
fn lookup_key(name: &str) -> String {
    name.replace('&', "and")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

fn canonical_name(key: &str) -> Option<&'static str> {
    if let Some((_, name)) = ALIASES.iter().find(|(alias, _)| *alias == key) {
        return Some(*name);
    }
    CANONICAL_NAMES
        .iter()
        .copied()
        .find(|name| lookup_key(name) == key)
}

fn split_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;
    for c in name.chars() {
        if let Some(p) = prev {
            if c.is_ascii_uppercase() && (p.is_ascii_lowercase() || p.is_ascii_digit()) {
                out.push(' ');
            }
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// Map a region identifier to the name used by the boundary file.
///
/// Known states and union territories resolve to their canonical name
/// regardless of spelling (`"Tamilnadu"`, `"tamil  nadu"`,
/// `"JammuAndKashmir"`). Anything else is split on camel-case humps,
/// lower-cased and whitespace-collapsed, so unknown names still compare
/// consistently while matching no region.
///
/// # Example
///
/// ```
/// use region_access::normalize::normalize;
///
/// assert_eq!(normalize("AndamanAndNicobarIslands"), "Andaman & Nicobar");
/// assert_eq!(normalize("SomeNewTerritory"), "some new territory");
/// ```
pub fn normalize(name: &str) -> String {
    let key = lookup_key(name);
    if let Some(canonical) = canonical_name(&key) {
        return canonical.to_string();
    }
    split_camel_case(name)
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn is_country_wide(name: &str) -> bool {
    let key = lookup_key(name);
    COUNTRY_WIDE.contains(&key.as_str())
}

/// Both names refer to the same region.
pub fn same_region(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}
