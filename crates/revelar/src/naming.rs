//! Naming-convention conversions between declared section names and
//! implementation identifiers.
//!
//! Declared names are kebab-case (`"card-grid"`); implementations are
//! conventionally registered as PascalCase identifiers with a `Section`
//! suffix (`CardGridSection`). Resolution tries every convention in a fixed
//! order so authors can register under whichever form they prefer.

/// Suffix stripped from implementation identifiers when deriving a declared
/// section name, and appended when resolving a declared name against
/// suffixed registrations.
pub const SECTION_SUFFIX: &str = "Section";

/// Convert kebab-case to PascalCase.
///
/// `"large-hero-image"` → `"LargeHeroImage"`
#[must_use]
pub fn kebab_to_pascal_case(kebab: &str) -> String {
    kebab
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Convert kebab-case to camelCase.
///
/// `"large-hero-image"` → `"largeHeroImage"`
#[must_use]
pub fn kebab_to_camel_case(kebab: &str) -> String {
    let pascal = kebab_to_pascal_case(kebab);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Convert a PascalCase identifier to kebab-case, removing the `Section`
/// suffix if present.
///
/// `"LargeHeroImageSection"` → `"large-hero-image"`
#[must_use]
pub fn pascal_to_kebab_case(pascal: &str) -> String {
    let trimmed = pascal.strip_suffix(SECTION_SUFFIX).unwrap_or(pascal);
    let mut kebab = String::with_capacity(trimmed.len() + 4);
    for (index, ch) in trimmed.chars().enumerate() {
        if ch.is_uppercase() {
            if index > 0 {
                kebab.push('-');
            }
            kebab.extend(ch.to_lowercase());
        } else {
            kebab.push(ch);
        }
    }
    kebab
}

/// Try multiple naming strategies to resolve a declared section name.
///
/// Lookups are attempted in order: the literal kebab name, its camelCase
/// conversion, its PascalCase conversion, and PascalCase with the `Section`
/// suffix. The first hit wins; `None` means no registration matched under
/// any convention (absence, not an error; callers skip the node).
pub fn try_naming_strategies<T>(
    kebab_name: &str,
    lookup: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let strategies = [
        kebab_name.to_string(),
        kebab_to_camel_case(kebab_name),
        kebab_to_pascal_case(kebab_name),
        format!("{}{SECTION_SUFFIX}", kebab_to_pascal_case(kebab_name)),
    ];

    strategies.iter().find_map(|name| lookup(name))
}
