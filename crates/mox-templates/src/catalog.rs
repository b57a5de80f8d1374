//! Built-in templates and mixins.

/// File suffix of template sources.
pub const TEMPLATE_EXTENSION: &str = ".sql.hbs";

/// Templates rendered for every object type, in output order.
pub const TEMPLATES: [&str; 13] = [
    "dbtyper-specific",
    "tbls-specific",
    "_remove_nulls_in_array",
    "_as_get_prev_registrering",
    "_as_create_registrering",
    "as_update",
    "as_create_or_import",
    "as_list",
    "as_read",
    "as_search",
    "json-cast-functions",
    "_as_sorted",
    "_as_filter_unauth",
];

macro_rules! embedded {
    ($($name:literal),* $(,)?) => {
        &[$(($name, include_str!(concat!("../templates/", $name, ".sql.hbs")))),*]
    };
}

pub(crate) const BUILTIN_TEMPLATES: &[(&str, &str)] = embedded![
    "dbtyper-specific",
    "tbls-specific",
    "_remove_nulls_in_array",
    "_as_get_prev_registrering",
    "_as_create_registrering",
    "as_update",
    "as_create_or_import",
    "as_list",
    "as_read",
    "as_search",
    "json-cast-functions",
    "_as_sorted",
    "_as_filter_unauth",
];

pub(crate) const BUILTIN_MIXINS: &[(&str, &str)] = embedded![
    "empty",
    "as_create_or_import_dokument",
    "as_search_dokument",
    "as_search_sag",
];

/// Source file name for a template, as shown in generated headers.
pub fn template_file(name: &str) -> String {
    format!("{name}{TEMPLATE_EXTENSION}")
}
