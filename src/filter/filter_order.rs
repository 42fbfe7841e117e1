use super::types::{SortDirection, SortSpec, SortWhitelist};

/// Return the whitelisted entry equal to `field`, or `default_field`.
/// Out-of-set input degrades to the default ordering; it is never an error.
pub fn validate_sort_field(
    field: Option<&str>,
    allowed: &[&'static str],
    default_field: &'static str,
) -> &'static str {
    field
        .map(str::trim)
        .and_then(|f| allowed.iter().copied().find(|a| *a == f))
        .unwrap_or(default_field)
}

/// Case-insensitive `asc` / `desc`; anything else yields `default`.
pub fn validate_order(order: Option<&str>, default: SortDirection) -> SortDirection {
    match order.map(str::trim) {
        Some(o) if o.eq_ignore_ascii_case("asc") => SortDirection::Asc,
        Some(o) if o.eq_ignore_ascii_case("desc") => SortDirection::Desc,
        _ => default,
    }
}

impl SortWhitelist {
    pub fn resolve(&self, sort: Option<&str>, order: Option<&str>) -> SortSpec {
        SortSpec {
            column: validate_sort_field(sort, self.allowed, self.default_field),
            direction: validate_order(order, self.default_direction),
        }
    }
}

pub struct FilterOrder;

impl FilterOrder {
    pub fn generate(spec: Option<&SortSpec>) -> String {
        match spec {
            Some(s) => format!("ORDER BY \"{}\" {}", s.column, s.direction.to_sql()),
            None => String::new(),
        }
    }
}
