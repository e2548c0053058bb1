/// Builds `<namespace>perf.<category>.<metric>[<id1>-<id2>...]`.
///
/// The category is lower-cased, the metric is used as given.
pub fn format_key<S: AsRef<str>>(
    namespace: &str,
    category: impl AsRef<str>,
    metric: &str,
    identifier_parts: &[S],
) -> String {
    let identifier = identifier_parts.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("-");
    format!(
        "{namespace}perf.{}.{metric}[{identifier}]",
        category.as_ref().to_lowercase()
    )
}

/// Builds `<namespace>health.<metric>[<array_id>]`.
pub fn format_health_key(namespace: &str, metric: &str, array_id: &str) -> String {
    format!("{namespace}health.{metric}[{array_id}]")
}
