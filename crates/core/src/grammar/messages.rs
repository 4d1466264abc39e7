use super::diag::{Anchor, Diagnostic, Severity};
use argtree_diagnostics::{message_template_for, severity_for_code};
use std::collections::HashMap;

/// Build a diagnostic whose severity and message come from the catalog.
///
/// The substitutions double as the diagnostic's context map.
pub(crate) fn diagnostic(
    id: &'static str,
    variant: &str,
    substitutions: &[(&str, String)],
    anchor: Anchor,
) -> Diagnostic {
    let fallback = substitutions
        .iter()
        .map(|(_, value)| value.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let message = render_message(id, variant, substitutions, fallback);
    let diagnostic = Diagnostic::new(
        id,
        severity_for_code(id).unwrap_or(Severity::Error),
        message,
        anchor,
    );
    if substitutions.is_empty() {
        diagnostic
    } else {
        diagnostic.with_context(
            substitutions
                .iter()
                .map(|(key, value)| ((*key).to_string(), value.clone()))
                .collect(),
        )
    }
}

/// Fill `{key}` placeholders of the catalog template. Unknown placeholders are
/// left as written.
pub(crate) fn render_message(
    id: &str,
    variant: &str,
    substitutions: &[(&str, String)],
    fallback: String,
) -> String {
    let Some(template) = message_template_for(id, variant) else {
        return fallback;
    };
    let substitution_map: HashMap<&str, &str> = substitutions
        .iter()
        .map(|(key, value)| (*key, value.as_str()))
        .collect();
    let mut rendered = String::with_capacity(template.len() + 16);
    let mut scan_from = 0usize;
    while let Some(open_rel) = template[scan_from..].find('{') {
        let open = scan_from + open_rel;
        rendered.push_str(&template[scan_from..open]);
        let after_open = open + 1;
        let Some(close_rel) = template[after_open..].find('}') else {
            rendered.push_str(&template[open..]);
            return rendered;
        };
        let close = after_open + close_rel;
        match substitution_map.get(&template[after_open..close]) {
            Some(value) => rendered.push_str(value),
            None => rendered.push_str(&template[open..=close]),
        }
        scan_from = close + 1;
    }
    rendered.push_str(&template[scan_from..]);
    rendered
}
