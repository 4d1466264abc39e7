pub use argtree_diagnostics::{
    Anchor, Diagnostic, Severity, Span, TokenRange, codes, explain, severity_for_code,
};
