//! Default Typst report template.
//!
//! Built-in Typst report markup with `{{PLACEHOLDER}}` substitution.

pub const PLACEHOLDERS: [&str; 5] = [
    "{{TITLE}}",
    "{{GENERATED}}",
    "{{RUN_SUMMARY}}",
    "{{YEAR_SUMMARY}}",
    "{{TOP_TABLES}}",
];

const TEMPLATE: &str = r#"#set page(paper: "a4", margin: 2cm)
#set text(size: 10pt)
#set table(stroke: 0.5pt + gray)

= Intra-Industry Trade Report: {{TITLE}}

_Generated {{GENERATED}}_

== Run

{{RUN_SUMMARY}}

== Yearly Indices

Mean IITI and MIITI are averaged over the codes traded in each year; WIITI is
the trade-weighted sum.

{{YEAR_SUMMARY}}

== Top Codes by WIITI

{{TOP_TABLES}}
"#;

pub fn template() -> &'static str {
    TEMPLATE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_contains_every_placeholder() {
        for placeholder in PLACEHOLDERS {
            assert!(template().contains(placeholder), "missing {placeholder}");
        }
    }

    #[test]
    fn template_sets_page() {
        assert!(template().starts_with("#set page("));
    }
}
