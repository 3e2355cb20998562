use serde::Deserialize;

use super::{Formatter, Highlight, HighlightedText};

/// Maps each highlight category to a style class name.
///
/// A category without a class (or with an empty one) is emitted as bare text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClassMapping {
    pub qualifier: Option<String>,
    pub primitive_type: Option<String>,
    pub user_defined_type: Option<String>,
    pub identifier: Option<String>,
    pub number: Option<String>,
    pub quasi_keyword: Option<String>,
}

impl Default for ClassMapping {
    fn default() -> Self {
        Self::new(
            Some("qualifier".to_string()),
            Some("primitive-type".to_string()),
            Some("user-defined-type".to_string()),
            Some("identifier".to_string()),
            Some("number".to_string()),
            Some("quasi-keyword".to_string()),
        )
    }
}

impl ClassMapping {
    /// Build a mapping from the class names in category order.
    pub fn new(
        qualifier: Option<String>,
        primitive_type: Option<String>,
        user_defined_type: Option<String>,
        identifier: Option<String>,
        number: Option<String>,
        quasi_keyword: Option<String>,
    ) -> Self {
        Self {
            qualifier,
            primitive_type,
            user_defined_type,
            identifier,
            number,
            quasi_keyword,
        }
    }

    /// The class for `highlight`, if it gets one.
    pub fn class_for(&self, highlight: Highlight) -> Option<&str> {
        let class = match highlight {
            Highlight::Qualifier => self.qualifier.as_deref(),
            Highlight::PrimitiveType => self.primitive_type.as_deref(),
            Highlight::UserDefinedType => self.user_defined_type.as_deref(),
            Highlight::Ident => self.identifier.as_deref(),
            Highlight::Number => self.number.as_deref(),
            Highlight::QuasiKeyword => self.quasi_keyword.as_deref(),
            Highlight::None => None,
        };
        class.filter(|name| !name.is_empty())
    }

    /// Every configured (category, class) pair, in category order.
    pub fn classes(&self) -> Vec<(Highlight, &str)> {
        [
            Highlight::Qualifier,
            Highlight::PrimitiveType,
            Highlight::UserDefinedType,
            Highlight::Ident,
            Highlight::Number,
            Highlight::QuasiKeyword,
        ]
        .into_iter()
        .filter_map(|highlight| self.class_for(highlight).map(|class| (highlight, class)))
        .collect()
    }
}

/// Formats [`HighlightedText`] as HTML, wrapping highlighted segments in
/// `<span class="...">` elements. Empty segments are skipped.
#[derive(Debug, Clone)]
pub struct HtmlFormatter {
    classes: ClassMapping,
}

impl HtmlFormatter {
    pub fn new(classes: ClassMapping) -> Self {
        Self { classes }
    }
}

impl Formatter for HtmlFormatter {
    fn format(&self, text: &HighlightedText) -> String {
        let mut out = String::new();
        for segment in text.iter().filter(|segment| !segment.text.is_empty()) {
            let escaped = html_escape::encode_text(&segment.text);
            match self.classes.class_for(segment.highlight) {
                Some(class) => {
                    out.push_str(r#"<span class=""#);
                    out.push_str(&html_escape::encode_double_quoted_attribute(class));
                    out.push_str(r#"">"#);
                    out.push_str(&escaped);
                    out.push_str("</span>");
                }
                None => out.push_str(&escaped),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::HighlightedTextSegment;

    #[test]
    fn wraps_mapped_segments_and_skips_empty_ones() {
        let formatter = HtmlFormatter::new(ClassMapping::new(
            Some("qualifier".to_string()),
            Some("primitive-type".to_string()),
            Some("user-defined-type".to_string()),
            None,
            Some("number".to_string()),
            Some("quasi".to_string()),
        ));

        let text = HighlightedText(vec![
            HighlightedTextSegment::new("pt", Highlight::PrimitiveType),
            HighlightedTextSegment::new("\n", Highlight::None),
            HighlightedTextSegment::new("id", Highlight::Ident),
            HighlightedTextSegment::new("\n", Highlight::None),
            HighlightedTextSegment::new("tq", Highlight::Qualifier),
            HighlightedTextSegment::new("\n", Highlight::None),
            HighlightedTextSegment::new("10", Highlight::Number),
            HighlightedTextSegment::new("\n", Highlight::None),
            HighlightedTextSegment::new("udt", Highlight::UserDefinedType),
            HighlightedTextSegment::new("", Highlight::Ident),
            HighlightedTextSegment::new("\n", Highlight::None),
            HighlightedTextSegment::new("function", Highlight::QuasiKeyword),
        ]);

        assert_eq!(
            formatter.format(&text),
            r#"<span class="primitive-type">pt</span>
id
<span class="qualifier">tq</span>
<span class="number">10</span>
<span class="user-defined-type">udt</span>
<span class="quasi">function</span>"#
        );
    }

    #[test]
    fn escapes_text_and_class_names() {
        let formatter = HtmlFormatter::new(ClassMapping::new(
            None,
            None,
            Some(r#"a"b"#.to_string()),
            None,
            None,
            None,
        ));
        let text = HighlightedText(vec![
            HighlightedTextSegment::new("struct <T>", Highlight::UserDefinedType),
            HighlightedTextSegment::new(" & more", Highlight::None),
        ]);
        assert_eq!(
            formatter.format(&text),
            r#"<span class="a&quot;b">struct &lt;T&gt;</span> &amp; more"#
        );
    }

    #[test]
    fn empty_class_name_means_unwrapped() {
        let mut classes = ClassMapping::default();
        classes.identifier = Some(String::new());
        assert_eq!(classes.class_for(Highlight::Ident), None);
        assert_eq!(classes.classes().len(), 5);
    }

    #[test]
    fn default_classes_in_category_order() {
        let classes = ClassMapping::default();
        let names: Vec<&str> = classes.classes().into_iter().map(|(_, c)| c).collect();
        assert_eq!(
            names,
            vec![
                "qualifier",
                "primitive-type",
                "user-defined-type",
                "identifier",
                "number",
                "quasi-keyword"
            ]
        );
    }
}
