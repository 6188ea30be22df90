//! Placeholder substitution and whitespace normalization

use crate::error::RenderError;
use crate::node::Id;

use super::lexer::{lex, Token};

/// A named value a template may reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub value: Id,
}

impl Field {
    pub fn new(name: &'static str, value: Id) -> Self {
        Self { name, value }
    }
}

/// Render `template` against a fixed field set
///
/// `kind` names the node kind in error messages ("object", "action").
/// The result is whitespace-normalized; on failure nothing is substituted
/// and the caller decides on a fallback.
pub fn render(template: &str, kind: &'static str, fields: &[Field]) -> Result<String, RenderError> {
    let mut out = String::with_capacity(template.len());
    // start offset of the `{{` currently being read
    let mut open: Option<usize> = None;

    for item in lex(template) {
        let (token, span) = item.map_err(|span| RenderError::MalformedAction {
            kind,
            action: template[span].to_string(),
        })?;

        match (token, open) {
            (Token::Open, None) => open = Some(span.start),
            (Token::Close, Some(start)) => {
                let action = &template[start..span.end];
                let value = lookup(action, kind, fields)?;
                out.push_str(&value.to_string());
                open = None;
            }
            (Token::Text(text), None) => out.push_str(&text),
            (Token::Close, None) => out.push_str("}}"),
            // nested `{{` inside an action
            (Token::Open, Some(start)) => {
                return Err(RenderError::MalformedAction {
                    kind,
                    action: template[start..span.end].to_string(),
                });
            }
            (Token::Text(_), Some(_)) => {}
        }
    }

    if let Some(offset) = open {
        return Err(RenderError::UnclosedAction { kind, offset });
    }

    Ok(trim_multiline(&out))
}

/// Resolve a complete `{{ .Name }}` action to its field value
fn lookup(action: &str, kind: &'static str, fields: &[Field]) -> Result<Id, RenderError> {
    let body = action
        .trim_start_matches("{{")
        .trim_end_matches("}}")
        .trim_matches(|c| c == ' ' || c == '\t');
    let name = body
        .strip_prefix('.')
        .filter(|name| is_identifier(name))
        .ok_or_else(|| RenderError::MalformedAction {
            kind,
            action: action.to_string(),
        })?;

    fields
        .iter()
        .find(|f| f.name == name)
        .map(|f| f.value)
        .ok_or_else(|| RenderError::UnknownField {
            kind,
            field: name.to_string(),
        })
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Collapse a multi-line fragment into one line
///
/// Each line loses its leading indentation (spaces and tabs) and any
/// trailing tabs or carriage return; lines are then joined without a
/// separator. Trailing spaces are kept, so `"line one \n  indented"`
/// becomes `"line one indented"`. Indentation at the start of a
/// continuation line inside text content is dropped along with the
/// structural indentation.
pub fn trim_multiline(multi: &str) -> String {
    multi
        .split('\n')
        .map(|line| {
            line.trim_start_matches(|c| c == ' ' || c == '\t')
                .trim_end_matches(|c| c == '\t' || c == '\r')
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object_fields(id: Id, parent_id: Id) -> [Field; 2] {
        [Field::new("ID", id), Field::new("ParentID", parent_id)]
    }

    #[test]
    fn test_render_substitutes_fields() {
        let out = render(
            r#"<Property Id="{{.ID}}" ParentId="{{.ParentID}}" Name="Web" />"#,
            "object",
            &object_fields(1, 0),
        )
        .unwrap();
        assert_eq!(out, r#"<Property Id="1" ParentId="0" Name="Web" />"#);
    }

    #[test]
    fn test_render_trims_multiline_template() {
        let template = r#"
            <Method Id="{{.ID}}" ParentId="{{.ParentID}}" Name="GetFolderByServerRelativeUrl">
                <Parameters>
                    <Parameter Type="String">/sites/site/Lists/List</Parameter>
                </Parameters>
            </Method>
        "#;
        let out = render(template, "object", &object_fields(2, 1)).unwrap();
        assert_eq!(
            out,
            r#"<Method Id="2" ParentId="1" Name="GetFolderByServerRelativeUrl"><Parameters><Parameter Type="String">/sites/site/Lists/List</Parameter></Parameters></Method>"#
        );
    }

    #[test]
    fn test_render_unknown_field() {
        let err = render(
            r#"<Query Id="{{.ID}}" ObjectPathId="{{.IncorrectID}}"></Query>"#,
            "action",
            &[Field::new("ID", 1), Field::new("ObjectID", 0)],
        )
        .unwrap_err();
        assert_eq!(
            err,
            RenderError::UnknownField {
                kind: "action",
                field: "IncorrectID".to_string(),
            }
        );
    }

    #[test]
    fn test_render_unclosed_action() {
        let err = render("<A Id=\"{{.ID\" />", "object", &object_fields(1, 0)).unwrap_err();
        assert!(matches!(err, RenderError::UnclosedAction { offset: 7, .. }));
    }

    #[test]
    fn test_render_malformed_action() {
        let err = render("{{ range . }}", "object", &object_fields(1, 0)).unwrap_err();
        assert!(matches!(err, RenderError::MalformedAction { .. }));
    }

    #[test]
    fn test_render_keeps_inner_text_verbatim() {
        let out = render(
            "<Parameter Type=\"String\">two  words</Parameter>",
            "object",
            &object_fields(1, 0),
        )
        .unwrap();
        assert_eq!(out, "<Parameter Type=\"String\">two  words</Parameter>");
    }

    #[test]
    fn test_render_unclosed_at_end() {
        let err = render("a {{.ID", "object", &object_fields(1, 0)).unwrap_err();
        assert_eq!(
            err,
            RenderError::UnclosedAction {
                kind: "object",
                offset: 2,
            }
        );
    }

    #[test]
    fn test_render_nested_open_is_malformed() {
        let err = render("{{ {{.ID}}", "object", &object_fields(1, 0)).unwrap_err();
        assert!(matches!(err, RenderError::MalformedAction { .. }));
    }

    #[test]
    fn test_render_stray_close_is_text() {
        let out = render("a }} b", "object", &object_fields(1, 0)).unwrap();
        assert_eq!(out, "a }} b");
    }

    #[test]
    fn test_render_guid_braces() {
        let out = render(
            r#"<StaticProperty Id="{{.ID}}" TypeId="{3747adcd-a3c3-41b9-bfab-4a64dd2f1e0a}" />"#,
            "object",
            &object_fields(0, -1),
        )
        .unwrap();
        assert_eq!(
            out,
            r#"<StaticProperty Id="0" TypeId="{3747adcd-a3c3-41b9-bfab-4a64dd2f1e0a}" />"#
        );
    }

    #[test]
    fn test_trim_multiline_strips_indentation() {
        assert_eq!(trim_multiline("\t<a>\n\t\t<b />\r\n    </a>\t"), "<a><b /></a>");
    }

    #[test]
    fn test_trim_multiline_keeps_trailing_spaces() {
        assert_eq!(trim_multiline("line one \n  indented"), "line one indented");
    }
}
