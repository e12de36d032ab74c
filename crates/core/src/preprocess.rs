//! HTML cleanup before parsing.
//!
//! Removes markup whose text a reader never sees (scripts, styles,
//! `noscript`, templates and comments) with a streaming `lol_html` rewrite.

/// Configuration for HTML preprocessing
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Whether to remove script tags
    pub remove_scripts: bool,
    /// Whether to remove style tags
    pub remove_styles: bool,
    /// Whether to remove noscript tags
    pub remove_noscript: bool,
    /// Whether to remove template tags
    pub remove_templates: bool,
    /// Whether to remove HTML comments
    pub remove_comments: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self { remove_scripts: true, remove_styles: true, remove_noscript: true, remove_templates: true, remove_comments: true }
    }
}

/// Strip markup whose text is never visible to a reader.
///
/// The rewrite is best-effort: if the streaming rewriter rejects the input,
/// the original HTML is returned unchanged.
pub fn preprocess_html(html: &str, config: &PreprocessConfig) -> String {
    let removable: Vec<&str> = [
        (config.remove_scripts, "script"),
        (config.remove_styles, "style"),
        (config.remove_noscript, "noscript"),
        (config.remove_templates, "template"),
    ]
    .into_iter()
    .filter_map(|(enabled, tag)| enabled.then_some(tag))
    .collect();

    if removable.is_empty() && !config.remove_comments {
        return html.to_string();
    }

    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: removable
                .iter()
                .map(|tag| {
                    lol_html::element!(*tag, |el| {
                        el.remove();
                        Ok(())
                    })
                })
                .collect(),
            document_content_handlers: if config.remove_comments {
                vec![lol_html::doc_comments!(|c| {
                    c.remove();
                    Ok(())
                })]
            } else {
                Vec::new()
            },
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    if rewriter.write(html.as_bytes()).is_err() {
        tracing::debug!("preprocess rewrite failed, analysing raw HTML");
        return html.to_string();
    }

    if rewriter.end().is_err() {
        tracing::debug!("preprocess rewrite failed, analysing raw HTML");
        return html.to_string();
    }

    if output.is_empty() { html.to_string() } else { output }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_unwanted_tags() {
        let html = r#"
            <html>
                <head>
                    <script>var tracking = "curl -X POST https://example.com";</script>
                    <style>.hidden { display: none; }</style>
                </head>
                <body>
                    <p>Visible paragraph</p>
                    <noscript>Enable JavaScript</noscript>
                    <template><p>Template row</p></template>
                </body>
            </html>
        "#;

        let result = preprocess_html(html, &PreprocessConfig::default());

        assert!(!result.contains("<script"));
        assert!(!result.contains("tracking"));
        assert!(!result.contains("<style"));
        assert!(!result.contains("Enable JavaScript"));
        assert!(!result.contains("Template row"));
        assert!(result.contains("Visible paragraph"));
    }

    #[test]
    fn test_remove_comments() {
        let html = "<p>Before</p><!-- import x from 'y' --><p>After</p>";
        let result = preprocess_html(html, &PreprocessConfig::default());

        assert!(!result.contains("import"));
        assert!(result.contains("Before"));
        assert!(result.contains("After"));
    }

    #[test]
    fn test_selective_removal() {
        let html = "<script>keep()</script><style>.a{}</style>";
        let config = PreprocessConfig { remove_scripts: false, ..Default::default() };
        let result = preprocess_html(html, &config);

        assert!(result.contains("keep()"));
        assert!(!result.contains(".a{}"));
    }

    #[test]
    fn test_everything_disabled_is_identity() {
        let html = "<p>Text</p><!-- note --><script>x()</script>";
        let config = PreprocessConfig {
            remove_scripts: false,
            remove_styles: false,
            remove_noscript: false,
            remove_templates: false,
            remove_comments: false,
        };

        assert_eq!(preprocess_html(html, &config), html);
    }
}
