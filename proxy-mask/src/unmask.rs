//! Response unmasker: reverses the substitution on a non-streaming body.

use proxy_core::PlaceholderContext;

/// How the unmasker handles a placeholder it can resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Replace the placeholder with the original text (default).
    Restore,
    /// Replace the placeholder with `"{marker_text} {original}"`.
    Annotate,
}

#[derive(Debug, Clone)]
pub struct ResponseUnmasker {
    mode: DisplayMode,
    marker_text: String,
}

impl ResponseUnmasker {
    pub fn restoring() -> Self {
        Self {
            mode: DisplayMode::Restore,
            marker_text: String::new(),
        }
    }

    pub fn annotating(marker_text: impl Into<String>) -> Self {
        Self {
            mode: DisplayMode::Annotate,
            marker_text: marker_text.into(),
        }
    }

    /// Replace every placeholder matching the wire grammar in `text`.
    /// Placeholders the context never issued are left unchanged.
    pub fn unmask(&self, text: &str, context: &PlaceholderContext) -> String {
        PlaceholderContext::replace_placeholders(text, |token, _category| {
            context.lookup(token).map(|original| match self.mode {
                DisplayMode::Restore => original.to_string(),
                DisplayMode::Annotate => format!("{} {}", self.marker_text, original),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restores_known_placeholders_and_leaves_unknown_ones() {
        let mut ctx = PlaceholderContext::new();
        let token = ctx.allocate("PERSON", "Sarah Chen");
        let text = format!("Hello {token}, also [[PERSON_9]]");
        let unmasked = ResponseUnmasker::restoring().unmask(&text, &ctx);
        assert_eq!(unmasked, "Hello Sarah Chen, also [[PERSON_9]]");
    }

    #[test]
    fn annotate_mode_prefixes_marker_text() {
        let mut ctx = PlaceholderContext::new();
        let token = ctx.allocate("PERSON", "Sarah Chen");
        let text = format!("Hello {token}");
        let unmasked = ResponseUnmasker::annotating("[protected]").unmask(&text, &ctx);
        assert_eq!(unmasked, "Hello [protected] Sarah Chen");
    }
}
