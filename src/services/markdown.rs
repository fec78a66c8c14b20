use pulldown_cmark::{html, Options, Parser};

pub struct MarkdownRenderer {
    options: Options,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        Self { options }
    }

    /// Render markdown to sanitized HTML. Output is clean for direct
    /// insertion into templates.
    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let mut raw = String::new();
        html::push_html(&mut raw, parser);
        ammonia::clean(&raw)
    }
}
