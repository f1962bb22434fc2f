//! Provenance headers for generated files.

/// Comment syntax used for the header of a given output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// `<!-- ... -->`
    Html,
    /// `# ...`
    Hash,
    /// `// ...`
    Line,
}

impl CommentStyle {
    /// Pick the style for an output path. JSON files get no header.
    pub fn for_path(output_path: &str) -> Option<Self> {
        let file_name = output_path.rsplit('/').next().unwrap_or(output_path);
        let lower = file_name.to_ascii_lowercase();
        let ext = match lower.rfind('.') {
            Some(0) => &lower[1..],
            Some(i) => &lower[i + 1..],
            None => lower.as_str(),
        };

        match ext {
            "json" => None,
            "md" | "markdown" | "html" | "htm" => Some(Self::Html),
            "toml" | "yaml" | "yml" | "sh" | "py" | "gitignore" | "env" | "dockerignore"
            | "example" => Some(Self::Hash),
            _ => Some(Self::Line),
        }
    }

    fn comment(&self, text: &str) -> String {
        match self {
            Self::Html => format!("<!-- {} -->", text),
            Self::Hash => format!("# {}", text),
            Self::Line => format!("// {}", text),
        }
    }
}

/// The four header lines, newline-terminated.
pub fn provenance_header(
    style: CommentStyle,
    project: &str,
    output_path: &str,
    template_path: &str,
) -> String {
    [
        format!("File: {}/{}", project, output_path),
        format!("Generated from template: {}", template_path),
        "This file was generated using EJS templating.".to_string(),
        format!(
            "To modify this file, edit the template in 'template/{}'.",
            template_path
        ),
    ]
    .iter()
    .map(|line| style.comment(line) + "\n")
    .collect()
}

/// Insert the provenance header into `content`.
///
/// JSON stays untouched. A leading shebang line stays the first line and the
/// header follows it.
pub fn apply_header(content: &str, project: &str, output_path: &str, template_path: &str) -> String {
    let Some(style) = CommentStyle::for_path(output_path) else {
        return content.to_string();
    };
    let header = provenance_header(style, project, output_path, template_path);

    if content.starts_with("#!") {
        let (shebang, body) = match content.find('\n') {
            Some(i) => (&content[..i], &content[i + 1..]),
            None => (content, ""),
        };
        return format!("{}\n{}\n{}", shebang, header, body);
    }

    format!("{}\n{}", header, content)
}
