use serde::Deserialize;

use crate::DASH_LINE;

#[derive(Debug, Deserialize)]
struct Notebook {
    #[serde(default)]
    cells: Vec<Cell>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    #[serde(default = "unknown_cell_type")]
    cell_type: String,
    #[serde(default)]
    source: MultilineText,
    #[serde(default)]
    outputs: Vec<Output>,
}

fn unknown_cell_type() -> String {
    "unknown".to_string()
}

#[derive(Debug, Default, Deserialize)]
struct Output {
    #[serde(default)]
    text: Option<MultilineText>,
    #[serde(default)]
    data: Option<OutputData>,
    #[serde(default)]
    ename: Option<String>,
    #[serde(default)]
    evalue: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OutputData {
    #[serde(rename = "text/plain", default)]
    text_plain: Option<MultilineText>,
}

/// Notebook text fields are either one string or a list of lines.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MultilineText {
    Single(String),
    Lines(Vec<String>),
}

impl Default for MultilineText {
    fn default() -> Self {
        MultilineText::Lines(Vec::new())
    }
}

impl MultilineText {
    fn push_to(&self, out: &mut String) {
        match self {
            MultilineText::Single(text) => out.push_str(text),
            MultilineText::Lines(lines) => lines.iter().for_each(|line| out.push_str(line)),
        }
    }
}

/// 將 Jupyter 筆記本轉為純文字。 / Renders a Jupyter notebook as plain text, one block per cell.
pub fn render_notebook(json: &str, show_outputs: bool) -> Result<String, serde_json::Error> {
    let notebook: Notebook = serde_json::from_str(json)?;
    let mut out = String::new();

    for (index, cell) in notebook.cells.iter().enumerate() {
        let number = index + 1;
        let label = cell.cell_type.to_uppercase();

        out.push_str(DASH_LINE);
        out.push('\n');
        out.push_str(&format!("Begin Cell {number} - {label}\n"));

        cell.source.push_to(&mut out);
        ensure_newline(&mut out);

        if show_outputs && !cell.outputs.is_empty() {
            out.push_str("\nCell Outputs:\n");
            for output in &cell.outputs {
                push_output(output, &mut out);
            }
            ensure_newline(&mut out);
        }

        out.push_str(&format!("End Cell {number} - {label}\n"));
        out.push_str(DASH_LINE);
        out.push_str("\n\n");
    }

    Ok(out)
}

fn push_output(output: &Output, out: &mut String) {
    if let Some(text) = &output.text {
        text.push_to(out);
    } else if let Some(plain) = output.data.as_ref().and_then(|data| data.text_plain.as_ref()) {
        plain.push_to(out);
    } else if let Some(ename) = &output.ename {
        ensure_newline(out);
        out.push_str(ename);
        if let Some(evalue) = output.evalue.as_deref().filter(|value| !value.is_empty()) {
            out.push_str(": ");
            out.push_str(evalue);
        }
        out.push('\n');
    }
}

fn ensure_newline(out: &mut String) {
    if !out.ends_with('\n') {
        out.push('\n');
    }
}
