use std::path::Path;

use anyhow::{Context, Result};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use plotly::Plot;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

enum Block {
    Content(Markup),
    Plot(Plot),
}

/// A titled group of HTML blocks and plots.
pub struct ReportSection {
    title: String,
    blocks: Vec<Block>,
}

impl ReportSection {
    pub fn new(title: &str) -> Self {
        ReportSection {
            title: title.to_string(),
            blocks: Vec::new(),
        }
    }

    pub fn add_content(&mut self, content: Markup) {
        self.blocks.push(Block::Content(content));
    }

    pub fn add_plot(&mut self, plot: Plot) {
        self.blocks.push(Block::Plot(plot));
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    fn render(&self, section_idx: usize) -> Markup {
        html! {
            section id=(format!("section-{}", section_idx)) {
                h2 { (self.title) }
                @for (block_idx, block) in self.blocks.iter().enumerate() {
                    @match block {
                        Block::Content(markup) => {
                            div class="content" { (markup) }
                        }
                        Block::Plot(plot) => {
                            div class="plot" {
                                (PreEscaped(plot.to_inline_html(Some(&format!("plot-{}-{}", section_idx, block_idx)))))
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Self-contained HTML report built from sections.
pub struct Report {
    software_name: String,
    version: String,
    logo: Option<String>,
    title: String,
    sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(software_name: &str, version: &str, logo: Option<&str>, title: &str) -> Self {
        Report {
            software_name: software_name.to_string(),
            version: version.to_string(),
            logo: logo.map(str::to_string),
            title: title.to_string(),
            sections: Vec::new(),
        }
    }

    pub fn add_section(&mut self, section: ReportSection) {
        self.sections.push(section);
    }

    pub fn sections(&self) -> &[ReportSection] {
        &self.sections
    }

    pub fn render(&self) -> String {
        let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let page = html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    script src=(PLOTLY_CDN) {}
                    style {
                        "body { font-family: sans-serif; margin: 2em auto; max-width: 1100px; color: #222; }
                        header { display: flex; align-items: center; gap: 1em; border-bottom: 1px solid #ddd; }
                        header img { height: 48px; }
                        table { border-collapse: collapse; margin: 1em 0; }
                        th, td { border: 1px solid #ccc; padding: 4px 10px; text-align: right; }
                        th { background: #f0f0f0; }
                        pre { background: #f5f5f5; padding: 10px; border-radius: 5px; overflow-x: auto; }
                        footer { color: #777; font-size: 0.85em; border-top: 1px solid #ddd; margin-top: 2em; }"
                    }
                }
                body {
                    header {
                        @if let Some(logo) = &self.logo {
                            img src=(logo) alt=(self.software_name);
                        }
                        h1 { (self.title) }
                    }
                    nav {
                        ul {
                            @for (idx, section) in self.sections.iter().enumerate() {
                                li { a href=(format!("#section-{}", idx)) { (section.title) } }
                            }
                        }
                    }
                    @for (idx, section) in self.sections.iter().enumerate() {
                        (section.render(idx))
                    }
                    footer {
                        p { (self.software_name) " " (self.version) ", generated " (generated) }
                    }
                }
            }
        };
        page.into_string()
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.render())
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        log::info!("Report written to {}", path.display());
        Ok(())
    }
}
