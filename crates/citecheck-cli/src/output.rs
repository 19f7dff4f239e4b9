use citecheck_core::Reference;
use owo_colors::OwoColorize;

/// Whether terminal output should be colored.
#[derive(Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn ok(&self, s: &str) -> String {
        if self.0 {
            s.green().to_string()
        } else {
            s.to_string()
        }
    }

    pub fn bad(&self, s: &str) -> String {
        if self.0 {
            s.red().to_string()
        } else {
            s.to_string()
        }
    }

    pub fn dim(&self, s: &str) -> String {
        if self.0 {
            s.dimmed().to_string()
        } else {
            s.to_string()
        }
    }

    pub fn heading(&self, s: &str) -> String {
        if self.0 {
            s.bold().to_string()
        } else {
            s.to_string()
        }
    }
}

/// Print one extracted reference (no validation data).
pub fn print_reference(index: usize, reference: &Reference, color: ColorMode) {
    let title = reference.title.as_deref().unwrap_or("(no title)");
    println!("{} {}", color.heading(&format!("[{}]", index + 1)), title);
    if !reference.authors.is_empty() {
        println!("    {}", color.dim(&reference.authors.join("; ")));
    }
    if let Some(ref year) = reference.year {
        println!("    year: {year}");
    }
    if let Some(ref doi) = reference.doi {
        println!("    doi:  {doi}");
    }
    for url in &reference.urls {
        println!("    url:  {url}");
    }
}

/// Print the post-validation summary.
pub fn print_summary(refs: &[Reference], validated: bool, color: ColorMode) {
    println!();
    println!("{}", color.heading("Summary"));
    println!("  Total references: {}", refs.len());
    if !validated {
        return;
    }

    let accessible = refs.iter().filter(|r| r.is_accessible).count();
    let searched = refs
        .iter()
        .filter(|r| r.search.as_ref().is_some_and(|s| s.search_performed))
        .count();
    println!(
        "  {}",
        color.ok(&format!("Accessible: {accessible}"))
    );
    println!(
        "  {}",
        color.bad(&format!("Inaccessible: {}", refs.len() - accessible))
    );
    if searched > 0 {
        println!("  Searched online: {searched}");
    }
}
