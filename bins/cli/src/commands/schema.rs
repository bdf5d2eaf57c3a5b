//! `bilancio schema`.

use std::path::Path;

use bilancio_core::Taxonomy;
use bilancio_core::taxonomy::BUILTIN_CEE_SCHEMA;
use bilancio_import::load_taxonomy;
use bilancio_shared::AppError;

/// Loads a taxonomy file and prints its vital statistics.
pub fn check(path: &Path) -> anyhow::Result<()> {
    let taxonomy = load_taxonomy(Some(path)).map_err(AppError::from)?;

    let exact = taxonomy
        .rules()
        .iter()
        .filter(|indexed| indexed.rule.is_exact())
        .count();
    let formulas = taxonomy
        .nodes()
        .iter()
        .filter(|node| node.formula.is_some())
        .count();
    let roles: Vec<String> = taxonomy
        .roles()
        .declared()
        .map(|(role, id)| format!("{role}={id}"))
        .collect();

    println!("{}: OK", path.display());
    println!("Taxonomy:   {}", taxonomy.name());
    println!("Nodes:      {}", taxonomy.len());
    println!(
        "Rules:      {} ({exact} exact, {} pattern)",
        taxonomy.rules().len(),
        taxonomy.rules().len() - exact
    );
    println!("Formulas:   {formulas}");
    println!(
        "Roles:      {}",
        if roles.is_empty() {
            "(none, identity check disabled)".to_string()
        } else {
            roles.join(", ")
        }
    );
    Ok(())
}

/// Prints the node tree of a taxonomy.
pub fn show(schema: Option<&Path>) -> anyhow::Result<()> {
    let taxonomy = load_taxonomy(schema).map_err(AppError::from)?;
    print!("{}", render_tree(&taxonomy));
    Ok(())
}

/// Prints the built-in taxonomy definition.
pub fn builtin() {
    print!("{BUILTIN_CEE_SCHEMA}");
}

fn render_tree(taxonomy: &Taxonomy) -> String {
    let mut out = format!("{}\n", taxonomy.name());
    for node in taxonomy.nodes() {
        let mut line = format!("{}{}  {}", "  ".repeat(node.depth + 1), node.id, node.label);
        if let Some(formula) = &node.formula {
            line.push_str(&format!("  [{}]", formula.source));
        }
        if node.critical {
            line.push_str("  (critical)");
        }
        let rules = taxonomy.rules_for(node.id.as_str()).count();
        if rules > 0 {
            line.push_str(&format!("  {rules} rule(s)"));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}
