//! Catalog listing.

use std::fmt::Write;

use print_shop_core::catalog;

/// Render sizes, papers, and the price matrix as plain text.
pub fn render() -> String {
    let mut out = String::new();

    out.push_str("Sizes:\n");
    for size in catalog::list_sizes() {
        let _ = writeln!(
            out,
            "  {:<8} {:<8} {:<10} {}",
            size.id, size.name, size.dimensions, size.description
        );
    }

    out.push_str("\nPapers:\n");
    for paper in catalog::list_papers() {
        let _ = writeln!(
            out,
            "  {:<10} {:<16} x{:<5} {}",
            paper.id, paper.name, paper.price_multiplier, paper.description
        );
    }

    out.push_str("\nPrices:\n");
    let _ = write!(out, "  {:<8}", "");
    for paper in catalog::list_papers() {
        let _ = write!(out, " {:>10}", paper.id);
    }
    out.push('\n');
    for size in catalog::list_sizes() {
        let _ = write!(out, "  {:<8}", size.id);
        for paper in catalog::list_papers() {
            let _ = write!(out, " {:>10}", catalog::price(size, paper).to_string());
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lists_matrix() {
        let out = render();
        assert!(out.contains("Gallery Canvas"));
        assert!(out.contains("16\" × 20\""));
        assert!(out.contains("$111.00"));
        assert!(out.contains("$293.00"));
    }
}
