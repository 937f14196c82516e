//! Row and column helpers shared by the table-driven extractors

use report_document::DocumentTree;
use shared_types::Bureau;

/// `td`/`th` children of a row
pub fn cells<T: DocumentTree>(tree: &T, row: T::Node) -> Vec<T::Node> {
    tree.children(row)
        .into_iter()
        .filter(|c| matches!(tree.tag(*c), "td" | "th"))
        .collect()
}

pub fn cell_texts<T: DocumentTree>(tree: &T, row: T::Node) -> Vec<String> {
    cells(tree, row).into_iter().map(|c| tree.text(c)).collect()
}

/// Header-section rows followed by body rows, each row once.
pub fn all_rows<T: DocumentTree>(tree: &T, table: T::Node) -> Vec<T::Node> {
    let mut rows = tree.find(table, "thead > tr");
    for row in tree.rows(table) {
        if !rows.contains(&row) {
            rows.push(row);
        }
    }
    rows
}

/// Bureau columns named by a table's header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BureauHeader<N> {
    pub row: N,
    /// Bureau per value column; `None` for columns naming no bureau
    pub columns: Vec<Option<Bureau>>,
}

impl<N> BureauHeader<N> {
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn bureaus(&self) -> impl Iterator<Item = (usize, Bureau)> + '_ {
        self.columns
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.map(|b| (i, b)))
    }
}

/// First row of `rows` naming at least one bureau.
///
/// When the first cell is itself a bureau the header has no label column
/// and every cell is a value column; otherwise the first cell is skipped.
pub fn bureau_header<T: DocumentTree>(tree: &T, rows: &[T::Node]) -> Option<BureauHeader<T::Node>> {
    rows.iter().find_map(|&row| {
        let names: Vec<Option<Bureau>> = cell_texts(tree, row)
            .iter()
            .map(|text| Bureau::canonicalize(text))
            .collect();
        if names.iter().all(Option::is_none) {
            return None;
        }
        let offset = if names.first().copied().flatten().is_some() { 0 } else { 1 };
        Some(BureauHeader {
            row,
            columns: names.into_iter().skip(offset).collect(),
        })
    })
}

/// Split a data row into its label cell and exactly `width` value cells.
///
/// `.label`/`.info` classed cells are preferred; otherwise the first cell is
/// the label and the rest are values. Missing value cells are `None` so
/// column alignment never shifts.
pub fn label_and_values<T: DocumentTree>(
    tree: &T,
    row: T::Node,
    width: usize,
) -> Option<(T::Node, Vec<Option<T::Node>>)> {
    let cells = cells(tree, row);
    let label = cells
        .iter()
        .copied()
        .find(|c| tree.classes(*c).contains(&"label"))
        .or_else(|| cells.first().copied())?;
    let info: Vec<T::Node> = cells
        .iter()
        .copied()
        .filter(|c| tree.classes(*c).contains(&"info"))
        .collect();
    let values = if info.is_empty() {
        cells.into_iter().filter(|c| *c != label).collect()
    } else {
        info
    };
    let mut padded: Vec<Option<T::Node>> = values.into_iter().take(width).map(Some).collect();
    padded.resize(width, None);
    Some((label, padded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use report_document::HtmlDocument;

    const MARKUP: &str = r#"<table id="t">
        <thead><tr><th></th><th>TransUnion</th><th>Unknown Agency</th><th>EQF</th></tr></thead>
        <tbody>
          <tr><td class="label">Balance:</td><td class="info">$5</td><td class="info">$6</td></tr>
          <tr><td>Past Due:</td><td>$1</td><td>$2</td><td>$3</td><td>extra</td></tr>
        </tbody></table>"#;

    #[test]
    fn test_header_columns() {
        let doc = HtmlDocument::parse(MARKUP);
        let tree = doc.tree();
        let table = tree.select_all("#t")[0];
        let rows = all_rows(&tree, table);
        assert_eq!(rows.len(), 3);
        let header = bureau_header(&tree, &rows).unwrap();
        assert_eq!(header.row, rows[0]);
        assert_eq!(
            header.columns,
            vec![Some(Bureau::TransUnion), None, Some(Bureau::Equifax)]
        );
        let named: Vec<(usize, Bureau)> = header.bureaus().collect();
        assert_eq!(named, vec![(0, Bureau::TransUnion), (2, Bureau::Equifax)]);
    }

    #[test]
    fn test_header_without_label_column() {
        let doc = HtmlDocument::parse("<table id='t'><tr><td>TU</td><td>EXP</td></tr></table>");
        let tree = doc.tree();
        let rows = all_rows(&tree, tree.select_all("#t")[0]);
        let header = bureau_header(&tree, &rows).unwrap();
        assert_eq!(header.width(), 2);
    }

    #[test]
    fn test_values_are_padded_and_truncated() {
        let doc = HtmlDocument::parse(MARKUP);
        let tree = doc.tree();
        let rows = all_rows(&tree, tree.select_all("#t")[0]);

        let (label, values) = label_and_values(&tree, rows[1], 3).unwrap();
        assert_eq!(tree.text(label), "Balance:");
        let texts: Vec<String> = values
            .iter()
            .map(|v| v.map(|n| tree.text(n)).unwrap_or_default())
            .collect();
        assert_eq!(texts, vec!["$5", "$6", ""]);

        let (_, values) = label_and_values(&tree, rows[2], 3).unwrap();
        assert_eq!(tree.text(values[2].unwrap()), "$3");
    }

    #[test]
    fn test_no_bureau_header() {
        let doc = HtmlDocument::parse("<table id='t'><tr><td>Name</td><td>Value</td></tr></table>");
        let tree = doc.tree();
        let rows = all_rows(&tree, tree.select_all("#t")[0]);
        assert!(bureau_header(&tree, &rows).is_none());
    }
}
