use serde::{Deserialize, Serialize};

/// A single cell value. The original data model allows numbers and booleans
/// alongside text, so the persisted form is kept untagged; the dashboard
/// itself only ever writes text.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    pub fn blank() -> Self {
        CellValue::Text(String::new())
    }

    pub fn as_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => b.to_string(),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.is_empty())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Cell {
    pub id: String,
    pub value: CellValue,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Row {
    pub id: String,
    pub cells: Vec<Cell>,
}

/// A fixed-width operational log table. Invariant: every row carries exactly
/// one cell per header.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Sheet {
    pub id: String,
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Sheet {
    /// Build a seed sheet: the given headers and `row_count` blank rows,
    /// with the row/cell id scheme used by the persisted documents
    /// (`row-{r}`, `cell-{r}-{c}`).
    pub fn seeded(id: &str, title: &str, headers: &[&str], row_count: usize) -> Self {
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let rows = (0..row_count)
            .map(|r| Row {
                id: format!("row-{}", r),
                cells: (0..headers.len())
                    .map(|c| Cell {
                        id: format!("cell-{}-{}", r, c),
                        value: CellValue::blank(),
                    })
                    .collect(),
            })
            .collect();

        Sheet {
            id: id.to_string(),
            title: title.to_string(),
            headers,
            rows,
        }
    }

    /// Append a header and one blank cell to every existing row, preserving
    /// row order and all prior values. The new cell ids continue the
    /// `cell-{row}-{col}` scheme at the old header count.
    pub fn add_column(&mut self, column_name: &str) {
        let col = self.headers.len();
        self.headers.push(column_name.to_string());
        for (r, row) in self.rows.iter_mut().enumerate() {
            row.cells.push(Cell {
                id: format!("cell-{}-{}", r, col),
                value: CellValue::blank(),
            });
        }
    }

    /// Replace one cell's value. Returns false (leaving the sheet untouched)
    /// when either index is out of bounds.
    pub fn set_cell(&mut self, row_index: usize, cell_index: usize, value: CellValue) -> bool {
        match self
            .rows
            .get_mut(row_index)
            .and_then(|row| row.cells.get_mut(cell_index))
        {
            Some(cell) => {
                cell.value = value;
                true
            }
            None => false,
        }
    }

    pub fn cell_value(&self, row_index: usize, cell_index: usize) -> Option<&CellValue> {
        self.rows
            .get(row_index)
            .and_then(|row| row.cells.get(cell_index))
            .map(|cell| &cell.value)
    }
}
