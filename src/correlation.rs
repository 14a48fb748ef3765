//! Square Pearson correlation matrix indexed by column name.

use serde::{Serialize, Serializer, ser::SerializeMap};

/// Symmetric matrix with a unit diagonal. Off-diagonal entries are `None`
/// when the coefficient is undefined for that pairing (fewer than two
/// shared observations, or a constant column).
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    names: Vec<String>,
    values: Vec<Option<f64>>,
}

impl CorrelationMatrix {
    /// Identity matrix over `names`; off-diagonal entries start undefined.
    pub fn identity(names: Vec<String>) -> Self {
        let n = names.len();
        let mut values = vec![None; n * n];
        for i in 0..n {
            values[i * n + i] = Some(1.0);
        }
        Self { names, values }
    }

    /// Pairwise-complete Pearson correlation across `columns`.
    pub fn pearson(columns: &[(String, Vec<Option<f64>>)]) -> Self {
        let mut matrix = Self::identity(columns.iter().map(|(name, _)| name.clone()).collect());
        for i in 0..columns.len() {
            for j in (i + 1)..columns.len() {
                let r = pearson_pairwise(&columns[i].1, &columns[j].1);
                matrix.set_index(i, j, r);
            }
        }
        matrix
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    fn len(&self) -> usize {
        self.names.len()
    }

    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let i = self.position(row)?;
        let j = self.position(column)?;
        self.values[i * self.len() + j]
    }

    /// Sets both mirrored entries. Diagonal entries stay at 1.0 and unknown
    /// names are ignored.
    pub fn set(&mut self, row: &str, column: &str, value: Option<f64>) {
        if let (Some(i), Some(j)) = (self.position(row), self.position(column)) {
            self.set_index(i, j, value);
        }
    }

    /// Defined off-diagonal entries in row-major order, so every pair is
    /// visited twice: once as `(a, b)` and once as `(b, a)`.
    pub fn off_diagonal(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        let n = self.len();
        (0..n).flat_map(move |i| {
            (0..n).filter(move |&j| j != i).filter_map(move |j| {
                self.values[i * n + j]
                    .map(|value| (self.names[i].as_str(), self.names[j].as_str(), value))
            })
        })
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    fn set_index(&mut self, i: usize, j: usize, value: Option<f64>) {
        if i == j {
            return;
        }
        let n = self.len();
        let value = value.map(|v| v.clamp(-1.0, 1.0));
        self.values[i * n + j] = value;
        self.values[j * n + i] = value;
    }
}

impl Serialize for CorrelationMatrix {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let n = self.len();
        let mut outer = serializer.serialize_map(Some(n))?;
        for (i, name) in self.names.iter().enumerate() {
            outer.serialize_entry(name, &Row { matrix: self, row: i })?;
        }
        outer.end()
    }
}

struct Row<'a> {
    matrix: &'a CorrelationMatrix,
    row: usize,
}

impl Serialize for Row<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let n = self.matrix.len();
        let mut inner = serializer.serialize_map(Some(n))?;
        for (j, name) in self.matrix.names.iter().enumerate() {
            inner.serialize_entry(name, &self.matrix.values[self.row * n + j])?;
        }
        inner.end()
    }
}

fn pearson_pairwise(left: &[Option<f64>], right: &[Option<f64>]) -> Option<f64> {
    let pairs = left
        .iter()
        .zip(right)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect::<Vec<_>>();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }
    let r = cov / denominator;
    r.is_finite().then_some(r)
}
