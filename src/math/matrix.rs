use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{NetworkError, Result};

/// Upper bound on elements accepted when reading a serialized matrix.
const MAX_ELEMENTS: usize = 1 << 28;

/// Dense row-major matrix of `f64`.
///
/// A matrix always has at least one row and one column and every row has the
/// same length. Its shape never changes after construction: arithmetic returns
/// new matrices, and only the `*_in_place` maps mutate values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Vec<f64>>,
}

/// Unvalidated serde form of a [`Matrix`].
#[derive(Deserialize)]
struct RawMatrix {
    rows: usize,
    cols: usize,
    data: Vec<Vec<f64>>,
}

impl TryFrom<RawMatrix> for Matrix {
    type Error = NetworkError;

    fn try_from(raw: RawMatrix) -> Result<Matrix> {
        let matrix = Matrix::from_data(raw.data)?;
        if matrix.rows != raw.rows || matrix.cols != raw.cols {
            return Err(NetworkError::ShapeMismatch(format!(
                "declared {}x{} but data is {}x{}",
                raw.rows, raw.cols, matrix.rows, matrix.cols
            )));
        }
        Ok(matrix)
    }
}

impl Matrix {
    /// All-zero matrix; both dimensions must be at least 1.
    pub fn zeros(rows: usize, cols: usize) -> Result<Matrix> {
        if rows == 0 || cols == 0 {
            return Err(NetworkError::ShapeMismatch(format!(
                "matrix must be at least 1x1, got {}x{}",
                rows, cols
            )));
        }
        Ok(Matrix::zeroed(rows, cols))
    }

    /// Builds a matrix from rows, rejecting empty or ragged input.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let rows = data.len();
        let cols = data.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(NetworkError::ShapeMismatch(format!(
                "matrix must be at least 1x1, got {}x{}",
                rows, cols
            )));
        }
        if let Some((i, row)) = data.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(NetworkError::ShapeMismatch(format!(
                "row {} has {} columns, expected {}",
                i,
                row.len(),
                cols
            )));
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Column vector (`n x 1`) from a slice.
    pub fn column(values: &[f64]) -> Result<Matrix> {
        Matrix::from_data(values.iter().map(|&v| vec![v]).collect())
    }

    /// Uniform samples in `[-0.5, 0.5)`.
    pub fn random_uniform<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Result<Matrix> {
        let mut res = Matrix::zeros(rows, cols)?;
        res.randomize(rng);
        Ok(res)
    }

    /// Redraws every value from `[-0.5, 0.5)`, keeping the shape.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.map_in_place(|_| rng.gen::<f64>() - 0.5);
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.data.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn row_iter(&self) -> impl Iterator<Item = &[f64]> {
        self.data.iter().map(Vec::as_slice)
    }

    /// Flattens a single-column matrix into a vector.
    pub fn to_column_vec(&self) -> Result<Vec<f64>> {
        if self.cols != 1 {
            return Err(NetworkError::ShapeMismatch(format!(
                "expected a column vector, got {}x{}",
                self.rows, self.cols
            )));
        }
        Ok(self.data.iter().map(|row| row[0]).collect())
    }

    pub fn add(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_map(rhs, "add", |a, b| a + b)
    }

    pub fn subtract(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_map(rhs, "subtract", |a, b| a - b)
    }

    /// Hadamard product of two same-shape matrices.
    pub fn elementwise_multiply(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_map(rhs, "elementwise multiply", |a, b| a * b)
    }

    /// Standard matrix product `self · rhs`.
    ///
    /// Output rows are computed in parallel; each row only reads the operands
    /// and writes its own vector.
    pub fn matrix_multiply(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(NetworkError::ShapeMismatch(format!(
                "cannot multiply {}x{} by {}x{}: left columns must equal right rows",
                self.rows, self.cols, rhs.rows, rhs.cols
            )));
        }

        let data: Vec<Vec<f64>> = self
            .data
            .par_iter()
            .map(|row| {
                (0..rhs.cols)
                    .map(|j| {
                        row.iter()
                            .zip(rhs.data.iter())
                            .map(|(a, rhs_row)| a * rhs_row[j])
                            .sum::<f64>()
                    })
                    .collect()
            })
            .collect();

        Ok(Matrix {
            rows: self.rows,
            cols: rhs.cols,
            data,
        })
    }

    pub fn scalar_multiply(&self, factor: f64) -> Matrix {
        self.map(|x| x * factor)
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeroed(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    pub fn map_in_place<F>(&mut self, mut functor: F)
    where
        F: FnMut(f64) -> f64,
    {
        for value in self.data.iter_mut().flatten() {
            *value = functor(*value);
        }
    }

    /// Combines `other` into `self` element by element.
    pub fn zip_map_in_place<F>(&mut self, other: &Matrix, functor: F) -> Result<()>
    where
        F: Fn(f64, f64) -> f64,
    {
        self.check_same_shape(other, "in-place combine")?;
        for (row, other_row) in self.data.iter_mut().zip(other.data.iter()) {
            for (value, &o) in row.iter_mut().zip(other_row.iter()) {
                *value = functor(*value, o);
            }
        }
        Ok(())
    }

    /// Writes `rows`, `cols` (i32) then every value (f64), row-major, little-endian.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i32::<LittleEndian>(dimension_to_i32(self.rows)?)?;
        writer.write_i32::<LittleEndian>(dimension_to_i32(self.cols)?)?;
        for value in self.data.iter().flatten() {
            writer.write_f64::<LittleEndian>(*value)?;
        }
        Ok(())
    }

    /// Reads a matrix written by [`Matrix::write_to`].
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Matrix> {
        let rows = reader.read_i32::<LittleEndian>()?;
        let cols = reader.read_i32::<LittleEndian>()?;
        if rows < 1 || cols < 1 {
            return Err(NetworkError::Format(format!(
                "matrix dimensions must be positive, got {}x{}",
                rows, cols
            )));
        }
        let (rows, cols) = (rows as usize, cols as usize);
        if rows.saturating_mul(cols) > MAX_ELEMENTS {
            return Err(NetworkError::Format(format!(
                "matrix of {}x{} exceeds the {} element limit",
                rows, cols, MAX_ELEMENTS
            )));
        }

        let mut data = Vec::with_capacity(rows);
        for _ in 0..rows {
            let mut row = vec![0.0; cols];
            reader.read_f64_into::<LittleEndian>(&mut row)?;
            data.push(row);
        }

        Ok(Matrix { rows, cols, data })
    }

    // Callers guarantee rows, cols >= 1.
    fn zeroed(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    fn zip_map<F>(&self, rhs: &Matrix, op: &str, functor: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        self.check_same_shape(rhs, op)?;
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(rhs.data.iter())
                .map(|(a, b)| a.iter().zip(b.iter()).map(|(&x, &y)| functor(x, y)).collect())
                .collect(),
        })
    }

    fn check_same_shape(&self, rhs: &Matrix, op: &str) -> Result<()> {
        if self.shape() != rhs.shape() {
            return Err(NetworkError::ShapeMismatch(format!(
                "cannot {} {}x{} and {}x{}: shapes must be identical",
                op, self.rows, self.cols, rhs.rows, rhs.cols
            )));
        }
        Ok(())
    }
}

fn dimension_to_i32(dim: usize) -> Result<i32> {
    i32::try_from(dim).map_err(|_| {
        NetworkError::Format(format!("dimension {} does not fit the i32 model format", dim))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn from_data_rejects_ragged_rows() {
        let err = Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, NetworkError::ShapeMismatch(_)));
    }

    #[test]
    fn zero_sized_shapes_are_errors() {
        assert!(matches!(Matrix::zeros(0, 3), Err(NetworkError::ShapeMismatch(_))));
        assert!(matches!(Matrix::zeros(2, 0), Err(NetworkError::ShapeMismatch(_))));
        let mut rng = rand::thread_rng();
        assert!(Matrix::random_uniform(0, 0, &mut rng).is_err());
        assert_eq!(Matrix::zeros(2, 3).unwrap().shape(), (2, 3));
    }

    #[test]
    fn from_data_rejects_empty() {
        assert!(Matrix::from_data(vec![]).is_err());
        assert!(Matrix::from_data(vec![vec![]]).is_err());
    }

    #[test]
    fn binary_layout_is_little_endian_row_major() {
        let m = Matrix::from_data(vec![vec![1.0, 2.0]]).unwrap();
        let mut buf = Vec::new();
        m.write_to(&mut buf).unwrap();

        assert_eq!(buf.len(), 4 + 4 + 2 * 8);
        assert_eq!(&buf[0..4], &1i32.to_le_bytes());
        assert_eq!(&buf[4..8], &2i32.to_le_bytes());
        assert_eq!(&buf[8..16], &1.0f64.to_le_bytes());
        assert_eq!(&buf[16..24], &2.0f64.to_le_bytes());
    }

    #[test]
    fn read_rejects_non_positive_dimensions() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0i32.to_le_bytes());
        buf.extend_from_slice(&3i32.to_le_bytes());
        let err = Matrix::read_from(&mut Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, NetworkError::Format(_)));
    }

    #[test]
    fn read_reports_truncated_values_as_io() {
        let m = Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let mut buf = Vec::new();
        m.write_to(&mut buf).unwrap();
        buf.truncate(buf.len() - 3);
        let err = Matrix::read_from(&mut Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, NetworkError::Io(_)));
    }

    #[test]
    fn json_rejects_mismatched_declared_shape() {
        let json = r#"{"rows":2,"cols":2,"data":[[1.0,2.0]]}"#;
        assert!(serde_json::from_str::<Matrix>(json).is_err());
    }
}
