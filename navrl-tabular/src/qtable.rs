//! Q-table store with plain-text persistence and the Bellman update.
use crate::error::QTableError;
use crate::selection::Outcome;
use crate::state_space::{is_valid_state, Action};
use anyhow::Result;
use ndarray::{Array2, ArrayView1};
use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

/// Field delimiter of the persisted table.
///
/// The redundant spacing is part of the file format and must match exactly
/// on both read and write.
const DELIMITER: &str = " , ";

/// A dense table of expected-return estimates indexed by (state, action).
///
/// The table is owned by a single environment instance and mutated in place
/// by [`QTable::update`]; no concurrent writers are supported.
#[derive(Clone, Debug, PartialEq)]
pub struct QTable {
    q: Array2<f32>,
}

impl QTable {
    /// Creates a zero-initialized table of the given shape.
    pub fn zeros(n_states: usize, n_actions: usize) -> Result<Self> {
        if n_states == 0 || n_actions == 0 {
            return Err(QTableError::EmptyDimension { n_states, n_actions }.into());
        }
        Ok(Self {
            q: Array2::zeros((n_states, n_actions)),
        })
    }

    /// Reads a table persisted by [`QTable::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_str = path.as_ref().display().to_string();
        let rdr = BufReader::new(File::open(path.as_ref())?);
        let mut rows: Vec<Vec<f32>> = Vec::new();

        for (ix, line) in rdr.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let fields = line
                .split(DELIMITER)
                .map(|f| {
                    f.trim().parse::<f32>().map_err(|_| QTableError::Parse {
                        path: path_str.clone(),
                        line: ix + 1,
                        msg: format!("field {:?} is not a number", f),
                    })
                })
                .collect::<Result<Vec<f32>, QTableError>>()?;
            if let Some(first) = rows.first() {
                if fields.len() != first.len() {
                    return Err(QTableError::Shape {
                        path: path_str,
                        line: ix + 1,
                        expected: first.len(),
                        found: fields.len(),
                    }
                    .into());
                }
            }
            rows.push(fields);
        }

        let n_states = rows.len();
        let n_actions = rows.first().map(|r| r.len()).unwrap_or(0);
        if n_states == 0 || n_actions == 0 {
            return Err(QTableError::EmptyDimension { n_states, n_actions }.into());
        }
        let data: Vec<f32> = rows.into_iter().flatten().collect();
        Ok(Self {
            q: Array2::from_shape_vec((n_states, n_actions), data)?,
        })
    }

    /// Serializes the table, one row per state, overwriting any existing
    /// file at `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        for row in self.q.rows() {
            let line = row
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(DELIMITER);
            writeln!(w, "{}", line)?;
        }
        w.flush()?;
        Ok(())
    }

    /// Number of states (rows).
    pub fn n_states(&self) -> usize {
        self.q.nrows()
    }

    /// Number of actions (columns).
    pub fn n_actions(&self) -> usize {
        self.q.ncols()
    }

    /// The row of action values for a state.
    pub fn row(&self, state: usize) -> ArrayView1<f32> {
        self.q.row(state)
    }

    /// Action value at (state, action).
    pub fn get(&self, state: usize, action: usize) -> f32 {
        self.q[[state, action]]
    }

    /// Overwrites the action value at (state, action).
    pub fn set(&mut self, state: usize, action: usize, value: f32) {
        self.q[[state, action]] = value;
    }

    /// Maximum action value of a row.
    pub fn row_max(&self, state: usize) -> f32 {
        self.q.row(state).iter().fold(f32::NEG_INFINITY, |m, v| m.max(*v))
    }

    /// Column of the maximum value of a row, ties broken by lowest index.
    pub fn argmax_row(&self, state: usize) -> usize {
        let row = self.q.row(state);
        let mut best = 0;
        for (ix, v) in row.iter().enumerate() {
            if *v > row[best] {
                best = ix;
            }
        }
        best
    }

    /// Applies the off-policy tabular Q-learning update in place:
    /// `Q[s,a] <- (1-alpha) * Q[s,a] + alpha * (r + gamma * max_a' Q[s',a'])`.
    ///
    /// If either index is invalid the table is left untouched and
    /// [`Outcome::InvalidStateIndex`] is returned. `alpha` and `gamma` are
    /// the caller's contract and are not validated here.
    pub fn update(
        &mut self,
        state_ind: i64,
        action: Action,
        reward: f32,
        next_state_ind: i64,
        alpha: f32,
        gamma: f32,
    ) -> Outcome {
        if is_valid_state(state_ind) && is_valid_state(next_state_ind) {
            let (s, a) = (state_ind as usize, action.index());
            let target = reward + gamma * self.row_max(next_state_ind as usize);
            self.q[[s, a]] = (1.0 - alpha) * self.q[[s, a]] + alpha * target;
            Outcome::Ok
        } else {
            Outcome::InvalidStateIndex
        }
    }
}
